//! Shared data structures for the fertilizer recommendation pipeline
//!
//! - `soil`: per-request input (SoilSample), nutrient profiles and deficits
//! - `corpus`: labeled training data (TrainingCorpus)
//! - `recommendation`: orchestrator output (RecommendationResult, ConfidenceLevel)
//! - `bounds`: input ranges enforced by the outer surfaces (CLI, HTTP)

mod bounds;
mod corpus;
mod recommendation;
mod soil;

pub use bounds::*;
pub use corpus::*;
pub use recommendation::*;
pub use soil::*;
