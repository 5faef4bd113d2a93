//! Fertilizer Advisor: hybrid fertilizer recommendation
//!
//! A deterministic agronomic rule engine gives the authoritative answer; a
//! random forest trained on rule-labeled synthetic data cross-checks it.
//!
//! ## Architecture
//!
//! - **Knowledge Base**: fertilizer NPK compositions and crop requirement targets
//! - **Rule Engine**: deficit vector and ordered threshold rules, plus the explanation text
//! - **Synthetic Generator**: seeded, rule-labeled training corpus
//! - **Feature Pipeline**: derived indicators and label encoding shared by training and inference
//! - **ML Engine**: random forest, stratified split, training report
//! - **Recommender**: orchestrates both paths and grades their agreement
//! - **API**: axum HTTP surface over the recommender

pub mod api;
pub mod config;
pub mod features;
pub mod knowledge_base;
pub mod ml_engine;
pub mod recommender;
pub mod rules;
pub mod synthetic;
pub mod types;

// Re-export configuration
pub use config::AdvisorConfig;

// Re-export commonly used types
pub use types::{
    ConfidenceLevel, DeficitVector, InputBounds, MlRecommendation, NutrientProfile,
    RecommendationResult, SoilSample, TrainingCorpus, TrainingRecord,
};

// Re-export the engine components
pub use knowledge_base::NutrientKnowledgeBase;
pub use ml_engine::{ModelBundle, TrainingError, TrainingReport};
pub use recommender::Recommender;
pub use rules::RuleEngine;
pub use synthetic::SyntheticGenerator;
