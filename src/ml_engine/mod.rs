//! Classifier Trainer/Predictor
//!
//! Supervised cross-check for the rule engine: a random forest trained on
//! the synthetic corpus.
//!
//! ## Architecture
//! - `forest`: bagged CART trees (Gini, bootstrap, random feature subsets), fit in parallel
//! - `split`: stratified train/test partition
//! - `trainer`: training run, held-out evaluation and the immutable `ModelBundle`

pub mod forest;
pub mod split;
pub mod trainer;

pub use forest::{DecisionTree, RandomForest};
pub use split::{stratified_split, SplitIndices};
pub use trainer::{train, ModelBundle, TrainingError, TrainingReport};
