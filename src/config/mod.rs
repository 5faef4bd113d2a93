//! Advisor Configuration Module
//!
//! Training, forest and server settings loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `ADVISOR_CONFIG` environment variable (path to TOML file)
//! 2. `advisor_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `ADVISOR_SERVER_ADDR` then overrides `server.addr`. The loaded config is
//! passed by value to whatever needs it:
//!
//! ```ignore
//! let config = AdvisorConfig::load();
//! let recommender = Recommender::default();
//! recommender.train_synthetic(&config.training, &config.forest)?;
//! ```

mod advisor_config;
pub mod validation;

pub use advisor_config::*;
