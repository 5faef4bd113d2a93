//! Advisor Configuration - training, forest and server settings as TOML values
//!
//! Each section implements `Default` with the values the engine was tuned
//! with, so running without a config file behaves identically to running
//! with an empty one.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable holding the path of the config file.
pub const CONFIG_ENV_VAR: &str = "ADVISOR_CONFIG";
/// Environment variable overriding `server.addr`.
pub const SERVER_ADDR_ENV_VAR: &str = "ADVISOR_SERVER_ADDR";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "advisor_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration of the advisor.
///
/// Load with `AdvisorConfig::load()` which searches:
/// 1. `$ADVISOR_CONFIG` env var
/// 2. `./advisor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Synthetic corpus and train/test split
    #[serde(default)]
    pub training: TrainingConfig,

    /// Random forest hyperparameters
    #[serde(default)]
    pub forest: ForestConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl AdvisorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$ADVISOR_CONFIG` environment variable
    /// 2. `./advisor_config.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// `$ADVISOR_SERVER_ADDR` is applied on top of whichever source won.
    pub fn load() -> Self {
        let mut config = Self::load_file_or_default();
        config.apply_env_overrides();
        config
    }

    fn load_file_or_default() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded advisor config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./advisor_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded advisor config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| match e {
                ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
                other => other,
            })?;
        Ok(config)
    }

    /// Parse and validate a TOML document. Unknown keys are logged as warnings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `$ADVISOR_SERVER_ADDR` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var(SERVER_ADDR_ENV_VAR) {
            info!(addr = %addr, "Server address overridden by {}", SERVER_ADDR_ENV_VAR);
            self.server.addr = addr;
        }
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all settings for internal consistency.
    ///
    /// Rules:
    /// - The corpus must be large enough to split, and the test fraction in (0, 1)
    /// - Forest sizes must be positive and `min_samples_split` at least 2
    /// - `max_features`, when set, must fit the feature vector
    /// - The server address must parse as `host:port`
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let t = &self.training;
        if let Err(e) = t.check_samples() {
            errors.push(format!("training.{e}"));
        }
        if !t.test_fraction.is_finite() || t.test_fraction <= 0.0 || t.test_fraction >= 1.0 {
            errors.push(format!(
                "training.test_fraction = {} must be strictly between 0 and 1",
                t.test_fraction
            ));
        }

        let f = &self.forest;
        if f.n_trees == 0 {
            errors.push("forest.n_trees must be > 0".to_string());
        }
        if f.max_depth == 0 {
            errors.push("forest.max_depth must be > 0".to_string());
        }
        if f.min_samples_split < 2 {
            errors.push(format!(
                "forest.min_samples_split = {} must be >= 2",
                f.min_samples_split
            ));
        }
        if let Some(m) = f.max_features {
            if m == 0 || m > crate::features::NUM_FEATURES {
                errors.push(format!(
                    "forest.max_features = {m} must be between 1 and {}",
                    crate::features::NUM_FEATURES
                ));
            }
        }

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a valid HOST:PORT socket address",
                self.server.addr
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Smallest corpus a training run accepts.
pub const MIN_TRAINING_SAMPLES: usize = 10;
/// Largest corpus a training run accepts.
pub const MAX_TRAINING_SAMPLES: usize = 1_000_000;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Training
// ============================================================================

/// Synthetic corpus size, seeding and split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of synthetic records generated per training run
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Seed for corpus generation, splitting and forest fitting
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Share of each class held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Train a model when the server starts
    #[serde(default = "default_train_on_start")]
    pub train_on_start: bool,
}

impl TrainingConfig {
    /// Check `samples` against [`MIN_TRAINING_SAMPLES`]..=[`MAX_TRAINING_SAMPLES`].
    pub fn check_samples(&self) -> Result<(), String> {
        if self.samples < MIN_TRAINING_SAMPLES {
            return Err(format!(
                "samples = {} is too small (minimum {MIN_TRAINING_SAMPLES})",
                self.samples
            ));
        }
        if self.samples > MAX_TRAINING_SAMPLES {
            return Err(format!(
                "samples = {} is too large (maximum {MAX_TRAINING_SAMPLES})",
                self.samples
            ));
        }
        Ok(())
    }
}

fn default_samples() -> usize {
    5000
}
fn default_seed() -> u64 {
    42
}
fn default_test_fraction() -> f64 {
    0.2
}
fn default_train_on_start() -> bool {
    true
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            seed: default_seed(),
            test_fraction: default_test_fraction(),
            train_on_start: default_train_on_start(),
        }
    }
}

// ============================================================================
// Forest
// ============================================================================

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Nodes with fewer samples become leaves
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Features considered per split; `None` means round(sqrt(n_features))
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_features: Option<usize>,
}

fn default_n_trees() -> usize {
    200
}
fn default_max_depth() -> usize {
    15
}
fn default_min_samples_split() -> usize {
    5
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            max_features: None,
        }
    }
}

impl ForestConfig {
    /// Features drawn at each split for a vector of `n_features`.
    pub fn features_per_split(&self, n_features: usize) -> usize {
        let m = self
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().round() as usize);
        m.clamp(1, n_features.max(1))
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: default_server_addr() }
    }
}
