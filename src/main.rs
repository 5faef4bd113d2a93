//! Fertilizer Advisor - hybrid rule/ML fertilizer recommendation
//!
//! # Usage
//!
//! ```bash
//! # HTTP API (trains a model on startup unless training.train_on_start = false)
//! fertilizer-advisor serve --addr 127.0.0.1:8080
//!
//! # Train once and print the report
//! fertilizer-advisor train --samples 5000 --seed 42
//!
//! # One recommendation, rule-only or with the classifier cross-check
//! fertilizer-advisor recommend --crop-type Wheat --nitrogen 15 --phosphorous 20 --potassium 25
//! fertilizer-advisor recommend --crop-type Wheat --with-model
//! ```
//!
//! # Environment Variables
//!
//! - `ADVISOR_CONFIG`: path to a TOML config file (default: ./advisor_config.toml)
//! - `ADVISOR_SERVER_ADDR`: HTTP bind address (default: 0.0.0.0:8080)
//! - `ADVISOR_CORS_ORIGINS`: comma-separated origins allowed cross-origin access
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use fertilizer_advisor::api::{create_app, AppState};
use fertilizer_advisor::{AdvisorConfig, Recommender, SoilSample};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "fertilizer-advisor")]
#[command(about = "Hybrid rule-based and ML fertilizer recommendation")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the HTTP API
    Serve {
        /// Override the server address (default from config: "0.0.0.0:8080")
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Train a model on a synthetic corpus and print the training report
    Train {
        /// Number of synthetic samples (default from config)
        #[arg(long)]
        samples: Option<usize>,
        /// Random seed (default from config)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Recommend a fertilizer for one soil sample and print it as JSON
    Recommend(RecommendArgs),
}

#[derive(clap::Args, Debug)]
struct RecommendArgs {
    /// Temperature (°C)
    #[arg(long, default_value_t = 25.0)]
    temperature: f64,
    /// Relative humidity (%)
    #[arg(long, default_value_t = 50.0)]
    humidity: f64,
    /// Soil moisture (%)
    #[arg(long, default_value_t = 40.0)]
    moisture: f64,
    /// Nitrogen (mg/kg)
    #[arg(long, default_value_t = 15.0)]
    nitrogen: f64,
    /// Phosphorous (mg/kg)
    #[arg(long, default_value_t = 20.0)]
    phosphorous: f64,
    /// Potassium (mg/kg)
    #[arg(long, default_value_t = 25.0)]
    potassium: f64,
    /// Soil type (Sandy, Loamy, Black, Red, Clayey, Other)
    #[arg(long, default_value = "Loamy")]
    soil_type: String,
    /// Crop type (e.g. Wheat, Maize, Rice, Other)
    #[arg(long, default_value = "Wheat")]
    crop_type: String,
    /// Train a model first so the result includes the classifier cross-check
    #[arg(long)]
    with_model: bool,
}

impl RecommendArgs {
    fn sample(&self) -> SoilSample {
        SoilSample {
            temperature: self.temperature,
            humidity: self.humidity,
            moisture: self.moisture,
            nitrogen: self.nitrogen,
            phosphorous: self.phosphorous,
            potassium: self.potassium,
            soil_type: self.soil_type.clone(),
            crop_type: self.crop_type.clone(),
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_serve(config: AdvisorConfig, addr_override: Option<String>) -> Result<()> {
    let server_addr = addr_override.unwrap_or_else(|| config.server.addr.clone());
    let recommender = Arc::new(Recommender::default());

    if config.training.train_on_start {
        let trainer = Arc::clone(&recommender);
        let training = config.training.clone();
        let forest = config.forest.clone();
        info!(samples = training.samples, "Training initial model");
        let trained = tokio::task::spawn_blocking(move || trainer.train_synthetic(&training, &forest))
            .await
            .context("Initial training task failed")?;
        if let Err(e) = trained {
            warn!(error = %e, "Initial training failed, serving rule-only recommendations");
        }
    } else {
        info!("train_on_start disabled, serving rule-only recommendations until POST /api/v1/model/train");
    }

    let app = create_app(AppState::new(recommender, config));
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind {server_addr}"))?;
    info!("🌾 HTTP API listening on http://{}", server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("🛑 Received Ctrl+C, shutting down...");
        })
        .await
        .context("HTTP server error")
}

fn run_train(config: AdvisorConfig, samples: Option<usize>, seed: Option<u64>) -> Result<()> {
    let mut training = config.training;
    if let Some(samples) = samples {
        training.samples = samples;
    }
    if let Some(seed) = seed {
        training.seed = seed;
    }
    if let Err(e) = training.check_samples() {
        bail!("Invalid --samples: {e}");
    }

    let bundle = Recommender::default()
        .train_synthetic(&training, &config.forest)
        .context("Training failed")?;
    println!("{}", serde_json::to_string_pretty(bundle.report())?);
    Ok(())
}

fn run_recommend(config: AdvisorConfig, args: RecommendArgs) -> Result<()> {
    let recommender = Recommender::default();
    let sample = args.sample();

    let violations = fertilizer_advisor::InputBounds::default()
        .check(&sample, recommender.rules().knowledge_base());
    if !violations.is_empty() {
        bail!("Invalid input:\n  - {}", violations.join("\n  - "));
    }

    if args.with_model {
        recommender
            .train_synthetic(&config.training, &config.forest)
            .context("Training failed")?;
    }

    let result = recommender.recommend(&sample);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = AdvisorConfig::load();

    match args.command {
        SubCommand::Serve { addr } => run_serve(config, addr).await,
        SubCommand::Train { samples, seed } => run_train(config, samples, seed),
        SubCommand::Recommend(recommend_args) => run_recommend(config, recommend_args),
    }
}
