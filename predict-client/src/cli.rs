//! Command line interface
//!
//! Each subcommand performs exactly one service call (or one feedback
//! insert) and reports the outcome on stdout/stderr.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use validator::Validate;

use crate::api::{ClientConfig, FeatureInput, PredictionClient};
use crate::constants;
use crate::feedback::{self, DatabaseConfig, FeedbackEntry, FeedbackError, PgFeedbackStore};
use crate::render;

#[derive(Parser, Debug)]
#[command(name = "predict-client", version, about = "Diabetes risk prediction client")]
pub struct Cli {
    /// Prediction service base URL (falls back to PREDICTION_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict diabetes risk for one patient
    Predict(FeatureArgs),

    /// Show per-feature attribution for one patient
    Importance(FeatureArgs),

    /// Annotate a CSV file of patients with predictions
    Batch {
        /// CSV file with the eight feature columns
        file: PathBuf,

        /// Where to write the annotated CSV
        #[arg(long, short, default_value = constants::DEFAULT_BATCH_OUTPUT)]
        output: PathBuf,
    },

    /// Leave feedback about the tool
    Feedback {
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, default_value = "")]
        feedback: String,
    },

    /// Show service and model status
    Health,
}

/// Patient measurements; unset values default to 0
#[derive(Args, Debug, Clone, Copy)]
pub struct FeatureArgs {
    #[arg(long, default_value_t = 0.0)]
    pub pregnancies: f64,

    #[arg(long, default_value_t = 0.0)]
    pub glucose: f64,

    #[arg(long, default_value_t = 0.0)]
    pub blood_pressure: f64,

    #[arg(long, default_value_t = 0.0)]
    pub skin_thickness: f64,

    #[arg(long, default_value_t = 0.0)]
    pub insulin: f64,

    #[arg(long, default_value_t = 0.0)]
    pub bmi: f64,

    #[arg(long, default_value_t = 0.0)]
    pub diabetes_pedigree_function: f64,

    #[arg(long, default_value_t = 0.0)]
    pub age: f64,
}

impl From<FeatureArgs> for FeatureInput {
    fn from(args: FeatureArgs) -> Self {
        Self {
            pregnancies: args.pregnancies,
            glucose: args.glucose,
            blood_pressure: args.blood_pressure,
            skin_thickness: args.skin_thickness,
            insulin: args.insulin,
            bmi: args.bmi,
            diabetes_pedigree_function: args.diabetes_pedigree_function,
            age: args.age,
        }
    }
}

/// Execute the parsed command line; the error is the message for the user
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.api_url {
        Some(url) => ClientConfig {
            server_url: url.trim_end_matches('/').to_string(),
        },
        None => ClientConfig::default(),
    };
    let client = PredictionClient::new(config);

    match cli.command {
        Command::Predict(args) => predict(&client, args.into()).await,
        Command::Importance(args) => importance(&client, args.into()).await,
        Command::Batch { file, output } => batch(&client, &file, &output).await,
        Command::Feedback { name, email, feedback } => {
            submit(&name, email.as_deref(), &feedback).await?;
            println!("Thank you for your feedback!");
            Ok(())
        }
        Command::Health => health(&client).await,
    }
}

async fn predict(client: &PredictionClient, input: FeatureInput) -> anyhow::Result<()> {
    let response = client.predict_single(&input).await.map_err(|e| {
        log::error!("Prediction failed: {}", e);
        anyhow!("Error making prediction.")
    })?;

    println!("{}", render::prediction_message(&response));
    Ok(())
}

async fn importance(client: &PredictionClient, input: FeatureInput) -> anyhow::Result<()> {
    let response = client.predict_single(&input).await.map_err(|e| {
        log::error!("Prediction failed: {}", e);
        anyhow!("Error making prediction.")
    })?;

    print!(
        "{}",
        render::importance_chart(&response.attributions(), render::CHART_WIDTH)
    );
    Ok(())
}

async fn batch(client: &PredictionClient, file: &Path, output: &Path) -> anyhow::Result<()> {
    let failed = |e: &dyn std::fmt::Display| {
        log::error!("Batch prediction failed: {}", e);
        anyhow!("Error making batch prediction")
    };

    let content = std::fs::read(file).map_err(|e| failed(&format!("{}: {}", file.display(), e)))?;

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());

    let response = client
        .predict_batch(&file_name, content)
        .await
        .map_err(|e| failed(&e))?;

    std::fs::write(output, response.batch_pred.as_bytes())
        .map_err(|e| failed(&format!("{}: {}", output.display(), e)))?;

    println!("Batch prediction completed!");
    println!("Predictions saved to {}", output.display());
    Ok(())
}

async fn health(client: &PredictionClient) -> anyhow::Result<()> {
    let status = client
        .health_check()
        .await
        .with_context(|| format!("Service unavailable at {}", client.server_url()))?;

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Validate first so incomplete input never needs database settings
async fn submit(name: &str, email: Option<&str>, text: &str) -> Result<(), FeedbackError> {
    let entry = FeedbackEntry::new(name, email, text);
    entry.validate()?;

    let store = PgFeedbackStore::new(DatabaseConfig::from_env()?);
    feedback::submit_feedback(&store, &entry).await
}
