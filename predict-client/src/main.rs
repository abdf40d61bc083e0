//! Diabetes Prediction Client - Main Entry Point

use std::process::ExitCode;

use clap::Parser;

use diabetes_predict_client::{constants, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let cli = Cli::parse();

    log::debug!("predict-client v{}", constants::APP_VERSION);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
