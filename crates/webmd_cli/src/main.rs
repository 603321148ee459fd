use std::process::ExitCode;

use anyhow::Context;
use engine_logging::engine_debug;
use webmd_cli::{resolve, retrieved_at_clock, summary_lines, ArgsError};
use webmd_core::RunConfig;
use webmd_engine::{ConversionSummary, FetchSettings, Pipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match resolve(std::env::args_os()) {
        Ok(config) => config,
        Err(ArgsError::Help(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    engine_logging::initialize_cli(config.debug);

    match run(&config).await {
        Ok(summary) => {
            for line in summary_lines(&summary) {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &RunConfig) -> anyhow::Result<ConversionSummary> {
    let settings = FetchSettings::from_env();
    engine_debug!("Transport: {}, settings: {settings:?}", config.transport);
    let pipeline = Pipeline::for_config(config, settings, retrieved_at_clock())
        .context("failed to set up the HTTP transport")?;
    pipeline
        .run(config)
        .await
        .with_context(|| format!("failed to convert {}", config.url))
}
