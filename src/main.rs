use anyhow::{Context, Result};
use clap::Parser;
use picture_compressor::handler::BatchHandler;
use picture_compressor::image::ImageProcessor;
use picture_compressor::models::{Config, FailurePolicy, SqsEvent};
use picture_compressor::storage::S3ObjectStore;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "picture-compressor")]
#[command(about = "Shrink and recompress images referenced by a queue event")]
struct CliArgs {
    /// Path to the queue event JSON. Read from stdin when omitted.
    #[arg(value_name = "EVENT_FILE")]
    event_file: Option<PathBuf>,

    /// Overrides FAILURE_POLICY: always-succeed or report-failures.
    #[arg(long, value_parser = parse_policy_arg)]
    failure_policy: Option<FailurePolicy>,
}

fn parse_policy_arg(input: &str) -> std::result::Result<FailurePolicy, String> {
    input.parse().map_err(|e: picture_compressor::Error| e.to_string())
}

fn read_event(path: Option<&Path>) -> Result<SqsEvent> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read event from stdin")?;
            raw
        }
    };

    SqsEvent::from_json(&raw).context("Malformed queue event")
}

async fn run(args: CliArgs) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(policy) = args.failure_policy {
        config.failure_policy = policy;
    }

    let event = read_event(args.event_file.as_deref())?;
    info!(
        "Received {} notification(s), failure policy {:?}",
        event.records.len(),
        config.failure_policy
    );

    let store = S3ObjectStore::from_config(&config).await;
    let image = ImageProcessor::new(config.compression)?;
    let handler = BatchHandler::new(Box::new(store), Box::new(image), config.failure_policy);

    let response = handler.run(&event).await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "picture_compressor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => {
            info!("Batch handled");
            Ok(())
        }
        Err(e) => {
            error!("Failed to handle batch: {:#}", e);
            std::process::exit(1);
        }
    }
}
