use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use event_processor::{handle_envelope, render_response, BatchCoordinator, ProcessorConfig, Result};

#[derive(Parser)]
#[command(
    name = "event-processor",
    about = "Validate and store one queue batch, printing the partial-failure response"
)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Batch envelope to process (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries only the response; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Batch invocation failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ProcessorConfig::load(cli.config.as_deref())?;

    let raw = match &cli.input {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let persister = config.store.build().await?;
    let coordinator = BatchCoordinator::new(persister).with_concurrency(config.concurrency);

    let outcome = handle_envelope(&coordinator, &raw, config.invocation_timeout()).await?;
    let response = render_response(&outcome, cli.pretty)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&response).await?;
    stdout.flush().await?;

    Ok(())
}
