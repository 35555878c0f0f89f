use anyhow::Result;
use clap::Parser;
use ssm_command::cli::Cli;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays clean for workflow commands
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!("Starting ssm-command {}", ssm_command::VERSION);

    if cli.execute().await {
        // Failure was already reported through the runner
        std::process::exit(1);
    }

    Ok(())
}
