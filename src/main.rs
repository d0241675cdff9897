use clap::Parser;
use embed_resolver::cli::Cli;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries only the resolved URL
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting embed-resolver v{}", env!("CARGO_PKG_VERSION"));

    if !cli.run().await? {
        std::process::exit(1);
    }

    Ok(())
}
