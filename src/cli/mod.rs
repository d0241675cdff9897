use crate::config::Config;
use crate::core::{Dispatcher, Resolution};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "embed-resolver")]
#[command(about = "Find a direct media URL behind a page of embedded players")]
#[command(version)]
pub struct Cli {
    /// Source page listing the embedded players
    #[arg(value_name = "URL")]
    pub url: String,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// List failed resolver attempts on stderr
    #[arg(short, long)]
    pub diagnostics: bool,
}

impl Cli {
    /// Returns whether a media URL was found.
    pub async fn run(&self) -> Result<bool> {
        let config = Config::load(self.config.as_deref())?;
        let dispatcher = Dispatcher::from_config(&config)?;
        info!(
            "Resolving {} against {} hosts",
            self.url,
            dispatcher.registry().len()
        );

        let Resolution { media, attempts } = dispatcher.resolve_with_diagnostics(&self.url).await;

        if self.diagnostics {
            for attempt in &attempts {
                eprintln!("{}: {}", attempt.hostname, attempt.error);
            }
        }

        match media {
            Some(media) => {
                println!("{}", media);
                Ok(true)
            }
            None => {
                eprintln!("no playable media found");
                Ok(false)
            }
        }
    }
}
