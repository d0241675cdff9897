pub mod cli;
pub mod config;
pub mod core;
pub mod fetch;
pub mod resolvers;
pub mod sandbox;
pub mod utils;

pub use crate::config::Config;
pub use crate::core::{Dispatcher, MediaUrl, Registry, Resolution, Resolver, ResolverError};
pub use crate::fetch::{HttpFetcher, PageFetcher};
pub use crate::sandbox::{CodeRunner, PistonRunner};

/// Resolves `page_url` with the default configuration.
///
/// Returns `None` when no registered host produced a media URL.
pub async fn resolve(page_url: &str) -> Option<MediaUrl> {
    match Dispatcher::from_config(&Config::default()) {
        Ok(dispatcher) => dispatcher.resolve(page_url).await,
        Err(e) => {
            tracing::warn!("Failed to set up resolver: {}", e);
            None
        }
    }
}
