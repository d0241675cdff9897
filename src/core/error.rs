use std::time::Duration;
use thiserror::Error;

/// Why a single resolver could not produce a media URL.
///
/// The dispatcher treats every variant the same way: the attempt is recorded
/// and the next registry entry is tried.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The page did not contain the markup or script the resolver looks for.
    #[error("extraction failed: {0}")]
    ExtractionNotFound(String),

    /// The code runner was unreachable or the snippet did not exit cleanly.
    #[error("sandbox execution failed: {0}")]
    SandboxExecutionFailure(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The host is recognized but has no working extraction logic.
    #[error("resolver for {0} is not implemented")]
    NotImplemented(&'static str),

    #[error("resolver timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ResolverError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkFailure(err.to_string())
    }
}

pub type ResolveResult<T> = std::result::Result<T, ResolverError>;
