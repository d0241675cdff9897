use crate::core::error::ResolveResult;
use async_trait::async_trait;
use std::fmt;

/// A direct, playable resource location. Its shape is never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MediaUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Per-host strategy turning an embed URL into a media URL.
///
/// Implementations are stateless; the only side effects allowed are their
/// own network and sandbox calls.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self, url: &str) -> ResolveResult<MediaUrl>;
}
