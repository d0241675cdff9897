use crate::core::{MediaUrl, ResolveResult, Resolver, ResolverError};
use async_trait::async_trait;

/// Placeholder for a recognized host whose extraction is not written yet.
///
/// Always fails without touching the network, so dispatch moves straight on.
pub struct UnimplementedResolver {
    host: &'static str,
}

impl UnimplementedResolver {
    pub fn new(host: &'static str) -> Self {
        Self { host }
    }
}

#[async_trait]
impl Resolver for UnimplementedResolver {
    fn name(&self) -> &'static str {
        "unimplemented"
    }

    async fn resolve(&self, _url: &str) -> ResolveResult<MediaUrl> {
        Err(ResolverError::NotImplemented(self.host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_fails() {
        let resolver = UnimplementedResolver::new("mp4upload");
        for url in ["https://www.mp4upload.com/embed-abc.html", "", "garbage"] {
            let err = resolver.resolve(url).await.unwrap_err();
            assert!(matches!(err, ResolverError::NotImplemented("mp4upload")));
        }
    }
}
