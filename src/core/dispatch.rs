use crate::config::Config;
use crate::core::candidates::{CandidateExtractor, CandidateSet, EmbedCandidate, PageCandidateExtractor};
use crate::core::{MediaUrl, Registry, ResolverError};
use crate::fetch::HttpFetcher;
use crate::resolvers::standard_registry;
use crate::sandbox::PistonRunner;
use anyhow::Result;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// A resolver attempt that did not produce a media URL.
#[derive(Debug)]
pub struct FailedAttempt {
    pub hostname: String,
    pub error: ResolverError,
}

/// Outcome of a dispatch together with every failed attempt, in the order
/// they were tried.
#[derive(Debug, Default)]
pub struct Resolution {
    pub media: Option<MediaUrl>,
    pub attempts: Vec<FailedAttempt>,
}

/// Walks the registry in registration order and returns the first media URL
/// a matching resolver produces.
///
/// Resolvers run one at a time. Any resolver error moves dispatch on to the
/// next registry entry; nothing is retried.
pub struct Dispatcher {
    registry: Arc<Registry>,
    extractor: Arc<dyn CandidateExtractor>,
    resolver_timeout: Option<Duration>,
    total_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, extractor: Arc<dyn CandidateExtractor>) -> Self {
        Self {
            registry,
            extractor,
            resolver_timeout: None,
            total_timeout: None,
        }
    }

    /// `None` leaves the corresponding wait unbounded.
    pub fn with_timeouts(mut self, per_resolver: Option<Duration>, total: Option<Duration>) -> Self {
        self.resolver_timeout = per_resolver;
        self.total_timeout = total;
        self
    }

    /// Wires the HTTP fetcher, the Piston runner and the standard registry.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config)?);
        let runner = Arc::new(PistonRunner::new(fetcher.client().clone(), config));
        let registry = standard_registry(fetcher.clone(), runner)?;
        let extractor = PageCandidateExtractor::new(fetcher);

        Ok(Self::new(Arc::new(registry), Arc::new(extractor))
            .with_timeouts(config.resolver_timeout(), config.total_timeout()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn resolve(&self, page_url: &str) -> Option<MediaUrl> {
        self.resolve_with_diagnostics(page_url).await.media
    }

    pub async fn resolve_with_diagnostics(&self, page_url: &str) -> Resolution {
        let deadline = self.total_timeout.map(|total| Instant::now() + total);
        let mut resolution = Resolution::default();

        let candidates = match within(deadline, self.collect_candidates(page_url)).await {
            Some(Ok(candidates)) => candidates,
            Some(Err(e)) => {
                warn!("Candidate extraction failed for {}: {}", page_url, e);
                return resolution;
            }
            None => {
                warn!("Candidate extraction for {} exceeded the resolution deadline", page_url);
                return resolution;
            }
        };

        for (hostname, resolver) in self.registry.iter() {
            let Some(url) = candidates.get(hostname) else {
                continue;
            };

            if deadline.is_some_and(|at| Instant::now() >= at) {
                warn!("Resolution deadline reached before trying {}", hostname);
                break;
            }

            debug!("Trying {} resolver for {}", resolver.name(), url);
            let started = Instant::now();
            let outcome = match within(self.attempt_deadline(deadline), resolver.resolve(url)).await {
                Some(outcome) => outcome,
                None => Err(ResolverError::Timeout(started.elapsed())),
            };

            match outcome {
                Ok(media) => {
                    info!("Resolved {} via {}", page_url, hostname);
                    resolution.media = Some(media);
                    return resolution;
                }
                Err(error) => {
                    warn!("{} resolver failed: {}", resolver.name(), error);
                    resolution.attempts.push(FailedAttempt {
                        hostname: hostname.to_string(),
                        error,
                    });
                }
            }
        }

        resolution
    }

    /// Drains the extractor completely before any resolver runs.
    async fn collect_candidates(&self, page_url: &str) -> Result<CandidateSet> {
        let mut raw_candidates = self.extractor.candidates(page_url);
        let mut candidates = CandidateSet::default();

        while let Some(raw) = raw_candidates.next().await {
            let raw = raw?;
            match EmbedCandidate::parse(&raw) {
                Some(candidate) => {
                    let hostname = candidate.hostname.clone();
                    if let Some(replaced) = candidates.insert(candidate) {
                        debug!("Replacing earlier {} candidate {}", hostname, replaced);
                    }
                }
                None => debug!("Skipping unparseable candidate {}", raw),
            }
        }

        Ok(candidates)
    }

    fn attempt_deadline(&self, total: Option<Instant>) -> Option<Instant> {
        let own = self.resolver_timeout.map(|limit| Instant::now() + limit);
        match (own, total) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

async fn within<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(at) => timeout_at(at, future).await.ok(),
        None => Some(future.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ResolveResult, Resolver};
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};
    use std::sync::Mutex;

    struct FixedCandidates(Vec<&'static str>);

    impl CandidateExtractor for FixedCandidates {
        fn candidates<'a>(&'a self, _page_url: &'a str) -> BoxStream<'a, Result<String>> {
            stream::iter(self.0.iter().map(|s| Ok(s.to_string()))).boxed()
        }
    }

    struct Sleepy {
        delay: Duration,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Resolver for Sleepy {
        fn name(&self) -> &'static str {
            "sleepy"
        }

        async fn resolve(&self, url: &str) -> ResolveResult<MediaUrl> {
            self.calls.lock().unwrap().push(url.to_string());
            tokio::time::sleep(self.delay).await;
            Ok(MediaUrl::new("https://cdn.example/slow.mp4"))
        }
    }

    struct Ready(&'static str);

    #[async_trait]
    impl Resolver for Ready {
        fn name(&self) -> &'static str {
            "ready"
        }

        async fn resolve(&self, _url: &str) -> ResolveResult<MediaUrl> {
            Ok(MediaUrl::new(self.0))
        }
    }

    fn dispatcher(registry: Registry, candidates: Vec<&'static str>) -> Dispatcher {
        Dispatcher::new(Arc::new(registry), Arc::new(FixedCandidates(candidates)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_resolver_times_out_and_dispatch_continues() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::builder()
            .register(
                "slow.example",
                Sleepy {
                    delay: Duration::from_secs(120),
                    calls: calls.clone(),
                },
            )
            .register("fast.example", Ready("https://cdn.example/fast.mp4"))
            .build()
            .unwrap();

        let dispatcher = dispatcher(registry, vec!["https://slow.example/e/1", "https://fast.example/e/1"])
            .with_timeouts(Some(Duration::from_secs(10)), None);

        let resolution = dispatcher.resolve_with_diagnostics("https://page.example/").await;
        assert_eq!(resolution.media, Some(MediaUrl::new("https://cdn.example/fast.mp4")));
        assert_eq!(resolution.attempts.len(), 1);
        assert_eq!(resolution.attempts[0].hostname, "slow.example");
        assert!(matches!(resolution.attempts[0].error, ResolverError::Timeout(_)));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_deadline_stops_dispatch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::builder()
            .register(
                "slow.example",
                Sleepy {
                    delay: Duration::from_secs(120),
                    calls: calls.clone(),
                },
            )
            .register("fast.example", Ready("https://cdn.example/fast.mp4"))
            .build()
            .unwrap();

        let dispatcher = dispatcher(registry, vec!["https://slow.example/e/1", "https://fast.example/e/1"])
            .with_timeouts(Some(Duration::from_secs(60)), Some(Duration::from_secs(30)));

        let resolution = dispatcher.resolve_with_diagnostics("https://page.example/").await;
        assert!(resolution.media.is_none());
        assert_eq!(resolution.attempts.len(), 1);
        assert!(matches!(resolution.attempts[0].error, ResolverError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unparseable_candidates_are_skipped() {
        let registry = Registry::builder()
            .register("fast.example", Ready("https://cdn.example/fast.mp4"))
            .build()
            .unwrap();

        let dispatcher = dispatcher(registry, vec!["not a url", "https://fast.example/e/1"]);
        assert_eq!(
            dispatcher.resolve("https://page.example/").await,
            Some(MediaUrl::new("https://cdn.example/fast.mp4"))
        );
    }
}
