use crate::core::{MediaUrl, ResolveResult, Resolver, ResolverError};
use crate::fetch::PageFetcher;
use crate::utils::last_path_segment;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "en-GB,en;q=0.9,hr;q=0.8,de;q=0.7"),
    ("content-type", "application/x-www-form-urlencoded; charset=UTF-8"),
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"93\", \" Not;A Brand\";v=\"99\", \"Chromium\";v=\"93\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Linux\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    ("x-requested-with", "XMLHttpRequest"),
];

/// Hosts exposing their source list through a JSON endpoint. No sandbox
/// is involved.
pub struct RemoteApiResolver {
    fetcher: Arc<dyn PageFetcher>,
    base: String,
    domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceDescriptor {
    pub label: String,
    pub file: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceResponse {
    Wrapped { data: Vec<SourceDescriptor> },
    Bare(Vec<SourceDescriptor>),
}

impl RemoteApiResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base: "https://embedsito.com".to_string(),
            domain: "embedsito.com".to_string(),
        }
    }

    /// Points the API calls at another origin; the form body keeps the
    /// original domain.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    async fn fetch_sources(&self, id: &str) -> ResolveResult<Vec<SourceDescriptor>> {
        let base = self.base.trim_end_matches('/');
        let endpoint = format!("{}/api/source/{}", base, id);
        let referer = format!("{}/v/{}", base, id);
        let body = format!("r=&d={}", self.domain);

        let mut headers = BROWSER_HEADERS.to_vec();
        headers.push(("referer", referer.as_str()));

        let raw = self.fetcher.post_form(&endpoint, &body, &headers).await?;
        parse_sources(&raw)
    }
}

pub fn parse_sources(raw: &str) -> ResolveResult<Vec<SourceDescriptor>> {
    match serde_json::from_str::<SourceResponse>(raw) {
        Ok(SourceResponse::Wrapped { data }) | Ok(SourceResponse::Bare(data)) => Ok(data),
        Err(e) => Err(ResolverError::ExtractionNotFound(format!(
            "unexpected source list response: {}",
            e
        ))),
    }
}

/// Numeric value of a quality label, reading leading digits like `parseInt`.
fn label_rank(label: &str) -> Option<i64> {
    let label = label.trim();
    let digits_end = label
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    label[..digits_end].parse().ok()
}

/// Highest-quality descriptor; labels without a number rank lowest and ties
/// go to the later entry.
pub fn best_source(sources: &[SourceDescriptor]) -> Option<&SourceDescriptor> {
    sources.iter().max_by_key(|source| label_rank(&source.label))
}

#[async_trait]
impl Resolver for RemoteApiResolver {
    fn name(&self) -> &'static str {
        "remote-api"
    }

    async fn resolve(&self, url: &str) -> ResolveResult<MediaUrl> {
        let id = last_path_segment(url)
            .ok_or_else(|| ResolverError::ExtractionNotFound(format!("no video id in {}", url)))?;

        let sources = self.fetch_sources(&id).await?;
        debug!("{} sources listed for {}", sources.len(), id);

        best_source(&sources)
            .map(|source| MediaUrl::new(source.file.clone()))
            .ok_or_else(|| ResolverError::ExtractionNotFound("empty source list".to_string()))
    }
}
