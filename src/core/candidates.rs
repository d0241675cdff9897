use crate::fetch::PageFetcher;
use anyhow::Result;
use futures::stream::{self, BoxStream, StreamExt};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

static DATA_VIDEO: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-video]").unwrap());

/// One embedded player found on a source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedCandidate {
    pub hostname: String,
    pub url: String,
}

impl EmbedCandidate {
    /// Decodes a scraped URL and keys it by hostname.
    ///
    /// Returns `None` when the decoded value is not an absolute URL with a host.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = decode_embed_url(raw);
        let hostname = Url::parse(&url).ok()?.host_str()?.to_string();
        Some(Self { hostname, url })
    }
}

/// Percent-decodes the value and undoes `&amp;` escaping left in attributes.
pub fn decode_embed_url(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    decoded.replace("&amp;", "&")
}

/// Candidates collapsed by hostname.
///
/// Inserting a candidate whose hostname is already present replaces the
/// stored URL, so the last one discovered on the page wins.
#[derive(Debug, Default)]
pub struct CandidateSet {
    by_host: HashMap<String, String>,
}

impl CandidateSet {
    /// Returns the URL that was replaced, if any.
    pub fn insert(&mut self, candidate: EmbedCandidate) -> Option<String> {
        self.by_host.insert(candidate.hostname, candidate.url)
    }

    pub fn get(&self, hostname: &str) -> Option<&str> {
        self.by_host.get(hostname).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }
}

impl FromIterator<EmbedCandidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = EmbedCandidate>>(iter: I) -> Self {
        let mut set = Self::default();
        for candidate in iter {
            set.insert(candidate);
        }
        set
    }
}

/// Source of raw embed URLs for a page, in discovery order.
pub trait CandidateExtractor: Send + Sync {
    fn candidates<'a>(&'a self, page_url: &'a str) -> BoxStream<'a, Result<String>>;
}

/// Scrapes every `data-video` attribute of the source page.
pub struct PageCandidateExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl PageCandidateExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    async fn scrape(&self, page_url: &str) -> Result<Vec<String>> {
        let base = Url::parse(page_url)?;
        let html = self.fetcher.fetch_text(page_url).await?;
        let found = extract_data_video(&html, &base);
        debug!("Found {} embed candidates on {}", found.len(), page_url);
        Ok(found)
    }
}

impl CandidateExtractor for PageCandidateExtractor {
    fn candidates<'a>(&'a self, page_url: &'a str) -> BoxStream<'a, Result<String>> {
        stream::once(self.scrape(page_url))
            .map(|scraped| match scraped {
                Ok(found) => stream::iter(found.into_iter().map(Ok::<_, anyhow::Error>)).boxed(),
                Err(err) => stream::iter(std::iter::once(Err(err))).boxed(),
            })
            .flatten()
            .boxed()
    }
}

/// Relative and protocol-relative values are resolved against `base`.
///
/// Values that decode to an absolute URL are returned untouched, so
/// percent-encoded embeds keep their own host.
pub fn extract_data_video(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&DATA_VIDEO)
        .filter_map(|element| element.value().attr("data-video"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            if Url::parse(&decode_embed_url(value)).is_ok() {
                return value.to_string();
            }
            match base.join(value) {
                Ok(joined) => joined.to_string(),
                Err(_) => value.to_string(),
            }
        })
        .collect()
}
