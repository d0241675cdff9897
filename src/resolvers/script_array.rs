use crate::core::{MediaUrl, ResolveResult, Resolver, ResolverError};
use crate::fetch::PageFetcher;
use crate::sandbox::{run_for_stdout, CodeRunner};
use crate::utils::preview;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());
static SOURCES_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"sources\s*:\s*(.+)$").unwrap());

/// Inline scripts worth looking at reference a network origin.
const ORIGIN_MARKER: &str = "https://";

/// Hosts that declare their player sources as an array literal in an
/// inline script.
pub struct ScriptArrayResolver {
    fetcher: Arc<dyn PageFetcher>,
    runner: Arc<dyn CodeRunner>,
}

impl ScriptArrayResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, runner: Arc<dyn CodeRunner>) -> Self {
        Self { fetcher, runner }
    }
}

/// Array literals assigned to `sources:` inside scripts containing the
/// origin marker, with the label stripped.
pub fn extract_sources(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&SCRIPT)
        .map(|script| script.text().collect::<String>())
        .filter(|text| text.contains(ORIGIN_MARKER))
        .flat_map(|text| {
            text.lines()
                .filter_map(|line| SOURCES_LINE.captures(line.trim()))
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Flattens every array and prints the first entry's `file`.
pub fn sources_snippet(sources: &[String]) -> String {
    format!(
        "const s = [{}].flat(); process.stdout.write(s[0].file);",
        sources.join(",")
    )
}

#[async_trait]
impl Resolver for ScriptArrayResolver {
    fn name(&self) -> &'static str {
        "script-array"
    }

    async fn resolve(&self, url: &str) -> ResolveResult<MediaUrl> {
        let page = self.fetcher.fetch_text(url).await?;
        let sources = extract_sources(&page);
        if sources.is_empty() {
            return Err(ResolverError::ExtractionNotFound(
                "no sources array in page scripts".to_string(),
            ));
        }

        let snippet = sources_snippet(&sources);
        debug!("Running sources snippet: {}", preview(&snippet, 120));
        let stdout = run_for_stdout(self.runner.as_ref(), snippet).await?;
        Ok(MediaUrl::from(stdout))
    }
}
