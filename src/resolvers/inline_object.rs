use crate::core::{MediaUrl, ResolveResult, Resolver, ResolverError};
use crate::fetch::PageFetcher;
use crate::sandbox::{run_for_stdout, CodeRunner};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;

static SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

/// Hosts that assign the media location onto a global "core" object from
/// an inline script.
pub struct InlineObjectResolver {
    fetcher: Arc<dyn PageFetcher>,
    runner: Arc<dyn CodeRunner>,
    object: &'static str,
    marker: &'static str,
    field: &'static str,
    scheme: &'static str,
}

impl InlineObjectResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        runner: Arc<dyn CodeRunner>,
        object: &'static str,
        marker: &'static str,
        field: &'static str,
    ) -> Self {
        Self {
            fetcher,
            runner,
            object,
            marker,
            field,
            scheme: "https:",
        }
    }

    /// `MDCore.wurl` holds a protocol-relative URL.
    pub fn mixdrop(fetcher: Arc<dyn PageFetcher>, runner: Arc<dyn CodeRunner>) -> Self {
        Self::new(fetcher, runner, "MDCore", "MDCore.ref", "wurl")
    }

    pub fn find_object_script(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let script = document
            .select(&SCRIPT)
            .map(|script| script.text().collect::<String>())
            .find(|text| text.contains(self.marker));
        script.map(|text| text.trim().to_string())
    }

    pub fn snippet(&self, script: &str) -> String {
        format!(
            "const {object} = {{}};\n{script};\nprocess.stdout.write(`{scheme}${{{object}.{field}}}`);",
            object = self.object,
            script = script,
            scheme = self.scheme,
            field = self.field,
        )
    }
}

#[async_trait]
impl Resolver for InlineObjectResolver {
    fn name(&self) -> &'static str {
        "inline-object"
    }

    async fn resolve(&self, url: &str) -> ResolveResult<MediaUrl> {
        let page = self.fetcher.fetch_text(url).await?;
        let script = self.find_object_script(&page).ok_or_else(|| {
            ResolverError::ExtractionNotFound(format!("no script defining {}", self.object))
        })?;

        let stdout = run_for_stdout(self.runner.as_ref(), self.snippet(&script)).await?;
        Ok(MediaUrl::from(stdout))
    }
}
