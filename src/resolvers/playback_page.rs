use crate::core::{MediaUrl, ResolveResult, Resolver, ResolverError};
use crate::fetch::PageFetcher;
use crate::sandbox::{run_for_stdout, CodeRunner};
use crate::utils::playback_code;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::debug;

static BODY_SCRIPT: Lazy<Selector> = Lazy::new(|| Selector::parse("body script").unwrap());

const KEY_MARKER: &str = "jwplayer.key=";
const PACKED_MARKER: &str = "eval(function(p,a,c,k,e,d)";

/// Hosts serving a templated playback page whose player setup is packed.
///
/// The packed payload calls `jwplayer().setup(...)`; running it against a
/// stub player captures the first source file.
pub struct PlaybackPageResolver {
    fetcher: Arc<dyn PageFetcher>,
    runner: Arc<dyn CodeRunner>,
    base: String,
}

/// The two inline scripts the stub player needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerScripts {
    pub key: String,
    pub payload: String,
}

impl PlaybackPageResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, runner: Arc<dyn CodeRunner>) -> Self {
        Self {
            fetcher,
            runner,
            base: "https://sbplay.one".to_string(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn playback_url(&self, code: &str) -> String {
        format!("{}/play/{}?auto=1", self.base.trim_end_matches('/'), code)
    }
}

pub fn find_player_scripts(html: &str) -> ResolveResult<PlayerScripts> {
    let document = Html::parse_document(html);
    let scripts: Vec<String> = document
        .select(&BODY_SCRIPT)
        .map(|script| script.text().collect())
        .collect();

    let find = |marker: &str| {
        scripts
            .iter()
            .find(|text| text.contains(marker))
            .cloned()
            .ok_or_else(|| ResolverError::ExtractionNotFound(format!("no script containing {}", marker)))
    };

    Ok(PlayerScripts {
        key: find(KEY_MARKER)?,
        payload: find(PACKED_MARKER)?,
    })
}

pub fn player_snippet(scripts: &PlayerScripts) -> String {
    format!(
        r#"
let result = '';
const jwplayer = () => ({{
  addButton: () => null,
  setup: ({{ sources }}) => {{
    result = sources[0].file;
  }},
  on: () => null,
}});
{key};
{payload};
process.stdout.write(result);
"#,
        key = scripts.key,
        payload = scripts.payload,
    )
}

#[async_trait]
impl Resolver for PlaybackPageResolver {
    fn name(&self) -> &'static str {
        "playback-page"
    }

    async fn resolve(&self, url: &str) -> ResolveResult<MediaUrl> {
        let code = playback_code(url)
            .ok_or_else(|| ResolverError::ExtractionNotFound(format!("no playback code in {}", url)))?;
        let playback_url = self.playback_url(&code);
        debug!("Fetching playback page {}", playback_url);

        let page = self.fetcher.fetch_text(&playback_url).await?;
        let scripts = find_player_scripts(&page)?;
        let stdout = run_for_stdout(self.runner.as_ref(), player_snippet(&scripts)).await?;
        Ok(MediaUrl::from(stdout))
    }
}
