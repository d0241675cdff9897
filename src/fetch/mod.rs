use crate::config::Config;
use crate::core::ResolveResult;
use async_trait::async_trait;
use tracing::debug;

/// Network access used by resolvers and the candidate extractor.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GETs a page and returns its body as text.
    async fn fetch_text(&self, url: &str) -> ResolveResult<String>;

    /// POSTs a form-encoded body with extra headers and returns the response text.
    async fn post_form(&self, url: &str, body: &str, headers: &[(&str, &str)]) -> ResolveResult<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> ResolveResult<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        debug!("GET {} -> {}", url, response.status());
        Ok(response.text().await?)
    }

    async fn post_form(&self, url: &str, body: &str, headers: &[(&str, &str)]) -> ResolveResult<String> {
        let mut request = self.client.post(url).body(body.to_string());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?.error_for_status()?;
        debug!("POST {} -> {}", url, response.status());
        Ok(response.text().await?)
    }
}
