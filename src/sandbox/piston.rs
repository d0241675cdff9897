use crate::config::Config;
use crate::core::{ResolveResult, ResolverError};
use crate::sandbox::{CodeRunner, SandboxRequest, SandboxRun};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for a Piston code-execution service.
pub struct PistonRunner {
    client: reqwest::Client,
    endpoint: String,
    version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Runtime {
    pub language: String,
    pub version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub runtime: Option<String>,
}

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: [ExecuteFile<'a>; 1],
}

#[derive(Serialize)]
struct ExecuteFile<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    run: Option<SandboxRun>,
    #[serde(default)]
    message: Option<String>,
}

impl PistonRunner {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.sandbox_endpoint.trim_end_matches('/').to_string(),
            version: config.sandbox_version.clone(),
        }
    }

    async fn runtime_version(&self, language: &str) -> ResolveResult<String> {
        let url = format!("{}/runtimes", self.endpoint);
        let runtimes: Vec<Runtime> = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(unreachable_runner)?
            .json()
            .await
            .map_err(unreachable_runner)?;

        select_runtime(&runtimes, language)
            .map(|runtime| runtime.version.clone())
            .ok_or_else(|| {
                ResolverError::SandboxExecutionFailure(format!("no runtime available for {}", language))
            })
    }
}

fn unreachable_runner(err: reqwest::Error) -> ResolverError {
    ResolverError::SandboxExecutionFailure(err.to_string())
}

/// First runtime whose language, runtime name or aliases match `language`.
pub fn select_runtime<'a>(runtimes: &'a [Runtime], language: &str) -> Option<&'a Runtime> {
    runtimes.iter().find(|runtime| {
        runtime.language == language
            || runtime.runtime.as_deref() == Some(language)
            || runtime.aliases.iter().any(|alias| alias == language)
    })
}

#[async_trait]
impl CodeRunner for PistonRunner {
    async fn run(&self, request: SandboxRequest) -> ResolveResult<SandboxRun> {
        let version = match request.version.clone().or_else(|| self.version.clone()) {
            Some(version) => version,
            None => self.runtime_version(&request.language).await?,
        };

        let body = ExecuteRequest {
            language: &request.language,
            version: &version,
            files: [ExecuteFile { content: &request.code }],
        };

        let response: ExecuteResponse = self
            .client
            .post(format!("{}/execute", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(unreachable_runner)?
            .json()
            .await
            .map_err(unreachable_runner)?;

        debug!(
            "Sandbox ran {} {}",
            response.language.as_deref().unwrap_or(&request.language),
            response.version.as_deref().unwrap_or(&version)
        );

        response.run.ok_or_else(|| {
            ResolverError::SandboxExecutionFailure(
                response
                    .message
                    .unwrap_or_else(|| "response carried no run result".to_string()),
            )
        })
    }
}
