//! Isolated execution of host-supplied script fragments.
//!
//! Obfuscated code scraped from third-party pages is never evaluated in this
//! process. It is shipped to a remote runner and only its captured output
//! comes back.

pub mod piston;

pub use piston::PistonRunner;

use crate::core::{ResolveResult, ResolverError};
use async_trait::async_trait;
use serde::Deserialize;

/// Generic scripting-language identifier submitted for every snippet.
pub const SCRIPT_LANGUAGE: &str = "js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRequest {
    pub language: String,
    /// `None` lets the runner pick its configured or advertised version.
    pub version: Option<String>,
    pub code: String,
}

impl SandboxRequest {
    pub fn script(code: impl Into<String>) -> Self {
        Self {
            language: SCRIPT_LANGUAGE.to_string(),
            version: None,
            code: code.into(),
        }
    }
}

/// Captured result of one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SandboxRun {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
}

impl SandboxRun {
    /// Trimmed stdout of a run that exited normally with a zero status.
    pub fn into_stdout(self) -> ResolveResult<String> {
        if let Some(signal) = &self.signal {
            return Err(ResolverError::SandboxExecutionFailure(format!(
                "killed by {}: {}",
                signal,
                self.stderr.trim()
            )));
        }

        if let Some(code) = self.code.filter(|code| *code != 0) {
            return Err(ResolverError::SandboxExecutionFailure(format!(
                "exit code {}: {}",
                code,
                self.stderr.trim()
            )));
        }

        Ok(self.stdout.trim().to_string())
    }
}

#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(&self, request: SandboxRequest) -> ResolveResult<SandboxRun>;
}

/// Runs `code` and returns its trimmed stdout, failing on empty output.
pub async fn run_for_stdout(runner: &dyn CodeRunner, code: String) -> ResolveResult<String> {
    let stdout = runner.run(SandboxRequest::script(code)).await?.into_stdout()?;
    if stdout.is_empty() {
        return Err(ResolverError::SandboxExecutionFailure(
            "snippet produced no output".to_string(),
        ));
    }
    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::fakes::FakeRunner;
    use tokio_test::{assert_err, assert_ok};

    fn run(stdout: &str, code: Option<i64>, signal: Option<&str>) -> SandboxRun {
        SandboxRun {
            stdout: stdout.to_string(),
            stderr: "boom".to_string(),
            code,
            signal: signal.map(str::to_string),
        }
    }

    #[test]
    fn test_stdout_is_trimmed() {
        let stdout = assert_ok!(run("  http://x/y.mp4\n", Some(0), None).into_stdout());
        assert_eq!(stdout, "http://x/y.mp4");
    }

    #[test]
    fn test_abnormal_termination_is_a_failure() {
        assert_err!(run("partial", Some(1), None).into_stdout());
        assert_err!(run("partial", None, Some("SIGKILL")).into_stdout());
    }

    #[test]
    fn test_missing_exit_code_is_accepted() {
        assert_ok!(run("ok", None, None).into_stdout());
    }

    #[tokio::test]
    async fn test_whitespace_only_output_is_a_failure() {
        let runner = FakeRunner::printing("  \n");
        let err = run_for_stdout(&runner, "process.stdout.write('')".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::SandboxExecutionFailure(_)));
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_for_stdout_submits_script_language() {
        let runner = FakeRunner::printing("https://cdn.example/a.mp4\n");
        let stdout = assert_ok!(run_for_stdout(&runner, "code".to_string()).await);
        assert_eq!(stdout, "https://cdn.example/a.mp4");
        assert_eq!(runner.submitted.lock().unwrap()[0].language, SCRIPT_LANGUAGE);
    }

    #[test]
    fn test_response_deserializes_with_null_signal() {
        let run: SandboxRun = serde_json::from_str(
            r#"{"stdout":"https://a/b.mp4","stderr":"","code":0,"signal":null,"output":"https://a/b.mp4"}"#,
        )
        .unwrap();
        assert_eq!(run.signal, None);
        assert_eq!(run.code, Some(0));
    }
}
