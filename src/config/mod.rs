use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    /// Base URL of the Piston-compatible code runner.
    pub sandbox_endpoint: String,
    /// Runtime version to request; looked up from the runner when unset.
    pub sandbox_version: Option<String>,
    pub request_timeout_secs: u64,
    /// Zero disables the per-resolver limit.
    pub resolver_timeout_secs: u64,
    /// Zero disables the overall deadline.
    pub total_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            sandbox_endpoint: "https://emkc.org/api/v2/piston".to_string(),
            sandbox_version: None,
            request_timeout_secs: 30,
            resolver_timeout_secs: 60,
            total_timeout_secs: 180,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resolver_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.resolver_timeout_secs)
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.total_timeout_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.sandbox_endpoint, "https://emkc.org/api/v2/piston");
        assert_eq!(config.resolver_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(config.total_timeout(), Some(Duration::from_secs(180)));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sandbox_version = \"18.15.0\"").unwrap();
        writeln!(file, "total_timeout_secs = 0").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.sandbox_version.as_deref(), Some("18.15.0"));
        assert_eq!(config.total_timeout(), None);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = \"soon\"").unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }
}
