//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::ApiConfig;
use crate::backend::BackendConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: UpstreamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// VictoriaLogs backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_limit")]
    pub default_limit: String,

    #[serde(default = "default_org_header")]
    pub org_header: String,
}

fn default_backend_url() -> String {
    "http://vmauth:9428/select/logsql/query".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_limit() -> String {
    "100".to_string()
}

fn default_org_header() -> String {
    "X-Scope-OrgID".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
            default_limit: default_limit(),
            org_header: default_org_header(),
        }
    }
}

impl UpstreamConfig {
    /// Settings for the backend HTTP client
    pub fn client_config(&self) -> BackendConfig {
        BackendConfig {
            url: self.url.clone(),
            request_timeout_ms: self.request_timeout_secs.saturating_mul(1000),
            org_header: self.org_header.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Whether structured JSON log output was requested
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> (Self, LoadReport) {
        let mut config = Config::default();
        let mut report = LoadReport::default();
        config.apply_env_overrides(&mut report);
        (config, report)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<(Self, LoadReport), ConfigError> {
        let mut config = Self::load(path)?;
        let mut report = LoadReport {
            source: Some(path.to_path_buf()),
            ..Default::default()
        };
        config.apply_env_overrides(&mut report);
        Ok((config, report))
    }

    /// Load from default locations or environment
    pub fn load_default() -> (Self, LoadReport) {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("loki-bridge").join("config.toml")),
            Some(PathBuf::from("/etc/loki-bridge/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        Self::load_first(config_paths.iter().flatten())
    }

    /// Load the first candidate that exists and parses
    fn load_first<'a>(candidates: impl IntoIterator<Item = &'a PathBuf>) -> (Self, LoadReport) {
        let mut skipped = Vec::new();

        for path in candidates {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok((config, mut report)) => {
                        skipped.append(&mut report.warnings);
                        report.warnings = skipped;
                        return (config, report);
                    }
                    Err(e) => skipped.push(e.to_string()),
                }
            }
        }

        let (config, mut report) = Self::from_env();
        skipped.append(&mut report.warnings);
        report.warnings = skipped;
        (config, report)
    }

    /// Settings for the HTTP layer
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            default_limit: self.backend.default_limit.clone(),
            org_header: self.backend.org_header.clone(),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self, report: &mut LoadReport) {
        self.apply_overrides(|key| std::env::var(key).ok(), report);
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
        report: &mut LoadReport,
    ) {
        if let Some(host) = lookup("LOKI_BRIDGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("LOKI_BRIDGE_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => report
                    .warnings
                    .push(format!("Ignoring invalid LOKI_BRIDGE_PORT {:?}", port)),
            }
        }

        if let Some(url) = lookup("LOKI_BRIDGE_BACKEND_URL") {
            self.backend.url = url;
        }

        if let Some(level) = lookup("LOKI_BRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOKI_BRIDGE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Where a configuration came from and what was ignored while loading it.
///
/// Loading runs before the tracing subscriber exists, so diagnostics are
/// collected here and logged by [`LoadReport::log`] afterwards.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// File the configuration was read from; `None` for defaults
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Loki Bridge Configuration
#
# Environment variables override these settings:
# - LOKI_BRIDGE_HOST
# - LOKI_BRIDGE_PORT
# - LOKI_BRIDGE_BACKEND_URL
# - LOKI_BRIDGE_LOG_LEVEL
# - LOKI_BRIDGE_LOG_FORMAT

[server]
# Listen address
host = "0.0.0.0"

# Listen port (Loki's default)
port = 3100

[backend]
# VictoriaLogs LogsQL query endpoint
url = "http://vmauth:9428/select/logsql/query"

# Backend request timeout in seconds
request_timeout_secs = 30

# Limit used when the client sends none
default_limit = "100"

# Tenant header forwarded to the backend when present
org_header = "X-Scope-OrgID"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3100);
        assert_eq!(config.backend.url, "http://vmauth:9428/select/logsql/query");
        assert_eq!(config.backend.default_limit, "100");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3100);
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert_eq!(config.backend.org_header, "X-Scope-OrgID");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nurl = \"http://localhost:9428/select/logsql/query\"\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.url, "http://localhost:9428/select/logsql/query");
        assert_eq!(config.backend.default_limit, "100");
        assert_eq!(config.server.port, 3100);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"not a number\"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LOKI_BRIDGE_HOST", "127.0.0.1"),
            ("LOKI_BRIDGE_PORT", "8080"),
            ("LOKI_BRIDGE_BACKEND_URL", "http://vl:9428/select/logsql/query"),
            ("LOKI_BRIDGE_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        let mut report = LoadReport::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()), &mut report);
        assert!(report.warnings.is_empty());

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.url, "http://vl:9428/select/logsql/query");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut config = Config::default();
        let mut report = LoadReport::default();
        config.apply_overrides(
            |key| (key == "LOKI_BRIDGE_PORT").then(|| "http".to_string()),
            &mut report,
        );
        assert_eq!(config.server.port, 3100);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("LOKI_BRIDGE_PORT"));
    }

    #[test]
    fn test_load_first_reports_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let missing = dir.path().join("missing.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[server]\nport = \"not a number\"").unwrap();
        std::fs::write(&valid, "[server]\nhost = \"10.0.0.1\"").unwrap();

        let (config, report) = Config::load_first(&[broken, missing, valid.clone()]);
        assert_eq!(report.source, Some(valid));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("Failed to parse config file") && w.contains("broken.toml")));
        assert!(!config.server.host.is_empty());
    }

    #[test]
    fn test_load_first_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "not toml at all [").unwrap();

        let (_, report) = Config::load_first(&[broken]);
        assert_eq!(report.source, None);
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn test_derived_configs() {
        let config = Config::default();

        let client = config.backend.client_config();
        assert_eq!(client.request_timeout_ms, 30_000);
        assert_eq!(client.url, config.backend.url);

        let api = config.api_config();
        assert_eq!(api.addr(), "0.0.0.0:3100");
        assert_eq!(api.default_limit, "100");
    }
}
