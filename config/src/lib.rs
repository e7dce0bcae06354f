//! Service configuration.
//!
//! Loaded once at startup from an optional TOML file, then overridden by the
//! environment:
//!
//! | Source | Setting |
//! |--------|---------|
//! | `IDCHECK_CONFIG` | Config file path (default `~/.idcheck/config.toml`) |
//! | `GEMINI_API_KEY` | Oracle credential, wins over `[api_keys].google` |
//! | `PORT` | Listen port |
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3001
//! cors_origins = ["http://localhost:3000"]
//! max_upload_bytes = 20971520
//!
//! [oracle]
//! model = "gemini-2.5-flash"
//! timeout_secs = 60
//!
//! [api_keys]
//! google = "${GEMINI_API_KEY}"
//! ```

use idcheck_providers::{DEFAULT_REQUEST_TIMEOUT_SECS, GEMINI_API_BASE_URL, OracleSettings};
use idcheck_types::{ApiKey, DEFAULT_MODEL, ModelName, ModelParseError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "IDCHECK_CONFIG";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const PORT_ENV: &str = "PORT";

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("PORT is not a valid port: {0:?}")]
    InvalidPort(String),
    #[error("invalid oracle model: {0}")]
    InvalidModel(#[from] ModelParseError),
    #[error("oracle timeout_secs must be greater than zero")]
    InvalidTimeout,
    #[error("no oracle API key: set GEMINI_API_KEY or [api_keys].google")]
    MissingApiKey,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the service with credentials.
    pub cors_origins: Vec<String>,
    /// Upper bound on the whole multipart body.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub model: String,
    pub timeout_secs: u64,
    pub base_url: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            base_url: GEMINI_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let google = if self.google.is_some() { "[REDACTED]" } else { "None" };
        f.debug_struct("ApiKeys").field("google", &google).finish()
    }
}

/// Replace `${VAR}` references with the variable's value (empty if unset).
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".idcheck").join("config.toml"))
}

impl ServiceConfig {
    /// Load the config file (if any) and apply process environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path() {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };
        config.with_env(|key| env::var(key).ok())
    }

    /// Parse a config file. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty()) {
            self.api_keys.google = Some(key);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        Ok(self)
    }

    pub fn resolve_api_key(&self) -> Result<ApiKey, ConfigError> {
        let raw = self.api_keys.google.as_deref().ok_or(ConfigError::MissingApiKey)?;
        ApiKey::new(expand_env_vars(raw)).map_err(|_| ConfigError::MissingApiKey)
    }

    pub fn model(&self) -> Result<ModelName, ConfigError> {
        Ok(ModelName::parse(&self.oracle.model)?)
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        if self.oracle.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(Duration::from_secs(self.oracle.timeout_secs))
    }

    /// Everything the oracle client needs, validated.
    pub fn oracle_settings(&self) -> Result<OracleSettings, ConfigError> {
        Ok(OracleSettings::new(self.resolve_api_key()?, self.model()?)
            .with_base_url(self.oracle.base_url.clone())
            .with_timeout(self.request_timeout()?))
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.server.cors_origins, ["http://localhost:3000"]);
        assert_eq!(config.server.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.model().unwrap().as_str(), "gemini-2.5-flash");
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 3001);
        assert!(config.api_keys.google.is_none());
    }

    #[test]
    fn parses_partial_file() {
        let file = write_config(
            r#"
            [server]
            port = 8080

            [oracle]
            model = "gemini-2.5-pro"
            timeout_secs = 15
            "#,
        );
        let config = ServiceConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model().unwrap().as_str(), "gemini-2.5-pro");
        assert_eq!(config.request_timeout().unwrap(), Duration::from_secs(15));
        assert_eq!(config.oracle.base_url, GEMINI_API_BASE_URL);
    }

    #[test]
    fn malformed_file_reports_path() {
        let file = write_config("[server\nport = ");
        let err = ServiceConfig::load_from_path(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn env_key_wins_over_file_key() {
        let file = write_config("[api_keys]\ngoogle = \"from-file\"\n");
        let config = ServiceConfig::load_from_path(file.path())
            .unwrap()
            .with_env(lookup(&[(API_KEY_ENV, "from-env")]))
            .unwrap();
        assert_eq!(config.resolve_api_key().unwrap().as_str(), "from-env");
    }

    #[test]
    fn blank_env_key_does_not_override() {
        let config = ServiceConfig {
            api_keys: ApiKeys {
                google: Some("from-file".to_string()),
            },
            ..ServiceConfig::default()
        }
        .with_env(lookup(&[(API_KEY_ENV, "  ")]))
        .unwrap();
        assert_eq!(config.resolve_api_key().unwrap().as_str(), "from-file");
    }

    #[test]
    fn missing_key_is_an_error() {
        let config = ServiceConfig::default().with_env(lookup(&[])).unwrap();
        assert!(matches!(
            config.resolve_api_key(),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            config.oracle_settings(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn port_env_override() {
        let config = ServiceConfig::default()
            .with_env(lookup(&[(PORT_ENV, "4000")]))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:4000");

        let err = ServiceConfig::default()
            .with_env(lookup(&[(PORT_ENV, "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(value) if value == "http"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ServiceConfig::default();
        config.oracle.timeout_secs = 0;
        assert!(matches!(
            config.request_timeout(),
            Err(ConfigError::InvalidTimeout)
        ));
    }

    #[test]
    fn non_gemini_model_is_rejected() {
        let mut config = ServiceConfig::default();
        config.oracle.model = "gpt-5.2".to_string();
        assert!(matches!(config.model(), Err(ConfigError::InvalidModel(_))));
    }

    #[test]
    fn oracle_settings_carry_resolved_values() {
        let mut config = ServiceConfig::default()
            .with_env(lookup(&[(API_KEY_ENV, "AIza-test")]))
            .unwrap();
        config.oracle.timeout_secs = 5;
        let settings = config.oracle_settings().unwrap();
        assert_eq!(settings.api_key.as_str(), "AIza-test");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.model.as_str(), DEFAULT_MODEL);
    }

    #[test]
    fn api_keys_debug_is_redacted() {
        let keys = ApiKeys {
            google: Some("AIza-secret".to_string()),
        };
        let debug = format!("{keys:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("hello world"), "hello world");
    }

    #[test]
    fn expand_env_vars_single_var() {
        unsafe {
            env::set_var("IDCHECK_TEST_EXPAND_VAR", "replaced");
        }
        assert_eq!(
            expand_env_vars("prefix ${IDCHECK_TEST_EXPAND_VAR} suffix"),
            "prefix replaced suffix"
        );
        unsafe {
            env::remove_var("IDCHECK_TEST_EXPAND_VAR");
        }
    }

    #[test]
    fn expand_env_vars_missing_var_becomes_empty() {
        unsafe {
            env::remove_var("IDCHECK_TEST_MISSING_VAR");
        }
        assert_eq!(
            expand_env_vars("before ${IDCHECK_TEST_MISSING_VAR} after"),
            "before  after"
        );
    }

    #[test]
    fn expand_env_vars_unclosed_brace_preserved() {
        assert_eq!(expand_env_vars("test ${UNCLOSED"), "test ${UNCLOSED");
    }

    #[test]
    fn expand_env_vars_empty_var_name_dropped() {
        assert_eq!(expand_env_vars("test ${} more"), "test  more");
    }
}
