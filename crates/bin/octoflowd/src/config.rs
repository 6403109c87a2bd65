//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `octoflow.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// GitHub API settings.
    pub github: GitHubConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// GitHub API access.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token. Anonymous access is rate limited and read-only.
    pub token: Option<String>,
    /// API root override for GitHub Enterprise Server.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from `octoflow.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("octoflow.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides looked up by variable name.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("OCTOFLOW_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("OCTOFLOW_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("OCTOFLOW_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("OCTOFLOW_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("OCTOFLOW_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("GITHUB_TOKEN").filter(|token| !token.is_empty()) {
            self.github.token = Some(val);
        }
        if let Some(val) = var("OCTOFLOW_GITHUB_API_URL") {
            self.github.api_url = Some(val);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.github.api_url.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Validation(
                "github api_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:octoflow.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "octoflowd=info,octoflow=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:octoflow.db?mode=rwc");
        assert!(config.github.token.is_none());
        assert!(config.github.api_url.is_none());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [github]
            token = 'ghp_example'
            api_url = 'https://github.example.com/api/v3'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.github.token.as_deref(), Some("ghp_example"));
        assert_eq!(
            config.github.api_url.as_deref(),
            Some("https://github.example.com/api/v3")
        );
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_override_file_values_from_environment() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("OCTOFLOW_HOST", "127.0.0.1"),
            ("OCTOFLOW_PORT", "8080"),
            ("OCTOFLOW_DATABASE_URL", "sqlite::memory:"),
            ("GITHUB_TOKEN", "ghp_env"),
            ("OCTOFLOW_GITHUB_API_URL", "https://ghe.example.com/api/v3"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.github.token.as_deref(), Some("ghp_env"));
        assert_eq!(
            config.github.api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
    }

    #[test]
    fn should_split_bind_override_into_host_and_port() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("OCTOFLOW_BIND", "localhost:4000")]));
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn should_ignore_unparsable_port_override() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("OCTOFLOW_PORT", "http")]));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_prefer_rust_log_over_octoflow_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("OCTOFLOW_LOG", "info"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_empty_github_token() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("GITHUB_TOKEN", "")]));
        assert!(config.github.token.is_none());
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_api_url() {
        let mut config = Config::default();
        config.github.api_url = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_default_configuration() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
