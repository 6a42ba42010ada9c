//! Demo configuration
//!
//! Loaded from an optional file (TOML, YAML or JSON, chosen by extension) and
//! then from `TOKENWARD__*` environment variables, which win. Nested keys use
//! `__`, e.g. `TOKENWARD__OAUTH2__CLIENT_SECRET`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokenward_auth::{ClientCredentials, IntrospectionConfig};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TOKENWARD";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Configuration parsing error, including missing required values
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// Values present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] tokenward_auth::AuthError),
}

/// Top-level demo configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Authorization Server and relying party credentials (required)
    pub oauth2: ClientCredentials,

    /// Discovery and introspection tunables
    #[serde(default)]
    pub introspection: IntrospectionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerSettings {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DemoConfig {
    /// Load configuration from an optional file plus the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist or has an unsupported extension
    /// - Any `oauth2` value is missing
    /// - The issuer is not a usable URL or the client id/secret are empty
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration with a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }

            let format = match path.extension().and_then(|s| s.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("yaml") | Some("yml") => FileFormat::Yaml,
                Some("json") => FileFormat::Json,
                _ => return Err(ConfigError::UnsupportedFormat),
            };

            builder = builder.add_source(File::new(
                path.to_str().ok_or(ConfigError::UnsupportedFormat)?,
                format,
            ));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.oauth2.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Prefix nothing in the test environment sets
    const TEST_PREFIX: &str = "TOKENWARD_DEMO_TEST_UNSET";

    fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(
            ".toml",
            r#"
            [server]
            port = 8080

            [oauth2]
            issuer = "https://login.example.com/uas"
            client_id = "api"
            client_secret = "s3cr3t"

            [introspection]
            request_timeout_ms = 3000
            "#,
        );

        let config = DemoConfig::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.oauth2.client_id, "api");
        assert_eq!(config.oauth2.issuer.as_str(), "https://login.example.com/uas");
        assert_eq!(config.introspection.request_timeout_ms, 3000);
        assert_eq!(config.logging.level, "info");
        assert!(!format!("{:?}", config).contains("s3cr3t"));
    }

    #[test]
    fn test_load_json() {
        let file = write_config(
            ".json",
            r#"{
                "oauth2": {
                    "issuer": "https://login.example.com",
                    "client_id": "api",
                    "client_secret": "secret"
                },
                "logging": {"level": "debug", "json": true}
            }"#,
        );

        let config = DemoConfig::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap();
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn test_missing_oauth2_is_fatal() {
        let file = write_config(".toml", "[server]\nport = 8080\n");
        let err = DemoConfig::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_empty_client_id_is_invalid() {
        let file = write_config(
            ".toml",
            r#"
            [oauth2]
            issuer = "https://login.example.com"
            client_id = ""
            client_secret = "secret"
            "#,
        );
        let err = DemoConfig::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = DemoConfig::load_with_prefix(Some(Path::new("/nonexistent/demo.toml")), TEST_PREFIX)
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let file = write_config(".ini", "oauth2.issuer = x");
        let err = DemoConfig::load_with_prefix(Some(file.path()), TEST_PREFIX).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat));
    }
}
