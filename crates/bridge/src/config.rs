//! Bridge configuration loaded from a YAML file and environment variables.
//!
//! Environment variables override the file.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SLACK_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret
//!
//! ## Optional
//! - `SLACKBUILD_CONFIG` - YAML config file (default: ./config.yaml, skipped if absent)
//! - `SLACKBUILD_HOST` - Bind address (default: 0.0.0.0)
//! - `SLACKBUILD_PORT` or `PORT` - Listen port (default: 8080)
//! - `SLACK_CHANNEL` - Channel build notifications are posted to
//! - `SLACK_MAX_CONTENT_LENGTH` - Largest accepted Slack request body (default: 50000)
//! - `GCLOUD_PROJECT_ID` - Project `/builds` commands act on
//! - `GCLOUD_ACCESS_TOKEN` - Fixed OAuth token (default: metadata server)
//! - `GITHUB_URL` - Base URL for commit links, e.g. `https://github.com/my-org`
//! - `SLACKBUILD_TEMPLATES_DIR` - Message template directory (default: ./templates)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::slack::DEFAULT_MAX_CONTENT_LENGTH;

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const DEFAULT_TEMPLATES_DIR: &str = "./templates";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "8080";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Failed to read config file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Bridge configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub slack: SlackConfig,
    pub gcloud: GcloudConfig,
    /// Base URL for commit links; Cloud Source Repositories when unset
    pub github_url: Option<String>,
    /// Directory message templates are read from
    pub templates_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
}

/// Slack app configuration.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct SlackConfig {
    /// Slack bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Slack app signing secret for request verification.
    pub signing_secret: SecretString,
    /// Channel build notifications are posted to.
    pub channel: String,
    /// Largest accepted request body in bytes.
    pub max_content_length: usize,
    /// Template file per lowercase build status, plus `default`.
    pub templates: HashMap<String, String>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("signing_secret", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("max_content_length", &self.max_content_length)
            .field("templates", &self.templates)
            .finish()
    }
}

/// Google Cloud configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Default)]
pub struct GcloudConfig {
    /// Project `/builds` commands act on; commands report usage when empty.
    pub project_id: String,
    /// Fixed OAuth token. Fetched from the metadata server when unset.
    pub access_token: Option<SecretString>,
    /// Trigger alias to trigger ID.
    pub triggers: HashMap<String, String>,
}

impl std::fmt::Debug for GcloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcloudConfig")
            .field("project_id", &self.project_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("triggers", &self.triggers)
            .finish()
    }
}

// =============================================================================
// Config File
// =============================================================================

/// Contents of the YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub slack: FileSlackConfig,
    pub gcloud: FileGcloudConfig,
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSlackConfig {
    pub token: Option<String>,
    pub signing_secret: Option<String>,
    pub channel: Option<String>,
    pub webhook: FileWebhookConfig,
    pub templates: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileWebhookConfig {
    pub max_content_length: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileGcloudConfig {
    pub project_id: Option<String>,
    pub triggers: HashMap<String, String>,
}

impl FileConfig {
    /// Parse YAML config text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the text is not a valid config.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty file is an empty config
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::File` if the file cannot be read, or
    /// `ConfigError::Parse` if it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Like [`FileConfig::load`], but a missing file is an empty config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load_if_exists(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::File {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

impl BridgeConfig {
    /// Load configuration from the environment and the config file it names.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the config file cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Load configuration using `env` in place of the process environment.
    ///
    /// # Errors
    ///
    /// See [`BridgeConfig::from_env`].
    pub fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = match non_empty(env, "SLACKBUILD_CONFIG") {
            Some(path) => FileConfig::load(Path::new(&path))?,
            None => FileConfig::load_if_exists(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        Self::from_sources(file, env)
    }

    /// Combine a parsed config file with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required values are missing from both, or a
    /// value does not parse.
    pub fn from_sources(
        file: FileConfig,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host = non_empty(env, "SLACKBUILD_HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SLACKBUILD_HOST".to_string(), e.to_string()))?;

        let (port_var, port) = non_empty(env, "SLACKBUILD_PORT")
            .map(|port| ("SLACKBUILD_PORT", port))
            .or_else(|| non_empty(env, "PORT").map(|port| ("PORT", port)))
            .unwrap_or(("SLACKBUILD_PORT", DEFAULT_PORT.to_string()));
        let port = port
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar(port_var.to_string(), e.to_string()))?;

        let slack = SlackConfig::from_sources(file.slack, env)?;
        let gcloud = GcloudConfig::from_sources(file.gcloud, env);

        let github_url = non_empty(env, "GITHUB_URL")
            .or(file.github_url)
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string());

        let templates_dir = non_empty(env, "SLACKBUILD_TEMPLATES_DIR")
            .unwrap_or_else(|| DEFAULT_TEMPLATES_DIR.to_string())
            .into();

        Ok(Self {
            host,
            port,
            slack,
            gcloud,
            github_url,
            templates_dir,
            sentry_dsn: non_empty(env, "SENTRY_DSN"),
            sentry_environment: non_empty(env, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SlackConfig {
    fn from_sources(
        file: FileSlackConfig,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bot_token = required(env, "SLACK_TOKEN", file.token)?;
        let signing_secret = required(env, "SLACK_SIGNING_SECRET", file.signing_secret)?;

        // Weak secrets are reported but do not stop the bridge
        for (value, var_name) in [
            (&bot_token, "SLACK_TOKEN"),
            (&signing_secret, "SLACK_SIGNING_SECRET"),
        ] {
            if let Err(e) = validate_secret_strength(value, var_name) {
                tracing::warn!("{var_name} validation warning: {e}");
            }
        }

        let max_content_length = match non_empty(env, "SLACK_MAX_CONTENT_LENGTH") {
            Some(value) => value.parse::<usize>().map_err(|e| {
                ConfigError::InvalidEnvVar("SLACK_MAX_CONTENT_LENGTH".to_string(), e.to_string())
            })?,
            None => file
                .webhook
                .max_content_length
                .unwrap_or(DEFAULT_MAX_CONTENT_LENGTH),
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            signing_secret: SecretString::from(signing_secret),
            channel: non_empty(env, "SLACK_CHANNEL")
                .or(file.channel)
                .unwrap_or_default(),
            max_content_length,
            templates: file.templates,
        })
    }
}

impl GcloudConfig {
    fn from_sources(file: FileGcloudConfig, env: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            project_id: non_empty(env, "GCLOUD_PROJECT_ID")
                .or(file.project_id)
                .unwrap_or_default(),
            access_token: non_empty(env, "GCLOUD_ACCESS_TOKEN").map(SecretString::from),
            triggers: file.triggers,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable, treating the empty string as unset.
fn non_empty(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.is_empty())
}

/// Get a required value from the environment, falling back to the file.
fn required(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    file_value: Option<String>,
) -> Result<String, ConfigError> {
    non_empty(env, key)
        .or_else(|| file_value.filter(|value| !value.is_empty()))
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
