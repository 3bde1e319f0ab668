//! Service configuration
//!
//! Built once at startup and passed by reference to the components that
//! need it. Nothing reads the environment after `main` has run.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_KEY_FILE: &str = "./keys/api.txt";
const DEFAULT_SLACK_OAUTH_URL: &str = "https://slack.com/api/oauth.v2.access";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Failed to read {path}: {source}")]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Model endpoint settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_concurrency: usize,
}

/// Slack app credentials and outbound HTTP settings
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub oauth_url: String,
    /// Bound on each call to Slack (OAuth exchange, `response_url` delivery)
    pub http_timeout: Duration,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            oauth_url: DEFAULT_SLACK_OAUTH_URL.to_string(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub llm: LlmConfig,
    pub slack: SlackConfig,
    /// Deadline for sessions that run detached from their request
    pub session_timeout: Duration,
    /// Largest `init_count` a caller may ask for
    pub max_turns: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            llm: LlmConfig {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                timeout: Duration::from_secs(120),
                max_concurrency: 8,
            },
            slack: SlackConfig::default(),
            session_timeout: Duration::from_secs(600),
            max_turns: 50,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = match var("GEMINI_API_KEY") {
            Some(key) => Some(key.trim().to_string()),
            None => match var("GEMINI_API_KEY_FILE") {
                Some(path) => Some(read_key_file(Path::new(&path))?),
                None => {
                    let fallback = Path::new(DEFAULT_KEY_FILE);
                    if fallback.is_file() {
                        Some(read_key_file(fallback)?)
                    } else {
                        None
                    }
                }
            },
        };

        let port = match var("PORT") {
            Some(v) => u16::try_from(parse_positive("PORT", &v)?).map_err(|_| {
                ConfigError::InvalidNumber {
                    name: "PORT",
                    value: v.clone(),
                }
            })?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            llm: LlmConfig {
                api_key: api_key.filter(|k| !k.is_empty()),
                model: var("GEMINI_MODEL").unwrap_or(defaults.llm.model),
                base_url: var("GEMINI_BASE_URL").unwrap_or(defaults.llm.base_url),
                timeout: seconds_or(&var, "LLM_TIMEOUT_SECS", defaults.llm.timeout)?,
                max_concurrency: match var("LLM_MAX_CONCURRENCY") {
                    Some(v) => usize::try_from(parse_positive("LLM_MAX_CONCURRENCY", &v)?)
                        .unwrap_or(usize::MAX),
                    None => defaults.llm.max_concurrency,
                },
            },
            slack: SlackConfig {
                client_id: var("SLACK_CLIENT_ID"),
                client_secret: var("SLACK_CLIENT_SECRET"),
                oauth_url: var("SLACK_OAUTH_URL").unwrap_or(defaults.slack.oauth_url),
                http_timeout: seconds_or(&var, "SLACK_TIMEOUT_SECS", defaults.slack.http_timeout)?,
            },
            session_timeout: seconds_or(&var, "SESSION_TIMEOUT_SECS", defaults.session_timeout)?,
            max_turns: match var("MAX_TURNS") {
                Some(v) => u32::try_from(parse_positive("MAX_TURNS", &v)?).map_err(|_| {
                    ConfigError::InvalidNumber {
                        name: "MAX_TURNS",
                        value: v.clone(),
                    }
                })?,
                None => defaults.max_turns,
            },
        })
    }
}

fn read_key_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| ConfigError::KeyFile {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

fn seconds_or(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match var(name) {
        Some(v) => parse_positive(name, &v).map(Duration::from_secs),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_explicit_values() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("GEMINI_API_KEY", " secret \n"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("LLM_TIMEOUT_SECS", "30"),
            ("LLM_MAX_CONCURRENCY", "2"),
            ("SESSION_TIMEOUT_SECS", "60"),
            ("SLACK_CLIENT_ID", "client"),
            ("SLACK_TIMEOUT_SECS", "3"),
            ("MAX_TURNS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert_eq!(config.llm.max_concurrency, 2);
        assert_eq!(config.session_timeout, Duration::from_secs(60));
        assert_eq!(config.slack.client_id.as_deref(), Some("client"));
        assert!(config.slack.client_secret.is_none());
        assert_eq!(config.slack.http_timeout, Duration::from_secs(3));
        assert_eq!(config.max_turns, 10);
    }

    #[test]
    fn test_key_file_used_when_env_key_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config =
            AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY_FILE", path.as_str())])).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_key_file_is_an_error() {
        let result = AppConfig::from_lookup(lookup_from(&[(
            "GEMINI_API_KEY_FILE",
            "/nonexistent/boardroom/key.txt",
        )]));
        assert!(matches!(result, Err(ConfigError::KeyFile { .. })));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        for (name, value) in [("PORT", "abc"), ("PORT", "70000"), ("MAX_TURNS", "0")] {
            let result = AppConfig::from_lookup(lookup_from(&[(name, value)]));
            assert!(
                matches!(result, Err(ConfigError::InvalidNumber { .. })),
                "{name}={value} should be rejected"
            );
        }
    }
}
