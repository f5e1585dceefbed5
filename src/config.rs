//! Process configuration loaded from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `DATABASE_URL` | `PostgreSQL` connection string | unset |
//! | `JOBFLOW_MAX_WRITE_ATTEMPTS` | optimistic write attempts per job mutation | `5` |
//! | `JOBFLOW_LOG` | `tracing` filter directive | `info` |

use crate::intake::domain::QuestionMap;
use crate::job::services::WriteRetryConfig;
use thiserror::Error;

/// Environment variable holding the database URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the write attempt limit.
pub const MAX_WRITE_ATTEMPTS_VAR: &str = "JOBFLOW_MAX_WRITE_ATTEMPTS";
/// Environment variable holding the log filter.
pub const LOG_FILTER_VAR: &str = "JOBFLOW_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A variable required by the caller is unset.
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobflowConfig {
    /// Database connection string, if configured.
    pub database_url: Option<String>,
    /// Retry policy for job writes.
    pub write_retry: WriteRetryConfig,
    /// Filter directive for the log subscriber.
    pub log_filter: String,
    /// Question identifiers used by the submission transformer.
    pub questions: QuestionMap,
}

impl Default for JobflowConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            write_retry: WriteRetryConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            questions: QuestionMap::default(),
        }
    }
}

impl JobflowConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use jobflow::config::JobflowConfig;
    ///
    /// let config = JobflowConfig::from_lookup(|name| match name {
    ///     "JOBFLOW_MAX_WRITE_ATTEMPTS" => Some("8".to_owned()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.write_retry.max_attempts, 8);
    /// assert_eq!(config.log_filter, "info");
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self {
            database_url: read(DATABASE_URL_VAR),
            ..Self::default()
        };
        if let Some(raw) = read(MAX_WRITE_ATTEMPTS_VAR) {
            config.write_retry.max_attempts = parse_attempts(raw)?;
        }
        if let Some(filter) = read(LOG_FILTER_VAR) {
            config.log_filter = filter;
        }
        Ok(config)
    }

    /// Returns the database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))
    }
}

fn parse_attempts(raw: String) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            name: MAX_WRITE_ATTEMPTS_VAR,
            value: raw,
            reason: "must be at least 1",
        }),
        Ok(attempts) => Ok(attempts),
        Err(_) => Err(ConfigError::InvalidValue {
            name: MAX_WRITE_ATTEMPTS_VAR,
            value: raw,
            reason: "not a positive integer",
        }),
    }
}
