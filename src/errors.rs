use std::path::PathBuf;
use thiserror::Error;

/// Error depicting errors that occur while loading and validating the configuration
///
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ConfigError::File: {0}")]
    File(#[from] std::io::Error),

    #[error("ConfigError::Document: {0}")]
    Document(#[from] toml::de::Error),

    #[error("ConfigError::Timezone: unknown timezone '{0}'")]
    Timezone(String),

    #[error("ConfigError::Locale: unknown locale '{0}'")]
    Locale(String),

    #[error("ConfigError::Format: invalid label format '{0}'")]
    Format(String),

    #[error("ConfigError::SelectedDay: {0}")]
    SelectedDay(#[from] chrono::ParseError),
}

/// Error depicting errors that occur while setting up log4rs
///
#[derive(Debug, Error)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);

impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(e.to_string()) }
}
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}

/// Error depicting errors that occur while locating and reading snapshot files
///
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no snapshot named '{name}' found in '{dir}'")]
    NotFound { dir: PathBuf, name: String },

    #[error("failed to read snapshot '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse snapshot '{0}'")]
    Document(PathBuf, #[source] serde_json::Error),

    #[error("malformed archive pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Error returned when a timestamp or date string can't be placed in time
///
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("unparsable timestamp '{0}'")]
    Unparsable(String),

    #[error("local time '{0}' does not exist in the source timezone")]
    NonExistent(String),
}
