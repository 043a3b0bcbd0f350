use std::path::PathBuf;
use thiserror::Error;

/// Core library errors
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Volume unavailable at '{path}': {reason}")]
    VolumeUnavailable { path: PathBuf, reason: String },

    #[error("Inconsistent tree state: {0}")]
    InconsistentTreeState(String),

    #[error("Unexpected entry: expected {expected}, found {found}")]
    UnexpectedEntry {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Package source failed: {0}")]
    PackageSource(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write '{path}': {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ConfigError::Invalid("data_mount must not be empty".into());
        assert!(err.to_string().contains("data_mount"));
    }

    #[test]
    fn error_conversion() {
        let config_err = ConfigError::Invalid("test".into());
        let usage_err: UsageError = config_err.into();
        assert!(matches!(usage_err, UsageError::Config(_)));
    }

    #[test]
    fn volume_unavailable_names_path() {
        let err = UsageError::VolumeUnavailable {
            path: PathBuf::from("/cache"),
            reason: "ENOENT".into(),
        };
        assert!(err.to_string().contains("/cache"));
    }
}
