//! Error taxonomy for the MARE router.
//!
//! Only configuration can fail. Classification, decomposition and plan
//! building are total functions and have no error type of their own.

use std::path::PathBuf;

/// Errors raised while loading role definitions, rule tables or config files.
///
/// These surface at construction time so a caller can fail fast before any
/// task is routed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan role directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid role definition in {path}: {source}")]
    ParseRoleFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("role definition {path} is missing required field: {field}")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("invalid rule pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule {pattern:?} has an empty role")]
    EmptyRole { pattern: String },

    #[error("invalid TOML in {path}: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type for configuration-time operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Failure reported by a [`RoleRunner`](crate::routing::executor::RoleRunner).
///
/// Runner failures never abort dispatch; they become a failed `TaskResult`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    #[error("{role} failed task {task_id}: {reason}")]
    Failed {
        role: String,
        task_id: String,
        reason: String,
    },
}
