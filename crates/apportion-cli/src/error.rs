//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Category not in the policy's catalog.
    #[error("Unknown {catalog} category: {input}")]
    UnknownCategory {
        /// Catalog searched.
        catalog: String,
        /// What the user typed.
        input: String,
    },

    /// Missing required argument.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// The stored snapshot breaks the policy.
    #[error("{entity} has {count} violation(s)")]
    InvalidSnapshot {
        /// Entity checked.
        entity: String,
        /// Number of violations.
        count: usize,
    },

    /// The edit was refused.
    #[error("Edit rejected ({code}): {message}")]
    Rejected {
        /// Machine-readable rejection code.
        code: &'static str,
        /// Human-readable reason.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] apportion_config::ConfigError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] apportion_core::StoreError),

    /// Snapshot error.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] apportion_core::SnapshotError),
}

impl<C: std::fmt::Display> From<apportion_core::Rejection<C>> for CliError {
    fn from(rejection: apportion_core::Rejection<C>) -> Self {
        Self::Rejected {
            code: rejection.code(),
            message: rejection.to_string(),
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
