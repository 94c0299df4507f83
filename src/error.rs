//! Error types for tenant onboarding.

use std::path::PathBuf;

use crate::input::validate::ValidationErrors;

/// Top-level error type for onboarding operations.
///
/// Every variant here is fatal to the operation that raised it. Failures of
/// individual entities inside a batch are not errors; they are collected as
/// [`ItemFailure`](crate::onboarding::batch::ItemFailure) values instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Authentication required: log in to the platform before running onboarding operations")]
    AuthenticationRequired,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No onboarding session found for company {tenant_id}. Run onboarding_start first.")]
    NoSessionFound { tenant_id: u64 },

    #[error("Prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// State store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from the remote administrative API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Rejected by platform (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for onboarding operations.
pub type Result<T> = std::result::Result<T, Error>;
