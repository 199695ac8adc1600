//! Errors raised while resolving or materializing a pipeline
//!
//! Building a pipeline never fails. Every error below is produced while a
//! sequence is being pulled, and travels to the consumer as an `Err` element.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while a pipeline is materialized
#[derive(Debug, Error)]
pub enum SplashError {
    /// Neither the registry nor the built-in set knows this stage name.
    #[error("no such transform: '{0}'")]
    UnknownTransform(String),

    /// A stage parameter or an upstream item is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A directory root could not be walked.
    #[error("cannot walk {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// Configuration layering or deserialization failed.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl SplashError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SplashError::InvalidArgument(message.into())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, SplashError>;
