use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the meta-commons library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("path section [{segment}] not found in [{path}]")]
    PathNotFound { path: String, segment: String },

    #[error("invalid path [{path}]: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("invalid metadata source: {0}")]
    InvalidSource(String),

    #[error("metadata section [{name}] already exists at [{path}], use update instead")]
    AlreadyExists { path: String, name: String },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("metadata at [{0}] is not iterable")]
    NotIterable(String),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn path_not_found(path: &str, segment: &str) -> Self {
        Error::PathNotFound {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }
}
