//! Error types for the client library.

use thiserror::Error;

use crate::domain::BucketKind;

/// Local validation failures; none of these reach the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown subject: {0}")]
    UnknownSubject(String),
    #[error("unknown upload section: {0}")]
    UnknownBucket(String),
    #[error("{rejected} of {total} files in the {bucket} batch are not images")]
    NonImageBatch {
        bucket: BucketKind,
        rejected: usize,
        total: usize,
    },
    #[error("no file at index {index} in {bucket} (holds {len})")]
    IndexOutOfRange {
        bucket: BucketKind,
        index: usize,
        len: usize,
    },
}

/// Failures talking to the rubric service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success status. `detail` is the server's `detail` field when the body had one.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("<no detail>"))]
    Status {
        status: u16,
        detail: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid multipart part: {0}")]
    InvalidPart(String),
}

impl ApiError {
    /// Server-provided text, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
