//! Error types for the audit trail
//!
//! Access decisions never fail; only the audit side (configuration, writing,
//! offline reading) produces errors.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, AuditError>;

/// Which of the two audit streams an error relates to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    /// Data-access events (GDPR trail)
    Access,
    /// Security events (NIS2 trail)
    Security,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stream::Access => write!(f, "access"),
            Stream::Security => write!(f, "security"),
        }
    }
}

/// Failures surfaced by the audit sink, its configuration and the log reader
#[derive(Debug, Error)]
pub enum AuditError {
    /// The append target could not be opened or written
    #[error("{stream} log write failed at {}: {source}", path.display())]
    Io {
        stream: Stream,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded as JSON
    #[error("failed to serialize audit record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Destination configuration is unusable; raised at construction time
    #[error("invalid audit configuration for {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A stored line could not be decoded by the offline reader
    #[error("malformed record at {}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl AuditError {
    pub(crate) fn io(stream: Stream, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::Io {
            stream,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AuditError::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the failure came from the underlying storage
    pub fn is_write_failure(&self) -> bool {
        matches!(self, AuditError::Io { .. })
    }
}
