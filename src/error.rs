//! # error
//!
//! Errors returned by the share browser and by the SMB transports

use std::fmt;

use thiserror::Error;

/// Result returned by [`crate::ShareBrowser`] operations
pub type BrowseResult<T> = Result<T, BrowseError>;

/// Result returned by transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Error returned by [`crate::ShareBrowser`].
///
/// Every failure of the underlying transport is mapped onto one of these
/// variants, so callers never have to deal with more than three kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrowseError {
    /// A required parameter was missing or blank. Raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The server rejected the credentials
    #[error("authentication failed, check your credentials: {0}")]
    Authentication(String),
    /// Unreachable host, I/O failure, missing share, wrong share kind or any
    /// other unclassified failure
    #[error("connection error: {0}")]
    Connection(String),
}

impl BrowseError {
    pub(crate) fn invalid_argument<S: ToString>(msg: S) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    pub(crate) fn authentication<S: ToString>(msg: S) -> Self {
        Self::Authentication(msg.to_string())
    }

    pub(crate) fn connection<S: ToString>(msg: S) -> Self {
        Self::Connection(msg.to_string())
    }
}

/// Failure category reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Host could not be reached, or refused the transport connection
    Unreachable,
    /// Logon failure or access denied
    AuthenticationFailed,
    /// Share not found or invalid network name
    ShareNotFound,
    /// Any other I/O failure during the session
    Io,
    /// Unclassified failure
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unreachable => "host unreachable",
            Self::AuthenticationFailed => "authentication failed",
            Self::ShareNotFound => "share not found",
            Self::Io => "i/o error",
            Self::Other => "unexpected error",
        };
        f.write_str(s)
    }
}

/// Error reported by an SMB transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    kind: TransportErrorKind,
    detail: String,
}

impl TransportError {
    /// Instantiates a new `TransportError` with its detail message
    pub fn new<S: ToString>(kind: TransportErrorKind, detail: S) -> Self {
        Self {
            kind,
            detail: detail.to_string(),
        }
    }

    /// Get the error category
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Get the diagnostic message
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
