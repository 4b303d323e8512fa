//! Network-related error types

use std::borrow::Cow;
use std::fmt;

use crate::UserFacingError;
use thiserror::Error;

/// Classified cause of a failed network operation.
///
/// The kind is decided where the transport failure is raised and travels as
/// data; rendering happens only through `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum FailureKind {
    Timeout,
    ConnectionFailed,
    HttpStatus { code: u16 },
    TlsError,
    DnsFailure,
    Unclassified,
}

impl FailureKind {
    /// Whether a later attempt against the same endpoint could plausibly succeed.
    #[must_use]
    pub fn is_transient(self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed | Self::DnsFailure => true,
            Self::HttpStatus { code } => code == 429 || (500..600).contains(&code),
            Self::TlsError | Self::Unclassified => false,
        }
    }

    /// Stable, machine-friendly label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ConnectionFailed => "connection_failed",
            Self::HttpStatus { .. } => "http_status",
            Self::TlsError => "tls_error",
            Self::DnsFailure => "dns_failure",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::ConnectionFailed => f.write_str("connection failed"),
            Self::HttpStatus { code } => write!(f, "HTTP {code}"),
            Self::TlsError => f.write_str("SSL/TLS error"),
            Self::DnsFailure => f.write_str("DNS resolution failed"),
            Self::Unclassified => f.write_str("unclassified error"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum NetworkError {
    #[error("{kind} while requesting {url}")]
    RequestFailed { url: String, kind: FailureKind },

    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("HTTP error {status} for {url}")]
    HttpError { status: u16, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported protocol: {protocol}")]
    UnsupportedProtocol { protocol: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

impl NetworkError {
    /// Classified failure kind, when the error came from the transport.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::RequestFailed { kind, .. } => *kind,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::HttpError { status, .. } => FailureKind::HttpStatus { code: *status },
            _ => FailureKind::Unclassified,
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self.kind() {
            FailureKind::Timeout | FailureKind::ConnectionFailed => {
                Some("Check your network connection or try again later.")
            }
            FailureKind::DnsFailure => Some("Check DNS settings and the mirror host name."),
            FailureKind::TlsError => {
                Some("The mirror's certificate could not be verified; try another mirror.")
            }
            FailureKind::HttpStatus { .. } => {
                Some("The mirror rejected the request; another mirror may carry the file.")
            }
            FailureKind::Unclassified => match self {
                Self::InvalidUrl(_) | Self::UnsupportedProtocol { .. } => {
                    Some("Mirror URLs must be absolute http(s) URLs.")
                }
                _ => None,
            },
        }
    }

    fn is_retryable(&self) -> bool {
        self.kind().is_transient()
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::RequestFailed { kind, .. } => match kind {
                FailureKind::Timeout => "network.timeout",
                FailureKind::ConnectionFailed => "network.connection_failed",
                FailureKind::HttpStatus { .. } => "network.http_error",
                FailureKind::TlsError => "network.tls_error",
                FailureKind::DnsFailure => "network.dns_failure",
                FailureKind::Unclassified => "network.request_failed",
            },
            Self::Timeout { .. } => "network.timeout",
            Self::HttpError { .. } => "network.http_error",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::UnsupportedProtocol { .. } => "network.unsupported_protocol",
            Self::ClientBuild(_) => "network.client_build",
            Self::WriteFailed { .. } => "network.write_failed",
        };
        Some(code)
    }
}
