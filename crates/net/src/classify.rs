//! Mapping transport failures onto `FailureKind`

use nbs_errors::{Error, FailureKind, NetworkError};
use std::error::Error as StdError;

const DNS_MARKERS: [&str; 5] = [
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "temporary failure in name resolution",
];

const TLS_MARKERS: [&str; 4] = ["certificate", "tls", "ssl", "handshake"];

/// Classify a reqwest error.
///
/// reqwest only exposes timeout, connect and status predicates, so DNS and
/// TLS failures are recognised from the messages of the source chain.
#[must_use]
pub fn classify_error(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        return FailureKind::Timeout;
    }
    if let Some(status) = error.status() {
        return FailureKind::HttpStatus {
            code: status.as_u16(),
        };
    }

    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return FailureKind::Timeout;
            }
        }
        let message = cause.to_string().to_ascii_lowercase();
        if DNS_MARKERS.iter().any(|marker| message.contains(marker)) {
            return FailureKind::DnsFailure;
        }
        if TLS_MARKERS.iter().any(|marker| message.contains(marker)) {
            return FailureKind::TlsError;
        }
        source = cause.source();
    }

    if error.is_connect() || error.is_body() || error.is_request() {
        FailureKind::ConnectionFailed
    } else {
        FailureKind::Unclassified
    }
}

/// Wrap a reqwest failure for `url` as a classified `NetworkError`.
pub(crate) fn request_error(url: &str, error: &reqwest::Error) -> Error {
    NetworkError::RequestFailed {
        url: url.to_string(),
        kind: classify_error(error),
    }
    .into()
}

/// Failure kind carried by any crate error.
///
/// Non-network errors (local I/O, internal) are `Unclassified`.
#[must_use]
pub fn failure_kind(error: &Error) -> FailureKind {
    match error {
        Error::Network(network) => network.kind(),
        _ => FailureKind::Unclassified,
    }
}

/// Whether the error was raised by the network layer at all.
#[must_use]
pub fn is_network_error(error: &Error) -> bool {
    matches!(error, Error::Network(_))
}
