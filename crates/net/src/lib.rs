#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for nbs
//!
//! This crate handles the HTTP side of resolution: fetching compressed
//! indexes into memory, streaming artifacts to disk, classifying transport
//! failures and pacing retries.

mod classify;
mod client;
mod download;
mod fetch;
mod retry;

pub use classify::{classify_error, failure_kind, is_network_error};
pub use client::{NetClient, NetConfig};
pub use download::download_to_path;
pub use fetch::fetch_bytes_streamed;
pub use retry::{Retried, RetryPolicy};

use nbs_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or uses a scheme other
/// than http or https.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::UnsupportedProtocol {
            protocol: other.to_string(),
        }
        .into()),
    }
}

/// Host part of a URL, or the input itself when it does not parse
#[must_use]
pub fn url_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
