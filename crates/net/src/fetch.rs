//! In-memory fetches

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use nbs_errors::{Error, NetworkError};

use crate::classify::request_error;
use crate::client::NetClient;

/// Fetch a response body into memory, streaming it chunk by chunk.
///
/// Each chunk must arrive within the client timeout.
///
/// # Errors
///
/// Returns a classified network error if the request fails, the status is
/// not 2xx, or the body stalls or breaks off.
pub async fn fetch_bytes_streamed(client: &NetClient, url: &str) -> Result<Bytes, Error> {
    crate::parse_url(url)?;
    let response = client.get(url).await?;

    let capacity = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    let mut body = BytesMut::with_capacity(capacity);

    let chunk_timeout = client.config().timeout;
    let mut stream = response.bytes_stream();

    loop {
        match tokio::time::timeout(chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => {
                let chunk = chunk.map_err(|e| request_error(url, &e))?;
                body.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(_) => {
                return Err(NetworkError::Timeout {
                    url: url.to_string(),
                }
                .into());
            }
        }
    }

    Ok(body.freeze())
}
