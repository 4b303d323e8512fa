//! Streamed artifact downloads

use futures::StreamExt;
use nbs_errors::{Error, NetworkError};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::classify::request_error;
use crate::client::NetClient;

/// Download `url` to `dest`, truncating any existing file.
///
/// The body is written through a buffer of the configured chunk size. On
/// failure the partial file is removed. Returns the number of bytes written.
///
/// # Errors
///
/// Returns a classified network error for transport or status failures and
/// an I/O error (carrying `dest`) if the file cannot be written.
pub async fn download_to_path(client: &NetClient, url: &str, dest: &Path) -> Result<u64, Error> {
    crate::parse_url(url)?;
    let response = client.get(url).await?;

    let result = stream_to_file(client, url, response, dest).await;
    if result.is_err() {
        // Best-effort cleanup
        let _ = tokio::fs::remove_file(dest).await;
    }
    result
}

async fn stream_to_file(
    client: &NetClient,
    url: &str,
    response: reqwest::Response,
    dest: &Path,
) -> Result<u64, Error> {
    let file = File::create(dest)
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;
    let mut writer = BufWriter::with_capacity(client.config().chunk_size, file);

    let chunk_timeout = client.config().timeout;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        match tokio::time::timeout(chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => {
                let chunk = chunk.map_err(|e| request_error(url, &e))?;
                writer
                    .write_all(&chunk)
                    .await
                    .map_err(|e| Error::io_with_path(&e, dest))?;
                written += chunk.len() as u64;
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

    writer
        .flush()
        .await
        .map_err(|e| Error::io_with_path(&e, dest))?;

    Ok(written)
}
