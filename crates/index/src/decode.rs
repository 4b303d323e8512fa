//! Gzip decoding of `Packages.gz`

use flate2::read::GzDecoder;
use nbs_errors::{Error, IndexError};
use std::io::Read;

/// Decompress a gzip index body into its lines.
///
/// Invalid UTF-8 is replaced rather than rejected; only the `Package`,
/// `Version` and `Filename` fields matter and those are ASCII.
///
/// # Errors
///
/// Returns `IndexError::Decompress` if the body is not a complete gzip stream.
pub fn decode_index(body: &[u8], url: &str) -> Result<Vec<String>, Error> {
    let mut decoder = GzDecoder::new(body);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| IndexError::Decompress {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    Ok(String::from_utf8_lossy(&raw)
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_lines() {
        let body = gzip("Package: foo\nVersion: 1.0\n\nPackage: bar\n");
        let lines = decode_index(&body, "http://m/Packages.gz").unwrap();
        assert_eq!(lines, vec!["Package: foo", "Version: 1.0", "", "Package: bar"]);
    }

    #[test]
    fn test_garbage_is_decompress_error() {
        let err = decode_index(b"definitely not gzip", "http://m/Packages.gz").unwrap_err();
        assert!(matches!(
            err,
            Error::Index(IndexError::Decompress { ref url, .. }) if url == "http://m/Packages.gz"
        ));
    }

    #[test]
    fn test_truncated_stream_is_decompress_error() {
        let body = gzip(&"Package: foo\n".repeat(500));
        let truncated = &body[..body.len() / 2];
        assert!(decode_index(truncated, "http://m/Packages.gz").is_err());
    }
}
