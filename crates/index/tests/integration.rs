//! Integration tests for index

#[cfg(test)]
mod tests {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use nbs_index::*;
    use nbs_types::MetadataKey;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_then_find() {
        let body = gzip(
            "Package: foo\r\nVersion: 1:2.0-1\r\nFilename: pool/main/f/foo/foo.deb\r\n\r\n",
        );
        let lines = decode_index(&body, "http://mirror/Packages.gz").unwrap();
        let entry = find_package(&lines, "foo").unwrap();
        assert_eq!(entry.version, "1:2.0-1");
        assert_eq!(entry.filename, "pool/main/f/foo/foo.deb");
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_corrupt() {
        let cache = MetadataCache::new();
        let key = MetadataKey {
            mirror_url: "http://mirror".into(),
            release: "bookworm".into(),
            arch: "amd64".into(),
            component: "main".into(),
        };

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache.insert(key, vec![format!("Package: writer-{i}")])
            }));
        }

        let mut stored = Vec::new();
        for handle in handles {
            stored.push(handle.await.unwrap());
        }

        assert_eq!(cache.len(), 1);
        let kept = cache.get(&key).unwrap();
        assert_eq!(kept.len(), 1);
        assert!(stored.iter().all(|lines| lines == &kept));
    }
}
