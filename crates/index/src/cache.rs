//! Process-wide cache of decoded index lines

use dashmap::DashMap;
use nbs_types::MetadataKey;
use std::sync::Arc;

/// Decoded `Packages` lines keyed by `(mirror, release, arch, component)`.
///
/// Clones share storage. Entries are never invalidated during a run. When
/// two probes race on the same key the first insert is kept and the
/// later one is handed back the stored lines.
#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    entries: Arc<DashMap<MetadataKey, Arc<[String]>>>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &MetadataKey) -> Option<Arc<[String]>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Store lines for `key` unless already present; returns the stored lines
    pub fn insert(&self, key: MetadataKey, lines: Vec<String>) -> Arc<[String]> {
        let entry = self.entries.entry(key).or_insert_with(|| lines.into());
        Arc::clone(entry.value())
    }

    #[must_use]
    pub fn contains(&self, key: &MetadataKey) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(mirror: &str) -> MetadataKey {
        MetadataKey {
            mirror_url: mirror.into(),
            release: "bookworm".into(),
            arch: "amd64".into(),
            component: "main".into(),
        }
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = MetadataCache::new();
        let first = cache.insert(key("a"), vec!["Package: one".into()]);
        let second = cache.insert(key("a"), vec!["Package: two".into()]);

        assert_eq!(&*first, &["Package: one".to_string()]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = MetadataCache::new();
        let clone = cache.clone();
        clone.insert(key("b"), Vec::new());
        assert!(cache.contains(&key("b")));
        assert!(cache.get(&key("c")).is_none());
    }
}
