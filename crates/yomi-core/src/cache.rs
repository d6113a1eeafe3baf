use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::sync::OnceCell;
use yomi_types::Entry;

/// Session-wide lookup results keyed by exact candidate text.
///
/// The first write for a key is permanent. Misses (`valid == false`) are
/// stored as well so they are not fetched again. Concurrent fetches for the
/// same key share one in-flight request.
#[derive(Default)]
pub struct ResultCache {
    entries: DashMap<String, Entry>,
    in_flight: DashMap<String, Arc<OnceCell<Entry>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_none(&self, key: &str) -> Option<Entry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Returns true if this call performed the write
    pub fn put_if_absent(&self, key: &str, entry: Entry) -> bool {
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached entry for `key`, or the result of `fetch`.
    ///
    /// At most one `fetch` runs per key at a time; concurrent callers wait for
    /// it and receive the same entry. A failed fetch is not cached, and a
    /// waiting caller may retry it. The flag is true when this call's fetch
    /// was written to the cache.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<(Entry, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Entry, E>>,
    {
        if let Some(entry) = self.get_or_none(key) {
            return Ok((entry, false));
        }

        let cell = self.in_flight.entry(key.to_string()).or_default().clone();

        let mut wrote = false;
        let result = cell
            .get_or_try_init(|| async {
                // A previous flight may have finished between the check above
                // and registering this one
                if let Some(entry) = self.get_or_none(key) {
                    return Ok(entry);
                }
                let entry = match fetch().await {
                    Ok(entry) => entry,
                    Err(e) => return Err(e),
                };
                wrote = self.put_if_absent(key, entry.clone());
                Ok(entry)
            })
            .await
            .cloned();

        self.in_flight
            .remove_if(key, |_, current| Arc::ptr_eq(current, &cell));

        result.map(|entry| (entry, wrote))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn stomach() -> Entry {
        Entry::found("お腹", "おなか", "stomach", "Noun")
    }

    #[test]
    fn test_put_if_absent_first_writer_wins() {
        let cache = ResultCache::new();
        assert!(cache.put_if_absent("お腹", stomach()));
        assert!(!cache.put_if_absent("お腹", Entry::not_found()));
        assert!(!cache.put_if_absent("お腹", Entry::found("x", "y", "z", "")));
        assert_eq!(cache.get_or_none("お腹"), Some(stomach()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_round_trip_field_for_field() {
        let cache = ResultCache::new();
        let entry = Entry::found("食べる", "たべる", "to eat", "Ichidan verb, Transitive verb");
        cache.put_if_absent("食べる", entry.clone());

        let read = cache.get_or_none("食べる").unwrap();
        assert_eq!(read.valid, entry.valid);
        assert_eq!(read.surface, entry.surface);
        assert_eq!(read.reading, entry.reading);
        assert_eq!(read.meaning, entry.meaning);
        assert_eq!(read.part_of_speech, entry.part_of_speech);
    }

    #[test]
    fn test_misses_are_cached_and_keys_are_exact() {
        let cache = ResultCache::new();
        assert!(cache.is_empty());
        cache.put_if_absent("すいた", Entry::not_found());

        assert!(cache.contains("すいた"));
        assert!(!cache.get_or_none("すいた").unwrap().valid);
        assert!(cache.get_or_none("スイタ").is_none());
    }

    #[tokio::test]
    async fn test_get_or_fetch_uses_cache() {
        let cache = ResultCache::new();
        cache.put_if_absent("お腹", stomach());

        let (entry, wrote) = cache
            .get_or_fetch("お腹", || async { Ok::<_, Infallible>(Entry::not_found()) })
            .await
            .unwrap();
        assert_eq!(entry, stomach());
        assert!(!wrote);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_flight() {
        let cache = Arc::new(ResultCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("お腹", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, Infallible>(stomach())
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut writes = 0;
        for handle in handles {
            let (entry, wrote) = handle.await.unwrap();
            assert_eq!(entry, stomach());
            if wrote {
                writes += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(writes, 1);
        assert!(cache.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_does_not_overwrite_existing_entry() {
        let cache = ResultCache::new();
        let (first, wrote) = cache
            .get_or_fetch("が", || async { Ok::<_, Infallible>(Entry::not_found()) })
            .await
            .unwrap();
        assert!(!first.valid);
        assert!(wrote);

        let (second, wrote) = cache
            .get_or_fetch("が", || async { Ok::<_, Infallible>(stomach()) })
            .await
            .unwrap();
        assert!(!second.valid);
        assert!(!wrote);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = ResultCache::new();
        let failed = cache
            .get_or_fetch("お腹", || async { Err::<Entry, _>("timeout") })
            .await;
        assert_eq!(failed, Err("timeout"));
        assert!(!cache.contains("お腹"));

        let (entry, wrote) = cache
            .get_or_fetch("お腹", || async { Ok::<_, &str>(stomach()) })
            .await
            .unwrap();
        assert_eq!(entry, stomach());
        assert!(wrote);
    }
}
