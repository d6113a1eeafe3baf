use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use yomi_config::resolver::ResolverConfig;
use yomi_core::cache::ResultCache;
use yomi_core::lookup::{Lookup, LookupStats, StatsSnapshot, ThrottleGate};
use yomi_types::{Entry, Match, ResolveEvent};

use crate::candidates::CandidateGenerator;
use crate::particles::strip_trailing_particle;

/// Resolves a tapped offset to the longest dictionary word starting there.
///
/// Tiers: the session cache, then `lookup` (local dictionaries and the remote
/// service). Results of every fetch are written to the cache, first writer
/// wins.
pub struct DefinitionResolver {
    cache: Arc<ResultCache>,
    lookup: Arc<dyn Lookup>,
    stats: LookupStats,
    throttle: Duration,
    good_enough_len: usize,
    preload_max_len: usize,
}

impl DefinitionResolver {
    pub fn new(cache: Arc<ResultCache>, lookup: Arc<dyn Lookup>, config: &ResolverConfig) -> Self {
        Self {
            cache,
            lookup,
            stats: LookupStats::default(),
            throttle: config.throttle(),
            good_enough_len: config.good_enough_len,
            preload_max_len: config.preload_max_len,
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Publish interim best matches for the word at `clicked_index` (a char
    /// offset of `full_text`), then exactly one `Final` or `NotFound`.
    /// Returns the final best match.
    pub async fn resolve_at(
        &self,
        full_text: &str,
        clicked_index: usize,
        publish: &AsyncSender<ResolveEvent>,
    ) -> Option<Match> {
        let generator = CandidateGenerator::new(full_text);
        let mut best = Best::default();

        // Cache only; runs to the script boundary
        for candidate in generator.candidates_from(clicked_index, None) {
            let cleaned = strip_trailing_particle(&candidate.text);
            if cleaned.is_empty() {
                continue;
            }

            for key in keys(cleaned, &candidate.text) {
                let Some(entry) = self.cache.get_or_none(key) else {
                    continue;
                };
                self.stats.record_cache_hit();
                if let Some(found) = best.offer(key, clicked_index, entry) {
                    send(publish, ResolveEvent::Interim(found)).await;
                }
            }
        }

        if best.is_none() {
            tracing::debug!(
                "No cached match at {} in '{}', falling back to lookup",
                clicked_index,
                full_text
            );

            'scan: for candidate in generator.candidates_from(clicked_index, None) {
                let cleaned = strip_trailing_particle(&candidate.text);
                if cleaned.is_empty() {
                    continue;
                }

                // One throttle per step, paid only if a request goes remote
                let gate = ThrottleGate::new(self.throttle);
                for key in keys(cleaned, &candidate.text) {
                    let entry = match self.cache.get_or_none(key) {
                        Some(entry) => {
                            self.stats.record_cache_hit();
                            entry
                        }
                        None => self.fetch(key, &gate).await,
                    };

                    if let Some(found) = best.offer(key, clicked_index, entry) {
                        send(publish, ResolveEvent::Interim(found)).await;
                        if best.len >= self.good_enough_len {
                            break 'scan;
                        }
                    }
                }
            }
        }

        let result = best.found;
        match &result {
            Some(found) => {
                tracing::debug!("Resolved '{}' at {}", found.word, clicked_index);
                send(publish, ResolveEvent::Final(found.clone())).await;
            }
            None => {
                tracing::debug!("No definition at {} in '{}'", clicked_index, full_text);
                send(publish, ResolveEvent::NotFound).await;
            }
        }
        result
    }

    /// Warm the cache with every particle-stripped candidate of `line`,
    /// without throttling
    pub async fn preload(&self, line: &str) {
        let generator = CandidateGenerator::new(line);
        let mut fetched = 0usize;

        for start in 0..generator.len() {
            for candidate in generator.candidates_from(start, Some(self.preload_max_len)) {
                let cleaned = strip_trailing_particle(&candidate.text);
                if cleaned.is_empty() || self.cache.contains(cleaned) {
                    continue;
                }
                self.fetch(cleaned, &ThrottleGate::open()).await;
                fetched += 1;
            }
        }

        tracing::debug!("Preloaded {} candidates from '{}'", fetched, line);
    }

    /// Fetch through the cache's single-flight path. Failures come back as a
    /// miss and are not cached.
    async fn fetch(&self, word: &str, gate: &ThrottleGate) -> Entry {
        let result = self
            .cache
            .get_or_fetch(word, || async {
                let result = self.lookup.lookup_gated(word, gate).await;
                self.stats.record_fetch(&result);
                result
            })
            .await;

        match result {
            Ok((entry, _)) => entry,
            Err(e) => {
                tracing::warn!("Lookup of '{}' via {} failed: {}", word, self.lookup.name(), e);
                Entry::not_found()
            }
        }
    }
}

/// Cleaned form first; the raw candidate only when it differs
fn keys<'a>(cleaned: &'a str, raw: &'a str) -> impl Iterator<Item = &'a str> {
    std::iter::once(cleaned).chain((cleaned != raw).then_some(raw))
}

async fn send(publish: &AsyncSender<ResolveEvent>, event: ResolveEvent) {
    if let Err(e) = publish.send(event).await {
        tracing::debug!("Resolve event dropped: {e}");
    }
}

#[derive(Default)]
struct Best {
    found: Option<Match>,
    len: usize,
}

impl Best {
    fn is_none(&self) -> bool {
        self.found.is_none()
    }

    /// Take `entry` if it is valid and strictly longer than the current best
    fn offer(&mut self, word: &str, start: usize, entry: Entry) -> Option<Match> {
        if !entry.valid {
            return None;
        }
        let len = word.chars().count();
        if len <= self.len {
            return None;
        }

        let found = Match {
            word: word.to_string(),
            start,
            entry,
        };
        self.len = len;
        self.found = Some(found.clone());
        Some(found)
    }
}
