use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use yomi_types::Entry;

/// Dictionary or remote lookup provider
#[async_trait::async_trait]
pub trait Lookup: Send + Sync {
    /// Look up a single word.
    ///
    /// `Ok` with an invalid entry is a normal miss; `Err` is a failure of the
    /// provider itself.
    async fn lookup(&self, word: &str) -> Result<Entry, LookupError>;

    /// Provider name for logs
    fn name(&self) -> &str;

    /// Whether a lookup may leave the machine (and should be throttled)
    fn is_remote(&self) -> bool {
        false
    }

    /// `lookup`, passing `gate` first if the request leaves the machine.
    ///
    /// Lookups combining several providers override this to pass the gate
    /// only before a remote provider is actually asked.
    async fn lookup_gated(&self, word: &str, gate: &ThrottleGate) -> Result<Entry, LookupError> {
        if self.is_remote() {
            gate.wait().await;
        }
        self.lookup(word).await
    }
}

/// Delay paid at most once, by the first remote request that passes it
#[derive(Debug)]
pub struct ThrottleGate {
    delay: Duration,
    passed: AtomicBool,
}

impl ThrottleGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            passed: AtomicBool::new(false),
        }
    }

    /// Never waits
    pub fn open() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn wait(&self) {
        if self.delay.is_zero() || self.passed.swap(true, Ordering::AcqRel) {
            return;
        }
        tokio::time::sleep(self.delay).await;
    }

    pub fn has_waited(&self) -> bool {
        self.passed.load(Ordering::Acquire)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Counters for diagnostics. Never affects resolution results.
#[derive(Debug, Default)]
pub struct LookupStats {
    cache_hits: AtomicU64,
    fetches: AtomicU64,
    found: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub fetches: u64,
    pub found: u64,
    pub misses: u64,
    pub failures: u64,
}

impl LookupStats {
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one provider call
    pub fn record_fetch(&self, result: &Result<Entry, LookupError>) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        match result {
            Ok(entry) if entry.valid => self.found.fetch_add(1, Ordering::Relaxed),
            Ok(_) => self.misses.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failures.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            found: self.found.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
