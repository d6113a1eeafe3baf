use std::path::Path;
use std::sync::Arc;

use yomi_config::lookup::LookupConfig;
use yomi_core::lookup::{Lookup, LookupError, ThrottleGate};
use yomi_types::Entry;

use crate::jisho::JishoClient;
use crate::loader::JMdictLoader;
use crate::sqlite::SqliteDictionary;

/// Local dictionaries and the remote service behind one `Lookup`.
///
/// Tiers are asked in preference order until one finds the word. If none
/// finds it, the result is a failure when any tier failed (so the miss is not
/// cached and a later lookup retries), otherwise a miss.
pub struct TieredLookup {
    local: Vec<Arc<dyn Lookup>>,
    remote: Option<Arc<dyn Lookup>>,
    prefer_remote: bool,
}

impl TieredLookup {
    pub fn new(
        local: Vec<Arc<dyn Lookup>>,
        remote: Option<Arc<dyn Lookup>>,
        prefer_remote: bool,
    ) -> Self {
        Self {
            local,
            remote,
            prefer_remote,
        }
    }

    /// Build the tiers described by `config`. Local dictionaries that fail to
    /// load are skipped with a warning.
    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let mut local: Vec<Arc<dyn Lookup>> = Vec::new();

        if let Some(path) = &config.sqlite_path {
            match SqliteDictionary::open(Path::new(path)) {
                Ok(dict) => local.push(Arc::new(dict)),
                Err(e) => tracing::warn!("Local dictionary {} unavailable: {}", path, e),
            }
        }

        if let Some(dict) = JMdictLoader::load_all(&config.jmdict_paths) {
            local.push(Arc::new(dict));
        }

        let remote: Option<Arc<dyn Lookup>> = if config.remote_url.is_empty() {
            None
        } else {
            Some(Arc::new(JishoClient::new(
                config.remote_url.clone(),
                config.request_timeout(),
            )?))
        };

        if local.is_empty() && remote.is_none() {
            tracing::warn!("No dictionaries configured, every lookup will miss");
        }

        Ok(Self::new(local, remote, config.prefer_remote))
    }

    fn tiers(&self) -> Vec<&Arc<dyn Lookup>> {
        let mut tiers: Vec<&Arc<dyn Lookup>> = self.local.iter().collect();
        if let Some(remote) = &self.remote {
            if self.prefer_remote {
                tiers.insert(0, remote);
            } else {
                tiers.push(remote);
            }
        }
        tiers
    }
}

#[async_trait::async_trait]
impl Lookup for TieredLookup {
    async fn lookup(&self, word: &str) -> Result<Entry, LookupError> {
        self.lookup_gated(word, &ThrottleGate::open()).await
    }

    /// The gate is passed only when the remote tier is about to be asked
    async fn lookup_gated(&self, word: &str, gate: &ThrottleGate) -> Result<Entry, LookupError> {
        let mut last_error = None;

        for tier in self.tiers() {
            match tier.lookup_gated(word, gate).await {
                Ok(entry) if entry.valid => {
                    tracing::debug!("'{}' found in {}", word, tier.name());
                    return Ok(entry);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("{} failed for '{}': {}", tier.name(), word, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(Entry::not_found()),
        }
    }

    fn name(&self) -> &str {
        "tiered"
    }

    fn is_remote(&self) -> bool {
        self.remote.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Records the order tiers are consulted in
    struct Tier {
        name: &'static str,
        knows: Option<&'static str>,
        fails: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait::async_trait]
    impl Lookup for Tier {
        async fn lookup(&self, word: &str) -> Result<Entry, LookupError> {
            self.log.lock().unwrap().push(self.name);
            if self.fails {
                return Err(LookupError::Status(500));
            }
            if self.knows == Some(word) {
                return Ok(Entry::found(word, "", self.name, ""));
            }
            Ok(Entry::not_found())
        }

        fn name(&self) -> &str {
            self.name
        }

        fn is_remote(&self) -> bool {
            self.name == "remote"
        }
    }

    fn tier(
        name: &'static str,
        knows: Option<&'static str>,
        fails: bool,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Arc<dyn Lookup> {
        Arc::new(Tier {
            name,
            knows,
            fails,
            log: log.clone(),
        })
    }

    #[tokio::test]
    async fn test_local_first_by_default() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lookup = TieredLookup::new(
            vec![tier("local", Some("お腹"), false, &log)],
            Some(tier("remote", Some("お腹"), false, &log)),
            false,
        );

        let entry = lookup.lookup("お腹").await.unwrap();
        assert_eq!(entry.meaning, "local");
        assert_eq!(*log.lock().unwrap(), ["local"]);
        assert!(lookup.is_remote());
    }

    #[tokio::test]
    async fn test_prefer_remote_and_fall_back_on_miss() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lookup = TieredLookup::new(
            vec![tier("local", Some("お腹"), false, &log)],
            Some(tier("remote", None, false, &log)),
            true,
        );

        let entry = lookup.lookup("お腹").await.unwrap();
        assert_eq!(entry.meaning, "local");
        assert_eq!(*log.lock().unwrap(), ["remote", "local"]);
    }

    #[tokio::test]
    async fn test_failure_without_a_hit_is_an_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let local_miss_remote_down = TieredLookup::new(
            vec![tier("local", None, false, &log)],
            Some(tier("remote", None, true, &log)),
            false,
        );
        assert!(matches!(
            local_miss_remote_down.lookup("お腹").await,
            Err(LookupError::Status(500))
        ));

        // a hit from a healthy tier still wins
        let local_hit_remote_down = TieredLookup::new(
            vec![tier("local", Some("お腹"), false, &log)],
            Some(tier("remote", None, true, &log)),
            true,
        );
        assert_eq!(local_hit_remote_down.lookup("お腹").await.unwrap().meaning, "local");

        let all_missed = TieredLookup::new(
            vec![tier("local", None, false, &log)],
            Some(tier("remote", None, false, &log)),
            false,
        );
        assert!(!all_missed.lookup("お腹").await.unwrap().valid);
    }

    #[tokio::test]
    async fn test_gate_passed_only_before_remote_tier() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lookup = TieredLookup::new(
            vec![tier("local", Some("お腹"), false, &log)],
            Some(tier("remote", Some("すく"), false, &log)),
            false,
        );

        let gate = ThrottleGate::new(Duration::from_millis(1));
        assert!(lookup.lookup_gated("お腹", &gate).await.unwrap().valid);
        assert!(!gate.has_waited());

        assert!(lookup.lookup_gated("すく", &gate).await.unwrap().valid);
        assert!(gate.has_waited());
    }

    #[tokio::test]
    async fn test_no_tiers_is_a_miss() {
        let lookup = TieredLookup::new(vec![], None, false);
        assert!(!lookup.lookup("お腹").await.unwrap().valid);
        assert!(!lookup.is_remote());
    }
}
