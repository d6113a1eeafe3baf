use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_throttle_ms() -> u64 {
    80
}

fn default_good_enough_len() -> usize {
    5
}

fn default_preload_max_len() -> usize {
    10
}

fn default_workers() -> usize {
    8
}

fn default_preload_workers() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Delay before each fallback step that goes to the network
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Fallback search stops once the best match is at least this long
    #[serde(default = "default_good_enough_len")]
    pub good_enough_len: usize,
    /// Longest candidate considered when warming the cache
    #[serde(default = "default_preload_max_len")]
    pub preload_max_len: usize,
    /// Maximum concurrent tap resolutions
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Maximum concurrent cache-warming tasks, separate from `workers`
    #[serde(default = "default_preload_workers")]
    pub preload_workers: usize,
}

impl ResolverConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            good_enough_len: default_good_enough_len(),
            preload_max_len: default_preload_max_len(),
            workers: default_workers(),
            preload_workers: default_preload_workers(),
        }
    }
}
