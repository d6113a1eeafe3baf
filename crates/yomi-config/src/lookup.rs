use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_remote_url() -> String {
    "https://jisho.org/api/v1/search/words".to_string()
}

fn default_request_timeout_ms() -> u64 {
    4000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Ask the remote service before the local dictionary
    #[serde(default)]
    pub prefer_remote: bool,
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// SQLite file with a `dict_index(kanji, reading, meaning)` table
    #[serde(default)]
    pub sqlite_path: Option<String>,
    /// jmdict-simplified JSON files, merged in order
    #[serde(default)]
    pub jmdict_paths: Vec<String>,
}

impl LookupConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            prefer_remote: false,
            remote_url: default_remote_url(),
            request_timeout_ms: default_request_timeout_ms(),
            sqlite_path: None,
            jmdict_paths: vec![],
        }
    }
}
