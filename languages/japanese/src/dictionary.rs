use std::collections::HashMap;

use serde::Deserialize;
use yomi_core::lookup::{Lookup, LookupError};
use yomi_types::Entry;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// JMdict dictionary entry
#[derive(Debug, Clone)]
pub struct JMdictEntry {
    pub id: String,
    pub kanji: Vec<String>,
    pub readings: Vec<String>,
    pub meanings: Vec<String>,
    pub pos: Vec<String>,
}

impl JMdictEntry {
    pub fn headword(&self) -> &str {
        self.kanji
            .first()
            .or_else(|| self.readings.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn to_entry(&self) -> Entry {
        let mut pos = self.pos.clone();
        pos.dedup();
        Entry::found(
            self.headword(),
            self.readings.first().cloned().unwrap_or_default(),
            self.meanings.join("; "),
            pos.join(", "),
        )
    }
}

// JSON structures for parsing jmdict-simplified format
#[derive(Debug, Deserialize)]
struct JMdictJson {
    words: Vec<JMdictJsonEntry>,
}

#[derive(Debug, Deserialize)]
struct JMdictJsonEntry {
    id: String,
    #[serde(default)]
    kanji: Vec<TextElement>,
    #[serde(default)]
    kana: Vec<TextElement>,
    sense: Vec<Sense>,
}

#[derive(Debug, Deserialize)]
struct TextElement {
    text: String,
}

#[derive(Debug, Deserialize)]
struct Sense {
    #[serde(rename = "partOfSpeech", default)]
    part_of_speech: Vec<String>,
    gloss: Vec<Gloss>,
}

#[derive(Debug, Deserialize)]
struct Gloss {
    lang: String,
    text: String,
}

/// In-memory JMdict, indexed by headword and by reading
#[derive(Default)]
pub struct JMdict {
    entries: Vec<JMdictEntry>,
    kanji_index: HashMap<String, Vec<usize>>,
    reading_index: HashMap<String, Vec<usize>>,
}

impl JMdict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load JMdict from JSON string (jmdict-simplified format)
    pub fn from_json(json_str: &str) -> Result<Self, LoadError> {
        let data: JMdictJson = serde_json::from_str(json_str)?;

        let mut dict = Self::new();
        for json_entry in data.words {
            let mut meanings = Vec::new();
            let mut pos = Vec::new();

            for sense in &json_entry.sense {
                // Only use English glosses
                meanings.extend(
                    sense
                        .gloss
                        .iter()
                        .filter(|g| g.lang == "eng")
                        .map(|g| g.text.clone()),
                );
                pos.extend(sense.part_of_speech.iter().cloned());
            }

            if meanings.is_empty() {
                continue;
            }

            dict.push(JMdictEntry {
                id: json_entry.id,
                kanji: json_entry.kanji.into_iter().map(|k| k.text).collect(),
                readings: json_entry.kana.into_iter().map(|k| k.text).collect(),
                meanings,
                pos,
            });
        }

        Ok(dict)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Merge another dictionary into this one.
    /// Entries from `other` replace entries with the same ID.
    pub fn merge(self, other: JMdict) -> Self {
        let mut replaced: HashMap<String, JMdictEntry> = other
            .entries
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

        let mut merged = Self::new();
        for entry in self.entries {
            match replaced.remove(&entry.id) {
                Some(newer) => merged.push(newer),
                None => merged.push(entry),
            }
        }
        let mut rest: Vec<JMdictEntry> = replaced.into_values().collect();
        rest.sort_by(|a, b| a.id.cmp(&b.id));
        for entry in rest {
            merged.push(entry);
        }

        merged
    }

    /// Entries whose headword or reading equals `query`, in load order
    pub fn lookup_exact(&self, query: &str) -> Vec<&JMdictEntry> {
        let mut indices: Vec<usize> = Vec::new();
        if let Some(found) = self.kanji_index.get(query) {
            indices.extend(found);
        }
        if let Some(found) = self.reading_index.get(query) {
            indices.extend(found);
        }

        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .filter_map(|idx| self.entries.get(idx))
            .collect()
    }

    fn push(&mut self, entry: JMdictEntry) {
        let idx = self.entries.len();
        for k in &entry.kanji {
            self.kanji_index.entry(k.clone()).or_default().push(idx);
        }
        for r in &entry.readings {
            self.reading_index.entry(r.clone()).or_default().push(idx);
        }
        self.entries.push(entry);
    }
}

#[async_trait::async_trait]
impl Lookup for JMdict {
    async fn lookup(&self, word: &str) -> Result<Entry, LookupError> {
        Ok(self
            .lookup_exact(word)
            .first()
            .map(|e| e.to_entry())
            .unwrap_or_else(Entry::not_found))
    }

    fn name(&self) -> &str {
        "jmdict"
    }
}
