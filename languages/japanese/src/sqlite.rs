use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use yomi_core::lookup::{Lookup, LookupError};
use yomi_types::Entry;

use crate::dictionary::LoadError;

const LOOKUP_SQL: &str =
    "SELECT kanji, reading, meaning FROM dict_index WHERE kanji = ?1 OR reading = ?1 LIMIT 1";

/// Read-only local dictionary in a SQLite file with a
/// `dict_index(kanji, reading, meaning)` table
pub struct SqliteDictionary {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDictionary {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        // Fail early if the table is missing
        conn.prepare(LOOKUP_SQL)?;
        tracing::info!("Opened local dictionary {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn query(conn: &Connection, word: &str) -> rusqlite::Result<Entry> {
    let mut stmt = conn.prepare_cached(LOOKUP_SQL)?;
    let row = stmt
        .query_row([word], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })
        .optional()?;

    let entry = match row {
        Some((kanji, reading, Some(meaning))) if !meaning.is_empty() => Entry::found(
            kanji.filter(|k| !k.is_empty()).unwrap_or_else(|| word.to_string()),
            reading.unwrap_or_default(),
            meaning,
            "",
        ),
        _ => Entry::not_found(),
    };
    Ok(entry)
}

#[async_trait::async_trait]
impl Lookup for SqliteDictionary {
    async fn lookup(&self, word: &str) -> Result<Entry, LookupError> {
        let conn = self.conn.clone();
        let word = word.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| LookupError::Storage("connection lock poisoned".to_string()))?;
            query(&conn, &word).map_err(|e| LookupError::Storage(e.to_string()))
        })
        .await
        .map_err(|e| LookupError::Storage(e.to_string()))?
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
