use std::path::Path;

use crate::dictionary::{JMdict, LoadError};

pub struct JMdictLoader;

impl JMdictLoader {
    /// Load dictionary from file path
    pub fn load_from_file(path: &Path) -> Result<JMdict, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.display().to_string()));
        }
        tracing::info!("Loading JMdict from file: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let dict = JMdict::from_json(&json)?;
        tracing::info!("Loaded {} dictionary entries from file", dict.entry_count());
        Ok(dict)
    }

    /// Load and merge every readable file in order; unreadable files are
    /// skipped with a warning. Returns None when nothing loaded.
    pub fn load_all(paths: &[String]) -> Option<JMdict> {
        let mut merged: Option<JMdict> = None;

        for path in paths {
            match Self::load_from_file(Path::new(path)) {
                Ok(dict) => {
                    merged = Some(match merged {
                        Some(base) => {
                            tracing::info!("Merging additional dictionary from: {}", path);
                            base.merge(dict)
                        }
                        None => dict,
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to load dictionary from {}: {}", path, e);
                }
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_all_skips_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "words": [ {{ "id": "1", "kana": [{{ "text": "ねこ" }}], "sense": [{{ "gloss": [{{ "lang": "eng", "text": "cat" }}] }}] }} ] }}"#
        )
        .unwrap();

        let paths = vec![
            "/nonexistent/jmdict.json".to_string(),
            file.path().display().to_string(),
        ];
        let dict = JMdictLoader::load_all(&paths).unwrap();
        assert_eq!(dict.entry_count(), 1);

        assert!(JMdictLoader::load_all(&paths[..1]).is_none());
    }

    #[test]
    fn test_missing_file_error() {
        let err = JMdictLoader::load_from_file(Path::new("/nonexistent/jmdict.json"));
        assert!(matches!(err, Err(LoadError::FileNotFound(_))));
    }
}
