//! Gloss → sign asset lexicon.
//!
//! The lexicon file is a JSON object keyed by gloss:
//!
//! ```json
//! { "hello": { "label": "HELLO", "asset": "signs/hello.mp4", "dur_ms": 900 } }
//! ```
//!
//! Every entry field is optional. Keys whose value is not an entry object
//! (comments, fingerspelling tables) are skipped when loading.

use crate::defaults;
use crate::error::{Result, SonareError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

fn default_dur_ms() -> f64 {
    defaults::CLIP_DURATION_MS as f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Display label; the gloss itself when absent.
    #[serde(default)]
    pub label: Option<String>,
    /// Asset reference; entries without one never reach the final queue.
    #[serde(default)]
    pub asset: Option<String>,
    /// Nominal duration before rate scaling.
    #[serde(default = "default_dur_ms")]
    pub dur_ms: f64,
}

impl LexiconEntry {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            label: None,
            asset: Some(asset.into()),
            dur_ms: default_dur_ms(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_dur_ms(mut self, dur_ms: f64) -> Self {
        self.dur_ms = dur_ms;
        self
    }
}

/// Result of looking up one gloss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookupOutcome<'a> {
    Found(&'a LexiconEntry),
    Missing,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a lexicon file. Read and top-level parse failures are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| SonareError::LexiconRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| SonareError::LexiconParse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut lexicon = Self::new();
        let mut skipped = 0usize;
        for (key, value) in raw {
            if !value.is_object() {
                skipped += 1;
                continue;
            }
            match serde_json::from_value::<LexiconEntry>(value) {
                Ok(entry) => lexicon.insert(key, entry),
                Err(err) => {
                    skipped += 1;
                    debug!(key = %key, error = %err, "skipping lexicon entry");
                }
            }
        }
        debug!(
            path = %path.display(),
            entries = lexicon.len(),
            skipped,
            "lexicon loaded"
        );
        Ok(lexicon)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: LexiconEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Look up a gloss by its lowercase, exact, then uppercase key.
    pub fn lookup(&self, gloss: &str) -> LookupOutcome<'_> {
        let found = self
            .entries
            .get(&gloss.to_lowercase())
            .or_else(|| self.entries.get(gloss))
            .or_else(|| self.entries.get(&gloss.to_uppercase()));
        match found {
            Some(entry) => LookupOutcome::Found(entry),
            None => {
                trace!(gloss, "no lexicon entry");
                LookupOutcome::Missing
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, LexiconEntry)> for Lexicon {
    fn from_iter<T: IntoIterator<Item = (K, LexiconEntry)>>(iter: T) -> Self {
        let mut lexicon = Self::new();
        for (key, entry) in iter {
            lexicon.insert(key, entry);
        }
        lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_precedence() {
        let lexicon: Lexicon = [
            ("hello", LexiconEntry::new("lower.mp4")),
            ("HELLO", LexiconEntry::new("upper.mp4")),
            ("Thanks", LexiconEntry::new("exact.mp4")),
            ("WORLD", LexiconEntry::new("world.mp4")),
        ]
        .into_iter()
        .collect();

        let asset = |gloss: &str| match lexicon.lookup(gloss) {
            LookupOutcome::Found(entry) => entry.asset.clone(),
            LookupOutcome::Missing => None,
        };
        assert_eq!(asset("HELLO").as_deref(), Some("lower.mp4"));
        assert_eq!(asset("Thanks").as_deref(), Some("exact.mp4"));
        assert_eq!(asset("world").as_deref(), Some("world.mp4"));
        assert_eq!(lexicon.lookup("MISSING"), LookupOutcome::Missing);
    }

    #[test]
    fn test_load_applies_defaults_and_skips_non_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicons.json");
        fs::write(
            &path,
            r#"{
                "hello": {"label": "HELLO", "asset": "signs/hello.mp4", "dur_ms": 900},
                "you": {"asset": "signs/you.mp4", "type": "clip"},
                "_comment": "not an entry",
                "_weights": [1, 2, 3],
                "bad": {"dur_ms": "slow"}
            }"#,
        )
        .unwrap();

        let lexicon = Lexicon::load(&path).unwrap();
        assert_eq!(lexicon.len(), 2);

        let LookupOutcome::Found(you) = lexicon.lookup("YOU") else {
            panic!("expected entry for YOU");
        };
        assert_eq!(you.label, None);
        assert_eq!(you.dur_ms, 1000.0);

        let LookupOutcome::Found(hello) = lexicon.lookup("HELLO") else {
            panic!("expected entry for HELLO");
        };
        assert_eq!(hello.dur_ms, 900.0);
        assert_eq!(hello.label.as_deref(), Some("HELLO"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Lexicon::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(SonareError::LexiconRead { .. })));
    }

    #[test]
    fn test_load_rejects_non_object_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicons.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            Lexicon::load(&path),
            Err(SonareError::LexiconParse { .. })
        ));
    }
}
