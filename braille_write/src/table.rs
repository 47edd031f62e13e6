//! Dot-pattern → text tables loaded from JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use braille_cell::BrailleCode;
use serde::Deserialize;
use tracing::debug;

use crate::error::WriteError;

const SIX_DOT_DE:   &str = include_str!("../tables/6_dot_de.json");
const EIGHT_DOT_DE: &str = include_str!("../tables/8_dot_de.json");

#[derive(Deserialize)]
struct Entry {
    fingers: String,
    c:       String,
}

/// Lookup table keyed by canonical dot pattern.
///
/// Patterns are normalized on load, so `"41"` and `"14"` name the same cell.
#[derive(Clone, Debug, Default)]
pub struct BrailleTable {
    name:    String,
    entries: HashMap<BrailleCode, String>,
}

impl BrailleTable {
    pub fn from_json(name: &str, json: &str) -> Result<Self, WriteError> {
        let rows: Vec<Entry> = serde_json::from_str(json)
            .map_err(|source| WriteError::TableFormat { name: name.to_string(), source })?;

        let mut entries = HashMap::with_capacity(rows.len());
        for row in rows {
            let code: BrailleCode = row.fingers.parse().map_err(|_| WriteError::TablePattern {
                name:    name.to_string(),
                pattern: row.fingers.clone(),
            })?;
            entries.insert(code, row.c);
        }
        debug!(table = name, entries = entries.len(), "braille table loaded");
        Ok(BrailleTable { name: name.to_string(), entries })
    }

    pub fn load(path: &Path) -> Result<Self, WriteError> {
        let json = fs::read_to_string(path)
            .map_err(|source| WriteError::TableIo { path: path.to_path_buf(), source })?;
        BrailleTable::from_json(&path.display().to_string(), &json)
    }

    /// German 6-dot Braille: letters, umlauts and common contractions.
    pub fn six_dot_german() -> Result<Self, WriteError> {
        BrailleTable::from_json("6_dot_de", SIX_DOT_DE)
    }

    /// German 8-dot computer Braille: letters, capitals via dot 7.
    pub fn eight_dot_german() -> Result<Self, WriteError> {
        BrailleTable::from_json("8_dot_de", EIGHT_DOT_DE)
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn lookup(&self, dots: &BrailleCode) -> Option<&str> {
        self.entries.get(dots).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
