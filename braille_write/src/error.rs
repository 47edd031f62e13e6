use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading tables or writing a pattern.
#[derive(Error, Debug)]
pub enum WriteError {
    /// No character is mapped to this dot pattern.
    #[error("no character mapped to dots {0:?}")]
    NoMapping(String),

    #[error("cannot read braille table {path}: {source}")]
    TableIo {
        path:   PathBuf,
        source: io::Error,
    },

    #[error("malformed braille table {name}: {source}")]
    TableFormat {
        name:   String,
        source: serde_json::Error,
    },

    /// A `fingers` entry that is not a digit string.
    #[error("braille table {name} has invalid dot pattern {pattern:?}")]
    TablePattern {
        name:    String,
        pattern: String,
    },

    #[error("keystroke output failed: {0}")]
    Keys(#[from] io::Error),
}
