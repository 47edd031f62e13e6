//! # braille_write
//!
//! Write handlers turn a confirmed dot pattern (digits `1`–`8`, thumb control
//! digits already removed) into text and type it through a [`KeySink`].
//!
//! | Handler | Dots used | Extras |
//! |---|---|---|
//! | [`EightDotHandler`] | 1–8 | direct table lookup |
//! | [`SixDotHandler`]   | 1–6 | drops 7 and 8, capital sign `46` upper-cases the next letter |
//!
//! Tables are JSON arrays of `{"fingers": "<dots>", "c": "<text>"}`; German
//! 6-dot and 8-dot tables are built in.
//!
//! ```rust
//! use braille_write::{BrailleTable, SixDotHandler, WriteHandler};
//!
//! let table = BrailleTable::six_dot_german().unwrap();
//! let mut handler = SixDotHandler::new(table, Vec::<String>::new());
//! assert_eq!(handler.write(&"135".parse().unwrap()).unwrap(), "o");
//! assert_eq!(handler.keys(), &["o".to_string()]);
//! ```

pub mod error;
pub mod handler;
pub mod keys;
pub mod table;

pub use error::WriteError;
pub use handler::{EightDotHandler, SixDotHandler, WriteHandler, CAPITAL_ANNOUNCEMENT};
pub use keys::{KeySink, NullKeys, StdoutKeys};
pub use table::BrailleTable;
