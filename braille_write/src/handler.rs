//! Write handlers: confirmed dot pattern → text + keystrokes.

use braille_cell::BrailleCode;
use tracing::{debug, info};

use crate::error::WriteError;
use crate::keys::{KeySink, StdoutKeys};
use crate::table::BrailleTable;

/// Returned by [`SixDotHandler`] when the capital sign is written.
pub const CAPITAL_ANNOUNCEMENT: &str = "Shift";

/// Turns a dot pattern into text, emitting keystrokes as a side effect.
///
/// `dots` never contains the thumb digits `0` or `9`.
pub trait WriteHandler {
    fn name(&self) -> &str;

    /// Text produced for `dots`, or [`WriteError::NoMapping`].
    fn write(&mut self, dots: &BrailleCode) -> Result<String, WriteError>;
}

impl<H: WriteHandler + ?Sized> WriteHandler for Box<H> {
    fn name(&self) -> &str { (**self).name() }

    fn write(&mut self, dots: &BrailleCode) -> Result<String, WriteError> { (**self).write(dots) }
}

// ════════════════════════════════════════════════════════════════════════════
// 8-dot
// ════════════════════════════════════════════════════════════════════════════

/// Direct table lookup over all eight dots.
pub struct EightDotHandler<K: KeySink = StdoutKeys> {
    table: BrailleTable,
    keys:  K,
}

impl<K: KeySink> EightDotHandler<K> {
    pub fn new(table: BrailleTable, keys: K) -> Self {
        EightDotHandler { table, keys }
    }

    pub fn keys(&self) -> &K { &self.keys }

    pub fn table(&self) -> &BrailleTable { &self.table }
}

impl<K: KeySink> WriteHandler for EightDotHandler<K> {
    fn name(&self) -> &str { "8-dot" }

    fn write(&mut self, dots: &BrailleCode) -> Result<String, WriteError> {
        let text = self
            .table
            .lookup(dots)
            .ok_or_else(|| WriteError::NoMapping(dots.to_string()))?
            .to_string();
        self.keys.send(&text)?;
        debug!(%dots, text = %text, "written");
        Ok(text)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// 6-dot
// ════════════════════════════════════════════════════════════════════════════

/// Classic 6-dot cells with a one-shot capital sign.
///
/// Dots 7 and 8 are ignored. Writing the capital sign (`46`) types nothing
/// and upper-cases the first letter of the next successful lookup.
pub struct SixDotHandler<K: KeySink = StdoutKeys> {
    table:           BrailleTable,
    keys:            K,
    capital_sign:    BrailleCode,
    capital_pending: bool,
}

impl<K: KeySink> SixDotHandler<K> {
    pub fn new(table: BrailleTable, keys: K) -> Self {
        SixDotHandler {
            table,
            keys,
            capital_sign:    BrailleCode::from_digits([4, 6]),
            capital_pending: false,
        }
    }

    pub fn keys(&self) -> &K { &self.keys }

    pub fn table(&self) -> &BrailleTable { &self.table }

    pub fn capital_pending(&self) -> bool { self.capital_pending }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<K: KeySink> WriteHandler for SixDotHandler<K> {
    fn name(&self) -> &str { "6-dot" }

    fn write(&mut self, dots: &BrailleCode) -> Result<String, WriteError> {
        let dots = dots.without(7).without(8);

        if dots == self.capital_sign {
            self.capital_pending = true;
            info!("capital sign");
            return Ok(CAPITAL_ANNOUNCEMENT.to_string());
        }

        let capital = std::mem::take(&mut self.capital_pending);
        let text = match self.table.lookup(&dots) {
            Some(t) if capital => capitalize(t),
            Some(t) => t.to_string(),
            None => return Err(WriteError::NoMapping(dots.to_string())),
        };
        self.keys.send(&text)?;
        debug!(%dots, text = %text, capital, "written");
        Ok(text)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::NullKeys;

    fn code(s: &str) -> BrailleCode { s.parse().unwrap() }

    fn six() -> SixDotHandler<Vec<String>> {
        SixDotHandler::new(BrailleTable::six_dot_german().unwrap(), Vec::new())
    }

    fn eight() -> EightDotHandler<Vec<String>> {
        EightDotHandler::new(BrailleTable::eight_dot_german().unwrap(), Vec::new())
    }

    #[test]
    fn eight_dot_hit_types_text() {
        let mut h = eight();
        assert_eq!(h.write(&code("17")).unwrap(), "A");
        assert_eq!(h.write(&code("135")).unwrap(), "o");
        assert_eq!(h.keys(), &["A".to_string(), "o".to_string()]);
    }

    #[test]
    fn eight_dot_miss_types_nothing() {
        let mut h = eight();
        let err = h.write(&code("78")).unwrap_err();
        assert!(matches!(err, WriteError::NoMapping(ref p) if p == "78"));
        assert!(h.keys().is_empty());
    }

    #[test]
    fn six_dot_ignores_dots_seven_and_eight() {
        let mut h = six();
        assert_eq!(h.write(&code("1378")).unwrap(), "k");
        assert_eq!(h.keys(), &["k".to_string()]);
    }

    #[test]
    fn capital_sign_upper_cases_next_letter_only() {
        let mut h = six();
        assert_eq!(h.write(&code("46")).unwrap(), CAPITAL_ANNOUNCEMENT);
        assert!(h.capital_pending());
        assert_eq!(h.write(&code("1")).unwrap(), "A");
        assert_eq!(h.write(&code("1")).unwrap(), "a");
        assert_eq!(h.keys(), &["A".to_string(), "a".to_string()]);
    }

    #[test]
    fn capital_applies_to_first_letter_of_contraction() {
        let mut h = six();
        h.write(&code("46")).unwrap();
        assert_eq!(h.write(&code("156")).unwrap(), "Sch");
        assert_eq!(h.write(&code("46")).unwrap(), CAPITAL_ANNOUNCEMENT);
        assert_eq!(h.write(&code("345")).unwrap(), "Ä");
    }

    #[test]
    fn miss_clears_pending_capital() {
        let mut h = six();
        h.write(&code("46")).unwrap();
        assert!(h.write(&code("3456")).is_err());
        assert!(!h.capital_pending());
        assert_eq!(h.write(&code("12")).unwrap(), "b");
    }

    #[test]
    fn boxed_handler_dispatches() {
        let mut h: Box<dyn WriteHandler> =
            Box::new(SixDotHandler::new(BrailleTable::six_dot_german().unwrap(), NullKeys));
        assert_eq!(h.name(), "6-dot");
        assert_eq!(h.write(&code("15")).unwrap(), "e");
    }
}
