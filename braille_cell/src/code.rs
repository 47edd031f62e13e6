//! The Braille-cell code: a set of slot digits 0–9.
//!
//! Stored as a 10-bit mask so that rendering is canonical: digits always come
//! out unique and in ascending order, and two codes are equal exactly when
//! their strings are.

use std::fmt;
use std::str::FromStr;

use crate::error::CellError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrailleCode(u16);

impl BrailleCode {
    pub const EMPTY: BrailleCode = BrailleCode(0);
    /// Every slot digit, `0123456789`.
    pub const FULL:  BrailleCode = BrailleCode(0b11_1111_1111);

    /// Build from digits; anything above 9 is ignored.
    pub fn from_digits<I: IntoIterator<Item = u8>>(digits: I) -> Self {
        digits.into_iter().fold(BrailleCode::EMPTY, |c, d| c.with(d))
    }

    pub fn contains(self, digit: u8) -> bool {
        digit <= 9 && self.0 & (1 << digit) != 0
    }

    pub fn with(self, digit: u8) -> Self {
        if digit <= 9 { BrailleCode(self.0 | (1 << digit)) } else { self }
    }

    pub fn without(self, digit: u8) -> Self {
        if digit <= 9 { BrailleCode(self.0 & !(1 << digit)) } else { self }
    }

    /// Ascending digits.
    pub fn digits(self) -> impl Iterator<Item = u8> {
        (0u8..=9).filter(move |&d| self.contains(d))
    }

    pub fn len(self) -> usize { self.0.count_ones() as usize }

    pub fn is_empty(self) -> bool { self.0 == 0 }

    pub fn bits(self) -> u16 { self.0 }
}

impl fmt::Display for BrailleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.digits() {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl FromStr for BrailleCode {
    type Err = CellError;

    /// Accepts digits in any order; whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut code = BrailleCode::EMPTY;
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            match ch.to_digit(10) {
                Some(d) => code = code.with(d as u8),
                None    => return Err(CellError::InvalidCode(s.to_string())),
            }
        }
        Ok(code)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ascending_and_unique() {
        let c = BrailleCode::from_digits([9, 3, 1, 3, 0]);
        assert_eq!(c.to_string(), "0139");
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn parse_ignores_order_and_spaces() {
        let c: BrailleCode = "0135 9".parse().unwrap();
        assert_eq!(c.to_string(), "01359");
        assert_eq!("531".parse::<BrailleCode>().unwrap(), "135".parse().unwrap());
    }

    #[test]
    fn parse_rejects_non_digits() {
        assert!(matches!("12a".parse::<BrailleCode>(), Err(CellError::InvalidCode(_))));
    }

    #[test]
    fn full_and_empty() {
        assert_eq!(BrailleCode::FULL.to_string(), "0123456789");
        assert_eq!(BrailleCode::EMPTY.to_string(), "");
        assert!(BrailleCode::EMPTY.is_empty());
    }

    #[test]
    fn strip_control_digits() {
        let c: BrailleCode = "01359".parse().unwrap();
        assert_eq!(c.without(0).without(9).to_string(), "135");
        assert!(!c.without(0).contains(0));
        assert_eq!(c.without(42), c);
    }
}
