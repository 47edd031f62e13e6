//! Error types for the cell engine.

use thiserror::Error;

/// Why a detection result cannot be used as a left/right hand pair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairError {
    /// The detector did not report exactly two hands.
    #[error("expected two hands in frame, found {found}")]
    NotTwoHands { found: usize },

    /// Both detected hands carry the same left/right label.
    #[error("two identical hands in frame (both labelled {label:?})")]
    TwoSameHands { label: String },

    /// A label that is neither `"Left"` nor `"Right"`.
    #[error("hand labelled {label:?} is neither Left nor Right")]
    UnknownLabel { label: String },
}

/// Errors raised by the cell engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    /// Frame rejected for aggregation; only affects visibility.
    #[error("invalid hand pair: {0}")]
    InvalidHandPair(#[from] PairError),

    /// The detector broke its contract of 21 landmarks per hand.
    #[error("invalid landmark data: expected {expected} landmarks, found {found}")]
    InvalidLandmarkData { expected: usize, found: usize },

    /// Slot digits out of range or assigned twice.
    #[error("invalid slot map: {0}")]
    InvalidSlotMap(String),

    /// Engine configuration that cannot drive an aggregator.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// A code string containing something other than the digits 0–9.
    #[error("invalid braille code {0:?}")]
    InvalidCode(String),
}
