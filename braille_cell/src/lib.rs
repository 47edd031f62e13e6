//! # braille_cell
//!
//! Turns per-frame hand-landmark detections (21 points per hand, two hands)
//! into Braille-cell codes, and debounces the noisy per-frame stream into
//! confirmed symbols.
//!
//! ## Pipeline
//!
//! ```text
//! DetectionFrame ──► validate ──► HandPair ──► CellEncoder ──► BrailleCode
//!                       │                                          │
//!                       └──► visibility hysteresis        Aggregator (confirm | continuous)
//!                                                                  │
//!                                                              Decision
//! ```
//!
//! ## Slot layout (default)
//!
//! | Digit | Finger | | Digit | Finger |
//! |---|---|---|---|---|
//! | `0` | left thumb (control)  | | `9` | right thumb (control) |
//! | `1` | left index            | | `4` | right index  |
//! | `2` | left middle           | | `5` | right middle |
//! | `3` | left ring             | | `6` | right ring   |
//! | `7` | left pinky            | | `8` | right pinky  |
//!
//! Digits `1`–`8` are Braille dots; `0` and `9` are reserved for the thumbs
//! and are stripped before a code reaches a write handler.
//!
//! ## Quick start
//!
//! ```rust
//! use braille_cell::{Engine, EngineConfig, synthetic};
//!
//! let cfg = EngineConfig::default();
//! let mut engine = Engine::new(cfg.clone()).unwrap();
//!
//! // Both thumbs out plus left index: "0 1 9" → writes dot 1.
//! let frame = synthetic::frame_for_code(&"019".parse().unwrap(), &cfg.slots);
//! let mut written = None;
//! for _ in 0..=cfg.threshold {
//!     let report = engine.process(&frame);
//!     if let Some(d) = report.decision { written = Some(d); }
//! }
//! assert_eq!(written.unwrap().to_string(), "write 1");
//! ```

pub mod aggregate;
pub mod code;
pub mod config;
pub mod engine;
pub mod error;
pub mod finger;
pub mod geometry;
pub mod hand;
pub mod landmark;
pub mod pair;
pub mod synthetic;

pub use aggregate::{
    aggregator_for, Aggregator, ConfirmAggregator, ContinuousAggregator, Decision, Phase,
    VisibilityChange, VisibilityTracker, VISIBILITY_HOLD_FRAMES,
};
pub use code::BrailleCode;
pub use config::{CodePolicy, EngineConfig, HandSlots, InputMode, SlotMap, MAX_THRESHOLD};
pub use engine::{Engine, FrameReport};
pub use error::{CellError, PairError};
pub use finger::{Finger, FingerClassifier, FingerKind, Palm};
pub use hand::{FingerStates, Hand, Handedness};
pub use landmark::{DetectedHand, DetectionFrame, Landmark, LandmarkKind, Point3, LANDMARK_COUNT};
pub use pair::{CellEncoder, HandPair};
