//! Engine configuration: debounce, classifier thresholds and slot layout.
//!
//! ```text
//!  Braille cell         slot digits
//!  ┌─────────┐
//!  │ 1     4 │      left  index/middle/ring/pinky → 1 2 3 7
//!  │ 2     5 │      right index/middle/ring/pinky → 4 5 6 8
//!  │ 3     6 │      left thumb → 0   right thumb → 9
//!  │ 7     8 │
//!  └─────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CellError;
use crate::finger::{FingerClassifier, FingerKind};
use crate::hand::Handedness;

// ════════════════════════════════════════════════════════════════════════════
// Modes / policies
// ════════════════════════════════════════════════════════════════════════════

/// How the aggregator turns a stream of codes into decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Emit only when both thumbs confirm the held pattern.
    #[default]
    Confirm,
    /// Emit whenever the dominant recent pattern changes.
    Continuous,
}

/// Whether a digit in the rendered code means "stretched" or "bent".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodePolicy {
    #[default]
    Direct,
    Inverted,
}

impl CodePolicy {
    pub fn from_invert_flag(invert: bool) -> Self {
        if invert { CodePolicy::Inverted } else { CodePolicy::Direct }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SlotMap
// ════════════════════════════════════════════════════════════════════════════

/// Slot digit for each finger of one hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSlots {
    pub thumb:  u8,
    pub index:  u8,
    pub middle: u8,
    pub ring:   u8,
    pub pinky:  u8,
}

impl HandSlots {
    pub fn slot(&self, kind: FingerKind) -> u8 {
        match kind {
            FingerKind::Thumb  => self.thumb,
            FingerKind::Index  => self.index,
            FingerKind::Middle => self.middle,
            FingerKind::Ring   => self.ring,
            FingerKind::Pinky  => self.pinky,
        }
    }
}

/// Assignment of all ten fingers to the digits 0–9.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotMap {
    pub left:  HandSlots,
    pub right: HandSlots,
}

impl Default for SlotMap {
    fn default() -> Self {
        SlotMap {
            left:  HandSlots { thumb: 0, index: 1, middle: 2, ring: 3, pinky: 7 },
            right: HandSlots { thumb: 9, index: 4, middle: 5, ring: 6, pinky: 8 },
        }
    }
}

impl SlotMap {
    pub fn hand(&self, side: Handedness) -> &HandSlots {
        match side {
            Handedness::Left  => &self.left,
            Handedness::Right => &self.right,
        }
    }

    pub fn slot(&self, side: Handedness, kind: FingerKind) -> u8 { self.hand(side).slot(kind) }

    /// Control digit of the left thumb.
    pub fn left_thumb(&self) -> u8 { self.left.thumb }

    /// Control digit of the right thumb.
    pub fn right_thumb(&self) -> u8 { self.right.thumb }

    /// Which finger a digit stands for, if any.
    pub fn finger_for(&self, digit: u8) -> Option<(Handedness, FingerKind)> {
        [Handedness::Left, Handedness::Right].iter()
            .flat_map(|&side| FingerKind::ALL.iter().map(move |&k| (side, k)))
            .find(|&(side, k)| self.slot(side, k) == digit)
    }

    /// Every digit must be in 0–9 and used by exactly one finger.
    pub fn validate(&self) -> Result<(), CellError> {
        let mut used = [false; 10];
        for side in [Handedness::Left, Handedness::Right] {
            for kind in FingerKind::ALL {
                let d = self.slot(side, kind);
                if d > 9 {
                    return Err(CellError::InvalidSlotMap(format!(
                        "{} {} mapped to {}, digits must be 0-9",
                        side.label(), kind.name(), d
                    )));
                }
                if used[d as usize] {
                    return Err(CellError::InvalidSlotMap(format!(
                        "digit {} assigned twice ({} {})",
                        d, side.label(), kind.name()
                    )));
                }
                used[d as usize] = true;
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

/// Largest accepted `threshold`: about half a minute of camera frames.
pub const MAX_THRESHOLD: usize = 1000;

/// Everything the engine reads; injected, never hard-coded downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frames per vote (confirm) or window length (continuous).
    pub threshold:         usize,
    /// Minimum MCP joint angle, in degrees, for a stretched finger.
    pub stretch_angle_deg: f32,
    /// Uniform factor applied to landmark coordinates before any test.
    pub coordinate_scale:  f32,
    pub mode:              InputMode,
    pub policy:            CodePolicy,
    pub slots:             SlotMap,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threshold:         10,
            stretch_angle_deg: 120.0,
            coordinate_scale:  100.0,
            mode:              InputMode::Confirm,
            policy:            CodePolicy::Direct,
            slots:             SlotMap::default(),
        }
    }
}

impl EngineConfig {
    pub fn classifier(&self) -> FingerClassifier {
        FingerClassifier::new(self.stretch_angle_deg, self.coordinate_scale)
    }

    pub fn validate(&self) -> Result<(), CellError> {
        if self.threshold == 0 {
            return Err(CellError::InvalidConfig("threshold must be at least 1 frame".into()));
        }
        if self.threshold > MAX_THRESHOLD {
            return Err(CellError::InvalidConfig(format!(
                "threshold must be at most {} frames, got {}", MAX_THRESHOLD, self.threshold
            )));
        }
        if !(self.coordinate_scale.is_finite() && self.coordinate_scale > 0.0) {
            return Err(CellError::InvalidConfig(format!(
                "coordinate scale must be positive, got {}", self.coordinate_scale
            )));
        }
        if !(0.0..=180.0).contains(&self.stretch_angle_deg) {
            return Err(CellError::InvalidConfig(format!(
                "stretch angle must be within 0-180 degrees, got {}", self.stretch_angle_deg
            )));
        }
        self.slots.validate()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
