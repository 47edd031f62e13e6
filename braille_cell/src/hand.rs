//! One detected hand: landmarks, handedness and its five fingers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CellError;
use crate::finger::{Finger, FingerClassifier, FingerKind, Palm};
use crate::landmark::{DetectedHand, Landmark, LandmarkKind, Point3, LANDMARK_COUNT};

/// Detector label that marks a right hand. Every other label is a left hand.
pub const RIGHT_LABEL: &str = "Right";
pub const LEFT_LABEL:  &str = "Left";

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn from_label(label: &str) -> Self {
        if label == RIGHT_LABEL { Handedness::Right } else { Handedness::Left }
    }

    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left  => LEFT_LABEL,
            Handedness::Right => RIGHT_LABEL,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// Stretched flag for each [`FingerKind`] of one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerStates([bool; 5]);

impl FingerStates {
    pub fn new(stretched: [bool; 5]) -> Self { FingerStates(stretched) }

    pub fn all_stretched() -> Self { FingerStates([true; 5]) }

    pub fn get(&self, kind: FingerKind) -> bool { self.0[kind.ordinal()] }

    pub fn set(&mut self, kind: FingerKind, stretched: bool) { self.0[kind.ordinal()] = stretched; }

    pub fn iter(&self) -> impl Iterator<Item = (FingerKind, bool)> + '_ {
        FingerKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    pub fn count_stretched(&self) -> usize { self.0.iter().filter(|&&s| s).count() }
}

impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, stretched) in self.iter() {
            if !first { write!(f, ", ")?; }
            first = false;
            write!(f, "{}: {}", kind.name(), if stretched { "stretched" } else { "bent" })?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// A hand built from one detector entry. Lives for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub index:      u32,
    pub score:      f32,
    pub label:      String,
    pub handedness: Handedness,
    landmarks:      Vec<Landmark>,
    fingers:        [Finger; 5],
    palm:           Palm,
}

impl Hand {
    /// Build a hand, rejecting any landmark sequence that is not 21 long.
    pub fn new(index: u32, score: f32, label: &str, points: &[Point3]) -> Result<Self, CellError> {
        if points.len() != LANDMARK_COUNT {
            return Err(CellError::InvalidLandmarkData {
                expected: LANDMARK_COUNT,
                found:    points.len(),
            });
        }

        let landmarks: Vec<Landmark> = LandmarkKind::ALL.iter()
            .zip(points)
            .map(|(&kind, &p)| Landmark::new(kind, p))
            .collect();

        let wrist = landmarks[LandmarkKind::Wrist.index()];
        let fingers = FingerKind::ALL.map(|kind| {
            let first = kind.first_landmark();
            Finger {
                kind,
                joints: [landmarks[first], landmarks[first + 1], landmarks[first + 2], landmarks[first + 3]],
                wrist,
            }
        });
        let palm = Palm {
            index_mcp: landmarks[LandmarkKind::IndexMcp.index()],
            pinky_mcp: landmarks[LandmarkKind::PinkyMcp.index()],
        };

        Ok(Hand {
            index,
            score,
            label: label.to_string(),
            handedness: Handedness::from_label(label),
            landmarks,
            fingers,
            palm,
        })
    }

    pub fn from_detection(d: &DetectedHand) -> Result<Self, CellError> {
        Hand::new(d.index, d.score, &d.label, &d.landmarks)
    }

    pub fn is_right(&self) -> bool { self.handedness == Handedness::Right }

    pub fn landmarks(&self) -> &[Landmark] { &self.landmarks }

    pub fn finger(&self, kind: FingerKind) -> &Finger { &self.fingers[kind.ordinal()] }

    pub fn palm(&self) -> &Palm { &self.palm }

    /// Classify all five fingers.
    pub fn evaluate(&self, classifier: &FingerClassifier) -> FingerStates {
        let mut states = FingerStates::default();
        for finger in &self.fingers {
            states.set(finger.kind, classifier.classify(finger, &self.palm));
        }
        states
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
