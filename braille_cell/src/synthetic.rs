//! Synthetic hand poses.
//!
//! Builds canonical 21-point hands whose fingers classify exactly as
//! requested under the default classifier settings. Used by the simulation
//! frame source and by tests.

use crate::code::BrailleCode;
use crate::config::SlotMap;
use crate::finger::FingerKind;
use crate::hand::{FingerStates, Handedness};
use crate::landmark::{DetectedHand, DetectionFrame, Point3, LANDMARK_COUNT};

const WRIST: (f32, f32) = (0.50, 0.90);
const MCP_Y: f32 = 0.60;
/// MCP x for index, middle, ring, pinky.
const MCP_X: [f32; 4] = [0.40, 0.47, 0.54, 0.61];

/// 21 landmarks for one hand with the given fingers stretched.
pub fn hand_points(states: FingerStates) -> Vec<Point3> {
    let mut pts = vec![Point3::default(); LANDMARK_COUNT];
    pts[0] = Point3::new(WRIST.0, WRIST.1, 0.0);

    // Thumb: the tip either rests on the palm or points away from it.
    let tip = if states.get(FingerKind::Thumb) { (0.20, 0.50) } else { (0.50, 0.62) };
    pts[1] = Point3::new(0.42, 0.85, 0.0);
    pts[2] = Point3::new(0.35, 0.78, 0.0);
    pts[3] = Point3::new((0.35 + tip.0) / 2.0, (0.78 + tip.1) / 2.0, 0.0);
    pts[4] = Point3::new(tip.0, tip.1, 0.0);

    // Other fingers: straight up from the MCP, or folded back toward the wrist.
    for (i, kind) in FingerKind::ALL[1..].iter().enumerate() {
        let x = MCP_X[i];
        let base = kind.first_landmark();
        let reach = if states.get(*kind) { -0.30 } else { 0.10 };
        for j in 0..4 {
            let y = MCP_Y + reach * (j as f32) / 3.0;
            pts[base + j] = Point3::new(x, y, 0.0);
        }
    }
    pts
}

pub fn detected_hand(label: &str, states: FingerStates) -> DetectedHand {
    DetectedHand {
        index:     if label == Handedness::Right.label() { 1 } else { 0 },
        score:     0.99,
        label:     label.to_string(),
        landmarks: hand_points(states),
    }
}

/// A frame with whichever hands are given.
pub fn frame(left: Option<FingerStates>, right: Option<FingerStates>) -> DetectionFrame {
    let mut hands = Vec::new();
    if let Some(s) = left  { hands.push(detected_hand(Handedness::Left.label(), s)); }
    if let Some(s) = right { hands.push(detected_hand(Handedness::Right.label(), s)); }
    DetectionFrame::new(hands)
}

/// Per-hand finger states that produce `code` under the direct policy.
///
/// Digits that are not assigned to any finger are ignored.
pub fn states_for_code(code: &BrailleCode, slots: &SlotMap) -> (FingerStates, FingerStates) {
    let mut left  = FingerStates::default();
    let mut right = FingerStates::default();
    for d in code.digits() {
        match slots.finger_for(d) {
            Some((Handedness::Left, k))  => left.set(k, true),
            Some((Handedness::Right, k)) => right.set(k, true),
            None => {}
        }
    }
    (left, right)
}

/// A two-hand frame showing `code` under the direct policy.
pub fn frame_for_code(code: &BrailleCode, slots: &SlotMap) -> DetectionFrame {
    let (left, right) = states_for_code(code, slots);
    frame(Some(left), Some(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodePolicy, EngineConfig};
    use crate::pair::{CellEncoder, HandPair};

    #[test]
    fn frame_for_code_encodes_back() {
        let cfg = EngineConfig::default();
        let enc = CellEncoder::new(cfg.classifier(), cfg.slots, CodePolicy::Direct);
        for s in ["", "09", "0135 9", "12345678", "0123456789", "48"] {
            let code: BrailleCode = s.parse().unwrap();
            let f = frame_for_code(&code, &cfg.slots);
            let pair = HandPair::from_detections(&f.hands).unwrap();
            assert_eq!(enc.encode(&pair), code, "code {:?}", s);
        }
    }

    #[test]
    fn frame_without_hands() {
        assert!(frame(None, None).is_empty());
        assert_eq!(frame(Some(FingerStates::default()), None).hands.len(), 1);
    }
}
