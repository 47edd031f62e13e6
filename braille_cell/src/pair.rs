//! Two-hand validation, left/right binding and cell encoding.

use tracing::debug;

use crate::code::BrailleCode;
use crate::config::{CodePolicy, EngineConfig, SlotMap};
use crate::error::{CellError, PairError};
use crate::finger::FingerClassifier;
use crate::hand::{Hand, Handedness, LEFT_LABEL, RIGHT_LABEL};
use crate::landmark::DetectedHand;

// ════════════════════════════════════════════════════════════════════════════
// HandPair
// ════════════════════════════════════════════════════════════════════════════

/// Left and right hand of one frame. Either may be missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandPair {
    pub left:  Option<Hand>,
    pub right: Option<Hand>,
}

impl HandPair {
    /// A usable pair is exactly one `"Left"` and one `"Right"` hand.
    pub fn validate(hands: &[DetectedHand]) -> Result<(), PairError> {
        if hands.len() != 2 {
            return Err(PairError::NotTwoHands { found: hands.len() });
        }
        if hands[0].label == hands[1].label {
            return Err(PairError::TwoSameHands { label: hands[0].label.clone() });
        }
        if let Some(odd) = hands.iter().find(|h| h.label != LEFT_LABEL && h.label != RIGHT_LABEL) {
            return Err(PairError::UnknownLabel { label: odd.label.clone() });
        }
        Ok(())
    }

    /// Validate, then bind.
    pub fn from_detections(hands: &[DetectedHand]) -> Result<Self, CellError> {
        HandPair::validate(hands)?;
        HandPair::bind(hands)
    }

    /// Bind up to two detections without validating them.
    ///
    /// The entry labelled `"Right"` becomes the right hand and any other
    /// entry the left hand, whatever order the detector used. Only the first
    /// two entries are considered; two entries landing on the same side are
    /// rejected rather than one replacing the other.
    pub fn bind(hands: &[DetectedHand]) -> Result<Self, CellError> {
        let mut pair = HandPair::default();
        for detected in hands.iter().take(2) {
            let hand = Hand::from_detection(detected)?;
            let side = match hand.handedness {
                Handedness::Left  => &mut pair.left,
                Handedness::Right => &mut pair.right,
            };
            if side.is_some() {
                return Err(PairError::TwoSameHands { label: hand.handedness.label().to_string() }.into());
            }
            *side = Some(hand);
        }
        Ok(pair)
    }

    pub fn hand(&self, side: Handedness) -> Option<&Hand> {
        match side {
            Handedness::Left  => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CellEncoder
// ════════════════════════════════════════════════════════════════════════════

/// Stateless transform from a [`HandPair`] to a [`BrailleCode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellEncoder {
    classifier: FingerClassifier,
    slots:      SlotMap,
    policy:     CodePolicy,
}

impl CellEncoder {
    pub fn new(classifier: FingerClassifier, slots: SlotMap, policy: CodePolicy) -> Self {
        CellEncoder { classifier, slots, policy }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        CellEncoder::new(cfg.classifier(), cfg.slots, cfg.policy)
    }

    pub fn slots(&self) -> &SlotMap { &self.slots }

    pub fn policy(&self) -> CodePolicy { self.policy }

    /// Slots whose finger is stretched. Absent hands contribute nothing.
    pub fn stretched_slots(&self, pair: &HandPair) -> BrailleCode {
        let mut stretched = BrailleCode::EMPTY;
        for side in [Handedness::Left, Handedness::Right] {
            if let Some(hand) = pair.hand(side) {
                let states = hand.evaluate(&self.classifier);
                debug!(hand = side.label(), %states, "evaluated");
                for (kind, is_stretched) in states.iter() {
                    if is_stretched {
                        stretched = stretched.with(self.slots.slot(side, kind));
                    }
                }
            }
        }
        stretched
    }

    pub fn encode(&self, pair: &HandPair) -> BrailleCode {
        self.render(self.stretched_slots(pair))
    }

    /// Apply the policy to a set of stretched slots.
    pub fn render(&self, stretched: BrailleCode) -> BrailleCode {
        match self.policy {
            CodePolicy::Direct   => stretched,
            CodePolicy::Inverted => stretched.digits().fold(BrailleCode::FULL, |c, d| c.without(d)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::FingerStates;
    use crate::synthetic;

    fn detected(label: &str) -> DetectedHand {
        synthetic::detected_hand(label, FingerStates::default())
    }

    fn encoder(policy: CodePolicy) -> CellEncoder {
        CellEncoder::new(FingerClassifier::default(), SlotMap::default(), policy)
    }

    #[test]
    fn not_two_hands_for_zero_one_three() {
        for n in [0usize, 1, 3] {
            let hands: Vec<_> = (0..n).map(|i| detected(if i % 2 == 0 { "Left" } else { "Right" })).collect();
            assert_eq!(HandPair::validate(&hands), Err(PairError::NotTwoHands { found: n }));
        }
    }

    #[test]
    fn two_same_hands() {
        for label in ["Left", "Right"] {
            let hands = vec![detected(label), detected(label)];
            assert_eq!(
                HandPair::validate(&hands),
                Err(PairError::TwoSameHands { label: label.to_string() }),
            );
        }
    }

    #[test]
    fn labels_other_than_left_right_are_rejected() {
        let hands = vec![synthetic::detected_hand("Left", FingerStates::all_stretched()), detected("left")];
        assert_eq!(
            HandPair::validate(&hands),
            Err(PairError::UnknownLabel { label: "left".to_string() }),
        );
        assert!(HandPair::from_detections(&hands).is_err());
    }

    #[test]
    fn binding_never_overwrites_a_side() {
        let err = HandPair::bind(&[detected("Left"), detected("left")]).unwrap_err();
        assert_eq!(err, CellError::InvalidHandPair(PairError::TwoSameHands { label: "Left".to_string() }));
    }

    #[test]
    fn left_right_is_valid() {
        assert!(HandPair::validate(&[detected("Right"), detected("Left")]).is_ok());
    }

    #[test]
    fn binding_ignores_detector_order() {
        let mut r = detected("Right");
        r.index = 0;
        let mut l = detected("Left");
        l.index = 1;
        let pair = HandPair::from_detections(&[r, l]).unwrap();
        assert_eq!(pair.right.as_ref().unwrap().index, 0);
        assert_eq!(pair.left.as_ref().unwrap().index, 1);
    }

    #[test]
    fn single_hand_binds_by_label() {
        let pair = HandPair::bind(&[detected("Right")]).unwrap();
        assert!(pair.left.is_none());
        assert!(pair.right.is_some());
    }

    #[test]
    fn bad_landmarks_surface_from_binding() {
        let mut l = detected("Left");
        l.landmarks.truncate(5);
        let err = HandPair::from_detections(&[detected("Right"), l]).unwrap_err();
        assert_eq!(err, CellError::InvalidLandmarkData { expected: 21, found: 5 });
    }

    #[test]
    fn direct_encoding_uses_slot_map() {
        let left  = FingerStates::new([true, true, false, true, false]);   // thumb, index, ring
        let right = FingerStates::new([false, false, true, false, true]);  // middle, pinky
        let frame = synthetic::frame(Some(left), Some(right));
        let pair = HandPair::from_detections(&frame.hands).unwrap();
        assert_eq!(encoder(CodePolicy::Direct).encode(&pair).to_string(), "01358");
    }

    #[test]
    fn inverted_encoding_lists_bent_fingers() {
        let left  = FingerStates::new([true, true, false, true, false]);
        let right = FingerStates::new([false, false, true, false, true]);
        let frame = synthetic::frame(Some(left), Some(right));
        let pair = HandPair::from_detections(&frame.hands).unwrap();
        assert_eq!(encoder(CodePolicy::Inverted).encode(&pair).to_string(), "24679");
    }

    #[test]
    fn policies_are_complements() {
        for mask in [0u16, 0b1, 0b10_0000_0001, 0b01_0101_0110, 0b11_1111_1111] {
            let stretched = BrailleCode::from_digits((0u8..=9).filter(|d| mask & (1 << d) != 0));
            let direct   = encoder(CodePolicy::Direct).render(stretched);
            let inverted = encoder(CodePolicy::Inverted).render(stretched);
            assert_eq!(direct.bits() & inverted.bits(), 0);
            assert_eq!(direct.bits() | inverted.bits(), BrailleCode::FULL.bits());
        }
    }

    #[test]
    fn absent_hand_leaves_slots_inactive() {
        let pair = HandPair::bind(&[synthetic::detected_hand("Right", FingerStates::all_stretched())]).unwrap();
        assert_eq!(encoder(CodePolicy::Direct).encode(&pair).to_string(), "45689");
        assert_eq!(encoder(CodePolicy::Inverted).encode(&pair).to_string(), "01237");
    }

    #[test]
    fn encoded_digits_are_strictly_ascending() {
        let frame = synthetic::frame(Some(FingerStates::all_stretched()), Some(FingerStates::all_stretched()));
        let pair = HandPair::from_detections(&frame.hands).unwrap();
        let s = encoder(CodePolicy::Direct).encode(&pair).to_string();
        assert_eq!(s, "0123456789");
        assert!(s.as_bytes().windows(2).all(|w| w[0] < w[1]));
    }
}
