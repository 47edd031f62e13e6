//! Per-frame driver: validation, encoding, aggregation and visibility.

use tracing::{debug, info, warn};

use crate::aggregate::{aggregator_for, Aggregator, Decision, VisibilityChange, VisibilityTracker};
use crate::code::BrailleCode;
use crate::config::EngineConfig;
use crate::error::CellError;
use crate::landmark::DetectionFrame;
use crate::pair::{CellEncoder, HandPair};

/// Everything that happened while processing one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Encoded cell, present for frames that reached the aggregator.
    pub code:       Option<BrailleCode>,
    pub decision:   Option<Decision>,
    /// Set on the frame where the visibility state flips.
    pub visibility: Option<VisibilityChange>,
    /// Why the frame was kept out of aggregation.
    pub rejected:   Option<CellError>,
}

/// Owns all mutable engine state; driven by exactly one processing loop.
pub struct Engine {
    config:     EngineConfig,
    encoder:    CellEncoder,
    aggregator: Box<dyn Aggregator>,
    visibility: VisibilityTracker,
    frames:     u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, CellError> {
        config.validate()?;
        Ok(Engine {
            encoder:    CellEncoder::from_config(&config),
            aggregator: aggregator_for(&config),
            visibility: VisibilityTracker::new(),
            frames:     0,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn encoder(&self) -> &CellEncoder { &self.encoder }

    pub fn aggregator(&self) -> &dyn Aggregator { self.aggregator.as_ref() }

    pub fn is_visible(&self) -> bool { self.visibility.is_visible() }

    pub fn frames_processed(&self) -> u64 { self.frames }

    /// Process one detector result.
    ///
    /// Frames without a valid left/right pair only feed the visibility
    /// hysteresis. Frames whose landmarks break the detector contract are
    /// logged and skipped.
    pub fn process(&mut self, frame: &DetectionFrame) -> FrameReport {
        self.frames += 1;
        let mut report = FrameReport::default();

        let valid = HandPair::validate(&frame.hands);
        report.visibility = self.visibility.observe(valid.is_ok());
        if let Some(change) = report.visibility {
            info!(?change, "hand visibility changed");
        }

        if let Err(e) = valid {
            debug!(frame = self.frames, reason = %e, "frame not aggregated");
            report.rejected = Some(e.into());
            return report;
        }

        match HandPair::bind(&frame.hands) {
            Ok(pair) => {
                let code = self.encoder.encode(&pair);
                debug!(frame = self.frames, %code, "encoded");
                report.code = Some(code);
                report.decision = self.aggregator.push(code);
            }
            Err(e) => {
                warn!(frame = self.frames, error = %e, "skipping frame with malformed landmarks");
                report.rejected = Some(e);
            }
        }
        report
    }

    /// Drop buffered votes; visibility is kept.
    pub fn reset(&mut self) {
        self.aggregator.reset();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CodePolicy, InputMode};
    use crate::error::PairError;
    use crate::hand::FingerStates;
    use crate::synthetic;

    fn code(s: &str) -> BrailleCode { s.parse().unwrap() }

    fn run(engine: &mut Engine, frame: &DetectionFrame, n: usize) -> Vec<FrameReport> {
        (0..n).map(|_| engine.process(frame)).collect()
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = EngineConfig { threshold: 0, ..EngineConfig::default() };
        assert!(Engine::new(cfg).is_err());
    }

    #[test]
    fn confirmed_cell_is_written_once() {
        let cfg = EngineConfig::default();
        let mut engine = Engine::new(cfg.clone()).unwrap();
        let frame = synthetic::frame_for_code(&code("01359"), &cfg.slots);
        let decisions: Vec<_> = run(&mut engine, &frame, 11).into_iter().filter_map(|r| r.decision).collect();
        assert_eq!(decisions, vec![Decision::Write(code("135"))]);
    }

    #[test]
    fn invalid_frames_only_touch_visibility() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let one_hand = synthetic::frame(Some(FingerStates::default()), None);
        let reports = run(&mut engine, &one_hand, 20);
        assert!(reports.iter().all(|r| r.code.is_none() && r.decision.is_none()));
        assert_eq!(
            reports[0].rejected,
            Some(CellError::InvalidHandPair(PairError::NotTwoHands { found: 1 })),
        );
        assert_eq!(engine.aggregator().buffered(), 0);
    }

    #[test]
    fn oversized_continuous_window_is_a_config_error() {
        let cfg = EngineConfig { threshold: usize::MAX, mode: InputMode::Continuous, ..EngineConfig::default() };
        assert!(matches!(Engine::new(cfg), Err(CellError::InvalidConfig(_))));
    }

    #[test]
    fn mislabelled_pair_is_rejected_not_half_encoded() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut frame = synthetic::frame(Some(FingerStates::all_stretched()), Some(FingerStates::default()));
        frame.hands[1].label = "left".to_string();
        let report = engine.process(&frame);
        assert_eq!(report.code, None);
        assert_eq!(
            report.rejected,
            Some(CellError::InvalidHandPair(PairError::UnknownLabel { label: "left".to_string() })),
        );
        assert_eq!(engine.aggregator().buffered(), 0);
    }

    #[test]
    fn visibility_flips_after_five_valid_frames_and_back() {
        let cfg = EngineConfig::default();
        let mut engine = Engine::new(cfg.clone()).unwrap();
        let both = synthetic::frame_for_code(&code("12"), &cfg.slots);
        let changes: Vec<_> = run(&mut engine, &both, 5).iter().map(|r| r.visibility).collect();
        assert_eq!(changes, [None, None, None, None, Some(VisibilityChange::Visible)]);
        assert!(engine.is_visible());

        let none = DetectionFrame::default();
        let changes: Vec<_> = run(&mut engine, &none, 6).iter().map(|r| r.visibility).collect();
        assert_eq!(changes.iter().filter(|c| c.is_some()).count(), 1);
        assert_eq!(changes[4], Some(VisibilityChange::Hidden));
    }

    #[test]
    fn malformed_landmarks_are_skipped() {
        let cfg = EngineConfig::default();
        let mut engine = Engine::new(cfg.clone()).unwrap();
        let mut frame = synthetic::frame_for_code(&code("12"), &cfg.slots);
        frame.hands[1].landmarks.pop();
        let report = engine.process(&frame);
        assert_eq!(report.rejected, Some(CellError::InvalidLandmarkData { expected: 21, found: 20 }));
        assert_eq!(report.code, None);
        assert_eq!(engine.aggregator().buffered(), 0);
    }

    #[test]
    fn inverted_continuous_pipeline() {
        let cfg = EngineConfig {
            threshold: 3,
            mode:      InputMode::Continuous,
            policy:    CodePolicy::Inverted,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(cfg.clone()).unwrap();
        // All fingers stretched except the left index → inverted code "1".
        let (mut left, right) = (FingerStates::all_stretched(), FingerStates::all_stretched());
        left.set(crate::finger::FingerKind::Index, false);
        let frame = synthetic::frame(Some(left), Some(right));
        let decisions: Vec<_> = run(&mut engine, &frame, 6).into_iter().filter_map(|r| r.decision).collect();
        assert_eq!(decisions, vec![Decision::Write(code("1"))]);
    }

    #[test]
    fn counts_frames() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        run(&mut engine, &DetectionFrame::default(), 3);
        assert_eq!(engine.frames_processed(), 3);
    }
}
