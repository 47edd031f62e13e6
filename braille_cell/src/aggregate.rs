//! Temporal aggregation: from one noisy code per frame to confirmed symbols.
//!
//! Two [`Aggregator`] implementations share one interface and are picked at
//! construction time from [`InputMode`]:
//!
//! * [`ConfirmAggregator`] counts codes over `threshold + 1` frames, takes the
//!   most frequent one and writes it only when both thumb control digits are
//!   present. No thumbs means the user is still composing (hold); exactly one
//!   thumb is reserved for hotkeys.
//! * [`ContinuousAggregator`] keeps a sliding window of `threshold` codes and
//!   writes the modal code whenever it changes.
//!
//! [`VisibilityTracker`] is the hysteresis for "hands in frame", independent
//! of the mode.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::code::BrailleCode;
use crate::config::{EngineConfig, InputMode};

// ════════════════════════════════════════════════════════════════════════════
// Decision / Phase
// ════════════════════════════════════════════════════════════════════════════

/// What an aggregator concluded after a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Forward to the write handler. Thumb control digits already stripped.
    Write(BrailleCode),
    /// Winner carried no control digit: the user is still composing.
    Hold(BrailleCode),
    /// Winner carried exactly one control digit: reserved for hotkeys.
    Hotkey(BrailleCode),
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Write(c)  => write!(f, "write {}", c),
            Decision::Hold(c)   => write!(f, "hold {}", c),
            Decision::Hotkey(c) => write!(f, "hotkey {}", c),
        }
    }
}

/// Where an aggregator stands relative to its next decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing buffered.
    Idle,
    /// Collecting frames; the next push will not decide.
    Accumulating,
    /// The next push runs a vote.
    Emitting,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle         => "idle",
            Phase::Accumulating => "collecting",
            Phase::Emitting     => "voting",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Aggregator trait
// ════════════════════════════════════════════════════════════════════════════

pub trait Aggregator: Send {
    fn mode(&self) -> InputMode;

    /// Feed the code of one valid frame.
    fn push(&mut self, code: BrailleCode) -> Option<Decision>;

    /// Number of codes currently buffered.
    fn buffered(&self) -> usize;

    fn phase(&self) -> Phase;

    /// Drop everything buffered.
    fn reset(&mut self);
}

/// Build the aggregator selected by `cfg.mode`.
pub fn aggregator_for(cfg: &EngineConfig) -> Box<dyn Aggregator> {
    let (l, r) = (cfg.slots.left_thumb(), cfg.slots.right_thumb());
    match cfg.mode {
        InputMode::Confirm    => Box::new(ConfirmAggregator::new(cfg.threshold, l, r)),
        InputMode::Continuous => Box::new(ContinuousAggregator::new(cfg.threshold, l, r)),
    }
}

/// Insertion-ordered vote; ties go to the code counted first.
fn first_most_frequent<I: IntoIterator<Item = BrailleCode>>(codes: I) -> Option<BrailleCode> {
    let mut counts: Vec<(BrailleCode, usize)> = Vec::new();
    for code in codes {
        match counts.iter_mut().find(|(c, _)| *c == code) {
            Some((_, n)) => *n += 1,
            None         => counts.push((code, 1)),
        }
    }
    winner(&counts)
}

fn winner(counts: &[(BrailleCode, usize)]) -> Option<BrailleCode> {
    let mut best: Option<(BrailleCode, usize)> = None;
    for &(code, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((code, n));
        }
    }
    best.map(|(c, _)| c)
}

// ════════════════════════════════════════════════════════════════════════════
// ConfirmAggregator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ConfirmAggregator {
    threshold:   usize,
    left_thumb:  u8,
    right_thumb: u8,
    counts:      Vec<(BrailleCode, usize)>,
    frames:      usize,
}

impl ConfirmAggregator {
    pub fn new(threshold: usize, left_thumb: u8, right_thumb: u8) -> Self {
        ConfirmAggregator { threshold, left_thumb, right_thumb, counts: Vec::new(), frames: 0 }
    }

    /// Occurrence count of `code` in the current vote.
    pub fn count(&self, code: BrailleCode) -> usize {
        self.counts.iter().find(|(c, _)| *c == code).map_or(0, |(_, n)| *n)
    }

    /// Route a vote winner by its control digits.
    pub fn classify(&self, winner: BrailleCode) -> Decision {
        let l = winner.contains(self.left_thumb);
        let r = winner.contains(self.right_thumb);
        match (l, r) {
            (true, true)   => Decision::Write(winner.without(self.left_thumb).without(self.right_thumb)),
            (false, false) => Decision::Hold(winner),
            _              => Decision::Hotkey(winner),
        }
    }

    fn decide(&mut self) -> Option<Decision> {
        let decision = winner(&self.counts).map(|w| self.classify(w));
        debug!(frames = self.frames, candidates = self.counts.len(), ?decision, "confirm vote");
        self.reset();
        decision
    }
}

impl Aggregator for ConfirmAggregator {
    fn mode(&self) -> InputMode { InputMode::Confirm }

    fn push(&mut self, code: BrailleCode) -> Option<Decision> {
        self.frames += 1;
        match self.counts.iter_mut().find(|(c, _)| *c == code) {
            Some((_, n)) => *n += 1,
            None         => self.counts.push((code, 1)),
        }
        if self.frames > self.threshold { self.decide() } else { None }
    }

    fn buffered(&self) -> usize { self.frames }

    fn phase(&self) -> Phase {
        if self.frames == 0 {
            Phase::Idle
        } else if self.frames >= self.threshold {
            Phase::Emitting
        } else {
            Phase::Accumulating
        }
    }

    fn reset(&mut self) {
        self.counts.clear();
        self.frames = 0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ContinuousAggregator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct ContinuousAggregator {
    threshold:   usize,
    left_thumb:  u8,
    right_thumb: u8,
    window:      VecDeque<BrailleCode>,
    previous:    BrailleCode,
}

impl ContinuousAggregator {
    pub fn new(threshold: usize, left_thumb: u8, right_thumb: u8) -> Self {
        ContinuousAggregator {
            threshold,
            left_thumb,
            right_thumb,
            window:   VecDeque::new(),
            previous: BrailleCode::EMPTY,
        }
    }

    /// Last modal code that was written.
    pub fn previous(&self) -> BrailleCode { self.previous }

    pub fn window(&self) -> impl Iterator<Item = &BrailleCode> { self.window.iter() }
}

impl Aggregator for ContinuousAggregator {
    fn mode(&self) -> InputMode { InputMode::Continuous }

    fn push(&mut self, code: BrailleCode) -> Option<Decision> {
        self.window.push_back(code);
        if self.window.len() < self.threshold {
            return None;
        }

        let modal = first_most_frequent(self.window.iter().copied())?;
        let decision = if modal != self.previous {
            debug!(from = %self.previous, to = %modal, "modal code changed");
            self.previous = modal;
            Some(Decision::Write(modal.without(self.left_thumb).without(self.right_thumb)))
        } else {
            None
        };

        self.window.pop_front();
        decision
    }

    fn buffered(&self) -> usize { self.window.len() }

    fn phase(&self) -> Phase {
        if self.window.is_empty() {
            Phase::Idle
        } else if self.window.len() + 1 >= self.threshold {
            Phase::Emitting
        } else {
            Phase::Accumulating
        }
    }

    /// Clears the window; the last written code is kept.
    fn reset(&mut self) {
        self.window.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VisibilityTracker
// ════════════════════════════════════════════════════════════════════════════

/// Consecutive disagreeing frames needed to flip the visibility state.
pub const VISIBILITY_HOLD_FRAMES: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityChange {
    Visible,
    Hidden,
}

/// Hysteresis over "are both hands usable in this frame".
#[derive(Clone, Debug, Default)]
pub struct VisibilityTracker {
    visible: bool,
    pending: u32,
}

impl VisibilityTracker {
    /// Starts in the "not visible" state.
    pub fn new() -> Self { VisibilityTracker::default() }

    pub fn is_visible(&self) -> bool { self.visible }

    /// Disagreeing frames seen so far.
    pub fn pending(&self) -> u32 { self.pending }

    /// Record one frame; returns the change on the frame that flips the state.
    pub fn observe(&mut self, visible: bool) -> Option<VisibilityChange> {
        if visible == self.visible {
            self.pending = 0;
            return None;
        }
        self.pending += 1;
        if self.pending < VISIBILITY_HOLD_FRAMES {
            return None;
        }
        self.visible = visible;
        self.pending = 0;
        Some(if visible { VisibilityChange::Visible } else { VisibilityChange::Hidden })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
