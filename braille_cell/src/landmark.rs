//! Landmark layout and the detector result shape.
//!
//! The detector itself is external; this module only describes what it
//! hands over: per frame, zero or more hands, each with an index, a
//! confidence score, a `"Left"`/`"Right"` label and 21 landmarks in the
//! canonical order (wrist; thumb ×4; index ×4; middle ×4; ring ×4; pinky ×4).

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2, Vec3};

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// LandmarkKind
// ════════════════════════════════════════════════════════════════════════════

/// Position of a landmark in the canonical 21-point layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkKind {
    Wrist = 0,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkKind {
    pub const ALL: [LandmarkKind; LANDMARK_COUNT] = [
        LandmarkKind::Wrist,
        LandmarkKind::ThumbCmc, LandmarkKind::ThumbMcp, LandmarkKind::ThumbIp, LandmarkKind::ThumbTip,
        LandmarkKind::IndexMcp, LandmarkKind::IndexPip, LandmarkKind::IndexDip, LandmarkKind::IndexTip,
        LandmarkKind::MiddleMcp, LandmarkKind::MiddlePip, LandmarkKind::MiddleDip, LandmarkKind::MiddleTip,
        LandmarkKind::RingMcp, LandmarkKind::RingPip, LandmarkKind::RingDip, LandmarkKind::RingTip,
        LandmarkKind::PinkyMcp, LandmarkKind::PinkyPip, LandmarkKind::PinkyDip, LandmarkKind::PinkyTip,
    ];

    /// Index into the 21-point sequence.
    pub fn index(self) -> usize { self as usize }
}

// ════════════════════════════════════════════════════════════════════════════
// Point3 / Landmark
// ════════════════════════════════════════════════════════════════════════════

/// Normalized image-space coordinate as delivered by the detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self { Point3 { x, y, z } }
}

/// One tagged landmark of a [`crate::Hand`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub kind: LandmarkKind,
    pub x:    f32,
    pub y:    f32,
    pub z:    f32,
}

impl Landmark {
    pub fn new(kind: LandmarkKind, p: Point3) -> Self {
        Landmark { kind, x: p.x, y: p.y, z: p.z }
    }

    /// Image-plane projection, scaled by `k`.
    pub fn planar(&self, k: f32) -> Point2 { Point2::new(self.x * k, self.y * k) }

    /// Full 3-D position, scaled by `k`.
    pub fn spatial(&self, k: f32) -> Vec3 { Vec3::new(self.x, self.y, self.z).scaled(k) }
}

// ════════════════════════════════════════════════════════════════════════════
// Detector result
// ════════════════════════════════════════════════════════════════════════════

/// One hand as reported by the external detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    #[serde(default)]
    pub index:     u32,
    #[serde(default)]
    pub score:     f32,
    pub label:     String,
    pub landmarks: Vec<Point3>,
}

/// All hands the detector found in one video frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    #[serde(default)]
    pub hands: Vec<DetectedHand>,
}

impl DetectionFrame {
    pub fn new(hands: Vec<DetectedHand>) -> Self { DetectionFrame { hands } }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
