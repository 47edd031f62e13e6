//! Stretched/bent classification for a single finger.
//!
//! # Algorithm
//!
//! * **Index, middle, ring, pinky**: angle at the MCP joint between the
//!   vectors MCP→wrist and MCP→tip. A straight finger points away from the
//!   wrist (angle near 180°), a curled one folds back toward it. Stretched iff
//!   the angle is at least `stretch_angle_deg`.
//! * **Thumb**: a circle roughly covering the palm is built from the index
//!   and pinky MCP joints (center = midpoint, radius = distance / 1.5). The
//!   thumb is stretched iff its tip lies strictly outside that circle, i.e.
//!   it has not crossed into the palm.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Circle, Vec3};
use crate::landmark::Landmark;

/// Palm radius is the index–pinky MCP distance divided by this.
const PALM_RADIUS_DIVISOR: f32 = 1.5;

// ════════════════════════════════════════════════════════════════════════════
// FingerKind
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerKind {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerKind {
    pub const ALL: [FingerKind; 5] = [
        FingerKind::Thumb,
        FingerKind::Index,
        FingerKind::Middle,
        FingerKind::Ring,
        FingerKind::Pinky,
    ];

    /// Position in [`FingerKind::ALL`].
    pub fn ordinal(self) -> usize { self as usize }

    /// First landmark of this finger in the 21-point layout.
    pub fn first_landmark(self) -> usize { 1 + 4 * self.ordinal() }

    pub fn name(self) -> &'static str {
        match self {
            FingerKind::Thumb  => "thumb",
            FingerKind::Index  => "index finger",
            FingerKind::Middle => "middle finger",
            FingerKind::Ring   => "ring finger",
            FingerKind::Pinky  => "pinky finger",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger / Palm
// ════════════════════════════════════════════════════════════════════════════

/// Four joints of one finger plus the wrist of the owning hand.
///
/// Joint order is CMC, MCP, IP, TIP for the thumb and MCP, PIP, DIP, TIP for
/// the other fingers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Finger {
    pub kind:   FingerKind,
    pub joints: [Landmark; 4],
    pub wrist:  Landmark,
}

impl Finger {
    /// Base joint: CMC for the thumb, MCP otherwise.
    pub fn base(&self) -> &Landmark { &self.joints[0] }
    pub fn tip(&self)  -> &Landmark { &self.joints[3] }
}

/// Reference joints the thumb test needs from its sibling fingers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palm {
    pub index_mcp: Landmark,
    pub pinky_mcp: Landmark,
}

impl Palm {
    /// Circle approximating the palm in the image plane, scaled by `k`.
    pub fn circle(&self, k: f32) -> Circle {
        let index = self.index_mcp.planar(k);
        let pinky = self.pinky_mcp.planar(k);
        Circle::new(pinky.midpoint(index), pinky.distance_to(index) / PALM_RADIUS_DIVISOR)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Pure classifier parameterised by the configured threshold and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerClassifier {
    pub stretch_angle_deg: f32,
    pub coordinate_scale:  f32,
}

impl Default for FingerClassifier {
    fn default() -> Self {
        FingerClassifier { stretch_angle_deg: 120.0, coordinate_scale: 100.0 }
    }
}

impl FingerClassifier {
    pub fn new(stretch_angle_deg: f32, coordinate_scale: f32) -> Self {
        FingerClassifier { stretch_angle_deg, coordinate_scale }
    }

    /// Whether `finger` is stretched. `palm` is only consulted for the thumb.
    pub fn classify(&self, finger: &Finger, palm: &Palm) -> bool {
        match finger.kind {
            FingerKind::Thumb => self.thumb_outside_palm(finger.tip(), palm),
            _                 => self.joint_angle_stretched(finger),
        }
    }

    /// Angle at the MCP joint between wrist and tip, in degrees.
    ///
    /// `None` when the MCP coincides with the wrist or the tip.
    pub fn joint_angle(&self, finger: &Finger) -> Option<f32> {
        let k   = self.coordinate_scale;
        let mcp = finger.base().spatial(k);
        let to_wrist = Vec3::between(mcp, finger.wrist.spatial(k));
        let to_tip   = Vec3::between(mcp, finger.tip().spatial(k));
        to_wrist.angle_deg(to_tip)
    }

    fn joint_angle_stretched(&self, finger: &Finger) -> bool {
        match self.joint_angle(finger) {
            Some(angle) => {
                trace!(finger = finger.kind.name(), angle, "joint angle");
                angle >= self.stretch_angle_deg
            }
            None => {
                trace!(finger = finger.kind.name(), "degenerate joint geometry, treating as bent");
                false
            }
        }
    }

    fn thumb_outside_palm(&self, tip: &Landmark, palm: &Palm) -> bool {
        let k      = self.coordinate_scale;
        let circle = palm.circle(k);
        let inside = circle.contains(tip.planar(k));
        trace!(radius = circle.radius, inside, "thumb palm test");
        !inside
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{LandmarkKind, Point3};

    fn lm(x: f32, y: f32, z: f32) -> Landmark {
        Landmark::new(LandmarkKind::Wrist, Point3::new(x, y, z))
    }

    /// Index finger with MCP at the origin, wrist straight down, and the tip
    /// placed at `angle_deg` from the wrist direction.
    fn finger_at(angle_deg: f32) -> Finger {
        let a   = angle_deg.to_radians();
        let tip = lm(0.2 * a.sin(), 0.2 * a.cos(), 0.0);
        let mcp = lm(0.0, 0.0, 0.0);
        Finger {
            kind:   FingerKind::Index,
            joints: [mcp, lm(0.0, 0.0, 0.0), lm(0.0, 0.0, 0.0), tip],
            wrist:  lm(0.0, 0.3, 0.0),
        }
    }

    fn thumb_with_tip(x: f32, y: f32) -> Finger {
        let t = lm(x, y, 0.0);
        Finger { kind: FingerKind::Thumb, joints: [t, t, t, t], wrist: lm(0.5, 0.9, 0.0) }
    }

    fn palm(offset: (f32, f32)) -> Palm {
        Palm {
            index_mcp: lm(0.40 + offset.0, 0.60 + offset.1, 0.0),
            pinky_mcp: lm(0.61 + offset.0, 0.60 + offset.1, 0.0),
        }
    }

    #[test]
    fn straight_finger_is_stretched() {
        assert!(FingerClassifier::default().classify(&finger_at(175.0), &palm((0.0, 0.0))));
    }

    #[test]
    fn curled_finger_is_bent() {
        assert!(!FingerClassifier::default().classify(&finger_at(30.0), &palm((0.0, 0.0))));
    }

    #[test]
    fn threshold_is_inclusive() {
        let c = FingerClassifier::new(120.0, 100.0);
        let f = finger_at(120.5);
        assert!(c.classify(&f, &palm((0.0, 0.0))));
        let f = finger_at(119.5);
        assert!(!c.classify(&f, &palm((0.0, 0.0))));

        // Threshold equal to the measured angle counts as stretched; the next
        // representable threshold above it does not.
        let f = finger_at(120.0);
        let angle = c.joint_angle(&f).unwrap();
        assert!(FingerClassifier::new(angle, 100.0).classify(&f, &palm((0.0, 0.0))));
        let above = f32::from_bits(angle.to_bits() + 1);
        assert!(!FingerClassifier::new(above, 100.0).classify(&f, &palm((0.0, 0.0))));
    }

    #[test]
    fn classification_is_monotonic_in_angle() {
        let c = FingerClassifier::default();
        let p = palm((0.0, 0.0));
        let mut seen_stretched = false;
        for step in 0..=180 {
            let stretched = c.classify(&finger_at(step as f32), &p);
            if seen_stretched {
                assert!(stretched, "flipped back to bent at {}°", step);
            }
            seen_stretched |= stretched;
        }
        assert!(seen_stretched);
    }

    #[test]
    fn measured_angle_matches_construction() {
        let angle = FingerClassifier::default().joint_angle(&finger_at(150.0)).unwrap();
        assert!((angle - 150.0).abs() < 0.05);
    }

    #[test]
    fn duplicated_landmarks_are_not_stretched() {
        let p = lm(0.3, 0.3, 0.3);
        let f = Finger { kind: FingerKind::Ring, joints: [p, p, p, p], wrist: lm(0.3, 0.6, 0.0) };
        let c = FingerClassifier::default();
        assert_eq!(c.joint_angle(&f), None);
        assert!(!c.classify(&f, &palm((0.0, 0.0))));
    }

    #[test]
    fn thumb_in_palm_is_bent() {
        let c = FingerClassifier::default();
        assert!(!c.classify(&thumb_with_tip(0.50, 0.62), &palm((0.0, 0.0))));
    }

    #[test]
    fn thumb_away_from_palm_is_stretched() {
        let c = FingerClassifier::default();
        assert!(c.classify(&thumb_with_tip(0.20, 0.50), &palm((0.0, 0.0))));
    }

    #[test]
    fn thumb_on_boundary_is_bent() {
        // center (50, 60) after scaling, radius 16 / 1.5 = 10.666…; put the tip
        // just inside the rim to stay clear of float rounding.
        let p = Palm { index_mcp: lm(0.42, 0.60, 0.0), pinky_mcp: lm(0.58, 0.60, 0.0) };
        let c = FingerClassifier::default();
        assert!(!c.classify(&thumb_with_tip(0.50, 0.60 + 0.1066), &p));
        assert!(c.classify(&thumb_with_tip(0.50, 0.60 + 0.1070), &p));
    }

    #[test]
    fn thumb_test_is_translation_invariant() {
        let c = FingerClassifier::default();
        let tips = [(0.50, 0.62), (0.20, 0.50), (0.505, 0.75), (0.70, 0.60)];
        for &(dx, dy) in &[(0.1, -0.2), (-0.3, 0.05), (0.0, 0.25)] {
            for &(x, y) in &tips {
                assert_eq!(
                    c.classify(&thumb_with_tip(x, y), &palm((0.0, 0.0))),
                    c.classify(&thumb_with_tip(x + dx, y + dy), &palm((dx, dy))),
                    "tip ({}, {}) moved by ({}, {})", x, y, dx, dy,
                );
            }
        }
    }

    #[test]
    fn scale_cancels_out_of_the_angle() {
        let f = finger_at(140.0);
        let a = FingerClassifier::new(120.0, 1.0).joint_angle(&f).unwrap();
        let b = FingerClassifier::new(120.0, 100.0).joint_angle(&f).unwrap();
        assert!((a - b).abs() < 1e-3);
    }

    #[test]
    fn landmark_offsets() {
        assert_eq!(FingerKind::Thumb.first_landmark(), 1);
        assert_eq!(FingerKind::Index.first_landmark(), 5);
        assert_eq!(FingerKind::Pinky.first_landmark(), 17);
    }
}
