//! Plane and vector primitives used by the finger classifier.

// ════════════════════════════════════════════════════════════════════════════
// Point2 / Circle: the thumb's palm test
// ════════════════════════════════════════════════════════════════════════════

/// A point in the image plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self { Point2 { x, y } }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The point halfway between `self` and `other`.
    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Point2, radius: f32) -> Self { Circle { center, radius } }

    /// Inside or on the boundary.
    pub fn contains(&self, p: Point2) -> bool {
        p.distance_to(self.center) <= self.radius
    }

    pub fn area(&self) -> f32 { std::f32::consts::PI * self.radius * self.radius }

    pub fn circumference(&self) -> f32 { 2.0 * std::f32::consts::PI * self.radius }
}

// ════════════════════════════════════════════════════════════════════════════
// Vec3: the joint-angle test
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self { Vec3 { x, y, z } }

    /// Vector pointing from `from` to `to`.
    pub fn between(from: Vec3, to: Vec3) -> Vec3 {
        Vec3::new(to.x - from.x, to.y - from.y, to.z - from.z)
    }

    pub fn scaled(self, k: f32) -> Vec3 { Vec3::new(self.x * k, self.y * k, self.z * k) }

    pub fn dot(self, o: Vec3) -> f32 { self.x * o.x + self.y * o.y + self.z * o.z }

    pub fn length(self) -> f32 { self.dot(self).sqrt() }

    /// Angle to `other` in degrees, `None` when either vector has zero length.
    pub fn angle_deg(self, other: Vec3) -> Option<f32> {
        let denom = self.length() * other.length();
        if denom <= f32::EPSILON {
            return None;
        }
        let cos_a = (self.dot(other) / denom).clamp(-1.0, 1.0);
        Some(cos_a.acos().to_degrees())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
