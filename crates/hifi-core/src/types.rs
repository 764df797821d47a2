//! Common types used across the HiFi exporter
//!
//! Vectors, quaternions and bounds follow a left-handed, Y-up convention.
//! Vectors serialize as `{"x":..,"y":..,"z":..}` objects.

use std::ops::{Add, Mul, Neg, Sub};
use serde::{Deserialize, Serialize};

/// Synthetic identifier assigned to exported entities
///
/// Rendered GUID-shaped: the number zero-padded to 32 digits and grouped
/// 8-4-4-4-12 inside braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Sentinel id meaning "no parent in this batch"
    pub const NONE: Self = Self(0);

    /// Reserved, never assigned
    pub const RESERVED: Self = Self(1);

    /// First id handed out to an entity
    pub const FIRST: Self = Self(2);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Convert to the braced GUID-like string format
    pub fn to_guid_string(&self) -> String {
        let digits = format!("{:032}", self.0);
        format!(
            "{{{}-{}-{}-{}-{}}}",
            &digits[0..8],
            &digits[8..12],
            &digits[12..16],
            &digits[16..20],
            &digits[20..32]
        )
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_guid_string())
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// 3D vector (position, scale, extent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Component-wise product
    pub fn scale(&self, other: &Self) -> Self {
        Self {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Exactly the zero vector (no epsilon)
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Rotation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    fn from_axis_angle(axis: Vec3, radians: f32) -> Self {
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Build from Euler angles in degrees, applied Z, then X, then Y
    pub fn from_euler_degrees(euler: Vec3) -> Self {
        let qx = Self::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), euler.x.to_radians());
        let qy = Self::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), euler.y.to_radians());
        let qz = Self::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), euler.z.to_radians());
        qy.mul(&qx).mul(&qz)
    }

    /// Hamilton product `self * other`
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Rotate a vector by this (unit) quaternion
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(&v) * 2.0;
        v + t * self.w + q.cross(&t)
    }

    /// Euler angles in degrees (X, Y, Z), inverse of `from_euler_degrees`
    pub fn to_euler_degrees(&self) -> Vec3 {
        let Quat { x, y, z, w } = *self;
        let sin_x = (2.0 * (w * x - y * z)).clamp(-1.0, 1.0);
        let ex = sin_x.asin();
        let (ey, ez) = if sin_x.abs() > 0.9999 {
            // Gimbal lock: fold Z into Y
            ((2.0 * (w * y - x * z)).atan2(1.0 - 2.0 * (y * y + z * z)), 0.0)
        } else {
            (
                (2.0 * (x * z + w * y)).atan2(1.0 - 2.0 * (x * x + y * y)),
                (2.0 * (x * y + w * z)).atan2(1.0 - 2.0 * (x * x + z * z)),
            )
        };
        Vec3::new(ex.to_degrees(), ey.to_degrees(), ez.to_degrees())
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Local transform of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    /// Compose `self` (parent, world space) with a child local transform
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation.rotate(self.scale.scale(&local.position)),
            rotation: self.rotation.mul(&local.rotation),
            scale: self.scale.scale(&local.scale),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const ZERO: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(&point);
        self.max = self.max.max(&point);
    }

    /// Grow to contain another box
    pub fn encapsulate(&mut self, other: &BoundingBox) {
        self.expand(other.min);
        self.expand(other.max);
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        let d = a - b;
        d.dot(&d) < 1e-8
    }

    #[test]
    fn test_vec3_operations() {
        let v1 = Vec3::new(1.0, 2.0, 3.0);
        let v2 = Vec3::new(4.0, 5.0, 6.0);

        assert!((v1.dot(&v2) - 32.0).abs() < 0.001);

        let cross = v1.cross(&v2);
        assert!((cross.x - (-3.0)).abs() < 0.001);
        assert!((cross.y - 6.0).abs() < 0.001);
        assert!((cross.z - (-3.0)).abs() < 0.001);

        assert_eq!(v1.scale(&v2), Vec3::new(4.0, 10.0, 18.0));
    }

    #[test]
    fn test_vec3_serializes_as_object() {
        let json = serde_json::to_string(&Vec3::new(1.0, 0.5, -2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":0.5,"z":-2.0}"#);
    }

    #[test]
    fn test_entity_id_format() {
        assert_eq!(
            EntityId::NONE.to_guid_string(),
            "{00000000-0000-0000-0000-000000000000}"
        );
        assert_eq!(
            EntityId::new(2).to_string(),
            "{00000000-0000-0000-0000-000000000002}"
        );
        assert_eq!(
            EntityId::new(1234567890123).to_guid_string(),
            "{00000000-0000-0000-0001-234567890123}"
        );
    }

    #[test]
    fn test_quat_rotation() {
        let q = Quat::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let rotated = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(rotated, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_quat_euler_roundtrip() {
        let euler = Vec3::new(30.0, 45.0, 60.0);
        let back = Quat::from_euler_degrees(euler).to_euler_degrees();
        assert!(approx(euler, back));
    }

    #[test]
    fn test_transform_compose() {
        let parent = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let child = Transform::from_position(Vec3::new(1.0, 1.0, 1.0));

        let world = parent.compose(&child);
        assert!(approx(world.position, Vec3::new(12.0, 2.0, 2.0)));
        assert_eq!(world.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_bounding_box_encapsulate() {
        let mut bbox = BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        bbox.encapsulate(&BoundingBox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)));

        assert_eq!(bbox.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max, Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(bbox.size(), Vec3::new(4.0, 2.0, 2.0));
    }
}
