//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// Axis-aligned box with `min <= max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Aabb {
    /// Zero-volume box at the origin, used for models without geometry.
    pub const ZERO: Aabb = Aabb {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Build a box from two corners given in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Aabb::new(first, first), |acc, p| acc.include_point(p)))
    }

    #[inline]
    pub fn include_point(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    #[inline]
    pub fn union(self, other: Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    /// Largest dimension with zero (or non-finite) floored to 1.
    pub fn max_dimension_floored(&self) -> f32 {
        let d = self.max_dimension();
        if d > 0.0 && d.is_finite() {
            d
        } else {
            1.0
        }
    }

    /// Box enclosing the eight transformed corners.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];
        let mut out = Aabb::new(m.transform_point3(corners[0]), m.transform_point3(corners[0]));
        for c in &corners[1..] {
            out = out.include_point(m.transform_point3(*c));
        }
        out
    }

    /// Apply `p * scale + translation` to both corners.
    pub fn scaled_translated(&self, scale: f32, translation: Vec3) -> Self {
        Aabb::new(self.min * scale + translation, self.max * scale + translation)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}
