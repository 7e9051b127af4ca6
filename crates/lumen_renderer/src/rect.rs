//! Axis-aligned rectangles.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// Half thickness of a rectangle's bounding slab along its constant axis.
const SLAB_PADDING: f64 = 0.0001;

/// Plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Spans x and y at constant z, normal +Z
    XY,
    /// Spans x and z at constant y, normal +Y
    XZ,
    /// Spans y and z at constant x, normal +X
    YZ,
}

impl Plane {
    /// Component indices `(a, b, k)`: the two spanned axes and the constant one.
    #[inline]
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }

    pub fn normal(self) -> Vec3 {
        match self {
            Plane::XY => Vec3::Z,
            Plane::XZ => Vec3::Y,
            Plane::YZ => Vec3::X,
        }
    }
}

/// A rectangle `[a0, a1] x [b0, b1]` at offset `k` in one of the axis planes.
#[derive(Debug, Clone)]
pub struct Rect {
    plane: Plane,
    a: Interval,
    b: Interval,
    k: f64,
    material: Arc<Material>,
}

impl Rect {
    pub fn new(
        plane: Plane,
        a: Interval,
        b: Interval,
        k: f64,
        material: Arc<Material>,
    ) -> Self {
        Self {
            plane,
            a,
            b,
            k,
            material,
        }
    }

    pub fn xy(x0: f64, x1: f64, y0: f64, y1: f64, k: f64, material: Arc<Material>) -> Self {
        Self::new(Plane::XY, Interval::new(x0, x1), Interval::new(y0, y1), k, material)
    }

    pub fn xz(x0: f64, x1: f64, z0: f64, z1: f64, k: f64, material: Arc<Material>) -> Self {
        Self::new(Plane::XZ, Interval::new(x0, x1), Interval::new(z0, z1), k, material)
    }

    pub fn yz(y0: f64, y1: f64, z0: f64, z1: f64, k: f64, material: Arc<Material>) -> Self {
        Self::new(Plane::YZ, Interval::new(y0, y1), Interval::new(z0, z1), k, material)
    }
}

impl Hittable for Rect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (ai, bi, ki) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        // Parallel rays give +-inf or NaN, which no interval contains
        let t = (self.k - origin[ki]) / direction[ki];
        if !ray_t.contains(t) {
            return None;
        }

        let a = origin[ai] + t * direction[ai];
        let b = origin[bi] + t * direction[bi];
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        Some(HitRecord {
            t,
            u: (a - self.a.min) / self.a.size(),
            v: (b - self.b.min) / self.b.size(),
            p: ray.at(t),
            normal: self.plane.normal(),
            material: &self.material,
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let (ai, bi, ki) = self.plane.axes();
        let mut intervals = [Interval::EMPTY; 3];
        intervals[ai] = self.a;
        intervals[bi] = self.b;
        intervals[ki] = Interval::new(self.k - SLAB_PADDING, self.k + SLAB_PADDING);

        let [x, y, z] = intervals;
        Some(Aabb::new(x, y, z))
    }
}
