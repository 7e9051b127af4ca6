//! Sphere primitive, optionally moving linearly over the shutter interval.

use std::f64::consts::PI;
use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// A sphere whose center moves from `center0` at `time0` to `center1` at `time1`.
///
/// A stationary sphere has both centers equal.
#[derive(Debug, Clone)]
pub struct Sphere {
    center0: Vec3,
    center1: Vec3,
    time0: f64,
    time1: f64,
    radius: f64,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f64, material: Arc<Material>) -> Self {
        Self::moving(center, center, 0.0, 1.0, radius, material)
    }

    /// Create a sphere moving linearly between two centers.
    pub fn moving(
        center0: Vec3,
        center1: Vec3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
        }
    }

    /// Center at `time`. Extrapolates linearly outside `[time0, time1]`.
    pub fn center(&self, time: f64) -> Vec3 {
        if self.center0 == self.center1 || self.time0 == self.time1 {
            return self.center0;
        }
        let s = (time - self.time0) / (self.time1 - self.time0);
        self.center0 + s * (self.center1 - self.center0)
    }

    /// UV coordinates for a point on the unit sphere.
    pub fn sphere_uv(p: Vec3) -> (f64, f64) {
        let phi = p.z.atan2(p.x);
        let theta = p.y.clamp(-1.0, 1.0).asin();

        let u = 1.0 - (phi + PI) / (2.0 * PI);
        let v = (theta + PI / 2.0) / PI;
        (u, v)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let oc = ray.origin() - center;
        let a = ray.direction().length_squared();
        let b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.at(root);
        let normal = (p - center) / self.radius;
        let (u, v) = Self::sphere_uv(normal);

        Some(HitRecord {
            t: root,
            u,
            v,
            p,
            normal,
            material: &self.material,
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        let rvec = Vec3::splat(self.radius);
        let box0 = Aabb::from_points(self.center0 - rvec, self.center0 + rvec);
        let box1 = Aabb::from_points(self.center1 - rvec, self.center1 + rvec);
        Some(Aabb::surrounding(&box0, &box1))
    }
}
