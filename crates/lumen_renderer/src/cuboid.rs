//! Axis-aligned box built from six rectangles.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Primitive, PrimitiveList};
use crate::{Material, Rect};

/// Box spanning `[p_min, p_max]`. Every face normal points outward.
#[derive(Debug, Clone)]
pub struct Cuboid {
    p_min: Vec3,
    p_max: Vec3,
    sides: PrimitiveList,
}

impl Cuboid {
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<Material>) -> Self {
        let p_min = p0.min(p1);
        let p_max = p0.max(p1);
        let m = || Arc::clone(&material);

        let sides: PrimitiveList = vec![
            Primitive::from(Rect::xy(p_min.x, p_max.x, p_min.y, p_max.y, p_max.z, m())),
            Primitive::from(Rect::xy(p_min.x, p_max.x, p_min.y, p_max.y, p_min.z, m())).flip_normals(),
            Primitive::from(Rect::xz(p_min.x, p_max.x, p_min.z, p_max.z, p_max.y, m())),
            Primitive::from(Rect::xz(p_min.x, p_max.x, p_min.z, p_max.z, p_min.y, m())).flip_normals(),
            Primitive::from(Rect::yz(p_min.y, p_max.y, p_min.z, p_max.z, p_max.x, m())),
            Primitive::from(Rect::yz(p_min.y, p_max.y, p_min.z, p_max.z, p_min.x, m())).flip_normals(),
        ]
        .into();

        Self {
            p_min,
            p_max,
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        Some(Aabb::from_points(self.p_min, self.p_max))
    }
}
