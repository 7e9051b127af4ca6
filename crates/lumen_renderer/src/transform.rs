//! Instance decorators that move, rotate or flip a child primitive.
//!
//! Rays are taken into the child's local space, the child is queried, and
//! the resulting hit is mapped back to world space.

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Primitive};

/// Child shifted by a constant offset.
#[derive(Debug, Clone)]
pub struct Translate {
    object: Box<Primitive>,
    offset: Vec3,
}

impl Translate {
    pub fn new(object: Primitive, offset: Vec3) -> Self {
        Self {
            object: Box::new(object),
            offset,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());
        let rec = self.object.hit(&local_ray, ray_t, rng)?;

        Some(HitRecord {
            p: rec.p + self.offset,
            ..rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.object
            .bounding_box(time0, time1)
            .map(|bbox| bbox.translate(self.offset))
    }
}

/// Child rotated about the Y axis.
#[derive(Debug, Clone)]
pub struct RotateY {
    object: Box<Primitive>,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Option<Aabb>,
}

impl RotateY {
    /// Rotate `object` by `degrees` (positive turns +X toward -Z).
    ///
    /// The world box is computed once from the child's box over `[0, 1]`.
    pub fn new(object: Primitive, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        let (sin_theta, cos_theta) = radians.sin_cos();

        let mut rotated = Self {
            object: Box::new(object),
            sin_theta,
            cos_theta,
            bbox: None,
        };

        rotated.bbox = rotated
            .object
            .bounding_box(0.0, 1.0)
            .and_then(|bbox| Aabb::enclosing(bbox.corners().map(|c| rotated.to_world(c))));

        rotated
    }

    /// World space to object space.
    #[inline]
    fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object space to world space.
    #[inline]
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(
            self.to_local(ray.origin()),
            self.to_local(ray.direction()),
            ray.time(),
        );
        let rec = self.object.hit(&local_ray, ray_t, rng)?;

        Some(HitRecord {
            p: self.to_world(rec.p),
            normal: self.to_world(rec.normal),
            ..rec
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Option<Aabb> {
        self.bbox
    }
}

/// Child with every reported normal negated.
#[derive(Debug, Clone)]
pub struct FlipNormals {
    object: Box<Primitive>,
}

impl FlipNormals {
    pub fn new(object: Primitive) -> Self {
        Self {
            object: Box::new(object),
        }
    }
}

impl Hittable for FlipNormals {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let rec = self.object.hit(ray, ray_t, rng)?;
        Some(HitRecord {
            normal: -rec.normal,
            ..rec
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.object.bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{gray, rng};
    use crate::{Cuboid, PrimitiveList, Rect, Sphere};

    const FULL: Interval = Interval {
        min: 0.001,
        max: f64::INFINITY,
    };

    fn unit_sphere() -> Primitive {
        Sphere::new(Vec3::ZERO, 1.0, gray()).into()
    }

    #[test]
    fn test_translate_moves_hit_point() {
        let moved = unit_sphere().translate(Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let rec = moved.hit(&ray, FULL, &mut rng()).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-12);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-12);
        assert!((rec.normal - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_translate_bounding_box() {
        let moved = unit_sphere().translate(Vec3::new(2.0, 0.0, 0.0));
        let bbox = moved.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min(), Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(bbox.max(), Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_translate_of_unbounded_child() {
        let moved = Primitive::from(PrimitiveList::new()).translate(Vec3::ONE);
        assert!(moved.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        // Box spanning x in [1, 2] ends up spanning z in [-2, -1] (to_world of (1,0,0) is (0,0,-1))
        let cube = Primitive::from(Cuboid::new(
            Vec3::new(1.0, -0.5, -0.5),
            Vec3::new(2.0, 0.5, 0.5),
            gray(),
        ))
        .rotate_y(90.0);

        let bbox = cube.bounding_box(0.0, 1.0).unwrap();
        assert!((bbox.z.min - -2.0).abs() < 1e-9);
        assert!((bbox.z.max - -1.0).abs() < 1e-9);
        assert!((bbox.x.min - -0.5).abs() < 1e-9);
        assert!((bbox.x.max - 0.5).abs() < 1e-9);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let rec = cube.hit(&ray, FULL, &mut rng()).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-9);
        assert!((rec.p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-9);
        // Inner face normal (-X locally) maps to +Z in world space
        assert!((rec.normal - Vec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_rotate_y_round_trip() {
        let rotated = RotateY::new(unit_sphere(), 33.0);
        let v = Vec3::new(0.3, -1.2, 4.5);
        assert!((rotated.to_world(rotated.to_local(v)) - v).length() < 1e-12);
    }

    #[test]
    fn test_rotate_y_unbounded_child_has_no_box() {
        let rotated = RotateY::new(PrimitiveList::new().into(), 45.0);
        assert!(rotated.bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_flip_normals() {
        let rect = Primitive::from(Rect::xy(-1.0, 1.0, -1.0, 1.0, -1.0, gray()));
        let flipped = rect.clone().flip_normals();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let original = rect.hit(&ray, FULL, &mut rng()).unwrap();
        let rec = flipped.hit(&ray, FULL, &mut rng()).unwrap();
        assert_eq!(rec.normal, -original.normal);
        assert_eq!(rec.t, original.t);
        assert_eq!(
            flipped.bounding_box(0.0, 1.0),
            rect.bounding_box(0.0, 1.0)
        );
    }
}
