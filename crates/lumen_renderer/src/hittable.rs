//! Hittable trait, HitRecord and the closed `Primitive` sum type.

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{
    BvhNode, ConstantMedium, Cuboid, FlipNormals, Material, Rect, RotateY, SceneError, Sphere,
    Translate,
};

/// Record of a ray-object intersection.
///
/// Built fresh for every successful query and never mutated afterwards;
/// decorators derive a new record from their child's.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// UV texture coordinates
    pub u: f64,
    pub v: f64,
    /// Point of intersection
    pub p: Vec3,
    /// Outward surface normal (flipped only by `FlipNormals`)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` whose parameter lies in `ray_t`.
    ///
    /// The rng is only consumed by participating media.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore)
        -> Option<HitRecord<'a>>;

    /// Bounding box over the shutter interval `[time0, time1]`, or `None`
    /// if the object is unbounded or empty.
    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb>;
}

/// Every kind of geometry the renderer knows about.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Rect(Rect),
    Cuboid(Cuboid),
    Translate(Translate),
    RotateY(RotateY),
    FlipNormals(FlipNormals),
    ConstantMedium(ConstantMedium),
    Bvh(BvhNode),
    List(PrimitiveList),
}

impl Primitive {
    /// Shift this primitive by `offset`.
    pub fn translate(self, offset: Vec3) -> Primitive {
        Primitive::Translate(Translate::new(self, offset))
    }

    /// Rotate this primitive about the Y axis by `degrees`.
    pub fn rotate_y(self, degrees: f64) -> Primitive {
        Primitive::RotateY(RotateY::new(self, degrees))
    }

    /// Negate every normal reported by this primitive.
    pub fn flip_normals(self) -> Primitive {
        Primitive::FlipNormals(FlipNormals::new(self))
    }
}

impl Hittable for Primitive {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            Primitive::Sphere(p) => p.hit(ray, ray_t, rng),
            Primitive::Rect(p) => p.hit(ray, ray_t, rng),
            Primitive::Cuboid(p) => p.hit(ray, ray_t, rng),
            Primitive::Translate(p) => p.hit(ray, ray_t, rng),
            Primitive::RotateY(p) => p.hit(ray, ray_t, rng),
            Primitive::FlipNormals(p) => p.hit(ray, ray_t, rng),
            Primitive::ConstantMedium(p) => p.hit(ray, ray_t, rng),
            Primitive::Bvh(p) => p.hit(ray, ray_t, rng),
            Primitive::List(p) => p.hit(ray, ray_t, rng),
        }
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        match self {
            Primitive::Sphere(p) => p.bounding_box(time0, time1),
            Primitive::Rect(p) => p.bounding_box(time0, time1),
            Primitive::Cuboid(p) => p.bounding_box(time0, time1),
            Primitive::Translate(p) => p.bounding_box(time0, time1),
            Primitive::RotateY(p) => p.bounding_box(time0, time1),
            Primitive::FlipNormals(p) => p.bounding_box(time0, time1),
            Primitive::ConstantMedium(p) => p.bounding_box(time0, time1),
            Primitive::Bvh(p) => p.bounding_box(time0, time1),
            Primitive::List(p) => p.bounding_box(time0, time1),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Primitive {
                fn from(p: $variant) -> Self {
                    Primitive::$variant(p)
                }
            }
        )*
    };
}

impl_from_primitive!(Sphere, Rect, Cuboid, Translate, RotateY, FlipNormals, ConstantMedium);

impl From<BvhNode> for Primitive {
    fn from(node: BvhNode) -> Self {
        Primitive::Bvh(node)
    }
}

impl From<PrimitiveList> for Primitive {
    fn from(list: PrimitiveList) -> Self {
        Primitive::List(list)
    }
}

/// A list of primitives tested one after another.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveList {
    objects: Vec<Primitive>,
}

impl PrimitiveList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Primitive>) {
        self.objects.push(object.into());
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.objects.iter()
    }

    /// Consume the list and build a BVH over its objects.
    pub fn into_bvh(
        self,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> Result<BvhNode, SceneError> {
        BvhNode::new(self.objects, time0, time1, rng)
    }
}

impl From<Vec<Primitive>> for PrimitiveList {
    fn from(objects: Vec<Primitive>) -> Self {
        Self { objects }
    }
}

impl FromIterator<Primitive> for PrimitiveList {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl Hittable for PrimitiveList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let closest_so_far = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far), rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        let (first, rest) = self.objects.split_first()?;
        rest.iter().try_fold(first.bounding_box(time0, time1)?, |acc, object| {
            let bbox = object.bounding_box(time0, time1)?;
            Some(Aabb::surrounding(&acc, &bbox))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{gray, rng};

    fn sphere_at(z: f64) -> Primitive {
        Sphere::new(Vec3::new(0.0, 0.0, z), 0.5, gray()).into()
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let list: PrimitiveList = vec![sphere_at(-5.0), sphere_at(-2.0), sphere_at(-8.0)].into();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let rec = list
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng())
            .unwrap();
        assert!((rec.t - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_list_miss() {
        let list: PrimitiveList = vec![sphere_at(-5.0)].into();
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert!(list.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng()).is_none());
    }

    #[test]
    fn test_list_respects_interval() {
        let list: PrimitiveList = vec![sphere_at(-5.0)].into();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(list.hit(&ray, Interval::new(0.001, 4.0), &mut rng()).is_none());
    }

    #[test]
    fn test_empty_list_has_no_bounding_box() {
        assert!(PrimitiveList::new().bounding_box(0.0, 1.0).is_none());
    }

    #[test]
    fn test_list_bounding_box_is_union() {
        let list: PrimitiveList = vec![sphere_at(-5.0), sphere_at(2.0)].into();
        let bbox = list.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min(), Vec3::new(-0.5, -0.5, -5.5));
        assert_eq!(bbox.max(), Vec3::new(0.5, 0.5, 2.5));
    }

    #[test]
    fn test_list_with_unbounded_child_has_no_box() {
        let mut list = PrimitiveList::new();
        list.add(sphere_at(0.0));
        list.add(PrimitiveList::new());
        assert!(list.bounding_box(0.0, 1.0).is_none());
    }
}
