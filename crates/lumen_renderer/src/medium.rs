//! Constant-density participating medium (smoke, fog).

use std::sync::Arc;

use lumen_core::random::gen_f64;
use lumen_core::Texture;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Primitive};
use crate::Material;

/// Offset past the entry point when searching for the exit point.
const EXIT_SEARCH_EPSILON: f64 = 0.0001;

/// Volume filling a closed boundary with uniform density.
///
/// A ray crossing the boundary scatters at an exponentially distributed
/// distance inside it, or passes through.
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: Box<Primitive>,
    density: f64,
    phase_function: Arc<Material>,
}

impl ConstantMedium {
    /// Medium scattering isotropically with the given albedo texture.
    pub fn new(boundary: Primitive, density: f64, albedo: Arc<Texture>) -> Self {
        Self {
            boundary: Box::new(boundary),
            density,
            phase_function: Arc::new(Material::isotropic(albedo)),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Entry and exit along the whole line, then clipped to the query range
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_SEARCH_EPSILON, f64::INFINITY),
            rng,
        )?;

        let t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        let t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = -(1.0 / self.density) * gen_f64(rng).ln();
        if hit_distance >= distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;

        // Normal and uv are arbitrary inside a volume
        Some(HitRecord {
            t,
            u: 0.0,
            v: 0.0,
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
        })
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{gray, rng};
    use crate::{Cuboid, Sphere};
    use lumen_math::Color;

    const FULL: Interval = Interval {
        min: 0.001,
        max: f64::INFINITY,
    };

    fn fog(density: f64) -> ConstantMedium {
        let boundary = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, gray());
        ConstantMedium::new(boundary.into(), density, Arc::new(Texture::constant(Color::ONE)))
    }

    #[test]
    fn test_dense_medium_scatters_near_entry() {
        let medium = fog(1e6);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let rec = medium.hit(&ray, FULL, &mut rng()).unwrap();
        assert!(rec.t >= 4.0 && rec.t < 4.01, "t = {}", rec.t);
        assert_eq!(rec.normal, Vec3::X);
        assert_eq!((rec.u, rec.v), (0.0, 0.0));
        assert!(matches!(rec.material, Material::Isotropic(_)));
    }

    #[test]
    fn test_thin_medium_mostly_passes_through() {
        let medium = fog(1e-6);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let mut rng = rng();

        let hits = (0..1000)
            .filter(|_| medium.hit(&ray, FULL, &mut rng).is_some())
            .count();
        assert!(hits < 5, "{hits} hits");
    }

    #[test]
    fn test_hit_lies_inside_boundary() {
        let medium = fog(0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0), 0.0);
        let mut rng = rng();

        for _ in 0..500 {
            if let Some(rec) = medium.hit(&ray, FULL, &mut rng) {
                // Boundary spans t in [2, 3] for this unnormalised direction
                assert!(rec.t >= 2.0 && rec.t <= 3.0, "t = {}", rec.t);
            }
        }
    }

    #[test]
    fn test_medium_miss_when_boundary_missed() {
        let medium = fog(1e6);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert!(medium.hit(&ray, FULL, &mut rng()).is_none());
    }

    #[test]
    fn test_medium_respects_query_max() {
        // Exit is clipped to the query max; a range ending before entry never hits
        let medium = fog(1e6);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(medium.hit(&ray, Interval::new(0.001, 3.5), &mut rng()).is_none());
    }

    #[test]
    fn test_medium_hit_clipped_to_query_max() {
        let medium = fog(0.8);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let mut rng = rng();

        for _ in 0..500 {
            if let Some(rec) = medium.hit(&ray, Interval::new(0.001, 4.5), &mut rng) {
                assert!(rec.t < 4.5, "t = {}", rec.t);
            }
        }
    }

    #[test]
    fn test_ray_starting_inside_medium() {
        let boundary = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0), gray());
        let medium = ConstantMedium::new(
            boundary.into(),
            1e6,
            Arc::new(Texture::constant(Color::ONE)),
        );
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);

        let rec = medium.hit(&ray, FULL, &mut rng()).unwrap();
        assert!(rec.t >= 0.001 && rec.t < 0.01, "t = {}", rec.t);
    }

    #[test]
    fn test_medium_bounding_box_is_boundary_box() {
        let medium = fog(1.0);
        let bbox = medium.bounding_box(0.0, 1.0).unwrap();
        assert_eq!(bbox.min(), Vec3::new(-1.0, -1.0, -6.0));
        assert_eq!(bbox.max(), Vec3::new(1.0, 1.0, -4.0));
    }
}
