//! Thin-lens camera for ray generation.

use lumen_core::random::{gen_range_f64, random_in_unit_disk};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Configured with the `with_*` builders; derived viewport vectors are
/// recomputed after every change.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f64,       // Vertical field of view in degrees
    aperture: f64,   // Lens diameter, 0 = pinhole
    focus_dist: f64, // Distance from camera to plane of perfect focus
    aspect: f64,     // Viewport width / height

    // Shutter interval
    time0: f64,
    time1: f64,

    // Cached computed values (set by initialize())
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Create a new camera with default settings: at the origin looking down
    /// -Z, 90 degree field of view, pinhole lens, square viewport.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            aspect: 1.0,
            time0: 0.0,
            time1: 0.0,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self.initialize();
        self
    }

    /// Set the viewport aspect ratio (width / height).
    pub fn with_aspect(mut self, aspect: f64) -> Self {
        self.aspect = aspect;
        self.initialize();
        self
    }

    /// Set the shutter interval rays are timestamped within.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    /// Recompute the viewport from the current settings.
    pub fn initialize(&mut self) {
        self.lens_radius = self.aperture / 2.0;

        let theta = self.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = self.aspect * half_height;

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(w).normalize();
        self.v = w.cross(self.u);

        let fd = self.focus_dist;
        self.lower_left = self.look_from
            - half_width * fd * self.u
            - half_height * fd * self.v
            - fd * w;
        self.horizontal = 2.0 * half_width * fd * self.u;
        self.vertical = 2.0 * half_height * fd * self.v;
    }

    /// Get a ray through viewport coordinates `(s, t)`, both in `[0, 1]`
    /// with `(0, 0)` at the lower left.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;
        let origin = self.look_from + offset;
        let direction = self.lower_left + s * self.horizontal + t * self.vertical - origin;
        let time = if self.time1 > self.time0 {
            gen_range_f64(rng, self.time0, self.time1)
        } else {
            self.time0
        };

        Ray::new(origin, direction, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::rng;

    #[test]
    fn test_default_camera_center_ray() {
        let camera = Camera::new();
        let ray = camera.get_ray(0.5, 0.5, &mut rng());

        assert_eq!(ray.origin(), Vec3::ZERO);
        assert!((ray.direction().normalize() - -Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_viewport_corners() {
        // 90 degree fov, aspect 2: viewport spans x in [-2, 2], y in [-1, 1] at z = -1
        let camera = Camera::new().with_aspect(2.0);
        let mut rng = rng();

        let lower_left = camera.get_ray(0.0, 0.0, &mut rng).direction();
        assert!((lower_left - Vec3::new(-2.0, -1.0, -1.0)).length() < 1e-12);

        let upper_right = camera.get_ray(1.0, 1.0, &mut rng).direction();
        assert!((upper_right - Vec3::new(2.0, 1.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_look_at_orientation() {
        let camera = Camera::new()
            .with_position(Vec3::new(0.0, 0.0, 5.0), Vec3::new(10.0, 0.0, 5.0), Vec3::Y)
            .with_lens(40.0, 0.0, 10.0);
        let ray = camera.get_ray(0.5, 0.5, &mut rng());

        assert_eq!(ray.origin(), Vec3::new(0.0, 0.0, 5.0));
        assert!((ray.direction().normalize() - Vec3::X).length() < 1e-12);
    }

    #[test]
    fn test_aperture_jitters_origin_but_keeps_focus() {
        let camera = Camera::new()
            .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
            .with_lens(60.0, 2.0, 4.0);
        let mut rng = rng();

        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            assert!(ray.origin().z == 0.0);
            assert!(ray.origin().length() < 1.0);
            // Every ray through the center passes through the focus point
            let focus = ray.at(1.0);
            assert!((focus - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-9);
        }
    }

    #[test]
    fn test_shutter_times() {
        let camera = Camera::new().with_shutter(0.25, 0.75);
        let mut rng = rng();

        for _ in 0..100 {
            let time = camera.get_ray(0.3, 0.6, &mut rng).time();
            assert!((0.25..0.75).contains(&time));
        }

        let still = Camera::new().with_shutter(0.4, 0.4);
        assert_eq!(still.get_ray(0.5, 0.5, &mut rng).time(), 0.4);
    }
}
