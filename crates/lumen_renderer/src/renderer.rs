//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum depth
//! - Emission from lights plus attenuated scattered radiance
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma correction

use lumen_math::{Color, Interval, Ray};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::material::Scatter;
use crate::strip::DEFAULT_STRIP_HEIGHT;
use crate::{Camera, Hittable, RenderError, RenderResult};

/// Minimum hit distance, keeps scattered rays from re-hitting their origin.
pub const HIT_EPSILON: f64 = 0.001;

/// What a ray sees when it escapes the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Enclosed scenes lit only by emissive materials
    #[default]
    Black,
    Solid(Color),
    /// White at the horizon blending to light blue overhead
    SkyGradient,
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Black => Color::ZERO,
            Background::Solid(color) => *color,
            Background::SkyGradient => sky_gradient(ray),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Number of render threads
    pub worker_count: usize,
    /// Rows per work unit
    pub strip_height: u32,
    pub background: Background,
    /// Base seed; `None` draws one from entropy
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            strip_height: DEFAULT_STRIP_HEIGHT,
            background: Background::Black,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Check the settings against an image size before rendering.
    pub fn validate(&self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::NoSamples);
        }
        if self.worker_count == 0 {
            return Err(RenderError::NoWorkers);
        }
        if self.strip_height == 0 {
            return Err(RenderError::EmptyStrip);
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// `depth` counts bounces taken so far; the path is truncated to the
/// emitted light once it reaches `config.max_depth`.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, Interval::new(HIT_EPSILON, f64::INFINITY), rng) else {
        return config.background.color(ray);
    };

    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);
    if depth >= config.max_depth {
        return emitted;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth + 1, config, rng);
            emitted + result.attenuation * scattered_color
        }
        // Absorbed
        None => emitted,
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Replace NaN or infinite channels with 0. Returns whether anything changed.
#[inline]
pub fn sanitize(color: Color) -> (Color, bool) {
    if color.is_finite() {
        return (color, false);
    }
    let fix = |c: f64| if c.is_finite() { c } else { 0.0 };
    (Color::new(fix(color.x), fix(color.y), fix(color.z)), true)
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
fn clamp_01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Convert a linear color to gamma-corrected 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f64| (255.99 * clamp_01(linear_to_gamma(c))) as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Averaged linear color of one pixel plus the number of discarded samples.
#[derive(Debug, Clone, Copy)]
pub struct PixelEstimate {
    pub color: Color,
    /// Samples with at least one non-finite channel
    pub non_finite: u32,
}

/// Render a single pixel with multi-sampling.
///
/// `y` counts rows from the top of the image.
#[allow(clippy::too_many_arguments)]
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> PixelEstimate {
    let mut pixel_color = Color::ZERO;
    let mut non_finite = 0;
    let row_from_bottom = (height - 1 - y) as f64;

    for _ in 0..config.samples_per_pixel {
        let s = (x as f64 + rng_f64(rng)) / width as f64;
        let t = (row_from_bottom + rng_f64(rng)) / height as f64;
        let ray = camera.get_ray(s, t, rng);

        let (sample, fixed) = sanitize(ray_color(&ray, world, 0, config, rng));
        non_finite += u32::from(fixed);
        pixel_color += sample;
    }

    PixelEstimate {
        color: pixel_color / config.samples_per_pixel as f64,
        non_finite,
    }
}

#[inline]
fn rng_f64(rng: &mut dyn RngCore) -> f64 {
    lumen_core::random::gen_f64(rng)
}

/// 8-bit RGBA pixel.
pub type Rgba = [u8; 4];

/// Output image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    /// Create a framebuffer with every pixel zeroed, alpha included.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Raw RGBA bytes, 4 per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
