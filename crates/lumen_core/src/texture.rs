//! Textures sampled by materials.
//!
//! A texture maps surface coordinates `(u, v)` and the world-space hit point
//! to a color. Textures are built before rendering and are read-only while
//! the render threads sample them.

use std::path::Path;
use std::sync::Arc;

use lumen_math::{Color, Vec3};
use rand::RngCore;
use thiserror::Error;

use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};

/// Errors that can occur while building or loading an image texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Texture has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Expected {expected} pixels for a {width}x{height} texture, got {actual}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Albedo / emission source.
#[derive(Debug, Clone)]
pub enum Texture {
    /// The same color everywhere.
    Constant(Color),
    /// 3D checkerboard alternating between two sub-textures.
    Checker { odd: Arc<Texture>, even: Arc<Texture> },
    /// Marble-like turbulence pattern.
    Noise(NoiseTexture),
    /// Decoded RGB pixel grid addressed by `(u, v)`.
    Image(ImageTexture),
}

impl Texture {
    pub fn constant(color: Color) -> Self {
        Texture::Constant(color)
    }

    pub fn checker(odd: Arc<Texture>, even: Arc<Texture>) -> Self {
        Texture::Checker { odd, even }
    }

    /// Noise texture with a freshly generated Perlin table.
    pub fn noise(scale: f64, rng: &mut dyn RngCore) -> Self {
        Texture::Noise(NoiseTexture::new(scale, rng))
    }

    pub fn image(image: ImageTexture) -> Self {
        Texture::Image(image)
    }

    /// Sample the texture.
    pub fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        match self {
            Texture::Constant(color) => *color,
            Texture::Checker { odd, even } => {
                let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
                if sines < 0.0 {
                    odd.value(u, v, p)
                } else {
                    even.value(u, v, p)
                }
            }
            Texture::Noise(noise) => noise.value(p),
            Texture::Image(image) => image.value(u, v),
        }
    }
}

/// Perlin turbulence modulating a sine along Z.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    perlin: Perlin,
    scale: f64,
}

impl NoiseTexture {
    pub fn new(scale: f64, rng: &mut dyn RngCore) -> Self {
        Self {
            perlin: Perlin::new(rng),
            scale,
        }
    }

    pub fn value(&self, p: Vec3) -> Color {
        let turb = self.perlin.turb(p, DEFAULT_TURBULENCE_DEPTH);
        Color::ONE * 0.5 * (1.0 + (self.scale * p.z + 10.0 * turb).sin())
    }
}

/// A decoded RGB image used as a texture.
///
/// Pixels are stored row-major with row 0 at the top of the image.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl ImageTexture {
    /// Create a texture from an already decoded pixel grid.
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 3]>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }

        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a texture from an `image` RGB buffer.
    pub fn from_rgb_image(img: &image::RgbImage) -> TextureResult<Self> {
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|p| p.0).collect();
        Self::new(width, height, pixels)
    }

    /// Decode an image file (any format the `image` crate understands).
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgb8();
        let texture = Self::from_rgb_image(&img)?;

        log::debug!(
            "Loaded texture: {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );

        Ok(texture)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-pixel lookup, `v = 1` is the top row. Out-of-range
    /// coordinates clamp to the border.
    pub fn value(&self, u: f64, v: f64) -> Color {
        let nx = self.width as f64;
        let ny = self.height as f64;

        let i = ((u * nx) as i64).clamp(0, self.width as i64 - 1) as u32;
        let j = (((1.0 - v) * ny - 0.001) as i64).clamp(0, self.height as i64 - 1) as u32;

        let [r, g, b] = self.get_pixel(i, j);
        Color::new(r as f64, g as f64, b as f64) / 255.0
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[pixel_index(x, y, self.width)]
    }
}

/// Row-major index, computed in `usize` so large images cannot overflow.
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_by_two() -> ImageTexture {
        // top row: red, green; bottom row: blue, white
        ImageTexture::new(
            2,
            2,
            vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]],
        )
        .unwrap()
    }

    #[test]
    fn test_pixel_index_past_u32_range() {
        // 70000 * 70000 does not fit in a u32
        assert_eq!(pixel_index(5, 70_000, 70_000), 4_900_000_005);
        assert_eq!(pixel_index(1, 1, 2), 3);
    }

    #[test]
    fn test_constant_texture() {
        let tex = Texture::constant(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.3, 0.9, Vec3::new(4.0, 5.0, 6.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_texture_alternates() {
        let odd = Arc::new(Texture::constant(Color::ZERO));
        let even = Arc::new(Texture::constant(Color::ONE));
        let checker = Texture::checker(odd, even);

        // sin(1)^3 > 0 -> even
        let p = Vec3::splat(0.1);
        assert_eq!(checker.value(0.0, 0.0, p), Color::ONE);

        // flip one coordinate's sign -> odd
        let q = Vec3::new(-0.1, 0.1, 0.1);
        assert_eq!(checker.value(0.0, 0.0, q), Color::ZERO);
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let tex = Texture::noise(4.0, &mut rng);
        for i in 0..100 {
            let p = Vec3::new(i as f64 * 0.37, i as f64 * -0.11, i as f64 * 0.73);
            let c = tex.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            // grey: all channels equal
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }

    #[test]
    fn test_image_texture_lookup() {
        let tex = two_by_two();

        // v = 1 is the top of the image
        assert_eq!(tex.value(0.25, 0.75), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.75, 0.75), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.25, 0.25), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value(0.75, 0.25), Color::ONE);
    }

    #[test]
    fn test_image_texture_clamps_out_of_range() {
        let tex = two_by_two();
        assert_eq!(tex.value(-3.0, 2.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(5.0, -1.0), Color::ONE);
        assert_eq!(tex.value(1.0, 0.0), Color::ONE);
    }

    #[test]
    fn test_image_texture_rejects_bad_dimensions() {
        assert!(matches!(
            ImageTexture::new(0, 4, vec![]),
            Err(TextureError::Empty { .. })
        ));
        assert!(matches!(
            ImageTexture::new(2, 2, vec![[0, 0, 0]; 3]),
            Err(TextureError::PixelCountMismatch { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn test_image_texture_from_rgb_image() {
        let img = image::RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 100, y as u8 * 200, 7]));
        let tex = ImageTexture::from_rgb_image(&img).unwrap();

        assert_eq!(tex.width(), 3);
        assert_eq!(tex.height(), 2);
        assert_eq!(tex.get_pixel(2, 1), [200, 200, 7]);
    }

    #[test]
    fn test_image_texture_load_png() {
        let path = std::env::temp_dir().join(format!("lumen_texture_{}.png", std::process::id()));
        image::RgbImage::from_pixel(4, 4, image::Rgb([255, 0, 255]))
            .save(&path)
            .unwrap();

        let tex = ImageTexture::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(tex.width(), 4);
        assert_eq!(tex.value(0.5, 0.5), Color::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_image_texture_load_missing_file() {
        let result = ImageTexture::load("/definitely/not/here.png");
        assert!(result.is_err());
    }
}
