//! Lumen Core - textures and sampling building blocks.
//!
//! This crate provides:
//!
//! - **Textures**: the `Texture` sum type (constant, checker, Perlin noise,
//!   image) that materials sample by `(u, v, point)`
//! - **Perlin noise**: gradient noise with turbulence, built once and then
//!   read-only
//! - **Sampling helpers**: uniform random numbers and rejection-sampled points
//!   in the unit sphere / disk, all drawing from a caller-supplied rng
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{ImageTexture, Texture};
//!
//! let earth = Texture::image(ImageTexture::load("earth.png")?);
//! let albedo = earth.value(0.5, 0.5, Vec3::ZERO);
//! ```

pub mod perlin;
pub mod random;
pub mod texture;

// Re-export commonly used types
pub use perlin::Perlin;
pub use texture::{ImageTexture, NoiseTexture, Texture, TextureError, TextureResult};
