//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for offline rendering:
//!
//! - Closed `Primitive` and `Material` sum types dispatched by `match`
//! - Spheres (optionally motion blurred), axis-aligned rectangles and boxes,
//!   translate / rotate / flip decorators and constant-density media
//! - A BVH whose children can be any primitive
//! - A strip scheduler running a fixed worker pool over a bounded queue,
//!   reproducible for a fixed seed regardless of worker count

mod bvh;
mod camera;
mod cuboid;
mod error;
mod hittable;
mod material;
mod medium;
mod rect;
mod renderer;
mod sphere;
mod strip;
mod transform;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use error::{RenderError, RenderResult, SceneError};
pub use hittable::{HitRecord, Hittable, Primitive, PrimitiveList};
pub use material::{
    reflect, refract, schlick, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    Scatter, ScatterResult,
};
pub use medium::ConstantMedium;
pub use rect::{Plane, Rect};
pub use renderer::{
    color_to_rgba, linear_to_gamma, ray_color, render_pixel, sanitize, Background, Framebuffer,
    PixelEstimate, RenderConfig, Rgba, HIT_EPSILON,
};
pub use sphere::Sphere;
pub use strip::{
    generate_strips, render, render_strip, strip_seed, RenderContext, Strip, DEFAULT_STRIP_HEIGHT,
};
pub use transform::{FlipNormals, RotateY, Translate};

/// Re-export Vec3 and common math types from lumen_math
pub use lumen_math::{Aabb, Color, Interval, Ray, Vec3};
