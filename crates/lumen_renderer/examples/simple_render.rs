//! Simple path tracer example.
//!
//! Renders three spheres on a large ground sphere and saves to PPM format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use lumen_core::Texture;
use lumen_renderer::{
    render, Background, Camera, Color, Material, PrimitiveList, RenderConfig, Sphere, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Lumen Path Tracer - Simple Example");

    let mut rng = StdRng::seed_from_u64(7);
    let world = build_scene().into_bvh(0.0, 1.0, &mut rng)?;

    let camera = Camera::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0)
        .with_aspect(16.0 / 9.0);

    let config = RenderConfig {
        samples_per_pixel: 50,
        max_depth: 10,
        background: Background::SkyGradient,
        seed: Some(1),
        ..RenderConfig::default()
    };

    let (width, height) = (400, 225);
    let start = std::time::Instant::now();
    let frame = render(&camera, &world, width, height, &config)?;
    println!("Rendered {}x{} in {:?}", width, height, start.elapsed());

    let mut out = BufWriter::new(File::create("simple_render.ppm")?);
    writeln!(out, "P3\n{} {}\n255", width, height)?;
    for p in frame.pixels() {
        writeln!(out, "{} {} {}", p[0], p[1], p[2])?;
    }
    println!("Saved simple_render.ppm");

    Ok(())
}

fn build_scene() -> PrimitiveList {
    let mut world = PrimitiveList::new();

    let checker = Texture::checker(
        Arc::new(Texture::constant(Color::new(0.2, 0.3, 0.1))),
        Arc::new(Texture::constant(Color::splat(0.9))),
    );
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Material::lambertian(Arc::new(checker))),
    ));

    world.add(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::solid_lambertian(Color::new(0.4, 0.2, 0.1))),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(
            Arc::new(Texture::constant(Color::new(0.7, 0.6, 0.5))),
            0.0,
        )),
    ));

    world
}
