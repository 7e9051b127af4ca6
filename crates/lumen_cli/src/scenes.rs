//! Built-in sample scenes.
//!
//! Each scene brings its own camera and background; randomness comes from
//! the caller's rng so a seed reproduces the whole scene.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::random::{gen_f64, gen_range_f64};
use lumen_core::{ImageTexture, Texture};
use lumen_math::{Color, Vec3};
use lumen_renderer::{
    Background, Camera, ConstantMedium, Cuboid, Material, Primitive, PrimitiveList, Rect, Sphere,
};
use rand::RngCore;

use crate::cli::SceneName;

/// Shutter interval shared by every sample scene.
const SHUTTER: (f64, f64) = (0.0, 1.0);

/// A world ready to render.
pub struct Scene {
    pub world: Primitive,
    pub camera: Camera,
    pub background: Background,
}

pub fn build(
    name: SceneName,
    aspect: f64,
    texture: &Path,
    rng: &mut dyn RngCore,
) -> Result<Scene> {
    let scene = match name {
        SceneName::RandomSpheres => random_spheres(rng)?,
        SceneName::TwoSpheres => two_spheres(),
        SceneName::TwoPerlinSpheres => two_perlin_spheres(rng),
        SceneName::Earth => earth(texture)?,
        SceneName::SimpleLight => simple_light(rng),
        SceneName::CornellBox => cornell_box(),
        SceneName::CornellSmoke => cornell_smoke(),
        SceneName::Final => final_scene(texture, rng)?,
    };

    Ok(Scene {
        camera: scene.camera.with_aspect(aspect),
        ..scene
    })
}

fn solid(c: Color) -> Arc<Texture> {
    Arc::new(Texture::constant(c))
}

fn lambertian(c: Color) -> Arc<Material> {
    Arc::new(Material::solid_lambertian(c))
}

fn light(c: Color) -> Arc<Material> {
    Arc::new(Material::solid_light(c))
}

fn checker() -> Arc<Texture> {
    Arc::new(Texture::checker(
        solid(Color::new(0.2, 0.3, 0.1)),
        solid(Color::new(0.9, 0.9, 0.9)),
    ))
}

fn load_earth(path: &Path) -> Result<Arc<Texture>> {
    let image = ImageTexture::load(path)
        .with_context(|| format!("could not read texture file {}", path.display()))?;
    Ok(Arc::new(Texture::image(image)))
}

/// Camera looking at the origin from (13, 2, 3), as used by the outdoor scenes.
fn outdoor_camera(aperture: f64) -> Camera {
    Camera::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, aperture, 10.0)
        .with_shutter(SHUTTER.0, SHUTTER.1)
}

fn cornell_camera() -> Camera {
    Camera::new()
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(SHUTTER.0, SHUTTER.1)
}

fn random_spheres(rng: &mut dyn RngCore) -> Result<Scene> {
    let mut world = PrimitiveList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Material::lambertian(checker())),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f64(rng);
            let center = Vec3::new(
                a as f64 + 0.9 * gen_f64(rng),
                0.2,
                b as f64 + 0.9 * gen_f64(rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // diffuse, bouncing upward over the shutter
                let center1 = center + Vec3::new(0.0, 0.5 * gen_f64(rng), 0.0);
                let albedo = Color::new(
                    gen_f64(rng) * gen_f64(rng),
                    gen_f64(rng) * gen_f64(rng),
                    gen_f64(rng) * gen_f64(rng),
                );
                world.add(Sphere::moving(
                    center,
                    center1,
                    SHUTTER.0,
                    SHUTTER.1,
                    0.2,
                    lambertian(albedo),
                ));
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 - gen_f64(rng)),
                    0.5 * (1.0 - gen_f64(rng)),
                    0.5 * (1.0 - gen_f64(rng)),
                );
                let fuzz = 0.2 * gen_f64(rng);
                world.add(Sphere::new(
                    center,
                    0.2,
                    Arc::new(Material::metal(solid(albedo), fuzz)),
                ));
            } else {
                world.add(Sphere::new(center, 0.2, Arc::new(Material::dielectric(1.5))));
            }
        }
    }

    world.add(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(solid(Color::new(0.7, 0.6, 0.5)), 0.0)),
    ));

    Ok(Scene {
        world: world.into_bvh(SHUTTER.0, SHUTTER.1, rng)?.into(),
        camera: outdoor_camera(0.1),
        background: Background::SkyGradient,
    })
}

fn two_spheres() -> Scene {
    let material = Arc::new(Material::lambertian(checker()));
    let mut world = PrimitiveList::new();
    world.add(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, Arc::clone(&material)));
    world.add(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, material));

    Scene {
        world: world.into(),
        camera: outdoor_camera(0.0),
        background: Background::SkyGradient,
    }
}

fn two_perlin_spheres(rng: &mut dyn RngCore) -> Scene {
    let marble = Arc::new(Material::lambertian(Arc::new(Texture::noise(4.0, rng))));
    let mut world = PrimitiveList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, Arc::clone(&marble)));
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));

    Scene {
        world: world.into(),
        camera: outdoor_camera(0.0),
        background: Background::SkyGradient,
    }
}

fn earth(texture: &Path) -> Result<Scene> {
    let surface = Arc::new(Material::lambertian(load_earth(texture)?));

    Ok(Scene {
        world: Sphere::new(Vec3::ZERO, 1.0, surface).into(),
        camera: outdoor_camera(0.0),
        background: Background::SkyGradient,
    })
}

fn simple_light(rng: &mut dyn RngCore) -> Scene {
    let marble = Arc::new(Material::lambertian(Arc::new(Texture::noise(4.0, rng))));
    let lamp = light(Color::splat(4.0));

    let mut world = PrimitiveList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, Arc::clone(&marble)));
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));
    world.add(Sphere::new(Vec3::new(0.0, 7.0, 0.0), 2.0, Arc::clone(&lamp)));
    world.add(Rect::xy(3.0, 5.0, 1.0, 3.0, -2.0, lamp));

    Scene {
        world: world.into(),
        camera: Camera::new()
            .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
            .with_lens(20.0, 0.0, 10.0)
            .with_shutter(SHUTTER.0, SHUTTER.1),
        background: Background::Black,
    }
}

/// The five walls and ceiling light of the Cornell box.
fn cornell_walls(lamp: Arc<Material>) -> (PrimitiveList, Arc<Material>) {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::new(0.73, 0.73, 0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));

    let mut world = PrimitiveList::new();
    world.add(Primitive::from(Rect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)).flip_normals());
    world.add(Rect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red));
    world.add(lamp_rect(lamp));
    world.add(
        Primitive::from(Rect::xz(0.0, 555.0, 0.0, 555.0, 555.0, Arc::clone(&white))).flip_normals(),
    );
    world.add(Rect::xz(0.0, 555.0, 0.0, 555.0, 0.0, Arc::clone(&white)));
    world.add(
        Primitive::from(Rect::xy(0.0, 555.0, 0.0, 555.0, 555.0, Arc::clone(&white))).flip_normals(),
    );

    (world, white)
}

fn lamp_rect(lamp: Arc<Material>) -> Rect {
    Rect::xz(213.0, 343.0, 227.0, 332.0, 554.0, lamp)
}

/// The short and tall blocks, rotated and placed inside the box.
fn cornell_blocks(material: Arc<Material>) -> [Primitive; 2] {
    let short = Primitive::from(Cuboid::new(Vec3::ZERO, Vec3::splat(165.0), Arc::clone(&material)))
        .rotate_y(-18.0)
        .translate(Vec3::new(130.0, 0.0, 65.0));
    let tall = Primitive::from(Cuboid::new(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), material))
        .rotate_y(15.0)
        .translate(Vec3::new(265.0, 0.0, 295.0));
    [short, tall]
}

fn cornell_box() -> Scene {
    let (mut world, white) = cornell_walls(light(Color::splat(15.0)));
    for block in cornell_blocks(white) {
        world.add(block);
    }

    Scene {
        world: world.into(),
        camera: cornell_camera(),
        background: Background::Black,
    }
}

fn cornell_smoke() -> Scene {
    let (mut world, white) = cornell_walls(light(Color::splat(7.0)));
    let [short, tall] = cornell_blocks(white);
    world.add(ConstantMedium::new(short, 0.01, solid(Color::ONE)));
    world.add(ConstantMedium::new(tall, 0.01, solid(Color::ZERO)));

    Scene {
        world: world.into(),
        camera: cornell_camera(),
        background: Background::Black,
    }
}

fn final_scene(texture: &Path, rng: &mut dyn RngCore) -> Result<Scene> {
    let ground = lambertian(Color::new(0.48, 0.83, 0.53));
    let white = lambertian(Color::new(0.73, 0.73, 0.73));

    // Floor of boxes with random heights
    let boxes_per_side = 20;
    let mut floor = PrimitiveList::new();
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f64 * w;
            let z0 = -1000.0 + j as f64 * w;
            let y1 = 100.0 * (gen_f64(rng) + 0.01);
            floor.add(Cuboid::new(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                Arc::clone(&ground),
            ));
        }
    }

    let mut world = PrimitiveList::new();
    world.add(floor.into_bvh(SHUTTER.0, SHUTTER.1, rng)?);
    world.add(Rect::xz(123.0, 423.0, 147.0, 412.0, 554.0, light(Color::splat(7.0))));

    let center = Vec3::new(400.0, 400.0, 200.0);
    world.add(Sphere::moving(
        center,
        center + Vec3::new(30.0, 0.0, 0.0),
        SHUTTER.0,
        SHUTTER.1,
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    ));
    world.add(Sphere::new(
        Vec3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Material::metal(solid(Color::new(0.8, 0.8, 0.9)), 10.0)),
    ));

    // Glass ball filled with blue fog
    let boundary = Primitive::from(Sphere::new(
        Vec3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Material::dielectric(1.5)),
    ));
    world.add(boundary.clone());
    world.add(ConstantMedium::new(boundary, 0.2, solid(Color::new(0.2, 0.4, 0.9))));

    // Thin mist over everything
    let mist = Sphere::new(Vec3::ZERO, 5000.0, Arc::new(Material::dielectric(1.5)));
    world.add(ConstantMedium::new(mist.into(), 0.0001, solid(Color::ONE)));

    world.add(Sphere::new(
        Vec3::new(400.0, 200.0, 400.0),
        100.0,
        Arc::new(Material::lambertian(load_earth(texture)?)),
    ));
    world.add(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Arc::new(Material::lambertian(Arc::new(Texture::noise(4.0, rng)))),
    ));

    // Cube of small white spheres
    let mut cluster = PrimitiveList::new();
    for _ in 0..1000 {
        let center = Vec3::new(
            gen_range_f64(rng, 0.0, 165.0),
            gen_range_f64(rng, 0.0, 165.0),
            gen_range_f64(rng, 0.0, 165.0),
        );
        cluster.add(Sphere::new(center, 10.0, Arc::clone(&white)));
    }
    world.add(
        Primitive::from(cluster.into_bvh(SHUTTER.0, SHUTTER.1, rng)?)
            .rotate_y(15.0)
            .translate(Vec3::new(-100.0, 270.0, 395.0)),
    );

    Ok(Scene {
        world: world.into(),
        camera: Camera::new()
            .with_position(Vec3::new(478.0, 278.0, -600.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
            .with_lens(40.0, 0.0, 10.0)
            .with_shutter(SHUTTER.0, SHUTTER.1),
        background: Background::Black,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_renderer::{render, Hittable, RenderConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn write_texture() -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("lumen_scene_{}.png", std::process::id()));
        image::RgbImage::from_pixel(8, 4, image::Rgb([30, 90, 200]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_every_scene_builds_and_is_bounded() {
        let texture = write_texture();
        let mut rng = StdRng::seed_from_u64(1);

        for name in [
            SceneName::RandomSpheres,
            SceneName::TwoSpheres,
            SceneName::TwoPerlinSpheres,
            SceneName::Earth,
            SceneName::SimpleLight,
            SceneName::CornellBox,
            SceneName::CornellSmoke,
            SceneName::Final,
        ] {
            let scene = build(name, 2.0, &texture, &mut rng).unwrap();
            assert!(scene.world.bounding_box(0.0, 1.0).is_some(), "{name:?}");
        }
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = build(SceneName::Earth, 1.0, Path::new("/no/such/earth.png"), &mut rng);
        assert!(result.is_err());
    }

    #[test]
    fn test_cornell_box_renders() {
        let mut rng = StdRng::seed_from_u64(2);
        let scene = build(SceneName::CornellBox, 1.0, Path::new("unused.png"), &mut rng).unwrap();
        let config = RenderConfig {
            samples_per_pixel: 2,
            max_depth: 5,
            worker_count: 2,
            background: scene.background,
            seed: Some(3),
            ..RenderConfig::default()
        };

        let fb = render(&scene.camera, &scene.world, 16, 16, &config).unwrap();
        assert_eq!(fb.pixels().len(), 256);
        assert!(fb.pixels().iter().all(|p| p[3] == 255));
    }
}
