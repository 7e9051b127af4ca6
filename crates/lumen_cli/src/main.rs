//! `lumen`: render one of the built-in scenes to a PPM or PNG file.

mod cli;
mod config;
mod output;
mod scenes;

use anyhow::Result;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cli::Args;
use config::Settings;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level.into())
        .parse_default_env()
        .init();

    // Reject a bad output path before spending time on the render
    output::ImageFormat::from_path(&args.output)?;

    let mut settings = Settings::resolve(&args)?;
    let seed = settings.seed();
    info!("Scene {:?}, seed {}", args.scene, seed);

    let aspect = args.width as f64 / args.height.max(1) as f64;
    let mut rng = StdRng::seed_from_u64(seed);
    let scene = scenes::build(args.scene, aspect, &args.texture, &mut rng)?;
    settings.apply_scene_background(scene.background);

    let frame = lumen_renderer::render(
        &scene.camera,
        &scene.world,
        args.width,
        args.height,
        &settings.render,
    )?;

    output::save(&frame, &args.output)?;

    Ok(())
}
