use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in sample scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneName {
    /// Field of small diffuse, metal and glass spheres on a checkered ground
    RandomSpheres,
    TwoSpheres,
    TwoPerlinSpheres,
    /// Single sphere wrapped in the `--texture` image
    Earth,
    SimpleLight,
    CornellBox,
    CornellSmoke,
    /// Everything at once
    Final,
}

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Offline Monte Carlo path tracer")]
pub struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value = "final")]
    pub scene: SceneName,

    /// Image width in pixels
    #[arg(long, default_value = "400")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "200")]
    pub height: u32,

    /// Samples per pixel (overrides the config file)
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Worker threads (overrides the config file)
    #[arg(long, short = 'j')]
    pub workers: Option<usize>,

    /// Seed for scene generation and sampling (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON render configuration
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Output file; `.ppm` writes plain-text PPM, `.png` writes PNG
    #[arg(long, short = 'o', default_value = "output.png")]
    pub output: PathBuf,

    /// Image used by the earth and final scenes
    #[arg(long, default_value = "images/earth.png")]
    pub texture: PathBuf,

    /// Logging level, `RUST_LOG` takes precedence
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
