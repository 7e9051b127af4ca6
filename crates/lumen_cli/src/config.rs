//! Render settings from an optional JSON file plus command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lumen_renderer::{Background, RenderConfig};

use crate::cli::Args;

/// Settings resolved for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub render: RenderConfig,
    /// The config file chose a background, so the scene's default is ignored
    pub background_fixed: bool,
}

impl Settings {
    /// Read `path` (if any) and apply the explicit flags in `args` on top.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self {
                render: RenderConfig::default(),
                background_fixed: false,
            },
        };

        if let Some(samples) = args.samples {
            settings.render.samples_per_pixel = samples;
        }
        if let Some(workers) = args.workers {
            settings.render.worker_count = workers;
        }
        if args.seed.is_some() {
            settings.render.seed = args.seed;
        }

        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let background_fixed = value.get("background").is_some();
        let render = serde_json::from_value(value)?;
        Ok(Self {
            render,
            background_fixed,
        })
    }

    /// Use the scene's background unless the config file named one.
    pub fn apply_scene_background(&mut self, background: Background) {
        if !self.background_fixed {
            self.render.background = background;
        }
    }

    /// Fix the seed, drawing one from entropy when none was given.
    pub fn seed(&mut self) -> u64 {
        let seed = self.render.seed.unwrap_or_else(rand::random);
        self.render.seed = Some(seed);
        seed
    }
}
