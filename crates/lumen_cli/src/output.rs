//! Writing the finished frame to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use lumen_renderer::Framebuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Plain-text P3 PPM
    Ppm,
    Png,
}

impl ImageFormat {
    /// Pick the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("ppm") => Ok(Self::Ppm),
            Some("png") => Ok(Self::Png),
            _ => bail!(
                "unsupported output extension for {} (expected .ppm or .png)",
                path.display()
            ),
        }
    }
}

/// Write `fb` as P3: header, then one `r g b` line per pixel, top row first.
pub fn write_ppm(fb: &Framebuffer, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "P3\n{} {}\n255", fb.width(), fb.height())?;
    for p in fb.pixels() {
        writeln!(out, "{} {} {}", p[0], p[1], p[2])?;
    }
    out.flush()
}

/// Save the frame buffer, choosing the encoding from the extension.
pub fn save(fb: &Framebuffer, path: &Path) -> Result<()> {
    match ImageFormat::from_path(path)? {
        ImageFormat::Ppm => {
            let file = File::create(path)
                .with_context(|| format!("could not create {}", path.display()))?;
            write_ppm(fb, &mut BufWriter::new(file))
                .with_context(|| format!("could not write {}", path.display()))?;
        }
        ImageFormat::Png => {
            image::save_buffer(
                path,
                fb.as_bytes(),
                fb.width(),
                fb.height(),
                image::ColorType::Rgba8,
            )
            .with_context(|| format!("could not encode {}", path.display()))?;
        }
    }

    info!("Image saved as {}", path.display());
    Ok(())
}
