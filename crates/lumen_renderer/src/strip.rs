//! Strip-based parallel rendering.
//!
//! The image is cut into full-width horizontal strips. A fixed pool of
//! worker threads pulls strips from a bounded queue and writes each one
//! straight into its own disjoint slice of the framebuffer.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::renderer::{color_to_rgba, render_pixel, Framebuffer, Rgba};
use crate::{Camera, Hittable, RenderConfig, RenderError, RenderResult};

/// Default strip height in rows.
pub const DEFAULT_STRIP_HEIGHT: u32 = 10;

/// A full-width band of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strip {
    /// Position of this strip in top-to-bottom order
    pub index: usize,
    /// First row, counted from the top
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Strip {
    /// Get the total number of pixels in this strip.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Split an image into strips of `strip_height` rows, top to bottom.
///
/// The last strip is shorter when the height is not a multiple.
pub fn generate_strips(width: u32, height: u32, strip_height: u32) -> Vec<Strip> {
    if strip_height == 0 {
        return Vec::new();
    }

    (0..height)
        .step_by(strip_height as usize)
        .enumerate()
        .map(|(index, y)| Strip {
            index,
            y,
            width,
            height: strip_height.min(height - y),
        })
        .collect()
}

/// Everything a worker needs to shade pixels.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub camera: &'a Camera,
    pub world: &'a dyn Hittable,
    pub width: u32,
    pub height: u32,
    pub config: &'a RenderConfig,
}

/// Render one strip into `out`, which holds exactly its pixels row by row.
///
/// Returns the number of non-finite samples that were discarded.
pub fn render_strip(
    strip: &Strip,
    out: &mut [Rgba],
    ctx: &RenderContext<'_>,
    rng: &mut StdRng,
) -> u32 {
    let mut non_finite = 0;

    for (local_y, row) in out.chunks_mut(strip.width as usize).enumerate() {
        let y = strip.y + local_y as u32;
        for (x, pixel) in row.iter_mut().enumerate() {
            let estimate = render_pixel(
                ctx.camera,
                ctx.world,
                x as u32,
                y,
                ctx.width,
                ctx.height,
                ctx.config,
                rng,
            );
            non_finite += estimate.non_finite;
            *pixel = color_to_rgba(estimate.color);
        }
    }

    non_finite
}

/// Per-strip seed, independent of which worker renders the strip.
pub fn strip_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

struct StripJob<'a> {
    strip: Strip,
    pixels: &'a mut [Rgba],
}

enum Message<'a> {
    Render(StripJob<'a>),
    Terminate,
}

/// Render the whole image.
///
/// Spawns `min(worker_count, strip count)` threads, queues every strip,
/// then sends one terminate message per worker and waits for all of them.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    width: u32,
    height: u32,
    config: &RenderConfig,
) -> RenderResult<Framebuffer> {
    config.validate(width, height)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let strips = generate_strips(width, height, config.strip_height);
    let workers = config.worker_count.min(strips.len());

    log::info!(
        "Rendering {}x{} at {} spp: {} strips on {} workers, seed {}",
        width,
        height,
        config.samples_per_pixel,
        strips.len(),
        workers,
        seed
    );

    let start = Instant::now();
    let mut framebuffer = Framebuffer::new(width, height);
    let ctx = RenderContext {
        camera,
        world,
        width,
        height,
        config,
    };
    let chunk_len = width as usize * config.strip_height as usize;
    let pixels = framebuffer.pixels_mut();

    thread::scope(|scope| -> RenderResult<()> {
        let (sender, receiver) = mpsc::sync_channel(workers);
        let receiver = Arc::new(Mutex::new(receiver));
        let ctx = &ctx;

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                scope.spawn(move || worker_loop(id, &receiver, ctx, seed))
            })
            .collect();
        drop(receiver);

        for (strip, chunk) in strips.iter().zip(pixels.chunks_mut(chunk_len)) {
            let job = StripJob {
                strip: *strip,
                pixels: chunk,
            };
            if sender.send(Message::Render(job)).is_err() {
                // Every worker is gone; the join below reports why
                break;
            }
        }

        for _ in 0..workers {
            if sender.send(Message::Terminate).is_err() {
                break;
            }
        }
        drop(sender);

        let panicked = handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(Result::is_err)
            .count();

        if panicked > 0 {
            return Err(RenderError::WorkerPanicked { count: panicked });
        }
        Ok(())
    })?;

    log::info!("Render finished in {:.2?}", start.elapsed());

    Ok(framebuffer)
}

fn worker_loop(
    id: usize,
    queue: &Mutex<Receiver<Message<'_>>>,
    ctx: &RenderContext<'_>,
    seed: u64,
) {
    log::debug!("Worker {id} started");
    let mut rendered = 0usize;

    loop {
        // Hold the lock only while dequeuing
        let message = match queue.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => break,
        };

        match message {
            Ok(Message::Render(job)) => {
                let mut rng = StdRng::seed_from_u64(strip_seed(seed, job.strip.index));
                let non_finite = render_strip(&job.strip, job.pixels, ctx, &mut rng);
                if non_finite > 0 {
                    log::debug!(
                        "Strip {} discarded {} non-finite samples",
                        job.strip.index,
                        non_finite
                    );
                }
                log::debug!("Worker {id} finished strip {}", job.strip.index);
                rendered += 1;
            }
            Ok(Message::Terminate) | Err(_) => break,
        }
    }

    log::debug!("Worker {id} exiting after {rendered} strips");
}
