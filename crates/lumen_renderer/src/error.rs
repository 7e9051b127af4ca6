use thiserror::Error;

/// Scene construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Primitive {index} has no bounding box and cannot be placed in a BVH")]
    UnboundedPrimitive { index: usize },

    #[error("Cannot build a BVH over an empty primitive list")]
    EmptyBvh,
}

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Image has zero size ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("samples_per_pixel must be at least 1")]
    NoSamples,

    #[error("worker_count must be at least 1")]
    NoWorkers,

    #[error("strip_height must be at least 1")]
    EmptyStrip,

    #[error("{count} render worker(s) panicked")]
    WorkerPanicked { count: usize },

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

pub type RenderResult<T> = Result<T, RenderError>;
