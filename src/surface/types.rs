//! Values exchanged with the rendering surface

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Result type for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Error reported by the rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SurfaceError {
    message: String,
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The surface produced neither a result nor an error
    pub fn unexpected() -> Self {
        Self::new("surface returned no image and no error")
    }

    pub fn released() -> Self {
        Self::new("rendering surface has been released")
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Size the surface lays the markup out at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// Bounding rectangle of the rendered content, in surface points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ContentRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Rendered RGBA8 raster.
///
/// Opaque to the pipeline; cloning shares the pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedImage {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl RenderedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// How a markup load ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Finished,
    Failed(SurfaceError),
}
