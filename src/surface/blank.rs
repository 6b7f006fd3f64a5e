//! Headless surface producing solid-fill rasters

use async_trait::async_trait;

use crate::template::Rgba;

use super::types::{ContentRect, RenderedImage, SurfaceError, SurfaceResult, SurfaceSize};
use super::{LoadNotifier, RenderingSurface};

/// Surface that performs no layout.
///
/// Every load succeeds immediately; the content rectangle is the full
/// surface and snapshots are filled with a single color. Useful where no
/// real HTML engine is available.
pub struct BlankSurface {
    fill: Rgba,
    size: SurfaceSize,
}

impl BlankSurface {
    pub fn new(fill: Rgba) -> Self {
        Self {
            fill,
            size: SurfaceSize::new(0.0, 0.0),
        }
    }
}

impl Default for BlankSurface {
    fn default() -> Self {
        Self::new(Rgba::TRANSPARENT)
    }
}

#[async_trait]
impl RenderingSurface for BlankSurface {
    fn load_markup(&mut self, _markup: &str, size: SurfaceSize, notifier: LoadNotifier) {
        self.size = size;
        notifier.finished();
    }

    async fn measure_content_rect(&mut self) -> SurfaceResult<ContentRect> {
        Ok(ContentRect::new(0.0, 0.0, self.size.width, self.size.height))
    }

    async fn snapshot(&mut self, rect: ContentRect) -> SurfaceResult<Option<RenderedImage>> {
        if rect.is_empty() {
            return Ok(None);
        }

        let width = rect.width.round() as u32;
        let height = rect.height.round() as u32;
        let count = (width as usize)
            .checked_mul(height as usize)
            .filter(|count| count.checked_mul(4).is_some())
            .ok_or_else(|| {
                SurfaceError::new(format!("snapshot of {}x{} is too large", width, height))
            })?;

        let pixel = [self.fill.r, self.fill.g, self.fill.b, self.fill.a];
        let pixels = pixel.repeat(count);

        Ok(Some(RenderedImage::new(width, height, pixels)))
    }
}
