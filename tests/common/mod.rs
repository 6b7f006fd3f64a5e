//! Shared test tooling: an instrumented rendering surface

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use html_image_renderer::config::RendererConfig;
use html_image_renderer::surface::{
    ContentRect, LoadNotifier, RenderedImage, RenderingSurface, SurfaceError, SurfaceResult,
    SurfaceSize,
};
use html_image_renderer::Renderer;

/// Everything the mock surface observed, shared with the test body
#[derive(Default)]
pub struct SurfaceProbe {
    markups: Mutex<Vec<String>>,
    sizes: Mutex<Vec<SurfaceSize>>,
    jobs: Mutex<Vec<u64>>,
    in_progress: AtomicUsize,
    overlaps: AtomicUsize,
    snapshots: AtomicUsize,
    pub fail_loads: AtomicBool,
    pub empty_snapshots: AtomicBool,
    released: AtomicBool,
}

impl SurfaceProbe {
    pub fn loads(&self) -> usize {
        self.markups.lock().unwrap().len()
    }

    pub fn markups(&self) -> Vec<String> {
        self.markups.lock().unwrap().clone()
    }

    pub fn last_markup(&self) -> Option<String> {
        self.markups.lock().unwrap().last().cloned()
    }

    pub fn sizes(&self) -> Vec<SurfaceSize> {
        self.sizes.lock().unwrap().clone()
    }

    /// Submission indices in the order loads reached the surface
    pub fn jobs(&self) -> Vec<u64> {
        self.jobs.lock().unwrap().clone()
    }

    /// Times a load started while another was still in progress
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn snapshots(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn begin(&self) {
        if self.in_progress.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn end(&self) {
        self.in_progress.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Surface that reports loads from a foreign thread after `load_delay`.
///
/// A load's in-progress window runs from `load_markup` until the snapshot or
/// the failure report.
pub struct MockSurface {
    probe: Arc<SurfaceProbe>,
    load_delay: Duration,
    size: SurfaceSize,
}

impl MockSurface {
    pub fn new(load_delay: Duration) -> (Self, Arc<SurfaceProbe>) {
        let probe = Arc::new(SurfaceProbe::default());
        (
            Self {
                probe: probe.clone(),
                load_delay,
                size: SurfaceSize::new(0.0, 0.0),
            },
            probe,
        )
    }
}

#[async_trait]
impl RenderingSurface for MockSurface {
    fn load_markup(&mut self, markup: &str, size: SurfaceSize, notifier: LoadNotifier) {
        self.probe.begin();
        self.probe.markups.lock().unwrap().push(markup.to_string());
        self.probe.sizes.lock().unwrap().push(size);
        self.probe.jobs.lock().unwrap().push(notifier.job());
        self.size = size;

        let probe = self.probe.clone();
        let delay = self.load_delay;
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            if probe.fail_loads.load(Ordering::SeqCst) {
                probe.end();
                notifier.failed(SurfaceError::new("mock load failure"));
            } else {
                notifier.finished();
            }
        });
    }

    async fn measure_content_rect(&mut self) -> SurfaceResult<ContentRect> {
        Ok(ContentRect::new(0.0, 0.0, self.size.width, 40.0))
    }

    async fn snapshot(&mut self, rect: ContentRect) -> SurfaceResult<Option<RenderedImage>> {
        let count = self.probe.snapshots.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.end();

        if self.probe.empty_snapshots.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let width = rect.width as u32;
        let height = rect.height as u32;
        let pixels = vec![count as u8; (width * height * 4) as usize];
        Ok(Some(RenderedImage::new(width, height, pixels)))
    }

    fn release(&mut self) {
        self.probe.released.store(true, Ordering::SeqCst);
    }
}

/// Renderer configuration with no settle delay
pub fn fast_config() -> RendererConfig {
    let mut config = RendererConfig::default();
    config.surface.settle_delay_ms = 0;
    config
}

/// Renderer over a mock surface with a short load delay
pub fn mock_renderer() -> (Renderer, Arc<SurfaceProbe>) {
    let (surface, probe) = MockSurface::new(Duration::from_millis(5));
    let renderer = Renderer::new(surface, fast_config()).unwrap();
    (renderer, probe)
}
