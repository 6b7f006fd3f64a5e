//! Rendering surface boundary.
//!
//! The surface is the external component that lays out HTML and produces
//! pixels. It is stateful, single-instance and bound to one thread, so it is
//! owned by a [`SurfaceHost`] that runs it on a dedicated thread and funnels
//! its load notifications through a single completion channel.

mod blank;
mod host;
mod types;

pub use blank::BlankSurface;
pub use host::SurfaceHost;
pub use types::{
    ContentRect, LoadOutcome, RenderedImage, SurfaceError, SurfaceResult, SurfaceSize,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Contract of the external rendering surface.
///
/// All methods are invoked on the surface thread, one command at a time.
#[async_trait]
pub trait RenderingSurface: Send + 'static {
    /// Resize to `size` and start loading `markup`.
    ///
    /// Must return promptly. The outcome is reported later, from any thread,
    /// through `notifier`.
    fn load_markup(&mut self, markup: &str, size: SurfaceSize, notifier: LoadNotifier);

    /// Bounding rectangle of the rendered container
    async fn measure_content_rect(&mut self) -> SurfaceResult<ContentRect>;

    /// Capture `rect` as an image. `Ok(None)` means the surface produced nothing.
    async fn snapshot(&mut self, rect: ContentRect) -> SurfaceResult<Option<RenderedImage>>;

    /// Release platform resources. Called once, on teardown.
    fn release(&mut self) {}
}

/// Load notification routed to the completion channel
#[derive(Debug)]
pub(crate) struct SurfaceEvent {
    pub job: u64,
    pub outcome: LoadOutcome,
}

/// One-shot reporter for a single markup load.
///
/// Dropping it without reporting counts as a failed load.
pub struct LoadNotifier {
    job: u64,
    events: Option<mpsc::UnboundedSender<SurfaceEvent>>,
}

impl LoadNotifier {
    pub(crate) fn new(job: u64, events: mpsc::UnboundedSender<SurfaceEvent>) -> Self {
        Self {
            job,
            events: Some(events),
        }
    }

    /// Submission index of the job the load belongs to
    pub fn job(&self) -> u64 {
        self.job
    }

    /// The markup finished loading
    pub fn finished(mut self) {
        self.send(LoadOutcome::Finished);
    }

    /// The markup failed to load
    pub fn failed(mut self, error: SurfaceError) {
        self.send(LoadOutcome::Failed(error));
    }

    fn send(&mut self, outcome: LoadOutcome) {
        if let Some(events) = self.events.take() {
            let _ = events.send(SurfaceEvent {
                job: self.job,
                outcome,
            });
        }
    }
}

impl Drop for LoadNotifier {
    fn drop(&mut self) {
        if self.events.is_some() {
            self.send(LoadOutcome::Failed(SurfaceError::new(
                "surface dropped the load notification without reporting",
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_reports_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        LoadNotifier::new(3, tx).finished();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.job, 3);
        assert_eq!(event.outcome, LoadOutcome::Finished);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_notifier_fails_load() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        drop(LoadNotifier::new(4, tx));

        let event = rx.try_recv().unwrap();
        assert!(matches!(event.outcome, LoadOutcome::Failed(_)));
    }
}
