//! A single render job and its state machine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, trace, warn};

use crate::cache::ResultCache;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::metrics::JobMetrics;
use crate::surface::{LoadOutcome, RenderedImage, SurfaceError, SurfaceHost, SurfaceSize};
use crate::template::{StyleAttributes, TemplateEngine};

use super::artifact;
use super::handle::{Completion, JobHandle};
use super::request::RenderRequest;
use super::types::{JobState, RenderOutcome};

/// Shared collaborators a job runs against
pub(crate) struct JobContext {
    pub cache: Arc<ResultCache>,
    pub engine: Arc<TemplateEngine>,
    pub surface: SurfaceHost,
    pub config: Arc<RendererConfig>,
}

/// One unit of render work
pub(crate) struct RenderJob {
    identifier: String,
    snippet: String,
    template_id: Option<String>,
    attributes: StyleAttributes,
    ignore_cache: bool,
    should_cache: bool,
    submission_index: u64,
    state: JobState,
    started_at: Option<DateTime<Utc>>,
    cancelled: Arc<AtomicBool>,
    completion: Completion,
}

impl RenderJob {
    pub(crate) fn from_request(request: RenderRequest) -> (Self, JobHandle) {
        let attributes = request.effective_attributes();
        let cancelled = Arc::new(AtomicBool::new(false));
        let (completion, outcome) =
            Completion::new(request.identifier.clone(), request.completion_channel);
        let handle = JobHandle::new(request.identifier.clone(), cancelled.clone(), outcome);

        let job = Self {
            identifier: request.identifier,
            snippet: request.snippet,
            template_id: request.template_id,
            attributes,
            ignore_cache: request.ignore_cache,
            should_cache: request.cache_result,
            submission_index: 0,
            state: JobState::Queued,
            started_at: None,
            cancelled,
            completion,
        };

        (job, handle)
    }

    pub(crate) fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn submission_index(&self) -> u64 {
        self.submission_index
    }

    pub(crate) fn set_submission_index(&mut self, index: u64) {
        self.submission_index = index;
    }

    pub(crate) fn state(&self) -> JobState {
        self.state
    }

    /// Drive the job to a terminal state.
    ///
    /// Returns the outcome together with the delivery handle so the caller
    /// can settle its own bookkeeping before the outcome becomes visible.
    pub(crate) async fn run(mut self, ctx: &JobContext) -> (RenderOutcome, Completion) {
        let start = Instant::now();
        let result = self.execute(ctx).await;
        let outcome = self.finish(result, start.elapsed());
        (outcome, self.completion)
    }

    async fn execute(&mut self, ctx: &JobContext) -> Result<(RenderedImage, bool), RenderError> {
        self.check_cancelled()?;
        self.started_at = Some(Utc::now());
        self.transition(JobState::Running);

        if !self.ignore_cache {
            if let Some(image) = ctx.cache.get(&self.identifier) {
                return Ok((image, true));
            }
        }

        let style = ctx.engine.resolve(&self.attributes)?;
        let markup = match &self.template_id {
            Some(template_id) => ctx.engine.render_resolved(&self.snippet, template_id, &style)?,
            None => self.snippet.clone(),
        };

        if ctx.config.debug.write_html {
            match artifact::write_markup(&ctx.config.debug.output_dir, self.submission_index, &markup)
                .await
            {
                Ok(path) => debug!(
                    submission_index = self.submission_index,
                    path = %path.display(),
                    "Wrote render markup"
                ),
                Err(e) => warn!(
                    submission_index = self.submission_index,
                    error = %e,
                    "Failed to write render markup"
                ),
            }
        }

        self.check_cancelled()?;
        self.transition(JobState::AwaitingSurfaceLoad);

        let height = style
            .target_height
            .unwrap_or(ctx.config.surface.viewport_height);
        let size = SurfaceSize::new(style.target_width, height);

        match ctx.surface.load(self.submission_index, markup, size).await {
            LoadOutcome::Finished => {}
            LoadOutcome::Failed(e) => return Err(RenderError::SurfaceLoadFailed(e)),
        }

        self.check_cancelled()?;
        self.transition(JobState::AwaitingSnapshot);

        let settle = ctx.config.settle_delay();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let rect = ctx
            .surface
            .measure()
            .await
            .map_err(RenderError::SnapshotFailed)?;
        let image = ctx
            .surface
            .snapshot(rect)
            .await
            .map_err(RenderError::SnapshotFailed)?
            .ok_or_else(|| RenderError::SnapshotFailed(SurfaceError::unexpected()))?;

        if self.should_cache {
            ctx.cache.put(self.identifier.clone(), image.clone());
        }

        Ok((image, false))
    }

    fn finish(
        &mut self,
        result: Result<(RenderedImage, bool), RenderError>,
        elapsed: Duration,
    ) -> RenderOutcome {
        let (state, image, was_cached, error) = match result {
            Ok((image, was_cached)) => (JobState::Completed, Some(image), was_cached, None),
            Err(RenderError::Cancelled) => (JobState::Cancelled, None, false, None),
            Err(e) => (JobState::Failed, None, false, Some(e)),
        };
        self.transition(state);

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match (&state, &error) {
            (JobState::Completed, _) => info!(
                identifier = %self.identifier,
                submission_index = self.submission_index,
                elapsed_ms,
                was_cached,
                "Finished HTML render"
            ),
            (JobState::Failed, Some(e @ RenderError::Misconfigured(_))) => error!(
                identifier = %self.identifier,
                submission_index = self.submission_index,
                error = %e,
                elapsed_ms,
                was_cached,
                "Renderer defaults are incomplete"
            ),
            (JobState::Failed, Some(e)) => warn!(
                identifier = %self.identifier,
                submission_index = self.submission_index,
                kind = e.kind(),
                error = %e,
                elapsed_ms,
                was_cached,
                "HTML render failed"
            ),
            _ => info!(
                identifier = %self.identifier,
                submission_index = self.submission_index,
                elapsed_ms,
                was_cached,
                "HTML render cancelled"
            ),
        }

        JobMetrics::record_finished(state.as_str(), was_cached, elapsed);

        RenderOutcome {
            identifier: self.identifier.clone(),
            image,
            was_cached,
            error,
            state,
            submission_index: Some(self.submission_index),
            elapsed,
        }
    }

    /// Fail a job that was never queued, delivering the outcome right away
    pub(crate) fn reject(mut self, error: RenderError) {
        let mut outcome = self.finish(Err(error), Duration::ZERO);
        outcome.submission_index = None;
        self.completion.deliver(outcome);
    }

    fn check_cancelled(&self) -> Result<(), RenderError> {
        if self.cancelled.load(Ordering::Acquire) {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn transition(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal job transition {} -> {}",
            self.state,
            next
        );
        trace!(
            submission_index = self.submission_index,
            from = self.state.as_str(),
            to = next.as_str(),
            started_at = ?self.started_at,
            "Job state transition"
        );
        self.state = next;
    }
}
