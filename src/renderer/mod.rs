//! Renderer context.
//!
//! [`Renderer`] wires the template engine, the result cache, the surface
//! host and the scheduler together. Construct one per session and pass it
//! by reference; there is no global instance.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, error, info};

use crate::cache::ResultCache;
use crate::config::RendererConfig;
use crate::error::{RendererError, Result};
use crate::job::{Completion, JobContext, JobHandle, RenderJob, RenderOutcome, RenderRequest};
use crate::metrics::JobMetrics;
use crate::scheduler::JobScheduler;
use crate::surface::{RenderedImage, RenderingSurface, SurfaceHost};
use crate::template::{SnippetTransformer, StyleAttributes, TemplateEngine};

/// Renders HTML snippets to images through a single rendering surface
pub struct Renderer {
    cache: Arc<ResultCache>,
    engine: Arc<TemplateEngine>,
    surface: SurfaceHost,
    scheduler: JobScheduler,
}

impl Renderer {
    /// Take ownership of `surface` and start the render worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<S: RenderingSurface>(surface: S, config: RendererConfig) -> Result<Self> {
        // Configured defaults only override the builtins they name
        let defaults = StyleAttributes::builtin_defaults().merge(&config.defaults);
        let engine = Arc::new(TemplateEngine::new(
            defaults,
            config.fallback_font_family.clone(),
        ));
        let cache = Arc::new(ResultCache::new());
        let surface = SurfaceHost::spawn(surface)?;

        info!(
            viewport_height = config.surface.viewport_height,
            settle_delay_ms = config.surface.settle_delay_ms,
            write_html = config.debug.write_html,
            "Renderer started"
        );

        let scheduler = JobScheduler::start(JobContext {
            cache: cache.clone(),
            engine: engine.clone(),
            surface: surface.clone(),
            config: Arc::new(config),
        });

        Ok(Self {
            cache,
            engine,
            surface,
            scheduler,
        })
    }

    /// Submit a render.
    ///
    /// A cached result for the identifier is delivered right away without
    /// entering the queue, unless the request ignores the cache.
    pub fn render(&self, request: RenderRequest) -> JobHandle {
        let start = Instant::now();

        if !request.ignore_cache {
            if let Some(image) = self.cache.get(&request.identifier) {
                return self.deliver_cached(request, image, start);
            }
        }

        let (job, handle) = RenderJob::from_request(request);
        self.scheduler.submit(job);
        handle
    }

    /// Submit every request, then wait for all outcomes. Outcomes are
    /// returned in request order.
    pub async fn render_batch<I>(&self, requests: I) -> Vec<RenderOutcome>
    where
        I: IntoIterator<Item = RenderRequest>,
    {
        let handles: Vec<JobHandle> = requests
            .into_iter()
            .map(|request| self.render(request))
            .collect();
        join_all(handles.into_iter().map(JobHandle::wait)).await
    }

    fn deliver_cached(
        &self,
        request: RenderRequest,
        image: RenderedImage,
        start: Instant,
    ) -> JobHandle {
        let identifier = request.identifier;
        let (completion, outcome) =
            Completion::new(identifier.clone(), request.completion_channel);
        let handle = JobHandle::new(identifier.clone(), Arc::new(AtomicBool::new(false)), outcome);

        let elapsed = start.elapsed();
        debug!(identifier = %identifier, "Serving render from cache");
        JobMetrics::record_finished("completed", true, elapsed);

        completion.deliver(RenderOutcome::cached(identifier, image, elapsed));
        handle
    }

    /// Register `body` under `identifier`, replacing any previous template
    pub fn register_template(&self, body: impl Into<String>, identifier: impl Into<String>) {
        self.engine.register(body, identifier);
    }

    /// Built-in template registered under [`DEFAULT_TEMPLATE_ID`](crate::template::DEFAULT_TEMPLATE_ID)
    pub fn default_template(&self) -> &'static str {
        TemplateEngine::default_template()
    }

    /// Remove every registered template, the default one included
    pub fn clear_templates(&self) {
        self.engine.clear();
    }

    pub fn has_template(&self, identifier: &str) -> bool {
        self.engine.store().exists(identifier)
    }

    pub fn set_snippet_transformer<T>(&self, transformer: T)
    where
        T: SnippetTransformer + 'static,
    {
        self.engine.set_transformer(Arc::new(transformer));
    }

    pub fn clear_snippet_transformer(&self) {
        self.engine.clear_transformer();
    }

    /// Pause or resume dequeuing. A job already running is not affected.
    pub fn set_suspended(&self, suspended: bool) {
        self.scheduler.set_suspended(suspended);
    }

    pub fn is_suspended(&self) -> bool {
        self.scheduler.is_suspended()
    }

    /// True when no job is queued or running
    pub fn is_drained(&self) -> bool {
        self.scheduler.is_drained()
    }

    pub fn pending_jobs(&self) -> usize {
        self.scheduler.pending()
    }

    /// Number of jobs that entered the queue
    pub fn operations_requested(&self) -> u64 {
        self.scheduler.submitted()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Release the rendering surface and clear the template store.
    ///
    /// Fails without side effects while any job is queued or running. Once
    /// it succeeds, later renders that miss the cache fail immediately.
    pub async fn finish_rendering(&self) -> Result<()> {
        if let Err(pending) = self.scheduler.close() {
            error!(
                pending = pending,
                "Refusing to release the rendering surface with jobs in flight"
            );
            return Err(RendererError::JobsInFlight { pending });
        }

        if !self.surface.release().await {
            debug!("Rendering surface was already released");
        }
        self.engine.clear();

        Ok(())
    }

    pub fn is_surface_released(&self) -> bool {
        self.surface.is_released()
    }
}
