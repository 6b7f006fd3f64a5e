//! Surface thread and completion channel

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot};

use crate::error::RendererError;
use crate::metrics::SurfaceMetrics;

use super::types::{
    ContentRect, LoadOutcome, RenderedImage, SurfaceError, SurfaceResult, SurfaceSize,
};
use super::{LoadNotifier, RenderingSurface, SurfaceEvent};

const SURFACE_THREAD_NAME: &str = "render-surface";

/// Load awaiting its notification. Holding it is what "owning the surface" means.
struct PendingLoad {
    job: u64,
    reply: oneshot::Sender<LoadOutcome>,
}

/// Non-owning association from the surface to the job currently using it
type CurrentJob = Arc<Mutex<Option<PendingLoad>>>;

enum SurfaceCommand {
    Load {
        pending: PendingLoad,
        markup: String,
        size: SurfaceSize,
    },
    Measure {
        reply: oneshot::Sender<SurfaceResult<ContentRect>>,
    },
    Snapshot {
        rect: ContentRect,
        reply: oneshot::Sender<SurfaceResult<Option<RenderedImage>>>,
    },
    Release {
        reply: oneshot::Sender<()>,
    },
}

struct HostInner {
    commands: mpsc::UnboundedSender<SurfaceCommand>,
    current: CurrentJob,
    released: AtomicBool,
}

/// Handle to the surface thread.
///
/// Cloning shares the same surface.
#[derive(Clone)]
pub struct SurfaceHost {
    inner: Arc<HostInner>,
}

impl SurfaceHost {
    /// Move `surface` onto its own thread and start the completion channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: RenderingSurface>(surface: S) -> Result<Self, RendererError> {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let current: CurrentJob = Arc::new(Mutex::new(None));

        let thread_current = current.clone();
        std::thread::Builder::new()
            .name(SURFACE_THREAD_NAME.to_string())
            .spawn(move || {
                run_surface_thread(Box::new(surface), command_rx, events, thread_current)
            })?;

        tokio::spawn(run_completion_channel(event_rx, current.clone()));

        Ok(Self {
            inner: Arc::new(HostInner {
                commands,
                current,
                released: AtomicBool::new(false),
            }),
        })
    }

    /// Submission index of the job currently holding the surface
    pub fn current_job(&self) -> Option<u64> {
        lock(&self.inner.current).as_ref().map(|pending| pending.job)
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire) || self.inner.commands.is_closed()
    }

    /// Assign the surface to `job`, load `markup` and wait for the notification
    pub(crate) async fn load(&self, job: u64, markup: String, size: SurfaceSize) -> LoadOutcome {
        if self.is_released() {
            return LoadOutcome::Failed(SurfaceError::released());
        }

        let (reply, rx) = oneshot::channel();
        let command = SurfaceCommand::Load {
            pending: PendingLoad { job, reply },
            markup,
            size,
        };

        if self.inner.commands.send(command).is_err() {
            return LoadOutcome::Failed(SurfaceError::released());
        }

        rx.await.unwrap_or_else(|_| {
            LoadOutcome::Failed(SurfaceError::new("load notification was lost"))
        })
    }

    pub(crate) async fn measure(&self) -> SurfaceResult<ContentRect> {
        let (reply, rx) = oneshot::channel();
        self.inner
            .commands
            .send(SurfaceCommand::Measure { reply })
            .map_err(|_| SurfaceError::released())?;
        rx.await.map_err(|_| SurfaceError::released())?
    }

    pub(crate) async fn snapshot(&self, rect: ContentRect) -> SurfaceResult<Option<RenderedImage>> {
        let (reply, rx) = oneshot::channel();
        self.inner
            .commands
            .send(SurfaceCommand::Snapshot { rect, reply })
            .map_err(|_| SurfaceError::released())?;
        rx.await.map_err(|_| SurfaceError::released())?
    }

    /// Release the surface and stop its thread.
    ///
    /// Returns `false` if it was already released.
    pub(crate) async fn release(&self) -> bool {
        if self.inner.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        let (reply, rx) = oneshot::channel();
        if self
            .inner
            .commands
            .send(SurfaceCommand::Release { reply })
            .is_err()
        {
            return false;
        }
        rx.await.is_ok()
    }
}

fn lock(current: &CurrentJob) -> MutexGuard<'_, Option<PendingLoad>> {
    current.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_surface_thread(
    mut surface: Box<dyn RenderingSurface>,
    mut commands: mpsc::UnboundedReceiver<SurfaceCommand>,
    events: mpsc::UnboundedSender<SurfaceEvent>,
    current: CurrentJob,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build rendering surface runtime");
            return;
        }
    };

    runtime.block_on(async move {
        tracing::debug!("Rendering surface thread started");

        while let Some(command) = commands.recv().await {
            match command {
                SurfaceCommand::Load {
                    pending,
                    markup,
                    size,
                } => {
                    let job = pending.job;
                    if let Some(previous) = lock(&current).replace(pending) {
                        tracing::warn!(
                            previous_job = previous.job,
                            job = job,
                            "Surface reassigned while a load was still outstanding"
                        );
                    }

                    SurfaceMetrics::record_load();
                    tracing::trace!(
                        job = job,
                        width = size.width,
                        height = size.height,
                        "Loading markup into surface"
                    );
                    surface.load_markup(&markup, size, LoadNotifier::new(job, events.clone()));
                }
                SurfaceCommand::Measure { reply } => {
                    let _ = reply.send(surface.measure_content_rect().await);
                }
                SurfaceCommand::Snapshot { rect, reply } => {
                    let _ = reply.send(surface.snapshot(rect).await);
                }
                SurfaceCommand::Release { reply } => {
                    surface.release();
                    tracing::info!("Rendering surface released");
                    let _ = reply.send(());
                    break;
                }
            }
        }

        tracing::debug!("Rendering surface thread stopped");
    });
}

/// Serially hands load notifications to the job holding the surface
async fn run_completion_channel(
    mut events: mpsc::UnboundedReceiver<SurfaceEvent>,
    current: CurrentJob,
) {
    while let Some(event) = events.recv().await {
        let pending = {
            let mut slot = lock(&current);
            match slot.as_ref() {
                Some(pending) if pending.job == event.job => slot.take(),
                _ => None,
            }
        };

        match pending {
            Some(pending) => {
                if pending.reply.send(event.outcome).is_err() {
                    tracing::debug!(job = event.job, "Job stopped waiting for its load notification");
                }
            }
            None => {
                tracing::warn!(
                    job = event.job,
                    "Dropping load notification for a job that no longer holds the surface"
                );
            }
        }
    }
}
