//! Serial job scheduler.
//!
//! Jobs run strictly one at a time in submission order on a single worker
//! task. The rendering surface is single-instance, so a second job never
//! starts before the previous one reached a terminal state. Suspension stops
//! new jobs from starting without interrupting the one in flight.
//! Closing the scheduler rejects every later submission.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::RenderError;
use crate::job::{JobContext, RenderJob};
use crate::metrics::JobMetrics;
use crate::surface::SurfaceError;

/// FIFO queue of render jobs with a concurrency limit of one
pub struct JobScheduler {
    queue: mpsc::UnboundedSender<RenderJob>,
    suspended: watch::Sender<bool>,
    outstanding: Arc<AtomicUsize>,
    next_index: AtomicU64,
    /// Guards admission; `true` once the scheduler was closed
    closed: Mutex<bool>,
    worker: JoinHandle<()>,
}

impl JobScheduler {
    /// Start the worker task. Must be called from within a tokio runtime.
    pub(crate) fn start(ctx: JobContext) -> Self {
        let (queue, queue_rx) = mpsc::unbounded_channel();
        let (suspended, suspended_rx) = watch::channel(false);
        let outstanding = Arc::new(AtomicUsize::new(0));

        let worker = tokio::spawn(run_worker(
            queue_rx,
            suspended_rx,
            outstanding.clone(),
            ctx,
        ));

        Self {
            queue,
            suspended,
            outstanding,
            next_index: AtomicU64::new(0),
            closed: Mutex::new(false),
            worker,
        }
    }

    /// Enqueue `job` behind everything submitted before it.
    ///
    /// Returns the job's submission index, starting at 1, or `None` when the
    /// scheduler is closed. A rejected job fails right away with a released
    /// surface error.
    pub(crate) fn submit(&self, mut job: RenderJob) -> Option<u64> {
        let closed = lock(&self.closed);
        if *closed {
            drop(closed);
            warn!(
                identifier = %job.identifier(),
                "Rejecting render job submitted after teardown"
            );
            job.reject(RenderError::SurfaceLoadFailed(SurfaceError::released()));
            return None;
        }

        let index = self.next_index.fetch_add(1, Ordering::AcqRel) + 1;
        job.set_submission_index(index);

        self.outstanding.fetch_add(1, Ordering::AcqRel);
        JobMetrics::record_submitted();

        debug!(
            identifier = %job.identifier(),
            submission_index = index,
            state = %job.state(),
            "Queued render job"
        );

        if let Err(mpsc::error::SendError(job)) = self.queue.send(job) {
            self.outstanding.fetch_sub(1, Ordering::AcqRel);
            JobMetrics::record_settled();
            warn!(
                submission_index = job.submission_index(),
                "Render worker is gone, dropping job"
            );
        }

        Some(index)
    }

    /// Stop admitting jobs if none is queued or running.
    ///
    /// Returns the pending count and leaves the scheduler open otherwise.
    /// Holding the admission lock keeps a concurrent `submit` from slipping
    /// in between the drain check and the close.
    pub(crate) fn close(&self) -> Result<(), usize> {
        let mut closed = lock(&self.closed);
        let pending = self.pending();
        if pending > 0 {
            return Err(pending);
        }

        if !*closed {
            *closed = true;
            info!("Render queue closed");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        *lock(&self.closed)
    }

    /// Stop or resume starting new jobs
    pub fn set_suspended(&self, suspended: bool) {
        let changed = self.suspended.send_if_modified(|current| {
            let changed = *current != suspended;
            *current = suspended;
            changed
        });

        if changed {
            info!(suspended = suspended, pending = self.pending(), "Render queue suspension changed");
        }
    }

    pub fn is_suspended(&self) -> bool {
        *self.suspended.borrow()
    }

    /// Jobs queued or running
    pub fn pending(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// True when no job is queued or running
    pub fn is_drained(&self) -> bool {
        self.pending() == 0
    }

    /// Number of jobs ever submitted
    pub fn submitted(&self) -> u64 {
        self.next_index.load(Ordering::Acquire)
    }
}

fn lock(closed: &Mutex<bool>) -> MutexGuard<'_, bool> {
    closed.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker(
    mut queue: mpsc::UnboundedReceiver<RenderJob>,
    mut suspended: watch::Receiver<bool>,
    outstanding: Arc<AtomicUsize>,
    ctx: JobContext,
) {
    info!("Render worker started");

    loop {
        if suspended.wait_for(|s| !*s).await.is_err() {
            break;
        }

        let Some(job) = queue.recv().await else {
            break;
        };

        // Suspension may have been requested while idle
        if suspended.wait_for(|s| !*s).await.is_err() {
            break;
        }

        let (outcome, completion) = job.run(&ctx).await;
        JobMetrics::record_settled();

        // Counted down before delivery so a caller woken by the outcome
        // observes the drained state
        outstanding.fetch_sub(1, Ordering::AcqRel);
        completion.deliver(outcome);
    }

    info!("Render worker stopped");
}
