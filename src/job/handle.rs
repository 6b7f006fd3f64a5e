//! Outcome delivery and caller handles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::types::RenderOutcome;

/// Delivers a job's outcome exactly once
pub(crate) struct Completion {
    identifier: String,
    reply: oneshot::Sender<RenderOutcome>,
    channel: Option<mpsc::UnboundedSender<RenderOutcome>>,
}

impl Completion {
    pub(crate) fn new(
        identifier: String,
        channel: Option<mpsc::UnboundedSender<RenderOutcome>>,
    ) -> (Self, oneshot::Receiver<RenderOutcome>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                identifier,
                reply,
                channel,
            },
            rx,
        )
    }

    pub(crate) fn deliver(self, outcome: RenderOutcome) {
        if let Some(channel) = self.channel {
            if channel.send(outcome.clone()).is_err() {
                tracing::debug!(
                    identifier = %self.identifier,
                    "Completion channel closed before outcome delivery"
                );
            }
        }
        let _ = self.reply.send(outcome);
    }
}

/// Caller's handle on a submitted render
#[derive(Debug)]
pub struct JobHandle {
    identifier: String,
    cancelled: Arc<AtomicBool>,
    outcome: oneshot::Receiver<RenderOutcome>,
}

impl JobHandle {
    pub(crate) fn new(
        identifier: String,
        cancelled: Arc<AtomicBool>,
        outcome: oneshot::Receiver<RenderOutcome>,
    ) -> Self {
        Self {
            identifier,
            cancelled,
            outcome,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Request cancellation.
    ///
    /// Takes effect at the job's next state check. A job waiting on the
    /// surface is only finalized once the surface reports back.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait for the terminal outcome
    pub async fn wait(self) -> RenderOutcome {
        let identifier = self.identifier;
        self.outcome
            .await
            .unwrap_or_else(|_| RenderOutcome::abandoned(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_to_handle_and_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (completion, outcome) = Completion::new("a".to_string(), Some(tx));
        let handle = JobHandle::new("a".to_string(), Arc::new(AtomicBool::new(false)), outcome);

        completion.deliver(RenderOutcome::abandoned("a".to_string()));

        assert_eq!(rx.recv().await.unwrap().identifier, "a");
        assert!(handle.wait().await.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_completion_yields_cancelled() {
        let (completion, outcome) = Completion::new("b".to_string(), None);
        let handle = JobHandle::new("b".to_string(), Arc::new(AtomicBool::new(false)), outcome);
        handle.cancel();
        assert!(handle.is_cancel_requested());

        drop(completion);
        let outcome = handle.wait().await;
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.identifier, "b");
    }
}
