//! Job states and outcomes

use std::time::Duration;

use serde::Serialize;

use crate::error::RenderError;
use crate::surface::RenderedImage;

/// Lifecycle of a render job.
///
/// `Queued → Running → AwaitingSurfaceLoad → AwaitingSnapshot → Completed`,
/// with `Failed` and `Cancelled` reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    AwaitingSurfaceLoad,
    AwaitingSnapshot,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;

        match (self, next) {
            (from, Completed | Failed | Cancelled) => !from.is_terminal(),
            (Queued, Running) | (Running, AwaitingSurfaceLoad) => true,
            (AwaitingSurfaceLoad, AwaitingSnapshot) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::AwaitingSurfaceLoad => "awaiting_surface_load",
            JobState::AwaitingSnapshot => "awaiting_snapshot",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal report handed to the caller.
///
/// A completed job carries an image and no error, a failed job an error and
/// no image. A cancelled job carries neither.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub identifier: String,
    pub image: Option<RenderedImage>,
    pub was_cached: bool,
    pub error: Option<RenderError>,
    pub state: JobState,
    /// `None` when served from the cache before reaching the scheduler
    pub submission_index: Option<u64>,
    pub elapsed: Duration,
}

impl RenderOutcome {
    /// Outcome for a cache hit resolved at submission time
    pub(crate) fn cached(identifier: String, image: RenderedImage, elapsed: Duration) -> Self {
        Self {
            identifier,
            image: Some(image),
            was_cached: true,
            error: None,
            state: JobState::Completed,
            submission_index: None,
            elapsed,
        }
    }

    /// Outcome for a job whose renderer went away before it finished
    pub(crate) fn abandoned(identifier: String) -> Self {
        Self {
            identifier,
            image: None,
            was_cached: false,
            error: None,
            state: JobState::Cancelled,
            submission_index: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == JobState::Completed && self.image.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == JobState::Cancelled
    }

    pub fn into_result(self) -> Result<RenderedImage, RenderError> {
        match (self.image, self.error) {
            (_, Some(error)) => Err(error),
            (Some(image), None) => Ok(image),
            (None, None) => Err(RenderError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(JobState::Queued.can_transition_to(JobState::Running));
        assert!(JobState::Running.can_transition_to(JobState::AwaitingSurfaceLoad));
        assert!(JobState::AwaitingSurfaceLoad.can_transition_to(JobState::AwaitingSnapshot));
        assert!(JobState::AwaitingSnapshot.can_transition_to(JobState::Completed));
    }

    #[test]
    fn test_terminal_reachable_from_any_active_state() {
        let active = [
            JobState::Queued,
            JobState::Running,
            JobState::AwaitingSurfaceLoad,
            JobState::AwaitingSnapshot,
        ];
        for state in active {
            assert!(state.can_transition_to(JobState::Failed));
            assert!(state.can_transition_to(JobState::Cancelled));
            assert!(state.can_transition_to(JobState::Completed));
        }
    }

    #[test]
    fn test_no_skips_or_exits_from_terminal() {
        assert!(!JobState::Queued.can_transition_to(JobState::AwaitingSnapshot));
        assert!(!JobState::AwaitingSnapshot.can_transition_to(JobState::Running));
        assert!(!JobState::Completed.can_transition_to(JobState::Failed));
        assert!(!JobState::Cancelled.can_transition_to(JobState::Running));
    }

    #[test]
    fn test_cancelled_outcome_into_result() {
        let outcome = RenderOutcome::abandoned("a".to_string());
        assert!(outcome.is_cancelled());
        assert!(!outcome.is_success());
        assert_eq!(outcome.into_result().unwrap_err(), RenderError::Cancelled);
    }
}
