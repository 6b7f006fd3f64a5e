use thiserror::Error;

use crate::surface::SurfaceError;
use crate::template::TemplateError;

/// Failure of a single render job.
///
/// Captured on the job and surfaced exactly once through its outcome. Nothing
/// in the pipeline retries a failed job; resubmission is up to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template {identifier}: {reason}")]
    InvalidTemplate { identifier: String, reason: String },

    #[error("Surface failed to load markup: {0}")]
    SurfaceLoadFailed(#[source] SurfaceError),

    #[error("Snapshot failed: {0}")]
    SnapshotFailed(#[source] SurfaceError),

    #[error("Render cancelled")]
    Cancelled,

    /// The merged attribute set is missing a value that a default should
    /// always provide. Points at the renderer configuration, not the input.
    #[error("Renderer misconfigured: {0}")]
    Misconfigured(String),
}

impl RenderError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::UnknownTemplate(_) => "unknown_template",
            RenderError::InvalidTemplate { .. } => "invalid_template",
            RenderError::SurfaceLoadFailed(_) => "surface_load_failed",
            RenderError::SnapshotFailed(_) => "snapshot_failed",
            RenderError::Cancelled => "cancelled",
            RenderError::Misconfigured(_) => "misconfigured",
        }
    }
}

impl From<TemplateError> for RenderError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::UnknownTemplate(id) => RenderError::UnknownTemplate(id),
            TemplateError::InvalidTemplate { identifier, reason } => {
                RenderError::InvalidTemplate { identifier, reason }
            }
            TemplateError::MissingAttribute(key) => {
                RenderError::Misconfigured(format!("missing required attribute `{}`", key))
            }
        }
    }
}

/// Contract violations and setup failures of the renderer itself.
///
/// These never travel through a job outcome; they indicate a misused or
/// misconfigured renderer rather than a bad render request.
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cannot release the rendering surface while {pending} job(s) are queued or running")]
    JobsInFlight { pending: usize },

    #[error("Failed to start rendering surface thread: {0}")]
    SurfaceThread(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RendererError>;
