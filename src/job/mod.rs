//! Render jobs.
//!
//! A job turns one request into one outcome by walking an explicit state
//! machine: cache lookup, template expansion, surface load, snapshot. Jobs
//! are created by the [`Renderer`](crate::renderer::Renderer) and run by the
//! [`JobScheduler`](crate::scheduler::JobScheduler), one at a time.

mod artifact;
mod handle;
mod render_job;
mod request;
mod types;

pub(crate) use handle::Completion;
pub use handle::JobHandle;
pub(crate) use render_job::{JobContext, RenderJob};
pub use request::RenderRequest;
pub use types::{JobState, RenderOutcome};
