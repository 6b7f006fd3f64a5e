// Infrastructure (shared components)
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Rendering pipeline
pub mod cache;
pub mod job;
pub mod scheduler;
pub mod surface;
pub mod template;

// Entry point
pub mod renderer;

pub use job::{JobHandle, JobState, RenderOutcome, RenderRequest};
pub use renderer::Renderer;
