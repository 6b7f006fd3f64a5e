mod settings;

pub use settings::{DebugConfig, LoggingConfig, RendererConfig, Settings, SurfaceConfig};
