use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::template::StyleAttributes;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    /// Attribute defaults every job's attributes are merged over
    #[serde(default = "StyleAttributes::builtin_defaults")]
    pub defaults: StyleAttributes,
    /// Family substituted for system font aliases the surface cannot resolve
    #[serde(default = "default_fallback_font_family")]
    pub fallback_font_family: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceConfig {
    /// Surface height for jobs without a target height
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// Pause between "load finished" and content measurement, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugConfig {
    /// Write each job's final markup to `{output_dir}/html/NNN.html`
    #[serde(default)]
    pub write_html: bool,
    #[serde(default = "default_debug_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_fallback_font_family() -> String {
    "Helvetica".to_string()
}

fn default_viewport_height() -> f32 {
    812.0
}

fn default_settle_delay_ms() -> u64 {
    300
}

fn default_debug_output_dir() -> PathBuf {
    env::temp_dir().join("html-image-renderer")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("renderer.surface.viewport_height", 812.0)?
            .set_default("renderer.surface.settle_delay_ms", 300)?
            .set_default("renderer.debug.write_html", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // HTML_RENDERER__RENDERER__DEBUG__WRITE_HTML, HTML_RENDERER__LOGGING__LEVEL, etc.
            .add_source(
                Environment::with_prefix("HTML_RENDERER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl RendererConfig {
    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.surface.settle_delay_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            debug: DebugConfig::default(),
            defaults: StyleAttributes::builtin_defaults(),
            fallback_font_family: default_fallback_font_family(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            viewport_height: default_viewport_height(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            write_html: false,
            output_dir: default_debug_output_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
