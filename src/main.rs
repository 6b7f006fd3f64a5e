use anyhow::Result;

use html_image_renderer::config::Settings;
use html_image_renderer::metrics::encode_metrics;
use html_image_renderer::surface::BlankSurface;
use html_image_renderer::telemetry::init_tracing;
use html_image_renderer::template::{Font, Rgba, StyleAttributes};
use html_image_renderer::{RenderOutcome, RenderRequest, Renderer};

const DEMO_SNIPPET: &str = "<p>The quick <b>brown</b> fox jumps over the <i>lazy</i> dog. \
    <span style=\"color: #d0021b\">Rendered</span> through the default template.</p>";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.logging)?;
    tracing::info!("Configuration loaded");

    let renderer = Renderer::new(BlankSurface::new(Rgba::WHITE), settings.renderer.clone())?;

    let attributes = StyleAttributes::new()
        .with_font(Font::new(".AppleSystemUIFont", 18.0))
        .with_text_color(Rgba::rgb(0x33, 0x33, 0x33))
        .with_line_height(1.4);

    for _ in 0..2 {
        let outcome = renderer
            .render(RenderRequest::new(DEMO_SNIPPET, "demo-paragraph").attributes(attributes.clone()))
            .wait()
            .await;
        log_outcome(&outcome);
    }

    match encode_metrics() {
        Ok(metrics) => tracing::debug!(metrics = %metrics, "Metrics snapshot"),
        Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
    }

    renderer.finish_rendering().await?;
    tracing::info!(
        operations_requested = renderer.operations_requested(),
        cached_entries = renderer.cache().len(),
        "Demo complete"
    );
    Ok(())
}

fn log_outcome(outcome: &RenderOutcome) {
    match (&outcome.image, &outcome.error) {
        (Some(image), _) => tracing::info!(
            identifier = %outcome.identifier,
            width = image.width(),
            height = image.height(),
            bytes = image.pixels().len(),
            was_cached = outcome.was_cached,
            elapsed_ms = outcome.elapsed.as_secs_f64() * 1000.0,
            "Rendered snippet"
        ),
        (None, Some(e)) => tracing::error!(
            identifier = %outcome.identifier,
            error = %e,
            "Render failed"
        ),
        (None, None) => tracing::warn!(identifier = %outcome.identifier, "Render cancelled"),
    }
}
