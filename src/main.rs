//! Native galaxy playground
//!
//! Run with: cargo run --bin galaxy [-- --use-cpu]
//! Parameter overrides: GALAXY_CONFIG=path/to/params.json

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use galaxy_playground::{config, GalaxyApp};
    use tracing::info;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,galaxy_playground=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let use_cpu = std::env::args().any(|a| a == "--use-cpu");
    let params = config::initial_params();
    info!(use_cpu, count = params.count(), "starting galaxy playground");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Galaxy")
            .with_inner_size([1280.0, 800.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "galaxy",
        options,
        Box::new(move |cc| Ok(Box::new(GalaxyApp::new(cc, params, use_cpu)))),
    )?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
