//! Browser entry point

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::GalaxyApp;
use crate::config;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            tracing::error!("no <canvas id=\"canvas\"> element");
            return;
        };

        let params = config::initial_params();
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(GalaxyApp::new(cc, params, false)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!(error = ?e, "failed to start eframe");
        }
    });
}
