//! Galaxy particle playground
//!
//! A procedurally generated point cloud spinning in a small scene graph,
//! driven one frame per display refresh, with a debug panel bound to its
//! parameters. Runs natively (`galaxy` binary) and in the browser.
//!
//! - `scene`: objects, camera, orbit controls
//! - `galaxy`: point generation and cloud replacement
//! - `frame`: per-tick animation and render hand-off
//! - `context`: the owner of all of the above
//! - `render`/`app`: wgpu and egui front end

#[cfg(all(target_arch = "wasm32", not(feature = "wasm")))]
compile_error!("building for wasm32 requires the `wasm` feature");

pub mod config;
pub mod context;
pub mod frame;
pub mod galaxy;
pub mod panel;
pub mod params;
pub mod resize;
pub mod scene;
pub mod sparkles;
pub mod time;

pub mod app;
pub mod render;
mod theme;

#[cfg(target_arch = "wasm32")]
mod web;

pub use app::GalaxyApp;
pub use context::GalaxyContext;
pub use params::GalaxyParams;
