//! webrio WASM Web Runtime
//!
//! Drives a precompiled libsm64 build (linked into this module) from the
//! browser's requestAnimationFrame loop and exposes the interpolated
//! character geometry to the JavaScript renderer. The hard parts — physics,
//! collision, animation — are libsm64's; this crate marshals buffers in and
//! out of it at a fixed 30 Hz and blends snapshots for display in between.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod assets;
#[cfg(target_arch = "wasm32")]
mod engine;
#[cfg(target_arch = "wasm32")]
mod overlay;
mod keys;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point — called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("webrio runtime initialized");
}

/// Create a new application instance from ROM bytes.
///
/// Called from JavaScript with data from the local file picker.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn create_app(canvas_id: String, rom: Vec<u8>) -> Result<app::App, JsValue> {
    app::App::new(&canvas_id, &rom)
}

/// Create an application instance by fetching the ROM from a relative path.
///
/// Fetch failures are shown in the error overlay and returned; no engine
/// init takes place in that case.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn create_app_from_url(canvas_id: String, rom_url: String) -> Result<app::App, JsValue> {
    let rom = match assets::fetch_rom(&rom_url).await {
        Ok(rom) => rom,
        Err(e) => {
            overlay::display_error(&format!("ROM load failed: {e:?}"));
            return Err(e);
        }
    };
    app::App::new(&canvas_id, &rom)
}
