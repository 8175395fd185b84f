use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use webrio_core::engine::LevelAssets;
use webrio_core::runtime::{FrameSummary, Runtime, RuntimeConfig};

use crate::engine::Libsm64Engine;
use crate::keys;
use crate::overlay;

/// Main application state for the WASM runtime.
///
/// JavaScript owns the render loop and the scene graph; each
/// requestAnimationFrame callback calls [`App::frame`] and then reads the
/// blended buffers and transforms out of this struct.
#[wasm_bindgen]
pub struct App {
    canvas: HtmlCanvasElement,
    runtime: Runtime<Libsm64Engine>,
    level: LevelAssets,
    last: Option<FrameSummary>,
}

#[wasm_bindgen]
impl App {
    /// Create a new App from canvas ID and ROM bytes.
    pub fn new(canvas_id: &str, rom: &[u8]) -> Result<App, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "Element is not a canvas")?;

        let mut runtime = Runtime::new(Libsm64Engine::new(), RuntimeConfig::default());
        let level = runtime.load_level(rom).map_err(|e| {
            let msg = format!("Engine init failed: {e}");
            overlay::display_error(&msg);
            JsValue::from_str(&msg)
        })?;

        log::info!(
            "level loaded: {} static triangles, actor {}",
            level.geometry.triangle_count,
            if runtime.has_actor() { "placed" } else { "absent" },
        );

        Ok(App {
            canvas,
            runtime,
            level,
            last: None,
        })
    }

    /// Run one frame of the loop. Called from requestAnimationFrame with
    /// the callback timestamp in milliseconds.
    pub fn frame(&mut self, time_ms: f64) -> Result<(), JsValue> {
        match self.runtime.frame(time_ms) {
            Ok(summary) => {
                self.last = Some(summary);
                Ok(())
            }
            Err(e) => {
                let msg = format!("Simulation tick failed: {e}");
                overlay::display_error(&msg);
                Err(JsValue::from_str(&msg))
            }
        }
    }

    /// Forward a keydown. Returns true when the key is ours, so the page
    /// can preventDefault.
    pub fn key_down(&mut self, code: &str) -> bool {
        match keys::map_key_code(code) {
            Some(key) => {
                self.runtime.press(key);
                true
            }
            None => false,
        }
    }

    /// Forward a keyup.
    pub fn key_up(&mut self, code: &str) -> bool {
        match keys::map_key_code(code) {
            Some(key) => {
                self.runtime.release(key);
                true
            }
            None => false,
        }
    }

    /// Camera heading around Y in radians; stick input is rotated into this
    /// frame. Called by the page whenever the user orbits the camera.
    pub fn set_camera_heading(&mut self, radians: f32) {
        self.runtime.set_camera_heading(radians);
    }

    // Blended geometry for the current frame. The views point straight into
    // wasm memory; the backing buffers live as long as the App and are
    // reallocated never, but views must be re-taken after any wasm memory
    // growth, so the page should call these each frame rather than caching.

    pub fn positions(&self) -> js_sys::Float32Array {
        unsafe { js_sys::Float32Array::view(self.runtime.blended_positions()) }
    }

    pub fn colors(&self) -> js_sys::Float32Array {
        unsafe { js_sys::Float32Array::view(self.runtime.colors()) }
    }

    pub fn normals(&self) -> js_sys::Float32Array {
        unsafe { js_sys::Float32Array::view(self.runtime.normals()) }
    }

    pub fn uvs(&self) -> js_sys::Float32Array {
        unsafe { js_sys::Float32Array::view(self.runtime.uvs()) }
    }

    pub fn triangles_used(&self) -> u16 {
        self.last.map_or(0, |f| f.triangles_used)
    }

    pub fn fraction(&self) -> f32 {
        self.last.map_or(0.0, |f| f.fraction)
    }

    /// Interpolated actor position; the blended mesh is recentred on this
    /// point, so it is also the mesh transform for the scene graph.
    pub fn mesh_origin(&self) -> Vec<f32> {
        self.last
            .map_or(vec![0.0; 3], |f| f.mesh_origin.to_array().to_vec())
    }

    /// How far to translate the camera this frame to ride along with the
    /// actor without losing the user's orbit offset.
    pub fn camera_delta(&self) -> Vec<f32> {
        self.last
            .map_or(vec![0.0; 3], |f| f.camera_delta.to_array().to_vec())
    }

    pub fn look_target(&self) -> Vec<f32> {
        self.last
            .map_or(vec![0.0; 3], |f| f.look_target.to_array().to_vec())
    }

    // Static level geometry and the player texture atlas, fixed after init.

    pub fn static_positions(&self) -> js_sys::Float32Array {
        unsafe { js_sys::Float32Array::view(&self.level.geometry.positions) }
    }

    pub fn static_triangle_count(&self) -> u32 {
        self.level.geometry.triangle_count as u32
    }

    pub fn texture_rgba(&self) -> js_sys::Uint8Array {
        unsafe { js_sys::Uint8Array::view(&self.level.texture.rgba) }
    }

    pub fn texture_width(&self) -> u32 {
        self.level.texture.width
    }

    pub fn texture_height(&self) -> u32 {
        self.level.texture.height
    }

    pub fn has_actor(&self) -> bool {
        self.runtime.has_actor()
    }

    /// Get the canvas width.
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Get the canvas height.
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }
}
