//! Binary asset loading over fetch.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// Fetch the base ROM from a relative asset path. The bytes are handed to
/// the engine unvalidated — a malformed ROM is libsm64's failure to surface.
pub async fn fetch_rom(url: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let response = JsFuture::from(window.fetch_with_str(url)).await?;
    let response: Response = response.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "fetch {url}: HTTP {}",
            response.status()
        )));
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    log::info!("fetched ROM {url}: {} bytes", bytes.len());
    Ok(bytes)
}
