//! On-page error overlay.
//!
//! Failures are appended as red text under the `#info` element so they are
//! visible without opening the developer console. Panics go through
//! `console_error_panic_hook` separately.

/// Append an error line to the overlay. Quietly does nothing when the host
/// page has no `#info` element.
pub fn display_error(text: &str) {
    log::error!("{text}");

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(info) = document.get_element_by_id("info") else {
        return;
    };
    let Ok(node) = document.create_element("div") else {
        return;
    };
    let _ = node.set_attribute("style", "color: red");
    node.set_text_content(Some(text));
    let _ = info.append_child(&node);
}
