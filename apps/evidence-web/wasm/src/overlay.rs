//! Applies the computed overlay rectangle to the overlay element

use evidence_core::PixelRect;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

/// Position `element` over `rect`, relative to the document container
///
/// # Errors
/// Returns JsValue error if a style property cannot be set
pub fn show(element: &HtmlElement, rect: &PixelRect) -> Result<(), JsValue> {
    let style = element.style();
    style.set_property("position", "absolute")?;
    style.set_property("top", &px(rect.top))?;
    style.set_property("left", &px(rect.left))?;
    style.set_property("width", &px(rect.width))?;
    style.set_property("height", &px(rect.height))?;
    style.set_property("pointer-events", "none")?;
    style.set_property("display", "block")?;
    Ok(())
}

/// # Errors
/// Returns JsValue error if the style property cannot be set
pub fn hide(element: &HtmlElement) -> Result<(), JsValue> {
    element.style().set_property("display", "none")
}

/// Show or hide depending on whether a rectangle is available
pub fn sync(element: &HtmlElement, rect: Option<&PixelRect>) -> Result<(), JsValue> {
    match rect {
        Some(rect) => show(element, rect),
        None => hide(element),
    }
}

/// CSS pixel length, rounded to a hundredth of a pixel
pub fn px(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}px", rounded)
}
