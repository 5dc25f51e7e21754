//! WASM bindings for the evidence viewer
//!
//! Wraps a pdf.js-based viewer widget with evidence navigation: document
//! selection, page and evidence jumps, a highlight overlay kept aligned with
//! the rendered page, and suppression of the widget's own zoom gestures.
//!
//! ## Architecture
//!
//! - State and geometry in `evidence-core`, held in Rust via `EvidenceViewer`
//! - DOM lookups, listeners, frames and timers in this crate
//! - JavaScript only forwards clicks and the viewer's "pages loaded" event
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { EvidenceViewer } from './pkg/evidence_wasm.js';
//!
//! await init();
//!
//! const viewer = new EvidenceViewer(registryJson, optionsJson);
//! viewer.setChangeCallback((id) => render(viewer.document(id)));
//! viewer.attach();
//!
//! viewer.selectDocument("report");
//! viewer.goToEvidence(1);
//! pdfViewer.on("pagesloaded", (e) => viewer.notifyPagesLoaded("report", e.pagesCount));
//!
//! // on unmount
//! viewer.detach();
//! ```

pub mod dom;
pub mod listeners;
pub mod logging;
pub mod overlay;
mod scheduler;
mod shell;
pub mod viewer;
pub mod zoom_guard;

use wasm_bindgen::prelude::*;

pub use viewer::EvidenceViewer;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"Evidence viewer WASM initialized".into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// The built-in document registry as JSON, a starting point for custom ones
#[wasm_bindgen]
pub fn default_config() -> Result<String, JsValue> {
    let config = evidence_core::RegistryConfig::builtin()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string_pretty(&config)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_default_config_round_trips() {
        let json = default_config().unwrap();
        let config = evidence_core::RegistryConfig::from_json(&json).unwrap();
        assert_eq!(config, evidence_core::RegistryConfig::builtin().unwrap());
    }
}
