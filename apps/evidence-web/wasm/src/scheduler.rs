//! `requestAnimationFrame` / `setTimeout` backed recompute scheduling

use crate::shell::{run_pass, WeakShell};
use evidence_core::{DocumentId, FallbackTicket, Pass, RecomputeScheduler};
use std::time::Duration;
use tracing::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub(crate) struct BrowserScheduler {
    shell: WeakShell,
}

impl BrowserScheduler {
    pub(crate) fn new(shell: WeakShell) -> Self {
        Self { shell }
    }

    fn callback(&self, doc: &DocumentId, pass: Pass) -> JsValue {
        let shell = self.shell.clone();
        let doc = doc.clone();
        Closure::once_into_js(move || run_pass(&shell, &doc, pass))
    }

    /// Run `pass` on the next animation frame. Returns whether the browser
    /// accepted the request.
    pub(crate) fn request_pass(&self, doc: &DocumentId, pass: Pass) -> bool {
        let callback = self.callback(doc, pass);
        let result = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window object available"))
            .and_then(|window| window.request_animation_frame(callback.unchecked_ref()));
        match result {
            Ok(_) => true,
            Err(e) => {
                error!(document = %doc, error = ?e, "Failed to request animation frame");
                false
            }
        }
    }
}

impl RecomputeScheduler for BrowserScheduler {
    fn request_frame(&mut self, doc: &DocumentId) {
        self.request_pass(doc, Pass::Frame);
    }

    fn request_fallback(&mut self, doc: &DocumentId, ticket: FallbackTicket, delay: Duration) {
        let callback = self.callback(doc, Pass::Fallback(ticket));
        let delay_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let result = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window object available"))
            .and_then(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.unchecked_ref(),
                    delay_ms,
                )
            });
        if let Err(e) = result {
            error!(document = %doc, error = ?e, "Failed to schedule fallback recompute");
        }
    }
}
