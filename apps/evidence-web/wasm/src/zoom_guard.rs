//! Suppresses the wrapped viewer's zoom gestures
//!
//! Listeners sit on the window in the capturing phase so they run before any
//! handler the viewer registers further down the tree. Wheel is registered
//! non-passive, otherwise the browser ignores `preventDefault`.

use crate::listeners::{ListenerHandle, ListenerOptions};
use evidence_core::{is_zoom_shortcut, is_zoom_wheel, KeyChord, ModifierPolicy};
use tracing::trace;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent, WheelEvent, Window};

/// Armed while alive; dropping it removes both listeners
pub struct ZoomGuard {
    _keydown: ListenerHandle,
    _wheel: ListenerHandle,
}

impl ZoomGuard {
    /// # Errors
    /// Returns JsValue error if either listener cannot be registered
    pub fn attach(window: &Window, policy: ModifierPolicy) -> Result<Self, JsValue> {
        let keydown = ListenerHandle::add(
            window,
            "keydown",
            ListenerOptions::INTERCEPT,
            move |event: Event| {
                let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let key = key_event.key();
                let code = key_event.code();
                let chord = KeyChord {
                    key: &key,
                    code: &code,
                    ctrl: key_event.ctrl_key(),
                    meta: key_event.meta_key(),
                };
                if is_zoom_shortcut(policy, &chord) {
                    trace!(key = %key, code = %code, "Suppressed zoom shortcut");
                    suppress(&event);
                }
            },
        )?;

        let wheel = ListenerHandle::add(
            window,
            "wheel",
            ListenerOptions::INTERCEPT,
            move |event: Event| {
                let Some(wheel_event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                if is_zoom_wheel(policy, wheel_event.ctrl_key(), wheel_event.meta_key()) {
                    trace!("Suppressed zoom wheel");
                    suppress(&event);
                }
            },
        )?;

        Ok(Self {
            _keydown: keydown,
            _wheel: wheel,
        })
    }
}

fn suppress(event: &Event) {
    event.prevent_default();
    event.stop_immediate_propagation();
}

/// Modifier policy for the running browser
pub fn platform_policy(window: &Window) -> ModifierPolicy {
    window
        .navigator()
        .platform()
        .map(|platform| ModifierPolicy::for_platform(&platform))
        .unwrap_or_default()
}
