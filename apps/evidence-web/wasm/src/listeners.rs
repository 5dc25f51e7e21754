//! Scoped DOM event listeners
//!
//! A `ListenerHandle` owns the closure it registered and removes the listener
//! when dropped, so teardown is just dropping handles.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// How a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
}

impl ListenerOptions {
    /// Observe only: bubbling phase, `preventDefault` not needed
    pub const PASSIVE: Self = Self {
        capture: false,
        passive: true,
    };

    /// Intercept: capturing phase, `preventDefault` honored
    pub const INTERCEPT: Self = Self {
        capture: true,
        passive: false,
    };
}

pub struct ListenerHandle {
    target: EventTarget,
    event: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl ListenerHandle {
    /// Register `handler` for `event` on `target`
    ///
    /// # Errors
    /// Returns JsValue error if the browser rejects the registration
    pub fn add<F>(
        target: &EventTarget,
        event: &'static str,
        options: ListenerOptions,
        handler: F,
    ) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);

        let add_options = AddEventListenerOptions::new();
        add_options.set_capture(options.capture);
        add_options.set_passive(options.passive);

        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &add_options,
        )?;

        Ok(Self {
            target: target.clone(),
            event,
            capture: options.capture,
            callback,
        })
    }

    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn target() -> EventTarget {
        web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .create_element("div")
            .unwrap()
            .into()
    }

    #[wasm_bindgen_test]
    fn test_listener_fires_until_dropped() {
        let target = target();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();

        let handle = ListenerHandle::add(&target, "ping", ListenerOptions::PASSIVE, move |_| {
            seen.set(seen.get() + 1);
        })
        .unwrap();
        assert_eq!(handle.event(), "ping");

        target.dispatch_event(&Event::new("ping").unwrap()).unwrap();
        assert_eq!(count.get(), 1);

        drop(handle);
        target.dispatch_event(&Event::new("ping").unwrap()).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[wasm_bindgen_test]
    fn test_capture_listener_is_removed() {
        let target = target();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();

        let handle = ListenerHandle::add(&target, "ping", ListenerOptions::INTERCEPT, move |_| {
            seen.set(seen.get() + 1);
        })
        .unwrap();
        drop(handle);

        target.dispatch_event(&Event::new("ping").unwrap()).unwrap();
        assert_eq!(count.get(), 0);
    }
}
