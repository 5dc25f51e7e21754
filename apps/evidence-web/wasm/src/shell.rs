//! Shared browser-side state behind `EvidenceViewer`
//!
//! Browser callbacks (animation frames, timers, scroll and resize listeners)
//! hold a `Weak` to the shell and re-borrow it when they run. Once the owning
//! `EvidenceViewer` is gone they do nothing.

use crate::dom::DomGeometry;
use crate::listeners::{ListenerHandle, ListenerOptions};
use crate::overlay;
use crate::scheduler::BrowserScheduler;
use evidence_core::{DocumentId, Pass, Viewer, ViewerOptions};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub(crate) type SharedShell = Rc<RefCell<Shell>>;
pub(crate) type WeakShell = Weak<RefCell<Shell>>;

pub(crate) struct Shell {
    pub(crate) viewer: Viewer,
    pub(crate) options: ViewerOptions,
    pub(crate) attached: bool,
    pub(crate) change_callback: Option<js_sys::Function>,
    scroll_listeners: HashMap<DocumentId, ListenerHandle>,
    bind_timers: HashMap<DocumentId, i32>,
}

impl Shell {
    pub(crate) fn new(viewer: Viewer, options: ViewerOptions) -> Self {
        Self {
            viewer,
            options,
            attached: false,
            change_callback: None,
            scroll_listeners: HashMap::new(),
            bind_timers: HashMap::new(),
        }
    }

    /// Run one scheduled recompute and redraw the overlay.
    ///
    /// Returns whether the overlay changed.
    pub(crate) fn run_pass(&mut self, doc: &DocumentId, pass: Pass) -> bool {
        let Some(geometry) = DomGeometry::new(&self.options.layout) else {
            self.viewer.discard_pass(doc, pass);
            return false;
        };
        let outcome = self.viewer.pass_fired(doc, pass, &geometry);

        match outcome {
            Ok(outcome) if outcome.changes_overlay() => {
                self.render_overlay(doc);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(document = %doc, error = %e, "Recompute failed");
                false
            }
        }
    }

    /// Make the overlay element of `doc` match its current state
    pub(crate) fn render_overlay(&self, doc: &DocumentId) {
        let Some(geometry) = DomGeometry::new(&self.options.layout) else {
            return;
        };
        let Some(element) = geometry.overlay_element(doc) else {
            return;
        };
        let rect = self
            .viewer
            .document(doc)
            .and_then(|d| d.overlay_rect())
            .copied();
        if let Err(e) = overlay::sync(&element, rect.as_ref()) {
            warn!(document = %doc, error = ?e, "Failed to style overlay");
        }
    }

    /// Drop every scroll listener and pending bind attempt
    pub(crate) fn release_scroll_bindings(&mut self) {
        self.scroll_listeners.clear();
        if let Some(window) = web_sys::window() {
            for (_, handle) in self.bind_timers.drain() {
                window.clear_timeout_with_handle(handle);
            }
        } else {
            self.bind_timers.clear();
        }
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn scroll_bound(&self, doc: &DocumentId) -> bool {
        self.scroll_listeners.contains_key(doc)
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    pub(crate) fn bind_timer(&self, doc: &DocumentId) -> Option<i32> {
        self.bind_timers.get(doc).copied()
    }
}

/// Run a scheduled pass if the shell is still alive
pub(crate) fn run_pass(weak: &WeakShell, doc: &DocumentId, pass: Pass) {
    let Some(shell) = weak.upgrade() else {
        return;
    };
    let changed = match shell.try_borrow_mut() {
        Ok(mut inner) => inner.run_pass(doc, pass),
        Err(_) => {
            // The queue still holds the pass, so it has to run eventually
            warn!(document = %doc, ?pass, "Shell busy, retrying recompute next frame");
            BrowserScheduler::new(weak.clone()).request_pass(doc, pass);
            return;
        }
    };
    if changed {
        notify_changed(&shell, doc);
    }
}

/// Tell the host that `doc` changed. Must be called with the shell unborrowed,
/// the callback may call straight back into the viewer.
pub(crate) fn notify_changed(shell: &SharedShell, doc: &DocumentId) {
    let callback = shell.borrow().change_callback.clone();
    if let Some(callback) = callback {
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(doc.as_str())) {
            warn!(document = %doc, error = ?e, "Change callback threw");
        }
    }
}

/// Scroll or resize: queue a frame for every highlighted document
pub(crate) fn layout_changed(shell: &WeakShell) {
    let Some(strong) = shell.upgrade() else {
        return;
    };
    let Ok(mut inner) = strong.try_borrow_mut() else {
        return;
    };
    let mut scheduler = BrowserScheduler::new(shell.clone());
    inner.viewer.layout_changed(&mut scheduler);
}

/// (Re)bind the scroll listener of `doc`.
///
/// The viewer creates its scroll container asynchronously, so the lookup is
/// retried at a fixed interval up to the configured number of attempts. An
/// existing listener is replaced, never duplicated.
pub(crate) fn bind_scroll(shell: &WeakShell, doc: DocumentId) {
    if let Some(strong) = shell.upgrade() {
        if let Ok(mut inner) = strong.try_borrow_mut() {
            if let Some(handle) = inner.bind_timers.remove(&doc) {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
            }
        }
    }
    try_bind_scroll(shell, doc, 1);
}

fn try_bind_scroll(shell: &WeakShell, doc: DocumentId, attempt: u32) {
    let Some(strong) = shell.upgrade() else {
        return;
    };
    let Ok(mut inner) = strong.try_borrow_mut() else {
        return;
    };
    inner.bind_timers.remove(&doc);
    if !inner.attached {
        return;
    }

    let container = DomGeometry::new(&inner.options.layout)
        .and_then(|geometry| geometry.scroll_container(&doc));

    if let Some(container) = container {
        let weak = shell.clone();
        match ListenerHandle::add(&container, "scroll", ListenerOptions::PASSIVE, move |_| {
            layout_changed(&weak)
        }) {
            Ok(handle) => {
                // Replacing drops the old handle, which unregisters it
                inner.scroll_listeners.insert(doc.clone(), handle);
                debug!(document = %doc, attempt, "Bound scroll listener");
            }
            Err(e) => warn!(document = %doc, error = ?e, "Failed to bind scroll listener"),
        }
        return;
    }

    let max_attempts = inner.options.scroll_bind_attempts;
    if attempt >= max_attempts {
        warn!(document = %doc, attempts = attempt, "Scroll container never appeared, giving up");
        return;
    }

    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = shell.clone();
    let retry_doc = doc.clone();
    let callback = Closure::once_into_js(move || try_bind_scroll(&weak, retry_doc, attempt + 1));
    let interval =
        i32::try_from(inner.options.scroll_bind_interval().as_millis()).unwrap_or(i32::MAX);
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        interval,
    ) {
        Ok(handle) => {
            inner.bind_timers.insert(doc, handle);
        }
        Err(e) => warn!(document = %doc, error = ?e, "Failed to schedule scroll bind retry"),
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use evidence_core::RegistryConfig;
    use wasm_bindgen_test::*;
    use web_sys::HtmlElement;

    wasm_bindgen_test_configure!(run_in_browser);

    const REGISTRY: &str = r#"{"documents": [
        {"id": "shell-test", "label": "Shell", "source": "/s.pdf", "evidence": [
            {"label": "Table", "page": 5, "rect": {"top": 20, "left": 10, "width": 30, "height": 18}}
        ]}
    ]}"#;

    const MARKUP: &str = r#"
        <div id="viewerContainer" style="margin: 0; padding: 0">
            <div class="page" data-page-number="5" style="width: 800px; height: 1000px; margin: 0"></div>
        </div>
        <div class="evidence-overlay" style="display: none"></div>
    "#;

    fn shell() -> SharedShell {
        shell_with(ViewerOptions::default())
    }

    fn shell_with(options: ViewerOptions) -> SharedShell {
        let viewer = Viewer::from_config(RegistryConfig::from_json(REGISTRY).unwrap(), &options);
        Rc::new(RefCell::new(Shell::new(viewer, options)))
    }

    fn mount() -> web_sys::Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let container = document.create_element("div").unwrap();
        container.set_id("evidence-doc-shell-test");
        container
            .set_attribute("style", "position: relative; margin: 0; padding: 0")
            .unwrap();
        container.set_inner_html(MARKUP);
        document.body().unwrap().append_child(&container).unwrap();
        container
    }

    fn px_value(element: &HtmlElement, property: &str) -> f64 {
        element
            .style()
            .get_property_value(property)
            .unwrap()
            .trim_end_matches("px")
            .parse()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_pass_positions_overlay() {
        let container = mount();
        let shell = shell();
        let doc = DocumentId::from("shell-test");
        {
            let mut inner = shell.borrow_mut();
            let mut scheduler = BrowserScheduler::new(Rc::downgrade(&shell));
            inner
                .viewer
                .go_to_evidence(0, Some(&doc), &mut scheduler)
                .unwrap();
        }

        run_pass(&Rc::downgrade(&shell), &doc, Pass::Frame);

        let overlay: HtmlElement = container
            .query_selector(".evidence-overlay")
            .unwrap()
            .unwrap()
            .dyn_into()
            .unwrap();
        assert!((px_value(&overlay, "top") - 200.0).abs() < 0.5);
        assert!((px_value(&overlay, "left") - 80.0).abs() < 0.5);
        assert!((px_value(&overlay, "width") - 240.0).abs() < 0.5);
        assert!((px_value(&overlay, "height") - 180.0).abs() < 0.5);

        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_scroll_binds_when_attached() {
        let container = mount();
        let shell = shell();
        let doc = DocumentId::from("shell-test");
        shell.borrow_mut().attached = true;

        bind_scroll(&Rc::downgrade(&shell), doc.clone());
        assert!(shell.borrow().scroll_bound(&doc));

        // Rebinding replaces the listener
        bind_scroll(&Rc::downgrade(&shell), doc.clone());
        assert!(shell.borrow().scroll_bound(&doc));

        shell.borrow_mut().release_scroll_bindings();
        assert!(!shell.borrow().scroll_bound(&doc));

        container.remove();
    }

    /// Stand in for the browser firing the pending retry timer
    fn fire_bind_timer(shell: &SharedShell, doc: &DocumentId, attempt: u32) {
        let timer = shell.borrow().bind_timer(doc).unwrap();
        web_sys::window().unwrap().clear_timeout_with_handle(timer);
        try_bind_scroll(&Rc::downgrade(shell), doc.clone(), attempt);
    }

    #[wasm_bindgen_test]
    fn test_scroll_bind_retries_until_container_appears() {
        let shell = shell();
        let doc = DocumentId::from("shell-test");
        shell.borrow_mut().attached = true;

        bind_scroll(&Rc::downgrade(&shell), doc.clone());
        for attempt in 2..=4 {
            assert!(!shell.borrow().scroll_bound(&doc));
            fire_bind_timer(&shell, &doc, attempt);
        }

        let container = mount();
        fire_bind_timer(&shell, &doc, 5);
        assert!(shell.borrow().scroll_bound(&doc));
        assert!(shell.borrow().bind_timer(&doc).is_none());

        shell.borrow_mut().release_scroll_bindings();
        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_scroll_bind_gives_up_after_attempt_budget() {
        let options = ViewerOptions {
            scroll_bind_attempts: 3,
            ..ViewerOptions::default()
        };
        let shell = shell_with(options);
        let doc = DocumentId::from("shell-test");
        shell.borrow_mut().attached = true;

        bind_scroll(&Rc::downgrade(&shell), doc.clone());
        fire_bind_timer(&shell, &doc, 2);
        assert!(shell.borrow().bind_timer(&doc).is_some());

        fire_bind_timer(&shell, &doc, 3);
        assert!(shell.borrow().bind_timer(&doc).is_none());
        assert!(!shell.borrow().scroll_bound(&doc));
    }

    #[wasm_bindgen_test]
    fn test_busy_shell_keeps_pass_queued() {
        let shell = shell();
        let doc = DocumentId::from("shell-test");
        {
            let mut inner = shell.borrow_mut();
            let mut scheduler = BrowserScheduler::new(Rc::downgrade(&shell));
            inner
                .viewer
                .go_to_evidence(0, Some(&doc), &mut scheduler)
                .unwrap();
        }

        let held = shell.borrow();
        run_pass(&Rc::downgrade(&shell), &doc, Pass::Frame);
        assert!(held.viewer.is_pending(&doc));
    }

    #[wasm_bindgen_test]
    fn test_scroll_bind_skipped_when_detached() {
        let container = mount();
        let shell = shell();
        let doc = DocumentId::from("shell-test");

        bind_scroll(&Rc::downgrade(&shell), doc.clone());
        assert!(!shell.borrow().scroll_bound(&doc));

        container.remove();
    }
}
