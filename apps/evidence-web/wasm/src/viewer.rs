//! JS-facing evidence viewer
//!
//! Holds all view state in Rust; the host page only forwards clicks and the
//! wrapped viewer's "pages loaded" notification, and reads snapshots back.

use crate::listeners::{ListenerHandle, ListenerOptions};
use crate::logging;
use crate::scheduler::BrowserScheduler;
use crate::shell::{bind_scroll, layout_changed, notify_changed, SharedShell, Shell};
use crate::zoom_guard::{platform_policy, ZoomGuard};
use evidence_core::{DocumentId, RegistryConfig, Viewer, ViewerError, ViewerOptions};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use tracing::{debug, info};
use wasm_bindgen::prelude::*;

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Evidence viewer bound to one page's documents
#[wasm_bindgen]
pub struct EvidenceViewer {
    shell: SharedShell,
    zoom_guard: Option<ZoomGuard>,
    resize: Option<ListenerHandle>,
}

#[wasm_bindgen]
impl EvidenceViewer {
    /// Create a viewer from a registry JSON (built-in registry when omitted)
    /// and options JSON (defaults when omitted)
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: Option<String>,
        options_json: Option<String>,
    ) -> Result<EvidenceViewer, JsValue> {
        let config = match config_json {
            Some(json) => RegistryConfig::from_json(&json),
            None => RegistryConfig::builtin(),
        }
        .map_err(js_error)?;
        let options = match options_json {
            Some(json) => ViewerOptions::from_json(&json),
            None => Ok(ViewerOptions::default()),
        }
        .map_err(js_error)?;

        logging::init(options.level().map_err(js_error)?);
        info!(documents = config.documents.len(), "Evidence viewer created");

        let viewer = Viewer::from_config(config, &options);
        Ok(Self {
            shell: Rc::new(RefCell::new(Shell::new(viewer, options))),
            zoom_guard: None,
            resize: None,
        })
    }

    /// Install the zoom guard, resize listener and scroll listeners.
    /// Calling it again while attached does nothing.
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if self.shell.borrow().attached {
            return Ok(());
        }
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;

        let zoom_guard = ZoomGuard::attach(&window, platform_policy(&window))?;
        let weak = Rc::downgrade(&self.shell);
        let resize = ListenerHandle::add(&window, "resize", ListenerOptions::PASSIVE, move |_| {
            layout_changed(&weak)
        })?;

        self.zoom_guard = Some(zoom_guard);
        self.resize = Some(resize);
        let ids: Vec<DocumentId> = {
            let mut shell = self.shell.borrow_mut();
            shell.attached = true;
            shell.viewer.registry().ids().cloned().collect()
        };

        let weak = Rc::downgrade(&self.shell);
        for id in ids {
            bind_scroll(&weak, id);
        }
        debug!("Attached");
        Ok(())
    }

    /// Remove every listener installed by `attach`
    pub fn detach(&mut self) {
        self.zoom_guard = None;
        self.resize = None;
        if let Ok(mut shell) = self.shell.try_borrow_mut() {
            if shell.attached {
                shell.attached = false;
                shell.release_scroll_bindings();
                shell.viewer.cancel_pending();
                debug!("Detached");
            }
        }
    }

    #[wasm_bindgen(getter, js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.shell.borrow().attached
    }

    /// Returns whether the selection changed
    #[wasm_bindgen(js_name = selectDocument)]
    pub fn select_document(&self, id: &str) -> Result<bool, JsValue> {
        let id = DocumentId::from(id);
        let changed = self.update(&id, |shell, scheduler| {
            shell.viewer.select_document(&id, scheduler)
        })?;
        if changed {
            notify_changed(&self.shell, &id);
        }
        Ok(changed)
    }

    /// Navigate to `page`, on document `id` or the active document
    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&self, page: u32, id: Option<String>) -> Result<(), JsValue> {
        let id = self.target(id)?;
        self.update(&id, |shell, _| shell.viewer.go_to_page(page, Some(&id)))?;
        notify_changed(&self.shell, &id);
        Ok(())
    }

    /// Navigate to evidence shortcut `index`, on document `id` or the active document
    #[wasm_bindgen(js_name = goToEvidence)]
    pub fn go_to_evidence(&self, index: usize, id: Option<String>) -> Result<(), JsValue> {
        let id = self.target(id)?;
        self.update(&id, |shell, scheduler| {
            shell
                .viewer
                .go_to_evidence(index, Some(&id), scheduler)
                .map(|_| ())
        })?;
        notify_changed(&self.shell, &id);
        Ok(())
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self, id: &str) -> bool {
        self.shell.borrow().viewer.is_active(&DocumentId::from(id))
    }

    #[wasm_bindgen(js_name = activeDocument)]
    pub fn active_document(&self) -> Option<String> {
        self.shell
            .borrow()
            .viewer
            .active()
            .map(|id| id.as_str().to_string())
    }

    /// Forward the wrapped viewer's "pages loaded" notification
    #[wasm_bindgen(js_name = notifyPagesLoaded)]
    pub fn notify_pages_loaded(&self, id: &str, page_count: u32) -> Result<(), JsValue> {
        let id = DocumentId::from(id);
        self.update(&id, |shell, scheduler| {
            shell.viewer.pages_loaded(&id, page_count, scheduler).map(|_| ())
        })?;
        // The viewer may have re-rendered its scroll container
        if self.is_attached() {
            bind_scroll(&Rc::downgrade(&self.shell), id.clone());
        }
        notify_changed(&self.shell, &id);
        Ok(())
    }

    /// Recompute every highlighted overlay on the next frame
    #[wasm_bindgen(js_name = refreshLayout)]
    pub fn refresh_layout(&self) {
        layout_changed(&Rc::downgrade(&self.shell));
    }

    /// Snapshots of every document, in registry order
    pub fn documents(&self) -> Result<JsValue, JsValue> {
        let snapshots = self.shell.borrow().viewer.snapshots();
        serde_wasm_bindgen::to_value(&snapshots)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Snapshot of one document
    pub fn document(&self, id: &str) -> Result<JsValue, JsValue> {
        let snapshot = self
            .shell
            .borrow()
            .viewer
            .snapshot(&DocumentId::from(id))
            .map_err(js_error)?;
        serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Callback signature: (documentId: string) => void
    #[wasm_bindgen(js_name = setChangeCallback)]
    pub fn set_change_callback(&self, callback: Option<js_sys::Function>) {
        self.shell.borrow_mut().change_callback = callback;
    }
}

impl EvidenceViewer {
    /// Resolve an optional id to the active document
    fn target(&self, id: Option<String>) -> Result<DocumentId, JsValue> {
        match id {
            Some(id) => Ok(DocumentId::from(id.as_str())),
            None => self
                .shell
                .borrow()
                .viewer
                .active()
                .cloned()
                .ok_or_else(|| js_error(ViewerError::NoActiveDocument)),
        }
    }

    /// Run a controller operation, then redraw the overlay of `id`
    fn update<T>(
        &self,
        id: &DocumentId,
        op: impl FnOnce(&mut Shell, &mut BrowserScheduler) -> Result<T, ViewerError>,
    ) -> Result<T, JsValue> {
        let mut shell = self
            .shell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Viewer is busy"))?;
        let mut scheduler = BrowserScheduler::new(Rc::downgrade(&self.shell));
        let result = op(&mut *shell, &mut scheduler).map_err(js_error)?;
        shell.render_overlay(id);
        Ok(result)
    }
}

impl Drop for EvidenceViewer {
    fn drop(&mut self) {
        self.detach();
    }
}
