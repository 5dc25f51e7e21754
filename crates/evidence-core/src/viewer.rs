//! Selection and navigation controllers plus overlay recompute
//!
//! `Viewer` owns the registry and the active selection. Every operation that
//! changes what should be highlighted goes through the recompute queue, so
//! the host sees at most one animation frame outstanding per document, and
//! only the newest fallback timer of a document does any work.

use crate::config::{RegistryConfig, ViewerOptions};
use crate::document::{ActiveHighlight, Document, DocumentId, DocumentSnapshot, Zoom};
use crate::error::ViewerError;
use crate::geometry::overlay_rect;
use crate::registry::DocumentRegistry;
use crate::sync::{
    DeferReason, FallbackTicket, PageGeometry, Pass, RecomputeOutcome, RecomputeQueue,
    RecomputeScheduler, Scheduled,
};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug)]
pub struct Viewer {
    registry: DocumentRegistry,
    active: Option<DocumentId>,
    queue: RecomputeQueue,
    fallback_delay: Duration,
}

impl Viewer {
    pub fn new(registry: DocumentRegistry, fallback_delay: Duration) -> Self {
        Self {
            registry,
            active: None,
            queue: RecomputeQueue::new(),
            fallback_delay,
        }
    }

    pub fn from_config(config: RegistryConfig, options: &ViewerOptions) -> Self {
        Self::new(
            DocumentRegistry::from_config(config),
            options.fallback_delay(),
        )
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.registry.get(id)
    }

    pub fn active(&self) -> Option<&DocumentId> {
        self.active.as_ref()
    }

    pub fn is_active(&self, id: &DocumentId) -> bool {
        self.active.as_ref() == Some(id)
    }

    pub fn snapshot(&self, id: &DocumentId) -> Result<DocumentSnapshot, ViewerError> {
        Ok(self.registry.require(id)?.snapshot(self.is_active(id)))
    }

    pub fn snapshots(&self) -> Vec<DocumentSnapshot> {
        self.registry
            .iter()
            .map(|doc| doc.snapshot(self.is_active(doc.id())))
            .collect()
    }

    /// Make `id` the active document.
    ///
    /// Returns `false` without touching any state when it already is.
    pub fn select_document<S: RecomputeScheduler + ?Sized>(
        &mut self,
        id: &DocumentId,
        scheduler: &mut S,
    ) -> Result<bool, ViewerError> {
        if !self.activate(id)? {
            return Ok(false);
        }
        if self.registry.require(id)?.active_highlight.is_some() {
            self.queue
                .schedule_cycle(id, self.fallback_delay, scheduler);
        }
        Ok(true)
    }

    /// Selection state change without scheduling; callers that go on to
    /// change the highlight schedule once themselves.
    fn activate(&mut self, id: &DocumentId) -> Result<bool, ViewerError> {
        if self.is_active(id) {
            return Ok(false);
        }

        let doc = self.registry.require_mut(id)?;
        doc.current_page.get_or_insert(1);
        doc.zoom = Zoom::FIT;
        // Pixels measured while the document was last shown are stale
        doc.overlay_rect = None;

        debug!(document = %id, label = doc.label(), previous = ?self.active, "Selected document");
        self.active = Some(id.clone());
        Ok(true)
    }

    /// Show `page` of `doc` (the active document when `None`), dropping any
    /// highlight.
    pub fn go_to_page(&mut self, page: u32, doc: Option<&DocumentId>) -> Result<(), ViewerError> {
        let id = self.resolve(doc)?;
        check_page(self.registry.require(&id)?, page)?;

        self.activate(&id)?;
        let doc = self.registry.require_mut(&id)?;
        doc.current_page = Some(page);
        doc.clear_highlight();

        debug!(document = %id, page, "Navigated to page");
        Ok(())
    }

    /// Jump to the evidence shortcut at `index` of `doc` (the active document
    /// when `None`) and highlight its region.
    pub fn go_to_evidence<S: RecomputeScheduler + ?Sized>(
        &mut self,
        index: usize,
        doc: Option<&DocumentId>,
        scheduler: &mut S,
    ) -> Result<Scheduled, ViewerError> {
        let id = self.resolve(doc)?;
        let document = self.registry.require(&id)?;
        let shortcut = document
            .evidence()
            .get(index)
            .cloned()
            .ok_or_else(|| ViewerError::UnknownEvidence {
                document: id.clone(),
                index,
            })?;
        check_page(document, shortcut.page)?;

        self.activate(&id)?;
        let doc = self.registry.require_mut(&id)?;
        doc.active_highlight = shortcut.rect.map(|rect| ActiveHighlight {
            rect,
            page: shortcut.page,
        });
        doc.overlay_rect = None;
        doc.current_page = Some(shortcut.page);

        debug!(document = %id, evidence = %shortcut.label, page = shortcut.page, "Navigated to evidence");
        Ok(self
            .queue
            .schedule_cycle(&id, self.fallback_delay, scheduler))
    }

    /// Recompute the overlay of `id` against current layout.
    pub fn recompute<G: PageGeometry + ?Sized>(
        &mut self,
        id: &DocumentId,
        geometry: &G,
    ) -> Result<RecomputeOutcome, ViewerError> {
        let doc = self.registry.require_mut(id)?;

        let Some(highlight) = doc.active_highlight else {
            doc.overlay_rect = None;
            return Ok(RecomputeOutcome::Cleared);
        };

        let outcome = match (
            geometry.container_box(id),
            geometry.page_box(id, highlight.page),
        ) {
            (None, _) => RecomputeOutcome::Deferred(DeferReason::ContainerMissing),
            (Some(_), None) => RecomputeOutcome::Deferred(DeferReason::PageMissing),
            (Some(container), Some(page)) => match overlay_rect(page, container, highlight.rect) {
                Some(rect) => {
                    doc.overlay_rect = Some(rect);
                    RecomputeOutcome::Updated(rect)
                }
                None => RecomputeOutcome::Deferred(DeferReason::PageNotRendered),
            },
        };

        trace!(document = %id, ?outcome, "Recomputed overlay");
        Ok(outcome)
    }

    /// Animation-frame callback for `id`
    pub fn frame_fired<G: PageGeometry + ?Sized>(
        &mut self,
        id: &DocumentId,
        geometry: &G,
    ) -> Result<RecomputeOutcome, ViewerError> {
        self.queue.frame_fired(id);
        self.recompute(id, geometry)
    }

    /// Fallback-timer callback for `id`. Superseded fallbacks do nothing.
    pub fn fallback_fired<G: PageGeometry + ?Sized>(
        &mut self,
        id: &DocumentId,
        ticket: FallbackTicket,
        geometry: &G,
    ) -> Result<RecomputeOutcome, ViewerError> {
        if !self.queue.fallback_fired(id, ticket) {
            trace!(document = %id, ?ticket, "Ignoring superseded fallback");
            return Ok(RecomputeOutcome::Superseded);
        }
        self.recompute(id, geometry)
    }

    pub fn pass_fired<G: PageGeometry + ?Sized>(
        &mut self,
        id: &DocumentId,
        pass: Pass,
        geometry: &G,
    ) -> Result<RecomputeOutcome, ViewerError> {
        match pass {
            Pass::Frame => self.frame_fired(id, geometry),
            Pass::Fallback(ticket) => self.fallback_fired(id, ticket, geometry),
        }
    }

    /// The host dropped `pass` without running it
    pub fn discard_pass(&mut self, id: &DocumentId, pass: Pass) {
        self.queue.discard(id, pass);
    }

    /// The viewer finished laying out the pages of `id`
    pub fn pages_loaded<S: RecomputeScheduler + ?Sized>(
        &mut self,
        id: &DocumentId,
        page_count: u32,
        scheduler: &mut S,
    ) -> Result<Scheduled, ViewerError> {
        let doc = self.registry.require_mut(id)?;
        doc.page_count = Some(page_count);
        if page_count > 0 {
            if let Some(current) = doc.current_page.as_mut() {
                *current = (*current).min(page_count);
            }
        }
        let highlighted = doc.active_highlight.is_some();

        debug!(document = %id, page_count, "Pages loaded");
        if highlighted {
            Ok(self
                .queue
                .schedule_cycle(id, self.fallback_delay, scheduler))
        } else {
            Ok(Scheduled::default())
        }
    }

    /// Scroll or resize: queue a frame for every highlighted document.
    ///
    /// Returns the documents a frame was actually requested for.
    pub fn layout_changed<S: RecomputeScheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
    ) -> Vec<DocumentId> {
        let highlighted: Vec<DocumentId> = self.registry.highlighted().cloned().collect();
        highlighted
            .into_iter()
            .filter(|id| self.queue.schedule_frame(id, scheduler))
            .collect()
    }

    pub fn is_pending(&self, id: &DocumentId) -> bool {
        self.queue.is_pending(id)
    }

    /// Forget outstanding callbacks; they become no-ops when they fire
    pub fn cancel_pending(&mut self) {
        self.queue.clear();
    }

    fn resolve(&self, doc: Option<&DocumentId>) -> Result<DocumentId, ViewerError> {
        match doc {
            Some(id) => Ok(id.clone()),
            None => self.active.clone().ok_or(ViewerError::NoActiveDocument),
        }
    }
}

fn check_page(doc: &Document, page: u32) -> Result<(), ViewerError> {
    if page == 0 {
        return Err(ViewerError::InvalidPage(page));
    }
    match doc.page_count() {
        Some(page_count) if page_count > 0 && page > page_count => {
            Err(ViewerError::PageOutOfRange { page, page_count })
        }
        _ => Ok(()),
    }
}
