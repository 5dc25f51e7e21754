//! Overlay synchronization seams
//!
//! The overlay is recomputed against live layout. Both layout measurement and
//! callback scheduling belong to the host, so they are injected through the
//! two traits below; the browser shell implements them with DOM lookups,
//! `requestAnimationFrame` and `setTimeout`.

use crate::document::DocumentId;
use crate::geometry::{BoundingBox, PixelRect};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Live layout measurements for a document
pub trait PageGeometry {
    /// Bounding box of the document's outer display container
    fn container_box(&self, doc: &DocumentId) -> Option<BoundingBox>;

    /// Bounding box of a page element inside the viewer's scroll container
    fn page_box(&self, doc: &DocumentId, page: u32) -> Option<BoundingBox>;
}

/// Host-side callback scheduling
pub trait RecomputeScheduler {
    /// Recompute `doc` on the next animation frame
    fn request_frame(&mut self, doc: &DocumentId);

    /// Recompute `doc` again after `delay`, in case the first pass raced the
    /// viewer's own rendering. The callback must hand `ticket` back.
    fn request_fallback(&mut self, doc: &DocumentId, ticket: FallbackTicket, delay: Duration);
}

/// Identifies one fallback request; only the newest per document is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FallbackTicket(u64);

/// A scheduled callback, as carried by the host until it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Frame,
    Fallback(FallbackTicket),
}

/// Why a recompute left the overlay untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    ContainerMissing,
    PageMissing,
    PageNotRendered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecomputeOutcome {
    /// No highlight is active; overlay removed
    Cleared,
    Updated(PixelRect),
    /// Layout not measurable yet; prior overlay kept
    Deferred(DeferReason),
    /// Fallback replaced by a newer one; nothing recomputed
    Superseded,
}

impl RecomputeOutcome {
    /// Whether the displayed overlay needs to be redrawn
    pub fn changes_overlay(&self) -> bool {
        matches!(self, Self::Cleared | Self::Updated(_))
    }
}

/// Which callbacks a schedule call actually issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scheduled {
    pub frame: bool,
    pub fallback: bool,
}

impl Scheduled {
    pub fn any(&self) -> bool {
        self.frame || self.fallback
    }
}

/// Outstanding recompute callbacks per document.
///
/// A frame request while a frame is already outstanding for the document is
/// dropped; the outstanding frame reads state fresh when it fires. Fallbacks
/// are re-armed instead: each cycle issues a new one, measured from the
/// triggering call, and any older fallback for the document goes stale.
#[derive(Debug, Default)]
pub struct RecomputeQueue {
    frames: BTreeSet<DocumentId>,
    fallbacks: BTreeMap<DocumentId, FallbackTicket>,
    next_ticket: u64,
}

impl RecomputeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full cycle: animation frame plus delayed fallback
    pub fn schedule_cycle<S: RecomputeScheduler + ?Sized>(
        &mut self,
        doc: &DocumentId,
        fallback_delay: Duration,
        scheduler: &mut S,
    ) -> Scheduled {
        let frame = self.schedule_frame(doc, scheduler);

        let ticket = FallbackTicket(self.next_ticket);
        self.next_ticket += 1;
        self.fallbacks.insert(doc.clone(), ticket);
        scheduler.request_fallback(doc, ticket, fallback_delay);

        Scheduled {
            frame,
            fallback: true,
        }
    }

    /// Frame only, used for scroll and resize bursts
    pub fn schedule_frame<S: RecomputeScheduler + ?Sized>(
        &mut self,
        doc: &DocumentId,
        scheduler: &mut S,
    ) -> bool {
        if self.frames.insert(doc.clone()) {
            scheduler.request_frame(doc);
            true
        } else {
            false
        }
    }

    pub fn frame_fired(&mut self, doc: &DocumentId) {
        self.frames.remove(doc);
    }

    /// Returns whether `ticket` was still the live fallback of `doc`
    pub fn fallback_fired(&mut self, doc: &DocumentId, ticket: FallbackTicket) -> bool {
        if self.fallbacks.get(doc) == Some(&ticket) {
            self.fallbacks.remove(doc);
            true
        } else {
            false
        }
    }

    /// Forget `pass` without recomputing, e.g. when the host could not run it
    pub fn discard(&mut self, doc: &DocumentId, pass: Pass) {
        match pass {
            Pass::Frame => self.frame_fired(doc),
            Pass::Fallback(ticket) => {
                self.fallback_fired(doc, ticket);
            }
        }
    }

    pub fn is_pending(&self, doc: &DocumentId) -> bool {
        self.frames.contains(doc) || self.fallbacks.contains_key(doc)
    }

    /// Forget everything outstanding, e.g. on teardown
    pub fn clear(&mut self) {
        self.frames.clear();
        self.fallbacks.clear();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Scheduler that records requests instead of running them
    #[derive(Debug, Default)]
    pub struct RecordingScheduler {
        pub frames: Vec<DocumentId>,
        pub fallbacks: Vec<(DocumentId, FallbackTicket, Duration)>,
    }

    impl RecomputeScheduler for RecordingScheduler {
        fn request_frame(&mut self, doc: &DocumentId) {
            self.frames.push(doc.clone());
        }

        fn request_fallback(&mut self, doc: &DocumentId, ticket: FallbackTicket, delay: Duration) {
            self.fallbacks.push((doc.clone(), ticket, delay));
        }
    }

    impl RecordingScheduler {
        /// Ticket of the most recent fallback requested for `doc`
        pub fn last_ticket(&self, doc: &DocumentId) -> Option<FallbackTicket> {
            self.fallbacks
                .iter()
                .rev()
                .find(|(id, _, _)| id == doc)
                .map(|(_, ticket, _)| *ticket)
        }
    }

    /// Fixed layout
    #[derive(Debug, Default)]
    pub struct FixedGeometry {
        pub containers: HashMap<DocumentId, BoundingBox>,
        pub pages: HashMap<(DocumentId, u32), BoundingBox>,
    }

    impl PageGeometry for FixedGeometry {
        fn container_box(&self, doc: &DocumentId) -> Option<BoundingBox> {
            self.containers.get(doc).copied()
        }

        fn page_box(&self, doc: &DocumentId, page: u32) -> Option<BoundingBox> {
            self.pages.get(&(doc.clone(), page)).copied()
        }
    }
}
