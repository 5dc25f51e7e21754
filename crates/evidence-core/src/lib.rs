//! Evidence viewer state and overlay geometry
//!
//! Platform-independent half of the evidence viewer: the document registry,
//! selection and navigation controllers, the percent-to-pixel overlay
//! transform, recompute coalescing, and zoom gesture classification.
//!
//! Everything that touches the DOM lives in the `evidence-wasm` app, which
//! plugs into this crate through [`PageGeometry`] and [`RecomputeScheduler`].

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod registry;
pub mod sync;
pub mod viewer;
pub mod zoom;

pub use config::{DocumentConfig, DomLayout, RegistryConfig, ViewerOptions};
pub use document::{
    ActiveHighlight, Document, DocumentId, DocumentSnapshot, EvidenceShortcut, Zoom, ZoomMode,
};
pub use error::{ConfigError, ViewerError};
pub use geometry::{overlay_rect, BoundingBox, PercentRect, PixelRect};
pub use registry::DocumentRegistry;
pub use sync::{
    DeferReason, FallbackTicket, PageGeometry, Pass, RecomputeOutcome, RecomputeQueue,
    RecomputeScheduler, Scheduled,
};
pub use viewer::Viewer;
pub use zoom::{is_zoom_shortcut, is_zoom_wheel, KeyChord, ModifierPolicy};
