//! Documents, evidence shortcuts and per-document view state

use crate::geometry::{PercentRect, PixelRect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a configured document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Named jump target: a page plus an optional region to highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceShortcut {
    pub label: String,
    /// Target page (1-indexed)
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<PercentRect>,
}

/// Symbolic zoom modes understood by the wrapped viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomMode {
    PageFit,
    PageWidth,
    Auto,
}

/// Viewer zoom: a symbolic mode or an integer percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Zoom {
    Mode(ZoomMode),
    Percent(u32),
}

impl Zoom {
    /// Value every document returns to when it becomes active
    pub const FIT: Zoom = Zoom::Mode(ZoomMode::PageFit);
}

impl Default for Zoom {
    fn default() -> Self {
        Self::FIT
    }
}

/// Highlight the user asked for, tagged with the page it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveHighlight {
    #[serde(flatten)]
    pub rect: PercentRect,
    pub page: u32,
}

/// A configured document and its mutable view state
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    label: String,
    source: String,
    evidence: Vec<EvidenceShortcut>,
    pub(crate) current_page: Option<u32>,
    pub(crate) zoom: Zoom,
    pub(crate) active_highlight: Option<ActiveHighlight>,
    pub(crate) overlay_rect: Option<PixelRect>,
    pub(crate) page_count: Option<u32>,
}

impl Document {
    pub fn new(
        id: DocumentId,
        label: impl Into<String>,
        source: impl Into<String>,
        evidence: Vec<EvidenceShortcut>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            source: source.into(),
            evidence,
            current_page: None,
            zoom: Zoom::FIT,
            active_highlight: None,
            overlay_rect: None,
            page_count: None,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Locator handed to the viewer's source input
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evidence(&self) -> &[EvidenceShortcut] {
        &self.evidence
    }

    /// Current page, 1 until the document has been shown
    pub fn current_page(&self) -> u32 {
        self.current_page.unwrap_or(1)
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn active_highlight(&self) -> Option<&ActiveHighlight> {
        self.active_highlight.as_ref()
    }

    pub fn overlay_rect(&self) -> Option<&PixelRect> {
        self.overlay_rect.as_ref()
    }

    /// Page count reported by the viewer once pages are loaded
    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub(crate) fn clear_highlight(&mut self) {
        self.active_highlight = None;
        self.overlay_rect = None;
    }

    /// Read-only copy for the host UI
    pub fn snapshot(&self, active: bool) -> DocumentSnapshot {
        DocumentSnapshot {
            id: self.id.clone(),
            label: self.label.clone(),
            source: self.source.clone(),
            evidence: self.evidence.clone(),
            current_page: self.current_page(),
            zoom: self.zoom,
            active_highlight: self.active_highlight,
            overlay_rect: self.overlay_rect,
            page_count: self.page_count,
            active,
        }
    }
}

/// Serializable view of a document's state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    pub id: DocumentId,
    pub label: String,
    pub source: String,
    pub evidence: Vec<EvidenceShortcut>,
    pub current_page: u32,
    pub zoom: Zoom,
    pub active_highlight: Option<ActiveHighlight>,
    pub overlay_rect: Option<PixelRect>,
    pub page_count: Option<u32>,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new("a".into(), "A", "/a.pdf", Vec::new());
        assert_eq!(doc.current_page(), 1);
        assert_eq!(doc.zoom(), Zoom::FIT);
        assert!(doc.active_highlight().is_none());
        assert!(doc.overlay_rect().is_none());
        assert!(doc.page_count().is_none());
    }

    #[test]
    fn test_zoom_serialization() {
        assert_eq!(serde_json::to_string(&Zoom::FIT).unwrap(), "\"page-fit\"");
        assert_eq!(serde_json::to_string(&Zoom::Percent(150)).unwrap(), "150");

        let zoom: Zoom = serde_json::from_str("\"page-width\"").unwrap();
        assert_eq!(zoom, Zoom::Mode(ZoomMode::PageWidth));
        let zoom: Zoom = serde_json::from_str("75").unwrap();
        assert_eq!(zoom, Zoom::Percent(75));
    }

    #[test]
    fn test_highlight_serializes_flat() {
        let highlight = ActiveHighlight {
            rect: PercentRect::new(1.0, 2.0, 3.0, 4.0),
            page: 7,
        };
        let json = serde_json::to_value(highlight).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"top": 1.0, "left": 2.0, "width": 3.0, "height": 4.0, "page": 7})
        );
    }

    #[test]
    fn test_snapshot_uses_camel_case() {
        let doc = Document::new("a".into(), "A", "/a.pdf", Vec::new());
        let json = serde_json::to_value(doc.snapshot(true)).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["zoom"], "page-fit");
        assert_eq!(json["active"], true);
        assert!(json["overlayRect"].is_null());
    }
}
