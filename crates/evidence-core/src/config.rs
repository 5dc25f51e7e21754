//! Registry and viewer configuration
//!
//! Both are authored as JSON. The registry lists the documents and their
//! evidence shortcuts; the options tune timing and describe where the
//! wrapped viewer puts its DOM elements.

use crate::document::{DocumentId, EvidenceShortcut};
use crate::error::ConfigError;
use crate::geometry::PercentRect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Registry shipped with the crate
const DEFAULT_REGISTRY: &str = include_str!("../config/documents.json");

/// Tolerance for rects authored right up to the page edge
const EDGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub documents: Vec<DocumentConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub id: DocumentId,
    pub label: String,
    pub source: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceShortcut>,
}

impl RegistryConfig {
    /// Parse and validate a registry from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The built-in registry
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_REGISTRY)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.documents.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut seen = HashSet::new();
        for doc in &self.documents {
            if doc.id.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyId);
            }
            if !seen.insert(&doc.id) {
                return Err(ConfigError::DuplicateId(doc.id.clone()));
            }

            for shortcut in &doc.evidence {
                if shortcut.page == 0 {
                    return Err(ConfigError::InvalidPage {
                        document: doc.id.clone(),
                        label: shortcut.label.clone(),
                        page: shortcut.page,
                    });
                }
                if let Some(rect) = &shortcut.rect {
                    validate_rect(rect).map_err(|reason| ConfigError::InvalidRect {
                        document: doc.id.clone(),
                        label: shortcut.label.clone(),
                        reason,
                    })?;
                }
            }
        }

        Ok(())
    }
}

fn validate_rect(rect: &PercentRect) -> Result<(), String> {
    let fields = [
        ("top", rect.top),
        ("left", rect.left),
        ("width", rect.width),
        ("height", rect.height),
    ];
    for (name, value) in fields {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(format!("{} must be within 0-100, got {}", name, value));
        }
    }

    if rect.width <= 0.0 || rect.height <= 0.0 {
        return Err("width and height must be positive".to_string());
    }
    if rect.left + rect.width > 100.0 + EDGE_EPSILON {
        return Err(format!(
            "left + width exceeds the page ({} + {})",
            rect.left, rect.width
        ));
    }
    if rect.top + rect.height > 100.0 + EDGE_EPSILON {
        return Err(format!(
            "top + height exceeds the page ({} + {})",
            rect.top, rect.height
        ));
    }

    Ok(())
}

/// Where the wrapped viewer places the elements the overlay is measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomLayout {
    /// Document container element id is this prefix followed by the document id
    pub container_id_prefix: String,
    /// Viewer's scrollable container, looked up inside the document container
    pub scroll_container_selector: String,
    /// Page element selector; `{page}` is replaced by the page number
    pub page_selector_template: String,
    /// Overlay element, looked up inside the document container
    pub overlay_selector: String,
}

impl Default for DomLayout {
    fn default() -> Self {
        Self {
            container_id_prefix: "evidence-doc-".to_string(),
            scroll_container_selector: "#viewerContainer".to_string(),
            page_selector_template: ".page[data-page-number=\"{page}\"]".to_string(),
            overlay_selector: ".evidence-overlay".to_string(),
        }
    }
}

impl DomLayout {
    pub fn container_id(&self, doc: &DocumentId) -> String {
        format!("{}{}", self.container_id_prefix, doc)
    }

    pub fn page_selector(&self, page: u32) -> String {
        self.page_selector_template
            .replace("{page}", &page.to_string())
    }
}

/// Timing and layout options for the browser shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerOptions {
    /// Delay of the fallback recompute that follows each animation frame
    pub fallback_delay_ms: u32,
    /// Attempts made to find the viewer's scroll container before giving up
    pub scroll_bind_attempts: u32,
    pub scroll_bind_interval_ms: u32,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    pub layout: DomLayout,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            fallback_delay_ms: 120,
            scroll_bind_attempts: 20,
            scroll_bind_interval_ms: 100,
            log_level: "info".to_string(),
            layout: DomLayout::default(),
        }
    }
}

impl ViewerOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scroll_bind_attempts == 0 {
            return Err(ConfigError::InvalidOption {
                name: "scrollBindAttempts",
                reason: "must be at least 1".to_string(),
            });
        }
        self.level()?;
        if !self.layout.page_selector_template.contains("{page}") {
            return Err(ConfigError::InvalidOption {
                name: "layout.pageSelectorTemplate",
                reason: "must contain {page}".to_string(),
            });
        }
        Ok(())
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.fallback_delay_ms))
    }

    pub fn scroll_bind_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.scroll_bind_interval_ms))
    }

    /// Parsed log level
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidOption {
                name: "logLevel",
                reason: format!("unknown level '{}'", self.log_level),
            })
    }
}
