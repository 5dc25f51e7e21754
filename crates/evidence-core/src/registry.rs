//! In-memory document registry
//!
//! Documents are created once from configuration and live for the whole
//! session; controllers mutate their view state in place.

use crate::config::RegistryConfig;
use crate::document::{Document, DocumentId};
use crate::error::ViewerError;

#[derive(Debug, Clone)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
}

impl DocumentRegistry {
    /// Build a registry from an already validated configuration
    pub fn from_config(config: RegistryConfig) -> Self {
        let documents = config
            .documents
            .into_iter()
            .map(|doc| Document::new(doc.id, doc.label, doc.source, doc.evidence))
            .collect();
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> {
        self.documents.iter().map(Document::id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|doc| doc.id() == id)
    }

    pub fn require(&self, id: &DocumentId) -> Result<&Document, ViewerError> {
        self.get(id)
            .ok_or_else(|| ViewerError::UnknownDocument(id.clone()))
    }

    pub(crate) fn require_mut(&mut self, id: &DocumentId) -> Result<&mut Document, ViewerError> {
        self.get_mut(id)
            .ok_or_else(|| ViewerError::UnknownDocument(id.clone()))
    }

    /// Documents that currently carry a highlight
    pub fn highlighted(&self) -> impl Iterator<Item = &DocumentId> {
        self.documents
            .iter()
            .filter(|doc| doc.active_highlight().is_some())
            .map(Document::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_builtin_config() {
        let registry = DocumentRegistry::from_config(RegistryConfig::builtin().unwrap());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&"ui-comparison".into()));
        assert_eq!(
            registry.get(&"ui-comparison".into()).unwrap().source(),
            "/pdfs/file-example_PDF_1MB.pdf"
        );
    }

    #[test]
    fn test_require_unknown() {
        let registry = DocumentRegistry::from_config(RegistryConfig::builtin().unwrap());
        let err = registry.require(&"missing".into()).unwrap_err();
        assert_eq!(err, ViewerError::UnknownDocument("missing".into()));
    }

    #[test]
    fn test_nothing_highlighted_initially() {
        let registry = DocumentRegistry::from_config(RegistryConfig::builtin().unwrap());
        assert_eq!(registry.highlighted().count(), 0);
    }
}
