//! DOM lookups against the wrapped viewer's markup
//!
//! The viewer creates its scroll container and page elements itself, some
//! time after initialization. Every lookup here can therefore come back
//! empty; callers treat that as "not yet" and retry on the next trigger.

use evidence_core::{BoundingBox, DocumentId, DomLayout, PageGeometry};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

pub struct DomGeometry<'a> {
    document: Document,
    layout: &'a DomLayout,
}

impl<'a> DomGeometry<'a> {
    /// `None` outside a browser window
    pub fn new(layout: &'a DomLayout) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document, layout })
    }

    /// Outer display container of `doc`
    pub fn container(&self, doc: &DocumentId) -> Option<Element> {
        self.document
            .get_element_by_id(&self.layout.container_id(doc))
    }

    /// The viewer's scrollable container inside the document container
    pub fn scroll_container(&self, doc: &DocumentId) -> Option<Element> {
        self.container(doc)?
            .query_selector(&self.layout.scroll_container_selector)
            .ok()
            .flatten()
    }

    pub fn page_element(&self, doc: &DocumentId, page: u32) -> Option<Element> {
        self.scroll_container(doc)?
            .query_selector(&self.layout.page_selector(page))
            .ok()
            .flatten()
    }

    pub fn overlay_element(&self, doc: &DocumentId) -> Option<HtmlElement> {
        self.container(doc)?
            .query_selector(&self.layout.overlay_selector)
            .ok()
            .flatten()?
            .dyn_into::<HtmlElement>()
            .ok()
    }
}

fn bounding_box(element: &Element) -> BoundingBox {
    let rect = element.get_bounding_client_rect();
    BoundingBox::new(rect.top(), rect.left(), rect.width(), rect.height())
}

impl PageGeometry for DomGeometry<'_> {
    fn container_box(&self, doc: &DocumentId) -> Option<BoundingBox> {
        self.container(doc).map(|el| bounding_box(&el))
    }

    fn page_box(&self, doc: &DocumentId, page: u32) -> Option<BoundingBox> {
        self.page_element(doc, page).map(|el| bounding_box(&el))
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const MARKUP: &str = r#"
        <div id="viewerContainer">
            <div class="page" data-page-number="1" style="width: 400px; height: 500px"></div>
            <div class="page" data-page-number="2" style="width: 0; height: 0"></div>
        </div>
        <div class="evidence-overlay"></div>
    "#;

    fn mount(id: &str) -> Element {
        let document = web_sys::window().unwrap().document().unwrap();
        let container = document.create_element("div").unwrap();
        container.set_id(id);
        container.set_inner_html(MARKUP);
        document.body().unwrap().append_child(&container).unwrap();
        container
    }

    #[wasm_bindgen_test]
    fn test_lookups() {
        let layout = DomLayout::default();
        let container = mount("evidence-doc-lookup");
        let geometry = DomGeometry::new(&layout).unwrap();
        let doc = DocumentId::from("lookup");

        assert!(geometry.container(&doc).is_some());
        assert!(geometry.scroll_container(&doc).is_some());
        assert!(geometry.overlay_element(&doc).is_some());

        let page = geometry.page_box(&doc, 1).unwrap();
        assert_eq!(page.width, 400.0);
        assert_eq!(page.height, 500.0);
        assert!(!geometry.page_box(&doc, 2).unwrap().is_measurable());
        assert!(geometry.page_box(&doc, 3).is_none());

        container.remove();
    }

    #[wasm_bindgen_test]
    fn test_missing_container() {
        let layout = DomLayout::default();
        let geometry = DomGeometry::new(&layout).unwrap();
        let doc = DocumentId::from("absent");

        assert!(geometry.container_box(&doc).is_none());
        assert!(geometry.page_box(&doc, 1).is_none());
        assert!(geometry.overlay_element(&doc).is_none());
    }
}
