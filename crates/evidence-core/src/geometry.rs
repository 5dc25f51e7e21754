//! Coordinate transformation from page-relative percentages to container pixels
//!
//! Highlight rectangles are authored in percent of the rendered page so they
//! survive any zoom level. The overlay is positioned in pixels relative to the
//! document's display container, so every recompute maps one into the other
//! using live bounding boxes.

use serde::{Deserialize, Serialize};

/// Region of a page expressed in percent (0-100) of the page's rendered size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

/// Absolute pixel rectangle relative to a document container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport-relative bounding box, as reported by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// A page element reports a zero-sized box until the viewer renders it
    pub fn is_measurable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Translate a highlight into container-relative pixels.
///
/// Returns `None` when the page is not measurable yet.
pub fn overlay_rect(
    page: BoundingBox,
    container: BoundingBox,
    highlight: PercentRect,
) -> Option<PixelRect> {
    if !page.is_measurable() {
        return None;
    }

    let top = page.top - container.top + (highlight.top / 100.0) * page.height;
    let left = page.left - container.left + (highlight.left / 100.0) * page.width;
    let width = (highlight.width / 100.0) * page.width;
    let height = (highlight.height / 100.0) * page.height;

    Some(PixelRect {
        top,
        left,
        width,
        height,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..4000.0
    }

    fn offset() -> impl Strategy<Value = f64> {
        -5000.0f64..5000.0
    }

    fn percent() -> impl Strategy<Value = f64> {
        0.0f64..=100.0
    }

    proptest! {
        /// Property: the overlay never leaves the page it was computed against
        #[test]
        fn overlay_stays_within_page(
            page_top in offset(),
            page_left in offset(),
            page_w in dimension(),
            page_h in dimension(),
            container_top in offset(),
            container_left in offset(),
            top in percent(),
            left in percent(),
        ) {
            let page = BoundingBox::new(page_top, page_left, page_w, page_h);
            let container = BoundingBox::new(container_top, container_left, 100.0, 100.0);
            let highlight = PercentRect::new(top, left, 100.0 - left, 100.0 - top);

            let rect = overlay_rect(page, container, highlight).unwrap();
            let page_top_rel = page_top - container_top;
            let page_left_rel = page_left - container_left;
            let tolerance = 1e-6;

            prop_assert!(rect.top >= page_top_rel - tolerance);
            prop_assert!(rect.left >= page_left_rel - tolerance);
            prop_assert!(rect.top + rect.height <= page_top_rel + page_h + tolerance);
            prop_assert!(rect.left + rect.width <= page_left_rel + page_w + tolerance);
        }

        /// Property: scrolling moves page and overlay together, size unchanged
        #[test]
        fn scroll_translates_without_resizing(
            page_w in dimension(),
            page_h in dimension(),
            scroll in offset(),
            top in percent(),
            height in percent(),
        ) {
            let container = BoundingBox::new(0.0, 0.0, 1000.0, 1000.0);
            let highlight = PercentRect::new(top, 0.0, 50.0, height);

            let before = overlay_rect(BoundingBox::new(0.0, 0.0, page_w, page_h), container, highlight);
            let after = overlay_rect(BoundingBox::new(scroll, 0.0, page_w, page_h), container, highlight);

            let (before, after) = (before.unwrap(), after.unwrap());
            prop_assert!((after.top - before.top - scroll).abs() < 1e-6);
            prop_assert_eq!(after.width, before.width);
            prop_assert_eq!(after.height, before.height);
        }
    }
}
