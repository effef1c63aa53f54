use crate::svg::{Document, format_number, parse_length};

/// Declares a `viewBox` on the root element when it only has `width` and
/// `height`, so the icon scales instead of clipping.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddViewBox;

impl AddViewBox {
    pub fn apply(&self, doc: &mut Document) {
        let root = doc.root_mut();
        if root.has_attr("viewBox") {
            return;
        }

        let width = root.attr("width").and_then(parse_length);
        let height = root.attr("height").and_then(parse_length);

        if let (Some(width), Some(height)) = (width, height)
            && width > 0.0
            && height > 0.0
        {
            root.set_attr(
                "viewBox",
                format!("0 0 {} {}", format_number(width), format_number(height)),
            );
        }
    }
}
