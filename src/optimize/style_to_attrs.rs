use crate::svg::css::{format_declarations, parse_declarations};
use crate::svg::{Document, PRESENTATION_ATTRS};

/// Moves `style` declarations that have a presentation attribute
/// equivalent onto the element itself.
#[derive(Debug, Clone, Default)]
pub struct ConvertStyleToAttrs {
    /// Leave `!important` declarations in the `style` attribute.
    pub keep_important: bool,
}

impl ConvertStyleToAttrs {
    pub fn apply(&self, doc: &mut Document) {
        doc.visit_mut(&mut |element| {
            let Some(declarations) = element.attr("style").and_then(parse_declarations) else {
                return;
            };

            let (convert, keep): (Vec<_>, Vec<_>) =
                declarations.into_iter().partition(|decl| {
                    PRESENTATION_ATTRS.contains(&decl.name.as_str())
                        && !(self.keep_important && decl.important)
                        && !decl.value.contains("url(\"")
                        && !decl.value.contains("url('")
                });

            if convert.is_empty() {
                return;
            }

            for decl in convert {
                element.set_attr(&decl.name, decl.value);
            }

            if keep.is_empty() {
                element.remove_attr("style");
            } else {
                element.set_attr("style", format_declarations(&keep));
            }
        });
    }
}
