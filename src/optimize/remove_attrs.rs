use regex::Regex;

use crate::error::SvgError;
use crate::svg::Document;

#[derive(Debug, Clone)]
struct Pattern {
    element: Regex,
    attribute: Regex,
    value: Regex,
}

/// Removes attributes matched by `element<sep>attribute<sep>value` patterns.
///
/// A pattern without a separator matches the attribute on any element with
/// any value; with one separator it matches any value. Each part is a
/// regular expression anchored at both ends, and a lone `*` matches anything.
#[derive(Debug, Clone)]
pub struct RemoveAttrs {
    patterns: Vec<Pattern>,
    /// Keep `fill`/`stroke` set to `currentColor` even when matched.
    pub preserve_current_color: bool,
}

impl RemoveAttrs {
    pub fn new<I, S>(attrs: I, separator: char) -> Result<Self, SvgError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = attrs
            .into_iter()
            .map(|pattern| compile(pattern.as_ref(), separator))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            patterns,
            preserve_current_color: false,
        })
    }

    pub fn apply(&self, doc: &mut Document) {
        doc.visit_mut(&mut |element| {
            for pattern in &self.patterns {
                if !pattern.element.is_match(&element.name) {
                    continue;
                }

                element.attributes.retain(|attr| {
                    let matched = pattern.attribute.is_match(&attr.name)
                        && pattern.value.is_match(&attr.value);
                    let current_color = self.preserve_current_color
                        && matches!(attr.name.as_str(), "fill" | "stroke")
                        && attr.value.eq_ignore_ascii_case("currentColor");

                    !matched || current_color
                });
            }
        });
    }
}

fn compile(pattern: &str, separator: char) -> Result<Pattern, SvgError> {
    let parts: Vec<&str> = pattern.splitn(3, separator).collect();
    let (element, attribute, value) = match parts.as_slice() {
        [attribute] => (".*", *attribute, ".*"),
        [element, attribute] => (*element, *attribute, ".*"),
        [element, attribute, value] => (*element, *attribute, *value),
        _ => unreachable!("splitn yields at least one part"),
    };

    let anchored = |part: &str| {
        let part = if part == "*" { ".*" } else { part };
        Regex::new(&format!("^(?:{part})$"))
            .map_err(|err| SvgError::Pattern(pattern.to_string(), err))
    };

    Ok(Pattern {
        element: anchored(element)?,
        attribute: anchored(attribute)?,
        value: anchored(value)?,
    })
}
