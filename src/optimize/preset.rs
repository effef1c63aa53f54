//! The default cleanup preset.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::svg::{Document, Element, Node, format_number, parse_length};

use super::{CleanupIds, InlineStyles, MergePaths};

/// Namespaces written by editors that carry nothing renderable.
const EDITOR_NAMESPACES: &[&str] = &[
    "http://creativecommons.org/ns#",
    "http://inkscape.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/",
    "http://ns.adobe.com/Extensibility/1.0/",
    "http://ns.adobe.com/Flows/1.0/",
    "http://ns.adobe.com/GenericCustomNamespace/1.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://ns.adobe.com/ImageReplacement/1.0/",
    "http://ns.adobe.com/SaveForWeb/1.0/",
    "http://ns.adobe.com/Variables/1.0/",
    "http://ns.adobe.com/XPath/1.0/",
    "http://purl.org/dc/elements/1.1/",
    "http://schemas.microsoft.com/visio/2003/SVGExtensions/",
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://taptrix.com/vectorillustrator/svg_extensions",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://www.figma.com/figma/ns",
    "http://www.inkscape.org/namespaces/inkscape",
    "http://www.serif.com/",
    "http://www.vector.evaxdesign.sk",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
];

const CONTAINERS: &[&str] = &[
    "a",
    "defs",
    "foreignObject",
    "g",
    "glyph",
    "marker",
    "mask",
    "missing-glyph",
    "pattern",
    "svg",
    "switch",
    "symbol",
];

/// Attributes holding a single color value.
const COLOR_ATTRS: &[&str] = &[
    "color",
    "fill",
    "flood-color",
    "lighting-color",
    "stop-color",
    "stroke",
];

/// Hex values that have a shorter color keyword.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("#f0ffff", "azure"),
    ("#f5f5dc", "beige"),
    ("#ffe4c4", "bisque"),
    ("#a52a2a", "brown"),
    ("#ff7f50", "coral"),
    ("#ffd700", "gold"),
    ("#808080", "gray"),
    ("#008000", "green"),
    ("#4b0082", "indigo"),
    ("#fffff0", "ivory"),
    ("#f0e68c", "khaki"),
    ("#faf0e6", "linen"),
    ("#800000", "maroon"),
    ("#000080", "navy"),
    ("#808000", "olive"),
    ("#ffa500", "orange"),
    ("#da70d6", "orchid"),
    ("#cd853f", "peru"),
    ("#ffc0cb", "pink"),
    ("#dda0dd", "plum"),
    ("#800080", "purple"),
    ("#f00", "red"),
    ("#fa8072", "salmon"),
    ("#a0522d", "sienna"),
    ("#c0c0c0", "silver"),
    ("#fffafa", "snow"),
    ("#d2b48c", "tan"),
    ("#008080", "teal"),
    ("#ff6347", "tomato"),
    ("#ee82ee", "violet"),
    ("#f5deb3", "wheat"),
];

/// Digits kept after the decimal point by numeric cleanup.
const FLOAT_PRECISION: i32 = 3;

static NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)(px|pt|pc|mm|cm|m|in|ft|em|ex|%)?$")
        .expect("Error compiling numeric value pattern")
});

/// Conditional processing attributes are meaningful even when empty.
const CONDITIONAL_ATTRS: &[&str] = &["requiredExtensions", "requiredFeatures", "systemLanguage"];

/// A sub-step of the default preset. Each can be disabled by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetStep {
    RemoveDoctype,
    RemoveXmlProcInst,
    RemoveComments,
    RemoveMetadata,
    RemoveEditorsNsData,
    CleanupAttrs,
    MergeStyles,
    InlineStyles,
    CleanupIds,
    RemoveUselessDefs,
    CleanupNumericValues,
    ConvertColors,
    RemoveViewBox,
    RemoveHiddenElems,
    RemoveEmptyText,
    CollapseGroups,
    RemoveEmptyAttrs,
    RemoveEmptyContainers,
    MergePaths,
    RemoveUnusedNs,
    RemoveTitle,
    RemoveDesc,
}

impl PresetStep {
    /// Preset order.
    pub const ALL: [PresetStep; 22] = [
        PresetStep::RemoveDoctype,
        PresetStep::RemoveXmlProcInst,
        PresetStep::RemoveComments,
        PresetStep::RemoveMetadata,
        PresetStep::RemoveEditorsNsData,
        PresetStep::CleanupAttrs,
        PresetStep::MergeStyles,
        PresetStep::InlineStyles,
        PresetStep::CleanupIds,
        PresetStep::RemoveUselessDefs,
        PresetStep::CleanupNumericValues,
        PresetStep::ConvertColors,
        PresetStep::RemoveViewBox,
        PresetStep::RemoveHiddenElems,
        PresetStep::RemoveEmptyText,
        PresetStep::CollapseGroups,
        PresetStep::RemoveEmptyAttrs,
        PresetStep::RemoveEmptyContainers,
        PresetStep::MergePaths,
        PresetStep::RemoveUnusedNs,
        PresetStep::RemoveTitle,
        PresetStep::RemoveDesc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PresetStep::RemoveDoctype => "removeDoctype",
            PresetStep::RemoveXmlProcInst => "removeXMLProcInst",
            PresetStep::RemoveComments => "removeComments",
            PresetStep::RemoveMetadata => "removeMetadata",
            PresetStep::RemoveEditorsNsData => "removeEditorsNSData",
            PresetStep::CleanupAttrs => "cleanupAttrs",
            PresetStep::MergeStyles => "mergeStyles",
            PresetStep::InlineStyles => "inlineStyles",
            PresetStep::CleanupIds => "cleanupIds",
            PresetStep::RemoveUselessDefs => "removeUselessDefs",
            PresetStep::CleanupNumericValues => "cleanupNumericValues",
            PresetStep::ConvertColors => "convertColors",
            PresetStep::RemoveViewBox => "removeViewBox",
            PresetStep::RemoveHiddenElems => "removeHiddenElems",
            PresetStep::RemoveEmptyText => "removeEmptyText",
            PresetStep::CollapseGroups => "collapseGroups",
            PresetStep::RemoveEmptyAttrs => "removeEmptyAttrs",
            PresetStep::RemoveEmptyContainers => "removeEmptyContainers",
            PresetStep::MergePaths => "mergePaths",
            PresetStep::RemoveUnusedNs => "removeUnusedNS",
            PresetStep::RemoveTitle => "removeTitle",
            PresetStep::RemoveDesc => "removeDesc",
        }
    }

    pub fn apply(self, doc: &mut Document) {
        match self {
            PresetStep::RemoveDoctype => doc.nodes.retain(|n| !matches!(n, Node::Doctype(_))),
            PresetStep::RemoveXmlProcInst => doc.nodes.retain(|n| match n {
                Node::Declaration(_) => false,
                Node::Instruction(text) => !text.starts_with("xml "),
                _ => true,
            }),
            PresetStep::RemoveComments => remove_comments(doc),
            PresetStep::RemoveMetadata => remove_elements(doc, |e| e.is("metadata")),
            PresetStep::RemoveEditorsNsData => remove_editors_ns_data(doc),
            PresetStep::CleanupAttrs => cleanup_attrs(doc),
            PresetStep::MergeStyles => merge_styles(doc),
            PresetStep::InlineStyles => InlineStyles::default().apply(doc),
            PresetStep::CleanupIds => CleanupIds::default().apply(doc),
            PresetStep::RemoveUselessDefs => remove_useless_defs(doc),
            PresetStep::CleanupNumericValues => cleanup_numeric_values(doc),
            PresetStep::ConvertColors => convert_colors(doc),
            PresetStep::RemoveViewBox => remove_viewbox(doc),
            PresetStep::RemoveHiddenElems => remove_elements(doc, is_hidden),
            PresetStep::RemoveEmptyText => remove_elements(doc, |e| match e.name.as_str() {
                "text" | "tspan" => e.children.is_empty(),
                "tref" => !e.has_attr("xlink:href") && !e.has_attr("href"),
                _ => false,
            }),
            PresetStep::CollapseGroups => collapse_groups(doc.root_mut()),
            PresetStep::RemoveEmptyAttrs => doc.visit_mut(&mut |e| {
                e.attributes.retain(|attr| {
                    !attr.value.is_empty() || CONDITIONAL_ATTRS.contains(&attr.name.as_str())
                })
            }),
            PresetStep::RemoveEmptyContainers => remove_elements(doc, is_empty_container),
            PresetStep::MergePaths => MergePaths::default().apply(doc),
            PresetStep::RemoveUnusedNs => remove_unused_ns(doc),
            PresetStep::RemoveTitle => remove_elements(doc, |e| e.is("title")),
            PresetStep::RemoveDesc => remove_elements(doc, |e| {
                e.is("desc") && {
                    let text = e.text();
                    let text = text.trim();
                    text.is_empty()
                        || text.starts_with("Created with")
                        || text.starts_with("Created using")
                }
            }),
        }
    }
}

/// The default preset, with some sub-steps optionally disabled.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    disabled: HashSet<PresetStep>,
}

impl Preset {
    pub fn disable(mut self, step: PresetStep) -> Self {
        self.disabled.insert(step);
        self
    }

    pub fn is_enabled(&self, step: PresetStep) -> bool {
        !self.disabled.contains(&step)
    }

    pub fn apply(&self, doc: &mut Document) {
        for step in PresetStep::ALL {
            if self.is_enabled(step) {
                step.apply(doc);
                tracing::trace!(step = step.name(), "applied preset step");
            }
        }
    }
}

/// Removes matching descendants of the root, bottom-up.
fn remove_elements(doc: &mut Document, mut remove: impl FnMut(&Element) -> bool) {
    doc.root_mut().retain_deep(&mut |node| match node {
        Node::Element(element) => !remove(element),
        _ => true,
    });
}

fn remove_comments(doc: &mut Document) {
    // `<!--! ... -->` marks a comment that must survive, e.g. a license
    let keep = |node: &Node| match node {
        Node::Comment(text) => text.starts_with('!'),
        _ => true,
    };
    doc.nodes.retain(keep);
    doc.root_mut().retain_deep(&mut |node| keep(node));
}

fn remove_editors_ns_data(doc: &mut Document) {
    let root = doc.root_mut();
    let prefixes: Vec<String> = root
        .attributes
        .iter()
        .filter(|attr| EDITOR_NAMESPACES.contains(&attr.value.as_str()))
        .filter_map(|attr| attr.name.strip_prefix("xmlns:"))
        .map(|prefix| format!("{prefix}:"))
        .collect();

    if prefixes.is_empty() {
        return;
    }

    let in_editor_ns = |name: &str| {
        prefixes.iter().any(|p| name.starts_with(p.as_str()))
            || name
                .strip_prefix("xmlns:")
                .is_some_and(|n| prefixes.iter().any(|p| p.trim_end_matches(':') == n))
    };

    root.retain_deep(&mut |node| match node {
        Node::Element(element) => !in_editor_ns(&element.name),
        _ => true,
    });
    root.visit_mut(&mut |element| element.attributes.retain(|attr| !in_editor_ns(&attr.name)));
}

fn cleanup_attrs(doc: &mut Document) {
    doc.visit_mut(&mut |element| {
        for attr in &mut element.attributes {
            if attr.value.contains(['\n', '\r', '\t', ' ']) {
                attr.value = attr.value.split_whitespace().collect::<Vec<_>>().join(" ");
            }
        }
    });
}

fn merge_styles(doc: &mut Document) {
    let mut merged = String::new();
    let mut first = None;
    let mut count = 0;
    doc.visit(&mut |element| {
        if is_mergeable_style(element) {
            merged.push_str(element.text().trim());
            first.get_or_insert_with(|| element.attributes.clone());
            count += 1;
        }
    });

    if count < 2 {
        return;
    }

    let root = doc.root_mut();
    root.retain_deep(&mut |node| !matches!(node, Node::Element(e) if is_mergeable_style(e)));

    let mut style = Element::new("style");
    style.attributes = first.unwrap_or_default();
    style.children.push(Node::Text(merged));
    root.children.insert(0, Node::Element(style));
}

fn is_mergeable_style(element: &Element) -> bool {
    element.is("style") && !element.has_attr("media")
}

fn remove_useless_defs(doc: &mut Document) {
    doc.visit_mut(&mut |element| {
        if element.is("defs") {
            let children = std::mem::take(&mut element.children);
            for node in children {
                collect_useful_defs(node, &mut element.children);
            }
        }
    });
}

/// Keeps elements that can be referenced. Anything else is dropped, but its
/// referenceable descendants are hoisted in document order.
fn collect_useful_defs(node: Node, acc: &mut Vec<Node>) {
    let Node::Element(element) = node else {
        return;
    };

    if element.has_attr("id") || element.is("style") {
        acc.push(Node::Element(element));
        return;
    }

    for child in element.children {
        collect_useful_defs(child, acc);
    }
}

/// Rounds to [`FLOAT_PRECISION`] and drops the leading zero of fractions.
fn shorten_number(n: f64) -> String {
    let scale = 10f64.powi(FLOAT_PRECISION);
    let text = format_number((n * scale).round() / scale);

    if let Some(rest) = text.strip_prefix("0.") {
        format!(".{rest}")
    } else if let Some(rest) = text.strip_prefix("-0.") {
        format!("-.{rest}")
    } else {
        text
    }
}

fn px_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "cm" => Some(96.0 / 2.54),
        "mm" => Some(96.0 / 25.4),
        "in" => Some(96.0),
        "pt" => Some(4.0 / 3.0),
        "pc" => Some(16.0),
        _ => None,
    }
}

fn cleanup_numeric_values(doc: &mut Document) {
    doc.visit_mut(&mut |element| {
        for attr in &mut element.attributes {
            match attr.name.as_str() {
                "version" => {}
                "viewBox" => {
                    let values: Option<Vec<f64>> = attr
                        .value
                        .split([' ', ','])
                        .filter(|s| !s.is_empty())
                        .map(|s| s.parse().ok())
                        .collect();
                    if let Some(values) = values {
                        attr.value = values
                            .into_iter()
                            .map(shorten_number)
                            .collect::<Vec<_>>()
                            .join(" ");
                    }
                }
                _ => {
                    let Some(caps) = NUMERIC_VALUE.captures(attr.value.trim()) else {
                        continue;
                    };
                    let Ok(number) = caps[1].parse::<f64>() else {
                        continue;
                    };
                    let unit = caps.get(2).map_or("", |m| m.as_str());

                    let mut value = match unit {
                        "px" => shorten_number(number),
                        unit => format!("{}{unit}", shorten_number(number)),
                    };
                    if let Some(factor) = px_per_unit(unit) {
                        let px = shorten_number(number * factor);
                        if px.len() < value.len() {
                            value = px;
                        }
                    }
                    attr.value = value;
                }
            }
        }
    });
}

/// Rewrites plain colors to their shortest hex or keyword form.
fn convert_colors(doc: &mut Document) {
    doc.visit_mut(&mut |element| {
        for attr in &mut element.attributes {
            if COLOR_ATTRS.contains(&attr.name.as_str())
                && let Some(color) = shortest_color(&attr.value)
            {
                attr.value = color;
            }
        }
    });
}

fn shortest_color(value: &str) -> Option<String> {
    let value = value.trim();
    // keywords that parse as colors but mean something else here
    if value.eq_ignore_ascii_case("transparent") || value.eq_ignore_ascii_case("currentColor") {
        return None;
    }

    let color = svgtypes::Color::from_str(value).ok()?;
    if color.alpha != u8::MAX {
        return None;
    }

    let hex = format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue);
    let bytes = hex.as_bytes();
    let hex = if bytes[1] == bytes[2] && bytes[3] == bytes[4] && bytes[5] == bytes[6] {
        format!("#{}{}{}", &hex[1..2], &hex[3..4], &hex[5..6])
    } else {
        hex
    };

    let short = SHORT_NAMES
        .iter()
        .find(|(h, _)| *h == hex)
        .map_or(hex, |(_, name)| name.to_string());

    (short != value).then_some(short)
}

fn remove_viewbox(doc: &mut Document) {
    let root = doc.root_mut();
    let (Some(width), Some(height), Some(viewbox)) = (
        root.attr("width").and_then(parse_length),
        root.attr("height").and_then(parse_length),
        root.attr("viewBox"),
    ) else {
        return;
    };

    let values: Vec<f64> = viewbox
        .split([' ', ','])
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if values == [0.0, 0.0, width, height] {
        root.remove_attr("viewBox");
    }
}

fn is_hidden(element: &Element) -> bool {
    // referenced content may be hidden on purpose
    if element.has_attr("id") {
        return false;
    }

    let zero = |name: &str| element.attr(name).and_then(parse_length) == Some(0.0);

    element.attr("display") == Some("none")
        || zero("opacity")
        || match element.name.as_str() {
            "circle" => zero("r"),
            "ellipse" => zero("rx") || zero("ry"),
            "rect" => zero("width") || zero("height"),
            "path" => element.attr("d").is_none_or(|d| d.trim().is_empty()),
            "polyline" | "polygon" => element.attr("points").is_none_or(|p| p.trim().is_empty()),
            _ => false,
        }
}

fn is_empty_container(element: &Element) -> bool {
    CONTAINERS.contains(&element.name.as_str())
        && element.children.is_empty()
        && !(element.is("pattern") && !element.attributes.is_empty())
        && !(element.is("mask") && element.has_attr("id"))
        && !(element.is("g") && element.has_attr("filter"))
}

/// Replaces attribute-less groups with their children.
fn collapse_groups(element: &mut Element) {
    for child in element.elements_mut() {
        collapse_groups(child);
    }

    if !element.children.iter().any(is_bare_group) {
        return;
    }

    let children = std::mem::take(&mut element.children);
    for node in children {
        match node {
            Node::Element(group) if group.is("g") && group.attributes.is_empty() => {
                element.children.extend(group.children)
            }
            other => element.children.push(other),
        }
    }
}

fn is_bare_group(node: &Node) -> bool {
    matches!(node, Node::Element(e) if e.is("g") && e.attributes.is_empty())
}

fn remove_unused_ns(doc: &mut Document) {
    let mut used = HashSet::new();
    doc.visit(&mut |element| {
        if let Some((prefix, _)) = element.name.split_once(':') {
            used.insert(prefix.to_string());
        }
        for attr in &element.attributes {
            if let Some((prefix, _)) = attr.name.split_once(':')
                && prefix != "xmlns"
            {
                used.insert(prefix.to_string());
            }
        }
    });

    doc.root_mut().attributes.retain(|attr| {
        attr.name
            .strip_prefix("xmlns:")
            .is_none_or(|prefix| used.contains(prefix))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(step: PresetStep, text: &str) -> String {
        let mut doc = Document::parse(text).unwrap();
        step.apply(&mut doc);
        doc.to_string()
    }

    #[test]
    fn test_prolog_steps() {
        let text = r#"<?xml version="1.0"?><!DOCTYPE svg><svg/>"#;
        assert_eq!(run(PresetStep::RemoveDoctype, text), r#"<?xml version="1.0"?><svg/>"#);
        assert_eq!(run(PresetStep::RemoveXmlProcInst, text), "<!DOCTYPE svg><svg/>");
    }

    #[test]
    fn test_remove_comments_keeps_bang() {
        let text = "<!-- a --><svg><!--! license --><!-- b --><g/></svg>";
        assert_eq!(
            run(PresetStep::RemoveComments, text),
            "<svg><!--! license --><g/></svg>"
        );
    }

    #[test]
    fn test_remove_editors_ns_data() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:sketch="http://www.bohemiancoding.com/sketch/ns"><sketch:thing/><g sketch:type="MSPage" id="a"/></svg>"#;
        assert_eq!(
            run(PresetStep::RemoveEditorsNsData, text),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#
        );
    }

    #[test]
    fn test_cleanup_attrs() {
        let text = "<svg><path d=\"M0 0\n   L1 1 \"/></svg>";
        assert_eq!(
            run(PresetStep::CleanupAttrs, text),
            r#"<svg><path d="M0 0 L1 1"/></svg>"#
        );
    }

    #[test]
    fn test_merge_styles() {
        let text = "<svg><style>.a{fill:red}</style><g/><style>.b{fill:blue}</style></svg>";
        assert_eq!(
            run(PresetStep::MergeStyles, text),
            "<svg><style>.a{fill:red}.b{fill:blue}</style><g/></svg>"
        );
    }

    #[test]
    fn test_remove_useless_defs() {
        let text = r#"<svg><defs><clipPath/><linearGradient id="g"/></defs></svg>"#;
        assert_eq!(
            run(PresetStep::RemoveUselessDefs, text),
            r#"<svg><defs><linearGradient id="g"/></defs></svg>"#
        );
    }

    #[test]
    fn test_remove_useless_defs_hoists_referenced() {
        let text = r##"<svg><defs><g><linearGradient id="a"><stop offset="0"/></linearGradient><g><clipPath id="c"/><rect/></g></g><style>.x{}</style></defs><rect fill="url(#a)"/></svg>"##;
        assert_eq!(
            run(PresetStep::RemoveUselessDefs, text),
            r##"<svg><defs><linearGradient id="a"><stop offset="0"/></linearGradient><clipPath id="c"/><style>.x{}</style></defs><rect fill="url(#a)"/></svg>"##
        );
    }

    #[test]
    fn test_preset_keeps_nested_gradient() {
        let text = r##"<svg width="4" height="4"><defs><g><linearGradient id="a"><stop offset="1" stop-color="#000"/></linearGradient></g></defs><rect width="4" height="4" fill="url(#a)"/></svg>"##;
        let mut doc = Document::parse(text).unwrap();
        Preset::default().apply(&mut doc);

        assert_eq!(doc.find_all("linearGradient").len(), 1);
        assert_eq!(doc.find_all("linearGradient")[0].attr("id"), Some("a"));
    }

    #[test]
    fn test_cleanup_numeric_values() {
        let text = r#"<svg version="1.10" width="32px" height="0.50" viewBox="0, 0, 32.00001, 16.5"><rect x="-0.25" y="1in" width="10pt" height="1.23456" rx="2em"/></svg>"#;
        assert_eq!(
            run(PresetStep::CleanupNumericValues, text),
            r#"<svg version="1.10" width="32" height=".5" viewBox="0 0 32 16.5"><rect x="-.25" y="96" width="10pt" height="1.235" rx="2em"/></svg>"#
        );
    }

    #[test]
    fn test_cleanup_numeric_values_leaves_other_values() {
        let text = r#"<svg><path d="M0.50 0.50h1" fill="url(#a)" id="0.50x"/></svg>"#;
        assert_eq!(run(PresetStep::CleanupNumericValues, text), text);
    }

    #[test]
    fn test_convert_colors() {
        let text = r##"<svg><rect fill="#FF0000" stroke="rgb(0, 0, 128)" stop-color="#AABBCC" color="white" flood-color="#123456"/><g fill="none" stroke="url(#a)"/><g fill="currentColor" stroke="transparent"/><g data-fill="#FFFFFF"/></svg>"##;
        assert_eq!(
            run(PresetStep::ConvertColors, text),
            r##"<svg><rect fill="red" stroke="navy" stop-color="#abc" color="#fff" flood-color="#123456"/><g fill="none" stroke="url(#a)"/><g fill="currentColor" stroke="transparent"/><g data-fill="#FFFFFF"/></svg>"##
        );
    }

    #[test]
    fn test_remove_viewbox_only_when_redundant() {
        let text = r#"<svg width="32px" height="32" viewBox="0 0 32 32"/>"#;
        assert_eq!(
            run(PresetStep::RemoveViewBox, text),
            r#"<svg width="32px" height="32"/>"#
        );

        let text = r#"<svg width="64" height="64" viewBox="0 0 32 32"/>"#;
        assert_eq!(run(PresetStep::RemoveViewBox, text), text);
    }

    #[test]
    fn test_remove_hidden_elems() {
        let text = r#"<svg><rect width="0" height="5"/><path d=""/><g display="none"/><g id="x" display="none"/><circle r="1"/></svg>"#;
        assert_eq!(
            run(PresetStep::RemoveHiddenElems, text),
            r#"<svg><g id="x" display="none"/><circle r="1"/></svg>"#
        );
    }

    #[test]
    fn test_collapse_groups() {
        let text = r#"<svg><g><g><rect/></g><circle/></g><g fill="red"><path/></g></svg>"#;
        assert_eq!(
            run(PresetStep::CollapseGroups, text),
            r#"<svg><rect/><circle/><g fill="red"><path/></g></svg>"#
        );
    }

    #[test]
    fn test_remove_empty_attrs() {
        let text = r#"<svg><g class="" systemLanguage="" fill="red"/></svg>"#;
        assert_eq!(
            run(PresetStep::RemoveEmptyAttrs, text),
            r#"<svg><g systemLanguage="" fill="red"/></svg>"#
        );
    }

    #[test]
    fn test_remove_empty_containers_cascades() {
        let text = r#"<svg><defs><g/></defs><g filter="url(#f)"/><mask id="m"/></svg>"#;
        assert_eq!(
            run(PresetStep::RemoveEmptyContainers, text),
            r#"<svg><g filter="url(#f)"/><mask id="m"/></svg>"#
        );
    }

    #[test]
    fn test_remove_unused_ns() {
        let text = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:a="urn:a"><use xlink:href="#x"/></svg>"##;
        assert_eq!(
            run(PresetStep::RemoveUnusedNs, text),
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#x"/></svg>"##
        );
    }

    #[test]
    fn test_title_and_desc() {
        let text = "<svg><title>t</title><desc>Created with Sketch.</desc><desc>kept</desc></svg>";
        assert_eq!(
            run(PresetStep::RemoveTitle, text),
            "<svg><desc>Created with Sketch.</desc><desc>kept</desc></svg>"
        );
        assert_eq!(
            run(PresetStep::RemoveDesc, text),
            "<svg><title>t</title><desc>kept</desc></svg>"
        );
    }

    #[test]
    fn test_disabled_steps_are_skipped() {
        let preset = Preset::default().disable(PresetStep::RemoveTitle);
        let mut doc = Document::parse("<svg><title>t</title><!-- c --></svg>").unwrap();
        preset.apply(&mut doc);

        assert!(!preset.is_enabled(PresetStep::RemoveTitle));
        assert_eq!(doc.to_string(), "<svg><title>t</title></svg>");
    }
}
