//! A small owned SVG tree.
//!
//! The optimizer steps operate on this representation. It keeps qualified
//! names as plain strings (`xlink:href`, `xml:space`) and preserves attribute
//! order, which is enough to rewrite documents without a namespace-aware DOM.

pub mod css;
pub mod path;

use std::collections::HashMap;
use std::fmt::{self, Display, Write};
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use crate::error::SvgError;

/// Attributes that may also be expressed as CSS properties.
pub const PRESENTATION_ATTRS: &[&str] = &[
    "alignment-baseline",
    "baseline-shift",
    "clip",
    "clip-path",
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "cursor",
    "direction",
    "display",
    "dominant-baseline",
    "enable-background",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flood-color",
    "flood-opacity",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "glyph-orientation-horizontal",
    "glyph-orientation-vertical",
    "image-rendering",
    "letter-spacing",
    "lighting-color",
    "marker-end",
    "marker-mid",
    "marker-start",
    "mask",
    "opacity",
    "overflow",
    "paint-order",
    "pointer-events",
    "shape-rendering",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "text-decoration",
    "text-overflow",
    "text-rendering",
    "transform",
    "transform-origin",
    "unicode-bidi",
    "vector-effect",
    "visibility",
    "word-spacing",
    "writing-mode",
];

/// General entity declarations of an internal DTD subset.
static ENTITY_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%"'>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
        .expect("Error compiling entity pattern")
});

/// Elements whose whitespace-only text is significant.
const TEXT_CONTENT: &[&str] = &["text", "tspan", "textPath", "title", "desc", "style", "script"];

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    Doctype(String),
    /// `<?xml ... ?>` declaration, stored without the delimiters.
    Declaration(String),
    /// Any other processing instruction, stored without the delimiters.
    Instruction(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// Sets an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text(&self) -> String {
        let mut acc = String::new();
        for child in &self.children {
            match child {
                Node::Text(text) | Node::CData(text) => acc.push_str(text),
                _ => {}
            }
        }
        acc
    }

    /// Visits this element and every descendant element in document order.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for child in self.elements() {
            child.visit(f);
        }
    }

    /// Mutable pre-order visit, same order as [`Element::visit`].
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    /// Removes descendant nodes for which `keep` returns false. Children are
    /// filtered before their parent is inspected, so a container emptied by
    /// the filter can be removed in the same pass.
    pub fn retain_deep(&mut self, keep: &mut impl FnMut(&Node) -> bool) {
        for child in self.elements_mut() {
            child.retain_deep(keep);
        }
        self.children.retain(|node| keep(node));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Top-level nodes, exactly one of which is the root element.
    pub(crate) nodes: Vec<Node>,
}

impl Document {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn parse(text: &str) -> Result<Self, SvgError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut entities = Entities::default();

        loop {
            let node = match reader.read_event()? {
                Event::Start(e) => {
                    stack.push(element_from(&e, reader.decoder(), &entities)?);
                    continue;
                }
                Event::End(_) => Node::Element(stack.pop().ok_or(SvgError::Unbalanced)?),
                Event::Empty(e) => Node::Element(element_from(&e, reader.decoder(), &entities)?),
                Event::Text(e) => {
                    let text = e.unescape_with(|name| entities.resolve(name))?;
                    let significant = stack
                        .last()
                        .is_some_and(|parent| TEXT_CONTENT.contains(&parent.name.as_str()));

                    if text.trim().is_empty() && !significant {
                        continue;
                    }
                    Node::Text(text.into_owned())
                }
                Event::CData(e) => Node::CData(std::str::from_utf8(&e)?.to_string()),
                Event::Comment(e) => Node::Comment(std::str::from_utf8(&e)?.to_string()),
                Event::DocType(e) => {
                    let doctype = std::str::from_utf8(&e)?.trim();
                    entities = Entities::declared_in(doctype);
                    Node::Doctype(doctype.to_string())
                }
                Event::Decl(e) => Node::Declaration(std::str::from_utf8(&e)?.to_string()),
                Event::PI(e) => Node::Instruction(std::str::from_utf8(&e)?.to_string()),
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(SvgError::Unclosed(open.name));
        }

        match nodes.iter().filter(|node| node.as_element().is_some()).count() {
            0 => Err(SvgError::NoRoot),
            1 => Ok(Self { nodes }),
            _ => Err(SvgError::MultipleRoots),
        }
    }

    pub fn root(&self) -> &Element {
        self.nodes
            .iter()
            .find_map(Node::as_element)
            .expect("document invariant: exactly one root element")
    }

    pub fn root_mut(&mut self) -> &mut Element {
        self.nodes
            .iter_mut()
            .find_map(Node::as_element_mut)
            .expect("document invariant: exactly one root element")
    }

    /// Visits every element in document order.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        self.root().visit(f);
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        self.root_mut().visit_mut(f);
    }

    /// Elements matching `name` anywhere in the document.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut acc = Vec::new();
        self.visit(&mut |element| {
            if element.is(name) {
                acc.push(element);
            }
        });
        acc
    }
}

/// Entities usable in the document: the predefined XML ones plus those
/// declared in the doctype.
#[derive(Debug, Default)]
struct Entities(HashMap<String, String>);

impl Entities {
    fn declared_in(doctype: &str) -> Self {
        let declared = ENTITY_DECL
            .captures_iter(doctype)
            .filter_map(|caps| {
                let value = caps.get(2).or_else(|| caps.get(3))?;
                Some((caps[1].to_string(), value.as_str().to_string()))
            })
            .collect();
        Self(declared)
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        resolve_predefined_entity(name).or_else(|| self.0.get(name).map(String::as_str))
    }
}

fn element_from(
    start: &BytesStart,
    decoder: Decoder,
    entities: &Entities,
) -> Result<Element, SvgError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr?;
        let name = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.decode_and_unescape_value_with(decoder, |name| entities.resolve(name))?;
        element.set_attr(name, value.into_owned());
    }

    Ok(element)
}

impl Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write_node(f, node)?;
        }
        Ok(())
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, self)
    }
}

fn write_node(f: &mut impl Write, node: &Node) -> fmt::Result {
    match node {
        Node::Element(element) => write_element(f, element),
        Node::Text(text) => write_escaped(f, text, false),
        Node::CData(text) => write!(f, "<![CDATA[{text}]]>"),
        Node::Comment(text) => write!(f, "<!--{text}-->"),
        Node::Doctype(text) => write!(f, "<!DOCTYPE {text}>"),
        Node::Declaration(text) | Node::Instruction(text) => write!(f, "<?{text}?>"),
    }
}

fn write_element(f: &mut impl Write, element: &Element) -> fmt::Result {
    write!(f, "<{}", element.name)?;

    for attr in &element.attributes {
        write!(f, " {}=\"", attr.name)?;
        write_escaped(f, &attr.value, true)?;
        f.write_char('"')?;
    }

    if element.children.is_empty() {
        return f.write_str("/>");
    }

    f.write_char('>')?;
    for child in &element.children {
        write_node(f, child)?;
    }
    write!(f, "</{}>", element.name)
}

fn write_escaped(f: &mut impl Write, text: &str, attribute: bool) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' if !attribute => f.write_str("&gt;")?,
            '"' if attribute => f.write_str("&quot;")?,
            _ => f.write_char(ch)?,
        }
    }
    Ok(())
}

/// Parses a plain number with an optional `px` suffix.
pub(crate) fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Formats a number the shortest way SVG accepts it.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_keeps_structure() {
        let text = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32"><g><path d="M0 0h1"/></g></svg>"#;
        let doc = Document::parse(text).unwrap();

        assert_eq!(doc.to_string(), text);
        assert_eq!(doc.root().attr("width"), Some("32"));
    }

    #[test]
    fn test_drops_insignificant_whitespace() {
        let text = "<svg>\n  <g>\n    <rect/>\n  </g>\n  <text> a </text>\n</svg>";
        let doc = Document::parse(text).unwrap();

        assert_eq!(doc.to_string(), "<svg><g><rect/></g><text> a </text></svg>");
    }

    #[test]
    fn test_prolog_nodes() {
        let text = r#"<?xml version="1.0"?><!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "x"><!-- hi --><svg/>"#;
        let doc = Document::parse(text).unwrap();

        assert!(matches!(doc.nodes[0], Node::Declaration(_)));
        assert!(matches!(doc.nodes[1], Node::Doctype(_)));
        assert_eq!(doc.nodes[2], Node::Comment(" hi ".into()));
        assert_eq!(doc.to_string(), text);
    }

    #[test]
    fn test_escaping() {
        let text = r#"<svg data-x="a &quot;b&quot; &amp; c"><text>1 &lt; 2</text></svg>"#;
        let doc = Document::parse(text).unwrap();

        assert_eq!(doc.root().attr("data-x"), Some(r#"a "b" & c"#));
        assert_eq!(doc.to_string(), text);
    }

    #[test]
    fn test_resolves_declared_entities() {
        let text = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- Generator: Adobe Illustrator 15.0.0, SVG Export Plug-In  -->
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd" [
	<!ENTITY ns_extend "http://ns.adobe.com/Extensibility/1.0/">
	<!ENTITY ns_ai 'http://ns.adobe.com/AdobeIllustrator/10.0/'>
]>
<svg xmlns:x="&ns_extend;" xmlns:i="&ns_ai;" data-x="a &amp; b"><text>&ns_ai;</text></svg>"#;
        let doc = Document::parse(text).unwrap();
        let root = doc.root();

        assert_eq!(
            root.attr("xmlns:x"),
            Some("http://ns.adobe.com/Extensibility/1.0/")
        );
        assert_eq!(
            root.attr("xmlns:i"),
            Some("http://ns.adobe.com/AdobeIllustrator/10.0/")
        );
        assert_eq!(root.attr("data-x"), Some("a & b"));
        assert_eq!(doc.find_all("text")[0].text(), "http://ns.adobe.com/AdobeIllustrator/10.0/");
    }

    #[test]
    fn test_undeclared_entity_fails() {
        assert!(matches!(
            Document::parse(r#"<svg xmlns:x="&ns_extend;"/>"#),
            Err(SvgError::Xml(_))
        ));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(Document::parse("<svg><g></svg>").is_err());
        assert!(matches!(
            Document::parse("<svg><g>"),
            Err(SvgError::Unclosed(_))
        ));
        assert!(matches!(Document::parse("<!-- x -->"), Err(SvgError::NoRoot)));
        assert!(matches!(
            Document::parse("<svg/><svg/>"),
            Err(SvgError::MultipleRoots)
        ));
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut element = Element::new("rect");
        element.set_attr("x", "1");
        element.set_attr("y", "2");
        element.set_attr("x", "3");

        assert_eq!(element.to_string(), r#"<rect x="3" y="2"/>"#);
        assert_eq!(element.remove_attr("x"), Some("3".into()));
        assert!(!element.has_attr("x"));
    }

    #[test]
    fn test_retain_deep_is_bottom_up() {
        let mut doc = Document::parse("<svg><g><title>x</title></g><rect/></svg>").unwrap();
        doc.root_mut().retain_deep(&mut |node| match node {
            Node::Element(e) if e.is("title") => false,
            Node::Element(e) if e.is("g") => !e.children.is_empty(),
            _ => true,
        });

        assert_eq!(doc.to_string(), "<svg><rect/></svg>");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_length("32px"), Some(32.0));
        assert_eq!(parse_length(" 1.5 "), Some(1.5));
        assert_eq!(parse_length("100%"), None);
        assert_eq!(format_number(32.0), "32");
        assert_eq!(format_number(0.5), "0.5");
    }
}
