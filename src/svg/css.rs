//! CSS from `style` attributes and `<style>` blocks, parsed with lightningcss.
//!
//! Only compound selectors made of a type, an id and classes are exposed as
//! structured rules. Everything else is kept as printed CSS and never inlined.

use std::collections::HashSet;
use std::fmt::{self, Display, Write};

use lightningcss::declaration::DeclarationBlock;
use lightningcss::rules::CssRule;
use lightningcss::selector::{Component, Selector as CssSelector};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

impl Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)?;
        if self.important {
            f.write_str("!important")?;
        }
        Ok(())
    }
}

/// `tag#id.class.class`, every part optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub specificity: u32,
}

impl Selector {
    /// `None` when the selector is more than a single compound.
    fn from_css(selector: &CssSelector<'_>) -> Option<Self> {
        let mut acc = Selector {
            specificity: selector.specificity(),
            ..Selector::default()
        };

        for component in selector.iter_raw_match_order() {
            match component {
                Component::LocalName(name) => acc.tag = Some(name.name.0.to_string()),
                Component::ID(id) if acc.id.is_none() => acc.id = Some(id.0.to_string()),
                Component::Class(class) => acc.classes.push(class.0.to_string()),
                Component::ExplicitUniversalType => {}
                _ => return None,
            }
        }

        Some(acc)
    }

    pub fn matches(&self, tag: &str, id: Option<&str>, class: Option<&str>) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if self.id.is_some() && self.id.as_deref() != id {
            return false;
        }
        let have: Vec<&str> = class.unwrap_or_default().split_ascii_whitespace().collect();
        self.classes.iter().all(|c| have.contains(&c.as_str()))
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.id.is_none() && self.classes.is_empty() => f.write_char('*')?,
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// A rule whose selector list was fully understood.
    Style {
        selectors: Vec<Selector>,
        declarations: Vec<Declaration>,
    },
    /// At-rules and rules with unsupported selectors, printed minified.
    Raw {
        css: String,
        /// Class names the rule's selectors mention.
        classes: HashSet<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Returns `None` when the text isn't a stylesheet lightningcss accepts.
    pub fn parse(text: &str) -> Option<Self> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };
        let sheet = StyleSheet::parse(text, options).ok()?;

        let mut rules = Vec::new();
        for rule in &sheet.rules.0 {
            if let Some(rule) = convert_rule(rule)? {
                rules.push(rule);
            }
        }

        Some(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            match rule {
                Rule::Style {
                    selectors,
                    declarations,
                } => {
                    for (i, selector) in selectors.iter().enumerate() {
                        if i > 0 {
                            f.write_char(',')?;
                        }
                        write!(f, "{selector}")?;
                    }
                    f.write_char('{')?;
                    f.write_str(&format_declarations(declarations))?;
                    f.write_char('}')?;
                }
                Rule::Raw { css, .. } => f.write_str(css)?,
            }
        }
        Ok(())
    }
}

/// `Some(None)` for rules that print to nothing.
fn convert_rule(rule: &CssRule<'_>) -> Option<Option<Rule>> {
    if let CssRule::Style(style) = rule
        && style.rules.0.is_empty()
        && let Some(selectors) = style
            .selectors
            .0
            .iter()
            .map(Selector::from_css)
            .collect::<Option<Vec<_>>>()
    {
        return Some(Some(Rule::Style {
            selectors,
            declarations: declarations_of(&style.declarations)?,
        }));
    }

    let css = rule
        .to_css_string(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    if css.trim().is_empty() {
        return Some(None);
    }

    let mut classes = HashSet::new();
    walk_selectors(std::slice::from_ref(rule), &mut |component| {
        if let Component::Class(class) = component {
            classes.insert(class.0.to_string());
        }
    });

    Some(Some(Rule::Raw { css, classes }))
}

/// Visits the top-level components of every selector, descending into
/// nested style, media and supports rules.
fn walk_selectors(rules: &[CssRule<'_>], f: &mut impl FnMut(&Component<'_>)) {
    for rule in rules {
        match rule {
            CssRule::Style(style) => {
                for selector in style.selectors.0.iter() {
                    selector.iter_raw_match_order().for_each(&mut *f);
                }
                walk_selectors(&style.rules.0, f);
            }
            CssRule::Media(media) => walk_selectors(&media.rules.0, f),
            CssRule::Supports(supports) => walk_selectors(&supports.rules.0, f),
            _ => {}
        }
    }
}

/// Ids used by the selectors of a stylesheet.
pub fn selector_ids(text: &str) -> Option<HashSet<String>> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let sheet = StyleSheet::parse(text, options).ok()?;

    let mut acc = HashSet::new();
    walk_selectors(&sheet.rules.0, &mut |component| {
        if let Component::ID(id) = component {
            acc.insert(id.0.to_string());
        }
    });
    Some(acc)
}

fn declarations_of(block: &DeclarationBlock<'_>) -> Option<Vec<Declaration>> {
    let normal = block.declarations.iter().map(|property| (property, false));
    let important = block.important_declarations.iter().map(|property| (property, true));

    normal
        .chain(important)
        .map(|(property, important)| {
            Some(Declaration {
                name: property.property_id().name().to_string(),
                value: property
                    .value_to_css_string(PrinterOptions::default())
                    .ok()?,
                important,
            })
        })
        .collect()
}

/// Parses the body of a `style` attribute. Normal declarations come first,
/// then `!important` ones, each in source order.
pub fn parse_declarations(text: &str) -> Option<Vec<Declaration>> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let attribute = StyleAttribute::parse(text, options).ok()?;
    declarations_of(&attribute.declarations)
}

pub fn format_declarations(declarations: &[Declaration]) -> String {
    let mut acc = String::new();
    for (i, declaration) in declarations.iter().enumerate() {
        if i > 0 {
            acc.push(';');
        }
        let _ = write!(acc, "{declaration}");
    }
    acc
}
