use std::collections::{HashMap, HashSet};

use crate::svg::css::{Declaration, Rule, Stylesheet, format_declarations, parse_declarations};
use crate::svg::{Document, Element, Node};

/// Moves rules from `<style>` blocks into the `style` attribute of the
/// elements they select.
#[derive(Debug, Clone, Copy)]
pub struct InlineStyles {
    /// Only inline selectors matching exactly one element.
    pub only_matched_once: bool,
}

impl Default for InlineStyles {
    fn default() -> Self {
        Self {
            only_matched_once: true,
        }
    }
}

struct Target {
    tag: String,
    id: Option<String>,
    class: Option<String>,
}

struct Match {
    specificity: u32,
    order: usize,
    declarations: Vec<Declaration>,
}

impl InlineStyles {
    pub fn apply(&self, doc: &mut Document) {
        // elements are addressed by their pre-order position, which both
        // visits below share
        let mut targets = Vec::new();
        let mut sheets: HashMap<usize, Stylesheet> = HashMap::new();
        let mut unreadable = false;

        doc.visit(&mut |element| {
            if is_css(element) {
                match Stylesheet::parse(&element.text()) {
                    Some(sheet) => {
                        sheets.insert(targets.len(), sheet);
                    }
                    None => unreadable = true,
                }
            }
            targets.push(Target {
                tag: element.name.clone(),
                id: element.attr("id").map(str::to_string),
                class: element.attr("class").map(str::to_string),
            });
        });

        if sheets.is_empty() || unreadable {
            return;
        }

        let mut matches: HashMap<usize, Vec<Match>> = HashMap::new();
        let mut order = 0;

        let mut sheet_order: Vec<usize> = sheets.keys().copied().collect();
        sheet_order.sort_unstable();

        for index in &sheet_order {
            let Some(sheet) = sheets.get_mut(index) else {
                continue;
            };

            for rule in &mut sheet.rules {
                let Rule::Style {
                    selectors,
                    declarations,
                } = rule
                else {
                    continue;
                };

                selectors.retain(|selector| {
                    let hits: Vec<usize> = targets
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| selector.matches(&t.tag, t.id.as_deref(), t.class.as_deref()))
                        .map(|(i, _)| i)
                        .collect();

                    if hits.is_empty() || (self.only_matched_once && hits.len() > 1) {
                        return true;
                    }

                    for hit in hits {
                        matches.entry(hit).or_default().push(Match {
                            specificity: selector.specificity,
                            order,
                            declarations: declarations.clone(),
                        });
                    }
                    order += 1;
                    false
                });
            }

            sheet
                .rules
                .retain(|rule| !matches!(rule, Rule::Style { selectors, .. } if selectors.is_empty()));
        }

        if matches.is_empty() {
            return;
        }

        let referenced = referenced_classes(sheets.values());

        let mut index = 0;
        doc.visit_mut(&mut |element| {
            let current = index;
            index += 1;

            if let Some(sheet) = sheets.get(&current) {
                element.children = if sheet.is_empty() {
                    Vec::new()
                } else {
                    vec![Node::Text(sheet.to_string())]
                };
            }

            if let Some(found) = matches.get_mut(&current) {
                found.sort_by_key(|m| (m.specificity, m.order));
                inline(element, found);
                strip_classes(element, &referenced);
            }
        });

        doc.root_mut().retain_deep(&mut |node| {
            !matches!(node, Node::Element(e) if e.is("style") && e.children.is_empty())
        });
    }
}

fn is_css(element: &Element) -> bool {
    element.is("style") && matches!(element.attr("type"), None | Some("" | "text/css"))
}

/// Merges matched rules under the element's own declarations. Inline
/// declarations win unless the rule marks its value `!important`.
fn inline(element: &mut Element, found: &[Match]) {
    let own = match element.attr("style") {
        Some(style) => match parse_declarations(style) {
            Some(declarations) => declarations,
            None => return,
        },
        None => Vec::new(),
    };

    let mut merged: Vec<(Declaration, bool)> = own
        .into_iter()
        .map(|decl| (decl, true))
        .collect();

    for decl in found.iter().flat_map(|m| &m.declarations) {
        match merged.iter_mut().find(|(existing, _)| existing.name == decl.name) {
            None => merged.push((decl.clone(), false)),
            Some((existing, inline)) => {
                let wins = if *inline {
                    decl.important && !existing.important
                } else {
                    decl.important || !existing.important
                };
                if wins {
                    *existing = decl.clone();
                    *inline = false;
                }
            }
        }
    }

    let declarations: Vec<Declaration> = merged.into_iter().map(|(decl, _)| decl).collect();
    if !declarations.is_empty() {
        element.set_attr("style", format_declarations(&declarations));
    }
}

/// Class names some remaining rule may still select.
fn referenced_classes<'a>(sheets: impl Iterator<Item = &'a Stylesheet>) -> HashSet<String> {
    let mut acc = HashSet::new();
    for sheet in sheets {
        for rule in &sheet.rules {
            match rule {
                Rule::Style { selectors, .. } => {
                    acc.extend(selectors.iter().flat_map(|s| s.classes.iter().cloned()));
                }
                Rule::Raw { classes, .. } => acc.extend(classes.iter().cloned()),
            }
        }
    }
    acc
}

fn strip_classes(element: &mut Element, referenced: &HashSet<String>) {
    let Some(class) = element.attr("class") else {
        return;
    };

    let kept: Vec<&str> = class
        .split_ascii_whitespace()
        .filter(|name| referenced.contains(*name))
        .collect();

    if kept.is_empty() {
        element.remove_attr("class");
    } else {
        let kept = kept.join(" ");
        element.set_attr("class", kept);
    }
}
