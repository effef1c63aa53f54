use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::svg::css::selector_ids;
use crate::svg::{Document, Element, Node};

static URL_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*['"]?#([^)'"\s]+)['"]?\s*\)"#).expect("Error compiling url() pattern")
});

static CSS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([A-Za-z_][\w-]*)").expect("Error compiling id pattern"));

const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Removes identifiers nothing refers to and optionally shortens the rest.
#[derive(Debug, Clone)]
pub struct CleanupIds {
    /// Drop unreferenced ids.
    pub remove: bool,
    /// Rename referenced ids to generated short names.
    pub minify: bool,
    pub preserve: Vec<String>,
    pub preserve_prefixes: Vec<String>,
    /// Run even when scripts or stylesheets could reference ids in ways
    /// the step cannot see.
    pub force: bool,
}

impl Default for CleanupIds {
    fn default() -> Self {
        Self {
            remove: true,
            minify: true,
            preserve: Vec::new(),
            preserve_prefixes: Vec::new(),
            force: false,
        }
    }
}

impl CleanupIds {
    fn is_preserved(&self, id: &str) -> bool {
        self.preserve.iter().any(|p| p == id)
            || self.preserve_prefixes.iter().any(|p| id.starts_with(p.as_str()))
    }

    pub fn apply(&self, doc: &mut Document) {
        if !self.force && has_scripts_or_styles(doc) {
            return;
        }

        let mut ids: Vec<String> = Vec::new();
        let mut referenced: HashSet<String> = HashSet::new();

        doc.visit(&mut |element| {
            if let Some(id) = element.attr("id") {
                ids.push(id.to_string());
            }
            for attr in &element.attributes {
                collect_refs(&attr.name, &attr.value, &mut referenced);
            }
            if element.is("style") {
                let css = element.text();
                match selector_ids(&css) {
                    Some(ids) => referenced.extend(ids),
                    // unreadable sheets keep every id-like token alive
                    None => referenced.extend(
                        CSS_ID.captures_iter(&css).map(|caps| caps[1].to_string()),
                    ),
                }
            }
        });

        let renames = if self.minify {
            self.generate_names(&ids, &referenced)
        } else {
            HashMap::new()
        };

        doc.visit_mut(&mut |element| {
            if let Some(id) = element.attr("id").map(str::to_string) {
                if let Some(name) = renames.get(&id) {
                    element.set_attr("id", name.clone());
                } else if self.remove && !referenced.contains(&id) && !self.is_preserved(&id) {
                    element.remove_attr("id");
                }
            }

            if !renames.is_empty() {
                rewrite_refs(element, &renames);
            }
        });
    }

    fn generate_names(
        &self,
        ids: &[String],
        referenced: &HashSet<String>,
    ) -> HashMap<String, String> {
        let renamed = |id: &String| referenced.contains(id) && !self.is_preserved(id);

        // names that stay as they are and must not be handed out again
        let taken: HashSet<&str> = ids
            .iter()
            .filter(|id| !renamed(id))
            .filter(|id| !self.remove || referenced.contains(*id) || self.is_preserved(id))
            .map(String::as_str)
            .collect();

        let mut renames = HashMap::new();
        let mut counter = 0;
        for id in ids.iter().filter(|id| renamed(id)) {
            if renames.contains_key(id) {
                continue;
            }
            let name = loop {
                let candidate = short_name(counter);
                counter += 1;
                if !taken.contains(candidate.as_str()) && !self.is_preserved(&candidate) {
                    break candidate;
                }
            };
            renames.insert(id.clone(), name);
        }
        renames
    }
}

fn has_scripts_or_styles(doc: &Document) -> bool {
    let mut found = false;
    doc.visit(&mut |element| {
        if (element.is("script") || element.is("style")) && !element.text().trim().is_empty() {
            found = true;
        }
    });
    found
}

fn is_href(name: &str) -> bool {
    name == "href" || name == "xlink:href"
}

fn collect_refs(name: &str, value: &str, acc: &mut HashSet<String>) {
    if is_href(name)
        && let Some(id) = value.trim().strip_prefix('#')
    {
        acc.insert(id.to_string());
    }

    for caps in URL_REF.captures_iter(value) {
        acc.insert(caps[1].to_string());
    }

    if name == "begin" || name == "end" {
        for token in value.split(';') {
            if let Some((id, _)) = token.trim().split_once('.') {
                acc.insert(id.to_string());
            }
        }
    }
}

fn rewrite_refs(element: &mut Element, renames: &HashMap<String, String>) {
    for attr in &mut element.attributes {
        if is_href(&attr.name)
            && let Some(name) = attr.value.trim().strip_prefix('#').and_then(|id| renames.get(id))
        {
            attr.value = format!("#{name}");
            continue;
        }

        if attr.value.contains("url(") {
            attr.value = URL_REF
                .replace_all(&attr.value, |caps: &Captures| match renames.get(&caps[1]) {
                    Some(name) => format!("url(#{name})"),
                    None => caps[0].to_string(),
                })
                .into_owned();
        }

        if attr.name == "begin" || attr.name == "end" {
            attr.value = attr
                .value
                .split(';')
                .map(|token| match token.trim().split_once('.') {
                    Some((id, event)) if renames.contains_key(id) => {
                        format!("{}.{event}", renames[id])
                    }
                    _ => token.to_string(),
                })
                .collect::<Vec<_>>()
                .join(";");
        }
    }

    if element.is("style") {
        for child in &mut element.children {
            if let Node::Text(text) | Node::CData(text) = child {
                *text = CSS_ID
                    .replace_all(text, |caps: &Captures| match renames.get(&caps[1]) {
                        Some(name) => format!("#{name}"),
                        None => caps[0].to_string(),
                    })
                    .into_owned();
            }
        }
    }
}

/// `a`..`Z`, then `aa`, `ab`, ...
fn short_name(mut n: usize) -> String {
    let base = ID_CHARS.len();
    let mut acc = Vec::new();
    loop {
        acc.push(ID_CHARS[n % base]);
        n /= base;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    acc.reverse();
    String::from_utf8_lossy(&acc).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(step: &CleanupIds, text: &str) -> String {
        let mut doc = Document::parse(text).unwrap();
        step.apply(&mut doc);
        doc.to_string()
    }

    const DOC: &str = r##"<svg><defs><linearGradient id="gradient"/><clipPath id="clip"/></defs><rect id="unused" fill="url(#gradient)"/><use xlink:href="#clip"/></svg>"##;

    #[test]
    fn test_removes_unreferenced_without_minify() {
        let step = CleanupIds {
            minify: false,
            ..CleanupIds::default()
        };

        assert_eq!(
            run(&step, DOC),
            r##"<svg><defs><linearGradient id="gradient"/><clipPath id="clip"/></defs><rect fill="url(#gradient)"/><use xlink:href="#clip"/></svg>"##
        );
    }

    #[test]
    fn test_minify_renames_references() {
        assert_eq!(
            run(&CleanupIds::default(), DOC),
            r##"<svg><defs><linearGradient id="a"/><clipPath id="b"/></defs><rect fill="url(#a)"/><use xlink:href="#b"/></svg>"##
        );
    }

    #[test]
    fn test_preserve() {
        let step = CleanupIds {
            preserve: vec!["unused".into()],
            preserve_prefixes: vec!["grad".into()],
            ..CleanupIds::default()
        };

        assert_eq!(
            run(&step, DOC),
            r##"<svg><defs><linearGradient id="gradient"/><clipPath id="a"/></defs><rect id="unused" fill="url(#gradient)"/><use xlink:href="#a"/></svg>"##
        );
    }

    #[test]
    fn test_style_blocks_need_force() {
        let text = "<svg><style>#logo{fill:red}</style><g id=\"logo\"/><g id=\"gone\"/></svg>";

        assert_eq!(run(&CleanupIds::default(), text), text);

        let step = CleanupIds {
            minify: false,
            force: true,
            ..CleanupIds::default()
        };
        assert_eq!(
            run(&step, text),
            "<svg><style>#logo{fill:red}</style><g id=\"logo\"/><g/></svg>"
        );
    }

    #[test]
    fn test_short_names() {
        assert_eq!(short_name(0), "a");
        assert_eq!(short_name(51), "Z");
        assert_eq!(short_name(52), "aa");
        assert_eq!(short_name(53), "ab");
    }
}
