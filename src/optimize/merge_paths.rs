use crate::svg::path::{self, Bounds};
use crate::svg::{Document, Element, Node};

/// Attributes whose effect depends on the shape being a single path.
const BLOCKING_ATTRS: &[&str] = &[
    "marker-start",
    "marker-mid",
    "marker-end",
    "clip-path",
    "mask",
    "mask-image",
];

/// Joins runs of adjacent sibling paths that share every attribute but `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergePaths {
    /// Merge even when the shapes may overlap.
    pub force: bool,
}

impl MergePaths {
    pub fn apply(&self, doc: &mut Document) {
        doc.visit_mut(&mut |element| self.merge_children(element));
    }

    fn merge_children(&self, parent: &mut Element) {
        if parent.elements().filter(|e| e.is("path")).count() < 2 {
            return;
        }

        let children = std::mem::take(&mut parent.children);
        let mut merged: Vec<Node> = Vec::with_capacity(children.len());

        for node in children {
            if let (Node::Element(current), Some(Node::Element(previous))) = (&node, merged.last_mut())
                && self.can_merge(previous, current)
                && let (Some(prev_d), Some(cur_d)) = (previous.attr("d"), current.attr("d"))
            {
                let joined = format!("{prev_d} {}", path::absolute_start(cur_d));
                previous.set_attr("d", joined);
                continue;
            }
            merged.push(node);
        }

        parent.children = merged;
    }

    fn can_merge(&self, previous: &Element, current: &Element) -> bool {
        if !is_mergeable(previous) || !is_mergeable(current) || !same_attributes(previous, current) {
            return false;
        }

        if self.force {
            return true;
        }

        match (bounds_of(previous), bounds_of(current)) {
            (Some(a), Some(b)) => !a.intersects(&b),
            _ => false,
        }
    }
}

fn is_mergeable(element: &Element) -> bool {
    element.is("path")
        && element.children.is_empty()
        && element.has_attr("d")
        && !BLOCKING_ATTRS.iter().any(|name| element.has_attr(name))
}

fn bounds_of(element: &Element) -> Option<Bounds> {
    element.attr("d").and_then(path::bounds)
}

fn same_attributes(a: &Element, b: &Element) -> bool {
    a.attributes.len() == b.attributes.len()
        && a
            .attributes
            .iter()
            .filter(|attr| attr.name != "d")
            .all(|attr| b.attr(&attr.name) == Some(attr.value.as_str()))
}
