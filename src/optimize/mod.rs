//! The SVG optimizer: an ordered list of typed steps applied to a document.
//!
//! Every step reads the document produced by the previous one. The step set
//! is closed; parameters live in each step's own record and are fixed once
//! the [`Config`] is built.

mod cleanup_ids;
mod inline_styles;
mod merge_paths;
mod preset;
mod remove_attrs;
mod style_to_attrs;
mod viewbox;

use crate::error::SvgError;
use crate::svg::Document;

pub use cleanup_ids::CleanupIds;
pub use inline_styles::InlineStyles;
pub use merge_paths::MergePaths;
pub use preset::{Preset, PresetStep};
pub use remove_attrs::RemoveAttrs;
pub use style_to_attrs::ConvertStyleToAttrs;
pub use viewbox::AddViewBox;

/// One transformation of the optimizer pipeline.
#[derive(Debug, Clone)]
pub enum Step {
    /// The default cleanup preset, minus any overridden sub-steps.
    Preset(Preset),
    ConvertStyleToAttrs(ConvertStyleToAttrs),
    AddViewBox(AddViewBox),
    RemoveAttrs(RemoveAttrs),
    CleanupIds(CleanupIds),
    InlineStyles(InlineStyles),
    MergePaths(MergePaths),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Preset(_) => "preset-default",
            Step::ConvertStyleToAttrs(_) => "convertStyleToAttrs",
            Step::AddViewBox(_) => "addViewBox",
            Step::RemoveAttrs(_) => "removeAttrs",
            Step::CleanupIds(_) => "cleanupIds",
            Step::InlineStyles(_) => "inlineStyles",
            Step::MergePaths(_) => "mergePaths",
        }
    }

    pub fn apply(&self, doc: &mut Document) {
        match self {
            Step::Preset(step) => step.apply(doc),
            Step::ConvertStyleToAttrs(step) => step.apply(doc),
            Step::AddViewBox(step) => step.apply(doc),
            Step::RemoveAttrs(step) => step.apply(doc),
            Step::CleanupIds(step) => step.apply(doc),
            Step::InlineStyles(step) => step.apply(doc),
            Step::MergePaths(step) => step.apply(doc),
        }
    }
}

/// Ordered optimizer configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    steps: Vec<Step>,
}

impl Config {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// The configuration every icon in the distribution goes through.
    pub fn icons() -> Result<Self, SvgError> {
        Ok(Self::new([
            Step::Preset(
                Preset::default()
                    .disable(PresetStep::CleanupIds)
                    .disable(PresetStep::InlineStyles),
            ),
            Step::ConvertStyleToAttrs(ConvertStyleToAttrs::default()),
            Step::AddViewBox(AddViewBox),
            Step::RemoveAttrs(RemoveAttrs::new(
                [
                    "svg_(version|x|y|id|fill|xml:space)",
                    "data-name",
                    "path_fill-rule_nonzero",
                ],
                '_',
            )?),
            Step::CleanupIds(CleanupIds {
                minify: false,
                force: true,
                ..CleanupIds::default()
            }),
            Step::InlineStyles(InlineStyles {
                only_matched_once: false,
            }),
            Step::MergePaths(MergePaths { force: true }),
        ]))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn apply(&self, doc: &mut Document) {
        for step in &self.steps {
            step.apply(doc);
            tracing::trace!(step = step.name(), "applied");
        }
    }

    /// Parses, optimizes and serializes a single document.
    pub fn optimize(&self, text: &str) -> Result<String, SvgError> {
        let mut doc = Document::parse(text)?;
        self.apply(&mut doc);
        Ok(doc.to_string())
    }
}
