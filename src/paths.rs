//! Input selections. Every set is a list of glob patterns, each anchored
//! at a base directory that decides where matches land in the output.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{Pattern, glob};

use crate::error::TaskError;

/// Icon categories gathered into the combined "all" distribution.
pub const CATEGORIES: &[&str] = &["banks", "card", "crypto", "emoney", "installments", "wallets"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    base: Utf8PathBuf,
    pattern: &'static str,
}

impl Entry {
    fn full(&self) -> String {
        let base = Pattern::escape(self.base.as_str());
        if base.is_empty() {
            self.pattern.to_string()
        } else {
            format!("{}/{}", base.trim_end_matches('/'), self.pattern)
        }
    }
}

/// A file selected by a [`PathSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub path: Utf8PathBuf,
    /// Location below the pattern's base directory.
    pub relative: Utf8PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    entries: Vec<Entry>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `pattern`, evaluated below `base`.
    pub fn with(mut self, base: impl Into<Utf8PathBuf>, pattern: &'static str) -> Self {
        self.entries.push(Entry {
            base: base.into(),
            pattern,
        });
        self
    }

    /// Every icon in the source tree, category directories preserved.
    pub fn icons(src: &Utf8Path) -> Self {
        Self::new().with(src, "**/*.svg")
    }

    /// The flat "all" distribution: one level per category, merged.
    pub fn all(src: &Utf8Path) -> Self {
        CATEGORIES
            .iter()
            .fold(Self::new(), |set, category| set.with(src.join(category), "*.svg"))
    }

    pub fn favicon(src: &Utf8Path) -> Self {
        Self::new().with(src.join("favicon"), "**/*")
    }

    pub fn fonts(src: &Utf8Path) -> Self {
        Self::new().with(src.join("fonts"), "**/*")
    }

    pub fn flags(dir: &Utf8Path) -> Self {
        Self::new().with(dir, "*.svg")
    }

    /// Patterns as they are handed to the glob walker.
    pub fn patterns(&self) -> Vec<String> {
        self.entries.iter().map(Entry::full).collect()
    }

    /// Resolves the set against the filesystem. Directories are skipped, a
    /// file matched by several patterns is reported once, for the first.
    pub fn expand(&self) -> Result<Vec<Matched>, TaskError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for entry in &self.entries {
            for path in glob(&entry.full())? {
                let path = Utf8PathBuf::try_from(path?)?;
                if !path.is_file() || !seen.insert(path.clone()) {
                    continue;
                }

                let relative = match path.strip_prefix(&entry.base) {
                    Ok(relative) => relative.to_path_buf(),
                    Err(_) => path.file_name().map(Utf8PathBuf::from).unwrap_or_default(),
                };

                files.push(Matched { path, relative });
            }
        }

        Ok(files)
    }
}
