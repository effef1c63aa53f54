use camino::Utf8PathBuf;
use clap::Parser;

use crate::tasks::TaskId;

/// Build the icon distribution: optimized SVGs, PNG renditions, fonts,
/// favicons, flags and version metadata.
#[derive(Parser, Debug, Clone)]
#[clap(name = "iconpipe", disable_version_flag = true)]
pub struct Args {
    /// Task to run.
    #[clap(value_enum, index = 1, default_value = "default")]
    pub task: TaskId,

    /// Written verbatim to `version.txt`.
    #[clap(long, default_value = "")]
    pub version: String,

    /// Source tree with one directory per icon category.
    #[clap(long, default_value = "src")]
    pub src: Utf8PathBuf,

    /// Output directory.
    #[clap(long, default_value = "dist")]
    pub dist: Utf8PathBuf,

    /// Directory holding the flag icons.
    #[clap(long, default_value = "node_modules/flag-icons/flags/4x3")]
    pub flags: Utf8PathBuf,

    /// Print the task plan as a Mermaid diagram instead of running it.
    #[clap(long)]
    pub graph: bool,
}

impl Args {
    pub fn config(&self) -> BuildConfig {
        BuildConfig {
            src: self.src.clone(),
            dist: self.dist.clone(),
            flags: self.flags.clone(),
            version: self.version.clone(),
        }
    }
}

/// Locations and inputs shared by every task of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub src: Utf8PathBuf,
    pub dist: Utf8PathBuf,
    pub flags: Utf8PathBuf,
    /// Version identifier, empty when none was given.
    pub version: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src: "src".into(),
            dist: "dist".into(),
            flags: "node_modules/flag-icons/flags/4x3".into(),
            version: String::new(),
        }
    }
}
