use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors produced while reading or writing an SVG document.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("Malformed XML.\n{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed attribute.\n{0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Document is not valid UTF-8.\n{0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Unexpected closing tag")]
    Unbalanced,

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Document has no root element")]
    NoRoot,

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Invalid attribute pattern '{0}'.\n{1}")]
    Pattern(String, regex::Error),
}

/// Errors produced while rasterizing an SVG document.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Couldn't parse SVG.\n{0}")]
    Parse(#[from] resvg::usvg::Error),

    #[error("Document has no drawable area ({0}x{1})")]
    ZeroSize(f32, f32),

    #[error("Couldn't allocate a {0}x{1} canvas")]
    Canvas(u32, u32),

    #[error("Couldn't encode PNG.\n{0}")]
    Encode(#[from] image::ImageError),
}

/// Errors produced by the file-level work inside a task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Couldn't compile glob pattern.\n{0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("File '{0}':\n{1}")]
    File(Utf8PathBuf, anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ClearError {
    #[error("Couldn't remove the output directory.\n{0}")]
    RemoveError(std::io::Error),

    #[error("Couldn't create the output directory.\n{0}")]
    CreateError(std::io::Error),
}

/// Failure of a task plan: the first failed task in declaration order.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Task '{0}':\n{1}")]
    Task(String, anyhow::Error),

    #[error("Task '{0}' panicked: {1}")]
    Panic(String, String),
}
