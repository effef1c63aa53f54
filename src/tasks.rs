//! The task catalogue and the work behind every task.

use std::fmt::{self, Display};
use std::fs;
use std::sync::OnceLock;

use anyhow::Context;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use clap::builder::PossibleValue;
use rayon::prelude::*;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::config::BuildConfig;
use crate::error::{PlanError, SvgError, TaskError};
use crate::io::{clear_dist, write_file};
use crate::optimize;
use crate::paths::{Matched, PathSet};
use crate::plan::{Diagnostics, Plan};
use crate::raster::{Fit, Rasterizer};
use crate::utils::FILE_STYLE;

/// `build-date.txt` format, e.g. `Mon, 19 Oct 2026 12:00:00 GMT`.
pub const BUILD_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Named unit of work, selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    Clean,
    Version,
    Svg,
    /// Optimize the "all" set in place, rewriting the sources.
    SvgSrc,
    Favicon,
    Fonts,
    Flags,
    Png32,
    Png64,
    Png128,
    AllSvg,
    AllPng32,
    AllPng64,
    AllPng128,
    All,
    Default,
}

impl TaskId {
    pub const ALL: &'static [TaskId] = &[
        TaskId::Clean,
        TaskId::Version,
        TaskId::Svg,
        TaskId::SvgSrc,
        TaskId::Favicon,
        TaskId::Fonts,
        TaskId::Flags,
        TaskId::Png32,
        TaskId::Png64,
        TaskId::Png128,
        TaskId::AllSvg,
        TaskId::AllPng32,
        TaskId::AllPng64,
        TaskId::AllPng128,
        TaskId::All,
        TaskId::Default,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskId::Clean => "clean",
            TaskId::Version => "version",
            TaskId::Svg => "svg",
            TaskId::SvgSrc => "svg:src",
            TaskId::Favicon => "favicon",
            TaskId::Fonts => "fonts",
            TaskId::Flags => "flags",
            TaskId::Png32 => "svg2png:32",
            TaskId::Png64 => "svg2png:64",
            TaskId::Png128 => "svg2png:128",
            TaskId::AllSvg => "all:svg",
            TaskId::AllPng32 => "all:svg2png:32",
            TaskId::AllPng64 => "all:svg2png:64",
            TaskId::AllPng128 => "all:svg2png:128",
            TaskId::All => "all",
            TaskId::Default => "default",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|task| task.name() == name)
    }

    /// The plan this task stands for. Aggregates expand into their members,
    /// everything else is a single task.
    pub fn plan(self) -> Plan<TaskId> {
        match self {
            TaskId::All => Plan::parallel(
                [
                    TaskId::AllSvg,
                    TaskId::AllPng32,
                    TaskId::AllPng64,
                    TaskId::AllPng128,
                ]
                .map(Plan::Task),
            ),
            TaskId::Default => Plan::series([
                Plan::Task(TaskId::Clean),
                Plan::parallel(
                    [
                        TaskId::Version,
                        TaskId::Svg,
                        TaskId::Favicon,
                        TaskId::Fonts,
                        TaskId::Flags,
                        TaskId::Png32,
                        TaskId::Png64,
                        TaskId::Png128,
                    ]
                    .map(Plan::Task)
                    .into_iter()
                    .chain([TaskId::All.plan()]),
                ),
            ]),
            task => Plan::Task(task),
        }
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ValueEnum for TaskId {
    fn value_variants<'a>() -> &'a [Self] {
        Self::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.name()))
    }
}

/// Executes tasks against one build configuration.
pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    optimizer: optimize::Config,
    rasterizer: OnceLock<Rasterizer>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a BuildConfig) -> Result<Self, SvgError> {
        Ok(Self::with_optimizer(config, optimize::Config::icons()?))
    }

    pub fn with_optimizer(config: &'a BuildConfig, optimizer: optimize::Config) -> Self {
        Self {
            config,
            optimizer,
            rasterizer: OnceLock::new(),
        }
    }

    /// Runs `task` with everything it expands to.
    pub fn run(&self, task: TaskId) -> Result<Diagnostics, PlanError> {
        task.plan().run(|task| self.execute(task))
    }

    /// Performs a single task.
    pub fn execute(&self, task: TaskId) -> anyhow::Result<()> {
        let BuildConfig {
            src,
            dist,
            flags,
            version,
        } = self.config;

        match task {
            TaskId::Clean => clear_dist(dist)?,
            TaskId::Version => write_metadata(dist, version, Utc::now())?,
            TaskId::Svg => self.compress(&PathSet::icons(src), &dist.join("svg"))?,
            TaskId::SvgSrc => self.compress_in_place(&PathSet::all(src))?,
            TaskId::Favicon => copy(&PathSet::favicon(src), &dist.join("favicon"))?,
            TaskId::Fonts => copy(&PathSet::fonts(src), &dist.join("fonts"))?,
            TaskId::Flags => self.compress(&PathSet::flags(flags), &dist.join("svg/flags"))?,
            TaskId::Png32 | TaskId::Png64 | TaskId::Png128 => {
                let size = raster_size(task);
                self.rasterize(&PathSet::icons(src), &dist.join(format!("png/{size}")), size)?
            }
            TaskId::AllSvg => self.compress(&PathSet::all(src), &dist.join("all/svg"))?,
            TaskId::AllPng32 | TaskId::AllPng64 | TaskId::AllPng128 => {
                let size = raster_size(task);
                self.rasterize(&PathSet::all(src), &dist.join(format!("all/png/{size}")), size)?
            }
            TaskId::All | TaskId::Default => {
                self.run(task)?;
            }
        }

        Ok(())
    }

    fn rasterizer(&self) -> &Rasterizer {
        self.rasterizer.get_or_init(Rasterizer::new)
    }

    /// Optimizes every file of `set` into `out`.
    pub fn compress(&self, set: &PathSet, out: &Utf8Path) -> Result<(), TaskError> {
        let count = each_file(set, |file| {
            let text = fs::read_to_string(&file.path)?;
            let optimized = self.optimizer.optimize(&text)?;
            write_file(&out.join(&file.relative), optimized)?;
            Ok(())
        })?;

        tracing::debug!("Optimized {count} files into {out}");
        Ok(())
    }

    /// Optimizes every file of `set`, overwriting the file itself.
    pub fn compress_in_place(&self, set: &PathSet) -> Result<(), TaskError> {
        let count = each_file(set, |file| {
            let text = fs::read_to_string(&file.path)?;
            let optimized = self.optimizer.optimize(&text)?;
            fs::write(&file.path, optimized)?;
            Ok(())
        })?;

        tracing::debug!("Optimized {count} files in place");
        Ok(())
    }

    /// Renders every file of `set` to a `size` pixel PNG in `out`.
    pub fn rasterize(&self, set: &PathSet, out: &Utf8Path, size: u32) -> Result<(), TaskError> {
        let count = each_file(set, |file| {
            let data = fs::read(&file.path)?;
            let png = self.rasterizer().rasterize(&data, size, Fit::Inside)?;
            let target = out.join(&file.relative).with_extension("png");
            write_file(&target, png).with_context(|| format!("Couldn't write {target}"))?;
            Ok(())
        })?;

        tracing::debug!("Rendered {count} files into {out}");
        Ok(())
    }
}

fn raster_size(task: TaskId) -> u32 {
    match task {
        TaskId::Png32 | TaskId::AllPng32 => 32,
        TaskId::Png64 | TaskId::AllPng64 => 64,
        _ => 128,
    }
}

/// Runs `action` for every file of `set` on the rayon pool, advancing the
/// current task's progress bar. The first failing file fails the task.
fn each_file<F>(set: &PathSet, action: F) -> Result<usize, TaskError>
where
    F: Fn(&Matched) -> anyhow::Result<()> + Sync,
{
    let files = set.expand()?;

    let span = Span::current();
    span.pb_set_style(&FILE_STYLE);
    span.pb_set_length(files.len() as u64);

    files.par_iter().try_for_each(|file| {
        action(file).map_err(|e| TaskError::File(file.path.clone(), e))?;
        span.pb_inc(1);
        Ok::<_, TaskError>(())
    })?;

    Ok(files.len())
}

/// Copies every file of `set` into `out`, byte for byte.
pub fn copy(set: &PathSet, out: &Utf8Path) -> Result<(), TaskError> {
    let count = each_file(set, |file| {
        let target = out.join(&file.relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&file.path, &target)?;
        Ok(())
    })?;

    tracing::debug!("Copied {count} files into {out}");
    Ok(())
}

pub fn format_build_date(now: DateTime<Utc>) -> String {
    now.format(BUILD_DATE_FORMAT).to_string()
}

/// Writes `version.txt` and `build-date.txt`. The two writes do not depend
/// on each other, both are attempted before an error is reported.
pub fn write_metadata(dist: &Utf8Path, version: &str, now: DateTime<Utc>) -> Result<(), TaskError> {
    let version = write_file(&dist.join("version.txt"), version);
    let date = write_file(&dist.join("build-date.txt"), format_build_date(now));
    version?;
    date?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for &task in TaskId::ALL {
            assert_eq!(TaskId::from_name(task.name()), Some(task));
        }
        assert_eq!(TaskId::from_name("svg2png:256"), None);
    }

    #[test]
    fn test_default_plan() {
        let plan = TaskId::Default.plan();
        let Plan::Series(steps) = &plan else {
            panic!("default should be a series");
        };

        assert_eq!(steps[0], Plan::Task(TaskId::Clean));
        assert!(matches!(&steps[1], Plan::Parallel(members) if members.len() == 9));

        let names: Vec<_> = plan.tasks().into_iter().map(TaskId::name).collect();
        assert_eq!(
            names,
            vec![
                "clean",
                "version",
                "svg",
                "favicon",
                "fonts",
                "flags",
                "svg2png:32",
                "svg2png:64",
                "svg2png:128",
                "all:svg",
                "all:svg2png:32",
                "all:svg2png:64",
                "all:svg2png:128",
            ]
        );
    }

    #[test]
    fn test_leaf_plans() {
        assert_eq!(TaskId::SvgSrc.plan(), Plan::Task(TaskId::SvgSrc));
        assert_eq!(TaskId::All.plan().tasks().len(), 4);
    }

    #[test]
    fn test_build_date_format() {
        let date = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(format_build_date(date), "Mon, 19 Oct 2026 12:00:00 GMT");
    }

    #[test]
    fn test_write_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let dist = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let date = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        write_metadata(&dist, "1.2.3", date).unwrap();

        assert_eq!(fs::read_to_string(dist.join("version.txt")).unwrap(), "1.2.3");
        assert_eq!(
            fs::read_to_string(dist.join("build-date.txt")).unwrap(),
            "Fri, 02 Jan 2026 03:04:05 GMT"
        );
    }

    #[test]
    fn test_compress_reports_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        write_file(&root.join("src/banks/good.svg"), "<svg width=\"8\" height=\"8\"/>").unwrap();
        write_file(&root.join("src/banks/bad.svg"), "<svg><g></svg>").unwrap();

        let config = BuildConfig::default();
        let pipeline = Pipeline::new(&config).unwrap();
        let result = pipeline.compress(&PathSet::icons(&root.join("src")), &root.join("out"));

        match result {
            Err(TaskError::File(path, _)) => assert!(path.ends_with("bad.svg")),
            other => panic!("expected a file error, got {other:?}"),
        }
    }
}
