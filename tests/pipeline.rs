use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::DateTime;
use image::GenericImageView;
use iconpipe::{BuildConfig, Pipeline, PlanError, TaskId};
use tempfile::TempDir;

const SQUARE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg version="1.1" id="Layer_1" xmlns="http://www.w3.org/2000/svg" x="0px" y="0px" width="32px" height="32px">
  <style type="text/css">.st0{fill:#0057B8;}</style>
  <g data-name="Group 1">
    <path class="st0" fill-rule="nonzero" d="M0 0h32v16H0z"/>
  </g>
</svg>
"##;

const WIDE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="32"><rect width="64" height="32" fill="#FFD700"/></svg>"##;

struct Fixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();

        let fixture = Self { _dir: dir, root };
        fixture.write("src/banks/bank.svg", SQUARE);
        fixture.write("src/card/wide.svg", WIDE);
        fixture.write("src/favicon/favicon.ico", "\0\0\x01\0");
        fixture.write("src/fonts/woff2/icons.woff2", "wOF2");
        fixture.write("flags/ua.svg", WIDE);
        fixture
    }

    fn write(&self, path: &str, data: &str) {
        let path = self.root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn config(&self, version: &str) -> BuildConfig {
        BuildConfig {
            src: self.root.join("src"),
            dist: self.root.join("dist"),
            flags: self.root.join("flags"),
            version: version.into(),
        }
    }

    fn dist(&self) -> Utf8PathBuf {
        self.root.join("dist")
    }
}

fn png_size(path: &Utf8Path) -> (u32, u32) {
    image::open(path).unwrap().dimensions()
}

#[test]
fn default_build_produces_distribution() {
    let fixture = Fixture::new();
    fixture.write("dist/stale.txt", "left over");

    let config = fixture.config("1.2.3");
    let pipeline = Pipeline::new(&config).unwrap();
    let diagnostics = pipeline.run(TaskId::Default).unwrap();
    assert_eq!(diagnostics.execution_times.len(), 13);

    let dist = fixture.dist();
    assert!(!dist.join("stale.txt").exists());

    for path in [
        "svg/banks/bank.svg",
        "svg/card/wide.svg",
        "svg/flags/ua.svg",
        "all/svg/bank.svg",
        "all/svg/wide.svg",
    ] {
        assert!(dist.join(path).is_file(), "{path} is missing");
    }

    let bank = fs::read_to_string(dist.join("svg/banks/bank.svg")).unwrap();
    assert!(bank.contains("viewBox=\"0 0 32 32\""));
    assert!(bank.to_ascii_lowercase().contains("style=\"fill:#0057b8\""));
    assert!(!bank.contains("class="));
    assert!(!bank.contains("data-name"));

    for size in [32, 64, 128] {
        assert_eq!(png_size(&dist.join(format!("png/{size}/banks/bank.png"))), (size, size));
        assert_eq!(
            png_size(&dist.join(format!("png/{size}/card/wide.png"))),
            (size, size / 2)
        );
        assert_eq!(png_size(&dist.join(format!("all/png/{size}/bank.png"))), (size, size));
        assert_eq!(
            png_size(&dist.join(format!("all/png/{size}/wide.png"))),
            (size, size / 2)
        );
    }

    assert_eq!(fs::read(dist.join("favicon/favicon.ico")).unwrap(), b"\0\0\x01\0");
    assert_eq!(fs::read(dist.join("fonts/woff2/icons.woff2")).unwrap(), b"wOF2");

    assert_eq!(fs::read_to_string(dist.join("version.txt")).unwrap(), "1.2.3");
    let date = fs::read_to_string(dist.join("build-date.txt")).unwrap();
    assert!(DateTime::parse_from_rfc2822(&date).is_ok(), "bad date {date}");
    assert!(date.ends_with(" GMT"));
}

#[test]
fn version_defaults_to_empty() {
    let fixture = Fixture::new();
    let config = fixture.config("");

    Pipeline::new(&config).unwrap().run(TaskId::Version).unwrap();

    assert_eq!(fs::read_to_string(fixture.dist().join("version.txt")).unwrap(), "");
}

#[test]
fn clean_leaves_empty_directory() {
    let fixture = Fixture::new();
    fixture.write("dist/png/32/old.png", "x");
    let config = fixture.config("");

    Pipeline::new(&config).unwrap().run(TaskId::Clean).unwrap();

    let dist = fixture.dist();
    assert!(dist.is_dir());
    assert_eq!(fs::read_dir(dist).unwrap().count(), 0);
}

#[test]
fn single_task_writes_only_its_output() {
    let fixture = Fixture::new();
    let config = fixture.config("");

    Pipeline::new(&config).unwrap().run(TaskId::Png64).unwrap();

    let dist = fixture.dist();
    assert_eq!(png_size(&dist.join("png/64/banks/bank.png")), (64, 64));
    assert!(!dist.join("svg").exists());
    assert!(!dist.join("png/32").exists());
}

#[test]
fn svg_src_rewrites_sources() {
    let fixture = Fixture::new();
    let config = fixture.config("");

    Pipeline::new(&config).unwrap().run(TaskId::SvgSrc).unwrap();

    let source = fs::read_to_string(fixture.root.join("src/banks/bank.svg")).unwrap();
    assert!(!source.starts_with("<?xml"));
    assert!(source.contains("viewBox=\"0 0 32 32\""));
    assert!(!fixture.dist().exists());
}

#[test]
fn malformed_icon_fails_the_build() {
    let fixture = Fixture::new();
    fixture.write("src/banks/broken.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"><g></svg>");
    let config = fixture.config("9.9.9");

    let result = Pipeline::new(&config).unwrap().run(TaskId::Default);

    match result {
        Err(PlanError::Task(name, error)) => {
            assert_eq!(name, "svg");
            assert!(format!("{error}").contains("broken.svg"));
        }
        other => panic!("expected a task failure, got {other:?}"),
    }

    // siblings still ran to completion
    assert_eq!(
        fs::read_to_string(fixture.dist().join("version.txt")).unwrap(),
        "9.9.9"
    );
    assert!(fixture.dist().join("fonts/woff2/icons.woff2").is_file());
}
