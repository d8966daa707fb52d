//! End-to-end tests for the manifest → page pipeline.
//!
//! The library tests drive `scan` and `generate` directly with a fixed
//! history. The CLI tests run the built binary against a copy of the
//! fixture tree and only check exit status and produced files.

use chrono::{DateTime, TimeZone, Utc};
use seqhub::config::HubConfig;
use seqhub::history::History;
use seqhub::types::{DependencyKind, Manifest};
use seqhub::{generate, scan};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

struct StaticHistory(DateTime<Utc>);

impl History for StaticHistory {
    fn last_modified(&self, _relative: &Path) -> DateTime<Utc> {
        self.0
    }
}

fn history() -> StaticHistory {
    StaticHistory(Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap())
}

/// Recursive copy, the integration-side twin of the crate's `setup_fixtures`
/// (crate-private test helpers are not visible from `tests/`).
fn copy_dir(src: &Path, dst: &Path) {
    std::fs::create_dir_all(dst).unwrap();
    for entry in std::fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn fixture_copy() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir(&fixtures, tmp.path());
    tmp
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn seqhub() -> Command {
    Command::new(env!("CARGO_BIN_EXE_seqhub"))
}

// =========================================================================
// Library pipeline
// =========================================================================

#[test]
fn scan_then_generate_produces_site() {
    let tmp = fixture_copy();
    let source = tmp.path();
    let config = HubConfig::default();

    let manifest = scan::scan(source, &config, &history()).unwrap();
    let manifest_path = source.join("manifest.json");
    scan::write_manifest(&manifest, &manifest_path).unwrap();

    let output = source.join("dist");
    let report = generate::generate(
        &manifest_path,
        source,
        &source.join("page-template"),
        &output,
        &config,
    )
    .unwrap();

    assert_eq!(report.entries, 4);
    assert!(report.unresolved.is_empty());
    assert!(output.join("index.html").is_file());
    assert!(output.join("manifest.json").is_file());
    assert!(output.join("static/style.css").is_file());
    assert!(output.join("static/main.js").is_file());
    assert!(output.join("packages/relax/r/ruanklein/focus.spsq").is_file());
    assert!(output.join("packages/relax/rain.wav").is_file());

    let html = std::fs::read_to_string(output.join("index.html")).unwrap();
    assert!(html.contains(r#"<span id="total">4</span>"#));
    assert!(html.contains("in 3 categories by 3 authors"));
    assert!(html.contains("showSequence('/packages/relax/r/ruanklein/focus.spsq')"));
    assert!(!html.contains("{{"));
}

#[test]
fn manifest_json_shape() {
    let tmp = fixture_copy();
    let manifest = scan::scan(tmp.path(), &HubConfig::default(), &history()).unwrap();
    let path = tmp.path().join("out/manifest.json");
    scan::write_manifest(&manifest, &path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], "1.0.0");
    assert!(json["lastUpdated"].is_string());

    let focus = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "ruanklein.relax.focus")
        .unwrap();
    assert_eq!(focus["display_name"], "Focus");
    assert_eq!(focus["updated_at"], "2025-04-01T12:00:00Z");
    assert_eq!(
        focus["download_url"],
        "https://ruanklein.github.io/synapseq-hub/packages/relax/r/ruanklein/focus.spsq"
    );
    assert_eq!(focus["dependencies"][0]["type"], "presetlist");
    assert_eq!(focus["dependencies"][1]["type"], "background");
    assert_eq!(
        focus["dependencies"][1]["download_url"],
        "https://ruanklein.github.io/synapseq-hub/packages/relax/rain.wav"
    );

    let study = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "bruno.focus.study")
        .unwrap();
    assert!(study.get("thumbnail").is_none());
    assert_eq!(study["dependencies"], serde_json::json!([]));
}

#[test]
fn manifest_round_trips_through_file() {
    let tmp = fixture_copy();
    let manifest = scan::scan(tmp.path(), &HubConfig::default(), &history()).unwrap();
    let path = tmp.path().join("manifest.json");
    scan::write_manifest(&manifest, &path).unwrap();

    let read: Manifest =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read, manifest);
    let focus = read
        .entries
        .iter()
        .find(|e| e.id == "ruanklein.relax.focus")
        .unwrap();
    let kinds: Vec<_> = focus.dependencies.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DependencyKind::Presetlist, DependencyKind::Background]);
}

#[test]
fn rescan_differs_only_in_last_updated() {
    let tmp = fixture_copy();
    let config = HubConfig::default();
    let first = scan::scan(tmp.path(), &config, &history()).unwrap();
    let second = scan::scan(tmp.path(), &config, &history()).unwrap();
    assert_eq!(first.version, second.version);
    assert_eq!(first.entries, second.entries);
}

#[test]
fn remote_dependency_aborts_scan() {
    let tmp = fixture_copy();
    write(
        tmp.path(),
        "packages/focus/b/bruno/remote.spsq",
        "@background https://example.com/noise.wav\n",
    );
    let err = scan::scan(tmp.path(), &HubConfig::default(), &history()).unwrap_err();
    assert!(err.to_string().contains("https://example.com/noise.wav"));
}

#[test]
fn missing_dependency_aborts_scan() {
    let tmp = fixture_copy();
    write(
        tmp.path(),
        "packages/focus/b/bruno/lost.spsq",
        "@presetlist presets-gone.spsq\n",
    );
    assert!(scan::scan(tmp.path(), &HubConfig::default(), &history()).is_err());
}

#[test]
fn generate_without_manifest_fails() {
    let tmp = fixture_copy();
    let err = generate::generate(
        &tmp.path().join("manifest.json"),
        tmp.path(),
        &tmp.path().join("page-template"),
        &tmp.path().join("dist"),
        &HubConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, generate::GenerateError::MissingManifest(_)));
}

// =========================================================================
// CLI
// =========================================================================

#[test]
fn cli_build_writes_manifest_and_site() {
    let tmp = fixture_copy();
    let status = seqhub()
        .args(["--source"])
        .arg(tmp.path())
        .args(["build"])
        .status()
        .unwrap();
    assert!(status.success());
    assert!(tmp.path().join("manifest.json").is_file());
    assert!(tmp.path().join("dist/index.html").is_file());
    assert!(tmp.path().join("dist/manifest.json").is_file());
}

#[test]
fn cli_check_fails_on_bad_content() {
    let tmp = fixture_copy();
    write(tmp.path(), "packages/focus/b/ana/wrong.spsq", "silence\n");
    let output = seqhub()
        .arg("--source")
        .arg(tmp.path())
        .arg("check")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR:"));
    assert!(!tmp.path().join("manifest.json").exists());
}

#[test]
fn cli_honors_config_file() {
    let tmp = fixture_copy();
    write(
        tmp.path(),
        "hub.toml",
        "[manifest]\nfile = \"public/catalog.json\"\nversion = \"2.0.0\"\n",
    );
    let status = seqhub()
        .arg("--source")
        .arg(tmp.path())
        .arg("manifest")
        .status()
        .unwrap();
    assert!(status.success());

    let raw = std::fs::read_to_string(tmp.path().join("public/catalog.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], "2.0.0");
}

#[test]
fn cli_rejects_unknown_config_keys() {
    let tmp = fixture_copy();
    write(tmp.path(), "hub.toml", "colour = \"blue\"\n");
    let status = seqhub()
        .arg("--source")
        .arg(tmp.path())
        .arg("check")
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_gen_config_parses() {
    let output = seqhub().arg("gen-config").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let value: toml::Value = toml::from_str(&text).unwrap();
    assert!(value.get("base_url").is_some());
}

#[test]
fn cli_build_with_manifest_inside_output() {
    let tmp = fixture_copy();
    write(tmp.path(), "hub.toml", "[manifest]\nfile = \"dist/manifest.json\"\n");
    let status = seqhub()
        .arg("--source")
        .arg(tmp.path())
        .arg("build")
        .status()
        .unwrap();
    assert!(status.success());
    assert!(tmp.path().join("dist/index.html").is_file());

    let raw = std::fs::read_to_string(tmp.path().join("dist/manifest.json")).unwrap();
    let manifest: Manifest = serde_json::from_str(&raw).unwrap();
    assert_eq!(manifest.entries.len(), 4);
}

#[test]
fn cli_page_refuses_content_root_as_output() {
    let tmp = fixture_copy();
    let status = seqhub()
        .arg("--source")
        .arg(tmp.path())
        .arg("manifest")
        .status()
        .unwrap();
    assert!(status.success());

    let output = seqhub()
        .arg("--source")
        .arg(tmp.path())
        .args(["page", "--output"])
        .arg(tmp.path().join("packages"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR:"));
    assert!(tmp.path().join("packages/relax/r/ruanklein/focus.spsq").is_file());
}
