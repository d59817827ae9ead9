use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn pinion_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pinion").unwrap();
    cmd.env("HOME", home).env_remove("PINION_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn publish(feed: &Path, package: &str, version: &str, manifest: &str) {
    let dir = feed.join(package);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{version}.toml")), manifest).unwrap();
}

#[test]
fn test_resolve_prints_selected_versions() {
    let tmp = TempDir::new().unwrap();
    let feed = tmp.path().join("feed");
    for version in ["1.0", "1.5", "1.9", "2.0"] {
        publish(&feed, "PackageX", version, "");
    }
    let reqs = tmp.path().join("pinion.toml");
    fs::write(&reqs, "[dependencies]\nPackageX = \">= 1.0 < 2.0\"\n").unwrap();

    pinion_cmd(tmp.path())
        .arg("resolve")
        .arg("--feed")
        .arg(&feed)
        .arg(&reqs)
        .assert()
        .success()
        .stdout("PackageX 1.9\n")
        .stderr(predicate::str::contains("Resolved"));
}

#[test]
fn test_resolve_conflict_exits_with_explanation() {
    let tmp = TempDir::new().unwrap();
    let feed = tmp.path().join("feed");
    publish(&feed, "PackageA", "1.0", "[dependencies]\nPackageC = \"== 1.0\"\n");
    publish(&feed, "PackageB", "1.0", "[dependencies]\nPackageC = \"== 2.0\"\n");
    publish(&feed, "PackageC", "1.0", "");
    publish(&feed, "PackageC", "2.0", "");
    let reqs = tmp.path().join("pinion.toml");
    fs::write(&reqs, "[dependencies]\nPackageA = \">= 1.0\"\nPackageB = \">= 1.0\"\n").unwrap();

    pinion_cmd(tmp.path())
        .arg("resolve")
        .arg("--feed")
        .arg(&feed)
        .arg(&reqs)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("PackageC == 2.0 (required by PackageB 1.0)"))
        .stderr(predicate::str::contains("Dependency resolution failed"));
}

#[test]
fn test_resolve_missing_feed_is_an_infrastructure_error() {
    let tmp = TempDir::new().unwrap();
    let reqs = tmp.path().join("pinion.toml");
    fs::write(&reqs, "[dependencies]\nanything = \"*\"\n").unwrap();

    pinion_cmd(tmp.path())
        .arg("resolve")
        .arg("--feed")
        .arg(tmp.path().join("no-such-feed"))
        .arg(&reqs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feed error"));
}

#[test]
fn test_resolve_bad_requirements_file() {
    let tmp = TempDir::new().unwrap();
    let reqs = tmp.path().join("pinion.toml");
    fs::write(&reqs, "[dependencies]\nbroken = \">= nope\"\n").unwrap();

    pinion_cmd(tmp.path())
        .arg("resolve")
        .arg("--feed")
        .arg(tmp.path())
        .arg(&reqs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest error"));
}

#[test]
fn test_resolve_populates_manifest_cache() {
    let tmp = TempDir::new().unwrap();
    let feed = tmp.path().join("feed");
    publish(&feed, "lib", "1.0", "");
    let reqs = tmp.path().join("pinion.toml");
    fs::write(&reqs, "[dependencies]\nlib = \"*\"\n").unwrap();

    pinion_cmd(tmp.path())
        .arg("resolve")
        .arg("--feed")
        .arg(&feed)
        .arg(&reqs)
        .assert()
        .success();

    let cached = tmp
        .path()
        .join(".pinion")
        .join("manifests")
        .join("lib")
        .join("1.0.0.json");
    assert!(cached.is_file());
}

#[test]
fn test_resolve_no_cache_leaves_store_empty() {
    let tmp = TempDir::new().unwrap();
    let feed = tmp.path().join("feed");
    publish(&feed, "lib", "1.0", "");
    let reqs = tmp.path().join("pinion.toml");
    fs::write(&reqs, "[dependencies]\nlib = \"*\"\n").unwrap();

    pinion_cmd(tmp.path())
        .arg("resolve")
        .arg("--no-cache")
        .arg("--feed")
        .arg(&feed)
        .arg(&reqs)
        .assert()
        .success()
        .stdout("lib 1.0\n");

    assert!(!tmp.path().join(".pinion").join("manifests").exists());
}
