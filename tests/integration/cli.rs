//! The `rpz-params` binary.

use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::{REMOTE_DOCUMENT, ok_response, rpz_params, serve};

#[test]
fn test_show_summary_offline() {
    let temp = TempDir::new().unwrap();
    rpz_params(temp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 1.1.0"))
        .stdout(predicate::str::contains("bundled (network disabled)"))
        .stdout(predicate::str::contains("docker_images"));
}

#[test]
fn test_show_section_is_json() {
    let temp = TempDir::new().unwrap();
    let output = rpz_params(temp.path()).args(["show", "busybox_url"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value["x86_64"],
        "https://s3.amazonaws.com/reprozip-files/busybox-x86_64"
    );
}

#[test]
fn test_show_unknown_section_fails_with_suggestion() {
    let temp = TempDir::new().unwrap();
    rpz_params(temp.path())
        .args(["show", "docker_image"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("docker_image"))
        .stderr(predicate::str::contains("docker_images"));
}

#[test]
fn test_sections_lists_names() {
    let temp = TempDir::new().unwrap();
    rpz_params(temp.path())
        .arg("sections")
        .assert()
        .success()
        .stdout("busybox_url\ndocker_images\nrpzsudo_url\nvagrant_boxes\nvagrant_boxes_x\n");
}

#[test]
fn test_resolve_image() {
    let temp = TempDir::new().unwrap();
    rpz_params(temp.path())
        .args(["resolve", "docker_images", "Ubuntu", "14.04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ubuntu:14.04"))
        .stdout(predicate::str::contains("Ubuntu 14.04 'Trusty'"));
}

#[test]
fn test_resolve_box_for_arch() {
    let temp = TempDir::new().unwrap();
    rpz_params(temp.path())
        .args(["resolve", "vagrant_boxes", "debian", "8", "--arch", "i686"])
        .assert()
        .success()
        .stdout("remram/debian-8-i386\n");
}

#[test]
fn test_resolve_json() {
    let temp = TempDir::new().unwrap();
    let output = rpz_params(temp.path())
        .args(["resolve", "docker_images", "gentoo", "1.0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["image"], "debian:jessie");
    assert_eq!(value["name"], "Debian 8 'Jessie'");
}

#[test]
fn test_url_command() {
    let temp = TempDir::new().unwrap();
    rpz_params(temp.path())
        .args(["url", "rpzsudo", "i686"])
        .assert()
        .success()
        .stdout("https://github.com/remram44/static-sudo/releases/download/current/rpzsudo-i686\n");

    rpz_params(temp.path())
        .args(["url", "busybox", "sparc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sparc"));
}

#[test]
fn test_cache_clear_and_path() {
    let temp = TempDir::new().unwrap();
    let cached = temp.path().join("cache").join("parameters.json");

    rpz_params(temp.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(cached.display().to_string()));

    std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
    std::fs::write(&cached, "{}").unwrap();

    rpz_params(temp.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!cached.exists());

    rpz_params(temp.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached parameters"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "fetch_timeout = \"soon\"\n").unwrap();

    rpz_params(temp.path())
        .arg("sections")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[tokio::test]
async fn test_show_remote_parameters() {
    let temp = TempDir::new().unwrap();
    let (base, _server) = serve(vec![ok_response(REMOTE_DOCUMENT)]).await;
    let home = temp.path().to_path_buf();
    let url = format!("{base}/parameters/");

    let assert = tokio::task::spawn_blocking(move || {
        rpz_params(&home)
            .env("REPROZIP_PARAMETERS", url)
            .arg("show")
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("Version: 1.1.7"))
        .stdout(predicate::str::contains("remote ("));
}
