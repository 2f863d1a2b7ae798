use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn geosearch() -> Command {
    let mut cmd = Command::cargo_bin("geosearch").unwrap();
    cmd.env_remove("GEOSEARCH_CONFIG")
        .env_remove("GEOSEARCH_SOLR_ENDPOINT")
        .env_remove("GEOSEARCH_SOLR_INDEX");
    cmd
}

#[test]
fn fixes_extent_across_datum_border() {
    geosearch()
        .args(["extent", "fix", "-254.972,-76.59,261.299,89.293"])
        .assert()
        .success()
        .stdout("-180,-76.59,180,89.293\n");
}

#[test]
fn rejects_extent_with_three_components() {
    geosearch()
        .args(["extent", "shrink", "1,2,3"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Suggestion: Give the extent"));
}

#[test]
fn dry_run_prints_select_url() {
    let dir = tempfile::tempdir().unwrap();
    geosearch()
        .current_dir(dir.path())
        .args([
            "search",
            "--dry-run",
            "--only-maps",
            "--extent",
            "-3.44,40.848,22.641,57.576",
            "sachsen",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "http://localhost:8983/solr/maps/select?q=*%3A*&fq=geom%3A%22IsWithin%28",
        ))
        .stdout(predicate::str::contains("&fq=type%3Amap&fq=sachsen*&start=0&rows=10000"));
}

#[test]
fn config_file_changes_index() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".geosearch.toml"),
        "[index]\nendpoint = \"https://search.example.org/solr\"\nname = \"kartenforum\"\n",
    )
    .unwrap();

    geosearch()
        .current_dir(dir.path())
        .args(["search", "--dry-run", "--extent", "12,50,15,52", "--mode", "intersects"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "https://search.example.org/solr/kartenforum/select?q=*%3A*&fq=geom%3A%22Intersects%28",
        ));

    geosearch()
        .current_dir(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".geosearch.toml"));
}

#[test]
fn dry_run_keeps_terms_inside_their_parameter() {
    let dir = tempfile::tempdir().unwrap();
    geosearch()
        .current_dir(dir.path())
        .args(["search", "--dry-run", "--extent", "12,50,15,52", "C#", "a&rows=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("&fq=C%23*+AND+a%26rows%3D1*&start=0&rows=10000\n"));
}

#[test]
fn unreachable_index_is_an_index_error() {
    let dir = tempfile::tempdir().unwrap();
    geosearch()
        .current_dir(dir.path())
        .env("GEOSEARCH_SOLR_ENDPOINT", "http://127.0.0.1:9/solr")
        .args(["--metrics", "search", "--extent", "12,50,15,52"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Search failed"))
        .stderr(predicate::str::contains("\"counters\""));
}

#[test]
fn missing_config_file_is_a_config_error() {
    geosearch()
        .args(["--config", "/nonexistent/geosearch.toml", "config", "show"])
        .assert()
        .code(3);
}
