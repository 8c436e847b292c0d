//! End-to-end runs of the `fireside` binary against a temporary database

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn fireside(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fireside").expect("binary built");
    cmd.env("FIRESIDE_TEST_MODE", "1")
        .env_remove("FIRESIDE_DB_PATH")
        .env_remove("FIRESIDE_LOG_LEVEL")
        .arg("--db-path")
        .arg(db);
    cmd
}

fn json(db: &Path, args: &[&str]) -> Value {
    let output = fireside(db)
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("run fireside");
    assert!(
        output.status.success(),
        "fireside {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn tag_count(db: &Path, name: &str) -> u64 {
    json(db, &["tags", "show", name])["referenceCount"]
        .as_u64()
        .expect("count")
}

#[test]
fn test_seed_then_list_tags() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("fireside.db");

    fireside(&db)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seed complete"));

    fireside(&db)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));

    let tags = json(&db, &["tags", "list", "--sort", "count"]);
    let tags = tags.as_array().unwrap();
    assert_eq!(tags.len(), 11);
    assert_eq!(tags[0]["name"], "Soul");
    assert_eq!(tags[0]["referenceCount"], 2);
}

#[test]
fn test_snippet_tag_lifecycle() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("fireside.db");

    let family = json(&db, &["family", "add", "--uid", "f", "--name", "General", "-d", "Intro"]);
    let fireside_id = json(
        &db,
        &[
            "fireside", "add", "--family", family["id"].as_str().unwrap(), "--name", "Why Life?",
            "-d", "Purpose", "--date", "2024-01-15",
        ],
    )["id"]
        .as_str()
        .unwrap()
        .to_string();

    let snippet = json(
        &db,
        &[
            "snippet", "add", "--fireside", &fireside_id, "--name", "Purpose", "--text", "# Why",
            "-t", "Purpose:10:1", "-t", "purpose:3",
        ],
    );
    let snippet_id = snippet["id"].as_str().unwrap().to_string();
    assert_eq!(snippet["tags"].as_array().unwrap().len(), 1);
    assert_eq!(snippet["tags"][0]["weight"], 10);
    assert_eq!(tag_count(&db, "PURPOSE"), 1);

    // Editing text alone keeps the tags and the count
    json(&db, &["snippet", "edit", &snippet_id, "--text", "# Why, revised"]);
    assert_eq!(tag_count(&db, "Purpose"), 1);

    json(&db, &["snippet", "edit", &snippet_id, "-t", "Creation"]);
    assert_eq!(tag_count(&db, "Purpose"), 0);
    assert_eq!(tag_count(&db, "Creation"), 1);

    json(&db, &["snippet", "delete", &snippet_id]);
    assert_eq!(tag_count(&db, "Creation"), 0);
}

#[test]
fn test_validation_error_is_user_facing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("fireside.db");

    let family = json(&db, &["family", "add", "--uid", "f", "--name", "General", "-d", "Intro"]);
    let created = json(
        &db,
        &["fireside", "add", "--family", family["id"].as_str().unwrap(), "--name", "F", "-d", "D"],
    );

    fireside(&db)
        .args([
            "snippet", "add", "--fireside", created["id"].as_str().unwrap(), "--name", "S",
            "--text", "t", "-t", "Soul:42",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight must be between 1 and 10"));

    let tags = json(&db, &["tags", "list"]);
    assert!(tags.as_array().unwrap().is_empty());
}

#[test]
fn test_missing_snippet_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("fireside.db");

    fireside(&db)
        .args(["snippet", "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no longer exists"));
}

#[test]
fn test_outline_composition() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("fireside.db");
    json(&db, &["seed"]);

    let snippets = json(&db, &["snippet", "list", "--search", "soul"]);
    let snippet_id = snippets[0]["id"].as_str().unwrap().to_string();

    let outline = json(&db, &["outline", "create", "--user", "u1", "--title", "Study", "--public"]);
    let outline_id = outline["id"].as_str().unwrap().to_string();

    let parent = json(
        &db,
        &["outline", "add-item", &outline_id, "--kind", "snippet", "--ref", &snippet_id],
    )["itemId"]
        .as_str()
        .unwrap()
        .to_string();
    json(
        &db,
        &[
            "outline", "add-item", &outline_id, "--kind", "snippet", "--ref", &snippet_id,
            "--parent", &parent,
        ],
    );

    let toggled = json(&db, &["outline", "toggle", &outline_id, &parent]);
    assert_eq!(toggled["isVisible"], false);

    let public = json(&db, &["outline", "list", "--public"]);
    assert_eq!(public[0]["items"][0]["children"].as_array().unwrap().len(), 1);

    fireside(&db)
        .args([
            "outline", "add-item", outline_id.as_str(), "--kind", "deepening", "--ref", "missing",
        ])
        .assert()
        .failure();
}

#[test]
fn test_config_show_reflects_db_override() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("custom.db");

    fireside(&db)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.db"));
    assert!(!db.exists());
}
