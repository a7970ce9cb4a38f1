//! End-to-end pipeline tests against a real temporary git repository with a
//! local bare `origin`. Requires `git` on PATH, like the service itself.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use chrono::FixedOffset;
use report_archiver::config::Config;
use report_archiver::models::ArchiveDate;
use report_archiver::pipeline::process_report;
use report_archiver::publish::Published;

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git; is it installed?");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A working clone with one initial commit and a local bare `origin`
/// whose `main` branch it can push to.
fn setup_repo() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();

    let remote = tmp.path().join("remote.git");
    std::fs::create_dir(&remote).unwrap();
    git(&remote, &["init", "--bare"]);
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    let work = tmp.path().join("site");
    std::fs::create_dir(&work).unwrap();
    git(&work, &["init"]);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&work, &["config", "user.email", "archiver@test"]);
    git(&work, &["config", "user.name", "archiver"]);
    git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

    std::fs::write(work.join("README.md"), "# site\n").unwrap();
    git(&work, &["add", "."]);
    git(&work, &["commit", "-m", "initial"]);
    git(&work, &["push", "origin", "main"]);

    (tmp, work)
}

fn head_subject(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["log", "-1", "--format=%s"])
        .current_dir(dir)
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn today() -> ArchiveDate {
    ArchiveDate::today(FixedOffset::east_opt(8 * 3600).unwrap())
}

#[test]
fn test_first_submission_archives_and_pushes() {
    let (_tmp, work) = setup_repo();
    let cfg = Config::for_repo(&work);

    let outcome = process_report(&cfg, "# Hello\nWorld").unwrap();
    assert_eq!(outcome.published, Published::Pushed);
    assert_eq!(outcome.title, "Hello");

    let date = today();
    let rel = format!("ai/{:04}/{:02}/{:02}.md", date.year, date.month, date.day);
    assert_eq!(outcome.rel_path, rel);

    // Normalized markdown, mirrored byte-identically.
    let canonical = std::fs::read_to_string(work.join(&rel)).unwrap();
    assert_eq!(canonical, "# Hello\n\nWorld\n");
    let mirror = std::fs::read_to_string(work.join("public").join(&rel)).unwrap();
    assert_eq!(canonical, mirror);

    // Manifest entry at both roots.
    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(work.join("manifest.json")).unwrap())
            .unwrap();
    let entry = &manifest["months"]["ai"][date.month_key().as_str()][0];
    assert_eq!(entry["title"], "Hello");
    assert_eq!(entry["summary"], "Hello World");
    assert_eq!(entry["tags"], serde_json::json!(["AI", "Daily"]));
    assert_eq!(entry["url"], rel.as_str());
    assert!(work.join("public/manifest.json").is_file());

    // Commit message template, and the push actually landed on the remote.
    let expected = format!("docs(content): Update AI daily report for {}", date);
    assert_eq!(head_subject(&work), expected);
}

#[test]
fn test_identical_resubmission_hits_no_diff_short_circuit() {
    let (_tmp, work) = setup_repo();
    let cfg = Config::for_repo(&work);

    let first = process_report(&cfg, "# Daily\n\nNothing new.").unwrap();
    assert_eq!(first.published, Published::Pushed);

    let second = process_report(&cfg, "# Daily\n\nNothing new.").unwrap();
    assert_eq!(second.published, Published::NoChanges);
}

#[test]
fn test_same_day_resubmission_overrides_manifest_entry() {
    let (_tmp, work) = setup_repo();
    let cfg = Config::for_repo(&work);

    process_report(&cfg, "# First take\n\nbody one").unwrap();
    process_report(&cfg, "# Second take\n\nbody two").unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(work.join("manifest.json")).unwrap())
            .unwrap();
    let bucket = manifest["months"]["ai"][today().month_key().as_str()].as_array().unwrap();
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0]["title"], "Second take");
}

#[test]
fn test_game_report_lands_in_game_category() {
    let (_tmp, work) = setup_repo();
    let cfg = Config::for_repo(&work);

    let outcome = process_report(&cfg, "# 游戏行业速递\n\n要闻").unwrap();
    let date = today();
    assert_eq!(
        outcome.rel_path,
        format!("game/{:04}/{:02}/{:02}.md", date.year, date.month, date.day)
    );
    assert_eq!(
        head_subject(&work),
        format!("docs(content): Update GAME daily report for {}", date)
    );
}

#[test]
fn test_push_disabled_stops_at_commit() {
    let (_tmp, work) = setup_repo();
    let mut cfg = Config::for_repo(&work);
    cfg.repo.push = false;

    let outcome = process_report(&cfg, "# Offline\n\nbody").unwrap();
    assert_eq!(outcome.published, Published::Committed);
}

#[test]
fn test_push_failure_is_an_error_but_files_remain() {
    let (_tmp, work) = setup_repo();
    let mut cfg = Config::for_repo(&work);
    cfg.repo.remote = "nonexistent-remote".to_string();

    let err = process_report(&cfg, "# Doomed\n\nbody").unwrap_err();
    assert!(err.to_string().contains("git push"), "got: {err:#}");

    // No rollback: the archive and manifest writes stay in place.
    let date = today();
    let rel = format!("ai/{:04}/{:02}/{:02}.md", date.year, date.month, date.day);
    assert!(work.join(rel).is_file());
    assert!(work.join("manifest.json").is_file());
}

#[test]
fn test_missing_repo_directory_is_rejected() {
    let cfg = Config::for_repo(Path::new("/nonexistent/daily-site"));
    assert!(process_report(&cfg, "# Hello").is_err());
}

#[test]
fn test_blank_content_is_rejected() {
    let (_tmp, work) = setup_repo();
    let cfg = Config::for_repo(&work);
    assert!(process_report(&cfg, "   \n  ").is_err());
}
