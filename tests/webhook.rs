//! Webhook endpoint tests against a server bound to an ephemeral port.
//!
//! The 200 acknowledgment only means "accepted for processing"; the one
//! end-to-end test polls the repository for the archived file afterwards.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use report_archiver::config::Config;
use report_archiver::server;

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

fn setup_repo() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let work = tmp.path().join("site");
    std::fs::create_dir(&work).unwrap();
    git(&work, &["init"]);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&work, &["config", "user.email", "archiver@test"]);
    git(&work, &["config", "user.name", "archiver"]);
    std::fs::write(work.join("README.md"), "# site\n").unwrap();
    git(&work, &["add", "."]);
    git(&work, &["commit", "-m", "initial"]);
    (tmp, work)
}

/// Spawn the app on an ephemeral port; returns its base URL.
async fn spawn_server(cfg: Config) -> String {
    let app = server::app(Arc::new(cfg));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_submission_is_acknowledged_and_archived() {
    let (_tmp, work) = setup_repo();
    let mut cfg = Config::for_repo(&work);
    cfg.repo.push = false; // no remote in this test
    let base = spawn_server(cfg).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/webhook", base))
        .json(&serde_json::json!({ "content": "# Hello\nWorld" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    // The ack races the worker; poll for the archive to land.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        if work.join("manifest.json").is_file() {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "pipeline never archived the submission"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_unextractable_body_gets_400_with_preview() {
    let (_tmp, work) = setup_repo();
    let base = spawn_server(Config::for_repo(&work)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/webhook", base))
        .json(&serde_json::json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["preview"].as_str().unwrap().contains("content"));
}

#[tokio::test]
async fn test_empty_body_gets_400() {
    let (_tmp, work) = setup_repo();
    let base = spawn_server(Config::for_repo(&work)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/webhook", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (_tmp, work) = setup_repo();
    let base = spawn_server(Config::for_repo(&work)).await;

    let resp = reqwest::get(format!("{}/nope", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_tmp, work) = setup_repo();
    let base = spawn_server(Config::for_repo(&work)).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
