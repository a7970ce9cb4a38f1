//! The publish transaction: stage → commit-if-changed → push.
//!
//! Git is an external black box invoked via `std::process::Command`; only
//! its exit codes are interpreted. A clean staged tree is a normal outcome,
//! not an error. Commit and push failures carry git's stderr and are left
//! to the caller to log — the submitter was acknowledged long before this
//! step runs, so there is nobody to surface them to.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::RepoConfig;

/// How far the publish transaction got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    /// Staged tree matched the last commit; nothing to do.
    NoChanges,
    /// Committed locally; push disabled by configuration.
    Committed,
    /// Committed and pushed to the remote branch.
    Pushed,
}

/// Commit message for one archived report, e.g.
/// `docs(content): Update GAME daily report for 2025-09-09`.
pub fn commit_message(category_tag: &str, date: &str) -> String {
    format!(
        "docs(content): Update {} daily report for {}",
        category_tag.to_uppercase(),
        date
    )
}

/// Run the publish transaction in the repository working tree.
pub fn commit_and_push(repo: &RepoConfig, message: &str) -> Result<Published> {
    // Registers the working tree as a trusted location so git does not
    // refuse with "dubious ownership" when the service runs under a
    // different user than the clone's owner. Idempotent; failure ignored.
    let _ = Command::new("git")
        .args(["config", "--global", "--add", "safe.directory"])
        .arg(&repo.path)
        .current_dir(&repo.path)
        .output();

    run_git(&repo.path, &["add", "."])?;

    let diff = Command::new("git")
        .args(["diff", "--cached", "--quiet"])
        .current_dir(&repo.path)
        .status()
        .with_context(|| "Failed to execute 'git diff'. Is git installed?")?;
    if diff.success() {
        info!("no staged changes, skipping commit");
        return Ok(Published::NoChanges);
    }

    run_git(&repo.path, &["commit", "-m", message])?;
    debug!(message, "committed");

    if !repo.push {
        return Ok(Published::Committed);
    }

    run_git(&repo.path, &["push", &repo.remote, &repo.branch])?;
    info!(remote = %repo.remote, branch = %repo.branch, "pushed");
    Ok(Published::Pushed)
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .with_context(|| format!("Failed to execute 'git {}'. Is git installed?", args[0]))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {} failed: {}", args[0], stderr.trim());
    }
    Ok(())
}
