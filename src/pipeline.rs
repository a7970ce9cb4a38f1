//! End-to-end processing of one report submission.
//!
//! Runs synchronously from normalized markdown to the git push:
//! normalize → classify + extract → mirrored archive write → manifest
//! load/upsert/write → publish. The sequence is not transactional; each
//! file write is individually atomic, and a failure partway leaves the
//! completed steps in place for the next run to reconcile (the manifest
//! loader tolerates whatever it finds).

use anyhow::{bail, Result};
use tracing::info;

use crate::archive;
use crate::classify::classify;
use crate::config::Config;
use crate::extract::extract_title_summary;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::models::{ArchiveDate, Category};
use crate::normalize::normalize_spacing;
use crate::publish::{self, Published};

/// What one pipeline invocation produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub category: Category,
    pub date: ArchiveDate,
    /// Archive path relative to the content roots.
    pub rel_path: String,
    pub title: String,
    pub published: Published,
}

/// Process one submission to completion. Blocking; call from a worker.
///
/// Filesystem and publish errors propagate to the caller, which logs them —
/// the submitter was already acknowledged and there is no retry.
pub fn process_report(config: &Config, content: &str) -> Result<PipelineOutcome> {
    if content.trim().is_empty() {
        bail!("refusing to archive empty content");
    }
    let repo_root = &config.repo.path;
    if !repo_root.is_dir() {
        bail!(
            "repository directory does not exist: {}",
            repo_root.display()
        );
    }

    let markdown = normalize_spacing(content);
    let category = classify(&markdown);
    let (title, summary) = extract_title_summary(&markdown);
    let date = ArchiveDate::today(config.archive.timezone());

    let rel_path = archive::relative_path(category, &date);
    archive::write_mirrored(repo_root, &rel_path, &markdown)?;
    info!(category = %category, path = %rel_path, "archived report");

    let mut manifest = Manifest::load_or_init(repo_root, &config.site);
    manifest.upsert(category, &date, &title, &summary);
    archive::write_mirrored(repo_root, MANIFEST_FILE, &manifest.to_json_pretty()?)?;
    info!("manifest updated");

    let message = publish::commit_message(category.tag(), &date.to_string());
    let published = publish::commit_and_push(&config.repo, &message)?;

    Ok(PipelineOutcome {
        category,
        date,
        rel_path,
        title,
        published,
    })
}
