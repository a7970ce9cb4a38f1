//! Atomic, mirrored file persistence for the content tree.
//!
//! Every artifact (report markdown, manifest) lives at two roots of the
//! repository working tree: the canonical root and its `public/` mirror,
//! which the static-site build serves. Each individual write is atomic
//! (temp file in the target directory, then rename); the pair of mirror
//! writes is not, so the mirrors can diverge in the narrow window between
//! them. The next successful run reconverges them.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::models::{ArchiveDate, Category};

/// Subdirectory of the repository mirrored for the static-site build.
pub const PUBLIC_ROOT: &str = "public";

/// Relative archive path for a report: `<category>/<YYYY>/<MM>/<DD>.md`.
pub fn relative_path(category: Category, date: &ArchiveDate) -> String {
    format!(
        "{}/{:04}/{:02}/{:02}.md",
        category.tag(),
        date.year,
        date.month,
        date.day
    )
}

/// Write `data` to `path` such that any observer sees either the complete
/// prior content or the complete new content, never a partial write.
///
/// The temp file is created in the target's own directory so the final
/// rename stays on one filesystem and is atomic.
pub fn atomic_write(path: &Path, data: &str) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
    tmp.write_all(data.as_bytes())
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace: {}", path.display()))?;
    Ok(())
}

/// Write `data` at `rel_path` under both the canonical root and the
/// `public/` mirror. After success the mirrors are byte-identical.
pub fn write_mirrored(repo_root: &Path, rel_path: &str, data: &str) -> Result<()> {
    atomic_write(&repo_root.join(rel_path), data)?;
    atomic_write(&repo_root.join(PUBLIC_ROOT).join(rel_path), data)?;
    Ok(())
}
