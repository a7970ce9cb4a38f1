//! The JSON index of all archived reports.
//!
//! The manifest is keyed by category and month and consumed by the
//! static-site frontend. It is loaded fresh from disk at the start of every
//! pipeline invocation, mutated only by [`Manifest::upsert`], and written
//! back through the atomic mirror writer. All maps are `BTreeMap`s so the
//! serialized form has stable key order and produces reviewable diffs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::archive;
use crate::config::SiteConfig;
use crate::models::{ArchiveDate, Category};

/// File name of the index, at the canonical root and under `public/`.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Constant tag appended to every entry.
const DAILY_TAG: &str = "Daily";

/// One archived report in a category/month bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Full date, `YYYY-MM-DD`.
    pub date: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    /// Archive path relative to the content root, e.g. `ai/2025/09/09.md`.
    pub url: String,
}

/// Site metadata block consumed by the frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "baseUrl", default)]
    pub base_url: String,
}

impl From<&SiteConfig> for SiteMeta {
    fn from(cfg: &SiteConfig) -> Self {
        SiteMeta {
            title: cfg.title.clone(),
            description: cfg.description.clone(),
            base_url: cfg.base_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub site: SiteMeta,
    /// Category tag → display label.
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    /// Category tag → `YYYY-MM` → entries, newest submission first.
    #[serde(default)]
    pub months: BTreeMap<String, BTreeMap<String, Vec<ManifestEntry>>>,
    /// Top-level fields this version does not know about are carried along
    /// rather than dropped on the next write.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Manifest {
    /// A fresh manifest seeded from the configured site metadata, with
    /// every known category present (and empty).
    pub fn new(site: &SiteConfig) -> Self {
        let mut manifest = Manifest {
            site: SiteMeta::from(site),
            ..Manifest::default()
        };
        manifest.ensure_categories(site);
        manifest
    }

    /// Load the manifest from the repository, or initialize a default one.
    ///
    /// The canonical root copy takes precedence over the `public/` mirror.
    /// A missing or unparseable file is recovered locally by substituting
    /// the default structure — this step never fails. Whatever is loaded is
    /// back-filled so both required categories exist.
    pub fn load_or_init(repo_root: &Path, site: &SiteConfig) -> Self {
        let candidates = [
            repo_root.join(MANIFEST_FILE),
            repo_root.join(archive::PUBLIC_ROOT).join(MANIFEST_FILE),
        ];
        let mut manifest = candidates
            .iter()
            .find(|p| p.is_file())
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|text| serde_json::from_str::<Manifest>(&text).ok())
            .unwrap_or_else(|| Manifest::new(site));
        manifest.ensure_categories(site);
        manifest
    }

    /// Back-fill the required category keys and site metadata. Older
    /// manifests carried only the `months` block.
    fn ensure_categories(&mut self, site: &SiteConfig) {
        for category in Category::ALL {
            self.months.entry(category.tag().to_string()).or_default();
            self.categories
                .entry(category.tag().to_string())
                .or_insert_with(|| category.display_name().to_string());
        }
        if self.site == SiteMeta::default() {
            self.site = SiteMeta::from(site);
        }
    }

    /// Insert-or-replace the entry for one category and date.
    ///
    /// Any existing entry with the same date is removed from its
    /// category/month bucket and the new entry goes in at position 0, so a
    /// same-day resubmission overrides the earlier one and the bucket stays
    /// ordered newest-submitted-first.
    pub fn upsert(&mut self, category: Category, date: &ArchiveDate, title: &str, summary: &str) {
        let date_str = date.to_string();
        let entry = ManifestEntry {
            date: date_str.clone(),
            title: title.to_string(),
            summary: summary.to_string(),
            tags: vec![category.label().to_string(), DAILY_TAG.to_string()],
            url: archive::relative_path(category, date),
        };

        let bucket = self
            .months
            .entry(category.tag().to_string())
            .or_default()
            .entry(date.month_key())
            .or_default();
        bucket.retain(|e| e.date != date_str);
        bucket.insert(0, entry);
    }

    /// Deterministic pretty JSON (all maps are ordered).
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
