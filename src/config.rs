use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Hours east of UTC for the archive calendar. Reports archive on Beijing
/// time by default.
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub repo: RepoConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepoConfig {
    /// Local clone of the static-site repository.
    pub path: PathBuf,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Disable to stop at the local commit (offline operation, tests).
    #[serde(default = "default_push")]
    pub push: bool,
}

fn default_remote() -> String {
    "origin".to_string()
}
fn default_branch() -> String {
    "main".to_string()
}
fn default_push() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:9397".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    /// Static UTC offset of the archive calendar, in hours. There is no tz
    /// database lookup; DST-observing deployments get the standard offset.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            utc_offset_hours: default_utc_offset(),
        }
    }
}

fn default_utc_offset() -> i32 {
    DEFAULT_UTC_OFFSET_HOURS
}

impl ArchiveConfig {
    /// The archive timezone. Falls back to the default offset if the
    /// configured value is out of range (load_config rejects that case for
    /// file-based configs; this covers hand-built ones).
    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600).unwrap())
    }
}

/// Site metadata seeded into a freshly initialized manifest.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default = "default_site_description")]
    pub description: String,
    #[serde(default)]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            title: default_site_title(),
            description: default_site_description(),
            base_url: String::new(),
        }
    }
}

fn default_site_title() -> String {
    "AI / 游戏 日报".to_string()
}
fn default_site_description() -> String {
    "每天 10 分钟，跟上进展".to_string()
}

impl Config {
    /// Config for a given repository path with defaults everywhere else.
    /// Used by tests and one-shot CLI invocations.
    pub fn for_repo(path: &Path) -> Self {
        Config {
            repo: RepoConfig {
                path: path.to_path_buf(),
                remote: default_remote(),
                branch: default_branch(),
                push: default_push(),
            },
            server: ServerConfig::default(),
            archive: ArchiveConfig::default(),
            site: SiteConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.repo.path.as_os_str().is_empty() {
        anyhow::bail!("repo.path must not be empty");
    }
    if config.repo.remote.is_empty() || config.repo.branch.is_empty() {
        anyhow::bail!("repo.remote and repo.branch must not be empty");
    }
    if !(-23..=23).contains(&config.archive.utc_offset_hours) {
        anyhow::bail!(
            "archive.utc_offset_hours must be in [-23, 23], got {}",
            config.archive.utc_offset_hours
        );
    }

    Ok(config)
}
