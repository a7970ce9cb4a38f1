//! Core data types used throughout the archiving pipeline.

use chrono::{Datelike, FixedOffset, Utc};
use std::fmt;

/// Report category. Every submission lands in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ai,
    Game,
}

impl Category {
    /// All categories, in manifest key order.
    pub const ALL: [Category; 2] = [Category::Ai, Category::Game];

    /// Lowercase tag used in archive paths and manifest keys.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Ai => "ai",
            Category::Game => "game",
        }
    }

    /// Label used in manifest entry tags (alongside the constant `Daily`).
    pub fn label(&self) -> &'static str {
        match self {
            Category::Ai => "AI",
            Category::Game => "Game",
        }
    }

    /// Human-readable name shown in the site's category navigation.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Ai => "AI 日报",
            Category::Game => "游戏日报",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Calendar date in the archive timezone, used for archive paths,
/// manifest keys, and commit messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ArchiveDate {
    /// The current date in the given archive timezone.
    pub fn today(offset: FixedOffset) -> Self {
        let now = Utc::now().with_timezone(&offset);
        ArchiveDate {
            year: now.year(),
            month: now.month(),
            day: now.day(),
        }
    }

    /// Manifest month bucket key, e.g. `2025-09`.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for ArchiveDate {
    /// Full date, e.g. `2025-09-09`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_formatting_zero_pads() {
        let date = ArchiveDate {
            year: 2025,
            month: 9,
            day: 3,
        };
        assert_eq!(date.to_string(), "2025-09-03");
        assert_eq!(date.month_key(), "2025-09");
    }

    #[test]
    fn test_category_tags_and_labels() {
        assert_eq!(Category::Ai.tag(), "ai");
        assert_eq!(Category::Game.tag(), "game");
        assert_eq!(Category::Ai.label(), "AI");
        assert_eq!(Category::Game.label(), "Game");
    }
}
