//! Report classification.
//!
//! A submission is a game-industry report if it carries either the 🎮 glyph
//! or the literal column header `游戏行业速递` anywhere in its text; everything
//! else is an AI report. The match is a plain substring check — deterministic,
//! total, and position-insensitive.

use crate::models::Category;

/// Game-report markers. Either one anywhere in the content wins.
const GAME_GLYPH: &str = "🎮";
const GAME_PHRASE: &str = "游戏行业速递";

/// Classify report content into a category. Never fails.
pub fn classify(content: &str) -> Category {
    if content.contains(GAME_GLYPH) || content.contains(GAME_PHRASE) {
        Category::Game
    } else {
        Category::Ai
    }
}
