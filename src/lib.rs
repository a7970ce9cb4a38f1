//! # Report Archiver
//!
//! A webhook service that archives markdown daily reports into a
//! git-backed static site.
//!
//! Submissions arrive on `POST /webhook` in any of several JSON wrappings
//! (or as raw markdown). Each accepted submission is normalized, classified
//! into a category, written atomically into the repository's content tree
//! (canonical root plus a `public/` mirror), indexed in `manifest.json`,
//! and published with a git commit and push.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────────────┐   ┌────────────┐
//! │  /webhook   │──▶│ normalize → classify/extract │──▶│  git repo  │
//! │ (ack + queue)│  │ archive → manifest → publish │   │ + public/  │
//! └─────────────┘   └──────────────────────────────┘   └────────────┘
//!                      one worker, one job at a time
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Categories and archive dates |
//! | [`payload`] | Body framing decode and content extraction |
//! | [`normalize`] | Markdown blank-line normalization |
//! | [`classify`] | Report classification |
//! | [`extract`] | Title and summary extraction |
//! | [`archive`] | Atomic, mirrored file writes |
//! | [`manifest`] | The JSON report index |
//! | [`publish`] | Stage → commit-if-changed → push |
//! | [`pipeline`] | End-to-end submission processing |
//! | [`server`] | Webhook HTTP endpoint and worker |

pub mod archive;
pub mod classify;
pub mod config;
pub mod extract;
pub mod manifest;
pub mod models;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod publish;
pub mod server;
