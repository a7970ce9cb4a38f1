//! # Report Archiver CLI (`archiver`)
//!
//! ```bash
//! archiver --config ./archiver.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `archiver serve` | Run the webhook server |
//! | `archiver ingest <file>` | Archive one local markdown file |
//! | `archiver init` | Create the default manifest in the repository |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use report_archiver::{archive, config, manifest, pipeline, publish, server};

/// Report Archiver — archive webhook-submitted markdown daily reports into
/// a git-backed static site.
#[derive(Parser)]
#[command(
    name = "archiver",
    about = "Archive webhook-submitted markdown daily reports into a git-backed static site",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./archiver.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server.
    ///
    /// Listens on `[server].bind` for `POST /webhook` submissions and
    /// processes them one at a time on a background worker.
    Serve,

    /// Archive a local markdown file through the full pipeline.
    ///
    /// Runs exactly what a webhook submission would: normalize, classify,
    /// archive, index, commit, push. Useful for backfilling a missed day.
    Ingest {
        /// Path to the markdown report.
        file: PathBuf,
    },

    /// Create the default manifest in the repository if none exists.
    ///
    /// Idempotent — an existing manifest is left untouched.
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Ingest { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read report: {}", file.display()))?;
            let outcome = tokio::task::spawn_blocking(move || {
                pipeline::process_report(&cfg, &content)
            })
            .await??;
            println!("archived {} ({})", outcome.rel_path, outcome.title);
            match outcome.published {
                publish::Published::Pushed => println!("pushed"),
                publish::Published::Committed => println!("committed (push disabled)"),
                publish::Published::NoChanges => println!("no changes, nothing committed"),
            }
        }
        Commands::Init => {
            let repo_root = &cfg.repo.path;
            let canonical = repo_root.join(manifest::MANIFEST_FILE);
            if canonical.is_file() {
                println!("manifest already exists: {}", canonical.display());
            } else {
                let m = manifest::Manifest::new(&cfg.site);
                archive::write_mirrored(repo_root, manifest::MANIFEST_FILE, &m.to_json_pretty()?)?;
                println!("manifest initialized: {}", canonical.display());
            }
        }
    }

    Ok(())
}
