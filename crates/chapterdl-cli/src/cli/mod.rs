//! CLI for the chapterdl series downloader.

mod commands;

use anyhow::Result;
use chapterdl_core::config::{self, ChapterDlConfig};
use chapterdl_core::orchestrator::ChapterSelection;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_chapters, run_config, run_download};

/// Top-level CLI for chapterdl.
#[derive(Debug, Parser)]
#[command(name = "chapterdl")]
#[command(about = "chapterdl: polite, resumable chapter-by-chapter image downloader", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/chapterdl/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the chapters listed in a series manifest.
    Download(DownloadArgs),

    /// List the chapters in a series manifest without downloading.
    Chapters {
        /// Path to the series manifest (JSON).
        manifest: PathBuf,
    },

    /// Show the config file location and effective settings.
    Config,
}

/// Options for `chapterdl download`. Every flag overrides the matching config value.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Path to the series manifest (JSON).
    pub manifest: PathBuf,

    /// Root output folder (series folders are created inside it).
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Skip chapters numbered below N.
    #[arg(long, value_name = "N")]
    pub start: Option<f64>,

    /// Only download one chapter (the first one at or after --start).
    #[arg(long)]
    pub single: bool,

    /// Concurrent image downloads per chapter (1-10).
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Attempts per image, including the first.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Minimum seconds between any two requests.
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Keep loose images; do not build .cbz archives.
    #[arg(long)]
    pub no_archive: bool,

    /// Delete each chapter folder after its archive is verified.
    #[arg(long)]
    pub cleanup: bool,
}

impl DownloadArgs {
    /// Chapter selection from `--start` / `--single`.
    pub fn selection(&self) -> ChapterSelection {
        match (self.single, self.start) {
            (true, start) => ChapterSelection::single(start),
            (false, Some(start)) => ChapterSelection::starting_at(start),
            (false, None) => ChapterSelection::all(),
        }
    }

    /// Applies command-line overrides on top of `cfg` and re-validates.
    pub fn apply_to(&self, cfg: &mut ChapterDlConfig) -> Result<()> {
        if let Some(output) = &self.output {
            cfg.output_folder = output.clone();
        }
        if let Some(workers) = self.workers {
            cfg.worker_pool_size = workers;
        }
        if let Some(retries) = self.retries {
            let mut retry = cfg.retry_config();
            retry.retry_count = retries;
            cfg.retry = Some(retry);
        }
        if let Some(delay) = self.delay {
            cfg.delay_between_requests_secs = delay;
        }
        if self.no_archive {
            cfg.create_archive = false;
        }
        if self.cleanup {
            cfg.cleanup_after_packaging = true;
        }
        cfg.validate()
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = match &cli.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download(args) => {
                args.apply_to(&mut cfg)?;
                run_download(cfg, &args.manifest, args.selection()).await?;
            }
            CliCommand::Chapters { manifest } => run_chapters(&manifest)?,
            CliCommand::Config => run_config(cli.config.as_deref(), &cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
