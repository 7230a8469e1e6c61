//! `chapterdl download` – run a series through discovery, download and packaging.

use anyhow::Result;
use chapterdl_core::config::ChapterDlConfig;
use chapterdl_core::control::StopToken;
use chapterdl_core::discovery::ManifestDiscovery;
use chapterdl_core::model::ProgressSnapshot;
use chapterdl_core::orchestrator::{ChapterSelection, SeriesOrchestrator};
use std::path::Path;
use std::time::Instant;

const PROGRESS_INTERVAL_MS: u64 = 500;

/// What a Ctrl-C does: the first asks for a graceful stop, the next one quits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Graceful,
    Force,
}

fn on_interrupt(stop: &StopToken) -> Interrupt {
    if stop.is_stop_requested() {
        return Interrupt::Force;
    }
    stop.request_stop();
    Interrupt::Graceful
}

pub async fn run_download(cfg: ChapterDlConfig, manifest: &Path, selection: ChapterSelection) -> Result<()> {
    let discovery = ManifestDiscovery::load(manifest)?;

    let stop = StopToken::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&signal_stop) {
                Interrupt::Graceful => {
                    eprintln!("\nstop requested; finishing in-flight images (Ctrl-C again to quit now)...");
                    tracing::info!("stop requested by signal");
                }
                Interrupt::Force => {
                    eprintln!("\ninterrupted");
                    tracing::warn!("second interrupt; exiting without waiting for transfers");
                    std::process::exit(130);
                }
            }
        }
    });

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressSnapshot>(64);
    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(snap) = progress_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS || snap.is_finished() {
                let failed = if snap.failed > 0 {
                    format!("  {} failed", snap.failed)
                } else {
                    String::new()
                };
                println!(
                    "\r  {}: {} / {} images ({:.0}%){}  ",
                    snap.chapter,
                    snap.completed,
                    snap.total,
                    snap.fraction() * 100.0,
                    failed
                );
                last_print = now;
            }
        }
    });

    // The engine is blocking (curl + worker threads); keep it off the async workers.
    let summary = tokio::task::spawn_blocking(move || {
        let orchestrator = SeriesOrchestrator::from_config(&cfg, &discovery, stop);
        orchestrator.run(&selection, &progress_tx)
    })
    .await??;

    let _ = progress_handle.await;

    println!();
    print!("{}", summary);
    if !summary.is_success() {
        let failed = summary.chapters.len() - summary.succeeded().count();
        anyhow::bail!("{} chapter(s) did not complete", failed);
    }
    tracing::info!(series = %summary.series, chapters = summary.chapters.len(), "series complete");
    Ok(())
}
