use super::*;
use crate::fetch::Fetch;
use crate::model::{DownloadResult, FailureReason, ImageTask};
use crate::scheduler::NoopObserver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Discovery stand-in; records which chapters had their images requested.
struct StubDiscovery {
    chapters: Vec<(&'static str, Result<Vec<String>, &'static str>)>,
    asked: Mutex<Vec<String>>,
}

impl StubDiscovery {
    fn new(chapters: Vec<(&'static str, Result<Vec<String>, &'static str>)>) -> Self {
        Self {
            chapters,
            asked: Mutex::new(Vec::new()),
        }
    }
}

impl UrlDiscovery for StubDiscovery {
    fn series_title(&self) -> Result<String> {
        Ok("Stub Series".to_string())
    }

    fn chapters(&self) -> Result<Vec<ChapterId>> {
        Ok(self.chapters.iter().map(|(id, _)| ChapterId::new(*id)).collect())
    }

    fn images(&self, chapter: &ChapterId) -> Result<Vec<String>> {
        self.asked.lock().unwrap().push(chapter.label().to_string());
        let (_, urls) = self
            .chapters
            .iter()
            .find(|(id, _)| *id == chapter.label())
            .expect("known chapter");
        urls.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Writes the URL as file content; URLs containing "broken" always fail.
#[derive(Default)]
struct WritingFetcher {
    calls: AtomicUsize,
}

impl Fetch for WritingFetcher {
    fn fetch(&self, task: &ImageTask) -> DownloadResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if task.source_url.contains("broken") {
            return DownloadResult::failed(
                task.clone(),
                FailureReason::NetworkExhausted {
                    attempts: 3,
                    last_error: "HTTP 500".to_string(),
                },
                3,
            );
        }
        std::fs::write(&task.destination, task.source_url.as_bytes()).unwrap();
        DownloadResult::success(task.clone(), task.source_url.len() as u64, 1)
    }
}

fn urls(chapter: u32, n: u32) -> Result<Vec<String>, &'static str> {
    Ok((1..=n)
        .map(|i| format!("https://cdn.example.com/{}/{}.jpg", chapter, i))
        .collect())
}

fn orchestrator<'a>(
    discovery: &'a StubDiscovery,
    fetcher: Arc<WritingFetcher>,
    packager: Option<ChapterPackager>,
    out: &std::path::Path,
    stop: StopToken,
) -> SeriesOrchestrator<'a> {
    let scheduler = DownloadScheduler::new(fetcher, 2, stop);
    SeriesOrchestrator::new(discovery, scheduler, packager, out.to_path_buf())
}

#[test]
fn packages_every_selected_chapter() {
    let dir = tempfile::tempdir().unwrap();
    let discovery = StubDiscovery::new(vec![
        ("Chapter 1", urls(1, 2)),
        ("Chapter 2", urls(2, 3)),
        ("Chapter 3", urls(3, 1)),
    ]);
    let fetcher = Arc::new(WritingFetcher::default());
    let orch = orchestrator(
        &discovery,
        fetcher.clone(),
        Some(ChapterPackager::new(true)),
        dir.path(),
        StopToken::new(),
    );
    let summary = orch
        .run(&ChapterSelection::starting_at(2.0), &NoopObserver)
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.chapters.len(), 2);
    assert_eq!(*discovery.asked.lock().unwrap(), vec!["Chapter 2", "Chapter 3"]);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    let series = dir.path().join("Stub Series");
    assert!(series.join("Chapter_02.cbz").is_file());
    assert!(series.join("Chapter_03.cbz").is_file());
    assert!(!series.join("Chapter_02").exists());
    assert!(!series.join("Chapter_01").exists());
    assert!(summary.chapters.iter().all(|c| c.state == ChapterState::Done));
}

#[test]
fn failed_chapter_does_not_stop_the_series() {
    let dir = tempfile::tempdir().unwrap();
    let broken = Ok(vec![
        "https://cdn.example.com/1/1.jpg".to_string(),
        "https://cdn.example.com/broken/2.jpg".to_string(),
        "https://cdn.example.com/1/3.jpg".to_string(),
    ]);
    let discovery = StubDiscovery::new(vec![
        ("Chapter 1", broken),
        ("Chapter 2", Err("page not found")),
        ("Chapter 3", Ok(Vec::new())),
        ("Chapter 4", urls(4, 2)),
    ]);
    let orch = orchestrator(
        &discovery,
        Arc::new(WritingFetcher::default()),
        Some(ChapterPackager::new(true)),
        dir.path(),
        StopToken::new(),
    );
    let summary = orch.run(&ChapterSelection::all(), &NoopObserver).unwrap();
    assert!(!summary.is_success());

    let first = &summary.chapters[0];
    assert_eq!(first.state, ChapterState::DownloadFailedPartial);
    match &first.outcome {
        ChapterOutcome::DownloadFailedPartial { failed } => {
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].index, 2);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    let series = dir.path().join("Stub Series");
    assert!(!series.join("Chapter_01.cbz").exists());
    assert!(series.join("Chapter_01").join("0001.jpg").is_file());

    assert_eq!(summary.chapters[1].state, ChapterState::DiscoveryFailed);
    assert_eq!(summary.chapters[2].state, ChapterState::DiscoveryFailed);
    assert_eq!(summary.chapters[3].state, ChapterState::Done);
    assert_eq!(summary.partially_failed().count(), 1);
    assert_eq!(summary.succeeded().count(), 1);

    let text = summary.to_string();
    assert!(text.contains("partial Chapter 1"));
    assert!(text.contains("#2 https://cdn.example.com/broken/2.jpg"));
}

#[test]
fn existing_archive_skips_the_chapter() {
    let dir = tempfile::tempdir().unwrap();
    let series = dir.path().join("Stub Series");
    std::fs::create_dir_all(&series).unwrap();
    std::fs::write(series.join("Chapter_01.cbz"), b"old").unwrap();
    let discovery = StubDiscovery::new(vec![("Chapter 1", urls(1, 2))]);
    let fetcher = Arc::new(WritingFetcher::default());
    let orch = orchestrator(
        &discovery,
        fetcher.clone(),
        Some(ChapterPackager::new(false)),
        dir.path(),
        StopToken::new(),
    );
    let summary = orch.run(&ChapterSelection::all(), &NoopObserver).unwrap();
    assert!(matches!(
        summary.chapters[0].outcome,
        ChapterOutcome::AlreadyPackaged { .. }
    ));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert!(discovery.asked.lock().unwrap().is_empty());
}

#[test]
fn archiving_disabled_keeps_loose_images() {
    let dir = tempfile::tempdir().unwrap();
    let discovery = StubDiscovery::new(vec![("Chapter 5", urls(5, 2))]);
    let orch = orchestrator(
        &discovery,
        Arc::new(WritingFetcher::default()),
        None,
        dir.path(),
        StopToken::new(),
    );
    let summary = orch.run(&ChapterSelection::single(None), &NoopObserver).unwrap();
    let folder = dir.path().join("Stub Series").join("Chapter_05");
    match &summary.chapters[0].outcome {
        ChapterOutcome::Downloaded { folder: f, images } => {
            assert_eq!(f, &folder);
            assert_eq!(*images, 2);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(folder.join("0001.jpg").is_file());
    assert!(!dir.path().join("Stub Series").join("Chapter_05.cbz").exists());
}

#[test]
fn stop_request_leaves_chapters_not_started() {
    let dir = tempfile::tempdir().unwrap();
    let discovery = StubDiscovery::new(vec![("Chapter 1", urls(1, 1)), ("Chapter 2", urls(2, 1))]);
    let fetcher = Arc::new(WritingFetcher::default());
    let stop = StopToken::new();
    stop.request_stop();
    let orch = orchestrator(&discovery, fetcher.clone(), None, dir.path(), stop);
    let summary = orch.run(&ChapterSelection::all(), &NoopObserver).unwrap();
    assert_eq!(summary.chapters.len(), 2);
    assert!(summary
        .chapters
        .iter()
        .all(|c| matches!(c.outcome, ChapterOutcome::NotStarted)));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn from_config_respects_archive_toggle() {
    let discovery = StubDiscovery::new(Vec::new());
    let mut cfg = ChapterDlConfig::default();
    cfg.create_archive = false;
    let orch = SeriesOrchestrator::from_config(&cfg, &discovery, StopToken::new());
    assert!(orch.packager.is_none());
    assert_eq!(orch.scheduler.workers(), cfg.worker_pool_size);
}

#[test]
fn chapters_sharing_a_number_get_separate_archives() {
    let dir = tempfile::tempdir().unwrap();
    let discovery = StubDiscovery::new(vec![
        ("Vol. 1 Ch. 1", urls(1, 2)),
        ("Vol. 1 Ch. 2", urls(2, 2)),
        ("Chapter 3", urls(3, 1)),
    ]);
    let fetcher = Arc::new(WritingFetcher::default());
    let orch = orchestrator(
        &discovery,
        fetcher.clone(),
        Some(ChapterPackager::new(true)),
        dir.path(),
        StopToken::new(),
    );
    let summary = orch.run(&ChapterSelection::all(), &NoopObserver).unwrap();

    assert!(summary
        .chapters
        .iter()
        .all(|c| matches!(c.outcome, ChapterOutcome::Packaged { .. })));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 5);
    let series = dir.path().join("Stub Series");
    assert!(series.join("Chapter_Vol. 1 Ch. 1.cbz").is_file());
    assert!(series.join("Chapter_Vol. 1 Ch. 2.cbz").is_file());
    assert!(series.join("Chapter_03.cbz").is_file());
    assert!(!series.join("Chapter_01.cbz").exists());
}

#[test]
fn loose_images_of_same_numbered_chapters_do_not_mix() {
    let dir = tempfile::tempdir().unwrap();
    let discovery = StubDiscovery::new(vec![
        ("Chapter 100", urls(100, 1)),
        ("Chapter 100 (Raw)", urls(101, 1)),
    ]);
    let fetcher = Arc::new(WritingFetcher::default());
    let orch = orchestrator(&discovery, fetcher.clone(), None, dir.path(), StopToken::new());
    let summary = orch.run(&ChapterSelection::all(), &NoopObserver).unwrap();

    assert!(summary.is_success());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    let series = dir.path().join("Stub Series");
    let first = std::fs::read_to_string(series.join("Chapter_Chapter 100").join("0001.jpg")).unwrap();
    let second =
        std::fs::read_to_string(series.join("Chapter_Chapter 100 (Raw)").join("0001.jpg")).unwrap();
    assert_eq!(first, "https://cdn.example.com/100/1.jpg");
    assert_eq!(second, "https://cdn.example.com/101/1.jpg");
}
