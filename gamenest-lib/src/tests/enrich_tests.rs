use super::*;

use std::fs;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use gamenest_core::GameMetadata;
use tempfile::TempDir;

fn job_for(dir: &Path, id: u32) -> EnrichmentJob {
    EnrichmentJob::new(GameId::custom(id).unwrap(), dir)
}

#[derive(Default)]
struct CountingHook {
    seen: Mutex<Vec<u32>>,
}

impl EnrichmentHook for CountingHook {
    fn name(&self) -> &'static str {
        "count"
    }

    fn run(&self, job: &EnrichmentJob) -> Result<(), EnrichError> {
        self.seen.lock().unwrap().push(job.game_id.numeric());
        Ok(())
    }
}

struct FailingHook;

impl EnrichmentHook for FailingHook {
    fn name(&self) -> &'static str {
        "fail"
    }

    fn run(&self, _job: &EnrichmentJob) -> Result<(), EnrichError> {
        Err(EnrichError::collaborator("test", "always fails"))
    }
}

struct PanickingHook;

impl EnrichmentHook for PanickingHook {
    fn name(&self) -> &'static str {
        "panic"
    }

    fn run(&self, _job: &EnrichmentJob) -> Result<(), EnrichError> {
        panic!("hook exploded");
    }
}

#[derive(Default)]
struct FakeArtwork {
    calls: AtomicUsize,
    release_date: Option<i64>,
}

impl ArtworkFetcher for FakeArtwork {
    fn fetch_artwork(&self, _name: &str, _folder: &Path) -> Result<Option<i64>, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.release_date)
    }
}

struct WritingExtractor;

impl IconExtractor for WritingExtractor {
    fn extract_icon(&self, _exe: &Path, out: &Path) -> Result<bool, EnrichError> {
        fs::write(out, b"ico")?;
        Ok(true)
    }
}

#[test]
fn job_is_named_after_its_folder() {
    let job = job_for(Path::new("/games/Celeste"), 3);
    assert_eq!(job.display_name, "Celeste");
}

#[tokio::test]
async fn every_job_passes_through_every_hook_despite_failures() {
    let counter = Arc::new(CountingHook::default());
    let hooks: Vec<Arc<dyn EnrichmentHook>> = vec![
        Arc::new(FailingHook),
        Arc::new(PanickingHook),
        counter.clone(),
    ];
    let pool = EnrichmentPool::start(2, hooks, &Handle::current());

    for id in 1..=5 {
        assert!(pool.submit(job_for(Path::new("/nowhere"), id)));
    }
    pool.finish().await;

    let mut seen = counter.seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[test]
fn icon_hook_extracts_once() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Game.exe"), b"MZ").unwrap();
    let hook = IconHook::new(Arc::new(WritingExtractor));
    let job = job_for(dir.path(), 1);

    hook.run(&job).unwrap();
    assert!(dir.path().join("Game.extracted.ico").is_file());
    // Root already holds an extracted icon; nothing else to do.
    hook.run(&job).unwrap();
}

#[test]
fn icon_hook_ignores_ambiguous_folders() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.exe"), b"MZ").unwrap();
    fs::write(dir.path().join("b.exe"), b"MZ").unwrap();
    IconHook::new(Arc::new(WritingExtractor))
        .run(&job_for(dir.path(), 1))
        .unwrap();
    assert!(!icons::has_extracted_icon(dir.path()));
}

#[test]
fn artwork_hook_records_fetch_and_release_date() {
    let dir = TempDir::new().unwrap();
    let store = SidecarStore::new();
    store.write(dir.path(), &GameMetadata::new(12));
    let fetcher = Arc::new(FakeArtwork {
        release_date: Some(1_600_000_000),
        ..Default::default()
    });
    let hook = ArtworkHook::new(fetcher.clone(), store.clone());

    hook.run(&job_for(dir.path(), 12)).unwrap();
    assert_eq!(
        store.read(dir.path()),
        Some(
            GameMetadata::new(12)
                .with_steam_grid_fetched(true)
                .with_release_date(Some(1_600_000_000))
        )
    );

    hook.run(&job_for(dir.path(), 12)).unwrap();
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn artwork_hook_ignores_non_positive_release_dates() {
    let dir = TempDir::new().unwrap();
    let store = SidecarStore::new();
    let fetcher = Arc::new(FakeArtwork {
        release_date: Some(0),
        ..Default::default()
    });
    ArtworkHook::new(fetcher, store.clone())
        .run(&job_for(dir.path(), 4))
        .unwrap();
    assert_eq!(
        store.read(dir.path()),
        Some(GameMetadata::new(4).with_steam_grid_fetched(true))
    );
}

#[test]
fn standard_hooks_include_artwork_only_when_configured() {
    let extractor: Arc<dyn IconExtractor> = Arc::new(WritingExtractor);
    let names = |hooks: Vec<Arc<dyn EnrichmentHook>>| {
        hooks.iter().map(|h| h.name()).collect::<Vec<_>>()
    };
    assert_eq!(
        names(standard_hooks(extractor.clone(), None, SidecarStore::new())),
        vec!["icon"]
    );
    let fetcher: Arc<dyn ArtworkFetcher> = Arc::new(FakeArtwork::default());
    assert_eq!(
        names(standard_hooks(extractor, Some(fetcher), SidecarStore::new())),
        vec!["icon", "artwork"]
    );
}

#[tokio::test]
async fn submit_after_close_is_rejected() {
    let pool = EnrichmentPool::start(1, Vec::new(), &Handle::current());
    pool.work_tx.close();
    assert!(!pool.submit(job_for(Path::new("/x"), 1)));
    pool.finish().await;
}
