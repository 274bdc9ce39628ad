//! Background enrichment of discovered game folders.
//!
//! Spawns N persistent tokio tasks that pull [`EnrichmentJob`]s from an
//! unbounded async-channel, so [`EnrichmentPool::submit`] never blocks the
//! scan that produced the job. Every job is passed through each configured
//! [`EnrichmentHook`] in order.
//!
//! Hooks do filesystem and collaborator I/O, so each one runs on the
//! blocking pool under a hard safety timeout. Failures, panics and timeouts
//! are logged and dropped; a job never reports back to its submitter.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamenest_core::{GameId, MetadataPatch};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::error::EnrichError;
use crate::executables;
use crate::icons::{self, IconExtractor};
use crate::sidecar::SidecarStore;

/// Hard safety-net timeout per hook invocation. A hook that hangs beyond
/// this is abandoned and the worker moves on to the next one.
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(120);

/// One discovered folder to enrich.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentJob {
    pub game_id: GameId,
    pub folder: PathBuf,
    pub display_name: String,
}

impl EnrichmentJob {
    /// Job for `folder`, named after the folder itself.
    pub fn new(game_id: GameId, folder: &Path) -> Self {
        let display_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            game_id,
            folder: folder.to_path_buf(),
            display_name,
        }
    }
}

/// A best-effort step run for every job.
pub trait EnrichmentHook: Send + Sync + 'static {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn run(&self, job: &EnrichmentJob) -> Result<(), EnrichError>;
}

/// Extracts the unique executable's icon next to it.
///
/// Skipped when the folder root already holds an extracted icon.
pub struct IconHook {
    extractor: Arc<dyn IconExtractor>,
}

impl IconHook {
    pub fn new(extractor: Arc<dyn IconExtractor>) -> Self {
        Self { extractor }
    }
}

impl EnrichmentHook for IconHook {
    fn name(&self) -> &'static str {
        "icon"
    }

    fn run(&self, job: &EnrichmentJob) -> Result<(), EnrichError> {
        if icons::has_extracted_icon(&job.folder) {
            return Ok(());
        }
        let Some(rel) = executables::find_unique_executable(&job.folder) else {
            return Ok(());
        };
        let exe = executables::resolve_relative(&job.folder, &rel);
        if !exe.is_file() {
            return Ok(());
        }
        if icons::refresh_extracted_icon(&exe, self.extractor.as_ref())?.is_some() {
            log::debug!("Extracted icon for {} from {}", job.display_name, rel);
        }
        Ok(())
    }
}

/// Downloads artwork for a game and reports what it learned.
pub trait ArtworkFetcher: Send + Sync {
    /// Fetch artwork for the game called `name` into `folder`.
    ///
    /// Returns the release date (unix seconds) when the service knows it.
    fn fetch_artwork(&self, name: &str, folder: &Path) -> Result<Option<i64>, EnrichError>;
}

/// Fetches artwork once per folder and records the result in its sidecar.
pub struct ArtworkHook {
    fetcher: Arc<dyn ArtworkFetcher>,
    store: SidecarStore,
}

impl ArtworkHook {
    pub fn new(fetcher: Arc<dyn ArtworkFetcher>, store: SidecarStore) -> Self {
        Self { fetcher, store }
    }
}

impl EnrichmentHook for ArtworkHook {
    fn name(&self) -> &'static str {
        "artwork"
    }

    fn run(&self, job: &EnrichmentJob) -> Result<(), EnrichError> {
        if self
            .store
            .read(&job.folder)
            .is_some_and(|m| m.steam_grid_fetched)
        {
            return Ok(());
        }
        let release_date = self.fetcher.fetch_artwork(&job.display_name, &job.folder)?;

        let mut patch = MetadataPatch::default()
            .id(job.game_id.numeric())
            .steam_grid_fetched(true);
        if let Some(date) = release_date.filter(|d| *d > 0) {
            patch = patch.release_date(date);
        }
        self.store.update(&job.folder, patch);
        Ok(())
    }
}

/// The hooks a scan schedules: icons always, artwork when a fetcher is given.
pub fn standard_hooks(
    extractor: Arc<dyn IconExtractor>,
    artwork: Option<Arc<dyn ArtworkFetcher>>,
    store: SidecarStore,
) -> Vec<Arc<dyn EnrichmentHook>> {
    let mut hooks: Vec<Arc<dyn EnrichmentHook>> = vec![Arc::new(IconHook::new(extractor))];
    if let Some(fetcher) = artwork {
        hooks.push(Arc::new(ArtworkHook::new(fetcher, store)));
    }
    hooks
}

/// A pool of worker tasks running enrichment hooks.
///
/// ```ignore
/// let pool = EnrichmentPool::start(2, hooks, &Handle::current());
/// pool.submit(EnrichmentJob::new(id, &folder));
/// pool.finish().await;
/// ```
pub struct EnrichmentPool {
    work_tx: async_channel::Sender<EnrichmentJob>,
    handles: Vec<JoinHandle<()>>,
}

impl EnrichmentPool {
    /// Spawn `n` workers (at least one) on `runtime`.
    pub fn start(n: usize, hooks: Vec<Arc<dyn EnrichmentHook>>, runtime: &Handle) -> Self {
        Self::start_with_timeout(n, hooks, runtime, SAFETY_TIMEOUT)
    }

    /// Like [`start`](Self::start) with a custom per-hook timeout.
    pub fn start_with_timeout(
        n: usize,
        hooks: Vec<Arc<dyn EnrichmentHook>>,
        runtime: &Handle,
        timeout: Duration,
    ) -> Self {
        let (work_tx, work_rx) = async_channel::unbounded::<EnrichmentJob>();
        let hooks: Arc<[Arc<dyn EnrichmentHook>]> = hooks.into();

        // Each worker gets a cloned Receiver; no Mutex needed.
        let handles = (0..n.max(1))
            .map(|_| {
                let work_rx = work_rx.clone();
                let hooks = hooks.clone();
                runtime.spawn(async move {
                    while let Ok(job) = work_rx.recv().await {
                        let job = Arc::new(job);
                        for hook in hooks.iter() {
                            if let Err(e) = run_hook(hook.clone(), job.clone(), timeout).await {
                                log::warn!(
                                    "Enrichment hook '{}' failed for {}: {}",
                                    hook.name(),
                                    job.display_name,
                                    e
                                );
                            }
                        }
                    }
                    // Channel closed and drained -> worker exits
                })
            })
            .collect();

        Self { work_tx, handles }
    }

    /// Queue a job. Never blocks; returns `false` if the pool is shut down.
    pub fn submit(&self, job: EnrichmentJob) -> bool {
        match self.work_tx.try_send(job) {
            Ok(()) => true,
            Err(e) => {
                log::debug!(
                    "Enrichment pool closed, dropping job for {}",
                    e.into_inner().display_name
                );
                false
            }
        }
    }

    /// Jobs queued but not yet picked up by a worker.
    pub fn queued(&self) -> usize {
        self.work_tx.len()
    }

    /// Stop accepting jobs and wait for queued ones to finish.
    pub async fn finish(self) {
        self.work_tx.close();
        for handle in self.handles {
            if let Err(e) = handle.await {
                log::debug!("Enrichment worker ended abnormally: {}", e);
            }
        }
    }
}

async fn run_hook(
    hook: Arc<dyn EnrichmentHook>,
    job: Arc<EnrichmentJob>,
    timeout: Duration,
) -> Result<(), EnrichError> {
    let task = tokio::task::spawn_blocking(move || hook.run(&job));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(EnrichError::aborted(join_err.to_string())),
        Err(_) => Err(EnrichError::TimedOut(timeout)),
    }
}

#[cfg(test)]
#[path = "tests/enrich_tests.rs"]
mod tests;
