//! Library scanner for custom game folders.
//!
//! Every configured root contributes its immediate subfolders; manually
//! registered folders are appended afterwards, each standing for exactly one
//! game. Roots are processed in the order given and manual folders strictly
//! after all roots, so when two folders end up with the same id the first
//! one wins.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamenest_core::util::matches_query;
use gamenest_core::{GameId, LibraryEntry, SourceKind};

use crate::discovery::DiscoveryCache;
use crate::enrich::{EnrichmentJob, EnrichmentPool};
use crate::executables;
use crate::icons::{self, IconExtractor};
use crate::identity::{IdentityAllocator, absolute_path};
use crate::settings::LibrarySettings;

/// Per-root tally reported by [`LibraryScanner::count_per_root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootCount {
    /// Number of matching subfolders (0 for a missing or empty root).
    Accessible(usize),
    /// The root exists but could not be listed.
    AccessDenied,
}

impl RootCount {
    /// Integer form used by settings screens: `-1` for access denied.
    pub fn sentinel(self) -> i64 {
        match self {
            RootCount::Accessible(n) => n as i64,
            RootCount::AccessDenied => -1,
        }
    }
}

/// Sorted subdirectories of `root`.
fn list_subdirectories(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Discovers custom games under the configured roots and manual folders.
pub struct LibraryScanner {
    roots: Vec<PathBuf>,
    manual_folders: Vec<PathBuf>,
    cache: Arc<DiscoveryCache>,
    allocator: IdentityAllocator,
    enrichment: Option<EnrichmentPool>,
}

impl LibraryScanner {
    pub fn new(roots: Vec<PathBuf>, manual_folders: Vec<PathBuf>, cache: Arc<DiscoveryCache>) -> Self {
        Self {
            roots,
            manual_folders,
            cache,
            allocator: IdentityAllocator::default(),
            enrichment: None,
        }
    }

    pub fn from_settings(settings: &LibrarySettings, cache: Arc<DiscoveryCache>) -> Self {
        Self::new(settings.roots.clone(), settings.manual_folders.clone(), cache)
    }

    pub fn with_allocator(mut self, allocator: IdentityAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Schedule background enrichment for every folder a scan yields.
    pub fn with_enrichment(mut self, pool: EnrichmentPool) -> Self {
        self.enrichment = Some(pool);
        self
    }

    /// Detach the enrichment pool, e.g. to wait for it before exiting.
    pub fn take_enrichment(&mut self) -> Option<EnrichmentPool> {
        self.enrichment.take()
    }

    /// Adopt new roots and manual folders and drop the cached index.
    pub fn reconfigure(&mut self, settings: &LibrarySettings) {
        self.roots = settings.roots.clone();
        self.manual_folders = settings.manual_folders.clone();
        self.cache.invalidate();
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn manual_folders(&self) -> &[PathBuf] {
        &self.manual_folders
    }

    pub fn cache(&self) -> &Arc<DiscoveryCache> {
        &self.cache
    }

    pub fn allocator(&self) -> &IdentityAllocator {
        &self.allocator
    }

    /// Scan roots then manual folders, optionally filtering folder names by
    /// a case-insensitive substring `query`.
    ///
    /// Each id appears at most once; a later folder resolving to an id
    /// already listed is skipped.
    pub fn scan(&self, query: Option<&str>) -> Vec<LibraryEntry> {
        // Warm the index so incremental adds below land in a memoized map.
        self.cache
            .get_or_rebuild(&self.roots, &self.manual_folders, &self.allocator);

        let mut entries = Vec::new();
        let mut listed: HashSet<u32> = HashSet::new();

        for root in &self.roots {
            let children = match list_subdirectories(root) {
                Ok(children) => children,
                Err(e) => {
                    log::warn!("Skipping root {}: {}", root.display(), e);
                    continue;
                }
            };
            log::debug!("Found {} subfolders in {}", children.len(), root.display());
            for folder in children {
                if !matches_query(&folder_name(&folder), query) {
                    continue;
                }
                if !executables::is_game_folder(&folder) {
                    log::debug!("{} has no launchable executable", folder.display());
                    continue;
                }
                self.add_if_new(&folder, &mut listed, &mut entries);
            }
        }

        for folder in &self.manual_folders {
            if !matches_query(&folder_name(folder), query) {
                continue;
            }
            if !folder.is_dir() || !executables::is_game_folder(folder) {
                log::warn!("Manual folder is not a game folder: {}", folder.display());
                continue;
            }
            self.add_if_new(folder, &mut listed, &mut entries);
        }

        log::debug!("Scan found {} custom games", entries.len());
        entries
    }

    fn add_if_new(&self, folder: &Path, listed: &mut HashSet<u32>, entries: &mut Vec<LibraryEntry>) {
        let folder = absolute_path(folder);
        let id = self.identify(&folder, listed);
        if !listed.insert(id) {
            log::debug!("{} duplicates id {}, skipping", folder.display(), id);
            return;
        }
        if let Some(entry) = self.record(&folder, id) {
            entries.push(entry);
        }
    }

    /// Stored id for `folder`, or a new one avoiding every id in use by
    /// other folders.
    fn identify(&self, folder: &Path, listed: &HashSet<u32>) -> u32 {
        self.allocator.get_or_assign(folder, || {
            let mut known = self.cache.ids_excluding(folder);
            known.extend(listed.iter().copied());
            known
        })
    }

    /// Index `folder` under `id`, schedule its enrichment, and build its entry.
    fn record(&self, folder: &Path, id: u32) -> Option<LibraryEntry> {
        let game_id = GameId::custom(id)?;
        self.cache.add_entry(id, folder);
        if let Some(pool) = &self.enrichment {
            pool.submit(EnrichmentJob::new(game_id, folder));
        }
        Some(LibraryEntry::discovered(game_id, folder))
    }

    /// Validate a single folder as a game and return its entry.
    ///
    /// Used when registering a manual folder; the folder is identified,
    /// indexed and enriched exactly as during a scan.
    pub fn entry_for_folder(&self, folder: &Path) -> Option<LibraryEntry> {
        if !folder.is_dir() {
            log::warn!("Folder does not exist or is not a directory: {}", folder.display());
            return None;
        }
        if !executables::is_game_folder(folder) {
            log::warn!("Folder has no launchable executable: {}", folder.display());
            return None;
        }
        // Known ids come from the index, so it must be warm before allocating.
        self.cache
            .get_or_rebuild(&self.roots, &self.manual_folders, &self.allocator);
        let folder = absolute_path(folder);
        let id = self.identify(&folder, &HashSet::new());
        self.record(&folder, id)
    }

    /// Subfolders per root matching `query`, in root order.
    ///
    /// Subfolders are not checked for executables.
    pub fn count_per_root(&self, query: Option<&str>) -> Vec<(PathBuf, RootCount)> {
        self.roots
            .iter()
            .map(|root| {
                let count = if !root.is_dir() {
                    RootCount::Accessible(0)
                } else {
                    match list_subdirectories(root) {
                        Ok(children) => RootCount::Accessible(
                            children
                                .iter()
                                .filter(|f| matches_query(&folder_name(f), query))
                                .count(),
                        ),
                        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                            log::warn!("Permission denied counting games in {}", root.display());
                            RootCount::AccessDenied
                        }
                        Err(e) => {
                            log::warn!("Error counting games in {}: {}", root.display(), e);
                            RootCount::Accessible(0)
                        }
                    }
                };
                (root.clone(), count)
            })
            .collect()
    }

    /// Folder of a custom game. Other sources never resolve.
    pub fn folder_for(&self, game_id: &GameId) -> Option<PathBuf> {
        if game_id.source() != SourceKind::CustomGame {
            log::debug!("{} is not a custom game", game_id);
            return None;
        }
        let folder = self.cache.lookup(
            game_id.numeric(),
            &self.roots,
            &self.manual_folders,
            &self.allocator,
        );
        if folder.is_none() {
            log::warn!("Could not find folder for {}", game_id);
        }
        folder
    }

    /// Icon for a custom game, see [`icons::find_icon_file`].
    pub fn icon_for(&self, game_id: &GameId, extractor: &dyn IconExtractor) -> Option<PathBuf> {
        let folder = self.folder_for(game_id)?;
        icons::find_icon_file(&folder, extractor)
    }
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
