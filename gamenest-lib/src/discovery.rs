//! Reverse lookup from numeric id to game folder.
//!
//! The cache is an owned component: construct one at wiring time, share it
//! behind an `Arc`, and call [`DiscoveryCache::invalidate`] after mutating
//! roots, manual folders, or deleting a game. All mutation goes through one
//! mutex, and a rebuild holds it for its whole duration, so an incremental
//! [`DiscoveryCache::add_entry`] can never interleave with a partial rebuild.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::executables;
use crate::identity::{IdentityAllocator, absolute_path};

/// How the cache decides which folders are games and what their ids are.
pub trait FolderSource {
    fn is_game_folder(&self, dir: &Path) -> bool;

    /// Id persisted for `dir`, if any.
    fn read_id(&self, dir: &Path) -> Option<u32>;

    /// Id to index `dir` under when nothing is persisted yet.
    fn fallback_id(&self, dir: &Path) -> u32;
}

impl FolderSource for IdentityAllocator {
    fn is_game_folder(&self, dir: &Path) -> bool {
        executables::is_game_folder(dir)
    }

    fn read_id(&self, dir: &Path) -> Option<u32> {
        self.store().read_id(dir)
    }

    fn fallback_id(&self, dir: &Path) -> u32 {
        self.derive_candidate(dir)
    }
}

/// Roots and manual folders the memoized map was built from, in order.
///
/// Order matters: the first folder seen for an id keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    roots: Vec<PathBuf>,
    manual: Vec<PathBuf>,
}

impl Snapshot {
    fn capture(roots: &[PathBuf], manual: &[PathBuf]) -> Self {
        Self {
            roots: roots.to_vec(),
            manual: manual.to_vec(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    map: Option<HashMap<u32, PathBuf>>,
    snapshot: Option<Snapshot>,
}

impl CacheState {
    fn clear(&mut self) {
        self.map = None;
        self.snapshot = None;
    }
}

/// Memoized `id -> folder` map with snapshot-based staleness.
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    state: Mutex<CacheState>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The memoized map, rebuilt first when nothing is memoized or the
    /// roots/manual folders differ from the last build.
    pub fn get_or_rebuild(
        &self,
        roots: &[PathBuf],
        manual: &[PathBuf],
        source: &impl FolderSource,
    ) -> HashMap<u32, PathBuf> {
        let current = Snapshot::capture(roots, manual);
        let mut state = self.lock();
        let fresh = state.map.is_some() && state.snapshot.as_ref() == Some(&current);
        if !fresh {
            let map = build_map(roots, manual, source);
            log::debug!("Built discovery cache with {} entries", map.len());
            state.map = Some(map);
            state.snapshot = Some(current);
        }
        state.map.clone().unwrap_or_default()
    }

    /// Drop the memoized map; the next access performs a full rebuild.
    pub fn invalidate(&self) {
        self.lock().clear();
        log::debug!("Discovery cache invalidated");
    }

    /// Record a newly discovered folder without a full rebuild.
    ///
    /// Any other id already pointing at `path` is removed first. Does nothing
    /// while no map is memoized.
    pub fn add_entry(&self, id: u32, path: &Path) {
        let mut state = self.lock();
        let Some(map) = state.map.as_mut() else {
            return;
        };
        map.retain(|&other, existing| other == id || existing.as_path() != path);
        map.insert(id, path.to_path_buf());
    }

    /// The memoized map without rebuilding, if one exists.
    pub fn snapshot_map(&self) -> Option<HashMap<u32, PathBuf>> {
        self.lock().map.clone()
    }

    /// Ids currently mapped to any folder other than `exclude`.
    pub fn ids_excluding(&self, exclude: &Path) -> HashSet<u32> {
        self.lock()
            .map
            .as_ref()
            .map(|map| {
                map.iter()
                    .filter(|(_, path)| path.as_path() != exclude)
                    .map(|(&id, _)| id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Folder for `id`, self-healing once when the mapped folder is gone.
    pub fn lookup(
        &self,
        id: u32,
        roots: &[PathBuf],
        manual: &[PathBuf],
        source: &impl FolderSource,
    ) -> Option<PathBuf> {
        let map = self.get_or_rebuild(roots, manual, source);
        let Some(path) = map.get(&id) else {
            log::debug!("No folder known for id {}", id);
            return None;
        };
        if path.is_dir() {
            return Some(path.clone());
        }

        log::warn!(
            "Cached folder no longer exists: {}, invalidating cache",
            path.display()
        );
        self.invalidate();
        self.get_or_rebuild(roots, manual, source).remove(&id)
    }
}

fn subdirectories(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Skipping root {}: {}", root.display(), e);
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Full scan: one level under each root, then each manual folder as-is.
///
/// Persisted ids are indexed first, so a folder that has no id yet can never
/// displace one that does; its fallback id is only used while still free.
/// Within each pass the first folder seen for an id keeps it.
fn build_map(
    roots: &[PathBuf],
    manual: &[PathBuf],
    source: &impl FolderSource,
) -> HashMap<u32, PathBuf> {
    let candidates = roots
        .iter()
        .flat_map(|root| subdirectories(root))
        .chain(manual.iter().filter(|p| p.is_dir()).cloned());

    let mut map = HashMap::new();
    let mut unassigned = Vec::new();
    for folder in candidates {
        if !source.is_game_folder(&folder) {
            continue;
        }
        let folder = absolute_path(&folder);
        match source.read_id(&folder) {
            Some(id) => {
                map.entry(id).or_insert(folder);
            }
            None => unassigned.push(folder),
        }
    }
    for folder in unassigned {
        let id = source.fallback_id(&folder);
        map.entry(id).or_insert(folder);
    }
    map
}

#[cfg(test)]
#[path = "tests/discovery_tests.rs"]
mod tests;
