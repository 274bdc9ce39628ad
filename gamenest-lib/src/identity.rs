//! Stable numeric ids for discovered game folders.
//!
//! A folder's id is derived once from a CRC-32 of its absolute path, nudged
//! upward past any id already in use, and then persisted in the folder's
//! sidecar file. From then on the sidecar is the source of truth, so moving
//! or renaming the folder keeps its id.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gamenest_core::GameMetadata;

use crate::sidecar::SidecarStore;

/// Largest id a derivation can produce (ids stay in the positive `i32` range
/// so they survive frontends that store them as signed integers).
pub const MAX_DERIVED_ID: u32 = i32::MAX as u32;

/// Path-to-candidate function used by an allocator.
pub type Derivation = fn(&Path) -> u32;

/// Deterministic candidate id for a folder path, in `1..=MAX_DERIVED_ID`.
pub fn derive_candidate(path: &Path) -> u32 {
    let absolute = absolute_path(path);
    let hash = crc32fast::hash(absolute.to_string_lossy().as_bytes()) & MAX_DERIVED_ID;
    if hash == 0 { 1 } else { hash }
}

/// Lexically absolute form of `path` (no symlink resolution, no I/O beyond
/// reading the current directory for relative inputs).
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// First id at or after `candidate` that is not in `existing`.
///
/// Tries `candidate + 1`, `candidate + 2`, ... and wraps past `u32::MAX`
/// back to 1, never yielding 0.
pub fn next_free_id(candidate: u32, existing: &HashSet<u32>) -> u32 {
    let mut id = candidate.max(1);
    while existing.contains(&id) {
        id = id.checked_add(1).unwrap_or(1);
    }
    id
}

/// Assigns ids to folders that do not have one yet.
#[derive(Debug, Clone)]
pub struct IdentityAllocator {
    store: SidecarStore,
    derive: Derivation,
}

impl IdentityAllocator {
    pub fn new(store: SidecarStore) -> Self {
        Self::with_derivation(store, derive_candidate)
    }

    /// Use a custom path-to-candidate function.
    pub fn with_derivation(store: SidecarStore, derive: Derivation) -> Self {
        Self { store, derive }
    }

    pub fn store(&self) -> &SidecarStore {
        &self.store
    }

    /// Candidate id for `folder` before collision handling.
    pub fn derive_candidate(&self, folder: &Path) -> u32 {
        (self.derive)(folder)
    }

    /// Allocate a collision-free id for `folder` and persist it.
    pub fn resolve_unique(&self, folder: &Path, existing: &HashSet<u32>) -> u32 {
        let candidate = self.derive_candidate(folder);
        let id = next_free_id(candidate, existing);
        if id != candidate {
            log::debug!(
                "Id collision for {}: {} is taken, using {}",
                folder.display(),
                candidate,
                id
            );
        }
        self.store.write(folder, &GameMetadata::new(id));
        id
    }

    /// The stored id for `folder`, or a freshly allocated one.
    ///
    /// `known_ids` must return every id currently in use by *other* folders.
    /// It is only evaluated when an allocation is actually needed.
    pub fn get_or_assign<F>(&self, folder: &Path, known_ids: F) -> u32
    where
        F: FnOnce() -> HashSet<u32>,
    {
        if let Some(id) = self.store.read_id(folder) {
            return id;
        }
        self.resolve_unique(folder, &known_ids())
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new(SidecarStore::new())
    }
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
