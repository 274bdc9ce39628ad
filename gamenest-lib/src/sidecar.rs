//! Per-folder sidecar metadata files.
//!
//! Each discovered game folder carries a small JSON file holding its stable
//! id plus enrichment flags:
//!
//! ```text
//! {"appId":184467,"steamgriddbFetched":true,"releaseDate":1262304000}
//! ```
//!
//! Older installs wrote the bare id (`184467`). That form is still accepted
//! and is rewritten in the structured form the first time it is read.
//!
//! Nothing here returns an error to the caller: unreadable or corrupt files
//! read as "no metadata", and failed writes are logged and dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gamenest_core::{GameMetadata, MetadataPatch};
use serde::{Deserialize, Serialize};

/// Default sidecar file name inside each game folder.
pub const SIDECAR_FILE_NAME: &str = ".gamenest";

/// On-disk shape of a structured sidecar record.
#[derive(Debug, Serialize, Deserialize)]
struct SidecarRecord {
    #[serde(rename = "appId")]
    app_id: i64,
    #[serde(
        rename = "steamgriddbFetched",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    steam_grid_fetched: bool,
    #[serde(
        rename = "releaseDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    release_date: Option<i64>,
}

impl From<&GameMetadata> for SidecarRecord {
    fn from(m: &GameMetadata) -> Self {
        Self {
            app_id: i64::from(m.id),
            steam_grid_fetched: m.steam_grid_fetched,
            release_date: m.release_date,
        }
    }
}

/// The three shapes a sidecar file can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidecarContents {
    /// A JSON object with a valid `appId`.
    Structured(GameMetadata),
    /// A bare positive integer from the legacy format.
    Legacy(u32),
    /// Anything else, including a structured record whose id is not positive.
    Unparseable,
}

/// Converts a raw id to the positive `u32` range, rejecting 0 and negatives.
fn positive_id(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok().filter(|&id| id != 0)
}

/// Classify raw sidecar text.
pub fn decode(content: &str) -> SidecarContents {
    let content = content.trim();
    if let Ok(record) = serde_json::from_str::<SidecarRecord>(content) {
        return match positive_id(record.app_id) {
            Some(id) => SidecarContents::Structured(
                GameMetadata::new(id)
                    .with_steam_grid_fetched(record.steam_grid_fetched)
                    .with_release_date(record.release_date),
            ),
            None => SidecarContents::Unparseable,
        };
    }
    match content.parse::<i64>().ok().and_then(positive_id) {
        Some(id) => SidecarContents::Legacy(id),
        None => SidecarContents::Unparseable,
    }
}

/// Serialize a record in the structured form.
pub fn encode(metadata: &GameMetadata) -> String {
    // A struct of integers and bools cannot fail to serialize.
    serde_json::to_string(&SidecarRecord::from(metadata)).unwrap_or_default()
}

/// Reads and writes sidecar files.
#[derive(Debug, Clone)]
pub struct SidecarStore {
    file_name: String,
}

impl Default for SidecarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SidecarStore {
    pub fn new() -> Self {
        Self::with_file_name(SIDECAR_FILE_NAME)
    }

    /// Use a different sidecar file name (e.g. to read another tool's files).
    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Path of the sidecar file for `folder`.
    pub fn sidecar_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.file_name)
    }

    /// Read the metadata stored for `folder`.
    ///
    /// Legacy bare-integer files are migrated to the structured form before
    /// returning. Missing, unreadable or corrupt files yield `None`.
    pub fn read(&self, folder: &Path) -> Option<GameMetadata> {
        let path = self.sidecar_path(folder);
        if !path.is_file() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read sidecar {}: {}", path.display(), e);
                return None;
            }
        };

        match decode(&content) {
            SidecarContents::Structured(metadata) => Some(metadata),
            SidecarContents::Legacy(id) => {
                let metadata = GameMetadata::new(id);
                log::debug!("Migrating legacy sidecar {} (appId={})", path.display(), id);
                if let Err(e) = self.write_atomic(&path, &metadata) {
                    log::warn!("Failed to migrate sidecar {}: {}", path.display(), e);
                }
                Some(metadata)
            }
            SidecarContents::Unparseable => {
                if !content.trim().is_empty() {
                    log::debug!("Ignoring unparseable sidecar {}", path.display());
                }
                None
            }
        }
    }

    /// The stored id for `folder`, if any.
    pub fn read_id(&self, folder: &Path) -> Option<u32> {
        self.read(folder).map(|m| m.id)
    }

    /// Merge `metadata` into the stored record and write it back.
    ///
    /// The new id always wins, `steam_grid_fetched` is sticky once true, and
    /// a missing release date keeps the stored one.
    pub fn write(&self, folder: &Path, metadata: &GameMetadata) {
        let path = self.sidecar_path(folder);
        let merged = metadata.merged_over(self.read(folder).as_ref());
        match self.write_atomic(&path, &merged) {
            Ok(()) => log::debug!(
                "Wrote sidecar {}: appId={}, fetched={}, releaseDate={:?}",
                path.display(),
                merged.id,
                merged.steam_grid_fetched,
                merged.release_date,
            ),
            Err(e) => log::warn!("Failed to write sidecar {}: {}", path.display(), e),
        }
    }

    /// Apply a partial update.
    ///
    /// Does nothing (and logs) when the patch has no id and nothing is stored yet.
    pub fn update(&self, folder: &Path, patch: MetadataPatch) {
        let existing = self.read(folder);
        match patch.apply_to(existing.as_ref()) {
            Some(updated) => self.write(folder, &updated),
            None => log::warn!(
                "Cannot update metadata for {}: no id supplied and none stored",
                folder.display()
            ),
        }
    }

    /// Write to a temporary sibling and rename over the target, so a
    /// concurrent reader never sees a truncated file.
    fn write_atomic(&self, path: &Path, metadata: &GameMetadata) -> io::Result<()> {
        let tmp = path.with_file_name(format!("{}.tmp", self.file_name));
        fs::write(&tmp, encode(metadata))?;
        fs::rename(&tmp, path)
    }
}

#[cfg(test)]
#[path = "tests/sidecar_tests.rs"]
mod tests;
