use std::path::{Path, PathBuf};

use crate::game_id::GameId;
use crate::source::SourceKind;

/// One row of a library listing.
///
/// Entries are rebuilt from scratch on every scan and never mutated
/// afterwards; the composite [`GameId`] is unique within one scan result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    game_id: GameId,
    display_name: String,
    installed: bool,
    folder: Option<PathBuf>,
}

impl LibraryEntry {
    /// Entry for a folder discovered on disk.
    pub fn discovered(game_id: GameId, folder: &Path) -> Self {
        let display_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| folder.display().to_string());
        Self {
            installed: game_id.source().installed_when_listed(),
            game_id,
            display_name,
            folder: Some(folder.to_path_buf()),
        }
    }

    /// Entry for a title supplied by another source (e.g. the Steam library).
    pub fn managed(game_id: GameId, display_name: impl Into<String>, installed: bool) -> Self {
        Self {
            game_id,
            display_name: display_name.into(),
            installed,
            folder: None,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn source_kind(&self) -> SourceKind {
        self.game_id.source()
    }

    pub fn numeric_id(&self) -> u32 {
        self.game_id.numeric()
    }

    /// `"<SOURCE_TAG>_<id>"`, the key handed to frontends.
    pub fn composite_id(&self) -> String {
        self.game_id.to_string()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn installed(&self) -> bool {
        self.installed
    }

    /// The game folder, for entries discovered on disk.
    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }
}
