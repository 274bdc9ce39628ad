//! Shared application settings (library roots, manual folders, artwork).
//!
//! The settings file is `<config_dir>/gamenest/settings.toml`. Only the
//! `[library]` table is owned here; saving updates it surgically through
//! `toml::Value` so unrelated tables survive.

use std::io;
use std::path::{Path, PathBuf};

use crate::identity::absolute_path;

/// Folder name of the default library root under the data directory.
pub const DEFAULT_ROOT_DIR_NAME: &str = "CustomGames";

/// Canonical path to the settings file: `~/.config/gamenest/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("gamenest").join("settings.toml")
}

/// Default library root: `<data_dir>/gamenest/CustomGames`.
pub fn default_root_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("gamenest").join(DEFAULT_ROOT_DIR_NAME)
}

/// Create the default root if it is missing and return its path.
pub fn ensure_default_root() -> io::Result<PathBuf> {
    let root = default_root_path();
    std::fs::create_dir_all(&root)?;
    Ok(root)
}

/// The `[library]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySettings {
    /// Directories whose immediate subfolders are games, in scan order.
    pub roots: Vec<PathBuf>,
    /// Single folders registered as games, scanned after all roots.
    pub manual_folders: Vec<PathBuf>,
    /// Whether discovered games get artwork fetched in the background.
    pub fetch_artwork: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            roots: vec![default_root_path()],
            manual_folders: Vec::new(),
            fetch_artwork: false,
        }
    }
}

fn path_list(library: Option<&toml::Value>, key: &str) -> Option<Vec<PathBuf>> {
    let items = library?.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect(),
    )
}

fn path_array(paths: &[PathBuf]) -> toml::Value {
    toml::Value::Array(
        paths
            .iter()
            .map(|p| toml::Value::String(p.to_string_lossy().into_owned()))
            .collect(),
    )
}

/// Insert `path` (made absolute) unless already present.
fn add_unique(list: &mut Vec<PathBuf>, path: &Path) -> bool {
    let path = absolute_path(path);
    if list.contains(&path) {
        return false;
    }
    list.push(path);
    true
}

fn remove_path(list: &mut Vec<PathBuf>, path: &Path) -> bool {
    let path = absolute_path(path);
    let before = list.len();
    list.retain(|p| *p != path);
    list.len() != before
}

impl LibrarySettings {
    /// Load from the canonical settings file.
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// Load from `path`. A missing or unreadable file yields the defaults;
    /// a missing `roots` key falls back to the default root.
    pub fn load_from(path: &Path) -> Self {
        let defaults = Self::default();
        let Ok(contents) = std::fs::read_to_string(path) else {
            return defaults;
        };
        let doc: toml::Value = match contents.parse() {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Ignoring malformed {}: {}", path.display(), e);
                return defaults;
            }
        };
        let library = doc.get("library");
        Self {
            roots: path_list(library, "roots").unwrap_or(defaults.roots),
            manual_folders: path_list(library, "manual_folders").unwrap_or_default(),
            fetch_artwork: library
                .and_then(|l| l.get("fetch_artwork"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    }

    /// Save to the canonical settings file.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(&settings_path())
    }

    /// Save the `[library]` table into `path`, preserving everything else.
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(path) {
            contents
                .parse()
                .unwrap_or_else(|_| toml::Value::Table(Default::default()))
        } else {
            toml::Value::Table(Default::default())
        };

        let table = doc
            .as_table_mut()
            .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
        let library = table
            .entry("library")
            .or_insert_with(|| toml::Value::Table(Default::default()));
        let lib_table = library
            .as_table_mut()
            .ok_or_else(|| io::Error::other("[library] is not a table"))?;

        lib_table.insert("roots".to_string(), path_array(&self.roots));
        lib_table.insert(
            "manual_folders".to_string(),
            path_array(&self.manual_folders),
        );
        lib_table.insert(
            "fetch_artwork".to_string(),
            toml::Value::Boolean(self.fetch_artwork),
        );

        // Write atomically
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Returns `false` if the root was already configured.
    pub fn add_root(&mut self, root: &Path) -> bool {
        add_unique(&mut self.roots, root)
    }

    pub fn remove_root(&mut self, root: &Path) -> bool {
        remove_path(&mut self.roots, root)
    }

    /// Returns `false` if the folder was already registered.
    pub fn add_manual_folder(&mut self, folder: &Path) -> bool {
        add_unique(&mut self.manual_folders, folder)
    }

    pub fn remove_manual_folder(&mut self, folder: &Path) -> bool {
        remove_path(&mut self.manual_folders, folder)
    }
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
