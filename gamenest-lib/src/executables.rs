//! Executable detection inside game folders.
//!
//! A folder "looks like a game" when it holds a launchable executable either
//! directly or one directory down. Uninstallers (`unins000.exe`,
//! `Uninstall.exe`, ...) never count.

use std::fs;
use std::path::{Path, PathBuf};

use gamenest_core::util::{ends_with_ignore_case, starts_with_ignore_case};

/// File extension of launchable executables.
pub const EXECUTABLE_EXTENSION: &str = ".exe";

/// File-name prefix marking an uninstaller.
pub const UNINSTALLER_PREFIX: &str = "unins";

/// Whether a file name names a launchable (non-uninstaller) executable.
pub fn is_launchable_name(name: &str) -> bool {
    ends_with_ignore_case(name, EXECUTABLE_EXTENSION)
        && !starts_with_ignore_case(name, UNINSTALLER_PREFIX)
}

fn is_launchable_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_launchable_name)
}

/// Sorted directory listing; unreadable directories list as empty.
fn sorted_children(dir: &Path) -> Vec<PathBuf> {
    let mut children: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(e) => {
            log::debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    children.sort();
    children
}

fn file_name_string(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// True iff `dir` holds a launchable executable directly or in an
/// immediate subdirectory.
pub fn is_game_folder(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let children = sorted_children(dir);
    if children.iter().any(|p| is_launchable_file(p)) {
        return true;
    }
    children
        .iter()
        .filter(|p| p.is_dir())
        .any(|sub| sorted_children(sub).iter().any(|p| is_launchable_file(p)))
}

/// Every launchable executable at depth ≤ 1, relative to `dir`.
///
/// Root files are listed by name, nested ones as `"<subfolder>/<file>"`
/// (always with `/`). Order: root files first, then subfolders, each sorted.
pub fn find_all_executables(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let children = sorted_children(dir);
    let mut found: Vec<String> = children
        .iter()
        .filter(|p| is_launchable_file(p))
        .filter_map(|p| file_name_string(p))
        .collect();

    for sub in children.iter().filter(|p| p.is_dir()) {
        let Some(sub_name) = file_name_string(sub) else {
            continue;
        };
        found.extend(
            sorted_children(sub)
                .iter()
                .filter(|p| is_launchable_file(p))
                .filter_map(|p| file_name_string(p))
                .map(|file| format!("{}/{}", sub_name, file)),
        );
    }

    found.dedup();
    found
}

/// The executable to launch when there is exactly one candidate.
///
/// Returns `None` when the folder has no launchable executable, or more than
/// one anywhere at depth ≤ 1; ambiguity is left for the caller to resolve.
pub fn find_unique_executable(dir: &Path) -> Option<String> {
    let mut all = find_all_executables(dir);
    if all.len() == 1 { all.pop() } else { None }
}

/// Turn a relative executable path from this module back into a filesystem path.
pub fn resolve_relative(dir: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(dir.to_path_buf(), |acc, part| acc.join(part))
}

#[cfg(test)]
#[path = "tests/executables_tests.rs"]
mod tests;
