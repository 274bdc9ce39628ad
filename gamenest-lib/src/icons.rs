//! Icon lookup for custom game folders.
//!
//! Icons extracted from a game's executable are cached next to it as
//! `<exe-stem>.extracted.ico`. When no extracted icon can be produced, a
//! heuristic picks a nearby `.ico`/`.png` shipped with the game.

use std::fs;
use std::path::{Path, PathBuf};

use gamenest_core::util::{contains_ignore_case, ends_with_ignore_case};

use crate::error::EnrichError;
use crate::executables;

/// Suffix of icons extracted from executables.
pub const EXTRACTED_ICON_SUFFIX: &str = ".extracted.ico";

const IMAGE_EXTENSIONS: [&str; 2] = [".ico", ".png"];

/// Pulls the main icon out of an executable.
pub trait IconExtractor: Send + Sync {
    /// Write the main icon of `exe` to `out`.
    ///
    /// Returns `Ok(false)` when the executable carries no usable icon.
    fn extract_icon(&self, exe: &Path, out: &Path) -> Result<bool, EnrichError>;
}

/// Extractor for environments without icon support; never produces an icon.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIconExtractor;

impl IconExtractor for NoIconExtractor {
    fn extract_icon(&self, _exe: &Path, _out: &Path) -> Result<bool, EnrichError> {
        Ok(false)
    }
}

/// Cache location for the icon extracted from `exe`.
pub fn extracted_icon_path(exe: &Path) -> PathBuf {
    let stem = exe
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    exe.with_file_name(format!("{}{}", stem, EXTRACTED_ICON_SUFFIX))
}

/// Whether `icon` exists and is not older than `exe`.
pub fn is_icon_fresh(icon: &Path, exe: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(icon), modified(exe)) {
        (Some(icon_time), Some(exe_time)) => icon_time >= exe_time,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Whether the folder root already holds an extracted icon.
pub fn has_extracted_icon(folder: &Path) -> bool {
    fs::read_dir(folder)
        .map(|entries| {
            entries.flatten().any(|e| {
                ends_with_ignore_case(&e.file_name().to_string_lossy(), EXTRACTED_ICON_SUFFIX)
            })
        })
        .unwrap_or(false)
}

/// Extract the icon of `exe` into its cache location unless a fresh copy
/// is already there. Returns the icon path when one is available.
pub fn refresh_extracted_icon(
    exe: &Path,
    extractor: &dyn IconExtractor,
) -> Result<Option<PathBuf>, EnrichError> {
    let out = extracted_icon_path(exe);
    if is_icon_fresh(&out, exe) {
        return Ok(Some(out));
    }
    if extractor.extract_icon(exe, &out)? {
        log::debug!("Extracted icon {}", out.display());
        Ok(Some(out))
    } else {
        Ok(None)
    }
}

/// Best icon for a game folder.
///
/// Tries the unique executable's extracted icon (cached or freshly
/// extracted), then falls back to [`find_nearby_image_icon`].
pub fn find_icon_file(folder: &Path, extractor: &dyn IconExtractor) -> Option<PathBuf> {
    if !folder.is_dir() {
        return None;
    }
    let unique = executables::find_unique_executable(folder);
    if let Some(rel) = unique.as_deref() {
        let exe = executables::resolve_relative(folder, rel);
        if exe.is_file() {
            match refresh_extracted_icon(&exe, extractor) {
                Ok(Some(icon)) => return Some(icon),
                Ok(None) => {}
                Err(e) => log::debug!("Icon extraction failed for {}: {}", exe.display(), e),
            }
        }
    }
    find_nearby_image_icon(folder, unique.as_deref())
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path.file_name().is_some_and(|n| {
            let name = n.to_string_lossy();
            IMAGE_EXTENSIONS
                .iter()
                .any(|ext| ends_with_ignore_case(&name, ext))
        })
}

fn images_in(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| entries.flatten().map(|e| e.path()).filter(|p| is_image(p)).collect())
        .unwrap_or_default();
    images.sort();
    images
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Stem with the extension removed, and for extracted icons the
/// `.extracted.ico` suffix as a whole.
fn icon_stem(path: &Path) -> String {
    let name = name_of(path);
    let cut = name.len().saturating_sub(EXTRACTED_ICON_SUFFIX.len());
    match (name.get(..cut), name.get(cut..)) {
        (Some(stem), Some(tail)) if tail.eq_ignore_ascii_case(EXTRACTED_ICON_SUFFIX) => {
            return stem.to_string();
        }
        _ => {}
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Heuristic choice among `.ico`/`.png` files at depth ≤ 1.
///
/// Order of preference: the only extracted icon; an extracted icon named after
/// the executable; the first extracted icon; an image named after the
/// executable; an image whose name contains "icon"; the only image.
pub fn find_nearby_image_icon(folder: &Path, unique_exe: Option<&str>) -> Option<PathBuf> {
    let mut all = images_in(folder);
    let mut subdirs: Vec<PathBuf> = fs::read_dir(folder)
        .map(|entries| entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect())
        .unwrap_or_default();
    subdirs.sort();
    for sub in &subdirs {
        all.extend(images_in(sub));
    }
    if all.is_empty() {
        log::debug!("No icon files found in {}", folder.display());
        return None;
    }

    let exe_stem = unique_exe
        .map(|rel| rel.rsplit('/').next().unwrap_or(rel))
        .and_then(|file| Path::new(file).file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty());
    let matches_exe = |p: &Path| {
        exe_stem
            .as_deref()
            .is_some_and(|stem| icon_stem(p).eq_ignore_ascii_case(stem))
    };

    let extracted: Vec<&PathBuf> = all
        .iter()
        .filter(|p| ends_with_ignore_case(&name_of(p), EXTRACTED_ICON_SUFFIX))
        .collect();
    if let Some(first) = extracted.first() {
        if extracted.len() == 1 {
            return Some((*first).clone());
        }
        let chosen = extracted.iter().find(|p| matches_exe(p.as_path())).unwrap_or(first);
        return Some((*chosen).clone());
    }

    if let Some(by_exe) = all.iter().find(|p| matches_exe(p.as_path())) {
        return Some(by_exe.clone());
    }
    if let Some(named) = all.iter().find(|p| contains_ignore_case(&name_of(p), "icon")) {
        return Some(named.clone());
    }
    if all.len() == 1 {
        return all.pop();
    }
    log::debug!(
        "{} candidate icons in {}, cannot choose",
        all.len(),
        folder.display()
    );
    None
}

#[cfg(test)]
#[path = "tests/icons_tests.rs"]
mod tests;
