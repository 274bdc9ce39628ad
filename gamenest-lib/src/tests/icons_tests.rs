use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

/// Writes a fake icon and counts calls.
#[derive(Default)]
struct WritingExtractor {
    calls: AtomicUsize,
}

impl IconExtractor for WritingExtractor {
    fn extract_icon(&self, _exe: &Path, out: &Path) -> Result<bool, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        fs::write(out, b"ico")?;
        Ok(true)
    }
}

struct FailingExtractor;

impl IconExtractor for FailingExtractor {
    fn extract_icon(&self, _exe: &Path, _out: &Path) -> Result<bool, EnrichError> {
        Err(EnrichError::collaborator("icon extractor", "bad PE header"))
    }
}

#[test]
fn extracted_icon_path_sits_next_to_exe() {
    assert_eq!(
        extracted_icon_path(Path::new("/g/bin/Game.exe")),
        PathBuf::from("/g/bin/Game.extracted.ico")
    );
}

#[test]
fn extracts_icon_for_unique_executable_and_reuses_cache() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("Game.exe"));
    let extractor = WritingExtractor::default();

    let icon = find_icon_file(dir.path(), &extractor).unwrap();
    assert_eq!(icon, dir.path().join("Game.extracted.ico"));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);

    let again = find_icon_file(dir.path(), &extractor).unwrap();
    assert_eq!(again, icon);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn extractor_failure_falls_back_to_nearby_images() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("Game.exe"));
    touch(&dir.path().join("art/cover.png"));
    assert_eq!(
        find_icon_file(dir.path(), &FailingExtractor),
        Some(dir.path().join("art/cover.png"))
    );
}

#[test]
fn single_extracted_icon_wins_over_everything() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("icon.png"));
    touch(&dir.path().join("bin/Tool.extracted.ico"));
    assert_eq!(
        find_nearby_image_icon(dir.path(), Some("bin/Game.exe")),
        Some(dir.path().join("bin/Tool.extracted.ico"))
    );
}

#[test]
fn extracted_icon_matching_exe_is_preferred_among_several() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("Alpha.extracted.ico"));
    touch(&dir.path().join("Game.EXTRACTED.ICO"));
    assert_eq!(
        find_nearby_image_icon(dir.path(), Some("Game.exe")),
        Some(dir.path().join("Game.EXTRACTED.ICO"))
    );
    assert_eq!(
        find_nearby_image_icon(dir.path(), None),
        Some(dir.path().join("Alpha.extracted.ico"))
    );
}

#[test]
fn image_named_after_exe_then_icon_named_then_sole_image() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("app_icon.ico"));
    touch(&dir.path().join("game.png"));
    assert_eq!(
        find_nearby_image_icon(dir.path(), Some("bin/Game.exe")),
        Some(dir.path().join("game.png"))
    );
    assert_eq!(
        find_nearby_image_icon(dir.path(), None),
        Some(dir.path().join("app_icon.ico"))
    );

    let single = TempDir::new().unwrap();
    touch(&single.path().join("logo.png"));
    assert_eq!(
        find_nearby_image_icon(single.path(), None),
        Some(single.path().join("logo.png"))
    );
}

#[test]
fn ambiguous_images_yield_nothing() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.png"));
    touch(&dir.path().join("b.ico"));
    assert_eq!(find_nearby_image_icon(dir.path(), None), None);
}

#[test]
fn detects_extracted_icon_at_root_only() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("bin/Game.extracted.ico"));
    assert!(!has_extracted_icon(dir.path()));
    touch(&dir.path().join("Game.extracted.ico"));
    assert!(has_extracted_icon(dir.path()));
}

#[test]
fn no_extractor_means_no_extracted_icon() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("Game.exe"));
    assert_eq!(find_icon_file(dir.path(), &NoIconExtractor), None);
}
