use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gamenest_lib::LibrarySettings;
use gamenest_lib::settings::{load_settings_string, settings_path};

use super::library::open_scanner;
use crate::CliError;

fn save(settings: &LibrarySettings) -> Result<(), CliError> {
    settings.save().map_err(|e| {
        CliError::config(format!(
            "Failed to save {}: {}",
            settings_path().display(),
            e
        ))
    })
}

fn print_paths(paths: &[PathBuf], empty_message: &str) {
    if paths.is_empty() {
        log::info!("{}", empty_message.if_supports_color(Stdout, |t| t.dimmed()));
        return;
    }
    for path in paths {
        let status = if path.is_dir() {
            "".to_string()
        } else {
            format!(" {}", "(missing)".if_supports_color(Stdout, |t| t.yellow()))
        };
        log::info!("  {}{}", path.display(), status);
    }
}

pub(crate) fn run_roots_list() {
    let settings = LibrarySettings::load();
    log::info!("{}", "Library roots".if_supports_color(Stdout, |t| t.bold()));
    print_paths(&settings.roots, "  (none)");
}

pub(crate) fn run_roots_add(path: &Path) -> Result<(), CliError> {
    if !path.is_dir() {
        return Err(CliError::not_found(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    let (mut settings, mut scanner) = open_scanner();
    if !settings.add_root(path) {
        log::info!("{} is already a library root", path.display());
        return Ok(());
    }
    save(&settings)?;
    scanner.reconfigure(&settings);
    log::info!(
        "{} Added root {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display(),
    );
    Ok(())
}

pub(crate) fn run_roots_remove(path: &Path) -> Result<(), CliError> {
    let (mut settings, mut scanner) = open_scanner();
    if !settings.remove_root(path) {
        return Err(CliError::not_found(format!(
            "{} is not a library root",
            path.display()
        )));
    }
    save(&settings)?;
    scanner.reconfigure(&settings);
    log::info!("Removed root {}", path.display());
    Ok(())
}

pub(crate) fn run_manual_list() {
    let settings = LibrarySettings::load();
    log::info!(
        "{}",
        "Registered game folders".if_supports_color(Stdout, |t| t.bold()),
    );
    print_paths(&settings.manual_folders, "  (none)");
}

/// Register a single folder as a game. The folder must hold a launchable
/// executable; it receives its identity right away.
pub(crate) fn run_manual_add(path: &Path) -> Result<(), CliError> {
    let (mut settings, mut scanner) = open_scanner();
    let Some(entry) = scanner.entry_for_folder(path) else {
        return Err(CliError::invalid_argument(format!(
            "{} does not contain a launchable executable",
            path.display()
        )));
    };

    if !settings.add_manual_folder(path) {
        log::info!(
            "{} is already registered as {}",
            path.display(),
            entry.composite_id()
        );
        return Ok(());
    }
    save(&settings)?;
    scanner.reconfigure(&settings);
    log::info!(
        "{} Registered {} as {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        entry.display_name(),
        entry.composite_id().if_supports_color(Stdout, |t| t.bold()),
    );
    Ok(())
}

pub(crate) fn run_manual_remove(path: &Path) -> Result<(), CliError> {
    let (mut settings, mut scanner) = open_scanner();
    if !settings.remove_manual_folder(path) {
        return Err(CliError::not_found(format!(
            "{} is not a registered game folder",
            path.display()
        )));
    }
    save(&settings)?;
    scanner.reconfigure(&settings);
    log::info!("Unregistered {}", path.display());
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}

/// Show the settings file status and the effective library settings.
pub(crate) fn run_config_show() {
    let path = settings_path();
    log::info!(
        "{}",
        "gamenest Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let settings = LibrarySettings::load();
    log::info!("  Roots:");
    print_paths(&settings.roots, "    (none)");
    log::info!("  Registered folders:");
    print_paths(&settings.manual_folders, "    (none)");
    log::info!("  Fetch artwork: {}", settings.fetch_artwork);

    if let Some(raw) = load_settings_string() {
        crate::log_blank();
        log::info!("{}", "Raw file".if_supports_color(Stdout, |t| t.bold()));
        for line in raw.lines() {
            log::info!("  {}", line);
        }
    }
}
