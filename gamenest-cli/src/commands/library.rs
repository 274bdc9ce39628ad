use std::sync::Arc;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gamenest_lib::enrich::standard_hooks;
use gamenest_lib::icons::NoIconExtractor;
use gamenest_lib::settings::{default_root_path, ensure_default_root};
use gamenest_lib::{
    DiscoveryCache, EnrichmentPool, GameId, LibraryEntry, LibraryScanner, LibrarySettings,
    RootCount,
};

use crate::CliError;

/// Upper bound on enrichment workers for a one-shot scan.
const MAX_ENRICH_WORKERS: usize = 4;

/// Load settings and build a scanner over them with a fresh discovery cache.
///
/// The default root is created when it is configured but missing.
pub(crate) fn open_scanner() -> (LibrarySettings, LibraryScanner) {
    let settings = LibrarySettings::load();
    if settings.roots.contains(&default_root_path()) {
        if let Err(e) = ensure_default_root() {
            log::warn!("Could not create the default library folder: {}", e);
        }
    }
    let scanner = LibraryScanner::from_settings(&settings, Arc::new(DiscoveryCache::new()));
    (settings, scanner)
}

/// Scan the library and list every discovered game.
pub(crate) fn run_scan(query: Option<&str>, enrich: bool) -> Result<(), CliError> {
    let (settings, scanner) = open_scanner();

    if !enrich {
        print_entries(&scanner.scan(query));
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    if settings.fetch_artwork {
        log::warn!("Artwork fetching is enabled but no artwork service is available; skipping");
    }
    let hooks = standard_hooks(
        Arc::new(NoIconExtractor),
        None,
        scanner.allocator().store().clone(),
    );
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_ENRICH_WORKERS);
    let mut scanner = scanner.with_enrichment(EnrichmentPool::start(workers, hooks, rt.handle()));

    let entries = scanner.scan(query);
    print_entries(&entries);

    if let Some(pool) = scanner.take_enrichment() {
        log::debug!("Waiting for {} queued enrichment job(s)", pool.queued());
        rt.block_on(pool.finish());
    }
    Ok(())
}

fn print_entries(entries: &[LibraryEntry]) {
    for entry in entries {
        log::info!(
            "{}  {}",
            entry.composite_id().if_supports_color(Stdout, |t| t.bold()),
            entry.display_name(),
        );
        if let Some(folder) = entry.folder() {
            log::info!(
                "    {}",
                folder.display().if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }
    crate::log_blank();
    log::info!(
        "{} game(s) found",
        entries.len().if_supports_color(Stdout, |t| t.cyan()),
    );
}

/// Count candidate folders under each root.
pub(crate) fn run_count(query: Option<&str>) {
    let (_, scanner) = open_scanner();

    for (root, count) in scanner.count_per_root(query) {
        match count {
            RootCount::Accessible(n) => log::info!(
                "{}: {}",
                root.display().if_supports_color(Stdout, |t| t.cyan()),
                n,
            ),
            RootCount::AccessDenied => log::warn!(
                "{}: {} ({})",
                root.display().if_supports_color(Stdout, |t| t.cyan()),
                "access denied".if_supports_color(Stdout, |t| t.red()),
                count.sentinel(),
            ),
        }
    }
}

fn require_folder_source(game_id: &GameId) -> Result<(), CliError> {
    let source = game_id.source();
    if source.is_locally_discovered() {
        Ok(())
    } else {
        Err(CliError::invalid_argument(format!(
            "{} is a {} title; only folder-based games have a folder",
            game_id,
            source.display_name()
        )))
    }
}

/// Print the folder a custom game id maps to.
pub(crate) fn run_lookup(game_id: &GameId) -> Result<(), CliError> {
    require_folder_source(game_id)?;
    let (_, scanner) = open_scanner();

    match scanner.folder_for(game_id) {
        Some(folder) => {
            log::info!("{}", folder.display());
            Ok(())
        }
        None => Err(CliError::not_found(format!("No folder found for {}", game_id))),
    }
}

/// Print the icon file chosen for a custom game.
pub(crate) fn run_icon(game_id: &GameId) -> Result<(), CliError> {
    require_folder_source(game_id)?;
    let (_, scanner) = open_scanner();

    match scanner.icon_for(game_id, &NoIconExtractor) {
        Some(icon) => {
            log::info!("{}", icon.display());
            Ok(())
        }
        None => Err(CliError::not_found(format!("No icon found for {}", game_id))),
    }
}
