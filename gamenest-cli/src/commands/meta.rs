use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gamenest_lib::{MetadataPatch, SidecarStore};

use crate::CliError;

/// Print the sidecar metadata stored in `folder`.
pub(crate) fn run_meta_show(folder: &Path) -> Result<(), CliError> {
    let store = SidecarStore::new();
    let Some(meta) = store.read(folder) else {
        return Err(CliError::not_found(format!(
            "No readable metadata at {}",
            store.sidecar_path(folder).display()
        )));
    };

    log::info!(
        "{}",
        store
            .sidecar_path(folder)
            .display()
            .if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  id:                 {}", meta.id);
    log::info!("  artwork fetched:    {}", meta.steam_grid_fetched);
    match meta.release_date {
        Some(ts) => log::info!("  release date:       {}", ts),
        None => log::info!(
            "  release date:       {}",
            "unknown".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
    Ok(())
}

/// Merge the given fields into `folder`'s sidecar.
pub(crate) fn run_meta_set(
    folder: &Path,
    id: Option<u32>,
    fetched: bool,
    release_date: Option<i64>,
) -> Result<(), CliError> {
    if !folder.is_dir() {
        return Err(CliError::not_found(format!(
            "{} is not a directory",
            folder.display()
        )));
    }
    if id == Some(0) {
        return Err(CliError::invalid_argument("id must be positive"));
    }

    let store = SidecarStore::new();
    if id.is_none() && store.read(folder).is_none() {
        return Err(CliError::invalid_argument(
            "folder has no metadata yet; pass --id to create it",
        ));
    }

    let mut patch = MetadataPatch::default();
    if let Some(id) = id {
        patch = patch.id(id);
    }
    if fetched {
        patch = patch.steam_grid_fetched(true);
    }
    if let Some(ts) = release_date {
        patch = patch.release_date(ts);
    }
    store.update(folder, patch);

    match store.read(folder) {
        Some(meta) => {
            log::info!(
                "{} Updated {} (id {})",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                store.sidecar_path(folder).display(),
                meta.id,
            );
            Ok(())
        }
        None => Err(CliError::Io(std::io::Error::other(format!(
            "Could not write {}",
            store.sidecar_path(folder).display()
        )))),
    }
}
