use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gamenest_lib::executables::{find_all_executables, find_unique_executable, resolve_relative};

use crate::CliError;

/// Show the executable a folder would launch, or every candidate with `all`.
pub(crate) fn run_exes(folder: &Path, all: bool) -> Result<(), CliError> {
    if !folder.is_dir() {
        return Err(CliError::not_found(format!(
            "{} is not a directory",
            folder.display()
        )));
    }

    if all {
        let candidates = find_all_executables(folder);
        if candidates.is_empty() {
            log::warn!("No launchable executables in {}", folder.display());
        }
        for relative in &candidates {
            log::info!(
                "{}  {}",
                relative.if_supports_color(Stdout, |t| t.bold()),
                resolve_relative(folder, relative)
                    .display()
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        return Ok(());
    }

    match find_unique_executable(folder) {
        Some(relative) => {
            log::info!("{}", resolve_relative(folder, &relative).display());
            Ok(())
        }
        None => {
            let count = find_all_executables(folder).len();
            Err(CliError::not_found(if count == 0 {
                format!("No launchable executable in {}", folder.display())
            } else {
                format!(
                    "{} candidates in {}; use --all to list them",
                    count,
                    folder.display()
                )
            }))
        }
    }
}
