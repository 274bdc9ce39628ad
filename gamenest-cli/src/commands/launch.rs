use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use gamenest_lib::executables::{find_unique_executable, resolve_relative};
use gamenest_lib::launch::{LaunchMode, LocalOnlyCloudSync, NoPresence, SaveLocation};
use gamenest_lib::{GameId, LaunchDecision, LaunchRequest, LaunchSyncCoordinator};

use super::library::open_scanner;
use crate::CliError;

pub(crate) struct LaunchOptions {
    pub offline: bool,
    pub automated: bool,
    pub prefer: Option<SaveLocation>,
    pub ignore_pending: bool,
    pub take_over: bool,
}

impl LaunchOptions {
    fn request(&self, game_id: GameId) -> LaunchRequest {
        let mut request = LaunchRequest::new(game_id)
            .offline(self.offline)
            .with_mode(if self.automated {
                LaunchMode::Automated
            } else {
                LaunchMode::Interactive
            });
        if let Some(save) = self.prefer {
            request = request.with_preferred_save(save);
        }
        if self.ignore_pending {
            request = request.ignoring_pending_operations();
        }
        request
    }
}

/// Run launch preparation and report the decision.
///
/// Returns whether the launch may proceed.
pub(crate) fn run_launch(game_id: GameId, options: LaunchOptions) -> Result<bool, CliError> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    let coordinator = LaunchSyncCoordinator::new(LocalOnlyCloudSync, NoPresence);
    let request = options.request(game_id);
    log::debug!("Preparing launch: {:?}", request);

    let decision = rt.block_on(async {
        if options.take_over {
            coordinator.take_over_session(&request).await
        } else {
            coordinator.prepare_launch(&request).await
        }
    });

    report(&game_id, &decision);
    Ok(decision.proceeds())
}

fn report(game_id: &GameId, decision: &LaunchDecision) {
    if decision.proceeds() {
        log::info!(
            "{} {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            decision.summary(),
        );
        if game_id.source().is_locally_discovered() {
            print_launch_target(game_id);
        }
        return;
    }

    log::warn!(
        "{} {}",
        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
        decision.summary(),
    );
    if decision.offers_save_choice() {
        log::warn!("Re-run with --prefer local or --prefer remote to choose a save.");
    }
    if decision.offers_play_anyway() {
        let flag = match decision {
            LaunchDecision::OtherTitleActive { .. } => "--take-over",
            _ => "--ignore-pending",
        };
        log::warn!("Re-run with {} to play anyway.", flag);
    }
}

fn print_launch_target(game_id: &GameId) {
    let (_, scanner) = open_scanner();
    let Some(folder) = scanner.folder_for(game_id) else {
        log::warn!("No folder found for {}", game_id);
        return;
    };
    match find_unique_executable(&folder) {
        Some(relative) => log::info!(
            "  {}",
            resolve_relative(&folder, &relative)
                .display()
                .if_supports_color(Stdout, |t| t.cyan()),
        ),
        None => log::warn!(
            "No unique executable in {}; pick one with 'gamenest exes --all'",
            folder.display()
        ),
    }
}
