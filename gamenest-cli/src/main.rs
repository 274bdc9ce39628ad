//! gamenest CLI
//!
//! Command-line interface for discovering folder-based games and preparing
//! launches.

mod cli_types;
mod error;

mod commands {
    pub(crate) mod exes;
    pub(crate) mod launch;
    pub(crate) mod library;
    pub(crate) mod meta;
    pub(crate) mod settings;
}

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction, ManualAction, MetaAction, RootsAction};
pub(crate) use error::CliError;

/// Exit code for a launch that did not get the go-ahead.
const EXIT_LAUNCH_BLOCKED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.quiet, cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Commands::Scan { query, no_enrich } => {
            commands::library::run_scan(query.as_deref(), !no_enrich)?
        }
        Commands::Count { query } => commands::library::run_count(query.as_deref()),
        Commands::Lookup { game_id } => commands::library::run_lookup(&game_id)?,
        Commands::Exes { folder, all } => commands::exes::run_exes(&folder, all)?,
        Commands::Icon { game_id } => commands::library::run_icon(&game_id)?,
        Commands::Meta { action } => match action {
            MetaAction::Show { folder } => commands::meta::run_meta_show(&folder)?,
            MetaAction::Set {
                folder,
                id,
                fetched,
                release_date,
            } => commands::meta::run_meta_set(&folder, id, fetched, release_date)?,
        },
        Commands::Roots { action } => match action {
            RootsAction::List => commands::settings::run_roots_list(),
            RootsAction::Add { path } => commands::settings::run_roots_add(&path)?,
            RootsAction::Remove { path } => commands::settings::run_roots_remove(&path)?,
        },
        Commands::Manual { action } => match action {
            ManualAction::List => commands::settings::run_manual_list(),
            ManualAction::Add { path } => commands::settings::run_manual_add(&path)?,
            ManualAction::Remove { path } => commands::settings::run_manual_remove(&path)?,
        },
        Commands::Launch {
            game_id,
            offline,
            automated,
            prefer,
            ignore_pending,
            take_over,
        } => {
            let options = commands::launch::LaunchOptions {
                offline,
                automated,
                prefer: prefer.map(Into::into),
                ignore_pending,
                take_over,
            };
            if !commands::launch::run_launch(game_id, options)? {
                return Ok(ExitCode::from(EXIT_LAUNCH_BLOCKED));
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::settings::run_config_path(),
            ConfigAction::Show => commands::settings::run_config_show(),
        },
    }
    Ok(ExitCode::SUCCESS)
}

/// Install the logger. Normal output is bare messages on stderr; `--verbose`
/// switches to the timestamped, level-tagged format. `RUST_LOG` wins when set.
fn init_logger(quiet: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    builder.init();
}

/// Print an empty line through the logger so `--quiet` silences it too.
pub(crate) fn log_blank() {
    log::info!("");
}
