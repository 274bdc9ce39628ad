//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use gamenest_lib::GameId;
use gamenest_lib::launch::SaveLocation;

#[derive(Parser)]
#[command(name = "gamenest")]
#[command(about = "Discover and launch games from folders on disk", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List every game found in the library roots and manual folders
    Scan {
        /// Only list games whose folder name contains this text (case-insensitive)
        #[arg(short, long)]
        query: Option<String>,

        /// Skip background icon extraction for newly found games
        #[arg(long)]
        no_enrich: bool,
    },

    /// Count candidate game folders per library root
    Count {
        /// Only count folders whose name contains this text (case-insensitive)
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Print the folder a game id resolves to (e.g. CUSTOM_GAME_12345)
    Lookup { game_id: GameId },

    /// Show the launchable executable(s) in a folder
    Exes {
        folder: PathBuf,

        /// List every candidate instead of only a unique one
        #[arg(short, long)]
        all: bool,
    },

    /// Print the icon file chosen for a game
    Icon { game_id: GameId },

    /// Inspect or edit a folder's sidecar metadata
    Meta {
        #[command(subcommand)]
        action: MetaAction,
    },

    /// Manage library roots
    Roots {
        #[command(subcommand)]
        action: RootsAction,
    },

    /// Manage folders registered as single games
    Manual {
        #[command(subcommand)]
        action: ManualAction,
    },

    /// Prepare a launch: session check and cloud-save sync
    Launch {
        game_id: GameId,

        /// Treat the device as offline (skips the other-device check)
        #[arg(long)]
        offline: bool,

        /// Retry in-progress syncs like an external launch request would
        #[arg(long)]
        automated: bool,

        /// Resolve a save conflict by keeping this copy
        #[arg(long, value_enum)]
        prefer: Option<SaveChoice>,

        /// Launch despite an upload or session on another device
        #[arg(long)]
        ignore_pending: bool,

        /// Disconnect a session on another device before syncing
        #[arg(long)]
        take_over: bool,
    },

    /// Show settings file information
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum MetaAction {
    /// Print the sidecar contents of a folder
    Show { folder: PathBuf },

    /// Merge fields into a folder's sidecar (creates it when --id is given)
    Set {
        folder: PathBuf,

        /// Numeric game id to record
        #[arg(long)]
        id: Option<u32>,

        /// Mark artwork as already fetched
        #[arg(long)]
        fetched: bool,

        /// Release date in unix seconds
        #[arg(long)]
        release_date: Option<i64>,
    },
}

#[derive(Subcommand)]
pub(crate) enum RootsAction {
    /// List configured roots
    List,

    /// Add a root directory
    Add { path: PathBuf },

    /// Remove a root directory
    Remove { path: PathBuf },
}

#[derive(Subcommand)]
pub(crate) enum ManualAction {
    /// List registered folders
    List,

    /// Register a single game folder
    Add { path: PathBuf },

    /// Unregister a folder
    Remove { path: PathBuf },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the settings file path
    Path,

    /// Print the effective settings
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum SaveChoice {
    Local,
    Remote,
}

impl From<SaveChoice> for SaveLocation {
    fn from(choice: SaveChoice) -> Self {
        match choice {
            SaveChoice::Local => SaveLocation::Local,
            SaveChoice::Remote => SaveLocation::Remote,
        }
    }
}
