use std::fmt;

use gamenest_core::GameId;

/// Which save to keep when local and remote saves have both changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveLocation {
    #[default]
    None,
    Local,
    Remote,
}

/// What another device is doing with this title's cloud saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOperationKind {
    UploadInProgress,
    UploadPending,
    SessionActive,
    SessionSuspended,
    None,
}

impl fmt::Display for PendingOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PendingOperationKind::UploadInProgress => "upload in progress",
            PendingOperationKind::UploadPending => "upload pending",
            PendingOperationKind::SessionActive => "session active",
            PendingOperationKind::SessionSuspended => "session suspended",
            PendingOperationKind::None => "none",
        };
        f.write_str(s)
    }
}

/// One unresolved cross-device cloud state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRemoteOperation {
    pub machine_name: String,
    /// Last update, unix seconds.
    pub timestamp_seconds: i64,
    pub kind: PendingOperationKind,
}

impl PendingRemoteOperation {
    pub fn new(machine_name: impl Into<String>, timestamp_seconds: i64, kind: PendingOperationKind) -> Self {
        Self {
            machine_name: machine_name.into(),
            timestamp_seconds,
            kind,
        }
    }
}

/// Result of one cloud synchronization attempt, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success,
    UpToDate,
    /// Local and remote saves both changed since the last sync.
    Conflict { local_ts: i64, remote_ts: i64 },
    InProgress,
    PendingOperations(Vec<PendingRemoteOperation>),
    DownloadFail,
    UpdateFail,
    UnknownFail,
}

impl SyncOutcome {
    /// `Success` and `UpToDate` both mean the title may launch.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success | SyncOutcome::UpToDate)
    }

    /// The failure this outcome represents, if it is a terminal failure.
    pub fn failure(&self) -> Option<SyncFailure> {
        match self {
            SyncOutcome::DownloadFail => Some(SyncFailure::DownloadFail),
            SyncOutcome::UpdateFail => Some(SyncFailure::UpdateFail),
            SyncOutcome::UnknownFail => Some(SyncFailure::UnknownFail),
            _ => None,
        }
    }
}

/// Terminal synchronization failures; never retried by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFailure {
    DownloadFail,
    UpdateFail,
    UnknownFail,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncFailure::DownloadFail => "download failed",
            SyncFailure::UpdateFail => "update failed",
            SyncFailure::UnknownFail => "unknown failure",
        };
        f.write_str(s)
    }
}

/// What the caller should do after launch preparation.
///
/// Everything except [`LaunchDecision::Proceed`] is a point where the user
/// has to be told something or asked to choose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchDecision {
    Proceed,
    /// The account is already playing another title on a different device.
    OtherTitleActive { playing: GameId },
    /// Re-request with a [`SaveLocation`] to resolve.
    SaveConflict { local_ts: i64, remote_ts: i64 },
    /// Sync was still running when preparation gave up.
    SyncInProgress { retries: u8 },
    SyncFailed(SyncFailure),
    UploadInProgress(PendingRemoteOperation),
    UploadPending(PendingRemoteOperation),
    AppSessionActive(PendingRemoteOperation),
    AppSessionSuspended(PendingRemoteOperation),
    /// The provider reported a pending operation of kind `None`, or an
    /// empty pending list.
    PendingOperationNone(Option<PendingRemoteOperation>),
    MultiplePendingOperations(Vec<PendingRemoteOperation>),
}

impl LaunchDecision {
    pub fn proceeds(&self) -> bool {
        matches!(self, LaunchDecision::Proceed)
    }

    /// Whether the user may override the block and launch anyway.
    pub fn offers_play_anyway(&self) -> bool {
        matches!(
            self,
            LaunchDecision::OtherTitleActive { .. }
                | LaunchDecision::UploadPending(_)
                | LaunchDecision::AppSessionActive(_)
        )
    }

    /// Whether the user must pick a save to keep.
    pub fn offers_save_choice(&self) -> bool {
        matches!(self, LaunchDecision::SaveConflict { .. })
    }

    /// Human-readable explanation for display.
    pub fn summary(&self) -> String {
        match self {
            LaunchDecision::Proceed => "Ready to launch".to_string(),
            LaunchDecision::OtherTitleActive { playing } => format!(
                "You are logged in on another device already playing {}. \
                 Playing this game will disconnect the other session.",
                playing
            ),
            LaunchDecision::SaveConflict { local_ts, remote_ts } => format!(
                "There is a new remote save and a new local save (local: {}, remote: {}). \
                 Choose which one to keep.",
                local_ts, remote_ts
            ),
            LaunchDecision::SyncInProgress { retries } if *retries > 0 => format!(
                "Sync operation is taking too long (gave up after {} retries). \
                 Please try launching the game again in a moment.",
                retries
            ),
            LaunchDecision::SyncInProgress { .. } => {
                "Sync is currently in progress. Please try again in a moment.".to_string()
            }
            LaunchDecision::SyncFailed(failure) => {
                format!("Failed to sync save files: {}.", failure)
            }
            LaunchDecision::UploadInProgress(op) => format!(
                "An upload of save files from {} is still in progress. \
                 Wait for it to finish before launching.",
                op.machine_name
            ),
            LaunchDecision::UploadPending(op) => format!(
                "{} has save files that have not been uploaded yet. \
                 Playing now may cause a conflict later.",
                op.machine_name
            ),
            LaunchDecision::AppSessionActive(op) => format!(
                "This game is currently running on {}. \
                 Playing here will disconnect that session.",
                op.machine_name
            ),
            LaunchDecision::AppSessionSuspended(op) => format!(
                "This game has a suspended session on {}. \
                 Close it there before launching here.",
                op.machine_name
            ),
            LaunchDecision::PendingOperationNone(_) => {
                "The cloud reported a pending operation with nothing pending. \
                 Try launching again."
                    .to_string()
            }
            LaunchDecision::MultiplePendingOperations(ops) => format!(
                "{} pending cloud operations are blocking this launch. \
                 Please try again later.",
                ops.len()
            ),
        }
    }
}
