//! Collaborators consulted while preparing a launch.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use gamenest_core::GameId;
use thiserror::Error;

use super::outcome::{SaveLocation, SyncOutcome};

/// Maps a cloud save path prefix (e.g. `%GameInstall%`) to a local directory.
pub trait SavePathResolver: Send + Sync {
    fn resolve(&self, prefix: &str, app_id: u32) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PrefixBase {
    Shared(PathBuf),
    PerApp(PathBuf),
}

/// Table-driven [`SavePathResolver`].
///
/// Prefixes match case-insensitively with or without surrounding `%`.
/// Per-app prefixes resolve to `<base>/<app_id>`.
#[derive(Debug, Clone, Default)]
pub struct PrefixPathResolver {
    bases: BTreeMap<String, PrefixBase>,
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().trim_matches('%').to_lowercase()
}

impl PrefixPathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `prefix` to `base` for every app.
    pub fn with_shared(mut self, prefix: &str, base: impl Into<PathBuf>) -> Self {
        self.bases
            .insert(normalize_prefix(prefix), PrefixBase::Shared(base.into()));
        self
    }

    /// Resolve `prefix` to a per-app directory under `base`.
    pub fn with_per_app(mut self, prefix: &str, base: impl Into<PathBuf>) -> Self {
        self.bases
            .insert(normalize_prefix(prefix), PrefixBase::PerApp(base.into()));
        self
    }
}

impl SavePathResolver for PrefixPathResolver {
    fn resolve(&self, prefix: &str, app_id: u32) -> Option<PathBuf> {
        match self.bases.get(&normalize_prefix(prefix))? {
            PrefixBase::Shared(base) => Some(base.clone()),
            PrefixBase::PerApp(base) => Some(base.join(app_id.to_string())),
        }
    }
}

/// Everything the cloud-sync provider needs for one attempt.
pub struct CloudSyncRequest<'a> {
    pub game_id: GameId,
    pub path_resolver: &'a dyn SavePathResolver,
    pub ignore_pending_operations: bool,
    pub preferred_save: SaveLocation,
    pub is_offline: bool,
}

/// Synchronizes cloud saves before a launch.
#[async_trait]
pub trait CloudSyncProvider: Send + Sync {
    async fn begin_launch(&self, request: &CloudSyncRequest<'_>) -> SyncOutcome;
}

/// Errors from the presence collaborator.
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Presence unavailable: {0}")]
    Unavailable(String),
}

/// Knows what the signed-in account is playing on other devices.
#[async_trait]
pub trait PresenceProvider: Send + Sync {
    /// Title the account is currently playing anywhere, if any.
    async fn currently_playing(&self) -> Result<Option<GameId>, PresenceError>;

    /// Disconnect the account's game session on the other device.
    async fn kick_playing_session(&self) -> Result<(), PresenceError>;
}

/// Cloud provider for setups without a cloud service.
///
/// Offline launches proceed; online ones fail because nothing can be synced.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOnlyCloudSync;

#[async_trait]
impl CloudSyncProvider for LocalOnlyCloudSync {
    async fn begin_launch(&self, request: &CloudSyncRequest<'_>) -> SyncOutcome {
        if request.is_offline {
            SyncOutcome::UpToDate
        } else {
            log::warn!("No cloud-sync service configured for {}", request.game_id);
            SyncOutcome::UnknownFail
        }
    }
}

/// Presence provider that never sees another session.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPresence;

#[async_trait]
impl PresenceProvider for NoPresence {
    async fn currently_playing(&self) -> Result<Option<GameId>, PresenceError> {
        Ok(None)
    }

    async fn kick_playing_session(&self) -> Result<(), PresenceError> {
        Ok(())
    }
}
