//! Launch preparation: cross-device session check and cloud-save sync.
//!
//! [`LaunchSyncCoordinator::prepare_launch`] turns one launch request into a
//! single [`LaunchDecision`]:
//!
//! 1. If the account is playing a different title elsewhere (and we are
//!    online), stop and let the user decide. Presence failures count as
//!    "nothing playing".
//! 2. Titles whose source has no cloud saves proceed without any sync.
//! 3. Otherwise ask the cloud provider to sync, retrying in-progress syncs
//!    for automated launches, and classify the final outcome.
//!
//! Dropping the returned future cancels preparation, including between
//! retry attempts.

mod outcome;
mod provider;
mod retry;

pub use outcome::{
    LaunchDecision, PendingOperationKind, PendingRemoteOperation, SaveLocation, SyncFailure,
    SyncOutcome,
};
pub use provider::{
    CloudSyncProvider, CloudSyncRequest, LocalOnlyCloudSync, NoPresence, PrefixPathResolver,
    PresenceError, PresenceProvider, SavePathResolver,
};
pub use retry::{LaunchMode, MAX_RETRIES, RETRY_DELAY, RetryPolicy, RetryStep};

use std::sync::Arc;

use gamenest_core::GameId;

/// One request to launch a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub game_id: GameId,
    pub ignore_pending_operations: bool,
    pub preferred_save: SaveLocation,
    pub is_offline: bool,
    pub mode: LaunchMode,
}

impl LaunchRequest {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            ignore_pending_operations: false,
            preferred_save: SaveLocation::None,
            is_offline: false,
            mode: LaunchMode::Interactive,
        }
    }

    pub fn offline(mut self, is_offline: bool) -> Self {
        self.is_offline = is_offline;
        self
    }

    pub fn with_mode(mut self, mode: LaunchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Follow-up to a save conflict: keep the chosen save.
    pub fn with_preferred_save(mut self, preferred_save: SaveLocation) -> Self {
        self.preferred_save = preferred_save;
        self
    }

    /// Follow-up to a "play anyway" choice on a pending operation.
    pub fn ignoring_pending_operations(mut self) -> Self {
        self.ignore_pending_operations = true;
        self
    }
}

/// Map a final sync outcome to the caller-facing decision.
pub fn classify(outcome: SyncOutcome, retries: u8) -> LaunchDecision {
    match outcome {
        SyncOutcome::Success | SyncOutcome::UpToDate => LaunchDecision::Proceed,
        SyncOutcome::Conflict {
            local_ts,
            remote_ts,
        } => LaunchDecision::SaveConflict {
            local_ts,
            remote_ts,
        },
        SyncOutcome::InProgress => LaunchDecision::SyncInProgress { retries },
        SyncOutcome::DownloadFail => LaunchDecision::SyncFailed(SyncFailure::DownloadFail),
        SyncOutcome::UpdateFail => LaunchDecision::SyncFailed(SyncFailure::UpdateFail),
        SyncOutcome::UnknownFail => LaunchDecision::SyncFailed(SyncFailure::UnknownFail),
        SyncOutcome::PendingOperations(mut ops) => match ops.len() {
            0 => {
                log::warn!("Pending operations reported without any operation");
                LaunchDecision::PendingOperationNone(None)
            }
            1 => {
                let op = ops.remove(0);
                match op.kind {
                    PendingOperationKind::UploadInProgress => LaunchDecision::UploadInProgress(op),
                    PendingOperationKind::UploadPending => LaunchDecision::UploadPending(op),
                    PendingOperationKind::SessionActive => LaunchDecision::AppSessionActive(op),
                    PendingOperationKind::SessionSuspended => {
                        LaunchDecision::AppSessionSuspended(op)
                    }
                    PendingOperationKind::None => LaunchDecision::PendingOperationNone(Some(op)),
                }
            }
            _ => LaunchDecision::MultiplePendingOperations(ops),
        },
    }
}

/// Decides whether a title may launch.
pub struct LaunchSyncCoordinator<C, P> {
    cloud: C,
    presence: P,
    resolver: Arc<dyn SavePathResolver>,
    policy: RetryPolicy,
}

impl<C, P> LaunchSyncCoordinator<C, P>
where
    C: CloudSyncProvider,
    P: PresenceProvider,
{
    pub fn new(cloud: C, presence: P) -> Self {
        Self {
            cloud,
            presence,
            resolver: Arc::new(PrefixPathResolver::new()),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_path_resolver(mut self, resolver: Arc<dyn SavePathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full launch preparation for `request`.
    pub async fn prepare_launch(&self, request: &LaunchRequest) -> LaunchDecision {
        if let Some(playing) = self.other_title_playing(request).await {
            log::info!(
                "{} is already playing on another device, asking before launching {}",
                playing,
                request.game_id
            );
            return LaunchDecision::OtherTitleActive { playing };
        }
        self.synchronize(request).await
    }

    /// "Play anyway" after [`LaunchDecision::OtherTitleActive`]: disconnect
    /// the other session, then prepare without repeating the presence check.
    pub async fn take_over_session(&self, request: &LaunchRequest) -> LaunchDecision {
        if let Err(e) = self.presence.kick_playing_session().await {
            log::warn!("Failed to disconnect the other session: {}", e);
        }
        self.synchronize(request).await
    }

    async fn other_title_playing(&self, request: &LaunchRequest) -> Option<GameId> {
        if request.is_offline {
            return None;
        }
        match self.presence.currently_playing().await {
            Ok(Some(playing)) if playing != request.game_id => Some(playing),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Ignoring presence lookup failure: {}", e);
                None
            }
        }
    }

    async fn synchronize(&self, request: &LaunchRequest) -> LaunchDecision {
        let source = request.game_id.source();
        if !source.has_cloud_saves() {
            log::debug!(
                "{} is a {} title, skipping cloud sync",
                request.game_id,
                source.display_name()
            );
            return LaunchDecision::Proceed;
        }

        let sync_request = CloudSyncRequest {
            game_id: request.game_id,
            path_resolver: self.resolver.as_ref(),
            ignore_pending_operations: request.ignore_pending_operations,
            preferred_save: request.preferred_save,
            is_offline: request.is_offline,
        };

        let mut retries: u8 = 0;
        loop {
            let outcome = self.cloud.begin_launch(&sync_request).await;
            match self.policy.next_step(request.mode, &outcome, retries) {
                RetryStep::RetryAfter(delay) => {
                    retries += 1;
                    log::info!(
                        "Sync in progress for {}, retrying in {}s (attempt {}/{})",
                        request.game_id,
                        delay.as_secs(),
                        retries,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryStep::Surface => {
                    if let SyncOutcome::PendingOperations(ops) = &outcome {
                        for op in ops {
                            log::info!(
                                "Pending remote operation on {} at {}: {}",
                                op.machine_name,
                                op.timestamp_seconds,
                                op.kind
                            );
                        }
                    }
                    return classify(outcome, retries);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/launch_tests.rs"]
mod tests;
