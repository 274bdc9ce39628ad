use super::*;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::time::{Duration, Instant};

/// Replays scripted outcomes; the last one repeats once the script runs out.
struct ScriptedCloud {
    script: Mutex<VecDeque<SyncOutcome>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(bool, SaveLocation, bool, Option<PathBuf>)>>,
}

impl ScriptedCloud {
    fn new(script: Vec<SyncOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudSyncProvider for ScriptedCloud {
    async fn begin_launch(&self, request: &CloudSyncRequest<'_>) -> SyncOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((
            request.ignore_pending_operations,
            request.preferred_save,
            request.is_offline,
            request
                .path_resolver
                .resolve("%GameInstall%", request.game_id.numeric()),
        ));
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}

#[derive(Default)]
struct FakePresence {
    playing: Option<GameId>,
    fail: bool,
    kicks: AtomicUsize,
}

#[async_trait]
impl PresenceProvider for FakePresence {
    async fn currently_playing(&self) -> Result<Option<GameId>, PresenceError> {
        if self.fail {
            Err(PresenceError::Unavailable("persona state unknown".into()))
        } else {
            Ok(self.playing)
        }
    }

    async fn kick_playing_session(&self) -> Result<(), PresenceError> {
        self.kicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn steam(id: u32) -> GameId {
    GameId::steam(id).unwrap()
}

fn op(kind: PendingOperationKind) -> PendingRemoteOperation {
    PendingRemoteOperation::new("DESKTOP-1", 1_700_000_000, kind)
}

async fn decide(script: Vec<SyncOutcome>, request: LaunchRequest) -> (LaunchDecision, usize) {
    let coordinator = LaunchSyncCoordinator::new(ScriptedCloud::new(script), NoPresence);
    let decision = coordinator.prepare_launch(&request).await;
    (decision, coordinator.cloud.calls())
}

#[tokio::test]
async fn conflict_is_surfaced_with_both_timestamps() {
    let (decision, _) = decide(
        vec![SyncOutcome::Conflict {
            local_ts: 1000,
            remote_ts: 2000,
        }],
        LaunchRequest::new(steam(10)),
    )
    .await;
    assert_eq!(
        decision,
        LaunchDecision::SaveConflict {
            local_ts: 1000,
            remote_ts: 2000
        }
    );
    assert!(decision.offers_save_choice());
    assert!(!decision.proceeds());
}

#[tokio::test(start_paused = true)]
async fn automated_launch_retries_until_success() {
    let start = Instant::now();
    let (decision, calls) = decide(
        vec![
            SyncOutcome::InProgress,
            SyncOutcome::InProgress,
            SyncOutcome::InProgress,
            SyncOutcome::InProgress,
            SyncOutcome::Success,
        ],
        LaunchRequest::new(steam(10)).with_mode(LaunchMode::Automated),
    )
    .await;
    assert_eq!(decision, LaunchDecision::Proceed);
    assert_eq!(calls, 5);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(8) && elapsed < Duration::from_secs(9));
}

#[tokio::test(start_paused = true)]
async fn automated_launch_gives_up_after_five_retries() {
    let start = Instant::now();
    let (decision, calls) = decide(
        vec![SyncOutcome::InProgress; 6],
        LaunchRequest::new(steam(10)).with_mode(LaunchMode::Automated),
    )
    .await;
    assert_eq!(decision, LaunchDecision::SyncInProgress { retries: 5 });
    assert_eq!(calls, 6);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
    assert!(decision.summary().contains("taking too long"));
}

#[tokio::test(start_paused = true)]
async fn dropping_preparation_stops_retrying() {
    let coordinator =
        LaunchSyncCoordinator::new(ScriptedCloud::new(vec![SyncOutcome::InProgress]), NoPresence);
    let request = LaunchRequest::new(steam(10)).with_mode(LaunchMode::Automated);

    // Attempts run at 0s and 2s; the deadline lands inside the second delay.
    let outcome = tokio::time::timeout(
        Duration::from_secs(3),
        coordinator.prepare_launch(&request),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(coordinator.cloud.calls(), 2);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(coordinator.cloud.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn interactive_launch_surfaces_in_progress_at_once() {
    let start = Instant::now();
    let (decision, calls) =
        decide(vec![SyncOutcome::InProgress], LaunchRequest::new(steam(10))).await;
    assert_eq!(decision, LaunchDecision::SyncInProgress { retries: 0 });
    assert_eq!(calls, 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn two_pending_operations_collapse_into_one_case() {
    let ops = vec![
        op(PendingOperationKind::UploadPending),
        op(PendingOperationKind::SessionActive),
    ];
    let (decision, _) = decide(
        vec![SyncOutcome::PendingOperations(ops.clone())],
        LaunchRequest::new(steam(10)),
    )
    .await;
    assert_eq!(decision, LaunchDecision::MultiplePendingOperations(ops));
    assert!(!decision.offers_play_anyway());
}

#[test]
fn single_pending_operation_is_classified_by_kind() {
    let single = |kind| classify(SyncOutcome::PendingOperations(vec![op(kind)]), 0);

    assert_eq!(
        single(PendingOperationKind::UploadInProgress),
        LaunchDecision::UploadInProgress(op(PendingOperationKind::UploadInProgress))
    );
    let pending = single(PendingOperationKind::UploadPending);
    assert!(matches!(pending, LaunchDecision::UploadPending(_)));
    assert!(pending.offers_play_anyway());
    let active = single(PendingOperationKind::SessionActive);
    assert!(matches!(active, LaunchDecision::AppSessionActive(_)));
    assert!(active.offers_play_anyway());
    let suspended = single(PendingOperationKind::SessionSuspended);
    assert!(matches!(suspended, LaunchDecision::AppSessionSuspended(_)));
    assert!(!suspended.offers_play_anyway());
    assert_eq!(
        single(PendingOperationKind::None),
        LaunchDecision::PendingOperationNone(Some(op(PendingOperationKind::None)))
    );
}

#[test]
fn empty_pending_list_is_informational() {
    assert_eq!(
        classify(SyncOutcome::PendingOperations(Vec::new()), 0),
        LaunchDecision::PendingOperationNone(None)
    );
}

#[test]
fn terminal_failures_are_surfaced_verbatim() {
    for (outcome, failure) in [
        (SyncOutcome::DownloadFail, SyncFailure::DownloadFail),
        (SyncOutcome::UpdateFail, SyncFailure::UpdateFail),
        (SyncOutcome::UnknownFail, SyncFailure::UnknownFail),
    ] {
        assert_eq!(outcome.failure(), Some(failure));
        assert_eq!(classify(outcome, 0), LaunchDecision::SyncFailed(failure));
    }
    assert_eq!(classify(SyncOutcome::UpToDate, 0), LaunchDecision::Proceed);
}

#[tokio::test(start_paused = true)]
async fn failures_are_not_retried_even_when_automated() {
    let (decision, calls) = decide(
        vec![SyncOutcome::DownloadFail],
        LaunchRequest::new(steam(10)).with_mode(LaunchMode::Automated),
    )
    .await;
    assert_eq!(decision, LaunchDecision::SyncFailed(SyncFailure::DownloadFail));
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn custom_games_bypass_cloud_sync() {
    let (decision, calls) = decide(
        vec![SyncOutcome::UnknownFail],
        LaunchRequest::new(GameId::custom(77).unwrap()),
    )
    .await;
    assert_eq!(decision, LaunchDecision::Proceed);
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn other_title_playing_elsewhere_blocks_launch() {
    let presence = FakePresence {
        playing: Some(steam(99)),
        ..Default::default()
    };
    let coordinator =
        LaunchSyncCoordinator::new(ScriptedCloud::new(vec![SyncOutcome::Success]), presence);
    let request = LaunchRequest::new(steam(10));

    let decision = coordinator.prepare_launch(&request).await;
    assert_eq!(decision, LaunchDecision::OtherTitleActive { playing: steam(99) });
    assert!(decision.offers_play_anyway());
    assert_eq!(coordinator.cloud.calls(), 0);

    let taken_over = coordinator.take_over_session(&request).await;
    assert_eq!(taken_over, LaunchDecision::Proceed);
    assert_eq!(coordinator.presence.kicks.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.cloud.calls(), 1);
}

#[tokio::test]
async fn same_title_or_offline_skips_presence_block() {
    let same = LaunchSyncCoordinator::new(
        ScriptedCloud::new(vec![SyncOutcome::Success]),
        FakePresence {
            playing: Some(steam(10)),
            ..Default::default()
        },
    );
    assert!(same.prepare_launch(&LaunchRequest::new(steam(10))).await.proceeds());

    let other = LaunchSyncCoordinator::new(
        ScriptedCloud::new(vec![SyncOutcome::Success]),
        FakePresence {
            playing: Some(steam(99)),
            ..Default::default()
        },
    );
    let offline = LaunchRequest::new(steam(10)).offline(true);
    assert!(other.prepare_launch(&offline).await.proceeds());
}

#[tokio::test]
async fn presence_failures_are_ignored() {
    let coordinator = LaunchSyncCoordinator::new(
        ScriptedCloud::new(vec![SyncOutcome::UpToDate]),
        FakePresence {
            fail: true,
            ..Default::default()
        },
    );
    assert_eq!(
        coordinator.prepare_launch(&LaunchRequest::new(steam(10))).await,
        LaunchDecision::Proceed
    );
}

#[tokio::test]
async fn follow_up_flags_reach_the_cloud_provider() {
    let resolver = PrefixPathResolver::new().with_per_app("GameInstall", "/games/steam");
    let coordinator =
        LaunchSyncCoordinator::new(ScriptedCloud::new(vec![SyncOutcome::Success]), NoPresence)
            .with_path_resolver(Arc::new(resolver));
    let request = LaunchRequest::new(steam(42))
        .with_preferred_save(SaveLocation::Remote)
        .ignoring_pending_operations()
        .offline(true);

    coordinator.prepare_launch(&request).await;
    let seen = coordinator.cloud.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(
            true,
            SaveLocation::Remote,
            true,
            Some(Path::new("/games/steam").join("42"))
        )]
    );
}

#[test]
fn prefix_resolver_matches_tokens_case_insensitively() {
    let resolver = PrefixPathResolver::new()
        .with_shared("%WinMyDocuments%", "/prefix/Documents")
        .with_per_app("GameInstall", "/games");
    assert_eq!(
        resolver.resolve("winmydocuments", 5),
        Some(PathBuf::from("/prefix/Documents"))
    );
    assert_eq!(resolver.resolve("%GAMEINSTALL%", 5), Some(PathBuf::from("/games/5")));
    assert_eq!(resolver.resolve("%SteamUserData%", 5), None);
}

#[tokio::test]
async fn local_only_cloud_sync_depends_on_offline_flag() {
    let resolver = PrefixPathResolver::new();
    let mut request = CloudSyncRequest {
        game_id: steam(1),
        path_resolver: &resolver,
        ignore_pending_operations: false,
        preferred_save: SaveLocation::None,
        is_offline: true,
    };
    assert_eq!(LocalOnlyCloudSync.begin_launch(&request).await, SyncOutcome::UpToDate);
    request.is_offline = false;
    assert_eq!(LocalOnlyCloudSync.begin_launch(&request).await, SyncOutcome::UnknownFail);
}

#[test]
fn summaries_are_descriptive() {
    assert_eq!(LaunchDecision::Proceed.summary(), "Ready to launch");
    assert!(
        LaunchDecision::SyncFailed(SyncFailure::UpdateFail)
            .summary()
            .contains("update failed")
    );
    assert!(
        LaunchDecision::AppSessionActive(op(PendingOperationKind::SessionActive))
            .summary()
            .contains("DESKTOP-1")
    );
    assert!(
        LaunchDecision::OtherTitleActive { playing: steam(99) }
            .summary()
            .contains("STEAM_99")
    );
}
