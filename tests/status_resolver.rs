mod common;

use common::{applied, network_error, not_applied, yield_now, FakeBoard};
use jobsift::api::SuccessResponse;
use jobsift::domain::{ApplicationRecord, ApplicationStatus};
use jobsift::{
    ApplicationState, ApplicationStatuses, ErrorInfo, ErrorKind, Notice, NOTICE_CAPACITY,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn mount_loads_then_resolves() {
    let fake = FakeBoard::new();
    fake.status("job-1", 100, Ok(applied("app-1")));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-1");
    assert_eq!(card.entry().state, ApplicationState::Loading);

    sleep(Duration::from_millis(150)).await;
    let entry = card.entry();
    assert_eq!(entry.state, ApplicationState::Resolved);
    assert!(entry.has_applied);
    assert_eq!(entry.application.map(|a| a.id).as_deref(), Some("app-1"));
}

#[tokio::test(start_paused = true)]
async fn remounting_reuses_the_memoized_entry() {
    let fake = FakeBoard::new();
    fake.status("job-1", 10, Ok(applied("app-1")));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-1");
    sleep(Duration::from_millis(20)).await;
    drop(card);

    let again = statuses.mount("job-1");
    assert!(again.entry().has_applied);
    yield_now().await;
    assert_eq!(fake.status_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_response_of_unmounted_card_is_never_shown() {
    let fake = FakeBoard::new();
    fake.status("job-x", 500, Ok(applied("app-x")));
    fake.status("job-x", 100, Ok(not_applied()));
    fake.status("job-y", 100, Ok(not_applied()));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-x");
    sleep(Duration::from_millis(50)).await;
    drop(card);
    assert_eq!(statuses.entry("job-x").state, ApplicationState::Idle);

    let other = statuses.mount("job-y");
    let fresh = statuses.mount("job-x");
    sleep(Duration::from_millis(1000)).await;

    assert!(!other.entry().has_applied);
    assert!(other.entry().application.is_none());
    let entry = fresh.entry();
    assert_eq!(entry.state, ApplicationState::Resolved);
    assert!(!entry.has_applied, "late data of the unmounted card leaked");
    assert_eq!(fake.status_calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn two_live_cards_share_one_request() {
    let fake = FakeBoard::new();
    fake.status("job-1", 100, Ok(applied("app-1")));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let first = statuses.mount("job-1");
    let second = statuses.mount("job-1");
    sleep(Duration::from_millis(150)).await;

    assert!(first.entry().has_applied);
    assert!(second.entry().has_applied);
    assert_eq!(fake.status_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn surviving_card_refetches_when_owner_unmounts() {
    let fake = FakeBoard::new();
    fake.status("job-1", 300, Ok(applied("stale")));
    fake.status("job-1", 100, Ok(not_applied()));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let owner = statuses.mount("job-1");
    let survivor = statuses.mount("job-1");
    sleep(Duration::from_millis(50)).await;
    drop(owner);

    assert!(survivor.entry().is_loading());
    sleep(Duration::from_millis(500)).await;
    assert!(survivor.entry().is_resolved());
    assert!(!survivor.entry().has_applied);
    assert_eq!(fake.status_calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failure_is_local_and_retryable() {
    let fake = FakeBoard::new();
    fake.status("job-1", 10, Err(network_error()));
    fake.status("job-2", 10, Ok(applied("app-2")));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let broken = statuses.mount("job-1");
    let healthy = statuses.mount("job-2");
    sleep(Duration::from_millis(20)).await;

    let entry = broken.entry();
    assert_eq!(entry.state, ApplicationState::Error);
    assert_eq!(entry.error.map(|e| e.kind), Some(ErrorKind::Network));
    assert!(healthy.entry().has_applied);

    broken.retry();
    assert!(broken.entry().is_loading());
    sleep(Duration::from_millis(20)).await;
    assert!(broken.entry().is_resolved());
}

#[tokio::test(start_paused = true)]
async fn hung_status_request_times_out_into_error() {
    let fake = FakeBoard::new();
    fake.status("job-1", 120_000, Ok(applied("app-1")));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-1");
    sleep(Duration::from_secs(31)).await;

    let entry = card.entry();
    assert_eq!(entry.state, ApplicationState::Error);
    assert_eq!(entry.error.map(|e| e.kind), Some(ErrorKind::Timeout));
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_seen_by_every_mounted_card() {
    let fake = FakeBoard::new();
    fake.status("job-1", 10, Ok(applied("app-1")));
    let statuses = ApplicationStatuses::new(fake.gateway());
    let mut changes = statuses.subscribe();

    let list_card = statuses.mount("job-1");
    let detail_card = statuses.mount("job-1");
    sleep(Duration::from_millis(20)).await;
    changes.borrow_and_update();

    statuses.cancel_application("app-1").await.unwrap();

    assert!(changes.has_changed().unwrap());
    for card in [&list_card, &detail_card] {
        let entry = card.entry();
        assert_eq!(entry.state, ApplicationState::Resolved);
        assert!(!entry.has_applied);
        assert!(entry.application.is_none());
    }
    assert_eq!(fake.cancel_calls(), vec!["app-1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failed_cancellation_leaves_entry_unchanged() {
    let fake = FakeBoard::new();
    fake.status("job-1", 10, Ok(applied("app-1")));
    fake.cancel(10, Err(network_error()));
    fake.cancel(10, Ok(SuccessResponse { success: false }));
    let (tx, mut notices) = mpsc::channel(NOTICE_CAPACITY);
    let statuses = ApplicationStatuses::with_notices(fake.gateway(), tx);

    let card = statuses.mount("job-1");
    sleep(Duration::from_millis(20)).await;
    let before = card.entry();

    let error = statuses.cancel_application("app-1").await.unwrap_err();
    assert!(ErrorInfo::from(&error).retryable);
    assert_eq!(card.entry(), before);
    assert!(matches!(
        notices.try_recv(),
        Ok(Notice::CancellationFailed { application_id, .. }) if application_id == "app-1"
    ));

    assert!(statuses.cancel_application("app-1").await.is_err());
    assert_eq!(card.entry(), before);
}

#[tokio::test(start_paused = true)]
async fn invalidate_refetches_mounted_cards() {
    let fake = FakeBoard::new();
    fake.status("job-1", 10, Ok(not_applied()));
    fake.status("job-1", 10, Ok(applied("app-1")));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-1");
    sleep(Duration::from_millis(20)).await;
    assert!(!card.entry().has_applied);

    statuses.invalidate("job-1");
    assert!(card.entry().is_loading());
    sleep(Duration::from_millis(20)).await;
    assert!(card.entry().has_applied);
}

#[tokio::test(start_paused = true)]
async fn recorded_submission_supersedes_a_pending_load() {
    let fake = FakeBoard::new();
    fake.status("job-1", 200, Ok(not_applied()));
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-1");
    statuses.record_submission(
        "job-1",
        ApplicationRecord {
            id: "app-new".to_string(),
            status: ApplicationStatus::Pending,
            applied_at: chrono::Utc::now(),
        },
    );
    sleep(Duration::from_millis(300)).await;

    let entry = card.entry();
    assert!(entry.has_applied);
    assert_eq!(entry.application.map(|a| a.id).as_deref(), Some("app-new"));
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

#[test]
fn owner_dropped_outside_the_runtime_still_hands_over_the_load() {
    let runtime = paused_runtime();
    let fake = FakeBoard::new();
    fake.status("job-1", 300, Ok(applied("stale")));
    fake.status("job-1", 100, Ok(not_applied()));

    let (statuses, owner, heir) = runtime.block_on(async {
        let statuses = ApplicationStatuses::new(fake.gateway());
        let owner = statuses.mount("job-1");
        let heir = statuses.mount("job-1");
        sleep(Duration::from_millis(50)).await;
        (statuses, owner, heir)
    });

    drop(owner);
    assert!(heir.entry().is_loading());

    runtime.block_on(async { sleep(Duration::from_secs(1)).await });
    let entry = heir.entry();
    assert!(entry.is_resolved());
    assert!(!entry.has_applied);
    assert_eq!(fake.status_calls().len(), 2);
    drop((heir, statuses));
}

#[test]
fn without_any_runtime_a_mount_fails_instead_of_loading_forever() {
    let fake = FakeBoard::new();
    let statuses = ApplicationStatuses::new(fake.gateway());

    let card = statuses.mount("job-1");
    let entry = card.entry();
    assert_eq!(entry.state, ApplicationState::Error);
    assert_eq!(entry.error.map(|e| e.kind), Some(ErrorKind::Internal));
    assert!(fake.status_calls().is_empty());

    let runtime = paused_runtime();
    let _guard = runtime.enter();
    card.retry();
    assert!(card.entry().is_loading());
}
