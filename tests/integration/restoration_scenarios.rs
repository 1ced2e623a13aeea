//! End-to-end restoration scenarios
//!
//! Exercises the full wiring: ledger debits and refunds, the credential
//! retry loop, gallery commits, and the rewards that feed the balance.

mod common;

use common::{mock_config, sample_source, TestHarness};

use chrono::NaiveDate;
use relume_common::{CredentialStore, Error};
use relume_genai::mock::{MockRestoreOutcome, MockVideoOutcome};
use relume_ledger::RewardKind;
use relume_restoration::{JobState, RestorationMode, SubmitOutcome};
use relume_works::WorkKind;

#[tokio::test]
async fn test_photo_success_debits_and_commits_through_full_app() {
    let app = relume_app::create_app(mock_config()).await.unwrap();

    let outcome = app
        .flow
        .submit(sample_source(), RestorationMode::Photo)
        .await
        .unwrap();

    let item = match outcome {
        SubmitOutcome::Completed(item) => item,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(app.ledger.balance(), 8);
    assert_eq!(app.gallery.len(), 1);
    assert_eq!(app.gallery.items()[0].id, item.id);
    assert_eq!(item.kind, WorkKind::Photo);

    app.shutdown().await;
}

#[tokio::test]
async fn test_insufficient_energy_is_rejected_before_any_remote_call() {
    let h = TestHarness::new(1);

    let err = h
        .flow
        .submit(sample_source(), RestorationMode::Video)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InsufficientCredit {
            required: 5,
            available: 1
        }
    ));
    assert_eq!(h.ledger.balance(), 1);
    assert!(h.gallery.is_empty());
    assert!(h.video.recorded_requests().is_empty());
    assert_eq!(h.flow.phase(), JobState::Idle);
}

#[tokio::test]
async fn test_rejected_credential_refunds_clears_key_and_resumes() {
    let h = TestHarness::new(10);
    h.restorer.set_outcome(MockRestoreOutcome::InvalidKey);

    let outcome = h
        .flow
        .submit(sample_source(), RestorationMode::Photo)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::CredentialRequired);
    assert_eq!(h.ledger.balance(), 10);
    assert_eq!(h.credentials.get(), None);
    assert_eq!(h.flow.phase(), JobState::AwaitingCredential);
    assert_eq!(h.flow.pending().unwrap().source, sample_source());

    // A new key replays the same submission without a fresh submit call
    h.restorer.set_outcome(MockRestoreOutcome::Succeed);
    let resumed = h.flow.supply_credential("sk-fresh").await.unwrap();

    assert!(matches!(resumed, Some(SubmitOutcome::Completed(_))));
    assert_eq!(h.ledger.balance(), 8);
    assert_eq!(h.gallery.len(), 1);
    assert_eq!(h.restorer.recorded_requests().len(), 2);
}

#[tokio::test]
async fn test_every_failed_job_refunds_exactly_once() {
    let h = TestHarness::new(10);
    h.restorer.set_outcome(MockRestoreOutcome::Fail);

    for _ in 0..3 {
        let err = h
            .flow
            .submit(sample_source(), RestorationMode::Photo)
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(h.ledger.balance(), 10);
    }
    assert!(h.gallery.is_empty());
}

#[tokio::test]
async fn test_empty_restoration_response_is_a_refunded_failure() {
    let h = TestHarness::new(10);
    h.restorer.set_outcome(MockRestoreOutcome::EmptyImage);

    let err = h
        .flow
        .submit(sample_source(), RestorationMode::Photo)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyResult(_)));
    assert_eq!(h.ledger.balance(), 10);
    assert_eq!(h.flow.phase(), JobState::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_video_polling_completes_and_commits() {
    let h = TestHarness::new(10);
    h.video.set_polls_until_done(4);

    let outcome = h
        .flow
        .submit(sample_source(), RestorationMode::Video)
        .await
        .unwrap();

    let item = match outcome {
        SubmitOutcome::Completed(item) => item,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(item.kind, WorkKind::Video);
    assert!(item.locator.starts_with("data:video/mp4;base64,"));
    assert_eq!(h.ledger.balance(), 5);
    assert_eq!(h.video.polls_observed(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_video_poll_budget_exhaustion_refunds() {
    let h = TestHarness::new(10);
    h.video.set_outcome(MockVideoOutcome::NeverDone);

    let err = h
        .flow
        .submit(sample_source(), RestorationMode::Video)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(_)));
    assert_eq!(h.ledger.balance(), 10);
    assert!(h.gallery.is_empty());
}

#[tokio::test]
async fn test_rewards_feed_the_ledger() {
    let app = relume_app::create_app(mock_config()).await.unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    // A check-in is rewarded once per day
    assert!(app.rewards.check_in(today));
    assert!(!app.rewards.check_in(today));
    assert_eq!(app.ledger.balance(), 12);

    app.rewards.claim(RewardKind::RewardedAd);
    app.rewards.claim(RewardKind::InviteFriend);
    assert_eq!(app.ledger.balance(), 27);

    // The next day checks in again
    let tomorrow = today.succ_opt().unwrap();
    assert!(app.rewards.check_in(tomorrow));
    assert_eq!(app.ledger.balance(), 29);

    app.shutdown().await;
}

#[tokio::test]
async fn test_reward_covers_a_previously_unaffordable_job() {
    let h = TestHarness::new(1);

    let err = h
        .flow
        .submit(sample_source(), RestorationMode::Photo)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientCredit { .. }));

    // An ad reward tops the balance up past the photo cost
    h.ledger.grant(RewardKind::RewardedAd.amount());
    let outcome = h
        .flow
        .submit(sample_source(), RestorationMode::Photo)
        .await
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert_eq!(h.ledger.balance(), 4);
}
