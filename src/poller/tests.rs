//! Tests for await_conclusion.
//!
//! Tests for:
//! - Argument validation before any forge call
//! - Attempt budget and timing of the discovery phase
//! - Selection of the authoritative run
//! - Conclusion matching and mismatch reporting
use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};
use tokio::time::Instant;

use super::*;
use crate::{
    forge::{
        request::{RunStatus, WorkflowRun},
        traits::MockForge,
    },
    test_helpers::workflow_run,
};

const COMMIT: &str = "abc123";
const WORKFLOW: &str = "onrelease.yml";

fn options(expected: &str, timeout: u64, poll_interval: u64) -> WaitOptions {
    WaitOptions {
        commit: COMMIT.into(),
        workflow: WORKFLOW.into(),
        expected: expected.into(),
        timeout: Duration::from_secs(timeout),
        poll_interval: Duration::from_secs(poll_interval),
        test_id: None,
    }
}

/// Forge whose run listing is empty for the first `empty_listings` calls and
/// then returns `runs`.
fn listing_forge(
    mock_forge: &mut MockForge,
    empty_listings: u32,
    runs: Vec<WorkflowRun>,
) -> Arc<AtomicU32> {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    mock_forge
        .expect_list_workflow_runs()
        .withf(|req| req.workflow == WORKFLOW && req.head_sha == COMMIT)
        .returning(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < empty_listings {
                Ok(vec![])
            } else {
                Ok(runs.clone())
            }
        });

    calls
}

/// Forge whose run reports in progress for `in_progress_polls` fetches and
/// then completes with `conclusion`.
fn watching_forge(
    mock_forge: &mut MockForge,
    run_id: u64,
    in_progress_polls: u32,
    conclusion: Option<&'static str>,
) {
    let calls = Arc::new(AtomicU32::new(0));

    mock_forge
        .expect_get_workflow_run()
        .withf(move |id| *id == run_id)
        .returning(move |id| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < in_progress_polls {
                Ok(workflow_run(id, COMMIT, RunStatus::InProgress, None, 0))
            } else {
                Ok(workflow_run(
                    id,
                    COMMIT,
                    RunStatus::Completed,
                    conclusion,
                    0,
                ))
            }
        });
}

#[tokio::test(start_paused = true)]
async fn bogus_expected_conclusion_fails_without_polling() {
    let mut mock_forge = MockForge::new();
    mock_forge.expect_list_workflow_runs().never();
    mock_forge.expect_get_workflow_run().never();
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let start = Instant::now();
    let result = await_conclusion(&forge, &options("bogus", 60, 5)).await;

    assert!(matches!(result, Err(GateError::InvalidArgs(_))));
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[test]
fn missing_commit_or_workflow_is_invalid() {
    let mut opts = options("success", 60, 5);
    opts.commit = "".into();
    assert!(matches!(opts.validate(), Err(GateError::InvalidArgs(_))));

    let mut opts = options("success", 60, 5);
    opts.workflow = "  ".into();
    assert!(matches!(opts.validate(), Err(GateError::InvalidArgs(_))));
}

#[test]
fn non_positive_durations_are_invalid() {
    assert!(options("success", 60, 0).validate().is_err());
    assert!(options("success", 0, 5).validate().is_err());
    assert!(options("success", 4, 5).validate().is_err());
}

#[test]
fn attempts_are_floor_of_timeout_over_interval() {
    assert_eq!(options("success", 60, 5).max_attempts(), 12);
    assert_eq!(options("success", 10, 5).max_attempts(), 2);
    assert_eq!(options("success", 14, 5).max_attempts(), 2);
    assert_eq!(options("success", 5, 5).max_attempts(), 1);
}

#[test]
fn defaults_are_sixty_and_five_seconds() {
    let opts = WaitOptions::default();
    assert_eq!(opts.timeout, Duration::from_secs(60));
    assert_eq!(opts.poll_interval, Duration::from_secs(5));
    assert!(opts.test_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn no_run_is_not_found_after_exactly_two_attempts() {
    let mut mock_forge = MockForge::new();
    mock_forge
        .expect_list_workflow_runs()
        .times(2)
        .returning(|_| Ok(vec![]));
    mock_forge.expect_get_workflow_run().never();
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let start = Instant::now();
    let outcome = await_conclusion(&forge, &options("success", 10, 5))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, WaitOutcome::NotFound { attempts: 2 });
    assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
    assert!(outcome.observed_conclusion().is_none());
    // one initial delay plus one interval between the two attempts
    assert!(elapsed >= Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn runs_for_other_commits_are_ignored() {
    let mut mock_forge = MockForge::new();
    mock_forge
        .expect_list_workflow_runs()
        .times(2)
        .returning(|_| {
            Ok(vec![workflow_run(
                1,
                "def456",
                RunStatus::Completed,
                Some("success"),
                0,
            )])
        });
    mock_forge.expect_get_workflow_run().never();
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("success", 10, 5))
        .await
        .unwrap();

    assert_eq!(outcome, WaitOutcome::NotFound { attempts: 2 });
}

#[tokio::test(start_paused = true)]
async fn rc_derived_release_concludes_success() {
    let mut mock_forge = MockForge::new();
    let listings = listing_forge(
        &mut mock_forge,
        1,
        vec![workflow_run(11, COMMIT, RunStatus::NotStarted, None, 0)],
    );
    watching_forge(&mut mock_forge, 11, 2, Some("success"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("success", 60, 5))
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert_eq!(
        outcome,
        WaitOutcome::Matched {
            run_id: 11,
            conclusion: "success".into()
        }
    );
    assert_eq!(listings.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn direct_release_expected_failure_is_ok() {
    let mut mock_forge = MockForge::new();
    listing_forge(
        &mut mock_forge,
        0,
        vec![workflow_run(21, COMMIT, RunStatus::InProgress, None, 0)],
    );
    watching_forge(&mut mock_forge, 21, 1, Some("failure"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("failure", 120, 5))
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert_eq!(outcome.observed_conclusion(), Some("failure"));
}

#[tokio::test(start_paused = true)]
async fn wrong_conclusion_is_a_mismatch() {
    let mut mock_forge = MockForge::new();
    listing_forge(
        &mut mock_forge,
        0,
        vec![workflow_run(31, COMMIT, RunStatus::InProgress, None, 0)],
    );
    watching_forge(&mut mock_forge, 31, 0, Some("failure"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("success", 60, 5))
        .await
        .unwrap();

    assert!(!outcome.is_ok());
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Mismatch));
    assert_eq!(
        outcome,
        WaitOutcome::Mismatch {
            run_id: 31,
            expected: Conclusion::Success,
            observed: "failure".into(),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn conclusion_comparison_is_case_sensitive() {
    let mut mock_forge = MockForge::new();
    listing_forge(
        &mut mock_forge,
        0,
        vec![workflow_run(41, COMMIT, RunStatus::InProgress, None, 0)],
    );
    watching_forge(&mut mock_forge, 41, 0, Some("Success"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("success", 60, 5))
        .await
        .unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Mismatch));
}

#[tokio::test(start_paused = true)]
async fn latest_of_several_runs_is_watched() {
    let mut mock_forge = MockForge::new();
    listing_forge(
        &mut mock_forge,
        0,
        vec![
            workflow_run(51, COMMIT, RunStatus::Completed, Some("skipped"), 0),
            workflow_run(53, COMMIT, RunStatus::InProgress, None, 20),
            workflow_run(52, COMMIT, RunStatus::InProgress, None, 10),
        ],
    );
    watching_forge(&mut mock_forge, 53, 1, Some("success"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("success", 60, 5))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        WaitOutcome::Matched {
            run_id: 53,
            conclusion: "success".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_id_restricts_matching_runs() {
    let mut tagged = workflow_run(61, COMMIT, RunStatus::InProgress, None, 0);
    tagged.display_title = "v1.0.0 e2e 7f3c".into();
    let newer = workflow_run(62, COMMIT, RunStatus::InProgress, None, 30);

    let mut mock_forge = MockForge::new();
    listing_forge(&mut mock_forge, 0, vec![tagged, newer]);
    watching_forge(&mut mock_forge, 61, 0, Some("skipped"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let mut opts = options("skipped", 60, 5);
    opts.test_id = Some("7f3c".into());

    let outcome = await_conclusion(&forge, &opts).await.unwrap();

    assert!(outcome.is_ok());
}

#[tokio::test(start_paused = true)]
async fn listing_errors_count_as_empty_attempts() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let mut mock_forge = MockForge::new();
    mock_forge.expect_list_workflow_runs().returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(GateError::forge("502 bad gateway"))
        } else {
            Ok(vec![workflow_run(
                71,
                COMMIT,
                RunStatus::InProgress,
                None,
                0,
            )])
        }
    });
    watching_forge(&mut mock_forge, 71, 0, Some("success"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let outcome = await_conclusion(&forge, &options("success", 60, 5))
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn auth_failure_is_fatal() {
    let mut mock_forge = MockForge::new();
    mock_forge
        .expect_list_workflow_runs()
        .times(1)
        .returning(|_| {
            Err(GateError::AuthenticationError("Bad credentials".into()))
        });
    mock_forge.expect_get_workflow_run().never();
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let result = await_conclusion(&forge, &options("success", 10, 5)).await;

    let err = result.unwrap_err();
    assert!(matches!(err, GateError::AuthenticationError(_)));
    assert!(!err.is_invalid_input());
}

#[tokio::test(start_paused = true)]
async fn unknown_workflow_is_fatal() {
    let mut mock_forge = MockForge::new();
    mock_forge
        .expect_list_workflow_runs()
        .times(1)
        .returning(|req| Err(GateError::WorkflowNotFound(req.workflow)));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let result = await_conclusion(&forge, &options("success", 60, 5)).await;

    assert!(matches!(result, Err(GateError::WorkflowNotFound(_))));
}

#[tokio::test(start_paused = true)]
async fn errors_while_watching_are_fatal() {
    let mut mock_forge = MockForge::new();
    listing_forge(
        &mut mock_forge,
        0,
        vec![workflow_run(81, COMMIT, RunStatus::InProgress, None, 0)],
    );
    mock_forge
        .expect_get_workflow_run()
        .times(1)
        .returning(|_| Err(GateError::forge("connection reset")));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let result = await_conclusion(&forge, &options("success", 60, 5)).await;

    assert!(matches!(result, Err(GateError::ForgeError(_))));
}

#[tokio::test(start_paused = true)]
async fn watch_phase_outlives_discovery_timeout() {
    let mut mock_forge = MockForge::new();
    listing_forge(
        &mut mock_forge,
        0,
        vec![workflow_run(91, COMMIT, RunStatus::InProgress, None, 0)],
    );
    // 30 polls at 5s each is far past the 10s discovery timeout
    watching_forge(&mut mock_forge, 91, 30, Some("success"));
    let forge = ForgeManager::new(Box::new(mock_forge), false);

    let start = Instant::now();
    let outcome = await_conclusion(&forge, &options("success", 10, 5))
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert!(start.elapsed() >= Duration::from_secs(150));
}
