#![allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/panic

use super::*;
use crate::capacity::CapacitySnapshot;
use crate::options::ProblemOption;
use crate::registration::{DetailsForm, Registration};
use crate::repository::{InMemoryRegistrationRepository, RepositoryError};
use intake_runtime::Store;
use intake_testing::{assertions, resolve_effects, ReducerTest};
use std::sync::Arc;

fn env_with(repository: &InMemoryRegistrationRepository) -> RegistrationEnvironment {
    RegistrationEnvironment::new(Arc::new(repository.clone()))
}

fn select(label: &str) -> RegistrationAction {
    RegistrationAction::SelectOption {
        problem: Some(label.to_string()),
    }
}

fn ada() -> DetailsForm {
    DetailsForm::new("Ada Lovelace", "ada@example.com", "5551234")
}

fn store_for(
    repository: &InMemoryRegistrationRepository,
    pending: Option<ProblemOption>,
) -> Store<RegistrationReducer> {
    Store::new(
        RegistrationState::resume(pending),
        RegistrationReducer::new(),
        env_with(repository),
    )
}

// ========== Single reducer steps ==========

#[test]
fn selecting_nothing_is_rejected_without_effects() {
    let repository = InMemoryRegistrationRepository::new();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::new())
        .when_action(RegistrationAction::SelectOption { problem: None })
        .then_state(|state| {
            assert_eq!(state.stage, Stage::Start);
            assert_eq!(state.rejection(), Some(Rejection::NoOptionSelected));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn selecting_an_unknown_label_counts_as_no_selection() {
    let repository = InMemoryRegistrationRepository::new();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::new())
        .when_action(select("Option 9"))
        .then_state(|state| {
            assert_eq!(state.rejection(), Some(Rejection::NoOptionSelected));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn selecting_an_option_checks_capacity() {
    let repository = InMemoryRegistrationRepository::new();
    repository.seed("Option 2", 3);

    let effects = ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::new())
        .when_action(select("Option 2"))
        .then_state(|state| {
            assert_eq!(state.stage, Stage::Start);
            assert_eq!(state.outcome, None);
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .run();

    let actions = resolve_effects(effects).await;
    assert_eq!(actions.len(), 1);
    match &actions[0] {
        RegistrationAction::SelectionCapacityChecked { option, snapshot } => {
            assert_eq!(*option, ProblemOption::Two);
            assert_eq!(snapshot.count(ProblemOption::Two), 3);
        },
        other => panic!("unexpected feedback: {other:?}"),
    }
}

#[test]
fn selection_one_below_capacity_advances() {
    let repository = InMemoryRegistrationRepository::new();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::new())
        .when_action(RegistrationAction::SelectionCapacityChecked {
            option: ProblemOption::Four,
            snapshot: CapacitySnapshot::from_rows(vec![("Option 4", 19)]),
        })
        .then_state(|state| {
            assert_eq!(state.stage, Stage::OptionChosen(ProblemOption::Four));
            assert_eq!(state.outcome, Some(Outcome::Advanced(ProblemOption::Four)));
            assert_eq!(state.pending_option(), Some(ProblemOption::Four));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn selection_at_capacity_is_rejected() {
    let repository = InMemoryRegistrationRepository::new();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::new())
        .when_action(RegistrationAction::SelectionCapacityChecked {
            option: ProblemOption::Four,
            snapshot: CapacitySnapshot::from_rows(vec![("Option 4", 20)]),
        })
        .then_state(|state| {
            assert_eq!(state.stage, Stage::Start);
            assert_eq!(state.rejection(), Some(Rejection::OptionFull));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn details_without_pending_option_expire_the_session() {
    let repository = InMemoryRegistrationRepository::new();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::new())
        .when_action(RegistrationAction::SubmitDetails(ada()))
        .then_state(|state| {
            assert_eq!(state.stage, Stage::Start);
            assert_eq!(state.rejection(), Some(Rejection::SessionExpired));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn details_validation_keeps_the_pending_option() {
    let repository = InMemoryRegistrationRepository::new();
    let cases = [
        (DetailsForm::new("Ada", "", ""), Rejection::MissingFields),
        (DetailsForm::new("", "ada@example.com", ""), Rejection::MissingFields),
        (DetailsForm::new("a".repeat(101), "ada@example.com", ""), Rejection::InputTooLong),
        (DetailsForm::new("Ada", "ada@example.com", "1".repeat(21)), Rejection::InputTooLong),
    ];

    for (form, expected) in cases {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env_with(&repository))
            .given_state(RegistrationState::resume(Some(ProblemOption::One)))
            .when_action(RegistrationAction::SubmitDetails(form))
            .then_state(move |state| {
                assert_eq!(state.stage, Stage::OptionChosen(ProblemOption::One));
                assert_eq!(state.rejection(), Some(expected));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}

#[test]
fn valid_details_recheck_capacity() {
    let repository = InMemoryRegistrationRepository::new();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::resume(Some(ProblemOption::One)))
        .when_action(RegistrationAction::SubmitDetails(ada()))
        .then_state(|state| {
            assert_eq!(state.stage, Stage::OptionChosen(ProblemOption::One));
            assert_eq!(state.outcome, None);
        })
        .then_effects(assertions::assert_has_future_effect)
        .run();
}

#[test]
fn option_filling_up_before_submission_returns_to_start() {
    let repository = InMemoryRegistrationRepository::new();
    let registration = Registration::new(ProblemOption::Three, &ada()).unwrap();

    ReducerTest::new(RegistrationReducer::new())
        .with_env(env_with(&repository))
        .given_state(RegistrationState::resume(Some(ProblemOption::Three)))
        .when_action(RegistrationAction::SubmissionCapacityChecked {
            registration,
            snapshot: CapacitySnapshot::from_rows(vec![("Option 3", 20)]),
        })
        .then_state(|state| {
            assert_eq!(state.stage, Stage::Start);
            assert_eq!(state.pending_option(), None);
            assert_eq!(state.rejection(), Some(Rejection::OptionNowFull));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn persistence_failures_keep_the_pending_option() {
    let repository = InMemoryRegistrationRepository::new();
    let cases = [
        (RepositoryError::Unavailable("refused".to_string()), Rejection::DatabaseUnavailable),
        (RepositoryError::Query("constraint".to_string()), Rejection::SubmissionFailed),
    ];

    for (error, expected) in cases {
        ReducerTest::new(RegistrationReducer::new())
            .with_env(env_with(&repository))
            .given_state(RegistrationState::resume(Some(ProblemOption::Two)))
            .when_action(RegistrationAction::PersistenceFailed {
                option: ProblemOption::Two,
                error,
            })
            .then_state(move |state| {
                assert_eq!(state.pending_option(), Some(ProblemOption::Two));
                assert_eq!(state.rejection(), Some(expected));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}

#[test]
fn rejections_that_return_to_start() {
    let back = [
        Rejection::NoOptionSelected,
        Rejection::OptionFull,
        Rejection::SessionExpired,
        Rejection::OptionNowFull,
    ];
    let stay = [
        Rejection::MissingFields,
        Rejection::InputTooLong,
        Rejection::DatabaseUnavailable,
        Rejection::SubmissionFailed,
    ];

    assert!(back.into_iter().all(Rejection::returns_to_start));
    assert!(!stay.into_iter().any(Rejection::returns_to_start));
}

// ========== Full requests through a Store ==========

#[tokio::test]
async fn scenario_a_select_then_submit_registers() {
    let repository = InMemoryRegistrationRepository::new();

    let mut selection = store_for(&repository, None);
    selection.send(select("Option 1")).await.unwrap();
    let pending = selection.state().pending_option();
    assert_eq!(pending, Some(ProblemOption::One));

    let mut submission = store_for(&repository, pending);
    let processed = submission
        .send(RegistrationAction::SubmitDetails(ada()))
        .await
        .unwrap();

    // submit, capacity re-check, persisted
    assert_eq!(processed, 3);
    let state = submission.into_state();
    assert_eq!(state.stage, Stage::Submitted);
    assert_eq!(state.outcome, Some(Outcome::Registered(ProblemOption::One)));
    assert_eq!(state.pending_option(), None);

    let rows = repository.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Ada Lovelace");
    assert_eq!(rows[0].email, "ada@example.com");
    assert_eq!(rows[0].phone, "5551234");
    assert_eq!(rows[0].problem_selected, "Option 1");
}

#[tokio::test]
async fn scenario_b_full_option_cannot_be_selected() {
    let repository = InMemoryRegistrationRepository::new();
    repository.fill(ProblemOption::Two);

    let mut store = store_for(&repository, None);
    store.send(select("Option 2")).await.unwrap();

    assert_eq!(store.state().stage, Stage::Start);
    assert_eq!(store.state().rejection(), Some(Rejection::OptionFull));
    assert_eq!(repository.rows().len(), 20);
}

#[tokio::test]
async fn scenario_c_empty_email_stays_on_details() {
    let repository = InMemoryRegistrationRepository::new();

    let mut store = store_for(&repository, Some(ProblemOption::One));
    store
        .send(RegistrationAction::SubmitDetails(DetailsForm::new("Ada Lovelace", "", "5551234")))
        .await
        .unwrap();

    assert_eq!(store.state().stage, Stage::OptionChosen(ProblemOption::One));
    assert_eq!(store.state().rejection(), Some(Rejection::MissingFields));
    assert!(repository.rows().is_empty());
}

#[tokio::test]
async fn scenario_d_cleared_session_expires() {
    let repository = InMemoryRegistrationRepository::new();

    let mut selection = store_for(&repository, None);
    selection.send(select("Option 3")).await.unwrap();
    assert_eq!(selection.state().pending_option(), Some(ProblemOption::Three));

    // Session lost between the two requests
    let mut submission = store_for(&repository, None);
    submission
        .send(RegistrationAction::SubmitDetails(ada()))
        .await
        .unwrap();

    assert_eq!(submission.state().rejection(), Some(Rejection::SessionExpired));
    assert!(submission.state().rejection().is_some_and(Rejection::returns_to_start));
    assert!(repository.rows().is_empty());
}

#[tokio::test]
async fn full_option_rejects_submission_without_insert() {
    let repository = InMemoryRegistrationRepository::new();
    let mut selection = store_for(&repository, None);
    selection.send(select("Option 4")).await.unwrap();

    // Another visitor takes the remaining places
    repository.fill(ProblemOption::Four);

    let mut submission = store_for(&repository, selection.state().pending_option());
    submission
        .send(RegistrationAction::SubmitDetails(ada()))
        .await
        .unwrap();

    assert_eq!(submission.state().rejection(), Some(Rejection::OptionNowFull));
    assert_eq!(submission.state().pending_option(), None);
    assert_eq!(repository.rows().len(), 20);
}

#[tokio::test]
async fn outage_rejects_submission_and_keeps_selection() {
    let repository = InMemoryRegistrationRepository::new();
    repository.set_unavailable(true);

    // Counts fail open, so the selection itself goes through
    let mut selection = store_for(&repository, None);
    selection.send(select("Option 1")).await.unwrap();
    assert_eq!(selection.state().pending_option(), Some(ProblemOption::One));

    let mut submission = store_for(&repository, Some(ProblemOption::One));
    submission
        .send(RegistrationAction::SubmitDetails(ada()))
        .await
        .unwrap();

    assert_eq!(submission.state().rejection(), Some(Rejection::DatabaseUnavailable));
    assert_eq!(submission.state().pending_option(), Some(ProblemOption::One));

    repository.set_unavailable(false);
    assert!(repository.rows().is_empty());
}

#[tokio::test]
async fn failed_insert_is_a_distinct_rejection() {
    let repository = InMemoryRegistrationRepository::new();
    repository.set_failing_inserts(true);

    let mut store = store_for(&repository, Some(ProblemOption::Two));
    store
        .send(RegistrationAction::SubmitDetails(ada()))
        .await
        .unwrap();

    assert_eq!(store.state().rejection(), Some(Rejection::SubmissionFailed));
    assert_eq!(store.state().pending_option(), Some(ProblemOption::Two));
}

#[tokio::test]
async fn reselecting_replaces_the_pending_option() {
    let repository = InMemoryRegistrationRepository::new();
    repository.fill(ProblemOption::Three);

    let mut store = store_for(&repository, Some(ProblemOption::One));
    store.send(select("Option 3")).await.unwrap();

    // The earlier choice is not kept when the new one is refused
    assert_eq!(store.state().pending_option(), None);
    assert_eq!(store.state().rejection(), Some(Rejection::OptionFull));
}
