//! Page handlers for the registration workflow.
//!
//! Each workflow request resumes a fresh store from the session's pending
//! option, sends one command, writes the settled pending option back and
//! renders the outcome.

use super::state::AppState;
use crate::error::AppError;
use crate::registration::DetailsForm;
use crate::session::{Flash, VisitorSession};
use crate::views;
use crate::workflow::{Outcome, RegistrationAction, RegistrationState, Rejection};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

/// Shown on the start page after a registration is stored.
pub const SUCCESS_MESSAGE: &str = "Form submitted successfully!";

/// Body of `POST /form2`.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionForm {
    /// Chosen option label
    #[serde(default)]
    pub problem: Option<String>,
}

/// Status for a details page re-rendered after a rejection.
const fn rejection_status(rejection: Rejection) -> StatusCode {
    match rejection {
        Rejection::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Rejection::SubmissionFailed => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn redirect_with_flash(session: &VisitorSession, flash: Flash) -> Result<Response, AppError> {
    session.push_flash(flash)?;
    Ok(Redirect::to("/").into_response())
}

/// Run one command against the visitor's workflow and persist the pending
/// option it settles on.
async fn run_workflow(
    state: &AppState,
    session: &VisitorSession,
    action: RegistrationAction,
) -> Result<RegistrationState, AppError> {
    let mut store = state.store(session.pending_option());
    store.send(action).await?;

    let settled = store.into_state();
    session.set_pending_option(settled.pending_option())?;
    Ok(settled)
}

fn unexpected_outcome(settled: &RegistrationState) -> AppError {
    AppError::internal("Something went wrong. Please start again.").with_source(anyhow::anyhow!(
        "workflow settled without a usable outcome: {settled:?}"
    ))
}

/// `GET /`: option list with remaining places and pending flashes.
///
/// # Errors
///
/// Returns error if the session cannot be written.
pub async fn index(
    State(state): State<AppState>,
    session: VisitorSession,
) -> Result<Html<String>, AppError> {
    let flashes = session.take_flashes()?;
    let snapshot = state.capacity().counts().await;
    Ok(Html(views::render_index(&snapshot, &flashes)))
}

/// `POST /form2`: choose an option and move to the details form.
///
/// # Errors
///
/// Returns error if the session cannot be written.
pub async fn select_problem(
    State(state): State<AppState>,
    session: VisitorSession,
    Form(form): Form<SelectionForm>,
) -> Result<Response, AppError> {
    let settled = run_workflow(
        &state,
        &session,
        RegistrationAction::SelectOption {
            problem: form.problem,
        },
    )
    .await?;

    match settled.outcome {
        Some(Outcome::Advanced(option)) => {
            Ok(Html(views::render_details(option, None)).into_response())
        },
        Some(Outcome::Rejected(rejection)) => {
            redirect_with_flash(&session, Flash::error(rejection.message())).await
        },
        _ => Err(unexpected_outcome(&settled)),
    }
}

/// `POST /submit`: validate and store the visitor's details.
///
/// # Errors
///
/// Returns error if the session cannot be written.
pub async fn submit_details(
    State(state): State<AppState>,
    session: VisitorSession,
    Form(form): Form<DetailsForm>,
) -> Result<Response, AppError> {
    let settled = run_workflow(&state, &session, RegistrationAction::SubmitDetails(form)).await?;

    match (settled.outcome, settled.pending_option()) {
        (Some(Outcome::Registered(_)), _) => {
            redirect_with_flash(&session, Flash::success(SUCCESS_MESSAGE)).await
        },
        (Some(Outcome::Rejected(rejection)), Some(option)) if !rejection.returns_to_start() => {
            let notice = Flash::error(rejection.message());
            Ok((
                rejection_status(rejection),
                Html(views::render_details(option, Some(&notice))),
            )
                .into_response())
        },
        (Some(Outcome::Rejected(rejection)), _) => {
            redirect_with_flash(&session, Flash::error(rejection.message())).await
        },
        _ => Err(unexpected_outcome(&settled)),
    }
}
