//! State, actions and rejections of the registration workflow.
//!
//! A visitor moves `Start → OptionChosen → Submitted`. Only the pending
//! option survives between requests (in the session), so the state is rebuilt
//! with [`RegistrationState::resume`] at the start of every request.

use crate::capacity::CapacitySnapshot;
use crate::options::ProblemOption;
use crate::registration::{DetailsError, DetailsForm, Registration};
use crate::repository::RepositoryError;
use std::fmt;

/// Where a visitor is in the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    /// Nothing chosen yet
    #[default]
    Start,
    /// An option passed the selection-time capacity check
    OptionChosen(ProblemOption),
    /// A registration row was persisted
    Submitted,
}

/// Result of the last command, for the HTTP layer to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The visitor moved on to the details step for this option
    Advanced(ProblemOption),
    /// A registration for this option was stored
    Registered(ProblemOption),
    /// The command was refused
    Rejected(Rejection),
}

/// Workflow state for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationState {
    /// Current stage
    pub stage: Stage,
    /// Outcome of the most recent command, if any
    pub outcome: Option<Outcome>,
}

impl RegistrationState {
    /// Fresh state at [`Stage::Start`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: Stage::Start,
            outcome: None,
        }
    }

    /// Rebuild the state from the pending option kept in the session.
    #[must_use]
    pub const fn resume(pending: Option<ProblemOption>) -> Self {
        let stage = match pending {
            Some(option) => Stage::OptionChosen(option),
            None => Stage::Start,
        };
        Self {
            stage,
            outcome: None,
        }
    }

    /// The option waiting for details, which is what the session should hold.
    #[must_use]
    pub const fn pending_option(&self) -> Option<ProblemOption> {
        match self.stage {
            Stage::OptionChosen(option) => Some(option),
            Stage::Start | Stage::Submitted => None,
        }
    }

    /// The rejection from the most recent command, if it was refused.
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self.outcome {
            Some(Outcome::Rejected(rejection)) => Some(rejection),
            _ => None,
        }
    }
}

/// Why a command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Selection named no known option
    NoOptionSelected,
    /// Selected option was already at capacity
    OptionFull,
    /// Details arrived with no pending option
    SessionExpired,
    /// Name or email was blank
    MissingFields,
    /// A field exceeded its length limit
    InputTooLong,
    /// The option filled up between selection and submission
    OptionNowFull,
    /// The database could not be reached while saving
    DatabaseUnavailable,
    /// The database refused the insert
    SubmissionFailed,
}

impl Rejection {
    /// Message shown to the visitor.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoOptionSelected => "Please select a problem statement.",
            Self::OptionFull => "This problem is full. Please choose another.",
            Self::SessionExpired => "Session expired. Please start again.",
            Self::MissingFields => "Name and email are required.",
            Self::InputTooLong => "Input too long. Name/email ≤100 chars, phone ≤20.",
            Self::OptionNowFull => "This problem is now full. Please try another.",
            Self::DatabaseUnavailable => "Database unavailable. Please try again.",
            Self::SubmissionFailed => "Submission failed. Please try again.",
        }
    }

    /// Whether the visitor is sent back to option selection.
    ///
    /// The other rejections keep the pending option so the details form can
    /// be corrected and resubmitted.
    #[must_use]
    pub const fn returns_to_start(self) -> bool {
        matches!(
            self,
            Self::NoOptionSelected | Self::OptionFull | Self::SessionExpired | Self::OptionNowFull
        )
    }
}

impl From<DetailsError> for Rejection {
    fn from(error: DetailsError) -> Self {
        match error {
            DetailsError::MissingFields => Self::MissingFields,
            DetailsError::TooLong => Self::InputTooLong,
        }
    }
}

impl From<&RepositoryError> for Rejection {
    fn from(error: &RepositoryError) -> Self {
        if error.is_unavailable() {
            Self::DatabaseUnavailable
        } else {
            Self::SubmissionFailed
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Commands from the visitor and feedback from effects.
#[derive(Debug, Clone)]
pub enum RegistrationAction {
    // Commands
    /// Visitor picked an option on the start page
    SelectOption {
        /// Raw form value, absent when nothing was chosen
        problem: Option<String>,
    },
    /// Visitor posted the details form
    SubmitDetails(DetailsForm),

    // Feedback
    /// Counts read for a selection
    SelectionCapacityChecked {
        /// Option being selected
        option: ProblemOption,
        /// Counts at check time
        snapshot: CapacitySnapshot,
    },
    /// Counts re-read before saving a validated registration
    SubmissionCapacityChecked {
        /// Registration waiting to be saved
        registration: Registration,
        /// Counts at check time
        snapshot: CapacitySnapshot,
    },
    /// Registration row stored
    RegistrationPersisted {
        /// Option registered for
        option: ProblemOption,
    },
    /// Registration row could not be stored
    PersistenceFailed {
        /// Option being registered for
        option: ProblemOption,
        /// Storage failure
        error: RepositoryError,
    },
}
