//! # Problem Intake
//!
//! A small web form that lets visitors register for one of a fixed set of
//! problem statements, each capped at
//! [`MAX_REGISTRANTS_PER_OPTION`](options::MAX_REGISTRANTS_PER_OPTION)
//! registrants.
//!
//! # Architecture
//!
//! ```text
//!  GET /      POST /form2       POST /submit
//!    │             │                  │
//!    │             └────────┬─────────┘
//!    │                      ▼
//!    │          Store (per request, resumed from session)
//!    │                      │
//!    │                      ▼
//!    │           RegistrationReducer ──effects──┐
//!    │                      ▲                   │
//!    │                      └──feedback action──┤
//!    ▼                                          ▼
//! CapacityTracker ─────────────────► RegistrationRepository
//!                                     (Postgres / in-memory)
//! ```
//!
//! - [`workflow`]: the select → details → submit state machine, a pure
//!   reducer whose database work is returned as effects
//! - [`capacity`]: per-option counts, failing open to zeros
//! - [`repository`]: the storage seam and its implementations
//! - [`server`]: axum handlers, session handling and health checks

pub mod capacity;
pub mod config;
pub mod error;
pub mod options;
pub mod registration;
pub mod repository;
pub mod server;
pub mod session;
pub mod views;
pub mod workflow;

pub use capacity::{CapacitySnapshot, CapacityTracker};
pub use config::Config;
pub use error::AppError;
pub use options::{ProblemOption, MAX_REGISTRANTS_PER_OPTION};
pub use registration::{DetailsForm, Registration};
