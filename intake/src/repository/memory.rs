//! In-memory registration repository.
//!
//! Used by the test suites and by local runs without a database. It can be
//! told to behave as if the database were down, or as if inserts were
//! failing, so every failure path of the workflow can be exercised.

use super::{RegistrationRepository, RepositoryError, RepositoryFuture};
use crate::options::ProblemOption;
use crate::registration::Registration;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A stored registration row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRegistration {
    /// Row id, starting at 1
    pub id: i64,
    /// Registrant's name
    pub name: String,
    /// Registrant's email
    pub email: String,
    /// Registrant's phone, empty when none was given
    pub phone: String,
    /// Stored option label
    pub problem_selected: String,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredRegistration>,
    unavailable: bool,
    failing_inserts: bool,
}

impl Table {
    fn push(&mut self, name: &str, email: &str, phone: &str, problem_selected: &str) {
        let id = i64::try_from(self.rows.len()).unwrap_or(i64::MAX).saturating_add(1);
        self.rows.push(StoredRegistration {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            problem_selected: problem_selected.to_string(),
        });
    }
}

/// In-memory registration repository.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistrationRepository {
    table: Arc<Mutex<Table>>,
}

fn poisoned() -> RepositoryError {
    RepositoryError::Query("in-memory table lock poisoned".to_string())
}

impl InMemoryRegistrationRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `count` placeholder rows for `label`.
    ///
    /// The label is stored as given, so unknown labels can be seeded too.
    pub fn seed(&self, label: &str, count: usize) {
        if let Ok(mut table) = self.table.lock() {
            for n in 0..count {
                let name = format!("Seeded {n}");
                let email = format!("seeded{n}@example.com");
                table.push(&name, &email, "", label);
            }
        }
    }

    /// Seed `option` up to its capacity.
    pub fn fill(&self, option: ProblemOption) {
        self.seed(
            option.label(),
            crate::options::MAX_REGISTRANTS_PER_OPTION as usize,
        );
    }

    /// Snapshot of every stored row, in insertion order.
    #[must_use]
    pub fn rows(&self) -> Vec<StoredRegistration> {
        self.table
            .lock()
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    /// Make every operation fail as if the database could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut table) = self.table.lock() {
            table.unavailable = unavailable;
        }
    }

    /// Make inserts fail with a query error while reads keep working.
    pub fn set_failing_inserts(&self, failing: bool) {
        if let Ok(mut table) = self.table.lock() {
            table.failing_inserts = failing;
        }
    }
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn count_by_problem(&self) -> RepositoryFuture<'_, Vec<(String, i64)>> {
        Box::pin(async move {
            let table = self.table.lock().map_err(|_| poisoned())?;
            if table.unavailable {
                return Err(RepositoryError::Unavailable("connection refused".to_string()));
            }

            let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
            for row in &table.rows {
                *counts.entry(row.problem_selected.as_str()).or_default() += 1;
            }

            Ok(counts
                .into_iter()
                .map(|(label, count)| (label.to_string(), count))
                .collect())
        })
    }

    fn insert<'a>(&'a self, registration: &'a Registration) -> RepositoryFuture<'a, ()> {
        Box::pin(async move {
            let mut table = self.table.lock().map_err(|_| poisoned())?;
            if table.unavailable {
                return Err(RepositoryError::Unavailable("connection refused".to_string()));
            }
            if table.failing_inserts {
                return Err(RepositoryError::Query("insert rejected".to_string()));
            }

            table.push(
                registration.name(),
                registration.email(),
                registration.phone(),
                registration.problem().label(),
            );
            Ok(())
        })
    }

    fn ping(&self) -> RepositoryFuture<'_, ()> {
        Box::pin(async move {
            let table = self.table.lock().map_err(|_| poisoned())?;
            if table.unavailable {
                return Err(RepositoryError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        })
    }
}
