//! Registration counts per option.
//!
//! Counts are read fresh on every call. A failed read is logged and reported
//! as all-zero counts, so the option list stays usable while the database is
//! down; submissions still fail closed in the workflow.

use crate::options::{ProblemOption, MAX_REGISTRANTS_PER_OPTION};
use crate::repository::RegistrationRepository;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registrant count for every option at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacitySnapshot {
    counts: BTreeMap<ProblemOption, u32>,
}

impl CapacitySnapshot {
    /// A snapshot with every option at zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            counts: ProblemOption::ALL.into_iter().map(|option| (option, 0)).collect(),
        }
    }

    /// Build a snapshot from grouped `(label, count)` rows.
    ///
    /// Unknown labels are ignored, missing options count as zero and negative
    /// counts clamp to zero.
    #[must_use]
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut snapshot = Self::empty();
        for (label, count) in rows {
            if let Ok(option) = label.as_ref().parse::<ProblemOption>() {
                let count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
                snapshot.counts.insert(option, count);
            }
        }
        snapshot
    }

    /// Current registrants for `option`.
    #[must_use]
    pub fn count(&self, option: ProblemOption) -> u32 {
        self.counts.get(&option).copied().unwrap_or(0)
    }

    /// Places left for `option`, never negative.
    #[must_use]
    pub fn remaining(&self, option: ProblemOption) -> u32 {
        MAX_REGISTRANTS_PER_OPTION.saturating_sub(self.count(option))
    }

    /// Whether `option` has reached capacity.
    #[must_use]
    pub fn is_full(&self, option: ProblemOption) -> bool {
        self.count(option) >= MAX_REGISTRANTS_PER_OPTION
    }

    /// Options and counts in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ProblemOption, u32)> + '_ {
        self.counts.iter().map(|(option, count)| (*option, *count))
    }
}

impl Default for CapacitySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reads capacity snapshots from a repository.
#[derive(Clone)]
pub struct CapacityTracker {
    repository: Arc<dyn RegistrationRepository>,
}

impl CapacityTracker {
    /// Create a tracker backed by `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn RegistrationRepository>) -> Self {
        Self { repository }
    }

    /// Current counts for every option.
    ///
    /// Never fails: a repository error is logged and yields
    /// [`CapacitySnapshot::empty`].
    pub async fn counts(&self) -> CapacitySnapshot {
        match self.repository.count_by_problem().await {
            Ok(rows) => CapacitySnapshot::from_rows(rows),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read registration counts, showing zeros");
                CapacitySnapshot::empty()
            }
        }
    }
}

impl std::fmt::Debug for CapacityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityTracker").finish_non_exhaustive()
    }
}
