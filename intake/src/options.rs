//! The fixed set of problem statements visitors can register for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum registrants permitted per option.
pub const MAX_REGISTRANTS_PER_OPTION: u32 = 20;

/// One selectable problem statement.
///
/// The display label (`"Option 1"`, ...) is also the form value, the session
/// value and the `problem_selected` column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProblemOption {
    /// First problem statement
    #[serde(rename = "Option 1")]
    One,
    /// Second problem statement
    #[serde(rename = "Option 2")]
    Two,
    /// Third problem statement
    #[serde(rename = "Option 3")]
    Three,
    /// Fourth problem statement
    #[serde(rename = "Option 4")]
    Four,
}

impl ProblemOption {
    /// Every option, in display order.
    pub const ALL: [Self; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Label shown to visitors and stored in the database.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::One => "Option 1",
            Self::Two => "Option 2",
            Self::Three => "Option 3",
            Self::Four => "Option 4",
        }
    }
}

impl fmt::Display for ProblemOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A label that names none of the known options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown problem option: {0:?}")]
pub struct UnknownOption(pub String);

impl FromStr for ProblemOption {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.label() == s)
            .ok_or_else(|| UnknownOption(s.to_string()))
    }
}
