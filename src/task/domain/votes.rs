//! Vote tallies and user vote directions.

use super::ParseDomainValueError;
use serde::{Deserialize, Serialize};

/// Snapshot of the up and down votes cast on an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Votes {
    up: u64,
    down: u64,
}

impl Votes {
    /// Creates a vote tally.
    #[must_use]
    pub const fn new(up: u64, down: u64) -> Self {
        Self { up, down }
    }

    /// Returns the number of up votes.
    #[must_use]
    pub const fn up(self) -> u64 {
        self.up
    }

    /// Returns the number of down votes.
    #[must_use]
    pub const fn down(self) -> u64 {
        self.down
    }

    /// Returns up votes minus down votes.
    #[must_use]
    pub const fn balance(self) -> i128 {
        self.up as i128 - self.down as i128
    }
}

/// Direction of a single user's vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    /// Approval.
    Up,
    /// Disapproval.
    Down,
}

impl VoteType {
    /// Returns the path segment used by the vote endpoints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl TryFrom<&str> for VoteType {
    type Error = ParseDomainValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(ParseDomainValueError {
                kind: "vote type",
                value: value.to_owned(),
            }),
        }
    }
}
