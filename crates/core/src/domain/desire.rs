use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DesireId(pub i64);

/// Lifecycle of a desire. `Fulfilled` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesireStatus {
    Pending,
    Fulfilled,
}

impl DesireStatus {
    /// Integer encoding used by the `desires.status` column.
    pub fn as_code(self) -> i64 {
        match self {
            Self::Pending => 1,
            Self::Fulfilled => 0,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, DomainError> {
        match code {
            1 => Ok(Self::Pending),
            0 => Ok(Self::Fulfilled),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown desire status code `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desire {
    pub id: DesireId,
    pub emoji: String,
    pub user: String,
    pub status: DesireStatus,
}

impl Desire {
    pub fn is_pending(&self) -> bool {
        self.status == DesireStatus::Pending
    }

    pub fn fulfill(&mut self) {
        self.status = DesireStatus::Fulfilled;
    }
}
