use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::AppError;

/// Shared by the WFH and daily-report workflows: PENDING is the only
/// non-terminal state, and [`ApprovalStatus::decide`] owns the legal moves.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// The two terminal moves an approver can make.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// PENDING -> APPROVED | REJECTED, exactly once. Terminal states never
    /// transition again.
    pub fn decide(self, decision: Decision) -> Result<ApprovalStatus, AppError> {
        match self {
            ApprovalStatus::Pending => Ok(match decision {
                Decision::Approved => ApprovalStatus::Approved,
                Decision::Rejected => ApprovalStatus::Rejected,
            }),
            _ => Err(AppError::AlreadyProcessed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WfhRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-01-09", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Plumber visit in the morning")]
    pub reason: String,

    pub status: ApprovalStatus,

    #[schema(example = 7, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_either_terminal_state() {
        assert_eq!(
            ApprovalStatus::Pending.decide(Decision::Approved).unwrap(),
            ApprovalStatus::Approved
        );
        assert_eq!(
            ApprovalStatus::Pending.decide(Decision::Rejected).unwrap(),
            ApprovalStatus::Rejected
        );
    }

    #[test]
    fn terminal_states_cannot_be_decided_again() {
        for terminal in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            for decision in [Decision::Approved, Decision::Rejected] {
                assert!(matches!(
                    terminal.decide(decision),
                    Err(AppError::AlreadyProcessed)
                ));
            }
        }
    }
}
