use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::wfh::ApprovalStatus;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DailyReport {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Closed the Q1 onboarding tickets, reviewed two PRs")]
    pub content: String,

    pub status: ApprovalStatus,

    #[schema(example = "Good coverage, add time estimates next week", nullable = true)]
    pub hr_feedback: Option<String>,

    #[schema(example = 7, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
