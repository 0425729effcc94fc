use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

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
pub enum NotificationType {
    Info,
    Warning,
    Error,
    Success,
    Reminder,
}

/// Owned by its recipient; mutated only by the read/read-all actions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "WFH request approved")]
    pub title: String,

    #[schema(example = "Your WFH request for 2026-01-09 has been approved")]
    pub message: String,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,

    #[sqlx(rename = "is_read")]
    pub read: bool,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub read_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
