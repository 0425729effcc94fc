use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directory view of a user; never carries the password hash.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "username": "jdoe",
    "name": "John Doe",
    "email": "john.doe@company.com",
    "department": "Engineering",
    "role_id": 4,
    "status": "ACTIVE",
    "last_login_at": "2026-01-01T09:00:00Z"
}))]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "jdoe")]
    pub username: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    #[schema(example = 4)]
    pub role_id: u8,

    #[schema(example = "ACTIVE")]
    pub status: String,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The slice of a user embedded in attendance/workflow listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSlim {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,
}
