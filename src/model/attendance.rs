use chrono::{DateTime, NaiveDate, Utc};
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
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    HalfDay,
    OnLeave,
}

/// One row per (user, calendar day); the `(user_id, work_date)` unique key
/// carries the at-most-one-record-per-day invariant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub work_date: NaiveDate,

    #[schema(example = "2026-01-05T09:35:00Z", value_type = String, format = "date-time")]
    pub check_in_time: DateTime<Utc>,

    #[schema(example = "Head office", nullable = true)]
    pub check_in_location: Option<String>,

    #[schema(example = 23.7808, nullable = true)]
    pub check_in_lat: Option<f64>,

    #[schema(example = 90.2792, nullable = true)]
    pub check_in_lng: Option<f64>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub check_out_time: Option<DateTime<Utc>>,

    #[schema(nullable = true)]
    pub check_out_location: Option<String>,

    #[schema(nullable = true)]
    pub check_out_lat: Option<f64>,

    #[schema(nullable = true)]
    pub check_out_lng: Option<f64>,

    pub work_from_home: bool,

    pub late_arrival: bool,

    pub status: AttendanceStatus,

    pub missing_checkout: bool,

    #[schema(example = "UTC")]
    pub timezone: String,
}

impl AttendanceRecord {
    /// Hours between check-in and check-out; sessions still open have no
    /// duration yet. Derived at query time, never stored.
    pub fn hours_worked(&self) -> Option<f64> {
        self.check_out_time
            .map(|out| (out - self.check_in_time).num_milliseconds() as f64 / 3_600_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(check_in: DateTime<Utc>, check_out: Option<DateTime<Utc>>) -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            user_id: 1,
            work_date: check_in.date_naive(),
            check_in_time: check_in,
            check_in_location: None,
            check_in_lat: None,
            check_in_lng: None,
            check_out_time: check_out,
            check_out_location: None,
            check_out_lat: None,
            check_out_lng: None,
            work_from_home: true,
            late_arrival: false,
            status: AttendanceStatus::Present,
            missing_checkout: false,
            timezone: "UTC".to_string(),
        }
    }

    #[test]
    fn hours_worked_is_derived_from_the_closed_session() {
        let check_in = Utc.with_ymd_and_hms(2026, 1, 5, 9, 35, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2026, 1, 5, 17, 35, 0).unwrap();
        assert_eq!(record(check_in, Some(check_out)).hours_worked(), Some(8.0));
        assert_eq!(record(check_in, None).hours_worked(), None);
    }

    #[test]
    fn status_round_trips_through_its_wire_form() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "HALF_DAY");
        assert_eq!(
            "ON_LEAVE".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::OnLeave
        );
        assert!("SICK".parse::<AttendanceStatus>().is_err());
    }
}
