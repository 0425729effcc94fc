//! Attendance ledger: check-in/check-out state per user per calendar day.
//!
//! The at-most-one-record-per-day invariant is not checked with a separate
//! query; the `(user_id, work_date)` unique key settles concurrent check-ins
//! and the duplicate-key violation is surfaced as the business error.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::core::clock;
use crate::core::page::{PageMeta, PageParams};
use crate::core::settings::WorkspaceSettings;
use crate::error::{AppError, is_duplicate_key};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::user::UserSlim;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckInInput {
    #[schema(example = "Head office", nullable = true)]
    pub location: Option<String>,
    #[schema(example = 23.7808, nullable = true)]
    pub lat: Option<f64>,
    #[schema(example = 90.2792, nullable = true)]
    pub lng: Option<f64>,
    #[schema(example = "UTC", nullable = true)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckOutInput {
    #[schema(nullable = true)]
    pub location: Option<String>,
    #[schema(nullable = true)]
    pub lat: Option<f64>,
    #[schema(nullable = true)]
    pub lng: Option<f64>,
}

/// Flags derived at check-in time: a session is work-from-home when neither
/// a location nor a complete coordinate pair was supplied, and late per the
/// clock cutoff from the resolved settings.
pub fn derive_check_in(
    now: DateTime<Utc>,
    input: &CheckInInput,
    settings: &WorkspaceSettings,
) -> (bool, bool, AttendanceStatus) {
    let work_from_home =
        input.location.is_none() && !(input.lat.is_some() && input.lng.is_some());
    let late_arrival = clock::is_late(now, settings.working_start(), settings.check_in_window);
    let status = if late_arrival {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };
    (work_from_home, late_arrival, status)
}

/// One check-in per calendar day, whether or not the earlier session was
/// closed. Returns the persisted record; no notification is sent here.
pub async fn check_in(
    pool: &MySqlPool,
    settings: &WorkspaceSettings,
    user_id: u64,
    now: DateTime<Utc>,
    input: CheckInInput,
) -> Result<AttendanceRecord, AppError> {
    let (work_from_home, late_arrival, status) = derive_check_in(now, &input, settings);
    let work_date = now.date_naive();
    let timezone = input
        .timezone
        .unwrap_or_else(|| settings.default_timezone.clone());

    let result = sqlx::query(
        r#"
        INSERT INTO attendance
            (user_id, work_date, check_in_time, check_in_location,
             check_in_lat, check_in_lng, work_from_home, late_arrival,
             status, timezone)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(work_date)
    .bind(now)
    .bind(&input.location)
    .bind(input.lat)
    .bind(input.lng)
    .bind(work_from_home)
    .bind(late_arrival)
    .bind(status)
    .bind(&timezone)
    .execute(pool)
    .await;

    let inserted = match result {
        Ok(done) => done,
        Err(e) if is_duplicate_key(&e) => return Err(AppError::AlreadyCheckedIn),
        Err(e) => return Err(e.into()),
    };

    let record = sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE id = ?")
        .bind(inserted.last_insert_id())
        .fetch_one(pool)
        .await?;

    tracing::info!(user_id, late_arrival, work_from_home, "Checked in");
    Ok(record)
}

/// Close today's open session. The guarded UPDATE doubles as the existence
/// check: zero affected rows means there is nothing open to close.
pub async fn check_out(
    pool: &MySqlPool,
    user_id: u64,
    now: DateTime<Utc>,
    input: CheckOutInput,
) -> Result<AttendanceRecord, AppError> {
    let work_date = now.date_naive();

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out_time = ?,
            check_out_location = ?,
            check_out_lat = ?,
            check_out_lng = ?,
            missing_checkout = FALSE
        WHERE user_id = ?
          AND work_date = ?
          AND check_out_time IS NULL
        "#,
    )
    .bind(now)
    .bind(&input.location)
    .bind(input.lat)
    .bind(input.lng)
    .bind(user_id)
    .bind(work_date)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NoOpenSession);
    }

    let record = sqlx::query_as::<_, AttendanceRecord>(
        "SELECT * FROM attendance WHERE user_id = ? AND work_date = ?",
    )
    .bind(user_id)
    .bind(work_date)
    .fetch_one(pool)
    .await?;

    tracing::info!(user_id, "Checked out");
    Ok(record)
}

/// An attendance record joined with its owner, as listings return it.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[schema(example = 8.0, nullable = true)]
    pub hours_worked: Option<f64>,
    pub user: UserSlim,
}

#[derive(sqlx::FromRow)]
struct AttendanceJoinRow {
    #[sqlx(flatten)]
    record: AttendanceRecord,
    user_name: String,
    user_email: String,
    user_department: Option<String>,
}

impl From<AttendanceJoinRow> for AttendanceEntry {
    fn from(row: AttendanceJoinRow) -> Self {
        let user = UserSlim {
            id: row.record.user_id,
            name: row.user_name,
            email: row.user_email,
            department: row.user_department,
        };
        let hours_worked = row.record.hours_worked();
        AttendanceEntry {
            record: row.record,
            hours_worked,
            user,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<u64>,
    pub department: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// Typed bind values for the dynamically built WHERE clause.
enum BindValue {
    U64(u64),
    Str(String),
    Status(AttendanceStatus),
    Time(DateTime<Utc>),
}

fn where_clause(filter: &AttendanceFilter) -> (String, Vec<BindValue>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut binds: Vec<BindValue> = Vec::new();

    if let Some(user_id) = filter.user_id {
        sql.push_str(" AND a.user_id = ?");
        binds.push(BindValue::U64(user_id));
    }

    if let Some(department) = &filter.department {
        sql.push_str(" AND u.department = ?");
        binds.push(BindValue::Str(department.clone()));
    }

    if let Some(status) = filter.status {
        sql.push_str(" AND a.status = ?");
        binds.push(BindValue::Status(status));
    }

    if let Some(date) = filter.date {
        // A single day beats an explicit range, as in the upstream API.
        let (start, end) = clock::day_bounds(date);
        sql.push_str(" AND a.check_in_time >= ? AND a.check_in_time < ?");
        binds.push(BindValue::Time(start));
        binds.push(BindValue::Time(end));
    } else {
        if let Some(start_date) = filter.start_date {
            sql.push_str(" AND a.check_in_time >= ?");
            binds.push(BindValue::Time(clock::day_bounds(start_date).0));
        }
        if let Some(end_date) = filter.end_date {
            sql.push_str(" AND a.check_in_time <= ?");
            binds.push(BindValue::Time(clock::end_of_day(end_date)));
        }
    }

    (sql, binds)
}

/// Paginated attendance listing, newest check-in first. Departments filter
/// through the joined user profile.
pub async fn list(
    pool: &MySqlPool,
    filter: &AttendanceFilter,
    page: PageParams,
) -> Result<(Vec<AttendanceEntry>, PageMeta), AppError> {
    let (where_sql, binds) = where_clause(filter);

    let count_sql = format!(
        "SELECT COUNT(*) FROM attendance a JOIN users u ON u.id = a.user_id{}",
        where_sql
    );
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_q = match bind {
            BindValue::U64(v) => count_q.bind(*v),
            BindValue::Str(v) => count_q.bind(v.clone()),
            BindValue::Status(v) => count_q.bind(*v),
            BindValue::Time(v) => count_q.bind(*v),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        r#"
        SELECT a.*, u.name AS user_name, u.email AS user_email, u.department AS user_department
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        {}
        ORDER BY a.check_in_time DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, AttendanceJoinRow>(&data_sql);
    for bind in binds {
        data_q = match bind {
            BindValue::U64(v) => data_q.bind(v),
            BindValue::Str(v) => data_q.bind(v),
            BindValue::Status(v) => data_q.bind(v),
            BindValue::Time(v) => data_q.bind(v),
        };
    }
    let rows = data_q
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok((
        rows.into_iter().map(AttendanceEntry::from).collect(),
        page.meta(total),
    ))
}

/// Every record of the month, ascending. A day without a record is a day
/// without an attendance event, not an ABSENT marker.
pub async fn calendar(
    pool: &MySqlPool,
    user_id: u64,
    month: Option<u32>,
    year: Option<i32>,
    now: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let month = month.unwrap_or_else(|| now.month());
    let year = year.unwrap_or_else(|| now.year());
    let (start, end) = clock::month_bounds(year, month)
        .ok_or_else(|| AppError::InvalidInput("month must be between 1 and 12".to_string()))?;

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT * FROM attendance
        WHERE user_id = ? AND check_in_time >= ? AND check_in_time < ?
        ORDER BY check_in_time ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, h, m, 0).unwrap()
    }

    fn input(location: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> CheckInInput {
        CheckInInput {
            location: location.map(str::to_string),
            lat,
            lng,
            timezone: None,
        }
    }

    #[test]
    fn wfh_requires_both_location_and_coordinates_absent() {
        let settings = WorkspaceSettings::default();

        let (wfh, _, _) = derive_check_in(at(9, 0), &input(None, None, None), &settings);
        assert!(wfh);

        let (wfh, _, _) = derive_check_in(at(9, 0), &input(Some("Office"), None, None), &settings);
        assert!(!wfh);

        let (wfh, _, _) =
            derive_check_in(at(9, 0), &input(None, Some(23.78), Some(90.27)), &settings);
        assert!(!wfh);

        // A lone latitude is not a usable coordinate pair.
        let (wfh, _, _) = derive_check_in(at(9, 0), &input(None, Some(23.78), None), &settings);
        assert!(wfh);
    }

    #[test]
    fn late_check_in_flips_the_status() {
        let settings = WorkspaceSettings::default();

        let (_, late, status) = derive_check_in(at(9, 29), &input(None, None, None), &settings);
        assert!(!late);
        assert_eq!(status, AttendanceStatus::Present);

        let (_, late, status) = derive_check_in(at(9, 31), &input(None, None, None), &settings);
        assert!(late);
        assert_eq!(status, AttendanceStatus::Late);
    }

    #[test]
    fn widened_check_in_window_moves_the_cutoff() {
        let mut settings = WorkspaceSettings::default();
        settings.check_in_window = 60;

        let (_, late, _) = derive_check_in(at(9, 55), &input(None, None, None), &settings);
        assert!(!late);

        let (_, late, _) = derive_check_in(at(10, 1), &input(None, None, None), &settings);
        assert!(late);
    }

    #[test]
    fn single_date_filter_beats_the_range() {
        let filter = AttendanceFilter {
            date: Some(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
            start_date: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
            ..Default::default()
        };
        let (sql, binds) = where_clause(&filter);
        assert!(sql.contains("a.check_in_time >= ? AND a.check_in_time < ?"));
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn department_filter_targets_the_joined_profile() {
        let filter = AttendanceFilter {
            department: Some("Engineering".to_string()),
            status: Some(AttendanceStatus::Late),
            ..Default::default()
        };
        let (sql, binds) = where_clause(&filter);
        assert!(sql.contains("u.department = ?"));
        assert!(sql.contains("a.status = ?"));
        assert_eq!(binds.len(), 2);
    }
}
