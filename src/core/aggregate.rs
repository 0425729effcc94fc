//! Aggregation engine: statistics, per-employee reports, performance trends,
//! department insights and the dashboard summary, all computed over a
//! time-windowed attendance slice.
//!
//! The SQL loader only selects rows; every computation is a pure function
//! over the loaded slice so the formulas are unit-testable without a
//! database. Grouping and summation are order-independent, which is why
//! aggregation reads need no transactional snapshot.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::core::clock::{self, Window};
use crate::error::AppError;
use crate::model::attendance::AttendanceStatus;
use crate::model::user::UserSlim;

/// The slice of a record the aggregations need, joined with its owner.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub user_id: u64,
    pub user_name: String,
    pub user_email: String,
    pub department: Option<String>,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub work_from_home: bool,
    pub late_arrival: bool,
    pub missing_checkout: bool,
    pub status: AttendanceStatus,
}

impl AttendanceRow {
    fn hours(&self) -> Option<f64> {
        self.check_out_time
            .map(|out| (out - self.check_in_time).num_milliseconds() as f64 / 3_600_000.0)
    }
}

async fn load_window(
    pool: &MySqlPool,
    window: &Window,
    department: Option<&str>,
) -> Result<Vec<AttendanceRow>, AppError> {
    let mut sql = String::from(
        r#"
        SELECT a.user_id, u.name AS user_name, u.email AS user_email, u.department,
               a.check_in_time, a.check_out_time, a.work_from_home, a.late_arrival,
               a.missing_checkout, a.status
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        WHERE 1=1
        "#,
    );
    if department.is_some() {
        sql.push_str(" AND u.department = ?");
    }
    if window.start.is_some() {
        sql.push_str(" AND a.check_in_time >= ?");
    }
    if window.end.is_some() {
        sql.push_str(" AND a.check_in_time <= ?");
    }

    let mut query = sqlx::query_as::<_, AttendanceRow>(&sql);
    if let Some(department) = department {
        query = query.bind(department.to_string());
    }
    if let Some(start) = window.start {
        query = query.bind(start);
    }
    if let Some(end) = window.end {
        query = query.bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total` as a 2-decimal percentage; 0 when the denominator is 0,
/// never NaN.
fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct StatsSummary {
    #[schema(example = 120)]
    pub total_records: u64,
    #[schema(example = 98)]
    pub present_count: u64,
    #[schema(example = 22)]
    pub late_count: u64,
    #[schema(example = 35)]
    pub wfh_count: u64,
    #[schema(example = 4)]
    pub missing_checkout_count: u64,
    #[schema(example = 7.85)]
    pub avg_hours: f64,
    #[schema(example = 81.67)]
    pub on_time_rate: f64,
}

/// Counts plus the two derived rates over a window slice.
pub fn summarize(rows: &[AttendanceRow]) -> StatsSummary {
    let total_records = rows.len() as u64;
    let present_count = rows
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u64;
    let late_count = rows.iter().filter(|r| r.late_arrival).count() as u64;
    let wfh_count = rows.iter().filter(|r| r.work_from_home).count() as u64;
    let missing_checkout_count = rows.iter().filter(|r| r.missing_checkout).count() as u64;

    let closed: Vec<f64> = rows.iter().filter_map(AttendanceRow::hours).collect();
    let avg_hours = if closed.is_empty() {
        0.0
    } else {
        round2(closed.iter().sum::<f64>() / closed.len() as f64)
    };

    StatsSummary {
        total_records,
        present_count,
        late_count,
        wfh_count,
        missing_checkout_count,
        avg_hours,
        on_time_rate: rate(total_records - late_count, total_records),
    }
}

pub async fn stats(
    pool: &MySqlPool,
    window: &Window,
    department: Option<&str>,
) -> Result<StatsSummary, AppError> {
    let rows = load_window(pool, window, department).await?;
    Ok(summarize(&rows))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Period {
    #[schema(value_type = String, format = "date-time")]
    pub start_date: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub end_date: DateTime<Utc>,
}

impl Period {
    fn of(window: &Window) -> Self {
        Period {
            start_date: window.period_start(),
            end_date: window.period_end(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeReport {
    pub user: UserSlim,
    #[schema(example = 20)]
    pub total_days: u64,
    #[schema(example = 16)]
    pub present_days: u64,
    #[schema(example = 4)]
    pub late_days: u64,
    #[schema(example = 6)]
    pub wfh_days: u64,
    #[schema(example = 0)]
    pub absent_days: u64,
    #[schema(example = 158.5)]
    pub total_hours: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportCounts {
    #[schema(example = 12)]
    pub total_employees: u64,
    #[schema(example = 231)]
    pub total_records: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceReportEnvelope {
    pub period: Period,
    pub summary: ReportCounts,
    pub data: Vec<EmployeeReport>,
}

/// Group records by employee and accumulate day/hour tallies. Day counters
/// follow the record status; WFH days follow the derived flag.
pub fn group_by_employee(rows: &[AttendanceRow]) -> Vec<EmployeeReport> {
    let mut reports: BTreeMap<u64, EmployeeReport> = BTreeMap::new();

    for row in rows {
        let report = reports.entry(row.user_id).or_insert_with(|| EmployeeReport {
            user: UserSlim {
                id: row.user_id,
                name: row.user_name.clone(),
                email: row.user_email.clone(),
                department: row.department.clone(),
            },
            total_days: 0,
            present_days: 0,
            late_days: 0,
            wfh_days: 0,
            absent_days: 0,
            total_hours: 0.0,
        });

        report.total_days += 1;
        match row.status {
            AttendanceStatus::Present => report.present_days += 1,
            AttendanceStatus::Late => report.late_days += 1,
            AttendanceStatus::Absent => report.absent_days += 1,
            _ => {}
        }
        if row.work_from_home {
            report.wfh_days += 1;
        }
        if let Some(hours) = row.hours() {
            report.total_hours += hours;
        }
    }

    reports.into_values().collect()
}

pub async fn attendance_report(
    pool: &MySqlPool,
    window: &Window,
    department: Option<&str>,
) -> Result<AttendanceReportEnvelope, AppError> {
    let rows = load_window(pool, window, department).await?;
    let data = group_by_employee(&rows);
    Ok(AttendanceReportEnvelope {
        period: Period::of(window),
        summary: ReportCounts {
            total_employees: data.len() as u64,
            total_records: rows.len() as u64,
        },
        data,
    })
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct TrendPoint {
    #[schema(example = "2026-01-05")]
    pub date: String,
    #[schema(example = 14)]
    pub total: u64,
    #[schema(example = 3)]
    pub late: u64,
    #[schema(example = 5)]
    pub wfh: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PerformanceMetrics {
    #[schema(example = 81.67)]
    pub on_time_rate: f64,
    #[schema(example = 18.33)]
    pub late_arrival_rate: f64,
    #[schema(example = 29.17)]
    pub wfh_rate: f64,
    #[schema(example = 120)]
    pub total_records: u64,
    #[schema(example = 22)]
    pub late_count: u64,
    #[schema(example = 35)]
    pub wfh_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PerformanceReportEnvelope {
    pub period: Period,
    pub metrics: PerformanceMetrics,
    pub trends: Vec<TrendPoint>,
}

/// Per-calendar-day totals, ascending by date string.
pub fn daily_trends(rows: &[AttendanceRow]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<String, TrendPoint> = BTreeMap::new();
    for row in rows {
        let date = row.check_in_time.date_naive().to_string();
        let point = by_date.entry(date.clone()).or_insert_with(|| TrendPoint {
            date,
            total: 0,
            late: 0,
            wfh: 0,
        });
        point.total += 1;
        if row.late_arrival {
            point.late += 1;
        }
        if row.work_from_home {
            point.wfh += 1;
        }
    }
    by_date.into_values().collect()
}

pub fn performance_metrics(rows: &[AttendanceRow]) -> PerformanceMetrics {
    let total_records = rows.len() as u64;
    let late_count = rows.iter().filter(|r| r.late_arrival).count() as u64;
    let wfh_count = rows.iter().filter(|r| r.work_from_home).count() as u64;

    PerformanceMetrics {
        on_time_rate: rate(total_records - late_count, total_records),
        late_arrival_rate: rate(late_count, total_records),
        wfh_rate: rate(wfh_count, total_records),
        total_records,
        late_count,
        wfh_count,
    }
}

pub async fn performance_report(
    pool: &MySqlPool,
    window: &Window,
    department: Option<&str>,
) -> Result<PerformanceReportEnvelope, AppError> {
    let rows = load_window(pool, window, department).await?;
    Ok(PerformanceReportEnvelope {
        period: Period::of(window),
        metrics: performance_metrics(&rows),
        trends: daily_trends(&rows),
    })
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct DepartmentInsight {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 64)]
    pub total: u64,
    #[schema(example = 6)]
    pub late: u64,
    #[schema(example = 20)]
    pub wfh: u64,
    #[schema(example = 90.63)]
    pub on_time_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KeyInsightsEnvelope {
    pub top_departments: Vec<DepartmentInsight>,
    pub summary: StatsSummary,
}

/// The five best departments by on-time rate. Records without a department
/// land in "Unknown".
pub fn top_departments(rows: &[AttendanceRow]) -> Vec<DepartmentInsight> {
    let mut by_department: BTreeMap<String, DepartmentInsight> = BTreeMap::new();
    for row in rows {
        let name = row
            .department
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let insight = by_department
            .entry(name.clone())
            .or_insert_with(|| DepartmentInsight {
                department: name,
                total: 0,
                late: 0,
                wfh: 0,
                on_time_rate: 0.0,
            });
        insight.total += 1;
        if row.late_arrival {
            insight.late += 1;
        }
        if row.work_from_home {
            insight.wfh += 1;
        }
    }

    let mut insights: Vec<DepartmentInsight> = by_department
        .into_values()
        .map(|mut insight| {
            insight.on_time_rate = rate(insight.total - insight.late, insight.total);
            insight
        })
        .collect();
    insights.sort_by(|a, b| {
        b.on_time_rate
            .partial_cmp(&a.on_time_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    insights.truncate(5);
    insights
}

pub async fn key_insights(
    pool: &MySqlPool,
    window: &Window,
    department: Option<&str>,
) -> Result<KeyInsightsEnvelope, AppError> {
    let rows = load_window(pool, window, department).await?;
    Ok(KeyInsightsEnvelope {
        top_departments: top_departments(&rows),
        summary: summarize(&rows),
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportType {
    Attendance,
    Performance,
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
    Xlsx,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ExportData {
    Attendance(AttendanceReportEnvelope),
    Performance(PerformanceReportEnvelope),
}

/// Export envelope: the requested format travels as metadata only; the
/// actual CSV/PDF/XLSX rendering is an external collaborator's job.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExportEnvelope {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub format: ExportFormat,
    pub data: ExportData,
    #[schema(value_type = String, format = "date-time")]
    pub exported_at: DateTime<Utc>,
}

pub async fn export(
    pool: &MySqlPool,
    report_type: &str,
    format: ExportFormat,
    window: &Window,
    department: Option<&str>,
) -> Result<ExportEnvelope, AppError> {
    let report_type =
        ReportType::from_str(report_type).map_err(|_| AppError::InvalidReportType)?;

    let data = match report_type {
        ReportType::Attendance => {
            ExportData::Attendance(attendance_report(pool, window, department).await?)
        }
        ReportType::Performance => {
            ExportData::Performance(performance_report(pool, window, department).await?)
        }
    };

    Ok(ExportEnvelope {
        report_type,
        format,
        data,
        exported_at: window.now,
    })
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct TodaySummary {
    #[schema(example = 34)]
    pub total_check_ins: u64,
    #[schema(example = 5)]
    pub missing_checkouts: u64,
    #[schema(example = 4)]
    pub late_arrivals: u64,
    #[schema(example = 30)]
    pub present_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OverallSummary {
    #[schema(example = 48)]
    pub total_employees: u64,
    #[schema(example = 3)]
    pub pending_wfh_requests: u64,
    #[schema(example = 7)]
    pub unread_notifications: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub today: TodaySummary,
    pub overall: OverallSummary,
    #[schema(value_type = String, format = "date-time")]
    pub timestamp: DateTime<Utc>,
}

/// Today's tallies. Open sessions count as missing checkouts unless the
/// record was already flagged as such.
pub fn today_counts(rows: &[AttendanceRow]) -> TodaySummary {
    TodaySummary {
        total_check_ins: rows.len() as u64,
        missing_checkouts: rows
            .iter()
            .filter(|r| r.check_out_time.is_none() && !r.missing_checkout)
            .count() as u64,
        late_arrivals: rows.iter().filter(|r| r.late_arrival).count() as u64,
        present_count: rows
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count() as u64,
    }
}

pub async fn dashboard_summary(
    pool: &MySqlPool,
    caller_id: u64,
    now: DateTime<Utc>,
) -> Result<DashboardSummary, AppError> {
    let (start, end) = clock::day_bounds(now.date_naive());
    let rows = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT a.user_id, u.name AS user_name, u.email AS user_email, u.department,
               a.check_in_time, a.check_out_time, a.work_from_home, a.late_arrival,
               a.missing_checkout, a.status
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        WHERE a.check_in_time >= ? AND a.check_in_time < ?
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let total_employees =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE status = 'ACTIVE'")
            .fetch_one(pool)
            .await?;
    let pending_wfh_requests = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM wfh_requests WHERE status = 'PENDING'",
    )
    .fetch_one(pool)
    .await?;
    let unread_notifications = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = FALSE",
    )
    .bind(caller_id)
    .fetch_one(pool)
    .await?;

    Ok(DashboardSummary {
        today: today_counts(&rows),
        overall: OverallSummary {
            total_employees: total_employees.max(0) as u64,
            pending_wfh_requests: pending_wfh_requests.max(0) as u64,
            unread_notifications: unread_notifications.max(0) as u64,
        },
        timestamp: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(
        user_id: u64,
        department: Option<&str>,
        check_in: DateTime<Utc>,
        check_out: Option<DateTime<Utc>>,
        late: bool,
        wfh: bool,
    ) -> AttendanceRow {
        AttendanceRow {
            user_id,
            user_name: format!("User {}", user_id),
            user_email: format!("user{}@company.com", user_id),
            department: department.map(str::to_string),
            check_in_time: check_in,
            check_out_time: check_out,
            work_from_home: wfh,
            late_arrival: late,
            missing_checkout: false,
            status: if late {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            },
        }
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, h, m, 0).unwrap()
    }

    #[test]
    fn empty_window_yields_zeroed_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.avg_hours, 0.0);
        assert_eq!(summary.on_time_rate, 0.0);
    }

    #[test]
    fn late_wfh_day_shows_up_in_every_tally() {
        // Check-in 09:35 with no location, check-out 17:35: 8 hours, late,
        // WFH, and an on-time rate of zero for the single-record window.
        let rows = vec![row(
            1,
            Some("Engineering"),
            at(5, 9, 35),
            Some(at(5, 17, 35)),
            true,
            true,
        )];
        let summary = summarize(&rows);
        assert_eq!(summary.total_records, 1);
        assert_eq!(summary.present_count, 0);
        assert_eq!(summary.late_count, 1);
        assert_eq!(summary.wfh_count, 1);
        assert_eq!(summary.avg_hours, 8.0);
        assert_eq!(summary.on_time_rate, 0.0);
    }

    #[test]
    fn open_sessions_do_not_skew_average_hours() {
        let rows = vec![
            row(1, None, at(5, 9, 0), Some(at(5, 17, 0)), false, false),
            row(2, None, at(5, 9, 0), None, false, false),
        ];
        assert_eq!(summarize(&rows).avg_hours, 8.0);
    }

    #[test]
    fn employee_grouping_accumulates_days_and_hours() {
        let rows = vec![
            row(1, None, at(5, 9, 0), Some(at(5, 17, 0)), false, false),
            row(1, None, at(6, 9, 40), Some(at(6, 18, 10)), true, true),
            row(2, None, at(5, 9, 0), None, false, false),
        ];
        let reports = group_by_employee(&rows);
        assert_eq!(reports.len(), 2);

        let first = reports.iter().find(|r| r.user.id == 1).unwrap();
        assert_eq!(first.total_days, 2);
        assert_eq!(first.present_days, 1);
        assert_eq!(first.late_days, 1);
        assert_eq!(first.wfh_days, 1);
        assert_eq!(first.total_hours, 16.5);

        let second = reports.iter().find(|r| r.user.id == 2).unwrap();
        assert_eq!(second.total_days, 1);
        assert_eq!(second.total_hours, 0.0);
    }

    #[test]
    fn trends_come_out_ascending_by_date() {
        let rows = vec![
            row(1, None, at(6, 9, 0), None, false, true),
            row(2, None, at(5, 9, 40), None, true, false),
            row(3, None, at(5, 9, 0), None, false, false),
        ];
        let trends = daily_trends(&rows);
        assert_eq!(
            trends,
            vec![
                TrendPoint {
                    date: "2026-01-05".to_string(),
                    total: 2,
                    late: 1,
                    wfh: 0,
                },
                TrendPoint {
                    date: "2026-01-06".to_string(),
                    total: 1,
                    late: 0,
                    wfh: 1,
                },
            ]
        );
    }

    #[test]
    fn performance_rates_survive_an_empty_slice() {
        let metrics = performance_metrics(&[]);
        assert_eq!(metrics.on_time_rate, 0.0);
        assert_eq!(metrics.late_arrival_rate, 0.0);
        assert_eq!(metrics.wfh_rate, 0.0);
    }

    #[test]
    fn top_departments_rank_by_on_time_rate_and_cap_at_five() {
        let mut rows = Vec::new();
        // Six departments; "D0" is fully late, the rest fully on time.
        for dept in 0..6u64 {
            for i in 0..4u64 {
                rows.push(row(
                    dept * 10 + i,
                    Some(&format!("D{}", dept)),
                    at(5, 9, 0),
                    None,
                    dept == 0,
                    false,
                ));
            }
        }
        let insights = top_departments(&rows);
        assert_eq!(insights.len(), 5);
        assert!(insights.iter().all(|d| d.department != "D0"));
        assert!(insights.iter().all(|d| d.on_time_rate == 100.0));
    }

    #[test]
    fn missing_department_groups_as_unknown() {
        let rows = vec![row(1, None, at(5, 9, 0), None, false, false)];
        let insights = top_departments(&rows);
        assert_eq!(insights[0].department, "Unknown");
        assert_eq!(insights[0].on_time_rate, 100.0);
    }

    #[test]
    fn today_counts_flag_open_sessions_once() {
        let mut flagged = row(2, None, at(5, 9, 0), None, false, false);
        flagged.missing_checkout = true;
        let rows = vec![
            row(1, None, at(5, 9, 0), None, false, false),
            flagged,
            row(3, None, at(5, 9, 40), Some(at(5, 18, 0)), true, false),
        ];
        let today = today_counts(&rows);
        assert_eq!(today.total_check_ins, 3);
        assert_eq!(today.missing_checkouts, 1);
        assert_eq!(today.late_arrivals, 1);
        assert_eq!(today.present_count, 2);
    }

    #[test]
    fn unknown_report_type_is_rejected() {
        assert!(ReportType::from_str("attendance").is_ok());
        assert!(ReportType::from_str("performance").is_ok());
        assert!(ReportType::from_str("payroll").is_err());
    }

    #[test]
    fn rates_round_to_two_decimals() {
        assert_eq!(rate(1, 3), 33.33);
        assert_eq!(rate(2, 3), 66.67);
        assert_eq!(round2(7.8549), 7.85);
    }
}
