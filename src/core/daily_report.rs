//! Daily-report review workflow. Same state machine as WFH approval;
//! creation and review are independent actions (review never requires a
//! prior check-in), and review is single-shot: an already-decided report
//! fails with `AlreadyProcessed` just like a decided WFH request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::core::notify;
use crate::core::page::{PageMeta, PageParams};
use crate::error::{AppError, is_duplicate_key};
use crate::model::attachment::Attachment;
use crate::model::daily_report::DailyReport;
use crate::model::notification::NotificationType;
use crate::model::user::UserSlim;
use crate::model::wfh::{ApprovalStatus, Decision};

/// One report per (user, date), settled by the unique key.
pub async fn create(
    pool: &MySqlPool,
    user_id: u64,
    date: NaiveDate,
    content: &str,
) -> Result<DailyReport, AppError> {
    let result =
        sqlx::query("INSERT INTO daily_reports (user_id, date, content) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(date)
            .bind(content)
            .execute(pool)
            .await;

    let inserted = match result {
        Ok(done) => done,
        Err(e) if is_duplicate_key(&e) => {
            return Err(AppError::DuplicateRequest("Daily report"));
        }
        Err(e) => return Err(e.into()),
    };

    let report = sqlx::query_as::<_, DailyReport>("SELECT * FROM daily_reports WHERE id = ?")
        .bind(inserted.last_insert_id())
        .fetch_one(pool)
        .await?;

    tracing::info!(user_id, date = %date, "Daily report submitted");
    Ok(report)
}

/// Review a pending report with HR feedback and notify the author.
pub async fn review(
    pool: &MySqlPool,
    report_id: u64,
    feedback: &str,
    decision: Decision,
    reviewer_id: u64,
    now: DateTime<Utc>,
) -> Result<DailyReport, AppError> {
    let existing = sqlx::query_as::<_, DailyReport>("SELECT * FROM daily_reports WHERE id = ?")
        .bind(report_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Daily report"))?;

    let next = existing.status.decide(decision)?;

    let done = sqlx::query(
        r#"
        UPDATE daily_reports
        SET status = ?, hr_feedback = ?, approved_by = ?, approved_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next)
    .bind(feedback)
    .bind(reviewer_id)
    .bind(now)
    .bind(report_id)
    .bind(ApprovalStatus::Pending)
    .execute(pool)
    .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::AlreadyProcessed);
    }

    let kind = match decision {
        Decision::Approved => NotificationType::Success,
        Decision::Rejected => NotificationType::Warning,
    };
    notify::notify_user(
        pool,
        existing.user_id,
        "Daily report reviewed",
        &format!(
            "Your report for {} has been {}",
            existing.date,
            next.to_string().to_lowercase()
        ),
        kind,
    )
    .await?;

    tracing::info!(report_id, reviewer_id, status = %next, "Daily report reviewed");

    Ok(DailyReport {
        status: next,
        hr_feedback: Some(feedback.to_string()),
        approved_by: Some(reviewer_id),
        approved_at: Some(now),
        ..existing
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyReportEntry {
    #[serde(flatten)]
    pub report: DailyReport,
    pub user: UserSlim,
    pub attachments: Vec<Attachment>,
}

#[derive(sqlx::FromRow)]
struct ReportJoinRow {
    #[sqlx(flatten)]
    report: DailyReport,
    user_name: String,
    user_email: String,
    user_department: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DailyReportFilter {
    pub status: Option<ApprovalStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

async fn attachments_for(
    pool: &MySqlPool,
    report_ids: &[u64],
) -> Result<Vec<Attachment>, AppError> {
    if report_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; report_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM attachments WHERE daily_report_id IN ({})",
        placeholders
    );
    let mut query = sqlx::query_as::<_, Attachment>(&sql);
    for id in report_ids {
        query = query.bind(*id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// One employee's reports, newest report date first.
pub async fn for_user(
    pool: &MySqlPool,
    user_id: u64,
    filter: &DailyReportFilter,
    page: PageParams,
) -> Result<(Vec<DailyReportEntry>, PageMeta), AppError> {
    let mut where_sql = String::from(" WHERE r.user_id = ?");
    if filter.status.is_some() {
        where_sql.push_str(" AND r.status = ?");
    }
    if filter.start_date.is_some() {
        where_sql.push_str(" AND r.date >= ?");
    }
    if filter.end_date.is_some() {
        where_sql.push_str(" AND r.date <= ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM daily_reports r{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    if let Some(status) = filter.status {
        count_q = count_q.bind(status);
    }
    if let Some(start) = filter.start_date {
        count_q = count_q.bind(start);
    }
    if let Some(end) = filter.end_date {
        count_q = count_q.bind(end);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        r#"
        SELECT r.*, u.name AS user_name, u.email AS user_email, u.department AS user_department
        FROM daily_reports r
        JOIN users u ON u.id = r.user_id
        {}
        ORDER BY r.date DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, ReportJoinRow>(&data_sql).bind(user_id);
    if let Some(status) = filter.status {
        data_q = data_q.bind(status);
    }
    if let Some(start) = filter.start_date {
        data_q = data_q.bind(start);
    }
    if let Some(end) = filter.end_date {
        data_q = data_q.bind(end);
    }
    let rows = data_q
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let ids: Vec<u64> = rows.iter().map(|row| row.report.id).collect();
    let attachments = attachments_for(pool, &ids).await?;

    let entries = rows
        .into_iter()
        .map(|row| {
            let own: Vec<Attachment> = attachments
                .iter()
                .filter(|a| a.daily_report_id == Some(row.report.id))
                .cloned()
                .collect();
            DailyReportEntry {
                user: UserSlim {
                    id: row.report.user_id,
                    name: row.user_name,
                    email: row.user_email,
                    department: row.user_department,
                },
                attachments: own,
                report: row.report,
            }
        })
        .collect();

    Ok((entries, page.meta(total)))
}
