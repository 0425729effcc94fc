//! WFH approval workflow: PENDING -> APPROVED | REJECTED, exactly once per
//! request, at most one request per (user, date).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::core::notify;
use crate::core::page::{PageMeta, PageParams};
use crate::error::{AppError, is_duplicate_key};
use crate::model::attachment::Attachment;
use crate::model::notification::NotificationType;
use crate::model::user::UserSlim;
use crate::model::wfh::{ApprovalStatus, Decision, WfhRequest};

/// The unique `(user_id, date)` key settles duplicate submissions, racing
/// ones included.
pub async fn create(
    pool: &MySqlPool,
    user_id: u64,
    date: NaiveDate,
    reason: &str,
) -> Result<WfhRequest, AppError> {
    let result = sqlx::query("INSERT INTO wfh_requests (user_id, date, reason) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(date)
        .bind(reason)
        .execute(pool)
        .await;

    let inserted = match result {
        Ok(done) => done,
        Err(e) if is_duplicate_key(&e) => {
            return Err(AppError::DuplicateRequest("WFH request"));
        }
        Err(e) => return Err(e.into()),
    };

    let request = sqlx::query_as::<_, WfhRequest>("SELECT * FROM wfh_requests WHERE id = ?")
        .bind(inserted.last_insert_id())
        .fetch_one(pool)
        .await?;

    tracing::info!(user_id, date = %date, "WFH request created");
    Ok(request)
}

/// Approve or reject a pending request and notify the requester. The status
/// transition is validated in memory, then re-checked by the guarded UPDATE
/// so a racing approver loses with `AlreadyProcessed` instead of silently
/// overwriting the earlier decision.
pub async fn decide(
    pool: &MySqlPool,
    request_id: u64,
    decision: Decision,
    approver_id: u64,
    now: DateTime<Utc>,
) -> Result<WfhRequest, AppError> {
    let existing = sqlx::query_as::<_, WfhRequest>("SELECT * FROM wfh_requests WHERE id = ?")
        .bind(request_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("WFH request"))?;

    let next = existing.status.decide(decision)?;

    let done = sqlx::query(
        r#"
        UPDATE wfh_requests
        SET status = ?, approved_by = ?, approved_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(next)
    .bind(approver_id)
    .bind(now)
    .bind(request_id)
    .bind(ApprovalStatus::Pending)
    .execute(pool)
    .await?;

    if done.rows_affected() == 0 {
        return Err(AppError::AlreadyProcessed);
    }

    let (kind, title) = match decision {
        Decision::Approved => (NotificationType::Success, "WFH request approved"),
        Decision::Rejected => (NotificationType::Warning, "WFH request rejected"),
    };
    notify::notify_user(
        pool,
        existing.user_id,
        title,
        &format!(
            "Your WFH request for {} has been {}",
            existing.date,
            next.to_string().to_lowercase()
        ),
        kind,
    )
    .await?;

    tracing::info!(request_id, approver_id, status = %next, "WFH request decided");

    Ok(WfhRequest {
        status: next,
        approved_by: Some(approver_id),
        approved_at: Some(now),
        ..existing
    })
}

/// A request joined with its owner and attachment references.
#[derive(Debug, Serialize, ToSchema)]
pub struct WfhEntry {
    #[serde(flatten)]
    pub request: WfhRequest,
    pub user: UserSlim,
    pub attachments: Vec<Attachment>,
}

#[derive(sqlx::FromRow)]
struct WfhJoinRow {
    #[sqlx(flatten)]
    request: WfhRequest,
    user_name: String,
    user_email: String,
    user_department: Option<String>,
}

/// Attachment references for a page of requests, grouped by request id.
async fn attachments_for(
    pool: &MySqlPool,
    request_ids: &[u64],
) -> Result<Vec<Attachment>, AppError> {
    if request_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; request_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM attachments WHERE wfh_request_id IN ({})",
        placeholders
    );
    let mut query = sqlx::query_as::<_, Attachment>(&sql);
    for id in request_ids {
        query = query.bind(*id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Paginated listing for approvers, newest-created first.
pub async fn list(
    pool: &MySqlPool,
    status: Option<ApprovalStatus>,
    page: PageParams,
) -> Result<(Vec<WfhEntry>, PageMeta), AppError> {
    let mut where_sql = String::from(" WHERE 1=1");
    if status.is_some() {
        where_sql.push_str(" AND w.status = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM wfh_requests w{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = status {
        count_q = count_q.bind(status);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        r#"
        SELECT w.*, u.name AS user_name, u.email AS user_email, u.department AS user_department
        FROM wfh_requests w
        JOIN users u ON u.id = w.user_id
        {}
        ORDER BY w.created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, WfhJoinRow>(&data_sql);
    if let Some(status) = status {
        data_q = data_q.bind(status);
    }
    let rows = data_q
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let ids: Vec<u64> = rows.iter().map(|row| row.request.id).collect();
    let attachments = attachments_for(pool, &ids).await?;

    let entries = rows
        .into_iter()
        .map(|row| {
            let own: Vec<Attachment> = attachments
                .iter()
                .filter(|a| a.wfh_request_id == Some(row.request.id))
                .cloned()
                .collect();
            WfhEntry {
                user: UserSlim {
                    id: row.request.user_id,
                    name: row.user_name,
                    email: row.user_email,
                    department: row.user_department,
                },
                attachments: own,
                request: row.request,
            }
        })
        .collect();

    Ok((entries, page.meta(total)))
}
