//! Notification fan-out: single-recipient creates, broadcast to every
//! active user, and the read/read-all mutations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::core::page::{PageMeta, PageParams};
use crate::error::AppError;
use crate::model::notification::{Notification, NotificationType};

async fn insert_one(
    pool: &MySqlPool,
    user_id: u64,
    title: &str,
    message: &str,
    kind: NotificationType,
) -> Result<u64, AppError> {
    let done = sqlx::query(
        "INSERT INTO notifications (user_id, title, message, `type`) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(title)
    .bind(message)
    .bind(kind)
    .execute(pool)
    .await?;
    Ok(done.last_insert_id())
}

/// Create exactly one notification for `user_id`.
pub async fn notify_user(
    pool: &MySqlPool,
    user_id: u64,
    title: &str,
    message: &str,
    kind: NotificationType,
) -> Result<Notification, AppError> {
    let id = insert_one(pool, user_id, title, message, kind).await?;
    let notification =
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(notification)
}

/// Outcome of a broadcast. Sub-writes are not retried here; a caller that
/// needs delivery for everyone retries the `failed` subset only.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastReport {
    #[schema(example = 50)]
    pub count: usize,
    pub sent: Vec<u64>,
    pub failed: Vec<u64>,
}

/// One notification per currently-active user. All sub-writes are awaited
/// before returning; the report carries the per-recipient outcome.
pub async fn broadcast(
    pool: &MySqlPool,
    title: &str,
    message: &str,
    kind: NotificationType,
) -> Result<BroadcastReport, AppError> {
    let recipients =
        sqlx::query_scalar::<_, u64>("SELECT id FROM users WHERE status = 'ACTIVE'")
            .fetch_all(pool)
            .await?;

    let outcomes = futures::future::join_all(
        recipients
            .iter()
            .map(|user_id| insert_one(pool, *user_id, title, message, kind)),
    )
    .await;

    let mut sent = Vec::with_capacity(recipients.len());
    let mut failed = Vec::new();
    for (user_id, outcome) in recipients.into_iter().zip(outcomes) {
        match outcome {
            Ok(_) => sent.push(user_id),
            Err(e) => {
                tracing::error!(error = %e, user_id, "Broadcast notification failed");
                failed.push(user_id);
            }
        }
    }

    tracing::info!(sent = sent.len(), failed = failed.len(), "Broadcast sent");
    Ok(BroadcastReport {
        count: sent.len(),
        sent,
        failed,
    })
}

/// The ownership check lives here because it needs the entity, not the
/// token: only the recipient may mark a notification read.
pub async fn mark_read(
    pool: &MySqlPool,
    notification_id: u64,
    caller_id: u64,
    now: DateTime<Utc>,
) -> Result<Notification, AppError> {
    let notification =
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
            .bind(notification_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::NotFound("Notification"))?;

    if notification.user_id != caller_id {
        return Err(AppError::Forbidden);
    }

    sqlx::query("UPDATE notifications SET is_read = TRUE, read_at = ? WHERE id = ?")
        .bind(now)
        .bind(notification_id)
        .execute(pool)
        .await?;

    Ok(Notification {
        read: true,
        read_at: Some(now),
        ..notification
    })
}

/// Bulk-read every unread notification owned by the caller; the affected
/// count makes repeated calls observably idempotent (0 the second time).
pub async fn mark_all_read(
    pool: &MySqlPool,
    caller_id: u64,
    now: DateTime<Utc>,
) -> Result<u64, AppError> {
    let done = sqlx::query(
        "UPDATE notifications SET is_read = TRUE, read_at = ? WHERE user_id = ? AND is_read = FALSE",
    )
    .bind(now)
    .bind(caller_id)
    .execute(pool)
    .await?;

    Ok(done.rows_affected())
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub read: Option<bool>,
    pub kind: Option<NotificationType>,
}

/// The caller's notifications, newest first, with the live unread count
/// alongside the page.
pub async fn list(
    pool: &MySqlPool,
    caller_id: u64,
    filter: &NotificationFilter,
    page: PageParams,
) -> Result<(Vec<Notification>, PageMeta, i64), AppError> {
    let mut where_sql = String::from(" WHERE user_id = ?");
    if filter.read.is_some() {
        where_sql.push_str(" AND is_read = ?");
    }
    if filter.kind.is_some() {
        where_sql.push_str(" AND `type` = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM notifications{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql).bind(caller_id);
    if let Some(read) = filter.read {
        count_q = count_q.bind(read);
    }
    if let Some(kind) = filter.kind {
        count_q = count_q.bind(kind);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT * FROM notifications{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, Notification>(&data_sql).bind(caller_id);
    if let Some(read) = filter.read {
        data_q = data_q.bind(read);
    }
    if let Some(kind) = filter.kind {
        data_q = data_q.bind(kind);
    }
    let notifications = data_q
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let unread_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = FALSE",
    )
    .bind(caller_id)
    .fetch_one(pool)
    .await?;

    Ok((notifications, page.meta(total), unread_count))
}
