use crate::auth::auth::AuthUser;
use crate::core::notify::{self, NotificationFilter};
use crate::core::page::{PageMeta, PageParams};
use crate::model::notification::{Notification, NotificationType};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    /// Filter by read state
    pub read: Option<bool>,
    /// Filter by notification type
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    #[serde(flatten)]
    pub meta: PageMeta,
    #[schema(example = 7)]
    pub unread_count: i64,
}

/// The caller's notifications, newest first, with the live unread count
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Paginated notifications", body = NotificationListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let filter = NotificationFilter {
        read: query.read,
        kind: query.kind,
    };
    let page = PageParams::new(query.page, query.limit);
    let (data, meta, unread_count) =
        notify::list(pool.get_ref(), auth.user_id, &filter, page).await?;

    Ok(HttpResponse::Ok().json(NotificationListResponse {
        data,
        meta,
        unread_count,
    }))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateNotification {
    /// Recipient; omit to broadcast to every active user
    #[schema(example = 42, nullable = true)]
    pub user_id: Option<u64>,
    #[schema(example = "Office closed Friday")]
    pub title: String,
    #[schema(example = "The office is closed for maintenance this Friday")]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
}

/// Send a notification to one user, or broadcast when no recipient is given
/// (Manager/HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotification,
    responses(
        (status = 200, description = "Notification created, or the broadcast report", body = Object, example = json!({
            "message": "Notification sent to 50 users",
            "count": 50,
            "sent": [1, 2, 3],
            "failed": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn create_notification(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateNotification>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let payload = payload.into_inner();
    let kind = payload.kind.unwrap_or(NotificationType::Info);

    match payload.user_id {
        Some(user_id) => {
            let notification = notify::notify_user(
                pool.get_ref(),
                user_id,
                &payload.title,
                &payload.message,
                kind,
            )
            .await?;
            Ok(HttpResponse::Ok().json(notification))
        }
        None => {
            let report =
                notify::broadcast(pool.get_ref(), &payload.title, &payload.message, kind).await?;
            Ok(HttpResponse::Ok().json(json!({
                "message": format!("Notification sent to {} users", report.count),
                "count": report.count,
                "sent": report.sent,
                "failed": report.failed,
            })))
        }
    }
}

/// Mark one owned notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(
        ("id" = u64, Path, description = "Notification to mark read")
    ),
    responses(
        (status = 200, description = "Marked read", body = crate::model::notification::Notification),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the recipient", body = Object, example = json!({
            "error": "FORBIDDEN",
            "message": "You do not have access to this resource"
        })),
        (status = 404, description = "Notification not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let notification =
        notify::mark_read(pool.get_ref(), path.into_inner(), auth.user_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(notification))
}

/// Mark every unread notification of the caller as read (idempotent)
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Affected count", body = Object, example = json!({
            "message": "Marked 7 notifications as read",
            "count": 7
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let count = notify::mark_all_read(pool.get_ref(), auth.user_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Marked {} notifications as read", count),
        "count": count,
    })))
}
