use crate::auth::auth::AuthUser;
use crate::core::aggregate;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use sqlx::MySqlPool;

/// Today's headline numbers plus overall workspace counters
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses(
        (status = 200, description = "Dashboard summary", body = crate::core::aggregate::DashboardSummary),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let summary = aggregate::dashboard_summary(pool.get_ref(), auth.user_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(summary))
}
