use crate::auth::auth::AuthUser;
use crate::core::settings::{self, SettingsUpdate};
use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;

/// The resolved workspace settings snapshot (defaults plus overrides)
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Resolved settings", body = crate::core::settings::WorkspaceSettings),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let snapshot = settings::resolve(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

/// Upsert the provided settings keys, then return the fresh snapshot (Admin)
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Updated snapshot", body = crate::core::settings::WorkspaceSettings),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SettingsUpdate>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let snapshot = settings::update(pool.get_ref(), &payload, auth.user_id).await?;

    Ok(HttpResponse::Ok().json(snapshot))
}
