use crate::auth::auth::AuthUser;
use crate::core::page::{PageMeta, PageParams};
use crate::model::user::User;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    #[schema(example = "Engineering")]
    /// Filter by department
    pub department: Option<String>,
    #[schema(example = "ACTIVE")]
    /// Filter by account status
    pub status: Option<String>,
    #[schema(example = "doe")]
    /// Search by name, username or email
    pub search: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<User>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
}

/// Employee directory (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated user directory", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = PageParams::new(query.page, query.limit);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(department) = &query.department {
        where_sql.push_str(" AND department = ?");
        args.push(FilterValue::Str(department.clone()));
    }

    if let Some(status) = &query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.clone()));
    }

    if let Some(search) = &query.search {
        where_sql.push_str(" AND (name LIKE ? OR username LIKE ? OR email LIKE ?)");
        let pattern = format!("%{}%", search);
        args.push(FilterValue::Str(pattern.clone()));
        args.push(FilterValue::Str(pattern.clone()));
        args.push(FilterValue::Str(pattern));
    }

    let count_sql = format!("SELECT COUNT(*) FROM users{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(s.clone()),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, username, name, email, department, role_id, status, last_login_at
        FROM users
        {}
        ORDER BY name ASC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, User>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
        };
    }
    let users = data_q
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch user directory");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users,
        meta: page.meta(total),
    }))
}
