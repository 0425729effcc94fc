use crate::auth::auth::AuthUser;
use crate::core::daily_report::{self, DailyReportEntry, DailyReportFilter};
use crate::core::page::{PageMeta, PageParams};
use crate::model::wfh::{ApprovalStatus, Decision};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateDailyReport {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Closed the Q1 onboarding tickets, reviewed two PRs")]
    pub content: String,
}

/// Submit the daily activity report for a date
#[utoipa::path(
    post,
    path = "/api/v1/reports/daily",
    request_body = CreateDailyReport,
    responses(
        (status = 200, description = "Report submitted", body = crate::model::daily_report::DailyReport),
        (status = 400, description = "Report already exists for this date", body = Object, example = json!({
            "error": "DUPLICATE_REQUEST",
            "message": "Daily report already exists for this date"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Daily reports"
)]
pub async fn create_daily_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDailyReport>,
) -> actix_web::Result<impl Responder> {
    let report = daily_report::create(
        pool.get_ref(),
        auth.user_id,
        payload.date,
        &payload.content,
    )
    .await?;

    Ok(HttpResponse::Ok().json(report))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DailyReportQuery {
    /// Filter by review status
    pub status: Option<ApprovalStatus>,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct DailyReportListResponse {
    pub data: Vec<DailyReportEntry>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// One employee's daily reports (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/daily/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee whose reports to list"),
        DailyReportQuery
    ),
    responses(
        (status = 200, description = "Paginated daily reports", body = DailyReportListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Daily reports"
)]
pub async fn employee_daily_reports(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<DailyReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let filter = DailyReportFilter {
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let page = PageParams::new(query.page, query.limit);
    let (data, meta) =
        daily_report::for_user(pool.get_ref(), path.into_inner(), &filter, page).await?;

    Ok(HttpResponse::Ok().json(DailyReportListResponse { data, meta }))
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewDailyReport {
    #[schema(example = "APPROVED")]
    pub status: Decision,
    #[schema(example = "Good coverage, add time estimates next week")]
    pub hr_feedback: String,
}

/// Review a pending daily report with feedback (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/reports/daily/{id}",
    params(
        ("id" = u64, Path, description = "Daily report to review")
    ),
    request_body = ReviewDailyReport,
    responses(
        (status = 200, description = "Review recorded", body = crate::model::daily_report::DailyReport),
        (status = 400, description = "Already processed", body = Object, example = json!({
            "error": "ALREADY_PROCESSED",
            "message": "Request already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Daily report not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Daily reports"
)]
pub async fn review_daily_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ReviewDailyReport>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let report = daily_report::review(
        pool.get_ref(),
        path.into_inner(),
        &payload.hr_feedback,
        payload.status,
        auth.user_id,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(report))
}
