use crate::auth::auth::AuthUser;
use crate::core::aggregate::{self, ExportFormat};
use crate::core::clock::Window;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

/// Per-employee attendance report over a window (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance",
    params(ReportQuery),
    responses(
        (status = 200, description = "Grouped report", body = crate::core::aggregate::AttendanceReportEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let window = Window::resolve(query.start_date, query.end_date, Utc::now());
    let report =
        aggregate::attendance_report(pool.get_ref(), &window, query.department.as_deref()).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// On-time/late/WFH rates plus the per-day trend series (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/performance",
    params(ReportQuery),
    responses(
        (status = 200, description = "Performance metrics", body = crate::core::aggregate::PerformanceReportEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn performance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let window = Window::resolve(query.start_date, query.end_date, Utc::now());
    let report =
        aggregate::performance_report(pool.get_ref(), &window, query.department.as_deref())
            .await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Top departments by on-time rate plus the window summary (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/key-insights",
    params(ReportQuery),
    responses(
        (status = 200, description = "Key insights", body = crate::core::aggregate::KeyInsightsEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn key_insights(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let window = Window::resolve(query.start_date, query.end_date, Utc::now());
    let insights =
        aggregate::key_insights(pool.get_ref(), &window, query.department.as_deref()).await?;

    Ok(HttpResponse::Ok().json(insights))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ExportQuery {
    /// Report to export: "attendance" or "performance"
    #[serde(rename = "type")]
    #[schema(example = "attendance")]
    pub report_type: String,
    /// Travels as metadata only; rendering is the export collaborator's job
    pub format: ExportFormat,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

/// Export a report envelope (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/reports/export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Export envelope", body = crate::core::aggregate::ExportEnvelope),
        (status = 400, description = "Invalid report type", body = Object, example = json!({
            "error": "INVALID_REPORT_TYPE",
            "message": "Invalid report type"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn export_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ExportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let query = query.into_inner();
    let window = Window::resolve(query.start_date, query.end_date, Utc::now());
    let envelope = aggregate::export(
        pool.get_ref(),
        &query.report_type,
        query.format,
        &window,
        query.department.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(envelope))
}
