use crate::auth::auth::AuthUser;
use crate::core::clock::Window;
use crate::core::ledger::{self, AttendanceEntry, AttendanceFilter, CheckInInput, CheckOutInput};
use crate::core::page::{PageMeta, PageParams};
use crate::core::wfh::{self, WfhEntry};
use crate::core::{aggregate, settings};
use crate::model::attendance::AttendanceStatus;
use crate::model::wfh::{ApprovalStatus, Decision};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInInput,
    responses(
        (status = 200, description = "Checked in successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "error": "ALREADY_CHECKED_IN",
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckInInput>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();
    let settings = settings::resolve(pool.get_ref()).await?;
    let record = ledger::check_in(
        pool.get_ref(),
        &settings,
        auth.user_id,
        now,
        payload.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOutInput,
    responses(
        (status = 200, description = "Checked out successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "error": "NO_OPEN_SESSION",
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckOutInput>,
) -> actix_web::Result<impl Responder> {
    let now = Utc::now();
    let record = ledger::check_out(pool.get_ref(), auth.user_id, now, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(record))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MyAttendanceQuery {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    /// Range start (inclusive, at local midnight)
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    /// Range end (inclusive, widened to end of day)
    pub end_date: Option<NaiveDate>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 20)]
    /// Items per page (max 100)
    pub limit: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceEntry>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// The caller's own attendance history
#[utoipa::path(
    get,
    path = "/api/v1/attendance/me",
    params(MyAttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance history", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MyAttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filter = AttendanceFilter {
        user_id: Some(auth.user_id),
        start_date: query.start_date,
        end_date: query.end_date,
        ..Default::default()
    };
    let page = PageParams::new(query.page, query.limit);
    let (data, meta) = ledger::list(pool.get_ref(), &filter, page).await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse { data, meta }))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 42)]
    /// Filter by employee
    pub user_id: Option<u64>,
    #[schema(example = "Engineering")]
    /// Filter by department
    pub department: Option<String>,
    /// Filter by record status
    pub status: Option<AttendanceStatus>,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    /// A single day; takes precedence over the range below
    pub date: Option<NaiveDate>,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

/// All attendance records (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance listing", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn all_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let query = query.into_inner();
    let filter = AttendanceFilter {
        user_id: query.user_id,
        department: query.department,
        status: query.status,
        date: query.date,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let page = PageParams::new(query.page, query.limit);
    let (data, meta) = ledger::list(pool.get_ref(), &filter, page).await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse { data, meta }))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct StatsQuery {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

/// Attendance statistics over a window (defaults to the last 30 days)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Window statistics", body = crate::core::aggregate::StatsSummary),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_stats(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<StatsQuery>,
) -> actix_web::Result<impl Responder> {
    let window = Window::resolve(query.start_date, query.end_date, Utc::now());
    let summary = aggregate::stats(pool.get_ref(), &window, query.department.as_deref()).await?;

    Ok(HttpResponse::Ok().json(summary))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    #[schema(example = 1)]
    /// Calendar month, 1-12; defaults to the current month
    pub month: Option<u32>,
    #[schema(example = 2026)]
    /// Calendar year; defaults to the current year
    pub year: Option<i32>,
}

/// Month calendar of one employee's attendance, ascending by check-in
#[utoipa::path(
    get,
    path = "/api/v1/attendance/calendar/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee whose calendar to fetch"),
        CalendarQuery
    ),
    responses(
        (status = 200, description = "Records of the month", body = [crate::model::attendance::AttendanceRecord]),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_calendar(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let records =
        ledger::calendar(pool.get_ref(), user_id, query.month, query.year, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(records))
}

/* =========================
WFH requests
========================= */

#[derive(Deserialize, ToSchema)]
pub struct CreateWfhRequest {
    #[schema(example = "2026-01-09", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Plumber visit in the morning")]
    pub reason: String,
}

/// Submit a WFH request for a date
#[utoipa::path(
    post,
    path = "/api/v1/attendance/wfh-request",
    request_body = CreateWfhRequest,
    responses(
        (status = 200, description = "Request created", body = crate::model::wfh::WfhRequest),
        (status = 400, description = "Request already exists for this date", body = Object, example = json!({
            "error": "DUPLICATE_REQUEST",
            "message": "WFH request already exists for this date"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "WFH"
)]
pub async fn create_wfh_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateWfhRequest>,
) -> actix_web::Result<impl Responder> {
    let request =
        wfh::create(pool.get_ref(), auth.user_id, payload.date, &payload.reason).await?;

    Ok(HttpResponse::Ok().json(request))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateWfhRequest {
    #[schema(example = "APPROVED")]
    pub status: Decision,
}

/// Approve or reject a pending WFH request (Manager/HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/attendance/wfh-request/{id}",
    params(
        ("id" = u64, Path, description = "WFH request to decide")
    ),
    request_body = UpdateWfhRequest,
    responses(
        (status = 200, description = "Decision recorded", body = crate::model::wfh::WfhRequest),
        (status = 400, description = "Already processed", body = Object, example = json!({
            "error": "ALREADY_PROCESSED",
            "message": "Request already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "WFH request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "WFH"
)]
pub async fn update_wfh_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateWfhRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let request = wfh::decide(
        pool.get_ref(),
        path.into_inner(),
        payload.status,
        auth.user_id,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct WfhListQuery {
    /// Filter by workflow status
    pub status: Option<ApprovalStatus>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub limit: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct WfhListResponse {
    pub data: Vec<WfhEntry>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// List WFH requests with attachments (Manager/HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/wfh-requests",
    params(WfhListQuery),
    responses(
        (status = 200, description = "Paginated WFH requests", body = WfhListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "WFH"
)]
pub async fn wfh_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<WfhListQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_above()?;

    let page = PageParams::new(query.page, query.limit);
    let (data, meta) = wfh::list(pool.get_ref(), query.status, page).await?;

    Ok(HttpResponse::Ok().json(WfhListResponse { data, meta }))
}
