use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, CalendarQuery, CreateWfhRequest, MyAttendanceQuery,
    StatsQuery, UpdateWfhRequest, WfhListQuery, WfhListResponse,
};
use crate::api::daily_report::{
    CreateDailyReport, DailyReportListResponse, DailyReportQuery, ReviewDailyReport,
};
use crate::api::notification::{CreateNotification, NotificationListResponse, NotificationQuery};
use crate::api::report::{ExportQuery, ReportQuery};
use crate::api::users::{UserListResponse, UserQuery};
use crate::core::aggregate::{
    AttendanceReportEnvelope, DashboardSummary, DepartmentInsight, EmployeeReport, ExportData,
    ExportEnvelope, ExportFormat, KeyInsightsEnvelope, OverallSummary, PerformanceMetrics,
    PerformanceReportEnvelope, Period, ReportCounts, ReportType, StatsSummary, TodaySummary,
    TrendPoint,
};
use crate::core::ledger::{AttendanceEntry, CheckInInput, CheckOutInput};
use crate::core::notify::BroadcastReport;
use crate::core::page::PageMeta;
use crate::core::settings::{SettingsUpdate, WorkingHours, WorkspaceSettings};
use crate::model::attachment::Attachment;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::daily_report::DailyReport;
use crate::model::notification::{Notification, NotificationType};
use crate::model::user::{User, UserSlim};
use crate::model::wfh::{ApprovalStatus, Decision, WfhRequest};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracking System API",
        version = "1.0.0",
        description = r#"
## Workforce Attendance Tracking System

This API powers a workforce attendance backend for check-in/check-out
tracking, WFH approvals, daily activity reports and aggregate reporting.

### 🔹 Key Features
- **Attendance**
  - Daily check-in/check-out with late-arrival and WFH derivation
  - Personal history, admin listings, and a month calendar
- **Approvals**
  - WFH requests and daily activity reports, each decided exactly once
- **Reporting**
  - Window statistics, per-employee reports, performance trends,
    department insights and export envelopes
- **Notifications**
  - Per-user delivery, admin broadcast, unread tracking

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Sensitive operations require the **Admin**, **HR** or **Manager** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_attendance,
        crate::api::attendance::all_attendance,
        crate::api::attendance::attendance_stats,
        crate::api::attendance::attendance_calendar,
        crate::api::attendance::create_wfh_request,
        crate::api::attendance::update_wfh_request,
        crate::api::attendance::wfh_requests,

        crate::api::daily_report::create_daily_report,
        crate::api::daily_report::employee_daily_reports,
        crate::api::daily_report::review_daily_report,

        crate::api::report::attendance_report,
        crate::api::report::performance_report,
        crate::api::report::key_insights,
        crate::api::report::export_report,

        crate::api::notification::list_notifications,
        crate::api::notification::create_notification,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read,

        crate::api::dashboard::summary,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::users::list_users
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            AttendanceEntry,
            AttendanceListResponse,
            AttendanceQuery,
            MyAttendanceQuery,
            StatsQuery,
            CalendarQuery,
            CheckInInput,
            CheckOutInput,
            CreateWfhRequest,
            UpdateWfhRequest,
            WfhListQuery,
            WfhListResponse,
            WfhRequest,
            ApprovalStatus,
            Decision,
            CreateDailyReport,
            ReviewDailyReport,
            DailyReport,
            DailyReportQuery,
            DailyReportListResponse,
            Attachment,
            Notification,
            NotificationType,
            NotificationQuery,
            NotificationListResponse,
            CreateNotification,
            BroadcastReport,
            ReportQuery,
            ExportQuery,
            StatsSummary,
            Period,
            ReportCounts,
            EmployeeReport,
            AttendanceReportEnvelope,
            PerformanceMetrics,
            TrendPoint,
            PerformanceReportEnvelope,
            DepartmentInsight,
            KeyInsightsEnvelope,
            ReportType,
            ExportFormat,
            ExportData,
            ExportEnvelope,
            DashboardSummary,
            TodaySummary,
            OverallSummary,
            WorkspaceSettings,
            WorkingHours,
            SettingsUpdate,
            User,
            UserSlim,
            UserQuery,
            UserListResponse,
            PageMeta
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in/check-out and attendance listings"),
        (name = "WFH", description = "Work-from-home approval workflow"),
        (name = "Daily reports", description = "Daily activity report review workflow"),
        (name = "Reports", description = "Aggregate reporting APIs"),
        (name = "Notifications", description = "Notification delivery and read tracking"),
        (name = "Dashboard", description = "Workspace dashboard"),
        (name = "Settings", description = "Workspace settings"),
        (name = "Users", description = "Employee directory"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
