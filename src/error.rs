use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Business-rule failures surfaced by the core. Every variant carries a
/// machine-readable kind (see [`AppError::kind`]) alongside the human
/// message; the transport mapping lives in the `ResponseError` impl.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,

    #[display(fmt = "No active check-in found for today")]
    NoOpenSession,

    #[display(fmt = "{} already exists for this date", _0)]
    DuplicateRequest(&'static str),

    #[display(fmt = "Request already processed")]
    AlreadyProcessed,

    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    #[display(fmt = "You do not have access to this resource")]
    Forbidden,

    #[display(fmt = "Invalid report type")]
    InvalidReportType,

    #[display(fmt = "{}", _0)]
    InvalidInput(String),

    #[display(fmt = "Internal server error")]
    Database(sqlx::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            AppError::NoOpenSession => "NO_OPEN_SESSION",
            AppError::DuplicateRequest(_) => "DUPLICATE_REQUEST",
            AppError::AlreadyProcessed => "ALREADY_PROCESSED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidReportType => "INVALID_REPORT_TYPE",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Database(e) = self {
            tracing::error!(error = %e, "Database error");
        }

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

/// MySQL signals a violated unique key with SQLSTATE 23000; the unique
/// constraints on attendance/wfh/report tables turn that into the
/// corresponding business error at the call site.
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23000");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_expected_status_codes() {
        assert_eq!(
            AppError::NotFound("WFH request").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::AlreadyCheckedIn.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DuplicateRequest("Daily report").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_name_the_entity() {
        assert_eq!(
            AppError::NotFound("Notification").to_string(),
            "Notification not found"
        );
        assert_eq!(
            AppError::DuplicateRequest("WFH request").to_string(),
            "WFH request already exists for this date"
        );
    }
}
