use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque reference to a stored file; byte storage and retrieval belong to
/// the attachment-storage collaborator, not this service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attachment {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "doctor-note.pdf")]
    pub file_name: String,

    #[schema(example = "uploads/1736071200-doctor-note.pdf")]
    pub file_path: String,

    #[schema(example = "application/pdf")]
    pub file_type: String,

    #[schema(example = 48123)]
    pub file_size: u64,

    #[schema(example = 3, nullable = true)]
    pub wfh_request_id: Option<u64>,

    #[schema(example = json!(null), nullable = true)]
    pub daily_report_id: Option<u64>,
}
