use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing status of a transcript produced by the voice vendor.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transcript_status")]
pub enum TranscriptStatus {
    /// Job has been submitted but not started
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Vendor is still processing the audio
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Transcript text is final
    #[sea_orm(string_value = "completed")]
    #[default]
    Completed,
    /// Vendor reported a failure
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for TranscriptStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptStatus::Pending => write!(fmt, "pending"),
            TranscriptStatus::Processing => write!(fmt, "processing"),
            TranscriptStatus::Completed => write!(fmt, "completed"),
            TranscriptStatus::Failed => write!(fmt, "failed"),
        }
    }
}
