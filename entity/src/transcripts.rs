//! SeaORM Entity for the transcripts table.
//! Raw conversation text attached to a case, plus voice-job processing details.

use crate::transcript_status::TranscriptStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::transcripts::Model)]
#[sea_orm(schema_name = "feedback_platform", table_name = "transcripts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub case_id: Id,

    #[sea_orm(column_type = "Text")]
    pub raw_transcript: String,

    #[sea_orm(column_type = "Text")]
    pub processed_summary: Option<String>,

    /// Always within [-1.0, 1.0]
    pub sentiment_score: f64,

    /// Vendor job id used to upsert status updates
    pub external_job_id: Option<String>,

    pub audio_duration_seconds: Option<f64>,

    /// Vendor transcription confidence (0.0 - 1.0)
    pub confidence_score: Option<f64>,

    pub language_code: Option<String>,

    pub processing_status: TranscriptStatus,

    pub error_message: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cases::Entity",
        from = "Column::CaseId",
        to = "super::cases::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Cases,
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
