//! SeaORM Entity for the webhook_logs table.
//! Audit record of every inbound voice-vendor webhook delivery.

use crate::webhook_log_status::WebhookLogStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::webhook_logs::Model)]
#[sea_orm(schema_name = "feedback_platform", table_name = "webhook_logs")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Generated per delivery so log lines and rows can be correlated
    #[schema(value_type = Uuid)]
    pub request_id: Id,

    pub event_type: Option<String>,

    pub external_job_id: Option<String>,

    #[schema(value_type = Option<Uuid>)]
    pub case_id: Option<Id>,

    pub status: WebhookLogStatus,

    #[sea_orm(column_type = "JsonBinary")]
    #[schema(value_type = Object)]
    pub payload: Json,

    pub error_message: Option<String>,

    pub processing_time_ms: Option<i64>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
