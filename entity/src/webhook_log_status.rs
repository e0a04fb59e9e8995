use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of one inbound webhook delivery.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "webhook_log_status")]
pub enum WebhookLogStatus {
    #[sea_orm(string_value = "received")]
    #[default]
    Received,
    #[sea_orm(string_value = "processed")]
    Processed,
    /// Payload matched no trigger condition
    #[sea_orm(string_value = "ignored")]
    Ignored,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for WebhookLogStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookLogStatus::Received => write!(fmt, "received"),
            WebhookLogStatus::Processed => write!(fmt, "processed"),
            WebhookLogStatus::Ignored => write!(fmt, "ignored"),
            WebhookLogStatus::Failed => write!(fmt, "failed"),
        }
    }
}
