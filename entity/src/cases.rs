//! SeaORM Entity for the cases table.
//! One row per feedback incident (or per ACK generation audit event).

use crate::case_category::CaseCategory;
use crate::case_status::CaseStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::cases::Model)]
#[sea_orm(schema_name = "feedback_platform", table_name = "cases")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    /// Human-presentable 10 character code, unique across all cases
    #[sea_orm(unique)]
    pub confirmation_code: String,

    pub title: String,

    pub category: CaseCategory,

    #[sea_orm(column_type = "Text")]
    pub summary: String,

    /// 1 (lowest) to 5 (most severe)
    pub severity: i32,

    pub status: CaseStatus,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transcripts::Entity")]
    Transcripts,

    #[sea_orm(has_many = "super::hr_interactions::Entity")]
    HrInteractions,

    #[sea_orm(has_many = "super::ai_insights::Entity")]
    AiInsights,
}

impl Related<super::transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcripts.def()
    }
}

impl Related<super::hr_interactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HrInteractions.def()
    }
}

impl Related<super::ai_insights::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiInsights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
