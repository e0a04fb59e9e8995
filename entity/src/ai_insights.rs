//! SeaORM Entity for the ai_insights table.
//! Structured classifier and vendor annotations attached to a case.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::ai_insights::Model)]
#[sea_orm(schema_name = "feedback_platform", table_name = "ai_insights")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub case_id: Id,

    /// Free-form tag, e.g. "elevenlabs_conversation" or "sentiment_analysis"
    pub insight_type: String,

    #[sea_orm(column_type = "JsonBinary")]
    #[schema(value_type = Object)]
    pub content: Json,

    /// Always within [0.0, 1.0]
    pub confidence_score: f64,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
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
