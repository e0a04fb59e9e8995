//! CRUD operations for the ai_insights table.

use super::error::Error;
use entity::ai_insights::{ActiveModel, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub async fn create(
    db: &impl ConnectionTrait,
    case_id: Id,
    insight_type: &str,
    content: Json,
    confidence_score: f64,
) -> Result<Model, Error> {
    if !(0.0..=1.0).contains(&confidence_score) {
        return Err(Error::validation(
            "Confidence score must be between 0.0 and 1.0",
        ));
    }
    if insight_type.trim().is_empty() {
        return Err(Error::validation("Insight type is required"));
    }

    debug!("Adding {insight_type} insight to case {case_id}");

    let active_model = ActiveModel {
        case_id: Set(case_id),
        insight_type: Set(insight_type.to_string()),
        content: Set(content),
        confidence_score: Set(confidence_score),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}
