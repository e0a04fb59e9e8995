//! CRUD operations for the hr_interactions table.

use super::error::Error;
use entity::hr_interactions::{ActiveModel, Column, Entity, Model};
use entity::sender_type::SenderType;
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

/// Appends a message to a case's thread.
///
/// The message is trimmed and must not be empty. A missing or blank sender name falls back
/// to the sender type's default ("Anonymous", "HR Manager" or "System").
pub async fn create(
    db: &impl ConnectionTrait,
    case_id: Id,
    message: &str,
    sender_type: SenderType,
    sender_name: Option<&str>,
) -> Result<Model, Error> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::validation("Message cannot be empty"));
    }

    let sender_name = sender_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| sender_type.default_name());

    debug!("Adding {sender_type} message to case {case_id}");

    let active_model = ActiveModel {
        case_id: Set(case_id),
        message: Set(message.to_string()),
        sender_type: Set(sender_type),
        sender_name: Set(sender_name.to_string()),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// The case's thread, oldest message first.
pub async fn find_by_case_id(db: &impl ConnectionTrait, case_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CaseId.eq(case_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}
