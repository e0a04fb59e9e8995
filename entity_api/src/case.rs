//! CRUD operations for the cases table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, LoaderTrait, QueryOrder,
};

use super::error::Error;
use super::retry::{with_retry, RetryPolicy};
use entity::case_category::CaseCategory;
use entity::case_status::CaseStatus;
use entity::cases::{ActiveModel, Column, Entity, Model};
use entity::{ai_insights, hr_interactions, transcripts, Id};
use log::*;

/// Every confirmation code (and ACK number) is exactly this many characters.
pub const CONFIRMATION_CODE_LEN: usize = 10;

pub const MIN_SEVERITY: i32 = 1;
pub const MAX_SEVERITY: i32 = 5;

/// Input for creating a case.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCase {
    pub confirmation_code: String,
    pub title: String,
    pub category: CaseCategory,
    pub summary: String,
    pub severity: i32,
}

/// A case with everything attached to it, as read by the HR dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CaseWithDetails {
    #[serde(flatten)]
    pub case: Model,
    pub transcripts: Vec<transcripts::Model>,
    pub interactions: Vec<hr_interactions::Model>,
    pub insights: Vec<ai_insights::Model>,
}

/// Trims and uppercases a confirmation code, rejecting anything that isn't 10 characters.
pub fn normalize_confirmation_code(code: &str) -> Result<String, Error> {
    let normalized = code.trim().to_uppercase();
    if normalized.chars().count() != CONFIRMATION_CODE_LEN {
        return Err(Error::validation(format!(
            "Confirmation code must be exactly {CONFIRMATION_CODE_LEN} characters"
        )));
    }
    Ok(normalized)
}

fn validate(new_case: &NewCase) -> Result<(), Error> {
    if new_case.confirmation_code.chars().count() != CONFIRMATION_CODE_LEN {
        return Err(Error::validation(format!(
            "Confirmation code must be exactly {CONFIRMATION_CODE_LEN} characters"
        )));
    }
    if new_case.title.trim().is_empty() {
        return Err(Error::validation("Title is required"));
    }
    if new_case.summary.trim().is_empty() {
        return Err(Error::validation("Summary is required"));
    }
    if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&new_case.severity) {
        return Err(Error::validation(format!(
            "Severity must be between {MIN_SEVERITY} and {MAX_SEVERITY}"
        )));
    }
    Ok(())
}

/// Inserts a new open case.
///
/// Uniqueness of the confirmation code is left to the database's unique constraint; a
/// collision comes back as `RecordAlreadyExists`.
pub async fn create(db: &impl ConnectionTrait, new_case: NewCase) -> Result<Model, Error> {
    validate(&new_case)?;
    debug!(
        "Creating {} case {} (severity {})",
        new_case.category, new_case.confirmation_code, new_case.severity
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        confirmation_code: Set(new_case.confirmation_code),
        title: Set(new_case.title),
        category: Set(new_case.category),
        summary: Set(new_case.summary),
        severity: Set(new_case.severity),
        status: Set(CaseStatus::Open),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        debug!("Case with id {id} not found");
        Error::not_found()
    })
}

/// Looks up a case by confirmation code, case-insensitively.
pub async fn find_by_confirmation_code(
    db: &impl ConnectionTrait,
    policy: &RetryPolicy,
    code: &str,
) -> Result<Model, Error> {
    let code = normalize_confirmation_code(code)?;

    let result = with_retry(policy, "find case by confirmation code", || {
        Entity::find()
            .filter(Column::ConfirmationCode.eq(code.clone()))
            .one(db)
    })
    .await?;

    result.ok_or_else(|| {
        debug!("No case with confirmation code {code}");
        Error::not_found()
    })
}

/// Every case, newest first, with transcripts, interactions and insights eagerly loaded.
pub async fn find_all_with_details(
    db: &impl ConnectionTrait,
    policy: &RetryPolicy,
) -> Result<Vec<CaseWithDetails>, Error> {
    let cases = with_retry(policy, "find all cases", move || async move {
        let cases = Entity::find()
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await?;
        load_details(db, cases).await
    })
    .await?;

    Ok(cases)
}

pub async fn find_by_id_with_details(
    db: &impl ConnectionTrait,
    policy: &RetryPolicy,
    id: Id,
) -> Result<CaseWithDetails, Error> {
    let cases = with_retry(policy, "find case with details", move || async move {
        let cases = Entity::find_by_id(id).all(db).await?;
        load_details(db, cases).await
    })
    .await?;

    cases.into_iter().next().ok_or_else(Error::not_found)
}

async fn load_details(
    db: &impl ConnectionTrait,
    cases: Vec<Model>,
) -> Result<Vec<CaseWithDetails>, DbErr> {
    let transcripts = cases
        .load_many(
            transcripts::Entity::find().order_by_asc(transcripts::Column::CreatedAt),
            db,
        )
        .await?;
    let interactions = cases
        .load_many(
            hr_interactions::Entity::find().order_by_asc(hr_interactions::Column::CreatedAt),
            db,
        )
        .await?;
    let insights = cases
        .load_many(
            ai_insights::Entity::find().order_by_asc(ai_insights::Column::CreatedAt),
            db,
        )
        .await?;

    Ok(cases
        .into_iter()
        .zip(transcripts)
        .zip(interactions)
        .zip(insights)
        .map(
            |(((case, transcripts), interactions), insights)| CaseWithDetails {
                case,
                transcripts,
                interactions,
                insights,
            },
        )
        .collect())
}

/// Sets a case's status. Any transition is allowed; `updated_at` moves to now.
pub async fn update_status(
    db: &impl ConnectionTrait,
    id: Id,
    status: CaseStatus,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!(
        "Updating case {} status {} -> {status}",
        existing.confirmation_code, existing.status
    );

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        confirmation_code: Unchanged(existing.confirmation_code),
        title: Unchanged(existing.title),
        category: Unchanged(existing.category),
        summary: Unchanged(existing.summary),
        severity: Unchanged(existing.severity),
        status: Set(status),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}
