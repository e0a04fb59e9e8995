//! CRUD operations for the transcripts table.

use super::error::Error;
use entity::transcript_status::TranscriptStatus;
use entity::transcripts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait,
};

/// Input for attaching a transcript to a case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTranscript {
    pub case_id: Id,
    pub raw_transcript: String,
    pub processed_summary: Option<String>,
    pub sentiment_score: f64,
    pub external_job_id: Option<String>,
    pub audio_duration_seconds: Option<f64>,
    pub confidence_score: Option<f64>,
    pub language_code: Option<String>,
    pub processing_status: TranscriptStatus,
    pub error_message: Option<String>,
}

/// Fields a vendor status update may change on an existing transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingUpdate {
    pub processing_status: TranscriptStatus,
    pub raw_transcript: Option<String>,
    pub audio_duration_seconds: Option<f64>,
    pub confidence_score: Option<f64>,
    pub language_code: Option<String>,
    pub error_message: Option<String>,
}

fn validate_sentiment(score: f64) -> Result<(), Error> {
    if !(-1.0..=1.0).contains(&score) {
        return Err(Error::validation(
            "Sentiment score must be between -1.0 and 1.0",
        ));
    }
    Ok(())
}

fn validate_confidence(score: Option<f64>) -> Result<(), Error> {
    match score {
        Some(score) if !(0.0..=1.0).contains(&score) => Err(Error::validation(
            "Confidence score must be between 0.0 and 1.0",
        )),
        _ => Ok(()),
    }
}

pub async fn create(
    db: &impl ConnectionTrait,
    new_transcript: NewTranscript,
) -> Result<Model, Error> {
    validate_sentiment(new_transcript.sentiment_score)?;
    validate_confidence(new_transcript.confidence_score)?;
    debug!("Creating transcript for case {}", new_transcript.case_id);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        case_id: Set(new_transcript.case_id),
        raw_transcript: Set(new_transcript.raw_transcript),
        processed_summary: Set(new_transcript.processed_summary),
        sentiment_score: Set(new_transcript.sentiment_score),
        external_job_id: Set(new_transcript.external_job_id),
        audio_duration_seconds: Set(new_transcript.audio_duration_seconds),
        confidence_score: Set(new_transcript.confidence_score),
        language_code: Set(new_transcript.language_code),
        processing_status: Set(new_transcript.processing_status),
        error_message: Set(new_transcript.error_message),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_external_job_id(
    db: &impl ConnectionTrait,
    external_job_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ExternalJobId.eq(external_job_id))
        .one(db)
        .await?)
}

/// Applies a vendor processing update. Fields absent from the update keep their stored value.
pub async fn update_processing(
    db: &impl ConnectionTrait,
    id: Id,
    update: ProcessingUpdate,
) -> Result<Model, Error> {
    validate_confidence(update.confidence_score)?;

    let existing = Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        debug!("Transcript with id {id} not found");
        Error::not_found()
    })?;

    debug!(
        "Updating transcript {id} processing status {:?} -> {:?}",
        existing.processing_status, update.processing_status
    );

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        case_id: Unchanged(existing.case_id),
        raw_transcript: Set(update.raw_transcript.unwrap_or(existing.raw_transcript)),
        processed_summary: Unchanged(existing.processed_summary),
        sentiment_score: Unchanged(existing.sentiment_score),
        external_job_id: Unchanged(existing.external_job_id),
        audio_duration_seconds: Set(update
            .audio_duration_seconds
            .or(existing.audio_duration_seconds)),
        confidence_score: Set(update.confidence_score.or(existing.confidence_score)),
        language_code: Set(update.language_code.or(existing.language_code)),
        processing_status: Set(update.processing_status),
        error_message: Set(update.error_message),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}
