//! Business logic of the feedback platform.
//!
//! Consumers of `domain` reach entity types through the re-exports below so that they do not
//! need to depend on `entity_api` directly.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    ai_insights, case_category, case_status, cases, hr_interactions, hr_users, roles,
    sender_type, transcript_status, transcripts, webhook_log_status, webhook_logs, Id,
};

pub mod ack;
pub mod case;
pub mod classifier;
pub mod confirmation;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod hr_interaction;
pub mod hr_user;
pub mod ingestion;
pub mod transcript_update;
pub mod webhook;
