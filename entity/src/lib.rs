use uuid::Uuid;

// Core entities
pub mod ai_insights;
pub mod cases;
pub mod hr_interactions;
pub mod hr_users;
pub mod transcripts;
pub mod webhook_logs;

// Enumerations backed by Postgres enum types
pub mod case_category;
pub mod case_status;
pub mod roles;
pub mod sender_type;
pub mod transcript_status;
pub mod webhook_log_status;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
