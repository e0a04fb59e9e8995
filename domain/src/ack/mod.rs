//! ACK (acknowledgment) numbers spoken into live calls.
//!
//! An ACK is generated on a keyword heard from the caller, on a timer, on request, or when
//! a conversation ends. Each one is formatted into four utterances, injected through the
//! voice gateway and recorded as an audit case whether or not the injection worked.

use crate::confirmation::generate_confirmation_code;
use crate::error::Error;
use crate::gateway::VoiceGateway;
use crate::ingestion::with_fresh_code;
use chrono::{DateTime, Utc};
use entity::case_category::CaseCategory;
use entity::sender_type::SenderType;
use entity::Id;
use entity_api::{ai_insight, case, hr_interaction};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use serde_json::json;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use utoipa::ToSchema;

pub mod injection;
pub mod number;
pub mod tracker;
pub mod trigger;

pub use injection::{InjectionStatus, MessageResult, Pacing};
pub use tracker::{ConversationState, ConversationTracker};
pub use trigger::{KeywordTrigger, TriggerType};

pub const REALTIME_INSIGHT: &str = "elevenlabs_realtime";
const AUDIT_SEVERITY: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AckResult {
    pub ack_number: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub trigger_type: TriggerType,
    pub messages: Vec<String>,
    pub status: InjectionStatus,
    pub results: Vec<MessageResult>,
    #[schema(value_type = String, format = DateTime)]
    pub generated_at: DateTime<Utc>,
    /// The audit case, absent when the audit write failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub case_id: Option<Id>,
}

pub struct AckService {
    db: Arc<DatabaseConnection>,
    gateway: Arc<dyn VoiceGateway>,
    tracker: Arc<ConversationTracker>,
    keywords: KeywordTrigger,
    pacing: Pacing,
    time_interval: Duration,
    check_interval: Duration,
    inactivity: Duration,
    ack_on_conversation_end: bool,
}

impl AckService {
    pub fn new(
        db: &Arc<DatabaseConnection>,
        gateway: Arc<dyn VoiceGateway>,
        tracker: Arc<ConversationTracker>,
        config: &Config,
    ) -> Self {
        Self {
            db: Arc::clone(db),
            gateway,
            tracker,
            keywords: KeywordTrigger::new(&config.ack_trigger_keywords),
            pacing: Pacing::from_config(config),
            time_interval: config.ack_time_interval(),
            check_interval: config.ack_check_interval(),
            inactivity: config.conversation_inactivity(),
            ack_on_conversation_end: config.ack_on_conversation_end,
        }
    }

    pub fn tracker(&self) -> &ConversationTracker {
        &self.tracker
    }

    pub fn keywords(&self) -> &KeywordTrigger {
        &self.keywords
    }

    pub fn acks_on_conversation_end(&self) -> bool {
        self.ack_on_conversation_end
    }

    /// Generates an ACK number, speaks it into the conversation and records the attempt.
    ///
    /// Injection failures are reported in the result rather than as an error. A failed audit
    /// write is logged and leaves `case_id` empty, since the number may already have been spoken.
    pub async fn generate(
        &self,
        conversation_id: &str,
        user_id: Option<String>,
        trigger_type: TriggerType,
    ) -> Result<AckResult, Error> {
        if conversation_id.trim().is_empty() {
            return Err(Error::invalid("conversationId is required"));
        }

        let ack_number = number::generate_ack_number();
        let messages = number::format_for_speech(&ack_number).to_vec();

        info!("Generating {trigger_type} ACK {ack_number} for conversation {conversation_id}");

        let report = injection::inject_messages(
            self.gateway.as_ref(),
            conversation_id,
            &messages,
            self.pacing,
        )
        .await;

        let generated_at = Utc::now();
        self.tracker.record_ack(conversation_id, generated_at);

        let mut result = AckResult {
            ack_number,
            conversation_id: conversation_id.to_string(),
            user_id,
            trigger_type,
            messages,
            status: report.status,
            results: report.results,
            generated_at,
            case_id: None,
        };

        let audit = with_fresh_code(generate_confirmation_code, |code| {
            write_audit(&self.db, &result, code)
        })
        .await;
        match audit {
            Ok(case_id) => result.case_id = Some(case_id),
            Err(err) => error!(
                "Failed to record ACK {} for conversation {conversation_id}: {err}",
                result.ack_number
            ),
        }

        Ok(result)
    }

    /// Runs `generate` in the background so a webhook reply isn't held up by message pacing.
    pub fn spawn_generate(
        self: &Arc<Self>,
        conversation_id: String,
        user_id: Option<String>,
        trigger_type: TriggerType,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = service
                .generate(&conversation_id, user_id, trigger_type)
                .await
            {
                warn!("{trigger_type} ACK for conversation {conversation_id} failed: {err}");
            }
        })
    }

    /// Fires time-triggered ACKs for every conversation that is due, then sweeps out
    /// conversations that ended long enough ago.
    pub async fn run_time_triggers(&self, now: DateTime<Utc>) -> Vec<AckResult> {
        let mut results = Vec::new();

        for conversation_id in self.tracker.due_for_time_trigger(now, self.time_interval) {
            let user_id = self
                .tracker
                .get(&conversation_id)
                .and_then(|state| state.user_id);
            match self
                .generate(&conversation_id, user_id, TriggerType::Time)
                .await
            {
                Ok(result) => results.push(result),
                Err(err) => warn!("Time ACK for conversation {conversation_id} failed: {err}"),
            }
        }

        self.tracker.cleanup(now, self.inactivity);
        results
    }

    /// Evaluates time triggers across all tracked conversations on a fixed interval.
    pub fn spawn_time_trigger_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.check_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(
                "ACK time trigger running every {}s",
                self.check_interval.as_secs()
            );
            loop {
                interval.tick().await;
                let fired = self.run_time_triggers(Utc::now()).await;
                if !fired.is_empty() {
                    debug!("Time trigger generated {} ACK(s)", fired.len());
                }
            }
        })
    }
}

async fn write_audit(
    db: &DatabaseConnection,
    result: &AckResult,
    confirmation_code: String,
) -> Result<Id, Error> {
    let delivered = result
        .results
        .iter()
        .filter(|message| message.success)
        .count();
    let txn = db.begin().await?;

    let audit_case = case::create(
        &txn,
        case::NewCase {
            confirmation_code,
            title: format!("ACK {}", result.ack_number),
            category: CaseCategory::CallAcknowledgment,
            summary: format!(
                "ACK number {} generated by {} trigger for conversation {}. {} of {} messages \
                 delivered.",
                result.ack_number,
                result.trigger_type,
                result.conversation_id,
                delivered,
                result.results.len()
            ),
            severity: AUDIT_SEVERITY,
        },
    )
    .await?;

    hr_interaction::create(
        &txn,
        audit_case.id,
        &format!(
            "Acknowledgment number {} was generated for this call.",
            result.ack_number
        ),
        SenderType::System,
        None,
    )
    .await?;

    ai_insight::create(
        &txn,
        audit_case.id,
        REALTIME_INSIGHT,
        json!({
            "ack_number": result.ack_number,
            "conversation_id": result.conversation_id,
            "user_id": result.user_id,
            "trigger_type": result.trigger_type,
            "status": result.status,
            "results": result.results,
        }),
        if result.status == InjectionStatus::Injected {
            1.0
        } else {
            0.0
        },
    )
    .await?;

    txn.commit().await?;
    Ok(audit_case.id)
}
