//! Inbound voice-vendor payloads and their canonical form.
//!
//! The vendor (and the integrators relaying it) post the same logical data in several
//! shapes: camelCase or snake_case ids, an optional `data` envelope, a split
//! `{user_messages, agent_messages}` transcript or a flat list of role-tagged turns.
//! `ConversationPayload` accepts all of them and is normalized exactly once, at the
//! boundary, into a `WebhookEvent` carrying canonical types.

use crate::classifier::{ConversationMetrics, SentimentLabel, VendorSentiment};
use entity::transcript_status::TranscriptStatus;
use serde::Deserialize;

pub const NO_FEEDBACK_PLACEHOLDER: &str = "No user feedback was captured during this conversation.";

/// Confidence assumed when the vendor sends a sentiment label without one.
const DEFAULT_SENTIMENT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    pub role: Option<String>,
    pub content: Option<String>,
    pub message: Option<String>,
    pub text: Option<String>,
}

impl RawMessage {
    fn text(self) -> Option<String> {
        self.content
            .or(self.message)
            .or(self.text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTranscript {
    Turns(Vec<RawMessage>),
    Split {
        #[serde(default)]
        user_messages: Vec<String>,
        #[serde(default)]
        agent_messages: Vec<String>,
    },
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawMessageField {
    Text(String),
    Turn(RawMessage),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSentiment {
    pub label: Option<String>,
    pub sentiment: Option<String>,
    pub confidence: Option<f64>,
    pub emotions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadata {
    pub duration_seconds: Option<f64>,
    pub call_duration_secs: Option<f64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysis {
    pub transcript_summary: Option<String>,
}

/// Raw webhook body as posted by the vendor. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub event_type: Option<String>,
    pub event: Option<String>,

    pub conversation_id: Option<String>,
    #[serde(rename = "conversationId")]
    pub conversation_id_camel: Option<String>,
    pub agent_id: Option<String>,
    #[serde(rename = "agentId")]
    pub agent_id_camel: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id_camel: Option<String>,

    pub transcript: Option<RawTranscript>,
    pub messages: Option<Vec<RawMessage>>,
    pub message: Option<RawMessageField>,
    pub role: Option<String>,
    pub text: Option<String>,

    pub summary: Option<String>,
    pub analysis: Option<RawAnalysis>,
    pub sentiment_analysis: Option<RawSentiment>,
    pub duration_seconds: Option<f64>,
    pub metadata: Option<RawMetadata>,

    pub job_id: Option<String>,
    pub external_job_id: Option<String>,
    pub status: Option<String>,
    pub confidence: Option<f64>,
    pub audio_duration: Option<f64>,
    pub language_code: Option<String>,
    pub error: Option<String>,
    pub confirmation_code: Option<String>,

    pub data: Option<Box<ConversationPayload>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    fn parse(role: &str) -> Option<Self> {
        match role.trim().to_lowercase().as_str() {
            "agent" | "assistant" | "ai" | "bot" => Some(Speaker::Agent),
            "user" | "employee" | "caller" | "human" => Some(Speaker::User),
            _ => None,
        }
    }

    /// Speaker implied by a message event type when no role is attached.
    fn from_event_type(event_type: &str) -> Self {
        match event_type {
            "agent_response" => Speaker::Agent,
            _ => Speaker::User,
        }
    }
}

/// A finished conversation in canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub conversation_id: Option<String>,
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
    pub user_messages: Vec<String>,
    pub agent_messages: Vec<String>,
    pub summary: Option<String>,
    pub vendor_sentiment: Option<VendorSentiment>,
    pub duration_seconds: f64,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl Conversation {
    /// User utterances joined by a space, or the placeholder sentence when there are none.
    pub fn feedback_text(&self) -> String {
        let text = self.user_messages.join(" ");
        if text.trim().is_empty() {
            NO_FEEDBACK_PLACEHOLDER.to_string()
        } else {
            text
        }
    }

    pub fn metrics(&self) -> ConversationMetrics {
        ConversationMetrics {
            duration_seconds: self.duration_seconds,
            user_message_count: self.user_messages.len(),
            agent_message_count: self.agent_messages.len(),
            vendor_sentiment: self.vendor_sentiment.clone(),
        }
    }
}

/// A vendor transcription job changed state.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionUpdate {
    pub external_job_id: String,
    pub status: TranscriptStatus,
    pub text: Option<String>,
    pub confidence: Option<f64>,
    pub audio_duration_seconds: Option<f64>,
    pub language_code: Option<String>,
    pub error_message: Option<String>,
    pub confirmation_code: Option<String>,
}

/// Identifies a live conversation for ACK tracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationRef {
    pub conversation_id: String,
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    ConversationEnded(Conversation),
    ConversationStarted(ConversationRef),
    ConversationMessage {
        conversation: ConversationRef,
        speaker: Speaker,
        text: String,
    },
    TranscriptionStatus(TranscriptionUpdate),
    /// Anything that doesn't match a trigger; acknowledged with a no-op.
    Unhandled { event_type: Option<String> },
}

impl WebhookEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WebhookEvent::ConversationEnded(_) => "conversation_ended",
            WebhookEvent::ConversationStarted(_) => "conversation_started",
            WebhookEvent::ConversationMessage { .. } => "conversation_message",
            WebhookEvent::TranscriptionStatus(_) => "transcription_status",
            WebhookEvent::Unhandled { .. } => "unhandled",
        }
    }
}

fn parse_transcript_status(status: &str) -> Option<TranscriptStatus> {
    match status.trim().to_lowercase().as_str() {
        "queued" | "pending" => Some(TranscriptStatus::Pending),
        "processing" | "in_progress" => Some(TranscriptStatus::Processing),
        "completed" | "complete" | "done" | "success" => Some(TranscriptStatus::Completed),
        "failed" | "error" => Some(TranscriptStatus::Failed),
        _ => None,
    }
}

impl ConversationPayload {
    /// Event name from whichever of `type`, `event_type` or `event` is present.
    pub fn event_type(&self) -> Option<String> {
        self.kind
            .clone()
            .or_else(|| self.event_type.clone())
            .or_else(|| self.event.clone())
            .or_else(|| self.data.as_ref().and_then(|data| data.event_type()))
    }

    /// Vendor job id from either naming, for the delivery log.
    pub fn job_id(&self) -> Option<String> {
        self.external_job_id
            .clone()
            .or_else(|| self.job_id.clone())
            .or_else(|| self.data.as_ref().and_then(|data| data.job_id()))
    }

    /// Lifts the `data` envelope: top-level values win, envelope values fill the gaps.
    fn flatten(mut self) -> Self {
        let Some(data) = self.data.take() else {
            return self;
        };
        let data = data.flatten();

        ConversationPayload {
            kind: self.kind.or(data.kind),
            event_type: self.event_type.or(data.event_type),
            event: self.event.or(data.event),
            conversation_id: self.conversation_id.or(data.conversation_id),
            conversation_id_camel: self.conversation_id_camel.or(data.conversation_id_camel),
            agent_id: self.agent_id.or(data.agent_id),
            agent_id_camel: self.agent_id_camel.or(data.agent_id_camel),
            user_id: self.user_id.or(data.user_id),
            user_id_camel: self.user_id_camel.or(data.user_id_camel),
            transcript: self.transcript.or(data.transcript),
            messages: self.messages.or(data.messages),
            message: self.message.or(data.message),
            role: self.role.or(data.role),
            text: self.text.or(data.text),
            summary: self.summary.or(data.summary),
            analysis: self.analysis.or(data.analysis),
            sentiment_analysis: self.sentiment_analysis.or(data.sentiment_analysis),
            duration_seconds: self.duration_seconds.or(data.duration_seconds),
            metadata: self.metadata.or(data.metadata),
            job_id: self.job_id.or(data.job_id),
            external_job_id: self.external_job_id.or(data.external_job_id),
            status: self.status.or(data.status),
            confidence: self.confidence.or(data.confidence),
            audio_duration: self.audio_duration.or(data.audio_duration),
            language_code: self.language_code.or(data.language_code),
            error: self.error.or(data.error),
            confirmation_code: self.confirmation_code.or(data.confirmation_code),
            data: None,
        }
    }

    fn conversation_ref(&self) -> Option<ConversationRef> {
        let conversation_id = self
            .conversation_id
            .clone()
            .or_else(|| self.conversation_id_camel.clone())?;

        Some(ConversationRef {
            conversation_id,
            agent_id: self.agent_id.clone().or_else(|| self.agent_id_camel.clone()),
            user_id: self.user_id.clone().or_else(|| self.user_id_camel.clone()),
        })
    }

    fn vendor_sentiment(&self) -> Option<VendorSentiment> {
        let raw = self.sentiment_analysis.as_ref()?;
        let label = raw.label.as_deref().or(raw.sentiment.as_deref())?;

        Some(VendorSentiment {
            label: SentimentLabel::parse(label),
            confidence: raw
                .confidence
                .unwrap_or(DEFAULT_SENTIMENT_CONFIDENCE)
                .clamp(0.0, 1.0),
            emotions: raw.emotions.clone().unwrap_or_default(),
        })
    }

    fn into_conversation(self) -> Conversation {
        let vendor_sentiment = self.vendor_sentiment();
        let conversation_ref = self.conversation_ref().unwrap_or_default();

        let mut user_messages = Vec::new();
        let mut agent_messages = Vec::new();
        let mut push_turn = |turn: RawMessage| {
            let speaker = turn
                .role
                .as_deref()
                .and_then(Speaker::parse)
                .unwrap_or(Speaker::User);
            if let Some(text) = turn.text() {
                match speaker {
                    Speaker::User => user_messages.push(text),
                    Speaker::Agent => agent_messages.push(text),
                }
            }
        };

        match self.transcript {
            Some(RawTranscript::Split {
                user_messages: users,
                agent_messages: agents,
            }) => {
                for text in users {
                    push_turn(RawMessage {
                        role: Some("user".to_string()),
                        text: Some(text),
                        ..Default::default()
                    });
                }
                for text in agents {
                    push_turn(RawMessage {
                        role: Some("agent".to_string()),
                        text: Some(text),
                        ..Default::default()
                    });
                }
            }
            Some(RawTranscript::Turns(turns)) => turns.into_iter().for_each(&mut push_turn),
            Some(RawTranscript::Text(text)) => push_turn(RawMessage {
                role: Some("user".to_string()),
                text: Some(text),
                ..Default::default()
            }),
            None => {}
        }
        if let Some(turns) = self.messages {
            turns.into_iter().for_each(&mut push_turn);
        }

        let metadata = self.metadata.unwrap_or_default();
        let duration_seconds = self
            .duration_seconds
            .or(metadata.duration_seconds)
            .or(metadata.call_duration_secs)
            .unwrap_or(0.0)
            .max(0.0);

        Conversation {
            conversation_id: Some(conversation_ref.conversation_id).filter(|id| !id.is_empty()),
            agent_id: conversation_ref.agent_id,
            user_id: conversation_ref.user_id,
            user_messages,
            agent_messages,
            summary: self
                .summary
                .or_else(|| self.analysis.and_then(|analysis| analysis.transcript_summary)),
            vendor_sentiment,
            duration_seconds,
            started_at: metadata.start_time,
            ended_at: metadata.end_time,
        }
    }

    fn into_transcription_update(self) -> Option<TranscriptionUpdate> {
        let external_job_id = self.external_job_id.clone().or(self.job_id.clone())?;
        let status = parse_transcript_status(self.status.as_deref()?)?;
        let text = match self.transcript {
            Some(RawTranscript::Text(text)) => Some(text),
            _ => self.text,
        };

        Some(TranscriptionUpdate {
            external_job_id,
            status,
            text,
            confidence: self.confidence.map(|c| c.clamp(0.0, 1.0)),
            audio_duration_seconds: self.audio_duration,
            language_code: self.language_code,
            error_message: self.error,
            confirmation_code: self.confirmation_code,
        })
    }

    fn into_message(
        self,
        conversation: ConversationRef,
        implied: Speaker,
    ) -> Option<WebhookEvent> {
        let (role, text) = match self.message {
            Some(RawMessageField::Text(text)) => (self.role, Some(text)),
            Some(RawMessageField::Turn(turn)) => {
                let role = turn.role.clone().or(self.role);
                (role, turn.text())
            }
            None => (self.role, self.text),
        };
        let text = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;

        Some(WebhookEvent::ConversationMessage {
            conversation,
            speaker: role.as_deref().and_then(Speaker::parse).unwrap_or(implied),
            text,
        })
    }

    /// Classifies the delivery and converts it to canonical types.
    pub fn normalize(self) -> WebhookEvent {
        let payload = self.flatten();
        let event_type = payload.event_type();
        let unhandled = |event_type: Option<String>| WebhookEvent::Unhandled { event_type };

        let lowered = event_type.as_deref().map(str::to_lowercase);
        match lowered.as_deref() {
            Some("conversation.ended")
            | Some("conversation.completed")
            | Some("conversation_ended")
            | Some("post_call_transcription") => {
                WebhookEvent::ConversationEnded(payload.into_conversation())
            }
            Some("conversation.started")
            | Some("conversation_started")
            | Some("conversation_initiation") => match payload.conversation_ref() {
                Some(conversation) => WebhookEvent::ConversationStarted(conversation),
                None => unhandled(event_type),
            },
            Some("conversation.message")
            | Some("message")
            | Some("user_transcript")
            | Some("agent_response") => match payload.conversation_ref() {
                Some(conversation) => payload
                    .into_message(
                        conversation,
                        Speaker::from_event_type(lowered.as_deref().unwrap_or_default()),
                    )
                    .unwrap_or_else(|| unhandled(event_type)),
                None => unhandled(event_type),
            },
            Some("transcription.status")
            | Some("transcription.completed")
            | Some("transcription.failed") => match payload.into_transcription_update() {
                Some(update) => WebhookEvent::TranscriptionStatus(update),
                None => unhandled(event_type),
            },
            _ => unhandled(event_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> WebhookEvent {
        serde_json::from_value::<ConversationPayload>(value)
            .unwrap()
            .normalize()
    }

    fn ended(value: serde_json::Value) -> Conversation {
        match parse(value) {
            WebhookEvent::ConversationEnded(conversation) => conversation,
            other => panic!("expected an ended conversation, got {other:?}"),
        }
    }

    #[test]
    fn split_transcript_with_snake_case_ids() {
        let conversation = ended(json!({
            "event_type": "conversation.ended",
            "conversation_id": "conv_1",
            "agent_id": "agent_1",
            "transcript": {
                "user_messages": ["I need a tracking code"],
                "agent_messages": ["Sure, one moment", "Here you go"]
            },
            "duration_seconds": 75
        }));

        assert_eq!(conversation.conversation_id.as_deref(), Some("conv_1"));
        assert_eq!(conversation.feedback_text(), "I need a tracking code");
        assert_eq!(conversation.metrics().total_messages(), 3);
        assert_eq!(conversation.duration_seconds, 75.0);
    }

    #[test]
    fn flat_messages_with_camel_case_ids_and_alternate_text_fields() {
        let conversation = ended(json!({
            "type": "conversation.completed",
            "conversationId": "conv_2",
            "messages": [
                {"role": "agent", "content": "How can I help?"},
                {"role": "user", "message": "The ladder is broken"},
                {"role": "user", "text": "and nobody fixed it"}
            ],
            "metadata": {"duration_seconds": 400}
        }));

        assert_eq!(conversation.conversation_id.as_deref(), Some("conv_2"));
        assert_eq!(
            conversation.feedback_text(),
            "The ladder is broken and nobody fixed it"
        );
        assert_eq!(conversation.agent_messages.len(), 1);
        assert_eq!(conversation.duration_seconds, 400.0);
    }

    #[test]
    fn vendor_envelope_is_lifted() {
        let conversation = ended(json!({
            "type": "post_call_transcription",
            "data": {
                "conversation_id": "conv_3",
                "agent_id": "agent_9",
                "transcript": [
                    {"role": "agent", "message": "Hello"},
                    {"role": "user", "message": "My manager yells at us"}
                ],
                "metadata": {"call_duration_secs": 320},
                "analysis": {"transcript_summary": "Employee reports a hostile manager"}
            }
        }));

        assert_eq!(conversation.agent_id.as_deref(), Some("agent_9"));
        assert_eq!(conversation.feedback_text(), "My manager yells at us");
        assert_eq!(conversation.duration_seconds, 320.0);
        assert_eq!(
            conversation.summary.as_deref(),
            Some("Employee reports a hostile manager")
        );
    }

    #[test]
    fn empty_user_text_uses_placeholder() {
        let conversation = ended(json!({
            "event_type": "conversation.ended",
            "conversation_id": "conv_4",
            "transcript": {"agent_messages": ["Hello?"]}
        }));

        assert_eq!(conversation.feedback_text(), NO_FEEDBACK_PLACEHOLDER);
    }

    #[test]
    fn sentiment_accepts_label_or_sentiment_field() {
        let conversation = ended(json!({
            "event_type": "conversation.ended",
            "sentiment_analysis": {"sentiment": "NEGATIVE", "confidence": 0.9, "emotions": ["angry"]}
        }));

        let sentiment = conversation.vendor_sentiment.unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Negative);
        assert_eq!(sentiment.confidence, 0.9);
        assert_eq!(sentiment.emotions, vec!["angry".to_string()]);
    }

    #[test]
    fn message_events_carry_speaker_and_text() {
        let event = parse(json!({
            "event_type": "conversation.message",
            "conversation_id": "conv_5",
            "message": {"role": "user", "content": "Can I get a reference number?"}
        }));

        assert_eq!(
            event,
            WebhookEvent::ConversationMessage {
                conversation: ConversationRef {
                    conversation_id: "conv_5".to_string(),
                    ..Default::default()
                },
                speaker: Speaker::User,
                text: "Can I get a reference number?".to_string(),
            }
        );
    }

    #[test]
    fn agent_response_without_role_is_agent_speech() {
        let event = parse(json!({
            "type": "agent_response",
            "conversation_id": "conv_9",
            "text": "Your acknowledgment number is: 1, 2, 3."
        }));

        match event {
            WebhookEvent::ConversationMessage { speaker, text, .. } => {
                assert_eq!(speaker, Speaker::Agent);
                assert_eq!(text, "Your acknowledgment number is: 1, 2, 3.");
            }
            other => panic!("unexpected event {other:?}"),
        }

        let transcript = parse(json!({
            "type": "user_transcript",
            "conversation_id": "conv_9",
            "text": "What is my ticket number?"
        }));
        assert!(matches!(
            transcript,
            WebhookEvent::ConversationMessage { speaker: Speaker::User, .. }
        ));
    }

    #[test]
    fn explicit_role_overrides_event_type() {
        let event = parse(json!({
            "type": "agent_response",
            "conversation_id": "conv_9",
            "role": "user",
            "text": "I need a receipt"
        }));

        assert!(matches!(
            event,
            WebhookEvent::ConversationMessage { speaker: Speaker::User, .. }
        ));
    }

    #[test]
    fn transcription_status_requires_job_id_and_known_status() {
        let event = parse(json!({
            "event_type": "transcription.status",
            "job_id": "job_77",
            "status": "completed",
            "text": "full transcript",
            "confidence": 0.92
        }));
        match event {
            WebhookEvent::TranscriptionStatus(update) => {
                assert_eq!(update.external_job_id, "job_77");
                assert_eq!(update.status, TranscriptStatus::Completed);
                assert_eq!(update.text.as_deref(), Some("full transcript"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let missing_job = parse(json!({"event_type": "transcription.status", "status": "done"}));
        assert!(matches!(missing_job, WebhookEvent::Unhandled { .. }));
    }

    #[test]
    fn unknown_events_are_unhandled() {
        let event = parse(json!({"event_type": "agent.updated", "agent_id": "a"}));
        assert_eq!(
            event,
            WebhookEvent::Unhandled {
                event_type: Some("agent.updated".to_string())
            }
        );
        assert!(matches!(parse(json!({})), WebhookEvent::Unhandled { event_type: None }));
    }
}
