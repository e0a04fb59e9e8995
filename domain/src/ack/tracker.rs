//! In-memory state of live conversations, shared by the webhook handlers and the
//! time-trigger sweep.
//!
//! The map lives in process memory: it is lost on restart and is not shared between
//! instances, so ACK tracking assumes a single running instance.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use log::*;
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub conversation_id: String,
    pub agent_id: Option<String>,
    pub user_id: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub last_activity: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_ack_time: Option<DateTime<Utc>>,
    pub ack_count: u32,
    pub is_active: bool,
}

impl ConversationState {
    fn new(
        conversation_id: &str,
        agent_id: Option<String>,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            agent_id,
            user_id,
            start_time: now,
            last_activity: now,
            last_ack_time: None,
            ack_count: 0,
            is_active: true,
        }
    }

    /// Last ACK, or the start of the conversation when none has been given yet.
    fn time_trigger_anchor(&self) -> DateTime<Utc> {
        self.last_ack_time.unwrap_or(self.start_time)
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

/// Conversations move from untracked to active on their first event and to inactive when
/// they end. An ended conversation is never reactivated.
#[derive(Debug, Default)]
pub struct ConversationTracker {
    conversations: DashMap<String, ConversationState>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a conversation. Returns false if it was already known.
    pub fn start(
        &self,
        conversation_id: &str,
        agent_id: Option<String>,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.conversations.entry(conversation_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                debug!("Tracking conversation {conversation_id}");
                entry.insert(ConversationState::new(conversation_id, agent_id, user_id, now));
                true
            }
        }
    }

    /// Records activity on a conversation, starting to track it if unseen.
    /// Returns true while the conversation is active.
    pub fn record_message(
        &self,
        conversation_id: &str,
        agent_id: Option<String>,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut state = self
            .conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationState::new(conversation_id, agent_id, user_id, now));

        if state.is_active {
            state.last_activity = now;
        }
        state.is_active
    }

    /// Marks a conversation inactive and returns its state, if it was being tracked.
    pub fn end(&self, conversation_id: &str, now: DateTime<Utc>) -> Option<ConversationState> {
        self.conversations
            .get_mut(conversation_id)
            .map(|mut state| {
                state.is_active = false;
                state.last_activity = now;
                state.clone()
            })
    }

    pub fn record_ack(&self, conversation_id: &str, now: DateTime<Utc>) {
        if let Some(mut state) = self.conversations.get_mut(conversation_id) {
            state.last_ack_time = Some(now);
            state.ack_count += 1;
        }
    }

    pub fn get(&self, conversation_id: &str) -> Option<ConversationState> {
        self.conversations
            .get(conversation_id)
            .map(|state| state.clone())
    }

    /// Active conversations whose last ACK (or start) is more than `interval` ago.
    pub fn due_for_time_trigger(&self, now: DateTime<Utc>, interval: Duration) -> Vec<String> {
        let interval = to_time_delta(interval);
        self.conversations
            .iter()
            .filter(|state| state.is_active && now - state.time_trigger_anchor() > interval)
            .map(|state| state.conversation_id.clone())
            .collect()
    }

    /// Drops ended conversations idle for longer than `inactivity`. Returns how many were removed.
    pub fn cleanup(&self, now: DateTime<Utc>, inactivity: Duration) -> usize {
        let inactivity = to_time_delta(inactivity);
        let before = self.conversations.len();
        self.conversations
            .retain(|_, state| state.is_active || now - state.last_activity <= inactivity);
        let removed = before.saturating_sub(self.conversations.len());
        if removed > 0 {
            debug!("Dropped {removed} ended conversation(s) from the tracker");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
