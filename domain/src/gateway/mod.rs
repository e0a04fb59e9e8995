//! Outbound voice vendor integration.
//!
//! Business logic speaks to the vendor through the [`VoiceGateway`] trait so the ACK injection
//! loop can be exercised without a network.

use crate::error::Error;
use async_trait::async_trait;

pub mod elevenlabs;

/// Speaks text into a live conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    async fn inject_message(&self, conversation_id: &str, text: &str) -> Result<(), Error>;
}
