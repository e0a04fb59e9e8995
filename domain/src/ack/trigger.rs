use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Phrases that make a caller's message trigger an ACK, on top of any configured extras.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "confirmation",
    "reference number",
    "receipt",
    "acknowledgment",
    "acknowledgement",
    "ticket number",
    "case number",
    "tracking number",
];

/// What caused an ACK number to be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Keyword,
    Time,
    Manual,
    ConversationEnd,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TriggerType::Keyword => write!(f, "keyword"),
            TriggerType::Time => write!(f, "time"),
            TriggerType::Manual => write!(f, "manual"),
            TriggerType::ConversationEnd => write!(f, "conversation_end"),
        }
    }
}

/// Case-insensitive substring matcher over the trigger phrases.
#[derive(Debug, Clone)]
pub struct KeywordTrigger {
    keywords: Vec<String>,
}

impl KeywordTrigger {
    pub fn new(extra_keywords: &[String]) -> Self {
        let mut keywords: Vec<String> = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
        for keyword in extra_keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        Self { keywords }
    }

    /// Returns the first phrase found in `message`, if any.
    pub fn find_in(&self, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| message.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

impl Default for KeywordTrigger {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phrases_match_case_insensitively() {
        let trigger = KeywordTrigger::default();

        assert_eq!(
            trigger.find_in("Can I get a CONFIRMATION for this?"),
            Some("confirmation")
        );
        assert_eq!(
            trigger.find_in("what's my Tracking Number"),
            Some("tracking number")
        );
        assert_eq!(trigger.find_in("The break room is always dirty"), None);
    }

    #[test]
    fn configured_phrases_extend_the_defaults() {
        let trigger = KeywordTrigger::new(&["  Read It Back ".to_string(), String::new()]);

        assert_eq!(
            trigger.find_in("could you read it back to me"),
            Some("read it back")
        );
        assert_eq!(trigger.find_in("I need a receipt"), Some("receipt"));
    }

    #[test]
    fn trigger_types_serialize_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&TriggerType::ConversationEnd).unwrap(),
            "\"conversation_end\""
        );
        assert_eq!(TriggerType::Manual.to_string(), "manual");
    }
}
