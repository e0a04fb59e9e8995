//! Keyword-cascade classification of employee feedback.
//!
//! Everything here is pure: the same text and metrics always produce the same
//! `Classification`.

use entity::case_category::CaseCategory;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_SEVERITY: i32 = 5;
pub const MAX_KEY_TOPICS: usize = 3;
pub const SUMMARY_EXCERPT_CHARS: usize = 200;

const LONG_CONVERSATION_SECS: f64 = 300.0;
const MANY_MESSAGES: usize = 10;
const MANY_URGENCY_INDICATORS: usize = 2;

/// Sentiment label reported by the voice vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Unknown labels are treated as neutral.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    fn weight(&self) -> f64 {
        match self {
            SentimentLabel::Positive => 0.3,
            SentimentLabel::Negative => -0.6,
            SentimentLabel::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VendorSentiment {
    pub label: SentimentLabel,
    /// Within [0.0, 1.0]
    pub confidence: f64,
    pub emotions: Vec<String>,
}

/// Conversation metadata that influences severity and sentiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationMetrics {
    pub duration_seconds: f64,
    pub user_message_count: usize,
    pub agent_message_count: usize,
    pub vendor_sentiment: Option<VendorSentiment>,
}

impl ConversationMetrics {
    pub fn total_messages(&self) -> usize {
        self.user_message_count + self.agent_message_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Classification {
    pub title: String,
    pub category: CaseCategory,
    pub severity: i32,
    pub sentiment: f64,
    pub key_topics: Vec<String>,
    pub urgency_indicators: Vec<String>,
    pub summary: String,
}

struct CategoryRule {
    category: CaseCategory,
    keywords: &'static [&'static str],
    base_severity: i32,
    base_sentiment: f64,
}

// Order is priority: the first rule with a matching keyword wins.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: CaseCategory::WorkplaceSafety,
        keywords: &[
            "safety", "unsafe", "hazard", "danger", "injur", "accident", "near-miss",
            "near miss", "equipment", "fire exit", "fire hazard", "protective gear", "chemical",
            "spill", "ladder", "forklift",
        ],
        base_severity: 4,
        base_sentiment: -0.6,
    },
    CategoryRule {
        category: CaseCategory::Harassment,
        keywords: &[
            "harass", "bully", "bullied", "inappropriate", "threaten", "hostile", "intimidat",
            "sexual", "unwanted", "stalk",
        ],
        base_severity: 5,
        base_sentiment: -0.8,
    },
    CategoryRule {
        category: CaseCategory::Discrimination,
        keywords: &[
            "discriminat", "racis", "sexis", "bias", "unfair treatment", "treated unfairly",
            "gender", "religio", "disabilit", "ageis",
        ],
        base_severity: 4,
        base_sentiment: -0.7,
    },
    CategoryRule {
        category: CaseCategory::PolicyViolation,
        keywords: &[
            "policy", "violat", "fraud", "theft", "steal", "complian", "unethical", "falsif",
            "brib", "conflict of interest",
        ],
        base_severity: 3,
        base_sentiment: -0.5,
    },
    CategoryRule {
        category: CaseCategory::WorkLifeBalance,
        keywords: &[
            "work-life", "work life", "overtime", "burnout", "burned out", "burnt out", "stress",
            "exhausted", "long hours", "weekend", "childcare",
        ],
        base_severity: 3,
        base_sentiment: -0.4,
    },
    CategoryRule {
        category: CaseCategory::WorkplaceEnvironment,
        keywords: &[
            "environment", "noise", "noisy", "temperature", "too hot", "too cold", "lighting",
            "dirty", "clean", "bathroom", "break room", "parking", "air quality", "office space",
        ],
        base_severity: 2,
        base_sentiment: -0.3,
    },
    CategoryRule {
        category: CaseCategory::BenefitsInquiry,
        keywords: &[
            "benefit", "insurance", "dental", "vision plan", "401k", "retirement", "pension",
            "paid time off", "vacation", "health plan", "salary", "bonus", "compensation",
        ],
        base_severity: 2,
        base_sentiment: 0.0,
    },
];

const DEFAULT_CATEGORY: CategoryRule = CategoryRule {
    category: CaseCategory::GeneralFeedback,
    keywords: &[],
    base_severity: 2,
    base_sentiment: 0.0,
};

// Declaration order is the order topics are reported in.
const TOPICS: &[(&str, &[&str])] = &[
    (
        "Safety",
        &["safety", "unsafe", "hazard", "danger", "injur", "accident", "equipment", "near-miss"],
    ),
    (
        "Management",
        &["manager", "supervisor", "boss", "leadership", "management"],
    ),
    (
        "Workload",
        &["workload", "overtime", "hours", "deadline", "understaffed", "too much work"],
    ),
    (
        "Compensation",
        &["salary", "wage", "paycheck", "underpaid", "pay raise", "bonus", "compensation"],
    ),
    (
        "Benefits",
        &["benefit", "insurance", "dental", "vacation", "paid time off", "retirement"],
    ),
    (
        "Communication",
        &["communicat", "informed", "meeting", "email", "announcement"],
    ),
    (
        "Culture",
        &["culture", "team", "morale", "respect", "toxic", "inclusion"],
    ),
    (
        "Training",
        &["training", "trained", "onboarding", "mentor", "skill"],
    ),
];

const URGENCY_TERMS: &[&str] = &[
    "urgent",
    "immediately",
    "emergency",
    "asap",
    "serious",
    "danger",
    "critical",
    "right away",
    "threat",
    "unsafe",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

fn category_rule(text: &str) -> &'static CategoryRule {
    CATEGORY_RULES
        .iter()
        .find(|rule| contains_any(text, rule.keywords))
        .unwrap_or(&DEFAULT_CATEGORY)
}

/// Up to three topics, in table order.
pub fn key_topics(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    TOPICS
        .iter()
        .filter(|(_, keywords)| contains_any(&text, keywords))
        .take(MAX_KEY_TOPICS)
        .map(|(topic, _)| topic.to_string())
        .collect()
}

pub fn urgency_indicators(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    URGENCY_TERMS
        .iter()
        .filter(|term| text.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

fn severity(base: i32, metrics: &ConversationMetrics, urgency_count: usize) -> i32 {
    let boosts = [
        metrics.duration_seconds > LONG_CONVERSATION_SECS,
        metrics.total_messages() > MANY_MESSAGES,
        urgency_count > MANY_URGENCY_INDICATORS,
    ];

    boosts
        .iter()
        .filter(|applies| **applies)
        .fold(base, |severity, _| (severity + 1).min(MAX_SEVERITY))
}

fn sentiment(base: f64, vendor: Option<&VendorSentiment>) -> f64 {
    match vendor {
        Some(vendor) => {
            (vendor.label.weight() * vendor.confidence.clamp(0.0, 1.0)).clamp(-1.0, 1.0)
        }
        None => base,
    }
}

fn title(text: &str, key_topics: &[String]) -> String {
    let title = if contains_any(text, CATEGORY_RULES[0].keywords) {
        if contains_any(text, &["equipment", "machine", "forklift", "ladder"]) {
            "Equipment Safety Concern"
        } else if contains_any(text, &["accident", "injur", "near-miss", "near miss"]) {
            "Workplace Accident Report"
        } else if contains_any(text, &["chemical", "spill"]) {
            "Hazardous Material Concern"
        } else {
            "Workplace Safety Issue"
        }
    } else if contains_any(text, CATEGORY_RULES[1].keywords) {
        if text.contains("sexual") {
            "Sexual Harassment Report"
        } else if contains_any(text, &["bully", "bullied"]) {
            "Workplace Bullying Report"
        } else {
            "Harassment Complaint"
        }
    } else if contains_any(text, CATEGORY_RULES[2].keywords) {
        if contains_any(text, &["gender", "sexis"]) {
            "Gender Discrimination Concern"
        } else if text.contains("racis") {
            "Racial Discrimination Concern"
        } else {
            "Discrimination Concern"
        }
    } else if contains_any(text, CATEGORY_RULES[3].keywords) {
        if contains_any(text, &["fraud", "theft", "steal", "brib"]) {
            "Misconduct Report"
        } else {
            "Policy Violation Report"
        }
    } else if contains_any(text, CATEGORY_RULES[4].keywords) {
        if text.contains("overtime") {
            "Excessive Overtime Concern"
        } else if contains_any(text, &["burnout", "burned out", "burnt out", "stress"]) {
            "Employee Burnout Concern"
        } else {
            "Work-Life Balance Concern"
        }
    } else if contains_any(text, &["communicat", "informed", "announcement"]) {
        "Communication Issue"
    } else if contains_any(text, CATEGORY_RULES[6].keywords) {
        if contains_any(text, &["insurance", "health plan", "dental"]) {
            "Health Benefits Question"
        } else if contains_any(text, &["vacation", "paid time off"]) {
            "Time Off Inquiry"
        } else {
            "Benefits Question"
        }
    } else {
        return match key_topics.first() {
            Some(topic) => format!("{topic} Concern"),
            None => "Employee Feedback Report".to_string(),
        };
    };

    title.to_string()
}

/// First 200 characters of the feedback, with "..." when anything was cut.
pub fn excerpt(text: &str) -> String {
    let text = text.trim();
    let mut excerpt: String = text.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    if text.chars().count() > SUMMARY_EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

fn summary(
    category: CaseCategory,
    metrics: &ConversationMetrics,
    key_topics: &[String],
    text: &str,
) -> String {
    let minutes = (metrics.duration_seconds.max(0.0) / 60.0).round() as u64;
    let topics = if key_topics.is_empty() {
        "none identified".to_string()
    } else {
        key_topics.join(", ")
    };

    format!(
        "{category} feedback received via voice conversation ({minutes} min). \
         Key topics: {topics}. Employee said: \"{}\"",
        excerpt(text)
    )
}

/// Classifies feedback text into category, severity, sentiment, topics, title and summary.
pub fn classify(text: &str, metrics: &ConversationMetrics) -> Classification {
    let lowered = text.to_lowercase();

    let rule = category_rule(&lowered);
    let key_topics = key_topics(&lowered);
    let urgency_indicators = urgency_indicators(&lowered);

    Classification {
        title: title(&lowered, &key_topics),
        category: rule.category,
        severity: severity(rule.base_severity, metrics, urgency_indicators.len()),
        sentiment: sentiment(rule.base_sentiment, metrics.vendor_sentiment.as_ref()),
        summary: summary(rule.category, metrics, &key_topics, text),
        key_topics,
        urgency_indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> ConversationMetrics {
        ConversationMetrics {
            duration_seconds: 90.0,
            user_message_count: 2,
            agent_message_count: 2,
            vendor_sentiment: None,
        }
    }

    #[test]
    fn plain_request_is_general_feedback() {
        let result = classify("I need a tracking code", &metrics());

        assert_eq!(result.category, CaseCategory::GeneralFeedback);
        assert_eq!(result.severity, 2);
        assert_eq!(result.sentiment, 0.0);
        assert!(result.key_topics.is_empty());
        assert_eq!(result.title, "Employee Feedback Report");
    }

    #[test]
    fn equipment_near_miss_is_workplace_safety() {
        let result = classify(
            "The equipment in the loading dock caused a near-miss because it is never maintained",
            &metrics(),
        );

        assert_eq!(result.category, CaseCategory::WorkplaceSafety);
        assert!(result.severity >= 4);
        assert_eq!(result.title, "Equipment Safety Concern");
        assert_eq!(result.key_topics, vec!["Safety".to_string()]);
    }

    #[test]
    fn safety_takes_precedence_over_benefits() {
        let result = classify(
            "There is a hazard in the warehouse and I have a question about insurance",
            &metrics(),
        );

        assert_eq!(result.category, CaseCategory::WorkplaceSafety);
    }

    #[test]
    fn severity_boosts_clamp_at_five() {
        let busy = ConversationMetrics {
            duration_seconds: 420.0,
            user_message_count: 7,
            agent_message_count: 6,
            vendor_sentiment: None,
        };

        let result = classify(
            "This is urgent and serious, the hazard needs fixing immediately",
            &busy,
        );

        assert_eq!(result.category, CaseCategory::WorkplaceSafety);
        assert_eq!(result.urgency_indicators.len(), 3);
        assert_eq!(result.severity, MAX_SEVERITY);
    }

    #[test]
    fn each_boost_adds_one() {
        let long = ConversationMetrics {
            duration_seconds: 301.0,
            ..metrics()
        };

        let result = classify("I want to share thoughts about the parking lot", &long);

        assert_eq!(result.category, CaseCategory::WorkplaceEnvironment);
        assert_eq!(result.severity, 3);
    }

    #[test]
    fn boundary_values_do_not_boost() {
        let exact = ConversationMetrics {
            duration_seconds: 300.0,
            user_message_count: 5,
            agent_message_count: 5,
            vendor_sentiment: None,
        };

        let result = classify("I have a question about dental coverage", &exact);

        assert_eq!(result.category, CaseCategory::BenefitsInquiry);
        assert_eq!(result.severity, 2);
    }

    #[test]
    fn vendor_sentiment_overrides_category_base() {
        let with_vendor = ConversationMetrics {
            vendor_sentiment: Some(VendorSentiment {
                label: SentimentLabel::Negative,
                confidence: 0.5,
                emotions: vec!["frustrated".to_string()],
            }),
            ..metrics()
        };

        let result = classify("My manager keeps bullying the new hires", &with_vendor);

        assert_eq!(result.category, CaseCategory::Harassment);
        assert!((result.sentiment - -0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn sentiment_falls_back_to_category_base() {
        let result = classify("I keep getting harassed in the break room", &metrics());

        assert_eq!(result.category, CaseCategory::Harassment);
        assert_eq!(result.sentiment, -0.8);
        assert_eq!(result.severity, 5);
    }

    #[test]
    fn key_topics_are_capped_at_three_in_table_order() {
        let topics = key_topics(
            "Our training is poor, team morale is low, my manager ignores safety and my salary is late",
        );

        assert_eq!(
            topics,
            vec![
                "Safety".to_string(),
                "Management".to_string(),
                "Compensation".to_string()
            ]
        );
    }

    #[test]
    fn title_falls_back_to_first_topic() {
        let result = classify("The team meeting schedule keeps moving", &metrics());
        assert_eq!(result.title, "Communication Concern");

        let result = classify("We were never informed about the reorg", &metrics());
        assert_eq!(result.title, "Communication Issue");

        let result = classify("Nobody on the team shows respect anymore", &metrics());
        assert_eq!(result.title, "Culture Concern");
    }

    #[test]
    fn summary_truncates_feedback_to_two_hundred_chars() {
        let long_text = "a".repeat(250);
        let result = classify(&long_text, &metrics());

        let expected_excerpt = format!("{}...", "a".repeat(200));
        assert!(result.summary.contains(&expected_excerpt));
        assert!(!result.summary.contains(&"a".repeat(201)));
        assert!(result.summary.starts_with("General Feedback feedback received"));
        assert!(result.summary.contains("(2 min)"));
    }

    #[test]
    fn short_feedback_is_not_ellipsized() {
        assert_eq!(excerpt("  Short note  "), "Short note");
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "I am stressed by overtime every weekend and my supervisor won't listen";
        let first = classify(text, &metrics());
        let second = classify(text, &metrics());

        assert_eq!(first, second);
        assert_eq!(first.category, CaseCategory::WorkLifeBalance);
        assert_eq!(first.title, "Excessive Overtime Concern");
    }

    #[test]
    fn unknown_sentiment_labels_are_neutral() {
        assert_eq!(SentimentLabel::parse("MIXED"), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::parse(" Negative "), SentimentLabel::Negative);
    }
}
