use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

pub use entity::{
    ai_insights, case_category, case_status, cases, hr_interactions, hr_users, roles,
    sender_type, transcript_status, transcripts, webhook_log_status, webhook_logs, Id,
};

pub mod ai_insight;
pub mod case;
pub mod error;
pub mod hr_interaction;
pub mod hr_user;
pub mod retry;
pub mod transcript;
pub mod webhook_log;

pub const DEMO_HR_EMAIL: &str = "hr@company.com";
pub const DEMO_HR_PASSWORD: &str = "demo123";

struct DemoCase {
    confirmation_code: &'static str,
    title: &'static str,
    category: case_category::CaseCategory,
    severity: i32,
    status: case_status::CaseStatus,
    transcript: &'static str,
    sentiment: f64,
    topics: &'static [&'static str],
}

const DEMO_CASES: &[DemoCase] = &[
    DemoCase {
        confirmation_code: "SAFE000001",
        title: "Equipment Safety Concern",
        category: case_category::CaseCategory::WorkplaceSafety,
        severity: 4,
        status: case_status::CaseStatus::Open,
        transcript: "The forklift in warehouse B has faulty brakes and nobody has fixed it. \
                     Someone is going to get hurt.",
        sentiment: -0.6,
        topics: &["Safety"],
    },
    DemoCase {
        confirmation_code: "WLB0000002",
        title: "Work-Life Balance Concern",
        category: case_category::CaseCategory::WorkLifeBalance,
        severity: 3,
        status: case_status::CaseStatus::Investigating,
        transcript: "We keep getting asked to work overtime every weekend and the workload \
                     is not sustainable.",
        sentiment: -0.4,
        topics: &["Workload"],
    },
    DemoCase {
        confirmation_code: "BEN0000003",
        title: "Benefits Question",
        category: case_category::CaseCategory::BenefitsInquiry,
        severity: 2,
        status: case_status::CaseStatus::Closed,
        transcript: "I had a question about how the dental insurance covers my family.",
        sentiment: 0.0,
        topics: &["Benefits"],
    },
];

/// Seeds the demo HR account and a handful of cases across statuses.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let txn = db.begin().await?;

    let hr_user = hr_user::create(
        &txn,
        DEMO_HR_EMAIL,
        "HR Manager",
        roles::Role::HrManager,
        DEMO_HR_PASSWORD,
    )
    .await?;
    info!("Seeded HR user {}", hr_user.email);

    for demo in DEMO_CASES {
        let created = case::create(
            &txn,
            case::NewCase {
                confirmation_code: demo.confirmation_code.to_string(),
                title: demo.title.to_string(),
                category: demo.category,
                summary: format!(
                    "Employee reported {} concern. Details: {}",
                    demo.category.label().to_lowercase(),
                    demo.transcript
                ),
                severity: demo.severity,
            },
        )
        .await?;

        if demo.status != case_status::CaseStatus::Open {
            case::update_status(&txn, created.id, demo.status).await?;
        }

        transcript::create(
            &txn,
            transcript::NewTranscript {
                case_id: created.id,
                raw_transcript: demo.transcript.to_string(),
                sentiment_score: demo.sentiment,
                ..Default::default()
            },
        )
        .await?;

        hr_interaction::create(
            &txn,
            created.id,
            &format!(
                "Your feedback has been received. Your confirmation code is {}.",
                demo.confirmation_code
            ),
            sender_type::SenderType::System,
            None,
        )
        .await?;

        ai_insight::create(
            &txn,
            created.id,
            "elevenlabs_conversation",
            json!({ "key_topics": demo.topics, "severity": demo.severity }),
            0.85,
        )
        .await?;

        info!("Seeded case {} ({})", demo.confirmation_code, demo.category);
    }

    txn.commit().await?;
    Ok(())
}
