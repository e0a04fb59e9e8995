use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ENUM_TYPES: &[(&str, &str)] = &[
    (
        "case_category",
        "'Workplace Safety', 'Harassment', 'Discrimination', 'Policy Violation', \
         'Work-Life Balance', 'Workplace Environment', 'Benefits Inquiry', \
         'General Feedback', 'Call Acknowledgment'",
    ),
    ("case_status", "'open', 'investigating', 'closed'"),
    (
        "transcript_status",
        "'pending', 'processing', 'completed', 'failed'",
    ),
    ("sender_type", "'employee', 'hr_manager', 'system'"),
    ("hr_role", "'hr_manager', 'hr_admin'"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (name, values) in ENUM_TYPES {
            db.execute_unprepared(&format!(
                "CREATE TYPE feedback_platform.{name} AS ENUM ({values})"
            ))
            .await?;
        }

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_platform.cases (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                confirmation_code VARCHAR(10) NOT NULL,
                title VARCHAR(255) NOT NULL,
                category feedback_platform.case_category NOT NULL,
                summary TEXT NOT NULL,
                severity INTEGER NOT NULL,
                status feedback_platform.case_status NOT NULL DEFAULT 'open',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT cases_confirmation_code_unique UNIQUE(confirmation_code),
                CONSTRAINT cases_confirmation_code_length CHECK (char_length(confirmation_code) = 10),
                CONSTRAINT cases_severity_range CHECK (severity BETWEEN 1 AND 5)
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_platform.transcripts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_id UUID NOT NULL
                    REFERENCES feedback_platform.cases(id) ON DELETE CASCADE,
                raw_transcript TEXT NOT NULL,
                processed_summary TEXT,
                sentiment_score DOUBLE PRECISION NOT NULL DEFAULT 0,
                external_job_id VARCHAR(255),
                audio_duration_seconds DOUBLE PRECISION,
                confidence_score DOUBLE PRECISION,
                language_code VARCHAR(10),
                processing_status feedback_platform.transcript_status NOT NULL DEFAULT 'completed',
                error_message TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT transcripts_external_job_id_unique UNIQUE(external_job_id),
                CONSTRAINT transcripts_sentiment_range CHECK (sentiment_score BETWEEN -1 AND 1),
                CONSTRAINT transcripts_confidence_range
                    CHECK (confidence_score IS NULL OR confidence_score BETWEEN 0 AND 1)
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_platform.hr_interactions (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_id UUID NOT NULL
                    REFERENCES feedback_platform.cases(id) ON DELETE CASCADE,
                message TEXT NOT NULL,
                sender_type feedback_platform.sender_type NOT NULL,
                sender_name VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_platform.ai_insights (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                case_id UUID NOT NULL
                    REFERENCES feedback_platform.cases(id) ON DELETE CASCADE,
                insight_type VARCHAR(100) NOT NULL,
                content JSONB NOT NULL,
                confidence_score DOUBLE PRECISION NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT ai_insights_confidence_range CHECK (confidence_score BETWEEN 0 AND 1)
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_platform.hr_users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL,
                name VARCHAR(255) NOT NULL,
                role feedback_platform.hr_role NOT NULL DEFAULT 'hr_manager',
                password VARCHAR(255) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT hr_users_email_unique UNIQUE(email)
            )
            "#,
        )
        .await?;

        // Dashboard listing is newest first; threads are read oldest first per case
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS cases_created_at_idx \
             ON feedback_platform.cases (created_at DESC)",
        )
        .await?;
        for table in ["transcripts", "hr_interactions", "ai_insights"] {
            db.execute_unprepared(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_case_id_idx \
                 ON feedback_platform.{table} (case_id, created_at)"
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in [
            "hr_users",
            "ai_insights",
            "hr_interactions",
            "transcripts",
            "cases",
        ] {
            db.execute_unprepared(&format!(
                "DROP TABLE IF EXISTS feedback_platform.{table}"
            ))
            .await?;
        }

        for (name, _) in ENUM_TYPES.iter().rev() {
            db.execute_unprepared(&format!("DROP TYPE IF EXISTS feedback_platform.{name}"))
                .await?;
        }

        Ok(())
    }
}
