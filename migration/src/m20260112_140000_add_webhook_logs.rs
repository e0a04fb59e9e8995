use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE feedback_platform.webhook_log_status AS ENUM (
                'received',
                'processed',
                'ignored',
                'failed'
            )",
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS feedback_platform.webhook_logs (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                request_id UUID NOT NULL,
                event_type VARCHAR(100),
                external_job_id VARCHAR(255),
                case_id UUID REFERENCES feedback_platform.cases(id) ON DELETE SET NULL,
                status feedback_platform.webhook_log_status NOT NULL DEFAULT 'received',
                payload JSONB NOT NULL,
                error_message TEXT,
                processing_time_ms BIGINT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS webhook_logs_created_at_idx \
             ON feedback_platform.webhook_logs (created_at DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS feedback_platform.webhook_logs")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS feedback_platform.webhook_log_status")
            .await?;

        Ok(())
    }
}
