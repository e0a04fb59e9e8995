use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS feedback_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO feedback_platform, public;")
            .await?;

        // Grant the application user everything inside the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA feedback_platform TO feedback;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA feedback_platform GRANT ALL ON TABLES TO feedback;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA feedback_platform GRANT ALL ON SEQUENCES TO feedback;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA feedback_platform GRANT ALL ON FUNCTIONS TO feedback;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA feedback_platform REVOKE ALL ON FUNCTIONS FROM feedback;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA feedback_platform REVOKE ALL ON SEQUENCES FROM feedback;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA feedback_platform REVOKE ALL ON TABLES FROM feedback;
                    REVOKE ALL ON SCHEMA feedback_platform FROM feedback;
                END $$;
            "#)
            .await?;

        // CASCADE removes every table and type in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS feedback_platform CASCADE;")
            .await?;

        Ok(())
    }
}
