//! Create survey table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Chain link foreign keys are added once the question table exists
        manager
            .create_table(
                Table::create()
                    .table(Survey::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Survey::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Survey::Title).text().not_null())
                    .col(ColumnDef::new(Survey::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Survey::FirstQuestionId).string_len(32))
                    .col(ColumnDef::new(Survey::LastQuestionId).string_len(32))
                    .col(
                        ColumnDef::new(Survey::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for listing an author's surveys)
        manager
            .create_index(
                Index::create()
                    .name("idx_survey_author_id")
                    .table(Survey::Table)
                    .col(Survey::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Survey::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Survey {
    Table,
    Id,
    Title,
    AuthorId,
    FirstQuestionId,
    LastQuestionId,
    CreatedAt,
}
