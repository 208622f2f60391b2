//! Create question table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Question::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Question::SurveyId).string_len(32).not_null())
                    .col(ColumnDef::new(Question::Text).text().not_null())
                    .col(ColumnDef::new(Question::NextId).string_len(32))
                    .col(
                        ColumnDef::new(Question::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_survey")
                            .from(Question::Table, Question::SurveyId)
                            .to(Survey::Table, Survey::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_next")
                            .from(Question::Table, Question::NextId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .check(Expr::col(Question::NextId).ne(Expr::col(Question::Id)))
                    .to_owned(),
            )
            .await?;

        // Index: survey_id (for loading a survey graph)
        manager
            .create_index(
                Index::create()
                    .name("idx_question_survey_id")
                    .table(Question::Table)
                    .col(Question::SurveyId)
                    .to_owned(),
            )
            .await?;

        // Index: next_id (for finding the predecessor of a question)
        manager
            .create_index(
                Index::create()
                    .name("idx_question_next_id")
                    .table(Question::Table)
                    .col(Question::NextId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
    SurveyId,
    Text,
    NextId,
    CreatedAt,
}

#[derive(Iden)]
enum Survey {
    Table,
    Id,
}
