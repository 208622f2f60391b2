//! Create survey result table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SurveyResult::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SurveyResult::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SurveyResult::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(SurveyResult::SurveyId).string_len(32).not_null())
                    .col(ColumnDef::new(SurveyResult::CurrentQuestionId).string_len(32))
                    .col(
                        ColumnDef::new(SurveyResult::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SurveyResult::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_result_survey")
                            .from(SurveyResult::Table, SurveyResult::SurveyId)
                            .to(Survey::Table, Survey::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // NO ACTION: a question that is still someone's cursor cannot be deleted,
                    // but a survey-wide cascade succeeds because it is checked at statement end
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_result_current_question")
                            .from(SurveyResult::Table, SurveyResult::CurrentQuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, survey_id) - one result per respondent and survey
        manager
            .create_index(
                Index::create()
                    .name("idx_survey_result_user_survey")
                    .table(SurveyResult::Table)
                    .col(SurveyResult::UserId)
                    .col(SurveyResult::SurveyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: survey_id (for cascades and per-survey listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_survey_result_survey_id")
                    .table(SurveyResult::Table)
                    .col(SurveyResult::SurveyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SurveyResult::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SurveyResult {
    Table,
    Id,
    UserId,
    SurveyId,
    CurrentQuestionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Survey {
    Table,
    Id,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}
