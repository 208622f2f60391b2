//! Create survey result choice (answer history) table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SurveyResultChoice::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SurveyResultChoice::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SurveyResultChoice::ResultId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SurveyResultChoice::ChoiceId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SurveyResultChoice::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_result_choice_result")
                            .from(SurveyResultChoice::Table, SurveyResultChoice::ResultId)
                            .to(SurveyResult::Table, SurveyResult::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_survey_result_choice_choice")
                            .from(SurveyResultChoice::Table, SurveyResultChoice::ChoiceId)
                            .to(Choice::Table, Choice::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (result_id, created_at) - ordered answer history
        manager
            .create_index(
                Index::create()
                    .name("idx_survey_result_choice_result_created")
                    .table(SurveyResultChoice::Table)
                    .col(SurveyResultChoice::ResultId)
                    .col(SurveyResultChoice::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: choice_id (for the protect-on-delete lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_survey_result_choice_choice_id")
                    .table(SurveyResultChoice::Table)
                    .col(SurveyResultChoice::ChoiceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SurveyResultChoice::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SurveyResultChoice {
    Table,
    Id,
    ResultId,
    ChoiceId,
    CreatedAt,
}

#[derive(Iden)]
enum SurveyResult {
    Table,
    Id,
}

#[derive(Iden)]
enum Choice {
    Table,
    Id,
}
