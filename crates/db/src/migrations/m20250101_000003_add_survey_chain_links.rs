//! Migration adding foreign keys for the survey's first and last question.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_survey_first_question")
                    .from(Survey::Table, Survey::FirstQuestionId)
                    .to(Question::Table, Question::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_survey_last_question")
                    .from(Survey::Table, Survey::LastQuestionId)
                    .to(Question::Table, Question::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_survey_last_question")
                    .table(Survey::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_survey_first_question")
                    .table(Survey::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Survey {
    Table,
    FirstQuestionId,
    LastQuestionId,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}
