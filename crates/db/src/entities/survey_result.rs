//! Survey result entity: a respondent's progress through one survey.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "survey_result")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Respondent (owned by the external user store)
    pub user_id: String,

    #[sea_orm(indexed)]
    pub survey_id: String,

    /// Question the respondent has to answer next (null once completed)
    #[sea_orm(nullable)]
    pub current_question_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey::Entity",
        from = "Column::SurveyId",
        to = "super::survey::Column::Id",
        on_delete = "Cascade"
    )]
    Survey,

    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::CurrentQuestionId",
        to = "super::question::Column::Id",
        on_delete = "NoAction"
    )]
    CurrentQuestion,

    #[sea_orm(has_many = "super::survey_result_choice::Entity")]
    SurveyResultChoice,
}

impl Related<super::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl Related<super::survey_result_choice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyResultChoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
