//! Survey entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "survey")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Author of the survey (owned by the external user store)
    #[sea_orm(indexed)]
    pub author_id: String,

    /// Head of the question chain
    #[sea_orm(nullable)]
    pub first_question_id: Option<String>,

    /// Tail of the question chain (the question whose `next_id` is null)
    #[sea_orm(nullable)]
    pub last_question_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Question,

    #[sea_orm(has_many = "super::survey_result::Entity")]
    SurveyResult,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::survey_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
