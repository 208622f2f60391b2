//! Survey result choice entity: one recorded answer, never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "survey_result_choice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub result_id: String,

    /// Answered choice, protected from deletion while referenced
    #[sea_orm(indexed)]
    pub choice_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey_result::Entity",
        from = "Column::ResultId",
        to = "super::survey_result::Column::Id",
        on_delete = "Cascade"
    )]
    SurveyResult,

    #[sea_orm(
        belongs_to = "super::choice::Entity",
        from = "Column::ChoiceId",
        to = "super::choice::Column::Id",
        on_delete = "NoAction"
    )]
    Choice,
}

impl Related<super::survey_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyResult.def()
    }
}

impl Related<super::choice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Choice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
