//! Question repository.

use std::sync::Arc;

use crate::entities::{Question, question};
use crate::error::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use survey_common::{AppError, AppResult};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a question by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id).one(conn).await.map_err(map_db_err)
    }

    /// Get a question by ID on the given connection, returning error if not found.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<question::Model> {
        self.find_by_id_in(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question: {id}")))
    }

    /// All questions of a survey in creation order.
    pub async fn find_by_survey(&self, survey_id: &str) -> AppResult<Vec<question::Model>> {
        self.find_by_survey_in(self.db.as_ref(), survey_id).await
    }

    /// All questions of a survey in creation order, on the given connection.
    pub async fn find_by_survey_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        survey_id: &str,
    ) -> AppResult<Vec<question::Model>> {
        Question::find()
            .filter(question::Column::SurveyId.eq(survey_id))
            .order_by_asc(question::Column::CreatedAt)
            .order_by_asc(question::Column::Id)
            .all(conn)
            .await
            .map_err(map_db_err)
    }

    /// Count questions of a survey on the given connection.
    pub async fn count_by_survey_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        survey_id: &str,
    ) -> AppResult<u64> {
        Question::find()
            .filter(question::Column::SurveyId.eq(survey_id))
            .count(conn)
            .await
            .map_err(map_db_err)
    }

    /// Create a new question on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: question::ActiveModel,
    ) -> AppResult<question::Model> {
        model.insert(conn).await.map_err(map_db_err)
    }

    /// Update a question on the given connection.
    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: question::ActiveModel,
    ) -> AppResult<question::Model> {
        model.update(conn).await.map_err(map_db_err)
    }
}
