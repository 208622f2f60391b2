//! Choice repository.

use std::sync::Arc;

use crate::entities::{Choice, choice};
use crate::error::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use survey_common::{AppError, AppResult};

/// Choice repository for database operations.
#[derive(Clone)]
pub struct ChoiceRepository {
    db: Arc<DatabaseConnection>,
}

/// Apply the display ordering `(order, created_at, id)`.
fn display_order(select: Select<Choice>) -> Select<Choice> {
    select
        .order_by_asc(choice::Column::Order)
        .order_by_asc(choice::Column::CreatedAt)
        .order_by_asc(choice::Column::Id)
}

impl ChoiceRepository {
    /// Create a new choice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a choice by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<choice::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Get a choice by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<choice::Model> {
        self.get_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a choice by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<choice::Model>> {
        Choice::find_by_id(id).one(conn).await.map_err(map_db_err)
    }

    /// Get a choice by ID on the given connection, returning error if not found.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<choice::Model> {
        self.find_by_id_in(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Choice: {id}")))
    }

    /// Choices of a question in display order.
    pub async fn find_by_question(&self, question_id: &str) -> AppResult<Vec<choice::Model>> {
        display_order(Choice::find().filter(choice::Column::QuestionId.eq(question_id)))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Choices of several questions, grouped by question and in display order.
    pub async fn find_by_questions(
        &self,
        question_ids: &[String],
    ) -> AppResult<Vec<choice::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        display_order(
            Choice::find()
                .filter(choice::Column::QuestionId.is_in(question_ids.iter().cloned()))
                .order_by_asc(choice::Column::QuestionId),
        )
        .all(self.db.as_ref())
        .await
        .map_err(map_db_err)
    }

    /// Count choices of a question.
    pub async fn count_by_question(&self, question_id: &str) -> AppResult<u64> {
        Choice::find()
            .filter(choice::Column::QuestionId.eq(question_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a new choice.
    pub async fn create(&self, model: choice::ActiveModel) -> AppResult<choice::Model> {
        self.create_in(self.db.as_ref(), model).await
    }

    /// Create a new choice on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: choice::ActiveModel,
    ) -> AppResult<choice::Model> {
        model.insert(conn).await.map_err(map_db_err)
    }

    /// Update a choice.
    pub async fn update(&self, model: choice::ActiveModel) -> AppResult<choice::Model> {
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Delete a choice on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Choice::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}
