//! Survey repository.

use std::sync::Arc;

use crate::entities::{Survey, survey};
use crate::error::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use survey_common::{AppError, AppResult};

/// Survey repository for database operations.
#[derive(Clone)]
pub struct SurveyRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyRepository {
    /// Create a new survey repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db.begin().await.map_err(map_db_err)
    }

    /// Find a survey by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<survey::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Get a survey by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<survey::Model> {
        self.get_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a survey by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<survey::Model>> {
        Survey::find_by_id(id).one(conn).await.map_err(map_db_err)
    }

    /// Get a survey by ID on the given connection, returning error if not found.
    pub async fn get_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<survey::Model> {
        self.find_by_id_in(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Survey: {id}")))
    }

    /// Get a survey and lock its row until the transaction ends.
    ///
    /// Serializes concurrent graph mutations of the same survey.
    pub async fn lock_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<survey::Model> {
        Survey::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound(format!("Survey: {id}")))
    }

    /// List surveys of an author, newest first.
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<survey::Model>> {
        Survey::find()
            .filter(survey::Column::AuthorId.eq(author_id))
            .order_by_desc(survey::Column::CreatedAt)
            .order_by_desc(survey::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Create a new survey.
    pub async fn create(&self, model: survey::ActiveModel) -> AppResult<survey::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Update a survey on the given connection.
    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: survey::ActiveModel,
    ) -> AppResult<survey::Model> {
        model.update(conn).await.map_err(map_db_err)
    }

    /// Delete a survey. Questions, choices, results and answers cascade.
    pub async fn delete(&self, id: &str) -> AppResult<u64> {
        let result = Survey::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }
}
