//! Survey result repository.

use std::sync::Arc;

use crate::entities::{
    Choice, SurveyResult, SurveyResultChoice, choice, survey_result, survey_result_choice,
};
use crate::error::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::OnConflict,
};
use survey_common::AppResult;

/// Survey result repository for database operations.
#[derive(Clone)]
pub struct SurveyResultRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyResultRepository {
    /// Create a new survey result repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the result of a user for a survey.
    pub async fn find_by_user_and_survey(
        &self,
        user_id: &str,
        survey_id: &str,
    ) -> AppResult<Option<survey_result::Model>> {
        SurveyResult::find()
            .filter(survey_result::Column::UserId.eq(user_id))
            .filter(survey_result::Column::SurveyId.eq(survey_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Find the result of a user for a survey and lock its row until the
    /// transaction ends.
    pub async fn lock_by_user_and_survey_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        survey_id: &str,
    ) -> AppResult<Option<survey_result::Model>> {
        SurveyResult::find()
            .filter(survey_result::Column::UserId.eq(user_id))
            .filter(survey_result::Column::SurveyId.eq(survey_id))
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(map_db_err)
    }

    /// Insert a result unless one already exists for its `(user_id, survey_id)`.
    ///
    /// Returns whether a row was inserted. A concurrent insert of the same
    /// pair blocks here until the other transaction finishes.
    pub async fn insert_if_absent_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: survey_result::ActiveModel,
    ) -> AppResult<bool> {
        let inserted = SurveyResult::insert(model)
            .on_conflict(
                OnConflict::columns([
                    survey_result::Column::UserId,
                    survey_result::Column::SurveyId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(map_db_err)?;
        Ok(inserted > 0)
    }

    /// Update a result on the given connection.
    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: survey_result::ActiveModel,
    ) -> AppResult<survey_result::Model> {
        model.update(conn).await.map_err(map_db_err)
    }
}

/// Answer history repository. Rows are only ever inserted.
#[derive(Clone)]
pub struct SurveyResultChoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyResultChoiceRepository {
    /// Create a new answer history repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an answer on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: survey_result_choice::ActiveModel,
    ) -> AppResult<survey_result_choice::Model> {
        model.insert(conn).await.map_err(map_db_err)
    }

    /// Answers of a result in the order they were recorded.
    pub async fn find_by_result(
        &self,
        result_id: &str,
    ) -> AppResult<Vec<survey_result_choice::Model>> {
        SurveyResultChoice::find()
            .filter(survey_result_choice::Column::ResultId.eq(result_id))
            .order_by_asc(survey_result_choice::Column::CreatedAt)
            .order_by_asc(survey_result_choice::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Answers of a result with their choices, in the order they were recorded.
    pub async fn find_by_result_with_choice(
        &self,
        result_id: &str,
    ) -> AppResult<Vec<(survey_result_choice::Model, Option<choice::Model>)>> {
        SurveyResultChoice::find()
            .find_also_related(Choice)
            .filter(survey_result_choice::Column::ResultId.eq(result_id))
            .order_by_asc(survey_result_choice::Column::CreatedAt)
            .order_by_asc(survey_result_choice::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Count answers of a result.
    pub async fn count_by_result(&self, result_id: &str) -> AppResult<u64> {
        SurveyResultChoice::find()
            .filter(survey_result_choice::Column::ResultId.eq(result_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    /// Count answers that reference a choice, on the given connection.
    pub async fn count_by_choice_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        choice_id: &str,
    ) -> AppResult<u64> {
        SurveyResultChoice::find()
            .filter(survey_result_choice::Column::ChoiceId.eq(choice_id))
            .count(conn)
            .await
            .map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_result(id: &str, current: Option<&str>) -> survey_result::Model {
        let now = Utc::now();
        survey_result::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            survey_id: "s1".to_string(),
            current_question_id: current.map(str::to_string),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn new_result_model() -> survey_result::ActiveModel {
        let now = Utc::now();
        survey_result::ActiveModel {
            id: Set("r1".to_string()),
            user_id: Set("user1".to_string()),
            survey_id: Set("s1".to_string()),
            current_question_id: Set(Some("q1".to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    fn empty_repo() -> SurveyResultRepository {
        SurveyResultRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ))
    }

    #[tokio::test]
    async fn test_find_by_user_and_survey() {
        let result = create_test_result("r1", Some("q2"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[result.clone()]])
                .into_connection(),
        );

        let repo = SurveyResultRepository::new(db);
        let found = repo.find_by_user_and_survey("user1", "s1").await.unwrap();
        assert_eq!(found, Some(result));
    }

    #[tokio::test]
    async fn test_insert_if_absent_inserted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let inserted = empty_repo()
            .insert_if_absent_in(&db, new_result_model())
            .await
            .unwrap();
        assert!(inserted);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("DO NOTHING"));
    }

    #[tokio::test]
    async fn test_insert_if_absent_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let inserted = empty_repo()
            .insert_if_absent_in(&db, new_result_model())
            .await
            .unwrap();
        assert!(!inserted);
    }

    #[tokio::test]
    async fn test_lock_by_user_and_survey_uses_for_update() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_result("r1", Some("q1"))]])
            .into_connection();

        let found = empty_repo()
            .lock_by_user_and_survey_in(&db, "user1", "s1")
            .await
            .unwrap();
        assert!(found.is_some());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_count_by_choice() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(2))
            }]])
            .into_connection();

        let repo = SurveyResultChoiceRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));
        assert_eq!(repo.count_by_choice_in(&db, "c1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_result() {
        let now = Utc::now();
        let answers = vec![
            survey_result_choice::Model {
                id: "a1".to_string(),
                result_id: "r1".to_string(),
                choice_id: "c1".to_string(),
                created_at: now.into(),
            },
            survey_result_choice::Model {
                id: "a2".to_string(),
                result_id: "r1".to_string(),
                choice_id: "c3".to_string(),
                created_at: now.into(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([answers])
                .into_connection(),
        );

        let repo = SurveyResultChoiceRepository::new(db);
        let found = repo.find_by_result("r1").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].choice_id, "c3");
    }
}
