//! Survey graph service: authoring and loading surveys, questions and choices.
//!
//! Questions form a singly linked chain starting at `survey.first_question_id`.
//! The survey also keeps the tail (`last_question_id`) so appending does not
//! walk the chain. Every mutation runs in one transaction that holds the
//! survey row lock and validates the new links before commit.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{DatabaseTransaction, Set};
use serde::{Deserialize, Serialize};
use survey_common::{AppError, AppResult, IdGenerator};
use survey_db::{
    entities::{choice, question, survey},
    map_db_err,
    repositories::{
        ChoiceRepository, QuestionRepository, SurveyRepository, SurveyResultChoiceRepository,
    },
};
use tracing::{info, warn};
use validator::Validate;

use super::integrity::{IntegrityValidator, check_acyclic, walk_chain};

/// Maximum number of choices per question.
pub const MAX_CHOICES_PER_QUESTION: u64 = 5;

/// Maximum number of questions per survey.
pub const MAX_QUESTIONS_PER_SURVEY: u64 = 15;

/// Input for creating a survey.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurveyInput {
    #[validate(length(min = 1, max = 512))]
    pub title: String,
}

/// One answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceInput {
    #[validate(length(min = 1, max = 1024))]
    pub text: String,
    #[serde(default)]
    pub order: i16,
}

/// Input for appending a question to the end of a survey.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppendQuestionInput {
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
    #[validate(length(min = 1, max = MAX_CHOICES_PER_QUESTION), nested)]
    pub choices: Vec<ChoiceInput>,
}

/// Input for updating a choice.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChoiceInput {
    #[validate(length(min = 1, max = 1024))]
    pub text: Option<String>,
    pub order: Option<i16>,
}

/// A question with its choices in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionNode {
    #[serde(flatten)]
    pub question: question::Model,
    pub choices: Vec<choice::Model>,
}

/// A survey with its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyGraph {
    pub survey: survey::Model,
    /// Questions reachable from the first question, in chain order.
    pub questions: Vec<QuestionNode>,
    /// Questions not on the chain, in creation order.
    pub detached: Vec<QuestionNode>,
}

impl SurveyGraph {
    /// Assemble a graph from rows.
    ///
    /// `questions` must be in creation order and `choices` in display order.
    #[must_use]
    pub fn build(
        survey: survey::Model,
        questions: Vec<question::Model>,
        choices: Vec<choice::Model>,
    ) -> Self {
        let mut choices_by_question: HashMap<String, Vec<choice::Model>> = HashMap::new();
        for choice in choices {
            choices_by_question
                .entry(choice.question_id.clone())
                .or_default()
                .push(choice);
        }

        let next_of: HashMap<String, Option<String>> = questions
            .iter()
            .map(|q| (q.id.clone(), q.next_id.clone()))
            .collect();
        let walk = walk_chain(survey.first_question_id.as_deref(), &next_of);
        if let Some(looped_at) = &walk.looped_at {
            warn!(survey_id = %survey.id, question_id = %looped_at, "Stored question chain loops");
        }

        let mut nodes: HashMap<String, QuestionNode> = HashMap::with_capacity(questions.len());
        let mut creation_order = Vec::with_capacity(questions.len());
        for question in questions {
            let choices = choices_by_question.remove(&question.id).unwrap_or_default();
            creation_order.push(question.id.clone());
            nodes.insert(question.id.clone(), QuestionNode { question, choices });
        }

        let chained: Vec<QuestionNode> = walk
            .order
            .iter()
            .filter_map(|id| nodes.remove(id))
            .collect();
        let detached: Vec<QuestionNode> = creation_order
            .iter()
            .filter_map(|id| nodes.remove(id))
            .collect();

        Self {
            survey,
            questions: chained,
            detached,
        }
    }

    /// Find a question of this survey by ID.
    #[must_use]
    pub fn node(&self, question_id: &str) -> Option<&QuestionNode> {
        self.questions
            .iter()
            .chain(self.detached.iter())
            .find(|node| node.question.id == question_id)
    }
}

/// Graph service for survey authoring and loading.
#[derive(Clone)]
pub struct GraphService {
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    answer_repo: SurveyResultChoiceRepository,
    validator: IntegrityValidator,
    id_gen: IdGenerator,
}

impl GraphService {
    /// Create a new graph service.
    #[must_use]
    pub fn new(
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        choice_repo: ChoiceRepository,
        answer_repo: SurveyResultChoiceRepository,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            validator: IntegrityValidator::new(question_repo.clone()),
            survey_repo,
            question_repo,
            choice_repo,
            answer_repo,
            id_gen,
        }
    }

    /// Create a survey without questions.
    pub async fn create_survey(
        &self,
        author_id: &str,
        input: CreateSurveyInput,
    ) -> AppResult<survey::Model> {
        input.validate()?;

        let model = survey::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            author_id: Set(author_id.to_string()),
            first_question_id: Set(None),
            last_question_id: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let survey = self.survey_repo.create(model).await?;
        info!(survey_id = %survey.id, author_id = %author_id, "Created survey");
        Ok(survey)
    }

    /// List the surveys of an author, newest first.
    pub async fn list_surveys(
        &self,
        author_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<survey::Model>> {
        self.survey_repo
            .find_by_author(author_id, limit, offset)
            .await
    }

    /// Append a question with its choices to the end of the chain.
    pub async fn append_question(
        &self,
        survey_id: &str,
        input: AppendQuestionInput,
    ) -> AppResult<QuestionNode> {
        input.validate()?;

        let txn = self.survey_repo.begin().await?;
        let survey = self.survey_repo.lock_by_id_in(&txn, survey_id).await?;
        let existing = self
            .question_repo
            .count_by_survey_in(&txn, &survey.id)
            .await?;
        if existing >= MAX_QUESTIONS_PER_SURVEY {
            return Err(AppError::Validation(format!(
                "Survey {survey_id} already has {MAX_QUESTIONS_PER_SURVEY} questions"
            )));
        }
        let now = Utc::now();

        let question = self
            .question_repo
            .create_in(
                &txn,
                question::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    survey_id: Set(survey.id.clone()),
                    text: Set(input.text),
                    next_id: Set(None),
                    created_at: Set(now.into()),
                },
            )
            .await?;

        let mut choices = Vec::with_capacity(input.choices.len());
        for choice_input in input.choices {
            let choice = self
                .choice_repo
                .create_in(
                    &txn,
                    choice::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        question_id: Set(question.id.clone()),
                        text: Set(choice_input.text),
                        order: Set(choice_input.order),
                        created_at: Set(now.into()),
                    },
                )
                .await?;
            choices.push(choice);
        }

        let tail_id = match survey.last_question_id.clone() {
            Some(tail_id) => Some(tail_id),
            None if survey.first_question_id.is_some() => self.find_tail_in(&txn, &survey).await?,
            None => None,
        };

        if let Some(tail_id) = tail_id {
            let tail = self.question_repo.get_by_id_in(&txn, &tail_id).await?;
            let mut linked = tail.clone();
            linked.next_id = Some(question.id.clone());
            self.validator.validate_question_links(&txn, &linked).await?;

            let mut active: question::ActiveModel = tail.into();
            active.next_id = Set(linked.next_id);
            self.question_repo.update_in(&txn, active).await?;
        }

        let mut proposed = survey.clone();
        if proposed.first_question_id.is_none() {
            proposed.first_question_id = Some(question.id.clone());
        }
        proposed.last_question_id = Some(question.id.clone());
        self.validator
            .validate_survey_links(&txn, &proposed)
            .await?;

        let mut active: survey::ActiveModel = survey.into();
        active.first_question_id = Set(proposed.first_question_id);
        active.last_question_id = Set(proposed.last_question_id);
        self.survey_repo.update_in(&txn, active).await?;

        txn.commit().await.map_err(map_db_err)?;

        info!(
            survey_id = %survey_id,
            question_id = %question.id,
            choices = choices.len(),
            "Appended question"
        );

        Ok(QuestionNode { question, choices })
    }

    /// Discover the tail by walking the chain from the first question.
    async fn find_tail_in(
        &self,
        txn: &DatabaseTransaction,
        survey: &survey::Model,
    ) -> AppResult<Option<String>> {
        warn!(survey_id = %survey.id, "Survey has no tail pointer, walking the chain");
        let questions = self.question_repo.find_by_survey_in(txn, &survey.id).await?;
        let next_of: HashMap<String, Option<String>> = questions
            .into_iter()
            .map(|q| (q.id, q.next_id))
            .collect();
        let walk = walk_chain(survey.first_question_id.as_deref(), &next_of);
        check_acyclic(&walk)?;
        Ok(walk.tail().map(str::to_string))
    }

    /// Load a survey with its questions in chain order and their choices.
    pub async fn get_survey_with_graph(&self, survey_id: &str) -> AppResult<SurveyGraph> {
        let survey = self.survey_repo.get_by_id(survey_id).await?;
        let questions = self.question_repo.find_by_survey(survey_id).await?;
        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let choices = self.choice_repo.find_by_questions(&question_ids).await?;

        Ok(SurveyGraph::build(survey, questions, choices))
    }

    /// Point the survey at a new first question (or none).
    ///
    /// The tail pointer is recomputed from the new head.
    pub async fn set_first_question(
        &self,
        survey_id: &str,
        question_id: Option<&str>,
    ) -> AppResult<survey::Model> {
        let txn = self.survey_repo.begin().await?;
        let survey = self.survey_repo.lock_by_id_in(&txn, survey_id).await?;
        let questions = self.question_repo.find_by_survey_in(&txn, survey_id).await?;

        let next_of: HashMap<String, Option<String>> = questions
            .into_iter()
            .map(|q| (q.id, q.next_id))
            .collect();
        let walk = walk_chain(question_id, &next_of);
        check_acyclic(&walk)?;

        let mut proposed = survey.clone();
        proposed.first_question_id = question_id.map(str::to_string);
        proposed.last_question_id = walk.tail().map(str::to_string);
        self.validator
            .validate_survey_links(&txn, &proposed)
            .await?;

        let mut active: survey::ActiveModel = survey.into();
        active.first_question_id = Set(proposed.first_question_id);
        active.last_question_id = Set(proposed.last_question_id);
        let updated = self.survey_repo.update_in(&txn, active).await?;

        txn.commit().await.map_err(map_db_err)?;

        info!(survey_id = %survey_id, first_question_id = ?question_id, "Relinked survey head");
        Ok(updated)
    }

    /// Point a question at a new next question (or none).
    ///
    /// Rejects links to the question itself, to other surveys, and links
    /// that would make the chain loop.
    pub async fn set_next_question(
        &self,
        question_id: &str,
        next_id: Option<&str>,
    ) -> AppResult<question::Model> {
        let txn = self.survey_repo.begin().await?;
        let current = self.question_repo.get_by_id_in(&txn, question_id).await?;
        let survey = self
            .survey_repo
            .lock_by_id_in(&txn, &current.survey_id)
            .await?;
        let questions = self
            .question_repo
            .find_by_survey_in(&txn, &survey.id)
            .await?;

        let mut proposed = current.clone();
        proposed.next_id = next_id.map(str::to_string);
        self.validator
            .validate_question_links(&txn, &proposed)
            .await?;

        let mut next_of: HashMap<String, Option<String>> = questions
            .into_iter()
            .map(|q| (q.id, q.next_id))
            .collect();
        next_of.insert(proposed.id.clone(), proposed.next_id.clone());
        check_acyclic(&walk_chain(Some(question_id), &next_of))?;

        let tail = walk_chain(survey.first_question_id.as_deref(), &next_of)
            .tail()
            .map(str::to_string);

        let mut active: question::ActiveModel = current.into();
        active.next_id = Set(proposed.next_id);
        let updated = self.question_repo.update_in(&txn, active).await?;

        if tail != survey.last_question_id {
            let mut proposed_survey = survey.clone();
            proposed_survey.last_question_id = tail;
            self.validator
                .validate_survey_links(&txn, &proposed_survey)
                .await?;

            let mut active: survey::ActiveModel = survey.into();
            active.last_question_id = Set(proposed_survey.last_question_id);
            self.survey_repo.update_in(&txn, active).await?;
        }

        txn.commit().await.map_err(map_db_err)?;

        info!(question_id = %question_id, next_id = ?next_id, "Relinked question");
        Ok(updated)
    }

    /// Add a choice to an existing question.
    pub async fn add_choice(
        &self,
        question_id: &str,
        input: ChoiceInput,
    ) -> AppResult<choice::Model> {
        input.validate()?;

        let question = self
            .question_repo
            .find_by_id(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question: {question_id}")))?;

        if self.choice_repo.count_by_question(&question.id).await? >= MAX_CHOICES_PER_QUESTION {
            return Err(AppError::Validation(format!(
                "Question {question_id} already has {MAX_CHOICES_PER_QUESTION} choices"
            )));
        }

        let model = choice::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question.id),
            text: Set(input.text),
            order: Set(input.order),
            created_at: Set(Utc::now().into()),
        };

        self.choice_repo.create(model).await
    }

    /// Update the text or display order of a choice.
    pub async fn update_choice(
        &self,
        choice_id: &str,
        input: UpdateChoiceInput,
    ) -> AppResult<choice::Model> {
        input.validate()?;

        let choice = self.choice_repo.get_by_id(choice_id).await?;
        let mut active: choice::ActiveModel = choice.into();
        if let Some(text) = input.text {
            active.text = Set(text);
        }
        if let Some(order) = input.order {
            active.order = Set(order);
        }

        self.choice_repo.update(active).await
    }

    /// Delete a choice that has never been answered.
    pub async fn delete_choice(&self, choice_id: &str) -> AppResult<()> {
        let txn = self.survey_repo.begin().await?;
        let choice = self.choice_repo.get_by_id_in(&txn, choice_id).await?;

        let answers = self.answer_repo.count_by_choice_in(&txn, &choice.id).await?;
        if answers > 0 {
            return Err(AppError::Conflict(format!(
                "Choice {choice_id} has {answers} recorded answers"
            )));
        }

        self.choice_repo.delete_in(&txn, &choice.id).await?;
        txn.commit().await.map_err(map_db_err)?;

        info!(choice_id = %choice_id, "Deleted choice");
        Ok(())
    }

    /// Delete a survey with its questions, choices, results and answers.
    pub async fn delete_survey(&self, survey_id: &str) -> AppResult<()> {
        if self.survey_repo.delete(survey_id).await? == 0 {
            return Err(AppError::NotFound(format!("Survey: {survey_id}")));
        }

        info!(survey_id = %survey_id, "Deleted survey");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn survey(first: Option<&str>, last: Option<&str>) -> survey::Model {
        survey::Model {
            id: "s1".to_string(),
            title: "Survey".to_string(),
            author_id: "author".to_string(),
            first_question_id: first.map(str::to_string),
            last_question_id: last.map(str::to_string),
            created_at: Utc::now().into(),
        }
    }

    fn question(id: &str, survey_id: &str, next_id: Option<&str>) -> question::Model {
        question::Model {
            id: id.to_string(),
            survey_id: survey_id.to_string(),
            text: format!("Question {id}"),
            next_id: next_id.map(str::to_string),
            created_at: Utc::now().into(),
        }
    }

    fn choice(id: &str, question_id: &str, order: i16) -> choice::Model {
        choice::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            text: format!("Choice {id}"),
            order,
            created_at: Utc::now().into(),
        }
    }

    fn count(n: u64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n as i64))
        }
    }

    fn service(db: DatabaseConnection) -> GraphService {
        let db = Arc::new(db);
        GraphService::new(
            SurveyRepository::new(db.clone()),
            QuestionRepository::new(db.clone()),
            ChoiceRepository::new(db.clone()),
            SurveyResultChoiceRepository::new(db),
            IdGenerator::new(),
        )
    }

    fn append_input(text: &str) -> AppendQuestionInput {
        AppendQuestionInput {
            text: text.to_string(),
            choices: vec![
                ChoiceInput {
                    text: "Yes".to_string(),
                    order: 0,
                },
                ChoiceInput {
                    text: "No".to_string(),
                    order: 1,
                },
            ],
        }
    }

    #[test]
    fn test_build_orders_questions_by_chain() {
        // Created q3, q1, q2 but chained q1 -> q2 -> q3
        let graph = SurveyGraph::build(
            survey(Some("q1"), Some("q3")),
            vec![
                question("q3", "s1", None),
                question("q1", "s1", Some("q2")),
                question("q2", "s1", Some("q3")),
            ],
            vec![choice("c1", "q1", 0), choice("c2", "q1", 1), choice("c3", "q2", 0)],
        );

        let ids: Vec<&str> = graph.questions.iter().map(|n| n.question.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
        assert_eq!(graph.questions[0].choices.len(), 2);
        assert_eq!(graph.questions[0].choices[0].id, "c1");
        assert!(graph.questions[2].choices.is_empty());
        assert!(graph.detached.is_empty());
    }

    #[test]
    fn test_build_separates_detached_questions() {
        let graph = SurveyGraph::build(
            survey(Some("q1"), Some("q1")),
            vec![question("q1", "s1", None), question("q2", "s1", None)],
            vec![],
        );

        assert_eq!(graph.questions.len(), 1);
        assert_eq!(graph.detached.len(), 1);
        assert_eq!(graph.detached[0].question.id, "q2");
        assert!(graph.node("q2").is_some());
        assert!(graph.node("q9").is_none());
    }

    #[test]
    fn test_append_input_requires_choices() {
        let input = AppendQuestionInput {
            text: "Empty".to_string(),
            choices: vec![],
        };
        assert!(input.validate().is_err());
        assert!(append_input("Fine").validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_survey_rejects_empty_title() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = service
            .create_survey(
                "author",
                CreateSurveyInput {
                    title: String::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_append_first_question_becomes_head_and_tail() {
        let q1 = question("q1", "s1", None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // lock survey, count its questions
            .append_query_results([[survey(None, None)]])
            .append_query_results([[count(0)]])
            // insert question
            .append_query_results([[q1.clone()]])
            // insert choices
            .append_query_results([[choice("c1", "q1", 0)]])
            .append_query_results([[choice("c2", "q1", 1)]])
            // validate survey links (head and tail are the same question)
            .append_query_results([[q1.clone()]])
            // update survey
            .append_query_results([[survey(Some("q1"), Some("q1"))]])
            .into_connection();

        let node = service(db)
            .append_question("s1", append_input("First"))
            .await
            .unwrap();

        assert_eq!(node.question.id, "q1");
        assert_eq!(node.choices.len(), 2);
    }

    #[tokio::test]
    async fn test_append_links_previous_tail() {
        let q1 = question("q1", "s1", None);
        let q2 = question("q2", "s1", None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[survey(Some("q1"), Some("q1"))]])
            .append_query_results([[count(1)]])
            .append_query_results([[q2.clone()]])
            .append_query_results([[choice("c1", "q2", 0)]])
            .append_query_results([[choice("c2", "q2", 1)]])
            // load tail, validate its new next link, update it
            .append_query_results([[q1.clone()]])
            .append_query_results([[q2.clone()]])
            .append_query_results([[question("q1", "s1", Some("q2"))]])
            // validate survey head and tail
            .append_query_results([[q1.clone()]])
            .append_query_results([[q2.clone()]])
            .append_query_results([[survey(Some("q1"), Some("q2"))]])
            .into_connection();

        let node = service(db)
            .append_question("s1", append_input("Second"))
            .await
            .unwrap();

        assert_eq!(node.question.id, "q2");
    }

    #[tokio::test]
    async fn test_append_rejects_full_survey() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[survey(Some("q1"), Some("q15"))]])
            .append_query_results([[count(MAX_QUESTIONS_PER_SURVEY)]])
            .into_connection();

        let result = service(db).append_question("s1", append_input("Extra")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_append_input_limits_choices() {
        let input = AppendQuestionInput {
            text: "Many".to_string(),
            choices: (0..=MAX_CHOICES_PER_QUESTION)
                .map(|i| ChoiceInput {
                    text: format!("Choice {i}"),
                    order: i as i16,
                })
                .collect(),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_add_choice_rejects_full_question() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[question("q1", "s1", None)]])
            .append_query_results([[count(MAX_CHOICES_PER_QUESTION)]])
            .into_connection();

        let result = service(db)
            .add_choice(
                "q1",
                ChoiceInput {
                    text: "Extra".to_string(),
                    order: 9,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_append_to_missing_survey() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<survey::Model>::new()])
            .into_connection();

        let result = service(db).append_question("nope", append_input("Q")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_next_question_rejects_self_loop() {
        let q1 = question("q1", "s1", None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[q1.clone()]])
            .append_query_results([[survey(Some("q1"), Some("q1"))]])
            .append_query_results([[q1]])
            .into_connection();

        let result = service(db).set_next_question("q1", Some("q1")).await;
        assert!(matches!(result, Err(AppError::SelfLoop(_))));
    }

    #[tokio::test]
    async fn test_set_next_question_rejects_foreign_question() {
        let q1 = question("q1", "s1", None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[q1.clone()]])
            .append_query_results([[survey(Some("q1"), Some("q1"))]])
            .append_query_results([[q1]])
            // lookup of the proposed next question
            .append_query_results([[question("q9", "s2", None)]])
            .into_connection();

        let result = service(db).set_next_question("q1", Some("q9")).await;
        assert!(matches!(result, Err(AppError::ScopeMismatch(_))));
    }

    #[tokio::test]
    async fn test_set_next_question_rejects_loop() {
        let q1 = question("q1", "s1", Some("q2"));
        let q2 = question("q2", "s1", None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[q2.clone()]])
            .append_query_results([[survey(Some("q1"), Some("q2"))]])
            .append_query_results([[q1.clone(), q2]])
            .append_query_results([[q1]])
            .into_connection();

        let result = service(db).set_next_question("q2", Some("q1")).await;
        assert!(matches!(result, Err(AppError::SelfLoop(_))));
    }

    #[tokio::test]
    async fn test_set_first_question_rejects_foreign_question() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[survey(None, None)]])
            .append_query_results([Vec::<question::Model>::new()])
            // lookup of the proposed first question
            .append_query_results([[question("q9", "s2", None)]])
            .into_connection();

        let result = service(db).set_first_question("s1", Some("q9")).await;
        assert!(matches!(result, Err(AppError::ScopeMismatch(_))));
    }

    #[tokio::test]
    async fn test_delete_answered_choice_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[choice("c1", "q1", 0)]])
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(1))
            }]])
            .into_connection();

        let result = service(db).delete_choice("c1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_unanswered_choice() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[choice("c1", "q1", 0)]])
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(0))
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert!(service(db).delete_choice("c1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_survey() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = service(db).delete_survey("nope").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_survey_with_graph() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[survey(Some("q1"), Some("q2"))]])
            .append_query_results([[question("q1", "s1", Some("q2")), question("q2", "s1", None)]])
            .append_query_results([[
                choice("c1", "q1", 0),
                choice("c2", "q1", 1),
                choice("c3", "q2", 0),
                choice("c4", "q2", 1),
            ]])
            .into_connection();

        let graph = service(db).get_survey_with_graph("s1").await.unwrap();
        assert_eq!(graph.questions.len(), 2);
        assert_eq!(graph.questions[1].choices[1].id, "c4");
    }
}
