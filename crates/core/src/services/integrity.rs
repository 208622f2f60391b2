//! Structural integrity checks for the survey graph.
//!
//! The `check_*` functions are pure predicates over a proposed entity state
//! and the rows it links to. [`IntegrityValidator`] performs the lookups on
//! the caller's connection, so a check inside a transaction sees rows
//! written earlier in the same transaction.

use std::collections::{HashMap, HashSet};

use sea_orm::ConnectionTrait;
use survey_common::{AppError, AppResult};
use survey_db::{
    entities::{choice, question, survey, survey_result},
    repositories::QuestionRepository,
};

/// Check that a link held by `survey_id` points at a question of the same survey.
fn check_owned_by_survey(
    survey_id: &str,
    link: &str,
    target_id: &str,
    target: Option<&question::Model>,
) -> AppResult<()> {
    match target {
        Some(question) if question.id == target_id && question.survey_id == survey_id => Ok(()),
        Some(question) => Err(AppError::ScopeMismatch(format!(
            "{link} {target_id} belongs to survey {}, not {survey_id}",
            question.survey_id
        ))),
        None => Err(AppError::ScopeMismatch(format!(
            "{link} {target_id} does not exist in survey {survey_id}"
        ))),
    }
}

/// Check the head and tail links of a survey.
pub fn check_survey_links(
    survey: &survey::Model,
    first: Option<&question::Model>,
    last: Option<&question::Model>,
) -> AppResult<()> {
    if let Some(first_id) = survey.first_question_id.as_deref() {
        check_owned_by_survey(&survey.id, "First question", first_id, first)?;
    }
    if let Some(last_id) = survey.last_question_id.as_deref() {
        check_owned_by_survey(&survey.id, "Last question", last_id, last)?;
    }
    Ok(())
}

/// Check the `next` link of a question.
pub fn check_question_links(
    question: &question::Model,
    next: Option<&question::Model>,
) -> AppResult<()> {
    let Some(next_id) = question.next_id.as_deref() else {
        return Ok(());
    };

    if next_id == question.id {
        return Err(AppError::SelfLoop(format!(
            "Question {} cannot be its own next question",
            question.id
        )));
    }

    check_owned_by_survey(&question.survey_id, "Next question", next_id, next)
}

/// Check that an answered question belongs to the survey of the result.
pub fn check_answer_scope(
    result: &survey_result::Model,
    answered: &question::Model,
) -> AppResult<()> {
    if result.survey_id == answered.survey_id {
        Ok(())
    } else {
        Err(AppError::ScopeMismatch(format!(
            "Question {} belongs to survey {}, but result {} is for survey {}",
            answered.id, answered.survey_id, result.id, result.survey_id
        )))
    }
}

/// Questions visited by following `next` links from a starting question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainWalk {
    /// Visited question IDs in chain order.
    pub order: Vec<String>,
    /// Question that was reached a second time, if the chain loops.
    pub looped_at: Option<String>,
}

impl ChainWalk {
    /// Last question of the walk (the chain tail when there is no loop).
    #[must_use]
    pub fn tail(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }
}

/// Follow `next` links from `start` through `next_of` (question ID to next ID).
///
/// Stops at a null link, at an ID missing from `next_of`, or when a question
/// is reached twice.
#[must_use]
pub fn walk_chain(start: Option<&str>, next_of: &HashMap<String, Option<String>>) -> ChainWalk {
    let mut walk = ChainWalk::default();
    let mut visited = HashSet::new();
    let mut current = start;

    while let Some(id) = current {
        if !visited.insert(id) {
            walk.looped_at = Some(id.to_string());
            break;
        }
        let Some(next) = next_of.get(id) else {
            break;
        };
        walk.order.push(id.to_string());
        current = next.as_deref();
    }

    walk
}

/// Reject a chain that loops back on itself.
pub fn check_acyclic(walk: &ChainWalk) -> AppResult<()> {
    match &walk.looped_at {
        Some(id) => Err(AppError::SelfLoop(format!(
            "Question chain loops back to question {id}"
        ))),
        None => Ok(()),
    }
}

/// Runs the integrity checks against storage.
#[derive(Clone)]
pub struct IntegrityValidator {
    question_repo: QuestionRepository,
}

impl IntegrityValidator {
    /// Create a new validator.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository) -> Self {
        Self { question_repo }
    }

    async fn lookup<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Option<&str>,
    ) -> AppResult<Option<question::Model>> {
        match id {
            Some(id) => self.question_repo.find_by_id_in(conn, id).await,
            None => Ok(None),
        }
    }

    /// Validate the head and tail links of a proposed survey state.
    pub async fn validate_survey_links<C: ConnectionTrait>(
        &self,
        conn: &C,
        survey: &survey::Model,
    ) -> AppResult<()> {
        let first = self
            .lookup(conn, survey.first_question_id.as_deref())
            .await?;
        let last = if survey.last_question_id == survey.first_question_id {
            first.clone()
        } else {
            self.lookup(conn, survey.last_question_id.as_deref())
                .await?
        };
        check_survey_links(survey, first.as_ref(), last.as_ref())
    }

    /// Validate the `next` link of a proposed question state.
    pub async fn validate_question_links<C: ConnectionTrait>(
        &self,
        conn: &C,
        question: &question::Model,
    ) -> AppResult<()> {
        if question.next_id.as_deref() == Some(question.id.as_str()) {
            return check_question_links(question, None);
        }
        let next = self.lookup(conn, question.next_id.as_deref()).await?;
        check_question_links(question, next.as_ref())
    }

    /// Validate that a choice may be recorded as an answer of a result.
    pub async fn validate_answer_scope<C: ConnectionTrait>(
        &self,
        conn: &C,
        result: &survey_result::Model,
        choice: &choice::Model,
    ) -> AppResult<()> {
        let answered = self
            .question_repo
            .get_by_id_in(conn, &choice.question_id)
            .await?;
        check_answer_scope(result, &answered)
    }
}
