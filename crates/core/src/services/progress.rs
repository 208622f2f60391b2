//! Respondent progress through a survey.
//!
//! The cursor (`survey_result.current_question_id`) is stored on the result,
//! so nothing here walks the answer history.

use serde::Serialize;
use survey_common::{AppError, AppResult};
use survey_db::entities::{question, survey_result};

use super::graph::{QuestionNode, SurveyGraph};

/// Where a respondent stands in a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    /// No answer recorded yet.
    NotStarted,
    /// The cursor points at the next question to answer.
    InProgress,
    /// The last question of the chain has been answered. Terminal.
    Completed,
}

impl ProgressState {
    /// Derive the state from the stored result and its number of answers.
    #[must_use]
    pub const fn of(result: Option<&survey_result::Model>, answered: u64) -> Self {
        match result {
            None => Self::NotStarted,
            Some(result) if result.current_question_id.is_some() => Self::InProgress,
            Some(_) if answered > 0 => Self::Completed,
            Some(_) => Self::NotStarted,
        }
    }

    /// Whether the survey has been completed.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// ID of the question the respondent should see now.
///
/// Without a result this is the head of the chain, otherwise the cursor.
#[must_use]
pub fn current_question_id<'a>(
    survey: &'a SurveyGraph,
    result: Option<&'a survey_result::Model>,
) -> Option<&'a str> {
    match result {
        None => survey.survey.first_question_id.as_deref(),
        Some(result) => result.current_question_id.as_deref(),
    }
}

/// Question the respondent should see now, `None` once the chain is exhausted.
#[must_use]
pub fn current_question<'a>(
    survey: &'a SurveyGraph,
    result: Option<&'a survey_result::Model>,
) -> Option<&'a QuestionNode> {
    current_question_id(survey, result).and_then(|id| survey.node(id))
}

/// Cursor value after answering `answered`. Null at the end of the chain.
#[must_use]
pub fn advance(answered: &question::Model) -> Option<String> {
    answered.next_id.clone()
}

/// Reject answers to anything but the question at the cursor.
pub fn ensure_expected(
    result: &survey_result::Model,
    answered: &question::Model,
) -> AppResult<()> {
    match result.current_question_id.as_deref() {
        Some(current) if current == answered.id => Ok(()),
        Some(current) => Err(AppError::OutOfOrder(format!(
            "Expected an answer to question {current}, got question {}",
            answered.id
        ))),
        None => Err(AppError::OutOfOrder(format!(
            "Survey {} has no question left to answer",
            result.survey_id
        ))),
    }
}
