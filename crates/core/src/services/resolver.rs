//! Survey resolver: what a respondent should see now.

use std::collections::HashMap;

use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use survey_common::AppResult;
use survey_db::repositories::{
    QuestionRepository, SurveyRepository, SurveyResultChoiceRepository, SurveyResultRepository,
};
use tracing::{debug, warn};

use super::graph::{GraphService, QuestionNode, SurveyGraph};
use super::progress::{ProgressState, current_question};

/// Resolved view of a survey for one respondent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverResult {
    pub survey: SurveyGraph,
    /// Question to render, `None` once the survey is completed.
    pub current_question: Option<QuestionNode>,
    pub state: ProgressState,
    /// Number of answers recorded so far.
    pub answered: u64,
}

/// One recorded answer with its question and choice text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub answer_id: String,
    pub question_id: String,
    pub question_text: String,
    pub choice_id: String,
    pub choice_text: String,
    pub answered_at: DateTimeWithTimeZone,
}

/// Resolver service for the respondent read path.
#[derive(Clone)]
pub struct ResolverService {
    graph: GraphService,
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    result_repo: SurveyResultRepository,
    answer_repo: SurveyResultChoiceRepository,
}

impl ResolverService {
    /// Create a new resolver service.
    #[must_use]
    pub const fn new(
        graph: GraphService,
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        result_repo: SurveyResultRepository,
        answer_repo: SurveyResultChoiceRepository,
    ) -> Self {
        Self {
            graph,
            survey_repo,
            question_repo,
            result_repo,
            answer_repo,
        }
    }

    /// Resolve the current question of a respondent.
    ///
    /// Without a stored result the respondent starts at the first question.
    pub async fn resolve(&self, user_id: &str, survey_id: &str) -> AppResult<ResolverResult> {
        let survey = self.graph.get_survey_with_graph(survey_id).await?;
        let result = self
            .result_repo
            .find_by_user_and_survey(user_id, survey_id)
            .await?;

        let answered = match &result {
            Some(result) => self.answer_repo.count_by_result(&result.id).await?,
            None => 0,
        };
        let state = ProgressState::of(result.as_ref(), answered);
        let current = current_question(&survey, result.as_ref()).cloned();

        debug!(
            user_id = %user_id,
            survey_id = %survey_id,
            state = ?state,
            current_question_id = ?current.as_ref().map(|n| n.question.id.as_str()),
            "Resolved survey"
        );

        Ok(ResolverResult {
            survey,
            current_question: current,
            state,
            answered,
        })
    }

    /// Answers of a respondent in the order they were recorded.
    pub async fn answers(&self, user_id: &str, survey_id: &str) -> AppResult<Vec<AnswerRecord>> {
        self.survey_repo.get_by_id(survey_id).await?;

        let Some(result) = self
            .result_repo
            .find_by_user_and_survey(user_id, survey_id)
            .await?
        else {
            return Ok(vec![]);
        };

        let question_text: HashMap<String, String> = self
            .question_repo
            .find_by_survey(survey_id)
            .await?
            .into_iter()
            .map(|q| (q.id, q.text))
            .collect();

        let rows = self
            .answer_repo
            .find_by_result_with_choice(&result.id)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for (answer, choice) in rows {
            let Some(choice) = choice else {
                warn!(answer_id = %answer.id, choice_id = %answer.choice_id, "Answer without choice");
                continue;
            };
            records.push(AnswerRecord {
                answer_id: answer.id,
                question_text: question_text
                    .get(&choice.question_id)
                    .cloned()
                    .unwrap_or_default(),
                question_id: choice.question_id,
                choice_id: choice.id,
                choice_text: choice.text,
                answered_at: answer.created_at,
            });
        }

        Ok(records)
    }
}
