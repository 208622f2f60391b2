//! Answer recorder.
//!
//! The first answer of a respondent creates their result and may be for any
//! question of the survey; the cursor moves to that question's next. After
//! that, submissions follow a strict order: each answer must be for the
//! question at the cursor, and a completed result accepts no further answers.

use chrono::Utc;
use sea_orm::Set;
use survey_common::{AppError, AppResult, IdGenerator};
use survey_db::{
    entities::{survey_result, survey_result_choice},
    map_db_err,
    repositories::{
        ChoiceRepository, QuestionRepository, SurveyRepository, SurveyResultChoiceRepository,
        SurveyResultRepository,
    },
};
use tracing::{info, warn};

use super::integrity::IntegrityValidator;
use super::progress::{advance, ensure_expected};
use super::resolver::{ResolverResult, ResolverService};
use super::retry::RetryPolicy;

/// Answer service for recording respondent submissions.
#[derive(Clone)]
pub struct AnswerService {
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    result_repo: SurveyResultRepository,
    answer_repo: SurveyResultChoiceRepository,
    validator: IntegrityValidator,
    resolver: ResolverService,
    retry: RetryPolicy,
    id_gen: IdGenerator,
}

impl AnswerService {
    /// Create a new answer service with the default retry policy.
    #[must_use]
    pub fn new(
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        choice_repo: ChoiceRepository,
        result_repo: SurveyResultRepository,
        answer_repo: SurveyResultChoiceRepository,
        resolver: ResolverService,
        id_gen: IdGenerator,
    ) -> Self {
        Self {
            validator: IntegrityValidator::new(question_repo.clone()),
            survey_repo,
            question_repo,
            choice_repo,
            result_repo,
            answer_repo,
            resolver,
            retry: RetryPolicy::default(),
            id_gen,
        }
    }

    /// Use a different retry policy for [`Self::submit_answer_with_retry`].
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Record an answer and return the respondent's new state.
    pub async fn submit_answer(
        &self,
        user_id: &str,
        survey_id: &str,
        choice_id: &str,
    ) -> AppResult<ResolverResult> {
        self.record_answer(user_id, survey_id, choice_id).await?;
        self.resolver.resolve(user_id, survey_id).await
    }

    /// Like [`Self::submit_answer`], retrying transient failures with backoff.
    pub async fn submit_answer_with_retry(
        &self,
        user_id: &str,
        survey_id: &str,
        choice_id: &str,
    ) -> AppResult<ResolverResult> {
        let mut attempt = 0;
        loop {
            match self.record_answer(user_id, survey_id, choice_id).await {
                Ok(_) => break,
                Err(e) if e.is_retryable() => {
                    if !self.retry.should_retry(attempt) {
                        warn!(
                            user_id = %user_id,
                            survey_id = %survey_id,
                            attempts = attempt + 1,
                            error = %e,
                            "Giving up on answer submission"
                        );
                        return Err(AppError::Concurrency(
                            "Answer could not be recorded, please try again".to_string(),
                        ));
                    }

                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        user_id = %user_id,
                        survey_id = %survey_id,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Retrying answer submission"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.resolver.resolve(user_id, survey_id).await
    }

    /// Record an answer in one transaction and advance the cursor.
    pub async fn record_answer(
        &self,
        user_id: &str,
        survey_id: &str,
        choice_id: &str,
    ) -> AppResult<survey_result_choice::Model> {
        let txn = self.survey_repo.begin().await?;

        let survey = self.survey_repo.get_by_id_in(&txn, survey_id).await?;
        let choice = self.choice_repo.get_by_id_in(&txn, choice_id).await?;
        let question = self
            .question_repo
            .get_by_id_in(&txn, &choice.question_id)
            .await?;
        if question.survey_id != survey.id {
            return Err(AppError::ScopeMismatch(format!(
                "Choice {choice_id} belongs to survey {}, not {survey_id}",
                question.survey_id
            )));
        }

        let created_at = Utc::now();
        let created = self
            .result_repo
            .insert_if_absent_in(
                &txn,
                survey_result::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    survey_id: Set(survey.id.clone()),
                    current_question_id: Set(Some(question.id.clone())),
                    created_at: Set(created_at.into()),
                    updated_at: Set(created_at.into()),
                },
            )
            .await?;

        // Lost the insert race to a transaction that has not committed yet
        let result = self
            .result_repo
            .lock_by_user_and_survey_in(&txn, user_id, survey_id)
            .await?
            .ok_or_else(|| {
                AppError::DuplicateResult(format!("Result of {user_id} for survey {survey_id}"))
            })?;

        // Taken under the row lock so history timestamps follow commit order
        let now = Utc::now();

        if !created {
            ensure_expected(&result, &question)?;
        }
        self.validator
            .validate_answer_scope(&txn, &result, &choice)
            .await?;

        let answer = self
            .answer_repo
            .create_in(
                &txn,
                survey_result_choice::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    result_id: Set(result.id.clone()),
                    choice_id: Set(choice.id.clone()),
                    created_at: Set(now.into()),
                },
            )
            .await?;

        let next = advance(&question);
        let mut active: survey_result::ActiveModel = result.into();
        active.current_question_id = Set(next.clone());
        active.updated_at = Set(now.into());
        self.result_repo.update_in(&txn, active).await?;

        txn.commit().await.map_err(map_db_err)?;

        info!(
            user_id = %user_id,
            survey_id = %survey_id,
            question_id = %question.id,
            choice_id = %choice_id,
            new_result = created,
            next_question_id = ?next,
            "Recorded answer"
        );

        Ok(answer)
    }
}
