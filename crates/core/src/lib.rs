//! Core survey logic: graph authoring, integrity checks, progress tracking,
//! answer recording and resolving.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use survey_common::{AnswerConfig, IdGenerator};
use survey_db::repositories::{
    ChoiceRepository, QuestionRepository, SurveyRepository, SurveyResultChoiceRepository,
    SurveyResultRepository,
};

pub mod services;

pub use services::*;

/// The services of the survey engine, wired to one connection pool.
#[derive(Clone)]
pub struct SurveyServices {
    /// Survey authoring and loading.
    pub graph: GraphService,
    /// Respondent read path.
    pub resolver: ResolverService,
    /// Answer submission.
    pub answers: AnswerService,
}

impl SurveyServices {
    /// Wire all services to `db`, sharing one ID generator.
    #[must_use]
    pub fn new(db: &Arc<DatabaseConnection>, answers: &AnswerConfig) -> Self {
        let survey_repo = SurveyRepository::new(Arc::clone(db));
        let question_repo = QuestionRepository::new(Arc::clone(db));
        let choice_repo = ChoiceRepository::new(Arc::clone(db));
        let result_repo = SurveyResultRepository::new(Arc::clone(db));
        let answer_repo = SurveyResultChoiceRepository::new(Arc::clone(db));
        let id_gen = IdGenerator::new();

        let graph = GraphService::new(
            survey_repo.clone(),
            question_repo.clone(),
            choice_repo.clone(),
            answer_repo.clone(),
            id_gen.clone(),
        );
        let resolver = ResolverService::new(
            graph.clone(),
            survey_repo.clone(),
            question_repo.clone(),
            result_repo.clone(),
            answer_repo.clone(),
        );
        let answer_service = AnswerService::new(
            survey_repo,
            question_repo,
            choice_repo,
            result_repo,
            answer_repo,
            resolver.clone(),
            id_gen,
        )
        .with_retry_policy(RetryPolicy::from(answers));

        Self {
            graph,
            resolver,
            answers: answer_service,
        }
    }
}
