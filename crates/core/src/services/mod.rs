//! Survey services.

#![allow(missing_docs)]

pub mod answer;
pub mod graph;
pub mod integrity;
pub mod progress;
pub mod resolver;
pub mod retry;

pub use answer::AnswerService;
pub use graph::{
    AppendQuestionInput, ChoiceInput, CreateSurveyInput, GraphService, QuestionNode, SurveyGraph,
    UpdateChoiceInput,
};
pub use integrity::IntegrityValidator;
pub use progress::ProgressState;
pub use resolver::{AnswerRecord, ResolverResult, ResolverService};
pub use retry::RetryPolicy;
