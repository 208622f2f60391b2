//! Database repositories.
//!
//! Repositories wrap a shared [`sea_orm::DatabaseConnection`]. Methods
//! suffixed with `_in` run on a caller-supplied connection so that services
//! can compose them inside one transaction.

pub mod choice;
pub mod question;
pub mod survey;
pub mod survey_result;

pub use choice::ChoiceRepository;
pub use question::QuestionRepository;
pub use survey::SurveyRepository;
pub use survey_result::{SurveyResultChoiceRepository, SurveyResultRepository};
