//! Database entities.

#![allow(missing_docs)]

pub mod choice;
pub mod question;
pub mod survey;
pub mod survey_result;
pub mod survey_result_choice;

pub use choice::Entity as Choice;
pub use question::Entity as Question;
pub use survey::Entity as Survey;
pub use survey_result::Entity as SurveyResult;
pub use survey_result_choice::Entity as SurveyResultChoice;
