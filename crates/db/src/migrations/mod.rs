//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_survey_table;
mod m20250101_000002_create_question_table;
mod m20250101_000003_add_survey_chain_links;
mod m20250101_000004_create_choice_table;
mod m20250101_000005_create_survey_result_table;
mod m20250101_000006_create_survey_result_choice_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_survey_table::Migration),
            Box::new(m20250101_000002_create_question_table::Migration),
            Box::new(m20250101_000003_add_survey_chain_links::Migration),
            Box::new(m20250101_000004_create_choice_table::Migration),
            Box::new(m20250101_000005_create_survey_result_table::Migration),
            Box::new(m20250101_000006_create_survey_result_choice_table::Migration),
        ]
    }
}
