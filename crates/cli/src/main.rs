//! Survey command line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use survey_common::Config;
use survey_core::{AppendQuestionInput, ChoiceInput, CreateSurveyInput, SurveyServices};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "survey", version, about = "Author surveys and record answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: config/default.toml and SURVEY__* env vars)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Create an empty survey
    CreateSurvey {
        /// Survey title
        title: String,

        /// Author ID
        #[arg(short, long)]
        author: String,
    },

    /// Append a question to the end of a survey
    AddQuestion {
        /// Survey ID
        survey_id: String,

        /// Question text
        text: String,

        /// Choice text, repeat for each choice in display order
        #[arg(short, long = "choice", required = true)]
        choices: Vec<String>,
    },

    /// Show a survey, or what a respondent should answer next
    Show {
        /// Survey ID
        survey_id: String,

        /// Respondent ID
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Record a respondent's answer
    Answer {
        /// Survey ID
        survey_id: String,

        /// Chosen choice ID
        choice_id: String,

        /// Respondent ID
        #[arg(short, long)]
        user: String,
    },

    /// List a respondent's answers in the order they were given
    History {
        /// Survey ID
        survey_id: String,

        /// Respondent ID
        #[arg(short, long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "survey=debug,sea_orm=info"
    } else {
        "survey=info,sea_orm=warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let db = survey_db::init(&config)
        .await
        .context("Failed to connect to database")?;

    if matches!(cli.command, Commands::Migrate) {
        survey_db::migrate(&db).await?;
        info!("Migrations completed");
        return Ok(());
    }

    let db = Arc::new(db);
    let services = SurveyServices::new(&db, &config.answers);

    match cli.command {
        Commands::Migrate => {}
        Commands::CreateSurvey { title, author } => {
            let survey = services
                .graph
                .create_survey(&author, CreateSurveyInput { title })
                .await?;
            print_json(&survey)?;
        }
        Commands::AddQuestion {
            survey_id,
            text,
            choices,
        } => {
            let choices = choices
                .into_iter()
                .enumerate()
                .map(|(order, text)| ChoiceInput {
                    text,
                    order: i16::try_from(order).unwrap_or(i16::MAX),
                })
                .collect();
            let node = services
                .graph
                .append_question(&survey_id, AppendQuestionInput { text, choices })
                .await?;
            print_json(&node)?;
        }
        Commands::Show { survey_id, user } => match user {
            Some(user) => print_json(&services.resolver.resolve(&user, &survey_id).await?)?,
            None => print_json(&services.graph.get_survey_with_graph(&survey_id).await?)?,
        },
        Commands::Answer {
            survey_id,
            choice_id,
            user,
        } => {
            let resolved = services
                .answers
                .submit_answer_with_retry(&user, &survey_id, &choice_id)
                .await?;
            print_json(&resolved)?;
        }
        Commands::History { survey_id, user } => {
            print_json(&services.resolver.answers(&user, &survey_id).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
