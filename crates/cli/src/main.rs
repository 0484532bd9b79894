//! CBC Tutor CLI: the main entry point.
//!
//! Commands:
//! - `chat`     : interactive tutoring session, or one exchange with `-m`
//! - `prompt`   : print the compiled system prompt for a selection
//! - `topics`   : browse tiers, subjects, and key topics
//! - `onboard`  : write a default config file
//! - `status`   : show the effective configuration

use std::path::PathBuf;

use cbc_tutor_core::curriculum::{GradeLevel, LearnerRole};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cbc-tutor",
    about = "CBC Tutor: AI teaching assistant for the Kenyan Competency-Based Curriculum",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.cbc-tutor/config.toml
    #[arg(short, long, global = true, env = "CBC_TUTOR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the tutor
    Chat {
        /// Grade to start in, e.g. "4" or "Grade 4"
        #[arg(long)]
        grade: Option<GradeLevel>,

        /// Subject to start with
        #[arg(long)]
        subject: Option<String>,

        /// "teacher" or "student"
        #[arg(long)]
        role: Option<LearnerRole>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print replies at once instead of word by word
        #[arg(long)]
        no_typing: bool,
    },

    /// Print the system prompt for a grade, subject, and role
    Prompt {
        #[arg(long)]
        grade: GradeLevel,

        #[arg(long)]
        subject: String,

        #[arg(long, default_value = "teacher")]
        role: LearnerRole,
    },

    /// List subjects and key topics
    Topics {
        /// Only show the tier containing this grade
        #[arg(long)]
        grade: Option<GradeLevel>,
    },

    /// Initialize configuration
    Onboard,

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the transcript.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat {
            grade,
            subject,
            role,
            message,
            no_typing,
        } => {
            let args = commands::chat::ChatArgs {
                grade,
                subject,
                role,
                message,
                no_typing,
            };
            commands::chat::run(config_path, args).await?
        }
        Commands::Prompt {
            grade,
            subject,
            role,
        } => commands::prompt::run(grade, &subject, role)?,
        Commands::Topics { grade } => commands::topics::run(grade)?,
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Status => commands::status::run(config_path).await?,
    }

    Ok(())
}
