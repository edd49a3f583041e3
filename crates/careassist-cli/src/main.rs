mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "careassist-cli")]
#[command(about = "Healthcare assistant command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ask the assistant about a set of symptoms
    Analyze {
        /// Free-text description of the symptoms
        text: String,
        /// Also write the assessment as a PDF report to this path
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Also email the PDF report to this address
        #[arg(long)]
        email: Option<String>,
    },
    /// List hospitals near a location with driving distances
    Hospitals {
        /// City or street address (e.g. "Lahore, Pakistan")
        location: String,
    },
    /// Render a text file as a PDF report
    Report {
        /// Plain-text file with the report contents
        text_file: PathBuf,
        /// Where to write the PDF
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(
            std::env::var("CAREASSIST_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        )
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze { text, pdf, email }) => {
            let config = careassist_core::load_app_config()?;
            commands::run_analyze(&config, &text, pdf.as_deref(), email.as_deref()).await?;
        }
        Some(Commands::Hospitals { location }) => {
            let config = careassist_core::load_app_config()?;
            commands::run_hospitals(&config, &location).await?;
        }
        Some(Commands::Report { text_file, out }) => {
            commands::run_report(&text_file, &out)?;
        }
        None => println!("careassist-cli: run with --help to see available commands"),
    }

    Ok(())
}
