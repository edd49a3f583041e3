//! Command handlers for the CLI.
//!
//! `analyze` and `hospitals` need the full configuration (API keys); `report`
//! works offline and only touches the filesystem.

use std::path::Path;

use anyhow::Context;
use careassist_core::{render_table, AppConfig, ProximityOutcome};
use careassist_geo::{GeoapifyClient, ProximitySettings};
use careassist_llm::ChatClient;
use careassist_report::{render_pdf, ReportMailer, SmtpMailer};

/// Analyze symptoms, print the assessment, and optionally save and/or email
/// it as a PDF.
///
/// # Errors
///
/// Returns an error if the chat call fails, the PDF cannot be written, or the
/// email cannot be delivered.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    text: &str,
    pdf_path: Option<&Path>,
    email: Option<&str>,
) -> anyhow::Result<()> {
    let client = ChatClient::with_base_url(
        &config.groq_api_key,
        &config.chat_model,
        config.http_timeout_secs,
        &config.chat_base_url,
    )?;
    let assessment = careassist_llm::analyze_symptoms(&client, text).await?;
    println!("{assessment}");

    if pdf_path.is_none() && email.is_none() {
        return Ok(());
    }

    let pdf = render_pdf(&assessment)?;
    if let Some(path) = pdf_path {
        write_pdf(path, &pdf)?;
        println!("report saved to {}", path.display());
    }
    if let Some(recipient) = email {
        let mailer = SmtpMailer::new(
            &config.smtp_host,
            config.smtp_port,
            &config.gmail_address,
            &config.gmail_app_password,
            config.http_timeout_secs,
        )?;
        mailer.send_report(recipient, pdf).await?;
        println!("report emailed to {}", recipient.trim());
    }
    Ok(())
}

/// Look up hospitals near `location` and print them as a table.
///
/// Lookup failures are reported as the outcome message, not as an error.
///
/// # Errors
///
/// Returns an error only if the Geoapify client cannot be constructed.
pub(crate) async fn run_hospitals(config: &AppConfig, location: &str) -> anyhow::Result<()> {
    let client = GeoapifyClient::with_base_url(
        &config.geoapify_api_key,
        config.http_timeout_secs,
        &config.user_agent,
        &config.geoapify_base_url,
    )?;
    let settings = ProximitySettings::from_app_config(config);

    let query = careassist_geo::find_hospitals_near(&client, &settings, location).await;
    if let ProximityOutcome::Completed(rows) = &query.outcome {
        print!("{}", render_table(rows));
    }
    println!("{}", query.outcome.message());
    Ok(())
}

/// Render the contents of `text_file` to a PDF at `out`.
///
/// # Errors
///
/// Returns an error if the input cannot be read, is blank, or the output
/// cannot be written.
pub(crate) fn run_report(text_file: &Path, out: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(text_file)
        .with_context(|| format!("failed to read {}", text_file.display()))?;
    let pdf = render_pdf(&text)?;
    write_pdf(out, &pdf)?;
    println!("report saved to {}", out.display());
    Ok(())
}

fn write_pdf(path: &Path, pdf: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, pdf).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = pdf.len(), "wrote PDF report");
    Ok(())
}
