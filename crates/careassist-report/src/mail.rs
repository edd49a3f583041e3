//! Email delivery of the rendered report.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::ReportError;
use crate::pdf::REPORT_FILE_NAME;

pub const REPORT_SUBJECT: &str = "Your Healthcare Report";
pub const REPORT_BODY: &str = "Attached is your AI-generated healthcare report.";

fn parse_mailbox(address: &str) -> Result<Mailbox, ReportError> {
    let address = address.trim();
    address
        .parse::<Mailbox>()
        .map_err(|e| ReportError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Builds the report email: a plain-text note plus the PDF attachment.
///
/// # Errors
///
/// Returns [`ReportError::InvalidAddress`] if either address does not parse,
/// or [`ReportError::Message`] / [`ReportError::ContentType`] if the message
/// cannot be assembled.
pub fn build_report_message(
    sender: &str,
    recipient: &str,
    pdf: Vec<u8>,
) -> Result<Message, ReportError> {
    let attachment = Attachment::new(REPORT_FILE_NAME.to_string())
        .body(pdf, ContentType::parse("application/pdf")?);

    let message = Message::builder()
        .from(parse_mailbox(sender)?)
        .to(parse_mailbox(recipient)?)
        .subject(REPORT_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(REPORT_BODY.to_string()))
                .singlepart(attachment),
        )?;
    Ok(message)
}

/// Delivers a rendered report to one recipient.
///
/// Each call is one delivery attempt; there is no retry.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(&self, recipient: &str, pdf: Vec<u8>) -> Result<(), ReportError>;
}

/// Port on which the relay expects TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from connect (port 465).
    ImplicitTls,
    /// Plain connect upgraded with `STARTTLS` (587 and everything else).
    StartTls,
}

impl SmtpSecurity {
    #[must_use]
    pub fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            SmtpSecurity::ImplicitTls
        } else {
            SmtpSecurity::StartTls
        }
    }
}

/// SMTP delivery with login credentials. Port 465 uses implicit TLS, any
/// other port requires `STARTTLS`.
pub struct SmtpMailer {
    sender: String,
    security: SmtpSecurity,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// Returns [`ReportError::Smtp`] if the relay cannot be configured, or
    /// [`ReportError::InvalidAddress`] if `sender` is not a valid address.
    pub fn new(
        host: &str,
        port: u16,
        sender: &str,
        password: &str,
        timeout_secs: u64,
    ) -> Result<Self, ReportError> {
        parse_mailbox(sender)?;
        let security = SmtpSecurity::for_port(port);
        let builder = match security {
            SmtpSecurity::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
        };
        let transport = builder
            .port(port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .timeout(Some(Duration::from_secs(timeout_secs)))
            .build();
        tracing::debug!(host, port, ?security, "configured SMTP relay");
        Ok(Self {
            sender: sender.to_string(),
            security,
            transport,
        })
    }

    #[must_use]
    pub fn security(&self) -> SmtpSecurity {
        self.security
    }
}

#[async_trait]
impl ReportMailer for SmtpMailer {
    async fn send_report(&self, recipient: &str, pdf: Vec<u8>) -> Result<(), ReportError> {
        let message = build_report_message(&self.sender, recipient, pdf)?;
        let response = self.transport.send(message).await?;
        tracing::info!(code = %response.code(), "report email accepted by relay");
        Ok(())
    }
}
