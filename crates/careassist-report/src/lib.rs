//! Healthcare report rendering and delivery.
//!
//! [`render_pdf`] turns an assessment into PDF bytes; [`ReportMailer`]
//! delivers those bytes as an email attachment.

pub mod error;
pub mod mail;
pub mod pdf;

pub use error::ReportError;
pub use mail::{
    build_report_message, ReportMailer, SmtpMailer, SmtpSecurity, IMPLICIT_TLS_PORT, REPORT_BODY,
    REPORT_SUBJECT,
};
pub use pdf::{render_pdf, REPORT_FILE_NAME};
