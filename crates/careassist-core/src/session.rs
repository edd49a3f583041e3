//! Request-scoped UI state.
//!
//! The browser holds a [`SessionState`] and posts it with every action; each
//! handler applies one transition and returns the new value. The server keeps
//! no session storage of its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no assessment yet: analyze symptoms first")]
    NoAssessment,

    #[error("no report yet: generate the PDF first")]
    ReportNotGenerated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub theme: Theme,
    pub assessment: Option<String>,
    pub report_ready: bool,
}

impl SessionState {
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Stores a fresh assessment. Any previously generated report is stale.
    pub fn record_assessment(&mut self, text: impl Into<String>) {
        self.assessment = Some(text.into());
        self.report_ready = false;
    }

    /// # Errors
    ///
    /// Returns [`SessionError::NoAssessment`] when there is nothing to render.
    pub fn mark_report_generated(&mut self) -> Result<(), SessionError> {
        if self.assessment.is_none() {
            return Err(SessionError::NoAssessment);
        }
        self.report_ready = true;
        Ok(())
    }

    /// Returns the assessment text backing the generated report.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ReportNotGenerated`] until
    /// [`mark_report_generated`](Self::mark_report_generated) has succeeded.
    pub fn require_report(&self) -> Result<&str, SessionError> {
        match (&self.assessment, self.report_ready) {
            (Some(text), true) => Ok(text),
            (None, _) => Err(SessionError::NoAssessment),
            (Some(_), false) => Err(SessionError::ReportNotGenerated),
        }
    }
}
