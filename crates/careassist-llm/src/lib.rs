//! Chat-completion client used for symptom analysis.

pub mod client;
pub mod error;

pub use client::{analyze_symptoms, ChatClient};
pub use error::LlmError;
