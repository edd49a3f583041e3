//! Shared domain types and configuration for the healthcare assistant.

mod app_config;
mod config;
pub mod proximity;
pub mod session;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, GeocodeStrategy};
pub use config::{load_app_config, load_app_config_from_env};
pub use proximity::{
    render_table, CandidateFacility, Coordinate, CoordinateError, ProximityOutcome,
    ProximityQuery, RawFacility, RouteDistance,
};
pub use session::{SessionError, SessionState, Theme};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
