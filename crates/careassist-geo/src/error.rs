use thiserror::Error;

/// Errors returned by the Geoapify client.
///
/// The pipeline collapses these into terminal outcomes; they stay distinct here
/// so logs say why a lookup failed.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: &'static str },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no geocoding match for \"{0}\"")]
    NoMatch(String),

    #[error("no drivable route between the requested points")]
    NoRoute,

    #[error("location text is empty")]
    BlankQuery,

    #[error("feature has no lat/lon")]
    MissingCoordinate,

    #[error("service returned an invalid coordinate: {0}")]
    InvalidCoordinate(#[from] careassist_core::CoordinateError),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeoError {
    /// `true` when the failure came from the transport deadline.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, GeoError::Http(e) if e.is_timeout())
    }
}
