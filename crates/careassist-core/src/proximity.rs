//! Data model for the hospital-proximity lookup.
//!
//! A [`ProximityQuery`] lives for exactly one user request: the location text
//! goes in, a resolved origin and an ordered list of [`CandidateFacility`]
//! rows come out. Nothing here is cached or persisted.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_ADDRESS: &str = "No address available";

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),

    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] naming the offending component.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            lat: c.lat,
            lon: c.lon,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// One facility as returned by the places lookup, before routing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFacility {
    pub name: Option<String>,
    pub formatted: Option<String>,
    pub coordinate: Coordinate,
}

/// Driving distance to a facility, or an explicit marker that none could be
/// determined. A missing route is never reported as a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "km", rename_all = "snake_case")]
pub enum RouteDistance {
    Kilometers(f64),
    Unavailable,
}

impl RouteDistance {
    /// Converts a service-reported distance in meters.
    ///
    /// Negative or non-finite values map to [`RouteDistance::Unavailable`].
    #[must_use]
    pub fn from_meters(meters: f64) -> Self {
        if meters.is_finite() && meters >= 0.0 {
            RouteDistance::Kilometers(meters / 1000.0)
        } else {
            RouteDistance::Unavailable
        }
    }

    #[must_use]
    pub fn kilometers(&self) -> Option<f64> {
        match self {
            RouteDistance::Kilometers(km) => Some(*km),
            RouteDistance::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, RouteDistance::Kilometers(_))
    }
}

impl fmt::Display for RouteDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDistance::Kilometers(km) => write!(f, "{km}"),
            RouteDistance::Unavailable => write!(f, "N/A"),
        }
    }
}

/// A facility row ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFacility {
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub distance: RouteDistance,
}

impl CandidateFacility {
    #[must_use]
    pub fn from_raw(raw: RawFacility, distance: RouteDistance) -> Self {
        Self {
            name: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            address: raw
                .formatted
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
            coordinate: raw.coordinate,
            distance,
        }
    }
}

/// Terminal state of one proximity lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "facilities", rename_all = "snake_case")]
pub enum ProximityOutcome {
    AddressUnresolved,
    NoFacilitiesFound,
    Completed(Vec<CandidateFacility>),
}

impl ProximityOutcome {
    /// Number of rows whose driving distance could not be determined.
    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        match self {
            ProximityOutcome::Completed(rows) => {
                rows.iter().filter(|r| !r.distance.is_available()).count()
            }
            _ => 0,
        }
    }

    /// User-facing summary of the outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ProximityOutcome::AddressUnresolved => {
                "Invalid address or geocoding failed. Try a different location.".to_string()
            }
            ProximityOutcome::NoFacilitiesFound => {
                "No hospitals found near that location.".to_string()
            }
            ProximityOutcome::Completed(rows) => match self.unavailable_count() {
                0 => format!("Found {} nearby hospitals.", rows.len()),
                n => format!(
                    "Found {} nearby hospitals; driving distance is not available for {n} of them.",
                    rows.len()
                ),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityQuery {
    pub location: String,
    pub origin: Option<Coordinate>,
    pub outcome: ProximityOutcome,
}

impl ProximityQuery {
    #[must_use]
    pub fn facilities(&self) -> &[CandidateFacility] {
        match &self.outcome {
            ProximityOutcome::Completed(rows) => rows,
            _ => &[],
        }
    }
}

const TABLE_HEADERS: [&str; 4] = ["Name", "Address", "Driving Distance (km)", "Coordinates"];

/// Renders facility rows as a plain-text table for terminal output.
#[must_use]
pub fn render_table(rows: &[CandidateFacility]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.address.clone(),
                r.distance.to_string(),
                r.coordinate.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |values: [&str; 4]| {
        let line = values
            .iter()
            .zip(widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "{}", line.trim_end());
    };

    push_row(TABLE_HEADERS);
    push_row(widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str));
    for row in &cells {
        push_row(row.each_ref().map(String::as_str));
    }
    out
}
