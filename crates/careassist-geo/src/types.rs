//! Typed views of the Geoapify GeoJSON responses.
//!
//! Only the fields the assistant reads are modelled. Every numeric field is
//! optional so a malformed entry is rejected at conversion time instead of
//! failing the whole response.

use careassist_core::{Coordinate, RawFacility};
use serde::Deserialize;

use crate::error::GeoError;

#[derive(Debug, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(default = "Vec::new")]
    pub features: Vec<Feature<P>>,
}

#[derive(Debug, Deserialize)]
pub struct Feature<P> {
    pub properties: P,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeProperties {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub rank: Option<Rank>,
}

#[derive(Debug, Deserialize)]
pub struct Rank {
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceProperties {
    pub name: Option<String>,
    pub formatted: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RouteProperties {
    pub distance: Option<f64>,
}

pub type GeocodeResponse = FeatureCollection<GeocodeProperties>;
pub type PlacesResponse = FeatureCollection<PlaceProperties>;
pub type RouteResponse = FeatureCollection<RouteProperties>;

fn coordinate(lat: Option<f64>, lon: Option<f64>) -> Result<Coordinate, GeoError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)?),
        _ => Err(GeoError::MissingCoordinate),
    }
}

impl GeocodeProperties {
    /// # Errors
    ///
    /// Returns [`GeoError`] if `lat`/`lon` are missing or out of range.
    pub fn coordinate(&self) -> Result<Coordinate, GeoError> {
        coordinate(self.lat, self.lon)
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.rank
            .as_ref()
            .and_then(|r| r.confidence)
            .filter(|c| c.is_finite())
            .unwrap_or(0.0)
    }
}

impl TryFrom<PlaceProperties> for RawFacility {
    type Error = GeoError;

    fn try_from(props: PlaceProperties) -> Result<Self, Self::Error> {
        Ok(RawFacility {
            coordinate: coordinate(props.lat, props.lon)?,
            name: props.name,
            formatted: props.formatted,
        })
    }
}
