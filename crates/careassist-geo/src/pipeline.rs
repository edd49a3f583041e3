//! Hospital-proximity pipeline: geocode → places → routing per candidate.

use careassist_core::{
    AppConfig, CandidateFacility, GeocodeStrategy, ProximityOutcome, ProximityQuery,
};
use futures::stream::{self, StreamExt};

use crate::client::GeoapifyClient;

/// Geoapify category used for the places lookup.
pub const HOSPITAL_CATEGORY: &str = "healthcare.hospital";

/// Tunables for one proximity lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximitySettings {
    pub category: String,
    pub radius_m: u32,
    pub limit: u32,
    /// Router calls in flight at once. `1` issues them strictly one at a time.
    pub route_concurrency: usize,
    pub geocode_strategy: GeocodeStrategy,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            category: HOSPITAL_CATEGORY.to_string(),
            radius_m: 35_000,
            limit: 10,
            route_concurrency: 1,
            geocode_strategy: GeocodeStrategy::FirstMatch,
        }
    }
}

impl ProximitySettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            category: HOSPITAL_CATEGORY.to_string(),
            radius_m: config.hospital_radius_m,
            limit: config.hospital_limit,
            route_concurrency: config.route_concurrency,
            geocode_strategy: config.geocode_strategy,
        }
    }
}

/// Run the full proximity lookup for one location string.
///
/// 1. Geocode the text. Any failure ends with `AddressUnresolved`.
/// 2. Search for facilities around the origin. A failure or an empty list
///    ends with `NoFacilitiesFound`.
/// 3. Ask the router for the driving distance to each facility. A failed
///    route marks only that row as unavailable.
/// 4. Return the rows in the order the places lookup produced them.
///
/// Never returns an error: every external failure is folded into the
/// outcome and logged.
pub async fn find_hospitals_near(
    client: &GeoapifyClient,
    settings: &ProximitySettings,
    location: &str,
) -> ProximityQuery {
    let location = location.trim().to_string();

    let origin = match client.geocode(&location, settings.geocode_strategy).await {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "address could not be resolved");
            return ProximityQuery {
                location,
                origin: None,
                outcome: ProximityOutcome::AddressUnresolved,
            };
        }
    };

    let facilities = match client
        .find_nearby(origin, &settings.category, settings.radius_m, settings.limit)
        .await
    {
        Ok(facilities) if !facilities.is_empty() => facilities,
        Ok(_) => {
            tracing::info!(location = %location, %origin, "no facilities within radius");
            return ProximityQuery {
                location,
                origin: Some(origin),
                outcome: ProximityOutcome::NoFacilitiesFound,
            };
        }
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "places lookup failed");
            return ProximityQuery {
                location,
                origin: Some(origin),
                outcome: ProximityOutcome::NoFacilitiesFound,
            };
        }
    };

    // `buffered` yields in input order regardless of completion order.
    let rows: Vec<CandidateFacility> = stream::iter(facilities)
        .map(|facility| async move {
            let distance = client.route_distance(origin, facility.coordinate).await;
            CandidateFacility::from_raw(facility, distance)
        })
        .buffered(settings.route_concurrency.max(1))
        .collect()
        .await;

    let total = rows.len();
    let outcome = ProximityOutcome::Completed(rows);
    tracing::info!(
        location = %location,
        rows = total,
        unavailable = outcome.unavailable_count(),
        "proximity lookup complete"
    );

    ProximityQuery {
        location,
        origin: Some(origin),
        outcome,
    }
}
