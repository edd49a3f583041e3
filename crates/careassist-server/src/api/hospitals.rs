use axum::{
    extract::{Query, State},
    Extension, Json,
};
use careassist_core::{CandidateFacility, Coordinate, ProximityOutcome};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct HospitalsQuery {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub(super) struct HospitalsData {
    pub location: String,
    pub origin: Option<Coordinate>,
    pub facilities: Vec<CandidateFacility>,
    /// True when at least one driving distance could not be computed.
    pub partial: bool,
    pub unavailable_count: usize,
    pub message: String,
}

pub(super) async fn search_hospitals(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<HospitalsQuery>,
) -> Result<Json<ApiResponse<HospitalsData>>, ApiError> {
    let query =
        careassist_geo::find_hospitals_near(&state.geo, &state.proximity, &params.location).await;
    let message = query.outcome.message();
    let unavailable_count = query.outcome.unavailable_count();

    let facilities = match query.outcome {
        ProximityOutcome::AddressUnresolved => {
            return Err(ApiError::new(req_id.0, "address_unresolved", message));
        }
        ProximityOutcome::NoFacilitiesFound => {
            return Err(ApiError::new(req_id.0, "no_facilities", message));
        }
        ProximityOutcome::Completed(rows) => rows,
    };

    Ok(ApiResponse::new(
        req_id.0,
        HospitalsData {
            location: query.location,
            origin: query.origin,
            facilities,
            partial: unavailable_count > 0,
            unavailable_count,
            message,
        },
    ))
}
