//! HTTP client for the Geoapify geocoding, places and routing APIs.
//!
//! Wraps `reqwest` with API key management, per-call timeouts and typed
//! response parsing. Each method issues exactly one request and never retries.

use std::time::Duration;

use careassist_core::{Coordinate, GeocodeStrategy, RawFacility, RouteDistance};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::GeoError;
use crate::types::{GeocodeResponse, PlacesResponse, RouteResponse};

const DEFAULT_BASE_URL: &str = "https://api.geoapify.com/";

/// Client for the Geoapify REST APIs.
///
/// Use [`GeoapifyClient::new`] for production or
/// [`GeoapifyClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct GeoapifyClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for GeoapifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoapifyClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl GeoapifyClient {
    /// Creates a new client pointed at the production Geoapify API.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeoError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so relative endpoint paths join under it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Resolves free-form location text to a coordinate.
    ///
    /// Blank text fails without a network call. When the service returns
    /// several matches, `strategy` decides which one wins.
    ///
    /// # Errors
    ///
    /// - [`GeoError::BlankQuery`] for empty or whitespace-only text.
    /// - [`GeoError::Http`] / [`GeoError::UnexpectedStatus`] on transport failure.
    /// - [`GeoError::Deserialize`] if the body is not the expected shape.
    /// - [`GeoError::NoMatch`] if the response has no features.
    /// - [`GeoError::MissingCoordinate`] / [`GeoError::InvalidCoordinate`] if the
    ///   chosen feature has no usable position.
    pub async fn geocode(
        &self,
        text: &str,
        strategy: GeocodeStrategy,
    ) -> Result<Coordinate, GeoError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GeoError::BlankQuery);
        }

        let url = self.build_url("v1/geocode/search", &[("text", text)])?;
        let response: GeocodeResponse = self.get_json(url, "geocode").await?;

        let chosen = match strategy {
            GeocodeStrategy::FirstMatch => response.features.first(),
            GeocodeStrategy::HighestConfidence => {
                response.features.iter().reduce(|best, candidate| {
                    if candidate.properties.confidence() > best.properties.confidence() {
                        candidate
                    } else {
                        best
                    }
                })
            }
        };

        let feature = chosen.ok_or_else(|| GeoError::NoMatch(text.to_string()))?;
        let coordinate = feature.properties.coordinate()?;
        tracing::debug!(
            matches = response.features.len(),
            %strategy,
            %coordinate,
            "geocoded location"
        );
        Ok(coordinate)
    }

    /// Lists hospitals within `radius_m` meters of `center`, at most `limit`.
    ///
    /// Entries without a usable coordinate are skipped and logged. The order
    /// of the remaining entries is the service's order.
    ///
    /// # Errors
    ///
    /// - [`GeoError::Http`] / [`GeoError::UnexpectedStatus`] on transport failure.
    /// - [`GeoError::Deserialize`] if the body is not the expected shape.
    pub async fn find_nearby(
        &self,
        center: Coordinate,
        category: &str,
        radius_m: u32,
        limit: u32,
    ) -> Result<Vec<RawFacility>, GeoError> {
        let filter = format!("circle:{},{},{radius_m}", center.lon(), center.lat());
        let limit = limit.to_string();
        let url = self.build_url(
            "v2/places",
            &[
                ("categories", category),
                ("filter", &filter),
                ("limit", &limit),
            ],
        )?;
        let response: PlacesResponse = self.get_json(url, "places").await?;

        let total = response.features.len();
        let facilities: Vec<RawFacility> = response
            .features
            .into_iter()
            .enumerate()
            .filter_map(|(index, feature)| match RawFacility::try_from(feature.properties) {
                Ok(facility) => Some(facility),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping place without usable coordinate");
                    None
                }
            })
            .collect();

        tracing::debug!(total, kept = facilities.len(), "places lookup complete");
        Ok(facilities)
    }

    /// Driving distance from `from` to `to` in kilometers.
    ///
    /// # Errors
    ///
    /// - [`GeoError::Http`] / [`GeoError::UnexpectedStatus`] on transport failure.
    /// - [`GeoError::Deserialize`] if the body is not the expected shape.
    /// - [`GeoError::NoRoute`] if the response has no route feature or no
    ///   usable distance.
    pub async fn try_route_distance(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<f64, GeoError> {
        let waypoints = format!("{},{}|{},{}", from.lat(), from.lon(), to.lat(), to.lon());
        let url = self.build_url(
            "v1/routing",
            &[
                ("waypoints", &waypoints),
                ("mode", "drive"),
                ("details", "route_details"),
            ],
        )?;
        let response: RouteResponse = self.get_json(url, "routing").await?;

        let meters = response
            .features
            .first()
            .and_then(|f| f.properties.distance)
            .ok_or(GeoError::NoRoute)?;

        RouteDistance::from_meters(meters)
            .kilometers()
            .ok_or(GeoError::NoRoute)
    }

    /// Like [`try_route_distance`](Self::try_route_distance), but any failure
    /// becomes [`RouteDistance::Unavailable`].
    pub async fn route_distance(&self, from: Coordinate, to: Coordinate) -> RouteDistance {
        match self.try_route_distance(from, to).await {
            Ok(km) => RouteDistance::Kilometers(km),
            Err(e) => {
                tracing::warn!(
                    %from,
                    %to,
                    timeout = e.is_timeout(),
                    error = %e,
                    "route distance unavailable"
                );
                RouteDistance::Unavailable
            }
        }
    }

    /// Builds the full request URL with percent-encoded query parameters.
    ///
    /// The API key is always appended last.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, GeoError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| GeoError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("apiKey", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, requires a 2xx status and parses the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        endpoint: &'static str,
    ) -> Result<T, GeoError> {
        tracing::debug!(endpoint, path = url.path(), "geoapify request");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
            context: endpoint.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
