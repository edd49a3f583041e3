//! Geoapify-backed hospital lookup.
//!
//! [`GeoapifyClient`] wraps the three Geoapify endpoints the assistant uses
//! (geocoding, places, routing). [`find_hospitals_near`] composes them into a
//! single [`ProximityQuery`](careassist_core::ProximityQuery).

pub mod client;
pub mod error;
pub mod pipeline;
pub mod types;

pub use client::GeoapifyClient;
pub use error::GeoError;
pub use pipeline::{find_hospitals_near, ProximitySettings, HOSPITAL_CATEGORY};
