//! # voyager-geofence
//!
//! Pure breach evaluation: position + zone set → "is inside at least one
//! zone". No state, no side effects beyond logging, deterministic for
//! identical inputs.
//!
//! A zone is breached iff the great-circle distance from its center is
//! strictly less than its radius; a position exactly on the boundary is
//! not a breach. Out-of-range positions are never a breach and are
//! reported through [`GeofenceVerdict::invalid_position`] instead.

pub mod distance;
pub mod evaluator;

pub use distance::{haversine_distance, EARTH_RADIUS_METERS};
pub use evaluator::{evaluate, GeofenceEvaluator, GeofenceVerdict};
