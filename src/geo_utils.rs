//! # Geographic Utilities
//!
//! Core geographic computation primitives shared by every pipeline stage.
//!
//! Keeping one distance implementation here (rather than per-stage copies)
//! guarantees that the summary, the simplifier and the analytics all agree
//! on what a kilometer is.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two fixes |
//! | [`polyline_length`] | Total length of a point sequence in meters |
//! | [`gradient_percent`] | Signed slope between two fixes |
//! | [`compute_bounds`] | Bounding box of a point sequence |
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! The haversine formula calculates the great-circle distance between two
//! points on a sphere (mean Earth radius 6,371 km). It's the standard method
//! for GPS distance calculation, accurate to within 0.3% for cycling-scale
//! distances; the geodesic/ellipsoidal refinement is not worth its cost
//! here.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)
//!
//! ### Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! which is the standard used by GPS receivers and mapping services.

use crate::{Bounds, RawTrackPoint};
use geo::{Distance, Haversine, Point};

/// Meters per second to kilometers per hour.
pub(crate) const MPS_TO_KMH: f64 = 3.6;

/// Meters to kilometers.
pub(crate) const M_TO_KM: f64 = 1e-3;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two fixes using the Haversine
/// formula.
///
/// Returns the distance in meters along the Earth's surface.
///
/// # Example
///
/// ```rust
/// use route_engine::{geo_utils, RawTrackPoint};
///
/// let london = RawTrackPoint::new(51.5074, -0.1278);
/// let paris = RawTrackPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &RawTrackPoint, p2: &RawTrackPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a point sequence in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point sequences return 0.0.
pub fn polyline_length(points: &[RawTrackPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Signed slope between two fixes as a percentage.
///
/// `rise_m` is the elevation delta (positive uphill), `run_m` the horizontal
/// distance. Returns `None` when the horizontal distance is zero: the slope
/// of a vertical (or coincident) pair is undefined, and the engine omits
/// values it cannot compute.
///
/// # Example
///
/// ```rust
/// use route_engine::geo_utils::gradient_percent;
///
/// assert_eq!(gradient_percent(50.0, 1000.0), Some(5.0));
/// assert_eq!(gradient_percent(-30.0, 1000.0), Some(-3.0));
/// assert_eq!(gradient_percent(10.0, 0.0), None);
/// ```
#[inline]
pub fn gradient_percent(rise_m: f64, run_m: f64) -> Option<f64> {
    if run_m > 0.0 {
        Some(rise_m / run_m * 100.0)
    } else {
        None
    }
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a point sequence.
///
/// Returns `None` for empty input.
///
/// # Example
///
/// ```rust
/// use route_engine::{geo_utils, RawTrackPoint};
///
/// let track = vec![
///     RawTrackPoint::new(51.5000, -0.1300),
///     RawTrackPoint::new(51.5100, -0.1200),
///     RawTrackPoint::new(51.5050, -0.1250),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lat, 51.5100);
/// assert_eq!(bounds.min_lng, -0.1300);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[RawTrackPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds { min_lat, max_lat, min_lng, max_lng })
}

// =============================================================================
// Unit Tests
// =============================================================================
