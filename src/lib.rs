//! # Route Engine
//!
//! GPS route processing: track parsing, simplification and route analytics.
//!
//! The engine is a pure, synchronous pipeline over one track per invocation:
//!
//! 1. **Parser** - decodes a GPX document into an ordered sequence of
//!    [`RawTrackPoint`]s ([`parser`]).
//! 2. **Summary** - cumulative distance and elevation figures over the raw
//!    sequence ([`summary`]).
//! 3. **Simplifier** - Ramer-Douglas-Peucker reduction to a bounded-error
//!    subset suitable for map rendering ([`simplify`]).
//! 4. **Analytics** - speed/time metrics, gradient distribution and climb
//!    detection over the raw sequence ([`analytics`]).
//!
//! [`process_track`] runs all four stages and assembles a [`RouteData`].
//! The engine holds no state and performs no I/O; processing many tracks in
//! parallel is a caller-side concern (see [`process_tracks_parallel`] with
//! the `parallel` feature).
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch processing with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use route_engine::{process_track, EngineConfig};
//!
//! let gpx = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <gpx version="1.1" creator="quickstart" xmlns="http://www.topografix.com/GPX/1/1">
//!   <trk><trkseg>
//!     <trkpt lat="47.000" lon="8.000"><ele>500.0</ele></trkpt>
//!     <trkpt lat="47.010" lon="8.000"><ele>550.0</ele></trkpt>
//!   </trkseg></trk>
//! </gpx>"#;
//!
//! let route = process_track(gpx, &EngineConfig::default()).unwrap();
//! assert!(route.summary.total_distance_km > 1.0);
//! assert_eq!(route.simplified_points.len(), 2);
//! ```

use log::{debug, info};
use serde::Serialize;
use time::OffsetDateTime;

pub mod analytics;
pub mod error;
pub mod geo_utils;
pub mod parser;
pub mod simplify;
pub mod summary;

pub use analytics::{
    compute_statistics, ClimbSegment, GradientBucket, GradientDistribution, RouteStatistics,
};
pub use error::TrackError;
pub use parser::{parse_gpx, ParsedTrack, TrackSegment};
pub use simplify::{simplify_indices, simplify_track, SimplifiedTrackPoint};
pub use summary::{compute_summary, TrackSummary};

// ============================================================================
// Core Types
// ============================================================================

/// A single GPS fix: position with optional elevation and timestamp.
///
/// Order within a track is significant: the sequence defines the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawTrackPoint {
    /// Latitude in WGS84 decimal degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in WGS84 decimal degrees, [-180, 180]
    pub longitude: f64,
    /// Elevation in meters above sea level
    pub elevation: Option<f64>,
    /// Capture time of the fix
    pub timestamp: Option<OffsetDateTime>,
}

impl RawTrackPoint {
    /// Create a fix without elevation or timestamp.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, elevation: None, timestamp: None }
    }

    /// Check that the fix has finite, in-range coordinates.
    pub fn has_valid_position(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Center of the bounds as (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Configuration for the processing pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tolerance for Douglas-Peucker simplification (in degrees).
    /// Smaller values preserve more detail. Default: 0.0001 (~10 meters)
    pub epsilon_degrees: f64,

    /// Inter-point time gap treated as a stop and excluded from moving time.
    /// Default: 300 seconds (5 minutes)
    pub stop_gap_seconds: f64,

    /// Elevation readings below this are treated as sensor anomalies.
    /// Default: -420 m (the lowest dry land on Earth)
    pub min_elevation_m: f64,

    /// Elevation readings above this are treated as sensor anomalies.
    /// Default: 8850 m
    pub max_elevation_m: f64,

    /// Segment speeds above this are treated as GPS noise and excluded from
    /// the maximum-speed figure. Default: 100 km/h
    pub max_speed_ceiling_kmh: f64,

    /// Number of top climbs to retain, hardest first. Default: 3
    pub top_climb_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon_degrees: 0.0001,
            stop_gap_seconds: 300.0,
            min_elevation_m: -420.0,
            max_elevation_m: 8850.0,
            max_speed_ceiling_kmh: 100.0,
            top_climb_count: 3,
        }
    }
}

impl EngineConfig {
    /// Elevation of a fix, if present and within the plausible range.
    ///
    /// Anomalous readings stay on the point (it still counts toward
    /// distance) but are excluded from every elevation computation.
    pub fn checked_elevation(&self, point: &RawTrackPoint) -> Option<f64> {
        point
            .elevation
            .filter(|e| (self.min_elevation_m..=self.max_elevation_m).contains(e))
    }
}

/// The assembled output of one processing invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RouteData {
    pub summary: TrackSummary,
    pub simplified_points: Vec<SimplifiedTrackPoint>,
    /// `None` for single-point tracks; speed/time fields inside are `None`
    /// when the track lacks complete timestamps.
    pub statistics: Option<RouteStatistics>,
    pub raw_point_count: usize,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Process one track document end to end.
///
/// Parses the byte buffer, then runs the summary, simplification and
/// analytics stages over the flattened point sequence.
///
/// # Example
///
/// ```rust
/// use route_engine::{process_track, EngineConfig, TrackError};
///
/// let err = process_track(b"not a track", &EngineConfig::default()).unwrap_err();
/// assert!(matches!(err, TrackError::Parse(_)));
/// ```
pub fn process_track(bytes: &[u8], config: &EngineConfig) -> Result<RouteData, TrackError> {
    let parsed = parser::parse_gpx(bytes)?;
    let points = parsed.into_points();
    debug!("parsed {} raw points", points.len());

    let summary = summary::compute_summary(&points, config)?;
    let simplified_points = simplify::simplify_track(&points, config.epsilon_degrees);
    let statistics = analytics::compute_statistics(&points, config);

    info!(
        "processed track: {:.2} km, {} -> {} points",
        summary.total_distance_km,
        points.len(),
        simplified_points.len()
    );

    Ok(RouteData {
        summary,
        simplified_points,
        statistics,
        raw_point_count: points.len(),
    })
}

/// Process a batch of track documents sequentially.
///
/// One result per input document, in order; a document that fails yields its
/// error without affecting the others.
pub fn process_tracks(
    documents: &[Vec<u8>],
    config: &EngineConfig,
) -> Vec<Result<RouteData, TrackError>> {
    documents.iter().map(|doc| process_track(doc, config)).collect()
}

/// Process a batch of track documents in parallel with rayon.
///
/// Each invocation is independent and stateless, so tracks parallelize with
/// no locking. Recommended for multi-track workloads (bulk imports).
#[cfg(feature = "parallel")]
pub fn process_tracks_parallel(
    documents: &[Vec<u8>],
    config: &EngineConfig,
) -> Vec<Result<RouteData, TrackError>> {
    use rayon::prelude::*;

    documents.par_iter().map(|doc| process_track(doc, config)).collect()
}

// ============================================================================
// Tests
// ============================================================================
