//! Aggregate geometry and elevation statistics over the raw track.

use log::warn;
use serde::Serialize;

use crate::error::TrackError;
use crate::{geo_utils, Bounds, EngineConfig, RawTrackPoint};

/// Aggregate figures for a whole track.
///
/// `has_elevation` / `has_timestamps` are true only when *every* point
/// carries the datum; partial data is treated as absent for aggregate
/// purposes, while per-gap computations still use whatever is there.
#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub total_distance_km: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
    pub max_elevation_m: Option<f64>,
    pub min_elevation_m: Option<f64>,
    pub start_point: RawTrackPoint,
    pub end_point: RawTrackPoint,
    pub has_elevation: bool,
    pub has_timestamps: bool,
    pub bounds: Bounds,
}

/// Compute the [`TrackSummary`] for a raw point sequence.
///
/// Distance accumulates over every consecutive pair. Elevation gain/loss
/// accumulate the positive (resp. negative) component of each consecutive
/// elevation delta; a pair where either end lacks a usable elevation breaks
/// accumulation for that gap only. Readings outside the configured anomaly
/// bounds are excluded from gain/loss/extrema but the point still counts
/// toward distance.
pub fn compute_summary(
    points: &[RawTrackPoint],
    config: &EngineConfig,
) -> Result<TrackSummary, TrackError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(TrackError::InsufficientData("summary requires at least one point"));
    };
    let bounds = geo_utils::compute_bounds(points)
        .ok_or(TrackError::InsufficientData("summary requires at least one point"))?;

    let anomalous = points
        .iter()
        .filter(|p| p.elevation.is_some() && config.checked_elevation(p).is_none())
        .count();
    if anomalous > 0 {
        warn!(
            "{} elevation readings outside [{}, {}] m excluded from elevation figures",
            anomalous, config.min_elevation_m, config.max_elevation_m
        );
    }

    let mut total_m = 0.0;
    let mut gain = 0.0;
    let mut loss = 0.0;

    for w in points.windows(2) {
        total_m += geo_utils::haversine_distance(&w[0], &w[1]);

        if let (Some(a), Some(b)) = (config.checked_elevation(&w[0]), config.checked_elevation(&w[1])) {
            let delta = b - a;
            if delta > 0.0 {
                gain += delta;
            } else {
                loss += -delta;
            }
        }
    }

    let mut min_elevation = None;
    let mut max_elevation = None;
    for p in points {
        if let Some(e) = config.checked_elevation(p) {
            min_elevation = Some(min_elevation.map_or(e, |m: f64| m.min(e)));
            max_elevation = Some(max_elevation.map_or(e, |m: f64| m.max(e)));
        }
    }

    Ok(TrackSummary {
        total_distance_km: total_m * geo_utils::M_TO_KM,
        elevation_gain_m: gain,
        elevation_loss_m: loss,
        max_elevation_m: max_elevation,
        min_elevation_m: min_elevation,
        start_point: *first,
        end_point: *last,
        has_elevation: points.iter().all(|p| p.elevation.is_some()),
        has_timestamps: points.iter().all(|p| p.timestamp.is_some()),
        bounds,
    })
}
