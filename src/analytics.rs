//! Speed, time, gradient and climb analytics over the raw track.
//!
//! All figures are derived from the original (unsimplified) point sequence;
//! climb boundaries in particular are sensitive to point density, so they
//! are always measured against the raw path.

use serde::Serialize;

use crate::geo_utils::{self, MPS_TO_KMH, M_TO_KM};
use crate::{EngineConfig, RawTrackPoint};

/// Elevation drop from a climb's running maximum that ends the climb.
const CLIMB_END_DESCENT_M: f64 = 10.0;

/// Consecutive near-flat points that end a climb as a sustained flat section.
const CLIMB_END_FLAT_POINTS: u32 = 3;

/// Per-point elevation change below this counts as near-flat.
const NEAR_FLAT_DELTA_M: f64 = 0.5;

/// Closed climbs with less net gain than this are discarded as noise.
const MIN_CLIMB_GAIN_M: f64 = 10.0;

/// Distance accumulated in one steepness class.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GradientBucket {
    pub distance_km: f64,
    pub percent_of_total: f64,
}

/// Four mutually exclusive steepness classes over total distance.
///
/// Bucketing uses the gradient magnitude: downhill and uphill of equal
/// steepness land in the same class. Segments without usable elevation on
/// both ends are not classified, so with partial elevation data the class
/// percentages sum to less than 100.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GradientDistribution {
    /// 0-3%
    pub flat: GradientBucket,
    /// 3-6%
    pub moderate: GradientBucket,
    /// 6-10%
    pub steep: GradientBucket,
    /// above 10%
    pub very_steep: GradientBucket,
}

/// A contiguous sub-range of the track identified as a climb.
///
/// The range spans from the climb's start to the highest point reached;
/// trailing flat or descent up to the end-detection point is excluded.
#[derive(Debug, Clone, Serialize)]
pub struct ClimbSegment {
    pub start_distance_km: f64,
    pub end_distance_km: f64,
    pub elevation_gain_m: f64,
    pub average_gradient_percent: f64,
    pub difficulty_score: f64,
}

/// Per-route analytics.
///
/// Speed and time fields are `None` when the track lacks complete
/// timestamps; values are never fabricated for data that is not there.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStatistics {
    pub avg_speed_kmh: Option<f64>,
    pub max_speed_kmh: Option<f64>,
    pub total_time_minutes: Option<f64>,
    pub moving_time_minutes: Option<f64>,
    pub gradient_distribution: GradientDistribution,
    pub top_climbs: Vec<ClimbSegment>,
}

/// Compute [`RouteStatistics`] over a raw point sequence.
///
/// Returns `None` for tracks with fewer than two points, since there is no
/// segment to analyze.
pub fn compute_statistics(
    points: &[RawTrackPoint],
    config: &EngineConfig,
) -> Option<RouteStatistics> {
    if points.len() < 2 {
        return None;
    }

    let speed_time = speed_time_metrics(points, config);

    Some(RouteStatistics {
        avg_speed_kmh: speed_time.avg_speed_kmh,
        max_speed_kmh: speed_time.max_speed_kmh,
        total_time_minutes: speed_time.total_time_minutes,
        moving_time_minutes: speed_time.moving_time_minutes,
        gradient_distribution: gradient_distribution(points, config),
        top_climbs: detect_climbs(points, config),
    })
}

// =============================================================================
// Speed & Time
// =============================================================================

#[derive(Default)]
struct SpeedTimeMetrics {
    avg_speed_kmh: Option<f64>,
    max_speed_kmh: Option<f64>,
    total_time_minutes: Option<f64>,
    moving_time_minutes: Option<f64>,
}

/// Sum inter-point time gaps into total and moving time and track the
/// fastest plausible segment.
///
/// A gap longer than the configured stop threshold counts toward total time
/// but not moving time. Segments implying a speed above the sanity ceiling
/// are GPS noise and are excluded from the maximum (not clamped to it).
/// Non-positive gaps (out-of-order fixes) contribute nothing.
fn speed_time_metrics(points: &[RawTrackPoint], config: &EngineConfig) -> SpeedTimeMetrics {
    if !points.iter().all(|p| p.timestamp.is_some()) {
        return SpeedTimeMetrics::default();
    }

    let mut total_secs = 0.0;
    let mut moving_secs = 0.0;
    let mut max_speed: Option<f64> = None;

    for w in points.windows(2) {
        let (Some(t0), Some(t1)) = (w[0].timestamp, w[1].timestamp) else {
            continue;
        };
        let gap_secs = (t1 - t0).as_seconds_f64();
        if gap_secs <= 0.0 {
            continue;
        }

        total_secs += gap_secs;
        if gap_secs <= config.stop_gap_seconds {
            moving_secs += gap_secs;
        }

        let speed_kmh = geo_utils::haversine_distance(&w[0], &w[1]) / gap_secs * MPS_TO_KMH;
        if speed_kmh <= config.max_speed_ceiling_kmh {
            max_speed = Some(max_speed.map_or(speed_kmh, |m| m.max(speed_kmh)));
        }
    }

    let total_km = geo_utils::polyline_length(points) * M_TO_KM;
    let avg_speed_kmh = if total_secs > 0.0 {
        Some(total_km / (total_secs / 3600.0))
    } else {
        None
    };

    SpeedTimeMetrics {
        avg_speed_kmh,
        max_speed_kmh: max_speed,
        total_time_minutes: Some(total_secs / 60.0),
        moving_time_minutes: Some(moving_secs / 60.0),
    }
}

// =============================================================================
// Gradient Distribution
// =============================================================================

fn gradient_distribution(points: &[RawTrackPoint], config: &EngineConfig) -> GradientDistribution {
    let mut flat_m = 0.0;
    let mut moderate_m = 0.0;
    let mut steep_m = 0.0;
    let mut very_steep_m = 0.0;
    let mut total_m = 0.0;

    for w in points.windows(2) {
        let distance_m = geo_utils::haversine_distance(&w[0], &w[1]);
        total_m += distance_m;

        let (Some(a), Some(b)) =
            (config.checked_elevation(&w[0]), config.checked_elevation(&w[1]))
        else {
            continue;
        };
        let Some(gradient) = geo_utils::gradient_percent(b - a, distance_m) else {
            continue;
        };

        let steepness = gradient.abs();
        if steepness < 3.0 {
            flat_m += distance_m;
        } else if steepness < 6.0 {
            moderate_m += distance_m;
        } else if steepness <= 10.0 {
            steep_m += distance_m;
        } else {
            very_steep_m += distance_m;
        }
    }

    let bucket = |meters: f64| GradientBucket {
        distance_km: meters * M_TO_KM,
        percent_of_total: if total_m > 0.0 { meters / total_m * 100.0 } else { 0.0 },
    };

    GradientDistribution {
        flat: bucket(flat_m),
        moderate: bucket(moderate_m),
        steep: bucket(steep_m),
        very_steep: bucket(very_steep_m),
    }
}

// =============================================================================
// Climb Detection
// =============================================================================

struct ActiveClimb {
    start_idx: usize,
    start_elevation: f64,
    max_idx: usize,
    max_elevation: f64,
    flat_run: u32,
}

/// Scan the raw track for climbs.
///
/// A climb starts when elevation begins rising after a flat or descending
/// stretch and ends when either the track has descended more than
/// [`CLIMB_END_DESCENT_M`] from the climb's running maximum, or
/// [`CLIMB_END_FLAT_POINTS`] consecutive points show near-zero elevation
/// change. Fixes without usable elevation are transparent to the scan.
/// Returns the hardest climbs first, at most `config.top_climb_count`.
fn detect_climbs(points: &[RawTrackPoint], config: &EngineConfig) -> Vec<ClimbSegment> {
    // Cumulative raw-path distance in meters at each point.
    let mut cumulative_m = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += geo_utils::haversine_distance(&points[i - 1], p);
        }
        cumulative_m.push(acc);
    }

    let mut climbs = Vec::new();
    let mut active: Option<ActiveClimb> = None;
    let mut prev: Option<(usize, f64)> = None; // last fix with usable elevation

    for (i, point) in points.iter().enumerate() {
        let Some(elevation) = config.checked_elevation(point) else {
            continue;
        };

        if let Some((prev_idx, prev_elevation)) = prev {
            let delta = elevation - prev_elevation;
            match active.as_mut() {
                None => {
                    if delta >= NEAR_FLAT_DELTA_M {
                        active = Some(ActiveClimb {
                            start_idx: prev_idx,
                            start_elevation: prev_elevation,
                            max_idx: i,
                            max_elevation: elevation,
                            flat_run: 0,
                        });
                    }
                }
                Some(climb) => {
                    if elevation > climb.max_elevation {
                        climb.max_elevation = elevation;
                        climb.max_idx = i;
                    }
                    if delta.abs() < NEAR_FLAT_DELTA_M {
                        climb.flat_run += 1;
                    } else {
                        climb.flat_run = 0;
                    }

                    let descended = climb.max_elevation - elevation > CLIMB_END_DESCENT_M;
                    if descended || climb.flat_run >= CLIMB_END_FLAT_POINTS {
                        if let Some(segment) = close_climb(climb, &cumulative_m) {
                            climbs.push(segment);
                        }
                        active = None;
                    }
                }
            }
        }

        prev = Some((i, elevation));
    }

    // A climb still in progress at the end of the track is closed as-is.
    if let Some(climb) = active {
        if let Some(segment) = close_climb(&climb, &cumulative_m) {
            climbs.push(segment);
        }
    }

    climbs.sort_by(|a, b| {
        b.difficulty_score
            .total_cmp(&a.difficulty_score)
            .then(b.elevation_gain_m.total_cmp(&a.elevation_gain_m))
    });
    climbs.truncate(config.top_climb_count);
    climbs
}

/// Materialize a climb, spanning start to the point of maximum elevation.
fn close_climb(climb: &ActiveClimb, cumulative_m: &[f64]) -> Option<ClimbSegment> {
    let gain = climb.max_elevation - climb.start_elevation;
    if gain < MIN_CLIMB_GAIN_M {
        return None;
    }

    let run_m = cumulative_m[climb.max_idx] - cumulative_m[climb.start_idx];
    let average_gradient = geo_utils::gradient_percent(gain, run_m)?;

    Some(ClimbSegment {
        start_distance_km: cumulative_m[climb.start_idx] * M_TO_KM,
        end_distance_km: cumulative_m[climb.max_idx] * M_TO_KM,
        elevation_gain_m: gain,
        average_gradient_percent: average_gradient,
        difficulty_score: gain * (1.0 + average_gradient / 10.0),
    })
}
