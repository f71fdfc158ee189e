//! Track simplification via Ramer-Douglas-Peucker.
//!
//! Simplification runs over the (latitude, longitude) plane only: elevation
//! is carried through from the originating fixes, never interpolated, and
//! plays no part in the error metric. Cumulative distance and per-segment
//! gradient are recomputed fresh along the simplified path, because the
//! simplified path's segment lengths differ from the raw path's.

use serde::Serialize;

use crate::{geo_utils, RawTrackPoint};

/// A point of the simplified track, decorated for map rendering.
///
/// `gradient_percent` is the signed slope to the *next* simplified point;
/// `None` for the last point or when either endpoint lacks elevation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifiedTrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub cumulative_distance_km: f64,
    pub sequence_index: usize,
    pub gradient_percent: Option<f64>,
}

/// Simplify a raw point sequence and decorate the kept points.
///
/// The first and last input points are always retained, for every epsilon.
/// Inputs with fewer than 3 points are returned unchanged (no simplification
/// possible).
pub fn simplify_track(points: &[RawTrackPoint], epsilon_degrees: f64) -> Vec<SimplifiedTrackPoint> {
    let kept = simplify_indices(points, epsilon_degrees);

    let mut out = Vec::with_capacity(kept.len());
    let mut cumulative_m = 0.0;

    for (seq, &idx) in kept.iter().enumerate() {
        let p = &points[idx];
        if seq > 0 {
            cumulative_m += geo_utils::haversine_distance(&points[kept[seq - 1]], p);
        }

        let gradient = kept.get(seq + 1).and_then(|&next_idx| {
            let next = &points[next_idx];
            let rise = next.elevation? - p.elevation?;
            geo_utils::gradient_percent(rise, geo_utils::haversine_distance(p, next))
        });

        out.push(SimplifiedTrackPoint {
            latitude: p.latitude,
            longitude: p.longitude,
            elevation: p.elevation,
            cumulative_distance_km: cumulative_m * geo_utils::M_TO_KM,
            sequence_index: seq,
            gradient_percent: gradient,
        });
    }

    out
}

/// Run Ramer-Douglas-Peucker and return the indices of kept points.
///
/// `epsilon_degrees` is the maximum allowed perpendicular distance from the
/// chord, measured in the degree plane (0.0001° is roughly 10 m).
pub fn simplify_indices(points: &[RawTrackPoint], epsilon_degrees: f64) -> Vec<usize> {
    if points.len() < 3 {
        return (0..points.len()).collect();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    rdp_mark(points, 0, points.len() - 1, epsilon_degrees, &mut keep);

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect()
}

/// Recursive divide-and-conquer: keep the farthest point of a sub-range if
/// it deviates more than epsilon from the chord, then recurse on both halves.
fn rdp_mark(points: &[RawTrackPoint], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let first = &points[start];
    let last = &points[end];

    let mut max_distance = 0.0;
    let mut max_index = start;

    for i in (start + 1)..end {
        let distance = perpendicular_distance_deg(&points[i], first, last);
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    if max_distance > epsilon {
        keep[max_index] = true;
        rdp_mark(points, start, max_index, epsilon, keep);
        rdp_mark(points, max_index, end, epsilon, keep);
    }
}

/// Distance from `p` to the chord `a`-`b` in the degree plane.
///
/// Projection is clamped to the chord so loops (chord endpoints coincident
/// or nearly so) behave sanely.
fn perpendicular_distance_deg(p: &RawTrackPoint, a: &RawTrackPoint, b: &RawTrackPoint) -> f64 {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        let px = p.longitude - a.longitude;
        let py = p.latitude - a.latitude;
        return (px * px + py * py).sqrt();
    }

    let t = ((p.longitude - a.longitude) * dx + (p.latitude - a.latitude) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let ex = p.longitude - (a.longitude + t * dx);
    let ey = p.latitude - (a.latitude + t * dy);
    (ex * ex + ey * ey).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;

    fn tp(lat: f64, lng: f64, elevation: Option<f64>) -> RawTrackPoint {
        RawTrackPoint { latitude: lat, longitude: lng, elevation, timestamp: None }
    }

    /// 100 points along a gentle sine wave, ~7.5 km end to end.
    fn smooth_curve() -> Vec<RawTrackPoint> {
        (0..100)
            .map(|i| {
                let frac = i as f64 / 99.0;
                let lat = 47.0 + 0.002 * (frac * std::f64::consts::TAU).sin();
                let lng = 8.0 + i as f64 * 0.001;
                tp(lat, lng, Some(500.0 + 10.0 * frac))
            })
            .collect()
    }

    #[test]
    fn test_straight_line_collapses_to_endpoints() {
        let points: Vec<_> = (0..5).map(|i| tp(47.0 + i as f64 * 0.001, 8.0, None)).collect();
        let simplified = simplify_track(&points, EngineConfig::default().epsilon_degrees);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0].latitude, 47.0);
        assert_eq!(simplified[1].latitude, 47.004);
    }

    #[test]
    fn test_corner_is_preserved() {
        let points = vec![
            tp(47.00, 8.00, None),
            tp(47.01, 8.00, None), // corner
            tp(47.01, 8.01, None),
        ];
        let simplified = simplify_track(&points, 0.0001);
        assert_eq!(simplified.len(), 3);
    }

    #[test]
    fn test_endpoints_always_retained() {
        let points: Vec<_> = (0..20)
            .map(|i| tp(47.0 + (i % 3) as f64 * 0.00001, 8.0 + i as f64 * 0.001, None))
            .collect();
        // Huge epsilon flattens everything except the hard-kept endpoints
        let simplified = simplify_track(&points, 10.0);
        assert_eq!(simplified.len(), 2);
        assert_eq!(
            (simplified[0].latitude, simplified[0].longitude),
            (points[0].latitude, points[0].longitude)
        );
        assert_eq!(
            (simplified[1].latitude, simplified[1].longitude),
            (points[19].latitude, points[19].longitude)
        );
    }

    #[test]
    fn test_short_inputs_pass_through() {
        let one = vec![tp(47.0, 8.0, Some(100.0))];
        assert_eq!(simplify_track(&one, 0.0001).len(), 1);

        let two = vec![tp(47.0, 8.0, None), tp(47.1, 8.0, None)];
        let simplified = simplify_track(&two, 0.0001);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified[0].sequence_index, 0);
        assert_eq!(simplified[1].sequence_index, 1);
    }

    #[test]
    fn test_smooth_curve_reduction_bound() {
        let points = smooth_curve();
        let simplified = simplify_track(&points, EngineConfig::default().epsilon_degrees);

        let reduction = 1.0 - simplified.len() as f64 / points.len() as f64;
        assert!(
            (0.70..=0.95).contains(&reduction),
            "expected 70-95% reduction, got {:.0}% ({} of {} kept)",
            reduction * 100.0,
            simplified.len(),
            points.len()
        );
    }

    #[test]
    fn test_smooth_curve_distance_distortion_bound() {
        let points = smooth_curve();
        let simplified = simplify_track(&points, EngineConfig::default().epsilon_degrees);

        let raw_km = geo_utils::polyline_length(&points) * geo_utils::M_TO_KM;
        let simplified_km = simplified.last().unwrap().cumulative_distance_km;
        let distortion = (raw_km - simplified_km).abs() / raw_km;
        assert!(distortion < 0.05, "distance distortion {:.1}% too high", distortion * 100.0);
    }

    #[test]
    fn test_cumulative_distance_is_monotonic_and_fresh() {
        let points = smooth_curve();
        let simplified = simplify_track(&points, EngineConfig::default().epsilon_degrees);

        assert_eq!(simplified[0].cumulative_distance_km, 0.0);
        for w in simplified.windows(2) {
            assert!(w[1].cumulative_distance_km >= w[0].cumulative_distance_km);
        }
        // Dense sequence indices
        for (i, p) in simplified.iter().enumerate() {
            assert_eq!(p.sequence_index, i);
        }
    }

    #[test]
    fn test_gradient_sign_follows_elevation() {
        let uphill = vec![tp(47.000, 8.0, Some(100.0)), tp(47.001, 8.0, Some(150.0))];
        let simplified = simplify_track(&uphill, 0.0001);
        assert!(simplified[0].gradient_percent.unwrap() > 0.0);
        assert_eq!(simplified[1].gradient_percent, None);

        let downhill = vec![tp(47.000, 8.0, Some(150.0)), tp(47.001, 8.0, Some(100.0))];
        let simplified = simplify_track(&downhill, 0.0001);
        assert!(simplified[0].gradient_percent.unwrap() < 0.0);
    }

    #[test]
    fn test_gradient_missing_without_elevation() {
        let points = vec![tp(47.000, 8.0, Some(100.0)), tp(47.001, 8.0, None)];
        let simplified = simplify_track(&points, 0.0001);
        assert_eq!(simplified[0].gradient_percent, None);
        assert_eq!(simplified[0].elevation, Some(100.0));
        assert_eq!(simplified[1].elevation, None);
    }

    #[test]
    fn test_zero_epsilon_keeps_every_deviating_point() {
        let points = vec![
            tp(47.0000, 8.000, None),
            tp(47.0005, 8.001, None),
            tp(47.0000, 8.002, None),
        ];
        let simplified = simplify_track(&points, 0.0);
        assert_eq!(simplified.len(), 3);
    }
}
