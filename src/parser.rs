//! GPX track parsing.
//!
//! Decodes a GPX document into an ordered sequence of [`RawTrackPoint`]s.
//! Segments are kept as a first-class list so callers can opt into
//! segment-aware processing later; the default pipeline flattens them into
//! one logical path in document order.

use log::warn;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::TrackError;
use crate::RawTrackPoint;

/// One `<trkseg>` worth of points.
#[derive(Debug, Clone, Default)]
pub struct TrackSegment {
    pub points: Vec<RawTrackPoint>,
}

/// A parsed track document: all segments of all tracks, in document order.
#[derive(Debug, Clone)]
pub struct ParsedTrack {
    pub segments: Vec<TrackSegment>,
}

impl ParsedTrack {
    /// Total number of points across all segments.
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }

    /// Flatten all segments into one logical path, in document order.
    ///
    /// Segment boundaries (separate laps, recording restarts) are not
    /// preserved in the flattened sequence.
    pub fn into_points(self) -> Vec<RawTrackPoint> {
        self.segments.into_iter().flat_map(|s| s.points).collect()
    }
}

/// Parse a GPX byte buffer into a [`ParsedTrack`].
///
/// Fixes with non-finite or out-of-range coordinates are dropped with a
/// warning rather than failing the document; a handful of bad fixes in a
/// 5,000-point track should not invalidate the route. A document that yields
/// zero usable points is rejected with [`TrackError::NoTrackPoints`].
pub fn parse_gpx(bytes: &[u8]) -> Result<ParsedTrack, TrackError> {
    let gpx = gpx::read(bytes).map_err(|e| TrackError::Parse(e.to_string()))?;

    let mut segments = Vec::new();
    let mut index = 0usize;
    let mut dropped = 0usize;

    for track in &gpx.tracks {
        for seg in &track.segments {
            let mut points = Vec::with_capacity(seg.points.len());
            for wp in &seg.points {
                let point = waypoint_to_raw(wp);
                if point.has_valid_position() {
                    points.push(point);
                } else {
                    warn!(
                        "dropping fix {} with invalid coordinates ({}, {})",
                        index, point.latitude, point.longitude
                    );
                    dropped += 1;
                }
                index += 1;
            }
            if !points.is_empty() {
                segments.push(TrackSegment { points });
            }
        }
    }

    if dropped > 0 {
        warn!("dropped {} of {} fixes while parsing", dropped, index);
    }

    if segments.is_empty() {
        return Err(TrackError::NoTrackPoints);
    }

    Ok(ParsedTrack { segments })
}

fn waypoint_to_raw(wp: &gpx::Waypoint) -> RawTrackPoint {
    // The gpx crate wraps timestamps in its own Time type; round-trip
    // through RFC 3339 to get an OffsetDateTime. An unparseable timestamp
    // degrades to a point without one.
    let timestamp = wp
        .time
        .as_ref()
        .and_then(|t| t.format().ok())
        .and_then(|s| OffsetDateTime::parse(&s, &Rfc3339).ok());

    RawTrackPoint {
        latitude: wp.point().y(),
        longitude: wp.point().x(),
        elevation: wp.elevation,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="unit-test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Morning ride</name>
    <trkseg>
      <trkpt lat="47.0000" lon="8.0000"><ele>500.0</ele><time>2024-06-01T10:00:00Z</time></trkpt>
      <trkpt lat="47.0010" lon="8.0000"><ele>510.0</ele><time>2024-06-01T10:01:00Z</time></trkpt>
      <trkpt lat="47.0020" lon="8.0000"><ele>505.0</ele><time>2024-06-01T10:02:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    const MULTI_SEGMENT_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="unit-test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="47.0000" lon="8.0000"></trkpt>
      <trkpt lat="47.0010" lon="8.0000"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="47.0020" lon="8.0000"></trkpt>
    </trkseg>
  </trk>
  <trk>
    <trkseg>
      <trkpt lat="47.0030" lon="8.0000"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_parse_simple_track() {
        let parsed = parse_gpx(SIMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.point_count(), 3);

        let points = parsed.into_points();
        assert_eq!(points[0].latitude, 47.0);
        assert_eq!(points[0].longitude, 8.0);
        assert_eq!(points[0].elevation, Some(500.0));
        assert!(points[0].timestamp.is_some());

        // Timestamps come through in document order
        assert!(points[2].timestamp.unwrap() > points[0].timestamp.unwrap());
    }

    #[test]
    fn test_parse_concatenates_segments_in_document_order() {
        let parsed = parse_gpx(MULTI_SEGMENT_GPX.as_bytes()).unwrap();
        assert_eq!(parsed.segments.len(), 3);

        let points = parsed.into_points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].latitude, 47.0000);
        assert_eq!(points[1].latitude, 47.0010);
        assert_eq!(points[2].latitude, 47.0020);
        assert_eq!(points[3].latitude, 47.0030);
    }

    #[test]
    fn test_parse_points_without_optional_data() {
        let parsed = parse_gpx(MULTI_SEGMENT_GPX.as_bytes()).unwrap();
        let points = parsed.into_points();
        assert!(points.iter().all(|p| p.elevation.is_none()));
        assert!(points.iter().all(|p| p.timestamp.is_none()));
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        let err = parse_gpx(b"this is not a track file").unwrap_err();
        assert!(matches!(err, TrackError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_document_without_points() {
        let empty = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="unit-test" xmlns="http://www.topografix.com/GPX/1/1"></gpx>"#;
        let err = parse_gpx(empty.as_bytes()).unwrap_err();
        assert!(matches!(err, TrackError::NoTrackPoints));
    }
}
