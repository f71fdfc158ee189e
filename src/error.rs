//! Error taxonomy for the processing pipeline.
//!
//! Parse failures reject the whole document. Per-point problems (a fix with
//! out-of-range coordinates, an elevation reading outside the plausible
//! range) degrade the output instead of failing the track: the point is
//! dropped or the value excluded, with a warning. Missing optional data
//! (elevation, timestamps) is never an error: the affected fields are simply
//! omitted from the result.

use thiserror::Error;

/// Errors surfaced by the track processing pipeline.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The input document could not be decoded as a supported track format.
    #[error("failed to parse track document: {0}")]
    Parse(String),

    /// The document parsed but contained no usable track points.
    #[error("no track points found in document")]
    NoTrackPoints,

    /// Not enough usable points for the requested computation.
    #[error("insufficient track data: {0}")]
    InsufficientData(&'static str),
}
