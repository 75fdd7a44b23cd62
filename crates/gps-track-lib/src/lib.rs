//! GPS Track Library - Normalized Track Model and Temporal Queries
//!
//! This library ingests GPS recordings in heterogeneous formats (GPX, TCX, NMEA) into a
//! single time-ordered sequence of samples, then answers point-in-time and whole-track
//! queries over it using geodesic math on the WGS84 ellipsoid.
//!
//! # Architecture
//!
//! - **[`Sample`]**: One normalized observation with optional kinematic fields
//! - **[`Track`]**: Append-only store of samples with running time bounds
//! - **[`Fix`]**: Interpolated position, heading and speed at an instant
//! - **[`Summary`]**: Distance, speed range and altitude range over the track
//! - **[`Format`]**: Source format detection feeding the GPX, TCX and NMEA readers
//!
//! # Performance Characteristics
//!
//! - **Insertion**: amortized O(1)
//! - **Point query**: O(N) scan, or O(log N) with [`Lookup::Bisect`] on ordered input
//! - **Summary**: O(N) single pass

mod format;
pub mod geodesy;
mod gpx;
mod nmea;
mod query;
mod sample;
mod summary;
mod tcx;
mod track;
mod xml;

// Public API exports
pub use format::{Format, detect_format};
pub use query::{Fix, parse_timestamp};
pub use sample::{FixQuality, Sample, format_timestamp};
pub use summary::Summary;
pub use track::{Config, DiagnosticSink, Lookup, Track};

/// Error types for track ingestion and queries
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("can not parse {format} document: {message}")]
    Parse { format: Format, message: String },

    #[error("format is not supported")]
    UnsupportedFormat,

    #[error("No valid points found")]
    NoPoints,

    #[error(
        "time {} is out of track range [{} - {}]",
        format_timestamp(*.time),
        format_timestamp(*.start),
        format_timestamp(*.end)
    )]
    OutOfRange { time: i64, start: i64, end: i64 },

    #[error("track has no samples")]
    EmptyTrack,

    #[error("invalid ISO 8601 timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("can not allocate sample storage: {0}")]
    Allocation(#[from] std::collections::TryReserveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    pub(crate) fn parse(format: Format, message: impl Into<String>) -> Self {
        TrackError::Parse {
            format,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
