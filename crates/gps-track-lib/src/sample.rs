//! Normalized GPS observation shared by every ingestion format

use chrono::DateTime;
use std::fmt;

/// Quality of the GNSS fix reported alongside a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixQuality {
    Unknown,
    TwoDimensional,
    ThreeDimensional,
}

impl fmt::Display for FixQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FixQuality::Unknown => "unknown",
            FixQuality::TwoDimensional => "2D",
            FixQuality::ThreeDimensional => "3D",
        })
    }
}

/// One normalized observation of a track
///
/// Only the timestamp and the coordinates are mandatory. Every other field is
/// independently either observed or `None`, and all downstream math branches
/// on that presence.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Unix time in seconds, the ordering key
    pub timestamp: i64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: Option<f64>,
    /// Course over ground in degrees, [0, 360)
    pub heading: Option<f64>,
    /// Ground speed in meters per second
    pub speed: Option<f64>,
    pub satellite_count: Option<u32>,
    pub fix_quality: Option<FixQuality>,
    pub hdop: Option<f64>,
    pub vdop: Option<f64>,
    pub pdop: Option<f64>,
}

impl Sample {
    /// Create a sample carrying only the mandatory fields
    pub fn new(timestamp: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            altitude: None,
            heading: None,
            speed: None,
            satellite_count: None,
            fix_quality: None,
            hdop: None,
            vdop: None,
            pdop: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Render a Unix timestamp as an ISO-8601 UTC date-time (`2024-01-01T00:00:00Z`)
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(time) => time.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => timestamp.to_string(),
    }
}

struct Optional<T>(Option<T>);

impl fmt::Display for Optional<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:.6}"),
            None => f.write_str("n/a"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Optional<&T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("n/a"),
        }
    }
}

/// Debug dump line, e.g.
/// `[2024-01-01T00:00:00Z]  latitude: 1.000000, longitude: 2.000000, altitude: n/a, ...`
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]  latitude: {:.6}, longitude: {:.6}, altitude: {}, azimuth: {}, speed: {}, \
             satellites: {}, fix: {}, HDOP: {}, VDOP: {}, PDOP: {}",
            format_timestamp(self.timestamp),
            self.latitude,
            self.longitude,
            Optional(self.altitude),
            Optional(self.heading),
            Optional(self.speed),
            Optional(self.satellite_count.as_ref()),
            Optional(self.fix_quality.as_ref()),
            Optional(self.hdop),
            Optional(self.vdop),
            Optional(self.pdop),
        )
    }
}
