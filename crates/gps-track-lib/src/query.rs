//! Point-in-time queries over a track
//!
//! A query instant either coincides with a stored sample (exact match), falls
//! strictly between two consecutive samples (bracketing), or, for tracks fed
//! out of time order, matches neither and is clamped to the nearest sample.

use crate::geodesy::{self, Inverse};
use crate::{Lookup, Result, Sample, Track, TrackError};
use chrono::{DateTime, NaiveDateTime};
use rayon::prelude::*;

/// Interpolated state of the track at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    /// The queried Unix time in seconds
    pub timestamp: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters, `None` when it can not be derived
    pub altitude: Option<f64>,
    /// Heading in degrees, [0, 360)
    pub heading: Option<f64>,
    /// Speed in meters per second
    pub speed: Option<f64>,
}

/// Where a queried instant sits relative to the stored samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Sample at this index has exactly the queried timestamp
    Exact(usize),
    /// Instant lies strictly between this index and the next
    Between(usize),
}

/// Parse an ISO 8601 date-time into Unix seconds, interpreting it as UTC
///
/// Accepts RFC 3339 (`2024-01-01T12:00:00Z`, fractions and offsets included)
/// and zone-less date-times (`2024-01-01T12:00:00`). Fractions are truncated.
pub fn parse_timestamp(text: &str) -> Result<i64> {
    let text = text.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.timestamp());
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|time| time.and_utc().timestamp())
        .map_err(|_| TrackError::InvalidTimestamp(text.to_string()))
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Get the interpolated position, altitude, heading and speed at `time`
    ///
    /// # Arguments
    /// * `time` - Unix time in seconds, within `[start, end]`
    ///
    /// # Returns
    /// A [`Fix`], [`TrackError::OutOfRange`] outside the track bounds, or
    /// [`TrackError::EmptyTrack`] when there are no samples
    pub fn coordinate_at(&self, time: i64) -> Result<Fix> {
        let (start, end) = self
            .bounds()
            .ok_or(TrackError::EmptyTrack)
            .map_err(|err| self.fail(err))?;

        if time < start || time > end {
            return Err(self.fail(TrackError::OutOfRange { time, start, end }));
        }

        let samples = self.samples();
        let position = match self.config().lookup {
            Lookup::Bisect if self.is_ordered() => bisect(samples, time),
            _ => scan(samples, time),
        };

        let fix = match position {
            Some(Position::Exact(index)) => exact(samples, index, time),
            Some(Position::Between(index)) => between(&samples[index], &samples[index + 1], time),
            None => {
                let index = nearest(samples, time).ok_or(TrackError::EmptyTrack)?;
                tracing::warn!(
                    "No samples bracket time {}, clamping to sample {} at {}",
                    time,
                    index,
                    samples[index].timestamp
                );
                exact(samples, index, time)
            }
        };

        Ok(fix)
    }

    /// Parse an ISO 8601 UTC date-time and query [`Track::coordinate_at`]
    pub fn coordinate_at_iso(&self, date: &str) -> Result<Fix> {
        let time = parse_timestamp(date).map_err(|err| self.fail(err))?;
        self.coordinate_at(time)
    }

    /// Query many instants in parallel
    ///
    /// Results are returned in the order of `times`.
    pub fn coordinates_at(&self, times: &[i64]) -> Vec<Result<Fix>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::coordinates_at");

        times.par_iter().map(|&time| self.coordinate_at(time)).collect()
    }
}

/// Linear scan in stored order, first match wins
fn scan(samples: &[Sample], time: i64) -> Option<Position> {
    for (index, current) in samples.iter().enumerate() {
        if current.timestamp == time {
            return Some(Position::Exact(index));
        }

        if let Some(next) = samples.get(index + 1) {
            if current.timestamp < time && time < next.timestamp {
                return Some(Position::Between(index));
            }
        }
    }

    None
}

/// Binary search, equivalent to [`scan`] on non-decreasing timestamps
fn bisect(samples: &[Sample], time: i64) -> Option<Position> {
    let index = samples.partition_point(|sample| sample.timestamp < time);

    match samples.get(index) {
        Some(sample) if sample.timestamp == time => Some(Position::Exact(index)),
        Some(_) if index > 0 => Some(Position::Between(index - 1)),
        _ => None,
    }
}

/// Index of the sample closest in time, the first one on ties
fn nearest(samples: &[Sample], time: i64) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .min_by_key(|(_, sample)| sample.timestamp.abs_diff(time))
        .map(|(index, _)| index)
}

/// Answer from the sample at `index`, deriving missing heading and speed
/// from the leg toward its successor
fn exact(samples: &[Sample], index: usize, time: i64) -> Fix {
    let current = &samples[index];
    let next = samples.get(index + 1);

    let leg = || next.map(|next| (next, inverse(current, next)));

    let heading = current
        .heading
        .or_else(|| leg().map(|(_, inv)| inv.azimuth))
        .map(geodesy::normalize_azimuth);

    let speed = current.speed.or_else(|| {
        leg().and_then(|(next, inv)| {
            let elapsed = next.timestamp - current.timestamp;
            (elapsed > 0).then(|| inv.distance / elapsed as f64)
        })
    });

    Fix {
        timestamp: time,
        latitude: current.latitude,
        longitude: current.longitude,
        altitude: current.altitude,
        heading,
        speed,
    }
}

/// Interpolate strictly between two consecutive samples
///
/// With both speeds known the motion is treated as uniformly accelerated
/// between them; otherwise it is uniform over the geodesic leg.
fn between(current: &Sample, next: &Sample, time: i64) -> Fix {
    let inv = inverse(current, next);

    let t1 = current.timestamp as f64;
    let t2 = next.timestamp as f64;
    let t = time as f64;
    let elapsed = t2 - t1;
    let dt = t - t1;

    let altitude = match (current.altitude, next.altitude) {
        (Some(a1), Some(a2)) => Some(geodesy::lerp(t1, a1, t, t2, a2)),
        _ => None,
    };

    let (distance, speed) = match (current.speed, next.speed) {
        (Some(v1), Some(v2)) => {
            let acceleration = (v2 - v1) / elapsed;
            (
                v1 * dt + acceleration * dt * dt / 2.0,
                v1 + acceleration * dt,
            )
        }
        _ => (
            geodesy::lerp(t1, 0.0, t, t2, inv.distance),
            inv.distance / elapsed,
        ),
    };

    let (latitude, longitude) =
        geodesy::direct(current.latitude, current.longitude, inv.azimuth, distance);

    Fix {
        timestamp: time,
        latitude,
        longitude,
        altitude,
        heading: Some(inv.azimuth),
        speed: Some(speed),
    }
}

#[inline]
fn inverse(from: &Sample, to: &Sample) -> Inverse {
    geodesy::inverse(from.latitude, from.longitude, to.latitude, to.longitude)
}
