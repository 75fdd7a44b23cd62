//! Whole-track summary statistics

use crate::geodesy;
use crate::{Result, Track, TrackError};

/// Aggregate statistics over every sample of a track
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Number of samples
    pub count: usize,
    /// Earliest timestamp
    pub start: i64,
    /// Latest timestamp
    pub end: i64,
    /// Sum of geodesic distances between consecutive samples, in meters
    pub distance: f64,
    /// Lowest observed speed in m/s
    ///
    /// When no sample carries a speed, both `min_speed` and `max_speed` hold
    /// the average speed `distance / (end - start)` instead.
    pub min_speed: Option<f64>,
    /// Highest observed speed in m/s
    pub max_speed: Option<f64>,
    /// Lowest observed altitude in meters, `None` when no sample has one
    pub min_altitude: Option<f64>,
    /// Highest observed altitude in meters
    pub max_altitude: Option<f64>,
}

impl Summary {
    /// Time span of the track in seconds
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Average speed over the whole span, `None` for a zero-length span
    pub fn average_speed(&self) -> Option<f64> {
        let duration = self.duration();
        (duration > 0).then(|| self.distance / duration as f64)
    }
}

/// Running minimum and maximum of the observed values
#[derive(Debug, Clone, Copy, Default)]
struct Extent(Option<(f64, f64)>);

impl Extent {
    fn include(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.0 = Some(match self.0 {
                None => (value, value),
                Some((min, max)) => (min.min(value), max.max(value)),
            });
        }
    }

    fn min(&self) -> Option<f64> {
        self.0.map(|(min, _)| min)
    }

    fn max(&self) -> Option<f64> {
        self.0.map(|(_, max)| max)
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Compute summary statistics in a single pass over the samples
    ///
    /// # Returns
    /// A [`Summary`], or [`TrackError::EmptyTrack`] when there are no samples
    pub fn summary(&self) -> Result<Summary> {
        let (start, end) = self
            .bounds()
            .ok_or(TrackError::EmptyTrack)
            .map_err(|err| self.fail(err))?;

        let samples = self.samples();
        let mut distance = 0.0;
        let mut speed = Extent::default();
        let mut altitude = Extent::default();

        for (index, current) in samples.iter().enumerate() {
            speed.include(current.speed);
            altitude.include(current.altitude);

            if let Some(next) = samples.get(index + 1) {
                distance += geodesy::inverse(
                    current.latitude,
                    current.longitude,
                    next.latitude,
                    next.longitude,
                )
                .distance;
            }
        }

        let mut summary = Summary {
            count: samples.len(),
            start,
            end,
            distance,
            min_speed: speed.min(),
            max_speed: speed.max(),
            min_altitude: altitude.min(),
            max_altitude: altitude.max(),
        };

        if summary.min_speed.is_none() {
            let average = summary.average_speed();
            summary.min_speed = average;
            summary.max_speed = average;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;

    fn track_of(samples: Vec<Sample>) -> Track {
        let mut track = Track::new();
        for sample in samples {
            track.add_sample(sample).unwrap();
        }
        track
    }

    /// Longitude offset on the equator spanning `meters`
    fn equator_lon(meters: f64) -> f64 {
        meters / (geodesy::WGS84_SEMI_MAJOR_AXIS * std::f64::consts::PI / 180.0)
    }

    #[test]
    fn test_empty_track_has_no_summary() {
        assert!(matches!(Track::new().summary(), Err(TrackError::EmptyTrack)));
    }

    #[test]
    fn test_average_speed_fallback() {
        let track = track_of(vec![
            Sample::new(0, 0.0, 0.0),
            Sample::new(100, 0.0, equator_lon(1000.0)),
        ]);
        let summary = track.summary().unwrap();

        assert_eq!(summary.count, 2);
        assert!((summary.distance - 1000.0).abs() < 1e-6);
        assert!((summary.min_speed.unwrap() - 10.0).abs() < 1e-8);
        assert_eq!(summary.min_speed, summary.max_speed);
        assert_eq!(summary.min_altitude, None);
        assert_eq!(summary.max_altitude, None);
    }

    #[test]
    fn test_observed_speed_and_altitude_ranges() {
        let track = track_of(vec![
            Sample::new(0, 0.0, 0.0).with_speed(3.0).with_altitude(-12.0),
            Sample::new(10, 0.0, 0.001).with_speed(1.5),
            Sample::new(20, 0.0, 0.002).with_altitude(340.0),
            Sample::new(30, 0.0, 0.003).with_speed(7.25).with_altitude(15.0),
        ]);
        let summary = track.summary().unwrap();

        assert_eq!(summary.start, 0);
        assert_eq!(summary.end, 30);
        assert_eq!(summary.min_speed, Some(1.5));
        assert_eq!(summary.max_speed, Some(7.25));
        assert_eq!(summary.min_altitude, Some(-12.0));
        assert_eq!(summary.max_altitude, Some(340.0));
    }

    #[test]
    fn test_negative_altitudes_are_kept() {
        let track = track_of(vec![
            Sample::new(0, 0.0, 0.0).with_altitude(-30.0),
            Sample::new(1, 0.0, 0.0).with_altitude(-10.0),
        ]);
        let summary = track.summary().unwrap();
        assert_eq!(summary.min_altitude, Some(-30.0));
        assert_eq!(summary.max_altitude, Some(-10.0));
    }

    #[test]
    fn test_distance_sums_consecutive_legs() {
        let track = track_of(vec![
            Sample::new(0, 0.0, 0.0),
            Sample::new(10, 0.0, equator_lon(250.0)),
            Sample::new(20, 0.0, 0.0),
        ]);
        let summary = track.summary().unwrap();
        assert!((summary.distance - 500.0).abs() < 1e-6);
        assert!((summary.average_speed().unwrap() - 25.0).abs() < 1e-8);
    }

    #[test]
    fn test_single_sample_without_speed() {
        let track = track_of(vec![Sample::new(5, 1.0, 1.0)]);
        let summary = track.summary().unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.distance, 0.0);
        assert_eq!(summary.duration(), 0);
        assert_eq!(summary.min_speed, None);
        assert_eq!(summary.max_speed, None);
    }

    #[test]
    fn test_bounds_follow_unordered_input() {
        let track = track_of(vec![
            Sample::new(40, 0.0, 0.0),
            Sample::new(-20, 0.0, 0.0),
            Sample::new(10, 0.0, 0.0),
        ]);
        let summary = track.summary().unwrap();
        assert_eq!((summary.start, summary.end), (-20, 40));
    }
}
