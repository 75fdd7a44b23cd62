//! Human-readable rendering of query results

use gps_track_lib::{Fix, Summary, Track, TrackError, format_timestamp};
use std::fmt;

const MPS_TO_KPH: f64 = 3.6;

/// `DD HH:MM:SS` rendering of a number of seconds
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02} {:02}:{:02}:{:02}",
        seconds / 86_400,
        seconds % 86_400 / 3_600,
        seconds % 3_600 / 60,
        seconds % 60
    )
}

/// Value with its unit, or `n/a` alone when absent
fn measure(value: Option<f64>, precision: usize, unit: &str) -> String {
    match value {
        Some(value) if unit.is_empty() => format!("{value:.precision$}"),
        Some(value) => format!("{value:.precision$} {unit}"),
        None => "n/a".to_string(),
    }
}

fn kph(speed: Option<f64>) -> Option<f64> {
    speed.map(|speed| speed * MPS_TO_KPH)
}

/// Single line describing an interpolated fix
pub fn position(fix: &Fix) -> String {
    format!(
        "latitude: {:.6}, longitude: {:.6}, altitude: {}, azimuth: {}, speed: {}",
        fix.latitude,
        fix.longitude,
        measure(fix.altitude, 1, ""),
        measure(fix.heading, 1, ""),
        measure(kph(fix.speed), 2, "kph"),
    )
}

/// Multi-line block describing the whole track
pub fn summary(summary: &Summary) -> String {
    let rows = [
        ("points", summary.count.to_string()),
        ("start", format_timestamp(summary.start)),
        ("end", format_timestamp(summary.end)),
        ("duration", format_duration(summary.duration())),
        ("distance", measure(Some(summary.distance), 1, "m")),
        ("min speed", measure(kph(summary.min_speed), 2, "kph")),
        ("average speed", measure(kph(summary.average_speed()), 2, "kph")),
        ("max speed", measure(kph(summary.max_speed), 2, "kph")),
        ("min altitude", measure(summary.min_altitude, 1, "m")),
        ("max altitude", measure(summary.max_altitude, 1, "m")),
    ];

    rows.iter()
        .map(|(label, value)| format!("{:<15}{}\n", format!("{label}:"), value))
        .collect()
}

/// Output of one invocation: the queried fix, when there is one, and the summary
#[derive(Debug, Clone)]
pub struct Report {
    pub fix: Option<Fix>,
    pub summary: Summary,
}

impl Report {
    /// Query `date` and summarise `track`
    ///
    /// A failed query leaves `fix` empty but still yields the summary; the
    /// failure itself reaches the track's diagnostic sink.
    pub fn build(track: &Track, date: &str) -> Result<Self, TrackError> {
        let fix = track.coordinate_at_iso(date).ok();
        let summary = track.summary()?;
        Ok(Self { fix, summary })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fix) = &self.fix {
            writeln!(f, "{}", position(fix))?;
        }
        f.write_str(&summary(&self.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gps_track_lib::DiagnosticSink;
    use std::sync::{Arc, Mutex};

    const RIDE: &str = r#"<gpx version="1.1"><trk><trkseg>
        <trkpt lat="46.5" lon="6.6"><ele>372.0</ele><time>2024-05-01T06:00:00Z</time></trkpt>
        <trkpt lat="46.51" lon="6.6"><ele>380.0</ele><time>2024-05-01T07:00:00Z</time></trkpt>
    </trkseg></trk></gpx>"#;

    fn ride_with_messages() -> (Track, Arc<Mutex<Vec<String>>>) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let captured = messages.clone();
        let sink: DiagnosticSink = Arc::new(move |msg: &str| {
            captured.lock().unwrap().push(msg.to_string());
        });
        let mut track = Track::new().with_diagnostics(sink);
        track.load_bytes(RIDE.as_bytes()).unwrap();
        (track, messages)
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00 00:00:00");
        assert_eq!(format_duration(59), "00 00:00:59");
        assert_eq!(format_duration(3_661), "00 01:01:01");
        assert_eq!(format_duration(2 * 86_400 + 23 * 3_600 + 59 * 60 + 58), "02 23:59:58");
        assert_eq!(format_duration(-5), "00 00:00:00");
    }

    #[test]
    fn test_position_line() {
        let fix = Fix {
            timestamp: 0,
            latitude: 46.5,
            longitude: -6.25,
            altitude: Some(372.44),
            heading: None,
            speed: Some(10.0),
        };
        assert_eq!(
            position(&fix),
            "latitude: 46.500000, longitude: -6.250000, altitude: 372.4, azimuth: n/a, speed: 36.00 kph"
        );
    }

    #[test]
    fn test_summary_block() {
        let summary = Summary {
            count: 2,
            start: 1_714_543_200,
            end: 1_714_546_800,
            distance: 36_000.0,
            min_speed: Some(10.0),
            max_speed: Some(10.0),
            min_altitude: None,
            max_altitude: None,
        };
        let block = summary_block_lines(&summary);
        assert_eq!(block[0], "points:        2");
        assert_eq!(block[1], "start:         2024-05-01T06:00:00Z");
        assert_eq!(block[3], "duration:      00 01:00:00");
        assert_eq!(block[4], "distance:      36000.0 m");
        assert_eq!(block[6], "average speed: 36.00 kph");
        assert_eq!(block[8], "min altitude:  n/a");
        assert_eq!(block.len(), 10);
    }

    #[test]
    fn test_report_with_fix() {
        let (track, messages) = ride_with_messages();
        let report = Report::build(&track, "2024-05-01T06:30:00Z").unwrap();

        assert!(report.fix.is_some());
        let text = report.to_string();
        assert!(text.starts_with("latitude: "));
        assert!(text.contains("\npoints:        2\n"));
        assert!(messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_date_still_reports_summary() {
        let (track, messages) = ride_with_messages();
        let report = Report::build(&track, "2024-05-01T12:00:00Z").unwrap();

        assert!(report.fix.is_none());
        assert_eq!(report.summary.count, 2);
        assert!(report.to_string().starts_with("points:        2\n"));

        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("is out of track range"));
    }

    #[test]
    fn test_unparsable_date_still_reports_summary() {
        let (track, messages) = ride_with_messages();
        let report = Report::build(&track, "tomorrow").unwrap();

        assert!(report.fix.is_none());
        assert_eq!(report.summary.min_altitude, Some(372.0));
        assert_eq!(messages.lock().unwrap().len(), 1);
    }

    fn summary_block_lines(value: &Summary) -> Vec<String> {
        summary(value).lines().map(str::to_string).collect()
    }
}
