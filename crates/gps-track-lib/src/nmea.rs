//! NMEA 0183 reader
//!
//! Sentences are grouped into samples: a sample is complete once an RMC, a GGA
//! and a GSA sentence have all been seen since the previous sample.
//!
//! - RMC: time, date, position, speed and course (valid fixes only)
//! - GGA: altitude and satellite count
//! - GSA: fix type and dilution of precision
//!
//! GST, GLL, GSV and VTG sentences are recognised but contribute nothing.

use crate::{FixQuality, Result, Sample, Track};
use chrono::{NaiveDate, NaiveTime};
use smallvec::SmallVec;

const KNOTS_TO_METERS_PER_SECOND: f64 = 0.514444;

/// Fields of one sentence, address first (GSA has 18)
type Fields<'a> = SmallVec<[&'a str; 20]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SentenceKind {
    Rmc,
    Gga,
    Gsa,
    Gst,
    Gll,
    Gsv,
    Vtg,
}

impl SentenceKind {
    fn from_type(code: &str) -> Option<Self> {
        Some(match code {
            "RMC" => SentenceKind::Rmc,
            "GGA" => SentenceKind::Gga,
            "GSA" => SentenceKind::Gsa,
            "GST" => SentenceKind::Gst,
            "GLL" => SentenceKind::Gll,
            "GSV" => SentenceKind::Gsv,
            "VTG" => SentenceKind::Vtg,
            _ => return None,
        })
    }
}

/// Recommended minimum data
#[derive(Debug, Clone, PartialEq)]
struct Rmc {
    timestamp: i64,
    latitude: f64,
    longitude: f64,
    speed: Option<f64>,
    course: Option<f64>,
}

/// Fix data
#[derive(Debug, Clone, PartialEq)]
struct Gga {
    satellites: Option<u32>,
    altitude: Option<f64>,
}

/// DOP and active satellites
#[derive(Debug, Clone, PartialEq)]
struct Gsa {
    fix_quality: Option<FixQuality>,
    pdop: Option<f64>,
    hdop: Option<f64>,
    vdop: Option<f64>,
}

/// Sentences seen since the last completed sample
#[derive(Debug, Default)]
struct Accumulator {
    rmc: Option<Rmc>,
    gga: Option<Gga>,
    gsa: Option<Gsa>,
}

impl Accumulator {
    /// Combine and reset once all three contributing sentences are present
    fn take_complete(&mut self) -> Option<Sample> {
        if self.rmc.is_none() || self.gga.is_none() || self.gsa.is_none() {
            return None;
        }
        let (rmc, gga, gsa) = (self.rmc.take()?, self.gga.take()?, self.gsa.take()?);

        let mut sample = Sample::new(rmc.timestamp, rmc.latitude, rmc.longitude);
        sample.speed = rmc.speed;
        sample.heading = rmc.course;
        sample.altitude = gga.altitude;
        sample.satellite_count = gga.satellites;
        sample.fix_quality = gsa.fix_quality;
        sample.hdop = gsa.hdop;
        sample.vdop = gsa.vdop;
        sample.pdop = gsa.pdop;
        Some(sample)
    }
}

/// Scan an NMEA sentence stream, adding one sample per completed group
pub(crate) fn read(data: &[u8], track: &mut Track) -> Result<()> {
    let text = String::from_utf8_lossy(data);
    let mut pending = Accumulator::default();

    for line in text.split(['\r', '\n']).map(str::trim).filter(|l| !l.is_empty()) {
        let Some((kind, fields)) = split_sentence(line) else {
            tracing::trace!("Ignoring line '{}'", line);
            continue;
        };

        match kind {
            SentenceKind::Rmc => {
                if let Some(rmc) = parse_rmc(&fields) {
                    pending.rmc = Some(rmc);
                }
            }
            SentenceKind::Gga => {
                if let Some(gga) = parse_gga(&fields) {
                    pending.gga = Some(gga);
                }
            }
            SentenceKind::Gsa => {
                if let Some(gsa) = parse_gsa(&fields) {
                    pending.gsa = Some(gsa);
                }
            }
            SentenceKind::Gst | SentenceKind::Gll | SentenceKind::Gsv | SentenceKind::Vtg => {
                tracing::trace!("Observed {:?} sentence", kind);
            }
        }

        if let Some(sample) = pending.take_complete() {
            track.add_sample(sample)?;
        }
    }

    Ok(())
}

/// XOR of every byte between `$` and `*`
pub(crate) fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, byte| acc ^ byte)
}

/// Validate framing and checksum, then split into fields
fn split_sentence(line: &str) -> Option<(SentenceKind, Fields<'_>)> {
    let (body, declared) = line.strip_prefix('$')?.split_once('*')?;
    let declared = u8::from_str_radix(declared.get(..2)?, 16).ok()?;
    if checksum(body) != declared {
        tracing::debug!("Checksum mismatch in '{}'", line);
        return None;
    }

    let fields: Fields<'_> = body.split(',').collect();
    // Two-letter talker followed by the sentence type
    let address = fields.first()?;
    let kind = SentenceKind::from_type(address.get(2..)?)?;
    Some((kind, fields))
}

fn parse_rmc(fields: &[&str]) -> Option<Rmc> {
    if fields.len() < 10 || fields[2] != "A" {
        return None;
    }

    let time = parse_time(fields[1])?;
    let date = parse_date(fields[9])?;

    Some(Rmc {
        timestamp: date.and_time(time).and_utc().timestamp(),
        latitude: parse_coordinate(fields[3], fields[4])?,
        longitude: parse_coordinate(fields[5], fields[6])?,
        speed: parse_float(fields[7]).map(|knots| knots * KNOTS_TO_METERS_PER_SECOND),
        course: parse_float(fields[8]),
    })
}

fn parse_gga(fields: &[&str]) -> Option<Gga> {
    if fields.len() < 10 {
        return None;
    }

    Some(Gga {
        satellites: fields[7].parse().ok(),
        altitude: parse_float(fields[9]),
    })
}

fn parse_gsa(fields: &[&str]) -> Option<Gsa> {
    if fields.len() < 18 {
        return None;
    }

    let fix_quality = match fields[2] {
        "" => None,
        "2" => Some(FixQuality::TwoDimensional),
        "3" => Some(FixQuality::ThreeDimensional),
        _ => Some(FixQuality::Unknown),
    };

    Some(Gsa {
        fix_quality,
        pdop: parse_float(fields[15]),
        hdop: parse_float(fields[16]),
        vdop: parse_float(fields[17]),
    })
}

fn parse_float(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse NMEA coordinate field (ddmm.mmmm format)
fn parse_coordinate(value: &str, hemisphere: &str) -> Option<f64> {
    let value = parse_float(value)?;

    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere {
        "N" | "E" => Some(decimal),
        "S" | "W" => Some(-decimal),
        _ => None,
    }
}

/// Parse NMEA time field (hhmmss.ss format), dropping fractions
fn parse_time(field: &str) -> Option<NaiveTime> {
    let hh = field.get(0..2)?.parse().ok()?;
    let mm = field.get(2..4)?.parse().ok()?;
    let ss = field.get(4..6)?.parse().ok()?;
    NaiveTime::from_hms_opt(hh, mm, ss)
}

/// Parse NMEA date field (ddmmyy format), two-digit years are 20yy
fn parse_date(field: &str) -> Option<NaiveDate> {
    if field.len() != 6 {
        return None;
    }
    let dd = field.get(0..2)?.parse().ok()?;
    let mm = field.get(2..4)?.parse().ok()?;
    let yy: i32 = field.get(4..6)?.parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + yy, mm, dd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackError;

    /// Frame a sentence body with `$` and its checksum
    fn sentence(body: &str) -> String {
        format!("${}*{:02X}", body, checksum(body))
    }

    fn rmc() -> String {
        sentence("GPRMC,081836.00,A,3751.65,S,14507.36,E,10.0,360.0,130998,011.3,E")
    }

    fn gga() -> String {
        sentence("GPGGA,081836.00,3751.65,S,14507.36,E,1,07,1.0,25.3,M,-34.0,M,,")
    }

    fn gsa() -> String {
        sentence("GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1")
    }

    fn read_lines(lines: &[String]) -> Track {
        let mut track = Track::new();
        read(lines.join("\r\n").as_bytes(), &mut track).unwrap();
        track
    }

    #[test]
    fn test_checksum_of_reference_sentences() {
        let reference = [
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A",
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47",
            "$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39",
        ];
        for line in reference {
            assert!(split_sentence(line).is_some(), "rejected {line}");
        }
    }

    #[test]
    fn test_bad_checksum_is_ignored() {
        assert!(split_sentence("$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*38").is_none());
        assert!(split_sentence("$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1").is_none());
        assert!(split_sentence("GPGSA,A,3*00").is_none());
    }

    #[test]
    fn test_sentence_kind_ignores_talker() {
        let framed = sentence("GNRMC,1,2");
        let (kind, fields) = split_sentence(&framed).unwrap();
        assert_eq!(kind, SentenceKind::Rmc);
        assert_eq!(fields.as_slice(), ["GNRMC", "1", "2"]);
        assert!(split_sentence(&sentence("GPZDA,1,2")).is_none());
    }

    #[test]
    fn test_complete_group_emits_one_sample() {
        let track = read_lines(&[rmc(), gga(), gsa()]);
        assert_eq!(track.len(), 1);

        let sample = &track.samples()[0];
        let expected = NaiveDate::from_ymd_opt(2098, 9, 13)
            .unwrap()
            .and_hms_opt(8, 18, 36)
            .unwrap()
            .and_utc()
            .timestamp();
        assert_eq!(sample.timestamp, expected);
        assert!((sample.latitude - -(37.0 + 51.65 / 60.0)).abs() < 1e-9);
        assert!((sample.longitude - (145.0 + 7.36 / 60.0)).abs() < 1e-9);
        assert!((sample.speed.unwrap() - 5.14444).abs() < 1e-9);
        assert_eq!(sample.heading, Some(360.0));
        assert_eq!(sample.altitude, Some(25.3));
        assert_eq!(sample.satellite_count, Some(7));
        assert_eq!(sample.fix_quality, Some(FixQuality::ThreeDimensional));
        assert_eq!(sample.pdop, Some(2.5));
        assert_eq!(sample.hdop, Some(1.3));
        assert_eq!(sample.vdop, Some(2.1));
    }

    #[test]
    fn test_lone_rmc_emits_nothing() {
        let track = read_lines(&[rmc()]);
        assert!(track.is_empty());

        let mut track = Track::new();
        assert!(matches!(
            track.load_bytes(rmc().as_bytes()),
            Err(TrackError::NoPoints)
        ));
    }

    #[test]
    fn test_capture_starting_mid_sentence_loads() {
        let capture = [
            "36.00,A,3751.65,S,14507.36,E,10.0,360.0,130998,011.3,E*1F".to_string(),
            rmc(),
            gga(),
            gsa(),
        ]
        .join("\r\n");

        let mut track = Track::new();
        assert_eq!(track.load_bytes(capture.as_bytes()).unwrap(), 1);
        assert_eq!(track.samples()[0].satellite_count, Some(7));
    }

    #[test]
    fn test_order_within_group_does_not_matter() {
        let track = read_lines(&[gsa(), gga(), rmc()]);
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_accumulator_resets_after_each_sample() {
        let track = read_lines(&[rmc(), gga(), gsa(), rmc(), gga(), rmc(), gsa()]);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_other_sentences_do_not_contribute() {
        let lines = [
            rmc(),
            sentence("GPVTG,054.7,T,034.4,M,005.5,N,010.2,K"),
            sentence("GPGSV,2,1,08,01,40,083,46,02,17,308,41,12,07,344,39,14,22,228,45"),
            sentence("GPGLL,4916.45,N,12311.12,W,225444,A"),
            gga(),
            sentence("GPGST,172814.0,0.006,0.023,0.020,273.6,0.023,0.020,0.031"),
        ];
        assert!(read_lines(&lines).is_empty());
    }

    #[test]
    fn test_void_rmc_is_not_a_fix() {
        let void = sentence("GPRMC,081836.00,V,3751.65,S,14507.36,E,10.0,360.0,130998,011.3,E");
        assert!(read_lines(&[void, gga(), gsa()]).is_empty());
    }

    #[test]
    fn test_empty_optional_fields_are_absent() {
        let lines = [
            sentence("GPRMC,000000,A,0000.00,N,00000.00,E,,,010100,,"),
            sentence("GPGGA,000000,0000.00,N,00000.00,E,1,,,,M,,M,,"),
            sentence("GPGSA,A,,,,,,,,,,,,,,,,"),
        ];
        let track = read_lines(&lines);
        let sample = &track.samples()[0];
        assert_eq!(sample.timestamp, 946_684_800);
        assert_eq!(sample.speed, None);
        assert_eq!(sample.heading, None);
        assert_eq!(sample.altitude, None);
        assert_eq!(sample.satellite_count, None);
        assert_eq!(sample.fix_quality, None);
        assert_eq!(sample.hdop, None);
    }

    #[test]
    fn test_coordinate_hemispheres() {
        assert!((parse_coordinate("4807.038", "N").unwrap() - 48.1173).abs() < 1e-9);
        assert!((parse_coordinate("01131.000", "W").unwrap() + 11.516_666_666).abs() < 1e-8);
        assert_eq!(parse_coordinate("", "N"), None);
        assert_eq!(parse_coordinate("4807.038", ""), None);
    }
}
