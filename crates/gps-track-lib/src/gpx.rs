//! GPX reader: `gpx` → `trk` → `trkseg` → `trkpt`

use crate::xml::{self, Element};
use crate::{FixQuality, Format, Result, Sample, Track, TrackError, parse_timestamp};

/// Parse a GPX document, adding one sample per usable track point
///
/// Points without coordinates or time are skipped; an unparsable time
/// aborts the whole document.
pub(crate) fn read(data: &[u8], track: &mut Track) -> Result<()> {
    let root = xml::parse(data)
        .map_err(|message| TrackError::parse(Format::Gpx, format!("can not parse XML: {message}")))?;

    if root.name != "gpx" {
        return Err(TrackError::parse(
            Format::Gpx,
            format!("XML type is not supported: '{}'", root.name),
        ));
    }

    for trk in root.children_named("trk") {
        for segment in trk.children_named("trkseg") {
            for point in segment.children_named("trkpt") {
                if let Some(sample) = read_point(point)? {
                    track.add_sample(sample)?;
                }
            }
        }
    }

    Ok(())
}

fn read_point(point: &Element) -> Result<Option<Sample>> {
    let latitude = point.attribute("lat").and_then(xml::parse_number);
    let longitude = point.attribute("lon").and_then(xml::parse_number);
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        tracing::debug!("Skipping trkpt without coordinates");
        return Ok(None);
    };

    let mut sample = Sample::new(0, latitude, longitude);
    let mut timestamp = None;

    for child in &point.children {
        match child.name.as_str() {
            "ele" => sample.altitude = child.number(),
            "time" => {
                timestamp = Some(parse_timestamp(child.text()).map_err(|_| {
                    TrackError::parse(Format::Gpx, format!("invalid time '{}'", child.text()))
                })?);
            }
            "course" => sample.heading = child.number(),
            "speed" => sample.speed = child.number(),
            "sat" => sample.satellite_count = child.text().parse().ok(),
            "fix" => sample.fix_quality = Some(fix_quality(child.text())),
            "hdop" => sample.hdop = child.number(),
            "vdop" => sample.vdop = child.number(),
            "pdop" => sample.pdop = child.number(),
            "extensions" => read_extensions(child, &mut sample),
            _ => {}
        }
    }

    let Some(timestamp) = timestamp else {
        tracing::debug!("Skipping trkpt at ({}, {}) without time", latitude, longitude);
        return Ok(None);
    };
    sample.timestamp = timestamp;

    Ok(Some(sample))
}

/// Garmin `TrackPointExtension` speed and course, overriding the core fields when present
fn read_extensions(extensions: &Element, sample: &mut Sample) {
    for extension in extensions.children_named("TrackPointExtension") {
        for child in &extension.children {
            match child.name.as_str() {
                "speed" => sample.speed = child.number().or(sample.speed),
                "course" => sample.heading = child.number().or(sample.heading),
                _ => {}
            }
        }
    }
}

/// Interpret the text of a `fix` element
fn fix_quality(text: &str) -> FixQuality {
    match text.to_ascii_lowercase().as_str() {
        "2d" => FixQuality::TwoDimensional,
        "3d" | "dgps" | "pps" => FixQuality::ThreeDimensional,
        _ => FixQuality::Unknown,
    }
}
