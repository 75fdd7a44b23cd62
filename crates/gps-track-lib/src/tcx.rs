//! TCX reader: `TrainingCenterDatabase` → `Activities` → `Activity` → `Lap` → `Track` → `Trackpoint`

use crate::xml::{self, Element};
use crate::{Format, Result, Sample, Track, TrackError, parse_timestamp};

pub(crate) fn read(data: &[u8], track: &mut Track) -> Result<()> {
    let root = xml::parse(data)
        .map_err(|message| TrackError::parse(Format::Tcx, format!("can not parse XML: {message}")))?;

    if root.name != "TrainingCenterDatabase" {
        return Err(TrackError::parse(
            Format::Tcx,
            format!("XML type is not supported: '{}'", root.name),
        ));
    }

    let trackpoints = root
        .children_named("Activities")
        .flat_map(|activities| activities.children_named("Activity"))
        .flat_map(|activity| activity.children_named("Lap"))
        .flat_map(|lap| lap.children_named("Track"))
        .flat_map(|segment| segment.children_named("Trackpoint"));

    for trackpoint in trackpoints {
        if let Some(sample) = read_trackpoint(trackpoint)? {
            track.add_sample(sample)?;
        }
    }

    Ok(())
}

fn read_trackpoint(trackpoint: &Element) -> Result<Option<Sample>> {
    let mut timestamp = None;
    let mut position = None;
    let mut altitude = None;
    let mut speed = None;

    for child in &trackpoint.children {
        match child.name.as_str() {
            "Time" => {
                timestamp = Some(parse_timestamp(child.text()).map_err(|_| {
                    TrackError::parse(Format::Tcx, format!("invalid time '{}'", child.text()))
                })?);
            }
            "Position" => {
                let latitude = child.find("LatitudeDegrees").and_then(Element::number);
                let longitude = child.find("LongitudeDegrees").and_then(Element::number);
                position = latitude.zip(longitude);
            }
            "AltitudeMeters" => altitude = child.number(),
            // Speed lives in an ActivityExtension `TPX` block under any prefix
            "Extensions" => speed = child.find("Speed").and_then(Element::number),
            _ => {}
        }
    }

    let (Some(timestamp), Some((latitude, longitude))) = (timestamp, position) else {
        tracing::debug!("Skipping Trackpoint without time or position");
        return Ok(None);
    };

    let mut sample = Sample::new(timestamp, latitude, longitude);
    sample.altitude = altitude;
    sample.speed = speed;
    Ok(Some(sample))
}
