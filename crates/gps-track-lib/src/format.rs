//! Source format detection

use crate::xml;
use std::fmt;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Leading lines searched for an NMEA sentence start
const NMEA_PROBE_LINES: usize = 8;

/// Recognised track recording formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// GPX XML document
    Gpx,
    /// Garmin Training Center XML document
    Tcx,
    /// NMEA 0183 sentence stream
    Nmea,
    Unsupported,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Gpx => "GPX",
            Format::Tcx => "TCX",
            Format::Nmea => "NMEA",
            Format::Unsupported => "unsupported",
        })
    }
}

/// Classify a raw document
///
/// XML documents are classified by the local name of their root element.
/// Text is taken as NMEA when one of its first non-blank lines starts with
/// `$`, so captures that begin partway through a sentence still qualify.
pub fn detect_format(data: &[u8]) -> Format {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let content = data.trim_ascii_start();

    if content.starts_with(b"<") {
        return match xml::root_name(content).as_deref() {
            Some("gpx") => Format::Gpx,
            Some("TrainingCenterDatabase") => Format::Tcx,
            Some(other) => {
                tracing::debug!("XML type is not supported: '{}'", other);
                Format::Unsupported
            }
            None => Format::Unsupported,
        };
    }

    let mut lines = content
        .split(|&byte| byte == b'\r' || byte == b'\n')
        .map(<[u8]>::trim_ascii)
        .filter(|line| !line.is_empty())
        .take(NMEA_PROBE_LINES);
    if lines.any(|line| line.starts_with(b"$")) {
        return Format::Nmea;
    }

    Format::Unsupported
}
