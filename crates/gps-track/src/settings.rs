use clap::Parser;
use gps_track_lib::{Config, Lookup};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// GPS Track - Query the interpolated position and summary of a GPX, TCX or NMEA recording
pub struct Settings {
    /// Track file to load
    #[clap(short = 'T', long, value_name = "FILE")]
    pub track: PathBuf,

    /// Instant to locate, as ISO 8601 (e.g. 2024-05-01T06:00:05Z)
    #[clap(short = 'D', long, value_name = "ISO8601")]
    pub date: String,

    /// Print every loaded sample before the result
    #[clap(short, long, default_value = "false")]
    pub debug: bool,

    /// Use binary search for lookups on time-ordered tracks
    #[clap(long, default_value = "false")]
    pub bisect: bool,
}

impl Settings {
    /// Library configuration selected by the flags
    pub fn track_config(&self) -> Config {
        Config {
            lookup: if self.bisect {
                Lookup::Bisect
            } else {
                Lookup::Scan
            },
        }
    }
}
