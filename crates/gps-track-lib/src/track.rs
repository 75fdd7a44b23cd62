//! Track store: append-only, time-keyed samples with running bounds
//!
//! This module owns the insertion protocol shared by every reader and the
//! ingestion entry points that detect a source format and dispatch to it.

use crate::{Format, Result, Sample, TrackError, detect_format, gpx, nmea, tcx};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Observer for human-readable failure messages
///
/// Purely observational: it is invoked on every failure path and never
/// influences the outcome of the operation that reported it.
pub type DiagnosticSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Strategy used to locate the samples surrounding a queried instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lookup {
    /// Linear scan over the stored order, first match wins
    #[default]
    Scan,
    /// Binary search, used only while samples were inserted in non-decreasing
    /// time order; otherwise the scan is used so answers never differ
    Bisect,
}

/// Configuration for a track
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// How point-in-time queries find their bracketing samples
    pub lookup: Lookup,
}

/// Time-ordered collection of samples
///
/// Samples are kept in insertion order and never removed or mutated. The
/// `[start, end]` bounds are derived solely from inserted timestamps.
/// All queries take `&self`, so a built track can be shared across threads.
pub struct Track {
    /// Samples in insertion order
    samples: Vec<Sample>,
    /// Min and max timestamp, `None` until the first insertion
    bounds: Option<(i64, i64)>,
    /// Whether every insertion so far kept timestamps non-decreasing
    ordered: bool,
    /// Configuration settings
    config: Config,
    diagnostics: Option<DiagnosticSink>,
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("samples", &self.samples.len())
            .field("bounds", &self.bounds)
            .field("ordered", &self.ordered)
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Create an empty track with the default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty track with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            samples: Vec::new(),
            bounds: None,
            ordered: true,
            config,
            diagnostics: None,
        }
    }

    /// Attach a sink receiving a message for every reported failure
    pub fn with_diagnostics(mut self, sink: DiagnosticSink) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Parse a whole document into a new track
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut track = Self::new();
        track.load_bytes(data)?;
        Ok(track)
    }

    /// Read and parse a whole file into a new track
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut track = Self::new();
        track.load_file(path)?;
        Ok(track)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Append one sample, extending the time bounds to cover it
    ///
    /// The store does not sort: samples stay in the order they are added.
    /// Fails only when storage can not grow, in which case the track is
    /// left exactly as it was.
    pub fn add_sample(&mut self, sample: Sample) -> Result<()> {
        self.samples.try_reserve(1)?;
        self.push_reserved(sample);
        Ok(())
    }

    /// Detect the format of `data`, parse it and append every sample it yields
    ///
    /// Ingestion is all-or-nothing: samples are staged while the document is
    /// parsed and only appended once the whole document has been accepted.
    ///
    /// # Returns
    /// The number of samples appended
    pub fn load_bytes(&mut self, data: &[u8]) -> Result<usize> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::load_bytes");

        let format = detect_format(data);
        tracing::debug!("Loading {} bytes as {}", data.len(), format);

        let mut staging = Track::new();
        let parsed = match format {
            Format::Gpx => gpx::read(data, &mut staging),
            Format::Tcx => tcx::read(data, &mut staging),
            Format::Nmea => nmea::read(data, &mut staging),
            Format::Unsupported => Err(TrackError::UnsupportedFormat),
        };

        let appended = parsed
            .and_then(|()| self.append(staging))
            .map_err(|err| self.fail(err))?;
        tracing::debug!("Appended {} {} samples", appended, format);
        Ok(appended)
    }

    /// Read a whole file and load it with [`Track::load_bytes`]
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| {
            self.diagnose(&format!("can not open '{}': {}", path.display(), err));
            TrackError::Io(err)
        })?;
        self.load_bytes(&data)
    }

    /// Move every staged sample into this track, or none of them
    fn append(&mut self, staging: Track) -> Result<usize> {
        if staging.is_empty() {
            return Err(TrackError::NoPoints);
        }

        let count = staging.len();
        self.samples.try_reserve(count)?;
        for sample in staging.samples {
            self.push_reserved(sample);
        }
        Ok(count)
    }

    fn push_reserved(&mut self, sample: Sample) {
        let timestamp = sample.timestamp;

        if let Some(last) = self.samples.last() {
            self.ordered &= last.timestamp <= timestamp;
        }
        self.bounds = Some(match self.bounds {
            None => (timestamp, timestamp),
            Some((start, end)) => (start.min(timestamp), end.max(timestamp)),
        });

        self.samples.push(sample);
    }

    /// Get all samples in insertion order
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest timestamp, `None` while empty
    #[inline]
    pub fn start(&self) -> Option<i64> {
        self.bounds.map(|(start, _)| start)
    }

    /// Latest timestamp, `None` while empty
    #[inline]
    pub fn end(&self) -> Option<i64> {
        self.bounds.map(|(_, end)| end)
    }

    #[inline]
    pub(crate) fn bounds(&self) -> Option<(i64, i64)> {
        self.bounds
    }

    /// Whether samples were inserted in non-decreasing time order
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// One formatted line per sample, each an independently owned string
    pub fn dump(&self) -> impl Iterator<Item = String> + '_ {
        self.samples.iter().map(Sample::to_string)
    }

    /// Hand a message to the diagnostic sink, or log it as a warning when
    /// no sink is attached
    pub(crate) fn diagnose(&self, message: &str) {
        match &self.diagnostics {
            Some(sink) => {
                tracing::debug!("{}", message);
                sink(message);
            }
            None => tracing::warn!("{}", message),
        }
    }

    /// Report `err` as a diagnostic and hand it back for propagation
    pub(crate) fn fail(&self, err: TrackError) -> TrackError {
        self.diagnose(&err.to_string());
        err
    }
}
