//! RINEX navigation files: header, broadcast ephemerides and correction models.
use std::{
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    error::{FormatError, ParseWarning},
    reader::BufferedReader,
    time::GnssTime,
};

mod ephemeris;
mod glonass;
mod header;
mod health;
mod ionosphere;
mod orbits;
mod parsing;
mod time_offset;
mod utc;

pub use ephemeris::{Ephemeris, Kepler, KeplerSolution, Perturbations};
pub use glonass::GlonassEphemeris;
pub use header::Header;
pub use health::GalHealth;
pub use ionosphere::{IonosphereModel, KbModel, KbRegionCode, NgModel, NgRegionFlags};
pub use orbits::OrbitItem;
pub use time_offset::{TimeOffsetModel, TimeSystemCorrection};
pub use utc::UtcModel;

pub(crate) use ephemeris::solve_kepler;

/// Time span (s) covered by the last record of a file
pub(crate) const RECORD_COVERAGE_S: f64 = 7200.0;

/// Returns columns [start, end) of `line`, tolerating short lines:
/// missing columns are returned as an empty (or shortened) slice.
pub(crate) fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

/// Parses a FORTRAN formatted float (D or d exponent markers).
/// Blank fields return None.
pub(crate) fn parse_f64(content: &str) -> Option<f64> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    if content.contains(['D', 'd']) {
        content.replace(['D', 'd'], "E").parse::<f64>().ok()
    } else {
        content.parse::<f64>().ok()
    }
}

/// A parsed navigation file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationFile {
    /// File [Header], including the correction models
    pub header: Header,
    /// Keplerian ephemerides (GPS, Galileo, BeiDou, QZSS, IRNSS)
    pub ephemerides: Vec<Ephemeris>,
    /// Glonass state vector ephemerides
    pub glonass: Vec<GlonassEphemeris>,
    /// Records that were skipped
    pub warnings: Vec<ParseWarning>,
}

impl NavigationFile {
    /// Parses a navigation file from any [BufRead]able interface.
    /// Fails on unrecognized or truncated header only: corrupt records
    /// are skipped and reported in [NavigationFile::warnings].
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, FormatError> {
        let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));
        let (header, mut warnings) = Header::parse(&mut lines)?;

        let body = parsing::parse_body(&header, &mut lines)?;
        warnings.extend(body.warnings);

        for warning in warnings.iter() {
            warn!("skipped record: {}", warning);
        }

        let nav = Self {
            header,
            ephemerides: body.ephemerides,
            glonass: body.glonass,
            warnings,
        };

        debug!(
            "parsed RINEX V{}: {} ephemerides, {} glonass, {} skipped",
            nav.header.version,
            nav.ephemerides.len(),
            nav.glonass.len(),
            nav.warnings.len(),
        );
        Ok(nav)
    }

    /// Parses a local navigation file. Files terminated by ".gz" are
    /// decompressed on the fly when the `flate2` feature is enabled.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let reader = BufferedReader::new(path.as_ref())?;
        Self::parse(reader)
    }

    /// Returns true if this file has no usable record
    pub fn is_empty(&self) -> bool {
        self.ephemerides.is_empty() && self.glonass.is_empty()
    }

    /// Returns the time span covered by this file: from the first
    /// reference time to the last reference time plus 2 hours.
    pub fn time_span(&self) -> Option<(GnssTime, GnssTime)> {
        let tocs = self
            .ephemerides
            .iter()
            .map(|eph| eph.toc)
            .chain(self.glonass.iter().map(|eph| eph.toc));
        match tocs.minmax() {
            itertools::MinMaxResult::NoElements => None,
            itertools::MinMaxResult::OneElement(t) => Some((t, t + RECORD_COVERAGE_S)),
            itertools::MinMaxResult::MinMax(min, max) => Some((min, max + RECORD_COVERAGE_S)),
        }
    }
}

impl FromStr for NavigationFile {
    type Err = FormatError;
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Self::parse(BufReader::new(content.as_bytes()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn fortran_floats() {
        assert_eq!(parse_f64(" -0.357390008867D-03"), Some(-0.357390008867E-03));
        assert_eq!(parse_f64("0.1167d+06"), Some(0.1167E+06));
        assert_eq!(parse_f64("5.153610000000E+03"), Some(5153.61));
        assert_eq!(parse_f64("   0.000000000000D+00"), Some(0.0));
        assert_eq!(parse_f64("                   "), None);
        assert_eq!(parse_f64("0.12A45"), None);
    }
    #[test]
    fn short_lines() {
        let line = "   0.1";
        assert_eq!(field(line, 0, 3), "   ");
        assert_eq!(field(line, 3, 22), "0.1");
        assert_eq!(field(line, 22, 41), "");
        assert_eq!(field(line, 60, 80), "");
    }
}
