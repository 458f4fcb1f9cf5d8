use thiserror::Error;

use crate::prelude::{Constellation, SV};

/// Errors that may rise while parsing a single navigation record
/// or header field. They never abort the file parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("invalid satellite identifier \"{0}\"")]
    SVParsing(String),
    #[error("invalid constellation \"{0}\"")]
    ConstellationParsing(String),
    #[error("bad year field \"{0}\"")]
    YearField(String),
    #[error("bad month field \"{0}\"")]
    MonthField(String),
    #[error("bad day field \"{0}\"")]
    DayField(String),
    #[error("bad hours field \"{0}\"")]
    HoursField(String),
    #[error("bad minutes field \"{0}\"")]
    MinutesField(String),
    #[error("bad seconds field \"{0}\"")]
    SecondsField(String),
    #[error("epoch format mismatch")]
    EpochFormat,
    #[error("failed to parse clock field \"{0}\"")]
    ClockParsing(String),
    #[error("failed to parse orbit field {0}: \"{1}\"")]
    OrbitParsing(&'static str, String),
    #[error("missing mandatory orbit field \"{0}\"")]
    MissingOrbitField(&'static str),
    #[error("truncated record: {0} line(s) missing")]
    TruncatedRecord(usize),
    #[error("line too short")]
    LineTooShort,
    #[error("invalid leap second descriptor")]
    LeapParsing,
    #[error("invalid version number")]
    VersionParsing,
    #[error("unknown time system correction \"{0}\"")]
    TimeSystemCorrection(String),
    #[error("non supported constellation {0}")]
    NonSupportedConstellation(Constellation),
    #[error("non UTF-8 content")]
    Encoding,
}

/// A corrupt record that was skipped while parsing the body.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {error}")]
pub struct ParseWarning {
    /// Line number (starting at 1) of the first line of the skipped record
    pub line: usize,
    /// Reason
    pub error: ParsingError,
}

/// Fatal errors, for a given navigation file. Previously ingested
/// content is never affected.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("missing RINEX VERSION / TYPE header")]
    MissingVersionHeader,
    #[error("non supported revision {0}")]
    NonSupportedVersion(String),
    #[error("not a navigation file (type \"{0}\")")]
    NotNavigation(char),
    #[error("invalid RINEX VERSION / TYPE header: {0}")]
    BadVersionHeader(ParsingError),
    #[error("end of file reached before END OF HEADER")]
    MissingEndOfHeader,
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Satellite state resolution errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("null pseudo range: no measurement")]
    NoMeasurement,
    #[error("{0}: no ephemeris found")]
    NoEphemerisFound(SV),
    #[error("{0}: unhealthy satellite")]
    UnhealthySatellite(SV),
    #[error("{0}: missing orbital data")]
    MissingOrbitalData(SV),
    #[error("non supported constellation {0}")]
    NonSupportedConstellation(Constellation),
    #[error("{0}: propagation span exceeds the integration limit")]
    IntegrationSpan(SV),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
