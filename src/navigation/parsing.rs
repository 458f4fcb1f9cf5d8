//! Navigation body parsing: groups lines into records and decodes them
use std::io::{self, ErrorKind};

use log::debug;

use crate::{
    error::{FormatError, ParseWarning, ParsingError},
    navigation::{
        ephemeris::{parse_record, Decoded},
        field, Ephemeris, GlonassEphemeris, Header,
    },
    version::Version,
};

/// Decoded navigation body
#[derive(Debug, Default)]
pub(crate) struct Body {
    pub ephemerides: Vec<Ephemeris>,
    pub glonass: Vec<GlonassEphemeris>,
    pub warnings: Vec<ParseWarning>,
}

/// Lines of one record, not decoded yet
#[derive(Debug)]
struct PendingRecord {
    /// Line number of the first line
    first_line: usize,
    lines: Vec<String>,
    /// Set when this record is known to be unusable before decoding
    poisoned: Option<ParsingError>,
}

/// Returns true if `line` starts a new record
fn is_new_record(version: Version, line: &str) -> bool {
    if version.is_v3() {
        line.chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false)
    } else {
        !field(line, 0, 3).trim().is_empty()
    }
}

impl Body {
    fn flush(&mut self, header: &Header, record: PendingRecord, sbas: &mut usize) {
        if let Some(error) = record.poisoned {
            self.warnings.push(ParseWarning {
                line: record.first_line,
                error,
            });
            return;
        }
        let lines = record.lines.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        match parse_record(header.version, header.constellation, &lines) {
            Ok(Decoded::Kepler(eph)) => self.ephemerides.push(eph),
            Ok(Decoded::Glonass(eph)) => self.glonass.push(eph),
            Ok(Decoded::Sbas(_)) => *sbas += 1,
            Err(error) => self.warnings.push(ParseWarning {
                line: record.first_line,
                error,
            }),
        }
    }
}

/// Parses the body section, up to end of file.
/// Corrupt records are skipped and reported as warnings,
/// I/O errors (other than invalid content) are fatal.
pub(crate) fn parse_body<I>(header: &Header, lines: &mut I) -> Result<Body, FormatError>
where
    I: Iterator<Item = (usize, io::Result<String>)>,
{
    let mut body = Body::default();
    let mut pending = Option::<PendingRecord>::None;
    let mut sbas = 0_usize;

    for (line_number, line) in lines {
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                // non UTF-8 content: the record it belongs to is unusable
                match pending.as_mut() {
                    Some(record) => {
                        record.poisoned.get_or_insert(ParsingError::Encoding);
                    },
                    None => {
                        pending = Some(PendingRecord {
                            first_line: line_number,
                            lines: Vec::new(),
                            poisoned: Some(ParsingError::Encoding),
                        });
                    },
                }
                continue;
            },
            Err(e) => return Err(FormatError::IoError(e)),
        };

        if line.trim().is_empty() {
            continue;
        }

        if is_new_record(header.version, &line) {
            if let Some(record) = pending.take() {
                body.flush(header, record, &mut sbas);
            }
            pending = Some(PendingRecord {
                first_line: line_number,
                lines: vec![line],
                poisoned: None,
            });
        } else {
            match pending.as_mut() {
                Some(record) => record.lines.push(line),
                None => {
                    // continuation line with no epoch line
                    pending = Some(PendingRecord {
                        first_line: line_number,
                        lines: Vec::new(),
                        poisoned: Some(ParsingError::EpochFormat),
                    });
                },
            }
        }
    }

    if let Some(record) = pending.take() {
        body.flush(header, record, &mut sbas);
    }

    if sbas > 0 {
        debug!("skipped {} SBAS record(s)", sbas);
    }
    Ok(body)
}
