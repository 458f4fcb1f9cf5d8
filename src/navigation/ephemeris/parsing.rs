//! Broadcast navigation record decoding
use std::{collections::HashMap, str::FromStr};

use crate::{
    epoch,
    error::ParsingError,
    navigation::{
        field,
        orbits::{orbit_fields, OrbitItem, OrbitLine},
        parse_f64, Ephemeris, GlonassEphemeris,
    },
    prelude::{Constellation, SV},
    version::Version,
};

/// Fields that any Keplerian record must carry
const MANDATORY_FIELDS: [&str; 17] = [
    "crs", "deltaN", "m0", "cuc", "e", "cus", "sqrta", "toe", "cic", "omega0", "cis", "i0",
    "crc", "omega", "omegaDot", "idot", "week",
];

/// Minimal number of continuation lines of a Keplerian record
/// (up to and including the week counter)
const MIN_KEPLER_LINES: usize = 5;

/// Width of one continuation field
const FIELD_WIDTH: usize = 19;

/// One decoded body record
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decoded {
    /// Keplerian ephemeris
    Kepler(Ephemeris),
    /// GLONASS state vector
    Glonass(GlonassEphemeris),
    /// SBAS messages are recognized, not decoded
    Sbas(SV),
}

/// Column layout of a record, resolved from its first line
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    /// Satellite identifier columns
    sv: (usize, usize),
    /// Date columns
    date: (usize, usize),
    /// First clock term column (3 terms follow)
    clock: usize,
    /// Offset of the first field on continuation lines
    offset: usize,
}

impl Layout {
    /// Returns the layout of a record starting with `line`
    fn new(version: Version, line: &str) -> Self {
        let tagged = line
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic())
            .unwrap_or(false);
        if version.is_v3() {
            Self {
                sv: (0, 3),
                date: (4, 23),
                clock: 23,
                offset: 4,
            }
        } else if tagged {
            // V2.12 tagged records: V3 like epoch line, V2 continuation lines
            Self {
                sv: (0, 3),
                date: (4, 23),
                clock: 23,
                offset: 3,
            }
        } else {
            Self {
                sv: (0, 2),
                date: (2, 22),
                clock: 22,
                offset: 3,
            }
        }
    }
}

/// Parses the satellite identifier. Untagged (V2) identifiers
/// refer to the file constellation.
fn parse_sv(content: &str, file_constellation: Constellation) -> Result<SV, ParsingError> {
    let trimmed = content.trim();
    let first = trimmed
        .chars()
        .next()
        .ok_or(ParsingError::SVParsing(content.to_string()))?;

    let (constellation, prn) = if first.is_ascii_alphabetic() {
        let constellation = Constellation::from_str(&first.to_string())
            .map_err(|_| ParsingError::ConstellationParsing(first.to_string()))?;
        (constellation, trimmed.get(1..).unwrap_or("").trim())
    } else {
        let constellation = match file_constellation {
            Constellation::Mixed => Constellation::GPS,
            c => c,
        };
        (constellation, trimmed)
    };

    let prn = prn
        .parse::<u8>()
        .map_err(|_| ParsingError::SVParsing(content.to_string()))?;
    Ok(SV::new(constellation, prn))
}

/// Parses the 3 clock terms of the epoch line
fn parse_clock(line: &str, start: usize) -> Result<(f64, f64, f64), ParsingError> {
    let mut terms = [0.0_f64; 3];
    for (i, term) in terms.iter_mut().enumerate() {
        let content = field(line, start + i * FIELD_WIDTH, start + (i + 1) * FIELD_WIDTH);
        *term = parse_f64(content).ok_or(ParsingError::ClockParsing(content.to_string()))?;
    }
    Ok((terms[0], terms[1], terms[2]))
}

/// Decodes continuation lines against their field descriptors
fn parse_orbits(
    descriptors: &[OrbitLine],
    lines: &[&str],
    offset: usize,
) -> Result<HashMap<String, OrbitItem>, ParsingError> {
    let mut orbits = HashMap::with_capacity(descriptors.len() * 4);
    for (line, descriptor) in lines.iter().zip(descriptors.iter()) {
        for (i, (name, type_desc)) in descriptor.iter().enumerate() {
            if *name == "spare" {
                continue;
            }
            let content = field(
                line,
                offset + i * FIELD_WIDTH,
                offset + (i + 1) * FIELD_WIDTH,
            );
            if let Some(item) = OrbitItem::new(name, type_desc, content)? {
                orbits.insert(name.to_string(), item);
            }
        }
    }
    Ok(orbits)
}

fn mandatory_f64(
    orbits: &HashMap<String, OrbitItem>,
    name: &'static str,
) -> Result<f64, ParsingError> {
    orbits
        .get(name)
        .map(|item| item.as_f64())
        .ok_or(ParsingError::MissingOrbitField(name))
}

/// Builds a [GlonassEphemeris] from its decoded fields (km → m)
fn glonass(
    sv: SV,
    epoch_line: &str,
    layout: &Layout,
    orbits: &HashMap<String, OrbitItem>,
) -> Result<GlonassEphemeris, ParsingError> {
    let date = field(epoch_line, layout.date.0, layout.date.1);
    let toc = epoch::parse_in_constellation(date, Constellation::Glonass)?;
    let (clock_bias, clock_drift, frame_time) = parse_clock(epoch_line, layout.clock)?;

    let km = |name: &'static str| mandatory_f64(orbits, name).map(|value| value * 1.0E3);

    Ok(GlonassEphemeris {
        sv,
        toc,
        clock_bias,
        clock_drift,
        frame_time,
        position: (km("satPosX")?, km("satPosY")?, km("satPosZ")?),
        velocity: (km("velX")?, km("velY")?, km("velZ")?),
        acceleration: (km("accelX")?, km("accelY")?, km("accelZ")?),
        health: orbits
            .get("health")
            .and_then(|item| item.as_u32())
            .unwrap_or(0),
        channel: orbits.get("channel").and_then(|item| item.as_i8()),
        age_op: orbits.get("ageOp").map(|item| item.as_f64()),
    })
}

/// Decodes one body record: `lines[0]` is the epoch line,
/// continuation lines follow.
pub(crate) fn parse_record(
    version: Version,
    file_constellation: Constellation,
    lines: &[&str],
) -> Result<Decoded, ParsingError> {
    let epoch_line = lines.first().ok_or(ParsingError::LineTooShort)?;
    let layout = Layout::new(version, epoch_line);

    let sv = parse_sv(
        field(epoch_line, layout.sv.0, layout.sv.1),
        file_constellation,
    )?;

    if sv.constellation.is_sbas() {
        return Ok(Decoded::Sbas(sv));
    }

    let descriptors = orbit_fields(sv.constellation)
        .ok_or(ParsingError::NonSupportedConstellation(sv.constellation))?;

    let continuations = &lines[1..];

    if sv.constellation == Constellation::Glonass {
        if continuations.len() < descriptors.len() {
            return Err(ParsingError::TruncatedRecord(
                descriptors.len() - continuations.len(),
            ));
        }
        let orbits = parse_orbits(descriptors, continuations, layout.offset)?;
        return Ok(Decoded::Glonass(glonass(sv, epoch_line, &layout, &orbits)?));
    }

    if continuations.len() < MIN_KEPLER_LINES {
        return Err(ParsingError::TruncatedRecord(
            MIN_KEPLER_LINES - continuations.len(),
        ));
    }

    let date = field(epoch_line, layout.date.0, layout.date.1);
    let toc = epoch::parse_in_constellation(date, sv.constellation)?;
    let clock = parse_clock(epoch_line, layout.clock)?;

    let orbits = parse_orbits(descriptors, continuations, layout.offset)?;
    if let Some(missing) = MANDATORY_FIELDS
        .iter()
        .find(|name| !orbits.contains_key(**name))
    {
        return Err(ParsingError::MissingOrbitField(missing));
    }

    let mut ephemeris = Ephemeris::new(sv, toc, clock);
    ephemeris.orbits = orbits;
    Ok(Decoded::Kepler(ephemeris))
}
