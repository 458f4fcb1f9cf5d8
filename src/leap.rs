//! Leap seconds: historical table and `LEAP SECONDS` header descriptor
use crate::{error::ParsingError, prelude::Constellation, time::GnssTime};

/// Days elapsed since the GPS origin (1980-01-06) at which each
/// leap second became effective (UTC midnight), ascending.
const LEAP_DAYS: [i64; 18] = [
    542,   // 1981-07-01
    907,   // 1982-07-01
    1272,  // 1983-07-01
    2003,  // 1985-07-01
    2917,  // 1988-01-01
    3648,  // 1990-01-01
    4013,  // 1991-01-01
    4560,  // 1992-07-01
    4925,  // 1993-07-01
    5290,  // 1994-07-01
    5839,  // 1996-01-01
    6386,  // 1997-07-01
    6935,  // 1999-01-01
    9492,  // 2006-01-01
    10588, // 2009-01-01
    11865, // 2012-07-01
    12960, // 2015-07-01
    13510, // 2017-01-01
];

/// Returns the number of leap seconds (GPST - UTC) at this instant:
/// the count of table entries strictly before `t`.
/// Entry #i is the GPST instant of the inserted second (23:59:60 UTC),
/// so the new count applies from the following UTC midnight on.
pub(crate) fn leap_seconds(t: &GnssTime) -> u32 {
    LEAP_DAYS
        .iter()
        .enumerate()
        .filter(|(i, day)| {
            let entry = GnssTime::from_millis((**day * 86_400 + *i as i64) * 1_000);
            entry < *t
        })
        .count() as u32
}

/// `Leap` to describe the `LEAP SECONDS` header field.
/// GLO = UTC = GPS - ΔtLS
/// GPS = GPS = UTC + ΔtLS
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Leap {
    /// Current number of leap seconds
    pub leap: u32,
    /// ΔtLS : future or past leap second(s)
    pub delta_tls: Option<u32>,
    /// Week number of the future leap second
    pub week: Option<u32>,
    /// Day number of the future leap second
    pub day: Option<u32>,
    /// Time system this counter refers to
    pub constellation: Option<Constellation>,
}

impl Leap {
    /// Builds a new `Leap` object to describe leap seconds
    pub fn new(
        leap: u32,
        delta_tls: Option<u32>,
        week: Option<u32>,
        day: Option<u32>,
        constellation: Option<Constellation>,
    ) -> Self {
        Self {
            leap,
            delta_tls,
            week,
            day,
            constellation,
        }
    }
}

impl std::str::FromStr for Leap {
    type Err = ParsingError;
    /// Builds `Leap` from standard RINEX descriptor
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |item: &str| -> Result<u32, ParsingError> {
            item.trim()
                .parse::<u32>()
                .map_err(|_| ParsingError::LeapParsing)
        };
        let mut ls = Leap::default();
        let items: Vec<&str> = s.split_ascii_whitespace().collect();
        match items.len() {
            0 => return Err(ParsingError::LeapParsing),
            1 => {
                // short format (V2)
                ls.leap = parse(items[0])?;
            },
            _ => {
                // extended format (V3): 4I6,A3
                let field =
                    |start: usize, end: usize| s.get(start..end.min(s.len())).unwrap_or("");
                ls.leap = parse(field(0, 6))?;
                ls.delta_tls = Some(parse(field(6, 12))?);
                let week = field(12, 18).trim();
                if !week.is_empty() {
                    ls.week = Some(parse(week)?);
                }
                let day = field(18, 24).trim();
                if !day.is_empty() {
                    ls.day = Some(parse(day)?);
                }
                ls.constellation = match field(24, 27).trim() {
                    "" => None,
                    "GPS" => Some(Constellation::GPS),
                    "GAL" => Some(Constellation::Galileo),
                    "BDS" => Some(Constellation::BeiDou),
                    "QZS" => Some(Constellation::QZSS),
                    "IRN" => Some(Constellation::IRNSS),
                    system => return Err(ParsingError::ConstellationParsing(system.to_string())),
                };
            },
        }
        Ok(ls)
    }
}
