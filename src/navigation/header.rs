//! Navigation file header
use std::collections::HashMap;

use log::debug;

use crate::{
    error::{FormatError, ParseWarning, ParsingError},
    leap::Leap,
    navigation::{
        field,
        ionosphere::{self, IonoHeaderField},
        IonosphereModel, KbModel, KbRegionCode, TimeOffsetModel, UtcModel,
    },
    prelude::Constellation,
    version::Version,
};

/// Header labels start at this column
const LABEL_OFFSET: usize = 60;

/// Partially described Klobuchar model (alpha and beta come on separate lines)
#[derive(Default)]
struct KbBuilder {
    alpha: Option<(f64, f64, f64, f64)>,
    beta: Option<(f64, f64, f64, f64)>,
    region: KbRegionCode,
}

/// Navigation file [Header]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Header {
    /// File revision
    pub version: Version,
    /// File constellation, [Constellation::Mixed] for multi GNSS files
    pub constellation: Constellation,
    /// Program that generated this file
    pub program: Option<String>,
    /// Operator or agency
    pub run_by: Option<String>,
    /// File production date
    pub date: Option<String>,
    /// Comments
    pub comments: Vec<String>,
    /// Leap seconds
    pub leap: Option<Leap>,
    /// Broadcast ionosphere models, per constellation
    pub ionosphere: HashMap<Constellation, IonosphereModel>,
    /// Broadcast UTC models, per constellation
    pub utc: HashMap<Constellation, UtcModel>,
    /// Inter system time offsets
    pub time_offsets: Vec<TimeOffsetModel>,
}

/// Splits a header line into (content, label)
fn split_label(line: &str) -> (&str, &str) {
    let content = field(line, 0, LABEL_OFFSET);
    let label = field(line, LABEL_OFFSET, line.len()).trim();
    (content, label)
}

/// Decodes the first header line: returns (version, file constellation)
fn parse_version_type(content: &str) -> Result<(Version, Constellation), FormatError> {
    let version = field(content, 0, 9)
        .trim()
        .parse::<Version>()
        .map_err(FormatError::BadVersionHeader)?;

    if !version.is_supported() {
        return Err(FormatError::NonSupportedVersion(version.to_string()));
    }

    let file_type = field(content, 20, 21).chars().next().unwrap_or(' ');
    let system = field(content, 40, 41).trim();

    let constellation = match file_type {
        'N' => {
            if system.is_empty() {
                Constellation::GPS
            } else {
                match system {
                    "G" => Constellation::GPS,
                    "R" => Constellation::Glonass,
                    "E" => Constellation::Galileo,
                    "C" => Constellation::BeiDou,
                    "J" => Constellation::QZSS,
                    "I" => Constellation::IRNSS,
                    "S" => Constellation::SBAS,
                    "M" => Constellation::Mixed,
                    other => {
                        return Err(FormatError::BadVersionHeader(
                            ParsingError::ConstellationParsing(other.to_string()),
                        ))
                    },
                }
            }
        },
        'G' => Constellation::Glonass,
        'H' => Constellation::SBAS,
        'E' => Constellation::Galileo,
        other => return Err(FormatError::NotNavigation(other)),
    };

    Ok((version, constellation))
}

impl Header {
    /// Parses the header section, consuming lines up to END OF HEADER.
    /// Malformed (optional) fields are reported as warnings.
    pub(crate) fn parse<I>(lines: &mut I) -> Result<(Self, Vec<ParseWarning>), FormatError>
    where
        I: Iterator<Item = (usize, std::io::Result<String>)>,
    {
        let mut warnings = Vec::<ParseWarning>::new();
        let mut kb_builders = HashMap::<Constellation, KbBuilder>::new();

        // version / type
        let mut header = match lines.next() {
            Some((_, line)) => {
                let line = line?;
                let (content, label) = split_label(&line);
                if label != "RINEX VERSION / TYPE" {
                    return Err(FormatError::MissingVersionHeader);
                }
                let (version, constellation) = parse_version_type(content)?;
                Self {
                    version,
                    constellation,
                    ..Default::default()
                }
            },
            None => return Err(FormatError::MissingVersionHeader),
        };

        let mut end_of_header = false;

        for (line_number, line) in lines.by_ref() {
            let line = line?;
            let (content, label) = split_label(&line);
            let mut warn = |error: ParsingError| {
                warnings.push(ParseWarning {
                    line: line_number,
                    error,
                })
            };

            match label {
                "END OF HEADER" => {
                    end_of_header = true;
                    break;
                },
                "COMMENT" => {
                    header.comments.push(content.trim_end().to_string());
                },
                "PGM / RUN BY / DATE" => {
                    let pgm = field(content, 0, 20).trim();
                    let run_by = field(content, 20, 40).trim();
                    let date = field(content, 40, 60).trim();
                    if !pgm.is_empty() {
                        header.program = Some(pgm.to_string());
                    }
                    if !run_by.is_empty() {
                        header.run_by = Some(run_by.to_string());
                    }
                    if !date.is_empty() {
                        header.date = Some(date.to_string());
                    }
                },
                "LEAP SECONDS" => match content.parse::<Leap>() {
                    Ok(leap) => header.leap = Some(leap),
                    Err(e) => warn(e),
                },
                "ION ALPHA" | "ION BETA" => match ionosphere::parse_rinex2_header(content) {
                    Ok(values) => {
                        let constellation = match header.constellation {
                            Constellation::Mixed => Constellation::GPS,
                            c => c,
                        };
                        let builder = kb_builders.entry(constellation).or_default();
                        if label == "ION ALPHA" {
                            builder.alpha = Some(values);
                        } else {
                            builder.beta = Some(values);
                        }
                    },
                    Err(e) => warn(e),
                },
                "IONOSPHERIC CORR" => match ionosphere::parse_rinex3_header(content) {
                    Ok(IonoHeaderField::Alpha(c, region, values)) => {
                        let builder = kb_builders.entry(c).or_default();
                        builder.alpha = Some(values);
                        builder.region = region;
                    },
                    Ok(IonoHeaderField::Beta(c, region, values)) => {
                        let builder = kb_builders.entry(c).or_default();
                        builder.beta = Some(values);
                        builder.region = region;
                    },
                    Ok(IonoHeaderField::NequickG(ng)) => {
                        header
                            .ionosphere
                            .insert(Constellation::Galileo, IonosphereModel::NequickG(ng));
                    },
                    Err(e) => warn(e),
                },
                "DELTA-UTC: A0,A1,T,W" | "D-UTC A0,A1,T,W,S,U" => {
                    let constellation = match header.constellation {
                        Constellation::Mixed => Constellation::GPS,
                        c if c.is_sbas() => Constellation::SBAS,
                        c => c,
                    };
                    match UtcModel::parse_rinex2_header(content, constellation) {
                        Ok(utc) => {
                            header.utc.insert(constellation, utc);
                        },
                        Err(e) => warn(e),
                    }
                },
                "TIME SYSTEM CORR" => match TimeOffsetModel::parse_rinex3_header(content) {
                    Ok(model) => {
                        if let Some(utc) = UtcModel::from_time_offset(&model) {
                            header.utc.insert(utc.constellation, utc);
                        }
                        header.time_offsets.push(model);
                    },
                    Err(e) => warn(e),
                },
                "CORR TO SYSTEM TIME" => {
                    match TimeOffsetModel::parse_glonass_rinex2_header(content) {
                        Ok(model) => {
                            if let Some(utc) = UtcModel::from_time_offset(&model) {
                                header.utc.insert(utc.constellation, utc);
                            }
                            header.time_offsets.push(model);
                        },
                        Err(e) => warn(e),
                    }
                },
                _ => {},
            }
        }

        if !end_of_header {
            return Err(FormatError::MissingEndOfHeader);
        }

        for (constellation, builder) in kb_builders {
            match (builder.alpha, builder.beta) {
                (Some(alpha), Some(beta)) => {
                    header.ionosphere.insert(
                        constellation,
                        IonosphereModel::Klobuchar(KbModel {
                            alpha,
                            beta,
                            region: builder.region,
                        }),
                    );
                },
                _ => {
                    debug!("{}: incomplete klobuchar model", constellation);
                },
            }
        }

        if let Some(leap) = header.leap {
            for (constellation, utc) in header.utc.iter_mut() {
                let applies = match leap.constellation {
                    Some(c) => c == *constellation,
                    None => *constellation != Constellation::Glonass,
                };
                if applies {
                    utc.leap = Some(leap);
                }
            }
        }

        Ok((header, warnings))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::{BufRead, BufReader};

    fn parse(content: &str) -> Result<(Header, Vec<ParseWarning>), FormatError> {
        let reader = BufReader::new(content.as_bytes());
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
        Header::parse(&mut lines)
    }

    #[test]
    fn rinex2_header() {
        let content = "     2.10           N: GPS NAV DATA                         RINEX VERSION / TYPE
CCRINEXN V1.6.0 UX  CDDIS               28-JAN-18 17:28     PGM / RUN BY / DATE
IGS BROADCAST EPHEMERIS FILE                                COMMENT
    0.1118D-07 -0.7451D-08 -0.5961D-07  0.1192D-06          ION ALPHA
    0.1167D+06 -0.2294D+06 -0.1311D+06  0.1049D+07          ION BETA
    0.133179128170D-06 0.107469588780D-12   552960     1985 DELTA-UTC: A0,A1,T,W
    18                                                      LEAP SECONDS
                                                            END OF HEADER";
        let (header, warnings) = parse(content).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(header.version, Version::new(2, 10));
        assert_eq!(header.constellation, Constellation::GPS);
        assert_eq!(header.program.as_deref(), Some("CCRINEXN V1.6.0 UX"));
        assert_eq!(header.run_by.as_deref(), Some("CDDIS"));
        assert_eq!(header.comments.len(), 1);
        assert_eq!(header.leap.map(|l| l.leap), Some(18));

        let kb = header
            .ionosphere
            .get(&Constellation::GPS)
            .and_then(|model| model.as_klobuchar())
            .unwrap();
        assert_eq!(kb.alpha.0, 0.1118E-07);
        assert_eq!(kb.beta.3, 0.1049E+07);

        let utc = header.utc.get(&Constellation::GPS).unwrap();
        assert_eq!(utc.week, 1985);
        assert_eq!(utc.leap.map(|l| l.leap), Some(18));
    }

    #[test]
    fn rinex3_header() {
        let content = "     3.04           N: GNSS NAV DATA    M: Mixed            RINEX VERSION / TYPE
BCEmerge            montenbruck         20210102 012902 GMT PGM / RUN BY / DATE
GAL    6.6250e+01 -1.6406e-01 -2.4414e-04  0.0000e+00       IONOSPHERIC CORR
GPSA   7.4506e-09 -1.4901e-08 -5.9605e-08  1.1921e-07       IONOSPHERIC CORR
GPSB   9.0112e+04 -6.5536e+04 -1.3107e+05  4.5875e+05       IONOSPHERIC CORR
QZSA   7.4506e-09 -1.4901e-08 -5.9605e-08  1.1921e-07       IONOSPHERIC CORR
GAUT  0.0000000000e+00 0.000000000e+00 345600 2138          TIME SYSTEM CORR
GPGA  2.9103830457e-11-4.440892099e-15 432000 2138          TIME SYSTEM CORR
XXXX  2.9103830457e-11-4.440892099e-15 432000 2138          TIME SYSTEM CORR
    18    18  2185     7                                    LEAP SECONDS
                                                            END OF HEADER";
        let (header, warnings) = parse(content).unwrap();
        assert_eq!(header.version, Version::new(3, 4));
        assert_eq!(header.constellation, Constellation::Mixed);

        // unknown time system
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 9);

        assert!(header
            .ionosphere
            .get(&Constellation::Galileo)
            .and_then(|model| model.as_nequick_g())
            .is_some());
        assert!(header
            .ionosphere
            .get(&Constellation::GPS)
            .and_then(|model| model.as_klobuchar())
            .is_some());
        // alpha only
        assert!(header.ionosphere.get(&Constellation::QZSS).is_none());

        assert_eq!(header.time_offsets.len(), 2);
        assert!(header.utc.get(&Constellation::Galileo).is_some());
        assert!(header.utc.get(&Constellation::GPS).is_none());
    }

    #[test]
    fn fatal_headers() {
        // truncated END OF HEADER
        let content = "     3.04           N: GNSS NAV DATA    M: Mixed            RINEX VERSION / TYPE
                                                            END OF HEA";
        assert!(matches!(parse(content), Err(FormatError::MissingEndOfHeader)));

        // missing version
        let content = "BCEmerge            montenbruck         20210102 012902 GMT PGM / RUN BY / DATE
                                                            END OF HEADER";
        assert!(matches!(parse(content), Err(FormatError::MissingVersionHeader)));
        assert!(matches!(parse(""), Err(FormatError::MissingVersionHeader)));

        // V4
        let content = "     4.00           N: GNSS NAV DATA    M: Mixed            RINEX VERSION / TYPE
                                                            END OF HEADER";
        assert!(matches!(parse(content), Err(FormatError::NonSupportedVersion(_))));

        // observation file
        let content = "     3.04           O: OBSERVATION DATA M: Mixed            RINEX VERSION / TYPE
                                                            END OF HEADER";
        assert!(matches!(parse(content), Err(FormatError::NotNavigation('O'))));
    }
}
