//! Inter system time offsets, broadcast in the header.
use crate::{
    constants::SECONDS_PER_WEEK,
    error::ParsingError,
    navigation::{field, parse_f64},
    prelude::Constellation,
    time::{normalize_half_week, GnssTime},
};

/// Time system pair described by a [TimeOffsetModel]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeSystemCorrection {
    /// GPST to UTC
    GPUT,
    /// GST to UTC
    GAUT,
    /// SBAS network time to UTC
    SBUT,
    /// GLONASST to UTC
    GLUT,
    /// GPST to GST
    GPGA,
    /// GST to GPST (GGTO)
    GAGP,
    /// GLONASST to GPST
    GLGP,
    /// QZSST to GPST
    QZGP,
    /// QZSST to UTC
    QZUT,
    /// BDT to UTC
    BDUT,
    /// IRNSST to UTC
    IRUT,
    /// IRNSST to GPST
    IRGP,
}

impl std::str::FromStr for TimeSystemCorrection {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GPUT" => Ok(Self::GPUT),
            "GAUT" => Ok(Self::GAUT),
            "SBUT" => Ok(Self::SBUT),
            "GLUT" => Ok(Self::GLUT),
            "GPGA" => Ok(Self::GPGA),
            "GAGP" => Ok(Self::GAGP),
            "GLGP" => Ok(Self::GLGP),
            "QZGP" => Ok(Self::QZGP),
            "QZUT" => Ok(Self::QZUT),
            "BDUT" => Ok(Self::BDUT),
            "IRUT" => Ok(Self::IRUT),
            "IRGP" => Ok(Self::IRGP),
            other => Err(ParsingError::TimeSystemCorrection(other.to_string())),
        }
    }
}

impl std::fmt::Display for TimeSystemCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TimeSystemCorrection {
    /// Time system being corrected
    pub fn lhs(&self) -> Constellation {
        match self {
            Self::GPUT | Self::GPGA => Constellation::GPS,
            Self::GAUT | Self::GAGP => Constellation::Galileo,
            Self::SBUT => Constellation::SBAS,
            Self::GLUT | Self::GLGP => Constellation::Glonass,
            Self::QZGP | Self::QZUT => Constellation::QZSS,
            Self::BDUT => Constellation::BeiDou,
            Self::IRUT | Self::IRGP => Constellation::IRNSS,
        }
    }
    /// Reference time system, None being UTC
    pub fn rhs(&self) -> Option<Constellation> {
        match self {
            Self::GPGA => Some(Constellation::Galileo),
            Self::GAGP | Self::GLGP | Self::QZGP | Self::IRGP => Some(Constellation::GPS),
            _ => None,
        }
    }
    /// Returns true when the reference system is UTC
    pub fn is_utc(&self) -> bool {
        self.rhs().is_none()
    }
}

/// Inter system time offset polynomial: offset = a0 + a1 (t - t_ref)
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeOffsetModel {
    /// Time systems pair
    pub correction: TimeSystemCorrection,
    /// Offset (s)
    pub a0: f64,
    /// Drift (s.s⁻¹)
    pub a1: f64,
    /// Reference time, in seconds of week
    pub t_ref: f64,
    /// Reference week (0: not used)
    pub week: u32,
}

impl TimeOffsetModel {
    /// Parses V3 "TIME SYSTEM CORR" (A4,1X,D17.10,D16.9,1X,I6,1X,I4)
    pub(crate) fn parse_rinex3_header(content: &str) -> Result<Self, ParsingError> {
        let correction = field(content, 0, 4).parse::<TimeSystemCorrection>()?;
        let a0 = field(content, 5, 22);
        let a0 = parse_f64(a0).ok_or(ParsingError::OrbitParsing("a0", a0.to_string()))?;
        let a1 = field(content, 22, 38);
        let a1 = parse_f64(a1).ok_or(ParsingError::OrbitParsing("a1", a1.to_string()))?;
        let t_ref = field(content, 38, 45);
        let t_ref = parse_f64(t_ref).ok_or(ParsingError::OrbitParsing("t", t_ref.to_string()))?;
        let week = field(content, 45, 50).trim();
        let week = if week.is_empty() {
            0
        } else {
            week.parse::<u32>()
                .map_err(|_| ParsingError::OrbitParsing("w", week.to_string()))?
        };
        Ok(Self {
            correction,
            a0,
            a1,
            t_ref,
            week,
        })
    }

    /// Parses V2 (Glonass) "CORR TO SYSTEM TIME" (3I6,3X,D19.12).
    /// The correction (-TauC) is a pure offset, referenced to the given UTC date.
    pub(crate) fn parse_glonass_rinex2_header(content: &str) -> Result<Self, ParsingError> {
        let y = field(content, 0, 6).trim();
        let y = y
            .parse::<i32>()
            .map_err(|_| ParsingError::YearField(y.to_string()))?;
        let m = field(content, 6, 12).trim();
        let m = m
            .parse::<u8>()
            .map_err(|_| ParsingError::MonthField(m.to_string()))?;
        let d = field(content, 12, 18).trim();
        let d = d
            .parse::<u8>()
            .map_err(|_| ParsingError::DayField(d.to_string()))?;
        let a0 = field(content, 21, 40);
        let a0 = parse_f64(a0).ok_or(ParsingError::OrbitParsing("-tauC", a0.to_string()))?;
        if !(1..=12).contains(&m) {
            return Err(ParsingError::EpochFormat);
        }
        let t = GnssTime::maybe_from_utc_calendar(y, m, d, 0, 0, 0.0)
            .map_err(|_| ParsingError::DayField(d.to_string()))?;
        let (week, t_ref) = t.week_tow(Constellation::GPS);
        Ok(Self {
            correction: TimeSystemCorrection::GLUT,
            a0,
            a1: 0.0,
            t_ref,
            week,
        })
    }

    /// Elapsed time (s) between `t` and the reference time of this model
    pub(crate) fn elapsed(&self, t: GnssTime) -> f64 {
        let grid = match self.correction.lhs() {
            Constellation::BeiDou => Constellation::BeiDou,
            _ => Constellation::GPS,
        };
        let (week, tow) = t.week_tow(grid);
        if self.week == 0 {
            normalize_half_week(tow - self.t_ref)
        } else {
            tow - self.t_ref + SECONDS_PER_WEEK * (week as f64 - self.week as f64)
        }
    }

    /// Returns the time offset (s) at `t`
    pub fn offset_s(&self, t: GnssTime) -> f64 {
        self.a0 + self.a1 * self.elapsed(t)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    #[test]
    fn correction_pairs() {
        let gagp = TimeSystemCorrection::from_str("GAGP").unwrap();
        assert_eq!(gagp.lhs(), Constellation::Galileo);
        assert_eq!(gagp.rhs(), Some(Constellation::GPS));
        assert!(!gagp.is_utc());
        let gput = TimeSystemCorrection::from_str("GPUT").unwrap();
        assert!(gput.is_utc());
        assert_eq!(gput.to_string(), "GPUT");
        assert!(TimeSystemCorrection::from_str("XXUT").is_err());
    }
    #[test]
    fn rinex3_header() {
        let model = TimeOffsetModel::parse_rinex3_header(
            "GPUT -0.9313225746D-09-8.881784197D-16 503808 2078",
        )
        .unwrap();
        assert_eq!(model.correction, TimeSystemCorrection::GPUT);
        assert_eq!(model.a0, -0.9313225746E-09);
        assert_eq!(model.a1, -8.881784197E-16);
        assert_eq!(model.t_ref, 503808.0);
        assert_eq!(model.week, 2078);

        let t = GnssTime::from_week_tow(2078, 503808.0 + 1000.0, Constellation::GPS);
        let expected = -0.9313225746E-09 - 8.881784197E-16 * 1000.0;
        assert!((model.offset_s(t) - expected).abs() < 1.0E-20);

        // a week later
        let t = GnssTime::from_week_tow(2079, 503808.0, Constellation::GPS);
        assert!((model.elapsed(t) - 604800.0).abs() < 1.0E-9);

        let model = TimeOffsetModel::parse_rinex3_header(
            "GAGP  2.9103830457E-11-4.440892099E-15 432000 2138",
        )
        .unwrap();
        assert_eq!(model.correction, TimeSystemCorrection::GAGP);
        assert_eq!(model.week, 2138);

        let model = TimeOffsetModel::parse_rinex3_header(
            "GLUT  0.0000000000E+00 0.000000000E+00      0    0",
        )
        .unwrap();
        assert_eq!(model.week, 0);
        assert_eq!(model.offset_s(GnssTime::now()), 0.0);
    }
    #[test]
    fn glonass_rinex2_header() {
        let model = TimeOffsetModel::parse_glonass_rinex2_header(
            "  2021     1     1   -1.862645149231D-09",
        )
        .unwrap();
        assert_eq!(model.correction, TimeSystemCorrection::GLUT);
        assert_eq!(model.a0, -1.862645149231E-09);
        assert_eq!(model.week, 2138);
        assert!(TimeOffsetModel::parse_glonass_rinex2_header("  2021    13     1   0.0").is_err());
        assert_eq!(
            TimeOffsetModel::parse_glonass_rinex2_header("  2021     2    30   0.0"),
            Err(ParsingError::DayField("30".to_string()))
        );
    }
}
