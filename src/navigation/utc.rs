//! GNSS to UTC broadcast model.
use crate::{
    constants::SECONDS_PER_WEEK,
    error::ParsingError,
    leap::Leap,
    navigation::{field, parse_f64, TimeOffsetModel},
    prelude::Constellation,
    time::GnssTime,
};

/// BDT and GPST differ by 14s since 2006-01-01
const BDT_LEAP_OFFSET: u32 = 14;

/// [UtcModel] describes the relation between a constellation time scale
/// and UTC: GNSS - UTC = ΔtLS + A0 + A1 (t - tot)
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtcModel {
    /// Time scale this model applies to
    pub constellation: Constellation,
    /// Offset (s)
    pub a0: f64,
    /// Drift (s.s⁻¹)
    pub a1: f64,
    /// Reference time, seconds of week
    pub t_ot: f64,
    /// Reference week (0: not used)
    pub week: u32,
    /// Leap seconds, when broadcast in the same header
    pub leap: Option<Leap>,
}

impl UtcModel {
    /// Parses V2 "DELTA-UTC: A0,A1,T,W" (3X,2D19.12,2I9)
    pub(crate) fn parse_rinex2_header(
        content: &str,
        constellation: Constellation,
    ) -> Result<Self, ParsingError> {
        let a0 = field(content, 3, 22);
        let a0 = parse_f64(a0).ok_or(ParsingError::OrbitParsing("a0", a0.to_string()))?;
        let a1 = field(content, 22, 41);
        let a1 = parse_f64(a1).ok_or(ParsingError::OrbitParsing("a1", a1.to_string()))?;
        let t_ot = field(content, 41, 50);
        let t_ot = parse_f64(t_ot).ok_or(ParsingError::OrbitParsing("t", t_ot.to_string()))?;
        let week = field(content, 50, 59).trim();
        let week = week
            .parse::<u32>()
            .map_err(|_| ParsingError::OrbitParsing("w", week.to_string()))?;
        Ok(Self {
            constellation,
            a0,
            a1,
            t_ot,
            week,
            leap: None,
        })
    }

    /// Builds [UtcModel] from a V3 UTC time system correction.
    /// Returns None when the correction does not refer to UTC.
    pub(crate) fn from_time_offset(model: &TimeOffsetModel) -> Option<Self> {
        if !model.correction.is_utc() {
            return None;
        }
        Some(Self {
            constellation: model.correction.lhs(),
            a0: model.a0,
            a1: model.a1,
            t_ot: model.t_ref,
            week: model.week,
            leap: None,
        })
    }

    /// Number of leap seconds between this time scale and UTC at `t`
    fn leap_seconds(&self, t: GnssTime) -> f64 {
        if let Some(leap) = self.leap {
            return leap.leap as f64;
        }
        match self.constellation {
            Constellation::Glonass => 0.0,
            Constellation::BeiDou => t.leap_seconds().saturating_sub(BDT_LEAP_OFFSET) as f64,
            _ => t.leap_seconds() as f64,
        }
    }

    /// Returns GNSS - UTC (s) at `t`
    pub fn offset_s(&self, t: GnssTime) -> f64 {
        let grid = match self.constellation {
            Constellation::BeiDou => Constellation::BeiDou,
            _ => Constellation::GPS,
        };
        let (week, tow) = t.week_tow(grid);
        let dt = if self.week == 0 {
            crate::time::normalize_half_week(tow - self.t_ot)
        } else {
            tow - self.t_ot + SECONDS_PER_WEEK * (week as f64 - self.week as f64)
        };
        self.leap_seconds(t) + self.a0 + self.a1 * dt
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::navigation::TimeSystemCorrection;
    #[test]
    fn rinex2_header() {
        let utc = UtcModel::parse_rinex2_header(
            "   0.133179128170D-06 0.107469588780D-12   552960     1025",
            Constellation::GPS,
        )
        .unwrap();
        assert_eq!(utc.a0, 0.133179128170E-06);
        assert_eq!(utc.a1, 0.107469588780E-12);
        assert_eq!(utc.t_ot, 552960.0);
        assert_eq!(utc.week, 1025);
        assert!(utc.leap.is_none());
        assert!(UtcModel::parse_rinex2_header("   0.1331D-06", Constellation::GPS).is_err());
    }
    #[test]
    fn gps_utc_offset() {
        let utc = UtcModel {
            constellation: Constellation::GPS,
            a0: 1.0E-9,
            a1: 1.0E-15,
            t_ot: 0.0,
            week: 1986,
            leap: None,
        };
        let t = GnssTime::from_week_tow(1986, 1000.0, Constellation::GPS);
        let offset = utc.offset_s(t);
        assert!((offset - (18.0 + 1.0E-9 + 1.0E-12)).abs() < 1.0E-15);

        let utc = UtcModel {
            leap: Some(Leap::new(17, None, None, None, None)),
            ..utc
        };
        assert!((utc.offset_s(t) - (17.0 + 1.0E-9 + 1.0E-12)).abs() < 1.0E-15);
    }
    #[test]
    fn from_time_offset() {
        let gagp = TimeOffsetModel {
            correction: TimeSystemCorrection::GAGP,
            a0: 1.0E-9,
            a1: 0.0,
            t_ref: 0.0,
            week: 2138,
        };
        assert!(UtcModel::from_time_offset(&gagp).is_none());

        let bdut = TimeOffsetModel {
            correction: TimeSystemCorrection::BDUT,
            a0: 0.0,
            a1: 0.0,
            t_ref: 0.0,
            week: 782,
        };
        let utc = UtcModel::from_time_offset(&bdut).unwrap();
        assert_eq!(utc.constellation, Constellation::BeiDou);
        let t = GnssTime::from_week_tow(782, 0.0, Constellation::BeiDou);
        assert_eq!(utc.offset_s(t), 4.0);

        let glut = TimeOffsetModel {
            correction: TimeSystemCorrection::GLUT,
            a0: -2.0E-9,
            a1: 0.0,
            t_ref: 0.0,
            week: 0,
        };
        let utc = UtcModel::from_time_offset(&glut).unwrap();
        assert_eq!(utc.offset_s(t), -2.0E-9);
    }
}
