//! Broadcast orbit fields description, per constellation
use crate::{error::ParsingError, navigation::parse_f64, prelude::Constellation};

/// Orbit field descriptor: (name, type). "spare" fields are not stored.
pub(crate) type OrbitField = (&'static str, &'static str);

/// One broadcast orbit (continuation) line
pub(crate) type OrbitLine = [OrbitField; 4];

const GPS_ORBITS: [OrbitLine; 7] = [
    [("iode", "f64"), ("crs", "f64"), ("deltaN", "f64"), ("m0", "f64")],
    [("cuc", "f64"), ("e", "f64"), ("cus", "f64"), ("sqrta", "f64")],
    [("toe", "f64"), ("cic", "f64"), ("omega0", "f64"), ("cis", "f64")],
    [("i0", "f64"), ("crc", "f64"), ("omega", "f64"), ("omegaDot", "f64")],
    [("idot", "f64"), ("l2Codes", "u32"), ("week", "u32"), ("l2pDataFlag", "u32")],
    [("svAccuracy", "f64"), ("health", "u32"), ("tgd", "f64"), ("iodc", "f64")],
    [("t_tm", "f64"), ("fitInterval", "f64"), ("spare", "spare"), ("spare", "spare")],
];

const GAL_ORBITS: [OrbitLine; 7] = [
    [("iodnav", "f64"), ("crs", "f64"), ("deltaN", "f64"), ("m0", "f64")],
    [("cuc", "f64"), ("e", "f64"), ("cus", "f64"), ("sqrta", "f64")],
    [("toe", "f64"), ("cic", "f64"), ("omega0", "f64"), ("cis", "f64")],
    [("i0", "f64"), ("crc", "f64"), ("omega", "f64"), ("omegaDot", "f64")],
    [("idot", "f64"), ("dataSrc", "u32"), ("week", "u32"), ("spare", "spare")],
    [("sisa", "f64"), ("health", "u32"), ("bgdE5aE1", "f64"), ("bgdE5bE1", "f64")],
    [("t_tm", "f64"), ("spare", "spare"), ("spare", "spare"), ("spare", "spare")],
];

const BDS_ORBITS: [OrbitLine; 7] = [
    [("aode", "f64"), ("crs", "f64"), ("deltaN", "f64"), ("m0", "f64")],
    [("cuc", "f64"), ("e", "f64"), ("cus", "f64"), ("sqrta", "f64")],
    [("toe", "f64"), ("cic", "f64"), ("omega0", "f64"), ("cis", "f64")],
    [("i0", "f64"), ("crc", "f64"), ("omega", "f64"), ("omegaDot", "f64")],
    [("idot", "f64"), ("spare", "spare"), ("week", "u32"), ("spare", "spare")],
    [("svAccuracy", "f64"), ("satH1", "u32"), ("tgd1b1b3", "f64"), ("tgd2b2b3", "f64")],
    [("t_tm", "f64"), ("aodc", "f64"), ("spare", "spare"), ("spare", "spare")],
];

const IRNSS_ORBITS: [OrbitLine; 7] = [
    [("iodec", "f64"), ("crs", "f64"), ("deltaN", "f64"), ("m0", "f64")],
    [("cuc", "f64"), ("e", "f64"), ("cus", "f64"), ("sqrta", "f64")],
    [("toe", "f64"), ("cic", "f64"), ("omega0", "f64"), ("cis", "f64")],
    [("i0", "f64"), ("crc", "f64"), ("omega", "f64"), ("omegaDot", "f64")],
    [("idot", "f64"), ("spare", "spare"), ("week", "u32"), ("spare", "spare")],
    [("svAccuracy", "f64"), ("health", "u32"), ("tgd", "f64"), ("spare", "spare")],
    [("t_tm", "f64"), ("spare", "spare"), ("spare", "spare"), ("spare", "spare")],
];

const GLO_ORBITS: [OrbitLine; 3] = [
    [("satPosX", "f64"), ("velX", "f64"), ("accelX", "f64"), ("health", "u32")],
    [("satPosY", "f64"), ("velY", "f64"), ("accelY", "f64"), ("channel", "i8")],
    [("satPosZ", "f64"), ("velZ", "f64"), ("accelZ", "f64"), ("ageOp", "f64")],
];

const SBAS_ORBITS: [OrbitLine; 3] = [
    [("satPosX", "f64"), ("velX", "f64"), ("accelX", "f64"), ("health", "u32")],
    [("satPosY", "f64"), ("velY", "f64"), ("accelY", "f64"), ("accuracyCode", "f64")],
    [("satPosZ", "f64"), ("velZ", "f64"), ("accelZ", "f64"), ("iodn", "f64")],
];

/// Returns the broadcast orbit lines layout for this constellation
pub(crate) fn orbit_fields(constellation: Constellation) -> Option<&'static [OrbitLine]> {
    match constellation {
        Constellation::GPS | Constellation::QZSS => Some(&GPS_ORBITS),
        Constellation::Galileo => Some(&GAL_ORBITS),
        Constellation::BeiDou => Some(&BDS_ORBITS),
        Constellation::IRNSS => Some(&IRNSS_ORBITS),
        Constellation::Glonass => Some(&GLO_ORBITS),
        c if c.is_sbas() => Some(&SBAS_ORBITS),
        _ => None,
    }
}

/// [OrbitItem] is one broadcast orbit field, interpreted
/// with its type descriptor.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrbitItem {
    /// signed byte
    I8(i8),
    /// unsigned 32 bit value
    U32(u32),
    /// double precision data
    F64(f64),
}

impl From<u32> for OrbitItem {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<f64> for OrbitItem {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl OrbitItem {
    /// Builds [OrbitItem] from type descriptor and (FORTRAN float) content.
    /// Integer fields are broadcast as floats and converted.
    /// Returns Ok(None) for blank fields.
    pub(crate) fn new(
        name: &'static str,
        type_desc: &str,
        content: &str,
    ) -> Result<Option<Self>, ParsingError> {
        if content.trim().is_empty() {
            return Ok(None);
        }
        let float =
            parse_f64(content).ok_or(ParsingError::OrbitParsing(name, content.to_string()))?;
        match type_desc {
            "i8" => Ok(Some(Self::I8(float as i8))),
            "u32" => Ok(Some(Self::U32(float as u32))),
            _ => Ok(Some(Self::F64(float))),
        }
    }
    /// Unwraps [OrbitItem] as f64, converting integer values
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::I8(i) => *i as f64,
            Self::U32(u) => *u as f64,
            Self::F64(f) => *f,
        }
    }
    /// Unwraps self as u32 (if possible)
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }
    /// Unwraps [OrbitItem] as i8
    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Self::I8(i) => Some(*i),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn orbit_items() {
        let item = OrbitItem::new("week", "u32", " 0.198600000000D+04").unwrap();
        assert_eq!(item, Some(OrbitItem::U32(1986)));
        let item = OrbitItem::new("channel", "i8", "-0.700000000000D+01").unwrap();
        assert_eq!(item.and_then(|item| item.as_i8()), Some(-7));
        let item = OrbitItem::new("e", "f64", " 0.000000000000D+00").unwrap();
        assert_eq!(item, Some(OrbitItem::F64(0.0)), "zero values are values");
        let item = OrbitItem::new("e", "f64", "                   ").unwrap();
        assert!(item.is_none());
        assert!(OrbitItem::new("e", "f64", " 0.1234XYZ").is_err());

        // integer fields
        let item = OrbitItem::new("health", "u32", " 0.100000000000D+01").unwrap();
        assert_eq!(item.and_then(|item| item.as_u32()), Some(1));
        assert_eq!(item.map(|item| item.as_f64()), Some(1.0));
        assert_eq!(OrbitItem::F64(1.0).as_u32(), None);
    }
    #[test]
    fn layouts() {
        assert_eq!(orbit_fields(Constellation::GPS).map(|l| l.len()), Some(7));
        assert_eq!(orbit_fields(Constellation::QZSS).map(|l| l.len()), Some(7));
        assert_eq!(orbit_fields(Constellation::Glonass).map(|l| l.len()), Some(3));
        let bds = orbit_fields(Constellation::BeiDou).unwrap();
        assert_eq!(bds[0][0].0, "aode");
        assert_eq!(bds[5][1].0, "satH1");
        let gal = orbit_fields(Constellation::Galileo).unwrap();
        assert_eq!(gal[5][0].0, "sisa");
    }
}
