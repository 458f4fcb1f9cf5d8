use crate::{
    error::ParsingError,
    navigation::{field, parse_f64},
    prelude::Constellation,
};

mod klobuchar;
mod nequick_g;

pub use klobuchar::{KbModel, KbRegionCode};
pub use nequick_g::{NgModel, NgRegionFlags};

/// Broadcast [IonosphereModel]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IonosphereModel {
    /// Klobuchar Model
    Klobuchar(KbModel),
    /// Nequick-G Model
    NequickG(NgModel),
}

impl Default for IonosphereModel {
    fn default() -> Self {
        Self::Klobuchar(KbModel::default())
    }
}

impl IonosphereModel {
    /// Returns [KbModel], if this is a Klobuchar model
    pub fn as_klobuchar(&self) -> Option<&KbModel> {
        match self {
            Self::Klobuchar(kb) => Some(kb),
            _ => None,
        }
    }
    /// Returns [NgModel], if this is a Nequick-G model
    pub fn as_nequick_g(&self) -> Option<&NgModel> {
        match self {
            Self::NequickG(ng) => Some(ng),
            _ => None,
        }
    }
}

/// One ionospheric header line, which may only describe
/// half a Klobuchar model
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum IonoHeaderField {
    Alpha(Constellation, KbRegionCode, (f64, f64, f64, f64)),
    Beta(Constellation, KbRegionCode, (f64, f64, f64, f64)),
    NequickG(NgModel),
}

/// Parses 4 consecutive fields of `width` columns, starting at `offset`
fn four_fields(
    content: &str,
    offset: usize,
    width: usize,
    desc: &'static str,
) -> Result<(f64, f64, f64, f64), ParsingError> {
    let mut values = [0.0_f64; 4];
    for (i, value) in values.iter_mut().enumerate() {
        let start = offset + i * width;
        let item = field(content, start, start + width);
        *value = parse_f64(item).ok_or(ParsingError::OrbitParsing(desc, item.to_string()))?;
    }
    Ok((values[0], values[1], values[2], values[3]))
}

/// Parses V2 "ION ALPHA" or "ION BETA" content (2X,4D12.4)
pub(crate) fn parse_rinex2_header(content: &str) -> Result<(f64, f64, f64, f64), ParsingError> {
    four_fields(content, 2, 12, "ion")
}

/// Parses V3 "IONOSPHERIC CORR" content (A4,1X,4D12.4)
pub(crate) fn parse_rinex3_header(content: &str) -> Result<IonoHeaderField, ParsingError> {
    let system = field(content, 0, 4).trim();
    match system {
        "GAL" => {
            let (a0, a1, a2, _) = four_fields(content, 5, 12, "ai").or_else(|_| {
                // 4th (flags) field is often omitted
                let mut a = [0.0_f64; 3];
                for (i, value) in a.iter_mut().enumerate() {
                    let item = field(content, 5 + i * 12, 17 + i * 12);
                    *value = parse_f64(item)
                        .ok_or(ParsingError::OrbitParsing("ai", item.to_string()))?;
                }
                Ok::<_, ParsingError>((a[0], a[1], a[2], 0.0))
            })?;
            Ok(IonoHeaderField::NequickG(NgModel {
                a: (a0, a1, a2),
                region: NgRegionFlags::empty(),
            }))
        },
        system if system.len() == 4 => {
            let constellation = match system.get(..3) {
                Some("GPS") => Constellation::GPS,
                Some("QZS") => Constellation::QZSS,
                Some("BDS") => Constellation::BeiDou,
                Some("IRN") => Constellation::IRNSS,
                _ => return Err(ParsingError::ConstellationParsing(system.to_string())),
            };
            // World or QZSS special orbital plan
            let region = match constellation {
                Constellation::QZSS => KbRegionCode::JapanArea,
                _ => KbRegionCode::WideArea,
            };
            let values = four_fields(content, 5, 12, "klobuchar")?;
            match system.get(3..) {
                Some("A") => Ok(IonoHeaderField::Alpha(constellation, region, values)),
                Some("B") => Ok(IonoHeaderField::Beta(constellation, region, values)),
                _ => Err(ParsingError::ConstellationParsing(system.to_string())),
            }
        },
        _ => Err(ParsingError::ConstellationParsing(system.to_string())),
    }
}
