//! RINEX date fields parsing
use crate::{error::ParsingError, prelude::Constellation, time::GnssTime};

/// Parses "YY MM DD HH MM SS.S" (V2) or "YYYY MM DD HH MM SS" (V3) date fields,
/// expressed in the time scale of this constellation.
pub(crate) fn parse_in_constellation(
    content: &str,
    constellation: Constellation,
) -> Result<GnssTime, ParsingError> {
    let mut y = 0_i32;
    let mut m = 0_u8;
    let mut d = 0_u8;
    let mut hh = 0_u8;
    let mut mm = 0_u8;
    let mut ss = 0.0_f64;
    let mut day = "";

    if content.split_ascii_whitespace().count() < 6 {
        return Err(ParsingError::EpochFormat);
    }

    for (field_index, item) in content.split_ascii_whitespace().enumerate() {
        match field_index {
            0 => {
                y = item
                    .parse::<i32>()
                    .map_err(|_| ParsingError::YearField(item.to_string()))?;

                /* old RINEX problem: YY is sometimes encoded on two digits */
                if y < 100 {
                    if y < 80 {
                        y += 2000;
                    } else {
                        y += 1900;
                    }
                }
            },
            1 => {
                m = item
                    .parse::<u8>()
                    .map_err(|_| ParsingError::MonthField(item.to_string()))?;
                if !(1..=12).contains(&m) {
                    return Err(ParsingError::MonthField(item.to_string()));
                }
            },
            2 => {
                day = item;
                d = item
                    .parse::<u8>()
                    .map_err(|_| ParsingError::DayField(item.to_string()))?;
                if !(1..=31).contains(&d) {
                    return Err(ParsingError::DayField(item.to_string()));
                }
            },
            3 => {
                hh = item
                    .parse::<u8>()
                    .map_err(|_| ParsingError::HoursField(item.to_string()))?;
                if hh > 23 {
                    return Err(ParsingError::HoursField(item.to_string()));
                }
            },
            4 => {
                mm = item
                    .parse::<u8>()
                    .map_err(|_| ParsingError::MinutesField(item.to_string()))?;
                if mm > 59 {
                    return Err(ParsingError::MinutesField(item.to_string()));
                }
            },
            5 => {
                ss = item
                    .parse::<f64>()
                    .map_err(|_| ParsingError::SecondsField(item.to_string()))?;
                if !(0.0..61.0).contains(&ss) {
                    return Err(ParsingError::SecondsField(item.to_string()));
                }
            },
            _ => {},
        }
    }

    GnssTime::maybe_from_calendar(y, m, d, hh, mm, ss, constellation).map_err(|_| {
        if ss >= 60.0 {
            ParsingError::SecondsField(format!("{:.1}", ss))
        } else {
            ParsingError::DayField(day.to_string())
        }
    })
}
