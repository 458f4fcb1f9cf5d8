//! Broadcast satellite health interpretation
use bitflags::bitflags;

use crate::prelude::Constellation;

bitflags! {
    /// Galileo signal health and data validity, as stored in RINEX
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct GalHealth: u16 {
        const E1B_DVS = 0x001;
        const E1B_HS0 = 0x002;
        const E1B_HS1 = 0x004;
        const E5A_DVS = 0x008;
        const E5A_HS0 = 0x010;
        const E5A_HS1 = 0x020;
        const E5B_DVS = 0x040;
        const E5B_HS0 = 0x080;
        const E5B_HS1 = 0x100;
    }
}

impl GalHealth {
    /// Signal health status (HS) bits, for all signals
    const SIGNAL_HEALTH: Self = Self::E1B_HS0
        .union(Self::E1B_HS1)
        .union(Self::E5A_HS0)
        .union(Self::E5A_HS1)
        .union(Self::E5B_HS0)
        .union(Self::E5B_HS1);

    /// Data validity status (DVS) bits, for all signals
    const DATA_VALIDITY: Self = Self::E1B_DVS.union(Self::E5A_DVS).union(Self::E5B_DVS);

    /// True when all signals are declared OK and their data valid
    pub fn is_healthy(&self) -> bool {
        !self.intersects(Self::SIGNAL_HEALTH) && !self.intersects(Self::DATA_VALIDITY)
    }
}

/// Interprets a raw broadcast health field.
///  - GPS, QZSS, IRNSS: health word, 0 is healthy
///  - Galileo: [GalHealth] bits
///  - BeiDou: SatH1, 0 is healthy
///  - Glonass: Bn, 0 is healthy
pub(crate) fn is_healthy(constellation: Constellation, raw: u32) -> bool {
    match constellation {
        Constellation::Galileo => GalHealth::from_bits_truncate(raw as u16).is_healthy(),
        _ => raw == 0,
    }
}
