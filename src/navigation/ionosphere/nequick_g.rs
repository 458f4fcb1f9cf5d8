use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Default, Clone, Copy)]
    #[derive(PartialEq, PartialOrd)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct NgRegionFlags: u16 {
        const REGION5 = 0x01;
        const REGION4 = 0x02;
        const REGION3 = 0x04;
        const REGION2 = 0x08;
        const REGION1 = 0x10;
    }
}

/// Nequick-G Model payload, as broadcast by Galileo.
/// The model itself is not evaluated by this crate.
#[derive(Debug, Clone, Default, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NgModel {
    /// a_i coefficients
    /// (sfu, (sfu.semi-circle⁻¹), (sfu.semi-circle⁻²))
    pub a: (f64, f64, f64),
    /// Region flags
    pub region: NgRegionFlags,
}

impl NgModel {
    /// Effective ionisation level (sfu) at this modified dip latitude (degrees)
    pub fn effective_ionisation(&self, modip_ddeg: f64) -> f64 {
        let az = self.a.0 + self.a.1 * modip_ddeg + self.a.2 * modip_ddeg.powi(2);
        if self.a == (0.0, 0.0, 0.0) {
            63.7
        } else {
            az.clamp(0.0, 400.0)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn effective_ionisation() {
        let ng = NgModel {
            a: (66.25, 0.0, 0.0),
            region: NgRegionFlags::empty(),
        };
        assert_eq!(ng.effective_ionisation(10.0), 66.25);
        assert_eq!(NgModel::default().effective_ionisation(10.0), 63.7);
        let ng = NgModel {
            a: (500.0, 0.0, 0.0),
            region: NgRegionFlags::REGION1,
        };
        assert_eq!(ng.effective_ionisation(0.0), 400.0);
    }
}
