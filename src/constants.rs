//! Physical constants, per constellation

use crate::prelude::{Constellation, SV};

/// Speed of light in vacuum (m.s⁻¹)
pub(crate) const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Seconds per GNSS week
pub(crate) const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Half a week, bound of the time difference normalization
pub(crate) const HALF_WEEK: f64 = 302_400.0;

/// Earth gravitational constant (m³.s⁻²)
pub(crate) struct GM;

impl GM {
    pub const GPS: f64 = 3.9860050E14;
    pub const BDS: f64 = 3.986004418E14;
    pub const GLO: f64 = 3.9860044E14;
    pub const GAL: f64 = 3.986004418E14;
}

/// Earth rotation rate (rad.s⁻¹)
pub(crate) struct Omega;

impl Omega {
    pub const GPS: f64 = 7.2921151467E-5;
    pub const BDS: f64 = 7.292115E-5;
    pub const GLO: f64 = 7.292115E-5;
    pub const GAL: f64 = 7.2921151467E-5;
}

/// - 2 * sqrt(gm) / c / c
pub(crate) struct DtrF;

impl DtrF {
    pub const GPS: f64 = -0.000000000444280763339306;
    pub const BDS: f64 = -0.00000000044428073090439775;
    pub const GAL: f64 = -0.00000000044428073090439775;
}

/// PZ-90 Earth model, used by the GLONASS state vector integration
pub(crate) struct Pz90;

impl Pz90 {
    /// Equatorial radius (m)
    pub const AE: f64 = 6378136.0;
    /// Second zonal harmonic
    pub const J2: f64 = 1.0826257E-3;
    /// PZ-90.02 to WGS84 datum shift (m)
    pub const TO_WGS84: (f64, f64, f64) = (-0.36, 0.08, 0.18);
}

/// WGS84 reference ellipsoid
pub(crate) struct Wgs84;

impl Wgs84 {
    /// Semi major axis (m)
    pub const A: f64 = 6378137.0;
    /// Flattening
    pub const F: f64 = 1.0 / 298.257223563;
    /// First eccentricity squared
    pub const E2: f64 = Self::F * (2.0 - Self::F);
}

/// Const values used in this crate
pub(crate) struct Constants;

impl Constants {
    /// Maximal iteration in the iterative Kepler solver
    pub const MAX_KEPLER_ITER: usize = 12;

    /// Kepler solver convergence criterion (rad)
    pub const KEPLER_TOLERANCE: f64 = 1.0E-12;

    /// Earth gravitation.
    pub const fn gm(sv: SV) -> f64 {
        match sv.constellation {
            Constellation::BeiDou => GM::BDS,
            Constellation::Galileo => GM::GAL,
            Constellation::Glonass => GM::GLO,
            _ => GM::GPS,
        }
    }

    /// Earth rotation rate
    pub const fn omega(sv: SV) -> f64 {
        match sv.constellation {
            Constellation::BeiDou => Omega::BDS,
            Constellation::Galileo => Omega::GAL,
            Constellation::Glonass => Omega::GLO,
            _ => Omega::GPS,
        }
    }

    /// Auxiliary Quantities for Calculating Relativistic Effects in Clock Correction
    pub const fn dtr_f(sv: SV) -> f64 {
        match sv.constellation {
            Constellation::BeiDou => DtrF::BDS,
            Constellation::Galileo => DtrF::GAL,
            _ => DtrF::GPS,
        }
    }

    /// Maximal ephemeris age (s), when the record does not
    /// specify its own fit interval.
    pub const fn max_age(constellation: Constellation) -> f64 {
        match constellation {
            Constellation::Glonass => 950.0,
            Constellation::QZSS => 3600.0,
            _ => 7200.0,
        }
    }

    /// Returns true for BeiDou geostationary vehicles,
    /// which require a dedicated projection.
    pub const fn is_beidou_geo(sv: SV) -> bool {
        matches!(sv.constellation, Constellation::BeiDou)
            && (sv.prn < 6 || (sv.prn > 58 && sv.prn < 64))
    }
}
