use crate::{constants::SPEED_OF_LIGHT, prelude::Constellation, time::GnssTime};

use std::f64::consts::PI;

/// L1 carrier frequency (Hz), Klobuchar delays are expressed on this carrier
const L1_FREQUENCY_HZ: f64 = 1575.42E6;

/// Klobuchar Parameters region
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KbRegionCode {
    /// Worlwide (GPS) Orbits.
    #[default]
    WideArea = 0,
    /// QZSS Japanese special Orbital plan.
    JapanArea = 1,
}

/// Klobuchar model payload
#[derive(Default, Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KbModel {
    /// Alpha coefficients
    /// ((sec), (sec.semi-circle⁻¹), (sec.semi-circle⁻²), (sec.semi-circle⁻³))
    pub alpha: (f64, f64, f64, f64),
    /// Beta coefficients
    /// ((sec), (sec.semi-circle⁻¹), (sec.semi-circle⁻²), (sec.semi-circle⁻³))
    pub beta: (f64, f64, f64, f64),
    /// Region flag
    pub region: KbRegionCode,
}

impl KbModel {
    /// Vertical to slant delay, ionospheric pierce point and local time
    /// evaluation of the broadcast model (IS-GPS-200 20.3.3.5.2.5).
    /// Returns the L1 delay in seconds.
    /// ## Inputs
    /// - t: instant of evaluation
    /// - user_lat_ddeg, user_lon_ddeg: receiver geodetic coordinates
    /// - azimuth_deg, elevation_deg: line of sight to the satellite
    pub fn delay_seconds(
        &self,
        t: GnssTime,
        user_lat_ddeg: f64,
        user_lon_ddeg: f64,
        azimuth_deg: f64,
        elevation_deg: f64,
    ) -> f64 {
        // semicircles
        let phi_u = user_lat_ddeg / 180.0;
        let lambda_u = user_lon_ddeg / 180.0;
        let e = elevation_deg / 180.0;
        let a = azimuth_deg.to_radians();

        // earth centered angle
        let psi = 0.0137 / (e + 0.11) - 0.022;

        // pierce point
        let phi_i = (phi_u + psi * a.cos()).clamp(-0.416, 0.416);
        let lambda_i = lambda_u + psi * a.sin() / (phi_i * PI).cos();

        // geomagnetic latitude
        let phi_m = phi_i + 0.064 * ((lambda_i - 1.617) * PI).cos();

        // local time
        let mut t_s = 43.2E3 * lambda_i + t.tow(Constellation::GPS);
        t_s = t_s.rem_euclid(86.4E3);

        let amp = (self.alpha.0
            + self.alpha.1 * phi_m
            + self.alpha.2 * phi_m.powi(2)
            + self.alpha.3 * phi_m.powi(3))
        .max(0.0);

        let per = (self.beta.0
            + self.beta.1 * phi_m
            + self.beta.2 * phi_m.powi(2)
            + self.beta.3 * phi_m.powi(3))
        .max(72.0E3);

        let x = 2.0 * PI * (t_s - 50400.0) / per;

        // slant factor
        let f = 1.0 + 16.0 * (0.53 - e).powi(3);

        if x.abs() < 1.57 {
            f * (5.0E-9 + amp * (1.0 - x.powi(2) / 2.0 + x.powi(4) / 24.0))
        } else {
            f * 5.0E-9
        }
    }

    /// Returns the delay in meters, on the carrier at `frequency_hz`
    pub fn delay_meters(
        &self,
        t: GnssTime,
        user_lat_ddeg: f64,
        user_lon_ddeg: f64,
        azimuth_deg: f64,
        elevation_deg: f64,
        frequency_hz: f64,
    ) -> f64 {
        let l1 = self.delay_seconds(t, user_lat_ddeg, user_lon_ddeg, azimuth_deg, elevation_deg)
            * SPEED_OF_LIGHT;
        l1 * (L1_FREQUENCY_HZ / frequency_hz).powi(2)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    fn model() -> KbModel {
        KbModel {
            alpha: (0.1118E-07, -0.7451E-08, -0.5961E-07, 0.1192E-06),
            beta: (0.1167E+06, -0.2294E+06, -0.1311E+06, 0.1049E+07),
            region: KbRegionCode::WideArea,
        }
    }
    #[test]
    fn night_time_floor() {
        // local midnight: only the 5ns constant term remains
        let kb = model();
        let t = GnssTime::from_week_tow(1986, 0.0, Constellation::GPS);
        let delay = kb.delay_seconds(t, 0.0, 0.0, 0.0, 90.0);
        let f = 1.0 + 16.0 * (0.53_f64 - 0.5).powi(3);
        assert!((delay - f * 5.0E-9).abs() < 1.0E-15);
    }
    #[test]
    fn daytime_and_elevation() {
        let kb = model();
        // 14h local time (peak)
        let t = GnssTime::from_week_tow(1986, 50400.0, Constellation::GPS);
        let zenith = kb.delay_seconds(t, 40.0, 0.0, 0.0, 90.0);
        let low = kb.delay_seconds(t, 40.0, 0.0, 0.0, 10.0);
        assert!(zenith > 5.0E-9);
        assert!(low > zenith, "slant delay must exceed vertical delay");
        // meters, within realistic bounds
        let meters = kb.delay_meters(t, 40.0, 0.0, 0.0, 90.0, L1_FREQUENCY_HZ);
        assert!(meters > 1.0 && meters < 30.0, "{}", meters);
        // L2 is further delayed
        let l2 = kb.delay_meters(t, 40.0, 0.0, 0.0, 90.0, 1227.60E6);
        assert!((l2 / meters - (1575.42_f64 / 1227.60).powi(2)).abs() < 1.0E-9);
    }
}
