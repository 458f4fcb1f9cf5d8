//! GLONASS state vector ephemeris and its numerical integration
use nalgebra::Vector3;

use crate::{
    cfg::check_glonass_step,
    constants::{Constants, Pz90, GM, Omega},
    error::Error,
    navigation::health,
    prelude::{Constellation, SV},
    time::GnssTime,
};

/// [GlonassEphemeris] is one GLONASS broadcast message: an ECEF (PZ-90)
/// state vector at the reference time, plus the lunar-solar acceleration.
/// Values are stored in meters (converted from the broadcast kilometers).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlonassEphemeris {
    /// Satellite
    pub sv: SV,
    /// Reference time (UTC instant of the broadcast)
    pub toc: GnssTime,
    /// Clock bias -τn (s)
    pub clock_bias: f64,
    /// Relative frequency bias +γn (s.s⁻¹)
    pub clock_drift: f64,
    /// Message frame time (s)
    pub frame_time: f64,
    /// Position (m)
    pub position: (f64, f64, f64),
    /// Velocity (m.s⁻¹)
    pub velocity: (f64, f64, f64),
    /// Lunar-solar acceleration (m.s⁻²)
    pub acceleration: (f64, f64, f64),
    /// Health flag Bn (0 means healthy)
    pub health: u32,
    /// Frequency channel number
    pub channel: Option<i8>,
    /// Age of operation information (days)
    pub age_op: Option<f64>,
}

impl Default for GlonassEphemeris {
    fn default() -> Self {
        Self {
            sv: SV::new(Constellation::Glonass, 1),
            toc: GnssTime::default(),
            clock_bias: 0.0,
            clock_drift: 0.0,
            frame_time: 0.0,
            position: (0.0, 0.0, 0.0),
            velocity: (0.0, 0.0, 0.0),
            acceleration: (0.0, 0.0, 0.0),
            health: 0,
            channel: None,
            age_op: None,
        }
    }
}

/// Integration may extend this far (s) beyond the validity window
const INTEGRATION_MARGIN_S: f64 = 3600.0;

fn to_vector(v: (f64, f64, f64)) -> Vector3<f64> {
    Vector3::new(v.0, v.1, v.2)
}

/// Equations of motion in PZ-90: returns the acceleration (m.s⁻²)
/// for this position and velocity, `ext` being the broadcast
/// lunar-solar term.
fn derivatives(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    ext: &Vector3<f64>,
) -> Vector3<f64> {
    let gm = GM::GLO;
    let omega = Omega::GLO;
    let r2 = position.norm_squared();
    let r = r2.sqrt();
    let r3 = r2 * r;
    let r5 = r3 * r2;
    let z2_r2 = position[2].powi(2) / r2;
    let j2 = 1.5 * Pz90::J2 * gm * Pz90::AE.powi(2) / r5;

    Vector3::new(
        -gm / r3 * position[0] - j2 * position[0] * (1.0 - 5.0 * z2_r2)
            + omega.powi(2) * position[0]
            + 2.0 * omega * velocity[1]
            + ext[0],
        -gm / r3 * position[1] - j2 * position[1] * (1.0 - 5.0 * z2_r2)
            + omega.powi(2) * position[1]
            - 2.0 * omega * velocity[0]
            + ext[1],
        -gm / r3 * position[2] - j2 * position[2] * (3.0 - 5.0 * z2_r2) + ext[2],
    )
}

/// One fourth order Runge-Kutta step of duration `h` (s, may be negative)
fn rk4_step(
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    ext: &Vector3<f64>,
    h: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let k1_p = velocity;
    let k1_v = derivatives(&position, &velocity, ext);

    let k2_p = velocity + k1_v * h / 2.0;
    let k2_v = derivatives(&(position + k1_p * h / 2.0), &k2_p, ext);

    let k3_p = velocity + k2_v * h / 2.0;
    let k3_v = derivatives(&(position + k2_p * h / 2.0), &k3_p, ext);

    let k4_p = velocity + k3_v * h;
    let k4_v = derivatives(&(position + k3_p * h), &k4_p, ext);

    (
        position + (k1_p + k2_p * 2.0 + k3_p * 2.0 + k4_p) * h / 6.0,
        velocity + (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * h / 6.0,
    )
}

impl GlonassEphemeris {
    /// Reference time of this message
    pub fn reference_time(&self) -> GnssTime {
        self.toc
    }

    /// Maximal time distance (s) this message may be used at
    pub fn max_age(&self) -> f64 {
        Constants::max_age(Constellation::Glonass)
    }

    /// True when Bn declares this satellite usable
    pub fn is_healthy(&self) -> bool {
        health::is_healthy(Constellation::Glonass, self.health)
    }

    /// Returns (position [m], velocity [m/s], acceleration [m/s²])
    /// at reference time, in PZ-90.
    pub fn state(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        (
            to_vector(self.position),
            to_vector(self.velocity),
            to_vector(self.acceleration),
        )
    }

    /// Satellite clock (bias [s], drift [s/s]) `dt` seconds after reference time
    pub fn clock(&self, dt: f64) -> (f64, f64) {
        (self.clock_bias + self.clock_drift * dt, self.clock_drift)
    }

    /// Integrates the state vector from reference time to `t`, with fixed
    /// steps of `step_s` seconds and one final partial step.
    /// Returns (position [m], velocity [m/s]) in PZ-90.
    /// Fails on steps below 0.1s, and when `t` lies more than one hour
    /// beyond the validity window.
    pub fn integrate(
        &self,
        t: GnssTime,
        step_s: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), Error> {
        let step = check_glonass_step(step_s)?;
        let dt = t - self.toc;
        if !(dt.abs() <= self.max_age() + INTEGRATION_MARGIN_S) {
            return Err(Error::IntegrationSpan(self.sv));
        }

        let (mut position, mut velocity, ext) = self.state();
        let full_steps = (dt.abs() / step).floor() as u64;
        let h = step.copysign(dt);
        for _ in 0..full_steps {
            (position, velocity) = rk4_step(position, velocity, &ext, h);
        }

        let remainder = dt - full_steps as f64 * h;
        if remainder != 0.0 {
            (position, velocity) = rk4_step(position, velocity, &ext, remainder);
        }
        Ok((position, velocity))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn r01() -> GlonassEphemeris {
        GlonassEphemeris {
            sv: SV::new(Constellation::Glonass, 1),
            toc: GnssTime::from_utc_calendar(2020, 6, 25, 0, 15, 0.0),
            clock_bias: -1.2E-5,
            clock_drift: 1.8E-12,
            position: (7839.17E3, -21694.9E3, 10902.15E3),
            velocity: (-0.423E3, 1.450E3, 3.192E3),
            acceleration: (0.0, 0.0, -1.86E-9),
            ..Default::default()
        }
    }

    #[test]
    fn reference_time() {
        let eph = r01();
        let (position, velocity) = eph.integrate(eph.toc, 60.0).unwrap();
        assert_eq!(position, to_vector(eph.position));
        assert_eq!(velocity, to_vector(eph.velocity));
        assert_eq!(eph.max_age(), 950.0);
        assert!(eph.is_healthy());
        assert!(!GlonassEphemeris { health: 1, ..eph }.is_healthy());
    }

    #[test]
    fn integration() {
        let eph = r01();
        let t = eph.toc + 900.0;
        let (position, velocity) = eph.integrate(t, 60.0).unwrap();

        // GLONASS orbit radius is 25510 km
        let r = position.norm();
        assert!(r > 25.3E6 && r < 25.7E6, "radius {}", r);

        // finer step converges to the same solution
        let (fine, fine_velocity) = eph.integrate(t, 10.0).unwrap();
        assert!((position - fine).norm() < 1.0, "{}", (position - fine).norm());
        assert!((velocity - fine_velocity).norm() < 1.0E-3);

        // remainder step
        let (odd, _) = eph.integrate(eph.toc + 905.5, 60.0).unwrap();
        assert!((odd - position).norm() < 6.0 * 4.0E3);

        // backwards and forth
        let (before, _) = eph.integrate(eph.toc - 600.0, 60.0).unwrap();
        let back = GlonassEphemeris {
            toc: eph.toc - 600.0,
            position: (before[0], before[1], before[2]),
            velocity: {
                let (_, v) = eph.integrate(eph.toc - 600.0, 60.0).unwrap();
                (v[0], v[1], v[2])
            },
            ..eph
        };
        let (recovered, _) = back.integrate(eph.toc, 60.0).unwrap();
        assert!((recovered - to_vector(eph.position)).norm() < 1.0E-3);
    }

    #[test]
    fn integration_limits() {
        let eph = r01();
        for step_s in [0.0, -60.0, 1.0E-9, f64::NAN] {
            assert!(
                matches!(eph.integrate(eph.toc + 300.0, step_s), Err(Error::InvalidConfig(_))),
                "step {} should be rejected",
                step_s
            );
        }

        // validity window plus one hour, both ways
        assert!(eph.integrate(eph.toc + 950.0 + 3600.0, 60.0).is_ok());
        assert!(eph.integrate(eph.toc - 950.0 - 3600.0, 60.0).is_ok());
        for dt in [950.0 + 3601.0, -86400.0, 30.0 * 86400.0] {
            assert_eq!(
                eph.integrate(eph.toc + dt, 60.0),
                Err(Error::IntegrationSpan(eph.sv)),
                "{}s span",
                dt
            );
        }
    }

    #[test]
    fn clock() {
        let eph = r01();
        let (bias, drift) = eph.clock(100.0);
        assert!((bias - (-1.2E-5 + 1.8E-10)).abs() < 1.0E-18);
        assert_eq!(drift, 1.8E-12);
    }
}
