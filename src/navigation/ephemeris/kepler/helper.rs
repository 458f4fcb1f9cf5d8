use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::{
    constants::Constants,
    navigation::{Ephemeris, Kepler, Perturbations},
    prelude::SV,
    time::GnssTime,
};

use super::solve_kepler;

/// BeiDou GEO orbital plane tilt (rad)
const BDS_GEO_TILT: f64 = 5.0 * std::f64::consts::PI / 180.0;

/// [Helper] helps calculate satellite orbital state from Keplerian elements,
/// at one instant (in system time).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Helper {
    /// Satellite
    pub sv: SV,
    /// Time elapsed since time of ephemeris (s)
    pub t_k: f64,
    /// Eccentric anomaly
    pub e_k: f64,
    /// Eccentric anomaly first derivative
    pub fd_e_k: f64,
    /// False when Kepler's equation resolution hit the iteration cap
    pub converged: bool,
    /// Argument of latitude (corrected)
    pub u_k: f64,
    /// Radius (corrected)
    pub r_k: f64,
    /// Orbital inclination (corrected)
    pub i_k: f64,
    /// Longitude of the ascending node
    pub omega_k: f64,
    /// First derivative of the argument of latitude
    pub fd_u_k: f64,
    /// First derivative of the radius
    pub fd_r_k: f64,
    /// First derivative of the inclination
    pub fd_i_k: f64,
    /// First derivative of the longitude of the ascending node
    pub fd_omega_k: f64,
    /// Relativistic clock correction (s)
    pub dtr: f64,
    /// First derivative of the relativistic clock correction
    pub fd_dtr: f64,
    /// Position in the orbital plane (m)
    pub r_sv: (f64, f64),
}

/// Orbital plane to ECEF projection
fn plane_to_ecef(x: f64, y: f64, omega_k: f64, i_k: f64) -> Vector3<f64> {
    // Positive angles mean counterclockwise rotation
    let rotation_z = Rotation3::from_axis_angle(&Vector3::z_axis(), omega_k);
    let rotation_x = Rotation3::from_axis_angle(&Vector3::x_axis(), i_k);
    rotation_z * rotation_x * Vector3::new(x, y, 0.0)
}

/// Time derivative of [plane_to_ecef]
fn plane_to_ecef_rate(
    (x, y): (f64, f64),
    (fd_x, fd_y): (f64, f64),
    (omega_k, fd_omega_k): (f64, f64),
    (i_k, fd_i_k): (f64, f64),
) -> Vector3<f64> {
    let (sin_omega_k, cos_omega_k) = omega_k.sin_cos();
    let (sin_i_k, cos_i_k) = i_k.sin_cos();
    let pos_x = x * cos_omega_k - y * cos_i_k * sin_omega_k;
    let pos_y = x * sin_omega_k + y * cos_i_k * cos_omega_k;
    Vector3::new(
        fd_x * cos_omega_k - fd_y * cos_i_k * sin_omega_k
            + y * sin_i_k * sin_omega_k * fd_i_k
            - pos_y * fd_omega_k,
        fd_x * sin_omega_k + fd_y * cos_i_k * cos_omega_k
            - y * sin_i_k * cos_omega_k * fd_i_k
            + pos_x * fd_omega_k,
        fd_y * sin_i_k + y * cos_i_k * fd_i_k,
    )
}

impl Helper {
    /// Resolves the orbital state `t_k` seconds after time of ephemeris
    pub fn new(sv: SV, kepler: &Kepler, perturbations: &Perturbations, t_k: f64) -> Self {
        let gm_m3_s2 = Constants::gm(sv);
        let omega = Constants::omega(sv);
        let dtr_f = Constants::dtr_f(sv);
        let e = kepler.e;

        let n0 = (gm_m3_s2 / kepler.a.powi(3)).sqrt(); // average angular velocity
        let n = n0 + perturbations.dn; // corrected mean angular velocity
        let m_k = kepler.m_0 + n * t_k; // mean anomaly

        let solution = solve_kepler(m_k, e);
        let e_k = solution.e_k;
        let (sin_e_k, cos_e_k) = e_k.sin_cos();

        // true anomaly
        let v_k = ((1.0 - e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - e);

        let phi_k = v_k + kepler.omega; // argument of latitude
        let (x2_sin_phi_k, x2_cos_phi_k) = (2.0 * phi_k).sin_cos();

        // second harmonic corrections
        let du_k = perturbations.cus * x2_sin_phi_k + perturbations.cuc * x2_cos_phi_k;
        let dr_k = perturbations.crs * x2_sin_phi_k + perturbations.crc * x2_cos_phi_k;
        let di_k = perturbations.cis * x2_sin_phi_k + perturbations.cic * x2_cos_phi_k;

        let u_k = phi_k + du_k;
        let r_k = kepler.a * (1.0 - e * cos_e_k) + dr_k;
        let i_k = kepler.i_0 + di_k + perturbations.i_dot * t_k;

        // longitude of ascending node
        let (omega_k, fd_omega_k) = if Constants::is_beidou_geo(sv) {
            // earth rotation over t_k is applied by the GEO projection
            (
                kepler.omega_0 + perturbations.omega_dot * t_k - omega * kepler.toe,
                perturbations.omega_dot,
            )
        } else {
            (
                kepler.omega_0 + (perturbations.omega_dot - omega) * t_k - omega * kepler.toe,
                perturbations.omega_dot - omega,
            )
        };

        // first derivatives
        let fd_e_k = n / (1.0 - e * cos_e_k);
        let fd_phi_k = (1.0 - e.powi(2)).sqrt() * fd_e_k / (1.0 - e * cos_e_k);

        let fd_u_k = fd_phi_k
            * (1.0 + 2.0 * (perturbations.cus * x2_cos_phi_k - perturbations.cuc * x2_sin_phi_k));

        let fd_r_k = kepler.a * e * sin_e_k * fd_e_k
            + 2.0 * (perturbations.crs * x2_cos_phi_k - perturbations.crc * x2_sin_phi_k) * fd_phi_k;

        let fd_i_k = perturbations.i_dot
            + 2.0 * (perturbations.cis * x2_cos_phi_k - perturbations.cic * x2_sin_phi_k) * fd_phi_k;

        // relativistic effect
        let dtr = dtr_f * e * kepler.a.sqrt() * sin_e_k;
        let fd_dtr = dtr_f * e * kepler.a.sqrt() * cos_e_k * fd_e_k;

        let (sin_u_k, cos_u_k) = u_k.sin_cos();

        Self {
            sv,
            t_k,
            e_k,
            fd_e_k,
            converged: solution.converged,
            u_k,
            r_k,
            i_k,
            omega_k,
            fd_u_k,
            fd_r_k,
            fd_i_k,
            fd_omega_k,
            dtr,
            fd_dtr,
            r_sv: (r_k * cos_u_k, r_k * sin_u_k),
        }
    }

    /// Returns ẋ and ẏ in the orbital plane
    fn orbit_velocity(&self) -> (f64, f64) {
        let (sin_u_k, cos_u_k) = self.u_k.sin_cos();
        let fd_x = self.fd_r_k * cos_u_k - self.r_k * self.fd_u_k * sin_u_k;
        let fd_y = self.fd_r_k * sin_u_k + self.r_k * self.fd_u_k * cos_u_k;
        (fd_x, fd_y)
    }

    /// Position in the intermediate (inertial like) GEO frame
    fn geo_gk_position(&self) -> Vector3<f64> {
        plane_to_ecef(self.r_sv.0, self.r_sv.1, self.omega_k, self.i_k)
    }

    /// GEO frame to ECEF rotation: (-ωe t_k) about z, after the 5° tilt about x
    fn geo_rotation(&self) -> (Rotation3<f64>, Rotation3<f64>) {
        let rotation_x = Rotation3::from_axis_angle(&Vector3::x_axis(), BDS_GEO_TILT);
        let rotation_z = Rotation3::from_axis_angle(
            &Vector3::z_axis(),
            -Constants::omega(self.sv) * self.t_k,
        );
        (rotation_z, rotation_x)
    }

    /// ECEF position (m), at transmission time, in the frame of that instant
    pub fn ecef_position(&self) -> Vector3<f64> {
        if Constants::is_beidou_geo(self.sv) {
            let (rotation_z, rotation_x) = self.geo_rotation();
            rotation_z * rotation_x * self.geo_gk_position()
        } else {
            plane_to_ecef(self.r_sv.0, self.r_sv.1, self.omega_k, self.i_k)
        }
    }

    /// ECEF velocity (m/s), at transmission time, in the frame of that instant
    pub fn ecef_velocity(&self) -> Vector3<f64> {
        let plane_velocity = plane_to_ecef_rate(
            self.r_sv,
            self.orbit_velocity(),
            (self.omega_k, self.fd_omega_k),
            (self.i_k, self.fd_i_k),
        );
        if Constants::is_beidou_geo(self.sv) {
            let (rotation_z, rotation_x) = self.geo_rotation();
            let omega = Constants::omega(self.sv);
            let (sin_theta, cos_theta) = (-omega * self.t_k).sin_cos();
            // d(Rz)/dt, with dθ/dt = -ωe
            let fd_rotation_z = -omega
                * Matrix3::new(
                    -sin_theta, -cos_theta, 0.0, cos_theta, -sin_theta, 0.0, 0.0, 0.0, 0.0,
                );
            fd_rotation_z * (rotation_x * self.geo_gk_position())
                + rotation_z * rotation_x * plane_velocity
        } else {
            plane_velocity
        }
    }
}

impl Ephemeris {
    /// Obtains a [Helper] for Keplerian equations solving, at `t`
    /// expressed in system time. Returns None when this message lacks
    /// Keplerian parameters.
    pub(crate) fn helper(&self, t: GnssTime) -> Option<Helper> {
        let kepler = self.kepler()?;
        let perturbations = self.perturbations()?;
        let t_k = self.t_k(t)?;
        Some(Helper::new(self.sv, &kepler, &perturbations, t_k))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::Constellation;

    fn meo() -> (Kepler, Perturbations) {
        (
            Kepler {
                a: 5153.61_f64.powi(2),
                e: 0.0178,
                i_0: 0.95,
                omega_0: -2.5,
                m_0: 1.2,
                omega: -1.3,
                toe: 57600.0,
            },
            Perturbations {
                dn: 4.2E-9,
                i_dot: -2.0E-10,
                omega_dot: -8.0E-9,
                cus: 8.0E-6,
                cuc: -2.0E-6,
                cis: 1.0E-7,
                cic: -5.0E-8,
                crs: -40.0,
                crc: 200.0,
            },
        )
    }

    fn finite_difference(sv: SV, kepler: &Kepler, perturbations: &Perturbations, t_k: f64) -> Vector3<f64> {
        let before = Helper::new(sv, kepler, perturbations, t_k - 0.5).ecef_position();
        let after = Helper::new(sv, kepler, perturbations, t_k + 0.5).ecef_position();
        after - before
    }

    #[test]
    fn meo_position_velocity() {
        let sv = SV::new(Constellation::GPS, 2);
        let (kepler, perturbations) = meo();
        for t_k in [-3600.0, 0.0, 1111.0, 7000.0] {
            let helper = Helper::new(sv, &kepler, &perturbations, t_k);
            assert!(helper.converged);
            let r = helper.ecef_position().norm();
            assert!(r > 26.0E6 && r < 27.2E6, "radius {}", r);

            let velocity = helper.ecef_velocity();
            let expected = finite_difference(sv, &kepler, &perturbations, t_k);
            assert!(
                (velocity - expected).norm() < 1.0E-3,
                "velocity error {}",
                (velocity - expected).norm()
            );
        }
    }

    #[test]
    fn relativistic_correction() {
        let sv = SV::new(Constellation::GPS, 2);
        let (kepler, perturbations) = meo();
        let helper = Helper::new(sv, &kepler, &perturbations, 0.0);
        // F e sqrt(A): a few tens of ns at most for GPS orbits
        assert!(helper.dtr.abs() < 5.0E-8);
        let after = Helper::new(sv, &kepler, &perturbations, 1.0);
        assert!((after.dtr - helper.dtr - helper.fd_dtr).abs() < 1.0E-13);
    }

    #[test]
    fn beidou_geo() {
        let sv = SV::new(Constellation::BeiDou, 1);
        let kepler = Kepler {
            a: 6493.48_f64.powi(2),
            e: 4.0E-4,
            i_0: 0.1,
            omega_0: -2.9,
            m_0: 0.5,
            omega: -0.4,
            toe: 432000.0,
        };
        let perturbations = Perturbations {
            dn: 1.0E-10,
            omega_dot: 1.0E-9,
            ..Default::default()
        };
        for t_k in [-1800.0, 0.0, 2400.0] {
            let helper = Helper::new(sv, &kepler, &perturbations, t_k);
            let position = helper.ecef_position();
            let r = position.norm();
            assert!(r > 42.0E6 && r < 42.3E6, "radius {}", r);
            // geostationary: earth fixed velocity is small
            let velocity = helper.ecef_velocity();
            assert!(velocity.norm() < 100.0, "velocity {}", velocity.norm());
            let expected = finite_difference(sv, &kepler, &perturbations, t_k);
            assert!((velocity - expected).norm() < 1.0E-3);
        }
    }
}
