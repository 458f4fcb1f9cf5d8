use log::warn;

use std::f64::consts::PI;

use crate::constants::Constants;

mod helper;

pub(crate) use helper::Helper;

/// [Kepler] stores all keplerian parameters
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kepler {
    /// semi major axis (m)
    pub a: f64,
    /// Eccentricity (n.a)
    pub e: f64,
    /// Inclination angle at reference time (rad)
    pub i_0: f64,
    /// Longitude of ascending node at reference time (rad)
    pub omega_0: f64,
    /// Mean anomaly at reference time (rad)
    pub m_0: f64,
    /// argument of perigee (rad)
    pub omega: f64,
    /// Time of ephemeris, in seconds of week
    pub toe: f64,
}

/// Orbit [Perturbations]
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Perturbations {
    /// Mean motion difference from computed value [rad.s⁻¹]
    pub dn: f64,
    /// Inclination rate of change [rad.s⁻¹]
    pub i_dot: f64,
    /// Right ascension rate of change [rad.s⁻¹]
    pub omega_dot: f64,
    /// Amplitude of sine harmonic correction term of the argument
    /// of latitude [rad]
    pub cus: f64,
    /// Amplitude of cosine harmonic correction term of the argument
    /// of latitude [rad]
    pub cuc: f64,
    /// Amplitude of sine harmonic correction term of the angle of inclination [rad]
    pub cis: f64,
    /// Amplitude of cosine harmonic correction term of the angle of inclination [rad]
    pub cic: f64,
    /// Amplitude of sine harmonic correction term of the orbit radius [m]
    pub crs: f64,
    /// Amplitude of cosine harmonic correction term of the orbit radius [m]
    pub crc: f64,
}

/// Eccentric anomaly, as resolved by [solve_kepler]
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeplerSolution {
    /// Eccentric anomaly (rad)
    pub e_k: f64,
    /// Number of iterations
    pub iterations: usize,
    /// False when the iteration cap was reached before the
    /// convergence criterion: e_k is then a best effort value.
    pub converged: bool,
}

/// Wraps an angle difference to [-π, π]
fn wrap_angle(angle: f64) -> f64 {
    angle - 2.0 * PI * (angle / (2.0 * PI)).round()
}

/// Solves Kepler's equation M = E - e sin(E) by fixed point iteration,
/// starting from E = M.
pub fn solve_kepler(m_k: f64, e: f64) -> KeplerSolution {
    let mut e_k = m_k;
    for iteration in 1..=Constants::MAX_KEPLER_ITER {
        let next = m_k + e * e_k.sin();
        let delta = wrap_angle(next - e_k);
        e_k = next;
        if delta.abs() < Constants::KEPLER_TOLERANCE {
            return KeplerSolution {
                e_k,
                iterations: iteration,
                converged: true,
            };
        }
    }
    warn!(
        "kepler solver did not converge within {} iterations (M={}, e={})",
        Constants::MAX_KEPLER_ITER,
        m_k,
        e
    );
    KeplerSolution {
        e_k,
        iterations: Constants::MAX_KEPLER_ITER,
        converged: false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn circular_orbit() {
        let solution = solve_kepler(1.234, 0.0);
        assert_eq!(solution.e_k, 1.234);
        assert!(solution.converged);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn convergence_sweep() {
        let mut rng = StdRng::seed_from_u64(0x6e6176);
        for _ in 0..10_000 {
            let m_k = rng.gen_range(-PI..PI);
            let e = rng.gen_range(0.0..0.099);
            let solution = solve_kepler(m_k, e);
            assert!(
                solution.converged,
                "did not converge for M={}, e={}",
                m_k,
                e
            );
            assert!(solution.iterations <= Constants::MAX_KEPLER_ITER);
            let residual = solution.e_k - e * solution.e_k.sin() - m_k;
            assert!(residual.abs() < 1.0E-11, "residual {}", residual);
        }
    }

    #[test]
    fn iteration_cap() {
        // highly eccentric: not an error, best effort value is returned
        let solution = solve_kepler(0.1, 0.95);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, Constants::MAX_KEPLER_ITER);
        assert!(solution.e_k.is_finite());
    }

    #[test]
    fn angle_wrapping() {
        assert!((wrap_angle(2.0 * PI + 0.1) - 0.1).abs() < 1.0E-12);
        assert!((wrap_angle(-2.0 * PI - 0.1) + 0.1).abs() < 1.0E-12);
        assert_eq!(wrap_angle(0.5), 0.5);
    }
}
