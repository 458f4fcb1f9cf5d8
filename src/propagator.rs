//! Broadcast orbit propagation: satellite position, velocity and clock
//! at signal transmission time.
use std::sync::OnceLock;

use log::debug;
use nalgebra::{Rotation3, Vector3};

use crate::{
    cfg::Config,
    constants::{Constants, Pz90, SPEED_OF_LIGHT},
    coordinates::{AzElRange, Coordinates},
    error::Error,
    navigation::{Ephemeris, GlonassEphemeris},
    prelude::{Constellation, SV},
    time::{normalize_half_week, GnssTime},
};

#[cfg(feature = "orbit")]
use anise::{
    constants::frames::IAU_EARTH_FRAME,
    math::Vector6,
    prelude::Orbit,
};

/// Number of satellite clock / transmission time refinements
const CLOCK_ITERATIONS: usize = 2;

/// Propagated [SatelliteState], at signal transmission time,
/// expressed in the ECEF frame of the reception instant.
#[derive(Debug, Clone)]
pub struct SatelliteState {
    /// Satellite
    pub sv: SV,
    /// Reception time (requested instant)
    pub epoch: GnssTime,
    /// Signal transmission time (system time)
    pub transmission_time: GnssTime,
    /// ECEF position (m)
    pub position: Vector3<f64>,
    /// ECEF velocity (m/s), when requested
    pub velocity: Option<Vector3<f64>>,
    /// Satellite clock error (s), including the relativistic
    /// correction and (optionally) the group delay
    pub clock_error: f64,
    /// Satellite clock drift (s/s)
    pub clock_drift: f64,
    /// False when the selected record flags this satellite unusable
    pub healthy: bool,
    /// True when the selected record is used beyond its validity window
    pub predicted: bool,
    /// False when Kepler's equation did not converge (best effort position)
    pub converged: bool,
    coordinates: OnceLock<Coordinates>,
}

impl SatelliteState {
    /// Satellite position as [Coordinates], geodetic view lazily cached
    pub fn coordinates(&self) -> &Coordinates {
        self.coordinates
            .get_or_init(|| Coordinates::from_ecef_vector(self.position))
    }

    /// Returns [AzElRange] of this satellite, seen from `receiver`
    pub fn elevation_azimuth(&self, receiver: &Coordinates) -> AzElRange {
        receiver.azelrange(self.coordinates())
    }

    /// Converts this state to an ANISE [Orbit] (km, km/s),
    /// in the IAU Earth frame, at transmission time.
    #[cfg(feature = "orbit")]
    #[cfg_attr(docsrs, doc(cfg(feature = "orbit")))]
    pub fn to_orbit(&self) -> Orbit {
        let velocity = self.velocity.unwrap_or_else(Vector3::zeros) / 1.0E3;
        let position = self.position / 1.0E3;
        Orbit::from_cartesian_pos_vel(
            Vector6::new(
                position[0],
                position[1],
                position[2],
                velocity[0],
                velocity[1],
                velocity[2],
            ),
            self.transmission_time.to_epoch(),
            IAU_EARTH_FRAME,
        )
    }
}

/// Broadcast record, of either propagation family
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    /// Keplerian elements (GPS, Galileo, BeiDou, QZSS, IRNSS)
    Kepler(&'a Ephemeris),
    /// State vector (GLONASS)
    Glonass(&'a GlonassEphemeris),
}

impl Record<'_> {
    /// Reference time of the underlying record
    pub fn reference_time(&self) -> GnssTime {
        match self {
            Self::Kepler(eph) => eph.reference_time(),
            Self::Glonass(eph) => eph.reference_time(),
        }
    }
    /// Maximal age (s) of the underlying record
    pub fn max_age(&self) -> f64 {
        match self {
            Self::Kepler(eph) => eph.max_age(),
            Self::Glonass(eph) => eph.max_age(),
        }
    }
}

/// Rotates `vector` by the Earth rotation during signal flight `tau_s`
fn earth_rotation(omega: f64, tau_s: f64, vector: Vector3<f64>) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), -omega * tau_s) * vector
}

/// Propagates `record` for a signal received at `t_rx` (receiver time),
/// with measured `pseudorange_m` and receiver clock offset `rx_clock_s`.
pub fn propagate(
    record: Record<'_>,
    t_rx: GnssTime,
    pseudorange_m: f64,
    rx_clock_s: f64,
    cfg: &Config,
) -> Result<SatelliteState, Error> {
    match record {
        Record::Kepler(ephemeris) => match ephemeris.sv.constellation {
            Constellation::GPS
            | Constellation::Galileo
            | Constellation::BeiDou
            | Constellation::QZSS
            | Constellation::IRNSS => {
                propagate_kepler(ephemeris, t_rx, pseudorange_m, rx_clock_s, cfg)
            },
            c => Err(Error::NonSupportedConstellation(c)),
        },
        Record::Glonass(ephemeris) => {
            propagate_glonass(ephemeris, t_rx, pseudorange_m, rx_clock_s, cfg)
        },
    }
}

/// Analytic (Keplerian) propagation
fn propagate_kepler(
    ephemeris: &Ephemeris,
    t_rx: GnssTime,
    pseudorange_m: f64,
    rx_clock_s: f64,
    cfg: &Config,
) -> Result<SatelliteState, Error> {
    let sv = ephemeris.sv;
    let tgd = if cfg.sv_tgd {
        ephemeris.tgd().unwrap_or(0.0)
    } else {
        0.0
    };

    // satellite clock reading, at transmission
    let t_tx_sv = t_rx - pseudorange_m / SPEED_OF_LIGHT;

    let clock_error = |t: GnssTime| {
        let helper = ephemeris.helper(t).ok_or(Error::MissingOrbitalData(sv))?;
        let (bias, drift) = ephemeris.clock_polynomial(ephemeris.t_c(t));
        Ok::<_, Error>((bias + helper.dtr - tgd, drift + helper.fd_dtr, helper))
    };

    let mut t_tx = t_tx_sv;
    for _ in 0..CLOCK_ITERATIONS {
        let (dt_sv, _, _) = clock_error(t_tx)?;
        t_tx = t_tx_sv - dt_sv;
    }

    let (dt_sv, clock_drift, helper) = clock_error(t_tx)?;

    let tau = (t_rx - rx_clock_s) - t_tx;
    let omega = Constants::omega(sv);

    let position = earth_rotation(omega, tau, helper.ecef_position());
    let velocity = if cfg.velocity {
        Some(earth_rotation(omega, tau, helper.ecef_velocity()))
    } else {
        None
    };

    debug!(
        "{}({}): t_k={:.3}s dt_sv={:.3E}s tau={:.6}s",
        sv, t_rx, helper.t_k, dt_sv, tau
    );

    Ok(SatelliteState {
        sv,
        epoch: t_rx,
        transmission_time: t_tx,
        position,
        velocity,
        clock_error: dt_sv,
        clock_drift,
        healthy: ephemeris.is_healthy(),
        predicted: !ephemeris.is_valid(t_tx),
        converged: helper.converged,
        coordinates: OnceLock::new(),
    })
}

/// Numerical (GLONASS) propagation
fn propagate_glonass(
    ephemeris: &GlonassEphemeris,
    t_rx: GnssTime,
    pseudorange_m: f64,
    rx_clock_s: f64,
    cfg: &Config,
) -> Result<SatelliteState, Error> {
    let sv = ephemeris.sv;
    let t_tx_sv = t_rx - pseudorange_m / SPEED_OF_LIGHT;

    let mut t_tx = t_tx_sv;
    for _ in 0..CLOCK_ITERATIONS {
        let (bias, _) = ephemeris.clock(normalize_half_week(t_tx - ephemeris.toc));
        t_tx = t_tx_sv - bias;
    }
    let (clock_error, clock_drift) =
        ephemeris.clock(normalize_half_week(t_tx - ephemeris.toc));

    let (position, velocity) = ephemeris.integrate(t_tx, cfg.glonass_step_s)?;

    let (dx, dy, dz) = Pz90::TO_WGS84;
    let position = position + Vector3::new(dx, dy, dz);

    let tau = (t_rx - rx_clock_s) - t_tx;
    let omega = Constants::omega(sv);

    let position = earth_rotation(omega, tau, position);
    let velocity = if cfg.velocity {
        Some(earth_rotation(omega, tau, velocity))
    } else {
        None
    };

    debug!(
        "{}({}): dt={:.3}s dt_sv={:.3E}s tau={:.6}s",
        sv,
        t_rx,
        t_tx - ephemeris.toc,
        clock_error,
        tau
    );

    Ok(SatelliteState {
        sv,
        epoch: t_rx,
        transmission_time: t_tx,
        position,
        velocity,
        clock_error,
        clock_drift,
        healthy: ephemeris.is_healthy(),
        predicted: (t_tx - ephemeris.toc).abs() > ephemeris.max_age(),
        converged: true,
        coordinates: OnceLock::new(),
    })
}
