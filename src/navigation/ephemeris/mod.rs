//! Keplerian broadcast ephemeris
mod kepler;
mod parsing;

pub use kepler::{Kepler, KeplerSolution, Perturbations};

pub(crate) use kepler::{solve_kepler, Helper};
pub(crate) use parsing::{parse_record, Decoded};

use std::collections::HashMap;

use crate::{
    constants::Constants,
    navigation::{health, OrbitItem},
    prelude::{Constellation, SV},
    time::{normalize_half_week, GnssTime},
};

/// [Ephemeris] is one broadcast navigation message, for one satellite
/// and one reference time. Orbit fields depend on the constellation
/// and are stored by name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    /// Satellite
    pub sv: SV,
    /// Time of clock
    pub toc: GnssTime,
    /// Clock bias (s)
    pub clock_bias: f64,
    /// Clock drift (s.s⁻¹)
    pub clock_drift: f64,
    /// Clock drift rate (s.s⁻²)
    pub clock_drift_rate: f64,
    /// Orbits are revision and constellation dependent,
    /// sorted by key and content.
    pub orbits: HashMap<String, OrbitItem>,
}

impl Ephemeris {
    /// Builds a new [Ephemeris] with no orbit field
    pub fn new(sv: SV, toc: GnssTime, clock: (f64, f64, f64)) -> Self {
        Self {
            sv,
            toc,
            clock_bias: clock.0,
            clock_drift: clock.1,
            clock_drift_rate: clock.2,
            orbits: HashMap::new(),
        }
    }

    /// Returns onboard clock (bias [s], drift [s/s], drift rate [s/s²]).
    pub fn sv_clock(&self) -> (f64, f64, f64) {
        (self.clock_bias, self.clock_drift, self.clock_drift_rate)
    }

    /// Returns orbit field from readable description, interpreted as f64.
    /// Null values are values.
    pub fn get_orbit_f64(&self, field: &str) -> Option<f64> {
        self.orbits.get(field).map(|value| value.as_f64())
    }

    /// Adds (or replaces) one orbit field
    pub fn with_orbit(&self, key: &str, orbit: OrbitItem) -> Self {
        let mut s = self.clone();
        s.orbits.insert(key.to_string(), orbit);
        s
    }

    /// Adds (or replaces) one orbit field, encoded as f64
    pub(crate) fn set_orbit_f64(&mut self, field: &str, value: f64) {
        self.orbits.insert(field.to_string(), OrbitItem::from(value));
    }

    /// Week counter, in the week numbering of this file.
    /// Galileo weeks are aligned to GPS weeks in RINEX.
    pub fn week(&self) -> Option<u32> {
        self.orbits.get("week").and_then(|value| value.as_u32())
    }

    /// Time grid (week origin) that "toe" and "week" are expressed in
    pub(crate) fn time_grid(&self) -> Constellation {
        match self.sv.constellation {
            Constellation::BeiDou => Constellation::BeiDou,
            _ => Constellation::GPS,
        }
    }

    /// Time of ephemeris, in seconds of week
    pub fn toe_s(&self) -> Option<f64> {
        self.get_orbit_f64("toe")
    }

    /// Returns time of ephemeris as [GnssTime]
    pub fn toe(&self) -> Option<GnssTime> {
        let week = self.week()?;
        let toe = self.toe_s()?;
        Some(GnssTime::from_week_tow(week, toe, self.time_grid()))
    }

    /// Reference time of this message: time of ephemeris when defined,
    /// time of clock otherwise.
    pub fn reference_time(&self) -> GnssTime {
        self.toe().unwrap_or(self.toc)
    }

    /// Raw health field (SatH1 for BeiDou)
    pub fn health(&self) -> Option<u32> {
        let key = match self.sv.constellation {
            Constellation::BeiDou => "satH1",
            _ => "health",
        };
        self.orbits.get(key).map(|value| value.as_f64() as u32)
    }

    /// Returns true when this message declares the satellite usable.
    /// A message with no health field is considered healthy.
    pub fn is_healthy(&self) -> bool {
        match self.health() {
            Some(raw) => health::is_healthy(self.sv.constellation, raw),
            None => true,
        }
    }

    /// Issue of data (IODE, IODnav, AODE or IODEC)
    pub fn iode(&self) -> Option<u32> {
        let key = match self.sv.constellation {
            Constellation::Galileo => "iodnav",
            Constellation::BeiDou => "aode",
            Constellation::IRNSS => "iodec",
            _ => "iode",
        };
        self.get_orbit_f64(key).map(|value| value as u32)
    }

    /// Total group delay (s) of the single frequency reference signal
    /// (L1 C/A, E1 (BGD E1/E5b), B1I)
    pub fn tgd(&self) -> Option<f64> {
        let key = match self.sv.constellation {
            Constellation::Galileo => "bgdE5bE1",
            Constellation::BeiDou => "tgd1b1b3",
            _ => "tgd",
        };
        self.get_orbit_f64(key)
    }

    /// Fit interval (hours), when broadcast and not null
    pub fn fit_interval_h(&self) -> Option<f64> {
        match self.sv.constellation {
            Constellation::GPS | Constellation::QZSS => {
                let fit = self.get_orbit_f64("fitInterval")?;
                if fit > 0.0 {
                    Some(fit)
                } else {
                    None
                }
            },
            _ => None,
        }
    }

    /// Accuracy index: URA (m), SISA (m) for Galileo
    pub fn accuracy(&self) -> Option<f64> {
        match self.sv.constellation {
            Constellation::Galileo => self.get_orbit_f64("sisa"),
            _ => self.get_orbit_f64("svAccuracy"),
        }
    }

    /// Maximal time distance (s) between the reference time and
    /// any instant this message may be used at: half the fit interval,
    /// or a constellation specific default.
    pub fn max_age(&self) -> f64 {
        match self.fit_interval_h() {
            Some(fit) => fit * 3600.0 / 2.0,
            None => Constants::max_age(self.sv.constellation),
        }
    }

    /// Returns true if `t` is within the validity window of this message
    pub fn is_valid(&self, t: GnssTime) -> bool {
        (t - self.reference_time()).abs() <= self.max_age()
    }

    /// Retrieves Keplerian parameters
    pub fn kepler(&self) -> Option<Kepler> {
        Some(Kepler {
            a: self.get_orbit_f64("sqrta")?.powi(2),
            e: self.get_orbit_f64("e")?,
            i_0: self.get_orbit_f64("i0")?,
            omega: self.get_orbit_f64("omega")?,
            omega_0: self.get_orbit_f64("omega0")?,
            m_0: self.get_orbit_f64("m0")?,
            toe: self.get_orbit_f64("toe")?,
        })
    }

    /// Creates new [Ephemeris] from [Kepler]ian parameters
    pub fn with_kepler(&self, kepler: Kepler) -> Self {
        let mut s = self.clone();
        s.set_orbit_f64("sqrta", kepler.a.sqrt());
        s.set_orbit_f64("e", kepler.e);
        s.set_orbit_f64("i0", kepler.i_0);
        s.set_orbit_f64("omega", kepler.omega);
        s.set_orbit_f64("omega0", kepler.omega_0);
        s.set_orbit_f64("m0", kepler.m_0);
        s.set_orbit_f64("toe", kepler.toe);
        s
    }

    /// Retrieves orbit [Perturbations]
    pub fn perturbations(&self) -> Option<Perturbations> {
        Some(Perturbations {
            cuc: self.get_orbit_f64("cuc")?,
            cus: self.get_orbit_f64("cus")?,
            cic: self.get_orbit_f64("cic")?,
            cis: self.get_orbit_f64("cis")?,
            crc: self.get_orbit_f64("crc")?,
            crs: self.get_orbit_f64("crs")?,
            dn: self.get_orbit_f64("deltaN")?,
            i_dot: self.get_orbit_f64("idot")?,
            omega_dot: self.get_orbit_f64("omegaDot")?,
        })
    }

    /// Creates new [Ephemeris] with desired orbit [Perturbations]
    pub fn with_perturbations(&self, perturbations: Perturbations) -> Self {
        let mut s = self.clone();
        s.set_orbit_f64("cuc", perturbations.cuc);
        s.set_orbit_f64("cus", perturbations.cus);
        s.set_orbit_f64("cic", perturbations.cic);
        s.set_orbit_f64("cis", perturbations.cis);
        s.set_orbit_f64("crc", perturbations.crc);
        s.set_orbit_f64("crs", perturbations.crs);
        s.set_orbit_f64("deltaN", perturbations.dn);
        s.set_orbit_f64("idot", perturbations.i_dot);
        s.set_orbit_f64("omegaDot", perturbations.omega_dot);
        s
    }

    /// Seconds elapsed from time of ephemeris to `t`, normalized to ± half a week
    pub(crate) fn t_k(&self, t: GnssTime) -> Option<f64> {
        let toe = self.toe_s()?;
        Some(normalize_half_week(t.tow(self.time_grid()) - toe))
    }

    /// Seconds elapsed from time of clock to `t`, normalized to ± half a week
    pub(crate) fn t_c(&self, t: GnssTime) -> f64 {
        normalize_half_week(t - self.toc)
    }

    /// Clock polynomial evaluated `dt` seconds after time of clock:
    /// returns (bias [s], drift [s/s])
    pub fn clock_polynomial(&self, dt: f64) -> (f64, f64) {
        let (a0, a1, a2) = self.sv_clock();
        (a0 + a1 * dt + a2 * dt.powi(2), a1 + 2.0 * a2 * dt)
    }
}
