//! Ephemeris storage and time/health aware selection
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use log::debug;

use crate::{
    navigation::{Ephemeris, GlonassEphemeris, NavigationFile},
    prelude::SV,
    time::GnssTime,
};

/// Common behavior of broadcast records, regarding selection
pub trait Broadcast {
    /// Satellite this record describes
    fn sv(&self) -> SV;
    /// Reference time of this record
    fn reference_time(&self) -> GnssTime;
    /// Maximal time distance (s) this record may be used at
    fn max_age(&self) -> f64;
    /// True when this record declares the satellite usable
    fn is_healthy(&self) -> bool;
}

impl Broadcast for Ephemeris {
    fn sv(&self) -> SV {
        self.sv
    }
    fn reference_time(&self) -> GnssTime {
        Ephemeris::reference_time(self)
    }
    fn max_age(&self) -> f64 {
        Ephemeris::max_age(self)
    }
    fn is_healthy(&self) -> bool {
        Ephemeris::is_healthy(self)
    }
}

impl Broadcast for GlonassEphemeris {
    fn sv(&self) -> SV {
        self.sv
    }
    fn reference_time(&self) -> GnssTime {
        GlonassEphemeris::reference_time(self)
    }
    fn max_age(&self) -> f64 {
        GlonassEphemeris::max_age(self)
    }
    fn is_healthy(&self) -> bool {
        GlonassEphemeris::is_healthy(self)
    }
}

/// Outcome of an ephemeris lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a, T> {
    /// Closest record, healthy and within its validity window
    Found(&'a T),
    /// The closest record (within its validity window) declares
    /// the satellite unusable
    Unhealthy(&'a T),
    /// No record within validity window
    NotFound,
}

impl<'a, T> Selection<'a, T> {
    /// Returns the selected record, whatever its health
    pub fn record(&self) -> Option<&'a T> {
        match self {
            Self::Found(record) | Self::Unhealthy(record) => Some(record),
            Self::NotFound => None,
        }
    }
    /// True if a healthy record was selected
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Picks the record closest to `t`. Equidistant records resolve to the past one.
fn select<T: Broadcast>(records: Option<&BTreeMap<GnssTime, T>>, t: GnssTime) -> Selection<'_, T> {
    let Some(records) = records else {
        return Selection::NotFound;
    };

    let before = records.range(..=t).next_back();
    let after = records.range(t..).next();

    let closest = match (before, after) {
        (Some((t_b, before)), Some((t_a, after))) => {
            if (t - *t_b) <= (*t_a - t) {
                before
            } else {
                after
            }
        },
        (Some((_, before)), None) => before,
        (None, Some((_, after))) => after,
        (None, None) => return Selection::NotFound,
    };

    let dt = (t - closest.reference_time()).abs();
    if dt > closest.max_age() {
        debug!(
            "{}: closest record ({}) is {:.0}s away (max {:.0}s)",
            closest.sv(),
            closest.reference_time(),
            dt,
            closest.max_age()
        );
        return Selection::NotFound;
    }

    if closest.is_healthy() {
        Selection::Found(closest)
    } else {
        debug!(
            "{}: closest record ({}) is unhealthy",
            closest.sv(),
            closest.reference_time()
        );
        Selection::Unhealthy(closest)
    }
}

/// Records of one satellite, sorted by reference time.
/// Shared between clones until modified.
type Records<T> = Arc<BTreeMap<GnssTime, T>>;

/// [EphemerisStore] owns all broadcast records, per satellite,
/// sorted by reference time. Cloning only copies the per satellite
/// handles: a satellite's records are copied on its first modification.
#[derive(Debug, Clone, Default)]
pub struct EphemerisStore {
    kepler: HashMap<SV, Records<Ephemeris>>,
    glonass: HashMap<SV, Records<GlonassEphemeris>>,
}

impl EphemerisStore {
    /// Builds an empty [EphemerisStore]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a Keplerian record. A record with identical satellite and
    /// reference time supersedes the stored one.
    pub fn add(&mut self, ephemeris: Ephemeris) {
        let records = self.kepler.entry(ephemeris.sv).or_default();
        Arc::make_mut(records).insert(ephemeris.reference_time(), ephemeris);
    }

    /// Inserts a GLONASS record. A record with identical satellite and
    /// reference time supersedes the stored one.
    pub fn add_glonass(&mut self, ephemeris: GlonassEphemeris) {
        let records = self.glonass.entry(ephemeris.sv).or_default();
        Arc::make_mut(records).insert(ephemeris.reference_time(), ephemeris);
    }

    /// Inserts all records of this [NavigationFile]
    pub fn extend(&mut self, file: &NavigationFile) {
        for ephemeris in file.ephemerides.iter() {
            self.add(ephemeris.clone());
        }
        for ephemeris in file.glonass.iter() {
            self.add_glonass(*ephemeris);
        }
    }

    /// Returns the Keplerian record whose reference time is closest to `t`
    pub fn find_ephemeris(&self, t: GnssTime, sv: SV) -> Selection<'_, Ephemeris> {
        select(self.kepler.get(&sv).map(Arc::as_ref), t)
    }

    /// Returns the GLONASS record whose reference time is closest to `t`
    pub fn find_glonass(&self, t: GnssTime, sv: SV) -> Selection<'_, GlonassEphemeris> {
        select(self.glonass.get(&sv).map(Arc::as_ref), t)
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.kepler.values().map(|records| records.len()).sum::<usize>()
            + self.glonass.values().map(|records| records.len()).sum::<usize>()
    }

    /// True if this store contains no record
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all satellites for which a record exists
    pub fn satellites(&self) -> impl Iterator<Item = SV> + '_ {
        self.kepler.keys().chain(self.glonass.keys()).copied()
    }

    /// Iterates over the Keplerian records of this satellite, in chronological order
    pub fn ephemerides(&self, sv: SV) -> impl Iterator<Item = &Ephemeris> + '_ {
        self.kepler
            .get(&sv)
            .into_iter()
            .flat_map(|records| records.values())
    }

    /// Iterates over the GLONASS records of this satellite, in chronological order
    pub fn glonass_ephemerides(&self, sv: SV) -> impl Iterator<Item = &GlonassEphemeris> + '_ {
        self.glonass
            .get(&sv)
            .into_iter()
            .flat_map(|records| records.values())
    }
}
