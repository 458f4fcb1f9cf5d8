//! Navigation [Engine]: the host facing surface.
//! Readers work on immutable [Snapshot]s, ingestion publishes new ones.
use std::{
    collections::HashMap,
    io,
    sync::{mpsc, Arc, Mutex, RwLock},
    thread::{self, JoinHandle},
};

use log::{debug, warn};

use crate::{
    cfg::Config,
    error::Error,
    navigation::{IonosphereModel, NavigationFile, TimeOffsetModel, TimeSystemCorrection, UtcModel},
    prelude::{Constellation, SV},
    propagator::{propagate, Record, SatelliteState},
    store::{EphemerisStore, Selection},
    time::GnssTime,
};

/// Correction models of one ingested file, with that file's time coverage
#[derive(Debug, Clone)]
struct CorrectionSet {
    start: GnssTime,
    end: GnssTime,
    ionosphere: HashMap<Constellation, IonosphereModel>,
    utc: HashMap<Constellation, UtcModel>,
    time_offsets: Vec<TimeOffsetModel>,
}

impl CorrectionSet {
    fn covers(&self, t: GnssTime) -> bool {
        self.start <= t && t <= self.end
    }
    /// Time distance (s) from `t` to this coverage, 0 when covered
    fn distance(&self, t: GnssTime) -> f64 {
        if t < self.start {
            self.start - t
        } else if t > self.end {
            t - self.end
        } else {
            0.0
        }
    }
}

/// Immutable state of the [Engine]: all ingested records and
/// correction models.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    store: EphemerisStore,
    /// In ingestion order
    corrections: Vec<Arc<CorrectionSet>>,
}

impl Snapshot {
    /// Returns the [EphemerisStore]
    pub fn store(&self) -> &EphemerisStore {
        &self.store
    }

    /// Returns a new [Snapshot] with `file` merged in.
    /// Satellites and correction sets that `file` does not modify
    /// are shared with `self`.
    fn merge(&self, file: &NavigationFile) -> Self {
        let mut s = self.clone();
        s.store.extend(file);
        if let Some((start, end)) = file.time_span() {
            s.corrections.push(Arc::new(CorrectionSet {
                start,
                end,
                ionosphere: file.header.ionosphere.clone(),
                utc: file.header.utc.clone(),
                time_offsets: file.header.time_offsets.clone(),
            }));
        }
        s
    }

    /// True if an ingested file covers `t`
    pub fn is_epoch_covered(&self, t: GnssTime) -> bool {
        self.corrections.iter().any(|set| set.covers(t))
    }

    /// Picks the correction set for `t` among those `filter` accepts:
    /// the most recently ingested covering `t`, else the nearest.
    fn corrections<F>(&self, t: GnssTime, filter: F) -> Option<&CorrectionSet>
    where
        F: Fn(&CorrectionSet) -> bool,
    {
        let candidates = || {
            self.corrections
                .iter()
                .map(Arc::as_ref)
                .filter(|set| filter(set))
        };
        candidates().rev().find(|set| set.covers(t)).or_else(|| {
            candidates().rev().min_by(|a, b| a.distance(t).total_cmp(&b.distance(t)))
        })
    }

    /// [IonosphereModel] of this constellation, at `t`
    pub fn ionosphere_model(&self, t: GnssTime, c: Constellation) -> Option<IonosphereModel> {
        self.corrections(t, |set| set.ionosphere.contains_key(&c))
            .and_then(|set| set.ionosphere.get(&c))
            .copied()
    }

    /// [UtcModel] of this constellation, at `t`
    pub fn utc_model(&self, t: GnssTime, c: Constellation) -> Option<UtcModel> {
        self.corrections(t, |set| set.utc.contains_key(&c))
            .and_then(|set| set.utc.get(&c))
            .copied()
    }

    /// [TimeOffsetModel] of this kind, at `t`
    pub fn time_offset_model(
        &self,
        t: GnssTime,
        correction: TimeSystemCorrection,
    ) -> Option<TimeOffsetModel> {
        let matches = |model: &&TimeOffsetModel| model.correction == correction;
        self.corrections(t, |set| set.time_offsets.iter().any(|m| m.correction == correction))
            .and_then(|set| set.time_offsets.iter().find(matches))
            .copied()
    }

    /// Selects the record for `sv` at `t`: Some((record, healthy)),
    /// or None if no record is within its validity window.
    fn lookup(&self, t: GnssTime, sv: SV) -> Result<Option<(Record<'_>, bool)>, Error> {
        match sv.constellation {
            Constellation::Glonass => Ok(match self.store.find_glonass(t, sv) {
                Selection::Found(eph) => Some((Record::Glonass(eph), true)),
                Selection::Unhealthy(eph) => Some((Record::Glonass(eph), false)),
                Selection::NotFound => None,
            }),
            Constellation::GPS
            | Constellation::Galileo
            | Constellation::BeiDou
            | Constellation::QZSS
            | Constellation::IRNSS => Ok(match self.store.find_ephemeris(t, sv) {
                Selection::Found(eph) => Some((Record::Kepler(eph), true)),
                Selection::Unhealthy(eph) => Some((Record::Kepler(eph), false)),
                Selection::NotFound => None,
            }),
            c => Err(Error::NonSupportedConstellation(c)),
        }
    }

    /// Resolves [SatelliteState] of `sv` for a signal received at `t`.
    /// When no record covers `t`, earlier instants are searched
    /// (`cfg.lookback_retries` steps of `cfg.lookback_step_s`).
    pub fn satellite_state(
        &self,
        cfg: &Config,
        t: GnssTime,
        sv: SV,
        pseudorange_m: f64,
        rx_clock_s: f64,
    ) -> Result<SatelliteState, Error> {
        cfg.validate()?;
        if pseudorange_m == 0.0 {
            return Err(Error::NoMeasurement);
        }

        for retry in 0..=cfg.lookback_retries {
            let t_search = t - retry as f64 * cfg.lookback_step_s;
            let Some((record, healthy)) = self.lookup(t_search, sv)? else {
                continue;
            };

            if !healthy && !cfg.propagate_unhealthy {
                debug!("{}({}): rejected, unhealthy", sv, t);
                return Err(Error::UnhealthySatellite(sv));
            }

            if retry > 0 {
                debug!(
                    "{}({}): selected record {} after {} retries",
                    sv,
                    t,
                    record.reference_time(),
                    retry
                );
            }

            let mut state = propagate(record, t, pseudorange_m, rx_clock_s, cfg)?;
            state.healthy = healthy;
            state.predicted = (t - record.reference_time()).abs() > record.max_age();
            return Ok(state);
        }

        warn!(
            "{}({}): no ephemeris found ({} retries)",
            sv, t, cfg.lookback_retries
        );
        Err(Error::NoEphemerisFound(sv))
    }
}

/// [Engine] is the navigation message processing and orbit propagation
/// service. It can be shared between threads (for example one per
/// constellation); lookups never wait on an ongoing propagation.
#[derive(Debug, Default)]
pub struct Engine {
    cfg: Config,
    snapshot: RwLock<Arc<Snapshot>>,
    /// Serializes snapshot publications
    writer: Mutex<()>,
}

impl Engine {
    /// Builds a new [Engine] with no ephemeris. An invalid [Config]
    /// is reported here, and by every following query.
    pub fn new(cfg: Config) -> Self {
        if let Err(e) = cfg.validate() {
            warn!("{}", e);
        }
        Self {
            cfg,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            writer: Mutex::new(()),
        }
    }

    /// Returns current [Config]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the current [Snapshot]. It remains valid (unchanged)
    /// whatever the following ingestions.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Merges all records and models of this [NavigationFile]
    /// and publishes the new [Snapshot].
    pub fn ingest(&self, file: &NavigationFile) {
        let _writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let snapshot = Arc::new(self.snapshot().merge(file));
        debug!(
            "ingested {} ephemerides, {} glonass: {} records in store",
            file.ephemerides.len(),
            file.glonass.len(),
            snapshot.store.len()
        );

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot;
    }

    /// Spawns a dedicated ingestion thread. Files sent through the returned
    /// channel are ingested in order. The thread exits once all senders
    /// are dropped.
    pub fn spawn_ingestion(
        self: &Arc<Self>,
    ) -> io::Result<(mpsc::Sender<NavigationFile>, JoinHandle<()>)> {
        let (tx, rx) = mpsc::channel::<NavigationFile>();
        let engine = Arc::clone(self);
        let handle = thread::Builder::new()
            .name("rinex-nav-ingestion".to_string())
            .spawn(move || {
                for file in rx {
                    engine.ingest(&file);
                }
                debug!("ingestion channel closed");
            })?;
        Ok((tx, handle))
    }

    /// True if an ingested file covers `t`
    pub fn is_epoch_covered(&self, t: GnssTime) -> bool {
        self.snapshot().is_epoch_covered(t)
    }

    /// Resolves [SatelliteState] of `sv`, for a signal received at `t`
    /// (receiver time), with measured `pseudorange_m` and receiver clock
    /// offset `rx_clock_s`.
    pub fn try_satellite_state(
        &self,
        t: GnssTime,
        sv: SV,
        pseudorange_m: f64,
        rx_clock_s: f64,
    ) -> Result<SatelliteState, Error> {
        self.snapshot()
            .satellite_state(&self.cfg, t, sv, pseudorange_m, rx_clock_s)
    }

    /// [Engine::try_satellite_state] with failures resolved to None
    pub fn satellite_state(
        &self,
        t: GnssTime,
        sv: SV,
        pseudorange_m: f64,
        rx_clock_s: f64,
    ) -> Option<SatelliteState> {
        self.try_satellite_state(t, sv, pseudorange_m, rx_clock_s)
            .ok()
    }

    /// [IonosphereModel] of this constellation, at `t`
    pub fn ionosphere_model(&self, t: GnssTime, c: Constellation) -> Option<IonosphereModel> {
        self.snapshot().ionosphere_model(t, c)
    }

    /// [UtcModel] of this constellation, at `t`
    pub fn utc_model(&self, t: GnssTime, c: Constellation) -> Option<UtcModel> {
        self.snapshot().utc_model(t, c)
    }

    /// [TimeOffsetModel] of this kind, at `t`
    pub fn time_offset_model(
        &self,
        t: GnssTime,
        correction: TimeSystemCorrection,
    ) -> Option<TimeOffsetModel> {
        self.snapshot().time_offset_model(t, correction)
    }
}
