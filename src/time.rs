//! Unified GNSS time representation
use std::{
    cmp::Ordering,
    ops::{Add, AddAssign, Sub, SubAssign},
    time::{SystemTime, UNIX_EPOCH},
};

use hifitime::{Duration, Epoch, HifitimeError, TimeScale, Unit};

use crate::{
    constants::{HALF_WEEK, SECONDS_PER_WEEK},
    leap::leap_seconds,
    prelude::Constellation,
};

const WEEK_MS: i64 = 604_800_000;
const DAY_MS: i64 = 86_400_000;

/// 1980-01-06 to 1999-08-22 (Galileo week origin)
const GST_ORIGIN_DAYS: i64 = 7168;

/// 1980-01-06 to 2006-01-01 (BeiDou week origin)
const BDT_ORIGIN_DAYS: i64 = 9492;

/// BDT = GPST - 14s
const BDT_OFFSET_MS: i64 = 14_000;

/// [GnssTime] is an instant, stored as an integer number of milliseconds
/// elapsed since the GPS origin (1980-01-06T00:00:00 GPST)
/// plus a sub millisecond fraction. It converts losslessly to
/// (week, seconds of week) for all supported constellations.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GnssTime {
    millis: i64,
    /// Sub millisecond fraction, in [0, 1) ms
    fraction: f64,
}

impl PartialEq for GnssTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GnssTime {}

impl PartialOrd for GnssTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GnssTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis
            .cmp(&other.millis)
            .then(self.fraction.total_cmp(&other.fraction))
    }
}

/// Wraps a time difference (s) into [-302400, 302400]
/// by adding or removing a full week. Idempotent.
pub fn normalize_half_week(dt: f64) -> f64 {
    if dt > HALF_WEEK {
        dt - SECONDS_PER_WEEK
    } else if dt < -HALF_WEEK {
        dt + SECONDS_PER_WEEK
    } else {
        dt
    }
}

/// Splits fractional seconds into (seconds, nanoseconds).
/// Out of range values are left for the calendar validation to reject.
fn split_seconds(ss: f64) -> (u8, u32) {
    let nanos = (ss * 1.0E9).round().max(0.0) as u64;
    let seconds = u8::try_from(nanos / 1_000_000_000).unwrap_or(u8::MAX);
    (seconds, (nanos % 1_000_000_000) as u32)
}

/// Time scale calendar dates of this constellation are expressed in
fn calendar_timescale(constellation: Constellation) -> TimeScale {
    match constellation {
        Constellation::Glonass => TimeScale::UTC,
        Constellation::Galileo => TimeScale::GST,
        Constellation::BeiDou => TimeScale::BDT,
        Constellation::QZSS => TimeScale::QZSST,
        _ => TimeScale::GPST,
    }
}

/// Week origin of this constellation, in milliseconds since the GPS origin
fn week_origin_ms(constellation: Constellation) -> i64 {
    match constellation {
        Constellation::Galileo => GST_ORIGIN_DAYS * DAY_MS,
        Constellation::BeiDou => BDT_ORIGIN_DAYS * DAY_MS + BDT_OFFSET_MS,
        _ => 0,
    }
}

impl GnssTime {
    /// Builds [GnssTime] from a number of milliseconds since the GPS origin
    pub fn from_millis(millis: i64) -> Self {
        Self {
            millis,
            fraction: 0.0,
        }
    }

    /// Builds [GnssTime] from a number of seconds since the GPS origin
    pub fn from_gpst_seconds(seconds: f64) -> Self {
        Self::default() + seconds
    }

    /// Integer milliseconds since the GPS origin
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Sub millisecond fraction, in milliseconds
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Seconds elapsed since the GPS origin
    pub fn gpst_seconds(&self) -> f64 {
        self.millis as f64 / 1.0E3 + self.fraction / 1.0E3
    }

    /// Builds [GnssTime] from UTC wall clock milliseconds since the Unix epoch.
    pub fn from_unix_millis(unix_ms: i64) -> Self {
        Self::from_epoch(Epoch::from_unix_duration(unix_ms * Unit::Millisecond))
    }

    /// Returns the UTC wall clock milliseconds since the Unix epoch
    pub fn to_unix_millis(&self) -> i64 {
        let nanos = self.to_epoch().to_unix_duration().total_nanoseconds();
        nanos.div_euclid(1_000_000) as i64
    }

    /// Builds [GnssTime] from a [SystemTime] wall clock instant
    pub fn from_system_time(t: SystemTime) -> Self {
        let unix = match t.duration_since(UNIX_EPOCH) {
            Ok(dt) => Duration::from(dt),
            Err(e) => -Duration::from(e.duration()),
        };
        Self::from_epoch(Epoch::from_unix_duration(unix))
    }

    /// Current wall clock instant
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Builds [GnssTime] from [Epoch], whatever its timescale
    pub fn from_epoch(epoch: Epoch) -> Self {
        let nanos = epoch.to_gpst_duration().total_nanoseconds();
        Self {
            millis: nanos.div_euclid(1_000_000) as i64,
            fraction: nanos.rem_euclid(1_000_000) as f64 / 1.0E6,
        }
    }

    /// Converts to [Epoch] expressed in GPST
    pub fn to_epoch(&self) -> Epoch {
        let nanos = self.millis as i128 * 1_000_000 + (self.fraction * 1.0E6).round() as i128;
        Epoch::from_gpst_duration(Duration::from_total_nanoseconds(nanos))
    }

    /// Builds [GnssTime] from a week counter and seconds of week,
    /// expressed in this constellation's own week numbering.
    pub fn from_week_tow(week: u32, tow: f64, constellation: Constellation) -> Self {
        let origin = week_origin_ms(constellation) + week as i64 * WEEK_MS;
        Self::from_millis(origin) + tow
    }

    /// Builds [GnssTime] from a UTC calendar date.
    /// Fails on dates that do not exist (Feb. 30th, 24h, ..).
    pub fn maybe_from_utc_calendar(
        y: i32,
        m: u8,
        d: u8,
        hh: u8,
        mm: u8,
        ss: f64,
    ) -> Result<Self, HifitimeError> {
        Self::maybe_from_calendar(y, m, d, hh, mm, ss, Constellation::Glonass)
    }

    /// Builds [GnssTime] from a calendar date expressed in the time scale
    /// of this constellation (GPST, GST, BDT, or UTC for Glonass).
    /// Fails on dates that do not exist.
    pub fn maybe_from_calendar(
        y: i32,
        m: u8,
        d: u8,
        hh: u8,
        mm: u8,
        ss: f64,
        constellation: Constellation,
    ) -> Result<Self, HifitimeError> {
        let (ss, ns) = split_seconds(ss);
        let ts = calendar_timescale(constellation);
        let epoch = Epoch::maybe_from_gregorian(y, m, d, hh, mm, ss, ns, ts)?;
        Ok(Self::from_epoch(epoch))
    }

    /// Builds [GnssTime] from a UTC calendar date.
    ///
    /// # Panics
    /// On invalid dates, like [Epoch::from_gregorian_utc].
    /// Use [GnssTime::maybe_from_utc_calendar] if unsure.
    pub fn from_utc_calendar(y: i32, m: u8, d: u8, hh: u8, mm: u8, ss: f64) -> Self {
        Self::from_calendar(y, m, d, hh, mm, ss, Constellation::Glonass)
    }

    /// Builds [GnssTime] from a calendar date expressed in the time scale
    /// of this constellation.
    ///
    /// # Panics
    /// On invalid dates, like [Epoch::from_gregorian].
    /// Use [GnssTime::maybe_from_calendar] if unsure.
    pub fn from_calendar(
        y: i32,
        m: u8,
        d: u8,
        hh: u8,
        mm: u8,
        ss: f64,
        constellation: Constellation,
    ) -> Self {
        let (ss, ns) = split_seconds(ss);
        let ts = calendar_timescale(constellation);
        Self::from_epoch(Epoch::from_gregorian(y, m, d, hh, mm, ss, ns, ts))
    }

    /// Week counter, in this constellation's numbering
    pub fn week(&self, constellation: Constellation) -> u32 {
        let elapsed = self.millis - week_origin_ms(constellation);
        elapsed.div_euclid(WEEK_MS) as u32
    }

    /// Seconds of week, in this constellation's time scale
    pub fn tow(&self, constellation: Constellation) -> f64 {
        let elapsed = self.millis - week_origin_ms(constellation);
        elapsed.rem_euclid(WEEK_MS) as f64 / 1.0E3 + self.fraction / 1.0E3
    }

    /// (Week, seconds of week) in this constellation's time scale
    pub fn week_tow(&self, constellation: Constellation) -> (u32, f64) {
        (self.week(constellation), self.tow(constellation))
    }

    /// Number of leap seconds (GPST - UTC) at this instant
    pub fn leap_seconds(&self) -> u32 {
        leap_seconds(self)
    }
}

impl Add<f64> for GnssTime {
    type Output = Self;
    /// Adds a number of seconds
    fn add(self, seconds: f64) -> Self {
        let ms = seconds * 1.0E3;
        let whole = ms.floor();
        let fraction = self.fraction + (ms - whole);
        let carry = fraction.floor();
        Self {
            millis: self.millis + whole as i64 + carry as i64,
            fraction: fraction - carry,
        }
    }
}

impl AddAssign<f64> for GnssTime {
    fn add_assign(&mut self, seconds: f64) {
        *self = *self + seconds;
    }
}

impl Sub<f64> for GnssTime {
    type Output = Self;
    /// Subtracts a number of seconds
    fn sub(self, seconds: f64) -> Self {
        self + (-seconds)
    }
}

impl SubAssign<f64> for GnssTime {
    fn sub_assign(&mut self, seconds: f64) {
        *self = *self - seconds;
    }
}

impl Sub for GnssTime {
    type Output = f64;
    /// Elapsed seconds between two instants
    fn sub(self, rhs: Self) -> f64 {
        (self.millis - rhs.millis) as f64 / 1.0E3 + (self.fraction - rhs.fraction) / 1.0E3
    }
}

impl From<Epoch> for GnssTime {
    fn from(epoch: Epoch) -> Self {
        Self::from_epoch(epoch)
    }
}

impl From<GnssTime> for Epoch {
    fn from(t: GnssTime) -> Self {
        t.to_epoch()
    }
}

impl std::fmt::Display for GnssTime {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_epoch())
    }
}
