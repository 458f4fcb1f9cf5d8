//! [Engine](crate::prelude::Engine) configuration
use crate::error::Error;

/// Smallest Glonass integration step (s)
pub(crate) const MIN_GLONASS_STEP_S: f64 = 0.1;

/// Returns `step_s` if it is a usable Glonass integration step
pub(crate) fn check_glonass_step(step_s: f64) -> Result<f64, Error> {
    if step_s.is_finite() && step_s >= MIN_GLONASS_STEP_S {
        Ok(step_s)
    } else {
        Err(Error::InvalidConfig("glonass_step_s must be at least 0.1s"))
    }
}

fn check_lookback_step(step_s: f64) -> Result<f64, Error> {
    if step_s.is_finite() && step_s > 0.0 {
        Ok(step_s)
    } else {
        Err(Error::InvalidConfig("lookback_step_s must be positive"))
    }
}

#[cfg(feature = "serde")]
fn deserialize_glonass_step<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let step_s = <f64 as serde::Deserialize>::deserialize(deserializer)?;
    check_glonass_step(step_s).map_err(serde::de::Error::custom)
}

#[cfg(feature = "serde")]
fn deserialize_lookback_step<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let step_s = <f64 as serde::Deserialize>::deserialize(deserializer)?;
    check_lookback_step(step_s).map_err(serde::de::Error::custom)
}

fn default_lookback_retries() -> u32 {
    12
}

fn default_lookback_step() -> f64 {
    3600.0
}

fn default_sv_tgd() -> bool {
    true
}

fn default_velocity() -> bool {
    true
}

fn default_propagate_unhealthy() -> bool {
    false
}

fn default_glonass_step() -> f64 {
    60.0
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Number of backward steps attempted when no ephemeris
    /// covers the requested instant.
    #[cfg_attr(feature = "serde", serde(default = "default_lookback_retries"))]
    pub lookback_retries: u32,
    /// Backward step (s) of the ephemeris search.
    #[cfg_attr(
        feature = "serde",
        serde(
            default = "default_lookback_step",
            deserialize_with = "deserialize_lookback_step"
        )
    )]
    pub lookback_step_s: f64,
    /// Compensate the broadcast total group delay in the satellite clock error.
    #[cfg_attr(feature = "serde", serde(default = "default_sv_tgd"))]
    pub sv_tgd: bool,
    /// Compute satellite velocities.
    #[cfg_attr(feature = "serde", serde(default = "default_velocity"))]
    pub velocity: bool,
    /// Propagate satellites flagged unhealthy (tagged as such),
    /// instead of rejecting them.
    #[cfg_attr(feature = "serde", serde(default = "default_propagate_unhealthy"))]
    pub propagate_unhealthy: bool,
    /// Glonass numerical integration step (s), at least 0.1s
    #[cfg_attr(
        feature = "serde",
        serde(
            default = "default_glonass_step",
            deserialize_with = "deserialize_glonass_step"
        )
    )]
    pub glonass_step_s: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookback_retries: default_lookback_retries(),
            lookback_step_s: default_lookback_step(),
            sv_tgd: default_sv_tgd(),
            velocity: default_velocity(),
            propagate_unhealthy: default_propagate_unhealthy(),
            glonass_step_s: default_glonass_step(),
        }
    }
}

impl Config {
    /// Returns [Config] with desired lookback policy
    pub fn with_lookback(&self, retries: u32, step_s: f64) -> Self {
        let mut s = self.clone();
        s.lookback_retries = retries;
        s.lookback_step_s = step_s;
        s
    }
    /// Checks the integration and lookback steps: a null, negative
    /// or non finite step is rejected.
    pub fn validate(&self) -> Result<(), Error> {
        check_lookback_step(self.lookback_step_s)?;
        check_glonass_step(self.glonass_step_s)?;
        Ok(())
    }
    /// Returns [Config] that propagates unhealthy satellites
    pub fn with_unhealthy_propagation(&self) -> Self {
        let mut s = self.clone();
        s.propagate_unhealthy = true;
        s
    }
}
