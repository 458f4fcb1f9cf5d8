#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::type_complexity)]

/*
 * RINEX-NAV is part of the Geo-Rust framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/georust/rinex/graphs/contributors)
 * This framework is shipped under the Mozilla Public V2 license.
 *
 * Documentation: https://github.com/georust/rinex
 */

extern crate gnss_rs as gnss;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

pub mod cfg;
pub mod coordinates;
pub mod engine;
pub mod navigation;
pub mod propagator;
pub mod store;
pub mod time;
pub mod version;

mod constants;
mod epoch;
mod error;
mod leap;
mod reader;

#[cfg(test)]
mod tests;

/// Package to include all basic structures
pub mod prelude {
    // export
    pub use crate::{
        cfg::Config,
        coordinates::{AzElRange, Coordinates, Enu, Geodetic},
        engine::{Engine, Snapshot},
        error::{Error, FormatError, ParseWarning, ParsingError},
        leap::Leap,
        navigation::{
            Ephemeris, GlonassEphemeris, IonosphereModel, KbModel, NavigationFile, NgModel,
            TimeOffsetModel, TimeSystemCorrection, UtcModel,
        },
        propagator::{Record, SatelliteState},
        store::{Broadcast, EphemerisStore, Selection},
        time::GnssTime,
        version::Version,
    };

    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};

    #[cfg(feature = "orbit")]
    #[cfg_attr(docsrs, doc(cfg(feature = "orbit")))]
    pub mod orbit {
        pub use anise::prelude::{Frame, Orbit};
    }
}
