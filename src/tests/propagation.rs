use crate::{
    prelude::*,
    propagator::{propagate, Record},
    tests::{init_logger, resource},
};
use std::str::FromStr;

/// Reception time of the V3 scenario: 2021-01-01 00:10:00 GPST
fn v3_reception_time() -> GnssTime {
    GnssTime::from_week_tow(2138, 432600.0, Constellation::GPS)
}

fn v3_store() -> EphemerisStore {
    let nav = NavigationFile::from_file(resource("V3/MIXED00XXX_R_20210010000_01D_MN.rnx"))
        .unwrap();
    let mut store = EphemerisStore::new();
    store.extend(&nav);
    store
}

#[test]
fn gps_brdc0280_18n() {
    init_logger();
    let nav = NavigationFile::from_file(resource("V2/brdc0280.18n")).unwrap();
    let mut store = EphemerisStore::new();
    store.extend(&nav);

    let cfg = Config::default();
    let g02 = SV::new(Constellation::GPS, 2);
    let t = GnssTime::from_week_tow(1986, 58711.0, Constellation::GPS);

    let eph = match store.find_ephemeris(t, g02) {
        Selection::Found(eph) => eph,
        other => panic!("expecting G02 16:00, got {:?}", other),
    };
    assert_eq!(eph.toe_s(), Some(57600.0));

    let state = propagate(Record::Kepler(eph), t, 22.0E6, 0.0, &cfg).unwrap();
    assert_eq!(state.sv, g02);
    assert_eq!(state.epoch, t);
    assert!(state.converged);
    assert!(state.healthy);
    assert!(!state.predicted);

    let radius = state.position.norm();
    assert!((radius - 26_471_988.0).abs() < 10.0, "radius {}", radius);
    assert!(
        (state.clock_error - (-3.5742930963E-04)).abs() < 1.0E-10,
        "clock error {}",
        state.clock_error
    );

    let tof = t - state.transmission_time;
    assert!((tof - 0.0730267).abs() < 1.0E-6, "time of flight {}", tof);

    let velocity = state.velocity.unwrap().norm();
    assert!((velocity - 3176.9).abs() < 0.5, "velocity {}", velocity);

    // no velocity requested
    let cfg = Config {
        velocity: false,
        ..Default::default()
    };
    let state = propagate(Record::Kepler(eph), t, 22.0E6, 0.0, &cfg).unwrap();
    assert!(state.velocity.is_none());
}

#[test]
fn kepler_constellations() {
    init_logger();
    let store = v3_store();
    let cfg = Config::default();
    let t = v3_reception_time();

    // (sv, pseudo range, radius, velocity)
    for (sv, pseudorange, radius, velocity) in [
        ("G01", 22.0E6, 26_402_994.0, 3179.8),
        ("E01", 25.0E6, 29_603_612.0, 2525.8),
        ("C01", 36.0E6, 42_150_930.0, 49.3),
        ("C11", 23.0E6, 27_907_732.0, 2911.3),
        ("J01", 37.0E6, 39_244_003.0, 1385.5),
    ] {
        let sv = SV::from_str(sv).unwrap();
        let eph = store
            .find_ephemeris(t, sv)
            .record()
            .unwrap_or_else(|| panic!("{}: no ephemeris", sv));

        let state = propagate(Record::Kepler(eph), t, pseudorange, 0.0, &cfg).unwrap();
        assert!(state.converged, "{}: not converged", sv);
        assert!(state.healthy, "{}: unhealthy", sv);

        let r = state.position.norm();
        assert!((r - radius).abs() < 2.0E4, "{}: radius {}", sv, r);

        let v = state.velocity.unwrap().norm();
        let tolerance = if sv.prn == 1 && sv.constellation == Constellation::BeiDou {
            10.0
        } else {
            50.0
        };
        assert!((v - velocity).abs() < tolerance, "{}: velocity {}", sv, v);

        let (bias, _, _) = eph.sv_clock();
        assert!(
            (state.clock_error - bias).abs() < 1.0E-7,
            "{}: clock error {}",
            sv,
            state.clock_error
        );
    }
}

#[test]
fn glonass_propagation() {
    init_logger();
    let store = v3_store();
    let cfg = Config::default();
    let r01 = SV::from_str("R01").unwrap();
    let t = GnssTime::from_utc_calendar(2021, 1, 1, 0, 20, 0.0);

    let eph = match store.find_glonass(t, r01) {
        Selection::Found(eph) => eph,
        other => panic!("expecting R01 00:15, got {:?}", other),
    };
    assert!(store.find_ephemeris(t, r01).record().is_none());

    let state = propagate(Record::Glonass(eph), t, 22.0E6, 0.0, &cfg).unwrap();
    let radius = state.position.norm();
    assert!(radius > 25.3E6 && radius < 25.7E6, "radius {}", radius);
    assert!((state.clock_error - 7.590651512146E-05).abs() < 1.0E-12);
    assert_eq!(state.clock_drift, 0.0);
    assert!(!state.predicted);

    let velocity = state.velocity.unwrap().norm();
    assert!(velocity > 3.0E3 && velocity < 4.0E3, "velocity {}", velocity);

    // integration step barely affects the solution
    let fine = propagate(
        Record::Glonass(eph),
        t,
        22.0E6,
        0.0,
        &Config {
            glonass_step_s: 10.0,
            ..Default::default()
        },
    )
    .unwrap();
    assert!((fine.position - state.position).norm() < 1.0E-2);
}

#[test]
fn receiver_clock() {
    let store = v3_store();
    let cfg = Config::default();
    let t = v3_reception_time();
    let g01 = SV::from_str("G01").unwrap();
    let eph = store.find_ephemeris(t, g01).record().unwrap();

    let reference = propagate(Record::Kepler(eph), t, 22.0E6, 0.0, &cfg).unwrap();
    let biased = propagate(Record::Kepler(eph), t, 22.0E6, 1.0E-3, &cfg).unwrap();

    // same transmission time, shorter flight: rotation angle differs
    assert_eq!(reference.transmission_time, biased.transmission_time);
    let dx = (reference.position - biased.position).norm();
    let expected = 7.2921151467E-5 * 1.0E-3 * reference.position.xy().norm();
    assert!((dx - expected).abs() < 1.0E-3, "{} vs {}", dx, expected);
}

#[test]
fn line_of_sight() {
    let store = v3_store();
    let cfg = Config::default();
    let t = v3_reception_time();
    let e01 = SV::from_str("E01").unwrap();
    let eph = store.find_ephemeris(t, e01).record().unwrap();
    let state = propagate(Record::Kepler(eph), t, 25.0E6, 0.0, &cfg).unwrap();

    // observer right below the satellite
    let geodetic = state.coordinates().geodetic();
    let below = Coordinates::from_geodetic(Geodetic::new(
        geodetic.latitude_ddeg,
        geodetic.longitude_ddeg,
        0.0,
    ));
    let azelrange = state.elevation_azimuth(&below);
    assert!(azelrange.elevation_deg > 89.99, "{:?}", azelrange);
    assert!((azelrange.range_m - geodetic.height_m).abs() < 1.0, "{:?}", azelrange);

    // observer on the other side of the Earth
    let antipode = Coordinates::from_geodetic(Geodetic::new(
        -geodetic.latitude_ddeg,
        geodetic.longitude_ddeg + 180.0,
        0.0,
    ));
    assert!(state.elevation_azimuth(&antipode).elevation_deg < -80.0);
}

#[test]
fn non_supported_constellation() {
    let cfg = Config::default();
    let t = v3_reception_time();
    let sbas = Ephemeris::new(SV::from_str("S27").unwrap(), t, (0.0, 0.0, 0.0));
    assert_eq!(
        propagate(Record::Kepler(&sbas), t, 36.0E6, 0.0, &cfg).err(),
        Some(Error::NonSupportedConstellation(Constellation::SBAS))
    );
}

#[test]
#[cfg(feature = "orbit")]
fn anise_orbit() {
    let store = v3_store();
    let cfg = Config::default();
    let t = v3_reception_time();
    let g01 = SV::from_str("G01").unwrap();
    let eph = store.find_ephemeris(t, g01).record().unwrap();
    let state = propagate(Record::Kepler(eph), t, 22.0E6, 0.0, &cfg).unwrap();

    let orbit = state.to_orbit();
    assert!((orbit.radius_km.norm() - state.position.norm() / 1.0E3).abs() < 1.0E-6);
    assert_eq!(orbit.epoch, state.transmission_time.to_epoch());
}
