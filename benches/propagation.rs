//! Benchmarking navigation file parsing & broadcast orbit propagation
extern crate criterion;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use rinex_nav::prelude::{Config, Constellation, Engine, GnssTime, NavigationFile, SV};

const GPS_FILE: &str = "test_resources/NAV/V2/brdc0280.18n";
const MIXED_FILE: &str = "test_resources/NAV/V3/MIXED00XXX_R_20210010000_01D_MN.rnx";

fn benchmark(c: &mut Criterion) {
    let mut parsing_grp = c.benchmark_group("parsing");

    parsing_grp.bench_function("NAV/V2", |b| {
        b.iter(|| {
            let _ = NavigationFile::from_file(GPS_FILE).unwrap();
        })
    });

    parsing_grp.bench_function("NAV/V3", |b| {
        b.iter(|| {
            let _ = NavigationFile::from_file(MIXED_FILE).unwrap();
        })
    });

    parsing_grp.finish();

    let engine = Engine::new(Config::default());
    engine.ingest(&NavigationFile::from_file(MIXED_FILE).unwrap());

    let mut rng = StdRng::seed_from_u64(0);
    let t0 = GnssTime::from_week_tow(2138, 432000.0, Constellation::GPS);

    let mut propagation_grp = c.benchmark_group("propagation");

    for (name, sv) in [
        ("kepler", SV::new(Constellation::GPS, 1)),
        ("beidou-geo", SV::new(Constellation::BeiDou, 1)),
        ("glonass", SV::new(Constellation::Glonass, 1)),
    ] {
        propagation_grp.bench_function(name, |b| {
            b.iter(|| {
                let t = t0 + rng.gen_range(0.0..1800.0);
                let pseudorange = rng.gen_range(20.0E6..26.0E6);
                black_box(engine.satellite_state(t, sv, pseudorange, 0.0));
            })
        });
    }

    propagation_grp.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
