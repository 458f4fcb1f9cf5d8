//! integrated tests
mod propagation;

use log::LevelFilter;
use std::{
    path::{Path, PathBuf},
    sync::Once,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Path to a test resource, relative to test_resources/NAV
pub fn resource(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_resources")
        .join("NAV")
        .join(relative)
}
