//! Shared fixtures: a small system staged on the in-process mock engine.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use lammkit::Instance;
use lammkit_test_utils::MockEngineBuilder;

/// Positions of atoms 1..=3 in ascending-ID order.
pub const X_BY_ID: [[f64; 3]; 3] = [[0.0, 0.5, 1.0], [1.0, 1.5, 2.0], [3.0, 3.5, 4.0]];

/// The same positions flattened in the mock's storage order (2, 3, 1).
pub fn x_storage_order() -> Vec<f64> {
    let mut flat = Vec::with_capacity(9);
    for id in [2, 3, 1] {
        flat.extend_from_slice(&X_BY_ID[id - 1]);
    }
    flat
}

/// Three atoms inserted out of ID order, so ascending-ID gathers must
/// actually reorder.
pub fn three_atoms() -> MockEngineBuilder {
    MockEngineBuilder::new()
        .atom(2, 1, X_BY_ID[1])
        .atom(3, 2, X_BY_ID[2])
        .atom(1, 1, X_BY_ID[0])
}

pub fn open(builder: MockEngineBuilder) -> Instance {
    let _ = env_logger::builder().is_test(true).try_init();
    Instance::open_with_api(builder.stage(), &[]).expect("mock instance should open")
}
