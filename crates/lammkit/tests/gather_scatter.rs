//! Bulk per-atom transfer: ordering, subset validation, and round trips.

mod common;

use common::{open, three_atoms, x_storage_order, X_BY_ID};
use lammkit::{decode_image_flags, encode_image_flags, Error, ValidationError};
use lammkit_test_utils::MockEngineBuilder;

#[test]
fn full_gather_is_ascending_id_order() {
    let lmp = open(three_atoms());

    let ids = lmp.gather_atoms::<i32>("id").unwrap();
    assert_eq!(ids.as_slice(), &[1, 2, 3]);

    let x = lmp.gather_atoms::<f64>("x").unwrap();
    assert_eq!(x.width(), 3);
    assert_eq!(x.natoms(), 3);
    for (i, expected) in X_BY_ID.iter().enumerate() {
        assert_eq!(x.row(i), *expected);
    }
}

#[test]
fn subset_gather_follows_caller_order() {
    let lmp = open(three_atoms());
    let x = lmp.gather_atoms_subset::<f64>("x", &[3, 1]).unwrap();
    assert_eq!(x.natoms(), 2);
    assert_eq!(x.row(0), X_BY_ID[2]);
    assert_eq!(x.row(1), X_BY_ID[0]);
}

#[test]
fn subset_gather_matches_full_gather_restriction() {
    let lmp = open(three_atoms());
    let full = lmp.gather_atoms::<f64>("x").unwrap();
    let subset = lmp.gather_atoms_subset::<f64>("x", &[2, 3]).unwrap();
    assert_eq!(subset.row(0), full.row(1));
    assert_eq!(subset.row(1), full.row(2));
}

#[test]
fn native_compute_and_fix_paths_agree() {
    // Per-atom compute and fix data mirror the position array, so all three
    // name classes must gather identically.
    let lmp = open(
        three_atoms()
            .compute_peratom("pos", 3, x_storage_order())
            .fix_peratom("pos", 3, x_storage_order()),
    );
    let native = lmp.gather_atoms::<f64>("x").unwrap();
    let compute = lmp.gather_atoms::<f64>("c_pos").unwrap();
    let fix = lmp.gather_atoms::<f64>("f_pos").unwrap();
    assert_eq!(native, compute);
    assert_eq!(native, fix);
}

#[test]
fn subset_gather_restriction_holds_for_compute_and_fix_output() {
    let lmp = open(
        three_atoms()
            .compute_peratom("pos", 3, x_storage_order())
            .fix_peratom("pos", 3, x_storage_order()),
    );
    for name in ["c_pos", "f_pos"] {
        let full = lmp.gather_atoms::<f64>(name).unwrap();
        let subset = lmp.gather_atoms_subset::<f64>(name, &[3, 1]).unwrap();
        assert_eq!(subset.row(0), full.row(2), "{name}");
        assert_eq!(subset.row(1), full.row(0), "{name}");
    }
}

#[test]
fn subset_scatter_to_fix_output_touches_only_listed_atoms() {
    // Storage order is (2, 3, 1), so the ascending-ID gather is a
    // permutation of the seeded values.
    let mut lmp = open(three_atoms().fix_peratom("store", 0, vec![10.0, 20.0, 30.0]));
    assert_eq!(
        lmp.gather_atoms::<f64>("f_store").unwrap().as_slice(),
        &[30.0, 10.0, 20.0]
    );
    lmp.scatter_atoms_subset("f_store", &[2], &[-5.0]).unwrap();
    assert_eq!(
        lmp.gather_atoms::<f64>("f_store").unwrap().as_slice(),
        &[30.0, -5.0, 20.0]
    );
}

#[test]
fn scatter_gather_round_trip() {
    let mut lmp = open(three_atoms());
    let scaled: Vec<f64> = lmp
        .gather_atoms::<f64>("x")
        .unwrap()
        .into_vec()
        .into_iter()
        .map(|v| v * -2.0)
        .collect();
    lmp.scatter_atoms("x", &scaled).unwrap();
    assert_eq!(lmp.gather_atoms::<f64>("x").unwrap().into_vec(), scaled);
}

#[test]
fn subset_scatter_touches_only_listed_atoms() {
    let mut lmp = open(three_atoms());
    let before = lmp.gather_atoms::<f64>("x").unwrap();
    lmp.scatter_atoms_subset("x", &[2], &[7.0, 8.0, 9.0]).unwrap();
    let after = lmp.gather_atoms::<f64>("x").unwrap();
    assert_eq!(after.row(0), before.row(0));
    assert_eq!(after.row(1), [7.0, 8.0, 9.0]);
    assert_eq!(after.row(2), before.row(2));
}

#[test]
fn out_of_range_ids_rejected_before_the_engine() {
    let mut lmp = open(three_atoms());
    for bad in [0, -1, 4] {
        let err = lmp.gather_atoms_subset::<f64>("x", &[1, bad]).unwrap_err();
        assert_eq!(
            err,
            Error::Validation(ValidationError::IdOutOfRange { id: bad, natoms: 3 })
        );
    }
    // Same check guards scatter; the listed atom is untouched on failure.
    let before = lmp.gather_atoms::<f64>("x").unwrap();
    let err = lmp
        .scatter_atoms_subset("x", &[1, 4], &[0.0; 6])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::IdOutOfRange { id: 4, .. })
    ));
    assert_eq!(lmp.gather_atoms::<f64>("x").unwrap(), before);
}

#[test]
fn element_type_mismatch_rejected() {
    let lmp = open(three_atoms());
    assert!(matches!(
        lmp.gather_atoms::<i32>("x").unwrap_err(),
        Error::Validation(ValidationError::TypeMismatch { .. })
    ));
    assert!(matches!(
        lmp.gather_atoms::<f64>("id").unwrap_err(),
        Error::Validation(ValidationError::TypeMismatch { .. })
    ));
}

#[test]
fn buffer_length_mismatch_rejected() {
    let mut lmp = open(three_atoms());
    let err = lmp.scatter_atoms("x", &[0.0; 8]).unwrap_err();
    assert_eq!(
        err,
        Error::Validation(ValidationError::LengthMismatch {
            name: "x".to_string(),
            expected: 9,
            actual: 8,
        })
    );
}

#[test]
fn unknown_property_is_a_lookup_miss() {
    let lmp = open(three_atoms());
    assert!(matches!(
        lmp.gather_atoms::<f64>("charge_density").unwrap_err(),
        Error::NotFound { .. }
    ));
}

#[test]
fn unknown_compute_surfaces_the_engine_error() {
    // The width query for `c_<id>` has to go through the engine, so a bad
    // compute ID comes back as an engine-reported failure, not a lookup miss.
    let lmp = open(three_atoms());
    assert!(matches!(
        lmp.gather_atoms::<f64>("c_missing").unwrap_err(),
        Error::Engine(_)
    ));
}

#[test]
fn image_flags_survive_gather() {
    let encoded = encode_image_flags([1, -2, 3]).unwrap();
    let lmp = open(
        MockEngineBuilder::new()
            .atom(1, 1, [0.0; 3])
            .image(encoded),
    );
    let images = lmp.gather_atoms::<i32>("image").unwrap();
    assert_eq!(decode_image_flags(images.as_slice()[0]), [1, -2, 3]);
}
