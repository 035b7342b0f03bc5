//! Narrow accessors: computes, fixes, variables, neighbor lists, the box,
//! topology tables, and name listings.

mod common;

use common::{open, three_atoms};
use lammkit::{
    BoxInfo, ComputeShape, ComputeStyle, ComputeValue, Error, FixValue, ValidationError, Variable,
};

// ── computes ─────────────────────────────────────────────────────────────

#[test]
fn compute_global_shapes() {
    let lmp = open(
        three_atoms()
            .compute_global_scalar("ke", 1.5)
            .compute_global_vector("stress", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .compute_global_array("rdf", 2, 3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]),
    );

    match lmp
        .extract_compute("ke", ComputeStyle::Global, ComputeShape::Scalar)
        .unwrap()
    {
        ComputeValue::Scalar(v) => assert_eq!(v, 1.5),
        other => panic!("expected a scalar, got {other:?}"),
    }

    match lmp
        .extract_compute("stress", ComputeStyle::Global, ComputeShape::Vector)
        .unwrap()
    {
        ComputeValue::Vector(v) => assert_eq!(v, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        other => panic!("expected a vector, got {other:?}"),
    }

    match lmp
        .extract_compute("rdf", ComputeStyle::Global, ComputeShape::Array)
        .unwrap()
    {
        ComputeValue::Array(a) => {
            assert_eq!(a.rows(), 2);
            assert_eq!(a.cols(), 3);
            assert_eq!(a.row(1), [0.4, 0.5, 0.6]);
        }
        other => panic!("expected an array, got {other:?}"),
    }
}

#[test]
fn compute_per_atom_vector_spans_local_atoms() {
    let lmp = open(three_atoms().compute_peratom("pe", 0, vec![0.5, 0.6, 0.7]));
    match lmp
        .extract_compute("pe", ComputeStyle::PerAtom, ComputeShape::Vector)
        .unwrap()
    {
        ComputeValue::Vector(v) => assert_eq!(v, [0.5, 0.6, 0.7]),
        other => panic!("expected a vector, got {other:?}"),
    }
}

#[test]
fn compute_local_rows() {
    let lmp = open(three_atoms().compute_local("pairs", 2, 0, vec![1.0, 2.0]));
    match lmp
        .extract_compute("pairs", ComputeStyle::Local, ComputeShape::Vector)
        .unwrap()
    {
        ComputeValue::Vector(v) => assert_eq!(v, [1.0, 2.0]),
        other => panic!("expected a vector, got {other:?}"),
    }
}

#[test]
fn compute_unsupported_combination_is_an_engine_error() {
    // The compute exists but produces no global scalar; the engine raises
    // its flag and the binding hands the message through.
    let lmp = open(three_atoms().compute_peratom("pe", 0, vec![0.0; 3]));
    assert!(matches!(
        lmp.extract_compute("pe", ComputeStyle::Global, ComputeShape::Scalar)
            .unwrap_err(),
        Error::Engine(_)
    ));
    // The flag was drained; the next call is clean.
    assert!(lmp
        .extract_compute("pe", ComputeStyle::PerAtom, ComputeShape::Vector)
        .is_ok());
}

#[test]
fn unknown_compute_is_an_engine_error() {
    let lmp = open(three_atoms());
    assert!(matches!(
        lmp.extract_compute("ghost", ComputeStyle::Global, ComputeShape::Scalar)
            .unwrap_err(),
        Error::Engine(_)
    ));
}

// ── fixes ────────────────────────────────────────────────────────────────

#[test]
fn fix_global_values_are_owned_copies() {
    let lmp = open(
        three_atoms()
            .fix_global_scalar("avg", 2.5)
            .fix_global_vector("prof", vec![10.0, 20.0, 30.0])
            .fix_global_array("hist", 2, 2, vec![1.0, 2.0, 3.0, 4.0]),
    );

    match lmp
        .extract_fix("avg", ComputeStyle::Global, ComputeShape::Scalar)
        .unwrap()
    {
        FixValue::Scalar(v) => assert_eq!(v, 2.5),
        other => panic!("expected a scalar, got {other:?}"),
    }

    match lmp
        .extract_fix("prof", ComputeStyle::Global, ComputeShape::Vector)
        .unwrap()
    {
        FixValue::Vector(v) => assert_eq!(v, [10.0, 20.0, 30.0]),
        other => panic!("expected a vector, got {other:?}"),
    }

    match lmp
        .extract_fix("hist", ComputeStyle::Global, ComputeShape::Array)
        .unwrap()
    {
        FixValue::Array { data, rows, cols } => {
            assert_eq!((rows, cols), (2, 2));
            assert_eq!(data, [1.0, 2.0, 3.0, 4.0]);
        }
        other => panic!("expected an array, got {other:?}"),
    }
}

#[test]
fn fix_per_atom_views() {
    let lmp = open(
        three_atoms()
            .fix_peratom("disp", 0, vec![0.1, 0.2, 0.3])
            .fix_peratom("grad", 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
    );

    match lmp
        .extract_fix("disp", ComputeStyle::PerAtom, ComputeShape::Vector)
        .unwrap()
    {
        FixValue::PerAtom(v) => assert_eq!(v, [0.1, 0.2, 0.3]),
        other => panic!("expected a per-atom vector, got {other:?}"),
    }

    match lmp
        .extract_fix("grad", ComputeStyle::PerAtom, ComputeShape::Array)
        .unwrap()
    {
        FixValue::PerAtomArray(a) => {
            assert_eq!((a.rows(), a.cols()), (3, 2));
            assert_eq!(a.row(2), [5.0, 6.0]);
        }
        other => panic!("expected a per-atom array, got {other:?}"),
    }
}

#[test]
fn fix_local_output_is_rejected_by_the_engine() {
    let lmp = open(three_atoms().fix_global_scalar("avg", 1.0));
    assert!(matches!(
        lmp.extract_fix("avg", ComputeStyle::Local, ComputeShape::Scalar)
            .unwrap_err(),
        Error::Engine(_)
    ));
}

// ── variables ────────────────────────────────────────────────────────────

#[test]
fn variable_kinds_dispatch_on_engine_report() {
    let lmp = open(
        three_atoms()
            .variable_equal("temp", 300.0)
            .variable_string("label", "production")
            .variable_atom("weight", vec![2.0, 3.0, 1.0])
            .variable_vector("series", vec![1.0, 4.0, 9.0]),
    );

    assert_eq!(
        lmp.extract_variable("temp", None)
            .unwrap()
            .equal("temp")
            .unwrap(),
        300.0
    );
    assert_eq!(
        lmp.extract_variable("label", None)
            .unwrap()
            .string("label")
            .unwrap(),
        "production"
    );
    assert_eq!(
        lmp.extract_variable("weight", None)
            .unwrap()
            .atom("weight")
            .unwrap(),
        [2.0, 3.0, 1.0]
    );
    assert_eq!(
        lmp.extract_variable("series", None)
            .unwrap()
            .vector("series")
            .unwrap(),
        [1.0, 4.0, 9.0]
    );
}

#[test]
fn atom_variable_group_filter_zeroes_non_members() {
    // Storage order is (2, 3, 1); "half" holds atoms 1 and 3, so the value
    // for atom 2 (storage slot 0) is zeroed.
    let lmp = open(
        three_atoms()
            .group("half", &[1, 3])
            .variable_atom("weight", vec![2.0, 3.0, 1.0]),
    );
    let v = lmp.extract_variable("weight", Some("half")).unwrap();
    assert_eq!(v.atom("weight").unwrap(), [0.0, 3.0, 1.0]);
}

#[test]
fn variable_wrong_kind_accessor_is_descriptive() {
    let lmp = open(three_atoms().variable_equal("temp", 300.0));
    let v = lmp.extract_variable("temp", None).unwrap();
    assert!(matches!(v, Variable::Equal(_)));
    assert!(matches!(
        v.string("temp").unwrap_err(),
        Error::Validation(ValidationError::ShapeMismatch { .. })
    ));
}

#[test]
fn unknown_variable_is_a_lookup_miss() {
    let lmp = open(three_atoms());
    assert!(matches!(
        lmp.extract_variable("missing", None).unwrap_err(),
        Error::NotFound { .. }
    ));
}

// ── neighbor lists ───────────────────────────────────────────────────────

#[test]
fn neighbor_list_translates_to_one_based() {
    let lmp = open(three_atoms().neighbor_list(
        "lj/cut",
        vec![(0, vec![1, 2]), (1, vec![2]), (2, vec![])],
    ));
    let list = lmp.neighbor_list("lj/cut").unwrap();
    assert_eq!(list.len(), 3);

    let (atom, neighbors) = list.get(0).unwrap();
    assert_eq!(atom, 1);
    assert_eq!(neighbors.to_vec(), [2, 3]);

    let (_, last) = list.get(2).unwrap();
    assert!(last.is_empty());
    assert!(list.get(3).is_none());

    // Each neighbor index appears once per entry and stays in range.
    for (_, neighbors) in list.iter() {
        let mut seen = neighbors.to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), neighbors.len());
        assert!(neighbors.iter().all(|n| (1..=3).contains(&n)));
    }
}

#[test]
fn unknown_pair_style_is_a_lookup_miss() {
    let lmp = open(three_atoms());
    assert_eq!(
        lmp.neighbor_list("eam/alloy").unwrap_err(),
        Error::NotFound {
            kind: "pair style",
            name: "eam/alloy".to_string(),
        }
    );
}

// ── box ──────────────────────────────────────────────────────────────────

#[test]
fn box_read_reset_round_trip() {
    let mut lmp = open(three_atoms());
    let initial = lmp.extract_box().unwrap();
    assert_eq!(initial.lo, [0.0; 3]);
    assert_eq!(initial.hi, [1.0; 3]);
    assert_eq!(initial.periodicity, [true; 3]);

    lmp.reset_box([-2.0, -2.0, -2.0], [2.0, 3.0, 4.0], [0.1, 0.2, 0.3])
        .unwrap();
    let after = lmp.extract_box().unwrap();
    assert_eq!(
        after,
        BoxInfo {
            lo: [-2.0, -2.0, -2.0],
            hi: [2.0, 3.0, 4.0],
            tilt: [0.1, 0.2, 0.3],
            periodicity: [true; 3],
            box_change: false,
        }
    );
}

#[test]
fn inverted_bounds_rejected_before_the_engine() {
    let mut lmp = open(three_atoms());
    let before = lmp.extract_box().unwrap();
    let err = lmp
        .reset_box([0.0, 5.0, 0.0], [1.0, 5.0, 1.0], [0.0; 3])
        .unwrap_err();
    assert_eq!(
        err,
        Error::Validation(ValidationError::InvalidBoxBounds {
            dimension: 1,
            lo: 5.0,
            hi: 5.0,
        })
    );
    assert_eq!(lmp.extract_box().unwrap(), before);
}

// ── topology ─────────────────────────────────────────────────────────────

#[test]
fn topology_tables_round_trip() {
    let lmp = open(
        three_atoms()
            .bonds(vec![[1, 1, 2], [1, 2, 3]])
            .angles(vec![[2, 1, 2, 3]])
            .dihedrals(vec![[1, 1, 2, 3, 1]])
            .impropers(vec![[3, 3, 2, 1, 3]]),
    );
    assert_eq!(lmp.gather_bonds().unwrap(), [[1, 1, 2], [1, 2, 3]]);
    assert_eq!(lmp.gather_angles().unwrap(), [[2, 1, 2, 3]]);
    assert_eq!(lmp.gather_dihedrals().unwrap(), [[1, 1, 2, 3, 1]]);
    assert_eq!(lmp.gather_impropers().unwrap(), [[3, 3, 2, 1, 3]]);
}

#[test]
fn empty_topology_gathers_empty() {
    let lmp = open(three_atoms());
    assert!(lmp.gather_bonds().unwrap().is_empty());
    assert!(lmp.gather_impropers().unwrap().is_empty());
}

// ── name listings and groups ─────────────────────────────────────────────

#[test]
fn id_names_in_definition_order() {
    let lmp = open(
        three_atoms()
            .group("half", &[1, 3])
            .compute_global_scalar("ke", 0.0)
            .compute_global_scalar("pe", 0.0),
    );
    assert_eq!(lmp.id_names("group").unwrap(), ["all", "half"]);
    assert_eq!(lmp.id_names("compute").unwrap(), ["ke", "pe"]);
    assert!(lmp.id_names("fix").unwrap().is_empty());
    assert!(matches!(
        lmp.id_names("flavor").unwrap_err(),
        Error::NotFound { .. }
    ));
}

#[test]
fn group_membership_via_mask_bits() {
    let lmp = open(three_atoms().group("half", &[3, 1]));
    assert_eq!(lmp.group_atom_ids("all").unwrap(), [1, 2, 3]);
    assert_eq!(lmp.group_atom_ids("half").unwrap(), [1, 3]);
    assert!(matches!(
        lmp.group_atom_ids("solvent").unwrap_err(),
        Error::NotFound { .. }
    ));
}
