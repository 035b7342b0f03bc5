//! Handle lifecycle and command execution against the mock engine.

mod common;

use common::{open, three_atoms};
use lammkit::{ComputeShape, ComputeStyle, Error, Severity};

#[test]
fn open_close_lifecycle() {
    let mut lmp = open(three_atoms());
    assert!(lmp.is_valid());
    lmp.close();
    assert!(!lmp.is_valid());
    // Closing again is a no-op, not a crash.
    lmp.close();
}

#[test]
fn version_and_natoms() {
    let lmp = open(three_atoms());
    assert!(lmp.version().unwrap() > 0);
    assert_eq!(lmp.natoms().unwrap(), 3);
}

#[test]
fn every_operation_family_fails_closed() {
    let mut lmp = open(three_atoms());
    lmp.close();

    assert_eq!(lmp.command("run 0"), Err(Error::Closed));
    assert_eq!(lmp.commands(["run 0"]), Err(Error::Closed));
    assert_eq!(lmp.version(), Err(Error::Closed));
    assert_eq!(lmp.natoms(), Err(Error::Closed));
    assert_eq!(lmp.extract_setting("nlocal"), Err(Error::Closed));
    assert!(matches!(
        lmp.extract_global::<f64>("dt"),
        Err(Error::Closed)
    ));
    assert!(matches!(lmp.extract_global_str("units"), Err(Error::Closed)));
    assert!(matches!(lmp.extract_atom::<f64>("x"), Err(Error::Closed)));
    assert!(matches!(lmp.gather_atoms::<f64>("x"), Err(Error::Closed)));
    assert!(matches!(
        lmp.gather_atoms_subset::<f64>("x", &[1]),
        Err(Error::Closed)
    ));
    assert_eq!(lmp.scatter_atoms("x", &[0.0; 9]), Err(Error::Closed));
    assert_eq!(
        lmp.scatter_atoms_subset("x", &[1], &[0.0; 3]),
        Err(Error::Closed)
    );
    assert!(matches!(
        lmp.extract_compute("ke", ComputeStyle::Global, ComputeShape::Scalar),
        Err(Error::Closed)
    ));
    assert!(matches!(
        lmp.extract_fix("avg", ComputeStyle::Global, ComputeShape::Scalar),
        Err(Error::Closed)
    ));
    assert!(matches!(
        lmp.extract_variable("t", None),
        Err(Error::Closed)
    ));
    assert!(matches!(lmp.neighbor_list("lj/cut"), Err(Error::Closed)));
    assert_eq!(lmp.extract_box().err(), Some(Error::Closed));
    assert_eq!(
        lmp.reset_box([0.0; 3], [1.0; 3], [0.0; 3]),
        Err(Error::Closed)
    );
    assert!(matches!(lmp.gather_bonds(), Err(Error::Closed)));
    assert!(matches!(lmp.id_names("group"), Err(Error::Closed)));
    assert!(matches!(lmp.group_atom_ids("all"), Err(Error::Closed)));
}

#[test]
fn unknown_command_reports_fatal_engine_error() {
    let mut lmp = open(three_atoms());
    let err = lmp.command("definitely_not_a_command").unwrap_err();
    let Error::Engine(engine) = err else {
        panic!("expected an engine error, got {err:?}");
    };
    assert!(engine.message.contains("Unknown command"));
    assert_eq!(engine.severity, Severity::Fatal);

    // The flag was drained with the error; the handle still works.
    lmp.command("run 0").unwrap();
}

#[test]
fn command_sequence_stops_at_first_failure() {
    let mut lmp = open(three_atoms());
    let result = lmp.commands(["run 0", "not_a_command", "timestep 0.5"]);
    assert!(matches!(result, Err(Error::Engine(_))));

    // The command after the failure never ran.
    let dt = lmp.extract_global::<f64>("dt").unwrap().scalar("dt").unwrap();
    assert_eq!(dt, 0.005);
}

#[test]
fn timestep_command_updates_dt() {
    let mut lmp = open(three_atoms());
    lmp.command("timestep 0.25").unwrap();
    let dt = lmp.extract_global::<f64>("dt").unwrap().scalar("dt").unwrap();
    assert_eq!(dt, 0.25);
}

#[test]
fn interior_nul_rejected_before_the_engine() {
    let mut lmp = open(three_atoms());
    let err = lmp.command("run\0 0").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
