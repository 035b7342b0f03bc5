//! Typed, validated access layer over a molecular-dynamics engine's C
//! library interface.
//!
//! The engine does the physics; this crate does the marshaling. It owns
//! exactly four jobs:
//!
//! - **Handle discipline** — [`Instance`] wraps one live engine instance;
//!   a closed handle fails every operation with a fixed error instead of
//!   dereferencing dead memory.
//! - **Typed, zero-copy extraction** — named settings, globals, and
//!   per-atom quantities resolve to shape- and type-checked views over
//!   engine memory ([`AtomView`], [`ArrayView`], [`GlobalView`]).
//! - **Validated bulk transfer** — gather/scatter of per-atom data
//!   (native properties, per-atom computes, per-atom fixes), optionally
//!   restricted to a 1-based atom-ID subset that is range-checked before
//!   the engine sees it; plus read-only topology tables.
//! - **Narrow accessors** — neighbor lists, the simulation box, variables,
//!   compute/fix output, group membership, name listings.
//!
//! Three failure families stay disjoint throughout ([`Error`]): binding-side
//! validation (engine never called), engine-reported errors (flag drained,
//! never double-reported), and dead-handle use.
//!
//! # Quick start
//!
//! ```no_run
//! use lammkit::Instance;
//!
//! # fn main() -> lammkit::Result<()> {
//! lammkit::set_library_path("/opt/lammps/lib/liblammps.so");
//! let mut lmp = Instance::open(&["-screen", "none", "-log", "none"])?;
//! lmp.commands([
//!     "units lj",
//!     "region box block 0 10 0 10 0 10",
//!     "create_box 1 box",
//!     "create_atoms 1 random 100 42 box",
//!     "mass 1 1.0",
//! ])?;
//! let x = lmp.gather_atoms::<f64>("x")?;
//! assert_eq!(x.width(), 3);
//! assert_eq!(x.natoms(), 100);
//! lmp.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Threading and view lifetimes
//!
//! One logical thread of control per [`Instance`]; the handle is neither
//! `Send` nor `Sync`. Views borrow the instance but are additionally
//! invalidated by any engine call that reallocates per-atom storage — that
//! part is a documented caller obligation, not enforced.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod compute;
mod domain;
mod error;
mod extract;
mod gather;
mod image;
mod info;
mod instance;
mod neighbor;
mod topology;
mod types;
mod variable;

pub use compute::{ComputeShape, ComputeStyle, ComputeValue, FixValue};
pub use domain::BoxInfo;
pub use error::{EngineError, Error, Result, Severity, ValidationError};
pub use extract::{ArrayView, AtomView, GlobalView};
pub use gather::Gathered;
pub use image::{decode_image_flags, encode_image_flags};
pub use instance::Instance;
pub use neighbor::{NeighborList, Neighbors};
pub use types::{DataType, Element};
pub use variable::Variable;

pub use lammkit_sys::{library_path, set_library_path};
