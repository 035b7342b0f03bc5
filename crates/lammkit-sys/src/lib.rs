//! Raw C ABI surface for the LAMMPS library interface.
//!
//! This crate owns no engine logic. It describes the foreign entry points as
//! a plain function-pointer table ([`RawApi`]), the ABI constants shared with
//! the engine, and the process-wide machinery for locating and loading the
//! engine shared library at runtime. Everything typed and validated lives in
//! the `lammkit` crate on top of this one.
//!
//! The table-of-pointers shape (rather than `extern` block linkage) is
//! deliberate: the engine library is resolved at runtime from a configurable
//! path, and alternative implementations of the surface (such as the
//! in-process mock in `lammkit-test-utils`) can be swapped in without any
//! linker involvement.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod api;
mod library;

pub use api::{codes, EnginePtr, RawApi, SIZE_VECTOR_GROUP};
pub use library::{library, library_path, set_library_path, LoadError, LoadedApi, DEFAULT_LIBRARY};
