//! The engine entry-point table and ABI constants.
//!
//! [`RawApi`] mirrors the C library interface of the engine one function
//! pointer per entry point. It is populated either by [`RawApi::load`]
//! (symbol resolution against the engine shared library) or directly by an
//! alternative provider of the surface.

use std::os::raw::{c_char, c_double, c_int, c_void};

use dlopen::symbor::Library;

/// Opaque pointer to one live engine instance.
///
/// Created by [`RawApi::open`], destroyed exactly once by [`RawApi::close`].
/// The engine owns everything behind it.
pub type EnginePtr = *mut c_void;

/// ABI constant tables shared with the engine.
///
/// All values cross the boundary as `c_int` and are stable: they identify
/// element types, quantity styles, shape and size queries, and variable
/// kinds in the engine's own numbering.
pub mod codes {
    /// Element-type codes reported by the `*_datatype` entry points.
    pub mod dtype {
        /// Name does not resolve to anything.
        pub const NONE: i32 = -1;
        /// 32-bit integer scalar or 1-D array.
        pub const INT: i32 = 0;
        /// 32-bit integer 2-D array.
        pub const INT_2D: i32 = 1;
        /// 64-bit float scalar or 1-D array.
        pub const DOUBLE: i32 = 2;
        /// 64-bit float 2-D array.
        pub const DOUBLE_2D: i32 = 3;
        /// 64-bit integer scalar or 1-D array.
        pub const INT64: i32 = 4;
        /// 64-bit integer 2-D array.
        pub const INT64_2D: i32 = 5;
        /// NUL-terminated string.
        pub const STRING: i32 = 6;
    }

    /// Style of a compute or fix quantity.
    pub mod style {
        /// One value (or vector/array) for the whole system.
        pub const GLOBAL: i32 = 0;
        /// One row per local atom.
        pub const ATOM: i32 = 1;
        /// One row per local pair/triple/... entry.
        pub const LOCAL: i32 = 2;
    }

    /// Shape and size selector passed to `extract_compute`/`extract_fix`;
    /// the size selectors are also what `extract_atom_size` takes.
    pub mod shape {
        /// The scalar value.
        pub const SCALAR: i32 = 0;
        /// The vector values.
        pub const VECTOR: i32 = 1;
        /// The array values.
        pub const ARRAY: i32 = 2;
        /// Length of the vector (returned as `*const c_int`).
        pub const SIZE_VECTOR: i32 = 3;
        /// Number of array rows (returned as `*const c_int`).
        pub const SIZE_ROWS: i32 = 4;
        /// Number of array columns (returned as `*const c_int`).
        pub const SIZE_COLS: i32 = 5;
    }

    /// Variable kinds reported by `extract_variable_datatype`.
    pub mod var {
        /// Equal-style: evaluates to one number.
        pub const EQUAL: i32 = 0;
        /// Atom-style: evaluates to one number per atom.
        pub const ATOM: i32 = 1;
        /// Vector-style: engine-managed numeric vector.
        pub const VECTOR: i32 = 2;
        /// String-style: plain text.
        pub const STRING: i32 = 3;
    }
}

/// Group-name argument that makes `extract_variable` report a vector-style
/// variable's length (as an engine-allocated `c_int` released via `free`)
/// instead of its values.
pub const SIZE_VECTOR_GROUP: &str = "LMP_SIZE_VECTOR";

/// Function-pointer table over the engine's C library interface.
///
/// Pointer validity is the provider's problem: [`RawApi::load`] keeps the
/// backing [`Library`] alive inside [`LoadedApi`](crate::LoadedApi), and the
/// mock engine's pointers are ordinary statically-linked functions.
///
/// Every call through this table is `unsafe`: the engine trusts the caller on
/// instance liveness, buffer sizes, and NUL termination. The safe layer in
/// `lammkit` is responsible for upholding all of that.
#[derive(Clone, Copy)]
#[allow(clippy::type_complexity)]
pub struct RawApi {
    /// Create an engine instance from command-line style arguments.
    /// Returns null on failure.
    pub open: unsafe extern "C" fn(c_int, *mut *mut c_char) -> EnginePtr,
    /// Destroy an engine instance. Must be called exactly once per `open`.
    pub close: unsafe extern "C" fn(EnginePtr),
    /// Engine version as a date-coded integer.
    pub version: unsafe extern "C" fn(EnginePtr) -> c_int,
    /// Execute a single command string.
    pub command: unsafe extern "C" fn(EnginePtr, *const c_char),
    /// Execute a list of command strings in order.
    pub commands_list: unsafe extern "C" fn(EnginePtr, c_int, *const *const c_char),
    /// Non-zero when an error message is pending.
    pub has_error: unsafe extern "C" fn(EnginePtr) -> c_int,
    /// Copy and clear the pending error message; returns the severity
    /// (1 recoverable, 2 fatal) or 0 when nothing was pending.
    pub get_last_error_message: unsafe extern "C" fn(EnginePtr, *mut c_char, c_int) -> c_int,
    /// Total atom count across all processors.
    pub get_natoms: unsafe extern "C" fn(EnginePtr) -> c_double,
    /// Integer-valued setting by name; -1 when unknown.
    pub extract_setting: unsafe extern "C" fn(EnginePtr, *const c_char) -> c_int,
    /// Element-type code of a global quantity; [`codes::dtype::NONE`] when unknown.
    pub extract_global_datatype: unsafe extern "C" fn(EnginePtr, *const c_char) -> c_int,
    /// Element count of a global quantity; -1 when unknown.
    pub extract_global_size: unsafe extern "C" fn(EnginePtr, *const c_char) -> c_int,
    /// Pointer to a global quantity's engine-owned storage; null when unknown.
    pub extract_global: unsafe extern "C" fn(EnginePtr, *const c_char) -> *mut c_void,
    /// Element-type code of a per-atom quantity; [`codes::dtype::NONE`] when unknown.
    pub extract_atom_datatype: unsafe extern "C" fn(EnginePtr, *const c_char) -> c_int,
    /// Row or column count of a per-atom quantity, selected by
    /// [`codes::shape`] `SIZE_ROWS`/`SIZE_COLS`; row counts include ghost
    /// rows for quantities communicated to ghosts. -1 when unknown.
    pub extract_atom_size: unsafe extern "C" fn(EnginePtr, *const c_char, c_int) -> c_int,
    /// Pointer to a per-atom quantity's engine-owned storage; null when
    /// unknown. 2-D quantities come back as a table of row pointers whose
    /// backing block is contiguous row-major behind row 0.
    pub extract_atom: unsafe extern "C" fn(EnginePtr, *const c_char) -> *mut c_void,
    /// Compute output by id, style, and shape selector; null on unsupported
    /// combinations (with the error flag raised). Array shapes come back as
    /// row-pointer tables like `extract_atom`.
    pub extract_compute: unsafe extern "C" fn(EnginePtr, *const c_char, c_int, c_int) -> *mut c_void,
    /// Fix output by id, style, shape selector, and element indices. Global
    /// fix values are engine-allocated copies the caller releases via `free`;
    /// per-atom array output is a row-pointer table.
    pub extract_fix:
        unsafe extern "C" fn(EnginePtr, *const c_char, c_int, c_int, c_int, c_int) -> *mut c_void,
    /// Kind code of a named variable per [`codes::var`]; -1 when unknown.
    pub extract_variable_datatype: unsafe extern "C" fn(EnginePtr, *const c_char) -> c_int,
    /// Evaluate a variable, optionally restricted to a named group
    /// (atom-style only; null group means all atoms). Equal- and atom-style
    /// results are engine-allocated and released via `free`; vector-style
    /// results are engine-owned views, except that passing
    /// [`SIZE_VECTOR_GROUP`](crate::SIZE_VECTOR_GROUP) as the group returns
    /// the vector's length as an engine-allocated `c_int`.
    pub extract_variable:
        unsafe extern "C" fn(EnginePtr, *const c_char, *const c_char) -> *mut c_void,
    /// Gather a named per-atom quantity for all atoms in ascending-ID order.
    /// `type` is 0 for int, 1 for double; `count` is values per atom.
    pub gather: unsafe extern "C" fn(EnginePtr, *const c_char, c_int, c_int, *mut c_void),
    /// Gather a named per-atom quantity for `ndata` listed atom IDs, in the
    /// order listed.
    pub gather_subset: unsafe extern "C" fn(
        EnginePtr,
        *const c_char,
        c_int,
        c_int,
        c_int,
        *const c_int,
        *mut c_void,
    ),
    /// Scatter a named per-atom quantity for all atoms (ascending-ID order).
    pub scatter: unsafe extern "C" fn(EnginePtr, *const c_char, c_int, c_int, *const c_void),
    /// Scatter a named per-atom quantity for `ndata` listed atom IDs only.
    pub scatter_subset: unsafe extern "C" fn(
        EnginePtr,
        *const c_char,
        c_int,
        c_int,
        c_int,
        *const c_int,
        *const c_void,
    ),
    /// Fill `data` with `3 * nbonds` ints: type, atom1, atom2 per bond.
    pub gather_bonds: unsafe extern "C" fn(EnginePtr, *mut c_void),
    /// Fill `data` with `4 * nangles` ints: type plus three atom IDs.
    pub gather_angles: unsafe extern "C" fn(EnginePtr, *mut c_void),
    /// Fill `data` with `5 * ndihedrals` ints: type plus four atom IDs.
    pub gather_dihedrals: unsafe extern "C" fn(EnginePtr, *mut c_void),
    /// Fill `data` with `5 * nimpropers` ints: type plus four atom IDs.
    pub gather_impropers: unsafe extern "C" fn(EnginePtr, *mut c_void),
    /// Index of the neighbor list built for a pair style; -1 when not found.
    pub find_pair_neighlist:
        unsafe extern "C" fn(EnginePtr, *const c_char, c_int, c_int, c_int) -> c_int,
    /// Number of per-atom entries in a neighbor list; -1 on a bad index.
    pub neighlist_num_elements: unsafe extern "C" fn(EnginePtr, c_int) -> c_int,
    /// Resolve one neighbor-list entry: writes the 0-based local atom index,
    /// the neighbor count, and a pointer into the engine's neighbor index
    /// storage. Returns -1 on a bad index pair.
    pub neighlist_element_neighbors: unsafe extern "C" fn(
        EnginePtr,
        c_int,
        c_int,
        *mut c_int,
        *mut c_int,
        *mut *mut c_int,
    ) -> c_int,
    /// Read the simulation box: lower/upper bounds (3 each), tilt factors
    /// xy/yz/xz, per-dimension periodicity flags, and the box-change flag.
    pub extract_box: unsafe extern "C" fn(
        EnginePtr,
        *mut c_double,
        *mut c_double,
        *mut c_double,
        *mut c_double,
        *mut c_double,
        *mut c_int,
        *mut c_int,
    ),
    /// Replace the simulation box bounds and tilt factors in one call.
    pub reset_box: unsafe extern "C" fn(
        EnginePtr,
        *mut c_double,
        *mut c_double,
        c_double,
        c_double,
        c_double,
    ),
    /// Number of defined names in a category ("group", "compute", "fix",
    /// "variable", ...); -1 when the category is unknown.
    pub id_count: unsafe extern "C" fn(EnginePtr, *const c_char) -> c_int,
    /// Copy the idx-th name of a category into `buf`; returns 1 on success.
    pub id_name: unsafe extern "C" fn(EnginePtr, *const c_char, c_int, *mut c_char, c_int) -> c_int,
    /// Release memory the engine allocated on the caller's behalf.
    pub free: unsafe extern "C" fn(EnginePtr, *mut c_void),
}

impl RawApi {
    /// Resolve every entry point against a loaded engine library.
    ///
    /// Symbol names follow the engine's 2023+ library interface. The caller
    /// must keep `lib` alive for as long as the returned table is used;
    /// [`LoadedApi`](crate::LoadedApi) packages the two together.
    pub fn load(lib: &Library) -> Result<Self, dlopen::Error> {
        unsafe {
            Ok(RawApi {
                open: *lib.symbol("lammps_open_no_mpi")?,
                close: *lib.symbol("lammps_close")?,
                version: *lib.symbol("lammps_version")?,
                command: *lib.symbol("lammps_command")?,
                commands_list: *lib.symbol("lammps_commands_list")?,
                has_error: *lib.symbol("lammps_has_error")?,
                get_last_error_message: *lib.symbol("lammps_get_last_error_message")?,
                get_natoms: *lib.symbol("lammps_get_natoms")?,
                extract_setting: *lib.symbol("lammps_extract_setting")?,
                extract_global_datatype: *lib.symbol("lammps_extract_global_datatype")?,
                extract_global_size: *lib.symbol("lammps_extract_global_size")?,
                extract_global: *lib.symbol("lammps_extract_global")?,
                extract_atom_datatype: *lib.symbol("lammps_extract_atom_datatype")?,
                extract_atom_size: *lib.symbol("lammps_extract_atom_size")?,
                extract_atom: *lib.symbol("lammps_extract_atom")?,
                extract_compute: *lib.symbol("lammps_extract_compute")?,
                extract_fix: *lib.symbol("lammps_extract_fix")?,
                extract_variable_datatype: *lib.symbol("lammps_extract_variable_datatype")?,
                extract_variable: *lib.symbol("lammps_extract_variable")?,
                gather: *lib.symbol("lammps_gather")?,
                gather_subset: *lib.symbol("lammps_gather_subset")?,
                scatter: *lib.symbol("lammps_scatter")?,
                scatter_subset: *lib.symbol("lammps_scatter_subset")?,
                gather_bonds: *lib.symbol("lammps_gather_bonds")?,
                gather_angles: *lib.symbol("lammps_gather_angles")?,
                gather_dihedrals: *lib.symbol("lammps_gather_dihedrals")?,
                gather_impropers: *lib.symbol("lammps_gather_impropers")?,
                find_pair_neighlist: *lib.symbol("lammps_find_pair_neighlist")?,
                neighlist_num_elements: *lib.symbol("lammps_neighlist_num_elements")?,
                neighlist_element_neighbors: *lib.symbol("lammps_neighlist_element_neighbors")?,
                extract_box: *lib.symbol("lammps_extract_box")?,
                reset_box: *lib.symbol("lammps_reset_box")?,
                id_count: *lib.symbol("lammps_id_count")?,
                id_name: *lib.symbol("lammps_id_name")?,
                free: *lib.symbol("lammps_free")?,
            })
        }
    }
}
