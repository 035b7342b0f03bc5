//! An in-process mock engine for lammkit development.
//!
//! [`MockEngineBuilder`] assembles a simulation state (atoms, groups,
//! computes, fixes, variables, topology, neighbor lists, box) and stages it
//! for the next `open` call; [`mock_api`] hands out a [`RawApi`] table whose
//! entries are ordinary Rust functions over that state. Together they let
//! the whole safe layer run under `cargo test` with no engine library on the
//! machine:
//!
//! ```
//! use lammkit_test_utils::MockEngineBuilder;
//!
//! let api = MockEngineBuilder::new()
//!     .atom(2, 1, [0.5, 0.0, 0.0])
//!     .atom(1, 1, [0.0, 0.0, 0.0])
//!     .stage();
//! // lammkit::Instance::open_with_api(api, &[]) now sees a two-atom system.
//! ```
//!
//! The mock keeps the contracts the safe layer relies on: full gathers come
//! back in ascending-ID order regardless of storage order, subset transfers
//! follow the caller's ID list, bad names raise the error flag and return
//! null, and every "engine-allocated" buffer stays live until the matching
//! `free` call.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::RefCell;
use std::ffi::CString;

use smallvec::SmallVec;

use lammkit_sys::RawApi;

mod shims;
mod state;

use state::{MockCompute, MockFix, MockState, MockVar, NeighEntry};

/// Image-flag encoding of the centered periodic image, the default for
/// builder-created atoms.
const IMAGE_CENTERED: i32 = 537_395_712;

thread_local! {
    /// State staged by the most recent [`MockEngineBuilder::stage`] on this
    /// thread, consumed by the next `open` through [`mock_api`].
    static STAGED: RefCell<Option<Box<MockState>>> = const { RefCell::new(None) };
}

pub(crate) fn take_staged() -> Option<Box<MockState>> {
    STAGED.with(|slot| slot.borrow_mut().take())
}

/// The mock's ABI table. `open` consumes the staged state, or starts from an
/// empty default system when nothing was staged.
pub fn mock_api() -> RawApi {
    RawApi {
        open: shims::open,
        close: shims::close,
        version: shims::version,
        command: shims::command,
        commands_list: shims::commands_list,
        has_error: shims::has_error,
        get_last_error_message: shims::get_last_error_message,
        get_natoms: shims::get_natoms,
        extract_setting: shims::extract_setting,
        extract_global_datatype: shims::extract_global_datatype,
        extract_global_size: shims::extract_global_size,
        extract_global: shims::extract_global,
        extract_atom_datatype: shims::extract_atom_datatype,
        extract_atom_size: shims::extract_atom_size,
        extract_atom: shims::extract_atom,
        extract_compute: shims::extract_compute,
        extract_fix: shims::extract_fix,
        extract_variable_datatype: shims::extract_variable_datatype,
        extract_variable: shims::extract_variable,
        gather: shims::gather,
        gather_subset: shims::gather_subset,
        scatter: shims::scatter,
        scatter_subset: shims::scatter_subset,
        gather_bonds: shims::gather_bonds,
        gather_angles: shims::gather_angles,
        gather_dihedrals: shims::gather_dihedrals,
        gather_impropers: shims::gather_impropers,
        find_pair_neighlist: shims::find_pair_neighlist,
        neighlist_num_elements: shims::neighlist_num_elements,
        neighlist_element_neighbors: shims::neighlist_element_neighbors,
        extract_box: shims::extract_box,
        reset_box: shims::reset_box,
        id_count: shims::id_count,
        id_name: shims::id_name,
        free: shims::free,
    }
}

/// Builder for a staged mock simulation state.
///
/// Atoms live in insertion order internally (storage order), so adding them
/// with non-ascending IDs exercises the gather reordering for real. Per-atom
/// compute/fix/variable data given to the builder is aligned with that same
/// insertion order.
pub struct MockEngineBuilder {
    state: Box<MockState>,
    ghosts: Vec<[f64; 3]>,
}

impl MockEngineBuilder {
    pub fn new() -> Self {
        MockEngineBuilder {
            state: Box::default(),
            ghosts: Vec::new(),
        }
    }

    /// Add a local atom with zero velocity and force, centered image flags,
    /// and membership in group "all".
    pub fn atom(mut self, id: i32, atom_type: i32, x: [f64; 3]) -> Self {
        self.state.ids.push(id);
        self.state.types.push(atom_type);
        self.state.masks.push(1);
        self.state.images.push(IMAGE_CENTERED);
        self.state.x.extend_from_slice(&x);
        self.state.v.extend_from_slice(&[0.0; 3]);
        self.state.f.extend_from_slice(&[0.0; 3]);
        self
    }

    /// Velocity of the most recently added atom. Ignored when no atom has
    /// been added yet, like [`image`](Self::image).
    pub fn velocity(mut self, v: [f64; 3]) -> Self {
        if let Some(tail) = self.state.v.len().checked_sub(3) {
            self.state.v[tail..].copy_from_slice(&v);
        }
        self
    }

    /// Image flags (already encoded) of the most recently added atom.
    pub fn image(mut self, encoded: i32) -> Self {
        if let Some(last) = self.state.images.last_mut() {
            *last = encoded;
        }
        self
    }

    /// Append a ghost atom: a position row past the local rows of "x", with
    /// zero rows in "v" and "f".
    pub fn ghost(mut self, x: [f64; 3]) -> Self {
        self.ghosts.push(x);
        self
    }

    /// Define a group containing the listed atom IDs, setting its bit in
    /// each member's mask. Group "all" exists from the start.
    pub fn group(mut self, name: &str, ids: &[i32]) -> Self {
        self.state.groups.push(name.to_string());
        let bit = 1 << (self.state.groups.len() - 1);
        for &id in ids {
            if let Some(idx) = self.state.index_of(id) {
                self.state.masks[idx] |= bit;
            }
        }
        self
    }

    // ── computes ─────────────────────────────────────────────────────

    pub fn compute_global_scalar(mut self, id: &str, value: f64) -> Self {
        self.compute_mut(id).scalar = Some(vec![value]);
        self
    }

    pub fn compute_global_vector(mut self, id: &str, values: Vec<f64>) -> Self {
        self.compute_mut(id).vector = Some(values);
        self
    }

    pub fn compute_global_array(mut self, id: &str, rows: usize, cols: usize, values: Vec<f64>) -> Self {
        self.compute_mut(id).array = Some((values, rows, cols));
        self
    }

    /// Per-atom compute data in storage order; `cols == 0` means a 1-D
    /// vector (one value per atom).
    pub fn compute_peratom(mut self, id: &str, cols: usize, values: Vec<f64>) -> Self {
        self.compute_mut(id).peratom = Some((values, cols));
        self
    }

    /// Local compute data; `cols == 0` means a vector of `rows` values.
    pub fn compute_local(mut self, id: &str, rows: usize, cols: usize, values: Vec<f64>) -> Self {
        self.compute_mut(id).local = Some((values, rows, cols));
        self
    }

    // ── fixes ────────────────────────────────────────────────────────

    pub fn fix_global_scalar(mut self, id: &str, value: f64) -> Self {
        self.fix_mut(id).scalar = Some(value);
        self
    }

    pub fn fix_global_vector(mut self, id: &str, values: Vec<f64>) -> Self {
        self.fix_mut(id).vector = Some(values);
        self
    }

    pub fn fix_global_array(mut self, id: &str, rows: usize, cols: usize, values: Vec<f64>) -> Self {
        self.fix_mut(id).array = Some((values, rows, cols));
        self
    }

    /// Per-atom fix data in storage order; `cols == 0` means a 1-D vector.
    pub fn fix_peratom(mut self, id: &str, cols: usize, values: Vec<f64>) -> Self {
        self.fix_mut(id).peratom = Some((values, cols));
        self
    }

    // ── variables ────────────────────────────────────────────────────

    pub fn variable_equal(mut self, name: &str, value: f64) -> Self {
        self.state
            .variables
            .insert(name.to_string(), MockVar::Equal(value));
        self
    }

    pub fn variable_string(mut self, name: &str, value: &str) -> Self {
        let text = CString::new(value).unwrap_or_default();
        self.state
            .variables
            .insert(name.to_string(), MockVar::Str(text));
        self
    }

    /// Atom-style variable values in storage order.
    pub fn variable_atom(mut self, name: &str, values: Vec<f64>) -> Self {
        self.state
            .variables
            .insert(name.to_string(), MockVar::Atom(values));
        self
    }

    pub fn variable_vector(mut self, name: &str, values: Vec<f64>) -> Self {
        self.state
            .variables
            .insert(name.to_string(), MockVar::Vector(values));
        self
    }

    // ── topology ─────────────────────────────────────────────────────

    /// Bond rows as `[type, atom1, atom2]` with 1-based atom IDs.
    pub fn bonds(mut self, rows: Vec<[i32; 3]>) -> Self {
        self.state.bonds = rows;
        self
    }

    pub fn angles(mut self, rows: Vec<[i32; 4]>) -> Self {
        self.state.angles = rows;
        self
    }

    pub fn dihedrals(mut self, rows: Vec<[i32; 5]>) -> Self {
        self.state.dihedrals = rows;
        self
    }

    pub fn impropers(mut self, rows: Vec<[i32; 5]>) -> Self {
        self.state.impropers = rows;
        self
    }

    // ── neighbor lists ───────────────────────────────────────────────

    /// Register a pair style's neighbor list. Each entry pairs a 0-based
    /// storage index with its 0-based neighbor indices, matching the
    /// engine's internal numbering.
    pub fn neighbor_list(mut self, pair_style: &str, entries: Vec<(i32, Vec<i32>)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(atom, neighbors)| NeighEntry {
                atom,
                neighbors: SmallVec::from_vec(neighbors),
            })
            .collect();
        self.state.neigh.push((pair_style.to_string(), entries));
        self
    }

    // ── box and globals ──────────────────────────────────────────────

    pub fn box_bounds(mut self, lo: [f64; 3], hi: [f64; 3]) -> Self {
        self.state.box_lo = lo;
        self.state.box_hi = hi;
        self
    }

    pub fn tilt(mut self, xy: f64, yz: f64, xz: f64) -> Self {
        self.state.tilt = [xy, yz, xz];
        self
    }

    pub fn periodicity(mut self, flags: [bool; 3]) -> Self {
        self.state.periodicity = flags.map(i32::from);
        self
    }

    pub fn units(mut self, units: &str) -> Self {
        self.state.units = CString::new(units).unwrap_or_default();
        self
    }

    pub fn timestep(mut self, dt: f64) -> Self {
        self.state.dt = dt;
        self
    }

    /// Stage the state for the next `open` on this thread and return the
    /// mock ABI table to open it through.
    pub fn stage(mut self) -> RawApi {
        self.state.nghost = self.ghosts.len();
        for x in &self.ghosts {
            self.state.x.extend_from_slice(x);
            self.state.v.extend_from_slice(&[0.0; 3]);
            self.state.f.extend_from_slice(&[0.0; 3]);
        }
        STAGED.with(|slot| *slot.borrow_mut() = Some(self.state));
        mock_api()
    }

    fn compute_mut(&mut self, id: &str) -> &mut MockCompute {
        self.state.computes.entry(id.to_string()).or_default()
    }

    fn fix_mut(&mut self, id: &str) -> &mut MockFix {
        self.state.fixes.entry(id.to_string()).or_default()
    }
}

impl Default for MockEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lammkit_sys::codes::shape;

    #[test]
    fn velocity_before_any_atom_is_ignored() {
        let _ = MockEngineBuilder::new().velocity([1.0, 0.0, 0.0]).stage();
        let st = take_staged().expect("state was staged");
        assert!(st.v.is_empty());
    }

    #[test]
    fn two_dim_storage_is_handed_out_as_row_pointers() {
        let api = MockEngineBuilder::new()
            .atom(1, 1, [0.0, 1.0, 2.0])
            .atom(2, 1, [3.0, 4.0, 5.0])
            .stage();
        let engine = unsafe { (api.open)(0, std::ptr::null_mut()) };
        let name = CString::new("x").unwrap();
        unsafe {
            let table = (api.extract_atom)(engine, name.as_ptr()) as *const *const f64;
            let row0 = *table;
            let row1 = *table.add(1);
            assert_eq!(std::slice::from_raw_parts(row0, 3), [0.0, 1.0, 2.0]);
            assert_eq!(
                row1.offset_from(row0),
                3,
                "backing block behind row 0 is contiguous"
            );
            (api.close)(engine);
        }
    }

    #[test]
    fn per_atom_size_queries_take_the_shared_selectors() {
        let api = MockEngineBuilder::new()
            .atom(1, 1, [0.0; 3])
            .ghost([9.0, 9.0, 9.0])
            .stage();
        let engine = unsafe { (api.open)(0, std::ptr::null_mut()) };
        let x = CString::new("x").unwrap();
        let id = CString::new("id").unwrap();
        unsafe {
            // Row counts include ghost rows for communicated quantities.
            assert_eq!((api.extract_atom_size)(engine, x.as_ptr(), shape::SIZE_ROWS), 2);
            assert_eq!((api.extract_atom_size)(engine, x.as_ptr(), shape::SIZE_COLS), 3);
            assert_eq!((api.extract_atom_size)(engine, id.as_ptr(), shape::SIZE_ROWS), 1);
            assert_eq!((api.extract_atom_size)(engine, id.as_ptr(), shape::SIZE_COLS), 0);
            (api.close)(engine);
        }
    }

    #[test]
    fn staged_state_is_consumed_by_a_single_open() {
        let _ = MockEngineBuilder::new().atom(7, 1, [0.0; 3]).stage();
        let st = take_staged().expect("state was staged");
        assert_eq!(st.ids, [7]);
        assert!(take_staged().is_none(), "a second take sees nothing");
    }

    #[test]
    fn ghosts_extend_only_the_float_arrays() {
        let _ = MockEngineBuilder::new()
            .atom(1, 1, [0.0; 3])
            .ghost([5.0, 5.0, 5.0])
            .stage();
        let st = take_staged().expect("state was staged");
        assert_eq!(st.nghost, 1);
        assert_eq!(st.ids.len(), 1);
        assert_eq!(st.x.len(), 6);
        assert_eq!(st.x[3..], [5.0, 5.0, 5.0]);
    }

    #[test]
    fn groups_set_mask_bits_in_definition_order() {
        let _ = MockEngineBuilder::new()
            .atom(1, 1, [0.0; 3])
            .atom(2, 1, [1.0; 3])
            .group("mobile", &[2])
            .stage();
        let st = take_staged().expect("state was staged");
        assert_eq!(st.groups, ["all", "mobile"]);
        assert_eq!(st.masks, [1, 1 | 2]);
    }
}
