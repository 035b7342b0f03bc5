//! In-memory engine state behind the mock's opaque instance pointer.
//!
//! Storage order is deliberately NOT ascending-ID: atoms sit in whatever
//! order the builder added them, the way a real engine's spatial sorting
//! leaves them. The gather/scatter shims apply the ascending-ID contract on
//! top of that, so tests actually exercise the reordering.

use std::ffi::CString;
use std::os::raw::{c_double, c_int, c_void};

use indexmap::IndexMap;
use smallvec::SmallVec;

/// One per-atom f64 quantity owned by a compute or fix: flat values in
/// storage order, plus columns per atom (0 means a 1-D vector).
pub(crate) type PerAtomF64 = (Vec<f64>, usize);

#[derive(Default)]
pub(crate) struct MockCompute {
    /// Global scalar, stored as a one-element vec so the returned pointer
    /// survives map growth.
    pub scalar: Option<Vec<f64>>,
    pub vector: Option<Vec<f64>>,
    /// Flat row-major values, rows, cols.
    pub array: Option<(Vec<f64>, usize, usize)>,
    pub peratom: Option<PerAtomF64>,
    /// Local data: flat values, rows, cols (0 cols means a vector).
    pub local: Option<(Vec<f64>, usize, usize)>,
}

#[derive(Default)]
pub(crate) struct MockFix {
    pub scalar: Option<f64>,
    pub vector: Option<Vec<f64>>,
    pub array: Option<(Vec<f64>, usize, usize)>,
    pub peratom: Option<PerAtomF64>,
}

pub(crate) enum MockVar {
    Equal(f64),
    Str(CString),
    /// One value per local atom, storage order.
    Atom(Vec<f64>),
    Vector(Vec<f64>),
}

pub(crate) struct NeighEntry {
    /// 0-based storage index of the covered atom.
    pub atom: c_int,
    pub neighbors: SmallVec<[c_int; 8]>,
}

pub(crate) struct MockState {
    // Per-atom storage, one slot per local atom in insertion order. The
    // f64 arrays carry `nghost` extra rows at the tail.
    pub ids: Vec<c_int>,
    pub types: Vec<c_int>,
    pub masks: Vec<c_int>,
    pub images: Vec<c_int>,
    pub x: Vec<f64>,
    pub v: Vec<f64>,
    pub f: Vec<f64>,
    pub nghost: usize,

    pub box_lo: [c_double; 3],
    pub box_hi: [c_double; 3],
    pub tilt: [c_double; 3],
    pub periodicity: [c_int; 3],
    pub box_change: c_int,

    pub dt: f64,
    pub units: CString,

    /// Group names in definition order; bit `1 << index` in the atom mask.
    pub groups: Vec<String>,
    pub computes: IndexMap<String, MockCompute>,
    pub fixes: IndexMap<String, MockFix>,
    pub variables: IndexMap<String, MockVar>,

    pub bonds: Vec<[c_int; 3]>,
    pub angles: Vec<[c_int; 4]>,
    pub dihedrals: Vec<[c_int; 5]>,
    pub impropers: Vec<[c_int; 5]>,

    /// Neighbor lists keyed by pair-style name, in build order.
    pub neigh: Vec<(String, Vec<NeighEntry>)>,

    /// Pending error message and severity code; one slot, latest wins.
    pub error: Option<(String, c_int)>,

    // Scratch cells backing pointer-to-int / pointer-to-i64 ABI returns.
    // Valid until the next call through the table, which is all the safe
    // layer ever assumes.
    pub scratch_int: c_int,
    pub scratch_i64: i64,

    /// Row-pointer table handed out for 2-D storage; rebuilt per call, same
    /// scratch lifetime as the cells above.
    pub row_table: Vec<*mut f64>,

    /// Live "engine-allocated" buffers handed to the caller; reclaimed by
    /// the `free` entry point.
    pub allocs: Vec<Box<[f64]>>,
    pub allocs_int: Vec<Box<[c_int]>>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            ids: Vec::new(),
            types: Vec::new(),
            masks: Vec::new(),
            images: Vec::new(),
            x: Vec::new(),
            v: Vec::new(),
            f: Vec::new(),
            nghost: 0,
            box_lo: [0.0; 3],
            box_hi: [1.0; 3],
            tilt: [0.0; 3],
            periodicity: [1, 1, 1],
            box_change: 0,
            dt: 0.005,
            units: CString::new("lj").unwrap_or_default(),
            groups: vec!["all".to_string()],
            computes: IndexMap::new(),
            fixes: IndexMap::new(),
            variables: IndexMap::new(),
            bonds: Vec::new(),
            angles: Vec::new(),
            dihedrals: Vec::new(),
            impropers: Vec::new(),
            neigh: Vec::new(),
            error: None,
            scratch_int: 0,
            scratch_i64: 0,
            row_table: Vec::new(),
            allocs: Vec::new(),
            allocs_int: Vec::new(),
        }
    }
}

impl MockState {
    pub fn nlocal(&self) -> usize {
        self.ids.len()
    }

    pub fn set_error(&mut self, message: impl Into<String>, severity: c_int) {
        self.error = Some((message.into(), severity));
    }

    /// Storage indices of all local atoms, ascending by atom ID.
    pub fn id_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.nlocal()).collect();
        order.sort_unstable_by_key(|&i| self.ids[i]);
        order
    }

    /// Storage index of an atom by its ID.
    pub fn index_of(&self, id: c_int) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    pub fn group_bit(&self, name: &str) -> Option<c_int> {
        self.groups
            .iter()
            .position(|g| g == name)
            .map(|i| 1 << i as c_int)
    }

    /// Hand out a caller-freed buffer; the pointer stays valid until the
    /// matching `free` call.
    pub fn stash(&mut self, data: Vec<f64>) -> *mut f64 {
        let boxed = data.into_boxed_slice();
        let ptr = boxed.as_ptr() as *mut f64;
        self.allocs.push(boxed);
        ptr
    }

    pub fn stash_int(&mut self, data: Vec<c_int>) -> *mut c_int {
        let boxed = data.into_boxed_slice();
        let ptr = boxed.as_ptr() as *mut c_int;
        self.allocs_int.push(boxed);
        ptr
    }

    pub fn release(&mut self, ptr: *mut c_void) {
        self.allocs.retain(|b| b.as_ptr() as *mut c_void != ptr);
        self.allocs_int.retain(|b| b.as_ptr() as *mut c_void != ptr);
    }

    /// Build the row-pointer table the ABI hands out for 2-D storage over a
    /// contiguous `rows * cols` block at `base`.
    pub fn rows_of(&mut self, base: *mut f64, rows: usize, cols: usize) -> *mut c_void {
        self.row_table.clear();
        self.row_table
            .extend((0..rows).map(|r| unsafe { base.add(r * cols) }));
        self.row_table.as_mut_ptr() as *mut c_void
    }
}

/// A per-atom quantity resolved to a copy of its storage-order data.
///
/// Width is values per atom; copies keep the shims free of borrow juggling
/// between the data and the mutable error slot.
pub(crate) enum Column {
    Int(Vec<c_int>, usize),
    Double(Vec<f64>, usize),
}

impl Column {
    pub fn width(&self) -> usize {
        match self {
            Column::Int(_, w) | Column::Double(_, w) => *w,
        }
    }
}

/// Resolve a gather/scatter name (native property, `c_<id>`, or `f_<id>`)
/// against the state, local atoms only.
pub(crate) fn per_atom_column(st: &MockState, name: &str) -> Option<Column> {
    if let Some(id) = name.strip_prefix("c_") {
        let (data, cols) = st.computes.get(id)?.peratom.as_ref()?;
        return Some(Column::Double(data.clone(), (*cols).max(1)));
    }
    if let Some(id) = name.strip_prefix("f_") {
        let (data, cols) = st.fixes.get(id)?.peratom.as_ref()?;
        return Some(Column::Double(data.clone(), (*cols).max(1)));
    }
    let n = st.nlocal();
    match name {
        "id" => Some(Column::Int(st.ids.clone(), 1)),
        "type" => Some(Column::Int(st.types.clone(), 1)),
        "mask" => Some(Column::Int(st.masks.clone(), 1)),
        "image" => Some(Column::Int(st.images.clone(), 1)),
        "x" => Some(Column::Double(st.x[..3 * n].to_vec(), 3)),
        "v" => Some(Column::Double(st.v[..3 * n].to_vec(), 3)),
        "f" => Some(Column::Double(st.f[..3 * n].to_vec(), 3)),
        _ => None,
    }
}

/// Mutable scatter target for a name, with its width.
pub(crate) enum TargetMut<'a> {
    Int(&'a mut [c_int], usize),
    Double(&'a mut [f64], usize),
}

pub(crate) fn per_atom_target<'a>(st: &'a mut MockState, name: &str) -> Option<TargetMut<'a>> {
    let n = st.nlocal();
    if let Some(id) = name.strip_prefix("c_") {
        let (data, cols) = st.computes.get_mut(id)?.peratom.as_mut()?;
        let w = (*cols).max(1);
        return Some(TargetMut::Double(data.as_mut_slice(), w));
    }
    if let Some(id) = name.strip_prefix("f_") {
        let (data, cols) = st.fixes.get_mut(id)?.peratom.as_mut()?;
        let w = (*cols).max(1);
        return Some(TargetMut::Double(data.as_mut_slice(), w));
    }
    match name {
        "id" => Some(TargetMut::Int(&mut st.ids, 1)),
        "type" => Some(TargetMut::Int(&mut st.types, 1)),
        "mask" => Some(TargetMut::Int(&mut st.masks, 1)),
        "image" => Some(TargetMut::Int(&mut st.images, 1)),
        "x" => Some(TargetMut::Double(&mut st.x[..3 * n], 3)),
        "v" => Some(TargetMut::Double(&mut st.v[..3 * n], 3)),
        "f" => Some(TargetMut::Double(&mut st.f[..3 * n], 3)),
        _ => None,
    }
}
