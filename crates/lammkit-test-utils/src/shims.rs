//! The mock's `extern "C"` entry points, one per ABI table slot.
//!
//! Every shim treats the opaque instance pointer as a `Box<MockState>` leaked
//! by `open` and reclaimed by `close`. Error behavior mirrors the real
//! engine: bad names and unsupported combinations raise the error flag and
//! return null (or write nothing), they never abort.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int, c_void};
use std::ptr;

use lammkit_sys::codes::{dtype, shape, style, var};
use lammkit_sys::{EnginePtr, SIZE_VECTOR_GROUP};

use crate::state::{per_atom_column, per_atom_target, Column, MockState, MockVar, TargetMut};
use crate::take_staged;

/// Severity codes in the engine's numbering.
const WARNING: c_int = 1;
const ERROR: c_int = 2;

unsafe fn state<'a>(ptr: EnginePtr) -> &'a mut MockState {
    &mut *(ptr as *mut MockState)
}

unsafe fn name_of(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

// ── lifecycle ────────────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn open(_argc: c_int, _argv: *mut *mut c_char) -> EnginePtr {
    let state = take_staged().unwrap_or_default();
    Box::into_raw(state) as EnginePtr
}

pub(crate) unsafe extern "C" fn close(ptr: EnginePtr) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr as *mut MockState));
    }
}

pub(crate) unsafe extern "C" fn version(_ptr: EnginePtr) -> c_int {
    20240829
}

// ── commands ─────────────────────────────────────────────────────────────

/// The mock speaks a tiny command dialect: a handful of script verbs are
/// accepted as no-ops (or trivially applied), anything else is the engine's
/// "unknown command" failure. Enough surface to test the error plumbing.
fn run_command(st: &mut MockState, cmd: &str) {
    let cmd = cmd.trim();
    if cmd.is_empty() || cmd.starts_with('#') {
        return;
    }
    let mut words = cmd.split_whitespace();
    let verb = words.next().unwrap_or("");
    match verb {
        "run" | "units" | "log" | "echo" | "thermo" | "reset_timestep" => {}
        "timestep" => match words.next().and_then(|w| w.parse::<f64>().ok()) {
            Some(dt) => st.dt = dt,
            None => st.set_error(format!("Invalid timestep command: {cmd}"), WARNING),
        },
        _ => st.set_error(format!("Unknown command: {verb}"), ERROR),
    }
}

pub(crate) unsafe extern "C" fn command(ptr: EnginePtr, cmd: *const c_char) {
    let st = state(ptr);
    let cmd = name_of(cmd);
    run_command(st, &cmd);
}

pub(crate) unsafe extern "C" fn commands_list(
    ptr: EnginePtr,
    n: c_int,
    cmds: *const *const c_char,
) {
    let st = state(ptr);
    for i in 0..n.max(0) as usize {
        let cmd = name_of(*cmds.add(i));
        run_command(st, &cmd);
        if st.error.is_some() {
            break;
        }
    }
}

// ── error flag ───────────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn has_error(ptr: EnginePtr) -> c_int {
    state(ptr).error.is_some() as c_int
}

pub(crate) unsafe extern "C" fn get_last_error_message(
    ptr: EnginePtr,
    buf: *mut c_char,
    len: c_int,
) -> c_int {
    let st = state(ptr);
    let Some((message, severity)) = st.error.take() else {
        if !buf.is_null() && len > 0 {
            *buf = 0;
        }
        return 0;
    };
    if !buf.is_null() && len > 0 {
        let bytes = message.as_bytes();
        let n = bytes.len().min(len as usize - 1);
        ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buf, n);
        *buf.add(n) = 0;
    }
    severity
}

// ── counts and settings ──────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn get_natoms(ptr: EnginePtr) -> c_double {
    state(ptr).nlocal() as c_double
}

pub(crate) unsafe extern "C" fn extract_setting(ptr: EnginePtr, name: *const c_char) -> c_int {
    let st = state(ptr);
    match name_of(name).as_str() {
        "dimension" => 3,
        "nlocal" => st.nlocal() as c_int,
        "nghost" => st.nghost as c_int,
        "nall" => (st.nlocal() + st.nghost) as c_int,
        "ntypes" => st.types.iter().copied().max().unwrap_or(0),
        _ => -1,
    }
}

// ── globals ──────────────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn extract_global_datatype(
    _ptr: EnginePtr,
    name: *const c_char,
) -> c_int {
    match name_of(name).as_str() {
        "natoms" | "nbonds" | "nangles" | "ndihedrals" | "nimpropers" => dtype::INT64,
        "dt" | "boxlo" | "boxhi" => dtype::DOUBLE,
        "units" => dtype::STRING,
        _ => dtype::NONE,
    }
}

pub(crate) unsafe extern "C" fn extract_global_size(_ptr: EnginePtr, name: *const c_char) -> c_int {
    match name_of(name).as_str() {
        "natoms" | "nbonds" | "nangles" | "ndihedrals" | "nimpropers" | "dt" | "units" => 1,
        "boxlo" | "boxhi" => 3,
        _ => -1,
    }
}

pub(crate) unsafe extern "C" fn extract_global(ptr: EnginePtr, name: *const c_char) -> *mut c_void {
    let st = state(ptr);
    // Count globals are synthesized into a scratch cell; the rest point at
    // live state fields.
    let count = match name_of(name).as_str() {
        "natoms" => st.nlocal() as i64,
        "nbonds" => st.bonds.len() as i64,
        "nangles" => st.angles.len() as i64,
        "ndihedrals" => st.dihedrals.len() as i64,
        "nimpropers" => st.impropers.len() as i64,
        "dt" => return &mut st.dt as *mut f64 as *mut c_void,
        "boxlo" => return st.box_lo.as_mut_ptr() as *mut c_void,
        "boxhi" => return st.box_hi.as_mut_ptr() as *mut c_void,
        "units" => return st.units.as_ptr() as *mut c_void,
        _ => return ptr::null_mut(),
    };
    st.scratch_i64 = count;
    &mut st.scratch_i64 as *mut i64 as *mut c_void
}

// ── per-atom extraction ──────────────────────────────────────────────────

fn atom_kind(name: &str) -> Option<(c_int, usize, bool)> {
    // (datatype code, cols, communicated to ghosts)
    match name {
        "id" | "type" | "mask" | "image" => Some((dtype::INT, 0, false)),
        "x" | "v" | "f" => Some((dtype::DOUBLE_2D, 3, true)),
        _ => None,
    }
}

pub(crate) unsafe extern "C" fn extract_atom_datatype(
    _ptr: EnginePtr,
    name: *const c_char,
) -> c_int {
    atom_kind(&name_of(name)).map_or(dtype::NONE, |(code, _, _)| code)
}

pub(crate) unsafe extern "C" fn extract_atom_size(
    ptr: EnginePtr,
    name: *const c_char,
    which: c_int,
) -> c_int {
    let st = state(ptr);
    let Some((_, cols, ghosted)) = atom_kind(&name_of(name)) else {
        return -1;
    };
    // Row counts reflect what the storage holds: ghost rows are included
    // for quantities communicated to ghost atoms.
    match which {
        shape::SIZE_ROWS if ghosted => (st.nlocal() + st.nghost) as c_int,
        shape::SIZE_ROWS => st.nlocal() as c_int,
        shape::SIZE_COLS => cols as c_int,
        _ => -1,
    }
}

pub(crate) unsafe extern "C" fn extract_atom(ptr: EnginePtr, name: *const c_char) -> *mut c_void {
    let st = state(ptr);
    // 1-D quantities are flat pointers; 2-D quantities go out as a table of
    // row pointers over the contiguous backing block, like the real engine's
    // `double**` per-atom arrays.
    match name_of(name).as_str() {
        "id" => st.ids.as_mut_ptr() as *mut c_void,
        "type" => st.types.as_mut_ptr() as *mut c_void,
        "mask" => st.masks.as_mut_ptr() as *mut c_void,
        "image" => st.images.as_mut_ptr() as *mut c_void,
        "x" => {
            let (base, rows) = (st.x.as_mut_ptr(), st.x.len() / 3);
            st.rows_of(base, rows, 3)
        }
        "v" => {
            let (base, rows) = (st.v.as_mut_ptr(), st.v.len() / 3);
            st.rows_of(base, rows, 3)
        }
        "f" => {
            let (base, rows) = (st.f.as_mut_ptr(), st.f.len() / 3);
            st.rows_of(base, rows, 3)
        }
        _ => ptr::null_mut(),
    }
}

// ── computes and fixes ───────────────────────────────────────────────────

enum Outcome {
    Ptr(*mut c_void),
    /// 2-D data: base of the contiguous block, rows, cols. Resolved to a
    /// row-pointer table once the state borrow is released.
    Rows(*mut f64, usize, usize),
    Size(c_int),
    Fail(String),
}

pub(crate) unsafe extern "C" fn extract_compute(
    ptr: EnginePtr,
    id: *const c_char,
    style_code: c_int,
    kind: c_int,
) -> *mut c_void {
    let st = state(ptr);
    let id = name_of(id);
    let outcome = match st.computes.get(&id) {
        None => Outcome::Fail(format!("Could not find compute ID {id}")),
        Some(c) => match (style_code, kind) {
            (style::GLOBAL, shape::SCALAR) => match &c.scalar {
                Some(v) => Outcome::Ptr(v.as_ptr() as *mut c_void),
                None => Outcome::Fail(format!("Compute {id} does not compute a global scalar")),
            },
            (style::GLOBAL, shape::VECTOR) => match &c.vector {
                Some(v) => Outcome::Ptr(v.as_ptr() as *mut c_void),
                None => Outcome::Fail(format!("Compute {id} does not compute a global vector")),
            },
            (style::GLOBAL, shape::SIZE_VECTOR) => match &c.vector {
                Some(v) => Outcome::Size(v.len() as c_int),
                None => Outcome::Fail(format!("Compute {id} does not compute a global vector")),
            },
            (style::GLOBAL, shape::ARRAY) => match &c.array {
                Some((v, rows, cols)) => Outcome::Rows(v.as_ptr() as *mut f64, *rows, *cols),
                None => Outcome::Fail(format!("Compute {id} does not compute a global array")),
            },
            (style::GLOBAL, shape::SIZE_ROWS) => match &c.array {
                Some((_, rows, _)) => Outcome::Size(*rows as c_int),
                None => Outcome::Fail(format!("Compute {id} does not compute a global array")),
            },
            (style::GLOBAL, shape::SIZE_COLS) => match &c.array {
                Some((_, _, cols)) => Outcome::Size(*cols as c_int),
                None => Outcome::Fail(format!("Compute {id} does not compute a global array")),
            },
            (style::ATOM, shape::VECTOR) => match &c.peratom {
                Some((v, 0)) => Outcome::Ptr(v.as_ptr() as *mut c_void),
                _ => Outcome::Fail(format!("Compute {id} does not compute a per-atom vector")),
            },
            (style::ATOM, shape::ARRAY) => match &c.peratom {
                Some((v, cols)) if *cols > 0 => {
                    Outcome::Rows(v.as_ptr() as *mut f64, v.len() / *cols, *cols)
                }
                _ => Outcome::Fail(format!("Compute {id} does not compute a per-atom array")),
            },
            (style::ATOM, shape::SIZE_COLS) => match &c.peratom {
                Some((_, cols)) => Outcome::Size(*cols as c_int),
                None => Outcome::Fail(format!("Compute {id} does not compute per-atom data")),
            },
            (style::LOCAL, shape::VECTOR) => match &c.local {
                Some((v, _, _)) => Outcome::Ptr(v.as_ptr() as *mut c_void),
                None => Outcome::Fail(format!("Compute {id} does not compute local data")),
            },
            (style::LOCAL, shape::ARRAY) => match &c.local {
                Some((v, rows, cols)) if *cols > 0 => {
                    Outcome::Rows(v.as_ptr() as *mut f64, *rows, *cols)
                }
                _ => Outcome::Fail(format!("Compute {id} does not compute a local array")),
            },
            (style::LOCAL, shape::SIZE_ROWS) => match &c.local {
                Some((_, rows, _)) => Outcome::Size(*rows as c_int),
                None => Outcome::Fail(format!("Compute {id} does not compute local data")),
            },
            (style::LOCAL, shape::SIZE_COLS) => match &c.local {
                Some((_, _, cols)) => Outcome::Size(*cols as c_int),
                None => Outcome::Fail(format!("Compute {id} does not compute local data")),
            },
            _ => Outcome::Fail(format!("Unsupported compute request for {id}")),
        },
    };
    match outcome {
        Outcome::Ptr(p) => p,
        Outcome::Rows(base, rows, cols) => st.rows_of(base, rows, cols),
        Outcome::Size(n) => {
            st.scratch_int = n;
            &mut st.scratch_int as *mut c_int as *mut c_void
        }
        Outcome::Fail(message) => {
            st.set_error(message, ERROR);
            ptr::null_mut()
        }
    }
}

pub(crate) unsafe extern "C" fn extract_fix(
    ptr: EnginePtr,
    id: *const c_char,
    style_code: c_int,
    kind: c_int,
    row: c_int,
    col: c_int,
) -> *mut c_void {
    let st = state(ptr);
    let id = name_of(id);
    enum FixOutcome {
        Ptr(*mut c_void),
        Rows(*mut f64, usize, usize),
        Size(c_int),
        Copy(f64),
        Fail(String),
    }
    let outcome = match st.fixes.get(&id) {
        None => FixOutcome::Fail(format!("Could not find fix ID {id}")),
        Some(f) => match (style_code, kind) {
            (style::GLOBAL, shape::SCALAR) => match f.scalar {
                Some(v) => FixOutcome::Copy(v),
                None => FixOutcome::Fail(format!("Fix {id} does not compute a global scalar")),
            },
            (style::GLOBAL, shape::VECTOR) => {
                match f.vector.as_ref().and_then(|v| v.get(row.max(0) as usize)) {
                    Some(&v) => FixOutcome::Copy(v),
                    None => FixOutcome::Fail(format!(
                        "Fix {id} has no global vector element {row}"
                    )),
                }
            }
            (style::GLOBAL, shape::SIZE_VECTOR) => match &f.vector {
                Some(v) => FixOutcome::Size(v.len() as c_int),
                None => FixOutcome::Fail(format!("Fix {id} does not compute a global vector")),
            },
            (style::GLOBAL, shape::ARRAY) => match &f.array {
                Some((v, _, cols)) => {
                    let idx = row.max(0) as usize * cols + col.max(0) as usize;
                    match v.get(idx) {
                        Some(&value) => FixOutcome::Copy(value),
                        None => FixOutcome::Fail(format!(
                            "Fix {id} has no global array element ({row}, {col})"
                        )),
                    }
                }
                None => FixOutcome::Fail(format!("Fix {id} does not compute a global array")),
            },
            (style::GLOBAL, shape::SIZE_ROWS) => match &f.array {
                Some((_, rows, _)) => FixOutcome::Size(*rows as c_int),
                None => FixOutcome::Fail(format!("Fix {id} does not compute a global array")),
            },
            (style::GLOBAL, shape::SIZE_COLS) => match &f.array {
                Some((_, _, cols)) => FixOutcome::Size(*cols as c_int),
                None => FixOutcome::Fail(format!("Fix {id} does not compute a global array")),
            },
            (style::ATOM, shape::VECTOR) => match &f.peratom {
                Some((v, 0)) => FixOutcome::Ptr(v.as_ptr() as *mut c_void),
                _ => FixOutcome::Fail(format!("Fix {id} does not compute a per-atom vector")),
            },
            (style::ATOM, shape::ARRAY) => match &f.peratom {
                Some((v, cols)) if *cols > 0 => {
                    FixOutcome::Rows(v.as_ptr() as *mut f64, v.len() / *cols, *cols)
                }
                _ => FixOutcome::Fail(format!("Fix {id} does not compute a per-atom array")),
            },
            (style::ATOM, shape::SIZE_COLS) => match &f.peratom {
                Some((_, cols)) => FixOutcome::Size(*cols as c_int),
                None => FixOutcome::Fail(format!("Fix {id} does not compute per-atom data")),
            },
            _ => FixOutcome::Fail(format!("Unsupported fix request for {id}")),
        },
    };
    match outcome {
        FixOutcome::Ptr(p) => p,
        FixOutcome::Rows(base, rows, cols) => st.rows_of(base, rows, cols),
        FixOutcome::Size(n) => {
            st.scratch_int = n;
            &mut st.scratch_int as *mut c_int as *mut c_void
        }
        FixOutcome::Copy(value) => st.stash(vec![value]) as *mut c_void,
        FixOutcome::Fail(message) => {
            st.set_error(message, ERROR);
            ptr::null_mut()
        }
    }
}

// ── variables ────────────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn extract_variable_datatype(
    ptr: EnginePtr,
    name: *const c_char,
) -> c_int {
    let st = state(ptr);
    match st.variables.get(&name_of(name)) {
        Some(MockVar::Equal(_)) => var::EQUAL,
        Some(MockVar::Atom(_)) => var::ATOM,
        Some(MockVar::Vector(_)) => var::VECTOR,
        Some(MockVar::Str(_)) => var::STRING,
        None => -1,
    }
}

pub(crate) unsafe extern "C" fn extract_variable(
    ptr: EnginePtr,
    name: *const c_char,
    group: *const c_char,
) -> *mut c_void {
    let st = state(ptr);
    let name = name_of(name);
    let outcome = match st.variables.get(&name) {
        None => Outcome::Fail(format!("Could not find variable {name}")),
        Some(MockVar::Equal(v)) => {
            let v = *v;
            return st.stash(vec![v]) as *mut c_void;
        }
        Some(MockVar::Str(s)) => Outcome::Ptr(s.as_ptr() as *mut c_void),
        Some(MockVar::Vector(v)) => {
            if group.is_null() {
                Outcome::Ptr(v.as_ptr() as *mut c_void)
            } else if name_of(group) == SIZE_VECTOR_GROUP {
                // The size query comes back as an engine-allocated int the
                // caller releases.
                let n = v.len() as c_int;
                return st.stash_int(vec![n]) as *mut c_void;
            } else {
                return ptr::null_mut();
            }
        }
        Some(MockVar::Atom(values)) => {
            let mut values = values.clone();
            if !group.is_null() {
                let group = name_of(group);
                match st.group_bit(&group) {
                    Some(bit) => {
                        for (value, &mask) in values.iter_mut().zip(&st.masks) {
                            if mask & bit == 0 {
                                *value = 0.0;
                            }
                        }
                    }
                    None => {
                        st.set_error(format!("Could not find group {group}"), ERROR);
                        return ptr::null_mut();
                    }
                }
            }
            return st.stash(values) as *mut c_void;
        }
    };
    match outcome {
        Outcome::Ptr(p) => p,
        Outcome::Rows(..) | Outcome::Size(_) => ptr::null_mut(),
        Outcome::Fail(message) => {
            st.set_error(message, ERROR);
            ptr::null_mut()
        }
    }
}

// ── gather / scatter ─────────────────────────────────────────────────────

unsafe fn gather_rows(st: &mut MockState, name: &str, ty: c_int, count: c_int, out: *mut c_void, slots: &[usize]) {
    let Some(column) = per_atom_column(st, name) else {
        st.set_error(format!("Unknown per-atom quantity {name}"), ERROR);
        return;
    };
    let width = column.width();
    if count.max(0) as usize != width {
        st.set_error(
            format!("Gather count {count} does not match width {width} of {name}"),
            ERROR,
        );
        return;
    }
    match column {
        Column::Int(src, w) => {
            if ty != 0 {
                st.set_error(format!("{name} is integer-valued"), ERROR);
                return;
            }
            let out = out as *mut c_int;
            for (slot, &idx) in slots.iter().enumerate() {
                ptr::copy_nonoverlapping(src.as_ptr().add(idx * w), out.add(slot * w), w);
            }
        }
        Column::Double(src, w) => {
            if ty != 1 {
                st.set_error(format!("{name} is double-valued"), ERROR);
                return;
            }
            let out = out as *mut f64;
            for (slot, &idx) in slots.iter().enumerate() {
                ptr::copy_nonoverlapping(src.as_ptr().add(idx * w), out.add(slot * w), w);
            }
        }
    }
}

/// Map a caller ID list to storage indices; raises the error flag on an
/// unknown ID.
unsafe fn subset_slots(st: &mut MockState, ids: *const c_int, ndata: c_int) -> Option<Vec<usize>> {
    let ids = std::slice::from_raw_parts(ids, ndata.max(0) as usize);
    let mut slots = Vec::with_capacity(ids.len());
    for &id in ids {
        match st.index_of(id) {
            Some(idx) => slots.push(idx),
            None => {
                st.set_error(format!("Unknown atom ID {id}"), ERROR);
                return None;
            }
        }
    }
    Some(slots)
}

pub(crate) unsafe extern "C" fn gather(
    ptr: EnginePtr,
    name: *const c_char,
    ty: c_int,
    count: c_int,
    data: *mut c_void,
) {
    let st = state(ptr);
    let name = name_of(name);
    let slots = st.id_order();
    gather_rows(st, &name, ty, count, data, &slots);
}

pub(crate) unsafe extern "C" fn gather_subset(
    ptr: EnginePtr,
    name: *const c_char,
    ty: c_int,
    count: c_int,
    ndata: c_int,
    ids: *const c_int,
    data: *mut c_void,
) {
    let st = state(ptr);
    let name = name_of(name);
    let Some(slots) = subset_slots(st, ids, ndata) else {
        return;
    };
    gather_rows(st, &name, ty, count, data, &slots);
}

unsafe fn scatter_rows(st: &mut MockState, name: &str, ty: c_int, count: c_int, data: *const c_void, slots: &[usize]) {
    let Some(column) = per_atom_column(st, name) else {
        st.set_error(format!("Unknown per-atom quantity {name}"), ERROR);
        return;
    };
    let width = column.width();
    if count.max(0) as usize != width {
        st.set_error(
            format!("Scatter count {count} does not match width {width} of {name}"),
            ERROR,
        );
        return;
    }
    let expected_ty = match column {
        Column::Int(..) => 0,
        Column::Double(..) => 1,
    };
    if ty != expected_ty {
        st.set_error(format!("Wrong element type for {name}"), ERROR);
        return;
    }
    match per_atom_target(st, name) {
        Some(TargetMut::Int(dst, w)) => {
            let src = data as *const c_int;
            for (slot, &idx) in slots.iter().enumerate() {
                ptr::copy_nonoverlapping(src.add(slot * w), dst.as_mut_ptr().add(idx * w), w);
            }
        }
        Some(TargetMut::Double(dst, w)) => {
            let src = data as *const f64;
            for (slot, &idx) in slots.iter().enumerate() {
                ptr::copy_nonoverlapping(src.add(slot * w), dst.as_mut_ptr().add(idx * w), w);
            }
        }
        None => st.set_error(format!("Unknown per-atom quantity {name}"), ERROR),
    }
}

pub(crate) unsafe extern "C" fn scatter(
    ptr: EnginePtr,
    name: *const c_char,
    ty: c_int,
    count: c_int,
    data: *const c_void,
) {
    let st = state(ptr);
    let name = name_of(name);
    let slots = st.id_order();
    scatter_rows(st, &name, ty, count, data, &slots);
}

pub(crate) unsafe extern "C" fn scatter_subset(
    ptr: EnginePtr,
    name: *const c_char,
    ty: c_int,
    count: c_int,
    ndata: c_int,
    ids: *const c_int,
    data: *const c_void,
) {
    let st = state(ptr);
    let name = name_of(name);
    let Some(slots) = subset_slots(st, ids, ndata) else {
        return;
    };
    scatter_rows(st, &name, ty, count, data, &slots);
}

// ── topology ─────────────────────────────────────────────────────────────

unsafe fn fill_topology<const N: usize>(rows: &[[c_int; N]], out: *mut c_void) {
    let out = out as *mut c_int;
    for (i, row) in rows.iter().enumerate() {
        ptr::copy_nonoverlapping(row.as_ptr(), out.add(i * N), N);
    }
}

pub(crate) unsafe extern "C" fn gather_bonds(ptr: EnginePtr, data: *mut c_void) {
    fill_topology(&state(ptr).bonds, data);
}

pub(crate) unsafe extern "C" fn gather_angles(ptr: EnginePtr, data: *mut c_void) {
    fill_topology(&state(ptr).angles, data);
}

pub(crate) unsafe extern "C" fn gather_dihedrals(ptr: EnginePtr, data: *mut c_void) {
    fill_topology(&state(ptr).dihedrals, data);
}

pub(crate) unsafe extern "C" fn gather_impropers(ptr: EnginePtr, data: *mut c_void) {
    fill_topology(&state(ptr).impropers, data);
}

// ── neighbor lists ───────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn find_pair_neighlist(
    ptr: EnginePtr,
    style_name: *const c_char,
    _exact: c_int,
    _nsub: c_int,
    _reqid: c_int,
) -> c_int {
    let st = state(ptr);
    let wanted = name_of(style_name);
    st.neigh
        .iter()
        .position(|(name, _)| *name == wanted)
        .map_or(-1, |i| i as c_int)
}

pub(crate) unsafe extern "C" fn neighlist_num_elements(ptr: EnginePtr, index: c_int) -> c_int {
    let st = state(ptr);
    usize::try_from(index)
        .ok()
        .and_then(|i| st.neigh.get(i))
        .map_or(-1, |(_, entries)| entries.len() as c_int)
}

pub(crate) unsafe extern "C" fn neighlist_element_neighbors(
    ptr: EnginePtr,
    index: c_int,
    element: c_int,
    atom: *mut c_int,
    num: *mut c_int,
    neighbors: *mut *mut c_int,
) -> c_int {
    let st = state(ptr);
    let entry = usize::try_from(index)
        .ok()
        .zip(usize::try_from(element).ok())
        .and_then(|(i, e)| st.neigh.get_mut(i).and_then(|(_, entries)| entries.get_mut(e)));
    let Some(entry) = entry else {
        return -1;
    };
    *atom = entry.atom;
    *num = entry.neighbors.len() as c_int;
    *neighbors = entry.neighbors.as_mut_ptr();
    0
}

// ── box ──────────────────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn extract_box(
    ptr: EnginePtr,
    lo: *mut c_double,
    hi: *mut c_double,
    xy: *mut c_double,
    yz: *mut c_double,
    xz: *mut c_double,
    periodicity: *mut c_int,
    box_change: *mut c_int,
) {
    let st = state(ptr);
    ptr::copy_nonoverlapping(st.box_lo.as_ptr(), lo, 3);
    ptr::copy_nonoverlapping(st.box_hi.as_ptr(), hi, 3);
    *xy = st.tilt[0];
    *yz = st.tilt[1];
    *xz = st.tilt[2];
    ptr::copy_nonoverlapping(st.periodicity.as_ptr(), periodicity, 3);
    *box_change = st.box_change;
}

pub(crate) unsafe extern "C" fn reset_box(
    ptr: EnginePtr,
    lo: *mut c_double,
    hi: *mut c_double,
    xy: c_double,
    yz: c_double,
    xz: c_double,
) {
    let st = state(ptr);
    ptr::copy_nonoverlapping(lo, st.box_lo.as_mut_ptr(), 3);
    ptr::copy_nonoverlapping(hi, st.box_hi.as_mut_ptr(), 3);
    st.tilt = [xy, yz, xz];
}

// ── name listings ────────────────────────────────────────────────────────

fn category_names(st: &MockState, category: &str) -> Option<Vec<String>> {
    match category {
        "group" => Some(st.groups.clone()),
        "compute" => Some(st.computes.keys().cloned().collect()),
        "fix" => Some(st.fixes.keys().cloned().collect()),
        "variable" => Some(st.variables.keys().cloned().collect()),
        _ => None,
    }
}

pub(crate) unsafe extern "C" fn id_count(ptr: EnginePtr, category: *const c_char) -> c_int {
    let st = state(ptr);
    category_names(st, &name_of(category)).map_or(-1, |names| names.len() as c_int)
}

pub(crate) unsafe extern "C" fn id_name(
    ptr: EnginePtr,
    category: *const c_char,
    index: c_int,
    buf: *mut c_char,
    len: c_int,
) -> c_int {
    let st = state(ptr);
    let name = usize::try_from(index)
        .ok()
        .and_then(|i| category_names(st, &name_of(category))?.get(i).cloned());
    let Some(name) = name else {
        return 0;
    };
    let Ok(cname) = CString::new(name) else {
        return 0;
    };
    let bytes = cname.as_bytes_with_nul();
    if buf.is_null() || (len as usize) < bytes.len() {
        return 0;
    }
    ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buf, bytes.len());
    1
}

// ── allocation ───────────────────────────────────────────────────────────

pub(crate) unsafe extern "C" fn free(ptr: EnginePtr, data: *mut c_void) {
    state(ptr).release(data);
}
