//! Typed, zero-copy extraction of engine-resident data.
//!
//! Resolution is dynamic: the engine reports element type and shape at query
//! time, the binding validates that report against the caller's expectation,
//! and only then constructs a non-owning view over engine memory. Nothing is
//! copied and no resolved address is cached across calls.
//!
//! Views borrow the [`Instance`] and become stale once the engine
//! reallocates the underlying storage (any atom-count-changing command).
//! Staleness is a documented caller hazard; it cannot be detected through
//! the ABI.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_void;
use std::ptr::NonNull;

use lammkit_sys::codes::{dtype, shape};

use crate::error::{Error, Result, ValidationError};
use crate::instance::{c_string, Instance};
use crate::types::{DataType, Element, Rank};

/// Non-owning 2-D view over engine memory: `rows` rows of `cols` elements,
/// contiguous row-major.
#[derive(Clone, Copy)]
pub struct ArrayView<'a, T> {
    ptr: NonNull<T>,
    rows: usize,
    cols: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Copy> ArrayView<'a, T> {
    pub(crate) fn new(ptr: NonNull<T>, rows: usize, cols: usize) -> Self {
        Self {
            ptr,
            rows,
            cols,
            _marker: PhantomData,
        }
    }

    /// Number of rows (atoms).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One row as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows()`.
    pub fn row(&self, row: usize) -> &'a [T] {
        assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(row * self.cols), self.cols) }
    }

    /// A single element, or `None` out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(unsafe { *self.ptr.as_ptr().add(row * self.cols + col) })
        } else {
            None
        }
    }

    /// The whole view as one flat slice of `rows * cols` elements.
    pub fn as_flat(&self) -> &'a [T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.rows * self.cols) }
    }

    /// Iterate over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.rows).map(move |r| self.row(r))
    }
}

/// Resolve an ABI array return (a table of row pointers over one contiguous
/// block) to its element base. An empty array has no row pointer to follow;
/// `None` means the table's first entry was null.
///
/// # Safety
///
/// `table` must point to at least one valid row pointer when `rows > 0`.
pub(crate) unsafe fn array_base<T>(table: *mut c_void, rows: usize) -> Option<NonNull<T>> {
    if rows == 0 {
        Some(NonNull::dangling())
    } else {
        NonNull::new(*(table as *const *mut T))
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for ArrayView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayView")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

/// View over a per-atom quantity: 1-D or fixed-width 2-D, decided by the
/// engine's report for the name.
#[derive(Debug)]
pub enum AtomView<'a, T: Element> {
    /// One value per atom.
    Vector(&'a [T]),
    /// A fixed number of values per atom (e.g. 3 for coordinates).
    Array(ArrayView<'a, T>),
}

impl<'a, T: Element> AtomView<'a, T> {
    /// Number of atoms covered by the view.
    pub fn len(&self) -> usize {
        match self {
            Self::Vector(s) => s.len(),
            Self::Array(a) => a.rows(),
        }
    }

    /// Whether the view covers zero atoms.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The 1-D slice, or a shape-mismatch error for 2-D quantities.
    pub fn as_vector(&self, name: &str) -> Result<&'a [T]> {
        match self {
            Self::Vector(s) => Ok(s),
            Self::Array(a) => Err(Error::Validation(ValidationError::ShapeMismatch {
                name: name.to_string(),
                expected: "a 1-D per-atom vector",
                actual: format!("a per-atom array with {} columns", a.cols()),
            })),
        }
    }

    /// The 2-D view, or a shape-mismatch error for 1-D quantities.
    pub fn as_array(&self, name: &str) -> Result<ArrayView<'a, T>> {
        match self {
            Self::Vector(_) => Err(Error::Validation(ValidationError::ShapeMismatch {
                name: name.to_string(),
                expected: "a 2-D per-atom array",
                actual: "a 1-D per-atom vector".to_string(),
            })),
            Self::Array(a) => Ok(*a),
        }
    }
}

/// View over a global quantity.
#[derive(Debug)]
pub enum GlobalView<'a, T: Element> {
    /// A single value.
    Scalar(T),
    /// A fixed-length vector (e.g. 3 box bounds).
    Vector(&'a [T]),
}

impl<T: Element> GlobalView<'_, T> {
    /// The scalar value, or a shape-mismatch error for vector globals.
    pub fn scalar(&self, name: &str) -> Result<T> {
        match self {
            Self::Scalar(v) => Ok(*v),
            Self::Vector(s) => Err(Error::Validation(ValidationError::ShapeMismatch {
                name: name.to_string(),
                expected: "a scalar global",
                actual: format!("a global vector of length {}", s.len()),
            })),
        }
    }
}

impl Instance {
    /// Integer-valued engine setting ("dimension", "nlocal", "nghost", ...).
    pub fn extract_setting(&self, name: &str) -> Result<i32> {
        let ptr = self.raw()?;
        let cname = c_string(name)?;
        let value = unsafe { (self.api().extract_setting)(ptr, cname.as_ptr()) };
        if value < 0 {
            return Err(Error::NotFound {
                kind: "setting",
                name: name.to_string(),
            });
        }
        Ok(value)
    }

    /// Typed view over a global quantity.
    ///
    /// Shape (scalar versus fixed-length vector) and element type come from
    /// the engine's report at call time; a type mismatch fails validation
    /// before any memory is reinterpreted.
    pub fn extract_global<T: Element>(&self, name: &str) -> Result<GlobalView<'_, T>> {
        let ptr = self.raw()?;
        let cname = c_string(name)?;
        let code = unsafe { (self.api().extract_global_datatype)(ptr, cname.as_ptr()) };
        let Some((reported, _)) = DataType::from_code(code) else {
            return Err(Error::NotFound {
                kind: "global",
                name: name.to_string(),
            });
        };
        if reported != T::DATA_TYPE {
            return Err(Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: reported,
            }));
        }
        let len = unsafe { (self.api().extract_global_size)(ptr, cname.as_ptr()) };
        if len < 1 {
            return Err(Error::Validation(ValidationError::ShapeMismatch {
                name: name.to_string(),
                expected: "at least one element",
                actual: format!("engine-reported size {len}"),
            }));
        }
        let data = unsafe { (self.api().extract_global)(ptr, cname.as_ptr()) };
        if data.is_null() {
            return Err(self.null_result(ptr, "global", name));
        }
        let slice = unsafe { std::slice::from_raw_parts(data as *const T, len as usize) };
        Ok(if slice.len() == 1 {
            GlobalView::Scalar(slice[0])
        } else {
            GlobalView::Vector(slice)
        })
    }

    /// A string-valued global ("units", ...), copied out of engine memory.
    pub fn extract_global_str(&self, name: &str) -> Result<String> {
        let ptr = self.raw()?;
        let cname = c_string(name)?;
        let code = unsafe { (self.api().extract_global_datatype)(ptr, cname.as_ptr()) };
        if code == dtype::NONE {
            return Err(Error::NotFound {
                kind: "global",
                name: name.to_string(),
            });
        }
        if code != dtype::STRING {
            return Err(match DataType::from_code(code) {
                Some((actual, _)) => Error::Validation(ValidationError::TypeMismatch {
                    name: name.to_string(),
                    requested: DataType::String,
                    actual,
                }),
                None => Error::Validation(ValidationError::ShapeMismatch {
                    name: name.to_string(),
                    expected: "a string-valued global",
                    actual: format!("unrecognized datatype code {code}"),
                }),
            });
        }
        let data = unsafe { (self.api().extract_global)(ptr, cname.as_ptr()) };
        if data.is_null() {
            return Err(self.null_result(ptr, "global", name));
        }
        Ok(unsafe { CStr::from_ptr(data as *const _) }
            .to_string_lossy()
            .into_owned())
    }

    /// Typed view over a per-atom quantity, spanning local atoms.
    pub fn extract_atom<T: Element>(&self, name: &str) -> Result<AtomView<'_, T>> {
        self.extract_atom_inner(name, false)
    }

    /// Typed view over a per-atom quantity, spanning local plus ghost atoms.
    ///
    /// Fails with a ghosts-unsupported validation error when the engine does
    /// not communicate the quantity to ghost atoms (rather than silently
    /// truncating to the local count).
    pub fn extract_atom_with_ghosts<T: Element>(&self, name: &str) -> Result<AtomView<'_, T>> {
        self.extract_atom_inner(name, true)
    }

    fn extract_atom_inner<T: Element>(&self, name: &str, ghosts: bool) -> Result<AtomView<'_, T>> {
        let ptr = self.raw()?;
        let cname = c_string(name)?;
        let code = unsafe { (self.api().extract_atom_datatype)(ptr, cname.as_ptr()) };
        let Some((reported, rank)) = DataType::from_code(code) else {
            return Err(Error::NotFound {
                kind: "per-atom property",
                name: name.to_string(),
            });
        };
        if reported != T::DATA_TYPE {
            return Err(Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: reported,
            }));
        }

        // The engine reports how many rows the storage actually holds: local
        // atoms plus ghosts for quantities communicated to ghosts, local
        // atoms only otherwise.
        let held =
            unsafe { (self.api().extract_atom_size)(ptr, cname.as_ptr(), shape::SIZE_ROWS) };
        if held < 0 {
            return Err(Error::NotFound {
                kind: "per-atom property",
                name: name.to_string(),
            });
        }
        let nlocal = self.extract_setting("nlocal")?;
        let rows = if ghosts {
            let nall = nlocal + self.extract_setting("nghost")?;
            if held < nall {
                return Err(Error::Validation(ValidationError::GhostsUnsupported {
                    name: name.to_string(),
                }));
            }
            nall as usize
        } else {
            nlocal as usize
        };

        let data = unsafe { (self.api().extract_atom)(ptr, cname.as_ptr()) };
        if data.is_null() {
            return Err(self.null_result(ptr, "per-atom property", name));
        }

        match rank {
            Rank::OneDim => {
                let slice = unsafe { std::slice::from_raw_parts(data as *const T, rows) };
                Ok(AtomView::Vector(slice))
            }
            Rank::TwoDim => {
                let cols = unsafe {
                    (self.api().extract_atom_size)(ptr, cname.as_ptr(), shape::SIZE_COLS)
                };
                if cols < 1 {
                    return Err(Error::Validation(ValidationError::ShapeMismatch {
                        name: name.to_string(),
                        expected: "a positive column count for a 2-D quantity",
                        actual: format!("engine-reported column count {cols}"),
                    }));
                }
                // 2-D storage comes back as a table of row pointers; the
                // block behind row 0 is contiguous row-major.
                let Some(base) = (unsafe { array_base::<T>(data, rows) }) else {
                    return Err(self.null_result(ptr, "per-atom property", name));
                };
                Ok(AtomView::Array(ArrayView::new(base, rows, cols as usize)))
            }
        }
    }
}
