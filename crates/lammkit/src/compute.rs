//! Compute and fix output accessors.
//!
//! Dispatch is on (style, shape). The binding does not second-guess which
//! combinations a given compute or fix supports: an unsupported request
//! comes back from the engine as a null with the error flag raised and is
//! surfaced as an engine error, distinguished from binding-side validation.
//!
//! Global fix values are computed on demand inside the engine and returned
//! as engine-allocated copies, fetched element-wise and released through the
//! ABI `free` entry. Everything else is a non-owning view.

use std::os::raw::{c_double, c_int};

use lammkit_sys::codes::{shape, style};

use crate::error::Result;
use crate::extract::{array_base, ArrayView};
use crate::instance::{c_string, Instance};

/// Which incarnation of a compute's output to access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeStyle {
    /// One value (or vector/array) for the whole system.
    Global,
    /// One row per local atom.
    PerAtom,
    /// One row per local pair/triple/... entry.
    Local,
}

impl ComputeStyle {
    fn code(self) -> c_int {
        match self {
            Self::Global => style::GLOBAL,
            Self::PerAtom => style::ATOM,
            Self::Local => style::LOCAL,
        }
    }
}

/// Which shape of a compute's output to access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeShape {
    /// The scalar value.
    Scalar,
    /// The vector values.
    Vector,
    /// The array values.
    Array,
}

/// A compute's output.
#[derive(Debug)]
pub enum ComputeValue<'a> {
    /// Scalar output.
    Scalar(f64),
    /// Vector output (global length, local atom count, or local row count
    /// depending on style).
    Vector(&'a [f64]),
    /// Array output.
    Array(ArrayView<'a, f64>),
}

/// A fix's output. Global shapes are owned copies (the engine computes them
/// on demand); per-atom shapes are views over engine memory.
#[derive(Debug)]
pub enum FixValue<'a> {
    /// Global scalar.
    Scalar(f64),
    /// Global vector, fetched element-wise.
    Vector(Vec<f64>),
    /// Global array, fetched element-wise, row-major.
    Array {
        /// Flattened row-major values.
        data: Vec<f64>,
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },
    /// Per-atom vector view.
    PerAtom(&'a [f64]),
    /// Per-atom array view.
    PerAtomArray(ArrayView<'a, f64>),
}

impl Instance {
    fn compute_size(&self, id: &str, style_code: c_int, which: c_int) -> Result<usize> {
        let ptr = self.raw()?;
        let cid = c_string(id)?;
        let p = unsafe { (self.api().extract_compute)(ptr, cid.as_ptr(), style_code, which) };
        if p.is_null() {
            return Err(self.null_result(ptr, "compute", id));
        }
        Ok(unsafe { *(p as *const c_int) }.max(0) as usize)
    }

    /// Access a compute's output by id, style, and shape.
    pub fn extract_compute(
        &self,
        id: &str,
        style: ComputeStyle,
        shape_sel: ComputeShape,
    ) -> Result<ComputeValue<'_>> {
        let ptr = self.raw()?;
        let cid = c_string(id)?;
        let style_code = style.code();

        match shape_sel {
            ComputeShape::Scalar => {
                let p = unsafe {
                    (self.api().extract_compute)(ptr, cid.as_ptr(), style_code, shape::SCALAR)
                };
                if p.is_null() {
                    return Err(self.null_result(ptr, "compute", id));
                }
                Ok(ComputeValue::Scalar(unsafe { *(p as *const c_double) }))
            }
            ComputeShape::Vector => {
                let len = match style {
                    ComputeStyle::Global => {
                        self.compute_size(id, style_code, shape::SIZE_VECTOR)?
                    }
                    ComputeStyle::PerAtom => self.extract_setting("nlocal")? as usize,
                    ComputeStyle::Local => self.compute_size(id, style_code, shape::SIZE_ROWS)?,
                };
                let p = unsafe {
                    (self.api().extract_compute)(ptr, cid.as_ptr(), style_code, shape::VECTOR)
                };
                if p.is_null() {
                    return Err(self.null_result(ptr, "compute", id));
                }
                let slice = unsafe { std::slice::from_raw_parts(p as *const c_double, len) };
                Ok(ComputeValue::Vector(slice))
            }
            ComputeShape::Array => {
                let rows = match style {
                    ComputeStyle::Global => self.compute_size(id, style_code, shape::SIZE_ROWS)?,
                    ComputeStyle::PerAtom => self.extract_setting("nlocal")? as usize,
                    ComputeStyle::Local => self.compute_size(id, style_code, shape::SIZE_ROWS)?,
                };
                let cols = self.compute_size(id, style_code, shape::SIZE_COLS)?;
                let p = unsafe {
                    (self.api().extract_compute)(ptr, cid.as_ptr(), style_code, shape::ARRAY)
                };
                if p.is_null() {
                    return Err(self.null_result(ptr, "compute", id));
                }
                // Array output is a row-pointer table over one contiguous
                // block, like per-atom storage.
                let Some(base) = (unsafe { array_base::<f64>(p, rows) }) else {
                    return Err(self.null_result(ptr, "compute", id));
                };
                Ok(ComputeValue::Array(ArrayView::new(base, rows, cols)))
            }
        }
    }

    fn fix_element(&self, id: &str, shape_sel: c_int, row: usize, col: usize) -> Result<f64> {
        let ptr = self.raw()?;
        let cid = c_string(id)?;
        let p = unsafe {
            (self.api().extract_fix)(
                ptr,
                cid.as_ptr(),
                style::GLOBAL,
                shape_sel,
                row as c_int,
                col as c_int,
            )
        };
        if p.is_null() {
            return Err(self.null_result(ptr, "fix", id));
        }
        let value = unsafe { *(p as *const c_double) };
        unsafe { (self.api().free)(ptr, p) };
        Ok(value)
    }

    fn fix_size(&self, id: &str, style_code: c_int, which: c_int) -> Result<usize> {
        let ptr = self.raw()?;
        let cid = c_string(id)?;
        let p = unsafe {
            (self.api().extract_fix)(ptr, cid.as_ptr(), style_code, which, 0, 0)
        };
        if p.is_null() {
            return Err(self.null_result(ptr, "fix", id));
        }
        Ok(unsafe { *(p as *const c_int) }.max(0) as usize)
    }

    /// Access a fix's output by id, style, and shape.
    ///
    /// Supported styles are global and per-atom; local fix output is not
    /// part of the engine's accessor surface.
    pub fn extract_fix(
        &self,
        id: &str,
        style: ComputeStyle,
        shape_sel: ComputeShape,
    ) -> Result<FixValue<'_>> {
        match (style, shape_sel) {
            (ComputeStyle::Global, ComputeShape::Scalar) => {
                Ok(FixValue::Scalar(self.fix_element(id, shape::SCALAR, 0, 0)?))
            }
            (ComputeStyle::Global, ComputeShape::Vector) => {
                let len = self.fix_size(id, style::GLOBAL, shape::SIZE_VECTOR)?;
                let mut values = Vec::with_capacity(len);
                for i in 0..len {
                    values.push(self.fix_element(id, shape::VECTOR, i, 0)?);
                }
                Ok(FixValue::Vector(values))
            }
            (ComputeStyle::Global, ComputeShape::Array) => {
                let rows = self.fix_size(id, style::GLOBAL, shape::SIZE_ROWS)?;
                let cols = self.fix_size(id, style::GLOBAL, shape::SIZE_COLS)?;
                let mut data = Vec::with_capacity(rows * cols);
                for r in 0..rows {
                    for c in 0..cols {
                        data.push(self.fix_element(id, shape::ARRAY, r, c)?);
                    }
                }
                Ok(FixValue::Array { data, rows, cols })
            }
            (ComputeStyle::PerAtom, ComputeShape::Vector) => {
                let ptr = self.raw()?;
                let cid = c_string(id)?;
                let len = self.extract_setting("nlocal")? as usize;
                let p = unsafe {
                    (self.api().extract_fix)(ptr, cid.as_ptr(), style::ATOM, shape::VECTOR, 0, 0)
                };
                if p.is_null() {
                    return Err(self.null_result(ptr, "fix", id));
                }
                let slice = unsafe { std::slice::from_raw_parts(p as *const c_double, len) };
                Ok(FixValue::PerAtom(slice))
            }
            (ComputeStyle::PerAtom, ComputeShape::Array) => {
                let ptr = self.raw()?;
                let cid = c_string(id)?;
                let rows = self.extract_setting("nlocal")? as usize;
                let cols = self.fix_size(id, style::ATOM, shape::SIZE_COLS)?;
                let p = unsafe {
                    (self.api().extract_fix)(ptr, cid.as_ptr(), style::ATOM, shape::ARRAY, 0, 0)
                };
                if p.is_null() {
                    return Err(self.null_result(ptr, "fix", id));
                }
                let Some(base) = (unsafe { array_base::<f64>(p, rows) }) else {
                    return Err(self.null_result(ptr, "fix", id));
                };
                Ok(FixValue::PerAtomArray(ArrayView::new(base, rows, cols)))
            }
            // Everything else the engine itself rejects.
            (style, shape_sel) => {
                let ptr = self.raw()?;
                let cid = c_string(id)?;
                let style_code = style.code();
                let shape_code = match shape_sel {
                    ComputeShape::Scalar => shape::SCALAR,
                    ComputeShape::Vector => shape::VECTOR,
                    ComputeShape::Array => shape::ARRAY,
                };
                // The engine rejects these combinations itself; drain its
                // error flag into the returned error.
                let _ = unsafe {
                    (self.api().extract_fix)(ptr, cid.as_ptr(), style_code, shape_code, 0, 0)
                };
                Err(self.null_result(ptr, "fix", id))
            }
        }
    }
}
