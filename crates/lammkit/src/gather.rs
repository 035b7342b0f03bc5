//! Bulk gather/scatter of per-atom quantities.
//!
//! Covers three name classes: native per-atom properties ("x", "v", "id",
//! "type", "image", ...), per-atom compute output (`c_<id>`), and per-atom
//! fix output (`f_<id>`). Width and element type are resolved per call from
//! engine metadata; nothing is cached.
//!
//! Validation happens in a fixed order before the bulk transfer touches
//! engine memory: element type first, then subset ID range, then buffer
//! length. A gather without a subset returns atoms in ascending-ID order —
//! that ordering is the engine's documented contract, not something the
//! binding reimposes. A subset gather follows the caller's ID order.

use std::os::raw::{c_int, c_void};

use lammkit_sys::codes::{shape, style};

use crate::error::{Error, Result, ValidationError};
use crate::instance::{c_string, Instance};
use crate::types::{DataType, Element, QuantityDesc};

/// ABI type code for bulk transfers: 0 = 32-bit int, 1 = 64-bit float.
fn transfer_code(dtype: DataType) -> Option<c_int> {
    match dtype {
        DataType::Int32 => Some(0),
        DataType::Float64 => Some(1),
        _ => None,
    }
}

/// A gathered per-atom quantity: flat buffer plus values-per-atom width.
#[derive(Clone, Debug, PartialEq)]
pub struct Gathered<T> {
    data: Vec<T>,
    width: usize,
}

impl<T: Element> Gathered<T> {
    /// Values per atom (1 for scalars, 3 for coordinates, ...).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of atoms covered.
    pub fn natoms(&self) -> usize {
        self.data.len() / self.width
    }

    /// The flat buffer, `width` values per atom, atom-major.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The values for one covered atom (by position, not ID).
    ///
    /// # Panics
    ///
    /// Panics if `index >= natoms()`.
    pub fn row(&self, index: usize) -> &[T] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    /// Consume into the flat buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl Instance {
    /// Resolve the element type and row width of a per-atom quantity by
    /// name class. Compute and fix output is always 64-bit float; native
    /// properties report their own type.
    fn per_atom_desc(&self, name: &str) -> Result<QuantityDesc> {
        let ptr = self.raw()?;
        if let Some(id) = name.strip_prefix("c_") {
            let cid = c_string(id)?;
            let cols = unsafe {
                (self.api().extract_compute)(ptr, cid.as_ptr(), style::ATOM, shape::SIZE_COLS)
            };
            if cols.is_null() {
                return Err(self.null_result(ptr, "per-atom compute", id));
            }
            let cols = unsafe { *(cols as *const c_int) };
            return Ok(QuantityDesc {
                dtype: DataType::Float64,
                width: if cols > 0 { cols as usize } else { 1 },
            });
        }
        if let Some(id) = name.strip_prefix("f_") {
            let cid = c_string(id)?;
            let cols = unsafe {
                (self.api().extract_fix)(ptr, cid.as_ptr(), style::ATOM, shape::SIZE_COLS, 0, 0)
            };
            if cols.is_null() {
                return Err(self.null_result(ptr, "per-atom fix", id));
            }
            let cols = unsafe { *(cols as *const c_int) };
            return Ok(QuantityDesc {
                dtype: DataType::Float64,
                width: if cols > 0 { cols as usize } else { 1 },
            });
        }

        let cname = c_string(name)?;
        let code = unsafe { (self.api().extract_atom_datatype)(ptr, cname.as_ptr()) };
        let Some((dtype, _)) = DataType::from_code(code) else {
            return Err(Error::NotFound {
                kind: "per-atom property",
                name: name.to_string(),
            });
        };
        let cols =
            unsafe { (self.api().extract_atom_size)(ptr, cname.as_ptr(), shape::SIZE_COLS) };
        Ok(QuantityDesc {
            dtype,
            width: if cols > 0 { cols as usize } else { 1 },
        })
    }

    /// Check every subset ID against `[1, natoms]` before the engine sees it.
    fn validate_subset(&self, ids: &[i32]) -> Result<()> {
        let natoms = self.natoms()?;
        for &id in ids {
            if id < 1 || i64::from(id) > natoms {
                return Err(Error::Validation(ValidationError::IdOutOfRange {
                    id,
                    natoms,
                }));
            }
        }
        Ok(())
    }

    fn checked_desc<T: Element>(&self, name: &str) -> Result<QuantityDesc> {
        let desc = self.per_atom_desc(name)?;
        if desc.dtype != T::DATA_TYPE {
            return Err(Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: desc.dtype,
            }));
        }
        Ok(desc)
    }

    /// Gather a per-atom quantity for all atoms, ascending-ID order.
    pub fn gather_atoms<T: Element>(&self, name: &str) -> Result<Gathered<T>> {
        let desc = self.checked_desc::<T>(name)?;
        let ptr = self.raw()?;
        let natoms = self.natoms()? as usize;
        let code = transfer_code(desc.dtype).ok_or_else(|| {
            Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: desc.dtype,
            })
        })?;

        let cname = c_string(name)?;
        let mut data = vec![T::default(); natoms * desc.width];
        unsafe {
            (self.api().gather)(
                ptr,
                cname.as_ptr(),
                code,
                desc.width as c_int,
                data.as_mut_ptr() as *mut c_void,
            )
        };
        self.check_error(ptr)?;
        Ok(Gathered {
            data,
            width: desc.width,
        })
    }

    /// Gather a per-atom quantity for the listed 1-based atom IDs, in the
    /// order listed.
    pub fn gather_atoms_subset<T: Element>(&self, name: &str, ids: &[i32]) -> Result<Gathered<T>> {
        let desc = self.checked_desc::<T>(name)?;
        self.validate_subset(ids)?;
        let ptr = self.raw()?;
        let code = transfer_code(desc.dtype).ok_or_else(|| {
            Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: desc.dtype,
            })
        })?;

        let cname = c_string(name)?;
        let mut data = vec![T::default(); ids.len() * desc.width];
        unsafe {
            (self.api().gather_subset)(
                ptr,
                cname.as_ptr(),
                code,
                desc.width as c_int,
                ids.len() as c_int,
                ids.as_ptr(),
                data.as_mut_ptr() as *mut c_void,
            )
        };
        self.check_error(ptr)?;
        Ok(Gathered {
            data,
            width: desc.width,
        })
    }

    /// Scatter a per-atom quantity to all atoms. `data` is atom-major in
    /// ascending-ID order and must hold `width * natoms` elements.
    pub fn scatter_atoms<T: Element>(&mut self, name: &str, data: &[T]) -> Result<()> {
        let desc = self.checked_desc::<T>(name)?;
        let natoms = self.natoms()? as usize;
        let expected = natoms * desc.width;
        if data.len() != expected {
            return Err(Error::Validation(ValidationError::LengthMismatch {
                name: name.to_string(),
                expected,
                actual: data.len(),
            }));
        }
        let ptr = self.raw()?;
        let code = transfer_code(desc.dtype).ok_or_else(|| {
            Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: desc.dtype,
            })
        })?;
        let cname = c_string(name)?;
        unsafe {
            (self.api().scatter)(
                ptr,
                cname.as_ptr(),
                code,
                desc.width as c_int,
                data.as_ptr() as *const c_void,
            )
        };
        self.check_error(ptr)
    }

    /// Scatter a per-atom quantity to the listed 1-based atom IDs only;
    /// unlisted atoms are untouched. `data` rows follow the ID list order.
    pub fn scatter_atoms_subset<T: Element>(
        &mut self,
        name: &str,
        ids: &[i32],
        data: &[T],
    ) -> Result<()> {
        let desc = self.checked_desc::<T>(name)?;
        self.validate_subset(ids)?;
        let expected = ids.len() * desc.width;
        if data.len() != expected {
            return Err(Error::Validation(ValidationError::LengthMismatch {
                name: name.to_string(),
                expected,
                actual: data.len(),
            }));
        }
        let ptr = self.raw()?;
        let code = transfer_code(desc.dtype).ok_or_else(|| {
            Error::Validation(ValidationError::TypeMismatch {
                name: name.to_string(),
                requested: T::DATA_TYPE,
                actual: desc.dtype,
            })
        })?;
        let cname = c_string(name)?;
        unsafe {
            (self.api().scatter_subset)(
                ptr,
                cname.as_ptr(),
                code,
                desc.width as c_int,
                ids.len() as c_int,
                ids.as_ptr(),
                data.as_ptr() as *const c_void,
            )
        };
        self.check_error(ptr)
    }
}
