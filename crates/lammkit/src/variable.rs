//! User-defined variable accessors.
//!
//! Dispatch is on the variable's declared kind, reported by the engine at
//! call time. Equal- and atom-style evaluations are engine-allocated; the
//! binding copies them out and releases the allocation through the ABI
//! `free` entry, so no engine memory leaks past a call. Vector-style results
//! are engine-owned views; string-style results are copied.

use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int};
use std::ptr;

use lammkit_sys::codes::var;
use lammkit_sys::SIZE_VECTOR_GROUP;

use crate::error::{Error, Result, ValidationError};
use crate::instance::{c_string, Instance};

/// The evaluated value of a user-defined variable.
#[derive(Debug)]
pub enum Variable<'a> {
    /// Equal-style: one number.
    Equal(f64),
    /// String-style: text.
    Str(String),
    /// Atom-style: one value per local atom, zero-filled for atoms outside
    /// the group filter when one was given.
    Atom(Vec<f64>),
    /// Vector-style: engine-managed numeric view, valid until the variable
    /// is next recomputed.
    Vector(&'a [f64]),
}

impl Variable<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Equal(_) => "an equal-style variable",
            Self::Str(_) => "a string-style variable",
            Self::Atom(_) => "an atom-style variable",
            Self::Vector(_) => "a vector-style variable",
        }
    }

    fn wrong_kind(&self, name: &str, expected: &'static str) -> Error {
        Error::Validation(ValidationError::ShapeMismatch {
            name: name.to_string(),
            expected,
            actual: self.kind_name().to_string(),
        })
    }

    /// The equal-style number, or a descriptive error for other kinds.
    pub fn equal(&self, name: &str) -> Result<f64> {
        match self {
            Self::Equal(v) => Ok(*v),
            other => Err(other.wrong_kind(name, "an equal-style variable")),
        }
    }

    /// The string-style text, or a descriptive error for other kinds.
    pub fn string(&self, name: &str) -> Result<&str> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(other.wrong_kind(name, "a string-style variable")),
        }
    }

    /// The atom-style per-atom values, or a descriptive error.
    pub fn atom(&self, name: &str) -> Result<&[f64]> {
        match self {
            Self::Atom(v) => Ok(v),
            other => Err(other.wrong_kind(name, "an atom-style variable")),
        }
    }

    /// The vector-style view, or a descriptive error.
    pub fn vector(&self, name: &str) -> Result<&[f64]> {
        match self {
            Self::Vector(v) => Ok(v),
            other => Err(other.wrong_kind(name, "a vector-style variable")),
        }
    }
}

impl Instance {
    /// Evaluate a user-defined variable by name.
    ///
    /// `group` restricts atom-style evaluation to a named group (values for
    /// atoms outside it are zero); it is ignored for the other kinds, which
    /// the engine evaluates globally.
    pub fn extract_variable(&self, name: &str, group: Option<&str>) -> Result<Variable<'_>> {
        let ptr = self.raw()?;
        let cname = c_string(name)?;
        let kind = unsafe { (self.api().extract_variable_datatype)(ptr, cname.as_ptr()) };
        if kind < 0 {
            return Err(Error::NotFound {
                kind: "variable",
                name: name.to_string(),
            });
        }

        match kind {
            var::EQUAL => {
                let data =
                    unsafe { (self.api().extract_variable)(ptr, cname.as_ptr(), ptr::null()) };
                if data.is_null() {
                    return Err(self.null_result(ptr, "variable", name));
                }
                let value = unsafe { *(data as *const c_double) };
                unsafe { (self.api().free)(ptr, data) };
                Ok(Variable::Equal(value))
            }
            var::STRING => {
                let data =
                    unsafe { (self.api().extract_variable)(ptr, cname.as_ptr(), ptr::null()) };
                if data.is_null() {
                    return Err(self.null_result(ptr, "variable", name));
                }
                let text = unsafe { CStr::from_ptr(data as *const c_char) }
                    .to_string_lossy()
                    .into_owned();
                Ok(Variable::Str(text))
            }
            var::ATOM => {
                // An atom-style evaluation always spans the local atoms.
                let len = self.extract_setting("nlocal")? as usize;
                let cgroup = group.map(c_string).transpose()?;
                let group_ptr = cgroup.as_ref().map_or(ptr::null(), |g| g.as_ptr());
                let data =
                    unsafe { (self.api().extract_variable)(ptr, cname.as_ptr(), group_ptr) };
                if data.is_null() {
                    return Err(self.null_result(ptr, "variable", name));
                }
                let values =
                    unsafe { std::slice::from_raw_parts(data as *const c_double, len) }.to_vec();
                unsafe { (self.api().free)(ptr, data) };
                Ok(Variable::Atom(values))
            }
            var::VECTOR => {
                // Length comes back through the size-query group string as
                // an engine-allocated int.
                let size_group = c_string(SIZE_VECTOR_GROUP)?;
                let size_ptr = unsafe {
                    (self.api().extract_variable)(ptr, cname.as_ptr(), size_group.as_ptr())
                };
                if size_ptr.is_null() {
                    return Err(self.null_result(ptr, "variable", name));
                }
                let len = unsafe { *(size_ptr as *const c_int) };
                unsafe { (self.api().free)(ptr, size_ptr) };
                let data =
                    unsafe { (self.api().extract_variable)(ptr, cname.as_ptr(), ptr::null()) };
                if data.is_null() {
                    return Err(self.null_result(ptr, "variable", name));
                }
                let view = unsafe {
                    std::slice::from_raw_parts(data as *const c_double, len.max(0) as usize)
                };
                Ok(Variable::Vector(view))
            }
            other => Err(Error::Validation(ValidationError::ShapeMismatch {
                name: name.to_string(),
                expected: "a known variable kind",
                actual: format!("kind code {other}"),
            })),
        }
    }
}
