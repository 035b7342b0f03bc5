//! The engine instance handle.
//!
//! [`Instance`] owns one live engine instance behind the raw ABI table.
//! Every operation starts with a liveness check: a closed handle fails with
//! [`Error::Closed`] before the engine is reached, never by dereferencing a
//! dead pointer. Closing is explicit and idempotent; dropping closes.
//!
//! # Threading
//!
//! The engine is not assumed internally thread-safe, so `Instance` is
//! neither `Send` nor `Sync` (it holds a raw pointer). One logical thread of
//! control per instance; external synchronization is the caller's problem if
//! a handle must migrate.
//!
//! # View lifetimes
//!
//! Views returned by the extraction modules borrow the `Instance`, which
//! stops concurrent mutation through the binding, but the engine may still
//! reallocate per-atom storage on any atom-count-changing command. A view
//! held across such a command is stale. That hazard is documented, not
//! enforced.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;

use log::debug;

use lammkit_sys::{library, EnginePtr, RawApi};

use crate::error::{EngineError, Error, Result, Severity, ValidationError};

/// Upper bound on engine error message length, matching the engine's own
/// internal buffer.
const ERROR_BUF_LEN: usize = 1024;

/// Convert a Rust string for the C boundary, rejecting interior NULs.
pub(crate) fn c_string(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| {
        Error::Validation(ValidationError::InteriorNul {
            text: text.to_string(),
        })
    })
}

/// A handle to one live engine instance.
pub struct Instance {
    api: RawApi,
    ptr: Option<NonNull<std::os::raw::c_void>>,
}

impl Instance {
    /// Create an engine instance through the process-wide loaded library.
    ///
    /// `args` are the engine's command-line style arguments (the program
    /// name is supplied automatically). Loads the library on first use; see
    /// [`lammkit_sys::set_library_path`].
    pub fn open(args: &[&str]) -> Result<Self> {
        let loaded = library().map_err(|e| {
            Error::Engine(EngineError {
                message: e.to_string(),
                severity: Severity::Fatal,
            })
        })?;
        Self::open_with_api(*loaded.api(), args)
    }

    /// Create an engine instance through an explicitly provided ABI table.
    ///
    /// This is the seam for alternative library loading schemes and for the
    /// in-process mock engine used in tests.
    pub fn open_with_api(api: RawApi, args: &[&str]) -> Result<Self> {
        let mut argv_owned = Vec::with_capacity(args.len() + 1);
        argv_owned.push(c_string("lammkit")?);
        for arg in args {
            argv_owned.push(c_string(arg)?);
        }
        let mut argv: Vec<*mut c_char> = argv_owned
            .iter()
            .map(|s| s.as_ptr() as *mut c_char)
            .collect();

        let raw = unsafe { (api.open)(argv.len() as c_int, argv.as_mut_ptr()) };
        match NonNull::new(raw) {
            Some(ptr) => Ok(Self {
                api,
                ptr: Some(ptr),
            }),
            None => Err(Error::Engine(EngineError {
                message: "engine instance creation failed".to_string(),
                severity: Severity::Fatal,
            })),
        }
    }

    /// Whether the handle still refers to a live engine instance.
    pub fn is_valid(&self) -> bool {
        self.ptr.is_some()
    }

    /// Close the instance, releasing the engine side.
    ///
    /// Safe to call more than once; every operation after the first close
    /// fails with [`Error::Closed`]. There is no reopen.
    pub fn close(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            debug!("closing engine instance");
            unsafe { (self.api.close)(ptr.as_ptr()) };
        }
    }

    /// Engine version as a date-coded integer.
    pub fn version(&self) -> Result<i32> {
        let ptr = self.raw()?;
        Ok(unsafe { (self.api.version)(ptr) })
    }

    /// Total atom count across all processors.
    pub fn natoms(&self) -> Result<i64> {
        let ptr = self.raw()?;
        Ok(unsafe { (self.api.get_natoms)(ptr) } as i64)
    }

    /// Execute one command string.
    pub fn command(&mut self, cmd: &str) -> Result<()> {
        let ptr = self.raw()?;
        let c = c_string(cmd)?;
        debug!("command: {cmd}");
        unsafe { (self.api.command)(ptr, c.as_ptr()) };
        self.check_error(ptr)
    }

    /// Execute a sequence of command strings in order.
    ///
    /// Stops at the engine's first reported error; commands already executed
    /// stay executed (no rollback — retries are a caller concern).
    pub fn commands<I, S>(&mut self, cmds: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ptr = self.raw()?;
        let owned: Vec<CString> = cmds
            .into_iter()
            .map(|c| c_string(c.as_ref()))
            .collect::<Result<_>>()?;
        let argv: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
        unsafe { (self.api.commands_list)(ptr, argv.len() as c_int, argv.as_ptr()) };
        self.check_error(ptr)
    }

    // ── crate-internal plumbing ──────────────────────────────────────────

    /// The raw engine pointer, or [`Error::Closed`].
    pub(crate) fn raw(&self) -> Result<EnginePtr> {
        self.ptr.map(|p| p.as_ptr()).ok_or(Error::Closed)
    }

    pub(crate) fn api(&self) -> &RawApi {
        &self.api
    }

    /// Drain the engine's error flag if set, turning it into an
    /// [`EngineError`]. The flag is always left clear.
    pub(crate) fn check_error(&self, ptr: EnginePtr) -> Result<()> {
        if unsafe { (self.api.has_error)(ptr) } == 0 {
            return Ok(());
        }
        Err(Error::Engine(self.drain_error(ptr)))
    }

    /// Unconditionally pull the pending message (empty flag yields an empty
    /// recoverable error; callers only invoke this after `has_error`).
    pub(crate) fn drain_error(&self, ptr: EnginePtr) -> EngineError {
        let mut buf = [0u8; ERROR_BUF_LEN];
        let severity = unsafe {
            (self.api.get_last_error_message)(ptr, buf.as_mut_ptr().cast(), buf.len() as c_int)
        };
        let message = CStr::from_bytes_until_nul(&buf)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        EngineError {
            message,
            severity: Severity::from_code(severity),
        }
    }

    /// For a null return from an extract entry point: prefer the engine's
    /// own explanation if the flag is set, otherwise report a lookup miss.
    pub(crate) fn null_result(&self, ptr: EnginePtr, kind: &'static str, name: &str) -> Error {
        if unsafe { (self.api.has_error)(ptr) } != 0 {
            Error::Engine(self.drain_error(ptr))
        } else {
            Error::NotFound {
                kind,
                name: name.to_string(),
            }
        }
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_string_rejects_interior_nul() {
        let e = c_string("run\0 0").unwrap_err();
        assert!(matches!(
            e,
            Error::Validation(ValidationError::InteriorNul { .. })
        ));
    }

    #[test]
    fn c_string_passes_plain_text() {
        assert_eq!(c_string("run 0").unwrap().to_bytes(), b"run 0");
    }
}
