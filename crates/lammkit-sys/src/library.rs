//! Process-wide engine library location and one-shot loading.
//!
//! The engine shared library is loaded at most once per process. The search
//! path is a single mutable configuration cell: set it before the first call
//! that needs the engine. Setting it again after the library has loaded is
//! ineffective until the process restarts and is reported with a warning
//! rather than silently ignored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use dlopen::symbor::Library;
use log::warn;

use crate::api::RawApi;

/// Platform-default file name of the engine shared library.
#[cfg(target_os = "windows")]
pub const DEFAULT_LIBRARY: &str = "liblammps.dll";
/// Platform-default file name of the engine shared library.
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY: &str = "liblammps.dylib";
/// Platform-default file name of the engine shared library.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_LIBRARY: &str = "liblammps.so";

/// A resolved entry-point table together with the library that backs it.
///
/// The [`Library`] member is never dropped for the life of the process (the
/// instance lives in a `OnceLock`), which is what keeps the raw function
/// pointers in [`RawApi`] valid.
pub struct LoadedApi {
    _lib: Library,
    api: RawApi,
}

impl LoadedApi {
    /// The resolved entry-point table.
    pub fn api(&self) -> &RawApi {
        &self.api
    }
}

/// Failure to locate or load the engine library.
#[derive(Clone, Debug)]
pub struct LoadError {
    path: PathBuf,
    message: String,
}

impl LoadError {
    /// Path that was attempted.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to load engine library from '{}': {}",
            self.path.display(),
            self.message
        )
    }
}

impl std::error::Error for LoadError {}

static LIBRARY_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);
static LIBRARY: OnceLock<Result<LoadedApi, LoadError>> = OnceLock::new();

/// Set the path the engine library will be loaded from.
///
/// Only effective before the first [`library`] call. Afterwards the loaded
/// library cannot be replaced within this process; a redundant set is
/// recorded with a `warn!` and otherwise ignored.
pub fn set_library_path(path: impl Into<PathBuf>) {
    let path = path.into();
    if LIBRARY.get().is_some() {
        warn!(
            "engine library already loaded; set_library_path('{}') has no \
             effect until the process restarts",
            path.display()
        );
        return;
    }
    *LIBRARY_PATH.lock().unwrap_or_else(|e| e.into_inner()) = Some(path);
}

/// The currently configured library path, if any was set.
pub fn library_path() -> Option<PathBuf> {
    LIBRARY_PATH
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Load the engine library (once) and return its entry-point table.
///
/// Uses the configured path, falling back to [`DEFAULT_LIBRARY`] resolved
/// through the platform loader's search rules. The first call decides the
/// outcome for the rest of the process; later calls return the same table or
/// the same error.
pub fn library() -> Result<&'static LoadedApi, &'static LoadError> {
    LIBRARY
        .get_or_init(|| {
            let path = library_path().unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY));
            let lib = Library::open(&path).map_err(|e| LoadError {
                path: path.clone(),
                message: e.to_string(),
            })?;
            let api = RawApi::load(&lib).map_err(|e| LoadError {
                path: path.clone(),
                message: format!("missing entry point: {e}"),
            })?;
            Ok(LoadedApi { _lib: lib, api })
        })
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_cell_round_trip() {
        // Loading is deliberately not exercised here: the engine library is
        // not present in CI. Only the configuration cell is observable.
        let _ = env_logger::builder().is_test(true).try_init();
        set_library_path("/opt/engine/lib/liblammps.so");
        assert_eq!(
            library_path(),
            Some(PathBuf::from("/opt/engine/lib/liblammps.so"))
        );
        set_library_path("/other/liblammps.so");
        assert_eq!(library_path(), Some(PathBuf::from("/other/liblammps.so")));
    }
}
