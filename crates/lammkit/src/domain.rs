//! Simulation box accessors.
//!
//! One read call returns the whole box description; the companion writer
//! replaces bounds and tilt factors in a single engine call, so from the
//! caller's perspective the change is all-or-nothing: either a later read
//! reflects every new field or the call failed before any was applied.

use std::os::raw::{c_double, c_int};

use crate::error::{Error, Result, ValidationError};
use crate::instance::Instance;

/// Snapshot of the simulation box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxInfo {
    /// Lower bounds per dimension.
    pub lo: [f64; 3],
    /// Upper bounds per dimension.
    pub hi: [f64; 3],
    /// Tilt factors `(xy, yz, xz)`.
    pub tilt: [f64; 3],
    /// Periodicity flags per dimension.
    pub periodicity: [bool; 3],
    /// Whether the box changes during the run (e.g. under a barostat).
    pub box_change: bool,
}

impl Instance {
    /// Read the current box bounds, tilt factors, and flags.
    pub fn extract_box(&self) -> Result<BoxInfo> {
        let ptr = self.raw()?;
        let mut lo = [0f64; 3];
        let mut hi = [0f64; 3];
        let (mut xy, mut yz, mut xz) = (0f64, 0f64, 0f64);
        let mut periodicity = [0 as c_int; 3];
        let mut box_change: c_int = 0;
        unsafe {
            (self.api().extract_box)(
                ptr,
                lo.as_mut_ptr(),
                hi.as_mut_ptr(),
                &mut xy,
                &mut yz,
                &mut xz,
                periodicity.as_mut_ptr(),
                &mut box_change,
            )
        };
        self.check_error(ptr)?;
        Ok(BoxInfo {
            lo,
            hi,
            tilt: [xy, yz, xz],
            periodicity: periodicity.map(|p| p != 0),
            box_change: box_change != 0,
        })
    }

    /// Replace the box bounds and tilt factors `(xy, yz, xz)`.
    ///
    /// Bounds are validated (`lo < hi` per dimension) before the engine is
    /// called; the engine may still reject the geometry, in which case
    /// nothing was applied.
    pub fn reset_box(&mut self, lo: [f64; 3], hi: [f64; 3], tilt: [f64; 3]) -> Result<()> {
        for d in 0..3 {
            if !(lo[d] < hi[d]) {
                return Err(Error::Validation(ValidationError::InvalidBoxBounds {
                    dimension: d,
                    lo: lo[d],
                    hi: hi[d],
                }));
            }
        }
        let ptr = self.raw()?;
        let mut lo: [c_double; 3] = lo;
        let mut hi: [c_double; 3] = hi;
        unsafe {
            (self.api().reset_box)(
                ptr,
                lo.as_mut_ptr(),
                hi.as_mut_ptr(),
                tilt[0],
                tilt[1],
                tilt[2],
            )
        };
        self.check_error(ptr)
    }
}
