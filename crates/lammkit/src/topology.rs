//! Read-only bulk export of connectivity tables.
//!
//! Each row is the interaction type followed by 1-based atom IDs, in the
//! engine's internal storage order (no sort is guaranteed). Counts come from
//! the engine's topology globals; missing topology arrays (wrong atom style)
//! surface as engine errors from the bulk call.

use std::os::raw::c_void;

use lammkit_sys::EnginePtr;

use crate::error::Result;
use crate::extract::GlobalView;
use crate::instance::Instance;

impl Instance {
    fn topology_count(&self, global: &str) -> Result<usize> {
        let count: i64 = match self.extract_global::<i64>(global)? {
            GlobalView::Scalar(v) => v,
            GlobalView::Vector(v) => v.first().copied().unwrap_or(0),
        };
        Ok(count.max(0) as usize)
    }

    fn gather_topology<const N: usize>(
        &self,
        global: &str,
        gather: unsafe extern "C" fn(EnginePtr, *mut c_void),
    ) -> Result<Vec<[i32; N]>> {
        let ptr = self.raw()?;
        let count = self.topology_count(global)?;
        let mut rows = vec![[0i32; N]; count];
        unsafe { gather(ptr, rows.as_mut_ptr() as *mut c_void) };
        self.check_error(ptr)?;
        Ok(rows)
    }

    /// All bonds as `[type, atom1, atom2]` rows.
    pub fn gather_bonds(&self) -> Result<Vec<[i32; 3]>> {
        self.gather_topology("nbonds", self.api().gather_bonds)
    }

    /// All angles as `[type, atom1, atom2, atom3]` rows.
    pub fn gather_angles(&self) -> Result<Vec<[i32; 4]>> {
        self.gather_topology("nangles", self.api().gather_angles)
    }

    /// All dihedrals as `[type, atom1, atom2, atom3, atom4]` rows.
    pub fn gather_dihedrals(&self) -> Result<Vec<[i32; 5]>> {
        self.gather_topology("ndihedrals", self.api().gather_dihedrals)
    }

    /// All impropers as `[type, atom1, atom2, atom3, atom4]` rows.
    pub fn gather_impropers(&self) -> Result<Vec<[i32; 5]>> {
        self.gather_topology("nimpropers", self.api().gather_impropers)
    }
}
