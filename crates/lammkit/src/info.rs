//! Name-category listings and group membership.

use std::os::raw::c_char;

use crate::error::{Error, Result};
use crate::instance::{c_string, Instance};

/// Maximum length of a single defined name, matching the engine's buffer.
const NAME_BUF_LEN: usize = 256;

impl Instance {
    /// All defined names in a category ("group", "compute", "fix",
    /// "variable", "dump", "region", ...), in engine definition order.
    ///
    /// An unknown category is a lookup miss.
    pub fn id_names(&self, category: &str) -> Result<Vec<String>> {
        let ptr = self.raw()?;
        let ccat = c_string(category)?;
        let count = unsafe { (self.api().id_count)(ptr, ccat.as_ptr()) };
        if count < 0 {
            return Err(Error::NotFound {
                kind: "name category",
                name: category.to_string(),
            });
        }
        let mut names = Vec::with_capacity(count as usize);
        for i in 0..count {
            let mut buf = [0u8; NAME_BUF_LEN];
            let ok = unsafe {
                (self.api().id_name)(
                    ptr,
                    ccat.as_ptr(),
                    i,
                    buf.as_mut_ptr() as *mut c_char,
                    buf.len() as i32,
                )
            };
            if ok != 1 {
                continue;
            }
            let name = std::ffi::CStr::from_bytes_until_nul(&buf)
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            names.push(name);
        }
        Ok(names)
    }

    /// The 1-based IDs of all atoms in a named group, ascending.
    ///
    /// Group membership is carried in the per-atom mask bitfield: group
    /// number `g` (by definition order) owns bit `1 << g`.
    pub fn group_atom_ids(&self, group: &str) -> Result<Vec<i32>> {
        let groups = self.id_names("group")?;
        let Some(index) = groups.iter().position(|g| g == group) else {
            return Err(Error::NotFound {
                kind: "group",
                name: group.to_string(),
            });
        };
        let bit = 1i32 << index;

        let ids = self.gather_atoms::<i32>("id")?;
        let masks = self.gather_atoms::<i32>("mask")?;
        let mut members: Vec<i32> = ids
            .as_slice()
            .iter()
            .zip(masks.as_slice())
            .filter(|(_, &mask)| mask & bit != 0)
            .map(|(&id, _)| id)
            .collect();
        members.sort_unstable();
        Ok(members)
    }
}
