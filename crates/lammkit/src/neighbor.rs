//! Lazy, index-based iteration over a pair style's neighbor lists.
//!
//! Nothing is copied: each entry resolves on demand into the engine's own
//! neighbor index storage. The engine numbers atoms 0-based internally; the
//! public view presents 1-based indices on both the outer atom and the inner
//! neighbor indices, translated exactly once at the boundary.
//!
//! Validity ends at the next neighbor-list rebuild (the next `run`-class
//! command). Holding a [`Neighbors`] view across a rebuild reads stale
//! engine memory; that hazard is documented, not enforced.

use std::marker::PhantomData;
use std::os::raw::c_int;

use crate::error::{Error, Result};
use crate::instance::{c_string, Instance};

/// Handle to one pair style's neighbor list.
pub struct NeighborList<'a> {
    instance: &'a Instance,
    index: c_int,
    len: usize,
}

impl std::fmt::Debug for NeighborList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeighborList")
            .field("index", &self.index)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<'a> NeighborList<'a> {
    /// Number of entries (local atoms covered by this list).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list covers zero atoms.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve one entry: the covered atom (1-based) and its neighbors.
    ///
    /// Returns `None` when `element` is out of range.
    pub fn get(&self, element: usize) -> Option<(i32, Neighbors<'a>)> {
        if element >= self.len {
            return None;
        }
        let ptr = self.instance.raw().ok()?;
        let mut atom: c_int = -1;
        let mut count: c_int = 0;
        let mut neighbors: *mut c_int = std::ptr::null_mut();
        let rc = unsafe {
            (self.instance.api().neighlist_element_neighbors)(
                ptr,
                self.index,
                element as c_int,
                &mut atom,
                &mut count,
                &mut neighbors,
            )
        };
        if rc < 0 || atom < 0 || neighbors.is_null() {
            return None;
        }
        let idxs = unsafe { std::slice::from_raw_parts(neighbors, count.max(0) as usize) };
        Some((
            atom + 1,
            Neighbors {
                idxs,
                _marker: PhantomData,
            },
        ))
    }

    /// Iterate over all entries in engine order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, Neighbors<'a>)> + '_ {
        (0..self.len).filter_map(move |e| self.get(e))
    }
}

/// Non-owning view over one atom's neighbor indices.
///
/// Indices are 1-based in the public API; the translation from the engine's
/// 0-based storage happens lazily on access, so the underlying memory is
/// never copied or rewritten.
#[derive(Clone, Copy)]
pub struct Neighbors<'a> {
    idxs: &'a [c_int],
    _marker: PhantomData<&'a Instance>,
}

impl Neighbors<'_> {
    /// Number of neighbors.
    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    /// Whether the atom has no neighbors.
    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }

    /// The i-th neighbor's 1-based atom index, or `None` out of range.
    pub fn get(&self, i: usize) -> Option<i32> {
        self.idxs.get(i).map(|&n| n + 1)
    }

    /// Iterate over 1-based neighbor indices.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.idxs.iter().map(|&n| n + 1)
    }

    /// Collect the 1-based neighbor indices into a vector.
    pub fn to_vec(&self) -> Vec<i32> {
        self.iter().collect()
    }
}

impl std::fmt::Debug for Neighbors<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neighbors").field("len", &self.len()).finish()
    }
}

impl Instance {
    /// The neighbor list built for a pair style, by style name.
    ///
    /// An unknown or inactive pair style is a lookup miss
    /// ([`Error::NotFound`]), distinct from engine-reported errors: the
    /// engine's error flag is not involved in the search.
    pub fn neighbor_list(&self, pair_style: &str) -> Result<NeighborList<'_>> {
        let ptr = self.raw()?;
        let cname = c_string(pair_style)?;
        // exact match, first sub-style, default request
        let index =
            unsafe { (self.api().find_pair_neighlist)(ptr, cname.as_ptr(), 1, 0, 0) };
        if index < 0 {
            return Err(Error::NotFound {
                kind: "pair style",
                name: pair_style.to_string(),
            });
        }
        let len = unsafe { (self.api().neighlist_num_elements)(ptr, index) };
        Ok(NeighborList {
            instance: self,
            index,
            len: len.max(0) as usize,
        })
    }
}
