//! Opaque object slot.
//!
//! Columns of the object storage type hold one pointer-width handle per row,
//! supplied and owned by a host runtime (a reference-counted or garbage
//! collected value in the host's memory model). This crate defines only the
//! slot shape and the reserved NA handle; retain/release of whatever the
//! handle refers to is the host's contract.

use colbuf_types::na::NA_OBJECT;

/// An opaque, host-managed object handle occupying one 8-byte slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectHandle(pub u64);

impl ObjectHandle {
    /// The reserved handle value denoting NA.
    pub const NA: ObjectHandle = ObjectHandle(NA_OBJECT);

    /// Returns `true` if this is the reserved NA handle.
    #[inline]
    pub fn is_na(&self) -> bool {
        self.0 == NA_OBJECT
    }

    /// Wraps a raw host handle, mapping the reserved value to NA.
    #[inline]
    pub fn from_raw(raw: u64) -> ObjectHandle {
        ObjectHandle(raw)
    }

    /// Returns the raw handle value for the host runtime.
    #[inline]
    pub fn into_raw(self) -> u64 {
        self.0
    }
}
