//! Enumeration filters.

use std::ffi::CString;

use crate::ffi;
use crate::resource::Owned;
use crate::types::{MapOutputMode, Version};
use crate::Result;

fn release_query(handle: ffi::XnQueryHandle) {
    unsafe { ffi::xnNodeQueryFree(handle) }
}

/// Filter applied when enumerating candidate production trees.
pub struct Query {
    owned: Owned<ffi::XnQueryHandle>,
}

impl Query {
    pub fn new() -> Result<Query> {
        let mut handle = ffi::XnQueryHandle::invalid();
        ffi::check(unsafe { ffi::xnNodeQueryAllocate(&mut handle) })?;
        Ok(Query {
            owned: Owned::open(handle, release_query)?,
        })
    }

    pub(crate) fn handle(&self) -> Result<ffi::XnQueryHandle> {
        self.owned.get()
    }

    pub fn set_vendor(&self, vendor: &str) -> Result<()> {
        let vendor = CString::new(vendor).unwrap_or_default();
        ffi::check(unsafe { ffi::xnNodeQuerySetVendor(self.owned.get()?, vendor.as_ptr()) })
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        let name = CString::new(name).unwrap_or_default();
        ffi::check(unsafe { ffi::xnNodeQuerySetName(self.owned.get()?, name.as_ptr()) })
    }

    pub fn set_min_version(&self, version: Version) -> Result<()> {
        ffi::check(unsafe { ffi::xnNodeQuerySetMinVersion(self.owned.get()?, &version) })
    }

    pub fn add_supported_capability(&self, capability: &str) -> Result<()> {
        let capability = CString::new(capability).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnNodeQueryAddSupportedCapability(self.owned.get()?, capability.as_ptr())
        })
    }

    pub fn add_supported_map_output_mode(&self, mode: MapOutputMode) -> Result<()> {
        ffi::check(unsafe {
            ffi::xnNodeQueryAddSupportedMapOutputMode(self.owned.get()?, &mode)
        })
    }

    /// Idempotent; frees the native query on the first call.
    pub fn close(&mut self) {
        self.owned.close();
    }
}
