//! Node descriptors.

use std::ffi::CStr;

use crate::error::OpenNiError;
use crate::ffi;
use crate::types::NodeDescription;
use crate::Result;

/// Borrowed descriptor of one existing or instantiable node. The native
/// object is owned by the list (or node) it came from; this wrapper never
/// frees it.
pub struct NodeInfo {
    handle: ffi::XnNodeInfoHandle,
}

impl NodeInfo {
    pub(crate) fn from_native(handle: ffi::XnNodeInfoHandle) -> Result<Self> {
        if !handle.is_valid() {
            return Err(OpenNiError::InvalidHandle);
        }
        Ok(Self { handle })
    }

    pub(crate) fn handle(&self) -> ffi::XnNodeInfoHandle {
        self.handle
    }

    /// Identity of the implementation behind this descriptor.
    pub fn description(&self) -> Result<NodeDescription> {
        let ptr = unsafe { ffi::xnNodeInfoGetDescription(self.handle) };
        if ptr.is_null() {
            return Err(OpenNiError::InvalidHandle);
        }
        Ok(NodeDescription::from_native(unsafe { *ptr }))
    }

    /// Instance name of the node this descriptor refers to; empty for a
    /// candidate that has not been instantiated.
    pub fn instance_name(&self) -> String {
        let ptr = unsafe { ffi::xnNodeInfoGetInstanceName(self.handle) };
        if ptr.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
        }
    }

    /// Opaque creation information (e.g. a device path).
    pub fn creation_info(&self) -> String {
        let ptr = unsafe { ffi::xnNodeInfoGetCreationInfo(self.handle) };
        if ptr.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
        }
    }
}
