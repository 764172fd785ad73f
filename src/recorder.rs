//! Recorder node.

use std::ffi::CString;
use std::ops::Deref;

use crate::context::Context;
use crate::ffi::{self, XnNodeHandle};
use crate::node::ProductionNode;
use crate::types::{CodecId, RecordMedium};
use crate::Result;

/// Node writing other nodes' frames to a recording.
pub struct Recorder {
    node: ProductionNode,
}

impl Recorder {
    pub fn create(context: &Context) -> Result<Recorder> {
        let mut handle = XnNodeHandle::invalid();
        ffi::check(unsafe {
            ffi::xnCreateRecorder(context.handle()?, std::ptr::null(), &mut handle)
        })?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            node: ProductionNode::from_native(handle)?,
        })
    }

    pub fn set_destination(&self, medium: RecordMedium, destination: &str) -> Result<()> {
        let destination = CString::new(destination).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnSetRecorderDestination(self.node.handle()?, medium as u32, destination.as_ptr())
        })
    }

    /// The configured destination path.
    pub fn destination(&self) -> Result<String> {
        let handle = self.node.handle()?;
        let mut medium: ffi::XnRecordMedium = ffi::XN_RECORD_MEDIUM_FILE;
        let mut buf = [0 as std::os::raw::c_char; 512];
        ffi::check(unsafe {
            ffi::xnGetRecorderDestination(handle, &mut medium, buf.as_mut_ptr(), buf.len() as u32)
        })?;
        Ok(ffi::types::fixed_to_string(&buf))
    }

    /// Capture `node`'s frames into the recording, compressed with
    /// `compression`.
    pub fn add_node(&self, node: &ProductionNode, compression: CodecId) -> Result<()> {
        ffi::check(unsafe {
            ffi::xnAddNodeToRecording(self.node.handle()?, node.handle()?, compression.0)
        })
    }

    pub fn remove_node(&self, node: &ProductionNode) -> Result<()> {
        ffi::check(unsafe { ffi::xnRemoveNodeFromRecording(self.node.handle()?, node.handle()?) })
    }

    /// Record one frame from every added node.
    pub fn record(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnRecord(self.node.handle()?) })
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for Recorder {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}
