//! Codec node.

use std::ffi::c_void;
use std::ops::Deref;

use crate::context::Context;
use crate::ffi::{self, XnNodeHandle};
use crate::node::ProductionNode;
use crate::types::CodecId;
use crate::Result;

/// Node encoding and decoding frame data, used by recordings.
pub struct Codec {
    node: ProductionNode,
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}

impl Codec {
    /// Create a codec of `codec_id`, initialized from `initializer`'s
    /// format.
    pub fn create(
        context: &Context,
        codec_id: CodecId,
        initializer: &ProductionNode,
    ) -> Result<Codec> {
        let mut handle = XnNodeHandle::invalid();
        ffi::check(unsafe {
            ffi::xnCreateCodec(context.handle()?, codec_id.0, initializer.handle()?, &mut handle)
        })?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            node: ProductionNode::from_native(handle)?,
        })
    }

    pub fn codec_id(&self) -> Result<CodecId> {
        Ok(CodecId(unsafe { ffi::xnGetCodecID(self.node.handle()?) }))
    }

    /// Encode `src` into `dst`, returning the number of bytes written.
    pub fn encode(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let handle = self.node.handle()?;
        let mut written = 0u32;
        ffi::check(unsafe {
            ffi::xnEncodeData(
                handle,
                src.as_ptr() as *const c_void,
                src.len() as u32,
                dst.as_mut_ptr() as *mut c_void,
                dst.len() as u32,
                &mut written,
            )
        })?;
        Ok(written as usize)
    }

    /// Decode `src` into `dst`, returning the number of bytes written.
    pub fn decode(&self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let handle = self.node.handle()?;
        let mut written = 0u32;
        ffi::check(unsafe {
            ffi::xnDecodeData(
                handle,
                src.as_ptr() as *const c_void,
                src.len() as u32,
                dst.as_mut_ptr() as *mut c_void,
                dst.len() as u32,
                &mut written,
            )
        })?;
        Ok(written as usize)
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for Codec {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}
