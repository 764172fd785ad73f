//! Player node.

use std::ffi::{c_void, CString};
use std::ops::Deref;

use crate::context::Context;
use crate::event::StateChangedEvent;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::node::ProductionNode;
use crate::types::{RecordMedium, SeekOrigin};
use crate::Result;

fn register_eof(
    node: XnNodeHandle,
    handler: ffi::XnStateChangedHandler,
    cookie: *mut c_void,
    callback: *mut XnCallbackHandle,
) -> ffi::XnStatus {
    unsafe { ffi::xnRegisterToEndOfFileReached(node, handler, cookie, callback) }
}

fn unregister_eof(node: XnNodeHandle, callback: XnCallbackHandle) {
    unsafe { ffi::xnUnregisterFromEndOfFileReached(node, callback) }
}

/// Node replaying a recording into the node graph.
pub struct Player {
    eof_reached: StateChangedEvent,
    node: ProductionNode,
}

impl Player {
    pub fn create(context: &Context) -> Result<Player> {
        let mut handle = XnNodeHandle::invalid();
        ffi::check(unsafe {
            ffi::xnCreatePlayer(context.handle()?, std::ptr::null(), &mut handle)
        })?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let node = ProductionNode::from_native(handle)?;
        Ok(Self {
            eof_reached: StateChangedEvent::new(handle, register_eof, unregister_eof),
            node,
        })
    }

    pub fn set_source(&self, medium: RecordMedium, source: &str) -> Result<()> {
        let source = CString::new(source).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnSetPlayerSource(self.node.handle()?, medium as u32, source.as_ptr())
        })
    }

    /// Whether playback restarts from the beginning at the end of the
    /// recording.
    pub fn set_repeat(&self, repeat: bool) -> Result<()> {
        let value = if repeat { ffi::XN_TRUE } else { ffi::XN_FALSE };
        ffi::check(unsafe { ffi::xnSetPlayerRepeat(self.node.handle()?, value) })
    }

    /// Advance playback by one recorded frame.
    pub fn read_next(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnPlayerReadNext(self.node.handle()?) })
    }

    pub fn seek_to_frame(&self, node_name: &str, offset: i64, origin: SeekOrigin) -> Result<()> {
        let node_name = CString::new(node_name).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnSeekPlayerToFrame(self.node.handle()?, node_name.as_ptr(), offset, origin as u32)
        })
    }

    pub fn tell_frame(&self, node_name: &str) -> Result<u32> {
        let node_name = CString::new(node_name).unwrap_or_default();
        let mut frame = 0u32;
        ffi::check(unsafe {
            ffi::xnTellPlayerFrame(self.node.handle()?, node_name.as_ptr(), &mut frame)
        })?;
        Ok(frame)
    }

    pub fn is_at_eof(&self) -> Result<bool> {
        Ok(unsafe { ffi::xnIsPlayerAtEOF(self.node.handle()?) } != ffi::XN_FALSE)
    }

    /// Fires when playback reaches the end of the recording.
    pub fn eof_reached(&self) -> &StateChangedEvent {
        &self.eof_reached
    }

    pub fn close(&mut self) {
        self.eof_reached.teardown();
        self.node.close();
    }
}

impl Deref for Player {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}
