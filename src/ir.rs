//! Infrared generator.

use std::ops::Deref;

use crate::context::Context;
use crate::ffi::{self, XnNodeHandle};
use crate::generator::MapGenerator;
use crate::metadata::IrMetaData;
use crate::types::NodeType;
use crate::Result;

/// Generator producing raw infrared frames.
pub struct IrGenerator {
    map: MapGenerator,
}

impl IrGenerator {
    pub fn create(context: &Context) -> Result<IrGenerator> {
        let handle = context.create_any_node_handle(NodeType::Ir, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            map: MapGenerator::from_native(handle)?,
        })
    }

    /// Refresh `md` in place from the current frame.
    pub fn metadata(&self, md: &mut IrMetaData) -> Result<()> {
        let handle = self.map.handle()?;
        let mut staged = md.marshal(true);
        unsafe { ffi::xnGetIRMetaData(handle, staged.as_mut_ptr()) };
        Ok(())
    }

    pub fn close(&mut self) {
        self.map.close();
    }
}

impl Deref for IrGenerator {
    type Target = MapGenerator;

    fn deref(&self) -> &MapGenerator {
        &self.map
    }
}

/// IR generator whose frames are injected by the caller.
pub struct MockIrGenerator {
    ir: IrGenerator,
}

impl MockIrGenerator {
    pub fn create(context: &Context, name: Option<&str>) -> Result<MockIrGenerator> {
        let handle = context.create_mock_node_handle(NodeType::Ir, name)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            ir: IrGenerator::from_native(handle)?,
        })
    }

    /// Inject one frame. It becomes current at the next update call.
    pub fn set_data(&self, frame_id: u32, timestamp: u64, data: &[u16]) -> Result<()> {
        let handle = self.ir.handle()?;
        ffi::check(unsafe {
            ffi::xnMockIRSetData(
                handle,
                frame_id,
                timestamp,
                (data.len() * 2) as u32,
                data.as_ptr(),
            )
        })
    }

    pub fn close(&mut self) {
        self.ir.close();
    }
}

impl Deref for MockIrGenerator {
    type Target = IrGenerator;

    fn deref(&self) -> &IrGenerator {
        &self.ir
    }
}
