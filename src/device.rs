//! Hardware device node.

use std::ops::Deref;

use crate::capability::DeviceIdentificationCapability;
use crate::context::Context;
use crate::ffi::XnNodeHandle;
use crate::node::ProductionNode;
use crate::types::NodeType;
use crate::Result;

/// The node representing the physical sensor device.
pub struct Device {
    node: ProductionNode,
}

impl Device {
    pub fn create(context: &Context) -> Result<Device> {
        let handle = context.create_any_node_handle(NodeType::Device, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            node: ProductionNode::from_native(handle)?,
        })
    }

    pub fn identification_capability(&self) -> Result<DeviceIdentificationCapability> {
        DeviceIdentificationCapability::new(&self.node)
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for Device {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}
