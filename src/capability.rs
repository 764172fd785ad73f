//! Optional capability interfaces.
//!
//! A capability wraps the same native node a second time: construction
//! add-refs the handle, so the capability object and the node it came from
//! are independently closable, with the native refcount deciding the real
//! free. Constructing a capability the node does not support fails up
//! front rather than at first use.

use std::ffi::c_void;
use std::ops::Deref;

use crate::error::{OpenNiError, Status};
use crate::event::StateChangedEvent;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::node::ProductionNode;
use crate::types::{BoundingBox3D, Cropping, PowerLineFrequency};
use crate::Result;

fn capability_checked_share(node: &ProductionNode, name: &std::ffi::CStr) -> Result<ProductionNode> {
    let supported = node.is_capability_supported(&name.to_string_lossy())?;
    if !supported {
        return Err(OpenNiError::Status(Status::from_raw(
            ffi::XN_STATUS_INVALID_OPERATION,
        )));
    }
    node.try_clone()
}

macro_rules! state_event_shims {
    ($reg_name:ident, $unreg_name:ident, $xn_reg:ident, $xn_unreg:ident) => {
        fn $reg_name(
            node: XnNodeHandle,
            handler: ffi::XnStateChangedHandler,
            cookie: *mut c_void,
            callback: *mut XnCallbackHandle,
        ) -> ffi::XnStatus {
            unsafe { ffi::$xn_reg(node, handler, cookie, callback) }
        }

        fn $unreg_name(node: XnNodeHandle, callback: XnCallbackHandle) {
            unsafe { ffi::$xn_unreg(node, callback) }
        }
    };
}

state_event_shims!(
    register_mirror,
    unregister_mirror,
    xnRegisterToMirrorChange,
    xnUnregisterFromMirrorChange
);
state_event_shims!(
    register_cropping,
    unregister_cropping,
    xnRegisterToCroppingChange,
    xnUnregisterFromCroppingChange
);
state_event_shims!(
    register_view_point,
    unregister_view_point,
    xnRegisterToViewPointChange,
    xnUnregisterFromViewPointChange
);
state_event_shims!(
    register_power_line,
    unregister_power_line,
    xnRegisterToPowerLineFrequencyChange,
    xnUnregisterFromPowerLineFrequencyChange
);

/// Horizontal mirroring of map output.
pub struct MirrorCapability {
    mirror_changed: StateChangedEvent,
    node: ProductionNode,
}

impl MirrorCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        let node = capability_checked_share(node, ffi::XN_CAPABILITY_MIRROR)?;
        let handle = node.handle()?;
        Ok(Self {
            mirror_changed: StateChangedEvent::new(handle, register_mirror, unregister_mirror),
            node,
        })
    }

    pub fn set_mirror(&self, mirror: bool) -> Result<()> {
        let value = if mirror { ffi::XN_TRUE } else { ffi::XN_FALSE };
        ffi::check(unsafe { ffi::xnSetMirror(self.node.handle()?, value) })
    }

    pub fn is_mirrored(&self) -> Result<bool> {
        Ok(unsafe { ffi::xnIsMirrored(self.node.handle()?) } != ffi::XN_FALSE)
    }

    pub fn mirror_changed(&self) -> &StateChangedEvent {
        &self.mirror_changed
    }

    pub fn close(&mut self) {
        self.mirror_changed.teardown();
        self.node.close();
    }
}

impl Deref for MirrorCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

/// Restricting map output to a sub-window.
pub struct CroppingCapability {
    cropping_changed: StateChangedEvent,
    node: ProductionNode,
}

impl CroppingCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        let node = capability_checked_share(node, ffi::XN_CAPABILITY_CROPPING)?;
        let handle = node.handle()?;
        Ok(Self {
            cropping_changed: StateChangedEvent::new(
                handle,
                register_cropping,
                unregister_cropping,
            ),
            node,
        })
    }

    pub fn set_cropping(&self, cropping: Cropping) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetCropping(self.node.handle()?, &cropping) })
    }

    pub fn cropping(&self) -> Result<Cropping> {
        let mut cropping = Cropping::default();
        ffi::check(unsafe { ffi::xnGetCropping(self.node.handle()?, &mut cropping) })?;
        Ok(cropping)
    }

    pub fn cropping_changed(&self) -> &StateChangedEvent {
        &self.cropping_changed
    }

    pub fn close(&mut self) {
        self.cropping_changed.teardown();
        self.node.close();
    }
}

impl Deref for CroppingCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

/// Re-registering map output into another generator's viewpoint.
pub struct AlternativeViewpointCapability {
    view_point_changed: StateChangedEvent,
    node: ProductionNode,
}

impl AlternativeViewpointCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        let node = capability_checked_share(node, ffi::XN_CAPABILITY_ALTERNATIVE_VIEW_POINT)?;
        let handle = node.handle()?;
        Ok(Self {
            view_point_changed: StateChangedEvent::new(
                handle,
                register_view_point,
                unregister_view_point,
            ),
            node,
        })
    }

    pub fn is_viewpoint_supported(&self, other: &ProductionNode) -> Result<bool> {
        Ok(
            unsafe { ffi::xnIsViewPointSupported(self.node.handle()?, other.handle()?) }
                != ffi::XN_FALSE,
        )
    }

    pub fn set_viewpoint(&self, other: &ProductionNode) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetViewPoint(self.node.handle()?, other.handle()?) })
    }

    pub fn reset_viewpoint(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnResetViewPoint(self.node.handle()?) })
    }

    pub fn is_viewpoint_as(&self, other: &ProductionNode) -> Result<bool> {
        Ok(unsafe { ffi::xnIsViewPointAs(self.node.handle()?, other.handle()?) } != ffi::XN_FALSE)
    }

    pub fn viewpoint_changed(&self) -> &StateChangedEvent {
        &self.view_point_changed
    }

    pub fn close(&mut self) {
        self.view_point_changed.teardown();
        self.node.close();
    }
}

impl Deref for AlternativeViewpointCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

/// Frame-synchronized generation between two generators.
pub struct FrameSyncCapability {
    node: ProductionNode,
}

impl FrameSyncCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        Ok(Self {
            node: capability_checked_share(node, ffi::XN_CAPABILITY_FRAME_SYNC)?,
        })
    }

    pub fn can_frame_sync_with(&self, other: &ProductionNode) -> Result<bool> {
        Ok(
            unsafe { ffi::xnCanFrameSyncWith(self.node.handle()?, other.handle()?) }
                != ffi::XN_FALSE,
        )
    }

    pub fn frame_sync_with(&self, other: &ProductionNode) -> Result<()> {
        ffi::check(unsafe { ffi::xnFrameSyncWith(self.node.handle()?, other.handle()?) })
    }

    pub fn stop_frame_sync_with(&self, other: &ProductionNode) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopFrameSyncWith(self.node.handle()?, other.handle()?) })
    }

    pub fn is_frame_synced_with(&self, other: &ProductionNode) -> Result<bool> {
        Ok(
            unsafe { ffi::xnIsFrameSyncedWith(self.node.handle()?, other.handle()?) }
                != ffi::XN_FALSE,
        )
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for FrameSyncCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

/// Anti-flicker tuning against the local power line frequency.
pub struct AntiFlickerCapability {
    frequency_changed: StateChangedEvent,
    node: ProductionNode,
}

impl AntiFlickerCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        let node = capability_checked_share(node, ffi::XN_CAPABILITY_ANTI_FLICKER)?;
        let handle = node.handle()?;
        Ok(Self {
            frequency_changed: StateChangedEvent::new(
                handle,
                register_power_line,
                unregister_power_line,
            ),
            node,
        })
    }

    pub fn set_power_line_frequency(&self, frequency: PowerLineFrequency) -> Result<()> {
        ffi::check(unsafe {
            ffi::xnSetPowerLineFrequency(self.node.handle()?, frequency as u32)
        })
    }

    pub fn power_line_frequency(&self) -> Result<PowerLineFrequency> {
        let raw = unsafe { ffi::xnGetPowerLineFrequency(self.node.handle()?) };
        PowerLineFrequency::from_raw(raw).ok_or(OpenNiError::Status(Status::from_raw(
            ffi::XN_STATUS_BAD_PARAM,
        )))
    }

    pub fn frequency_changed(&self) -> &StateChangedEvent {
        &self.frequency_changed
    }

    pub fn close(&mut self) {
        self.frequency_changed.teardown();
        self.node.close();
    }
}

impl Deref for AntiFlickerCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

/// Depth-generator region-of-interest configuration.
pub struct UserPositionCapability {
    node: ProductionNode,
}

impl UserPositionCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        Ok(Self {
            node: capability_checked_share(node, ffi::XN_CAPABILITY_USER_POSITION)?,
        })
    }

    pub fn supported_positions_count(&self) -> Result<u32> {
        Ok(unsafe { ffi::xnGetSupportedUserPositionsCount(self.node.handle()?) })
    }

    pub fn set_position(&self, index: u32, position: BoundingBox3D) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetUserPosition(self.node.handle()?, index, &position) })
    }

    pub fn position(&self, index: u32) -> Result<BoundingBox3D> {
        let mut position = BoundingBox3D::default();
        ffi::check(unsafe {
            ffi::xnGetUserPosition(self.node.handle()?, index, &mut position)
        })?;
        Ok(position)
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for UserPositionCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

/// Identity strings of a hardware device node.
pub struct DeviceIdentificationCapability {
    node: ProductionNode,
}

impl DeviceIdentificationCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        Ok(Self {
            node: capability_checked_share(node, ffi::XN_CAPABILITY_DEVICE_IDENTIFICATION)?,
        })
    }

    pub fn device_name(&self) -> Result<String> {
        self.sized_string(|h, buf, size| unsafe { ffi::xnGetDeviceName(h, buf, size) })
    }

    pub fn vendor_specific_data(&self) -> Result<String> {
        self.sized_string(|h, buf, size| unsafe { ffi::xnGetVendorSpecificData(h, buf, size) })
    }

    pub fn serial_number(&self) -> Result<String> {
        self.sized_string(|h, buf, size| unsafe { ffi::xnGetSerialNumber(h, buf, size) })
    }

    fn sized_string(
        &self,
        getter: impl Fn(XnNodeHandle, *mut std::os::raw::c_char, *mut u32) -> ffi::XnStatus,
    ) -> Result<String> {
        let handle = self.node.handle()?;
        let mut buf = [0 as std::os::raw::c_char; 256];
        let mut size = buf.len() as u32;
        ffi::check(getter(handle, buf.as_mut_ptr(), &mut size))?;
        Ok(ffi::types::fixed_to_string(&buf))
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for DeviceIdentificationCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}
