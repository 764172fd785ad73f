//! Generator and map-generator base wrappers.

use std::ffi::c_void;
use std::ops::Deref;

use crate::capability::{
    AlternativeViewpointCapability, AntiFlickerCapability, CroppingCapability,
    FrameSyncCapability, MirrorCapability,
};
use crate::event::StateChangedEvent;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::node::ProductionNode;
use crate::types::MapOutputMode;
use crate::Result;

fn register_generation_running(
    node: XnNodeHandle,
    handler: ffi::XnStateChangedHandler,
    cookie: *mut c_void,
    callback: *mut XnCallbackHandle,
) -> ffi::XnStatus {
    unsafe { ffi::xnRegisterToGenerationRunningChange(node, handler, cookie, callback) }
}

fn unregister_generation_running(node: XnNodeHandle, callback: XnCallbackHandle) {
    unsafe { ffi::xnUnregisterFromGenerationRunningChange(node, callback) }
}

fn register_new_data(
    node: XnNodeHandle,
    handler: ffi::XnStateChangedHandler,
    cookie: *mut c_void,
    callback: *mut XnCallbackHandle,
) -> ffi::XnStatus {
    unsafe { ffi::xnRegisterToNewDataAvailable(node, handler, cookie, callback) }
}

fn unregister_new_data(node: XnNodeHandle, callback: XnCallbackHandle) {
    unsafe { ffi::xnUnregisterFromNewDataAvailable(node, callback) }
}

/// A node that produces per-frame data.
pub struct Generator {
    // Events precede the node so drop order unregisters callbacks while
    // the handle is still alive.
    generation_running_changed: StateChangedEvent,
    new_data_available: StateChangedEvent,
    node: ProductionNode,
}

impl Generator {
    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let node = ProductionNode::from_native(handle)?;
        Ok(Self {
            generation_running_changed: StateChangedEvent::new(
                handle,
                register_generation_running,
                unregister_generation_running,
            ),
            new_data_available: StateChangedEvent::new(
                handle,
                register_new_data,
                unregister_new_data,
            ),
            node,
        })
    }

    pub fn start_generating(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnStartGenerating(self.node.handle()?) })
    }

    pub fn stop_generating(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopGenerating(self.node.handle()?) })
    }

    pub fn is_generating(&self) -> Result<bool> {
        Ok(unsafe { ffi::xnIsGenerating(self.node.handle()?) } != ffi::XN_FALSE)
    }

    /// Fires when generation starts or stops.
    pub fn generation_running_changed(&self) -> &StateChangedEvent {
        &self.generation_running_changed
    }

    /// Fires when a new frame is ready to be latched by a wait call.
    pub fn new_data_available(&self) -> &StateChangedEvent {
        &self.new_data_available
    }

    /// Whether a new frame is ready, and its timestamp.
    pub fn is_new_data_available(&self) -> Result<(bool, u64)> {
        let handle = self.node.handle()?;
        let mut timestamp = 0u64;
        let available = unsafe { ffi::xnIsNewDataAvailable(handle, &mut timestamp) };
        Ok((available != ffi::XN_FALSE, timestamp))
    }

    /// Block until this generator has new data, then latch it.
    pub fn wait_and_update_data(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnWaitAndUpdateData(self.node.handle()?) })
    }

    /// Whether the last update latched a fresh frame.
    pub fn is_data_new(&self) -> Result<bool> {
        Ok(unsafe { ffi::xnIsDataNew(self.node.handle()?) } != ffi::XN_FALSE)
    }

    /// Raw pointer to the current frame's data, owned by the generator and
    /// valid only until the next update call.
    pub fn data_ptr(&self) -> Result<*const c_void> {
        Ok(unsafe { ffi::xnGetData(self.node.handle()?) })
    }

    pub fn data_size(&self) -> Result<u32> {
        Ok(unsafe { ffi::xnGetDataSize(self.node.handle()?) })
    }

    pub fn timestamp(&self) -> Result<u64> {
        Ok(unsafe { ffi::xnGetTimestamp(self.node.handle()?) })
    }

    pub fn frame_id(&self) -> Result<u32> {
        Ok(unsafe { ffi::xnGetFrameID(self.node.handle()?) })
    }

    /// Tear down event registrations and release the node reference.
    pub fn close(&mut self) {
        self.generation_running_changed.teardown();
        self.new_data_available.teardown();
        self.node.close();
    }
}

impl Deref for Generator {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

fn register_map_output_mode(
    node: XnNodeHandle,
    handler: ffi::XnStateChangedHandler,
    cookie: *mut c_void,
    callback: *mut XnCallbackHandle,
) -> ffi::XnStatus {
    unsafe { ffi::xnRegisterToMapOutputModeChange(node, handler, cookie, callback) }
}

fn unregister_map_output_mode(node: XnNodeHandle, callback: XnCallbackHandle) {
    unsafe { ffi::xnUnregisterFromMapOutputModeChange(node, callback) }
}

/// A generator producing map-shaped (2D) frames.
pub struct MapGenerator {
    map_output_mode_changed: StateChangedEvent,
    generator: Generator,
}

impl MapGenerator {
    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let generator = Generator::from_native(handle)?;
        Ok(Self {
            map_output_mode_changed: StateChangedEvent::new(
                handle,
                register_map_output_mode,
                unregister_map_output_mode,
            ),
            generator,
        })
    }

    pub fn supported_map_output_modes(&self) -> Result<Vec<MapOutputMode>> {
        let handle = self.generator.handle()?;
        let mut count = unsafe { ffi::xnGetSupportedMapOutputModesCount(handle) };
        let mut modes = vec![MapOutputMode::default(); count as usize];
        ffi::check(unsafe {
            ffi::xnGetSupportedMapOutputModes(handle, modes.as_mut_ptr(), &mut count)
        })?;
        modes.truncate(count as usize);
        Ok(modes)
    }

    pub fn set_map_output_mode(&self, mode: MapOutputMode) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetMapOutputMode(self.generator.handle()?, &mode) })
    }

    pub fn map_output_mode(&self) -> Result<MapOutputMode> {
        let mut mode = MapOutputMode::default();
        ffi::check(unsafe { ffi::xnGetMapOutputMode(self.generator.handle()?, &mut mode) })?;
        Ok(mode)
    }

    pub fn map_output_mode_changed(&self) -> &StateChangedEvent {
        &self.map_output_mode_changed
    }

    pub fn bytes_per_pixel(&self) -> Result<u32> {
        Ok(unsafe { ffi::xnGetBytesPerPixel(self.generator.handle()?) })
    }

    /// The mirror capability, sharing this node's handle via add-ref.
    pub fn mirror_capability(&self) -> Result<MirrorCapability> {
        MirrorCapability::new(self)
    }

    pub fn cropping_capability(&self) -> Result<CroppingCapability> {
        CroppingCapability::new(self)
    }

    pub fn alternative_viewpoint_capability(&self) -> Result<AlternativeViewpointCapability> {
        AlternativeViewpointCapability::new(self)
    }

    pub fn frame_sync_capability(&self) -> Result<FrameSyncCapability> {
        FrameSyncCapability::new(self)
    }

    pub fn anti_flicker_capability(&self) -> Result<AntiFlickerCapability> {
        AntiFlickerCapability::new(self)
    }

    pub fn close(&mut self) {
        self.map_output_mode_changed.teardown();
        self.generator.close();
    }
}

impl Deref for MapGenerator {
    type Target = Generator;

    fn deref(&self) -> &Generator {
        &self.generator
    }
}
