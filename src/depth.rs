//! Depth generator.

use std::ffi::CString;
use std::ops::Deref;

use crate::capability::UserPositionCapability;
use crate::context::Context;
use crate::ffi::{self, XnNodeHandle};
use crate::generator::MapGenerator;
use crate::metadata::DepthMetaData;
use crate::types::{FieldOfView, NodeType, Point3D};
use crate::Result;

/// Generator producing per-pixel depth, in millimeters.
pub struct DepthGenerator {
    map: MapGenerator,
}

impl DepthGenerator {
    /// Create a depth generator on `context`, letting the middleware pick
    /// any matching implementation.
    pub fn create(context: &Context) -> Result<DepthGenerator> {
        let handle = context.create_any_node_handle(NodeType::Depth, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            map: MapGenerator::from_native(handle)?,
        })
    }

    /// Refresh `md` in place from the current frame. The data pointer it
    /// carries afterwards belongs to this generator and is valid only
    /// until the next update call.
    pub fn metadata(&self, md: &mut DepthMetaData) -> Result<()> {
        let handle = self.map.handle()?;
        let mut staged = md.marshal(true);
        unsafe { ffi::xnGetDepthMetaData(handle, staged.as_mut_ptr()) };
        Ok(())
    }

    /// Largest value a depth sample can carry on this device.
    pub fn device_max_depth(&self) -> Result<u16> {
        Ok(unsafe { ffi::xnGetDeviceMaxDepth(self.map.handle()?) })
    }

    pub fn field_of_view(&self) -> Result<FieldOfView> {
        let mut fov = FieldOfView::default();
        ffi::check(unsafe { ffi::xnGetDepthFieldOfView(self.map.handle()?, &mut fov) })?;
        Ok(fov)
    }

    /// Convert projective (pixel + depth) coordinates to real-world
    /// millimeters.
    pub fn convert_projective_to_real_world(
        &self,
        projective: &[Point3D],
    ) -> Result<Vec<Point3D>> {
        let handle = self.map.handle()?;
        let mut out = vec![Point3D::default(); projective.len()];
        ffi::check(unsafe {
            ffi::xnConvertProjectiveToRealWorld(
                handle,
                projective.len() as u32,
                projective.as_ptr(),
                out.as_mut_ptr(),
            )
        })?;
        Ok(out)
    }

    /// Convert real-world millimeters to projective (pixel + depth)
    /// coordinates.
    pub fn convert_real_world_to_projective(
        &self,
        real_world: &[Point3D],
    ) -> Result<Vec<Point3D>> {
        let handle = self.map.handle()?;
        let mut out = vec![Point3D::default(); real_world.len()];
        ffi::check(unsafe {
            ffi::xnConvertRealWorldToProjective(
                handle,
                real_world.len() as u32,
                real_world.as_ptr(),
                out.as_mut_ptr(),
            )
        })?;
        Ok(out)
    }

    pub fn user_position_capability(&self) -> Result<UserPositionCapability> {
        UserPositionCapability::new(self)
    }

    pub fn close(&mut self) {
        self.map.close();
    }
}

impl Deref for DepthGenerator {
    type Target = MapGenerator;

    fn deref(&self) -> &MapGenerator {
        &self.map
    }
}

/// Depth generator whose frames are injected by the caller.
pub struct MockDepthGenerator {
    depth: DepthGenerator,
}

impl MockDepthGenerator {
    pub fn create(context: &Context, name: Option<&str>) -> Result<MockDepthGenerator> {
        let handle = context.create_mock_node_handle(NodeType::Depth, name)?;
        Self::from_native(handle)
    }

    /// Create a mock that inherits `other`'s configuration.
    pub fn create_based_on(
        context: &Context,
        other: &DepthGenerator,
        name: Option<&str>,
    ) -> Result<MockDepthGenerator> {
        let name = name.map(|n| CString::new(n).unwrap_or_default());
        let mut handle = XnNodeHandle::invalid();
        ffi::check(unsafe {
            ffi::xnCreateMockNodeBasedOn(
                context.handle()?,
                other.handle()?,
                name.as_ref().map(|n| n.as_ptr()).unwrap_or(std::ptr::null()),
                &mut handle,
            )
        })?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            depth: DepthGenerator::from_native(handle)?,
        })
    }

    /// Inject one frame. It becomes current at the next update call.
    pub fn set_data(&self, frame_id: u32, timestamp: u64, data: &[u16]) -> Result<()> {
        let handle = self.depth.handle()?;
        ffi::check(unsafe {
            ffi::xnMockDepthSetData(
                handle,
                frame_id,
                timestamp,
                (data.len() * 2) as u32,
                data.as_ptr(),
            )
        })
    }

    /// Inject the frame described by `md`, taking frame id, timestamp and
    /// data pointer from the record.
    pub fn set_data_from(&self, md: &DepthMetaData) -> Result<()> {
        let handle = self.depth.handle()?;
        ffi::check(unsafe {
            ffi::xnMockDepthSetData(
                handle,
                md.frame_id(),
                md.timestamp(),
                md.data_size(),
                md.data_ptr(),
            )
        })
    }

    pub fn close(&mut self) {
        self.depth.close();
    }
}

impl Deref for MockDepthGenerator {
    type Target = DepthGenerator;

    fn deref(&self) -> &DepthGenerator {
        &self.depth
    }
}
