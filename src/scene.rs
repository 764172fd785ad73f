//! Scene analyzer.

use std::ops::Deref;

use crate::context::Context;
use crate::ffi::{self, XnNodeHandle};
use crate::generator::MapGenerator;
use crate::metadata::SceneMetaData;
use crate::types::{NodeType, Plane3D};
use crate::Result;

/// Generator segmenting the scene into labeled regions.
pub struct SceneAnalyzer {
    map: MapGenerator,
}

impl SceneAnalyzer {
    pub fn create(context: &Context) -> Result<SceneAnalyzer> {
        let handle = context.create_any_node_handle(NodeType::Scene, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            map: MapGenerator::from_native(handle)?,
        })
    }

    /// Refresh `md` in place from the current frame.
    pub fn metadata(&self, md: &mut SceneMetaData) -> Result<()> {
        let handle = self.map.handle()?;
        let mut staged = md.marshal(true);
        unsafe { ffi::xnGetSceneMetaData(handle, staged.as_mut_ptr()) };
        Ok(())
    }

    /// The detected floor plane.
    pub fn floor(&self) -> Result<Plane3D> {
        let mut plane = Plane3D::default();
        ffi::check(unsafe { ffi::xnGetFloor(self.map.handle()?, &mut plane) })?;
        Ok(plane)
    }

    pub fn close(&mut self) {
        self.map.close();
    }
}

impl Deref for SceneAnalyzer {
    type Target = MapGenerator;

    fn deref(&self) -> &MapGenerator {
        &self.map
    }
}
