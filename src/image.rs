//! Image generator.

use std::ffi::c_void;
use std::ops::Deref;

use crate::context::Context;
use crate::error::{OpenNiError, Status};
use crate::event::StateChangedEvent;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::generator::MapGenerator;
use crate::metadata::ImageMetaData;
use crate::types::{NodeType, PixelFormat};
use crate::Result;

fn register_pixel_format(
    node: XnNodeHandle,
    handler: ffi::XnStateChangedHandler,
    cookie: *mut c_void,
    callback: *mut XnCallbackHandle,
) -> ffi::XnStatus {
    unsafe { ffi::xnRegisterToPixelFormatChange(node, handler, cookie, callback) }
}

fn unregister_pixel_format(node: XnNodeHandle, callback: XnCallbackHandle) {
    unsafe { ffi::xnUnregisterFromPixelFormatChange(node, callback) }
}

/// Generator producing color (or grayscale) image frames.
pub struct ImageGenerator {
    pixel_format_changed: StateChangedEvent,
    map: MapGenerator,
}

impl ImageGenerator {
    pub fn create(context: &Context) -> Result<ImageGenerator> {
        let handle = context.create_any_node_handle(NodeType::Image, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let map = MapGenerator::from_native(handle)?;
        Ok(Self {
            pixel_format_changed: StateChangedEvent::new(
                handle,
                register_pixel_format,
                unregister_pixel_format,
            ),
            map,
        })
    }

    /// Refresh `md` in place from the current frame.
    pub fn metadata(&self, md: &mut ImageMetaData) -> Result<()> {
        let handle = self.map.handle()?;
        let mut staged = md.marshal(true);
        unsafe { ffi::xnGetImageMetaData(handle, staged.as_mut_ptr()) };
        Ok(())
    }

    pub fn set_pixel_format(&self, format: PixelFormat) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetPixelFormat(self.map.handle()?, format.raw()) })
    }

    pub fn pixel_format(&self) -> Result<PixelFormat> {
        let raw = unsafe { ffi::xnGetPixelFormat(self.map.handle()?) };
        PixelFormat::from_raw(raw).ok_or(OpenNiError::Status(Status::from_raw(
            ffi::XN_STATUS_BAD_PARAM,
        )))
    }

    pub fn is_pixel_format_supported(&self, format: PixelFormat) -> Result<bool> {
        Ok(
            unsafe { ffi::xnIsPixelFormatSupported(self.map.handle()?, format.raw()) }
                != ffi::XN_FALSE,
        )
    }

    pub fn pixel_format_changed(&self) -> &StateChangedEvent {
        &self.pixel_format_changed
    }

    pub fn close(&mut self) {
        self.pixel_format_changed.teardown();
        self.map.close();
    }
}

impl Deref for ImageGenerator {
    type Target = MapGenerator;

    fn deref(&self) -> &MapGenerator {
        &self.map
    }
}

/// Image generator whose frames are injected by the caller.
pub struct MockImageGenerator {
    image: ImageGenerator,
}

impl MockImageGenerator {
    pub fn create(context: &Context, name: Option<&str>) -> Result<MockImageGenerator> {
        let handle = context.create_mock_node_handle(NodeType::Image, name)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            image: ImageGenerator::from_native(handle)?,
        })
    }

    /// Inject one frame. It becomes current at the next update call.
    pub fn set_data(&self, frame_id: u32, timestamp: u64, data: &[u8]) -> Result<()> {
        let handle = self.image.handle()?;
        ffi::check(unsafe {
            ffi::xnMockImageSetData(handle, frame_id, timestamp, data.len() as u32, data.as_ptr())
        })
    }

    pub fn close(&mut self) {
        self.image.close();
    }
}

impl Deref for MockImageGenerator {
    type Target = ImageGenerator;

    fn deref(&self) -> &ImageGenerator {
        &self.image
    }
}
