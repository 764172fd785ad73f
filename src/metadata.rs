//! Frame metadata objects.
//!
//! Each object owns the full native record chain inline (`output`, `map`,
//! type-specific record) and is refreshed in place on every fetch: the
//! generator wrappers stage the chain with [`crate::marshal::Marshaler`],
//! hand it to the middleware, and the written values flow back on drop.
//!
//! The `data` pointer inside a metadata object belongs to the *generator*,
//! not to this object. It is valid only between the fetch that produced it
//! and the next update call on the same generator; do not hold a
//! [`MapView`] across updates.

use crate::ffi;
use crate::map::MapView;
use crate::marshal::{Marshaled, Marshaler};
use crate::types::{PixelFormat, WaveOutputMode};

pub use crate::ffi::types::XnRGB24Pixel as Rgb24Pixel;

macro_rules! output_accessors {
    () => {
        /// Capture time of this frame, in microseconds.
        pub fn timestamp(&self) -> u64 {
            self.output.timestamp
        }

        pub fn set_timestamp(&mut self, timestamp: u64) {
            self.output.timestamp = timestamp;
        }

        pub fn frame_id(&self) -> u32 {
            self.output.frame_id
        }

        pub fn set_frame_id(&mut self, frame_id: u32) {
            self.output.frame_id = frame_id;
        }

        /// Size of the frame data, in bytes.
        pub fn data_size(&self) -> u32 {
            self.output.data_size
        }

        pub fn set_data_size(&mut self, data_size: u32) {
            self.output.data_size = data_size;
        }

        /// Whether the last update call refreshed this data.
        pub fn is_new(&self) -> bool {
            self.output.is_new != ffi::XN_FALSE
        }
    };
}

macro_rules! map_accessors {
    () => {
        /// Horizontal resolution, cropping applied.
        pub fn x_res(&self) -> u32 {
            self.map.res.x
        }

        /// Vertical resolution, cropping applied.
        pub fn y_res(&self) -> u32 {
            self.map.res.y
        }

        pub fn x_offset(&self) -> u32 {
            self.map.offset.x
        }

        pub fn y_offset(&self) -> u32 {
            self.map.offset.y
        }

        pub fn full_x_res(&self) -> u32 {
            self.map.full_res.x
        }

        pub fn full_y_res(&self) -> u32 {
            self.map.full_res.y
        }

        pub fn fps(&self) -> u32 {
            self.map.fps
        }

        pub fn pixel_format(&self) -> Option<PixelFormat> {
            PixelFormat::from_raw(self.map.pixel_format)
        }

        /// Per-pixel stride of this frame's format; `None` for compressed
        /// formats.
        pub fn bytes_per_pixel(&self) -> Option<usize> {
            self.pixel_format().and_then(PixelFormat::bytes_per_pixel)
        }
    };
}

/// One frame of depth data.
#[derive(Default)]
pub struct DepthMetaData {
    output: ffi::XnOutputMetaData,
    map: ffi::XnMapMetaData,
    depth: ffi::XnDepthMetaData,
}

impl DepthMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    output_accessors!();
    map_accessors!();

    /// Maximum depth value a sample of this frame can carry.
    pub fn z_res(&self) -> u16 {
        self.depth.z_res
    }

    pub fn set_z_res(&mut self, z_res: u16) {
        self.depth.z_res = z_res;
    }

    /// Raw pointer to the depth samples, owned by the generator.
    pub fn data_ptr(&self) -> *const u16 {
        self.depth.data
    }

    /// Strided view over the depth samples of this frame.
    pub fn depth_map(&self) -> MapView<'_, u16> {
        MapView::new(self.depth.data, self.x_res(), self.y_res())
    }

    pub(crate) fn marshal(&mut self, pass_out: bool) -> Marshaler<'_, ffi::XnDepthMetaData> {
        let mut output = Box::new(Marshaler::new(&mut self.output, pass_out));
        self.map.output = output.native() as *mut ffi::XnOutputMetaData;
        let mut map = Box::new(Marshaler::with_inner(&mut self.map, pass_out, Some(output)));
        self.depth.map = map.native() as *mut ffi::XnMapMetaData;
        Marshaler::with_inner(&mut self.depth, pass_out, Some(map))
    }
}

/// One frame of color image data.
#[derive(Default)]
pub struct ImageMetaData {
    output: ffi::XnOutputMetaData,
    map: ffi::XnMapMetaData,
    image: ffi::XnImageMetaData,
}

impl ImageMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    output_accessors!();
    map_accessors!();

    pub fn data_ptr(&self) -> *const u8 {
        self.image.data
    }

    /// RGB24 view over this frame. Meaningful only when the pixel format
    /// is [`PixelFormat::Rgb24`].
    pub fn rgb24_map(&self) -> MapView<'_, Rgb24Pixel> {
        MapView::new(
            self.image.data as *const Rgb24Pixel,
            self.x_res(),
            self.y_res(),
        )
    }

    /// Single-byte view over this frame. Meaningful only when the pixel
    /// format is [`PixelFormat::Grayscale8`].
    pub fn grayscale8_map(&self) -> MapView<'_, u8> {
        MapView::new(self.image.data, self.x_res(), self.y_res())
    }

    pub(crate) fn marshal(&mut self, pass_out: bool) -> Marshaler<'_, ffi::XnImageMetaData> {
        let mut output = Box::new(Marshaler::new(&mut self.output, pass_out));
        self.map.output = output.native() as *mut ffi::XnOutputMetaData;
        let mut map = Box::new(Marshaler::with_inner(&mut self.map, pass_out, Some(output)));
        self.image.map = map.native() as *mut ffi::XnMapMetaData;
        Marshaler::with_inner(&mut self.image, pass_out, Some(map))
    }
}

/// One frame of infrared data.
#[derive(Default)]
pub struct IrMetaData {
    output: ffi::XnOutputMetaData,
    map: ffi::XnMapMetaData,
    ir: ffi::XnIRMetaData,
}

impl IrMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    output_accessors!();
    map_accessors!();

    pub fn data_ptr(&self) -> *const u16 {
        self.ir.data
    }

    pub fn ir_map(&self) -> MapView<'_, u16> {
        MapView::new(self.ir.data, self.x_res(), self.y_res())
    }

    pub(crate) fn marshal(&mut self, pass_out: bool) -> Marshaler<'_, ffi::XnIRMetaData> {
        let mut output = Box::new(Marshaler::new(&mut self.output, pass_out));
        self.map.output = output.native() as *mut ffi::XnOutputMetaData;
        let mut map = Box::new(Marshaler::with_inner(&mut self.map, pass_out, Some(output)));
        self.ir.map = map.native() as *mut ffi::XnMapMetaData;
        Marshaler::with_inner(&mut self.ir, pass_out, Some(map))
    }
}

/// One frame of scene segmentation labels.
#[derive(Default)]
pub struct SceneMetaData {
    output: ffi::XnOutputMetaData,
    map: ffi::XnMapMetaData,
    scene: ffi::XnSceneMetaData,
}

impl SceneMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    output_accessors!();
    map_accessors!();

    pub fn data_ptr(&self) -> *const u16 {
        self.scene.data
    }

    /// Per-pixel user labels; 0 is background.
    pub fn label_map(&self) -> MapView<'_, u16> {
        MapView::new(self.scene.data, self.x_res(), self.y_res())
    }

    pub(crate) fn marshal(&mut self, pass_out: bool) -> Marshaler<'_, ffi::XnSceneMetaData> {
        let mut output = Box::new(Marshaler::new(&mut self.output, pass_out));
        self.map.output = output.native() as *mut ffi::XnOutputMetaData;
        let mut map = Box::new(Marshaler::with_inner(&mut self.map, pass_out, Some(output)));
        self.scene.map = map.native() as *mut ffi::XnMapMetaData;
        Marshaler::with_inner(&mut self.scene, pass_out, Some(map))
    }
}

/// One chunk of audio data.
#[derive(Default)]
pub struct AudioMetaData {
    output: ffi::XnOutputMetaData,
    audio: ffi::XnAudioMetaData,
}

impl AudioMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    output_accessors!();

    pub fn sample_rate(&self) -> u32 {
        self.audio.wave.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.audio.wave.bits_per_sample
    }

    pub fn channels(&self) -> u8 {
        self.audio.wave.channels
    }

    pub fn wave_output_mode(&self) -> WaveOutputMode {
        self.audio.wave
    }

    pub fn data_ptr(&self) -> *const u8 {
        self.audio.data
    }

    pub(crate) fn marshal(&mut self, pass_out: bool) -> Marshaler<'_, ffi::XnAudioMetaData> {
        let mut output = Box::new(Marshaler::new(&mut self.output, pass_out));
        self.audio.output = output.native() as *mut ffi::XnOutputMetaData;
        Marshaler::with_inner(&mut self.audio, pass_out, Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_chain_round_trips_scalars() {
        let mut md = DepthMetaData::new();
        {
            let mut m = md.marshal(true);
            // Stand in for the middleware: write through the staged chain.
            unsafe {
                let depth = m.as_mut_ptr();
                let map = (*depth).map;
                let output = (*map).output;
                (*output).timestamp = 123_456_789;
                (*output).frame_id = 42;
                (*output).data_size = 640 * 480 * 2;
                (*output).is_new = ffi::XN_TRUE;
                (*map).res = ffi::XnUInt32XYPair { x: 640, y: 480 };
                (*map).full_res = ffi::XnUInt32XYPair { x: 640, y: 480 };
                (*map).pixel_format = ffi::XN_PIXEL_FORMAT_GRAYSCALE_16_BIT;
                (*map).fps = 30;
                (*depth).z_res = 10_000;
            }
        }
        assert_eq!(md.timestamp(), 123_456_789);
        assert_eq!(md.frame_id(), 42);
        assert_eq!(md.data_size(), 640 * 480 * 2);
        assert!(md.is_new());
        assert_eq!((md.x_res(), md.y_res()), (640, 480));
        assert_eq!(md.pixel_format(), Some(PixelFormat::Grayscale16));
        assert_eq!(md.fps(), 30);
        assert_eq!(md.z_res(), 10_000);
        assert_eq!(md.bytes_per_pixel(), Some(2));
    }

    #[test]
    fn write_only_chain_does_not_clobber_the_object() {
        let mut md = DepthMetaData::new();
        md.set_frame_id(7);
        md.set_timestamp(1_000);
        {
            let mut m = md.marshal(false);
            unsafe {
                let depth = m.as_mut_ptr();
                let map = (*depth).map;
                let output = (*map).output;
                // The staged copy must carry the object's values in...
                let (out_frame_id, out_timestamp) = ((*output).frame_id, (*output).timestamp);
                assert_eq!(out_frame_id, 7);
                assert_eq!(out_timestamp, 1_000);
                // ...and scribbling on it must not flow back.
                (*output).frame_id = 9999;
            }
        }
        assert_eq!(md.frame_id(), 7);
    }

    #[test]
    fn audio_chain_carries_wave_mode() {
        let mut md = AudioMetaData::new();
        {
            let mut m = md.marshal(true);
            unsafe {
                let audio = m.as_mut_ptr();
                let output = (*audio).output;
                (*output).frame_id = 3;
                (*audio).wave = ffi::XnWaveOutputMode {
                    sample_rate: 48_000,
                    bits_per_sample: 16,
                    channels: 2,
                };
            }
        }
        assert_eq!(md.frame_id(), 3);
        assert_eq!(md.sample_rate(), 48_000);
        assert_eq!(md.bits_per_sample(), 16);
        assert_eq!(md.channels(), 2);
    }
}
