//! Audio generator.

use std::ffi::c_void;
use std::ops::Deref;

use crate::context::Context;
use crate::event::StateChangedEvent;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::generator::Generator;
use crate::metadata::AudioMetaData;
use crate::types::{NodeType, WaveOutputMode};
use crate::Result;

fn register_wave_mode(
    node: XnNodeHandle,
    handler: ffi::XnStateChangedHandler,
    cookie: *mut c_void,
    callback: *mut XnCallbackHandle,
) -> ffi::XnStatus {
    unsafe { ffi::xnRegisterToWaveOutputModeChanges(node, handler, cookie, callback) }
}

fn unregister_wave_mode(node: XnNodeHandle, callback: XnCallbackHandle) {
    unsafe { ffi::xnUnregisterFromWaveOutputModeChanges(node, callback) }
}

/// Generator producing PCM audio chunks.
pub struct AudioGenerator {
    wave_output_mode_changed: StateChangedEvent,
    generator: Generator,
}

impl AudioGenerator {
    pub fn create(context: &Context) -> Result<AudioGenerator> {
        let handle = context.create_any_node_handle(NodeType::Audio, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let generator = Generator::from_native(handle)?;
        Ok(Self {
            wave_output_mode_changed: StateChangedEvent::new(
                handle,
                register_wave_mode,
                unregister_wave_mode,
            ),
            generator,
        })
    }

    /// Refresh `md` in place from the current chunk.
    pub fn metadata(&self, md: &mut AudioMetaData) -> Result<()> {
        let handle = self.generator.handle()?;
        let mut staged = md.marshal(true);
        unsafe { ffi::xnGetAudioMetaData(handle, staged.as_mut_ptr()) };
        Ok(())
    }

    pub fn supported_wave_output_modes(&self) -> Result<Vec<WaveOutputMode>> {
        let handle = self.generator.handle()?;
        let mut count = unsafe { ffi::xnGetSupportedWaveOutputModesCount(handle) };
        let mut modes = vec![WaveOutputMode::default(); count as usize];
        ffi::check(unsafe {
            ffi::xnGetSupportedWaveOutputModes(handle, modes.as_mut_ptr(), &mut count)
        })?;
        modes.truncate(count as usize);
        Ok(modes)
    }

    pub fn set_wave_output_mode(&self, mode: WaveOutputMode) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetWaveOutputMode(self.generator.handle()?, &mode) })
    }

    pub fn wave_output_mode(&self) -> Result<WaveOutputMode> {
        let mut mode = WaveOutputMode::default();
        ffi::check(unsafe { ffi::xnGetWaveOutputMode(self.generator.handle()?, &mut mode) })?;
        Ok(mode)
    }

    pub fn wave_output_mode_changed(&self) -> &StateChangedEvent {
        &self.wave_output_mode_changed
    }

    pub fn close(&mut self) {
        self.wave_output_mode_changed.teardown();
        self.generator.close();
    }
}

impl Deref for AudioGenerator {
    type Target = Generator;

    fn deref(&self) -> &Generator {
        &self.generator
    }
}

/// Audio generator whose chunks are injected by the caller.
pub struct MockAudioGenerator {
    audio: AudioGenerator,
}

impl MockAudioGenerator {
    pub fn create(context: &Context, name: Option<&str>) -> Result<MockAudioGenerator> {
        let handle = context.create_mock_node_handle(NodeType::Audio, name)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            audio: AudioGenerator::from_native(handle)?,
        })
    }

    /// Inject one chunk. It becomes current at the next update call.
    pub fn set_data(&self, frame_id: u32, timestamp: u64, data: &[u8]) -> Result<()> {
        let handle = self.audio.handle()?;
        ffi::check(unsafe {
            ffi::xnMockAudioSetData(handle, frame_id, timestamp, data.len() as u32, data.as_ptr())
        })
    }

    pub fn close(&mut self) {
        self.audio.close();
    }
}

impl Deref for MockAudioGenerator {
    type Target = AudioGenerator;

    fn deref(&self) -> &AudioGenerator {
        &self.audio
    }
}
