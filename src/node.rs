//! The production node base type and the polymorphic node factory.

use std::ffi::CString;
use std::os::raw::c_char;

use crate::audio::{AudioGenerator, MockAudioGenerator};
use crate::codec::Codec;
use crate::depth::{DepthGenerator, MockDepthGenerator};
use crate::device::Device;
use crate::error::OpenNiError;
use crate::ffi::{self, XnNodeHandle};
use crate::gesture::GestureGenerator;
use crate::hands::HandsGenerator;
use crate::image::{ImageGenerator, MockImageGenerator};
use crate::ir::{IrGenerator, MockIrGenerator};
use crate::node_info::NodeInfo;
use crate::player::Player;
use crate::recorder::Recorder;
use crate::resource::Owned;
use crate::scene::SceneAnalyzer;
use crate::types::{CapabilitySet, NodeDescription, NodeType};
use crate::user::UserGenerator;
use crate::Result;

fn release_node(handle: XnNodeHandle) {
    unsafe { ffi::xnProductionNodeRelease(handle) }
}

/// Base wrapper every node type builds on: one owned native reference.
///
/// The native object itself is reference counted; several wrappers (clones,
/// capability objects) may refer to it, each holding its own reference and
/// each closable independently. The native object is freed when the last
/// reference is released, in whatever order the wrappers go away.
pub struct ProductionNode {
    owned: Owned<XnNodeHandle>,
}

impl ProductionNode {
    /// Take ownership of one existing native reference.
    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        Ok(Self {
            owned: Owned::open(handle, release_node)?,
        })
    }

    /// Acquire an additional native reference over the same object.
    pub(crate) fn share(handle: XnNodeHandle) -> Result<Self> {
        ffi::check(unsafe { ffi::xnProductionNodeAddRef(handle) })?;
        Self::from_native(handle)
    }

    pub(crate) fn handle(&self) -> Result<XnNodeHandle> {
        self.owned.get()
    }

    /// The raw native handle. Only for native-managed transitions.
    pub fn to_native(&self) -> Result<XnNodeHandle> {
        self.handle()
    }

    /// A second independent wrapper over the same native node, holding its
    /// own reference.
    pub fn try_clone(&self) -> Result<ProductionNode> {
        Self::share(self.handle()?)
    }

    pub fn info(&self) -> Result<NodeInfo> {
        let info = unsafe { ffi::xnGetNodeInfo(self.handle()?) };
        NodeInfo::from_native(info)
    }

    pub fn name(&self) -> Result<String> {
        let ptr = unsafe { ffi::xnGetNodeName(self.handle()?) };
        if ptr.is_null() {
            return Err(OpenNiError::InvalidHandle);
        }
        Ok(unsafe { std::ffi::CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned())
    }

    pub fn node_type(&self) -> Result<NodeType> {
        let descr = self.info()?.description()?;
        NodeType::from_tag(descr.node_type)
    }

    pub fn is_capability_supported(&self, capability: &str) -> Result<bool> {
        let handle = self.handle()?;
        let capability = CString::new(capability).unwrap_or_default();
        Ok(unsafe { ffi::xnIsCapabilitySupported(handle, capability.as_ptr()) } != ffi::XN_FALSE)
    }

    /// Declare a non-owning dependency on another node (lookup relation,
    /// not lifetime).
    pub fn add_needed_node(&self, needed: &ProductionNode) -> Result<()> {
        ffi::check(unsafe { ffi::xnAddNeededNode(self.handle()?, needed.handle()?) })
    }

    pub fn set_int_property(&self, name: &str, value: u64) -> Result<()> {
        let name = CString::new(name).unwrap_or_default();
        ffi::check(unsafe { ffi::xnSetIntProperty(self.handle()?, name.as_ptr(), value) })
    }

    pub fn int_property(&self, name: &str) -> Result<u64> {
        let name = CString::new(name).unwrap_or_default();
        let mut value = 0u64;
        ffi::check(unsafe { ffi::xnGetIntProperty(self.handle()?, name.as_ptr(), &mut value) })?;
        Ok(value)
    }

    pub fn set_real_property(&self, name: &str, value: f64) -> Result<()> {
        let name = CString::new(name).unwrap_or_default();
        ffi::check(unsafe { ffi::xnSetRealProperty(self.handle()?, name.as_ptr(), value) })
    }

    pub fn real_property(&self, name: &str) -> Result<f64> {
        let name = CString::new(name).unwrap_or_default();
        let mut value = 0f64;
        ffi::check(unsafe { ffi::xnGetRealProperty(self.handle()?, name.as_ptr(), &mut value) })?;
        Ok(value)
    }

    pub fn set_string_property(&self, name: &str, value: &str) -> Result<()> {
        let name = CString::new(name).unwrap_or_default();
        let value = CString::new(value).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnSetStringProperty(self.handle()?, name.as_ptr(), value.as_ptr())
        })
    }

    pub fn string_property(&self, name: &str) -> Result<String> {
        let handle = self.handle()?;
        let name = CString::new(name).unwrap_or_default();
        let mut buf = [0 as c_char; 2048];
        ffi::check(unsafe {
            ffi::xnGetStringProperty(handle, name.as_ptr(), buf.as_mut_ptr(), buf.len() as u32)
        })?;
        Ok(ffi::types::fixed_to_string(&buf))
    }

    pub fn set_general_property(&self, name: &str, data: &[u8]) -> Result<()> {
        let name = CString::new(name).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnSetGeneralProperty(
                self.handle()?,
                name.as_ptr(),
                data.len() as u32,
                data.as_ptr() as *const std::ffi::c_void,
            )
        })
    }

    pub fn general_property(&self, name: &str, data: &mut [u8]) -> Result<()> {
        let name = CString::new(name).unwrap_or_default();
        ffi::check(unsafe {
            ffi::xnGetGeneralProperty(
                self.handle()?,
                name.as_ptr(),
                data.len() as u32,
                data.as_mut_ptr() as *mut std::ffi::c_void,
            )
        })
    }

    pub fn is_closed(&self) -> bool {
        self.owned.is_closed()
    }

    /// Release this wrapper's native reference. Idempotent; every later
    /// operation on this wrapper fails with `AlreadyDisposed`.
    pub fn close(&mut self) {
        self.owned.close();
    }
}

pub(crate) fn node_descriptor(handle: XnNodeHandle) -> Result<NodeDescription> {
    let info = unsafe { ffi::xnGetNodeInfo(handle) };
    if !info.is_valid() {
        return Err(OpenNiError::InvalidHandle);
    }
    let descr = unsafe { ffi::xnNodeInfoGetDescription(info) };
    if descr.is_null() {
        return Err(OpenNiError::InvalidHandle);
    }
    Ok(NodeDescription::from_native(unsafe { *descr }))
}

/// A node wrapper of the concrete type matching the native node.
///
/// The set of variants is closed: adding a node type is a compile-checked
/// addition to this enum and its match arms, not a runtime registry.
pub enum AnyNode {
    Device(Device),
    Depth(DepthGenerator),
    Image(ImageGenerator),
    Audio(AudioGenerator),
    Ir(IrGenerator),
    User(UserGenerator),
    Recorder(Recorder),
    Player(Player),
    Gesture(GestureGenerator),
    Scene(SceneAnalyzer),
    Hands(HandsGenerator),
    Codec(Codec),
    MockDepth(MockDepthGenerator),
    MockImage(MockImageGenerator),
    MockIr(MockIrGenerator),
    MockAudio(MockAudioGenerator),
}

impl std::fmt::Debug for AnyNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            AnyNode::Device(_) => "Device",
            AnyNode::Depth(_) => "Depth",
            AnyNode::Image(_) => "Image",
            AnyNode::Audio(_) => "Audio",
            AnyNode::Ir(_) => "Ir",
            AnyNode::User(_) => "User",
            AnyNode::Recorder(_) => "Recorder",
            AnyNode::Player(_) => "Player",
            AnyNode::Gesture(_) => "Gesture",
            AnyNode::Scene(_) => "Scene",
            AnyNode::Hands(_) => "Hands",
            AnyNode::Codec(_) => "Codec",
            AnyNode::MockDepth(_) => "MockDepth",
            AnyNode::MockImage(_) => "MockImage",
            AnyNode::MockIr(_) => "MockIr",
            AnyNode::MockAudio(_) => "MockAudio",
        };
        f.debug_tuple(variant).finish()
    }
}

impl AnyNode {
    /// Build the concrete wrapper for `handle`, consuming one native
    /// reference.
    ///
    /// With no tag, the node's own descriptor decides. An unknown tag
    /// fails with [`OpenNiError::UnsupportedNodeType`]; there is no
    /// default variant.
    pub fn from_native(handle: XnNodeHandle, type_tag: Option<i32>) -> Result<AnyNode> {
        if !handle.is_valid() {
            return Err(OpenNiError::InvalidHandle);
        }
        let descr = node_descriptor(handle)?;
        let tag = type_tag.unwrap_or(descr.node_type);
        let node_type = NodeType::from_tag(tag)?;
        let mock = descr.name.starts_with("Mock");

        Ok(match (node_type, mock) {
            (NodeType::Device, _) => AnyNode::Device(Device::from_native(handle)?),
            (NodeType::Depth, false) => AnyNode::Depth(DepthGenerator::from_native(handle)?),
            (NodeType::Depth, true) => {
                AnyNode::MockDepth(MockDepthGenerator::from_native(handle)?)
            }
            (NodeType::Image, false) => AnyNode::Image(ImageGenerator::from_native(handle)?),
            (NodeType::Image, true) => {
                AnyNode::MockImage(MockImageGenerator::from_native(handle)?)
            }
            (NodeType::Audio, false) => AnyNode::Audio(AudioGenerator::from_native(handle)?),
            (NodeType::Audio, true) => {
                AnyNode::MockAudio(MockAudioGenerator::from_native(handle)?)
            }
            (NodeType::Ir, false) => AnyNode::Ir(IrGenerator::from_native(handle)?),
            (NodeType::Ir, true) => AnyNode::MockIr(MockIrGenerator::from_native(handle)?),
            (NodeType::User, _) => AnyNode::User(UserGenerator::from_native(handle)?),
            (NodeType::Recorder, _) => AnyNode::Recorder(Recorder::from_native(handle)?),
            (NodeType::Player, _) => AnyNode::Player(Player::from_native(handle)?),
            (NodeType::Gesture, _) => AnyNode::Gesture(GestureGenerator::from_native(handle)?),
            (NodeType::Scene, _) => AnyNode::Scene(SceneAnalyzer::from_native(handle)?),
            (NodeType::Hands, _) => AnyNode::Hands(HandsGenerator::from_native(handle)?),
            (NodeType::Codec, _) => AnyNode::Codec(Codec::from_native(handle)?),
        })
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            AnyNode::Device(_) => NodeType::Device,
            AnyNode::Depth(_) | AnyNode::MockDepth(_) => NodeType::Depth,
            AnyNode::Image(_) | AnyNode::MockImage(_) => NodeType::Image,
            AnyNode::Audio(_) | AnyNode::MockAudio(_) => NodeType::Audio,
            AnyNode::Ir(_) | AnyNode::MockIr(_) => NodeType::Ir,
            AnyNode::User(_) => NodeType::User,
            AnyNode::Recorder(_) => NodeType::Recorder,
            AnyNode::Player(_) => NodeType::Player,
            AnyNode::Gesture(_) => NodeType::Gesture,
            AnyNode::Scene(_) => NodeType::Scene,
            AnyNode::Hands(_) => NodeType::Hands,
            AnyNode::Codec(_) => NodeType::Codec,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(
            self,
            AnyNode::MockDepth(_)
                | AnyNode::MockImage(_)
                | AnyNode::MockIr(_)
                | AnyNode::MockAudio(_)
        )
    }

    /// The optional capability set of this variant's node type.
    pub fn capabilities(&self) -> CapabilitySet {
        self.node_type().capabilities()
    }

    /// The shared production node interface.
    pub fn as_node(&self) -> &ProductionNode {
        match self {
            AnyNode::Device(n) => n,
            AnyNode::Depth(n) => n,
            AnyNode::Image(n) => n,
            AnyNode::Audio(n) => n,
            AnyNode::Ir(n) => n,
            AnyNode::User(n) => n,
            AnyNode::Recorder(n) => n,
            AnyNode::Player(n) => n,
            AnyNode::Gesture(n) => n,
            AnyNode::Scene(n) => n,
            AnyNode::Hands(n) => n,
            AnyNode::Codec(n) => n,
            AnyNode::MockDepth(n) => n,
            AnyNode::MockImage(n) => n,
            AnyNode::MockIr(n) => n,
            AnyNode::MockAudio(n) => n,
        }
    }
}
