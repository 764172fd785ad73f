//! Managed-side data types shared across the wrapped node classes.

use std::fmt;

use crate::error::OpenNiError;
use crate::ffi;
use crate::Result;

// Plain-data records are shared with the native layer; their layout is the
// native one, their field names are ours.
pub use crate::ffi::types::{
    XnBoundingBox3D as BoundingBox3D, XnCropping as Cropping, XnFieldOfView as FieldOfView,
    XnMapOutputMode as MapOutputMode, XnPlane3D as Plane3D,
    XnSkeletonJointPosition as SkeletonJointPosition, XnVector3D as Vector3D,
    XnVersion as Version, XnWaveOutputMode as WaveOutputMode,
};

pub type Point3D = Vector3D;

/// The closed set of wrapped node types, tagged as the native middleware
/// tags them.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Device = ffi::XN_NODE_TYPE_DEVICE,
    Depth = ffi::XN_NODE_TYPE_DEPTH,
    Image = ffi::XN_NODE_TYPE_IMAGE,
    Audio = ffi::XN_NODE_TYPE_AUDIO,
    Ir = ffi::XN_NODE_TYPE_IR,
    User = ffi::XN_NODE_TYPE_USER,
    Recorder = ffi::XN_NODE_TYPE_RECORDER,
    Player = ffi::XN_NODE_TYPE_PLAYER,
    Gesture = ffi::XN_NODE_TYPE_GESTURE,
    Scene = ffi::XN_NODE_TYPE_SCENE,
    Hands = ffi::XN_NODE_TYPE_HANDS,
    Codec = ffi::XN_NODE_TYPE_CODEC,
}

impl NodeType {
    /// Map a native tag to a wrapped type. An unknown tag is a hard error,
    /// never a silent default.
    pub fn from_tag(tag: i32) -> Result<NodeType> {
        match tag {
            ffi::XN_NODE_TYPE_DEVICE => Ok(NodeType::Device),
            ffi::XN_NODE_TYPE_DEPTH => Ok(NodeType::Depth),
            ffi::XN_NODE_TYPE_IMAGE => Ok(NodeType::Image),
            ffi::XN_NODE_TYPE_AUDIO => Ok(NodeType::Audio),
            ffi::XN_NODE_TYPE_IR => Ok(NodeType::Ir),
            ffi::XN_NODE_TYPE_USER => Ok(NodeType::User),
            ffi::XN_NODE_TYPE_RECORDER => Ok(NodeType::Recorder),
            ffi::XN_NODE_TYPE_PLAYER => Ok(NodeType::Player),
            ffi::XN_NODE_TYPE_GESTURE => Ok(NodeType::Gesture),
            ffi::XN_NODE_TYPE_SCENE => Ok(NodeType::Scene),
            ffi::XN_NODE_TYPE_HANDS => Ok(NodeType::Hands),
            ffi::XN_NODE_TYPE_CODEC => Ok(NodeType::Codec),
            other => Err(OpenNiError::UnsupportedNodeType(other)),
        }
    }

    pub const fn tag(self) -> i32 {
        self as i32
    }

    pub const fn name(self) -> &'static str {
        match self {
            NodeType::Device => "Device",
            NodeType::Depth => "Depth",
            NodeType::Image => "Image",
            NodeType::Audio => "Audio",
            NodeType::Ir => "IR",
            NodeType::User => "User",
            NodeType::Recorder => "Recorder",
            NodeType::Player => "Player",
            NodeType::Gesture => "Gesture",
            NodeType::Scene => "Scene",
            NodeType::Hands => "Hands",
            NodeType::Codec => "Codec",
        }
    }

    /// Whether nodes of this type produce per-frame data.
    pub const fn is_generator(self) -> bool {
        matches!(
            self,
            NodeType::Depth
                | NodeType::Image
                | NodeType::Audio
                | NodeType::Ir
                | NodeType::User
                | NodeType::Gesture
                | NodeType::Scene
                | NodeType::Hands
        )
    }

    /// The optional capability interfaces a node of this type exposes.
    pub const fn capabilities(self) -> CapabilitySet {
        match self {
            NodeType::Device => CapabilitySet::DEVICE_IDENTIFICATION,
            NodeType::Depth => CapabilitySet::MAP_COMMON.union(CapabilitySet::USER_POSITION),
            NodeType::Image | NodeType::Ir => CapabilitySet::MAP_COMMON,
            NodeType::Scene => CapabilitySet::MIRROR
                .union(CapabilitySet::CROPPING)
                .union(CapabilitySet::FRAME_SYNC),
            NodeType::User => CapabilitySet::SKELETON.union(CapabilitySet::POSE_DETECTION),
            NodeType::Audio
            | NodeType::Recorder
            | NodeType::Player
            | NodeType::Gesture
            | NodeType::Hands
            | NodeType::Codec => CapabilitySet::empty(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of optional capability interfaces a node exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilitySet: u32 {
        const MIRROR                = 1 << 0;
        const CROPPING              = 1 << 1;
        const ALTERNATIVE_VIEWPOINT = 1 << 2;
        const FRAME_SYNC            = 1 << 3;
        const ANTI_FLICKER          = 1 << 4;
        const USER_POSITION         = 1 << 5;
        const SKELETON              = 1 << 6;
        const POSE_DETECTION        = 1 << 7;
        const DEVICE_IDENTIFICATION = 1 << 8;
    }
}

impl CapabilitySet {
    /// What every map generator carries.
    pub const MAP_COMMON: CapabilitySet = CapabilitySet::MIRROR
        .union(CapabilitySet::CROPPING)
        .union(CapabilitySet::ALTERNATIVE_VIEWPOINT)
        .union(CapabilitySet::FRAME_SYNC)
        .union(CapabilitySet::ANTI_FLICKER);
}

/// Pixel format of map-shaped frame data.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb24 = ffi::XN_PIXEL_FORMAT_RGB24,
    Yuv422 = ffi::XN_PIXEL_FORMAT_YUV422,
    Grayscale8 = ffi::XN_PIXEL_FORMAT_GRAYSCALE_8_BIT,
    Grayscale16 = ffi::XN_PIXEL_FORMAT_GRAYSCALE_16_BIT,
    Mjpeg = ffi::XN_PIXEL_FORMAT_MJPEG,
}

impl PixelFormat {
    pub fn from_raw(raw: u32) -> Option<PixelFormat> {
        match raw {
            ffi::XN_PIXEL_FORMAT_RGB24 => Some(PixelFormat::Rgb24),
            ffi::XN_PIXEL_FORMAT_YUV422 => Some(PixelFormat::Yuv422),
            ffi::XN_PIXEL_FORMAT_GRAYSCALE_8_BIT => Some(PixelFormat::Grayscale8),
            ffi::XN_PIXEL_FORMAT_GRAYSCALE_16_BIT => Some(PixelFormat::Grayscale16),
            ffi::XN_PIXEL_FORMAT_MJPEG => Some(PixelFormat::Mjpeg),
            _ => None,
        }
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Fixed per-pixel stride; `None` for compressed formats.
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgb24 => Some(3),
            PixelFormat::Yuv422 => Some(2),
            PixelFormat::Grayscale8 => Some(1),
            PixelFormat::Grayscale16 => Some(2),
            PixelFormat::Mjpeg => None,
        }
    }
}

/// Power line frequency setting of the anti-flicker capability.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerLineFrequency {
    Off = ffi::XN_POWER_LINE_FREQUENCY_OFF,
    Hz50 = ffi::XN_POWER_LINE_FREQUENCY_50_HZ,
    Hz60 = ffi::XN_POWER_LINE_FREQUENCY_60_HZ,
}

impl PowerLineFrequency {
    pub fn from_raw(raw: u32) -> Option<PowerLineFrequency> {
        match raw {
            ffi::XN_POWER_LINE_FREQUENCY_OFF => Some(PowerLineFrequency::Off),
            ffi::XN_POWER_LINE_FREQUENCY_50_HZ => Some(PowerLineFrequency::Hz50),
            ffi::XN_POWER_LINE_FREQUENCY_60_HZ => Some(PowerLineFrequency::Hz60),
            _ => None,
        }
    }
}

/// Skeleton profile: which joint groups tracking should produce.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonProfile {
    None = 1,
    All = 2,
    Upper = 3,
    Lower = 4,
    HeadHands = 5,
}

/// Tracked skeleton joints.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkeletonJoint {
    Head = 1,
    Neck = 2,
    Torso = 3,
    Waist = 4,
    LeftCollar = 5,
    LeftShoulder = 6,
    LeftElbow = 7,
    LeftWrist = 8,
    LeftHand = 9,
    LeftFingertip = 10,
    RightCollar = 11,
    RightShoulder = 12,
    RightElbow = 13,
    RightWrist = 14,
    RightHand = 15,
    RightFingertip = 16,
    LeftHip = 17,
    LeftKnee = 18,
    LeftAnkle = 19,
    LeftFoot = 20,
    RightHip = 21,
    RightKnee = 22,
    RightAnkle = 23,
    RightFoot = 24,
}

/// Codec four-character identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecId(pub u32);

impl CodecId {
    pub const NULL: CodecId = CodecId(ffi::XN_CODEC_NULL);
    pub const UNCOMPRESSED: CodecId = CodecId(ffi::XN_CODEC_UNCOMPRESSED);
    pub const Z16: CodecId = CodecId(ffi::XN_CODEC_16Z);
}

/// Where a recording is written to / read from.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMedium {
    File = ffi::XN_RECORD_MEDIUM_FILE,
}

/// Origin for player seeks.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Set = 0,
    Current = 1,
    End = 2,
}

/// Identity of a node implementation, in managed form.
#[derive(Debug, Clone)]
pub struct NodeDescription {
    pub node_type: i32,
    pub vendor: String,
    pub name: String,
    pub version: Version,
}

impl NodeDescription {
    pub(crate) fn from_native(native: ffi::XnProductionNodeDescription) -> Self {
        let vendor = native.vendor;
        let name = native.name;
        Self {
            node_type: native.node_type,
            vendor: ffi::types::fixed_to_string(&vendor),
            name: ffi::types::fixed_to_string(&name),
            version: native.version,
        }
    }
}

impl fmt::Display for NodeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.version;
        let (major, minor, maintenance, build) = (v.major, v.minor, v.maintenance, v.build);
        write!(
            f,
            "{}/{} v{}.{}.{}.{}",
            self.vendor, self.name, major, minor, maintenance, build
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_strides() {
        assert_eq!(PixelFormat::Rgb24.bytes_per_pixel(), Some(3));
        assert_eq!(PixelFormat::Yuv422.bytes_per_pixel(), Some(2));
        assert_eq!(PixelFormat::Grayscale8.bytes_per_pixel(), Some(1));
        assert_eq!(PixelFormat::Grayscale16.bytes_per_pixel(), Some(2));
        assert_eq!(
            PixelFormat::Mjpeg.bytes_per_pixel(),
            None,
            "compressed formats have no fixed stride"
        );
    }

    #[test]
    fn pixel_format_raw_round_trip() {
        for format in [
            PixelFormat::Rgb24,
            PixelFormat::Yuv422,
            PixelFormat::Grayscale8,
            PixelFormat::Grayscale16,
            PixelFormat::Mjpeg,
        ] {
            assert_eq!(PixelFormat::from_raw(format.raw()), Some(format));
        }
        assert_eq!(PixelFormat::from_raw(0), None);
        assert_eq!(PixelFormat::from_raw(99), None);
    }

    #[test]
    fn node_type_tags_round_trip() {
        for tag in 1..=12 {
            let ty = NodeType::from_tag(tag).expect("defined tag");
            assert_eq!(ty.tag(), tag);
        }
    }

    #[test]
    fn map_generators_share_the_common_capability_set() {
        for ty in [NodeType::Depth, NodeType::Image, NodeType::Ir] {
            assert!(ty.capabilities().contains(CapabilitySet::MAP_COMMON));
        }
        assert!(NodeType::Depth
            .capabilities()
            .contains(CapabilitySet::USER_POSITION));
        assert!(NodeType::Codec.capabilities().is_empty());
    }
}
