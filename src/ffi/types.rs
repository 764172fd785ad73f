//! Native data types, bit-exact against the middleware ABI.
//!
//! Every record here mirrors the native layout exactly: field order, sizes
//! and single-byte packing. Keep this file in sync with the native headers;
//! the middleware addresses these by offset, not by name.

use std::os::raw::{c_char, c_void};

use super::handles::XnNodeHandle;

/// Native status word: 0 is success, otherwise `(group << 16) | code`.
pub type XnStatus = u32;

/// Native boolean (32-bit).
pub type XnBool = u32;

pub const XN_TRUE: XnBool = 1;
pub const XN_FALSE: XnBool = 0;

/// One depth sample, in millimeters.
pub type XnDepthPixel = u16;
/// One IR sample.
pub type XnIRPixel = u16;
/// One scene-segmentation label.
pub type XnLabel = u16;
/// Identifier of a tracked user.
pub type XnUserID = u32;
/// Confidence of a tracked joint, 0..1.
pub type XnConfidence = f32;
/// Four-character codec identifier.
pub type XnCodecID = u32;

pub const XN_MAX_NAME_LENGTH: usize = 80;

// Error groups (upper 16 bits of a status word).
pub const XN_ERROR_GROUP_NI: u16 = 1;
pub const XN_ERROR_GROUP_OS: u16 = 2;
pub const XN_ERROR_GROUP_PRIMESENSE: u16 = 3;

pub const fn xn_status_make(group: u16, code: u16) -> XnStatus {
    ((group as u32) << 16) | code as u32
}

const fn ni_status(code: u16) -> XnStatus {
    xn_status_make(XN_ERROR_GROUP_NI, code)
}

pub const XN_STATUS_OK: XnStatus = 0;
pub const XN_STATUS_ERROR: XnStatus = ni_status(0);
pub const XN_STATUS_OUTPUT_BUFFER_OVERFLOW: XnStatus = ni_status(6);
pub const XN_STATUS_NO_MATCH: XnStatus = ni_status(9);
pub const XN_STATUS_IS_EMPTY: XnStatus = ni_status(10);
pub const XN_STATUS_NOT_IMPLEMENTED: XnStatus = ni_status(13);
pub const XN_STATUS_INVALID_OPERATION: XnStatus = ni_status(17);
pub const XN_STATUS_MISSING_NEEDED_TREE: XnStatus = ni_status(18);
pub const XN_STATUS_BAD_PARAM: XnStatus = ni_status(20);
pub const XN_STATUS_NODE_IS_LOCKED: XnStatus = ni_status(21);
pub const XN_STATUS_WAIT_DATA_TIMEOUT: XnStatus = ni_status(22);
pub const XN_STATUS_BAD_TYPE: XnStatus = ni_status(23);
pub const XN_STATUS_UNSUPPORTED_VERSION: XnStatus = ni_status(24);
pub const XN_STATUS_PROPERTY_NOT_SET: XnStatus = ni_status(25);
pub const XN_STATUS_NODE_NOT_LOADED: XnStatus = ni_status(27);
pub const XN_STATUS_NO_NODE_PRESENT: XnStatus = ni_status(28);
pub const XN_STATUS_BAD_NODE_NAME: XnStatus = ni_status(29);
pub const XN_STATUS_UNSUPPORTED_CODEC: XnStatus = ni_status(30);
pub const XN_STATUS_EOF: XnStatus = ni_status(31);
pub const XN_STATUS_DEVICE_NOT_CONNECTED: XnStatus = ni_status(33);
pub const XN_STATUS_NO_SUCH_PROPERTY: XnStatus = ni_status(35);
pub const XN_STATUS_NODE_ALREADY_RECORDED: XnStatus = ni_status(36);
pub const XN_STATUS_NO_SUCH_USER: XnStatus = ni_status(42);
pub const XN_STATUS_USER_IS_NOT_BEING_TRACKED: XnStatus = ni_status(43);
pub const XN_STATUS_JOINT_IS_NOT_ACTIVE: XnStatus = ni_status(44);

/// Node type tag. Signed: -1 marks an invalid/unknown type.
pub type XnProductionNodeType = i32;

pub const XN_NODE_TYPE_INVALID: XnProductionNodeType = -1;
pub const XN_NODE_TYPE_DEVICE: XnProductionNodeType = 1;
pub const XN_NODE_TYPE_DEPTH: XnProductionNodeType = 2;
pub const XN_NODE_TYPE_IMAGE: XnProductionNodeType = 3;
pub const XN_NODE_TYPE_AUDIO: XnProductionNodeType = 4;
pub const XN_NODE_TYPE_IR: XnProductionNodeType = 5;
pub const XN_NODE_TYPE_USER: XnProductionNodeType = 6;
pub const XN_NODE_TYPE_RECORDER: XnProductionNodeType = 7;
pub const XN_NODE_TYPE_PLAYER: XnProductionNodeType = 8;
pub const XN_NODE_TYPE_GESTURE: XnProductionNodeType = 9;
pub const XN_NODE_TYPE_SCENE: XnProductionNodeType = 10;
pub const XN_NODE_TYPE_HANDS: XnProductionNodeType = 11;
pub const XN_NODE_TYPE_CODEC: XnProductionNodeType = 12;
pub const XN_NODE_TYPE_SCRIPT: XnProductionNodeType = 16;

/// Pixel format of a map generator's output.
pub type XnPixelFormat = u32;

pub const XN_PIXEL_FORMAT_RGB24: XnPixelFormat = 1;
pub const XN_PIXEL_FORMAT_YUV422: XnPixelFormat = 2;
pub const XN_PIXEL_FORMAT_GRAYSCALE_8_BIT: XnPixelFormat = 3;
pub const XN_PIXEL_FORMAT_GRAYSCALE_16_BIT: XnPixelFormat = 4;
pub const XN_PIXEL_FORMAT_MJPEG: XnPixelFormat = 5;

/// Power line frequency for the anti-flicker capability.
pub type XnPowerLineFrequency = u32;

pub const XN_POWER_LINE_FREQUENCY_OFF: XnPowerLineFrequency = 0;
pub const XN_POWER_LINE_FREQUENCY_50_HZ: XnPowerLineFrequency = 50;
pub const XN_POWER_LINE_FREQUENCY_60_HZ: XnPowerLineFrequency = 60;

/// Recording destination medium.
pub type XnRecordMedium = u32;

pub const XN_RECORD_MEDIUM_FILE: XnRecordMedium = 0;

pub const fn xn_codec_id(a: u8, b: u8, c: u8, d: u8) -> XnCodecID {
    ((d as u32) << 24) | ((c as u32) << 16) | ((b as u32) << 8) | a as u32
}

pub const XN_CODEC_NULL: XnCodecID = 0;
pub const XN_CODEC_UNCOMPRESSED: XnCodecID = xn_codec_id(b'N', b'O', b'N', b'E');
pub const XN_CODEC_16Z: XnCodecID = xn_codec_id(b'1', b'6', b'z', b'P');

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XnVersion {
    pub major: u8,
    pub minor: u8,
    pub maintenance: u16,
    pub build: u32,
}

/// Identity of a node implementation: type, vendor, name, version.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct XnProductionNodeDescription {
    pub node_type: XnProductionNodeType,
    pub vendor: [c_char; XN_MAX_NAME_LENGTH],
    pub name: [c_char; XN_MAX_NAME_LENGTH],
    pub version: XnVersion,
}

impl Default for XnProductionNodeDescription {
    fn default() -> Self {
        Self {
            node_type: XN_NODE_TYPE_INVALID,
            vendor: [0; XN_MAX_NAME_LENGTH],
            name: [0; XN_MAX_NAME_LENGTH],
            version: XnVersion::default(),
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XnMapOutputMode {
    pub x_res: u32,
    pub y_res: u32,
    pub fps: u32,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XnWaveOutputMode {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u8,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XnVector3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

pub type XnPoint3D = XnVector3D;

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XnBoundingBox3D {
    pub left_bottom_near: XnPoint3D,
    pub right_top_far: XnPoint3D,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XnPlane3D {
    pub normal: XnVector3D,
    pub point: XnPoint3D,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XnCropping {
    pub enabled: XnBool,
    pub x_offset: u16,
    pub y_offset: u16,
    pub x_size: u16,
    pub y_size: u16,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XnFieldOfView {
    /// Horizontal field of view, in radians.
    pub h_fov: f64,
    /// Vertical field of view, in radians.
    pub v_fov: f64,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XnUInt32XYPair {
    pub x: u32,
    pub y: u32,
}

/// General header of one frame of generated data.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default)]
pub struct XnOutputMetaData {
    /// Time the data was captured, in microseconds.
    pub timestamp: u64,
    pub frame_id: u32,
    pub data_size: u32,
    /// Whether the last wait/update call refreshed this data.
    pub is_new: XnBool,
}

/// Header of one frame of map-shaped data. `output` points at a separately
/// allocated [`XnOutputMetaData`]; the middleware follows the pointer.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct XnMapMetaData {
    pub output: *mut XnOutputMetaData,
    /// Resolution of this frame, cropping applied.
    pub res: XnUInt32XYPair,
    /// Offset of the cropped region, (0,0) when uncropped.
    pub offset: XnUInt32XYPair,
    /// Full resolution, disregarding cropping.
    pub full_res: XnUInt32XYPair,
    pub pixel_format: XnPixelFormat,
    pub fps: u32,
}

impl Default for XnMapMetaData {
    fn default() -> Self {
        Self {
            output: std::ptr::null_mut(),
            res: XnUInt32XYPair::default(),
            offset: XnUInt32XYPair::default(),
            full_res: XnUInt32XYPair::default(),
            pixel_format: XN_PIXEL_FORMAT_GRAYSCALE_16_BIT,
            fps: 0,
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct XnDepthMetaData {
    pub map: *mut XnMapMetaData,
    /// Depth samples, owned by the generator. Valid until the next update.
    pub data: *const XnDepthPixel,
    /// Maximum depth a sample can carry.
    pub z_res: XnDepthPixel,
}

impl Default for XnDepthMetaData {
    fn default() -> Self {
        Self {
            map: std::ptr::null_mut(),
            data: std::ptr::null(),
            z_res: 0,
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct XnImageMetaData {
    pub map: *mut XnMapMetaData,
    pub data: *const u8,
}

impl Default for XnImageMetaData {
    fn default() -> Self {
        Self {
            map: std::ptr::null_mut(),
            data: std::ptr::null(),
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct XnIRMetaData {
    pub map: *mut XnMapMetaData,
    pub data: *const XnIRPixel,
}

impl Default for XnIRMetaData {
    fn default() -> Self {
        Self {
            map: std::ptr::null_mut(),
            data: std::ptr::null(),
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct XnSceneMetaData {
    pub map: *mut XnMapMetaData,
    pub data: *const XnLabel,
}

impl Default for XnSceneMetaData {
    fn default() -> Self {
        Self {
            map: std::ptr::null_mut(),
            data: std::ptr::null(),
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct XnAudioMetaData {
    pub output: *mut XnOutputMetaData,
    pub wave: XnWaveOutputMode,
    pub data: *const u8,
}

impl Default for XnAudioMetaData {
    fn default() -> Self {
        Self {
            output: std::ptr::null_mut(),
            wave: XnWaveOutputMode::default(),
            data: std::ptr::null(),
        }
    }
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XnRGB24Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XnSkeletonJointPosition {
    pub position: XnVector3D,
    pub confidence: XnConfidence,
}

/// By-value cursor over a node info list.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XnNodeInfoListIterator {
    pub current: *mut c_void,
}

/// By-value cursor over an enumeration error collection.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XnEnumerationErrorsIterator {
    pub current: *mut c_void,
}

// Capability names, as probed through `xnIsCapabilitySupported`.
pub const XN_CAPABILITY_MIRROR: &std::ffi::CStr = c"Mirror";
pub const XN_CAPABILITY_CROPPING: &std::ffi::CStr = c"Cropping";
pub const XN_CAPABILITY_ALTERNATIVE_VIEW_POINT: &std::ffi::CStr = c"AlternativeViewPoint";
pub const XN_CAPABILITY_FRAME_SYNC: &std::ffi::CStr = c"FrameSync";
pub const XN_CAPABILITY_USER_POSITION: &std::ffi::CStr = c"UserPosition";
pub const XN_CAPABILITY_SKELETON: &std::ffi::CStr = c"User::Skeleton";
pub const XN_CAPABILITY_POSE_DETECTION: &std::ffi::CStr = c"User::PoseDetection";
pub const XN_CAPABILITY_ANTI_FLICKER: &std::ffi::CStr = c"AntiFlicker";
pub const XN_CAPABILITY_DEVICE_IDENTIFICATION: &std::ffi::CStr = c"DeviceIdentification";

// Callback ABI. Registration functions return an XnCallbackHandle token
// through an out parameter; the same token unregisters.

pub type XnStateChangedHandler = unsafe extern "C" fn(node: XnNodeHandle, cookie: *mut c_void);

pub type XnErrorStateChangedHandler =
    unsafe extern "C" fn(error_state: XnStatus, cookie: *mut c_void);

pub type XnUserHandler =
    unsafe extern "C" fn(node: XnNodeHandle, user: XnUserID, cookie: *mut c_void);

pub type XnGestureRecognized = unsafe extern "C" fn(
    node: XnNodeHandle,
    gesture: *const c_char,
    id_position: *const XnPoint3D,
    end_position: *const XnPoint3D,
    cookie: *mut c_void,
);

pub type XnGestureProgress = unsafe extern "C" fn(
    node: XnNodeHandle,
    gesture: *const c_char,
    position: *const XnPoint3D,
    progress: f32,
    cookie: *mut c_void,
);

pub type XnHandCreate = unsafe extern "C" fn(
    node: XnNodeHandle,
    user: XnUserID,
    position: *const XnPoint3D,
    time: f32,
    cookie: *mut c_void,
);

pub type XnHandUpdate = XnHandCreate;

pub type XnHandDestroy =
    unsafe extern "C" fn(node: XnNodeHandle, user: XnUserID, time: f32, cookie: *mut c_void);

pub type XnPoseDetectionCallback = unsafe extern "C" fn(
    node: XnNodeHandle,
    pose: *const c_char,
    user: XnUserID,
    cookie: *mut c_void,
);

/// Copy a Rust string into a fixed native char array, NUL-terminated and
/// truncated to fit.
pub(crate) fn str_to_fixed<const N: usize>(s: &str) -> [c_char; N] {
    let mut buf = [0 as c_char; N];
    let bytes = s.as_bytes();
    let len = bytes.len().min(N - 1);
    for (i, &b) in bytes[..len].iter().enumerate() {
        buf[i] = b as c_char;
    }
    buf
}

/// Read a NUL-terminated fixed native char array into an owned string.
pub(crate) fn fixed_to_string(buf: &[c_char]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    let bytes: Vec<u8> = buf[..end].iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).to_string()
}
