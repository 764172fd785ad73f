//! Object table and frame machinery of the software backend.
//!
//! One process-wide [`Runtime`] owns every emulated object, keyed by the
//! pointer-sized ids handed out as handles. Objects are boxed so interior
//! pointers (descriptions, name strings, frame buffers) stay put while the
//! table grows.

use std::collections::HashMap;
use std::ffi::CString;
use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::ffi::handles::XnNodeHandle;
use crate::ffi::types::*;

pub(super) static RUNTIME: LazyLock<Mutex<Runtime>> =
    LazyLock::new(|| Mutex::new(Runtime::new()));

pub(super) fn runtime() -> MutexGuard<'static, Runtime> {
    // A poisoned table would mean a panic inside the backend itself; the
    // bookkeeping is still consistent, so keep going.
    RUNTIME.lock().unwrap_or_else(|e| e.into_inner())
}

pub(super) struct Runtime {
    next_id: usize,
    pub contexts: HashMap<usize, Box<ContextObj>>,
    pub nodes: HashMap<usize, Box<NodeObj>>,
    pub infos: HashMap<usize, Box<NodeInfoObj>>,
    pub lists: HashMap<usize, Box<ListObj>>,
    pub queries: HashMap<usize, Box<QueryObj>>,
    pub errors: HashMap<usize, Box<ErrorsObj>>,
}

impl Runtime {
    fn new() -> Self {
        Self {
            next_id: 1,
            contexts: HashMap::new(),
            nodes: HashMap::new(),
            infos: HashMap::new(),
            lists: HashMap::new(),
            queries: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn alloc_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub(super) struct ContextObj {
    pub refs: u32,
    pub nodes: Vec<usize>,
    pub global_mirror: bool,
    pub error_state_callbacks: Vec<ErrorStateReg>,
}

pub(super) struct ErrorStateReg {
    pub id: usize,
    pub handler: XnErrorStateChangedHandler,
    pub cookie: usize,
}

/// Which node event a registration listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EventKind {
    GenerationRunning,
    NewData,
    MapOutputMode,
    Mirror,
    Cropping,
    PixelFormat,
    WaveOutputMode,
    PowerLineFrequency,
    ViewPoint,
    EndOfFile,
    User,
    Gesture,
    Hand,
    PoseDetected,
}

pub(super) enum EventFn {
    State(XnStateChangedHandler),
    User {
        new_user: XnUserHandler,
        lost_user: XnUserHandler,
    },
    Gesture {
        recognized: XnGestureRecognized,
        progress: XnGestureProgress,
    },
    Hand {
        create: XnHandCreate,
        update: XnHandUpdate,
        destroy: XnHandDestroy,
    },
    Pose(XnPoseDetectionCallback),
}

pub(super) struct CallbackReg {
    pub id: usize,
    pub kind: EventKind,
    pub func: EventFn,
    pub cookie: usize,
}

#[derive(Default)]
pub(super) struct FrameState {
    pub frame_id: u32,
    pub timestamp: u64,
    pub data: Vec<u8>,
    pub is_new: bool,
    /// Injected frame waiting to be latched by the next update (mock nodes).
    pub pending: Option<(u32, u64, Vec<u8>)>,
}

pub(super) struct NodeObj {
    pub refs: u32,
    pub context: usize,
    pub node_type: XnProductionNodeType,
    pub mock: bool,
    pub name: CString,
    pub description: XnProductionNodeDescription,
    pub creation_info: CString,
    /// Info object describing this live node, created lazily.
    pub info: usize,
    pub needed: Vec<usize>,
    pub generating: bool,
    pub mirror: bool,
    pub map_mode: XnMapOutputMode,
    pub supported_modes: Vec<XnMapOutputMode>,
    pub pixel_format: XnPixelFormat,
    pub wave_mode: XnWaveOutputMode,
    pub cropping: XnCropping,
    pub power_line: XnPowerLineFrequency,
    pub view_point: Option<usize>,
    pub frame_synced: Vec<usize>,
    pub z_res: XnDepthPixel,
    pub user_positions: Vec<XnBoundingBox3D>,
    pub frame: FrameState,
    pub callbacks: Vec<CallbackReg>,
    pub int_props: HashMap<String, u64>,
    pub real_props: HashMap<String, f64>,
    pub string_props: HashMap<String, CString>,
    pub general_props: HashMap<String, Vec<u8>>,
    /// Tracking bookkeeping (user/hands/gesture nodes).
    pub users: Vec<XnUserID>,
    pub tracked_users: Vec<XnUserID>,
    pub skeleton_profile: u32,
    pub pose_detection: Vec<(XnUserID, CString)>,
    pub active_gestures: Vec<CString>,
    pub pending_gesture_events: Vec<CString>,
    pub tracked_hands: Vec<XnUserID>,
    pub next_hand_id: XnUserID,
    /// Recorder bookkeeping.
    pub recorded_nodes: Vec<(usize, XnCodecID)>,
    pub record_destination: Option<(XnRecordMedium, CString)>,
    pub frames_recorded: u32,
    /// Player bookkeeping.
    pub player_repeat: bool,
    pub player_source: Option<(XnRecordMedium, CString)>,
    pub player_frame: u32,
    pub player_num_frames: u32,
    pub player_eof: bool,
    /// Codec bookkeeping.
    pub codec_id: XnCodecID,
}

impl NodeObj {
    pub fn new(context: usize, node_type: XnProductionNodeType, name: CString, mock: bool) -> Self {
        let impl_name = match (mock, node_type) {
            (true, XN_NODE_TYPE_DEPTH) => "MockDepth",
            (true, XN_NODE_TYPE_IMAGE) => "MockImage",
            (true, XN_NODE_TYPE_IR) => "MockIR",
            (true, XN_NODE_TYPE_AUDIO) => "MockAudio",
            (true, _) => "MockRaw",
            (false, _) => "Emulation",
        };
        let description = XnProductionNodeDescription {
            node_type,
            vendor: str_to_fixed("OpenNI"),
            name: str_to_fixed(impl_name),
            version: XnVersion {
                major: 1,
                minor: 5,
                maintenance: 0,
                build: 0,
            },
        };
        let default_mode = XnMapOutputMode {
            x_res: 320,
            y_res: 240,
            fps: 30,
        };
        Self {
            refs: 1,
            context,
            node_type,
            mock,
            name,
            description,
            creation_info: CString::default(),
            info: 0,
            needed: Vec::new(),
            generating: false,
            mirror: false,
            map_mode: default_mode,
            supported_modes: vec![
                default_mode,
                XnMapOutputMode {
                    x_res: 640,
                    y_res: 480,
                    fps: 30,
                },
                XnMapOutputMode {
                    x_res: 640,
                    y_res: 480,
                    fps: 60,
                },
            ],
            pixel_format: match node_type {
                XN_NODE_TYPE_IMAGE => XN_PIXEL_FORMAT_RGB24,
                _ => XN_PIXEL_FORMAT_GRAYSCALE_16_BIT,
            },
            wave_mode: XnWaveOutputMode {
                sample_rate: 48000,
                bits_per_sample: 16,
                channels: 2,
            },
            cropping: XnCropping::default(),
            power_line: XN_POWER_LINE_FREQUENCY_OFF,
            view_point: None,
            frame_synced: Vec::new(),
            z_res: 10000,
            user_positions: vec![XnBoundingBox3D::default(); 4],
            frame: FrameState::default(),
            callbacks: Vec::new(),
            int_props: HashMap::new(),
            real_props: HashMap::new(),
            string_props: HashMap::new(),
            general_props: HashMap::new(),
            users: Vec::new(),
            tracked_users: Vec::new(),
            skeleton_profile: 0,
            pose_detection: Vec::new(),
            active_gestures: Vec::new(),
            pending_gesture_events: Vec::new(),
            tracked_hands: Vec::new(),
            next_hand_id: 1,
            recorded_nodes: Vec::new(),
            record_destination: None,
            frames_recorded: 0,
            player_repeat: false,
            player_source: None,
            player_frame: 0,
            player_num_frames: 100,
            player_eof: false,
            codec_id: XN_CODEC_NULL,
        }
    }

    pub fn is_generator(&self) -> bool {
        matches!(
            self.node_type,
            XN_NODE_TYPE_DEPTH
                | XN_NODE_TYPE_IMAGE
                | XN_NODE_TYPE_IR
                | XN_NODE_TYPE_AUDIO
                | XN_NODE_TYPE_USER
                | XN_NODE_TYPE_GESTURE
                | XN_NODE_TYPE_SCENE
                | XN_NODE_TYPE_HANDS
        )
    }

    pub fn is_map_generator(&self) -> bool {
        matches!(
            self.node_type,
            XN_NODE_TYPE_DEPTH | XN_NODE_TYPE_IMAGE | XN_NODE_TYPE_IR | XN_NODE_TYPE_SCENE
        )
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self.node_type {
            XN_NODE_TYPE_DEPTH | XN_NODE_TYPE_SCENE => 2,
            _ => match self.pixel_format {
                XN_PIXEL_FORMAT_RGB24 => 3,
                XN_PIXEL_FORMAT_YUV422 => 2,
                XN_PIXEL_FORMAT_GRAYSCALE_8_BIT => 1,
                _ => 2,
            },
        }
    }

    /// Which capability names this node answers `true` for.
    pub fn supports_capability(&self, name: &str) -> bool {
        let map_caps = [
            "Mirror",
            "Cropping",
            "AlternativeViewPoint",
            "FrameSync",
            "AntiFlicker",
        ];
        match self.node_type {
            XN_NODE_TYPE_DEVICE => name == "DeviceIdentification",
            XN_NODE_TYPE_DEPTH => map_caps.contains(&name) || name == "UserPosition",
            XN_NODE_TYPE_IMAGE | XN_NODE_TYPE_IR => map_caps.contains(&name),
            XN_NODE_TYPE_SCENE => matches!(name, "Mirror" | "Cropping" | "FrameSync"),
            XN_NODE_TYPE_USER => matches!(name, "User::Skeleton" | "User::PoseDetection"),
            _ => false,
        }
    }

    /// Advance to the next frame: latch an injected frame (mock) or
    /// synthesize one. Returns true when the frame changed.
    pub fn advance_frame(&mut self) -> bool {
        if self.mock {
            match self.frame.pending.take() {
                Some((frame_id, timestamp, data)) => {
                    self.frame.frame_id = frame_id;
                    self.frame.timestamp = timestamp;
                    self.frame.data = data;
                    self.frame.is_new = true;
                    true
                }
                None => {
                    self.frame.is_new = false;
                    false
                }
            }
        } else {
            self.frame.frame_id = self.frame.frame_id.wrapping_add(1);
            self.frame.timestamp += 1_000_000 / u64::from(self.map_mode.fps.max(1));
            self.synthesize();
            self.frame.is_new = true;
            true
        }
    }

    fn synthesize(&mut self) {
        let mode = self.map_mode;
        let frame = self.frame.frame_id;
        match self.node_type {
            XN_NODE_TYPE_DEPTH => {
                let (w, h) = (mode.x_res as usize, mode.y_res as usize);
                self.frame.data.resize(w * h * 2, 0);
                let max = u32::from(self.z_res);
                for y in 0..h {
                    for x in 0..w {
                        // Sloped test pattern, always within (0, z_res).
                        let v = 300 + (x as u32 + y as u32 + 13 * frame) % (max - 600);
                        let i = (y * w + x) * 2;
                        self.frame.data[i..i + 2].copy_from_slice(&(v as u16).to_ne_bytes());
                    }
                }
            }
            XN_NODE_TYPE_IMAGE | XN_NODE_TYPE_IR => {
                let (w, h) = (mode.x_res as usize, mode.y_res as usize);
                let bpp = self.bytes_per_pixel();
                self.frame.data.resize(w * h * bpp, 0);
                for (i, b) in self.frame.data.iter_mut().enumerate() {
                    *b = ((i as u32).wrapping_add(frame * 31) & 0xff) as u8;
                }
            }
            XN_NODE_TYPE_SCENE => {
                let (w, h) = (mode.x_res as usize, mode.y_res as usize);
                self.frame.data.resize(w * h * 2, 0);
                // Label 1 in the center quarter, background 0 elsewhere.
                for y in 0..h {
                    for x in 0..w {
                        let label: u16 =
                            if x > w / 4 && x < 3 * w / 4 && y > h / 4 && y < 3 * h / 4 {
                                1
                            } else {
                                0
                            };
                        let i = (y * w + x) * 2;
                        self.frame.data[i..i + 2].copy_from_slice(&label.to_ne_bytes());
                    }
                }
            }
            XN_NODE_TYPE_AUDIO => {
                let chunk = (self.wave_mode.sample_rate / 30) as usize
                    * usize::from(self.wave_mode.channels)
                    * usize::from(self.wave_mode.bits_per_sample / 8);
                self.frame.data.resize(chunk, 0);
                for (i, b) in self.frame.data.iter_mut().enumerate() {
                    *b = ((i as u32).wrapping_mul(frame) & 0xff) as u8;
                }
            }
            // Tracking nodes carry no frame buffer of their own.
            _ => {
                self.frame.data.clear();
            }
        }
    }
}

pub(super) struct NodeInfoObj {
    pub description: XnProductionNodeDescription,
    pub instance_name: CString,
    pub creation_info: CString,
    /// Link to the next descriptor in the owning list, 0 at the tail.
    pub next: usize,
    /// Live node this info refers to, when attached to one.
    pub node: usize,
}

pub(super) struct ListObj {
    pub first: usize,
    pub infos: Vec<usize>,
}

#[derive(Default)]
pub(super) struct QueryObj {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub min_version: Option<XnVersion>,
    pub capabilities: Vec<String>,
    pub map_modes: Vec<XnMapOutputMode>,
}

impl QueryObj {
    pub fn matches(&self, descr: &XnProductionNodeDescription) -> bool {
        if let Some(vendor) = &self.vendor {
            if fixed_to_string(&descr.vendor) != *vendor {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if fixed_to_string(&descr.name) != *name {
                return false;
            }
        }
        if let Some(min) = &self.min_version {
            let v = descr.version;
            if (v.major, v.minor) < (min.major, min.minor) {
                return false;
            }
        }
        true
    }
}

pub(super) struct ErrorEntry {
    pub description: XnProductionNodeDescription,
    pub status: XnStatus,
    pub next: usize,
}

pub(super) struct ErrorsObj {
    pub first: usize,
    /// Entries are boxed so iterator handles can point at them directly.
    pub entries: HashMap<usize, Box<ErrorEntry>>,
}

/// A callback invocation collected under the table lock and fired after it
/// is released, so handlers can call back into the API.
pub(super) enum Fire {
    State(XnStateChangedHandler, XnNodeHandle, usize),
    User(XnUserHandler, XnNodeHandle, XnUserID, usize),
    GestureRecognized(XnGestureRecognized, XnNodeHandle, CString, XnPoint3D, XnPoint3D, usize),
    Hand(XnHandCreate, XnNodeHandle, XnUserID, XnPoint3D, f32, usize),
    HandDestroy(XnHandDestroy, XnNodeHandle, XnUserID, f32, usize),
    Pose(XnPoseDetectionCallback, XnNodeHandle, CString, XnUserID, usize),
}

pub(super) fn dispatch(fires: Vec<Fire>) {
    for fire in fires {
        unsafe {
            match fire {
                Fire::State(f, node, cookie) => f(node, cookie as *mut _),
                Fire::User(f, node, user, cookie) => f(node, user, cookie as *mut _),
                Fire::GestureRecognized(f, node, gesture, id_pos, end_pos, cookie) => {
                    f(node, gesture.as_ptr(), &id_pos, &end_pos, cookie as *mut _)
                }
                Fire::Hand(f, node, user, pos, time, cookie) => {
                    f(node, user, &pos, time, cookie as *mut _)
                }
                Fire::HandDestroy(f, node, user, time, cookie) => {
                    f(node, user, time, cookie as *mut _)
                }
                Fire::Pose(f, node, pose, user, cookie) => {
                    f(node, pose.as_ptr(), user, cookie as *mut _)
                }
            }
        }
    }
}

/// Collect state-style callbacks of one kind registered on a node.
pub(super) fn state_fires(node: &NodeObj, handle: XnNodeHandle, kind: EventKind) -> Vec<Fire> {
    node.callbacks
        .iter()
        .filter(|reg| reg.kind == kind)
        .filter_map(|reg| match reg.func {
            EventFn::State(f) => Some(Fire::State(f, handle, reg.cookie)),
            _ => None,
        })
        .collect()
}
