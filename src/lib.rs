//! # openni - Rust bindings for the OpenNI sensor middleware
//!
//! Safe wrappers over the middleware's C API. Provides:
//! - Context and production node graph management
//! - Depth/image/IR/audio generators with zero-copy frame access
//! - User, gesture and hands tracking with Rust event subscriptions
//! - Mock generators, recording and playback
//!
//! By default the crate carries an in-process software backend and needs
//! no native install; enable the `system` feature to link the installed
//! middleware instead.
//!
//! ## Quick Start
//! ```no_run
//! use openni::{Context, DepthGenerator, DepthMetaData, MapOutputMode};
//!
//! let context = Context::init().unwrap();
//! let depth = DepthGenerator::create(&context).unwrap();
//! depth.set_map_output_mode(MapOutputMode { x_res: 640, y_res: 480, fps: 30 }).unwrap();
//! depth.start_generating().unwrap();
//!
//! let mut md = DepthMetaData::new();
//! for _ in 0..100 {
//!     context.wait_and_update_all().unwrap();
//!     depth.metadata(&mut md).unwrap();
//!     let center = unsafe { md.depth_map().at_unchecked(320, 240) };
//!     println!("frame {}: center depth {} mm", md.frame_id(), center);
//! }
//! ```

pub mod audio;
pub mod capability;
pub mod codec;
pub mod context;
pub mod depth;
pub mod device;
pub mod enum_errors;
pub mod error;
pub mod event;
pub mod ffi;
pub mod generator;
pub mod gesture;
pub mod hands;
pub mod image;
pub mod ir;
pub mod map;
pub mod metadata;
pub mod node;
pub mod node_info;
pub mod node_info_list;
pub mod player;
pub mod query;
pub mod recorder;
pub mod scene;
pub mod types;
pub mod user;

mod marshal;
mod resource;

pub use audio::{AudioGenerator, MockAudioGenerator};
pub use capability::{
    AlternativeViewpointCapability, AntiFlickerCapability, CroppingCapability,
    DeviceIdentificationCapability, FrameSyncCapability, MirrorCapability,
    UserPositionCapability,
};
pub use codec::Codec;
pub use context::Context;
pub use depth::{DepthGenerator, MockDepthGenerator};
pub use device::Device;
pub use enum_errors::EnumerationErrors;
pub use error::{EnumerationError, OpenNiError, Status};
pub use event::{StateChangedEvent, SubscriptionId};
pub use gesture::GestureGenerator;
pub use hands::HandsGenerator;
pub use image::{ImageGenerator, MockImageGenerator};
pub use ir::{IrGenerator, MockIrGenerator};
pub use map::{MapView, MapViewMut};
pub use metadata::{
    AudioMetaData, DepthMetaData, ImageMetaData, IrMetaData, Rgb24Pixel, SceneMetaData,
};
pub use node::{AnyNode, ProductionNode};
pub use node_info::NodeInfo;
pub use node_info_list::NodeInfoList;
pub use player::Player;
pub use query::Query;
pub use recorder::Recorder;
pub use scene::SceneAnalyzer;
pub use generator::{Generator, MapGenerator};
pub use types::*;
pub use user::{PoseDetectionCapability, SkeletonCapability, UserGenerator};

/// Result type alias for openni operations.
pub type Result<T> = std::result::Result<T, OpenNiError>;
