//! User generator: detection and tracking of people in the scene.

use std::ffi::{c_void, CStr, CString};
use std::ops::Deref;
use std::os::raw::c_char;
use std::sync::{Arc, Mutex};

use crate::context::Context;
use crate::error::{OpenNiError, Status};
use crate::event::SubscriptionId;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle, XnUserID};
use crate::generator::Generator;
use crate::node::ProductionNode;
use crate::types::{NodeType, Point3D, SkeletonJoint, SkeletonJointPosition, SkeletonProfile};
use crate::Result;

type UserCallback = Box<dyn FnMut(XnUserID) + Send>;

struct UserRegistration {
    token: XnCallbackHandle,
    cookie: *const UserShared,
}

unsafe impl Send for UserRegistration {}

struct UserInner {
    new_user: Vec<(u64, UserCallback)>,
    lost_user: Vec<(u64, UserCallback)>,
    next_id: u64,
    registration: Option<UserRegistration>,
}

struct UserShared {
    node: XnNodeHandle,
    inner: Mutex<UserInner>,
}

/// Fan-out of the native new-user/lost-user callback pair. One native
/// registration covers both lists; it is installed when the first
/// subscriber of either kind arrives and removed with the last.
struct UserEvents {
    shared: Arc<UserShared>,
}

unsafe extern "C" fn new_user_trampoline(_node: XnNodeHandle, user: XnUserID, cookie: *mut c_void) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const UserShared);
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.new_user.iter_mut() {
            callback(user);
        }
    }
}

unsafe extern "C" fn lost_user_trampoline(
    _node: XnNodeHandle,
    user: XnUserID,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const UserShared);
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.lost_user.iter_mut() {
            callback(user);
        }
    }
}

impl UserEvents {
    fn new(node: XnNodeHandle) -> Self {
        Self {
            shared: Arc::new(UserShared {
                node,
                inner: Mutex::new(UserInner {
                    new_user: Vec::new(),
                    lost_user: Vec::new(),
                    next_id: 0,
                    registration: None,
                }),
            }),
        }
    }

    fn subscribe(&self, new_user: bool, callback: UserCallback) -> Result<SubscriptionId> {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.registration.is_none() {
            let cookie = Arc::into_raw(Arc::clone(&self.shared));
            let mut token = XnCallbackHandle::invalid();
            let status = unsafe {
                ffi::xnRegisterUserCallbacks(
                    self.shared.node,
                    new_user_trampoline,
                    lost_user_trampoline,
                    cookie as *mut c_void,
                    &mut token,
                )
            };
            if let Err(err) = ffi::check(status) {
                unsafe { drop(Arc::from_raw(cookie)) };
                return Err(err);
            }
            inner.registration = Some(UserRegistration { token, cookie });
        }
        let id = inner.next_id;
        inner.next_id += 1;
        if new_user {
            inner.new_user.push((id, callback));
        } else {
            inner.lost_user.push((id, callback));
        }
        Ok(SubscriptionId::from_value(id))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.new_user.retain(|(sid, _)| *sid != id.value());
        inner.lost_user.retain(|(sid, _)| *sid != id.value());
        if inner.new_user.is_empty() && inner.lost_user.is_empty() {
            if let Some(reg) = inner.registration.take() {
                unsafe {
                    ffi::xnUnregisterUserCallbacks(self.shared.node, reg.token);
                    drop(Arc::from_raw(reg.cookie));
                }
            }
        }
    }

    fn teardown(&self) {
        let mut inner = match self.shared.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.new_user.clear();
        inner.lost_user.clear();
        if let Some(reg) = inner.registration.take() {
            unsafe {
                ffi::xnUnregisterUserCallbacks(self.shared.node, reg.token);
                drop(Arc::from_raw(reg.cookie));
            }
        }
    }
}

impl Drop for UserEvents {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Generator that detects users in the scene.
pub struct UserGenerator {
    events: UserEvents,
    generator: Generator,
}

impl UserGenerator {
    pub fn create(context: &Context) -> Result<UserGenerator> {
        let handle = context.create_any_node_handle(NodeType::User, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let generator = Generator::from_native(handle)?;
        Ok(Self {
            events: UserEvents::new(handle),
            generator,
        })
    }

    pub fn user_count(&self) -> Result<u16> {
        Ok(unsafe { ffi::xnGetNumberOfUsers(self.generator.handle()?) })
    }

    pub fn users(&self) -> Result<Vec<XnUserID>> {
        let handle = self.generator.handle()?;
        let mut count = unsafe { ffi::xnGetNumberOfUsers(handle) };
        let mut users = vec![0 as XnUserID; count as usize];
        ffi::check(unsafe { ffi::xnGetUsers(handle, users.as_mut_ptr(), &mut count) })?;
        users.truncate(count as usize);
        Ok(users)
    }

    /// Center of mass of `user`, in real-world millimeters.
    pub fn center_of_mass(&self, user: XnUserID) -> Result<Point3D> {
        let mut com = Point3D::default();
        ffi::check(unsafe { ffi::xnGetUserCoM(self.generator.handle()?, user, &mut com) })?;
        Ok(com)
    }

    /// Subscribe to users entering the scene.
    pub fn subscribe_new_user<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(XnUserID) + Send + 'static,
    {
        self.events.subscribe(true, Box::new(callback))
    }

    /// Subscribe to users leaving the scene.
    pub fn subscribe_lost_user<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(XnUserID) + Send + 'static,
    {
        self.events.subscribe(false, Box::new(callback))
    }

    pub fn unsubscribe_user_events(&self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    pub fn skeleton_capability(&self) -> Result<SkeletonCapability> {
        SkeletonCapability::new(self)
    }

    pub fn pose_detection_capability(&self) -> Result<PoseDetectionCapability> {
        PoseDetectionCapability::new(self)
    }

    pub fn close(&mut self) {
        self.events.teardown();
        self.generator.close();
    }
}

impl Deref for UserGenerator {
    type Target = Generator;

    fn deref(&self) -> &Generator {
        &self.generator
    }
}

fn capability_share(node: &ProductionNode, name: &CStr) -> Result<ProductionNode> {
    let supported = node.is_capability_supported(&name.to_string_lossy())?;
    if !supported {
        return Err(OpenNiError::Status(Status::from_raw(
            ffi::XN_STATUS_INVALID_OPERATION,
        )));
    }
    node.try_clone()
}

/// Skeleton tracking over a user generator's users.
pub struct SkeletonCapability {
    node: ProductionNode,
}

impl SkeletonCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        Ok(Self {
            node: capability_share(node, ffi::XN_CAPABILITY_SKELETON)?,
        })
    }

    /// Select which joint groups tracking should produce.
    pub fn set_profile(&self, profile: SkeletonProfile) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetSkeletonProfile(self.node.handle()?, profile as u32) })
    }

    pub fn is_tracking(&self, user: XnUserID) -> Result<bool> {
        Ok(unsafe { ffi::xnIsSkeletonTracking(self.node.handle()?, user) } != ffi::XN_FALSE)
    }

    pub fn start_tracking(&self, user: XnUserID) -> Result<()> {
        ffi::check(unsafe { ffi::xnStartSkeletonTracking(self.node.handle()?, user) })
    }

    pub fn stop_tracking(&self, user: XnUserID) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopSkeletonTracking(self.node.handle()?, user) })
    }

    /// Position of one joint of a tracked user.
    pub fn joint_position(
        &self,
        user: XnUserID,
        joint: SkeletonJoint,
    ) -> Result<SkeletonJointPosition> {
        let mut position = SkeletonJointPosition::default();
        ffi::check(unsafe {
            ffi::xnGetSkeletonJointPosition(self.node.handle()?, user, joint as u32, &mut position)
        })?;
        Ok(position)
    }

    pub fn close(&mut self) {
        self.node.close();
    }
}

impl Deref for SkeletonCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}

type PoseCallback = Box<dyn FnMut(&str, XnUserID) + Send>;

struct PoseRegistration {
    token: XnCallbackHandle,
    cookie: *const PoseShared,
}

unsafe impl Send for PoseRegistration {}

struct PoseInner {
    subscribers: Vec<(u64, PoseCallback)>,
    next_id: u64,
    registration: Option<PoseRegistration>,
}

struct PoseShared {
    node: XnNodeHandle,
    inner: Mutex<PoseInner>,
}

unsafe extern "C" fn pose_detected_trampoline(
    _node: XnNodeHandle,
    pose: *const c_char,
    user: XnUserID,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const PoseShared);
    let pose = if pose.is_null() {
        String::new()
    } else {
        CStr::from_ptr(pose).to_string_lossy().into_owned()
    };
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.subscribers.iter_mut() {
            callback(&pose, user);
        }
    }
}

/// Pose detection over a user generator's users.
pub struct PoseDetectionCapability {
    shared: Arc<PoseShared>,
    node: ProductionNode,
}

impl PoseDetectionCapability {
    pub(crate) fn new(node: &ProductionNode) -> Result<Self> {
        let node = capability_share(node, ffi::XN_CAPABILITY_POSE_DETECTION)?;
        let handle = node.handle()?;
        Ok(Self {
            shared: Arc::new(PoseShared {
                node: handle,
                inner: Mutex::new(PoseInner {
                    subscribers: Vec::new(),
                    next_id: 0,
                    registration: None,
                }),
            }),
            node,
        })
    }

    pub fn pose_count(&self) -> Result<u32> {
        Ok(unsafe { ffi::xnGetNumberOfPoses(self.node.handle()?) })
    }

    /// Names of the poses this implementation can detect.
    pub fn available_poses(&self) -> Result<Vec<String>> {
        let handle = self.node.handle()?;
        let mut count = unsafe { ffi::xnGetNumberOfPoses(handle) };
        const NAME_LENGTH: usize = 64;
        let mut storage = vec![[0 as c_char; NAME_LENGTH]; count as usize];
        let mut pointers: Vec<*mut c_char> =
            storage.iter_mut().map(|buf| buf.as_mut_ptr()).collect();
        ffi::check(unsafe {
            ffi::xnGetAllAvailablePoses(
                handle,
                pointers.as_mut_ptr(),
                NAME_LENGTH as u32,
                &mut count,
            )
        })?;
        storage.truncate(count as usize);
        Ok(storage
            .iter()
            .map(|buf| ffi::types::fixed_to_string(buf))
            .collect())
    }

    pub fn start_detection(&self, pose: &str, user: XnUserID) -> Result<()> {
        let pose = CString::new(pose).unwrap_or_default();
        ffi::check(unsafe { ffi::xnStartPoseDetection(self.node.handle()?, pose.as_ptr(), user) })
    }

    pub fn stop_detection(&self, user: XnUserID) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopPoseDetection(self.node.handle()?, user) })
    }

    /// Subscribe to detected poses; first subscriber installs the native
    /// callback, last unsubscribe removes it.
    pub fn subscribe_pose_detected<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(&str, XnUserID) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.registration.is_none() {
            let cookie = Arc::into_raw(Arc::clone(&self.shared));
            let mut token = XnCallbackHandle::invalid();
            let status = unsafe {
                ffi::xnRegisterToPoseDetected(
                    self.shared.node,
                    pose_detected_trampoline,
                    cookie as *mut c_void,
                    &mut token,
                )
            };
            if let Err(err) = ffi::check(status) {
                unsafe { drop(Arc::from_raw(cookie)) };
                return Err(err);
            }
            inner.registration = Some(PoseRegistration { token, cookie });
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    pub fn unsubscribe_pose_detected(&self, id: SubscriptionId) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.subscribers.retain(|(sid, _)| *sid != id.value());
        if inner.subscribers.is_empty() {
            if let Some(reg) = inner.registration.take() {
                unsafe {
                    ffi::xnUnregisterFromPoseDetected(self.shared.node, reg.token);
                    drop(Arc::from_raw(reg.cookie));
                }
            }
        }
    }

    fn teardown(&self) {
        let mut inner = match self.shared.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.subscribers.clear();
        if let Some(reg) = inner.registration.take() {
            unsafe {
                ffi::xnUnregisterFromPoseDetected(self.shared.node, reg.token);
                drop(Arc::from_raw(reg.cookie));
            }
        }
    }

    pub fn close(&mut self) {
        self.teardown();
        self.node.close();
    }
}

impl Drop for PoseDetectionCapability {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Deref for PoseDetectionCapability {
    type Target = ProductionNode;

    fn deref(&self) -> &ProductionNode {
        &self.node
    }
}
