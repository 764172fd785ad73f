//! Hands generator: tracking of individual hand points.

use std::ffi::c_void;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use crate::context::Context;
use crate::event::SubscriptionId;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle, XnUserID};
use crate::generator::Generator;
use crate::types::{NodeType, Point3D};
use crate::Result;

type HandPointCallback = Box<dyn FnMut(XnUserID, Point3D, f32) + Send>;
type HandDestroyCallback = Box<dyn FnMut(XnUserID, f32) + Send>;

struct HandRegistration {
    token: XnCallbackHandle,
    cookie: *const HandShared,
}

unsafe impl Send for HandRegistration {}

struct HandInner {
    create: Vec<(u64, HandPointCallback)>,
    update: Vec<(u64, HandPointCallback)>,
    destroy: Vec<(u64, HandDestroyCallback)>,
    next_id: u64,
    registration: Option<HandRegistration>,
}

struct HandShared {
    node: XnNodeHandle,
    inner: Mutex<HandInner>,
}

unsafe extern "C" fn hand_create_trampoline(
    _node: XnNodeHandle,
    hand: XnUserID,
    position: *const Point3D,
    time: f32,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const HandShared);
    let position = if position.is_null() {
        Point3D::default()
    } else {
        *position
    };
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.create.iter_mut() {
            callback(hand, position, time);
        }
    }
}

unsafe extern "C" fn hand_update_trampoline(
    _node: XnNodeHandle,
    hand: XnUserID,
    position: *const Point3D,
    time: f32,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const HandShared);
    let position = if position.is_null() {
        Point3D::default()
    } else {
        *position
    };
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.update.iter_mut() {
            callback(hand, position, time);
        }
    }
}

unsafe extern "C" fn hand_destroy_trampoline(
    _node: XnNodeHandle,
    hand: XnUserID,
    time: f32,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const HandShared);
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.destroy.iter_mut() {
            callback(hand, time);
        }
    }
}

/// Generator tracking hand points through space.
pub struct HandsGenerator {
    shared: Arc<HandShared>,
    generator: Generator,
}

impl HandsGenerator {
    pub fn create(context: &Context) -> Result<HandsGenerator> {
        let handle = context.create_any_node_handle(NodeType::Hands, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let generator = Generator::from_native(handle)?;
        Ok(Self {
            shared: Arc::new(HandShared {
                node: handle,
                inner: Mutex::new(HandInner {
                    create: Vec::new(),
                    update: Vec::new(),
                    destroy: Vec::new(),
                    next_id: 0,
                    registration: None,
                }),
            }),
            generator,
        })
    }

    /// Begin tracking a hand at `position`.
    pub fn start_tracking(&self, position: Point3D) -> Result<()> {
        ffi::check(unsafe { ffi::xnStartTracking(self.generator.handle()?, &position) })
    }

    pub fn stop_tracking(&self, hand: XnUserID) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopTracking(self.generator.handle()?, hand) })
    }

    pub fn stop_tracking_all(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopTrackingAll(self.generator.handle()?) })
    }

    /// Smoothing factor in [0, 1]; 0 is raw, 1 is maximally smoothed.
    pub fn set_smoothing(&self, factor: f32) -> Result<()> {
        ffi::check(unsafe { ffi::xnSetTrackingSmoothing(self.generator.handle()?, factor) })
    }

    fn ensure_registered(&self, inner: &mut HandInner) -> Result<()> {
        if inner.registration.is_some() {
            return Ok(());
        }
        let cookie = Arc::into_raw(Arc::clone(&self.shared));
        let mut token = XnCallbackHandle::invalid();
        let status = unsafe {
            ffi::xnRegisterHandCallbacks(
                self.shared.node,
                hand_create_trampoline,
                hand_update_trampoline,
                hand_destroy_trampoline,
                cookie as *mut c_void,
                &mut token,
            )
        };
        if let Err(err) = ffi::check(status) {
            unsafe { drop(Arc::from_raw(cookie)) };
            return Err(err);
        }
        inner.registration = Some(HandRegistration { token, cookie });
        Ok(())
    }

    pub fn subscribe_hand_create<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(XnUserID, Point3D, f32) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        self.ensure_registered(&mut inner)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.create.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    pub fn subscribe_hand_update<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(XnUserID, Point3D, f32) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        self.ensure_registered(&mut inner)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.update.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    pub fn subscribe_hand_destroy<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(XnUserID, f32) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        self.ensure_registered(&mut inner)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.destroy.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    pub fn unsubscribe_hand_events(&self, id: SubscriptionId) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.create.retain(|(sid, _)| *sid != id.value());
        inner.update.retain(|(sid, _)| *sid != id.value());
        inner.destroy.retain(|(sid, _)| *sid != id.value());
        if inner.create.is_empty() && inner.update.is_empty() && inner.destroy.is_empty() {
            if let Some(reg) = inner.registration.take() {
                unsafe {
                    ffi::xnUnregisterHandCallbacks(self.shared.node, reg.token);
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
        inner.create.clear();
        inner.update.clear();
        inner.destroy.clear();
        if let Some(reg) = inner.registration.take() {
            unsafe {
                ffi::xnUnregisterHandCallbacks(self.shared.node, reg.token);
                drop(Arc::from_raw(reg.cookie));
            }
        }
    }

    pub fn close(&mut self) {
        self.teardown();
        self.generator.close();
    }
}

impl Drop for HandsGenerator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Deref for HandsGenerator {
    type Target = Generator;

    fn deref(&self) -> &Generator {
        &self.generator
    }
}
