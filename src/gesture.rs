//! Gesture generator.

use std::ffi::{c_void, CStr, CString};
use std::ops::Deref;
use std::os::raw::c_char;
use std::sync::{Arc, Mutex};

use crate::context::Context;
use crate::event::SubscriptionId;
use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::generator::Generator;
use crate::types::{BoundingBox3D, NodeType, Point3D};
use crate::Result;

type RecognizedCallback = Box<dyn FnMut(&str, Point3D, Point3D) + Send>;
type ProgressCallback = Box<dyn FnMut(&str, Point3D, f32) + Send>;

struct GestureRegistration {
    token: XnCallbackHandle,
    cookie: *const GestureShared,
}

unsafe impl Send for GestureRegistration {}

struct GestureInner {
    recognized: Vec<(u64, RecognizedCallback)>,
    progress: Vec<(u64, ProgressCallback)>,
    next_id: u64,
    registration: Option<GestureRegistration>,
}

struct GestureShared {
    node: XnNodeHandle,
    inner: Mutex<GestureInner>,
}

unsafe extern "C" fn gesture_recognized_trampoline(
    _node: XnNodeHandle,
    gesture: *const c_char,
    id_position: *const Point3D,
    end_position: *const Point3D,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const GestureShared);
    let gesture = if gesture.is_null() {
        String::new()
    } else {
        CStr::from_ptr(gesture).to_string_lossy().into_owned()
    };
    let id_position = if id_position.is_null() {
        Point3D::default()
    } else {
        *id_position
    };
    let end_position = if end_position.is_null() {
        Point3D::default()
    } else {
        *end_position
    };
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.recognized.iter_mut() {
            callback(&gesture, id_position, end_position);
        }
    }
}

unsafe extern "C" fn gesture_progress_trampoline(
    _node: XnNodeHandle,
    gesture: *const c_char,
    position: *const Point3D,
    progress: f32,
    cookie: *mut c_void,
) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const GestureShared);
    let gesture = if gesture.is_null() {
        String::new()
    } else {
        CStr::from_ptr(gesture).to_string_lossy().into_owned()
    };
    let position = if position.is_null() {
        Point3D::default()
    } else {
        *position
    };
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.progress.iter_mut() {
            callback(&gesture, position, progress);
        }
    }
}

/// Generator recognizing hand gestures.
pub struct GestureGenerator {
    shared: Arc<GestureShared>,
    generator: Generator,
}

impl GestureGenerator {
    pub fn create(context: &Context) -> Result<GestureGenerator> {
        let handle = context.create_any_node_handle(NodeType::Gesture, None)?;
        Self::from_native(handle)
    }

    pub(crate) fn from_native(handle: XnNodeHandle) -> Result<Self> {
        let generator = Generator::from_native(handle)?;
        Ok(Self {
            shared: Arc::new(GestureShared {
                node: handle,
                inner: Mutex::new(GestureInner {
                    recognized: Vec::new(),
                    progress: Vec::new(),
                    next_id: 0,
                    registration: None,
                }),
            }),
            generator,
        })
    }

    /// Ask the generator to look for `gesture`, optionally only inside
    /// `area`.
    pub fn add_gesture(&self, gesture: &str, area: Option<BoundingBox3D>) -> Result<()> {
        let handle = self.generator.handle()?;
        let gesture = CString::new(gesture).unwrap_or_default();
        let area_ptr = area
            .as_ref()
            .map(|a| a as *const BoundingBox3D)
            .unwrap_or(std::ptr::null());
        ffi::check(unsafe { ffi::xnAddGesture(handle, gesture.as_ptr(), area_ptr) })
    }

    pub fn remove_gesture(&self, gesture: &str) -> Result<()> {
        let handle = self.generator.handle()?;
        let gesture = CString::new(gesture).unwrap_or_default();
        ffi::check(unsafe { ffi::xnRemoveGesture(handle, gesture.as_ptr()) })
    }

    pub fn available_gesture_count(&self) -> Result<u16> {
        Ok(unsafe { ffi::xnGetNumberOfAvailableGestures(self.generator.handle()?) })
    }

    /// Names of the gestures this implementation can recognize.
    pub fn available_gestures(&self) -> Result<Vec<String>> {
        let handle = self.generator.handle()?;
        let mut count = unsafe { ffi::xnGetNumberOfAvailableGestures(handle) };
        const NAME_LENGTH: usize = 64;
        let mut storage = vec![[0 as c_char; NAME_LENGTH]; count as usize];
        let mut pointers: Vec<*mut c_char> =
            storage.iter_mut().map(|buf| buf.as_mut_ptr()).collect();
        ffi::check(unsafe {
            ffi::xnEnumerateAllGestures(
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

    fn ensure_registered(&self, inner: &mut GestureInner) -> Result<()> {
        if inner.registration.is_some() {
            return Ok(());
        }
        let cookie = Arc::into_raw(Arc::clone(&self.shared));
        let mut token = XnCallbackHandle::invalid();
        let status = unsafe {
            ffi::xnRegisterGestureCallbacks(
                self.shared.node,
                gesture_recognized_trampoline,
                gesture_progress_trampoline,
                cookie as *mut c_void,
                &mut token,
            )
        };
        if let Err(err) = ffi::check(status) {
            unsafe { drop(Arc::from_raw(cookie)) };
            return Err(err);
        }
        inner.registration = Some(GestureRegistration { token, cookie });
        Ok(())
    }

    /// Subscribe to recognized gestures.
    pub fn subscribe_gesture_recognized<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(&str, Point3D, Point3D) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        self.ensure_registered(&mut inner)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.recognized.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    /// Subscribe to gesture progress updates.
    pub fn subscribe_gesture_progress<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(&str, Point3D, f32) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        self.ensure_registered(&mut inner)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.progress.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    pub fn unsubscribe_gesture_events(&self, id: SubscriptionId) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.recognized.retain(|(sid, _)| *sid != id.value());
        inner.progress.retain(|(sid, _)| *sid != id.value());
        if inner.recognized.is_empty() && inner.progress.is_empty() {
            if let Some(reg) = inner.registration.take() {
                unsafe {
                    ffi::xnUnregisterGestureCallbacks(self.shared.node, reg.token);
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
        inner.recognized.clear();
        inner.progress.clear();
        if let Some(reg) = inner.registration.take() {
            unsafe {
                ffi::xnUnregisterGestureCallbacks(self.shared.node, reg.token);
                drop(Arc::from_raw(reg.cookie));
            }
        }
    }

    pub fn close(&mut self) {
        self.teardown();
        self.generator.close();
    }
}

impl Drop for GestureGenerator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Deref for GestureGenerator {
    type Target = Generator;

    fn deref(&self) -> &Generator {
        &self.generator
    }
}
