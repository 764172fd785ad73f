//! The context: root object of one session's production node graph.

use std::ffi::{c_void, CString};
use std::sync::{Arc, Mutex};

use crate::enum_errors::EnumerationErrors;
use crate::error::{OpenNiError, Status};
use crate::event::SubscriptionId;
use crate::ffi::{self, XnCallbackHandle, XnContextHandle, XnNodeHandle, XnNodeInfoListHandle};
use crate::generator::Generator;
use crate::node::AnyNode;
use crate::node_info::NodeInfo;
use crate::node_info_list::NodeInfoList;
use crate::player::Player;
use crate::query::Query;
use crate::resource::Owned;
use crate::types::NodeType;
use crate::Result;

fn release_context(handle: XnContextHandle) {
    unsafe { ffi::xnContextRelease(handle) }
}

type ErrorStateCallback = Box<dyn FnMut(Status) + Send>;

struct ErrorStateRegistration {
    token: XnCallbackHandle,
    cookie: *const ErrorStateShared,
}

unsafe impl Send for ErrorStateRegistration {}

struct ErrorStateInner {
    subscribers: Vec<(u64, ErrorStateCallback)>,
    next_id: u64,
    registration: Option<ErrorStateRegistration>,
}

struct ErrorStateShared {
    context: XnContextHandle,
    inner: Mutex<ErrorStateInner>,
}

unsafe extern "C" fn error_state_trampoline(error_state: ffi::XnStatus, cookie: *mut c_void) {
    if cookie.is_null() {
        return;
    }
    let shared = &*(cookie as *const ErrorStateShared);
    if let Ok(mut inner) = shared.inner.lock() {
        for (_, callback) in inner.subscribers.iter_mut() {
            callback(Status::from_raw(error_state));
        }
    }
}

/// Root object owning the node graph for one session.
pub struct Context {
    error_state: Arc<ErrorStateShared>,
    owned: Owned<XnContextHandle>,
}

impl Context {
    /// Initialize a new context.
    pub fn init() -> Result<Context> {
        let mut handle = XnContextHandle::invalid();
        ffi::check(unsafe { ffi::xnInit(&mut handle) })?;
        log::info!("context initialized");
        Self::from_native(handle)
    }

    fn from_native(handle: XnContextHandle) -> Result<Context> {
        Ok(Context {
            error_state: Arc::new(ErrorStateShared {
                context: handle,
                inner: Mutex::new(ErrorStateInner {
                    subscribers: Vec::new(),
                    next_id: 0,
                    registration: None,
                }),
            }),
            owned: Owned::open(handle, release_context)?,
        })
    }

    pub(crate) fn handle(&self) -> Result<XnContextHandle> {
        self.owned.get()
    }

    /// The raw native handle. Only for native-managed transitions.
    pub fn to_native(&self) -> Result<XnContextHandle> {
        self.handle()
    }

    /// A second independent wrapper over the same native context, holding
    /// its own reference.
    pub fn try_clone(&self) -> Result<Context> {
        let handle = self.handle()?;
        ffi::check(unsafe { ffi::xnContextAddRef(handle) })?;
        Self::from_native(handle)
    }

    /// Enumerate candidate production trees of `node_type`. On failure the
    /// error carries the per-candidate failure list the middleware
    /// populated.
    pub fn enumerate_production_trees(
        &self,
        node_type: NodeType,
        query: Option<&Query>,
    ) -> Result<NodeInfoList> {
        let handle = self.handle()?;
        let errors = EnumerationErrors::new()?;
        let query_handle = match query {
            Some(q) => q.handle()?,
            None => ffi::XnQueryHandle::invalid(),
        };
        let mut list = XnNodeInfoListHandle::invalid();
        let status = unsafe {
            ffi::xnEnumerateProductionTrees(
                handle,
                node_type.tag(),
                query_handle,
                &mut list,
                errors.handle()?,
            )
        };
        if status != ffi::XN_STATUS_OK {
            return Err(OpenNiError::Enumeration {
                status: Status::from_raw(status),
                errors: errors.to_vec(),
            });
        }
        NodeInfoList::from_native(list)
    }

    /// Create a node from one enumerated descriptor.
    pub fn create_node_from_info(&self, info: &NodeInfo) -> Result<AnyNode> {
        let handle = self.handle()?;
        let mut node = XnNodeHandle::invalid();
        ffi::check(unsafe { ffi::xnCreateProductionTree(handle, info.handle(), &mut node) })?;
        AnyNode::from_native(node, None)
    }

    /// Create a node of `node_type`, letting the middleware pick any
    /// matching implementation.
    pub fn create_any_node(&self, node_type: NodeType, query: Option<&Query>) -> Result<AnyNode> {
        let handle = self.create_any_node_handle(node_type, query)?;
        AnyNode::from_native(handle, Some(node_type.tag()))
    }

    pub(crate) fn create_any_node_handle(
        &self,
        node_type: NodeType,
        query: Option<&Query>,
    ) -> Result<XnNodeHandle> {
        let handle = self.handle()?;
        let errors = EnumerationErrors::new()?;
        let query_handle = match query {
            Some(q) => q.handle()?,
            None => ffi::XnQueryHandle::invalid(),
        };
        let mut node = XnNodeHandle::invalid();
        let status = unsafe {
            ffi::xnCreateAnyProductionTree(
                handle,
                node_type.tag(),
                query_handle,
                &mut node,
                errors.handle()?,
            )
        };
        if status != ffi::XN_STATUS_OK {
            return Err(OpenNiError::Enumeration {
                status: Status::from_raw(status),
                errors: errors.to_vec(),
            });
        }
        log::debug!("created {} node", node_type);
        Ok(node)
    }

    /// Create a mock node whose data is injected by the caller.
    pub fn create_mock_node(&self, node_type: NodeType, name: Option<&str>) -> Result<AnyNode> {
        let handle = self.create_mock_node_handle(node_type, name)?;
        AnyNode::from_native(handle, Some(node_type.tag()))
    }

    pub(crate) fn create_mock_node_handle(
        &self,
        node_type: NodeType,
        name: Option<&str>,
    ) -> Result<XnNodeHandle> {
        let handle = self.handle()?;
        let name = name.map(|n| CString::new(n).unwrap_or_default());
        let mut node = XnNodeHandle::invalid();
        ffi::check(unsafe {
            ffi::xnCreateMockNode(
                handle,
                node_type.tag(),
                name.as_ref().map(|n| n.as_ptr()).unwrap_or(std::ptr::null()),
                &mut node,
            )
        })?;
        Ok(node)
    }

    /// Find an already-created node of `node_type`, taking a new reference
    /// on it.
    pub fn find_existing_node(&self, node_type: NodeType) -> Result<AnyNode> {
        let handle = self.handle()?;
        let mut node = XnNodeHandle::invalid();
        ffi::check(unsafe { ffi::xnFindExistingRefNodeByType(handle, node_type.tag(), &mut node) })?;
        AnyNode::from_native(node, Some(node_type.tag()))
    }

    /// Open a recording for playback; returns the player driving it. The
    /// recorded nodes appear in the context as mock nodes fed by the
    /// player.
    pub fn open_file_recording(&self, file_name: &str) -> Result<Player> {
        let handle = self.handle()?;
        let file_name_c = CString::new(file_name).unwrap_or_default();
        let mut player = XnNodeHandle::invalid();
        ffi::check(unsafe {
            ffi::xnContextOpenFileRecordingEx(handle, file_name_c.as_ptr(), &mut player)
        })?;
        log::info!("opened recording {:?}", file_name);
        Player::from_native(player)
    }

    /// Block until every generator has new data, then latch all of it.
    pub fn wait_and_update_all(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnWaitAndUpdateAll(self.handle()?) })
    }

    /// Block until `generator` has new data, then latch all generators.
    pub fn wait_one_update_all(&self, generator: &Generator) -> Result<()> {
        ffi::check(unsafe { ffi::xnWaitOneUpdateAll(self.handle()?, generator.handle()?) })
    }

    /// Block until any generator has new data, then latch all of them.
    pub fn wait_any_update_all(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnWaitAnyUpdateAll(self.handle()?) })
    }

    /// Latch whatever is available without waiting.
    pub fn wait_none_update_all(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnWaitNoneUpdateAll(self.handle()?) })
    }

    pub fn start_generating_all(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnStartGeneratingAll(self.handle()?) })
    }

    pub fn stop_generating_all(&self) -> Result<()> {
        ffi::check(unsafe { ffi::xnStopGeneratingAll(self.handle()?) })
    }

    /// Mirror every map generator in the context at once.
    pub fn set_global_mirror(&self, mirror: bool) -> Result<()> {
        let value = if mirror { ffi::XN_TRUE } else { ffi::XN_FALSE };
        ffi::check(unsafe { ffi::xnSetGlobalMirror(self.handle()?, value) })
    }

    pub fn global_mirror(&self) -> Result<bool> {
        Ok(unsafe { ffi::xnGetGlobalMirror(self.handle()?) } != ffi::XN_FALSE)
    }

    /// Subscribe to global error-state changes. The first subscriber
    /// installs the native callback; the last unsubscribe removes it.
    pub fn subscribe_error_state<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(Status) + Send + 'static,
    {
        let handle = self.handle()?;
        let mut inner = self.error_state.inner.lock().unwrap();
        if inner.registration.is_none() {
            let cookie = Arc::into_raw(Arc::clone(&self.error_state));
            let mut token = XnCallbackHandle::invalid();
            let status = unsafe {
                ffi::xnRegisterToGlobalErrorStateChange(
                    handle,
                    error_state_trampoline,
                    cookie as *mut c_void,
                    &mut token,
                )
            };
            if let Err(err) = ffi::check(status) {
                unsafe { drop(Arc::from_raw(cookie)) };
                return Err(err);
            }
            inner.registration = Some(ErrorStateRegistration { token, cookie });
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Ok(SubscriptionId::from_value(id))
    }

    pub fn unsubscribe_error_state(&self, id: SubscriptionId) {
        let mut inner = self.error_state.inner.lock().unwrap();
        inner.subscribers.retain(|(sid, _)| *sid != id.value());
        if inner.subscribers.is_empty() {
            if let Some(reg) = inner.registration.take() {
                unsafe {
                    ffi::xnUnregisterFromGlobalErrorStateChange(self.error_state.context, reg.token);
                    drop(Arc::from_raw(reg.cookie));
                }
            }
        }
    }

    fn teardown_error_state(&self) {
        let mut inner = match self.error_state.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.subscribers.clear();
        if let Some(reg) = inner.registration.take() {
            unsafe {
                ffi::xnUnregisterFromGlobalErrorStateChange(self.error_state.context, reg.token);
                drop(Arc::from_raw(reg.cookie));
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.owned.is_closed()
    }

    /// Release this wrapper's reference to the native context. Idempotent.
    /// Nodes holding their own references stay usable; the native context
    /// is freed when the last reference goes.
    pub fn close(&mut self) {
        self.teardown_error_state();
        if self.owned.close() {
            log::info!("context closed");
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.teardown_error_state();
    }
}
