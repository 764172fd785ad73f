//! Bridges native state-change callbacks into Rust subscriptions.
//!
//! The native side knows one callback per registration; the Rust side
//! wants any number of subscribers. The bridge registers the native
//! callback lazily when the first subscriber arrives and unregisters when
//! the last one leaves, so N subscriptions cost exactly one native
//! registration.

use std::ffi::c_void;
use std::sync::{Arc, Mutex};

use crate::ffi::{self, XnCallbackHandle, XnNodeHandle};
use crate::Result;

/// Native registration shim: node, trampoline, cookie, token out-param.
pub(crate) type RegisterFn =
    fn(XnNodeHandle, ffi::XnStateChangedHandler, *mut c_void, *mut XnCallbackHandle) -> ffi::XnStatus;

/// Native unregistration shim: node, token.
pub(crate) type UnregisterFn = fn(XnNodeHandle, XnCallbackHandle);

type Subscriber = Box<dyn FnMut(XnNodeHandle) + Send>;

/// Token returned by [`StateChangedEvent::subscribe`]; hand it back to
/// [`StateChangedEvent::unsubscribe`]. The tracking generators' typed
/// bridges reuse it for their own subscriber lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn from_value(value: u64) -> Self {
        SubscriptionId(value)
    }

    pub(crate) fn value(self) -> u64 {
        self.0
    }
}

struct Registration {
    token: XnCallbackHandle,
    /// Leaked `Arc<Shared>` handed to the native side as the cookie;
    /// reclaimed at unregistration. This pins the subscriber list for as
    /// long as the native library may call the trampoline, independent of
    /// when the owning node is dropped.
    cookie: *const Shared,
}

// The cookie is a leaked Arc pointer, not a borrow of anything
// thread-bound.
unsafe impl Send for Registration {}

struct Inner {
    subscribers: Vec<(u64, Subscriber)>,
    next_id: u64,
    registration: Option<Registration>,
}

struct Shared {
    node: XnNodeHandle,
    inner: Mutex<Inner>,
}

/// One logical state-change event of one node.
pub struct StateChangedEvent {
    register: RegisterFn,
    unregister: UnregisterFn,
    shared: Arc<Shared>,
}

impl StateChangedEvent {
    pub(crate) fn new(node: XnNodeHandle, register: RegisterFn, unregister: UnregisterFn) -> Self {
        Self {
            register,
            unregister,
            shared: Arc::new(Shared {
                node,
                inner: Mutex::new(Inner {
                    subscribers: Vec::new(),
                    next_id: 0,
                    registration: None,
                }),
            }),
        }
    }

    /// Add a subscriber. The first subscriber performs the native
    /// registration; if that fails, the error is returned and the bridge
    /// stays unregistered with no subscriber added.
    ///
    /// Subscribers run in subscription order, on whatever thread issues the
    /// native wait/update call. They must not call `subscribe` or
    /// `unsubscribe` on this event from inside the callback.
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId>
    where
        F: FnMut(XnNodeHandle) + Send + 'static,
    {
        let mut inner = self.shared.inner.lock().unwrap();
        if inner.registration.is_none() {
            let cookie = Arc::into_raw(Arc::clone(&self.shared));
            let mut token = XnCallbackHandle::invalid();
            let status = (self.register)(
                self.shared.node,
                trampoline,
                cookie as *mut c_void,
                &mut token,
            );
            if let Err(err) = ffi::check(status) {
                // No partial state: reclaim the pin and stay unregistered.
                unsafe { drop(Arc::from_raw(cookie)) };
                return Err(err);
            }
            log::debug!("event registered on node {:?}", self.shared.node);
            inner.registration = Some(Registration { token, cookie });
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Ok(SubscriptionId(id))
    }

    /// Remove a subscriber. Removing the last one unregisters the native
    /// callback and releases the trampoline pin.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.subscribers.retain(|(sid, _)| *sid != id.0);
        if inner.subscribers.is_empty() {
            if let Some(reg) = inner.registration.take() {
                (self.unregister)(self.shared.node, reg.token);
                unsafe { drop(Arc::from_raw(reg.cookie)) };
                log::debug!("event unregistered on node {:?}", self.shared.node);
            }
        }
    }

    /// Drop-path teardown; also used by explicit node close so the native
    /// registration never outlives the node handle.
    pub(crate) fn teardown(&self) {
        let mut inner = match self.shared.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.subscribers.clear();
        if let Some(reg) = inner.registration.take() {
            (self.unregister)(self.shared.node, reg.token);
            unsafe { drop(Arc::from_raw(reg.cookie)) };
        }
    }
}

impl Drop for StateChangedEvent {
    fn drop(&mut self) {
        self.teardown();
    }
}

unsafe extern "C" fn trampoline(node: XnNodeHandle, cookie: *mut c_void) {
    if cookie.is_null() {
        return;
    }
    // Borrow only: ownership of the pinned Arc stays with the registration.
    let shared = &*(cookie as *const Shared);
    let mut inner = match shared.inner.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    for (_, subscriber) in inner.subscribers.iter_mut() {
        subscriber(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // The counting fakes below share these statics, so the tests using
    // them must not interleave.
    static LOCK: Mutex<()> = Mutex::new(());
    static REGISTERS: AtomicUsize = AtomicUsize::new(0);
    static UNREGISTERS: AtomicUsize = AtomicUsize::new(0);
    static REGISTERED_COOKIE: AtomicUsize = AtomicUsize::new(0);

    fn counting_register(
        _node: XnNodeHandle,
        _handler: ffi::XnStateChangedHandler,
        cookie: *mut c_void,
        token: *mut XnCallbackHandle,
    ) -> ffi::XnStatus {
        REGISTERS.fetch_add(1, Ordering::SeqCst);
        REGISTERED_COOKIE.store(cookie as usize, Ordering::SeqCst);
        unsafe { *token = XnCallbackHandle::from_raw(0xCAFE) };
        ffi::XN_STATUS_OK
    }

    fn counting_unregister(_node: XnNodeHandle, token: XnCallbackHandle) {
        assert_eq!(token.raw(), 0xCAFE, "unregister must get the stored token");
        UNREGISTERS.fetch_add(1, Ordering::SeqCst);
    }

    fn failing_register(
        _node: XnNodeHandle,
        _handler: ffi::XnStateChangedHandler,
        _cookie: *mut c_void,
        _token: *mut XnCallbackHandle,
    ) -> ffi::XnStatus {
        ffi::XN_STATUS_ERROR
    }

    fn node() -> XnNodeHandle {
        XnNodeHandle::from_raw(0x1000)
    }

    #[test]
    fn n_subscribers_one_native_registration() {
        let _serial = LOCK.lock().unwrap();
        REGISTERS.store(0, Ordering::SeqCst);
        UNREGISTERS.store(0, Ordering::SeqCst);
        let event = StateChangedEvent::new(node(), counting_register, counting_unregister);

        let ids: Vec<_> = (0..5)
            .map(|_| event.subscribe(|_| {}).unwrap())
            .collect();
        assert_eq!(REGISTERS.load(Ordering::SeqCst), 1);
        assert_eq!(UNREGISTERS.load(Ordering::SeqCst), 0);

        for id in ids {
            event.unsubscribe(id);
        }
        assert_eq!(REGISTERS.load(Ordering::SeqCst), 1);
        assert_eq!(UNREGISTERS.load(Ordering::SeqCst), 1);

        // A new subscriber after full teardown registers again.
        event.subscribe(|_| {}).unwrap();
        assert_eq!(REGISTERS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_registration_leaves_no_partial_state() {
        let event = StateChangedEvent::new(node(), failing_register, counting_unregister);
        assert!(event.subscribe(|_| {}).is_err());
        // The failed attempt left no subscriber behind; a later failure
        // path is identical, proving the state machine never half-opens.
        assert!(event.subscribe(|_| {}).is_err());
    }

    #[test]
    fn trampoline_fans_out_in_subscription_order() {
        let _serial = LOCK.lock().unwrap();
        let event = StateChangedEvent::new(node(), counting_register, counting_unregister);

        let order = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);
        event
            .subscribe(move |_| first.lock().unwrap().push(1))
            .unwrap();
        event
            .subscribe(move |_| second.lock().unwrap().push(2))
            .unwrap();

        // Simulate the native library invoking the stored callback.
        let cookie = REGISTERED_COOKIE.load(Ordering::SeqCst) as *mut c_void;
        unsafe { trampoline(node(), cookie) };

        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn unsubscribed_callback_not_invoked() {
        let _serial = LOCK.lock().unwrap();
        let event = StateChangedEvent::new(node(), counting_register, counting_unregister);

        let hits = Arc::new(AtomicUsize::new(0));
        let kept_hits = Arc::clone(&hits);
        let dropped_hits = Arc::clone(&hits);

        let _keep = event
            .subscribe(move |_| {
                kept_hits.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let drop_id = event
            .subscribe(move |_| {
                dropped_hits.fetch_add(100, Ordering::SeqCst);
            })
            .unwrap();
        event.unsubscribe(drop_id);

        let cookie = REGISTERED_COOKIE.load(Ordering::SeqCst) as *mut c_void;
        unsafe { trampoline(node(), cookie) };

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
