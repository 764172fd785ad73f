//! Software backend: an in-process implementation of the middleware C API.
//!
//! This is the default backend. It keeps the middleware's bookkeeping
//! (handle table, reference counts, callback registrations, frame latching)
//! and synthesizes deterministic test-pattern frames, so the crate is fully
//! exercisable on a machine with no sensor and no native install. It does
//! not implement any of the sensor algorithms; tracking results are canned.
//!
//! Function names and signatures are identical to the `system` backend.

#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]

mod runtime;

use std::ffi::{c_char, c_void, CStr, CString};

use self::runtime::*;
use super::handles::*;
use super::types::*;

fn bad_handle() -> XnStatus {
    XN_STATUS_BAD_PARAM
}

unsafe fn opt_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

pub unsafe fn xnInit(pp_context: *mut XnContextHandle) -> XnStatus {
    if pp_context.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    rt.contexts.insert(
        id,
        Box::new(ContextObj {
            refs: 1,
            nodes: Vec::new(),
            global_mirror: false,
            error_state_callbacks: Vec::new(),
        }),
    );
    *pp_context = XnContextHandle::from_raw(id);
    log::debug!("emulation backend: context {} initialized", id);
    XN_STATUS_OK
}

pub unsafe fn xnContextAddRef(context: XnContextHandle) -> XnStatus {
    let mut rt = runtime();
    match rt.contexts.get_mut(&context.raw()) {
        Some(ctx) => {
            ctx.refs += 1;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnContextRelease(context: XnContextHandle) {
    let mut rt = runtime();
    let remove = match rt.contexts.get_mut(&context.raw()) {
        Some(ctx) => {
            ctx.refs -= 1;
            ctx.refs == 0
        }
        None => false,
    };
    if remove {
        // Nodes keep their own reference counts; they simply outlive the
        // context object until released themselves.
        rt.contexts.remove(&context.raw());
    }
}

unsafe fn update_context_nodes(rt: &mut Runtime, context: XnContextHandle) -> Vec<Fire> {
    let Some(ctx) = rt.contexts.get(&context.raw()) else {
        return Vec::new();
    };
    let node_ids = ctx.nodes.clone();
    let mut fires = Vec::new();
    for id in node_ids {
        let Some(node) = rt.nodes.get_mut(&id) else {
            continue;
        };
        if !node.generating {
            continue;
        }
        let changed = node.advance_frame();
        let handle = XnNodeHandle::from_raw(id);
        if changed {
            fires.extend(state_fires(node, handle, EventKind::NewData));
        }
        fires.extend(per_update_tracking_fires(node, handle));
    }
    fires
}

/// Tracking nodes surface their canned results through the update cycle.
fn per_update_tracking_fires(node: &mut NodeObj, handle: XnNodeHandle) -> Vec<Fire> {
    let mut fires = Vec::new();
    match node.node_type {
        XN_NODE_TYPE_GESTURE => {
            for gesture in node.pending_gesture_events.drain(..) {
                let pos = XnPoint3D {
                    x: 0.0,
                    y: 0.0,
                    z: 1200.0,
                };
                for reg in &node.callbacks {
                    if let EventFn::Gesture { recognized, .. } = reg.func {
                        fires.push(Fire::GestureRecognized(
                            recognized,
                            handle,
                            gesture.clone(),
                            pos,
                            pos,
                            reg.cookie,
                        ));
                    }
                }
            }
        }
        XN_NODE_TYPE_USER => {
            for (user, pose) in node.pose_detection.drain(..) {
                for reg in &node.callbacks {
                    if let EventFn::Pose(f) = reg.func {
                        fires.push(Fire::Pose(f, handle, pose.clone(), user, reg.cookie));
                    }
                }
            }
        }
        XN_NODE_TYPE_HANDS => {
            for &hand in &node.tracked_hands {
                let pos = XnPoint3D {
                    x: 50.0 * hand as f32,
                    y: 0.0,
                    z: 900.0,
                };
                let time = node.frame.timestamp as f32 / 1_000_000.0;
                for reg in &node.callbacks {
                    if let EventFn::Hand { update, .. } = reg.func {
                        fires.push(Fire::Hand(update, handle, hand, pos, time, reg.cookie));
                    }
                }
            }
        }
        _ => {}
    }
    fires
}

pub unsafe fn xnWaitAndUpdateAll(context: XnContextHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        if !rt.contexts.contains_key(&context.raw()) {
            return bad_handle();
        }
        update_context_nodes(&mut rt, context)
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnWaitOneUpdateAll(context: XnContextHandle, node: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        if !rt.contexts.contains_key(&context.raw()) || !rt.nodes.contains_key(&node.raw()) {
            return bad_handle();
        }
        update_context_nodes(&mut rt, context)
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnWaitAnyUpdateAll(context: XnContextHandle) -> XnStatus {
    xnWaitAndUpdateAll(context)
}

pub unsafe fn xnWaitNoneUpdateAll(context: XnContextHandle) -> XnStatus {
    xnWaitAndUpdateAll(context)
}

pub unsafe fn xnStartGeneratingAll(context: XnContextHandle) -> XnStatus {
    let mut fires = Vec::new();
    {
        let mut rt = runtime();
        let Some(ctx) = rt.contexts.get(&context.raw()) else {
            return bad_handle();
        };
        let node_ids = ctx.nodes.clone();
        for id in node_ids {
            fires.extend(start_generating_inner(&mut rt, XnNodeHandle::from_raw(id)));
        }
    }
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnStopGeneratingAll(context: XnContextHandle) -> XnStatus {
    let mut fires = Vec::new();
    {
        let mut rt = runtime();
        let Some(ctx) = rt.contexts.get(&context.raw()) else {
            return bad_handle();
        };
        let node_ids = ctx.nodes.clone();
        for id in node_ids {
            fires.extend(stop_generating_inner(&mut rt, XnNodeHandle::from_raw(id)));
        }
    }
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnSetGlobalMirror(context: XnContextHandle, mirror: XnBool) -> XnStatus {
    let mut fires = Vec::new();
    {
        let mut rt = runtime();
        let Some(ctx) = rt.contexts.get_mut(&context.raw()) else {
            return bad_handle();
        };
        ctx.global_mirror = mirror != XN_FALSE;
        let node_ids = ctx.nodes.clone();
        for id in node_ids {
            if let Some(node) = rt.nodes.get_mut(&id) {
                if node.is_map_generator() && node.mirror != (mirror != XN_FALSE) {
                    node.mirror = mirror != XN_FALSE;
                    fires.extend(state_fires(
                        node,
                        XnNodeHandle::from_raw(id),
                        EventKind::Mirror,
                    ));
                }
            }
        }
    }
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnGetGlobalMirror(context: XnContextHandle) -> XnBool {
    let rt = runtime();
    match rt.contexts.get(&context.raw()) {
        Some(ctx) if ctx.global_mirror => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnRegisterToGlobalErrorStateChange(
    context: XnContextHandle,
    handler: XnErrorStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    if ph_callback.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    let Some(ctx) = rt.contexts.get_mut(&context.raw()) else {
        return bad_handle();
    };
    ctx.error_state_callbacks.push(ErrorStateReg {
        id,
        handler,
        cookie: cookie as usize,
    });
    *ph_callback = XnCallbackHandle::from_raw(id);
    XN_STATUS_OK
}

pub unsafe fn xnUnregisterFromGlobalErrorStateChange(
    context: XnContextHandle,
    callback: XnCallbackHandle,
) {
    let mut rt = runtime();
    if let Some(ctx) = rt.contexts.get_mut(&context.raw()) {
        ctx.error_state_callbacks.retain(|reg| reg.id != callback.raw());
    }
}

// ---------------------------------------------------------------------------
// Enumeration, node creation
// ---------------------------------------------------------------------------

const ENUMERABLE_TYPES: [XnProductionNodeType; 12] = [
    XN_NODE_TYPE_DEVICE,
    XN_NODE_TYPE_DEPTH,
    XN_NODE_TYPE_IMAGE,
    XN_NODE_TYPE_AUDIO,
    XN_NODE_TYPE_IR,
    XN_NODE_TYPE_USER,
    XN_NODE_TYPE_RECORDER,
    XN_NODE_TYPE_PLAYER,
    XN_NODE_TYPE_GESTURE,
    XN_NODE_TYPE_SCENE,
    XN_NODE_TYPE_HANDS,
    XN_NODE_TYPE_CODEC,
];

fn candidate_description(node_type: XnProductionNodeType) -> XnProductionNodeDescription {
    XnProductionNodeDescription {
        node_type,
        vendor: str_to_fixed("OpenNI"),
        name: str_to_fixed("Emulation"),
        version: XnVersion {
            major: 1,
            minor: 5,
            maintenance: 0,
            build: 0,
        },
    }
}

pub unsafe fn xnEnumerateProductionTrees(
    context: XnContextHandle,
    node_type: XnProductionNodeType,
    query: XnQueryHandle,
    pp_list: *mut XnNodeInfoListHandle,
    errors: XnEnumerationErrorsHandle,
) -> XnStatus {
    if pp_list.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    if !rt.contexts.contains_key(&context.raw()) {
        return bad_handle();
    }
    if !ENUMERABLE_TYPES.contains(&node_type) {
        return XN_STATUS_NO_NODE_PRESENT;
    }

    let descr = candidate_description(node_type);
    let matches = match rt.queries.get(&query.raw()) {
        Some(q) => q.matches(&descr),
        None => true,
    };

    if !matches {
        // Record the rejected candidate the way the middleware does.
        record_enumeration_error(&mut rt, errors, descr, XN_STATUS_NO_MATCH);
        return XN_STATUS_NO_NODE_PRESENT;
    }

    let info_id = rt.alloc_id();
    let list_id = rt.alloc_id();
    rt.infos.insert(
        info_id,
        Box::new(NodeInfoObj {
            description: descr,
            instance_name: CString::default(),
            creation_info: CString::default(),
            next: 0,
            node: 0,
        }),
    );
    rt.lists.insert(
        list_id,
        Box::new(ListObj {
            first: info_id,
            infos: vec![info_id],
        }),
    );
    *pp_list = XnNodeInfoListHandle::from_raw(list_id);
    XN_STATUS_OK
}

fn type_basename(node_type: XnProductionNodeType) -> &'static str {
    match node_type {
        XN_NODE_TYPE_DEVICE => "Device",
        XN_NODE_TYPE_DEPTH => "Depth",
        XN_NODE_TYPE_IMAGE => "Image",
        XN_NODE_TYPE_AUDIO => "Audio",
        XN_NODE_TYPE_IR => "IR",
        XN_NODE_TYPE_USER => "User",
        XN_NODE_TYPE_RECORDER => "Recorder",
        XN_NODE_TYPE_PLAYER => "Player",
        XN_NODE_TYPE_GESTURE => "Gesture",
        XN_NODE_TYPE_SCENE => "Scene",
        XN_NODE_TYPE_HANDS => "Hands",
        XN_NODE_TYPE_CODEC => "Codec",
        _ => "Node",
    }
}

unsafe fn create_node_inner(
    rt: &mut Runtime,
    context: XnContextHandle,
    node_type: XnProductionNodeType,
    name: Option<CString>,
    mock: bool,
    ph_node: *mut XnNodeHandle,
) -> XnStatus {
    if ph_node.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    if !rt.contexts.contains_key(&context.raw()) {
        return bad_handle();
    }
    let id = rt.alloc_id();
    let name = name.unwrap_or_else(|| {
        CString::new(format!("{}{}", type_basename(node_type), id)).unwrap()
    });
    let mut node = NodeObj::new(context.raw(), node_type, name, mock);

    // Attach the live node's own descriptor object.
    let info_id = rt.alloc_id();
    rt.infos.insert(
        info_id,
        Box::new(NodeInfoObj {
            description: node.description,
            instance_name: node.name.clone(),
            creation_info: node.creation_info.clone(),
            next: 0,
            node: id,
        }),
    );
    node.info = info_id;

    log::debug!(
        "emulation backend: node {} created (type {}, mock: {})",
        id,
        node_type,
        mock
    );
    rt.nodes.insert(id, Box::new(node));
    if let Some(ctx) = rt.contexts.get_mut(&context.raw()) {
        ctx.nodes.push(id);
    }
    *ph_node = XnNodeHandle::from_raw(id);
    XN_STATUS_OK
}

pub unsafe fn xnCreateProductionTree(
    context: XnContextHandle,
    info: XnNodeInfoHandle,
    ph_node: *mut XnNodeHandle,
) -> XnStatus {
    let mut rt = runtime();
    let Some(info_obj) = rt.infos.get(&info.raw()) else {
        return bad_handle();
    };
    let node_type = info_obj.description.node_type;
    create_node_inner(&mut rt, context, node_type, None, false, ph_node)
}

fn record_enumeration_error(
    rt: &mut Runtime,
    errors: XnEnumerationErrorsHandle,
    descr: XnProductionNodeDescription,
    status: XnStatus,
) {
    if !rt.errors.contains_key(&errors.raw()) {
        return;
    }
    let entry_id = rt.alloc_id();
    let errs = rt.errors.get_mut(&errors.raw()).unwrap();
    let prev_first = errs.first;
    errs.entries.insert(
        entry_id,
        Box::new(ErrorEntry {
            description: descr,
            status,
            next: prev_first,
        }),
    );
    errs.first = entry_id;
}

pub unsafe fn xnCreateAnyProductionTree(
    context: XnContextHandle,
    node_type: XnProductionNodeType,
    query: XnQueryHandle,
    ph_node: *mut XnNodeHandle,
    errors: XnEnumerationErrorsHandle,
) -> XnStatus {
    let mut rt = runtime();
    if !rt.contexts.contains_key(&context.raw()) {
        return bad_handle();
    }
    if !ENUMERABLE_TYPES.contains(&node_type) {
        return XN_STATUS_NO_NODE_PRESENT;
    }
    let descr = candidate_description(node_type);
    let matches = match rt.queries.get(&query.raw()) {
        Some(q) => q.matches(&descr),
        None => true,
    };
    if !matches {
        record_enumeration_error(&mut rt, errors, descr, XN_STATUS_NO_MATCH);
        return XN_STATUS_NO_NODE_PRESENT;
    }
    create_node_inner(&mut rt, context, node_type, None, false, ph_node)
}

pub unsafe fn xnCreateMockNode(
    context: XnContextHandle,
    node_type: XnProductionNodeType,
    name: *const c_char,
    ph_node: *mut XnNodeHandle,
) -> XnStatus {
    let mut rt = runtime();
    let name = if name.is_null() {
        None
    } else {
        Some(CStr::from_ptr(name).to_owned())
    };
    create_node_inner(&mut rt, context, node_type, name, true, ph_node)
}

pub unsafe fn xnCreateMockNodeBasedOn(
    context: XnContextHandle,
    based_on: XnNodeHandle,
    name: *const c_char,
    ph_node: *mut XnNodeHandle,
) -> XnStatus {
    let mut rt = runtime();
    let (node_type, map_mode, pixel_format, wave_mode, z_res) =
        match rt.nodes.get(&based_on.raw()) {
            Some(orig) => (
                orig.node_type,
                orig.map_mode,
                orig.pixel_format,
                orig.wave_mode,
                orig.z_res,
            ),
            None => return bad_handle(),
        };
    let name = if name.is_null() {
        None
    } else {
        Some(CStr::from_ptr(name).to_owned())
    };
    let status = create_node_inner(&mut rt, context, node_type, name, true, ph_node);
    if status == XN_STATUS_OK {
        if let Some(node) = rt.nodes.get_mut(&(*ph_node).raw()) {
            node.map_mode = map_mode;
            node.pixel_format = pixel_format;
            node.wave_mode = wave_mode;
            node.z_res = z_res;
        }
    }
    status
}

pub unsafe fn xnFindExistingRefNodeByType(
    context: XnContextHandle,
    node_type: XnProductionNodeType,
    ph_node: *mut XnNodeHandle,
) -> XnStatus {
    if ph_node.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let Some(ctx) = rt.contexts.get(&context.raw()) else {
        return bad_handle();
    };
    let found = ctx
        .nodes
        .iter()
        .find(|&&id| {
            rt.nodes
                .get(&id)
                .map(|n| n.node_type == node_type)
                .unwrap_or(false)
        })
        .copied();
    match found {
        Some(id) => {
            rt.nodes.get_mut(&id).unwrap().refs += 1;
            *ph_node = XnNodeHandle::from_raw(id);
            XN_STATUS_OK
        }
        None => XN_STATUS_NODE_NOT_LOADED,
    }
}

pub unsafe fn xnContextOpenFileRecordingEx(
    context: XnContextHandle,
    file_name: *const c_char,
    ph_player: *mut XnNodeHandle,
) -> XnStatus {
    if file_name.is_null() || ph_player.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let source = CStr::from_ptr(file_name).to_owned();
    let mut rt = runtime();
    let status = create_node_inner(&mut rt, context, XN_NODE_TYPE_PLAYER, None, false, ph_player);
    if status != XN_STATUS_OK {
        return status;
    }
    let player_id = (*ph_player).raw();
    if let Some(player) = rt.nodes.get_mut(&player_id) {
        player.player_source = Some((XN_RECORD_MEDIUM_FILE, source));
    }
    // A recording carries the nodes it captured; surface one depth node.
    let mut recorded = XnNodeHandle::invalid();
    let status = create_node_inner(
        &mut rt,
        context,
        XN_NODE_TYPE_DEPTH,
        None,
        true,
        &mut recorded,
    );
    if status == XN_STATUS_OK {
        if let Some(depth) = rt.nodes.get_mut(&recorded.raw()) {
            depth.needed.push(player_id);
        }
    }
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// Status strings
// ---------------------------------------------------------------------------

pub unsafe fn xnGetStatusString(status: XnStatus) -> *const c_char {
    let s: &'static CStr = match status {
        XN_STATUS_OK => c"OK",
        XN_STATUS_ERROR => c"Error!",
        XN_STATUS_OUTPUT_BUFFER_OVERFLOW => c"Output buffer overflow!",
        XN_STATUS_NO_MATCH => c"No match found",
        XN_STATUS_IS_EMPTY => c"No items in data structure",
        XN_STATUS_NOT_IMPLEMENTED => c"Function was not implemented!",
        XN_STATUS_INVALID_OPERATION => c"This operation is invalid!",
        XN_STATUS_MISSING_NEEDED_TREE => c"A needed production node is missing!",
        XN_STATUS_BAD_PARAM => c"The value is invalid!",
        XN_STATUS_NODE_IS_LOCKED => c"The node is locked for changes!",
        XN_STATUS_WAIT_DATA_TIMEOUT => c"A timeout has occurred when waiting for new data!",
        XN_STATUS_BAD_TYPE => c"The operation requires an object of a different type!",
        XN_STATUS_UNSUPPORTED_VERSION => c"Unsupported version",
        XN_STATUS_PROPERTY_NOT_SET => c"The property is not set",
        XN_STATUS_NODE_NOT_LOADED => c"No node with the requested description is loaded",
        XN_STATUS_NO_NODE_PRESENT => c"Can't create any node of the requested type!",
        XN_STATUS_BAD_NODE_NAME => c"No node by the specified name exists",
        XN_STATUS_UNSUPPORTED_CODEC => c"Failed to find a matching codec",
        XN_STATUS_EOF => c"End of file reached",
        XN_STATUS_DEVICE_NOT_CONNECTED => c"The device is not connected!",
        XN_STATUS_NO_SUCH_PROPERTY => c"There is no such property",
        XN_STATUS_NODE_ALREADY_RECORDED => c"This node is already recorded!",
        XN_STATUS_NO_SUCH_USER => c"User could not be found",
        XN_STATUS_USER_IS_NOT_BEING_TRACKED => c"User is not being tracked",
        XN_STATUS_JOINT_IS_NOT_ACTIVE => c"Joint is not active",
        _ => c"Unknown error!",
    };
    s.as_ptr()
}

pub unsafe fn xnGetStatusName(status: XnStatus) -> *const c_char {
    let s: &'static CStr = match status {
        XN_STATUS_OK => c"XN_STATUS_OK",
        XN_STATUS_ERROR => c"XN_STATUS_ERROR",
        XN_STATUS_OUTPUT_BUFFER_OVERFLOW => c"XN_STATUS_OUTPUT_BUFFER_OVERFLOW",
        XN_STATUS_NO_MATCH => c"XN_STATUS_NO_MATCH",
        XN_STATUS_IS_EMPTY => c"XN_STATUS_IS_EMPTY",
        XN_STATUS_NOT_IMPLEMENTED => c"XN_STATUS_NOT_IMPLEMENTED",
        XN_STATUS_INVALID_OPERATION => c"XN_STATUS_INVALID_OPERATION",
        XN_STATUS_MISSING_NEEDED_TREE => c"XN_STATUS_MISSING_NEEDED_TREE",
        XN_STATUS_BAD_PARAM => c"XN_STATUS_BAD_PARAM",
        XN_STATUS_NODE_IS_LOCKED => c"XN_STATUS_NODE_IS_LOCKED",
        XN_STATUS_WAIT_DATA_TIMEOUT => c"XN_STATUS_WAIT_DATA_TIMEOUT",
        XN_STATUS_BAD_TYPE => c"XN_STATUS_BAD_TYPE",
        XN_STATUS_UNSUPPORTED_VERSION => c"XN_STATUS_UNSUPPORTED_VERSION",
        XN_STATUS_PROPERTY_NOT_SET => c"XN_STATUS_PROPERTY_NOT_SET",
        XN_STATUS_NODE_NOT_LOADED => c"XN_STATUS_NODE_NOT_LOADED",
        XN_STATUS_NO_NODE_PRESENT => c"XN_STATUS_NO_NODE_PRESENT",
        XN_STATUS_BAD_NODE_NAME => c"XN_STATUS_BAD_NODE_NAME",
        XN_STATUS_UNSUPPORTED_CODEC => c"XN_STATUS_UNSUPPORTED_CODEC",
        XN_STATUS_EOF => c"XN_STATUS_EOF",
        XN_STATUS_DEVICE_NOT_CONNECTED => c"XN_STATUS_DEVICE_NOT_CONNECTED",
        XN_STATUS_NO_SUCH_PROPERTY => c"XN_STATUS_NO_SUCH_PROPERTY",
        XN_STATUS_NODE_ALREADY_RECORDED => c"XN_STATUS_NODE_ALREADY_RECORDED",
        XN_STATUS_NO_SUCH_USER => c"XN_STATUS_NO_SUCH_USER",
        XN_STATUS_USER_IS_NOT_BEING_TRACKED => c"XN_STATUS_USER_IS_NOT_BEING_TRACKED",
        XN_STATUS_JOINT_IS_NOT_ACTIVE => c"XN_STATUS_JOINT_IS_NOT_ACTIVE",
        _ => c"XN_STATUS_UNKNOWN",
    };
    s.as_ptr()
}

// ---------------------------------------------------------------------------
// Node info and node info lists
// ---------------------------------------------------------------------------

pub unsafe fn xnNodeInfoGetDescription(
    info: XnNodeInfoHandle,
) -> *const XnProductionNodeDescription {
    let rt = runtime();
    match rt.infos.get(&info.raw()) {
        Some(obj) => &obj.description as *const _,
        None => std::ptr::null(),
    }
}

pub unsafe fn xnNodeInfoGetInstanceName(info: XnNodeInfoHandle) -> *const c_char {
    let rt = runtime();
    match rt.infos.get(&info.raw()) {
        Some(obj) => obj.instance_name.as_ptr(),
        None => std::ptr::null(),
    }
}

pub unsafe fn xnNodeInfoGetCreationInfo(info: XnNodeInfoHandle) -> *const c_char {
    let rt = runtime();
    match rt.infos.get(&info.raw()) {
        Some(obj) => obj.creation_info.as_ptr(),
        None => std::ptr::null(),
    }
}

pub unsafe fn xnNodeInfoListFree(list: XnNodeInfoListHandle) {
    let mut rt = runtime();
    if let Some(obj) = rt.lists.remove(&list.raw()) {
        for info in obj.infos {
            rt.infos.remove(&info);
        }
    }
}

pub unsafe fn xnNodeInfoListGetFirst(list: XnNodeInfoListHandle) -> XnNodeInfoListIterator {
    let rt = runtime();
    let current = rt.lists.get(&list.raw()).map(|l| l.first).unwrap_or(0);
    XnNodeInfoListIterator {
        current: current as *mut c_void,
    }
}

pub unsafe fn xnNodeInfoListGetNext(it: XnNodeInfoListIterator) -> XnNodeInfoListIterator {
    let rt = runtime();
    let next = rt
        .infos
        .get(&(it.current as usize))
        .map(|i| i.next)
        .unwrap_or(0);
    XnNodeInfoListIterator {
        current: next as *mut c_void,
    }
}

pub unsafe fn xnNodeInfoListIteratorIsValid(it: XnNodeInfoListIterator) -> XnBool {
    if it.current.is_null() {
        XN_FALSE
    } else {
        XN_TRUE
    }
}

pub unsafe fn xnNodeInfoListGetCurrent(it: XnNodeInfoListIterator) -> XnNodeInfoHandle {
    XnNodeInfoHandle::from_raw(it.current as usize)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub unsafe fn xnNodeQueryAllocate(pp_query: *mut XnQueryHandle) -> XnStatus {
    if pp_query.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    rt.queries.insert(id, Box::new(QueryObj::default()));
    *pp_query = XnQueryHandle::from_raw(id);
    XN_STATUS_OK
}

pub unsafe fn xnNodeQueryFree(query: XnQueryHandle) {
    runtime().queries.remove(&query.raw());
}

pub unsafe fn xnNodeQuerySetVendor(query: XnQueryHandle, vendor: *const c_char) -> XnStatus {
    let mut rt = runtime();
    match rt.queries.get_mut(&query.raw()) {
        Some(q) => {
            q.vendor = Some(opt_str(vendor));
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnNodeQuerySetName(query: XnQueryHandle, name: *const c_char) -> XnStatus {
    let mut rt = runtime();
    match rt.queries.get_mut(&query.raw()) {
        Some(q) => {
            q.name = Some(opt_str(name));
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnNodeQuerySetMinVersion(
    query: XnQueryHandle,
    version: *const XnVersion,
) -> XnStatus {
    if version.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    match rt.queries.get_mut(&query.raw()) {
        Some(q) => {
            q.min_version = Some(*version);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnNodeQueryAddSupportedCapability(
    query: XnQueryHandle,
    capability: *const c_char,
) -> XnStatus {
    let mut rt = runtime();
    match rt.queries.get_mut(&query.raw()) {
        Some(q) => {
            q.capabilities.push(opt_str(capability));
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnNodeQueryAddSupportedMapOutputMode(
    query: XnQueryHandle,
    mode: *const XnMapOutputMode,
) -> XnStatus {
    if mode.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    match rt.queries.get_mut(&query.raw()) {
        Some(q) => {
            q.map_modes.push(*mode);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

// ---------------------------------------------------------------------------
// Enumeration errors
// ---------------------------------------------------------------------------

pub unsafe fn xnEnumerationErrorsAllocate(pp_errors: *mut XnEnumerationErrorsHandle) -> XnStatus {
    if pp_errors.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    rt.errors.insert(
        id,
        Box::new(ErrorsObj {
            first: 0,
            entries: std::collections::HashMap::new(),
        }),
    );
    *pp_errors = XnEnumerationErrorsHandle::from_raw(id);
    XN_STATUS_OK
}

pub unsafe fn xnEnumerationErrorsFree(errors: XnEnumerationErrorsHandle) {
    runtime().errors.remove(&errors.raw());
}

pub unsafe fn xnEnumerationErrorsGetFirst(
    errors: XnEnumerationErrorsHandle,
) -> XnEnumerationErrorsIterator {
    let rt = runtime();
    let current = rt.errors.get(&errors.raw()).map(|e| e.first).unwrap_or(0);
    XnEnumerationErrorsIterator {
        current: current as *mut c_void,
    }
}

pub unsafe fn xnEnumerationErrorsGetNext(
    it: XnEnumerationErrorsIterator,
) -> XnEnumerationErrorsIterator {
    let rt = runtime();
    let mut next = 0;
    for errs in rt.errors.values() {
        if let Some(entry) = errs.entries.get(&(it.current as usize)) {
            next = entry.next;
            break;
        }
    }
    XnEnumerationErrorsIterator {
        current: next as *mut c_void,
    }
}

pub unsafe fn xnEnumerationErrorsIteratorIsValid(it: XnEnumerationErrorsIterator) -> XnBool {
    if it.current.is_null() {
        XN_FALSE
    } else {
        XN_TRUE
    }
}

pub unsafe fn xnEnumerationErrorsGetCurrentDescription(
    it: XnEnumerationErrorsIterator,
) -> *const XnProductionNodeDescription {
    let rt = runtime();
    for errs in rt.errors.values() {
        if let Some(entry) = errs.entries.get(&(it.current as usize)) {
            return &entry.description as *const _;
        }
    }
    std::ptr::null()
}

pub unsafe fn xnEnumerationErrorsGetCurrentError(it: XnEnumerationErrorsIterator) -> XnStatus {
    let rt = runtime();
    for errs in rt.errors.values() {
        if let Some(entry) = errs.entries.get(&(it.current as usize)) {
            return entry.status;
        }
    }
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// Production node base
// ---------------------------------------------------------------------------

pub unsafe fn xnProductionNodeAddRef(node: XnNodeHandle) -> XnStatus {
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.refs += 1;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnProductionNodeRelease(node: XnNodeHandle) {
    let mut rt = runtime();
    let remove = match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.refs = obj.refs.saturating_sub(1);
            obj.refs == 0
        }
        None => false,
    };
    if remove {
        let obj = rt.nodes.remove(&node.raw()).unwrap();
        rt.infos.remove(&obj.info);
        if let Some(ctx) = rt.contexts.get_mut(&obj.context) {
            ctx.nodes.retain(|&id| id != node.raw());
        }
    }
}

pub unsafe fn xnGetNodeInfo(node: XnNodeHandle) -> XnNodeInfoHandle {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => XnNodeInfoHandle::from_raw(obj.info),
        None => XnNodeInfoHandle::invalid(),
    }
}

pub unsafe fn xnGetNodeName(node: XnNodeHandle) -> *const c_char {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.name.as_ptr(),
        None => std::ptr::null(),
    }
}

pub unsafe fn xnIsCapabilitySupported(node: XnNodeHandle, capability: *const c_char) -> XnBool {
    let name = opt_str(capability);
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.supports_capability(&name) => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnAddNeededNode(node: XnNodeHandle, needed: XnNodeHandle) -> XnStatus {
    let mut rt = runtime();
    if !rt.nodes.contains_key(&needed.raw()) {
        return bad_handle();
    }
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            if !obj.needed.contains(&needed.raw()) {
                obj.needed.push(needed.raw());
            }
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnSetIntProperty(
    node: XnNodeHandle,
    name: *const c_char,
    value: u64,
) -> XnStatus {
    let key = opt_str(name);
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.int_props.insert(key, value);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnSetRealProperty(
    node: XnNodeHandle,
    name: *const c_char,
    value: f64,
) -> XnStatus {
    let key = opt_str(name);
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.real_props.insert(key, value);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnSetStringProperty(
    node: XnNodeHandle,
    name: *const c_char,
    value: *const c_char,
) -> XnStatus {
    let key = opt_str(name);
    let value = CString::new(opt_str(value)).unwrap_or_default();
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.string_props.insert(key, value);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnSetGeneralProperty(
    node: XnNodeHandle,
    name: *const c_char,
    size: u32,
    buffer: *const c_void,
) -> XnStatus {
    if buffer.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let key = opt_str(name);
    let data = std::slice::from_raw_parts(buffer as *const u8, size as usize).to_vec();
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.general_props.insert(key, data);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnGetIntProperty(
    node: XnNodeHandle,
    name: *const c_char,
    p_value: *mut u64,
) -> XnStatus {
    if p_value.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let key = opt_str(name);
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => match obj.int_props.get(&key) {
            Some(v) => {
                *p_value = *v;
                XN_STATUS_OK
            }
            None => XN_STATUS_NO_SUCH_PROPERTY,
        },
        None => bad_handle(),
    }
}

pub unsafe fn xnGetRealProperty(
    node: XnNodeHandle,
    name: *const c_char,
    p_value: *mut f64,
) -> XnStatus {
    if p_value.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let key = opt_str(name);
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => match obj.real_props.get(&key) {
            Some(v) => {
                *p_value = *v;
                XN_STATUS_OK
            }
            None => XN_STATUS_NO_SUCH_PROPERTY,
        },
        None => bad_handle(),
    }
}

pub unsafe fn xnGetStringProperty(
    node: XnNodeHandle,
    name: *const c_char,
    buffer: *mut c_char,
    size: u32,
) -> XnStatus {
    if buffer.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let key = opt_str(name);
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => match obj.string_props.get(&key) {
            Some(v) => copy_c_string(v, buffer, size),
            None => XN_STATUS_NO_SUCH_PROPERTY,
        },
        None => bad_handle(),
    }
}

pub unsafe fn xnGetGeneralProperty(
    node: XnNodeHandle,
    name: *const c_char,
    size: u32,
    buffer: *mut c_void,
) -> XnStatus {
    if buffer.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let key = opt_str(name);
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => match obj.general_props.get(&key) {
            Some(v) => {
                if v.len() > size as usize {
                    return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
                }
                std::ptr::copy_nonoverlapping(v.as_ptr(), buffer as *mut u8, v.len());
                XN_STATUS_OK
            }
            None => XN_STATUS_NO_SUCH_PROPERTY,
        },
        None => bad_handle(),
    }
}

unsafe fn copy_c_string(value: &CString, buffer: *mut c_char, size: u32) -> XnStatus {
    let bytes = value.as_bytes_with_nul();
    if bytes.len() > size as usize {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buffer, bytes.len());
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn start_generating_inner(rt: &mut Runtime, node: XnNodeHandle) -> Vec<Fire> {
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return Vec::new();
    };
    if obj.generating {
        return Vec::new();
    }
    obj.generating = true;
    let mut fires = state_fires(obj, node, EventKind::GenerationRunning);
    if obj.node_type == XN_NODE_TYPE_USER && obj.users.is_empty() {
        // Two canned users walk into view as soon as generation starts.
        obj.users = vec![1, 2];
        for &user in &obj.users {
            for reg in &obj.callbacks {
                if let EventFn::User { new_user, .. } = reg.func {
                    fires.push(Fire::User(new_user, node, user, reg.cookie));
                }
            }
        }
    }
    fires
}

fn stop_generating_inner(rt: &mut Runtime, node: XnNodeHandle) -> Vec<Fire> {
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return Vec::new();
    };
    if !obj.generating {
        return Vec::new();
    }
    obj.generating = false;
    state_fires(obj, node, EventKind::GenerationRunning)
}

pub unsafe fn xnStartGenerating(node: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        if !rt.nodes.contains_key(&node.raw()) {
            return bad_handle();
        }
        start_generating_inner(&mut rt, node)
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnStopGenerating(node: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        if !rt.nodes.contains_key(&node.raw()) {
            return bad_handle();
        }
        stop_generating_inner(&mut rt, node)
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnIsGenerating(node: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.generating => XN_TRUE,
        _ => XN_FALSE,
    }
}

unsafe fn register_state_callback(
    node: XnNodeHandle,
    kind: EventKind,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    if ph_callback.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.callbacks.push(CallbackReg {
                id,
                kind,
                func: EventFn::State(handler),
                cookie: cookie as usize,
            });
            *ph_callback = XnCallbackHandle::from_raw(id);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

unsafe fn unregister_callback(node: XnNodeHandle, callback: XnCallbackHandle) {
    let mut rt = runtime();
    if let Some(obj) = rt.nodes.get_mut(&node.raw()) {
        obj.callbacks.retain(|reg| reg.id != callback.raw());
    }
}

pub unsafe fn xnRegisterToGenerationRunningChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::GenerationRunning, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromGenerationRunningChange(
    node: XnNodeHandle,
    callback: XnCallbackHandle,
) {
    unregister_callback(node, callback);
}

pub unsafe fn xnRegisterToNewDataAvailable(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::NewData, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromNewDataAvailable(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

pub unsafe fn xnIsNewDataAvailable(node: XnNodeHandle, p_timestamp: *mut u64) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => {
            if !p_timestamp.is_null() {
                *p_timestamp = obj.frame.timestamp + 1;
            }
            if obj.generating {
                XN_TRUE
            } else {
                XN_FALSE
            }
        }
        None => XN_FALSE,
    }
}

pub unsafe fn xnWaitAndUpdateData(node: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        if !obj.generating {
            return XN_STATUS_INVALID_OPERATION;
        }
        let changed = obj.advance_frame();
        let mut fires = Vec::new();
        if changed {
            fires.extend(state_fires(obj, node, EventKind::NewData));
        }
        fires.extend(per_update_tracking_fires(obj, node));
        fires
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnIsDataNew(node: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.frame.is_new => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnGetData(node: XnNodeHandle) -> *const c_void {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.as_ptr() as *const c_void,
        None => std::ptr::null(),
    }
}

pub unsafe fn xnGetDataSize(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.len() as u32,
        None => 0,
    }
}

pub unsafe fn xnGetTimestamp(node: XnNodeHandle) -> u64 {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.frame.timestamp)
        .unwrap_or(0)
}

pub unsafe fn xnGetFrameID(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.frame.frame_id)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Mirror capability
// ---------------------------------------------------------------------------

pub unsafe fn xnSetMirror(node: XnNodeHandle, mirror: XnBool) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        let mirror = mirror != XN_FALSE;
        if obj.mirror == mirror {
            Vec::new()
        } else {
            obj.mirror = mirror;
            state_fires(obj, node, EventKind::Mirror)
        }
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnIsMirrored(node: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.mirror => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnRegisterToMirrorChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::Mirror, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromMirrorChange(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Map generators
// ---------------------------------------------------------------------------

pub unsafe fn xnGetSupportedMapOutputModesCount(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.supported_modes.len() as u32)
        .unwrap_or(0)
}

pub unsafe fn xnGetSupportedMapOutputModes(
    node: XnNodeHandle,
    modes: *mut XnMapOutputMode,
    p_count: *mut u32,
) -> XnStatus {
    if modes.is_null() || p_count.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return bad_handle();
    };
    if (*p_count as usize) < obj.supported_modes.len() {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    for (i, mode) in obj.supported_modes.iter().enumerate() {
        *modes.add(i) = *mode;
    }
    *p_count = obj.supported_modes.len() as u32;
    XN_STATUS_OK
}

pub unsafe fn xnSetMapOutputMode(node: XnNodeHandle, mode: *const XnMapOutputMode) -> XnStatus {
    if mode.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        let mode = *mode;
        if !obj.mock && !obj.supported_modes.contains(&mode) {
            return XN_STATUS_BAD_PARAM;
        }
        if obj.map_mode == mode {
            Vec::new()
        } else {
            obj.map_mode = mode;
            state_fires(obj, node, EventKind::MapOutputMode)
        }
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnGetMapOutputMode(node: XnNodeHandle, mode: *mut XnMapOutputMode) -> XnStatus {
    if mode.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => {
            *mode = obj.map_mode;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnRegisterToMapOutputModeChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::MapOutputMode, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromMapOutputModeChange(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

pub unsafe fn xnGetBytesPerPixel(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.bytes_per_pixel() as u32)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Cropping capability
// ---------------------------------------------------------------------------

pub unsafe fn xnSetCropping(node: XnNodeHandle, cropping: *const XnCropping) -> XnStatus {
    if cropping.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        obj.cropping = *cropping;
        state_fires(obj, node, EventKind::Cropping)
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnGetCropping(node: XnNodeHandle, cropping: *mut XnCropping) -> XnStatus {
    if cropping.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => {
            *cropping = obj.cropping;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnRegisterToCroppingChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::Cropping, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromCroppingChange(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Anti-flicker capability
// ---------------------------------------------------------------------------

pub unsafe fn xnSetPowerLineFrequency(
    node: XnNodeHandle,
    frequency: XnPowerLineFrequency,
) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        if obj.power_line == frequency {
            Vec::new()
        } else {
            obj.power_line = frequency;
            state_fires(obj, node, EventKind::PowerLineFrequency)
        }
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnGetPowerLineFrequency(node: XnNodeHandle) -> XnPowerLineFrequency {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.power_line)
        .unwrap_or(XN_POWER_LINE_FREQUENCY_OFF)
}

pub unsafe fn xnRegisterToPowerLineFrequencyChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::PowerLineFrequency, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromPowerLineFrequencyChange(
    node: XnNodeHandle,
    callback: XnCallbackHandle,
) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Alternative viewpoint capability
// ---------------------------------------------------------------------------

pub unsafe fn xnIsViewPointSupported(node: XnNodeHandle, other: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match (rt.nodes.get(&node.raw()), rt.nodes.get(&other.raw())) {
        (Some(a), Some(b)) if a.is_map_generator() && b.is_map_generator() => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnSetViewPoint(node: XnNodeHandle, other: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        if !rt.nodes.contains_key(&other.raw()) {
            return bad_handle();
        }
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        obj.view_point = Some(other.raw());
        state_fires(obj, node, EventKind::ViewPoint)
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnResetViewPoint(node: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        if obj.view_point.take().is_none() {
            Vec::new()
        } else {
            state_fires(obj, node, EventKind::ViewPoint)
        }
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnIsViewPointAs(node: XnNodeHandle, other: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.view_point == Some(other.raw()) => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnRegisterToViewPointChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::ViewPoint, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromViewPointChange(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Frame-sync capability
// ---------------------------------------------------------------------------

pub unsafe fn xnCanFrameSyncWith(node: XnNodeHandle, other: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match (rt.nodes.get(&node.raw()), rt.nodes.get(&other.raw())) {
        (Some(a), Some(b)) if a.is_generator() && b.is_generator() && a.context == b.context => {
            XN_TRUE
        }
        _ => XN_FALSE,
    }
}

pub unsafe fn xnFrameSyncWith(node: XnNodeHandle, other: XnNodeHandle) -> XnStatus {
    let mut rt = runtime();
    if !rt.nodes.contains_key(&other.raw()) {
        return bad_handle();
    }
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            if !obj.frame_synced.contains(&other.raw()) {
                obj.frame_synced.push(other.raw());
            }
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnStopFrameSyncWith(node: XnNodeHandle, other: XnNodeHandle) -> XnStatus {
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.frame_synced.retain(|&id| id != other.raw());
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnIsFrameSyncedWith(node: XnNodeHandle, other: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.frame_synced.contains(&other.raw()) => XN_TRUE,
        _ => XN_FALSE,
    }
}

// ---------------------------------------------------------------------------
// Depth
// ---------------------------------------------------------------------------

unsafe fn fill_output(obj: &NodeObj, out: *mut XnOutputMetaData) {
    if out.is_null() {
        return;
    }
    (*out).timestamp = obj.frame.timestamp;
    (*out).frame_id = obj.frame.frame_id;
    (*out).data_size = obj.frame.data.len() as u32;
    (*out).is_new = if obj.frame.is_new { XN_TRUE } else { XN_FALSE };
}

unsafe fn fill_map(obj: &NodeObj, map: *mut XnMapMetaData) {
    if map.is_null() {
        return;
    }
    let res = XnUInt32XYPair {
        x: obj.map_mode.x_res,
        y: obj.map_mode.y_res,
    };
    (*map).res = res;
    (*map).offset = XnUInt32XYPair { x: 0, y: 0 };
    (*map).full_res = res;
    (*map).pixel_format = obj.pixel_format;
    (*map).fps = obj.map_mode.fps;
    let out = (*map).output;
    fill_output(obj, out);
}

pub unsafe fn xnGetDepthMetaData(node: XnNodeHandle, p_meta: *mut XnDepthMetaData) {
    if p_meta.is_null() {
        return;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return;
    };
    fill_map(obj, (*p_meta).map);
    (*p_meta).data = obj.frame.data.as_ptr() as *const XnDepthPixel;
    (*p_meta).z_res = obj.z_res;
}

pub unsafe fn xnGetDepthMap(node: XnNodeHandle) -> *const XnDepthPixel {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.as_ptr() as *const XnDepthPixel,
        None => std::ptr::null(),
    }
}

pub unsafe fn xnGetDeviceMaxDepth(node: XnNodeHandle) -> XnDepthPixel {
    let rt = runtime();
    rt.nodes.get(&node.raw()).map(|obj| obj.z_res).unwrap_or(0)
}

const EMULATED_H_FOV: f64 = 1.0226;
const EMULATED_V_FOV: f64 = 0.7966;

pub unsafe fn xnGetDepthFieldOfView(node: XnNodeHandle, p_fov: *mut XnFieldOfView) -> XnStatus {
    if p_fov.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    (*p_fov).h_fov = EMULATED_H_FOV;
    (*p_fov).v_fov = EMULATED_V_FOV;
    XN_STATUS_OK
}

pub unsafe fn xnConvertProjectiveToRealWorld(
    node: XnNodeHandle,
    count: u32,
    projective: *const XnPoint3D,
    real_world: *mut XnPoint3D,
) -> XnStatus {
    if projective.is_null() || real_world.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let (x_res, y_res) = {
        let rt = runtime();
        let Some(obj) = rt.nodes.get(&node.raw()) else {
            return bad_handle();
        };
        (obj.map_mode.x_res as f64, obj.map_mode.y_res as f64)
    };
    let xz = 2.0 * (EMULATED_H_FOV / 2.0).tan();
    let yz = 2.0 * (EMULATED_V_FOV / 2.0).tan();
    for i in 0..count as usize {
        let p = *projective.add(i);
        let z = p.z as f64;
        let out = XnPoint3D {
            x: ((p.x as f64 / x_res - 0.5) * z * xz) as f32,
            y: ((0.5 - p.y as f64 / y_res) * z * yz) as f32,
            z: p.z,
        };
        *real_world.add(i) = out;
    }
    XN_STATUS_OK
}

pub unsafe fn xnConvertRealWorldToProjective(
    node: XnNodeHandle,
    count: u32,
    real_world: *const XnPoint3D,
    projective: *mut XnPoint3D,
) -> XnStatus {
    if real_world.is_null() || projective.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let (x_res, y_res) = {
        let rt = runtime();
        let Some(obj) = rt.nodes.get(&node.raw()) else {
            return bad_handle();
        };
        (obj.map_mode.x_res as f64, obj.map_mode.y_res as f64)
    };
    let xz = 2.0 * (EMULATED_H_FOV / 2.0).tan();
    let yz = 2.0 * (EMULATED_V_FOV / 2.0).tan();
    for i in 0..count as usize {
        let p = *real_world.add(i);
        let z = p.z as f64;
        let out = if z == 0.0 {
            XnPoint3D {
                x: (x_res / 2.0) as f32,
                y: (y_res / 2.0) as f32,
                z: 0.0,
            }
        } else {
            XnPoint3D {
                x: ((p.x as f64 / (z * xz) + 0.5) * x_res) as f32,
                y: ((0.5 - p.y as f64 / (z * yz)) * y_res) as f32,
                z: p.z,
            }
        };
        *projective.add(i) = out;
    }
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// User-position capability
// ---------------------------------------------------------------------------

pub unsafe fn xnGetSupportedUserPositionsCount(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.user_positions.len() as u32)
        .unwrap_or(0)
}

pub unsafe fn xnSetUserPosition(
    node: XnNodeHandle,
    index: u32,
    position: *const XnBoundingBox3D,
) -> XnStatus {
    if position.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    match obj.user_positions.get_mut(index as usize) {
        Some(slot) => {
            *slot = *position;
            XN_STATUS_OK
        }
        None => XN_STATUS_BAD_PARAM,
    }
}

pub unsafe fn xnGetUserPosition(
    node: XnNodeHandle,
    index: u32,
    position: *mut XnBoundingBox3D,
) -> XnStatus {
    if position.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return bad_handle();
    };
    match obj.user_positions.get(index as usize) {
        Some(slot) => {
            *position = *slot;
            XN_STATUS_OK
        }
        None => XN_STATUS_BAD_PARAM,
    }
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

pub unsafe fn xnGetImageMetaData(node: XnNodeHandle, p_meta: *mut XnImageMetaData) {
    if p_meta.is_null() {
        return;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return;
    };
    fill_map(obj, (*p_meta).map);
    (*p_meta).data = obj.frame.data.as_ptr();
}

pub unsafe fn xnGetImageMap(node: XnNodeHandle) -> *const u8 {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.as_ptr(),
        None => std::ptr::null(),
    }
}

pub unsafe fn xnSetPixelFormat(node: XnNodeHandle, format: XnPixelFormat) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        if !(XN_PIXEL_FORMAT_RGB24..=XN_PIXEL_FORMAT_MJPEG).contains(&format) {
            return XN_STATUS_BAD_PARAM;
        }
        if obj.pixel_format == format {
            Vec::new()
        } else {
            obj.pixel_format = format;
            state_fires(obj, node, EventKind::PixelFormat)
        }
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnGetPixelFormat(node: XnNodeHandle) -> XnPixelFormat {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.pixel_format)
        .unwrap_or(XN_PIXEL_FORMAT_RGB24)
}

pub unsafe fn xnIsPixelFormatSupported(node: XnNodeHandle, format: XnPixelFormat) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(_) if (XN_PIXEL_FORMAT_RGB24..=XN_PIXEL_FORMAT_GRAYSCALE_16_BIT).contains(&format) => {
            XN_TRUE
        }
        _ => XN_FALSE,
    }
}

pub unsafe fn xnRegisterToPixelFormatChange(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::PixelFormat, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromPixelFormatChange(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// IR
// ---------------------------------------------------------------------------

pub unsafe fn xnGetIRMetaData(node: XnNodeHandle, p_meta: *mut XnIRMetaData) {
    if p_meta.is_null() {
        return;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return;
    };
    fill_map(obj, (*p_meta).map);
    (*p_meta).data = obj.frame.data.as_ptr() as *const XnIRPixel;
}

pub unsafe fn xnGetIRMap(node: XnNodeHandle) -> *const XnIRPixel {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.as_ptr() as *const XnIRPixel,
        None => std::ptr::null(),
    }
}

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

pub unsafe fn xnGetAudioMetaData(node: XnNodeHandle, p_meta: *mut XnAudioMetaData) {
    if p_meta.is_null() {
        return;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return;
    };
    fill_output(obj, (*p_meta).output);
    (*p_meta).wave = obj.wave_mode;
    (*p_meta).data = obj.frame.data.as_ptr();
}

pub unsafe fn xnGetAudioBuffer(node: XnNodeHandle) -> *const u8 {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.as_ptr(),
        None => std::ptr::null(),
    }
}

const SUPPORTED_WAVE_MODES: [XnWaveOutputMode; 2] = [
    XnWaveOutputMode {
        sample_rate: 44100,
        bits_per_sample: 16,
        channels: 2,
    },
    XnWaveOutputMode {
        sample_rate: 48000,
        bits_per_sample: 16,
        channels: 2,
    },
];

pub unsafe fn xnGetSupportedWaveOutputModesCount(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    if rt.nodes.contains_key(&node.raw()) {
        SUPPORTED_WAVE_MODES.len() as u32
    } else {
        0
    }
}

pub unsafe fn xnGetSupportedWaveOutputModes(
    node: XnNodeHandle,
    modes: *mut XnWaveOutputMode,
    p_count: *mut u32,
) -> XnStatus {
    if modes.is_null() || p_count.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    if (*p_count as usize) < SUPPORTED_WAVE_MODES.len() {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    for (i, mode) in SUPPORTED_WAVE_MODES.iter().enumerate() {
        *modes.add(i) = *mode;
    }
    *p_count = SUPPORTED_WAVE_MODES.len() as u32;
    XN_STATUS_OK
}

pub unsafe fn xnSetWaveOutputMode(
    node: XnNodeHandle,
    mode: *const XnWaveOutputMode,
) -> XnStatus {
    if mode.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        let mode = *mode;
        if !obj.mock && !SUPPORTED_WAVE_MODES.contains(&mode) {
            return XN_STATUS_BAD_PARAM;
        }
        if obj.wave_mode == mode {
            Vec::new()
        } else {
            obj.wave_mode = mode;
            state_fires(obj, node, EventKind::WaveOutputMode)
        }
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnGetWaveOutputMode(
    node: XnNodeHandle,
    mode: *mut XnWaveOutputMode,
) -> XnStatus {
    if mode.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => {
            *mode = obj.wave_mode;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnRegisterToWaveOutputModeChanges(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::WaveOutputMode, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromWaveOutputModeChanges(
    node: XnNodeHandle,
    callback: XnCallbackHandle,
) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

pub unsafe fn xnGetSceneMetaData(node: XnNodeHandle, p_meta: *mut XnSceneMetaData) {
    if p_meta.is_null() {
        return;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return;
    };
    fill_map(obj, (*p_meta).map);
    (*p_meta).data = obj.frame.data.as_ptr() as *const XnLabel;
}

pub unsafe fn xnGetLabelMap(node: XnNodeHandle) -> *const XnLabel {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => obj.frame.data.as_ptr() as *const XnLabel,
        None => std::ptr::null(),
    }
}

pub unsafe fn xnGetFloor(node: XnNodeHandle, p_plane: *mut XnPlane3D) -> XnStatus {
    if p_plane.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    (*p_plane).normal = XnVector3D {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    (*p_plane).point = XnPoint3D {
        x: 0.0,
        y: -600.0,
        z: 2000.0,
    };
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// User generator
// ---------------------------------------------------------------------------

pub unsafe fn xnGetNumberOfUsers(node: XnNodeHandle) -> u16 {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.users.len() as u16)
        .unwrap_or(0)
}

pub unsafe fn xnGetUsers(
    node: XnNodeHandle,
    users: *mut XnUserID,
    p_count: *mut u16,
) -> XnStatus {
    if users.is_null() || p_count.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return bad_handle();
    };
    if (*p_count as usize) < obj.users.len() {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    for (i, &user) in obj.users.iter().enumerate() {
        *users.add(i) = user;
    }
    *p_count = obj.users.len() as u16;
    XN_STATUS_OK
}

pub unsafe fn xnGetUserCoM(
    node: XnNodeHandle,
    user: XnUserID,
    p_com: *mut XnPoint3D,
) -> XnStatus {
    if p_com.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return bad_handle();
    };
    if !obj.users.contains(&user) {
        return XN_STATUS_NO_SUCH_USER;
    }
    *p_com = XnPoint3D {
        x: 250.0 * user as f32,
        y: 0.0,
        z: 2000.0,
    };
    XN_STATUS_OK
}

pub unsafe fn xnRegisterUserCallbacks(
    node: XnNodeHandle,
    new_user: XnUserHandler,
    lost_user: XnUserHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    if ph_callback.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.callbacks.push(CallbackReg {
                id,
                kind: EventKind::User,
                func: EventFn::User { new_user, lost_user },
                cookie: cookie as usize,
            });
            *ph_callback = XnCallbackHandle::from_raw(id);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnUnregisterUserCallbacks(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Skeleton capability
// ---------------------------------------------------------------------------

pub unsafe fn xnSetSkeletonProfile(node: XnNodeHandle, profile: u32) -> XnStatus {
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.skeleton_profile = profile;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnIsSkeletonTracking(node: XnNodeHandle, user: XnUserID) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.tracked_users.contains(&user) => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnStartSkeletonTracking(node: XnNodeHandle, user: XnUserID) -> XnStatus {
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    if !obj.users.contains(&user) {
        return XN_STATUS_NO_SUCH_USER;
    }
    if !obj.tracked_users.contains(&user) {
        obj.tracked_users.push(user);
    }
    XN_STATUS_OK
}

pub unsafe fn xnStopSkeletonTracking(node: XnNodeHandle, user: XnUserID) -> XnStatus {
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    obj.tracked_users.retain(|&u| u != user);
    XN_STATUS_OK
}

pub unsafe fn xnGetSkeletonJointPosition(
    node: XnNodeHandle,
    user: XnUserID,
    joint: u32,
    p_position: *mut XnSkeletonJointPosition,
) -> XnStatus {
    if p_position.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return bad_handle();
    };
    if !obj.users.contains(&user) {
        return XN_STATUS_NO_SUCH_USER;
    }
    if !obj.tracked_users.contains(&user) {
        return XN_STATUS_USER_IS_NOT_BEING_TRACKED;
    }
    // Canned skeleton: joints fanned out around the user's center of mass.
    *p_position = XnSkeletonJointPosition {
        position: XnPoint3D {
            x: 250.0 * user as f32 + 10.0 * joint as f32,
            y: 400.0 - 30.0 * joint as f32,
            z: 2000.0,
        },
        confidence: 1.0,
    };
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// Pose-detection capability
// ---------------------------------------------------------------------------

const AVAILABLE_POSES: [&CStr; 1] = [c"Psi"];

pub unsafe fn xnGetNumberOfPoses(node: XnNodeHandle) -> u32 {
    let rt = runtime();
    if rt.nodes.contains_key(&node.raw()) {
        AVAILABLE_POSES.len() as u32
    } else {
        0
    }
}

pub unsafe fn xnGetAllAvailablePoses(
    node: XnNodeHandle,
    poses: *mut *mut c_char,
    name_length: u32,
    p_count: *mut u32,
) -> XnStatus {
    if poses.is_null() || p_count.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    if (*p_count as usize) < AVAILABLE_POSES.len() {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    for (i, pose) in AVAILABLE_POSES.iter().enumerate() {
        let dst = *poses.add(i);
        if dst.is_null() {
            return XN_STATUS_BAD_PARAM;
        }
        let bytes = pose.to_bytes_with_nul();
        if bytes.len() > name_length as usize {
            return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, dst, bytes.len());
    }
    *p_count = AVAILABLE_POSES.len() as u32;
    XN_STATUS_OK
}

pub unsafe fn xnStartPoseDetection(
    node: XnNodeHandle,
    pose: *const c_char,
    user: XnUserID,
) -> XnStatus {
    if pose.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let pose = CStr::from_ptr(pose).to_owned();
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    if !obj.users.contains(&user) {
        return XN_STATUS_NO_SUCH_USER;
    }
    obj.pose_detection.push((user, pose));
    XN_STATUS_OK
}

pub unsafe fn xnStopPoseDetection(node: XnNodeHandle, user: XnUserID) -> XnStatus {
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    obj.pose_detection.retain(|(u, _)| *u != user);
    XN_STATUS_OK
}

pub unsafe fn xnRegisterToPoseDetected(
    node: XnNodeHandle,
    handler: XnPoseDetectionCallback,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    if ph_callback.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.callbacks.push(CallbackReg {
                id,
                kind: EventKind::PoseDetected,
                func: EventFn::Pose(handler),
                cookie: cookie as usize,
            });
            *ph_callback = XnCallbackHandle::from_raw(id);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnUnregisterFromPoseDetected(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Gesture generator
// ---------------------------------------------------------------------------

const AVAILABLE_GESTURES: [&CStr; 2] = [c"Wave", c"Click"];

pub unsafe fn xnAddGesture(
    node: XnNodeHandle,
    gesture: *const c_char,
    _area: *const XnBoundingBox3D,
) -> XnStatus {
    if gesture.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let gesture = CStr::from_ptr(gesture).to_owned();
    if !AVAILABLE_GESTURES.iter().any(|g| *g == gesture.as_c_str()) {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    if !obj.active_gestures.contains(&gesture) {
        obj.active_gestures.push(gesture.clone());
    }
    obj.pending_gesture_events.push(gesture);
    XN_STATUS_OK
}

pub unsafe fn xnRemoveGesture(node: XnNodeHandle, gesture: *const c_char) -> XnStatus {
    if gesture.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let gesture = CStr::from_ptr(gesture).to_owned();
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    obj.active_gestures.retain(|g| *g != gesture);
    XN_STATUS_OK
}

pub unsafe fn xnGetNumberOfAvailableGestures(node: XnNodeHandle) -> u16 {
    let rt = runtime();
    if rt.nodes.contains_key(&node.raw()) {
        AVAILABLE_GESTURES.len() as u16
    } else {
        0
    }
}

pub unsafe fn xnEnumerateAllGestures(
    node: XnNodeHandle,
    gestures: *mut *mut c_char,
    name_length: u32,
    p_count: *mut u16,
) -> XnStatus {
    if gestures.is_null() || p_count.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    if (*p_count as usize) < AVAILABLE_GESTURES.len() {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    for (i, gesture) in AVAILABLE_GESTURES.iter().enumerate() {
        let dst = *gestures.add(i);
        if dst.is_null() {
            return XN_STATUS_BAD_PARAM;
        }
        let bytes = gesture.to_bytes_with_nul();
        if bytes.len() > name_length as usize {
            return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
        }
        std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, dst, bytes.len());
    }
    *p_count = AVAILABLE_GESTURES.len() as u16;
    XN_STATUS_OK
}

pub unsafe fn xnRegisterGestureCallbacks(
    node: XnNodeHandle,
    recognized: XnGestureRecognized,
    progress: XnGestureProgress,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    if ph_callback.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.callbacks.push(CallbackReg {
                id,
                kind: EventKind::Gesture,
                func: EventFn::Gesture { recognized, progress },
                cookie: cookie as usize,
            });
            *ph_callback = XnCallbackHandle::from_raw(id);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnUnregisterGestureCallbacks(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Hands generator
// ---------------------------------------------------------------------------

pub unsafe fn xnStartTracking(node: XnNodeHandle, position: *const XnPoint3D) -> XnStatus {
    if position.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let position = *position;
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        let hand = obj.next_hand_id;
        obj.next_hand_id += 1;
        obj.tracked_hands.push(hand);
        let time = obj.frame.timestamp as f32 / 1_000_000.0;
        let mut fires = Vec::new();
        for reg in &obj.callbacks {
            if let EventFn::Hand { create, .. } = reg.func {
                fires.push(Fire::Hand(
                    create,
                    node,
                    hand,
                    position,
                    time,
                    reg.cookie,
                ));
            }
        }
        fires
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnStopTracking(node: XnNodeHandle, user: XnUserID) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        if !obj.tracked_hands.contains(&user) {
            return XN_STATUS_NO_SUCH_USER;
        }
        obj.tracked_hands.retain(|&h| h != user);
        let time = obj.frame.timestamp as f32 / 1_000_000.0;
        let mut fires = Vec::new();
        for reg in &obj.callbacks {
            if let EventFn::Hand { destroy, .. } = reg.func {
                fires.push(Fire::HandDestroy(destroy, node, user, time, reg.cookie));
            }
        }
        fires
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnStopTrackingAll(node: XnNodeHandle) -> XnStatus {
    let fires = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        let hands = std::mem::take(&mut obj.tracked_hands);
        let time = obj.frame.timestamp as f32 / 1_000_000.0;
        let mut fires = Vec::new();
        for hand in hands {
            for reg in &obj.callbacks {
                if let EventFn::Hand { destroy, .. } = reg.func {
                    fires.push(Fire::HandDestroy(destroy, node, hand, time, reg.cookie));
                }
            }
        }
        fires
    };
    dispatch(fires);
    XN_STATUS_OK
}

pub unsafe fn xnSetTrackingSmoothing(node: XnNodeHandle, factor: f32) -> XnStatus {
    if !(0.0..=1.0).contains(&factor) {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.real_props.insert("TrackingSmoothing".into(), factor as f64);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnRegisterHandCallbacks(
    node: XnNodeHandle,
    create: XnHandCreate,
    update: XnHandUpdate,
    destroy: XnHandDestroy,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    if ph_callback.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let mut rt = runtime();
    let id = rt.alloc_id();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.callbacks.push(CallbackReg {
                id,
                kind: EventKind::Hand,
                func: EventFn::Hand {
                    create,
                    update,
                    destroy,
                },
                cookie: cookie as usize,
            });
            *ph_callback = XnCallbackHandle::from_raw(id);
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnUnregisterHandCallbacks(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Device identification capability
// ---------------------------------------------------------------------------

unsafe fn copy_sized_string(value: &CStr, buffer: *mut c_char, p_size: *mut u32) -> XnStatus {
    if p_size.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let bytes = value.to_bytes_with_nul();
    if buffer.is_null() || (*p_size as usize) < bytes.len() {
        *p_size = bytes.len() as u32;
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buffer, bytes.len());
    *p_size = bytes.len() as u32;
    XN_STATUS_OK
}

pub unsafe fn xnGetDeviceName(
    node: XnNodeHandle,
    buffer: *mut c_char,
    p_size: *mut u32,
) -> XnStatus {
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    copy_sized_string(c"Emulated Sensor", buffer, p_size)
}

pub unsafe fn xnGetVendorSpecificData(
    node: XnNodeHandle,
    buffer: *mut c_char,
    p_size: *mut u32,
) -> XnStatus {
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    copy_sized_string(c"", buffer, p_size)
}

pub unsafe fn xnGetSerialNumber(
    node: XnNodeHandle,
    buffer: *mut c_char,
    p_size: *mut u32,
) -> XnStatus {
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    // Derive a stable serial from the handle so two devices differ.
    let serial = CString::new(format!("EMU{:08}", node.raw())).unwrap();
    copy_sized_string(&serial, buffer, p_size)
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

pub unsafe fn xnCreateRecorder(
    context: XnContextHandle,
    _format: *const c_char,
    ph_recorder: *mut XnNodeHandle,
) -> XnStatus {
    let mut rt = runtime();
    create_node_inner(&mut rt, context, XN_NODE_TYPE_RECORDER, None, false, ph_recorder)
}

pub unsafe fn xnSetRecorderDestination(
    node: XnNodeHandle,
    medium: XnRecordMedium,
    destination: *const c_char,
) -> XnStatus {
    if destination.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    if medium != XN_RECORD_MEDIUM_FILE {
        return XN_STATUS_BAD_PARAM;
    }
    let destination = CStr::from_ptr(destination).to_owned();
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.record_destination = Some((medium, destination));
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnGetRecorderDestination(
    node: XnNodeHandle,
    p_medium: *mut XnRecordMedium,
    destination: *mut c_char,
    size: u32,
) -> XnStatus {
    if p_medium.is_null() || destination.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    let Some(obj) = rt.nodes.get(&node.raw()) else {
        return bad_handle();
    };
    match &obj.record_destination {
        Some((medium, dest)) => {
            *p_medium = *medium;
            copy_c_string(dest, destination, size)
        }
        None => XN_STATUS_PROPERTY_NOT_SET,
    }
}

pub unsafe fn xnAddNodeToRecording(
    node: XnNodeHandle,
    added: XnNodeHandle,
    compression: XnCodecID,
) -> XnStatus {
    let mut rt = runtime();
    if !rt.nodes.contains_key(&added.raw()) {
        return bad_handle();
    }
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    if obj.recorded_nodes.iter().any(|(id, _)| *id == added.raw()) {
        return XN_STATUS_NODE_ALREADY_RECORDED;
    }
    obj.recorded_nodes.push((added.raw(), compression));
    XN_STATUS_OK
}

pub unsafe fn xnRemoveNodeFromRecording(node: XnNodeHandle, removed: XnNodeHandle) -> XnStatus {
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    let before = obj.recorded_nodes.len();
    obj.recorded_nodes.retain(|(id, _)| *id != removed.raw());
    if obj.recorded_nodes.len() == before {
        return XN_STATUS_BAD_PARAM;
    }
    XN_STATUS_OK
}

pub unsafe fn xnRecord(node: XnNodeHandle) -> XnStatus {
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    if obj.record_destination.is_none() {
        return XN_STATUS_INVALID_OPERATION;
    }
    obj.frames_recorded += 1;
    XN_STATUS_OK
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub unsafe fn xnCreatePlayer(
    context: XnContextHandle,
    _format: *const c_char,
    ph_player: *mut XnNodeHandle,
) -> XnStatus {
    let mut rt = runtime();
    create_node_inner(&mut rt, context, XN_NODE_TYPE_PLAYER, None, false, ph_player)
}

pub unsafe fn xnSetPlayerRepeat(node: XnNodeHandle, repeat: XnBool) -> XnStatus {
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.player_repeat = repeat != XN_FALSE;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnSetPlayerSource(
    node: XnNodeHandle,
    medium: XnRecordMedium,
    source: *const c_char,
) -> XnStatus {
    if source.is_null() || medium != XN_RECORD_MEDIUM_FILE {
        return XN_STATUS_BAD_PARAM;
    }
    let source = CStr::from_ptr(source).to_owned();
    let mut rt = runtime();
    match rt.nodes.get_mut(&node.raw()) {
        Some(obj) => {
            obj.player_source = Some((medium, source));
            obj.player_frame = 0;
            obj.player_eof = false;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnPlayerReadNext(node: XnNodeHandle) -> XnStatus {
    let (status, fires) = {
        let mut rt = runtime();
        let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
            return bad_handle();
        };
        if obj.player_source.is_none() {
            return XN_STATUS_INVALID_OPERATION;
        }
        if obj.player_eof {
            return XN_STATUS_EOF;
        }
        obj.player_frame += 1;
        if obj.player_frame >= obj.player_num_frames {
            if obj.player_repeat {
                obj.player_frame = 0;
                (XN_STATUS_OK, Vec::new())
            } else {
                obj.player_eof = true;
                (XN_STATUS_EOF, state_fires(obj, node, EventKind::EndOfFile))
            }
        } else {
            (XN_STATUS_OK, Vec::new())
        }
    };
    dispatch(fires);
    status
}

pub unsafe fn xnSeekPlayerToFrame(
    node: XnNodeHandle,
    _node_name: *const c_char,
    frame_offset: i64,
    origin: u32,
) -> XnStatus {
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    let base = match origin {
        0 => 0,
        1 => obj.player_frame as i64,
        2 => obj.player_num_frames as i64,
        _ => return XN_STATUS_BAD_PARAM,
    };
    let target = base + frame_offset;
    if target < 0 || target > obj.player_num_frames as i64 {
        return XN_STATUS_BAD_PARAM;
    }
    obj.player_frame = target as u32;
    obj.player_eof = false;
    XN_STATUS_OK
}

pub unsafe fn xnTellPlayerFrame(
    node: XnNodeHandle,
    _node_name: *const c_char,
    p_frame: *mut u32,
) -> XnStatus {
    if p_frame.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) => {
            *p_frame = obj.player_frame;
            XN_STATUS_OK
        }
        None => bad_handle(),
    }
}

pub unsafe fn xnIsPlayerAtEOF(node: XnNodeHandle) -> XnBool {
    let rt = runtime();
    match rt.nodes.get(&node.raw()) {
        Some(obj) if obj.player_eof => XN_TRUE,
        _ => XN_FALSE,
    }
}

pub unsafe fn xnRegisterToEndOfFileReached(
    node: XnNodeHandle,
    handler: XnStateChangedHandler,
    cookie: *mut c_void,
    ph_callback: *mut XnCallbackHandle,
) -> XnStatus {
    register_state_callback(node, EventKind::EndOfFile, handler, cookie, ph_callback)
}

pub unsafe fn xnUnregisterFromEndOfFileReached(node: XnNodeHandle, callback: XnCallbackHandle) {
    unregister_callback(node, callback);
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

pub unsafe fn xnCreateCodec(
    context: XnContextHandle,
    codec_id: XnCodecID,
    init_node: XnNodeHandle,
    ph_codec: *mut XnNodeHandle,
) -> XnStatus {
    if codec_id != XN_CODEC_NULL && codec_id != XN_CODEC_UNCOMPRESSED && codec_id != XN_CODEC_16Z {
        return XN_STATUS_UNSUPPORTED_CODEC;
    }
    let mut rt = runtime();
    if init_node.is_valid() && !rt.nodes.contains_key(&init_node.raw()) {
        return bad_handle();
    }
    let status = create_node_inner(&mut rt, context, XN_NODE_TYPE_CODEC, None, false, ph_codec);
    if status == XN_STATUS_OK {
        if let Some(obj) = rt.nodes.get_mut(&(*ph_codec).raw()) {
            obj.codec_id = codec_id;
        }
    }
    status
}

pub unsafe fn xnGetCodecID(node: XnNodeHandle) -> XnCodecID {
    let rt = runtime();
    rt.nodes
        .get(&node.raw())
        .map(|obj| obj.codec_id)
        .unwrap_or(XN_CODEC_NULL)
}

unsafe fn codec_copy(
    node: XnNodeHandle,
    src: *const c_void,
    src_size: u32,
    dst: *mut c_void,
    dst_size: u32,
    p_written: *mut u32,
) -> XnStatus {
    if src.is_null() || dst.is_null() || p_written.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let rt = runtime();
    if !rt.nodes.contains_key(&node.raw()) {
        return bad_handle();
    }
    if dst_size < src_size {
        return XN_STATUS_OUTPUT_BUFFER_OVERFLOW;
    }
    std::ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, src_size as usize);
    *p_written = src_size;
    XN_STATUS_OK
}

pub unsafe fn xnEncodeData(
    node: XnNodeHandle,
    src: *const c_void,
    src_size: u32,
    dst: *mut c_void,
    dst_size: u32,
    p_written: *mut u32,
) -> XnStatus {
    // The software codec is a pass-through; size is preserved.
    codec_copy(node, src, src_size, dst, dst_size, p_written)
}

pub unsafe fn xnDecodeData(
    node: XnNodeHandle,
    src: *const c_void,
    src_size: u32,
    dst: *mut c_void,
    dst_size: u32,
    p_written: *mut u32,
) -> XnStatus {
    codec_copy(node, src, src_size, dst, dst_size, p_written)
}

// ---------------------------------------------------------------------------
// Mock data injection
// ---------------------------------------------------------------------------

unsafe fn mock_set_data(
    node: XnNodeHandle,
    frame_id: u32,
    timestamp: u64,
    data_size: u32,
    data: *const u8,
) -> XnStatus {
    if data.is_null() {
        return XN_STATUS_BAD_PARAM;
    }
    let buf = std::slice::from_raw_parts(data, data_size as usize).to_vec();
    let mut rt = runtime();
    let Some(obj) = rt.nodes.get_mut(&node.raw()) else {
        return bad_handle();
    };
    if !obj.mock {
        return XN_STATUS_INVALID_OPERATION;
    }
    obj.frame.pending = Some((frame_id, timestamp, buf));
    XN_STATUS_OK
}

pub unsafe fn xnMockDepthSetData(
    node: XnNodeHandle,
    frame_id: u32,
    timestamp: u64,
    data_size: u32,
    data: *const XnDepthPixel,
) -> XnStatus {
    mock_set_data(node, frame_id, timestamp, data_size, data as *const u8)
}

pub unsafe fn xnMockImageSetData(
    node: XnNodeHandle,
    frame_id: u32,
    timestamp: u64,
    data_size: u32,
    data: *const u8,
) -> XnStatus {
    mock_set_data(node, frame_id, timestamp, data_size, data)
}

pub unsafe fn xnMockIRSetData(
    node: XnNodeHandle,
    frame_id: u32,
    timestamp: u64,
    data_size: u32,
    data: *const XnIRPixel,
) -> XnStatus {
    mock_set_data(node, frame_id, timestamp, data_size, data as *const u8)
}

pub unsafe fn xnMockAudioSetData(
    node: XnNodeHandle,
    frame_id: u32,
    timestamp: u64,
    data_size: u32,
    data: *const u8,
) -> XnStatus {
    mock_set_data(node, frame_id, timestamp, data_size, data)
}
