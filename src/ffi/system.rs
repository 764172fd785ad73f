//! Native middleware bindings, linked when the `system` feature is on.
//!
//! Signatures must stay in lockstep with the software backend in `emu`;
//! the safe layer is compiled against exactly one of the two.

#![allow(non_snake_case)]

use std::os::raw::{c_char, c_void};

use super::handles::*;
use super::types::*;

extern "C" {
    // Context
    pub fn xnInit(pp_context: *mut XnContextHandle) -> XnStatus;
    pub fn xnContextAddRef(context: XnContextHandle) -> XnStatus;
    pub fn xnContextRelease(context: XnContextHandle);
    pub fn xnWaitAndUpdateAll(context: XnContextHandle) -> XnStatus;
    pub fn xnWaitOneUpdateAll(context: XnContextHandle, node: XnNodeHandle) -> XnStatus;
    pub fn xnWaitAnyUpdateAll(context: XnContextHandle) -> XnStatus;
    pub fn xnWaitNoneUpdateAll(context: XnContextHandle) -> XnStatus;
    pub fn xnStartGeneratingAll(context: XnContextHandle) -> XnStatus;
    pub fn xnStopGeneratingAll(context: XnContextHandle) -> XnStatus;
    pub fn xnSetGlobalMirror(context: XnContextHandle, mirror: XnBool) -> XnStatus;
    pub fn xnGetGlobalMirror(context: XnContextHandle) -> XnBool;
    pub fn xnRegisterToGlobalErrorStateChange(
        context: XnContextHandle,
        handler: XnErrorStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromGlobalErrorStateChange(
        context: XnContextHandle,
        callback: XnCallbackHandle,
    );

    // Enumeration and node creation
    pub fn xnEnumerateProductionTrees(
        context: XnContextHandle,
        node_type: XnProductionNodeType,
        query: XnQueryHandle,
        pp_list: *mut XnNodeInfoListHandle,
        errors: XnEnumerationErrorsHandle,
    ) -> XnStatus;
    pub fn xnCreateProductionTree(
        context: XnContextHandle,
        info: XnNodeInfoHandle,
        ph_node: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnCreateAnyProductionTree(
        context: XnContextHandle,
        node_type: XnProductionNodeType,
        query: XnQueryHandle,
        ph_node: *mut XnNodeHandle,
        errors: XnEnumerationErrorsHandle,
    ) -> XnStatus;
    pub fn xnCreateMockNode(
        context: XnContextHandle,
        node_type: XnProductionNodeType,
        name: *const c_char,
        ph_node: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnCreateMockNodeBasedOn(
        context: XnContextHandle,
        based_on: XnNodeHandle,
        name: *const c_char,
        ph_node: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnFindExistingRefNodeByType(
        context: XnContextHandle,
        node_type: XnProductionNodeType,
        ph_node: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnContextOpenFileRecordingEx(
        context: XnContextHandle,
        file_name: *const c_char,
        ph_player: *mut XnNodeHandle,
    ) -> XnStatus;

    // Status strings
    pub fn xnGetStatusString(status: XnStatus) -> *const c_char;
    pub fn xnGetStatusName(status: XnStatus) -> *const c_char;

    // Node info
    pub fn xnNodeInfoGetDescription(info: XnNodeInfoHandle)
        -> *const XnProductionNodeDescription;
    pub fn xnNodeInfoGetInstanceName(info: XnNodeInfoHandle) -> *const c_char;
    pub fn xnNodeInfoGetCreationInfo(info: XnNodeInfoHandle) -> *const c_char;

    // Node info lists
    pub fn xnNodeInfoListFree(list: XnNodeInfoListHandle);
    pub fn xnNodeInfoListGetFirst(list: XnNodeInfoListHandle) -> XnNodeInfoListIterator;
    pub fn xnNodeInfoListGetNext(it: XnNodeInfoListIterator) -> XnNodeInfoListIterator;
    pub fn xnNodeInfoListIteratorIsValid(it: XnNodeInfoListIterator) -> XnBool;
    pub fn xnNodeInfoListGetCurrent(it: XnNodeInfoListIterator) -> XnNodeInfoHandle;

    // Queries
    pub fn xnNodeQueryAllocate(pp_query: *mut XnQueryHandle) -> XnStatus;
    pub fn xnNodeQueryFree(query: XnQueryHandle);
    pub fn xnNodeQuerySetVendor(query: XnQueryHandle, vendor: *const c_char) -> XnStatus;
    pub fn xnNodeQuerySetName(query: XnQueryHandle, name: *const c_char) -> XnStatus;
    pub fn xnNodeQuerySetMinVersion(query: XnQueryHandle, version: *const XnVersion) -> XnStatus;
    pub fn xnNodeQueryAddSupportedCapability(
        query: XnQueryHandle,
        capability: *const c_char,
    ) -> XnStatus;
    pub fn xnNodeQueryAddSupportedMapOutputMode(
        query: XnQueryHandle,
        mode: *const XnMapOutputMode,
    ) -> XnStatus;

    // Enumeration errors
    pub fn xnEnumerationErrorsAllocate(pp_errors: *mut XnEnumerationErrorsHandle) -> XnStatus;
    pub fn xnEnumerationErrorsFree(errors: XnEnumerationErrorsHandle);
    pub fn xnEnumerationErrorsGetFirst(
        errors: XnEnumerationErrorsHandle,
    ) -> XnEnumerationErrorsIterator;
    pub fn xnEnumerationErrorsGetNext(
        it: XnEnumerationErrorsIterator,
    ) -> XnEnumerationErrorsIterator;
    pub fn xnEnumerationErrorsIteratorIsValid(it: XnEnumerationErrorsIterator) -> XnBool;
    pub fn xnEnumerationErrorsGetCurrentDescription(
        it: XnEnumerationErrorsIterator,
    ) -> *const XnProductionNodeDescription;
    pub fn xnEnumerationErrorsGetCurrentError(it: XnEnumerationErrorsIterator) -> XnStatus;

    // Production node base
    pub fn xnProductionNodeAddRef(node: XnNodeHandle) -> XnStatus;
    pub fn xnProductionNodeRelease(node: XnNodeHandle);
    pub fn xnGetNodeInfo(node: XnNodeHandle) -> XnNodeInfoHandle;
    pub fn xnGetNodeName(node: XnNodeHandle) -> *const c_char;
    pub fn xnIsCapabilitySupported(node: XnNodeHandle, capability: *const c_char) -> XnBool;
    pub fn xnAddNeededNode(node: XnNodeHandle, needed: XnNodeHandle) -> XnStatus;
    pub fn xnSetIntProperty(node: XnNodeHandle, name: *const c_char, value: u64) -> XnStatus;
    pub fn xnSetRealProperty(node: XnNodeHandle, name: *const c_char, value: f64) -> XnStatus;
    pub fn xnSetStringProperty(
        node: XnNodeHandle,
        name: *const c_char,
        value: *const c_char,
    ) -> XnStatus;
    pub fn xnSetGeneralProperty(
        node: XnNodeHandle,
        name: *const c_char,
        size: u32,
        buffer: *const c_void,
    ) -> XnStatus;
    pub fn xnGetIntProperty(
        node: XnNodeHandle,
        name: *const c_char,
        p_value: *mut u64,
    ) -> XnStatus;
    pub fn xnGetRealProperty(
        node: XnNodeHandle,
        name: *const c_char,
        p_value: *mut f64,
    ) -> XnStatus;
    pub fn xnGetStringProperty(
        node: XnNodeHandle,
        name: *const c_char,
        buffer: *mut c_char,
        size: u32,
    ) -> XnStatus;
    pub fn xnGetGeneralProperty(
        node: XnNodeHandle,
        name: *const c_char,
        size: u32,
        buffer: *mut c_void,
    ) -> XnStatus;

    // Generators
    pub fn xnStartGenerating(node: XnNodeHandle) -> XnStatus;
    pub fn xnStopGenerating(node: XnNodeHandle) -> XnStatus;
    pub fn xnIsGenerating(node: XnNodeHandle) -> XnBool;
    pub fn xnRegisterToGenerationRunningChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromGenerationRunningChange(
        node: XnNodeHandle,
        callback: XnCallbackHandle,
    );
    pub fn xnRegisterToNewDataAvailable(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromNewDataAvailable(node: XnNodeHandle, callback: XnCallbackHandle);
    pub fn xnIsNewDataAvailable(node: XnNodeHandle, p_timestamp: *mut u64) -> XnBool;
    pub fn xnWaitAndUpdateData(node: XnNodeHandle) -> XnStatus;
    pub fn xnIsDataNew(node: XnNodeHandle) -> XnBool;
    pub fn xnGetData(node: XnNodeHandle) -> *const c_void;
    pub fn xnGetDataSize(node: XnNodeHandle) -> u32;
    pub fn xnGetTimestamp(node: XnNodeHandle) -> u64;
    pub fn xnGetFrameID(node: XnNodeHandle) -> u32;

    // Mirror capability
    pub fn xnSetMirror(node: XnNodeHandle, mirror: XnBool) -> XnStatus;
    pub fn xnIsMirrored(node: XnNodeHandle) -> XnBool;
    pub fn xnRegisterToMirrorChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromMirrorChange(node: XnNodeHandle, callback: XnCallbackHandle);

    // Map generators
    pub fn xnGetSupportedMapOutputModesCount(node: XnNodeHandle) -> u32;
    pub fn xnGetSupportedMapOutputModes(
        node: XnNodeHandle,
        modes: *mut XnMapOutputMode,
        p_count: *mut u32,
    ) -> XnStatus;
    pub fn xnSetMapOutputMode(node: XnNodeHandle, mode: *const XnMapOutputMode) -> XnStatus;
    pub fn xnGetMapOutputMode(node: XnNodeHandle, mode: *mut XnMapOutputMode) -> XnStatus;
    pub fn xnRegisterToMapOutputModeChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromMapOutputModeChange(node: XnNodeHandle, callback: XnCallbackHandle);
    pub fn xnGetBytesPerPixel(node: XnNodeHandle) -> u32;

    // Cropping capability
    pub fn xnSetCropping(node: XnNodeHandle, cropping: *const XnCropping) -> XnStatus;
    pub fn xnGetCropping(node: XnNodeHandle, cropping: *mut XnCropping) -> XnStatus;
    pub fn xnRegisterToCroppingChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromCroppingChange(node: XnNodeHandle, callback: XnCallbackHandle);

    // Anti-flicker capability
    pub fn xnSetPowerLineFrequency(
        node: XnNodeHandle,
        frequency: XnPowerLineFrequency,
    ) -> XnStatus;
    pub fn xnGetPowerLineFrequency(node: XnNodeHandle) -> XnPowerLineFrequency;
    pub fn xnRegisterToPowerLineFrequencyChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromPowerLineFrequencyChange(
        node: XnNodeHandle,
        callback: XnCallbackHandle,
    );

    // Alternative viewpoint capability
    pub fn xnIsViewPointSupported(node: XnNodeHandle, other: XnNodeHandle) -> XnBool;
    pub fn xnSetViewPoint(node: XnNodeHandle, other: XnNodeHandle) -> XnStatus;
    pub fn xnResetViewPoint(node: XnNodeHandle) -> XnStatus;
    pub fn xnIsViewPointAs(node: XnNodeHandle, other: XnNodeHandle) -> XnBool;
    pub fn xnRegisterToViewPointChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromViewPointChange(node: XnNodeHandle, callback: XnCallbackHandle);

    // Frame-sync capability
    pub fn xnCanFrameSyncWith(node: XnNodeHandle, other: XnNodeHandle) -> XnBool;
    pub fn xnFrameSyncWith(node: XnNodeHandle, other: XnNodeHandle) -> XnStatus;
    pub fn xnStopFrameSyncWith(node: XnNodeHandle, other: XnNodeHandle) -> XnStatus;
    pub fn xnIsFrameSyncedWith(node: XnNodeHandle, other: XnNodeHandle) -> XnBool;

    // Depth
    pub fn xnGetDepthMetaData(node: XnNodeHandle, p_meta: *mut XnDepthMetaData);
    pub fn xnGetDepthMap(node: XnNodeHandle) -> *const XnDepthPixel;
    pub fn xnGetDeviceMaxDepth(node: XnNodeHandle) -> XnDepthPixel;
    pub fn xnGetDepthFieldOfView(node: XnNodeHandle, p_fov: *mut XnFieldOfView) -> XnStatus;
    pub fn xnConvertProjectiveToRealWorld(
        node: XnNodeHandle,
        count: u32,
        projective: *const XnPoint3D,
        real_world: *mut XnPoint3D,
    ) -> XnStatus;
    pub fn xnConvertRealWorldToProjective(
        node: XnNodeHandle,
        count: u32,
        real_world: *const XnPoint3D,
        projective: *mut XnPoint3D,
    ) -> XnStatus;
    pub fn xnMockDepthSetData(
        node: XnNodeHandle,
        frame_id: u32,
        timestamp: u64,
        data_size: u32,
        data: *const XnDepthPixel,
    ) -> XnStatus;

    // User-position capability
    pub fn xnGetSupportedUserPositionsCount(node: XnNodeHandle) -> u32;
    pub fn xnSetUserPosition(
        node: XnNodeHandle,
        index: u32,
        position: *const XnBoundingBox3D,
    ) -> XnStatus;
    pub fn xnGetUserPosition(
        node: XnNodeHandle,
        index: u32,
        position: *mut XnBoundingBox3D,
    ) -> XnStatus;

    // Image
    pub fn xnGetImageMetaData(node: XnNodeHandle, p_meta: *mut XnImageMetaData);
    pub fn xnGetImageMap(node: XnNodeHandle) -> *const u8;
    pub fn xnSetPixelFormat(node: XnNodeHandle, format: XnPixelFormat) -> XnStatus;
    pub fn xnGetPixelFormat(node: XnNodeHandle) -> XnPixelFormat;
    pub fn xnIsPixelFormatSupported(node: XnNodeHandle, format: XnPixelFormat) -> XnBool;
    pub fn xnRegisterToPixelFormatChange(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromPixelFormatChange(node: XnNodeHandle, callback: XnCallbackHandle);
    pub fn xnMockImageSetData(
        node: XnNodeHandle,
        frame_id: u32,
        timestamp: u64,
        data_size: u32,
        data: *const u8,
    ) -> XnStatus;

    // IR
    pub fn xnGetIRMetaData(node: XnNodeHandle, p_meta: *mut XnIRMetaData);
    pub fn xnGetIRMap(node: XnNodeHandle) -> *const XnIRPixel;
    pub fn xnMockIRSetData(
        node: XnNodeHandle,
        frame_id: u32,
        timestamp: u64,
        data_size: u32,
        data: *const XnIRPixel,
    ) -> XnStatus;

    // Audio
    pub fn xnGetAudioMetaData(node: XnNodeHandle, p_meta: *mut XnAudioMetaData);
    pub fn xnGetAudioBuffer(node: XnNodeHandle) -> *const u8;
    pub fn xnGetSupportedWaveOutputModesCount(node: XnNodeHandle) -> u32;
    pub fn xnGetSupportedWaveOutputModes(
        node: XnNodeHandle,
        modes: *mut XnWaveOutputMode,
        p_count: *mut u32,
    ) -> XnStatus;
    pub fn xnSetWaveOutputMode(node: XnNodeHandle, mode: *const XnWaveOutputMode) -> XnStatus;
    pub fn xnGetWaveOutputMode(node: XnNodeHandle, mode: *mut XnWaveOutputMode) -> XnStatus;
    pub fn xnRegisterToWaveOutputModeChanges(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromWaveOutputModeChanges(node: XnNodeHandle, callback: XnCallbackHandle);
    pub fn xnMockAudioSetData(
        node: XnNodeHandle,
        frame_id: u32,
        timestamp: u64,
        data_size: u32,
        data: *const u8,
    ) -> XnStatus;

    // Scene
    pub fn xnGetSceneMetaData(node: XnNodeHandle, p_meta: *mut XnSceneMetaData);
    pub fn xnGetLabelMap(node: XnNodeHandle) -> *const XnLabel;
    pub fn xnGetFloor(node: XnNodeHandle, p_plane: *mut XnPlane3D) -> XnStatus;

    // User generator
    pub fn xnGetNumberOfUsers(node: XnNodeHandle) -> u16;
    pub fn xnGetUsers(node: XnNodeHandle, users: *mut XnUserID, p_count: *mut u16) -> XnStatus;
    pub fn xnGetUserCoM(node: XnNodeHandle, user: XnUserID, p_com: *mut XnPoint3D) -> XnStatus;
    pub fn xnRegisterUserCallbacks(
        node: XnNodeHandle,
        new_user: XnUserHandler,
        lost_user: XnUserHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterUserCallbacks(node: XnNodeHandle, callback: XnCallbackHandle);

    // Skeleton capability
    pub fn xnSetSkeletonProfile(node: XnNodeHandle, profile: u32) -> XnStatus;
    pub fn xnIsSkeletonTracking(node: XnNodeHandle, user: XnUserID) -> XnBool;
    pub fn xnStartSkeletonTracking(node: XnNodeHandle, user: XnUserID) -> XnStatus;
    pub fn xnStopSkeletonTracking(node: XnNodeHandle, user: XnUserID) -> XnStatus;
    pub fn xnGetSkeletonJointPosition(
        node: XnNodeHandle,
        user: XnUserID,
        joint: u32,
        p_position: *mut XnSkeletonJointPosition,
    ) -> XnStatus;

    // Pose-detection capability
    pub fn xnGetNumberOfPoses(node: XnNodeHandle) -> u32;
    pub fn xnGetAllAvailablePoses(
        node: XnNodeHandle,
        poses: *mut *mut c_char,
        name_length: u32,
        p_count: *mut u32,
    ) -> XnStatus;
    pub fn xnStartPoseDetection(
        node: XnNodeHandle,
        pose: *const c_char,
        user: XnUserID,
    ) -> XnStatus;
    pub fn xnStopPoseDetection(node: XnNodeHandle, user: XnUserID) -> XnStatus;
    pub fn xnRegisterToPoseDetected(
        node: XnNodeHandle,
        handler: XnPoseDetectionCallback,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromPoseDetected(node: XnNodeHandle, callback: XnCallbackHandle);

    // Gesture generator
    pub fn xnAddGesture(
        node: XnNodeHandle,
        gesture: *const c_char,
        area: *const XnBoundingBox3D,
    ) -> XnStatus;
    pub fn xnRemoveGesture(node: XnNodeHandle, gesture: *const c_char) -> XnStatus;
    pub fn xnGetNumberOfAvailableGestures(node: XnNodeHandle) -> u16;
    pub fn xnEnumerateAllGestures(
        node: XnNodeHandle,
        gestures: *mut *mut c_char,
        name_length: u32,
        p_count: *mut u16,
    ) -> XnStatus;
    pub fn xnRegisterGestureCallbacks(
        node: XnNodeHandle,
        recognized: XnGestureRecognized,
        progress: XnGestureProgress,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterGestureCallbacks(node: XnNodeHandle, callback: XnCallbackHandle);

    // Hands generator
    pub fn xnStartTracking(node: XnNodeHandle, position: *const XnPoint3D) -> XnStatus;
    pub fn xnStopTracking(node: XnNodeHandle, user: XnUserID) -> XnStatus;
    pub fn xnStopTrackingAll(node: XnNodeHandle) -> XnStatus;
    pub fn xnSetTrackingSmoothing(node: XnNodeHandle, factor: f32) -> XnStatus;
    pub fn xnRegisterHandCallbacks(
        node: XnNodeHandle,
        create: XnHandCreate,
        update: XnHandUpdate,
        destroy: XnHandDestroy,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterHandCallbacks(node: XnNodeHandle, callback: XnCallbackHandle);

    // Device identification capability
    pub fn xnGetDeviceName(node: XnNodeHandle, buffer: *mut c_char, p_size: *mut u32)
        -> XnStatus;
    pub fn xnGetVendorSpecificData(
        node: XnNodeHandle,
        buffer: *mut c_char,
        p_size: *mut u32,
    ) -> XnStatus;
    pub fn xnGetSerialNumber(
        node: XnNodeHandle,
        buffer: *mut c_char,
        p_size: *mut u32,
    ) -> XnStatus;

    // Recorder
    pub fn xnCreateRecorder(
        context: XnContextHandle,
        format: *const c_char,
        ph_recorder: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnSetRecorderDestination(
        node: XnNodeHandle,
        medium: XnRecordMedium,
        destination: *const c_char,
    ) -> XnStatus;
    pub fn xnGetRecorderDestination(
        node: XnNodeHandle,
        p_medium: *mut XnRecordMedium,
        destination: *mut c_char,
        size: u32,
    ) -> XnStatus;
    pub fn xnAddNodeToRecording(
        node: XnNodeHandle,
        added: XnNodeHandle,
        compression: XnCodecID,
    ) -> XnStatus;
    pub fn xnRemoveNodeFromRecording(node: XnNodeHandle, removed: XnNodeHandle) -> XnStatus;
    pub fn xnRecord(node: XnNodeHandle) -> XnStatus;

    // Player
    pub fn xnCreatePlayer(
        context: XnContextHandle,
        format: *const c_char,
        ph_player: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnSetPlayerRepeat(node: XnNodeHandle, repeat: XnBool) -> XnStatus;
    pub fn xnSetPlayerSource(
        node: XnNodeHandle,
        medium: XnRecordMedium,
        source: *const c_char,
    ) -> XnStatus;
    pub fn xnPlayerReadNext(node: XnNodeHandle) -> XnStatus;
    pub fn xnSeekPlayerToFrame(
        node: XnNodeHandle,
        node_name: *const c_char,
        frame_offset: i64,
        origin: u32,
    ) -> XnStatus;
    pub fn xnTellPlayerFrame(
        node: XnNodeHandle,
        node_name: *const c_char,
        p_frame: *mut u32,
    ) -> XnStatus;
    pub fn xnIsPlayerAtEOF(node: XnNodeHandle) -> XnBool;
    pub fn xnRegisterToEndOfFileReached(
        node: XnNodeHandle,
        handler: XnStateChangedHandler,
        cookie: *mut c_void,
        ph_callback: *mut XnCallbackHandle,
    ) -> XnStatus;
    pub fn xnUnregisterFromEndOfFileReached(node: XnNodeHandle, callback: XnCallbackHandle);

    // Codec
    pub fn xnCreateCodec(
        context: XnContextHandle,
        codec_id: XnCodecID,
        init_node: XnNodeHandle,
        ph_codec: *mut XnNodeHandle,
    ) -> XnStatus;
    pub fn xnGetCodecID(node: XnNodeHandle) -> XnCodecID;
    pub fn xnEncodeData(
        node: XnNodeHandle,
        src: *const c_void,
        src_size: u32,
        dst: *mut c_void,
        dst_size: u32,
        p_written: *mut u32,
    ) -> XnStatus;
    pub fn xnDecodeData(
        node: XnNodeHandle,
        src: *const c_void,
        src_size: u32,
        dst: *mut c_void,
        dst_size: u32,
        p_written: *mut u32,
    ) -> XnStatus;
}
