//! Node factory dispatch tests.
//!
//! These run against the built-in software backend and require no sensor.

use openni::{AnyNode, CapabilitySet, Context, NodeType, OpenNiError};

const ALL_TYPES: [NodeType; 12] = [
    NodeType::Device,
    NodeType::Depth,
    NodeType::Image,
    NodeType::Audio,
    NodeType::Ir,
    NodeType::User,
    NodeType::Recorder,
    NodeType::Player,
    NodeType::Gesture,
    NodeType::Scene,
    NodeType::Hands,
    NodeType::Codec,
];

#[test]
fn every_defined_tag_creates_the_matching_variant() {
    let context = Context::init().expect("context init");
    for ty in ALL_TYPES {
        let node = context
            .create_any_node(ty, None)
            .unwrap_or_else(|e| panic!("creating {} node failed: {}", ty, e));
        assert_eq!(node.node_type(), ty, "factory returned the wrong variant");
        assert!(!node.is_mock(), "{} should not come out as a mock", ty);
    }
}

#[test]
fn variants_expose_exactly_the_documented_capability_set() {
    let context = Context::init().expect("context init");
    for ty in ALL_TYPES {
        let node = context.create_any_node(ty, None).expect("create node");
        assert_eq!(
            node.capabilities(),
            ty.capabilities(),
            "capability set mismatch for {}",
            ty
        );

        // The native capability probe must agree with the documented set.
        let base = node.as_node();
        let probe = |name: &str| base.is_capability_supported(name).expect("probe");
        let caps = node.capabilities();
        assert_eq!(caps.contains(CapabilitySet::MIRROR), probe("Mirror"));
        assert_eq!(caps.contains(CapabilitySet::CROPPING), probe("Cropping"));
        assert_eq!(
            caps.contains(CapabilitySet::ALTERNATIVE_VIEWPOINT),
            probe("AlternativeViewPoint")
        );
        assert_eq!(caps.contains(CapabilitySet::FRAME_SYNC), probe("FrameSync"));
        assert_eq!(
            caps.contains(CapabilitySet::ANTI_FLICKER),
            probe("AntiFlicker")
        );
        assert_eq!(
            caps.contains(CapabilitySet::USER_POSITION),
            probe("UserPosition")
        );
        assert_eq!(
            caps.contains(CapabilitySet::SKELETON),
            probe("User::Skeleton")
        );
        assert_eq!(
            caps.contains(CapabilitySet::POSE_DETECTION),
            probe("User::PoseDetection")
        );
        assert_eq!(
            caps.contains(CapabilitySet::DEVICE_IDENTIFICATION),
            probe("DeviceIdentification")
        );
    }
}

#[test]
fn undefined_tags_are_rejected() {
    for bad in [0, 255, 16, -1, 13] {
        match NodeType::from_tag(bad) {
            Err(OpenNiError::UnsupportedNodeType(tag)) => assert_eq!(tag, bad),
            other => panic!("tag {} must be UnsupportedNodeType, got {:?}", bad, other.err()),
        }
    }
}

#[test]
fn factory_rejects_undefined_tag_for_a_live_handle() {
    let context = Context::init().expect("context init");
    // Create a real node through the raw surface so we can hand the
    // factory a live handle with a bogus tag.
    let mut handle = openni::ffi::XnNodeHandle::invalid();
    let status = unsafe {
        openni::ffi::xnCreateMockNode(
            context.to_native().unwrap(),
            openni::ffi::XN_NODE_TYPE_DEPTH,
            std::ptr::null(),
            &mut handle,
        )
    };
    assert_eq!(status, openni::ffi::XN_STATUS_OK);

    match AnyNode::from_native(handle, Some(255)) {
        Err(OpenNiError::UnsupportedNodeType(255)) => {}
        other => panic!("expected UnsupportedNodeType(255), got {:?}", other.err()),
    }
}

#[test]
fn factory_rejects_the_invalid_handle() {
    match AnyNode::from_native(openni::ffi::XnNodeHandle::invalid(), None) {
        Err(OpenNiError::InvalidHandle) => {}
        other => panic!("expected InvalidHandle, got {:?}", other.err()),
    }
}

#[test]
fn mock_nodes_come_out_as_mock_variants() {
    let context = Context::init().expect("context init");
    let node = context
        .create_mock_node(NodeType::Depth, Some("TestMock"))
        .expect("create mock depth");
    assert!(matches!(node, AnyNode::MockDepth(_)));
    assert!(node.is_mock());
    assert_eq!(node.node_type(), NodeType::Depth);

    let image = context
        .create_mock_node(NodeType::Image, None)
        .expect("create mock image");
    assert!(matches!(image, AnyNode::MockImage(_)));
}
