//! Handle lifetime and shared-ownership tests.

use openni::{Context, DepthGenerator, NodeType, OpenNiError, Query};

#[test]
fn context_close_is_idempotent_and_fails_fast_afterwards() {
    let mut context = Context::init().expect("context init");
    context.close();
    context.close();
    assert!(context.is_closed());
    match context.wait_and_update_all() {
        Err(OpenNiError::AlreadyDisposed) => {}
        other => panic!("expected AlreadyDisposed, got {:?}", other),
    }
    match context.global_mirror() {
        Err(OpenNiError::AlreadyDisposed) => {}
        other => panic!("expected AlreadyDisposed, got {:?}", other),
    }
}

#[test]
fn node_operations_fail_fast_after_close() {
    let context = Context::init().expect("context init");
    let mut depth = DepthGenerator::create(&context).expect("create depth");
    assert!(depth.is_generating().is_ok());
    depth.close();
    match depth.is_generating() {
        Err(OpenNiError::AlreadyDisposed) => {}
        other => panic!("expected AlreadyDisposed, got {:?}", other),
    }
    match depth.device_max_depth() {
        Err(OpenNiError::AlreadyDisposed) => {}
        other => panic!("expected AlreadyDisposed, got {:?}", other),
    }
    // Close again: must not double-release the native node.
    depth.close();
}

#[test]
fn shared_references_survive_the_original_wrapper() {
    let context = Context::init().expect("context init");
    let mut depth = DepthGenerator::create(&context).expect("create depth");
    let clone = depth.try_clone().expect("add-ref clone");

    depth.close();
    // The clone holds its own native reference; the node is still alive.
    assert!(
        clone.name().is_ok(),
        "shared wrapper must stay usable after the original closes"
    );
    assert!(clone.try_clone().is_ok());
}

#[test]
fn capability_object_survives_node_close() {
    let context = Context::init().expect("context init");
    let mut depth = DepthGenerator::create(&context).expect("create depth");
    let mirror = depth.mirror_capability().expect("mirror capability");

    depth.close();
    // Refcount-gated: the capability add-ref'd the handle at construction.
    mirror.set_mirror(true).expect("capability after node close");
    assert!(mirror.is_mirrored().expect("read mirror"));
}

#[test]
fn context_close_leaves_child_nodes_usable() {
    let mut context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    context.close();

    // The node holds its own reference; per-node calls keep working,
    // while context-level calls fail fast.
    depth.start_generating().expect("start after context close");
    depth.wait_and_update_data().expect("update after context close");
    assert!(depth.frame_id().expect("frame id") > 0);
    assert!(matches!(
        context.wait_and_update_all(),
        Err(OpenNiError::AlreadyDisposed)
    ));
}

#[test]
fn context_try_clone_counts_references() {
    let mut context = Context::init().expect("context init");
    let mut clone = context.try_clone().expect("context add-ref");
    context.close();
    // The clone still owns a live reference.
    clone
        .wait_none_update_all()
        .expect("cloned context must stay usable");
    clone.close();
}

#[test]
fn enumeration_failure_carries_the_error_list() {
    let context = Context::init().expect("context init");
    let query = Query::new().expect("query");
    query.set_vendor("NoSuchVendor").expect("set vendor");

    match context.create_any_node(NodeType::Depth, Some(&query)) {
        Err(OpenNiError::Enumeration { status, errors }) => {
            assert!(!status.is_ok());
            assert!(
                !errors.is_empty(),
                "enumeration error must carry the per-candidate list"
            );
            for err in &errors {
                assert!(!err.status.is_ok());
                assert!(!err.description.vendor.is_empty());
            }
        }
        Ok(_) => panic!("vendor filter should have rejected every candidate"),
        Err(other) => panic!("expected Enumeration error, got {}", other),
    }
}

#[test]
fn enumeration_success_yields_a_walkable_list() {
    let context = Context::init().expect("context init");
    let list = context
        .enumerate_production_trees(NodeType::Depth, None)
        .expect("enumerate depth");
    let descriptions: Vec<_> = list
        .iter()
        .map(|info| info.description().expect("description"))
        .collect();
    assert!(!descriptions.is_empty());
    for descr in &descriptions {
        assert_eq!(descr.node_type, NodeType::Depth.tag());
        assert!(!descr.vendor.is_empty());
    }
}
