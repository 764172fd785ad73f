//! Coverage across the remaining node types and capabilities.

use openni::{
    AudioMetaData, CodecId, Context, DepthGenerator, Device, ImageGenerator, ImageMetaData,
    MapOutputMode, MockImageGenerator, NodeType, OpenNiError, PixelFormat, PowerLineFrequency,
    RecordMedium, SceneAnalyzer, SceneMetaData, SkeletonJoint, SkeletonProfile, Status,
    UserGenerator,
};

fn status_of(err: &OpenNiError) -> Option<Status> {
    match err {
        OpenNiError::Status(status) => Some(*status),
        _ => None,
    }
}

#[test]
fn image_generator_round_trips_pixel_formats() {
    let context = Context::init().expect("context init");
    let image = ImageGenerator::create(&context).expect("create image");

    assert_eq!(image.pixel_format().expect("format"), PixelFormat::Rgb24);
    assert!(image
        .is_pixel_format_supported(PixelFormat::Grayscale8)
        .expect("probe"));
    image
        .set_pixel_format(PixelFormat::Grayscale8)
        .expect("set format");
    assert_eq!(
        image.pixel_format().expect("format"),
        PixelFormat::Grayscale8
    );
    assert_eq!(image.bytes_per_pixel().expect("bpp"), 1);

    image.set_pixel_format(PixelFormat::Rgb24).expect("restore");
    image.start_generating().expect("start");
    context.wait_and_update_all().expect("update");

    let mut md = ImageMetaData::new();
    image.metadata(&mut md).expect("fetch");
    assert_eq!(md.pixel_format(), Some(PixelFormat::Rgb24));
    assert_eq!(md.bytes_per_pixel(), Some(3));
    assert_eq!(
        md.data_size(),
        md.x_res() * md.y_res() * 3,
        "data size must match resolution and stride"
    );
    assert!(!md.data_ptr().is_null());
    let first = unsafe { md.rgb24_map().at_unchecked(0, 0) };
    let _ = (first.red, first.green, first.blue);
}

#[test]
fn mock_image_injection_round_trips_bytes() {
    let context = Context::init().expect("context init");
    let mock = MockImageGenerator::create(&context, None).expect("create mock image");
    mock.set_map_output_mode(MapOutputMode {
        x_res: 4,
        y_res: 2,
        fps: 30,
    })
    .expect("set mode");
    mock.start_generating().expect("start");

    let pixels: Vec<u8> = (0..4 * 2 * 3).map(|i| i as u8).collect();
    mock.set_data(5, 999, &pixels).expect("inject");
    mock.wait_and_update_data().expect("latch");

    let mut md = ImageMetaData::new();
    mock.metadata(&mut md).expect("fetch");
    assert_eq!(md.frame_id(), 5);
    assert_eq!(md.timestamp(), 999);
    assert_eq!(md.data_size() as usize, pixels.len());
    let view = md.grayscale8_map();
    // Raw byte order is preserved exactly.
    for i in 0..8 {
        let got = unsafe { view.get_unchecked(i) };
        assert_eq!(got, pixels[i]);
    }
}

#[test]
fn audio_generator_reports_wave_modes() {
    let context = Context::init().expect("context init");
    let audio = openni::AudioGenerator::create(&context).expect("create audio");

    let modes = audio.supported_wave_output_modes().expect("modes");
    assert_eq!(modes.len(), 2);
    audio.set_wave_output_mode(modes[0]).expect("set mode");
    assert_eq!(audio.wave_output_mode().expect("mode"), modes[0]);

    audio.start_generating().expect("start");
    context.wait_and_update_all().expect("update");

    let mut md = AudioMetaData::new();
    audio.metadata(&mut md).expect("fetch");
    let (expected_sample_rate, expected_channels) = (modes[0].sample_rate, modes[0].channels);
    assert_eq!(md.sample_rate(), expected_sample_rate);
    assert_eq!(md.channels(), expected_channels);
    assert!(md.data_size() > 0);
    assert!(!md.data_ptr().is_null());
}

#[test]
fn scene_analyzer_labels_and_floor() {
    let context = Context::init().expect("context init");
    let scene = SceneAnalyzer::create(&context).expect("create scene");
    scene
        .set_map_output_mode(MapOutputMode {
            x_res: 320,
            y_res: 240,
            fps: 30,
        })
        .expect("set mode");
    scene.start_generating().expect("start");
    context.wait_and_update_all().expect("update");

    let mut md = SceneMetaData::new();
    scene.metadata(&mut md).expect("fetch");
    let view = md.label_map();
    let center = unsafe { view.at_unchecked(160, 120) };
    let corner = unsafe { view.at_unchecked(0, 0) };
    assert_ne!(center, corner, "segmentation must separate center from corner");

    let floor = scene.floor().expect("floor");
    assert!(floor.normal.y > 0.9, "floor normal should point up");
}

#[test]
fn skeleton_tracking_follows_the_documented_state_machine() {
    let context = Context::init().expect("context init");
    let user = UserGenerator::create(&context).expect("create user generator");
    user.start_generating().expect("start");

    let skeleton = user.skeleton_capability().expect("skeleton capability");
    skeleton
        .set_profile(SkeletonProfile::All)
        .expect("set profile");

    assert!(!skeleton.is_tracking(1).expect("tracking state"));
    // Joints of an untracked user are refused, not faked.
    let err = skeleton
        .joint_position(1, SkeletonJoint::Head)
        .expect_err("untracked user must not report joints");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_USER_IS_NOT_BEING_TRACKED)
    );

    skeleton.start_tracking(1).expect("start tracking");
    assert!(skeleton.is_tracking(1).expect("tracking state"));
    let head = skeleton
        .joint_position(1, SkeletonJoint::Head)
        .expect("head position");
    assert!(head.confidence > 0.0);

    skeleton.stop_tracking(1).expect("stop tracking");
    assert!(!skeleton.is_tracking(1).expect("tracking state"));

    // Unknown users are a distinct failure.
    let err = skeleton
        .start_tracking(42)
        .expect_err("unknown user must be rejected");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_NO_SUCH_USER)
    );
}

#[test]
fn recorder_records_added_nodes_only_once() {
    let context = Context::init().expect("context init");
    let recorder = openni::Recorder::create(&context).expect("create recorder");
    let depth = DepthGenerator::create(&context).expect("create depth");

    // Recording without a destination is an invalid operation.
    let err = recorder.record().expect_err("no destination set");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_INVALID_OPERATION)
    );

    recorder
        .set_destination(RecordMedium::File, "/tmp/session.oni")
        .expect("set destination");
    assert_eq!(
        recorder.destination().expect("destination"),
        "/tmp/session.oni"
    );
    recorder
        .add_node(&depth, CodecId::UNCOMPRESSED)
        .expect("add node");

    let err = recorder
        .add_node(&depth, CodecId::UNCOMPRESSED)
        .expect_err("double add must fail");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_NODE_ALREADY_RECORDED)
    );

    recorder.record().expect("record one frame");
    recorder.remove_node(&depth).expect("remove node");
    recorder
        .add_node(&depth, CodecId::UNCOMPRESSED)
        .expect("re-add after removal");
}

#[test]
fn codec_round_trips_data() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let codec = openni::Codec::create(&context, CodecId::UNCOMPRESSED, &depth).expect("codec");
    assert_eq!(codec.codec_id().expect("id"), CodecId::UNCOMPRESSED);

    let src: Vec<u8> = (0..64u8).collect();
    let mut encoded = vec![0u8; 128];
    let written = codec.encode(&src, &mut encoded).expect("encode");
    let mut decoded = vec![0u8; 128];
    let restored = codec.decode(&encoded[..written], &mut decoded).expect("decode");
    assert_eq!(&decoded[..restored], &src[..]);

    // An output buffer too small is a hard status, not truncation.
    let mut tiny = [0u8; 8];
    let err = codec.encode(&src, &mut tiny).expect_err("overflow");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_OUTPUT_BUFFER_OVERFLOW)
    );

    let err = openni::Codec::create(&context, CodecId(0xDEAD_BEEF), &depth)
        .expect_err("unknown codec id");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_UNSUPPORTED_CODEC)
    );
}

#[test]
fn node_properties_round_trip_and_miss_cleanly() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");

    depth.set_int_property("FrameDelay", 3).expect("set int");
    assert_eq!(depth.int_property("FrameDelay").expect("get int"), 3);

    depth.set_real_property("Gain", 1.5).expect("set real");
    assert!((depth.real_property("Gain").expect("get real") - 1.5).abs() < f64::EPSILON);

    depth
        .set_string_property("CalibrationFile", "default.cal")
        .expect("set string");
    assert_eq!(
        depth.string_property("CalibrationFile").expect("get string"),
        "default.cal"
    );

    depth
        .set_general_property("Blob", &[1, 2, 3, 4])
        .expect("set general");
    let mut blob = [0u8; 4];
    depth
        .general_property("Blob", &mut blob)
        .expect("get general");
    assert_eq!(blob, [1, 2, 3, 4]);

    let err = depth.int_property("NoSuchProperty").expect_err("missing");
    assert_eq!(
        status_of(&err).map(|s| s.raw()),
        Some(openni::ffi::XN_STATUS_NO_SUCH_PROPERTY)
    );
}

#[test]
fn map_generator_capabilities_configure_the_node() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let image = ImageGenerator::create(&context).expect("create image");

    let mirror = depth.mirror_capability().expect("mirror");
    assert!(!mirror.is_mirrored().expect("initial mirror"));
    mirror.set_mirror(true).expect("set mirror");
    assert!(mirror.is_mirrored().expect("mirrored"));

    let cropping = depth.cropping_capability().expect("cropping");
    let window = openni::Cropping {
        enabled: 1,
        x_offset: 10,
        y_offset: 20,
        x_size: 100,
        y_size: 80,
    };
    cropping.set_cropping(window).expect("set cropping");
    assert_eq!(cropping.cropping().expect("get cropping"), window);

    let viewpoint = depth
        .alternative_viewpoint_capability()
        .expect("alt viewpoint");
    assert!(viewpoint.is_viewpoint_supported(&image).expect("supported"));
    viewpoint.set_viewpoint(&image).expect("set viewpoint");
    assert!(viewpoint.is_viewpoint_as(&image).expect("is viewpoint"));
    viewpoint.reset_viewpoint().expect("reset");
    assert!(!viewpoint.is_viewpoint_as(&image).expect("after reset"));

    let sync = depth.frame_sync_capability().expect("frame sync");
    assert!(sync.can_frame_sync_with(&image).expect("can sync"));
    sync.frame_sync_with(&image).expect("sync");
    assert!(sync.is_frame_synced_with(&image).expect("synced"));
    sync.stop_frame_sync_with(&image).expect("stop sync");
    assert!(!sync.is_frame_synced_with(&image).expect("unsynced"));

    let flicker = image.anti_flicker_capability().expect("anti flicker");
    flicker
        .set_power_line_frequency(PowerLineFrequency::Hz50)
        .expect("set frequency");
    assert_eq!(
        flicker.power_line_frequency().expect("frequency"),
        PowerLineFrequency::Hz50
    );
}

#[test]
fn unsupported_capability_is_refused_at_construction() {
    let context = Context::init().expect("context init");
    let audio = openni::AudioGenerator::create(&context).expect("create audio");
    assert!(
        !audio.is_capability_supported("Mirror").expect("probe"),
        "audio must not claim the mirror capability"
    );
    // Audio is not a map generator, so there is no mirror accessor to
    // misuse; the probe is the contract surface here.
}

#[test]
fn user_position_capability_stores_regions() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let positions = depth.user_position_capability().expect("user position");
    assert!(positions.supported_positions_count().expect("count") > 0);

    let region = openni::BoundingBox3D {
        left_bottom_near: openni::Point3D {
            x: -500.0,
            y: -500.0,
            z: 500.0,
        },
        right_top_far: openni::Point3D {
            x: 500.0,
            y: 500.0,
            z: 3000.0,
        },
    };
    positions.set_position(0, region).expect("set region");
    assert_eq!(positions.position(0).expect("get region"), region);
}

#[test]
fn device_identification_reports_strings() {
    let context = Context::init().expect("context init");
    let device = Device::create(&context).expect("create device");
    let ident = device.identification_capability().expect("identification");
    assert!(!ident.device_name().expect("name").is_empty());
    assert!(!ident.serial_number().expect("serial").is_empty());
}

#[test]
fn find_existing_node_takes_a_new_reference() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let name = depth.name().expect("name");

    let found = context
        .find_existing_node(NodeType::Depth)
        .expect("find existing");
    assert_eq!(found.node_type(), NodeType::Depth);
    assert_eq!(found.as_node().name().expect("found name"), name);

    // A type never created is a miss, not a silent create.
    let err = context
        .find_existing_node(NodeType::Hands)
        .expect_err("no hands node exists");
    assert!(matches!(err, OpenNiError::Status(_)));
}

#[test]
fn node_info_reflects_the_live_node() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let info = depth.info().expect("info");
    assert_eq!(info.instance_name(), depth.name().expect("name"));
    let descr = info.description().expect("description");
    assert_eq!(descr.node_type, NodeType::Depth.tag());
    assert_eq!(descr.vendor, "OpenNI");
}

#[test]
fn global_mirror_propagates_to_map_generators() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let mirror = depth.mirror_capability().expect("mirror");

    assert!(!context.global_mirror().expect("initial global mirror"));
    context.set_global_mirror(true).expect("set global mirror");
    assert!(context.global_mirror().expect("global mirror"));
    assert!(
        mirror.is_mirrored().expect("node mirror"),
        "global mirror must reach every map generator"
    );
}

#[test]
fn needed_node_relation_is_a_lookup_not_a_lifetime() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    let mut image = ImageGenerator::create(&context).expect("create image");

    depth.add_needed_node(&image).expect("declare dependency");
    image.close();
    // Closing the needed node's wrapper must not break the dependent.
    assert!(depth.name().is_ok());
}
