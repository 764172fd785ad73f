//! End-to-end depth streaming against the software backend.

use openni::{
    Context, DepthGenerator, DepthMetaData, MapOutputMode, MockDepthGenerator, PixelFormat,
};

const VGA: MapOutputMode = MapOutputMode {
    x_res: 640,
    y_res: 480,
    fps: 30,
};

#[test]
fn stream_three_frames_and_read_the_center_pixel() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    depth.set_map_output_mode(VGA).expect("set VGA mode");
    depth.start_generating().expect("start generating");

    let max_depth = depth.device_max_depth().expect("device max depth");
    assert!(max_depth > 0);

    let mut md = DepthMetaData::new();
    let mut last_frame_id = 0;
    for _ in 0..3 {
        context.wait_and_update_all().expect("wait and update");
        depth.metadata(&mut md).expect("fetch metadata");

        assert_eq!(md.x_res(), 640);
        assert_eq!(md.y_res(), 480);
        assert!(
            md.frame_id() > last_frame_id,
            "frame id must increase monotonically: {} -> {}",
            last_frame_id,
            md.frame_id()
        );
        last_frame_id = md.frame_id();

        assert!(!md.data_ptr().is_null(), "depth map pointer must be set");
        assert!(md.is_new());
        assert_eq!(md.data_size(), 640 * 480 * 2);
        assert_eq!(md.pixel_format(), Some(PixelFormat::Grayscale16));

        let center = unsafe { md.depth_map().at_unchecked(320, 240) };
        assert!(
            center > 0 && center < max_depth,
            "center depth {} out of range 0..{}",
            center,
            max_depth
        );
    }
}

#[test]
fn linear_and_xy_indexing_agree_on_a_real_frame() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    depth.set_map_output_mode(VGA).expect("set VGA mode");
    depth.start_generating().expect("start generating");
    context.wait_and_update_all().expect("wait and update");

    let mut md = DepthMetaData::new();
    depth.metadata(&mut md).expect("fetch metadata");
    let view = md.depth_map();
    for (x, y) in [(0, 0), (320, 240), (639, 479), (17, 211)] {
        let by_xy = unsafe { view.at_unchecked(x, y) };
        let by_index = unsafe { view.get_unchecked((y * 640 + x) as usize) };
        assert_eq!(by_xy, by_index, "mismatch at ({}, {})", x, y);
    }
}

#[test]
fn timestamps_advance_with_the_configured_rate() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    depth.set_map_output_mode(VGA).expect("set VGA mode");
    depth.start_generating().expect("start generating");

    context.wait_and_update_all().expect("first update");
    let first = depth.timestamp().expect("timestamp");
    context.wait_and_update_all().expect("second update");
    let second = depth.timestamp().expect("timestamp");
    assert!(second > first, "timestamps must advance: {} -> {}", first, second);
}

#[test]
fn projective_real_world_conversion_round_trips() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    depth.set_map_output_mode(VGA).expect("set VGA mode");

    let fov = depth.field_of_view().expect("field of view");
    assert!(fov.h_fov > 0.0 && fov.v_fov > 0.0);

    let projective = [
        openni::Point3D {
            x: 320.0,
            y: 240.0,
            z: 2000.0,
        },
        openni::Point3D {
            x: 100.0,
            y: 400.0,
            z: 800.0,
        },
    ];
    let real = depth
        .convert_projective_to_real_world(&projective)
        .expect("to real world");
    // The center pixel maps onto the optical axis.
    assert!(real[0].x.abs() < 1.0 && real[0].y.abs() < 1.0);

    let back = depth
        .convert_real_world_to_projective(&real)
        .expect("back to projective");
    for (orig, round) in projective.iter().zip(back.iter()) {
        let (ox, oy, oz) = (orig.x, orig.y, orig.z);
        let (rx, ry, rz) = (round.x, round.y, round.z);
        assert!((ox - rx).abs() < 0.5, "{} vs {}", ox, rx);
        assert!((oy - ry).abs() < 0.5, "{} vs {}", oy, ry);
        assert!((oz - rz).abs() < f32::EPSILON);
    }
}

#[test]
fn injected_mock_frames_come_back_bit_exact() {
    let context = Context::init().expect("context init");
    let mock = MockDepthGenerator::create(&context, Some("InjectedDepth")).expect("create mock");
    mock.set_map_output_mode(MapOutputMode {
        x_res: 320,
        y_res: 240,
        fps: 30,
    })
    .expect("set mode");
    mock.start_generating().expect("start");

    let frame: Vec<u16> = (0..320u32 * 240)
        .map(|i| (i % 5000) as u16)
        .collect();
    mock.set_data(77, 1_234_567, &frame).expect("inject frame");
    mock.wait_and_update_data().expect("latch injected frame");

    let mut md = DepthMetaData::new();
    mock.metadata(&mut md).expect("fetch metadata");
    assert_eq!(md.frame_id(), 77);
    assert_eq!(md.timestamp(), 1_234_567);
    assert_eq!(md.data_size(), 320 * 240 * 2);
    assert!(md.is_new());

    let view = md.depth_map();
    for (x, y) in [(0, 0), (11, 7), (319, 239)] {
        let expected = ((y * 320 + x) % 5000) as u16;
        let got = unsafe { view.at_unchecked(x as u32, y as u32) };
        assert_eq!(got, expected, "sample mismatch at ({}, {})", x, y);
    }

    // No second injection: the next update latches nothing new.
    mock.wait_and_update_data().expect("update with no pending frame");
    mock.metadata(&mut md).expect("fetch again");
    assert!(!md.is_new(), "stale frame must not read as new");
    assert_eq!(md.frame_id(), 77);
}

#[test]
fn mock_based_on_inherits_configuration_and_accepts_records() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    depth.set_map_output_mode(VGA).expect("set VGA mode");
    depth.start_generating().expect("start");
    context.wait_and_update_all().expect("produce a frame");

    let mock =
        MockDepthGenerator::create_based_on(&context, &depth, Some("Replay")).expect("based on");
    let mock_x_res = mock.map_output_mode().expect("mode").x_res;
    assert_eq!(mock_x_res, 640);

    // Re-inject the real generator's current frame through its record.
    let mut md = DepthMetaData::new();
    depth.metadata(&mut md).expect("fetch source frame");
    mock.set_data_from(&md).expect("inject via record");
    mock.start_generating().expect("start mock");
    mock.wait_and_update_data().expect("latch");

    let mut replayed = DepthMetaData::new();
    mock.metadata(&mut replayed).expect("fetch replayed");
    assert_eq!(replayed.frame_id(), md.frame_id());
    assert_eq!(replayed.timestamp(), md.timestamp());
    assert_eq!(replayed.data_size(), md.data_size());
}
