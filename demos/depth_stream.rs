//! Stream depth frames and print a one-line summary per frame.
//!
//! Run with `cargo run --example depth_stream`.

use openni::{Context, DepthGenerator, DepthMetaData, MapOutputMode};

fn main() {
    env_logger::init();

    let context = Context::init().expect("failed to initialize context");
    let depth = DepthGenerator::create(&context).expect("failed to create depth generator");

    depth
        .set_map_output_mode(MapOutputMode {
            x_res: 640,
            y_res: 480,
            fps: 30,
        })
        .expect("failed to set output mode");
    depth.start_generating().expect("failed to start generating");

    let max_depth = depth.device_max_depth().expect("failed to read max depth");
    println!("streaming 640x480 depth, max depth {} mm", max_depth);

    let mut md = DepthMetaData::new();
    for _ in 0..30 {
        // Transient wait failures are survivable in a reader loop; anything
        // else in this demo is fatal.
        if let Err(err) = context.wait_and_update_all() {
            log::warn!("wait failed, skipping frame: {}", err);
            continue;
        }
        depth.metadata(&mut md).expect("failed to fetch metadata");

        let center = unsafe { md.depth_map().at_unchecked(md.x_res() / 2, md.y_res() / 2) };
        println!(
            "frame {:4}  t={:10}us  {}x{}  center {} mm",
            md.frame_id(),
            md.timestamp(),
            md.x_res(),
            md.y_res(),
            center
        );
    }
}
