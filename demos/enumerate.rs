//! List the production trees available for each node type.
//!
//! Run with `cargo run --example enumerate`.

use openni::{Context, NodeType};

fn main() {
    env_logger::init();

    let context = match Context::init() {
        Ok(context) => context,
        Err(err) => {
            eprintln!("Failed to initialize context: {}", err);
            std::process::exit(1);
        }
    };

    let types = [
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

    for ty in types {
        print!("{:10}", ty.name());
        match context.enumerate_production_trees(ty, None) {
            Ok(list) => {
                let mut any = false;
                for info in list.iter() {
                    match info.description() {
                        Ok(descr) => {
                            any = true;
                            println!("  {}", descr);
                        }
                        Err(err) => println!("  <bad descriptor: {}>", err),
                    }
                }
                if !any {
                    println!("  <none>");
                }
            }
            Err(err) => println!("  enumeration failed: {}", err),
        }
    }
}
