//! Event bridging against the software backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use openni::{Context, DepthGenerator, GestureGenerator, HandsGenerator, Point3D, UserGenerator};

#[test]
fn generation_running_fans_out_to_all_subscribers_once() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");

    let order = Arc::new(Mutex::new(Vec::new()));
    let first = Arc::clone(&order);
    let second = Arc::clone(&order);

    let event = depth.generation_running_changed();
    event
        .subscribe(move |_| first.lock().unwrap().push("first"))
        .expect("subscribe first");
    event
        .subscribe(move |_| second.lock().unwrap().push("second"))
        .expect("subscribe second");

    depth.start_generating().expect("start generating");

    let calls = order.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec!["first", "second"],
        "both subscribers exactly once, in subscription order"
    );
}

#[test]
fn unsubscribed_callbacks_stop_firing() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let event = depth.generation_running_changed();
    let id = event
        .subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("subscribe");

    depth.start_generating().expect("start");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    event.unsubscribe(id);
    depth.stop_generating().expect("stop");
    assert_eq!(
        hits.load(Ordering::SeqCst),
        1,
        "unsubscribed callback must not fire again"
    );
}

#[test]
fn new_data_event_fires_on_update() {
    let context = Context::init().expect("context init");
    let depth = DepthGenerator::create(&context).expect("create depth");
    depth.start_generating().expect("start");

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    depth
        .new_data_available()
        .subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("subscribe");

    context.wait_and_update_all().expect("update 1");
    context.wait_and_update_all().expect("update 2");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn user_callbacks_report_canned_users_on_start() {
    let context = Context::init().expect("context init");
    let user = UserGenerator::create(&context).expect("create user generator");

    let seen_a = Arc::new(Mutex::new(Vec::new()));
    let seen_b = Arc::new(Mutex::new(Vec::new()));
    let sink_a = Arc::clone(&seen_a);
    let sink_b = Arc::clone(&seen_b);
    user.subscribe_new_user(move |id| sink_a.lock().unwrap().push(id))
        .expect("subscribe a");
    user.subscribe_new_user(move |id| sink_b.lock().unwrap().push(id))
        .expect("subscribe b");

    user.start_generating().expect("start");

    assert_eq!(*seen_a.lock().unwrap(), vec![1, 2]);
    assert_eq!(*seen_b.lock().unwrap(), vec![1, 2]);
    assert_eq!(user.user_count().expect("count"), 2);
    assert_eq!(user.users().expect("users"), vec![1, 2]);

    let com = user.center_of_mass(1).expect("center of mass");
    assert!(com.z > 0.0);
}

#[test]
fn gesture_recognized_fires_for_active_gestures() {
    let context = Context::init().expect("context init");
    let gesture = GestureGenerator::create(&context).expect("create gesture generator");

    let available = gesture.available_gestures().expect("available gestures");
    assert!(available.contains(&"Wave".to_string()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    gesture
        .subscribe_gesture_recognized(move |name, _id_pos, end_pos| {
            sink.lock().unwrap().push((name.to_string(), end_pos.z));
        })
        .expect("subscribe");

    gesture.add_gesture("Wave", None).expect("add gesture");
    gesture.start_generating().expect("start");
    gesture.wait_and_update_data().expect("update");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "one recognition per added gesture");
    assert_eq!(seen[0].0, "Wave");
    assert!(seen[0].1 > 0.0);
}

#[test]
fn hand_tracking_emits_create_update_destroy() {
    let context = Context::init().expect("context init");
    let hands = HandsGenerator::create(&context).expect("create hands generator");
    hands.start_generating().expect("start");

    let created = Arc::new(Mutex::new(Vec::new()));
    let updated = Arc::new(AtomicUsize::new(0));
    let destroyed = Arc::new(Mutex::new(Vec::new()));

    let created_sink = Arc::clone(&created);
    hands
        .subscribe_hand_create(move |hand, pos, _time| {
            created_sink.lock().unwrap().push((hand, pos.z));
        })
        .expect("subscribe create");
    let updated_sink = Arc::clone(&updated);
    hands
        .subscribe_hand_update(move |_, _, _| {
            updated_sink.fetch_add(1, Ordering::SeqCst);
        })
        .expect("subscribe update");
    let destroyed_sink = Arc::clone(&destroyed);
    hands
        .subscribe_hand_destroy(move |hand, _time| {
            destroyed_sink.lock().unwrap().push(hand);
        })
        .expect("subscribe destroy");

    let start = Point3D {
        x: 0.0,
        y: 100.0,
        z: 900.0,
    };
    hands.start_tracking(start).expect("start tracking");
    assert_eq!(created.lock().unwrap().len(), 1);
    let hand = created.lock().unwrap()[0].0;

    hands.wait_and_update_data().expect("update");
    assert!(updated.load(Ordering::SeqCst) >= 1);

    hands.stop_tracking(hand).expect("stop tracking");
    assert_eq!(*destroyed.lock().unwrap(), vec![hand]);
}

#[test]
fn pose_detection_reports_the_requested_pose() {
    let context = Context::init().expect("context init");
    let user = UserGenerator::create(&context).expect("create user generator");
    user.start_generating().expect("start");

    let pose_cap = user.pose_detection_capability().expect("pose capability");
    let poses = pose_cap.available_poses().expect("available poses");
    assert!(poses.contains(&"Psi".to_string()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    pose_cap
        .subscribe_pose_detected(move |pose, user_id| {
            sink.lock().unwrap().push((pose.to_string(), user_id));
        })
        .expect("subscribe");

    pose_cap.start_detection("Psi", 1).expect("start detection");
    user.wait_and_update_data().expect("update");

    assert_eq!(*seen.lock().unwrap(), vec![("Psi".to_string(), 1)]);
}

#[test]
fn player_reports_end_of_file_once() {
    let context = Context::init().expect("context init");
    let player = context
        .open_file_recording("session.oni")
        .expect("open recording");

    let eof_hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&eof_hits);
    player
        .eof_reached()
        .subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("subscribe eof");

    let mut frames = 0;
    let err = loop {
        match player.read_next() {
            Ok(()) => frames += 1,
            Err(err) => break err,
        }
        assert!(frames < 10_000, "player never reached end of file");
    };
    assert!(frames > 0);
    assert!(err.to_string().contains("native call failed"));
    assert!(player.is_at_eof().expect("eof state"));
    assert_eq!(eof_hits.load(Ordering::SeqCst), 1);

    // Seeking back rewinds the end-of-file condition.
    player
        .seek_to_frame("", 0, openni::SeekOrigin::Set)
        .expect("seek");
    assert!(!player.is_at_eof().expect("eof state after seek"));
    player.read_next().expect("read after rewind");
}
