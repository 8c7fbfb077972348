//! End-to-end runs of the splash pipeline with scripted input.

use std::fs;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use gripe_frame::{Digit, Finger, Frame, Hand, Side, SpatialTransform, Vector3, PLACEHOLDER_GRIPE};
use leap_splash::config::{SinkKind, SourceKind, SplashConfig};
use leap_splash::publisher::{pool_path, MemoryPublisher};
use leap_splash::source::{ScriptEnd, ScriptedFrameSource};
use leap_splash::{run, Splash};

const FORWARD: Vector3 = Vector3::new(0.0, 0.0, -1.0);
const DOWN:    Vector3 = Vector3::new(0.0, -1.0, 0.0);

fn splash() -> Splash {
    Splash::new(SpatialTransform::identity(), "leap-reader-test", "leap", Duration::from_millis(1))
}

fn fist(side: Side, x: f64) -> Hand {
    Hand {
        side,
        confidence:    0.8,
        palm_position: Vector3::new(x, 200.0, 0.0),
        direction:     FORWARD,
        palm_normal:   DOWN,
        fingers: Digit::ALL
            .iter()
            .map(|&digit| Finger {
                digit,
                tip_position: Vector3::new(x, 170.0, -30.0),
                direction:    DOWN,
                extended:     false,
            })
            .collect(),
    }
}

#[test]
fn messages_arrive_in_frame_order() {
    let publisher = MemoryPublisher::new();
    let frames: Vec<_> = (0..200).map(|t| Frame::new(t * 10, vec![fist(Side::Right, 0.0)])).collect();

    let report = splash()
        .run(ScriptedFrameSource::new(frames), publisher.clone(), &AtomicBool::new(true))
        .unwrap();

    let times = publisher.times();
    assert_eq!(times, (0..200).map(|t| t * 10).collect::<Vec<_>>());
    assert_eq!(report.publish.published, 200);
    assert_eq!(report.publish.failed, 0);
}

#[test]
fn hand_slots_follow_what_was_seen() {
    let publisher = MemoryPublisher::new();
    let frames = vec![
        Frame::empty(1),
        Frame::new(2, vec![fist(Side::Left, -50.0)]),
        Frame::new(3, vec![fist(Side::Left, -50.0), fist(Side::Right, 50.0)]),
        Frame::new(4, vec![fist(Side::Right, 1.0), fist(Side::Left, 2.0), fist(Side::Right, 3.0)]),
    ];

    splash()
        .run(ScriptedFrameSource::new(frames), publisher.clone(), &AtomicBool::new(true))
        .unwrap();

    let deposited = publisher.deposited();
    let sides: Vec<_> = deposited
        .iter()
        .map(|(_, m)| [m.hands()[0].side, m.hands()[1].side])
        .collect();
    assert_eq!(
        sides,
        [
            [Side::Right, Side::Left],
            [Side::Left, Side::Right],
            [Side::Left, Side::Right],
            [Side::Right, Side::Left],
        ]
    );

    let empty = &deposited[0].1;
    assert!(empty.hands().iter().all(|h| h.gripe == PLACEHOLDER_GRIPE));

    let single = &deposited[1].1;
    assert_eq!(single.hands()[0].gripe, "xxxx>:vx");
    assert!(single.hands()[1].is_placeholder());

    let crowded = &deposited[3].1;
    assert_eq!(crowded.hands()[0].loc.x, 1.0);
    assert_eq!(crowded.hands()[1].loc.x, 2.0);
}

#[test]
fn queued_frames_survive_a_disconnect() {
    let publisher = MemoryPublisher::new();
    let source = ScriptedFrameSource::new((0..50).map(Frame::empty).collect())
        .ending(ScriptEnd::Disconnected);

    let report = splash().run(source, publisher.clone(), &AtomicBool::new(true)).unwrap();

    assert!(report.disconnected);
    assert_eq!(publisher.len(), 50);
}

#[test]
fn failed_deposits_are_skipped_not_retried() {
    let publisher = MemoryPublisher::failing_at([3, 7]);
    let frames = (0..10).map(Frame::empty).collect();

    let report = splash()
        .run(ScriptedFrameSource::new(frames), publisher.clone(), &AtomicBool::new(true))
        .unwrap();

    assert_eq!(publisher.times(), [0, 1, 2, 4, 5, 6, 8, 9]);
    assert_eq!(report.publish.failed, 2);
}

#[test]
fn messages_carry_origin_and_tag() {
    let publisher = MemoryPublisher::new();
    splash()
        .run(ScriptedFrameSource::new(vec![Frame::empty(42)]), publisher.clone(), &AtomicBool::new(true))
        .unwrap();

    let (pool, message) = &publisher.deposited()[0];
    assert_eq!(pool, "leap");
    assert_eq!(message.tags(), ["gripeframe"]);
    assert_eq!(message.payload().origins.name, "leap-reader-test");
    assert_eq!(message.payload().origins.clock, 42);
}

#[test]
fn replay_to_pool_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();

    let calibration = dir.path().join("leap.toml");
    fs::write(
        &calibration,
        "[leap]\ncent = [0.0, 0.0, 1000.0]\nnorm = [0.0, 1.0, 0.0]\nover = [1.0, 0.0, 0.0]\n",
    )
    .unwrap();

    let recording = dir.path().join("hands.jsonl");
    let lines: Vec<String> = (0..5)
        .map(|t| serde_json::to_string(&Frame::new(t, vec![fist(Side::Right, 0.0)])).unwrap())
        .collect();
    fs::write(&recording, lines.join("\n")).unwrap();

    let pools = dir.path().join("pools");
    let cfg = SplashConfig {
        pool:        "hands".to_string(),
        pool_dir:    pools.clone(),
        sink:        SinkKind::PoolFile,
        period:      Duration::from_millis(1),
        calibration: Some(calibration),
        screen:      dir.path().join("missing-screen.toml"),
        source:      SourceKind::Replay(recording),
        ..SplashConfig::default()
    };

    let report = run(&cfg, &AtomicBool::new(true)).unwrap();
    assert_eq!(report.publish.published, 5);

    let text = fs::read_to_string(pool_path(&pools, "hands")).unwrap();
    let published: Vec<serde_json::Value> =
        text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(published.len(), 5);
    assert_eq!(published[4]["payload"]["time"], 4);
    assert_eq!(published[0]["payload"]["origins"]["name"], "leap-reader-v0.7.9");
    // calibrated origin shifts every location by +1000 on Z
    assert_eq!(published[0]["payload"]["hands"][0]["loc"][2], 1000.0);
}
