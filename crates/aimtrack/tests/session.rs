use std::path::PathBuf;

use aimtrack::core::{DistanceResponse, DistanceResponseParams};
use aimtrack::{DeviceId, HubEvent, Tracker, TrackerConfig, TrackerUpdate};
use nalgebra::{Point2, Vector3};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn load_session() -> Vec<HubEvent> {
    let raw = std::fs::read_to_string(testdata("session.json")).expect("read session");
    serde_json::from_str(&raw).expect("parse session")
}

// same f64 -> f32 rounding path as the JSON decoder
fn point(x: f64, y: f64) -> Point2<f32> {
    Point2::new(x as f32, y as f32)
}

fn assert_close(a: Vector3<f32>, b: Vector3<f32>, tol: f32) {
    assert!((a - b).norm() < tol, "expected {b:?}, got {a:?}");
}

#[test]
fn recorded_session_replays() {
    let config = TrackerConfig::load_json(testdata("tracker.json")).expect("config");
    let helmet: DeviceId = "a1b2c3d4e5f6".parse().unwrap();
    let gun: DeviceId = "0000000000aa".parse().unwrap();
    assert!(config.is_helmet(&helmet));

    let mut tracker = Tracker::new(config);
    let updates: Vec<TrackerUpdate> = load_session()
        .into_iter()
        .filter_map(|ev| tracker.handle_event(ev))
        .collect();

    assert_eq!(
        updates[0],
        TrackerUpdate::PlayerJoined {
            slot: 0,
            device: helmet
        }
    );
    assert_eq!(updates[1], TrackerUpdate::PlayerJoined { slot: 1, device: gun });
    assert_eq!(updates[2], TrackerUpdate::ScreenCalibrated);

    // shot delay changes produce no update
    match &updates[3] {
        TrackerUpdate::HeadMoved { slot, translation } => {
            assert_eq!(*slot, 0);
            assert_close(*translation, Vector3::new(0.0, -0.1, 1.5), 1e-6);
        }
        other => panic!("expected head movement, got {other:?}"),
    }
    assert_eq!(
        updates[4],
        TrackerUpdate::Aimed {
            slot: 1,
            aim_point: point(0.42, 0.51)
        }
    );

    // impact at 31 ms with a 20 ms delay resolves to the 10 ms sample
    let shot = updates
        .iter()
        .find(|u| matches!(u, TrackerUpdate::Shot { .. }))
        .expect("shot");
    assert_eq!(
        *shot,
        TrackerUpdate::Shot {
            slot: 1,
            aim_point: point(0.42, 0.51)
        }
    );

    assert!(updates.contains(&TrackerUpdate::Zeroed {
        device: gun,
        success: true
    }));
    assert_eq!(
        updates.last(),
        Some(&TrackerUpdate::PlayerLeft {
            slot: 0,
            device: helmet
        })
    );
    assert_eq!(tracker.players().count(), 0);
    assert!(!tracker.is_head_tracking());

    let plane = tracker.screen_plane();
    assert!(plane.is_calibrated());
    assert_close(plane.normal(), Vector3::new(0.0, 0.0, -1.0), 1e-6);
}

#[test]
fn head_depth_drives_distance_response() {
    let config = TrackerConfig::load_json(testdata("tracker.json")).expect("config");
    let rest = config.distance_offset;
    let mut tracker = Tracker::new(config);
    let params = DistanceResponseParams::default();
    let mut response = DistanceResponse::new(params.clone());

    let mut head_z = Vec::new();
    for ev in load_session() {
        if let Some(TrackerUpdate::HeadMoved { translation, .. }) = tracker.handle_event(ev) {
            head_z.push(translation.z);
            for _ in 0..600 {
                response.update(translation.z - rest, 1.0 / 60.0);
            }
            let z = response.position();
            assert!(z >= params.min_z && z <= params.max_z);
        }
    }
    assert_eq!(head_z.len(), 2);

    // leaning toward the screen pushes the target past the baseline
    assert!(head_z[1] < rest);
    assert!(response.target() > params.baseline_z);
    assert!((response.position() - response.target()).abs() < 1e-2);
}
