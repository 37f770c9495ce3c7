use std::fs;

use aimtrack::core::{DistanceResponse, DistanceResponseParams};
use aimtrack::{aim_to_pixels, HubEvent, Tracker, TrackerConfig, TrackerUpdate};

#[cfg(feature = "tracing")]
use aimtrack::core::init_tracing;
#[cfg(feature = "tracing")]
use tracing::info;

#[cfg(not(feature = "tracing"))]
use log::info;

const DEFAULT_SESSION: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/session.json");
const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/tracker.json");
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    aimtrack::core::init_from_env()?;

    let mut args = std::env::args().skip(1);
    let session_path = args.next().unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = TrackerConfig::load_json(&config_path)?;
    let events: Vec<HubEvent> = serde_json::from_str(&fs::read_to_string(&session_path)?)?;
    info!("replaying {} events from {session_path}", events.len());

    let rest = config.distance_offset;
    let mut tracker = Tracker::new(config);
    let mut target = DistanceResponse::new(DistanceResponseParams::default());

    for event in events {
        let Some(update) = tracker.handle_event(event) else {
            continue;
        };
        match update {
            TrackerUpdate::HeadMoved { translation, .. } => {
                let z = target.update(translation.z - rest, FRAME_DT);
                info!(
                    "head at z={:.3}, target z={:.3} -> {:.3}",
                    translation.z,
                    target.target(),
                    z
                );
            }
            TrackerUpdate::Shot { slot, aim_point } => {
                let px = aim_to_pixels(aim_point, 1920.0, 1080.0);
                println!("slot {slot} hit at ({:.0}, {:.0}) px", px.x, px.y);
            }
            other => info!("{other:?}"),
        }
    }

    Ok(())
}
