//! Hub event dispatch and calibrated aim tracking for projector-based
//! shooting-range trainers.
//!
//! The geometry lives in [`aimtrack-core`](aimtrack_core), re-exported here as
//! [`core`]. This crate adds the event layer on top of it: a serde-friendly
//! [`HubEvent`] model and a [`Tracker`] that keeps per-device state, applies
//! screen calibration and resolves shots against tracking history.
//!
//! ## Quickstart
//!
//! ```
//! use aimtrack::{DeviceEvent, DeviceEventKind, DeviceId, Tracker, TrackerConfig, TrackerUpdate};
//!
//! let mut tracker = Tracker::new(TrackerConfig::default());
//! let gun = DeviceId([0, 1, 2, 3, 4, 5]);
//!
//! let update = tracker.handle_event(DeviceEvent::new(gun, DeviceEventKind::Connect).into());
//! assert_eq!(update, Some(TrackerUpdate::PlayerJoined { slot: 0, device: gun }));
//! ```
//!
//! ## API map
//! - `aimtrack::core`: slot registry, homography, pose conversion, screen
//!   plane, distance response and logging setup.
//! - [`events`]: device identities and hub events.
//! - [`calibration`]: screen corners in hub coordinates.
//! - [`config`]: JSON tracker configuration.
//! - [`tracker`]: event dispatch.

pub use aimtrack_core as core;

pub mod calibration;
pub mod config;
pub mod events;
pub mod history;
pub mod tracker;

pub use calibration::{aim_to_pixels, CalibrationError, ScreenInfo};
pub use config::{ConfigError, TrackerConfig};
pub use events::{DeviceEvent, DeviceEventKind, DeviceId, DeviceIdError, HubEvent, TrackingSample};
pub use history::{TrackingHistory, DEFAULT_HISTORY_CAPACITY};
pub use tracker::{Player, Tracker, TrackerUpdate};
