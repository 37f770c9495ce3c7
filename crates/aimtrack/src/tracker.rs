//! Hub event dispatch.
//!
//! [`Tracker`] owns the live device registry and the calibrated screen plane
//! and turns each [`HubEvent`] into at most one [`TrackerUpdate`] for the host
//! application to act on.

use std::collections::HashMap;

use aimtrack_core::{convert_hub_pose, ScreenCorners, ScreenPlane, SlotRegistry};
use log::{debug, info, warn};
use nalgebra::{Isometry3, Point2, Vector3};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::calibration::ScreenInfo;
use crate::config::TrackerConfig;
use crate::events::{DeviceEvent, DeviceEventKind, DeviceId, HubEvent, TrackingSample};
use crate::history::TrackingHistory;

/// Per-device state held in a registry slot.
#[derive(Clone, Debug)]
pub struct Player {
    pub device: DeviceId,
    pub shot_delay_ms: u16,
    /// `(-1, -1)` until the device reports tracking.
    pub aim_point: Point2<f32>,
    pub history: TrackingHistory,
}

impl Player {
    fn new(device: DeviceId, history_capacity: usize) -> Self {
        Self {
            device,
            shot_delay_ms: 0,
            aim_point: Point2::new(-1.0, -1.0),
            history: TrackingHistory::new(history_capacity),
        }
    }

    /// Timestamp the shot was actually fired at, given the reported impact time.
    fn shot_time(&self, impact: u32) -> u32 {
        impact.wrapping_sub(u32::from(self.shot_delay_ms) * 1000)
    }
}

/// What changed after handling one event.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerUpdate {
    PlayerJoined { slot: usize, device: DeviceId },
    PlayerLeft { slot: usize, device: DeviceId },
    Aimed { slot: usize, aim_point: Point2<f32> },
    HeadMoved { slot: usize, translation: Vector3<f32> },
    Shot { slot: usize, aim_point: Point2<f32> },
    Zeroed { device: DeviceId, success: bool },
    ScreenCalibrated,
}

#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,
    players: SlotRegistry<Player>,
    by_device: HashMap<DeviceId, usize>,
    anchor: Isometry3<f32>,
    screen: ScreenPlane,
    screen_local: Option<ScreenCorners>,
    zero_translation: Vector3<f32>,
    head_translation: Option<Vector3<f32>>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    /// A tracker with an identity anchor and an uncalibrated screen.
    pub fn new(config: TrackerConfig) -> Self {
        let anchor = Isometry3::identity();
        Self {
            config,
            players: SlotRegistry::new(),
            by_device: HashMap::new(),
            screen: ScreenPlane::uncalibrated(&anchor),
            anchor,
            screen_local: None,
            zero_translation: Vector3::zeros(),
            head_translation: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
    pub fn handle_event(&mut self, event: HubEvent) -> Option<TrackerUpdate> {
        match event {
            HubEvent::Device(ev) => self.handle_device_event(ev),
            HubEvent::ScreenCalibration(info) => Some(self.apply_screen_info(&info)),
        }
    }

    fn handle_device_event(&mut self, ev: DeviceEvent) -> Option<TrackerUpdate> {
        let device = ev.device;
        match ev.kind {
            DeviceEventKind::Connect => Some(self.connect(device)),
            DeviceEventKind::Disconnect => self.disconnect(device),
            DeviceEventKind::Tracking(sample) => self.track(device, sample),
            DeviceEventKind::Impact { timestamp } => self.impact(device, timestamp),
            DeviceEventKind::ZeroResult { success } => {
                if success {
                    info!("zeroing succeeded for {device}");
                } else {
                    warn!("zeroing failed for {device}");
                }
                Some(TrackerUpdate::Zeroed { device, success })
            }
            DeviceEventKind::ShotDelayChanged { delay_ms } => {
                match self.player_mut(&device) {
                    Some(player) => {
                        debug!("shot delay for {device} set to {delay_ms} ms");
                        player.shot_delay_ms = delay_ms;
                    }
                    None => debug!("shot delay for unknown device {device} ignored"),
                }
                None
            }
        }
    }

    fn connect(&mut self, device: DeviceId) -> TrackerUpdate {
        if let Some(&slot) = self.by_device.get(&device) {
            debug!("{device} already connected in slot {slot}");
            return TrackerUpdate::PlayerJoined { slot, device };
        }
        let slot = self
            .players
            .allocate(Player::new(device, self.config.history_capacity));
        self.by_device.insert(device, slot);
        info!("device {device} connected in slot {slot}");
        TrackerUpdate::PlayerJoined { slot, device }
    }

    fn disconnect(&mut self, device: DeviceId) -> Option<TrackerUpdate> {
        let Some(slot) = self.by_device.remove(&device) else {
            debug!("disconnect from unknown device {device} ignored");
            return None;
        };
        if let Err(err) = self.players.free(slot) {
            warn!("freeing slot for {device}: {err}");
        }
        if self.config.is_helmet(&device) {
            self.head_translation = None;
        }
        info!("device {device} left slot {slot}");
        Some(TrackerUpdate::PlayerLeft { slot, device })
    }

    fn track(&mut self, device: DeviceId, sample: TrackingSample) -> Option<TrackerUpdate> {
        let Some(&slot) = self.by_device.get(&device) else {
            debug!("tracking from unknown device {device} ignored");
            return None;
        };
        let player = self.players.get_mut(slot).ok().flatten()?;
        player.aim_point = sample.aim_point;
        player.history.push(sample);

        if self.config.is_helmet(&device) {
            let pose = convert_hub_pose(&sample.pose);
            let translation = self.zero_translation + pose.position;
            self.head_translation = Some(translation);
            Some(TrackerUpdate::HeadMoved { slot, translation })
        } else {
            Some(TrackerUpdate::Aimed {
                slot,
                aim_point: sample.aim_point,
            })
        }
    }

    fn impact(&self, device: DeviceId, timestamp: u32) -> Option<TrackerUpdate> {
        let Some(&slot) = self.by_device.get(&device) else {
            debug!("impact from unknown device {device} ignored");
            return None;
        };
        let player = self.players.get(slot).ok().flatten()?;
        let fired_at = player.shot_time(timestamp);
        match player.history.closest(fired_at) {
            Some(sample) => Some(TrackerUpdate::Shot {
                slot,
                aim_point: sample.aim_point,
            }),
            None => {
                debug!("impact from {device} before any tracking");
                None
            }
        }
    }

    fn apply_screen_info(&mut self, info: &ScreenInfo) -> TrackerUpdate {
        let local = info.local_corners();
        self.screen.set_local_bounds(&self.anchor, local);
        self.screen_local = Some(local);
        self.zero_translation = info.origin_offset(self.config.distance_offset);
        info!(
            "screen calibrated; hub origin at {:?}",
            self.zero_translation.as_slice()
        );
        TrackerUpdate::ScreenCalibrated
    }

    fn player_mut(&mut self, device: &DeviceId) -> Option<&mut Player> {
        let slot = *self.by_device.get(device)?;
        self.players.get_mut(slot).ok().flatten()
    }

    /// Move the anchor the screen plane hangs off, re-deriving world corners.
    pub fn set_anchor(&mut self, anchor: Isometry3<f32>) {
        self.anchor = anchor;
        match self.screen_local {
            Some(local) => self.screen.set_local_bounds(&self.anchor, local),
            None => self.screen = ScreenPlane::uncalibrated(&self.anchor),
        }
    }

    pub fn anchor(&self) -> &Isometry3<f32> {
        &self.anchor
    }

    pub fn players(&self) -> impl Iterator<Item = (usize, &Player)> + '_ {
        self.players.iter()
    }

    pub fn player(&self, slot: usize) -> Option<&Player> {
        self.players.get(slot).ok().flatten()
    }

    pub fn slot_of(&self, device: &DeviceId) -> Option<usize> {
        self.by_device.get(device).copied()
    }

    pub fn screen_plane(&self) -> &ScreenPlane {
        &self.screen
    }

    /// Hub origin in screen-local space, set by the last screen calibration.
    pub fn zero_translation(&self) -> Vector3<f32> {
        self.zero_translation
    }

    /// Latest helmet translation; `None` until a helmet reports tracking.
    pub fn head_translation(&self) -> Option<Vector3<f32>> {
        self.head_translation
    }

    pub fn is_head_tracking(&self) -> bool {
        self.head_translation.is_some()
    }
}
