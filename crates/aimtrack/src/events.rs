//! Hub event model.
//!
//! Everything the hub client delivers is funneled into [`HubEvent`] before it
//! reaches the [`Tracker`](crate::Tracker). Events are serde-friendly so that
//! recorded sessions can be replayed.

use std::fmt;
use std::str::FromStr;

use aimtrack_core::HubPose;
use nalgebra::Point2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calibration::ScreenInfo;

/// Errors from parsing a [`DeviceId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdError {
    #[error("device id must be {expected} hex characters, got {got}")]
    Length { expected: usize, got: usize },
    #[error("invalid hex digit in device id {0:?}")]
    InvalidHex(String),
}

/// Hub-assigned 6-byte device identity.
///
/// Formats as 12 lowercase hex characters and serializes the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub [u8; 6]);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 12 {
            return Err(DeviceIdError::Length {
                expected: 12,
                got: s.len(),
            });
        }
        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = s
                .get(2 * i..2 * i + 2)
                .ok_or_else(|| DeviceIdError::InvalidHex(s.to_string()))?;
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| DeviceIdError::InvalidHex(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One tracking update from the hub.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingSample {
    /// Hub timestamp, microseconds. Wraps around.
    pub timestamp: u32,
    pub pose: HubPose,
    /// Normalized aim point in `[0, 1] × [0, 1]`, y down.
    pub aim_point: Point2<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceEventKind {
    Connect,
    Disconnect,
    Tracking(TrackingSample),
    Impact { timestamp: u32 },
    ZeroResult { success: bool },
    ShotDelayChanged { delay_ms: u16 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub device: DeviceId,
    #[serde(flatten)]
    pub kind: DeviceEventKind,
}

impl DeviceEvent {
    pub fn new(device: DeviceId, kind: DeviceEventKind) -> Self {
        Self { device, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubEvent {
    Device(DeviceEvent),
    ScreenCalibration(ScreenInfo),
}

impl From<DeviceEvent> for HubEvent {
    fn from(ev: DeviceEvent) -> Self {
        HubEvent::Device(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_formats_as_lowercase_hex() {
        let id = DeviceId([0x0a, 0xbc, 0x00, 0x12, 0xff, 0x7e]);
        assert_eq!(id.to_string(), "0abc0012ff7e");
        assert_eq!("0ABC0012FF7E".parse::<DeviceId>(), Ok(id));
    }

    #[test]
    fn device_id_rejects_malformed_strings() {
        assert_eq!(
            "abc".parse::<DeviceId>(),
            Err(DeviceIdError::Length {
                expected: 12,
                got: 3
            })
        );
        assert!(matches!(
            "zz0000000000".parse::<DeviceId>(),
            Err(DeviceIdError::InvalidHex(_))
        ));
    }

    #[test]
    fn device_event_json_shape() {
        let ev = HubEvent::Device(DeviceEvent::new(
            DeviceId([1, 2, 3, 4, 5, 6]),
            DeviceEventKind::Impact { timestamp: 42 },
        ));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "device");
        assert_eq!(json["device"], "010203040506");
        assert_eq!(json["kind"], "impact");
        assert_eq!(json["timestamp"], 42);

        let back: HubEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }
}
