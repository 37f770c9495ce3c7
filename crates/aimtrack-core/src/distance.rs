//! Asymptotic depth response.
//!
//! Maps a signed tracked depth `d` (positive = shooter moved away from the
//! screen) to a target Z for an on-screen element. The offset from the
//! baseline follows `1 - exp(-a·k·|d| / range)`, capped below 1, so the
//! target approaches but never reaches the bound on either side. The visible
//! position then chases the target with critically damped smoothing.

use log::debug;
use serde::{Deserialize, Serialize};

/// Lower limit applied by [`DistanceResponse::set_scaling_ratio`].
pub const MIN_SCALING_RATIO: f32 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceResponseParams {
    /// Z at zero tracked depth.
    pub baseline_z: f32,
    /// Closest allowed Z (toward the viewer).
    pub min_z: f32,
    /// Farthest allowed Z.
    pub max_z: f32,
    /// Tracked-depth to Z scaling `k`.
    pub scaling_ratio: f32,
    /// How quickly the curve saturates (`a`).
    pub approach_speed: f32,
    /// Smoothing time constant, seconds.
    pub smoothing_time: f32,
    /// Cap on the normalized response; keeps a margin from the bounds.
    pub max_normalized: f32,
    /// When set, the toward-viewer range stops `margin` short of the camera
    /// depth passed to [`DistanceResponse::set_camera_z`].
    #[serde(default)]
    pub camera_margin: Option<f32>,
}

impl Default for DistanceResponseParams {
    fn default() -> Self {
        Self {
            baseline_z: 7.0,
            min_z: 1.0,
            max_z: 10.0,
            scaling_ratio: 1.0,
            approach_speed: 2.0,
            smoothing_time: 0.5,
            max_normalized: 0.95,
            camera_margin: None,
        }
    }
}

impl DistanceResponseParams {
    /// Room between the baseline and `min_z`.
    pub fn toward_range(&self) -> f32 {
        (self.baseline_z - self.min_z).max(0.0)
    }

    /// Room between the baseline and `max_z`.
    pub fn away_range(&self) -> f32 {
        (self.max_z - self.baseline_z).max(0.0)
    }

    /// Offset from the baseline for tracked depth `d`.
    ///
    /// Zero at `d = 0`, negative (toward the viewer) for `d > 0`, positive for
    /// `d < 0`, and strictly inside the corresponding range.
    pub fn response_offset(&self, d: f32) -> f32 {
        self.offset_with_lower(d, self.min_z)
    }

    /// Baseline plus offset, clamped to `[min_z, max_z]`.
    pub fn target_z(&self, d: f32) -> f32 {
        self.clamp_z(self.baseline_z + self.response_offset(d))
    }

    fn offset_with_lower(&self, d: f32, lower: f32) -> f32 {
        let toward = (self.baseline_z - lower).max(0.0);
        let away = self.away_range();
        let range = if d >= 0.0 { toward } else { away };

        let normalized = if range > 0.0 {
            let k = self.scaling_ratio.abs();
            let x = self.approach_speed * k * d.abs() / range;
            (1.0 - (-x).exp()).min(self.max_normalized)
        } else {
            0.0
        };

        if d >= 0.0 {
            -toward * normalized
        } else {
            away * normalized
        }
    }

    // f32::clamp panics on inverted bounds
    fn clamp_z(&self, z: f32) -> f32 {
        z.max(self.min_z).min(self.max_z)
    }
}

/// Critically damped step of `current` toward `target`.
///
/// Uses the rational approximation of `exp(-ω·dt)` with `ω = 2 / smooth_time`
/// and updates `velocity` in place. The result never passes `target`; when a
/// step would, it lands on `target` and the velocity is recomputed from it.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut out = target + (change + temp) * decay;

    if (target - current > 0.0) == (out > target) {
        out = target;
        *velocity = (out - target) / dt;
    }
    out
}

/// Smoothed depth response with persistent `(position, velocity)` state.
///
/// Not synchronized; drive it from the single update loop.
#[derive(Clone, Debug)]
pub struct DistanceResponse {
    params: DistanceResponseParams,
    position: f32,
    velocity: f32,
    target: f32,
    camera_z: Option<f32>,
}

impl DistanceResponse {
    pub fn new(params: DistanceResponseParams) -> Self {
        let z = params.baseline_z;
        Self {
            params,
            position: z,
            velocity: 0.0,
            target: z,
            camera_z: None,
        }
    }

    pub fn params(&self) -> &DistanceResponseParams {
        &self.params
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Camera depth used with `camera_margin`; `None` falls back to `min_z`.
    pub fn set_camera_z(&mut self, camera_z: Option<f32>) {
        self.camera_z = camera_z;
    }

    pub fn set_scaling_ratio(&mut self, ratio: f32) {
        self.params.scaling_ratio = ratio.max(MIN_SCALING_RATIO);
    }

    /// Target Z for depth `d`, honoring the camera floor when configured.
    pub fn target_for(&self, d: f32) -> f32 {
        let p = &self.params;
        let lower = match (p.camera_margin, self.camera_z) {
            (Some(margin), Some(cam)) => p.min_z.max(cam + margin),
            _ => p.min_z,
        };
        p.clamp_z(p.baseline_z + p.offset_with_lower(d, lower))
    }

    /// Advance one tick of `dt` seconds with tracked depth `d`; returns the
    /// smoothed position.
    pub fn update(&mut self, d: f32, dt: f32) -> f32 {
        self.target = self.target_for(d);
        self.position = smooth_damp(
            self.position,
            self.target,
            &mut self.velocity,
            self.params.smoothing_time,
            dt,
        );
        self.position
    }

    /// Make `z` the new baseline and jump there without smoothing.
    pub fn rebaseline(&mut self, z: f32) {
        debug!("distance response baseline set to z={z:.3}");
        self.params.baseline_z = z;
        self.reset_to_baseline();
    }

    pub fn reset_to_baseline(&mut self) {
        self.position = self.params.baseline_z;
        self.target = self.params.baseline_z;
        self.velocity = 0.0;
    }
}
