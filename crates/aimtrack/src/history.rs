use std::collections::VecDeque;

use crate::events::TrackingSample;

/// Sample count kept per device when nothing else is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Bounded FIFO of recent tracking samples for one device.
///
/// Used to look up where a device was aiming at the moment a shot was fired,
/// since impact events arrive after the fact.
#[derive(Clone, Debug)]
pub struct TrackingHistory {
    samples: VecDeque<TrackingSample>,
    capacity: usize,
}

impl Default for TrackingHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl TrackingHistory {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: TrackingSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&TrackingSample> {
        self.samples.back()
    }

    /// Sample whose timestamp is nearest to `timestamp` on the wrapping
    /// `u32` clock; ties go to the newer one.
    pub fn closest(&self, timestamp: u32) -> Option<&TrackingSample> {
        self.samples
            .iter()
            .rev()
            .min_by_key(|s| wrapping_distance(s.timestamp, timestamp))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn wrapping_distance(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b).min(b.wrapping_sub(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimtrack_core::HubPose;
    use nalgebra::Point2;

    fn sample(timestamp: u32, x: f32) -> TrackingSample {
        TrackingSample {
            timestamp,
            pose: HubPose::default(),
            aim_point: Point2::new(x, 0.5),
        }
    }

    #[test]
    fn oldest_samples_are_evicted() {
        let mut h = TrackingHistory::new(3);
        for t in 0..5 {
            h.push(sample(t * 10, t as f32));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.closest(0).map(|s| s.timestamp), Some(20));
        assert_eq!(h.latest().map(|s| s.timestamp), Some(40));
    }

    #[test]
    fn closest_prefers_newer_sample_on_tie() {
        let mut h = TrackingHistory::new(8);
        h.push(sample(100, 0.1));
        h.push(sample(200, 0.2));
        h.push(sample(300, 0.3));
        assert_eq!(h.closest(150).map(|s| s.timestamp), Some(200));
        assert_eq!(h.closest(260).map(|s| s.timestamp), Some(300));
    }

    #[test]
    fn closest_measures_across_clock_wrap() {
        let mut h = TrackingHistory::new(8);
        h.push(sample(u32::MAX - 10, 0.1));
        h.push(sample(1000, 0.2));
        assert_eq!(h.closest(5).map(|s| s.timestamp), Some(u32::MAX - 10));
        assert_eq!(h.closest(900).map(|s| s.timestamp), Some(1000));
        assert_eq!(h.closest(u32::MAX).map(|s| s.timestamp), Some(u32::MAX - 10));
    }

    #[test]
    fn wrapping_distance_is_symmetric() {
        assert_eq!(wrapping_distance(3, u32::MAX - 2), 6);
        assert_eq!(wrapping_distance(u32::MAX - 2, 3), 6);
        assert_eq!(wrapping_distance(100, 40), 60);
        assert_eq!(wrapping_distance(7, 7), 0);
    }

    #[test]
    fn empty_history_has_no_match() {
        let h = TrackingHistory::new(0);
        assert!(h.closest(5).is_none());
        assert_eq!(h.capacity(), 1);
    }
}
