//! Geometry and bookkeeping core for projector-based shooting-range trainers.
//!
//! This crate turns raw tracking output into screen-relative quantities and
//! keeps a stable registry of live devices. It does no I/O and knows nothing
//! about the hub connection; all operations are synchronous and expect to be
//! driven from a single update loop.
//!
//! - [`SlotRegistry`]: stable indices with FIFO reuse.
//! - [`solve_homography`]: four-point planar homography.
//! - [`convert_hub_pose`]: hub pose to world pose.
//! - [`ScreenPlane`]: calibrated screen basis.
//! - [`DistanceResponse`]: bounded, smoothed depth response.

mod distance;
mod homography;
mod logger;
mod pose;
mod screen_plane;
mod slots;

pub use distance::{
    smooth_damp, DistanceResponse, DistanceResponseParams, MIN_SCALING_RATIO,
};
pub use homography::{solve_homography, Homography};
pub use pose::{convert_hub_pose, flip_y, HubPose, WorldPose};
pub use screen_plane::{AnchorFrame, ScreenCorners, ScreenPlane, DEFAULT_SCREEN_SIZE};
pub use slots::{SlotError, SlotRegistry};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV_VAR};
