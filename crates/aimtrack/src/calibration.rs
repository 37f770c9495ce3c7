//! Screen calibration in hub coordinates.
//!
//! The hub reports screen corners in its normalized 2D convention (origin at
//! the top-left, y down). The screen plane wants corners centered on the
//! screen with y up, so every hub point goes through [`ScreenInfo::to_local`].

use aimtrack_core::{solve_homography, ScreenCorners};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Errors while deriving calibration data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("marker correspondences are degenerate (collinear or duplicated points)")]
    DegenerateMarkers,
}

/// Four screen corners in hub coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    pub tl: Point2<f32>,
    pub tr: Point2<f32>,
    pub bl: Point2<f32>,
    pub br: Point2<f32>,
}

impl ScreenInfo {
    /// Derive screen corners from four markers seen by the tracker.
    ///
    /// `marker_screen` are the markers' positions in screen-normalized
    /// coordinates (`[0, 1]²`, y down) and `marker_hub` where the hub saw
    /// them. The unit-square corners are pushed through the homography
    /// between the two.
    pub fn from_markers(
        marker_screen: &[Point2<f32>; 4],
        marker_hub: &[Point2<f32>; 4],
    ) -> Result<Self, CalibrationError> {
        if has_collinear_triple(marker_screen) || has_collinear_triple(marker_hub) {
            return Err(CalibrationError::DegenerateMarkers);
        }
        let h = solve_homography(marker_screen, marker_hub);
        if !h.is_finite() {
            return Err(CalibrationError::DegenerateMarkers);
        }
        let info = Self {
            tl: h.apply(Point2::new(0.0, 0.0)),
            tr: h.apply(Point2::new(1.0, 0.0)),
            bl: h.apply(Point2::new(0.0, 1.0)),
            br: h.apply(Point2::new(1.0, 1.0)),
        };
        let finite = [info.tl, info.tr, info.bl, info.br]
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite());
        if finite {
            Ok(info)
        } else {
            Err(CalibrationError::DegenerateMarkers)
        }
    }

    fn center(&self) -> Point2<f32> {
        Point2::new((self.tr.x + self.tl.x) * 0.5, (self.tl.y + self.bl.y) * 0.5)
    }

    /// Hub point to center-origin, y-up local coordinates on `z = 0`.
    pub fn to_local(&self, v: Point2<f32>) -> Point3<f32> {
        let c = self.center();
        Point3::new(v.x - c.x, -(v.y - c.y), 0.0)
    }

    pub fn local_corners(&self) -> ScreenCorners {
        ScreenCorners {
            top_left: self.to_local(self.tl),
            top_right: self.to_local(self.tr),
            bottom_left: self.to_local(self.bl),
            bottom_right: self.to_local(self.br),
        }
    }

    /// The hub's origin expressed in local space, pushed `distance_offset`
    /// along z (the camera's resting distance from the screen).
    pub fn origin_offset(&self, distance_offset: f32) -> Vector3<f32> {
        let o = self.to_local(Point2::origin());
        Vector3::new(o.x, o.y, distance_offset)
    }
}

/// Smallest `|sin|` of the angle at a triple's first point still treated as
/// a proper triangle.
const MIN_TRIANGLE_SINE: f64 = 1e-5;

/// `true` when any three of the four points are collinear or coincide.
fn has_collinear_triple(pts: &[Point2<f32>; 4]) -> bool {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TRIPLES.iter().any(|&[a, b, c]| {
        let p = pts[a].cast::<f64>();
        let ab = pts[b].cast::<f64>() - p;
        let ac = pts[c].cast::<f64>() - p;
        let cross = ab.x * ac.y - ab.y * ac.x;
        cross.abs() <= MIN_TRIANGLE_SINE * ab.norm() * ac.norm()
    })
}

/// Normalized aim point to window pixels (origin bottom-left).
pub fn aim_to_pixels(aim: Point2<f32>, width: f32, height: f32) -> Point2<f32> {
    Point2::new(aim.x * width, height - aim.y * height)
}
