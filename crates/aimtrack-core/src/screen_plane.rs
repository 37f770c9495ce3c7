//! Calibrated screen plane.
//!
//! Four world-space corners plus the orthonormal `right`/`up`/`normal` basis
//! derived from them. Corners come in anchor-local coordinates and are mapped
//! to world space through an [`AnchorFrame`] the caller owns. Until a
//! calibration arrives the plane is a fixed-size rectangle centered on the
//! anchor.

use nalgebra::{Affine3, Isometry3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Width and height of the uncalibrated screen rectangle, in world units.
pub const DEFAULT_SCREEN_SIZE: [f32; 2] = [1.756, 0.988];

/// Anchor-local to world mapping supplied by the host scene.
pub trait AnchorFrame {
    fn transform_point(&self, local: &Point3<f32>) -> Point3<f32>;
}

impl AnchorFrame for Isometry3<f32> {
    fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        Isometry3::transform_point(self, local)
    }
}

impl AnchorFrame for Affine3<f32> {
    fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        Affine3::transform_point(self, local)
    }
}

/// Homogeneous 4×4 transform; the result is divided by `w`.
impl AnchorFrame for Matrix4<f32> {
    fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        let v = self * local.to_homogeneous();
        Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenCorners {
    pub top_left: Point3<f32>,
    pub top_right: Point3<f32>,
    pub bottom_left: Point3<f32>,
    pub bottom_right: Point3<f32>,
}

impl ScreenCorners {
    /// Axis-aligned `width × height` rectangle on `z = 0`, centered on the origin.
    pub fn centered(width: f32, height: f32) -> Self {
        let hx = width * 0.5;
        let hy = height * 0.5;
        Self {
            top_left: Point3::new(-hx, hy, 0.0),
            top_right: Point3::new(hx, hy, 0.0),
            bottom_left: Point3::new(-hx, -hy, 0.0),
            bottom_right: Point3::new(hx, -hy, 0.0),
        }
    }

    fn map(&self, f: impl Fn(&Point3<f32>) -> Point3<f32>) -> Self {
        Self {
            top_left: f(&self.top_left),
            top_right: f(&self.top_right),
            bottom_left: f(&self.bottom_left),
            bottom_right: f(&self.bottom_right),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenPlane {
    corners: ScreenCorners,
    right: Vector3<f32>,
    up: Vector3<f32>,
    normal: Vector3<f32>,
    orientation: Matrix4<f32>,
    calibrated: bool,
}

impl ScreenPlane {
    /// Default-size plane centered on `anchor`, used before calibration.
    pub fn uncalibrated<A: AnchorFrame + ?Sized>(anchor: &A) -> Self {
        let [w, h] = DEFAULT_SCREEN_SIZE;
        let corners = ScreenCorners::centered(w, h).map(|p| anchor.transform_point(p));
        let mut plane = Self {
            corners,
            right: Vector3::x(),
            up: Vector3::y(),
            normal: -Vector3::z(),
            orientation: Matrix4::identity(),
            calibrated: false,
        };
        plane.update();
        plane
    }

    /// Replace the corners with anchor-local `local` mapped to world space.
    pub fn set_local_bounds<A: AnchorFrame + ?Sized>(&mut self, anchor: &A, local: ScreenCorners) {
        self.corners = local.map(|p| anchor.transform_point(p));
        self.calibrated = true;
        self.update();
    }

    /// Recompute the basis and orientation matrix from the stored corners.
    ///
    /// `normal` is the negated `right × up`, so it faces the viewer.
    fn update(&mut self) {
        let c = &self.corners;
        self.right = (c.bottom_right - c.bottom_left).normalize();
        self.up = (c.top_left - c.bottom_left).normalize();
        self.normal = -self.right.cross(&self.up).normalize();

        let mut m = Matrix4::zeros();
        m.fixed_view_mut::<1, 3>(0, 0).copy_from(&self.right.transpose());
        m.fixed_view_mut::<1, 3>(1, 0).copy_from(&self.up.transpose());
        m.fixed_view_mut::<1, 3>(2, 0).copy_from(&self.normal.transpose());
        m[(3, 3)] = 1.0;
        self.orientation = m;
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn corners(&self) -> &ScreenCorners {
        &self.corners
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Rotation-only matrix whose rows are `right`, `up`, `normal`.
    pub fn orientation_matrix(&self) -> &Matrix4<f32> {
        &self.orientation
    }

    pub fn center(&self) -> Point3<f32> {
        let c = &self.corners;
        c.bottom_left + (c.top_right - c.bottom_left) * 0.5
    }

    /// Express `world` relative to the bottom-left corner in
    /// `(right, up, normal)` components.
    pub fn to_plane_local(&self, world: &Point3<f32>) -> Vector3<f32> {
        let d = world - self.corners.bottom_left;
        Vector3::new(d.dot(&self.right), d.dot(&self.up), d.dot(&self.normal))
    }

    /// Where the ray `origin + t * direction` meets the plane, for any `t`.
    /// `None` when the ray runs parallel to the plane.
    pub fn intersect_ray(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<Point3<f32>> {
        let denom = direction.dot(&self.normal);
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let t = (self.corners.bottom_left - origin).dot(&self.normal) / denom;
        Some(origin + direction * t)
    }
}
