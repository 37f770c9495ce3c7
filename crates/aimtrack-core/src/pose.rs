//! Hub-to-world pose conversion.
//!
//! The hub stores a rotation as three basis rows (right, up, forward) plus a
//! translation, with its vertical axis pointing the other way from ours. A
//! converted pose is the raw basis-as-columns matrix conjugated by a fixed
//! Y reflection. Input is trusted hardware output and is never validated.

use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Pose as reported by the tracking hub.
///
/// Row `i` of `rotation` holds the hub's `m(i+1)1 .. m(i+1)3` entries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HubPose {
    pub translation: Vector3<f32>,
    pub rotation: Matrix3<f32>,
}

impl Default for HubPose {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Matrix3::identity(),
        }
    }
}

/// Pose in the application's world frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPose {
    pub position: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Full rigid transform; rotation block and translation column.
    pub matrix: Matrix4<f32>,
}

/// Reflection `diag(1, -1, 1, 1)` reconciling the hub's vertical axis.
pub fn flip_y() -> Matrix4<f32> {
    Matrix4::from_diagonal(&nalgebra::Vector4::new(1.0, -1.0, 1.0, 1.0))
}

#[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
pub fn convert_hub_pose(pose: &HubPose) -> WorldPose {
    let r = &pose.rotation;
    let t = &pose.translation;

    // columns: hub right, up, forward rows; translation
    let raw = Matrix4::new(
        r[(0, 0)], r[(1, 0)], r[(2, 0)], t.x, //
        r[(0, 1)], r[(1, 1)], r[(2, 1)], t.y, //
        r[(0, 2)], r[(1, 2)], r[(2, 2)], t.z, //
        0.0, 0.0, 0.0, 1.0,
    );

    let flip = flip_y();
    let matrix = flip * raw * flip;

    let position = matrix.fixed_view::<3, 1>(0, 3).into_owned();
    let basis: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));

    WorldPose {
        position,
        rotation,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn assert_mat_close(a: &Matrix4<f32>, b: &Matrix4<f32>, tol: f32) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < tol, "{a} != {b}");
        }
    }

    #[test]
    fn reflection_is_involutory() {
        let f = flip_y();
        assert_eq!(f * f, Matrix4::identity());
        assert!((f.determinant() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn identity_pose_flips_vertical_translation_only() {
        let pose = HubPose {
            translation: Vector3::new(0.5, 1.25, -2.0),
            rotation: Matrix3::identity(),
        };
        let world = convert_hub_pose(&pose);
        assert_eq!(world.position, Vector3::new(0.5, -1.25, -2.0));
        assert!(world.rotation.angle() < 1e-6);
        assert_eq!(world.matrix[(3, 3)], 1.0);
    }

    #[test]
    fn rotation_rows_become_basis_columns() {
        // hub rows: right = +z, up = +y, forward = -x
        let rotation = Matrix3::new(
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, //
            -1.0, 0.0, 0.0,
        );
        let world = convert_hub_pose(&HubPose {
            translation: Vector3::zeros(),
            rotation,
        });
        let right = world.matrix.fixed_view::<3, 1>(0, 0).into_owned();
        let up = world.matrix.fixed_view::<3, 1>(0, 1).into_owned();
        let forward = world.matrix.fixed_view::<3, 1>(0, 2).into_owned();
        assert_eq!(right, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(up, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(forward, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn conjugation_preserves_rigid_structure() {
        let hub_rot = Rotation3::from_euler_angles(0.3, -0.7, FRAC_PI_2 * 0.5);
        let pose = HubPose {
            translation: Vector3::new(1.0, 2.0, 3.0),
            rotation: *hub_rot.matrix(),
        };
        let world = convert_hub_pose(&pose);

        let basis: Matrix3<f32> = world.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let should_be_identity = basis.transpose() * basis;
        for (x, y) in should_be_identity.iter().zip(Matrix3::<f32>::identity().iter()) {
            assert!((x - y).abs() < 1e-5);
        }
        assert!((basis.determinant() - 1.0).abs() < 1e-5);

        let back = world.rotation.to_homogeneous();
        let mut expected = world.matrix;
        expected.fixed_view_mut::<3, 1>(0, 3).fill(0.0);
        assert_mat_close(&back, &expected, 1e-5);
    }

    #[test]
    fn malformed_rotation_still_yields_finite_output() {
        let pose = HubPose {
            translation: Vector3::new(0.0, 1.0, 0.0),
            rotation: Matrix3::new(
                2.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, //
                1.0, 1.0, 1.0,
            ),
        };
        let world = convert_hub_pose(&pose);
        assert!(world.matrix.iter().all(|v| v.is_finite()));
        assert!(world.rotation.coords.iter().all(|v| v.is_finite()));
    }
}
