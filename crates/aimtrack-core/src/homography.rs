use nalgebra::{Matrix3, Matrix4, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Planar projective transform `dst ~ H * [x, y, 1]^T`, normalized so `h33 = 1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// `false` when any entry is NaN or infinite, which is how degenerate
    /// correspondences show up.
    pub fn is_finite(&self) -> bool {
        self.h.iter().all(|v| v.is_finite())
    }

    /// Embed into a 4×4 transform acting on `(x, y, z, 1)`.
    ///
    /// The x, y and w rows/columns carry the homography; z passes through
    /// unchanged, so a point on the `z = 0` plane maps to `(X, Y, 0, W)`.
    pub fn to_matrix4(&self) -> Matrix4<f32> {
        let h = self.h.map(|v| v as f32);
        Matrix4::new(
            h[(0, 0)], h[(0, 1)], 0.0, h[(0, 2)], //
            h[(1, 0)], h[(1, 1)], 0.0, h[(1, 2)], //
            0.0, 0.0, 1.0, 0.0, //
            h[(2, 0)], h[(2, 1)], 0.0, h[(2, 2)],
        )
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

/// Compute H such that `dst[i] ~ H * src[i]` from exactly four correspondences.
///
/// With `h33` fixed to 1, each pair `(x, y) -> (u, v)` contributes
///
/// ```text
/// [ -x -y -1   0  0  0   x*u  y*u ] h = [ -u ]
/// [  0  0  0  -x -y -1   x*v  y*v ] h = [ -v ]
/// ```
///
/// and the 8×8 system is solved by LU decomposition with partial pivoting.
/// No validation is done: duplicated points make the system singular and the
/// result is all NaN, while three collinear points can leave a vanishing
/// pivot and a finite but meaningless matrix. Check
/// [`Homography::is_finite`] before trusting the output, and reject
/// collinear input upstream.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn solve_homography(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Homography {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src[k].x as f64;
        let y = src[k].y as f64;
        let u = dst[k].x as f64;
        let v = dst[k].y as f64;

        let r0 = 2 * k;
        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = x * u;
        a[(r0, 7)] = y * u;
        b[r0] = -u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = x * v;
        a[(r1, 7)] = y * v;
        b[r1] = -v;
    }

    let Some(x) = a.lu().solve(&b) else {
        return Homography::new(Matrix3::repeat(f64::NAN));
    };

    Homography::new(Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    ))
}
