//! Camera-to-table projective transform.
//!
//! The transform is fit once per clip from deduplicated keypoint
//! correspondences by a normalized direct linear transform (least squares
//! over the point pairs) and frozen on first success; later frames never
//! re-estimate, even if better correspondences show up.

use nalgebra as na;

use crate::detection::KeypointDetection;

/// Theoretical minimum of point correspondences for a projective transform.
pub const MIN_CORRESPONDENCES: usize = 4;

/// A 3x3 projective transform from camera pixel space to map space.
#[derive(Debug, Clone)]
pub struct Homography {
    matrix: na::Matrix3<f64>,
}

impl Homography {
    /// Map a pixel-space point into map space.
    ///
    /// The point is lifted to homogeneous coordinates, multiplied through
    /// and normalized by the third coordinate. A degenerate projection
    /// (w near zero) yields non-finite coordinates the caller must skip.
    pub fn project(&self, p: na::Point2<f32>) -> na::Point2<f64> {
        let v = self.matrix * na::Vector3::new(p.x as f64, p.y as f64, 1.0);

        na::Point2::new(v.x / v.z, v.y / v.z)
    }

    pub fn matrix(&self) -> &na::Matrix3<f64> {
        &self.matrix
    }
}

/// One-shot estimator: feed it cleaned keypoints until a transform sticks.
#[derive(Debug, Default)]
pub struct HomographyEstimator {
    established: Option<Homography>,
}

impl HomographyEstimator {
    pub fn new() -> Self {
        Self { established: None }
    }

    #[inline]
    pub fn established(&self) -> Option<&Homography> {
        self.established.as_ref()
    }

    #[inline]
    pub fn into_established(self) -> Option<Homography> {
        self.established
    }

    /// Attempt to establish the transform from this frame's keypoints.
    ///
    /// No-op once a transform has been accepted (first success wins). With
    /// fewer than four correspondences the frame is skipped silently and
    /// projection stays deferred.
    pub fn observe(&mut self, keypoints: &[KeypointDetection]) {
        if self.established.is_some() {
            return;
        }

        if keypoints.len() < MIN_CORRESPONDENCES {
            tracing::debug!(
                count = keypoints.len(),
                "not enough keypoints for homography, deferring"
            );
            return;
        }

        let src: Vec<na::Point2<f64>> = keypoints
            .iter()
            .map(|k| na::Point2::new(k.x as f64, k.y as f64))
            .collect();
        let dst: Vec<na::Point2<f64>> = keypoints.iter().map(|k| k.label.map_coords()).collect();

        match fit_dlt(&src, &dst) {
            Some(matrix) => {
                tracing::debug!(correspondences = keypoints.len(), "homography established");
                self.established = Some(Homography { matrix });
            }
            None => {
                tracing::warn!("homography fit failed, deferring to a later frame");
            }
        }
    }
}

/// Translate the centroid to the origin and scale so the mean distance from
/// the origin is sqrt(2) (Hartley normalization).
fn normalize_points(pts: &[na::Point2<f64>]) -> (na::Matrix3<f64>, Vec<na::Point2<f64>>) {
    let n = pts.len() as f64;
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / n;

    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = na::Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts
        .iter()
        .map(|p| na::Point2::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();

    (t, normalized)
}

/// Direct linear transform over >=4 correspondences.
///
/// The solution is the eigenvector of the smallest eigenvalue of the 9x9
/// matrix A^T A, which sidesteps thin-SVD dimension issues.
fn fit_dlt(src: &[na::Point2<f64>], dst: &[na::Point2<f64>]) -> Option<na::Matrix3<f64>> {
    let n = src.len();
    if n < MIN_CORRESPONDENCES || dst.len() != n {
        return None;
    }

    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    let mut a = na::DMatrix::zeros(2 * n, 9);
    for i in 0..n {
        let (sx, sy) = (src_n[i].x, src_n[i].y);
        let (dx, dy) = (dst_n[i].x, dst_n[i].y);

        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    let ata = a.transpose() * &a;
    let eig = na::SymmetricEigen::new(ata);

    let mut min_idx = 0;
    let mut min_val = eig.eigenvalues[0].abs();
    for i in 1..9 {
        let v = eig.eigenvalues[i].abs();
        if v < min_val {
            min_val = v;
            min_idx = i;
        }
    }

    let h = eig.eigenvectors.column(min_idx);
    let h_norm = na::Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    let t_dst_inv = t_dst.try_inverse()?;
    let h = t_dst_inv * h_norm * t_src;

    let scale = h[(2, 2)];
    if scale.abs() < 1e-15 {
        Some(h)
    } else {
        Some(h / scale)
    }
}
