use nalgebra as na;

use crate::detection::BallColor;

/// A physical ball identity and its evolving trajectory.
///
/// Identities start at 1 and are handed out in detection order; they are
/// never reused or merged. The pixel trajectory only grows, except for the
/// tracker's steal correction which replaces the point appended in the same
/// frame. The class is fixed at creation and used purely as a matching
/// feature.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    pub class: BallColor,
    /// Pixel-space centers, one per frame the ball was matched.
    pub centers: Vec<na::Point2<f32>>,
    /// Map-space centers, appended once the homography exists.
    pub map_centers: Vec<na::Point2<f64>>,
    /// Whether the ball was observed on the most recent frame.
    pub visible: bool,
}

impl Track {
    pub fn new(id: u32, class: BallColor, center: na::Point2<f32>) -> Self {
        Self {
            id,
            class,
            centers: vec![center],
            map_centers: Vec::new(),
            visible: true,
        }
    }

    /// Last known pixel position; tracks keep it through detection gaps.
    #[inline]
    pub fn last_center(&self) -> na::Point2<f32> {
        self.centers[self.centers.len() - 1]
    }
}
