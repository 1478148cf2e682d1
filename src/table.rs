//! Canonical top-down table model: keypoint anchors, pockets and the
//! real-world calibration of the map image.
//!
//! All map-space coordinates refer to the fixed reference image of the
//! table (990x1882 px). Pixel-space coordinates come from the camera and
//! only become comparable to these after the homography is applied.

use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Width of the canonical map image in pixels.
pub const MAP_WIDTH_PX: f64 = 990.0;
/// Height of the canonical map image in pixels.
pub const MAP_HEIGHT_PX: f64 = 1882.0;
/// Playing surface length covered by the map height, in meters.
pub const TABLE_LENGTH_M: f64 = 3.56;
/// Playing surface width covered by the map width, in meters.
pub const TABLE_WIDTH_M: f64 = 1.78;

/// One of the ten fixed table anchors the keypoint detector is trained on.
///
/// Each label is bound to a fixed coordinate on the canonical map; a frame
/// needs at least four of them to establish the camera-to-map homography.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypointLabel {
    BottomLeft,
    BottomRight,
    IntersectionLeft,
    IntersectionRight,
    MediumLeft,
    MediumRight,
    SemicircleLeft,
    SemicircleRight,
    TopLeft,
    TopRight,
}

impl KeypointLabel {
    /// Fixed position of this anchor on the canonical map.
    pub fn map_coords(self) -> na::Point2<f64> {
        let (x, y) = match self {
            Self::BottomLeft => (44.0, 1837.0),
            Self::BottomRight => (945.0, 1837.0),
            Self::IntersectionLeft => (53.0, 419.0),
            Self::IntersectionRight => (934.0, 419.0),
            Self::MediumLeft => (44.0, 941.0),
            Self::MediumRight => (945.0, 941.0),
            Self::SemicircleLeft => (347.0, 419.0),
            Self::SemicircleRight => (639.0, 419.0),
            Self::TopLeft => (44.0, 40.0),
            Self::TopRight => (945.0, 40.0),
        };

        na::Point2::new(x, y)
    }

    /// Anchors conventionally on the left edge of the table.
    pub fn is_left_edge(self) -> bool {
        matches!(
            self,
            Self::BottomLeft
                | Self::IntersectionLeft
                | Self::MediumLeft
                | Self::SemicircleLeft
                | Self::TopLeft
        )
    }

    /// Anchors conventionally on the right edge of the table.
    pub fn is_right_edge(self) -> bool {
        matches!(
            self,
            Self::BottomRight
                | Self::IntersectionRight
                | Self::MediumRight
                | Self::SemicircleRight
                | Self::TopRight
        )
    }

    /// Anchors on the bottom rail.
    pub fn is_bottom_row(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    /// Anchors on the top rail.
    pub fn is_top_row(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// One of the six table pockets, the possible targets of a shot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pocket {
    BottomLeft,
    BottomRight,
    MediumLeft,
    MediumRight,
    TopLeft,
    TopRight,
}

impl Pocket {
    pub const ALL: [Pocket; 6] = [
        Pocket::BottomLeft,
        Pocket::BottomRight,
        Pocket::MediumLeft,
        Pocket::MediumRight,
        Pocket::TopLeft,
        Pocket::TopRight,
    ];

    /// Fixed position of this pocket on the canonical map.
    pub fn map_coords(self) -> na::Point2<f64> {
        let (x, y) = match self {
            Self::BottomLeft => (44.0, 1837.0),
            Self::BottomRight => (945.0, 1837.0),
            Self::MediumLeft => (44.0, 941.0),
            Self::MediumRight => (945.0, 941.0),
            Self::TopLeft => (44.0, 40.0),
            Self::TopRight => (945.0, 40.0),
        };

        na::Point2::new(x, y)
    }
}

/// The pocket whose fixed coordinate is nearest to `point`.
pub fn closest_pocket(point: na::Point2<f64>) -> Pocket {
    let mut best = Pocket::ALL[0];
    let mut best_dist = na::distance(&point, &best.map_coords());

    for pocket in &Pocket::ALL[1..] {
        let dist = na::distance(&point, &pocket.map_coords());
        if dist < best_dist {
            best = *pocket;
            best_dist = dist;
        }
    }

    best
}
