use serde_derive::{Deserialize, Serialize};

use crate::table::KeypointLabel;

use nalgebra as na;

/// Ball color vocabulary of the detector.
///
/// A track's color is fixed at creation; the tracker only uses it as a
/// matching feature, never to rewrite an identity.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BallColor {
    Red,
    White,
    Blue,
    Pink,
    Black,
    Green,
    Yellow,
    Brown,
}

/// A single frame's sighting of a ball.
///
/// Contains (x,y) of the center and (width,height) of the bbox, in camera
/// pixel space.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: BallColor,
}

impl Detection {
    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(self.x, self.y)
    }
}

/// A single frame's sighting of a table anchor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct KeypointDetection {
    pub label: KeypointLabel,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
}

impl KeypointDetection {
    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(self.x, self.y)
    }
}
