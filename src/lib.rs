//! Quantitative single-shot analysis for billiards/snooker clips.
//!
//! Feed the pipeline one decoded frame at a time through an injected
//! [`Detector`]; after the clip it reports which two balls moved, the
//! real-world distance between their starting points, the angle toward the
//! target pocket and whether the shot succeeded.

pub mod analyzer;
pub mod detection;
pub mod error;
pub mod homography;
pub mod keypoints;
pub mod pipeline;
pub mod projector;
pub mod table;
pub mod tracker;

mod track;

pub use analyzer::{BallPaths, OnsetEvent, ShotResult};
pub use detection::{BallColor, Detection, KeypointDetection};
pub use error::Error;
pub use homography::{Homography, HomographyEstimator};
pub use pipeline::{ClipLimits, Detector, ShotPipeline};
pub use table::{KeypointLabel, Pocket};
pub use track::Track;
pub use tracker::BallTracker;
