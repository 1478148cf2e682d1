//! Clip-level driving loop.
//!
//! One `ShotPipeline` owns the whole per-clip state: the track table, the
//! once-established homography and the frame/gap counters. Frames are fed
//! in strictly one at a time; every per-frame step returns an explicit
//! status so the caller can release its resources before propagating a
//! terminal failure. After the last frame, `finish` runs the analyzer over
//! the accumulated trajectories.

use crate::analyzer::{self, ShotResult};
use crate::detection::{Detection, KeypointDetection};
use crate::error::Error;
use crate::homography::HomographyEstimator;
use crate::keypoints;
use crate::projector;
use crate::table::Pocket;
use crate::tracker::BallTracker;

/// The external detection collaborator.
///
/// Implementations wrap whatever inference backend produces per-frame ball
/// and keypoint detections; the pipeline only consumes its typed output.
/// Keypoints are requested on demand, only while no homography exists.
pub trait Detector {
    type Frame;
    type Error: std::error::Error + Send + Sync + 'static;

    fn detect_balls(&mut self, frame: &Self::Frame) -> Result<Vec<Detection>, Self::Error>;

    fn detect_keypoints(
        &mut self,
        frame: &Self::Frame,
    ) -> Result<Vec<KeypointDetection>, Self::Error>;
}

/// Operational bounds consumed at the pipeline boundary.
#[derive(Debug, Clone, Copy)]
pub struct ClipLimits {
    /// Hard cap on clip length, in frames.
    pub max_frames: u32,
    /// Consecutive frames without any ball detection before giving up.
    pub max_detection_gap: u32,
}

impl Default for ClipLimits {
    fn default() -> Self {
        Self {
            max_frames: 450,
            max_detection_gap: 10,
        }
    }
}

/// Per-clip analysis pipeline. Single-threaded, frame-sequential.
pub struct ShotPipeline<D: Detector> {
    detector: D,
    target_pocket: Pocket,
    limits: ClipLimits,
    tracker: BallTracker,
    estimator: HomographyEstimator,
    frame_nbr: u32,
    detection_gap: u32,
}

impl<D: Detector> ShotPipeline<D> {
    pub fn new(detector: D, target_pocket: Pocket) -> Self {
        Self::with_limits(detector, target_pocket, ClipLimits::default())
    }

    pub fn with_limits(detector: D, target_pocket: Pocket, limits: ClipLimits) -> Self {
        Self {
            detector,
            target_pocket,
            limits,
            tracker: BallTracker::new(),
            estimator: HomographyEstimator::new(),
            frame_nbr: 0,
            detection_gap: 0,
        }
    }

    /// Number of frames consumed so far.
    #[inline]
    pub fn frames_processed(&self) -> u32 {
        self.frame_nbr
    }

    /// Consume one decoded frame.
    ///
    /// Any error is terminal for the clip; the caller must not feed
    /// further frames after one.
    pub fn process_frame(&mut self, frame: &D::Frame) -> Result<(), Error> {
        if self.frame_nbr >= self.limits.max_frames {
            return Err(Error::ClipTooLong(self.limits.max_frames));
        }
        self.frame_nbr += 1;

        let balls = self
            .detector
            .detect_balls(frame)
            .map_err(|e| Error::Detector(Box::new(e)))?;

        if balls.is_empty() {
            self.detection_gap += 1;
            if self.detection_gap > self.limits.max_detection_gap {
                return Err(Error::DetectionGapExceeded(self.limits.max_detection_gap));
            }
        } else {
            self.detection_gap = 0;
        }

        if self.estimator.established().is_none() {
            let keypoints = self
                .detector
                .detect_keypoints(frame)
                .map_err(|e| Error::Detector(Box::new(e)))?;
            let keypoints = keypoints::dedupe(keypoints);
            self.estimator.observe(&keypoints);
        }

        self.tracker.update(&balls);

        if let Some(homography) = self.estimator.established() {
            projector::project_visible(self.tracker.tracks_mut(), homography);
        }

        Ok(())
    }

    /// Run the analyzer over the accumulated trajectories.
    pub fn finish(self) -> Result<ShotResult, Error> {
        if self.estimator.established().is_none() {
            tracing::warn!("clip ended without an established homography");
            return Err(Error::HomographyUnavailable);
        }

        analyzer::analyze(self.tracker.tracks(), self.target_pocket)
    }

    /// Drive the whole clip end to end.
    pub fn run<I>(mut self, frames: I) -> Result<ShotResult, Error>
    where
        I: IntoIterator<Item = D::Frame>,
    {
        for frame in frames {
            self.process_frame(&frame)?;
        }

        self.finish()
    }
}
