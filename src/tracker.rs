//! Identity resolution across frames.
//!
//! Each frame arrives as an unordered bag of ball detections with no ids.
//! The tracker binds them to the previous frame's tracks by greedy nearest
//! neighbor with competitive reassignment: a detection may steal an already
//! claimed identity when it is a strictly better match than the current
//! claimant's own step. Tracks that nothing claims survive invisibly at
//! their last position, so a ball can vanish for a few frames and still get
//! its identity back.

use std::collections::VecDeque;

use crate::detection::Detection;
use crate::track::Track;

use nalgebra as na;

/// Distance added to a candidate pairing whose class labels differ.
pub const CLASS_MISMATCH_PENALTY: f32 = 200.0;

#[derive(Debug, Default)]
pub struct BallTracker {
    tracks: Vec<Track>,
    initialized: bool,
}

impl BallTracker {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            initialized: false,
        }
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    #[inline]
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Resolve one frame's detections against the current track table.
    pub fn update(&mut self, detections: &[Detection]) {
        if !self.initialized {
            if detections.is_empty() {
                return;
            }

            for det in detections {
                let id = self.tracks.len() as u32 + 1;
                tracing::debug!(id, class = ?det.class, "new track");
                self.tracks.push(Track::new(id, det.class, det.center()));
            }

            self.initialized = true;
            return;
        }

        let prev_count = self.tracks.len();

        // last known positions before this frame mutates any trajectory
        let last_seen: Vec<na::Point2<f32>> =
            self.tracks.iter().map(|t| t.last_center()).collect();

        // claims[i] = detection currently holding track i
        let mut claims: Vec<Option<usize>> = vec![None; prev_count];

        // (detection index, tracks it may no longer contend for)
        let mut queue: VecDeque<(usize, Vec<usize>)> =
            (0..detections.len()).map(|di| (di, Vec::new())).collect();

        let mut unplaced: Vec<usize> = Vec::new();

        while let Some((di, mut blocked)) = queue.pop_front() {
            let det = &detections[di];
            let center = det.center();

            let mut best: Option<(usize, f32)> = None;
            for ti in 0..prev_count {
                if blocked.contains(&ti) {
                    continue;
                }

                let mut dist = na::distance(&center, &last_seen[ti]);
                if self.tracks[ti].class != det.class {
                    dist += CLASS_MISMATCH_PENALTY;
                }

                // strict comparison: a tie keeps the first-encountered track
                match best {
                    Some((_, best_dist)) if dist >= best_dist => {}
                    _ => best = Some((ti, dist)),
                }
            }

            let Some((ti, dist)) = best else {
                unplaced.push(di);
                continue;
            };

            match claims[ti] {
                None => {
                    claims[ti] = Some(di);
                    let track = &mut self.tracks[ti];
                    track.centers.push(center);
                    track.visible = true;
                }
                Some(holder) => {
                    // the claimant's step this frame is the distance between
                    // the track's last two trajectory points
                    let track = &mut self.tracks[ti];
                    let n = track.centers.len();
                    let holder_step = na::distance(&track.centers[n - 1], &track.centers[n - 2]);

                    if dist < holder_step {
                        // steal: drop the wrongly appended point, requeue the loser
                        track.centers.pop();
                        track.centers.push(center);
                        claims[ti] = Some(di);
                        queue.push_back((holder, Vec::new()));
                    } else {
                        blocked.push(ti);
                        queue.push_back((di, blocked));
                    }
                }
            }
        }

        // unclaimed tracks persist, invisible, at their last known position
        for (ti, claim) in claims.iter().enumerate() {
            if claim.is_none() {
                self.tracks[ti].visible = false;
            }
        }

        // detections that lost everywhere are new balls
        for di in unplaced {
            let det = &detections[di];
            let id = self.tracks.len() as u32 + 1;
            tracing::debug!(id, class = ?det.class, "new track");
            self.tracks.push(Track::new(id, det.class, det.center()));
        }
    }
}
