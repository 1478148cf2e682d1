//! Projection of tracked pixel positions into map space.

use crate::homography::Homography;
use crate::track::Track;

/// Append the map-space position of every currently visible track.
///
/// Pure per-frame step: each visible track's last pixel center is pushed
/// through the homography and appended to its map trajectory. The caller
/// only invokes this once a homography exists; degenerate (non-finite)
/// projections are skipped.
pub fn project_visible(tracks: &mut [Track], homography: &Homography) {
    for track in tracks.iter_mut().filter(|t| t.visible) {
        let mapped = homography.project(track.last_center());

        if mapped.x.is_finite() && mapped.y.is_finite() {
            track.map_centers.push(mapped);
        }
    }
}
