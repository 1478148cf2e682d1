//! Deduplication of raw table-keypoint detections.
//!
//! The keypoint detector regularly fires twice on the same anchor. Which
//! duplicate survives depends on where the label sits on the table: left-edge
//! anchors keep the leftmost sighting, right-edge anchors the rightmost,
//! bottom-rail anchors the lowest, top-rail anchors the highest; everything
//! else falls back to confidence.

use crate::detection::KeypointDetection;

/// Confidence floor applied when the detector overfires.
const LOW_CONFIDENCE: f32 = 0.35;

/// Raw keypoint count above which the confidence floor kicks in.
const OVERFIRE_COUNT: usize = 4;

/// Reduce raw keypoint detections to at most one per canonical label.
///
/// The result never contains two detections sharing a label, and running the
/// filter on its own output returns it unchanged. An empty result is valid
/// and means "insufficient keypoints this frame".
pub fn dedupe(mut detections: Vec<KeypointDetection>) -> Vec<KeypointDetection> {
    if detections.len() > OVERFIRE_COUNT {
        detections.retain(|d| d.confidence >= LOW_CONFIDENCE);
    }

    let mut removed = vec![false; detections.len()];

    for i in 0..detections.len() {
        for j in 0..detections.len() {
            if i == j || removed[i] || removed[j] {
                continue;
            }

            let a = &detections[i];
            let b = &detections[j];

            if a.label != b.label {
                continue;
            }

            let x_diff = (a.x - b.x).abs();
            let y_diff = (a.y - b.y).abs();

            let loser = if x_diff > y_diff {
                if a.label.is_left_edge() {
                    if a.x > b.x {
                        i
                    } else {
                        j
                    }
                } else if a.label.is_right_edge() {
                    if a.x < b.x {
                        i
                    } else {
                        j
                    }
                } else if a.confidence > b.confidence {
                    j
                } else {
                    i
                }
            } else if a.label.is_bottom_row() {
                // the lower sighting (greater y) is the rail
                if a.y < b.y {
                    i
                } else {
                    j
                }
            } else if a.label.is_top_row() {
                if a.y > b.y {
                    i
                } else {
                    j
                }
            } else if a.confidence > b.confidence {
                j
            } else {
                i
            };

            removed[loser] = true;
        }
    }

    let mut idx = 0;
    detections.retain(|_| {
        let keep = !removed[idx];
        idx += 1;
        keep
    });

    detections
}
