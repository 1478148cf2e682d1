//! Shot statistics derived from completed map-space trajectories.
//!
//! Runs once, after the clip is exhausted. Finds the first two balls that
//! detectably started moving, takes them as cue and object ball, and
//! derives travelled distance, the pot angle toward the target pocket and
//! whether the shot succeeded.

use serde_derive::Serialize;

use crate::detection::BallColor;
use crate::error::Error;
use crate::table::{
    closest_pocket, Pocket, MAP_HEIGHT_PX, MAP_WIDTH_PX, TABLE_LENGTH_M, TABLE_WIDTH_M,
};
use crate::track::Track;

use nalgebra as na;

/// Samples looked ahead when scanning for a movement onset.
const ONSET_LOOKAHEAD: usize = 5;

/// Map-space displacement above which a ball counts as moving.
const ONSET_THRESHOLD: f64 = 30.0;

/// The moment a ball started moving, with everything the aggregation needs.
#[derive(Debug, Clone)]
pub struct OnsetEvent {
    /// Trajectory index at which the displacement was detected.
    pub index: usize,
    /// Displacement over the lookahead window that triggered the event.
    pub displacement: f64,
    pub track_id: u32,
    pub class: BallColor,
    /// The trajectory's very first map-space point.
    pub first_point: na::Point2<f64>,
    /// Whether the ball was still visible on the last tracked frame.
    pub finally_visible: bool,
    pub path: Vec<na::Point2<f64>>,
}

/// The two moving balls' map-space paths, first = cue, second = object.
#[derive(Debug, Clone, Serialize)]
pub struct BallPaths {
    pub first: Vec<[f64; 2]>,
    pub second: Vec<[f64; 2]>,
}

/// Final shot statistics. Created once per clip, immutable thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct ShotResult {
    /// Real-world distance between the two balls' starting points, meters.
    pub distance: f64,
    /// Deviation from a straight pot line, degrees in [0, 180].
    pub angle: f64,
    pub first_ball_color: BallColor,
    pub second_ball_color: BallColor,
    pub success: bool,
    pub ball_paths: BallPaths,
}

/// Scan one trajectory for its movement onset.
///
/// Walks the map trajectory comparing the point `ONSET_LOOKAHEAD` samples
/// ahead against a running reference; the first displacement above
/// `ONSET_THRESHOLD` produces the event and ends the scan. Trajectories too
/// short to reach the lookahead produce none.
pub fn movement_onset(track: &Track) -> Option<OnsetEvent> {
    let centers = &track.map_centers;

    // (first point, running reference)
    let mut state: Option<(na::Point2<f64>, na::Point2<f64>)> = None;

    for (index, center) in centers.iter().enumerate() {
        if index + ONSET_LOOKAHEAD >= centers.len() {
            break;
        }

        let ahead = centers[index + ONSET_LOOKAHEAD];

        match state {
            Some((first, reference)) => {
                let displacement = na::distance(&ahead, &reference);

                if displacement > ONSET_THRESHOLD {
                    return Some(OnsetEvent {
                        index,
                        displacement,
                        track_id: track.id,
                        class: track.class,
                        first_point: first,
                        finally_visible: track.visible,
                        path: centers.clone(),
                    });
                }

                state = Some((first, *center));
            }
            None => {
                state = Some((*center, *center));
            }
        }
    }

    None
}

/// Derive the shot statistics from the final track table.
pub fn analyze(tracks: &[Track], target_pocket: Pocket) -> Result<ShotResult, Error> {
    let mut events: Vec<OnsetEvent> = tracks.iter().filter_map(movement_onset).collect();

    if events.len() < 2 {
        tracing::debug!(onsets = events.len(), "too few moving balls");
        return Err(Error::InsufficientMovement);
    }

    events.sort_by_key(|e| e.index);

    let second = events.swap_remove(1);
    let first = events.swap_remove(0);

    let distance = real_distance(first.first_point, second.first_point);
    let angle = pot_angle(first.first_point, second.first_point, target_pocket);

    let last_point = second.path.last().copied().unwrap_or(second.first_point);
    let success = !second.finally_visible && closest_pocket(last_point) == target_pocket;

    Ok(ShotResult {
        distance,
        angle,
        first_ball_color: first.class,
        second_ball_color: second.class,
        success,
        ball_paths: BallPaths {
            first: first.path.iter().map(|p| [p.x, p.y]).collect(),
            second: second.path.iter().map(|p| [p.x, p.y]).collect(),
        },
    })
}

/// Map-space distance converted to meters.
///
/// Applies the arithmetic mean of the vertical and horizontal
/// pixel-to-meter ratios to the Euclidean distance. Geometrically inexact
/// for diagonal shots; kept for parity with the reference outputs.
fn real_distance(a: na::Point2<f64>, b: na::Point2<f64>) -> f64 {
    let vertical_ratio = TABLE_LENGTH_M / MAP_HEIGHT_PX;
    let horizontal_ratio = TABLE_WIDTH_M / MAP_WIDTH_PX;

    na::distance(&a, &b) * (vertical_ratio + horizontal_ratio) / 2.0
}

/// Deviation from a straight pot line, in degrees.
///
/// Law of cosines over the triangle (cue start, object start, pocket): the
/// interior angle at the object ball is subtracted from 180 so that a
/// perfectly straight shot reads 0. Coincident balls read 0 as well.
fn pot_angle(first: na::Point2<f64>, second: na::Point2<f64>, pocket: Pocket) -> f64 {
    let k = pocket.map_coords();

    let a = na::distance(&first, &second);
    let b = na::distance(&second, &k);
    let c = na::distance(&first, &k);

    if a == 0.0 || b == 0.0 {
        return 0.0;
    }

    let cos = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);

    180.0 - cos.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn track_with_path(id: u32, class: BallColor, path: &[(f64, f64)], visible: bool) -> Track {
        let mut track = Track::new(id, class, na::Point2::new(0.0, 0.0));
        track.map_centers = path.iter().map(|&(x, y)| na::Point2::new(x, y)).collect();
        track.visible = visible;
        track
    }

    fn static_path(x: f64, y: f64, len: usize) -> Vec<(f64, f64)> {
        vec![(x, y); len]
    }

    /// Stationary for `hold` samples, then moving in +y by `step` per sample.
    fn moving_path(x: f64, y: f64, hold: usize, steps: usize, step: f64) -> Vec<(f64, f64)> {
        let mut path = static_path(x, y, hold);
        for i in 1..=steps {
            path.push((x, y + i as f64 * step));
        }
        path
    }

    #[test]
    fn static_ball_produces_no_onset() {
        let track = track_with_path(1, BallColor::Red, &static_path(500.0, 900.0, 30), true);
        assert!(movement_onset(&track).is_none());
    }

    #[test]
    fn short_trajectory_produces_no_onset() {
        let track = track_with_path(1, BallColor::Red, &moving_path(500.0, 900.0, 1, 4, 50.0), true);
        assert!(movement_onset(&track).is_none());
    }

    #[test]
    fn moving_ball_produces_exactly_one_onset() {
        let track =
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 6, 10, 20.0), true);

        let event = movement_onset(&track).expect("onset");
        assert_eq!(event.track_id, 1);
        assert!(event.displacement > ONSET_THRESHOLD);
        assert_eq!(event.first_point, na::Point2::new(500.0, 900.0));
    }

    #[test]
    fn single_moving_ball_is_insufficient() {
        let tracks = vec![
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 6, 10, 20.0), true),
            track_with_path(2, BallColor::Red, &static_path(500.0, 1400.0, 20), true),
        ];

        assert!(matches!(
            analyze(&tracks, Pocket::BottomLeft),
            Err(Error::InsufficientMovement)
        ));
    }

    #[test]
    fn earlier_onset_is_the_cue_ball() {
        let tracks = vec![
            track_with_path(2, BallColor::Red, &moving_path(500.0, 1400.0, 12, 10, 20.0), true),
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 2, 20, 20.0), true),
        ];

        let result = analyze(&tracks, Pocket::BottomLeft).expect("result");
        assert_eq!(result.first_ball_color, BallColor::White);
        assert_eq!(result.second_ball_color, BallColor::Red);
    }

    #[test]
    fn distance_uses_the_averaged_ratio() {
        let tracks = vec![
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 2, 20, 20.0), true),
            track_with_path(2, BallColor::Red, &moving_path(500.0, 1400.0, 12, 10, 20.0), true),
        ];

        let result = analyze(&tracks, Pocket::BottomLeft).expect("result");

        let expected = 500.0 * (3.56 / 1882.0 + 1.78 / 990.0) / 2.0;
        assert_relative_eq!(result.distance, expected, epsilon = 1e-9);
    }

    #[test]
    fn angle_is_zero_for_coincident_balls() {
        let p = na::Point2::new(400.0, 800.0);
        assert_eq!(pot_angle(p, p, Pocket::TopRight), 0.0);
    }

    #[test]
    fn angle_is_zero_for_a_straight_pot() {
        // cue, object and pocket collinear, object between cue and pocket
        let pocket = Pocket::BottomLeft;
        let k = pocket.map_coords();
        let second = na::Point2::new(k.x + 100.0, k.y - 100.0);
        let first = na::Point2::new(k.x + 300.0, k.y - 300.0);

        let angle = pot_angle(first, second, pocket);
        assert!(angle.abs() < 1e-6, "angle = {angle}");
    }

    #[test]
    fn angle_stays_within_bounds() {
        let pocket = Pocket::TopRight;
        let points = [
            (100.0, 1800.0, 900.0, 200.0),
            (500.0, 900.0, 500.0, 901.0),
            (44.0, 40.0, 945.0, 1837.0),
            (1.0, 1.0, 2.0, 2.0),
        ];

        for (fx, fy, sx, sy) in points {
            let angle = pot_angle(
                na::Point2::new(fx, fy),
                na::Point2::new(sx, sy),
                pocket,
            );
            assert!((0.0..=180.0).contains(&angle), "angle = {angle}");
        }
    }

    #[test]
    fn success_requires_disappearance_and_the_right_pocket() {
        // object ball ends near BottomLeft and is gone from view
        let object_path = {
            let mut p = moving_path(500.0, 1400.0, 8, 10, 40.0);
            p.push((100.0, 1750.0));
            p
        };

        let tracks = vec![
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 2, 20, 20.0), true),
            track_with_path(2, BallColor::Red, &object_path, false),
        ];

        let result = analyze(&tracks, Pocket::BottomLeft).expect("result");
        assert!(result.success);

        // same trajectories, wrong target pocket
        let result = analyze(&tracks, Pocket::TopRight).expect("result");
        assert!(!result.success);

        // right pocket but the ball is still visible at the end
        let tracks = vec![
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 2, 20, 20.0), true),
            track_with_path(2, BallColor::Red, &object_path, true),
        ];
        let result = analyze(&tracks, Pocket::BottomLeft).expect("result");
        assert!(!result.success);
    }

    #[test]
    fn result_serializes_to_the_contract_shape() {
        let tracks = vec![
            track_with_path(1, BallColor::White, &moving_path(500.0, 900.0, 2, 20, 20.0), true),
            track_with_path(2, BallColor::Red, &moving_path(500.0, 1400.0, 12, 10, 20.0), false),
        ];

        let result = analyze(&tracks, Pocket::BottomLeft).expect("result");
        let json = serde_json::to_value(&result).expect("json");

        assert!(json["distance"].is_f64());
        assert!(json["angle"].is_f64());
        assert_eq!(json["first_ball_color"], "WHITE");
        assert_eq!(json["second_ball_color"], "RED");
        assert!(json["success"].is_boolean());
        assert!(json["ball_paths"]["first"].is_array());
        assert!(json["ball_paths"]["second"].is_array());
    }
}
