//! Rink geometry and zone transforms.
//!
//! Stateless pure functions over one standard rink. Raw play-by-play
//! coordinates are centered at the rink midpoint; every distance/angle/
//! danger computation happens in the attacking frame, where the shooting
//! team always attacks toward positive x.

use crate::models::RinkSide;

/// Rink dimension constants (feet).
pub mod dims {
    /// Rink length, boards to boards
    pub const LENGTH_FT: f64 = 200.0;
    /// Rink width
    pub const WIDTH_FT: f64 = 85.0;
    /// Half width (board y)
    pub const HALF_WIDTH_FT: f64 = 42.5;
    /// Goal line distance from center ice
    pub const GOAL_LINE_X: f64 = 89.0;
    /// Blue line distance from center ice
    pub const BLUE_LINE_X: f64 = 25.0;
    /// Half the 6-ft goal mouth (post y)
    pub const GOAL_HALF_MOUTH_FT: f64 = 3.0;
    /// End-zone faceoff dot lateral offset
    pub const FACEOFF_DOT_Y: f64 = 22.0;
    /// End-zone faceoff dots sit this far above the goal line
    pub const FACEOFF_DOT_DEPTH_FT: f64 = 20.0;
    /// Outer radius of the high-danger area
    pub const HIGH_DANGER_RADIUS_FT: f64 = 29.0;
    /// Slot depth above the goal line
    pub const SLOT_DEPTH_FT: f64 = 20.0;
    /// Slot lateral half width
    pub const SLOT_HALF_WIDTH_FT: f64 = 22.0;
}

/// Reinterpret raw coordinates so the attack direction is toward positive x.
/// A team defending the right end attacks the left goal; the 180° flip puts
/// that goal at x = +89.
pub fn to_attacking_frame(x: f64, y: f64, defending_right: bool) -> (f64, f64) {
    if defending_right {
        (-x, -y)
    } else {
        (x, y)
    }
}

pub fn defends_right(side: RinkSide) -> bool {
    side == RinkSide::Right
}

/// Distance to the goal-mouth center, attacking frame.
pub fn distance_to_goal(x: f64, y: f64) -> f64 {
    let dx = dims::GOAL_LINE_X - x;
    (dx * dx + y * y).sqrt()
}

/// Angle subtended by the 6-ft goal mouth, via the law of cosines on the
/// distances to both posts. The cosine argument is clamped to [-1, 1]
/// before the inverse cosine; out-of-range trig inputs are a clamp, never
/// an error. Degrees.
pub fn goal_mouth_angle_deg(x: f64, y: f64) -> f64 {
    let dx = dims::GOAL_LINE_X - x;
    let to_near = (dx * dx + (y - dims::GOAL_HALF_MOUTH_FT).powi(2)).sqrt();
    let to_far = (dx * dx + (y + dims::GOAL_HALF_MOUTH_FT).powi(2)).sqrt();
    if to_near < f64::EPSILON || to_far < f64::EPSILON {
        // Standing on a post: the mouth subtends no usable angle
        return 0.0;
    }
    let mouth = 2.0 * dims::GOAL_HALF_MOUTH_FT;
    let cos_arg =
        ((to_near * to_near + to_far * to_far - mouth * mouth) / (2.0 * to_near * to_far))
            .clamp(-1.0, 1.0);
    cos_arg.acos().to_degrees()
}

/// Angular deviation from a clean look at the goal mouth: zero while the
/// shooter is laterally between the posts, otherwise measured from the
/// nearer post. This is the angle the shot-quality multiplier and the
/// goalie angle tier consume. Degrees.
pub fn off_center_angle_deg(x: f64, y: f64) -> f64 {
    let lateral = y.abs() - dims::GOAL_HALF_MOUTH_FT;
    if lateral <= 0.0 {
        return 0.0;
    }
    let dx = dims::GOAL_LINE_X - x;
    if dx <= 0.0 {
        // At or behind the goal line with lateral offset: fully acute
        return 90.0;
    }
    lateral.atan2(dx).to_degrees()
}

/// Lateral high-danger bound at a given depth above the goal line: ±11 ft
/// at the goal line widening linearly to ±22 ft at the faceoff-dot line,
/// constant beyond.
fn high_danger_lateral_bound(depth_ft: f64) -> f64 {
    let t = (depth_ft / dims::FACEOFF_DOT_DEPTH_FT).clamp(0.0, 1.0);
    dims::FACEOFF_DOT_Y / 2.0 + (dims::FACEOFF_DOT_Y - dims::FACEOFF_DOT_Y / 2.0) * t
}

/// Composite high-danger test, attacking frame. A shot from behind the
/// goal line is never high danger.
pub fn is_high_danger(x: f64, y: f64) -> bool {
    if x > dims::GOAL_LINE_X {
        return false;
    }
    let dist = distance_to_goal(x, y);
    let depth = dims::GOAL_LINE_X - x;

    let narrowing_band =
        dist <= dims::HIGH_DANGER_RADIUS_FT && y.abs() <= high_danger_lateral_bound(depth);
    let core_slot = dist <= 15.0 && y.abs() <= 8.0;
    let main_slot = dist <= 20.0 && y.abs() <= 12.0;

    narrowing_band || core_slot || main_slot
}

/// Stricter inner test used by the goalie and blocking metrics: within the
/// slot depth of the goal line, inside the faceoff dots.
pub fn is_slot(x: f64, y: f64) -> bool {
    let depth = dims::GOAL_LINE_X - x;
    (0.0..=dims::SLOT_DEPTH_FT).contains(&depth) && y.abs() <= dims::SLOT_HALF_WIDTH_FT
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_attacking_frame_flip() {
        assert_eq!(to_attacking_frame(-80.0, 10.0, false), (-80.0, 10.0));
        assert_eq!(to_attacking_frame(-80.0, 10.0, true), (80.0, -10.0));
    }

    #[test]
    fn test_distance_worked_example() {
        // Raw (85, 2) already in the attacking frame: sqrt(4^2 + 2^2)
        let d = distance_to_goal(85.0, 2.0);
        assert!((d - 4.4721).abs() < 1e-3, "distance was {}", d);
    }

    #[test]
    fn test_goal_mouth_angle_wider_up_close() {
        let close = goal_mouth_angle_deg(85.0, 0.0);
        let far = goal_mouth_angle_deg(50.0, 0.0);
        assert!(close > far, "close {} should subtend more than far {}", close, far);
        // On a post: degenerate, clamps to zero
        assert_eq!(goal_mouth_angle_deg(89.0, 3.0), 0.0);
    }

    #[test]
    fn test_off_center_angle() {
        // Between the posts: clean look
        assert_eq!(off_center_angle_deg(85.0, 2.0), 0.0);
        // Wide of the post
        let sharp = off_center_angle_deg(85.0, 20.0);
        assert!(sharp > 45.0, "sharp-angle shot was {}", sharp);
        // Behind the goal line with lateral offset
        assert_eq!(off_center_angle_deg(92.0, 10.0), 90.0);
    }

    #[test]
    fn test_high_danger_examples() {
        assert!(is_high_danger(85.0, 2.0), "doorstep shot");
        assert!(is_high_danger(70.0, 10.0), "top of the slot");
        assert!(!is_high_danger(55.0, 0.0), "point shot");
        assert!(!is_high_danger(75.0, 30.0), "boards-side shot");
        assert!(!is_high_danger(92.0, 1.0), "behind the net");
    }

    #[test]
    fn test_slot() {
        assert!(is_slot(75.0, 15.0));
        assert!(!is_slot(60.0, 0.0), "too far out");
        assert!(!is_slot(92.0, 0.0), "behind the goal line");
    }

    proptest! {
        #[test]
        fn prop_high_danger_implies_within_radius(
            x in -100.0f64..100.0,
            y in -42.5f64..42.5,
        ) {
            if is_high_danger(x, y) {
                prop_assert!(distance_to_goal(x, y) <= dims::HIGH_DANGER_RADIUS_FT + 1e-9);
            }
        }

        #[test]
        fn prop_angles_are_finite_over_the_rink(
            x in -100.0f64..100.0,
            y in -42.5f64..42.5,
        ) {
            let a = goal_mouth_angle_deg(x, y);
            prop_assert!(a.is_finite() && (0.0..=180.0).contains(&a));
            let o = off_center_angle_deg(x, y);
            prop_assert!(o.is_finite() && (0.0..=90.0).contains(&o));
        }
    }
}
