//! Deterministic shot-quality scoring.
//!
//! The expected-goal value is a fixed, auditable product of looked-up
//! factors: distance bucket × zone × shot type × outcome × angle, capped.
//! No randomness and no learned parameters; identical inputs always
//! produce the identical bit pattern.

use crate::config::XgWeights;
use crate::models::{ShotOutcome, Zone};
use crate::rink;

/// Everything the scorer needs about one attempt, already in the
/// attacking frame.
#[derive(Debug, Clone, Copy)]
pub struct ShotContext<'a> {
    pub x: f64,
    pub y: f64,
    /// Zone relative to the shooting team; inferred from x when absent
    pub zone: Option<Zone>,
    pub shot_type: Option<&'a str>,
    pub outcome: ShotOutcome,
}

#[derive(Debug, Clone)]
pub struct ShotQuality {
    weights: XgWeights,
}

impl ShotQuality {
    pub fn new(weights: XgWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &XgWeights {
        &self.weights
    }

    /// Expected-goal value in [0, cap].
    pub fn score(&self, ctx: ShotContext<'_>) -> f64 {
        let w = &self.weights;
        let dist = rink::distance_to_goal(ctx.x, ctx.y);

        let base = w
            .dist_buckets
            .iter()
            .find(|(bound, _)| dist <= *bound)
            .map(|(_, value)| *value)
            .unwrap_or(w.dist_floor);

        let zone = ctx.zone.unwrap_or_else(|| infer_zone(ctx.x));
        let zone_mult = if rink::is_high_danger(ctx.x, ctx.y) {
            w.zone_high_danger
        } else {
            match zone {
                Zone::Offensive => {
                    if dist <= w.good_position_dist && ctx.y.abs() < w.good_position_lateral {
                        w.zone_good_position
                    } else {
                        w.zone_offensive
                    }
                }
                Zone::Neutral => w.zone_neutral,
                Zone::Defensive => w.zone_defensive,
            }
        };

        let type_mult = self.shot_type_multiplier(ctx.shot_type);

        let outcome_mult = match ctx.outcome {
            ShotOutcome::OnGoal | ShotOutcome::Goal => 1.0,
            ShotOutcome::Missed => w.outcome_missed,
            ShotOutcome::Blocked => w.outcome_blocked,
        };

        let off_center = rink::off_center_angle_deg(ctx.x, ctx.y);
        let angle_mult = w
            .angle_tiers
            .iter()
            .find(|(bound, _)| off_center > *bound)
            .map(|(_, mult)| *mult)
            .unwrap_or(1.0);

        (base * zone_mult * type_mult * outcome_mult * angle_mult).min(w.cap)
    }

    fn shot_type_multiplier(&self, shot_type: Option<&str>) -> f64 {
        let w = &self.weights;
        let Some(raw) = shot_type else { return 1.0 };
        let label = raw.to_ascii_lowercase();
        if label.contains("tip") || label.contains("deflect") || label.contains("backhand") {
            w.type_tip
        } else if label.contains("wrap") {
            w.type_wrap
        } else if label.contains("one-timer") || label.contains("one timer") {
            w.type_one_timer
        } else if label.contains("slap") {
            w.type_slap
        } else {
            // wrist, snap and anything unrecognized
            1.0
        }
    }
}

/// Fallback zone from the attacking-frame x when the feed dropped the
/// zone code (a missing field yields a neutral classification, never a
/// discarded shot).
fn infer_zone(x: f64) -> Zone {
    if x >= rink::dims::BLUE_LINE_X {
        Zone::Offensive
    } else if x <= -rink::dims::BLUE_LINE_X {
        Zone::Defensive
    } else {
        Zone::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::XgWeights;
    use proptest::prelude::*;

    fn scorer() -> ShotQuality {
        ShotQuality::new(XgWeights::default())
    }

    #[test]
    fn test_worked_example() {
        // Raw (85, 2), zone O, wrist, goal: distance ~4.47 ft, high danger,
        // base 0.25 x zone 1.5 x type 1.0 x outcome 1.0 x angle 1.0
        let xg = scorer().score(ShotContext {
            x: 85.0,
            y: 2.0,
            zone: Some(Zone::Offensive),
            shot_type: Some("wrist"),
            outcome: ShotOutcome::Goal,
        });
        assert!((xg - 0.375).abs() < 1e-9, "worked example xg was {}", xg);
    }

    #[test]
    fn test_outcome_discounts() {
        let at = |outcome| {
            scorer().score(ShotContext {
                x: 70.0,
                y: 0.0,
                zone: Some(Zone::Offensive),
                shot_type: Some("wrist"),
                outcome,
            })
        };
        let on_goal = at(ShotOutcome::OnGoal);
        assert!((at(ShotOutcome::Missed) - on_goal * 0.7).abs() < 1e-12);
        assert!((at(ShotOutcome::Blocked) - on_goal * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sharp_angle_discount() {
        let center = scorer().score(ShotContext {
            x: 80.0,
            y: 0.0,
            zone: Some(Zone::Offensive),
            shot_type: None,
            outcome: ShotOutcome::OnGoal,
        });
        let sharp = scorer().score(ShotContext {
            x: 80.0,
            y: 30.0,
            zone: Some(Zone::Offensive),
            shot_type: None,
            outcome: ShotOutcome::OnGoal,
        });
        assert!(sharp < center, "sharp {} should score under center {}", sharp, center);
    }

    #[test]
    fn test_shot_type_table() {
        let q = scorer();
        assert!((q.shot_type_multiplier(Some("Tip-In")) - 1.3).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("Deflected")) - 1.3).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("Backhand")) - 1.3).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("Wrap-around")) - 1.1).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("One-timer")) - 1.2).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("Slap")) - 0.9).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("Wrist")) - 1.0).abs() < 1e-12);
        assert!((q.shot_type_multiplier(Some("Bat")) - 1.0).abs() < 1e-12);
        assert!((q.shot_type_multiplier(None) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_defensive_zone_heave() {
        let xg = scorer().score(ShotContext {
            x: -60.0,
            y: 0.0,
            zone: Some(Zone::Defensive),
            shot_type: Some("slap"),
            outcome: ShotOutcome::OnGoal,
        });
        // floor base x defensive zone x slap
        assert!((xg - 0.02 * 0.1 * 0.9).abs() < 1e-12, "heave xg was {}", xg);
    }

    #[test]
    fn test_determinism() {
        let ctx = ShotContext {
            x: 72.5,
            y: -11.25,
            zone: Some(Zone::Offensive),
            shot_type: Some("snap"),
            outcome: ShotOutcome::OnGoal,
        };
        let a = scorer().score(ctx);
        let b = scorer().score(ctx);
        assert_eq!(a.to_bits(), b.to_bits(), "identical inputs must be bit-identical");
    }

    proptest! {
        #[test]
        fn prop_xg_bounded(
            x in -100.0f64..100.0,
            y in -42.5f64..42.5,
            zone_pick in 0u8..4,
            type_pick in 0usize..7,
            outcome_pick in 0u8..4,
        ) {
            let zone = match zone_pick {
                0 => Some(Zone::Offensive),
                1 => Some(Zone::Neutral),
                2 => Some(Zone::Defensive),
                _ => None,
            };
            let shot_type = ["wrist", "snap", "slap", "backhand", "tip-in", "wrap-around", "one-timer"]
                .get(type_pick)
                .copied();
            let outcome = match outcome_pick {
                0 => ShotOutcome::OnGoal,
                1 => ShotOutcome::Goal,
                2 => ShotOutcome::Missed,
                _ => ShotOutcome::Blocked,
            };
            let xg = scorer().score(ShotContext { x, y, zone, shot_type, outcome });
            prop_assert!((0.0..=0.95).contains(&xg), "xg out of range: {}", xg);
        }
    }
}
