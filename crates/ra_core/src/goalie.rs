//! Goalie shot-against extraction.
//!
//! Classifies every on-goal attempt faced by a named goalie (empty-net
//! events carry no goalie id and are excluded) and assembles per-game
//! records. Season-level splits and rates live in the season module and
//! are always recomputed from these raw entries.

use log::warn;

use crate::config::DetectorWindows;
use crate::models::{
    AngleTier, CatchHand, DangerTier, Decision, GameLog, GoalieGameRecord, PlayerId, RinkSide,
    ShotAgainst, ShotRecord, ShotSide,
};
use crate::patterns::{PatternDetector, StrengthTracker};

/// Catch-hand source seam; the engine passes its process-lifetime cache.
pub trait CatchHandLookup {
    fn catches(&self, goalie: PlayerId) -> Option<CatchHand>;
}

/// Glove/blocker classification from the raw (untransformed) lateral
/// coordinate: a left-catching goalie defending the right end has the
/// glove on the positive-y side; defending the left end inverts the
/// comparison.
pub fn shot_side(raw_y: f64, catches: CatchHand, goalie_defends: RinkSide) -> ShotSide {
    let glove_on_positive_y = catches == CatchHand::Left;
    let base = (raw_y > 0.0) == glove_on_positive_y;
    let glove = match goalie_defends {
        RinkSide::Right => base,
        RinkSide::Left => !base,
    };
    if glove {
        ShotSide::Glove
    } else {
        ShotSide::Blocker
    }
}

fn danger_tier(shot: &ShotRecord) -> DangerTier {
    match shot.geometry {
        Some(g) if g.high_danger => DangerTier::High,
        Some(g) if g.slot => DangerTier::Medium,
        _ => DangerTier::Low,
    }
}

fn angle_tier(shot: &ShotRecord, windows: &DetectorWindows) -> AngleTier {
    match shot.geometry {
        Some(g) if g.off_center_deg <= windows.goalie_center_angle_deg => AngleTier::Center,
        Some(_) => AngleTier::Acute,
        // No coordinates: a straight-on default keeps the shot counted
        None => AngleTier::Center,
    }
}

/// Build the per-goalie records for one game. Goalies who faced no
/// qualifying shot produce no record.
pub fn extract_goalie_records(
    log: &GameLog,
    shots: &[ShotRecord],
    strength: &StrengthTracker,
    lookup: &dyn CatchHandLookup,
    windows: &DetectorWindows,
) -> Vec<GoalieGameRecord> {
    let detector = PatternDetector::new(&log.events, windows);
    let game_secs = log.events.last().map(|e| e.clock_secs).unwrap_or(0);
    let mut records: Vec<GoalieGameRecord> = Vec::new();

    for shot in shots {
        if !shot.outcome.reached_goalie() {
            continue;
        }
        let Some(goalie) = shot.goalie else {
            // Empty net: nobody to credit the shot against
            continue;
        };
        let goalie_team = log.opponent_of(shot.team);
        let side = match (log.events.get(shot.event_idx).and_then(|e| e.coords), lookup.catches(goalie)) {
            (Some((_, raw_y)), Some(catches)) => {
                shot_side(raw_y, catches, log.defending_side(goalie_team, shot.period))
            }
            (_, None) => {
                warn!("no catch-hand metadata for goalie {}, side unknown", goalie);
                ShotSide::Unknown
            }
            (None, _) => ShotSide::Unknown,
        };

        let entry = ShotAgainst {
            event_idx: shot.event_idx,
            shooter_team: shot.team,
            clock_secs: shot.clock_secs,
            danger: danger_tier(shot),
            angle: angle_tier(shot, windows),
            side,
            situation: strength.situation(goalie_team, shot.clock_secs),
            shot_type: shot.shot_type.clone(),
            rebound: detector.is_rebound_against(shot.event_idx, goalie),
            xg: shot.xg,
            outcome: shot.outcome,
        };

        match records.iter_mut().find(|r| r.goalie == goalie) {
            Some(record) => record.shots.push(entry),
            None => records.push(GoalieGameRecord {
                goalie,
                team: goalie_team,
                opponent: shot.team,
                opponent_abbrev: log.abbrev_of(shot.team).to_string(),
                game_id: log.game_id,
                is_home: log.is_home(goalie_team),
                game_secs,
                shots: vec![entry],
                decision: None,
            }),
        }
    }

    assign_decisions(&mut records, log);
    records
}

/// W to the winning side's busiest goalie, L/OTL to the losing side's.
fn assign_decisions(records: &mut [GoalieGameRecord], log: &GameLog) {
    let Some(winner) = log.winner() else { return };
    let loser = log.opponent_of(winner);
    let past_regulation = log.went_past_regulation();

    for team in [winner, loser] {
        let busiest = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.team == team)
            .max_by_key(|(_, r)| (r.shots.len(), std::cmp::Reverse(r.goalie)))
            .map(|(i, _)| i);
        if let Some(i) = busiest {
            records[i].decision = Some(if team == winner {
                Decision::Win
            } else if past_regulation {
                Decision::OvertimeLoss
            } else {
                Decision::Loss
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::build_shot_records;
    use crate::models::{EventKind, GameEvent, TeamInfo, Zone};
    use crate::quality::ShotQuality;

    struct FixedHands;

    impl CatchHandLookup for FixedHands {
        fn catches(&self, goalie: PlayerId) -> Option<CatchHand> {
            match goalie {
                31 => Some(CatchHand::Left),
                35 => Some(CatchHand::Right),
                _ => None,
            }
        }
    }

    const HOME: u32 = 1;
    const AWAY: u32 = 2;

    fn make_log(events: Vec<GameEvent>) -> GameLog {
        GameLog {
            game_id: 2024020100,
            home: TeamInfo::new(HOME, "BOS", 2),
            away: TeamInfo::new(AWAY, "NYR", 1),
            events,
            home_defends: vec![RinkSide::Right, RinkSide::Left, RinkSide::Right],
        }
    }

    fn derive_shots(log: &GameLog) -> Vec<ShotRecord> {
        let config = EngineConfig::default();
        build_shot_records(log, &ShotQuality::new(config.xg.clone()), &config.windows)
    }

    #[test]
    fn test_no_record_for_goalie_with_zero_shots() {
        // Only an empty-net attempt (no goalie id) and a missed shot
        let events = vec![
            GameEvent::shot(0, EventKind::ShotOnGoal, HOME, 1, 100, (-80.0, 0.0), Zone::Offensive),
            GameEvent::shot(1, EventKind::MissedShot, AWAY, 1, 200, (80.0, 5.0), Zone::Offensive)
                .with_goalie(31),
        ];
        let log = make_log(events);
        let shots = derive_shots(&log);
        let strength = StrengthTracker::from_events(&log.events);
        let windows = EngineConfig::default().windows;
        let records = extract_goalie_records(&log, &shots, &strength, &FixedHands, &windows);
        assert!(records.is_empty(), "empty-net and missed shots produce no goalie record");
    }

    #[test]
    fn test_glove_side_orientation() {
        // Home defends Right in period 1, so the away shooter attacks the
        // home net at the right end. Goalie 31 catches Left: glove is the
        // positive-y side.
        assert_eq!(shot_side(10.0, CatchHand::Left, RinkSide::Right), ShotSide::Glove);
        assert_eq!(shot_side(-10.0, CatchHand::Left, RinkSide::Right), ShotSide::Blocker);
        // Defending the left end inverts the comparison
        assert_eq!(shot_side(10.0, CatchHand::Left, RinkSide::Left), ShotSide::Blocker);
        // A right-catching goalie mirrors the left-catcher
        assert_eq!(shot_side(10.0, CatchHand::Right, RinkSide::Right), ShotSide::Blocker);
    }

    #[test]
    fn test_records_and_decisions() {
        let events = vec![
            // Home defends the right end in period 1, so away attacks the
            // right net: away shots sit at positive raw x.
            GameEvent::shot(0, EventKind::ShotOnGoal, AWAY, 1, 100, (85.0, 2.0), Zone::Offensive)
                .with_shot_type("wrist")
                .with_goalie(31),
            GameEvent::shot(1, EventKind::Goal, AWAY, 1, 800, (80.0, -5.0), Zone::Offensive)
                .with_shot_type("snap")
                .with_goalie(31),
            // Home shoots on away goalie 35
            GameEvent::shot(2, EventKind::ShotOnGoal, HOME, 2, 1500, (-78.0, 3.0), Zone::Offensive)
                .with_shot_type("slap")
                .with_goalie(35),
        ];
        let log = make_log(events);
        let shots = derive_shots(&log);
        let strength = StrengthTracker::from_events(&log.events);
        let windows = EngineConfig::default().windows;
        let records = extract_goalie_records(&log, &shots, &strength, &FixedHands, &windows);

        assert_eq!(records.len(), 2);
        let home_goalie = records.iter().find(|r| r.goalie == 31).unwrap();
        assert_eq!(home_goalie.team, HOME);
        assert_eq!(home_goalie.shots_faced(), 2);
        assert_eq!(home_goalie.goals_against(), 1);
        assert_eq!(home_goalie.saves(), 1);
        // Home won 2-1 in regulation: W for the home goalie, L for away
        assert_eq!(home_goalie.decision, Some(Decision::Win));
        let away_goalie = records.iter().find(|r| r.goalie == 35).unwrap();
        assert_eq!(away_goalie.decision, Some(Decision::Loss));
        assert_eq!(away_goalie.opponent_abbrev, "BOS");
    }

    #[test]
    fn test_danger_and_angle_tiers() {
        let events = vec![
            // Doorstep: high danger, center look
            GameEvent::shot(0, EventKind::ShotOnGoal, AWAY, 1, 100, (86.0, 1.0), Zone::Offensive)
                .with_goalie(31),
            // Sharp angle from wide of the post
            GameEvent::shot(1, EventKind::ShotOnGoal, AWAY, 1, 300, (80.0, 30.0), Zone::Offensive)
                .with_goalie(31),
        ];
        let log = make_log(events);
        let shots = derive_shots(&log);
        let strength = StrengthTracker::from_events(&log.events);
        let windows = EngineConfig::default().windows;
        let records = extract_goalie_records(&log, &shots, &strength, &FixedHands, &windows);
        let record = &records[0];
        assert_eq!(record.shots[0].danger, DangerTier::High);
        assert_eq!(record.shots[0].angle, AngleTier::Center);
        assert_eq!(record.shots[1].danger, DangerTier::Low);
        assert_eq!(record.shots[1].angle, AngleTier::Acute);
    }
}
