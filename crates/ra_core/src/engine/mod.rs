//! Per-game derivation.
//!
//! `GameProcessor` turns one validated game log into the derived metric
//! bundle the season accumulator merges: classified shot records, team
//! counters, goalie records, and best-effort goal routes. Metric groups
//! fail in isolation - a broken group substitutes its zero default and
//! the rest of the game survives.

mod batch;

pub use batch::{BatchOutcome, BatchReport, BatchRunner};

use log::{debug, warn};

use crate::cluster::GoalRoute;
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::goalie::{extract_goalie_records, CatchHandLookup};
use crate::models::{
    EventKind, GameId, GameLog, GoalieGameRecord, ShotGeometry, ShotOutcome, ShotRecord,
    TeamGameMetrics, Zone,
};
use crate::patterns::{
    classify_entry, is_forecheck_takeaway, PatternDetector, StrengthTracker, TrackingFrame,
    PUCK_ENTITY,
};
use crate::quality::{ShotContext, ShotQuality};
use crate::rink;
use crate::sources::TrackingClient;

/// Everything derived from one game, ready for a single accumulator merge.
#[derive(Debug, Clone)]
pub struct GameDerived {
    pub game_id: GameId,
    pub past_regulation: bool,
    /// Per-team metrics paired with the team abbreviation
    pub teams: Vec<(TeamGameMetrics, String)>,
    pub goalies: Vec<GoalieGameRecord>,
    /// Goal routes for the clusterer; empty when no tracking is wired
    pub routes: Vec<GoalRoute>,
}

/// Build the immutable shot records for one game: geometry, quality score
/// and the three independent pattern flags per attempt. A shot without
/// coordinates keeps a neutral zero classification instead of sinking the
/// game.
pub fn build_shot_records(
    log: &GameLog,
    quality: &ShotQuality,
    windows: &crate::config::DetectorWindows,
) -> Vec<ShotRecord> {
    let detector = PatternDetector::new(&log.events, windows);
    log.events
        .iter()
        .filter_map(|ev| {
            let outcome = ShotOutcome::from_kind(ev.kind)?;
            let Some(team) = ev.team else {
                debug!(
                    "game {}: {}; shot skipped",
                    log.game_id,
                    AnalyticsError::MissingField { idx: ev.idx, field: "team" }
                );
                return None;
            };

            let geometry = match ev.coords {
                Some((raw_x, raw_y)) => {
                    let defending = log.defending_side(team, ev.period);
                    let (x, y) =
                        rink::to_attacking_frame(raw_x, raw_y, rink::defends_right(defending));
                    Some(ShotGeometry {
                        x,
                        y,
                        distance_ft: rink::distance_to_goal(x, y),
                        angle_deg: rink::goal_mouth_angle_deg(x, y),
                        off_center_deg: rink::off_center_angle_deg(x, y),
                        high_danger: rink::is_high_danger(x, y),
                        slot: rink::is_slot(x, y),
                    })
                }
                None => {
                    debug!(
                        "game {}: {}; neutral classification",
                        log.game_id,
                        AnalyticsError::MissingField { idx: ev.idx, field: "coordinates" }
                    );
                    None
                }
            };

            let xg = geometry
                .map(|g| {
                    quality.score(ShotContext {
                        x: g.x,
                        y: g.y,
                        zone: ev.zone,
                        shot_type: ev.shot_type.as_deref(),
                        outcome,
                    })
                })
                .unwrap_or(0.0);

            Some(ShotRecord {
                event_idx: ev.idx,
                team,
                shooter: ev.shooter,
                goalie: ev.goalie,
                period: ev.period,
                clock_secs: ev.clock_secs,
                outcome,
                shot_type: ev.shot_type.clone(),
                geometry,
                xg,
                rush: detector.is_rush(ev.idx),
                cycle: detector.is_cycle(ev.idx),
                rebound: detector.is_rebound(ev.idx),
            })
        })
        .collect()
}

/// Run one metric group, substituting the documented default on failure.
fn metric_group<T>(
    game_id: GameId,
    name: &str,
    default: T,
    group: impl FnOnce() -> Result<T, AnalyticsError>,
) -> T {
    match group() {
        Ok(value) => value,
        Err(e) => {
            warn!("game {}: {} metrics failed, substituting defaults: {}", game_id, name, e);
            default
        }
    }
}

pub struct GameProcessor<'a> {
    config: &'a EngineConfig,
    quality: ShotQuality,
    metadata: &'a dyn CatchHandLookup,
    tracking: Option<&'a TrackingClient>,
}

impl<'a> GameProcessor<'a> {
    pub fn new(
        config: &'a EngineConfig,
        metadata: &'a dyn CatchHandLookup,
        tracking: Option<&'a TrackingClient>,
    ) -> Self {
        Self { config, quality: ShotQuality::new(config.xg.clone()), metadata, tracking }
    }

    /// Derive the full metric bundle for one game.
    pub fn derive(&self, log: &GameLog) -> GameDerived {
        let shots = build_shot_records(log, &self.quality, &self.config.windows);
        let strength = StrengthTracker::from_events(&log.events);

        let mut home = TeamGameMetrics::new(log.game_id, log.home.id, log.away.id, true);
        let mut away = TeamGameMetrics::new(log.game_id, log.away.id, log.home.id, false);
        count_shots(&shots, &mut home, &mut away);
        count_events(log, &mut home, &mut away);

        let goalies = extract_goalie_records(
            log,
            &shots,
            &strength,
            self.metadata,
            &self.config.windows,
        );

        // Tracking-backed metrics are best-effort: a dead feed degrades to
        // empty routes / no entry counts, never a failed game.
        let routes = metric_group(log.game_id, "goal-route", Vec::new(), || {
            self.goal_routes(log, &mut home, &mut away)
        });

        GameDerived {
            game_id: log.game_id,
            past_regulation: log.went_past_regulation(),
            teams: vec![
                (home, log.home.abbrev.clone()),
                (away, log.away.abbrev.clone()),
            ],
            goalies,
            routes,
        }
    }

    /// Fetch tracking for every goal, classify the entry that led to it
    /// and extract the puck path for clustering.
    fn goal_routes(
        &self,
        log: &GameLog,
        home: &mut TeamGameMetrics,
        away: &mut TeamGameMetrics,
    ) -> Result<Vec<GoalRoute>, AnalyticsError> {
        let Some(tracking) = self.tracking else { return Ok(Vec::new()) };
        let mut routes = Vec::new();

        for ev in &log.events {
            if ev.kind != EventKind::Goal {
                continue;
            }
            let Some(team) = ev.team else { continue };
            let frames = tracking.frames(log.game_id, ev.idx)?;
            if frames.is_empty() {
                continue;
            }

            let defending = log.defending_side(team, ev.period);
            let flip = rink::defends_right(defending);
            let oriented: Vec<TrackingFrame> = frames
                .iter()
                .map(|f| TrackingFrame {
                    entities: f
                        .entities
                        .iter()
                        .map(|(&id, &(x, y))| (id, rink::to_attacking_frame(x, y, flip)))
                        .collect(),
                })
                .collect();

            let roster =
                if log.is_home(team) { &log.home.roster } else { &log.away.roster };
            if let Some(kind) = classify_entry(&oriented, roster, &self.config.windows) {
                let metrics = if log.is_home(team) { &mut *home } else { &mut *away };
                metrics.record_entry(kind);
            }

            let points: Vec<(f64, f64)> =
                oriented.iter().filter_map(|f| f.entities.get(&PUCK_ENTITY).copied()).collect();
            if !points.is_empty() {
                routes.push(GoalRoute { game_id: log.game_id, event_idx: ev.idx, points });
            }
        }
        Ok(routes)
    }
}

/// Fold shot records into both teams' counters.
fn count_shots(shots: &[ShotRecord], home: &mut TeamGameMetrics, away: &mut TeamGameMetrics) {
    for shot in shots {
        let (for_side, against_side) =
            if shot.team == home.team { (&mut *home, &mut *away) } else { (&mut *away, &mut *home) };

        for_side.attempts_for += 1;
        against_side.attempts_against += 1;
        for_side.xg_for += shot.xg;
        against_side.xg_against += shot.xg;
        if shot.outcome.reached_goalie() {
            for_side.shots_for += 1;
            against_side.shots_against += 1;
        }
        if shot.outcome == ShotOutcome::Goal {
            for_side.goals_for += 1;
            against_side.goals_against += 1;
        }
        if shot.is_high_danger() {
            for_side.high_danger_for += 1;
            against_side.high_danger_against += 1;
        }
        if shot.rush {
            for_side.rush_shots += 1;
        }
        if shot.cycle {
            for_side.cycle_shots += 1;
        }
        if shot.rebound {
            for_side.rebound_shots += 1;
        }
    }
}

/// Fold turnover and faceoff events into both teams' counters.
fn count_events(log: &GameLog, home: &mut TeamGameMetrics, away: &mut TeamGameMetrics) {
    for ev in &log.events {
        let Some(team) = ev.team else { continue };
        match ev.kind {
            EventKind::Giveaway => {
                let own = if team == home.team { &mut *home } else { &mut *away };
                match ev.zone {
                    Some(Zone::Defensive) => own.giveaways_defensive += 1,
                    Some(Zone::Neutral) => own.giveaways_neutral += 1,
                    Some(Zone::Offensive) => own.giveaways_offensive += 1,
                    None => {}
                }
            }
            EventKind::Takeaway => {
                let own = if team == home.team { &mut *home } else { &mut *away };
                if is_forecheck_takeaway(ev) {
                    own.forecheck_takeaways += 1;
                }
                match ev.zone {
                    Some(Zone::Defensive) => own.takeaways_defensive += 1,
                    Some(Zone::Neutral) => own.takeaways_neutral += 1,
                    Some(Zone::Offensive) => own.takeaways_offensive += 1,
                    None => {}
                }
            }
            EventKind::Faceoff => {
                home.faceoffs_taken += 1;
                away.faceoffs_taken += 1;
                if team == home.team {
                    home.faceoff_wins += 1;
                } else {
                    away.faceoff_wins += 1;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatchHand, GameEvent, PlayerId, RinkSide, TeamInfo};

    struct NoHands;

    impl CatchHandLookup for NoHands {
        fn catches(&self, _goalie: PlayerId) -> Option<CatchHand> {
            None
        }
    }

    const HOME: u32 = 1;
    const AWAY: u32 = 2;

    fn make_log(events: Vec<GameEvent>) -> GameLog {
        GameLog {
            game_id: 2024020555,
            home: TeamInfo::new(HOME, "BOS", 1),
            away: TeamInfo::new(AWAY, "NYR", 0),
            events,
            // Home defends left: home attacks right, raw == attacking frame
            home_defends: vec![RinkSide::Left, RinkSide::Right, RinkSide::Left],
        }
    }

    #[test]
    fn test_worked_example_flows_into_metrics() {
        let events = vec![
            GameEvent::shot(0, EventKind::Goal, HOME, 1, 600, (85.0, 2.0), Zone::Offensive)
                .with_shot_type("wrist")
                .with_goalie(35),
        ];
        let log = make_log(events);
        let config = EngineConfig::default();
        let processor = GameProcessor::new(&config, &NoHands, None);
        let derived = processor.derive(&log);

        let (home, _) = &derived.teams[0];
        assert_eq!(home.goals_for, 1);
        assert_eq!(home.shots_for, 1);
        assert_eq!(home.attempts_for, 1);
        assert_eq!(home.high_danger_for, 1);
        assert!((home.xg_for - 0.375).abs() < 1e-9, "xg_for was {}", home.xg_for);
        let (away, _) = &derived.teams[1];
        assert_eq!(away.goals_against, 1);
        assert!((away.xg_against - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_missing_coordinates_scores_neutral_zero() {
        let mut ev = GameEvent::shot(0, EventKind::ShotOnGoal, HOME, 1, 100, (80.0, 0.0), Zone::Offensive);
        ev.coords = None;
        let log = make_log(vec![ev]);
        let config = EngineConfig::default();
        let shots = build_shot_records(&log, &ShotQuality::new(config.xg.clone()), &config.windows);

        assert_eq!(shots.len(), 1, "the shot is kept, not discarded");
        assert_eq!(shots[0].xg, 0.0);
        assert!(shots[0].geometry.is_none());
        assert!(!shots[0].is_high_danger());
    }

    #[test]
    fn test_pattern_flags_are_independent() {
        // Rebound chain that is also inside a long offensive-zone hold
        let events = vec![
            GameEvent::turnover(0, EventKind::Takeaway, HOME, 1, 85, Zone::Offensive),
            GameEvent::shot(1, EventKind::ShotOnGoal, HOME, 1, 98, (75.0, 5.0), Zone::Offensive),
            GameEvent::shot(2, EventKind::ShotOnGoal, HOME, 1, 100, (83.0, 1.0), Zone::Offensive),
        ];
        let log = make_log(events);
        let config = EngineConfig::default();
        let shots = build_shot_records(&log, &ShotQuality::new(config.xg.clone()), &config.windows);

        let last = shots.iter().find(|s| s.event_idx == 2).unwrap();
        assert!(last.rebound, "2 s after a same-team shot");
        assert!(last.cycle, "15 s of continuous zone possession");
        assert!(!last.rush, "no neutral/defensive-zone origin in the window");
    }

    #[test]
    fn test_goal_routes_and_entry_classification() {
        use crate::sources::{FetchError, TrackingFeed};

        struct ClipFeed;

        impl TrackingFeed for ClipFeed {
            fn fetch_frames(
                &self,
                _game_id: GameId,
                _event_idx: usize,
            ) -> Result<Vec<TrackingFrame>, FetchError> {
                let mk = |entries: &[(u32, (f64, f64))]| TrackingFrame {
                    entities: entries.iter().copied().collect(),
                };
                // Skater 10 carries across the blue line and in on net
                Ok(vec![
                    mk(&[(1, (20.0, 0.0)), (10, (19.0, 0.5))]),
                    mk(&[(1, (30.0, 0.0)), (10, (29.0, 0.5))]),
                    mk(&[(1, (60.0, 2.0)), (10, (59.0, 2.0))]),
                    mk(&[(1, (85.0, 1.0)), (10, (84.0, 1.0))]),
                ])
            }
        }

        let mut log = make_log(vec![GameEvent::shot(
            0,
            EventKind::Goal,
            HOME,
            1,
            300,
            (85.0, 1.0),
            Zone::Offensive,
        )]);
        log.home.roster = vec![10, 11];

        let config = EngineConfig::default();
        let tracking = TrackingClient::new(Box::new(ClipFeed), config.fetch.clone());
        let processor = GameProcessor::new(&config, &NoHands, Some(&tracking));
        let derived = processor.derive(&log);

        assert_eq!(derived.routes.len(), 1);
        assert_eq!(derived.routes[0].points.len(), 4, "one puck point per frame");
        let (home, _) = &derived.teams[0];
        assert_eq!(home.goal_entries_carry, 1, "carried entry ahead of the goal");
        assert_eq!(home.goal_entries_pass + home.goal_entries_dump, 0);
    }

    #[test]
    fn test_turnover_and_faceoff_counting() {
        let events = vec![
            GameEvent::faceoff(0, HOME, 1, 0, Zone::Neutral),
            GameEvent::turnover(1, EventKind::Takeaway, HOME, 1, 40, Zone::Offensive),
            GameEvent::turnover(2, EventKind::Giveaway, AWAY, 1, 70, Zone::Defensive),
            GameEvent::faceoff(3, AWAY, 1, 90, Zone::Offensive),
        ];
        let log = make_log(events);
        let config = EngineConfig::default();
        let derived = GameProcessor::new(&config, &NoHands, None).derive(&log);

        let (home, _) = &derived.teams[0];
        assert_eq!(home.forecheck_takeaways, 1);
        assert_eq!(home.takeaways_offensive, 1);
        assert_eq!(home.faceoff_wins, 1);
        assert_eq!(home.faceoffs_taken, 2);
        let (away, _) = &derived.teams[1];
        assert_eq!(away.giveaways_defensive, 1);
        assert_eq!(away.faceoff_wins, 1);
        assert_eq!(away.faceoffs_taken, 2);
    }
}
