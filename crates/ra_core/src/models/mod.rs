//! Core data model: play-by-play events, game logs, derived shot records
//! and the per-game metric bundles the season accumulator merges.

mod event;
mod game;
mod goalie;
mod player;
mod shot;
mod team_metrics;

pub use event::{EventKind, GameEvent, GameId, PlayerId, TeamId, Zone, PERIOD_SECS};
pub use player::CatchHand;
pub use game::{GameLog, RinkSide, TeamInfo};
pub use goalie::{
    AngleTier, DangerTier, Decision, GoalieGameRecord, ShotAgainst, ShotSide, Situation,
};
pub use shot::{ShotGeometry, ShotOutcome, ShotRecord};
pub use team_metrics::{EntryKind, TeamGameMetrics};
