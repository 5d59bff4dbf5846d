use serde::{Deserialize, Serialize};

use super::event::{GameId, PlayerId, TeamId};
use super::shot::ShotOutcome;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DangerTier {
    High,
    Medium,
    Low,
}

impl DangerTier {
    pub fn label(&self) -> &'static str {
        match self {
            DangerTier::High => "high",
            DangerTier::Medium => "medium",
            DangerTier::Low => "low",
        }
    }
}

/// Center look vs. acute (sharp) angle, from the goalie's net.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AngleTier {
    Center,
    Acute,
}

impl AngleTier {
    pub fn label(&self) -> &'static str {
        match self {
            AngleTier::Center => "center",
            AngleTier::Acute => "acute",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShotSide {
    Glove,
    Blocker,
    /// No lateral information (missing coordinates)
    Unknown,
}

impl ShotSide {
    pub fn label(&self) -> &'static str {
        match self {
            ShotSide::Glove => "glove",
            ShotSide::Blocker => "blocker",
            ShotSide::Unknown => "unknown",
        }
    }
}

/// On-ice strength from the goalie's bench: `Shorthanded` means the
/// opponent is on the power play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    Even,
    PowerPlay,
    Shorthanded,
}

impl Situation {
    pub fn label(&self) -> &'static str {
        match self {
            Situation::Even => "even",
            Situation::PowerPlay => "power_play",
            Situation::Shorthanded => "shorthanded",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Win,
    Loss,
    OvertimeLoss,
}

/// One shot faced, fully classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotAgainst {
    pub event_idx: usize,
    pub shooter_team: TeamId,
    pub clock_secs: u32,
    pub danger: DangerTier,
    pub angle: AngleTier,
    pub side: ShotSide,
    pub situation: Situation,
    pub shot_type: Option<String>,
    pub rebound: bool,
    pub xg: f64,
    pub outcome: ShotOutcome,
}

impl ShotAgainst {
    pub fn is_goal(&self) -> bool {
        self.outcome == ShotOutcome::Goal
    }
}

/// Per-goalie per-game shot-against log. Only produced when the goalie
/// faced at least one non-empty-net shot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalieGameRecord {
    pub goalie: PlayerId,
    pub team: TeamId,
    pub opponent: TeamId,
    pub opponent_abbrev: String,
    pub game_id: GameId,
    pub is_home: bool,
    /// Final clock of the game, for time-based rate denominators
    pub game_secs: u32,
    pub shots: Vec<ShotAgainst>,
    pub decision: Option<Decision>,
}

impl GoalieGameRecord {
    pub fn shots_faced(&self) -> u32 {
        self.shots.len() as u32
    }

    pub fn goals_against(&self) -> u32 {
        self.shots.iter().filter(|s| s.is_goal()).count() as u32
    }

    pub fn saves(&self) -> u32 {
        self.shots_faced() - self.goals_against()
    }

    pub fn xg_faced(&self) -> f64 {
        self.shots.iter().map(|s| s.xg).sum()
    }
}
