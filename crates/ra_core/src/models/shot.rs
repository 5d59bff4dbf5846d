use serde::{Deserialize, Serialize};

use super::event::{EventKind, PlayerId, TeamId};

/// How a shot attempt resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShotOutcome {
    OnGoal,
    Goal,
    Missed,
    Blocked,
}

impl ShotOutcome {
    pub fn from_kind(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::ShotOnGoal => Some(ShotOutcome::OnGoal),
            EventKind::Goal => Some(ShotOutcome::Goal),
            EventKind::MissedShot => Some(ShotOutcome::Missed),
            EventKind::BlockedShot => Some(ShotOutcome::Blocked),
            _ => None,
        }
    }

    pub fn reached_goalie(&self) -> bool {
        matches!(self, ShotOutcome::OnGoal | ShotOutcome::Goal)
    }
}

/// Geometry of a shot in the attacking frame. Absent when the source event
/// carried no coordinates (the shot then scores a neutral zero).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShotGeometry {
    /// Attacking-frame coordinates
    pub x: f64,
    pub y: f64,
    /// Distance to the goal-mouth center (feet)
    pub distance_ft: f64,
    /// Angle subtended by the 6-ft goal mouth (degrees)
    pub angle_deg: f64,
    /// Angular deviation from a clean look at the mouth (degrees)
    pub off_center_deg: f64,
    pub high_danger: bool,
    pub slot: bool,
}

/// A shot attempt with every derived field computed once; immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotRecord {
    pub event_idx: usize,
    pub team: TeamId,
    pub shooter: Option<PlayerId>,
    pub goalie: Option<PlayerId>,
    pub period: u8,
    pub clock_secs: u32,
    pub outcome: ShotOutcome,
    pub shot_type: Option<String>,
    pub geometry: Option<ShotGeometry>,
    pub xg: f64,
    pub rush: bool,
    pub cycle: bool,
    pub rebound: bool,
}

impl ShotRecord {
    pub fn is_high_danger(&self) -> bool {
        self.geometry.map(|g| g.high_danger).unwrap_or(false)
    }

    pub fn is_slot(&self) -> bool {
        self.geometry.map(|g| g.slot).unwrap_or(false)
    }
}
