use serde::{Deserialize, Serialize};

pub type GameId = u32;
pub type TeamId = u32;
pub type PlayerId = u32;

/// Regulation period length in seconds.
pub const PERIOD_SECS: u32 = 1200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ShotOnGoal,
    MissedShot,
    BlockedShot,
    Goal,
    Giveaway,
    Takeaway,
    Faceoff,
    Penalty,
    Hit,
    Stoppage,
    PeriodStart,
    PeriodEnd,
}

impl EventKind {
    /// Any unblocked or blocked attempt at the net (the Corsi family).
    pub fn is_shot_attempt(&self) -> bool {
        matches!(
            self,
            EventKind::ShotOnGoal | EventKind::MissedShot | EventKind::BlockedShot | EventKind::Goal
        )
    }

    /// Attempts that reached the goalie.
    pub fn is_on_goal(&self) -> bool {
        matches!(self, EventKind::ShotOnGoal | EventKind::Goal)
    }
}

/// Zone code, always relative to the event's owning team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Offensive,
    Neutral,
    Defensive,
}

impl Zone {
    /// The same rink location seen from the other bench.
    pub fn flipped(self) -> Self {
        match self {
            Zone::Offensive => Zone::Defensive,
            Zone::Neutral => Zone::Neutral,
            Zone::Defensive => Zone::Offensive,
        }
    }
}

/// One play-by-play entry. Events live in an append-only vector and are
/// addressed by index; detectors scan that vector directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the game's event vector
    pub idx: usize,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Owning team; absent for neutral events (stoppages, period markers)
    pub team: Option<TeamId>,
    /// Raw rink coordinates, x in [-100, 100], y in [-42.5, 42.5]
    pub coords: Option<(f64, f64)>,
    /// Zone relative to `team`
    pub zone: Option<Zone>,
    pub period: u8,
    /// Absolute game clock: (period - 1) * 1200 + seconds elapsed in period
    pub clock_secs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shooter: Option<PlayerId>,
    /// Goalie in net for the defending side; absent on empty-net attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goalie: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocker: Option<PlayerId>,
    /// Free-form qualifier: stoppage reason, penalty severity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl GameEvent {
    /// Absolute clock from a period + in-period pair.
    pub fn abs_clock(period: u8, secs_in_period: u32) -> u32 {
        (period.max(1) as u32 - 1) * PERIOD_SECS + secs_in_period
    }

    fn base(idx: usize, kind: EventKind, team: Option<TeamId>, period: u8, clock_secs: u32) -> Self {
        Self {
            idx,
            kind,
            team,
            coords: None,
            zone: None,
            period,
            clock_secs,
            shot_type: None,
            shooter: None,
            goalie: None,
            blocker: None,
            detail: None,
        }
    }

    pub fn shot(
        idx: usize,
        kind: EventKind,
        team: TeamId,
        period: u8,
        clock_secs: u32,
        coords: (f64, f64),
        zone: Zone,
    ) -> Self {
        debug_assert!(kind.is_shot_attempt());
        Self {
            coords: Some(coords),
            zone: Some(zone),
            ..Self::base(idx, kind, Some(team), period, clock_secs)
        }
    }

    pub fn turnover(
        idx: usize,
        kind: EventKind,
        team: TeamId,
        period: u8,
        clock_secs: u32,
        zone: Zone,
    ) -> Self {
        debug_assert!(matches!(kind, EventKind::Giveaway | EventKind::Takeaway));
        Self { zone: Some(zone), ..Self::base(idx, kind, Some(team), period, clock_secs) }
    }

    /// Faceoff; `team` is the winning side.
    pub fn faceoff(idx: usize, team: TeamId, period: u8, clock_secs: u32, zone: Zone) -> Self {
        Self { zone: Some(zone), ..Self::base(idx, EventKind::Faceoff, Some(team), period, clock_secs) }
    }

    pub fn stoppage(idx: usize, period: u8, clock_secs: u32, reason: &str) -> Self {
        Self {
            detail: Some(reason.to_string()),
            ..Self::base(idx, EventKind::Stoppage, None, period, clock_secs)
        }
    }

    pub fn penalty(idx: usize, team: TeamId, period: u8, clock_secs: u32, severity: &str) -> Self {
        Self {
            detail: Some(severity.to_string()),
            ..Self::base(idx, EventKind::Penalty, Some(team), period, clock_secs)
        }
    }

    pub fn period_start(idx: usize, period: u8) -> Self {
        Self::base(idx, EventKind::PeriodStart, None, period, Self::abs_clock(period, 0))
    }

    pub fn period_end(idx: usize, period: u8) -> Self {
        Self::base(idx, EventKind::PeriodEnd, None, period, Self::abs_clock(period, PERIOD_SECS))
    }

    /// Builder-style shot metadata.
    pub fn with_shot_type(mut self, shot_type: &str) -> Self {
        self.shot_type = Some(shot_type.to_string());
        self
    }

    pub fn with_shooter(mut self, shooter: PlayerId) -> Self {
        self.shooter = Some(shooter);
        self
    }

    pub fn with_goalie(mut self, goalie: PlayerId) -> Self {
        self.goalie = Some(goalie);
        self
    }

    /// Zone of this event as seen by `team` (flips when the event belongs
    /// to the opponent).
    pub fn zone_relative_to(&self, team: TeamId) -> Option<Zone> {
        let zone = self.zone?;
        match self.team {
            Some(owner) if owner == team => Some(zone),
            Some(_) => Some(zone.flipped()),
            None => None,
        }
    }
}
