use serde::{Deserialize, Serialize};

use super::event::{GameEvent, GameId, PlayerId, TeamId};

/// End of the rink a team defends during a period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RinkSide {
    Left,
    Right,
}

impl RinkSide {
    pub fn opposite(self) -> Self {
        match self {
            RinkSide::Left => RinkSide::Right,
            RinkSide::Right => RinkSide::Left,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub abbrev: String,
    pub score: u32,
    /// Skater/goalie ids dressed for the game; doubles as the entity-id
    /// set in tracking frames
    #[serde(default)]
    pub roster: Vec<PlayerId>,
}

impl TeamInfo {
    pub fn new(id: TeamId, abbrev: &str, score: u32) -> Self {
        Self { id, abbrev: abbrev.to_string(), score, roster: Vec::new() }
    }
}

/// One game: boxscore identities plus the ordered play-by-play vector and
/// the per-period defending-side map required to interpret raw coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    pub game_id: GameId,
    pub home: TeamInfo,
    pub away: TeamInfo,
    pub events: Vec<GameEvent>,
    /// Side the home team defends, indexed by period - 1. Periods past the
    /// end of the map alternate from the last recorded entry.
    pub home_defends: Vec<RinkSide>,
}

impl GameLog {
    pub fn is_home(&self, team: TeamId) -> bool {
        team == self.home.id
    }

    pub fn opponent_of(&self, team: TeamId) -> TeamId {
        if team == self.home.id {
            self.away.id
        } else {
            self.home.id
        }
    }

    pub fn abbrev_of(&self, team: TeamId) -> &str {
        if team == self.home.id {
            &self.home.abbrev
        } else {
            &self.away.abbrev
        }
    }

    /// Defending side for `team` in `period` (1-based). Teams switch ends
    /// each period, so missing map entries extend by alternation.
    pub fn defending_side(&self, team: TeamId, period: u8) -> RinkSide {
        let p = period.max(1) as usize - 1;
        let home_side = match self.home_defends.get(p) {
            Some(side) => *side,
            None => {
                let base = self.home_defends.last().copied().unwrap_or(RinkSide::Right);
                if (p + 1 - self.home_defends.len().max(1)) % 2 == 1 {
                    base.opposite()
                } else {
                    base
                }
            }
        };
        if self.is_home(team) {
            home_side
        } else {
            home_side.opposite()
        }
    }

    /// True when any event occurred past the third period.
    pub fn went_past_regulation(&self) -> bool {
        self.events.iter().any(|e| e.period > 3)
    }

    /// Winning team id from the boxscore, `None` on a (malformed) tie.
    pub fn winner(&self) -> Option<TeamId> {
        match self.home.score.cmp(&self.away.score) {
            std::cmp::Ordering::Greater => Some(self.home.id),
            std::cmp::Ordering::Less => Some(self.away.id),
            std::cmp::Ordering::Equal => None,
        }
    }
}
