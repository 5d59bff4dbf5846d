use serde::{Deserialize, Serialize};

use super::event::{GameId, TeamId};

/// Zone-entry classification for the sequence leading to a goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Carry,
    Pass,
    Dump,
}

/// Per-game per-team counters. Immutable once computed; keyed by
/// (game id, team id) so reprocessing is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGameMetrics {
    pub game_id: GameId,
    pub team: TeamId,
    pub opponent: TeamId,
    pub is_home: bool,

    pub goals_for: u32,
    pub goals_against: u32,
    /// Shots on goal (on-goal attempts including goals)
    pub shots_for: u32,
    pub shots_against: u32,
    /// All attempts: on goal + missed + blocked (Corsi)
    pub attempts_for: u32,
    pub attempts_against: u32,
    pub xg_for: f64,
    pub xg_against: f64,
    pub high_danger_for: u32,
    pub high_danger_against: u32,

    pub rush_shots: u32,
    pub cycle_shots: u32,
    pub rebound_shots: u32,

    /// Takeaways in the offensive zone (forecheck turnovers won)
    pub forecheck_takeaways: u32,
    pub giveaways_defensive: u32,
    pub giveaways_neutral: u32,
    pub giveaways_offensive: u32,
    pub takeaways_defensive: u32,
    pub takeaways_neutral: u32,
    pub takeaways_offensive: u32,

    pub faceoff_wins: u32,
    pub faceoffs_taken: u32,

    pub goal_entries_carry: u32,
    pub goal_entries_pass: u32,
    pub goal_entries_dump: u32,
}

impl TeamGameMetrics {
    pub fn new(game_id: GameId, team: TeamId, opponent: TeamId, is_home: bool) -> Self {
        Self {
            game_id,
            team,
            opponent,
            is_home,
            goals_for: 0,
            goals_against: 0,
            shots_for: 0,
            shots_against: 0,
            attempts_for: 0,
            attempts_against: 0,
            xg_for: 0.0,
            xg_against: 0.0,
            high_danger_for: 0,
            high_danger_against: 0,
            rush_shots: 0,
            cycle_shots: 0,
            rebound_shots: 0,
            forecheck_takeaways: 0,
            giveaways_defensive: 0,
            giveaways_neutral: 0,
            giveaways_offensive: 0,
            takeaways_defensive: 0,
            takeaways_neutral: 0,
            takeaways_offensive: 0,
            faceoff_wins: 0,
            faceoffs_taken: 0,
            goal_entries_carry: 0,
            goal_entries_pass: 0,
            goal_entries_dump: 0,
        }
    }

    pub fn record_entry(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::Carry => self.goal_entries_carry += 1,
            EntryKind::Pass => self.goal_entries_pass += 1,
            EntryKind::Dump => self.goal_entries_dump += 1,
        }
    }

    /// Corsi-for percentage, 0.5 when no attempts were recorded.
    pub fn corsi_pct(&self) -> f64 {
        let total = self.attempts_for + self.attempts_against;
        if total == 0 {
            0.5
        } else {
            self.attempts_for as f64 / total as f64
        }
    }

    pub fn won(&self) -> bool {
        self.goals_for > self.goals_against
    }

    pub fn faceoff_pct(&self) -> f64 {
        if self.faceoffs_taken == 0 {
            0.5
        } else {
            self.faceoff_wins as f64 / self.faceoffs_taken as f64
        }
    }
}
