//! Season accumulation.
//!
//! The accumulator is the only season-spanning state in the engine. Games
//! merge exactly once (processed-id set), per-entity totals are plain
//! sums, and every derived rate is recomputed from raw counts on demand
//! so nothing can drift. Recent form comes from bounded per-game logs and
//! is likewise recomputed fresh each call.

pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::models::{
    Decision, GameId, GoalieGameRecord, PlayerId, TeamGameMetrics, TeamId,
};

/// Raw count cell used by every goalie split table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SplitCounts {
    pub shots: u64,
    pub goals: u64,
    pub xg: f64,
}

impl SplitCounts {
    fn add(&mut self, goal: bool, xg: f64) {
        self.shots += 1;
        if goal {
            self.goals += 1;
        }
        self.xg += xg;
    }

    pub fn save_pct(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            (self.shots - self.goals) as f64 / self.shots as f64
        }
    }
}

/// Season totals for one team: every field is a plain sum of the per-game
/// counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamTotals {
    pub goals_for: u64,
    pub goals_against: u64,
    pub shots_for: u64,
    pub shots_against: u64,
    pub attempts_for: u64,
    pub attempts_against: u64,
    pub xg_for: f64,
    pub xg_against: f64,
    pub high_danger_for: u64,
    pub high_danger_against: u64,
    pub rush_shots: u64,
    pub cycle_shots: u64,
    pub rebound_shots: u64,
    pub forecheck_takeaways: u64,
    pub giveaways_defensive: u64,
    pub giveaways_neutral: u64,
    pub giveaways_offensive: u64,
    pub takeaways_defensive: u64,
    pub takeaways_neutral: u64,
    pub takeaways_offensive: u64,
    pub faceoff_wins: u64,
    pub faceoffs_taken: u64,
    pub goal_entries_carry: u64,
    pub goal_entries_pass: u64,
    pub goal_entries_dump: u64,
}

impl TeamTotals {
    fn merge(&mut self, m: &TeamGameMetrics) {
        self.goals_for += m.goals_for as u64;
        self.goals_against += m.goals_against as u64;
        self.shots_for += m.shots_for as u64;
        self.shots_against += m.shots_against as u64;
        self.attempts_for += m.attempts_for as u64;
        self.attempts_against += m.attempts_against as u64;
        self.xg_for += m.xg_for;
        self.xg_against += m.xg_against;
        self.high_danger_for += m.high_danger_for as u64;
        self.high_danger_against += m.high_danger_against as u64;
        self.rush_shots += m.rush_shots as u64;
        self.cycle_shots += m.cycle_shots as u64;
        self.rebound_shots += m.rebound_shots as u64;
        self.forecheck_takeaways += m.forecheck_takeaways as u64;
        self.giveaways_defensive += m.giveaways_defensive as u64;
        self.giveaways_neutral += m.giveaways_neutral as u64;
        self.giveaways_offensive += m.giveaways_offensive as u64;
        self.takeaways_defensive += m.takeaways_defensive as u64;
        self.takeaways_neutral += m.takeaways_neutral as u64;
        self.takeaways_offensive += m.takeaways_offensive as u64;
        self.faceoff_wins += m.faceoff_wins as u64;
        self.faceoffs_taken += m.faceoffs_taken as u64;
        self.goal_entries_carry += m.goal_entries_carry as u64;
        self.goal_entries_pass += m.goal_entries_pass as u64;
        self.goal_entries_dump += m.goal_entries_dump as u64;
    }
}

/// One line of the bounded team recent-game log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGameSummary {
    pub game_id: GameId,
    pub opponent: TeamId,
    pub goals_for: u32,
    pub goals_against: u32,
    pub xg_for: f64,
    pub xg_against: f64,
    pub corsi_pct: f64,
    pub won: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSeason {
    pub team: TeamId,
    pub abbrev: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub ot_losses: u32,
    pub totals: TeamTotals,
    pub recent: VecDeque<TeamGameSummary>,
}

impl TeamSeason {
    fn new(team: TeamId, abbrev: &str) -> Self {
        Self {
            team,
            abbrev: abbrev.to_string(),
            games: 0,
            wins: 0,
            losses: 0,
            ot_losses: 0,
            totals: TeamTotals::default(),
            recent: VecDeque::new(),
        }
    }

    fn merge(&mut self, m: &TeamGameMetrics, past_regulation: bool, recent_len: usize) {
        self.games += 1;
        if m.won() {
            self.wins += 1;
        } else if past_regulation {
            self.ot_losses += 1;
        } else {
            self.losses += 1;
        }
        self.totals.merge(m);
        self.recent.push_back(TeamGameSummary {
            game_id: m.game_id,
            opponent: m.opponent,
            goals_for: m.goals_for,
            goals_against: m.goals_against,
            xg_for: m.xg_for,
            xg_against: m.xg_against,
            corsi_pct: m.corsi_pct(),
            won: m.won(),
        });
        while self.recent.len() > recent_len {
            self.recent.pop_front();
        }
    }

    pub fn xg_for_per_game(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.totals.xg_for / self.games as f64
        }
    }

    pub fn corsi_pct(&self) -> f64 {
        let total = self.totals.attempts_for + self.totals.attempts_against;
        if total == 0 {
            0.5
        } else {
            self.totals.attempts_for as f64 / total as f64
        }
    }
}

/// One line of the bounded goalie recent-game log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalieGameSummary {
    pub game_id: GameId,
    pub opponent: TeamId,
    pub shots: u32,
    pub goals: u32,
    pub xg: f64,
    pub game_secs: u32,
    pub decision: Option<Decision>,
}

/// Recent-form line recomputed fresh from the per-game log.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormLine {
    pub games: u32,
    pub shots: u64,
    pub goals: u64,
    pub save_pct: f64,
    pub gsax: f64,
}

/// Split tables keyed by stable string labels so the snapshot document is
/// deterministic and self-describing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalieSplits {
    pub by_situation: BTreeMap<String, SplitCounts>,
    pub by_danger: BTreeMap<String, SplitCounts>,
    pub by_angle: BTreeMap<String, SplitCounts>,
    pub by_side: BTreeMap<String, SplitCounts>,
    pub by_venue: BTreeMap<String, SplitCounts>,
    pub by_shot_type: BTreeMap<String, SplitCounts>,
    pub by_opponent: BTreeMap<String, SplitCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalieSeason {
    pub goalie: PlayerId,
    pub team: TeamId,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub ot_losses: u32,
    pub shots_faced: u64,
    pub goals_against: u64,
    pub xg_faced: f64,
    pub rebounds_against: u64,
    pub seconds_played: u64,
    pub splits: GoalieSplits,
    pub recent: VecDeque<GoalieGameSummary>,
}

impl GoalieSeason {
    fn new(goalie: PlayerId, team: TeamId) -> Self {
        Self {
            goalie,
            team,
            games: 0,
            wins: 0,
            losses: 0,
            ot_losses: 0,
            shots_faced: 0,
            goals_against: 0,
            xg_faced: 0.0,
            rebounds_against: 0,
            seconds_played: 0,
            splits: GoalieSplits::default(),
            recent: VecDeque::new(),
        }
    }

    fn merge(&mut self, record: &GoalieGameRecord, recent_len: usize) {
        self.games += 1;
        self.team = record.team;
        match record.decision {
            Some(Decision::Win) => self.wins += 1,
            Some(Decision::Loss) => self.losses += 1,
            Some(Decision::OvertimeLoss) => self.ot_losses += 1,
            None => {}
        }
        self.seconds_played += record.game_secs as u64;
        let venue = if record.is_home { "home" } else { "away" };
        for shot in &record.shots {
            let goal = shot.is_goal();
            self.shots_faced += 1;
            if goal {
                self.goals_against += 1;
            }
            if shot.rebound {
                self.rebounds_against += 1;
            }
            self.xg_faced += shot.xg;
            let s = &mut self.splits;
            s.by_situation.entry(shot.situation.label().to_string()).or_default().add(goal, shot.xg);
            s.by_danger.entry(shot.danger.label().to_string()).or_default().add(goal, shot.xg);
            s.by_angle.entry(shot.angle.label().to_string()).or_default().add(goal, shot.xg);
            s.by_side.entry(shot.side.label().to_string()).or_default().add(goal, shot.xg);
            s.by_venue.entry(venue.to_string()).or_default().add(goal, shot.xg);
            s.by_shot_type
                .entry(shot.shot_type.clone().unwrap_or_else(|| "unknown".to_string()).to_ascii_lowercase())
                .or_default()
                .add(goal, shot.xg);
            s.by_opponent.entry(record.opponent_abbrev.clone()).or_default().add(goal, shot.xg);
        }
        self.recent.push_back(GoalieGameSummary {
            game_id: record.game_id,
            opponent: record.opponent,
            shots: record.shots_faced(),
            goals: record.goals_against(),
            xg: record.xg_faced(),
            game_secs: record.game_secs,
            decision: record.decision,
        });
        while self.recent.len() > recent_len {
            self.recent.pop_front();
        }
    }

    /// Save percentage over the whole season, from raw counts.
    pub fn save_pct(&self) -> f64 {
        if self.shots_faced == 0 {
            0.0
        } else {
            (self.shots_faced - self.goals_against) as f64 / self.shots_faced as f64
        }
    }

    /// Goals-against average per 60 minutes of recorded game time.
    pub fn gaa(&self) -> f64 {
        if self.seconds_played == 0 {
            0.0
        } else {
            self.goals_against as f64 * 3600.0 / self.seconds_played as f64
        }
    }

    /// Goals saved above expected: cumulative xG faced minus goals allowed.
    pub fn gsax(&self) -> f64 {
        self.xg_faced - self.goals_against as f64
    }

    /// Form over the last `n` games, recomputed from the stored log.
    pub fn recent_form(&self, n: usize) -> FormLine {
        let take = self.recent.len().min(n);
        let slice = self.recent.iter().skip(self.recent.len() - take);
        let mut line = FormLine::default();
        let mut xg = 0.0;
        for game in slice {
            line.games += 1;
            line.shots += game.shots as u64;
            line.goals += game.goals as u64;
            xg += game.xg;
        }
        line.save_pct = if line.shots == 0 {
            0.0
        } else {
            (line.shots - line.goals) as f64 / line.shots as f64
        };
        line.gsax = xg - line.goals as f64;
        line
    }
}

/// The single piece of season-spanning mutable state: per-entity totals,
/// bounded recent logs, and the processed-game-id set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonAccumulator {
    pub teams: BTreeMap<TeamId, TeamSeason>,
    pub goalies: BTreeMap<PlayerId, GoalieSeason>,
    pub processed: BTreeSet<GameId>,
}

impl SeasonAccumulator {
    pub fn is_processed(&self, game_id: GameId) -> bool {
        self.processed.contains(&game_id)
    }

    /// Merge one game's derived metrics. Returns false (and changes
    /// nothing) when the game id was already processed.
    pub fn merge_game(
        &mut self,
        game_id: GameId,
        team_metrics: &[(TeamGameMetrics, String)],
        goalie_records: &[GoalieGameRecord],
        past_regulation: bool,
        recent_len: usize,
    ) -> bool {
        if !self.processed.insert(game_id) {
            return false;
        }
        for (metrics, abbrev) in team_metrics {
            self.teams
                .entry(metrics.team)
                .or_insert_with(|| TeamSeason::new(metrics.team, abbrev))
                .merge(metrics, past_regulation, recent_len);
        }
        for record in goalie_records {
            self.goalies
                .entry(record.goalie)
                .or_insert_with(|| GoalieSeason::new(record.goalie, record.team))
                .merge(record, recent_len);
        }
        true
    }
}
