//! On-ice strength reconstruction from penalty events.
//!
//! Minor penalties put a team a skater down for 120 s, majors for 300 s
//! (read from the event detail). A power-play goal releases the earliest
//! expiring minor against the scored-on side.

use crate::models::{EventKind, GameEvent, Situation, TeamId};

const MINOR_SECS: u32 = 120;
const MAJOR_SECS: u32 = 300;

#[derive(Debug, Clone)]
struct PenaltyWindow {
    team: TeamId,
    start: u32,
    end: u32,
    minor: bool,
}

/// Built once per game from the event vector; answers strength queries at
/// any clock value.
#[derive(Debug, Clone, Default)]
pub struct StrengthTracker {
    windows: Vec<PenaltyWindow>,
}

impl StrengthTracker {
    pub fn from_events(events: &[GameEvent]) -> Self {
        let mut windows: Vec<PenaltyWindow> = Vec::new();
        for ev in events {
            match ev.kind {
                EventKind::Penalty => {
                    let Some(team) = ev.team else { continue };
                    let major = ev
                        .detail
                        .as_deref()
                        .map(|d| d.to_ascii_lowercase().contains("major"))
                        .unwrap_or(false);
                    let dur = if major { MAJOR_SECS } else { MINOR_SECS };
                    windows.push(PenaltyWindow {
                        team,
                        start: ev.clock_secs,
                        end: ev.clock_secs + dur,
                        minor: !major,
                    });
                }
                EventKind::Goal => {
                    let Some(scorer) = ev.team else { continue };
                    let clock = ev.clock_secs;
                    let scorer_down = windows
                        .iter()
                        .filter(|w| w.team == scorer && w.start <= clock && clock < w.end)
                        .count();
                    let opp_down = windows
                        .iter()
                        .filter(|w| w.team != scorer && w.start <= clock && clock < w.end)
                        .count();
                    // A power-play goal releases the earliest expiring
                    // active minor against the scored-on side.
                    if opp_down > scorer_down {
                        if let Some(w) = windows
                            .iter_mut()
                            .filter(|w| {
                                w.team != scorer && w.minor && w.start <= clock && clock < w.end
                            })
                            .min_by_key(|w| w.end)
                        {
                            w.end = clock;
                        }
                    }
                }
                _ => {}
            }
        }
        Self { windows }
    }

    fn active_against(&self, team: TeamId, clock: u32) -> usize {
        self.windows
            .iter()
            .filter(|w| w.team == team && w.start <= clock && clock < w.end)
            .count()
    }

    fn total_active(&self, clock: u32) -> usize {
        self.windows.iter().filter(|w| w.start <= clock && clock < w.end).count()
    }

    /// Strength from `team`'s bench at `clock`.
    pub fn situation(&self, team: TeamId, clock: u32) -> Situation {
        let own = self.active_against(team, clock);
        let opp = self.total_active(clock) - own;
        match own.cmp(&opp) {
            std::cmp::Ordering::Greater => Situation::Shorthanded,
            std::cmp::Ordering::Less => Situation::PowerPlay,
            std::cmp::Ordering::Equal => Situation::Even,
        }
    }
}
