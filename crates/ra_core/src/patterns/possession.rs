//! Possession-pattern detection over the event vector.
//!
//! Every detector is a bounded backward scan from the shot under test.
//! The scans are independent: rush, cycle and rebound are each derived
//! straight from the event sequence, never from one another.

use crate::config::DetectorWindows;
use crate::models::{EventKind, GameEvent, PlayerId, Zone};

/// Whether an event ends a possession chain and halts any scan across it.
///
/// Goals, period ends, penalties and whistled stoppages (offside, icing,
/// puck frozen, ...) always terminate. Faceoffs terminate too, except
/// neutral-zone faceoffs, which restart open play without anchoring
/// territory.
pub fn is_chain_terminator(ev: &GameEvent) -> bool {
    match ev.kind {
        EventKind::Goal | EventKind::PeriodEnd | EventKind::Penalty | EventKind::Stoppage => true,
        EventKind::Faceoff => ev.zone != Some(Zone::Neutral),
        _ => false,
    }
}

/// Bounded scans over one game's events.
pub struct PatternDetector<'a> {
    events: &'a [GameEvent],
    windows: &'a DetectorWindows,
}

impl<'a> PatternDetector<'a> {
    pub fn new(events: &'a [GameEvent], windows: &'a DetectorWindows) -> Self {
        Self { events, windows }
    }

    /// A shot is a rebound iff a prior attempt by the same team sits within
    /// the rebound window with no terminator in between.
    pub fn is_rebound(&self, shot_idx: usize) -> bool {
        let Some(shot) = self.events.get(shot_idx) else { return false };
        let Some(team) = shot.team else { return false };
        for ev in self.events[..shot_idx].iter().rev() {
            let dt = shot.clock_secs.saturating_sub(ev.clock_secs) as f64;
            if dt > self.windows.rebound_secs {
                break;
            }
            if is_chain_terminator(ev) {
                return false;
            }
            if ev.kind.is_shot_attempt() && ev.team == Some(team) {
                return true;
            }
        }
        false
    }

    /// Goalie-keyed variant of the rebound rule: a prior attempt faced by
    /// the same goalie within the window, no terminator in between.
    pub fn is_rebound_against(&self, shot_idx: usize, goalie: PlayerId) -> bool {
        let Some(shot) = self.events.get(shot_idx) else { return false };
        for ev in self.events[..shot_idx].iter().rev() {
            let dt = shot.clock_secs.saturating_sub(ev.clock_secs) as f64;
            if dt > self.windows.rebound_secs {
                break;
            }
            if is_chain_terminator(ev) {
                return false;
            }
            if ev.kind.is_shot_attempt() && ev.goalie == Some(goalie) {
                return true;
            }
        }
        false
    }

    /// A shot is a rush shot iff, inside the rush window, some earlier
    /// non-terminator event sits in the neutral or defensive zone relative
    /// to the shooting team. The first terminator aborts with "not rush".
    pub fn is_rush(&self, shot_idx: usize) -> bool {
        let Some(shot) = self.events.get(shot_idx) else { return false };
        let Some(team) = shot.team else { return false };
        for ev in self.events[..shot_idx].iter().rev() {
            let dt = shot.clock_secs.saturating_sub(ev.clock_secs) as f64;
            if dt > self.windows.rush_secs {
                break;
            }
            if is_chain_terminator(ev) {
                return false;
            }
            match ev.zone_relative_to(team) {
                Some(Zone::Neutral) | Some(Zone::Defensive) => return true,
                _ => {}
            }
        }
        false
    }

    /// A shot is a cycle shot iff the shooting team held uninterrupted
    /// offensive-zone possession for at least the cycle threshold. The
    /// chain reconstructs backward and breaks on terminators, zone exit,
    /// an own giveaway in the zone, or an opponent takeaway.
    pub fn is_cycle(&self, shot_idx: usize) -> bool {
        let Some(shot) = self.events.get(shot_idx) else { return false };
        let Some(team) = shot.team else { return false };
        let mut chain_start = shot.clock_secs;
        for ev in self.events[..shot_idx].iter().rev() {
            if is_chain_terminator(ev) {
                break;
            }
            let Some(zone) = ev.zone_relative_to(team) else { continue };
            if zone != Zone::Offensive {
                break;
            }
            match ev.kind {
                EventKind::Giveaway if ev.team == Some(team) => break,
                EventKind::Takeaway if ev.team != Some(team) => break,
                _ => {}
            }
            chain_start = ev.clock_secs;
        }
        (shot.clock_secs.saturating_sub(chain_start) as f64) >= self.windows.cycle_hold_secs
    }
}

/// A takeaway in the taking team's offensive zone: a forecheck turnover won.
pub fn is_forecheck_takeaway(ev: &GameEvent) -> bool {
    ev.kind == EventKind::Takeaway && ev.zone == Some(Zone::Offensive)
}
