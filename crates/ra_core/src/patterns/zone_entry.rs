//! Zone-entry classification over fine-grained tracking frames.
//!
//! Frames arrive once per second from the external tracking feed; entity
//! id 1 is reserved for the puck. The classifier works in the attacking
//! frame of the entering team (callers flip coordinates first): the puck
//! crosses the attacking blue line at x = +25.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::DetectorWindows;
use crate::models::EntryKind;
use crate::rink::dims;

/// Entity id of the puck in every tracking frame.
pub const PUCK_ENTITY: u32 = 1;

/// One sampled frame: on-ice entity id -> position.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackingFrame {
    pub entities: FxHashMap<u32, (f64, f64)>,
}

impl TrackingFrame {
    pub fn puck(&self) -> Option<(f64, f64)> {
        self.entities.get(&PUCK_ENTITY).copied()
    }
}

/// Nearest attacker to the puck within the proximity threshold, if any.
fn possessor(frame: &TrackingFrame, attackers: &[u32], proximity_ft: f64) -> Option<u32> {
    let (px, py) = frame.puck()?;
    attackers
        .iter()
        .filter_map(|&id| {
            let (x, y) = *frame.entities.get(&id)?;
            let d = ((x - px).powi(2) + (y - py).powi(2)).sqrt();
            (d <= proximity_ft).then_some((id, d))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Classify how the attacking team brought the puck into the zone.
///
/// At the blue-line crossing frame (or the first frame when the clip
/// starts already in-zone) the nearest attacker within the proximity
/// threshold is the provisional carrier. An unchanged carrier through the
/// following window is a carry; possession surfacing on a different
/// teammate is a pass; no team possession inside the window is a dump.
/// Returns `None` when the puck never appears in the zone.
pub fn classify_entry(
    frames: &[TrackingFrame],
    attackers: &[u32],
    windows: &DetectorWindows,
) -> Option<EntryKind> {
    let crossing = frames.iter().position(|f| {
        f.puck().map(|(x, _)| x >= dims::BLUE_LINE_X).unwrap_or(false)
    })?;

    let carrier = possessor(&frames[crossing], attackers, windows.entry_proximity_ft);

    let window_end = (crossing + 1 + windows.entry_window_frames).min(frames.len());
    for frame in &frames[crossing + 1..window_end] {
        match (carrier, possessor(frame, attackers, windows.entry_proximity_ft)) {
            (Some(c), Some(p)) if p != c => return Some(EntryKind::Pass),
            (None, Some(_)) => return Some(EntryKind::Dump),
            _ => {}
        }
    }

    Some(if carrier.is_some() { EntryKind::Carry } else { EntryKind::Dump })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(entries: &[(u32, (f64, f64))]) -> TrackingFrame {
        TrackingFrame { entities: entries.iter().copied().collect() }
    }

    fn windows() -> DetectorWindows {
        DetectorWindows::default()
    }

    const SKATERS: [u32; 2] = [10, 11];

    #[test]
    fn test_carry_entry() {
        // Skater 10 stays on the puck through the crossing and beyond
        let frames = vec![
            frame(&[(PUCK_ENTITY, (20.0, 0.0)), (10, (19.0, 1.0)), (11, (0.0, 20.0))]),
            frame(&[(PUCK_ENTITY, (28.0, 0.0)), (10, (27.5, 0.5)), (11, (5.0, 20.0))]),
            frame(&[(PUCK_ENTITY, (40.0, 2.0)), (10, (39.0, 2.0)), (11, (15.0, 18.0))]),
        ];
        assert_eq!(classify_entry(&frames, &SKATERS, &windows()), Some(EntryKind::Carry));
    }

    #[test]
    fn test_pass_entry() {
        // Carrier 10 at the crossing, possession shows up on 11 afterwards
        let frames = vec![
            frame(&[(PUCK_ENTITY, (28.0, 0.0)), (10, (27.0, 0.0)), (11, (40.0, 15.0))]),
            frame(&[(PUCK_ENTITY, (35.0, 8.0)), (10, (28.0, 0.0)), (11, (41.0, 14.0))]),
            frame(&[(PUCK_ENTITY, (41.0, 14.0)), (10, (30.0, 2.0)), (11, (41.5, 14.0))]),
        ];
        assert_eq!(classify_entry(&frames, &SKATERS, &windows()), Some(EntryKind::Pass));
    }

    #[test]
    fn test_dump_entry() {
        // Puck crosses alone and nobody recovers inside the window
        let frames = vec![
            frame(&[(PUCK_ENTITY, (30.0, 0.0)), (10, (0.0, 0.0)), (11, (-10.0, 5.0))]),
            frame(&[(PUCK_ENTITY, (60.0, 10.0)), (10, (10.0, 0.0)), (11, (0.0, 5.0))]),
            frame(&[(PUCK_ENTITY, (70.0, 20.0)), (10, (20.0, 0.0)), (11, (10.0, 5.0))]),
        ];
        assert_eq!(classify_entry(&frames, &SKATERS, &windows()), Some(EntryKind::Dump));
    }

    #[test]
    fn test_dump_recovered_is_still_dump() {
        // Loose crossing, a teammate reaches the puck later in the window
        let frames = vec![
            frame(&[(PUCK_ENTITY, (30.0, 0.0)), (10, (10.0, 0.0))]),
            frame(&[(PUCK_ENTITY, (55.0, 5.0)), (10, (30.0, 0.0))]),
            frame(&[(PUCK_ENTITY, (60.0, 8.0)), (10, (58.0, 8.0))]),
        ];
        assert_eq!(classify_entry(&frames, &[10], &windows()), Some(EntryKind::Dump));
    }

    #[test]
    fn test_clip_starting_in_zone_uses_first_frame() {
        // Already inside the zone at frame 0: the possessor-identity test
        // applies to the first frame instead of a crossing frame.
        let frames = vec![
            frame(&[(PUCK_ENTITY, (60.0, 0.0)), (10, (59.0, 0.5))]),
            frame(&[(PUCK_ENTITY, (65.0, 0.0)), (10, (64.0, 0.5))]),
        ];
        assert_eq!(classify_entry(&frames, &[10], &windows()), Some(EntryKind::Carry));
    }

    #[test]
    fn test_no_entry_in_clip() {
        let frames = vec![frame(&[(PUCK_ENTITY, (-30.0, 0.0)), (10, (-29.0, 0.0))])];
        assert_eq!(classify_entry(&frames, &[10], &windows()), None);
        assert_eq!(classify_entry(&[], &[10], &windows()), None);
    }
}
