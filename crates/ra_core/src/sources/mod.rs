//! External interfaces.
//!
//! The engine never talks to the network itself: the game feed, the
//! tracking feed and the player-metadata lookup sit behind these traits.
//! Implementations are required to honor the configured timeout so no
//! call can block indefinitely; the engine adds bounded retries, rate
//! limiting and per-run caching on top.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use fxhash::FxHashMap;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FetchPolicy;
use crate::error::AnalyticsError;
use crate::goalie::CatchHandLookup;
use crate::models::{CatchHand, GameEvent, GameId, GameLog, PlayerId, RinkSide, TeamInfo};
use crate::patterns::TrackingFrame;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Transient failures are worth a bounded retry; the rest fail fast.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout(_) | FetchError::Upstream(_) | FetchError::Io(_))
    }
}

/// Raw per-game bundle from the data source: boxscore plus play-by-play.
/// Play-by-play may be absent entirely; that game is incompatible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBundle {
    pub game_id: GameId,
    pub home: TeamInfo,
    pub away: TeamInfo,
    #[serde(default)]
    pub events: Option<Vec<GameEvent>>,
    #[serde(default)]
    pub home_defends: Vec<RinkSide>,
}

impl GameBundle {
    /// Validate into a processable game log.
    pub fn into_log(self) -> Result<GameLog, AnalyticsError> {
        let game_id = self.game_id;
        let events = match self.events {
            Some(events) if !events.is_empty() => events,
            _ => return Err(AnalyticsError::IncompatibleGame { game_id }),
        };
        Ok(GameLog {
            game_id,
            home: self.home,
            away: self.away,
            events,
            home_defends: self.home_defends,
        })
    }
}

/// Read-only per-game source (boxscore + ordered play-by-play).
pub trait GameDataSource: Send + Sync {
    fn fetch_game(&self, game_id: GameId) -> Result<GameBundle, FetchError>;
}

/// Read-only fine-grained tracking source; one clip per (game, event).
pub trait TrackingFeed: Send + Sync {
    fn fetch_frames(&self, game_id: GameId, event_idx: usize)
        -> Result<Vec<TrackingFrame>, FetchError>;
}

/// Player metadata for one id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub catches: CatchHand,
}

/// Read-only player-metadata lookup (catching hand, display name).
pub trait PlayerMetadata: Send + Sync {
    fn lookup(&self, player: PlayerId) -> Result<PlayerInfo, FetchError>;
}

/// Run `fetch` with the policy's bounded retry count. Only transient
/// failures retry; the terminal error carries the attempt count.
pub fn with_retries<T>(
    policy: &FetchPolicy,
    what: &str,
    mut fetch: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, AnalyticsError> {
    let attempts = policy.max_retries.max(1);
    let mut last = None;
    for attempt in 1..=attempts {
        match fetch() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!("fetch of {} failed (attempt {}/{}): {}", what, attempt, attempts, e);
                last = Some(e);
            }
            Err(e) => {
                return Err(AnalyticsError::TransientFetch {
                    what: what.to_string(),
                    attempts: attempt,
                    source: e,
                })
            }
        }
    }
    // Unreachable in practice; the loop always returns
    Err(AnalyticsError::TransientFetch {
        what: what.to_string(),
        attempts,
        source: last.unwrap_or_else(|| FetchError::Upstream("no attempts made".to_string())),
    })
}

/// Tracking access for one run: rate limited upstream, memoized per
/// (game, event). An engine-owned cache object, not ambient global state.
pub struct TrackingClient {
    feed: Box<dyn TrackingFeed>,
    policy: FetchPolicy,
    cache: Mutex<FxHashMap<(GameId, usize), std::sync::Arc<Vec<TrackingFrame>>>>,
    last_call: Mutex<Option<Instant>>,
}

impl TrackingClient {
    pub fn new(feed: Box<dyn TrackingFeed>, policy: FetchPolicy) -> Self {
        Self { feed, policy, cache: Mutex::new(FxHashMap::default()), last_call: Mutex::new(None) }
    }

    /// Fetch (or replay) the frames for one event.
    pub fn frames(
        &self,
        game_id: GameId,
        event_idx: usize,
    ) -> Result<std::sync::Arc<Vec<TrackingFrame>>, AnalyticsError> {
        let key = (game_id, event_idx);
        if let Some(hit) = self.cache.lock().expect("tracking cache poisoned").get(&key) {
            return Ok(hit.clone());
        }

        self.throttle();
        let what = format!("tracking clip {}:{}", game_id, event_idx);
        let frames =
            with_retries(&self.policy, &what, || self.feed.fetch_frames(game_id, event_idx))?;
        let frames = std::sync::Arc::new(frames);
        self.cache.lock().expect("tracking cache poisoned").insert(key, frames.clone());
        Ok(frames)
    }

    /// Keep at least the configured interval between upstream calls.
    fn throttle(&self) {
        let min_interval = Duration::from_millis(self.policy.tracking_min_interval_ms);
        let mut last = self.last_call.lock().expect("rate limiter poisoned");
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < min_interval {
                std::thread::sleep(min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

/// Catch-hand lookups cached for the lifetime of the run.
pub struct CatchHandCache {
    meta: Box<dyn PlayerMetadata>,
    policy: FetchPolicy,
    cache: Mutex<FxHashMap<PlayerId, Option<PlayerInfo>>>,
}

impl CatchHandCache {
    pub fn new(meta: Box<dyn PlayerMetadata>, policy: FetchPolicy) -> Self {
        Self { meta, policy, cache: Mutex::new(FxHashMap::default()) }
    }

    pub fn info(&self, player: PlayerId) -> Option<PlayerInfo> {
        let mut cache = self.cache.lock().expect("metadata cache poisoned");
        cache
            .entry(player)
            .or_insert_with(|| {
                match with_retries(&self.policy, &format!("player metadata {}", player), || {
                    self.meta.lookup(player)
                }) {
                    Ok(info) => Some(info),
                    Err(e) => {
                        warn!("metadata lookup failed for {}: {}", player, e);
                        None
                    }
                }
            })
            .clone()
    }
}

impl CatchHandLookup for CatchHandCache {
    fn catches(&self, goalie: PlayerId) -> Option<CatchHand> {
        self.info(goalie).map(|i| i.catches)
    }
}
