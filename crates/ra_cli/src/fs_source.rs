//! Directory-backed source adapters.
//!
//! Layout under the data directory:
//! - `<game_id>.json` - one `GameBundle` per game
//! - `tracking/<game_id>_<event_idx>.json` - tracking clips
//! - `players.json` - player id -> { name, catches } metadata map
//!
//! These adapters answer from local files, so every call returns well
//! inside any timeout; network-backed implementations of the same traits
//! must enforce the configured timeout themselves.

use std::path::{Path, PathBuf};

use fxhash::FxHashMap;

use ra_core::models::{GameId, PlayerId};
use ra_core::patterns::TrackingFrame;
use ra_core::sources::{FetchError, GameBundle, GameDataSource, PlayerInfo, PlayerMetadata, TrackingFeed};

pub struct FsGameSource {
    dir: PathBuf,
}

impl FsGameSource {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }
}

impl GameDataSource for FsGameSource {
    fn fetch_game(&self, game_id: GameId) -> Result<GameBundle, FetchError> {
        let path = self.dir.join(format!("{}.json", game_id));
        if !path.exists() {
            return Err(FetchError::NotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

pub struct FsTrackingFeed {
    dir: PathBuf,
}

impl FsTrackingFeed {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.join("tracking") }
    }
}

impl TrackingFeed for FsTrackingFeed {
    fn fetch_frames(
        &self,
        game_id: GameId,
        event_idx: usize,
    ) -> Result<Vec<TrackingFrame>, FetchError> {
        let path = self.dir.join(format!("{}_{}.json", game_id, event_idx));
        if !path.exists() {
            // No clip for this goal: an empty clip, not an error
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

pub struct FileMetadata {
    players: FxHashMap<PlayerId, PlayerInfo>,
}

impl FileMetadata {
    /// Load `players.json`; an absent file yields an empty lookup and the
    /// engine degrades to side-unknown classification.
    pub fn load(dir: &Path) -> Result<Self, FetchError> {
        let path = dir.join("players.json");
        if !path.exists() {
            log::warn!("no players.json under {:?}; goalie sides will be unknown", dir);
            return Ok(Self { players: FxHashMap::default() });
        }
        let raw = std::fs::read_to_string(&path)?;
        let players =
            serde_json::from_str(&raw).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(Self { players })
    }
}

impl PlayerMetadata for FileMetadata {
    fn lookup(&self, player: PlayerId) -> Result<PlayerInfo, FetchError> {
        self.players
            .get(&player)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("player {}", player)))
    }
}
