use thiserror::Error;

use crate::models::GameId;
use crate::season::snapshot::SnapshotError;
use crate::sources::FetchError;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("event {idx} is missing required field `{field}`")]
    MissingField { idx: usize, field: &'static str },

    #[error("game {game_id} has no play-by-play data")]
    IncompatibleGame { game_id: GameId },

    #[error("fetch of {what} failed after {attempts} attempts: {source}")]
    TransientFetch {
        what: String,
        attempts: u32,
        source: FetchError,
    },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl AnalyticsError {
    /// Whether the whole game must be skipped (as opposed to substituting a
    /// per-category default and continuing).
    pub fn aborts_game(&self) -> bool {
        match self {
            AnalyticsError::MissingField { .. } => false,
            AnalyticsError::IncompatibleGame { .. } => true,
            AnalyticsError::TransientFetch { .. } => true,
            AnalyticsError::Snapshot(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
