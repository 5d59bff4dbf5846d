//! Season batch runs.
//!
//! Fetch + per-game computation fan out across a worker pool in
//! checkpoint-sized chunks; merges into the shared accumulator stay on
//! the caller thread, in submission order (single-writer discipline).
//! A checkpoint persists after every chunk, so a crash loses at most one
//! chunk, and a graceful stop lets the in-flight chunk finish, persists,
//! and exits - never a half-merged game.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;

use super::{GameDerived, GameProcessor};
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::models::GameId;
use crate::season::{snapshot, SeasonAccumulator};
use crate::sources::{with_retries, CatchHandCache, GameDataSource, TrackingClient};

/// Outcome counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub updated: u32,
    pub skipped_already_processed: u32,
    pub failed: u32,
    /// Failed ids, kept for a later retry
    pub failed_ids: Vec<GameId>,
}

/// A finished run: the report plus the goal routes collected for the
/// clusterer (visualization feed, not part of the accumulator).
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub report: BatchReport,
    pub routes: Vec<crate::cluster::GoalRoute>,
}

pub struct BatchRunner {
    source: Box<dyn GameDataSource>,
    metadata: CatchHandCache,
    tracking: Option<TrackingClient>,
    config: EngineConfig,
    season: SeasonAccumulator,
    snapshot_path: PathBuf,
    stop: Arc<AtomicBool>,
}

impl BatchRunner {
    /// Resume from the snapshot at `snapshot_path` (fresh season when the
    /// file does not exist yet).
    pub fn new(
        source: Box<dyn GameDataSource>,
        metadata: CatchHandCache,
        tracking: Option<TrackingClient>,
        config: EngineConfig,
        snapshot_path: PathBuf,
    ) -> Result<Self, AnalyticsError> {
        let season = snapshot::load_or_default(&snapshot_path)?;
        Ok(Self {
            source,
            metadata,
            tracking,
            config,
            season,
            snapshot_path,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn season(&self) -> &SeasonAccumulator {
        &self.season
    }

    /// Shareable flag for a graceful stop (e.g. from a signal handler).
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    fn fetch_and_derive(&self, game_id: GameId) -> Result<GameDerived, AnalyticsError> {
        let bundle = with_retries(&self.config.fetch, &format!("game {}", game_id), || {
            self.source.fetch_game(game_id)
        })?;
        let log = bundle.into_log()?;
        let processor =
            GameProcessor::new(&self.config, &self.metadata, self.tracking.as_ref());
        Ok(processor.derive(&log))
    }

    /// Process a schedule of game ids into the accumulator.
    pub fn run(&mut self, game_ids: &[GameId]) -> Result<BatchOutcome, AnalyticsError> {
        let mut outcome = BatchOutcome::default();

        let pending: Vec<GameId> = game_ids
            .iter()
            .copied()
            .filter(|id| {
                if self.season.is_processed(*id) {
                    outcome.report.skipped_already_processed += 1;
                    false
                } else {
                    true
                }
            })
            .collect();

        for chunk in pending.chunks(self.config.checkpoint_every.max(1)) {
            if self.stop.load(Ordering::Relaxed) {
                info!("stop requested, ending run before next chunk");
                break;
            }

            // Fetch + compute in parallel for real chunks; merges below
            // stay sequential on this thread.
            let results: Vec<(GameId, Result<GameDerived, AnalyticsError>)> = if chunk.len() > 1 {
                chunk.par_iter().map(|&id| (id, self.fetch_and_derive(id))).collect()
            } else {
                chunk.iter().map(|&id| (id, self.fetch_and_derive(id))).collect()
            };

            for (game_id, result) in results {
                match result {
                    Ok(derived) => {
                        let merged = self.season.merge_game(
                            game_id,
                            &derived.teams,
                            &derived.goalies,
                            derived.past_regulation,
                            self.config.recent_log_len,
                        );
                        if merged {
                            outcome.report.updated += 1;
                            outcome.routes.extend(derived.routes);
                        } else {
                            outcome.report.skipped_already_processed += 1;
                        }
                    }
                    Err(e) => {
                        warn!("game {} failed: {}", game_id, e);
                        outcome.report.failed += 1;
                        outcome.report.failed_ids.push(game_id);
                    }
                }
            }

            snapshot::save(&self.snapshot_path, &self.season)?;
            info!(
                "checkpoint: {} updated, {} skipped, {} failed",
                outcome.report.updated,
                outcome.report.skipped_already_processed,
                outcome.report.failed
            );
        }

        Ok(outcome)
    }
}
