//! # ra_core - Hockey Event-Stream Analytics Engine
//!
//! Derives tactical analytics from ordered, timestamped play-by-play
//! event logs annotated with rink coordinates: a deterministic
//! expected-goal value per shot, high-danger classification, rush /
//! cycle / rebound possession patterns, zone-transition turnover counts,
//! and goalie shot-side/danger splits, accumulated resumably across a
//! season.
//!
//! ## Features
//! - Deterministic scoring (identical inputs, identical bits)
//! - Direction-aware rink geometry (attacking-frame transforms per period)
//! - Idempotent, checkpointed season accumulation with atomic snapshots
//! - External feeds behind traits with bounded timeouts and retries

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod goalie;
pub mod models;
pub mod patterns;
pub mod quality;
pub mod rink;
pub mod season;
pub mod sources;

pub use config::EngineConfig;
pub use engine::{BatchOutcome, BatchReport, BatchRunner, GameProcessor};
pub use error::{AnalyticsError, Result};
pub use season::{SeasonAccumulator, snapshot::SNAPSHOT_VERSION};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
