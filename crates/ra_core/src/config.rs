//! Centralized engine configuration.
//!
//! Every numeric table the engine consumes lives here: shot-quality
//! multipliers, detector windows, clustering parameters, fetch policy and
//! checkpoint cadence. Detectors and the classifier receive this structure
//! at construction instead of carrying their own inline constants.
//!
//! ## Usage
//!
//! ```rust
//! use ra_core::config::EngineConfig;
//!
//! // Canonical constants
//! let config = EngineConfig::default();
//!
//! // Constants carried over from the older season scripts (6 s rush window)
//! let legacy = EngineConfig::legacy();
//!
//! // From environment variable
//! let from_env = EngineConfig::from_env_or_default();
//! ```
//!
//! ## Environment Variables
//!
//! - `RA_PROFILE`: select preset (`legacy`, `default`)

use serde::{Deserialize, Serialize};
use std::env;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shot-quality (expected goal) weight tables
    pub xg: XgWeights,
    /// Pattern-detector windows and thresholds
    pub windows: DetectorWindows,
    /// Goal-route clustering parameters
    pub cluster: ClusterParams,
    /// Network fetch policy (timeout / bounded retries / rate limit)
    pub fetch: FetchPolicy,
    /// Snapshot checkpoint cadence, in games
    pub checkpoint_every: usize,
    /// Bounded length of the per-entity recent-game logs
    pub recent_log_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xg: XgWeights::default(),
            windows: DetectorWindows::default(),
            cluster: ClusterParams::default(),
            fetch: FetchPolicy::default(),
            checkpoint_every: 10,
            recent_log_len: 30,
        }
    }
}

impl EngineConfig {
    /// Constants matching the older season scripts: 6 s rush window.
    /// Kept selectable so historical runs can be reproduced.
    pub fn legacy() -> Self {
        Self {
            windows: DetectorWindows { rush_secs: 6.0, ..DetectorWindows::default() },
            ..Self::default()
        }
    }

    /// Load from environment variable RA_PROFILE or use default.
    pub fn from_env_or_default() -> Self {
        match env::var("RA_PROFILE").unwrap_or_default().to_lowercase().as_str() {
            "legacy" => Self::legacy(),
            _ => Self::default(),
        }
    }
}

/// Expected-goal weight tables. All values are plain multipliers; the scorer
/// is a pure product of the looked-up factors, capped at `cap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgWeights {
    /// Distance bucket upper bounds (feet) paired with base values
    pub dist_buckets: [(f64, f64); 4],
    /// Base value past the last distance bucket
    pub dist_floor: f64,
    /// Off-center angle thresholds (degrees) paired with multipliers,
    /// checked steepest first
    pub angle_tiers: [(f64, f64); 3],
    /// High-danger zone multiplier
    pub zone_high_danger: f64,
    /// "Good position" multiplier (close and central, offensive zone)
    pub zone_good_position: f64,
    /// Remaining offensive zone multiplier
    pub zone_offensive: f64,
    /// Neutral zone multiplier
    pub zone_neutral: f64,
    /// Defensive zone multiplier
    pub zone_defensive: f64,
    /// Distance bound of the "good position" band (feet)
    pub good_position_dist: f64,
    /// Lateral bound of the "good position" band (feet)
    pub good_position_lateral: f64,
    /// Tip-in / deflection / backhand multiplier
    pub type_tip: f64,
    /// Wrap-around multiplier
    pub type_wrap: f64,
    /// One-timer multiplier
    pub type_one_timer: f64,
    /// Slap shot multiplier
    pub type_slap: f64,
    /// Missed-net outcome multiplier
    pub outcome_missed: f64,
    /// Blocked-attempt outcome multiplier
    pub outcome_blocked: f64,
    /// Hard upper bound on any single shot value
    pub cap: f64,
}

impl Default for XgWeights {
    fn default() -> Self {
        Self {
            dist_buckets: [(10.0, 0.25), (20.0, 0.15), (35.0, 0.08), (50.0, 0.04)],
            dist_floor: 0.02,
            angle_tiers: [(45.0, 0.3), (30.0, 0.5), (15.0, 0.8)],
            zone_high_danger: 1.5,
            zone_good_position: 1.2,
            zone_offensive: 0.8,
            zone_neutral: 0.3,
            zone_defensive: 0.1,
            good_position_dist: 29.0,
            good_position_lateral: 25.0,
            type_tip: 1.3,
            type_wrap: 1.1,
            type_one_timer: 1.2,
            type_slap: 0.9,
            outcome_missed: 0.7,
            outcome_blocked: 0.5,
            cap: 0.95,
        }
    }
}

/// Pattern-detector windows and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorWindows {
    /// Rebound look-back window (seconds), shared by the team-keyed and
    /// goalie-keyed scans
    pub rebound_secs: f64,
    /// Rush look-back window (seconds)
    pub rush_secs: f64,
    /// Continuous offensive-zone possession required for a cycle shot (seconds)
    pub cycle_hold_secs: f64,
    /// Goalie angle-tier boundary (degrees): at or under is Center, over is Acute
    pub goalie_center_angle_deg: f64,
    /// Carrier proximity at the blue-line crossing (feet)
    pub entry_proximity_ft: f64,
    /// Frames scanned after the crossing for a possession verdict
    pub entry_window_frames: usize,
}

impl Default for DetectorWindows {
    fn default() -> Self {
        Self {
            rebound_secs: 3.0,
            rush_secs: 4.0,
            cycle_hold_secs: 10.0,
            goalie_center_angle_deg: 35.0,
            entry_proximity_ft: 6.0,
            entry_window_frames: 40,
        }
    }
}

/// Goal-route clustering parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterParams {
    /// DBSCAN neighborhood radius in feature space
    pub eps: f64,
    /// Minimum neighborhood population for a core point
    pub min_samples: usize,
    /// Scale applied to the curvature ratio in the 5-D feature vector
    pub curvature_scale: f64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self { eps: 8.0, min_samples: 3, curvature_scale: 25.0 }
    }
}

/// Bounded fetch policy for the external sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchPolicy {
    /// Timeout source adapters are required to honor (seconds)
    pub timeout_secs: f64,
    /// Retries on transient failures before the game is marked failed
    pub max_retries: u32,
    /// Minimum spacing between tracking-feed calls (milliseconds)
    pub tracking_min_interval_ms: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self { timeout_secs: 10.0, max_retries: 3, tracking_min_interval_ms: 500 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!((config.windows.rush_secs - 4.0).abs() < 1e-9);
        assert!((config.windows.rebound_secs - 3.0).abs() < 1e-9);
        assert!((config.xg.cap - 0.95).abs() < 1e-9);
        assert_eq!(config.checkpoint_every, 10);
    }

    #[test]
    fn test_legacy_preset() {
        let config = EngineConfig::legacy();
        // Legacy scripts scanned a wider rush window
        assert!((config.windows.rush_secs - 6.0).abs() < 1e-9);
        // Everything else unchanged
        assert!((config.windows.rebound_secs - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_env_default() {
        // Without env var, should return default
        let config = EngineConfig::from_env_or_default();
        assert!((config.windows.rush_secs - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).expect("Should serialize");
        let parsed: EngineConfig = serde_json::from_str(&json).expect("Should deserialize");
        assert!((parsed.xg.zone_high_danger - config.xg.zone_high_danger).abs() < 1e-9);
        assert_eq!(parsed.windows.entry_window_frames, config.windows.entry_window_frames);
    }
}
