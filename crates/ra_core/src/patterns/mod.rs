//! # Pattern Detection
//!
//! Possession-pattern extraction over ordered event and tracking data.
//!
//! ## Submodules
//!
//! - `possession` - chain terminators, rebound / rush / cycle scans,
//!   turnover classification
//! - `strength` - on-ice strength reconstruction from penalty events
//! - `zone_entry` - carry / pass / dump classification over tracking frames

mod possession;
mod strength;
mod zone_entry;

pub use possession::{is_chain_terminator, is_forecheck_takeaway, PatternDetector};
pub use strength::StrengthTracker;
pub use zone_entry::{classify_entry, TrackingFrame, PUCK_ENTITY};
