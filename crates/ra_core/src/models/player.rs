use serde::{Deserialize, Serialize};

/// Goalie catching hand, from the player-metadata source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatchHand {
    Left,
    Right,
}

impl CatchHand {
    /// Parse the single-letter feed code ("L" / "R").
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "L" => Some(CatchHand::Left),
            "R" => Some(CatchHand::Right),
            _ => None,
        }
    }
}
