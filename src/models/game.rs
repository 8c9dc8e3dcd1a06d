//! Match (pairing) and closed-round records.

use crate::models::tournament::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// A single 1v1 pairing in the current round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub player_1: PlayerId,
    pub player_2: PlayerId,
    /// None if not yet played.
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

impl GameMatch {
    pub fn new(player_1: impl Into<PlayerId>, player_2: impl Into<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_1: player_1.into(),
            player_2: player_2.into(),
            winner: None,
        }
    }

    pub fn involves(&self, player: &str) -> bool {
        self.player_1 == player || self.player_2 == player
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// The other side of the pairing, if `player` is in it.
    pub fn opponent_of(&self, player: &str) -> Option<&PlayerId> {
        if self.player_1 == player {
            Some(&self.player_2)
        } else if self.player_2 == player {
            Some(&self.player_1)
        } else {
            None
        }
    }
}

/// A round that has been closed out, kept for display and auditing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub matches: Vec<GameMatch>,
    /// Player who sat out (or advanced automatically) this round.
    pub bye: Option<PlayerId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_lookup() {
        let m = GameMatch::new("A", "B");
        assert_eq!(m.opponent_of("A").map(String::as_str), Some("B"));
        assert_eq!(m.opponent_of("B").map(String::as_str), Some("A"));
        assert_eq!(m.opponent_of("C"), None);
        assert!(m.involves("A"));
        assert!(!m.is_decided());
    }
}
