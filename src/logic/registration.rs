//! Registration: add a player and open their prize ledger entry.

use crate::models::{Tournament, TournamentError};
use serde::Serialize;

/// Outcome of a registration. Registering twice is a no-op, not an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Added,
    AlreadyRegistered,
}

/// Register `player` (trimmed). Appends to `players` and sets `prizes[player] = 0`.
///
/// Payment is not checked here; callers must only invoke this after the payment
/// collaborator confirmed the entry fee.
pub fn register_player(
    tournament: &mut Tournament,
    player: &str,
) -> Result<Registration, TournamentError> {
    let player = player.trim();
    if player.is_empty() {
        return Err(TournamentError::InvalidPlayerName);
    }
    if tournament.is_registered(player) {
        return Ok(Registration::AlreadyRegistered);
    }
    tournament.players.push(player.to_string());
    tournament.prizes.insert(player.to_string(), 0.0);
    Ok(Registration::Added)
}
