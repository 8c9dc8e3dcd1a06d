//! Result recording: book the prize and close out matches / rounds.

use crate::models::{PlayerId, Prize, Tournament, TournamentError, TournamentFormat};
use serde::Serialize;

/// What a recorded result changed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recorded {
    pub winner: PlayerId,
    /// Winner's prize total after this result.
    pub total_prize: Prize,
    /// Player eliminated by this result (Knockout only).
    pub eliminated: Option<PlayerId>,
    /// Whether the current round was closed and archived.
    pub round_closed: bool,
}

/// Record `winner` (trimmed) with `prize`.
///
/// Open: adds the prize, marks the winner's match if any, then closes the whole round.
/// Knockout: the winner must have an undecided match; the opponent is eliminated and
/// the round closes once every match has a winner.
pub fn record_result(
    tournament: &mut Tournament,
    winner: &str,
    prize: Prize,
) -> Result<Recorded, TournamentError> {
    let winner = winner.trim();
    let current = tournament
        .prize_of(winner)
        .ok_or_else(|| TournamentError::UnknownWinner(winner.to_string()))?;
    if !prize.is_finite() || prize < 0.0 {
        return Err(TournamentError::InvalidPrize(prize));
    }
    // The ledger is persisted as JSON, which has no representation for infinity.
    let total_prize = current + prize;
    if !total_prize.is_finite() {
        return Err(TournamentError::InvalidPrize(prize));
    }

    let pending_idx = tournament
        .matches
        .iter()
        .position(|m| !m.is_decided() && m.involves(winner));

    let mut eliminated = None;
    match tournament.format {
        TournamentFormat::Open => {
            if let Some(idx) = pending_idx {
                tournament.matches[idx].winner = Some(winner.to_string());
            }
        }
        TournamentFormat::Knockout => {
            let idx = pending_idx.ok_or_else(|| TournamentError::NotInCurrentRound(winner.to_string()))?;
            let m = &mut tournament.matches[idx];
            m.winner = Some(winner.to_string());
            let loser = m.opponent_of(winner).cloned();
            if let Some(loser) = loser {
                if !tournament.is_eliminated(&loser) {
                    tournament.eliminated.push(loser.clone());
                }
                eliminated = Some(loser);
            }
        }
    }

    tournament.prizes.insert(winner.to_string(), total_prize);

    let round_open = !tournament.matches.is_empty() || tournament.bye.is_some();
    let round_closed = round_open
        && match tournament.format {
            TournamentFormat::Open => true,
            TournamentFormat::Knockout => tournament.pending_matches() == 0,
        };
    if round_closed {
        tournament.close_round();
    }

    Ok(Recorded {
        winner: winner.to_string(),
        total_prize,
        eliminated,
        round_closed,
    })
}
