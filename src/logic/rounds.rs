//! Round generation: shuffle eligible players and pair them two at a time.

use crate::models::{GameMatch, PlayerId, Tournament, TournamentError, TournamentFormat};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Minimum number of eligible players for a round.
pub const MIN_PLAYERS_PER_ROUND: usize = 2;

/// Pairings produced for a round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pairings {
    pub round: u32,
    pub matches: Vec<GameMatch>,
    pub bye: Option<PlayerId>,
}

/// Generate the next round using the thread-local RNG.
pub fn generate_round(tournament: &mut Tournament) -> Result<Pairings, TournamentError> {
    generate_round_with_rng(tournament, &mut rand::thread_rng())
}

/// Generate the next round.
///
/// 1. Knockout only: refuse while the current round has undecided matches.
/// 2. Collect eligible players (everyone in Open, non-eliminated in Knockout).
/// 3. Shuffle uniformly and form matches from chunks of 2.
/// 4. With an odd count, the last shuffled player gets the bye.
/// 5. Replace `matches`, set `bye`, increment `current_round`.
pub fn generate_round_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<Pairings, TournamentError> {
    if tournament.format == TournamentFormat::Knockout {
        let pending = tournament.pending_matches();
        if pending > 0 {
            return Err(TournamentError::RoundInProgress { pending });
        }
    }

    let mut available = tournament.eligible_players();
    if available.len() < MIN_PLAYERS_PER_ROUND {
        return Err(TournamentError::InsufficientPlayers {
            needed: MIN_PLAYERS_PER_ROUND,
            current: available.len(),
        });
    }

    available.shuffle(rng);

    let bye = if available.len() % 2 == 1 {
        available.pop()
    } else {
        None
    };

    let matches: Vec<GameMatch> = available
        .chunks_exact(2)
        .map(|pair| GameMatch::new(pair[0].clone(), pair[1].clone()))
        .collect();

    // Knockout rounds are closed by their last result; an Open round left
    // without a result is simply replaced.
    tournament.matches = matches;
    tournament.bye = bye;
    tournament.current_round += 1;

    Ok(Pairings {
        round: tournament.current_round,
        matches: tournament.matches.clone(),
        bye: tournament.bye.clone(),
    })
}
