//! Data structures for the prize bracket: tournament document, matches, round history.

mod game;
mod tournament;

pub use game::{GameMatch, MatchId, RoundRecord};
pub use tournament::{
    PlayerId, Prize, Tournament, TournamentError, TournamentFormat, TournamentId,
};
