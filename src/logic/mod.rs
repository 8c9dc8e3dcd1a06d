//! Tournament business logic: setup, registration, rounds, results.
//!
//! Every function validates before it mutates: an `Err` leaves the document untouched.

mod registration;
mod results;
mod rounds;
mod setup;

pub use registration::{register_player, Registration};
pub use results::{record_result, Recorded};
pub use rounds::{generate_round, generate_round_with_rng, Pairings, MIN_PLAYERS_PER_ROUND};
pub use setup::tournament_name;
