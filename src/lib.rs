//! Prize bracket web app: library with the tournament document, rules, store and engine.

pub mod api;
pub mod config;
pub mod engine;
pub mod logic;
pub mod models;
pub mod payment;
pub mod store;

pub use config::ServerConfig;
pub use engine::{Applied, BracketEngine, EngineError, PaidRegistration, DEFAULT_LOCK_TIMEOUT};
pub use logic::{
    generate_round, generate_round_with_rng, record_result, register_player, tournament_name,
    Pairings, Recorded, Registration, MIN_PLAYERS_PER_ROUND,
};
pub use models::{
    GameMatch, MatchId, PlayerId, Prize, RoundRecord, Tournament, TournamentError,
    TournamentFormat, TournamentId,
};
pub use payment::{
    PaymentConfirmation, PaymentDeclined, PaymentGateway, PaymentRequest, SkipPayment,
};
pub use store::{JsonFileStore, MemoryStore, StoreError, TournamentStore};
