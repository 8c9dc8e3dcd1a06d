//! Bracket engine: serialized load → mutate → save around the pure rules in [`crate::logic`].
//!
//! Every mutating operation holds one process-wide lock for the whole
//! load/mutate/save sequence, so concurrent registrations cannot lose each
//! other's updates. The lock wait is bounded; running out of time surfaces as
//! [`EngineError::LockTimeout`]. The document is re-loaded for every
//! operation and only written back after the rules accepted the change, so a
//! failed operation never reaches the store.

use crate::logic::{self, Pairings, Recorded, Registration};
use crate::models::{Prize, Tournament, TournamentError, TournamentFormat, TournamentId};
use crate::payment::{PaymentConfirmation, PaymentDeclined};
use crate::store::{StoreError, TournamentStore};
use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use std::time::Duration;

/// Default bound on waiting for the document lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No document exists yet; create one first.
    #[error("No active tournament")]
    NoActiveTournament(TournamentId),

    /// The rules rejected the operation.
    #[error(transparent)]
    Rejected(#[from] TournamentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Timed out after {0:?} waiting for the tournament lock")]
    LockTimeout(Duration),

    /// Raised by the calling layer before registration reaches the engine.
    #[error("Payment not confirmed: {}", .0.reason)]
    PaymentNotConfirmed(#[from] PaymentDeclined),
}

impl EngineError {
    /// Infrastructure failures that may succeed if the caller tries again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Storage(_) | EngineError::LockTimeout(_))
    }

    /// Message safe to show to API clients (no file paths or parser details).
    pub fn client_message(&self) -> String {
        match self {
            EngineError::Storage(_) => "Could not persist the tournament, try again".to_string(),
            EngineError::LockTimeout(_) => "Tournament is busy, try again".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Updated document plus the operation's own result.
#[derive(Clone, Debug, PartialEq)]
pub struct Applied<T> {
    pub tournament: Tournament,
    pub outcome: T,
}

/// Result of [`BracketEngine::register_with_payment`].
#[derive(Clone, Debug, PartialEq)]
pub struct PaidRegistration {
    pub registration: Registration,
    /// Present only when the entry fee was charged by this call.
    pub payment: Option<PaymentConfirmation>,
}

/// Runs tournament operations against a [`TournamentStore`].
pub struct BracketEngine<S> {
    store: S,
    lock: Mutex<()>,
    lock_timeout: Duration,
}

impl<S: TournamentStore> BracketEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Create (or overwrite) the tournament `id`.
    pub fn create_tournament(
        &self,
        id: TournamentId,
        name: &str,
        format: TournamentFormat,
    ) -> Result<Tournament, EngineError> {
        let name = logic::tournament_name(name)?;
        let _guard = self.acquire()?;
        let tournament = self.store.create(id, name, format).inspect_err(log_store_error)?;
        log::info!("Created tournament {} ({:?}) \"{}\"", id, format, tournament.name);
        Ok(tournament)
    }

    /// Current document without taking the lock.
    pub fn snapshot(&self, id: TournamentId) -> Result<Tournament, EngineError> {
        self.store
            .load(id)?
            .ok_or(EngineError::NoActiveTournament(id))
    }

    /// Current document, creating an Open tournament named `default_name` on first access.
    pub fn load_or_create(
        &self,
        id: TournamentId,
        default_name: &str,
    ) -> Result<Tournament, EngineError> {
        if let Some(tournament) = self.store.load(id)? {
            return Ok(tournament);
        }
        let name = logic::tournament_name(default_name)?;
        let _guard = self.acquire()?;
        // Someone may have created it while we waited.
        if let Some(tournament) = self.store.load(id)? {
            return Ok(tournament);
        }
        let tournament = self
            .store
            .create(id, name, TournamentFormat::Open)
            .inspect_err(log_store_error)?;
        log::info!("Created tournament {} \"{}\" on first access", id, tournament.name);
        Ok(tournament)
    }

    /// Register a player whose entry fee is already confirmed.
    pub fn register_player(
        &self,
        id: TournamentId,
        player: &str,
        confirmation: &PaymentConfirmation,
    ) -> Result<Applied<Registration>, EngineError> {
        let applied = self.apply(id, |t| logic::register_player(t, player))?;
        match applied.outcome {
            Registration::Added => log::info!(
                "Registered {} in tournament {} (payment {})",
                player.trim(),
                id,
                confirmation.token
            ),
            Registration::AlreadyRegistered => {
                log::info!("{} already registered in tournament {}", player.trim(), id)
            }
        }
        Ok(applied)
    }

    /// Check, charge and register in one locked step.
    ///
    /// `charge` runs only if the player is not registered yet, and the lock is
    /// held until the registration is saved, so a player is charged at most once.
    pub fn register_with_payment(
        &self,
        id: TournamentId,
        player: &str,
        charge: impl FnOnce(&Tournament, &str) -> Result<PaymentConfirmation, PaymentDeclined>,
    ) -> Result<Applied<PaidRegistration>, EngineError> {
        let player = player.trim();
        let applied = self.apply(id, |t| -> Result<PaidRegistration, EngineError> {
            if player.is_empty() {
                return Err(TournamentError::InvalidPlayerName.into());
            }
            if t.is_registered(player) {
                return Ok(PaidRegistration {
                    registration: Registration::AlreadyRegistered,
                    payment: None,
                });
            }
            let confirmation = charge(t, player)?;
            let registration = logic::register_player(t, player)?;
            Ok(PaidRegistration {
                registration,
                payment: Some(confirmation),
            })
        })?;
        match &applied.outcome.payment {
            Some(payment) => log::info!(
                "Registered {} in tournament {} (payment {})",
                player,
                id,
                payment.token
            ),
            None => log::info!("{} already registered in tournament {}, not charged", player, id),
        }
        Ok(applied)
    }

    /// Shuffle and pair the next round.
    pub fn generate_round(&self, id: TournamentId) -> Result<Applied<Pairings>, EngineError> {
        self.generate_round_with_rng(id, &mut rand::thread_rng())
    }

    /// Same as [`BracketEngine::generate_round`] with a caller-supplied RNG.
    pub fn generate_round_with_rng<R: Rng + ?Sized>(
        &self,
        id: TournamentId,
        rng: &mut R,
    ) -> Result<Applied<Pairings>, EngineError> {
        let applied = self.apply(id, |t| logic::generate_round_with_rng(t, rng))?;
        log::info!(
            "Tournament {} round {}: {} match(es), bye: {:?}",
            id,
            applied.outcome.round,
            applied.outcome.matches.len(),
            applied.outcome.bye
        );
        Ok(applied)
    }

    /// Record `winner` and add `prize` to their ledger entry.
    pub fn record_result(
        &self,
        id: TournamentId,
        winner: &str,
        prize: Prize,
    ) -> Result<Applied<Recorded>, EngineError> {
        let applied = self.apply(id, |t| logic::record_result(t, winner, prize))?;
        log::info!(
            "Tournament {}: {} won {} (total {}), round closed: {}",
            id,
            applied.outcome.winner,
            prize,
            applied.outcome.total_prize,
            applied.outcome.round_closed
        );
        Ok(applied)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>, EngineError> {
        self.lock.try_lock_for(self.lock_timeout).ok_or_else(|| {
            log::warn!(
                "Gave up waiting {:?} for the tournament lock",
                self.lock_timeout
            );
            EngineError::LockTimeout(self.lock_timeout)
        })
    }

    /// Lock, load a fresh copy, apply `op`, and persist only if the document changed.
    fn apply<T, E: Into<EngineError>>(
        &self,
        id: TournamentId,
        op: impl FnOnce(&mut Tournament) -> Result<T, E>,
    ) -> Result<Applied<T>, EngineError> {
        let _guard = self.acquire()?;
        let original = self
            .store
            .load(id)
            .inspect_err(log_store_error)?
            .ok_or(EngineError::NoActiveTournament(id))?;

        let mut tournament = original.clone();
        let outcome = op(&mut tournament).map_err(Into::<EngineError>::into)?;

        if tournament != original {
            tournament.updated_at = Utc::now();
            debug_assert!(tournament.is_consistent());
            self.store.save(&tournament).inspect_err(log_store_error)?;
        }
        Ok(Applied {
            tournament,
            outcome,
        })
    }
}

fn log_store_error(e: &StoreError) {
    log::error!("Tournament store failed: {}", e);
}
