//! Entry-fee payment collaborator.
//!
//! Registration is gated on a [`PaymentConfirmation`]. The calling layer asks a
//! [`PaymentGateway`] for one and only then calls the engine; the engine never
//! talks to a payment service itself.

use serde::{Deserialize, Serialize};

/// What the gateway is asked to charge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub description: String,
    /// How to reach the payer (e-mail address in practice).
    pub payer_contact: String,
}

impl PaymentRequest {
    /// Entry-fee request for `player` in `tournament_name`.
    pub fn entry_fee(
        tournament_name: &str,
        player: &str,
        amount: f64,
        payer_contact: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            description: format!("Entry fee {tournament_name} - {player}"),
            payer_contact: payer_contact.into(),
        }
    }
}

/// Proof that a payment went through.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub token: String,
}

impl PaymentConfirmation {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Gateway refused or failed to take the payment.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Payment declined: {reason}")]
pub struct PaymentDeclined {
    pub reason: String,
}

impl PaymentDeclined {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// External payment service.
pub trait PaymentGateway: Send + Sync {
    fn confirm(&self, request: &PaymentRequest) -> Result<PaymentConfirmation, PaymentDeclined>;
}

/// Gateway used when no payment provider is configured: every request is
/// confirmed without charging anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipPayment;

impl PaymentGateway for SkipPayment {
    fn confirm(&self, request: &PaymentRequest) -> Result<PaymentConfirmation, PaymentDeclined> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(PaymentDeclined::new(format!(
                "amount must be positive, got {}",
                request.amount
            )));
        }
        log::warn!(
            "No payment provider configured; accepting \"{}\" ({}) without charging",
            request.description,
            request.amount
        );
        Ok(PaymentConfirmation::new(format!(
            "skipped-{}",
            uuid::Uuid::new_v4()
        )))
    }
}
