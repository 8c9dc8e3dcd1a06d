//! REST API over the bracket engine.
//!
//! Every response body carries `status` ("success" / "error") and a
//! human-readable `message`. Engine calls run on the blocking pool because
//! they wait on the document lock and on disk I/O.

use crate::config::ServerConfig;
use crate::engine::{BracketEngine, EngineError};
use crate::logic::Registration;
use crate::models::{TournamentError, TournamentFormat, TournamentId};
use crate::payment::{PaymentGateway, PaymentRequest};
use crate::store::TournamentStore;
use actix_web::{
    get, http::StatusCode, post, put,
    web::{self, Data, Json, Path},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Engine type shared by all handlers.
pub type Engine = BracketEngine<Arc<dyn TournamentStore>>;

const DEFAULT_NEW_TOURNAMENT_NAME: &str = "New Tournament";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct SuccessBody<T: Serialize> {
    status: &'static str,
    message: String,
    #[serde(flatten)]
    data: T,
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    retryable: bool,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    format: TournamentFormat,
}

#[derive(Deserialize)]
struct RegisterPlayerBody {
    #[serde(alias = "player_id")]
    player: Option<String>,
    payer_contact: Option<String>,
    amount: Option<f64>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner: Option<String>,
    prize: Option<f64>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

fn success<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    HttpResponse::Ok().json(SuccessBody {
        status: "success",
        message: message.into(),
        data,
    })
}

fn failure(code: StatusCode, message: impl Into<String>, retryable: bool) -> HttpResponse {
    HttpResponse::build(code).json(ErrorBody {
        status: "error",
        message: message.into(),
        retryable,
    })
}

/// HTTP status for an engine error.
pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NoActiveTournament(_) => StatusCode::NOT_FOUND,
        EngineError::Rejected(
            TournamentError::InvalidPrize(_)
            | TournamentError::InvalidPlayerName
            | TournamentError::InvalidTournamentName,
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Rejected(_) => StatusCode::BAD_REQUEST,
        EngineError::PaymentNotConfirmed(_) => StatusCode::PAYMENT_REQUIRED,
        EngineError::LockTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &EngineError) -> HttpResponse {
    failure(status_for(err), err.client_message(), err.is_retryable())
}

fn missing_data() -> HttpResponse {
    failure(StatusCode::BAD_REQUEST, "Missing data", false)
}

/// Run an engine call on the blocking pool and map its error to a response.
async fn run<T, F>(engine: Data<Engine>, op: F) -> Result<T, HttpResponse>
where
    F: FnOnce(&Engine) -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    match web::block(move || op(&engine)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(error_response(&e)),
        Err(e) => {
            log::error!("Blocking task failed: {}", e);
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                true,
            ))
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "prize-bracket-web",
    })
}

/// Create a new tournament under a fresh id.
#[post("/api/tournaments")]
async fn api_create_tournament(
    engine: Data<Engine>,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    create(engine, Uuid::new_v4(), body.map(Json::into_inner)).await
}

/// Create (or overwrite) the tournament at `id`.
#[put("/api/tournaments/{id}")]
async fn api_put_tournament(
    engine: Data<Engine>,
    path: Path<TournamentPath>,
    body: Option<Json<CreateTournamentBody>>,
) -> HttpResponse {
    create(engine, path.id, body.map(Json::into_inner)).await
}

async fn create(
    engine: Data<Engine>,
    id: TournamentId,
    body: Option<CreateTournamentBody>,
) -> HttpResponse {
    let (name, format) = match body {
        Some(b) => (
            b.name.unwrap_or_else(|| DEFAULT_NEW_TOURNAMENT_NAME.to_string()),
            b.format,
        ),
        None => (DEFAULT_NEW_TOURNAMENT_NAME.to_string(), TournamentFormat::default()),
    };
    match run(engine, move |e| e.create_tournament(id, &name, format)).await {
        Ok(t) => success(
            format!("Tournament '{}' created", t.name),
            serde_json::json!({ "tournament": t }),
        ),
        Err(resp) => resp,
    }
}

/// Current tournament; created with the configured default name on first access.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(
    engine: Data<Engine>,
    config: Data<ServerConfig>,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let id = path.id;
    let name = config.default_tournament_name.clone();
    match run(engine, move |e| e.load_or_create(id, &name)).await {
        Ok(t) => success(
            format!("Tournament '{}'", t.name),
            serde_json::json!({ "champion": t.champion(), "tournament": t }),
        ),
        Err(resp) => resp,
    }
}

/// Take the entry fee through the payment gateway, then register the player.
/// The check, the charge and the registration run under the engine lock, so
/// players already registered are never charged again.
#[post("/api/tournaments/{id}/players")]
async fn api_register_player(
    engine: Data<Engine>,
    gateway: Data<dyn PaymentGateway>,
    path: Path<TournamentPath>,
    body: Json<RegisterPlayerBody>,
) -> HttpResponse {
    let id = path.id;
    let RegisterPlayerBody {
        player,
        payer_contact,
        amount,
    } = body.into_inner();
    let (Some(player), Some(payer_contact), Some(amount)) = (
        player.filter(|p| !p.trim().is_empty()),
        payer_contact.filter(|c| !c.trim().is_empty()),
        amount,
    ) else {
        return missing_data();
    };
    let player = player.trim().to_string();

    let result = run(engine, move |engine| {
        engine.register_with_payment(id, &player, |tournament, player| {
            let request =
                PaymentRequest::entry_fee(&tournament.name, player, amount, payer_contact);
            gateway.confirm(&request).inspect_err(|e| {
                log::warn!("Registration of {} in {} refused: {}", player, id, e);
            })
        })
    })
    .await;

    match result {
        Ok(applied) => {
            let message = match applied.outcome.registration {
                Registration::Added => "Player registered",
                Registration::AlreadyRegistered => "Player already registered, not charged",
            };
            success(
                message,
                serde_json::json!({
                    "outcome": applied.outcome.registration,
                    "payment": applied.outcome.payment,
                    "tournament": applied.tournament,
                }),
            )
        }
        Err(resp) => resp,
    }
}

/// Shuffle and pair the next round.
#[post("/api/tournaments/{id}/rounds")]
async fn api_generate_round(engine: Data<Engine>, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    match run(engine, move |e| e.generate_round(id)).await {
        Ok(applied) => success(
            format!("Round {} generated", applied.outcome.round),
            serde_json::json!({
                "pairings": applied.outcome,
                "tournament": applied.tournament,
            }),
        ),
        Err(resp) => resp,
    }
}

/// Record a winner and their prize.
#[post("/api/tournaments/{id}/results")]
async fn api_record_result(
    engine: Data<Engine>,
    path: Path<TournamentPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let id = path.id;
    let RecordResultBody { winner, prize } = body.into_inner();
    let (Some(winner), Some(prize)) = (winner.filter(|w| !w.trim().is_empty()), prize) else {
        return missing_data();
    };
    let winner = winner.trim().to_string();
    match run(engine, move |e| e.record_result(id, &winner, prize)).await {
        Ok(applied) => success(
            format!("Winner {} recorded", applied.outcome.winner),
            serde_json::json!({
                "result": applied.outcome,
                "prizes": applied.tournament.prizes,
                "tournament": applied.tournament,
            }),
        ),
        Err(resp) => resp,
    }
}

/// Register all API routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_put_tournament)
        .service(api_get_tournament)
        .service(api_register_player)
        .service(api_generate_round)
        .service(api_record_result);
}
