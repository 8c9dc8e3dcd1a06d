//! Single binary web server: JSON API over the file-backed bracket engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST, PORT, DATA_DIR, LOCK_TIMEOUT_MS,
//! DEFAULT_TOURNAMENT_ID, DEFAULT_TOURNAMENT_NAME.

use actix_web::{web::Data, App, HttpServer};
use prize_bracket_web::{
    api, BracketEngine, JsonFileStore, PaymentGateway, ServerConfig, SkipPayment, TournamentStore,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Storing tournaments in {}", config.data_dir.display());

    let store: Arc<dyn TournamentStore> = Arc::new(JsonFileStore::new(&config.data_dir));
    let engine = BracketEngine::new(store).with_lock_timeout(config.lock_timeout);

    // Seed the default tournament so the first request finds one.
    match engine.load_or_create(config.default_tournament_id, &config.default_tournament_name) {
        Ok(t) => log::info!(
            "Default tournament {} \"{}\" (round {}, {} players)",
            t.id,
            t.name,
            t.current_round,
            t.players.len()
        ),
        Err(e) => {
            log::error!("Could not load or create the default tournament: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    }

    let engine = Data::new(engine);
    let gateway: Data<dyn PaymentGateway> = Data::from(Arc::new(SkipPayment) as Arc<dyn PaymentGateway>);
    let config = Data::new(config);

    let (host, port) = config.bind_addr();
    let bind = (host.to_string(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(engine.clone())
            .app_data(gateway.clone())
            .app_data(config.clone())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
