use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skylane_api::{app, state::AuthConfig, AppState};
use skylane_booking::BookingService;
use skylane_core::FareEngine;
use skylane_store::{app_config::Config, seed, FlightCatalog, SeatLedger, UserStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    // Shared in-process inventory store
    let ledger = Arc::new(SeatLedger::new(Duration::from_millis(
        config.ledger.lock_timeout_ms,
    )));
    let catalog = Arc::new(FlightCatalog::new(ledger.clone()));
    let users = Arc::new(UserStore::new());

    let seeded = seed::seed_flights(&ledger, Utc::now())
        .await
        .expect("Failed to seed flight inventory");
    tracing::info!("Seeded {} flights", seeded);

    let service = Arc::new(BookingService::new(
        ledger,
        catalog,
        users.clone(),
        FareEngine::new(config.pricing.clone()),
    ));

    let app_state = AppState {
        service,
        users,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service()).await.unwrap();
}
