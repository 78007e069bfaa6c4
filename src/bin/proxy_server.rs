//! Crypto proxy service: authenticated HTTP gateway in front of the
//! Binance spot API.

use std::sync::Arc;

use anyhow::Context;

use crypto_proxy::api::{AppState, routes::create_router};
use crypto_proxy::auth::AuthState;
use crypto_proxy::config::Settings;
use crypto_proxy::execution::BinanceClient;
use crypto_proxy::logging::init_logging;
use crypto_proxy::trade::TradeService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    // Refuse to start without exchange credentials and a signing secret.
    let settings = Settings::from_env().context("configuration is incomplete")?;

    let exchange = Arc::new(BinanceClient::new(&settings.binance));
    let trade = Arc::new(TradeService::new(exchange));
    let auth = AuthState::new(&settings.auth);

    let state = AppState {
        settings: Arc::new(settings),
        auth,
        trade,
    };

    let addr = format!("0.0.0.0:{}", state.settings.port);
    let app = create_router(state);

    log::info!("crypto proxy service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
