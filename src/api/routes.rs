//! Route table for the proxy service.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::AppState;
use super::handlers;
use crate::auth::middleware::require_auth;

pub fn create_router(state: AppState) -> Router {
    // Everything below the auth layer sees verified claims in the request
    // extensions.
    let protected = Router::new()
        .route("/balance/:asset", get(handlers::get_balance))
        .route("/trade/buy-crypto", post(handlers::buy_crypto))
        .route("/trade/sell-crypto", post(handlers::sell_crypto))
        .route("/api/trade/create", post(handlers::create_trade))
        .route("/api/trade/status/:id", get(handlers::trade_status))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/test-binance", get(handlers::test_binance))
        .route("/auth/login", post(handlers::login))
        .merge(protected)
        .with_state(state)
}
