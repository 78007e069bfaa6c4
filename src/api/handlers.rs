//! HTTP handlers. Thin shells over the trade service: decode, validate
//! presence, delegate, shape the JSON response.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::execution::{OrderResponse, TradeRequest};
use crate::trade::TradeStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub environment: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        timestamp: Utc::now().to_rfc3339(),
        environment: state.settings.environment.clone(),
    })
}

pub async fn test_binance(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.trade.server_time().await {
        Ok(time) => (
            StatusCode::OK,
            Json(json!({
                "binanceConnected": true,
                "serverTime": time.server_time,
                "message": "Binance connection is working",
            })),
        ),
        Err(err) => {
            error!("binance connectivity check failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "binanceConnected": false,
                    "error": err.to_string(),
                    "message": "Binance connection failed",
                })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    #[serde(rename = "secretKey")]
    pub secret_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
    pub message: &'static str,
}

/// Issue an access token when the caller presents the configured static
/// service credentials. These are unrelated to the Binance key pair.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (api_key, secret_key) = match (request.api_key, request.secret_key) {
        (Some(api_key), Some(secret_key)) => (api_key, secret_key),
        _ => {
            return Err(ApiError::Validation(
                "API key and Secret key are required".into(),
            ));
        }
    };

    let auth = &state.settings.auth;
    if api_key != auth.api_key || secret_key != auth.secret_key {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .auth
        .issue_token("api-client", None, Some("api-user"))
        .map_err(|err| {
            error!("token issuance failed: {}", err);
            ApiError::Internal("authentication error".into())
        })?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: state.auth.token_ttl_secs(),
        message: "Authentication successful",
    }))
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub asset: String,
    pub balance: f64,
    pub message: String,
}

pub async fn get_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(asset): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let asset = asset.to_uppercase();
    debug!("balance lookup for {} by {}", asset, claims.sub);

    let balance = state.trade.get_balance(&asset).await?;
    Ok(Json(BalanceResponse {
        success: true,
        message: format!("Available {} balance on the exchange account", asset),
        asset,
        balance,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarketOrderRequest {
    pub symbol: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "quoteAsset")]
    pub quote_asset: Option<String>,
    #[serde(rename = "baseAsset")]
    pub base_asset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderPlacedResponse {
    pub success: bool,
    #[serde(rename = "orderId")]
    pub order_id: u64,
    #[serde(rename = "tradeId")]
    pub trade_id: Option<u64>,
    #[serde(rename = "type")]
    pub order_type: String,
    pub transaction: OrderResponse,
    pub message: String,
}

/// Market-buy a symbol for an amount of quote currency, after checking
/// the quote-asset balance covers it.
pub async fn buy_crypto(
    State(state): State<AppState>,
    Json(request): Json<MarketOrderRequest>,
) -> Result<Json<OrderPlacedResponse>, ApiError> {
    let (symbol, amount, quote_asset) =
        match (request.symbol, request.amount, request.quote_asset) {
            (Some(symbol), Some(amount), Some(quote_asset)) if amount > 0.0 => {
                (symbol, amount, quote_asset.to_uppercase())
            }
            _ => {
                return Err(ApiError::Validation(
                    "You must provide a crypto symbol, a positive amount, and a quote asset (e.g. EUR, USDT)".into(),
                ));
            }
        };

    let available = state.trade.get_balance(&quote_asset).await?;
    if amount > available {
        return Err(ApiError::InsufficientFunds {
            asset: quote_asset,
            requested: amount,
            available,
        });
    }

    let order = state.trade.buy_crypto(&symbol, amount, &quote_asset).await?;
    let message = format!(
        "Successfully bought {} {} for {} {}",
        order.executed_qty, symbol, amount, quote_asset
    );
    Ok(Json(placed_response(order, message)))
}

/// Market-sell an amount of base asset, after checking the base-asset
/// balance covers it.
pub async fn sell_crypto(
    State(state): State<AppState>,
    Json(request): Json<MarketOrderRequest>,
) -> Result<Json<OrderPlacedResponse>, ApiError> {
    let (symbol, amount, base_asset) =
        match (request.symbol, request.amount, request.base_asset) {
            (Some(symbol), Some(amount), Some(base_asset)) if amount > 0.0 => {
                (symbol, amount, base_asset.to_uppercase())
            }
            _ => {
                return Err(ApiError::Validation(
                    "You must provide a crypto symbol, a positive amount, and a base asset (e.g. BTC, ETH)".into(),
                ));
            }
        };

    let available = state.trade.get_balance(&base_asset).await?;
    if amount > available {
        return Err(ApiError::InsufficientFunds {
            asset: base_asset,
            requested: amount,
            available,
        });
    }

    let order = state
        .trade
        .sell_crypto(&symbol, amount, &base_asset)
        .await?;
    let message = format!(
        "Successfully sold {} {} of {}",
        amount, base_asset, symbol
    );
    Ok(Json(placed_response(order, message)))
}

/// Execute an arbitrary trade request.
pub async fn create_trade(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TradeStatus>), ApiError> {
    // Decode manually so shape errors come back as a 400 with the usual
    // envelope instead of an extractor rejection.
    let trade: TradeRequest = serde_json::from_value(body)
        .map_err(|err| ApiError::Validation(format!("invalid trade request: {}", err)))?;

    let status = state.trade.create_trade(trade).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn trade_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TradeStatus>, ApiError> {
    let status = state.trade.get_trade_status(&id).await?;
    Ok(Json(status))
}

fn placed_response(order: OrderResponse, message: String) -> OrderPlacedResponse {
    let trade_id = order
        .fills
        .as_ref()
        .and_then(|fills| fills.first())
        .map(|fill| fill.trade_id);

    OrderPlacedResponse {
        success: true,
        order_id: order.order_id,
        trade_id,
        order_type: order.order_type.clone(),
        transaction: order,
        message,
    }
}
