//! Binance REST client.
//!
//! One `reqwest::Client` is shared for connection pooling. Every call is a
//! single HTTP round trip: no retries, no backoff, no clock
//! resynchronization. Signed requests stamp `timestamp` from the local
//! clock; if that drifts past the exchange's `recvWindow` the exchange
//! rejects the request and the rejection is surfaced as-is.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::config::{BinanceSettings, mask_key};

use super::errors::ExecutionError;
use super::signer;
use super::traits::Exchange;
use super::types::{
    AccountInfo, Balance, ExchangeInfo, OrderResponse, OrderType, ServerTime, TradeRequest,
};

const API_KEY_HEADER: &str = "X-MBX-APIKEY";

pub struct BinanceClient {
    base_url: String,
    api_key: String,
    api_secret: String,
    recv_window: Option<u64>,
    http: reqwest::Client,
}

impl BinanceClient {
    pub fn new(settings: &BinanceSettings) -> Self {
        info!(
            "binance client ready: {} (api key {})",
            settings.base_url,
            mask_key(&settings.api_key)
        );

        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            recv_window: settings.recv_window,
            http: reqwest::Client::new(),
        }
    }

    /// Append the trailing authentication parameters. `timestamp` must be
    /// last so the signed string matches what Binance expects to verify.
    fn push_auth_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(window) = self.recv_window {
            params.push(("recvWindow", window.to_string()));
        }
        params.push(("timestamp", Utc::now().timestamp_millis().to_string()));
    }

    fn signed_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let query = signer::signed_query(&self.api_secret, params);
        format!("{}{}?{}", self.base_url, path, query)
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ExecutionError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExecutionError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExecutionError> {
        debug!("GET {}", path);
        let response = self
            .http
            .get(self.signed_url(path, params))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        self.read_response(response).await
    }
}

#[async_trait]
impl Exchange for BinanceClient {
    async fn server_time(&self) -> Result<ServerTime, ExecutionError> {
        let url = format!("{}/api/v3/time", self.base_url);
        let response = self.http.get(url).send().await?;
        self.read_response(response).await
    }

    async fn min_notional(&self, symbol: &str) -> Result<f64, ExecutionError> {
        let url = format!("{}/api/v3/exchangeInfo?symbol={}", self.base_url, symbol);
        let response = self.http.get(url).send().await?;
        let info: ExchangeInfo = self.read_response(response).await?;

        let symbol_info = info
            .symbols
            .into_iter()
            .next()
            .ok_or_else(|| ExecutionError::FilterNotFound(symbol.to_string()))?;

        // Current metadata uses NOTIONAL; older symbols still report the
        // legacy MIN_NOTIONAL name.
        let filter = symbol_info
            .filters
            .iter()
            .find(|f| f.filter_type == "NOTIONAL")
            .or_else(|| {
                symbol_info
                    .filters
                    .iter()
                    .find(|f| f.filter_type == "MIN_NOTIONAL")
            })
            .ok_or_else(|| ExecutionError::FilterNotFound(symbol.to_string()))?;

        filter
            .min_notional
            .as_deref()
            .and_then(|raw| raw.parse::<f64>().ok())
            .ok_or_else(|| ExecutionError::FilterNotFound(symbol.to_string()))
    }

    async fn account_balances(&self) -> Result<Vec<Balance>, ExecutionError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        self.push_auth_params(&mut params);

        let info: AccountInfo = self.signed_get("/api/v3/account", &params).await?;
        Ok(info.balances)
    }

    async fn order_status(&self, order_id: &str) -> Result<OrderResponse, ExecutionError> {
        let mut params: Vec<(&str, String)> = vec![("orderId", order_id.to_string())];
        self.push_auth_params(&mut params);

        self.signed_get("/api/v3/order", &params).await
    }

    async fn execute_trade(&self, trade: &TradeRequest) -> Result<OrderResponse, ExecutionError> {
        let mut params = order_params(trade);
        self.push_auth_params(&mut params);

        debug!(
            "POST /api/v3/order {} {} {}",
            trade.symbol,
            trade.side.as_str(),
            trade.order_type.as_str()
        );

        let response = self
            .http
            .post(self.signed_url("/api/v3/order", &params))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        self.read_response(response).await
    }
}

/// Order placement parameters in the exact order they go on the wire:
/// identity first, sizing per order type, time-in-force for limit orders.
/// Auth parameters are appended afterwards.
fn order_params(trade: &TradeRequest) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&str, String)> = vec![
        ("symbol", trade.symbol.clone()),
        ("side", trade.side.as_str().to_string()),
        ("type", trade.order_type.as_str().to_string()),
    ];

    match trade.order_type {
        OrderType::Market => {
            if let Some(quote_qty) = trade.quote_order_qty {
                params.push(("quoteOrderQty", format_amount(quote_qty)));
            } else if let Some(quantity) = trade.quantity {
                params.push(("quantity", format_amount(quantity)));
            }
        }
        OrderType::Limit => {
            if let Some(quantity) = trade.quantity {
                params.push(("quantity", format_amount(quantity)));
            }
            if let Some(price) = trade.price {
                params.push(("price", format_amount(price)));
            }
            params.push(("timeInForce", "GTC".to_string()));
        }
    }

    params
}

/// Render an amount the way it was given, without scientific notation or
/// trailing zeros.
fn format_amount(value: f64) -> String {
    value.to_string()
}
