//! Wire shapes for the Binance spot REST API (`/api/v3/`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

/// An order request as accepted by the gateway.
///
/// Sizing rules: MARKET orders take `quote_order_qty` (spend in quote
/// currency) or `quantity` (base asset amount), exactly one of the two.
/// LIMIT orders take `quantity` and `price` and are sent good-till-
/// cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "quoteOrderQty", skip_serializing_if = "Option::is_none")]
    pub quote_order_qty: Option<f64>,
}

/// GET `/api/v3/time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTime {
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

/// GET `/api/v3/exchangeInfo?symbol=...` — only the filter data the
/// gateway consumes.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub filters: Vec<SymbolFilter>,
}

/// One entry of a symbol's filter list. Filters are heterogeneous; only
/// the notional variants carry `minNotional`.
#[derive(Debug, Deserialize)]
pub struct SymbolFilter {
    #[serde(rename = "filterType")]
    pub filter_type: String,
    #[serde(rename = "minNotional", default)]
    pub min_notional: Option<String>,
}

/// GET `/api/v3/account`.
#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub balances: Vec<Balance>,
}

/// A single asset balance. Amounts stay decimal strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

/// Order placement / lookup response.
///
/// POST `/api/v3/order` reports `transactTime`; GET `/api/v3/order`
/// reports `time` instead. Both are kept so normalization can pick
/// whichever is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub symbol: String,
    #[serde(rename = "orderId")]
    pub order_id: u64,
    pub status: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    #[serde(rename = "executedQty", default)]
    pub executed_qty: String,
    #[serde(default)]
    pub price: String,
    #[serde(rename = "transactTime", default, skip_serializing_if = "Option::is_none")]
    pub transact_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Fill>>,
}

impl OrderResponse {
    /// Millisecond timestamp of the transaction, whichever field the
    /// endpoint populated.
    pub fn transaction_time(&self) -> Option<u64> {
        self.transact_time.or(self.time)
    }
}

/// A partial execution reported inside an order placement response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub price: String,
    pub qty: String,
    pub commission: String,
    #[serde(rename = "commissionAsset")]
    pub commission_asset: String,
    #[serde(rename = "tradeId")]
    pub trade_id: u64,
}
