//! The exchange seam the trading gateway is written against.

use async_trait::async_trait;

use super::errors::ExecutionError;
use super::types::{Balance, OrderResponse, ServerTime, TradeRequest};

/// Operations the gateway needs from an exchange. Implemented for real by
/// [`BinanceClient`](super::BinanceClient); tests substitute a mock.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Exchange clock, unauthenticated.
    async fn server_time(&self) -> Result<ServerTime, ExecutionError>;

    /// Minimum order value (in quote asset) enforced for the symbol.
    async fn min_notional(&self, symbol: &str) -> Result<f64, ExecutionError>;

    /// Current account balance snapshot.
    async fn account_balances(&self) -> Result<Vec<Balance>, ExecutionError>;

    /// Look up a previously placed order.
    async fn order_status(&self, order_id: &str) -> Result<OrderResponse, ExecutionError>;

    /// Place an order. The request must already satisfy the sizing
    /// invariants of [`TradeRequest`].
    async fn execute_trade(&self, trade: &TradeRequest) -> Result<OrderResponse, ExecutionError>;
}
