//! Trading gateway: business rules layered on top of the exchange client.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::execution::{
    Exchange, ExecutionError, OrderResponse, OrderType, ServerTime, Side, TradeRequest,
};

#[derive(Debug, Error)]
pub enum TradeError {
    /// The request shape is wrong; nothing was sent to the exchange.
    #[error("{0}")]
    Validation(String),

    /// The buy amount is below the exchange-enforced minimum order value.
    #[error(
        "amount {amount} {asset} is below the minimum notional of {minimum} {asset} for {symbol}"
    )]
    InsufficientAmount {
        symbol: String,
        asset: String,
        amount: f64,
        minimum: f64,
    },

    /// Exchange-client failures pass through unchanged.
    #[error(transparent)]
    Exchange(#[from] ExecutionError),
}

/// Normalized view of an order, returned by the generic trade operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStatus {
    pub trade_id: String,
    pub status: String,
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub executed_qty: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_time: Option<u64>,
}

impl From<OrderResponse> for TradeStatus {
    fn from(order: OrderResponse) -> Self {
        let transaction_time = order.transaction_time();
        TradeStatus {
            trade_id: order.order_id.to_string(),
            status: order.status,
            symbol: order.symbol,
            side: order.side,
            order_type: order.order_type,
            executed_qty: order.executed_qty,
            price: order.price,
            transaction_time,
        }
    }
}

pub struct TradeService {
    exchange: Arc<dyn Exchange>,
}

impl TradeService {
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    /// Exchange connectivity probe.
    pub async fn server_time(&self) -> Result<ServerTime, TradeError> {
        Ok(self.exchange.server_time().await?)
    }

    /// Free balance of one asset from the current snapshot.
    ///
    /// Matching is exact and case-sensitive. An asset missing from the
    /// snapshot yields `0.0`, indistinguishable from a true zero balance.
    pub async fn get_balance(&self, asset: &str) -> Result<f64, TradeError> {
        let balances = self.exchange.account_balances().await?;
        let balance = balances
            .iter()
            .find(|entry| entry.asset == asset)
            .map(|entry| entry.free.parse::<f64>().unwrap_or(0.0))
            .unwrap_or(0.0);
        Ok(balance)
    }

    /// Market-buy `symbol` spending `amount` of the quote asset.
    ///
    /// The symbol's minimum notional is fetched fresh on every call and
    /// enforced before the order endpoint is touched.
    pub async fn buy_crypto(
        &self,
        symbol: &str,
        amount: f64,
        quote_asset: &str,
    ) -> Result<OrderResponse, TradeError> {
        let minimum = self.exchange.min_notional(symbol).await?;
        if amount < minimum {
            warn!(
                "buy of {} rejected: {} {} under minimum {}",
                symbol, amount, quote_asset, minimum
            );
            return Err(TradeError::InsufficientAmount {
                symbol: symbol.to_string(),
                asset: quote_asset.to_string(),
                amount,
                minimum,
            });
        }

        let trade = TradeRequest {
            symbol: symbol.to_string(),
            side: Side::Buy,
            order_type: OrderType::Market,
            quantity: None,
            price: None,
            quote_order_qty: Some(amount),
        };

        info!("market buy {} for {} {}", symbol, amount, quote_asset);
        Ok(self.exchange.execute_trade(&trade).await?)
    }

    /// Market-sell `amount` of the base asset.
    ///
    /// No minimum-notional guard here: the sell path relies on the
    /// exchange's own rejection. Kept asymmetric with `buy_crypto` on
    /// purpose.
    pub async fn sell_crypto(
        &self,
        symbol: &str,
        amount: f64,
        base_asset: &str,
    ) -> Result<OrderResponse, TradeError> {
        let trade = TradeRequest {
            symbol: symbol.to_string(),
            side: Side::Sell,
            order_type: OrderType::Market,
            quantity: Some(amount),
            price: None,
            quote_order_qty: None,
        };

        info!("market sell {} {} of {}", amount, base_asset, symbol);
        Ok(self.exchange.execute_trade(&trade).await?)
    }

    /// Execute an arbitrary well-formed trade and normalize the result.
    pub async fn create_trade(&self, trade: TradeRequest) -> Result<TradeStatus, TradeError> {
        validate_trade(&trade)?;
        let order = self.exchange.execute_trade(&trade).await?;
        Ok(order.into())
    }

    /// Current state of a previously placed order.
    pub async fn get_trade_status(&self, trade_id: &str) -> Result<TradeStatus, TradeError> {
        let order = self.exchange.order_status(trade_id).await?;
        Ok(order.into())
    }
}

/// Shape checks applied before anything reaches the exchange.
fn validate_trade(trade: &TradeRequest) -> Result<(), TradeError> {
    if trade.symbol.is_empty() {
        return Err(TradeError::Validation("symbol must not be empty".into()));
    }

    for (name, value) in [
        ("quantity", trade.quantity),
        ("price", trade.price),
        ("quoteOrderQty", trade.quote_order_qty),
    ] {
        if let Some(value) = value {
            if value <= 0.0 {
                return Err(TradeError::Validation(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
    }

    match trade.order_type {
        OrderType::Market => match (trade.quantity, trade.quote_order_qty) {
            (Some(_), Some(_)) => Err(TradeError::Validation(
                "market orders take either quantity or quoteOrderQty, not both".into(),
            )),
            (None, None) => Err(TradeError::Validation(
                "market orders require quantity or quoteOrderQty".into(),
            )),
            _ => Ok(()),
        },
        OrderType::Limit => {
            if trade.quantity.is_none() || trade.price.is_none() {
                return Err(TradeError::Validation(
                    "limit orders require quantity and price".into(),
                ));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::execution::Balance;

    /// Canned exchange: fixed balances and min-notional, records every
    /// order it is asked to execute.
    struct FakeExchange {
        balances: Vec<Balance>,
        min_notional: f64,
        executed: Mutex<Vec<TradeRequest>>,
    }

    impl FakeExchange {
        fn new(balances: Vec<Balance>, min_notional: f64) -> Arc<Self> {
            Arc::new(Self {
                balances,
                min_notional,
                executed: Mutex::new(Vec::new()),
            })
        }

        fn executed(&self) -> Vec<TradeRequest> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Exchange for FakeExchange {
        async fn server_time(&self) -> Result<ServerTime, ExecutionError> {
            Ok(ServerTime {
                server_time: 1_700_000_000_000,
            })
        }

        async fn min_notional(&self, _symbol: &str) -> Result<f64, ExecutionError> {
            Ok(self.min_notional)
        }

        async fn account_balances(&self) -> Result<Vec<Balance>, ExecutionError> {
            Ok(self.balances.clone())
        }

        async fn order_status(&self, order_id: &str) -> Result<OrderResponse, ExecutionError> {
            Ok(OrderResponse {
                symbol: "BTCEUR".to_string(),
                order_id: order_id.parse().unwrap_or(0),
                status: "FILLED".to_string(),
                order_type: "MARKET".to_string(),
                side: "BUY".to_string(),
                executed_qty: "0.00043000".to_string(),
                price: "0.00000000".to_string(),
                transact_time: None,
                time: Some(1_700_000_000_123),
                fills: None,
            })
        }

        async fn execute_trade(
            &self,
            trade: &TradeRequest,
        ) -> Result<OrderResponse, ExecutionError> {
            self.executed.lock().unwrap().push(trade.clone());
            Ok(OrderResponse {
                symbol: trade.symbol.clone(),
                order_id: 28457,
                status: "FILLED".to_string(),
                order_type: trade.order_type.as_str().to_string(),
                side: trade.side.as_str().to_string(),
                executed_qty: "0.00043000".to_string(),
                price: "0.00000000".to_string(),
                transact_time: Some(1_700_000_000_456),
                time: None,
                fills: None,
            })
        }
    }

    fn eur_balance(free: &str) -> Vec<Balance> {
        vec![Balance {
            asset: "EUR".to_string(),
            free: free.to_string(),
            locked: "0.00".to_string(),
        }]
    }

    #[tokio::test]
    async fn get_balance_reads_free_amount() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        assert_eq!(service.get_balance("EUR").await.unwrap(), 120.50);
    }

    #[tokio::test]
    async fn get_balance_of_unknown_asset_is_zero() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        assert_eq!(service.get_balance("ZZZ").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn get_balance_is_case_sensitive() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        assert_eq!(service.get_balance("eur").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn buy_below_minimum_fails_without_reaching_the_exchange() {
        let exchange = FakeExchange::new(eur_balance("120.50"), 5.0);
        let service = TradeService::new(exchange.clone());

        let err = service.buy_crypto("BTCEUR", 4.99, "EUR").await.unwrap_err();
        match err {
            TradeError::InsufficientAmount { minimum, .. } => assert_eq!(minimum, 5.0),
            other => panic!("expected InsufficientAmount, got {:?}", other),
        }
        assert!(exchange.executed().is_empty());
    }

    #[tokio::test]
    async fn buy_at_minimum_places_market_order_by_quote_amount() {
        let exchange = FakeExchange::new(eur_balance("120.50"), 5.0);
        let service = TradeService::new(exchange.clone());

        let order = service.buy_crypto("BTCEUR", 5.0, "EUR").await.unwrap();
        assert_eq!(order.order_id, 28457);

        let executed = exchange.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].side, Side::Buy);
        assert_eq!(executed[0].order_type, OrderType::Market);
        assert_eq!(executed[0].quote_order_qty, Some(5.0));
        assert_eq!(executed[0].quantity, None);
    }

    #[tokio::test]
    async fn sell_places_market_order_by_quantity_without_minimum_check() {
        // min notional is huge; sells must still go through.
        let exchange = FakeExchange::new(eur_balance("120.50"), 1_000_000.0);
        let service = TradeService::new(exchange.clone());

        service.sell_crypto("BTCEUR", 0.002, "BTC").await.unwrap();

        let executed = exchange.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].side, Side::Sell);
        assert_eq!(executed[0].quantity, Some(0.002));
        assert_eq!(executed[0].quote_order_qty, None);
    }

    #[tokio::test]
    async fn create_trade_normalizes_the_order() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));

        let status = service
            .create_trade(TradeRequest {
                symbol: "BTCEUR".to_string(),
                side: Side::Buy,
                order_type: OrderType::Market,
                quantity: None,
                price: None,
                quote_order_qty: Some(25.0),
            })
            .await
            .unwrap();

        assert_eq!(status.trade_id, "28457");
        assert_eq!(status.status, "FILLED");
        assert_eq!(status.transaction_time, Some(1_700_000_000_456));
    }

    #[tokio::test]
    async fn get_trade_status_uses_lookup_time_field() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        let status = service.get_trade_status("42").await.unwrap();
        assert_eq!(status.trade_id, "42");
        assert_eq!(status.transaction_time, Some(1_700_000_000_123));
    }

    #[tokio::test]
    async fn market_order_with_both_sizings_is_rejected() {
        let exchange = FakeExchange::new(eur_balance("120.50"), 5.0);
        let service = TradeService::new(exchange.clone());

        let err = service
            .create_trade(TradeRequest {
                symbol: "BTCEUR".to_string(),
                side: Side::Buy,
                order_type: OrderType::Market,
                quantity: Some(0.001),
                price: None,
                quote_order_qty: Some(25.0),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TradeError::Validation(_)));
        assert!(exchange.executed().is_empty());
    }

    #[tokio::test]
    async fn market_order_without_sizing_is_rejected() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        let err = service
            .create_trade(TradeRequest {
                symbol: "BTCEUR".to_string(),
                side: Side::Sell,
                order_type: OrderType::Market,
                quantity: None,
                price: None,
                quote_order_qty: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
    }

    #[tokio::test]
    async fn limit_order_requires_quantity_and_price() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        let err = service
            .create_trade(TradeRequest {
                symbol: "ETHUSDT".to_string(),
                side: Side::Sell,
                order_type: OrderType::Limit,
                quantity: Some(0.5),
                price: None,
                quote_order_qty: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected() {
        let service = TradeService::new(FakeExchange::new(eur_balance("120.50"), 5.0));
        let err = service
            .create_trade(TradeRequest {
                symbol: "BTCEUR".to_string(),
                side: Side::Buy,
                order_type: OrderType::Market,
                quantity: None,
                price: None,
                quote_order_qty: Some(-25.0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
    }
}
