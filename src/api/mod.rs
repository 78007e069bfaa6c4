pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::auth::AuthState;
use crate::config::Settings;
use crate::trade::TradeService;

/// Shared, read-only application state. Cloning is cheap; nothing here is
/// mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth: AuthState,
    pub trade: Arc<TradeService>,
}
