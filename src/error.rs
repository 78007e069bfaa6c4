//! Gateway-level errors and their HTTP mapping.
//!
//! Every failure leaving the HTTP surface is serialized as
//! `{"success": false, "message": ...}`. Local guards (auth, validation,
//! balance and minimum checks) short-circuit with 4xx before any exchange
//! call; exchange failures surface as 5xx with the upstream detail in the
//! message. Secrets never appear here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::execution::ExecutionError;
use crate::trade::TradeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),

    #[error("insufficient funds: requested {requested} {asset}, available {available} {asset}")]
    InsufficientFunds {
        asset: String,
        requested: f64,
        available: f64,
    },

    #[error(transparent)]
    Trade(#[from] TradeError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::InsufficientFunds { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Trade(err) => match err {
                TradeError::Validation(_) | TradeError::InsufficientAmount { .. } => {
                    StatusCode::BAD_REQUEST
                }
                TradeError::Exchange(exec) => match exec {
                    ExecutionError::UpstreamRejected { .. } | ExecutionError::Http(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    ExecutionError::FilterNotFound(_) | ExecutionError::Decode(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
