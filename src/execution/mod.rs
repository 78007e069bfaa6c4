pub mod client;
pub mod errors;
pub mod signer;
pub mod traits;
pub mod types;

pub use client::BinanceClient;
pub use errors::ExecutionError;
pub use traits::Exchange;
pub use types::*;
