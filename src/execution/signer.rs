//! HMAC-SHA256 request signing for the Binance REST API.
//!
//! Binance validates the signature against the literal query string it
//! receives, so parameters are modeled as an ordered sequence of pairs and
//! the canonical string preserves caller order byte-for-byte. Reordering
//! the parameters between signing and sending invalidates the signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Join parameters as `key=value` pairs with `&`, in exactly the supplied
/// order. This string is what gets signed AND what goes on the wire.
pub fn canonical_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// HMAC-SHA256 over the payload, hex-encoded lowercase.
pub fn sign(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Canonical query string with `&signature=<hex>` appended, ready to send.
pub fn signed_query(secret: &str, params: &[(&str, String)]) -> String {
    let query = canonical_query(params);
    let signature = sign(secret, &query);
    format!("{}&signature={}", query, signature)
}
