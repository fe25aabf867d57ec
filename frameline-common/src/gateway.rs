//! Payment gateway signature and amount primitives
//!
//! The gateway signs its payment callback with HMAC-SHA256 over
//! `"{order_id}|{payment_id}"` using a shared secret. Verification recomputes
//! the tag and compares it against the client-supplied hex signature; any
//! mismatch is a hard rejection. These functions are pure so both the verify
//! handler and tests exercise the exact same math.

use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum receipt identifier length accepted by the gateway
pub const RECEIPT_MAX_LEN: usize = 40;

/// Minimum chargeable amount in major units (₹1)
pub const MIN_AMOUNT: f64 = 1.0;

/// Convert a major-unit amount to the gateway's minor-unit integer
/// representation (paise), rounding to the nearest unit.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Hex HMAC-SHA256 signature over `"{order_id}|{payment_id}"`.
pub fn sign(order_id: &str, payment_id: &str, secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret)
        .expect("HMAC can take a key of any size so this cannot fail");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a client-supplied hex signature against the recomputed tag.
///
/// Comparison runs in constant time via the hmac crate. A malformed hex
/// string fails the same way a wrong tag does: the callback is treated as
/// potentially adversarial input, never trusted partially.
pub fn verify(order_id: &str, payment_id: &str, secret: &[u8], signature: &str) -> Result<()> {
    let supplied = hex::decode(signature).map_err(|_| Error::SignatureMismatch)?;
    let mut mac = HmacSha256::new_from_slice(secret)
        .expect("HMAC can take a key of any size so this cannot fail");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&supplied)
        .map_err(|_| Error::SignatureMismatch)
}

/// Receipt identifier for an order on `project_id` at `unix_secs`.
///
/// The gateway caps receipts at [`RECEIPT_MAX_LEN`] characters, so the
/// project id is truncated to leave room for a time-derived suffix. Repeated
/// orders for the same project get distinct receipts with high probability;
/// two orders inside the same second can still collide, which the gateway
/// tolerates.
pub fn receipt_for(project_id: &str, unix_secs: i64) -> String {
    let suffix = format!("_{}", unix_secs);
    let keep = RECEIPT_MAX_LEN.saturating_sub(suffix.len());
    let head: String = project_id.chars().take(keep).collect();
    format!("{}{}", head, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-gateway-secret";

    #[test]
    fn signature_is_deterministic() {
        let a = sign("order_123", "pay_456", SECRET);
        let b = sign("order_123", "pay_456", SECRET);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex SHA-256
    }

    #[test]
    fn verify_accepts_own_signature() {
        let sig = sign("order_123", "pay_456", SECRET);
        assert!(verify("order_123", "pay_456", SECRET, &sig).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let mut sig = sign("order_123", "pay_456", SECRET);
        // Flip one nibble
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(matches!(
            verify("order_123", "pay_456", SECRET, &sig),
            Err(Error::SignatureMismatch)
        ));
    }

    #[test]
    fn verify_rejects_signature_for_other_order() {
        let sig = sign("order_123", "pay_456", SECRET);
        assert!(verify("order_999", "pay_456", SECRET, &sig).is_err());
        assert!(verify("order_123", "pay_999", SECRET, &sig).is_err());
    }

    #[test]
    fn verify_rejects_non_hex_garbage() {
        assert!(verify("order_123", "pay_456", SECRET, "not hex at all").is_err());
    }

    #[test]
    fn minor_units_round_to_nearest() {
        assert_eq!(to_minor_units(1.0), 100);
        assert_eq!(to_minor_units(499.99), 49999);
        assert_eq!(to_minor_units(0.005), 1);
        assert_eq!(to_minor_units(1234.567), 123457);
    }

    #[test]
    fn receipt_respects_length_bound() {
        let long_id = "p".repeat(80);
        let receipt = receipt_for(&long_id, 1_700_000_000);
        assert!(receipt.len() <= RECEIPT_MAX_LEN);
        assert!(receipt.ends_with("_1700000000"));
    }

    #[test]
    fn receipts_differ_across_seconds() {
        let a = receipt_for("proj-abc", 1_700_000_000);
        let b = receipt_for("proj-abc", 1_700_000_001);
        assert_ne!(a, b);
    }
}
