use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// Lowercase hex HMAC-SHA256 of `order_id|payment_id`
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    mac_for(secret, order_id, payment_id)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant-time check of a hex signature sent by the payment gateway
pub fn verify_payment_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    mac_for(secret, order_id, payment_id).map_or(false, |mac| mac.verify_slice(&expected).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let signature = payment_signature("s3cret", "order_abc", "pay_123");
        assert_eq!(signature.len(), 64);
        assert!(verify_payment_signature("s3cret", "order_abc", "pay_123", &signature));
        assert!(verify_payment_signature("s3cret", "order_abc", "pay_123", &signature.to_uppercase()));
    }

    #[test]
    fn test_tampered_inputs_fail() {
        let signature = payment_signature("s3cret", "order_abc", "pay_123");
        assert!(!verify_payment_signature("other", "order_abc", "pay_123", &signature));
        assert!(!verify_payment_signature("s3cret", "order_abd", "pay_123", &signature));
        assert!(!verify_payment_signature("s3cret", "order_abc", "pay_123", "not-hex"));
        assert!(!verify_payment_signature("s3cret", "order_abc", "pay_123", ""));
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            payment_signature("s3cret", "order_abc", "pay_123"),
            "85fe2073d0f4d9dcfa1975b4804eee657cfa330ad893c7f326ccddec1ba10bc9"
        );
    }
}
