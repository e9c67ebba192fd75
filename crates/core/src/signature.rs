//! Webhook signature validation for integration submit endpoints.
//!
//! Integrations authenticate with `X-Hub-Signature-256: sha256=<hex>` where
//! `<hex>` is HMAC-SHA256 over the raw request body keyed with the
//! per-repository secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Validate a webhook signature header against the body.
///
/// An empty secret together with an empty hex digest is accepted; that
/// combination is only meant for test configurations. The digest comparison
/// is constant-time.
pub fn verify_webhook_signature(header: &str, secret: &str, body: &[u8]) -> bool {
    let Some(hex_sig) = header.strip_prefix("sha256=") else {
        return false;
    };
    if secret.is_empty() && hex_sig.is_empty() {
        return true;
    }
    let Ok(sig) = hex::decode(hex_sig) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&sig).is_ok()
}

/// Compute the hex HMAC-SHA256 of a payload. Used by tests and by callers
/// that need to sign outbound requests.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_signature_is_accepted() {
        let body = br#"{"ref":"refs/heads/main"}"#;
        let sig = compute_signature("s3cret", body);
        assert!(verify_webhook_signature(
            &format!("sha256={sig}"),
            "s3cret",
            body
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let body = b"payload";
        let sig = compute_signature("right", body);
        assert!(!verify_webhook_signature(
            &format!("sha256={sig}"),
            "wrong",
            body
        ));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let sig = compute_signature("s3cret", b"original");
        assert!(!verify_webhook_signature(
            &format!("sha256={sig}"),
            "s3cret",
            b"tampered"
        ));
    }

    #[test]
    fn missing_scheme_prefix_is_rejected() {
        let sig = compute_signature("s3cret", b"body");
        assert!(!verify_webhook_signature(&sig, "s3cret", b"body"));
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(!verify_webhook_signature("sha256=zz", "s3cret", b"body"));
    }

    #[test]
    fn empty_secret_and_empty_signature_pass() {
        assert!(verify_webhook_signature("sha256=", "", b"anything"));
    }

    #[test]
    fn empty_secret_with_nonempty_signature_is_verified_normally() {
        let sig = compute_signature("", b"body");
        assert!(verify_webhook_signature(&format!("sha256={sig}"), "", b"body"));
        assert!(!verify_webhook_signature("sha256=00", "", b"body"));
    }

    #[test]
    fn signature_is_deterministic_hex() {
        let a = compute_signature("secret", b"payload");
        let b = compute_signature("secret", b"payload");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
