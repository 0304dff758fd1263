//! HMAC-SHA256 signatures over raw request bodies.

use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{ChannelError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the lowercase hex signature.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Signs and verifies bodies under the shared secret.
///
/// The key is fixed at construction; rotating it means building a new signer.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    /// Build a signer from the shared secret. Blank secrets are rejected.
    pub fn new(secret: &SecretString) -> Result<Self> {
        let key = secret.expose_secret();
        if key.trim().is_empty() {
            return Err(ChannelError::Config("shared secret is empty".to_string()));
        }

        let mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| ChannelError::Config(format!("invalid shared secret: {}", e)))?;

        Ok(Self { mac })
    }

    fn digest(&self, body: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }

    /// Lowercase hex HMAC-SHA256 of `body`.
    pub fn sign_hex(&self, body: &[u8]) -> String {
        hex::encode(self.digest(body))
    }

    /// Check a received signature header against `body`.
    pub fn verify_hex(&self, body: &[u8], signature: Option<&str>) -> Result<()> {
        let signature = signature
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ChannelError::MissingSignature)?;

        let received = hex::decode(signature).map_err(|_| ChannelError::InvalidSignature)?;
        if constant_time_eq(&self.digest(body), &received) {
            Ok(())
        } else {
            Err(ChannelError::InvalidSignature)
        }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

/// Compare two byte strings without an early exit on the first difference.
///
/// Differing lengths compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> Signer {
        Signer::new(&SecretString::from(secret.to_string())).unwrap()
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2.
        let signer = signer("Jefe");
        assert_eq!(
            signer.sign_hex(b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sign_then_verify() {
        let signer = signer("s3cret");
        let body = br#"{"tripId":1}"#;
        let sig = signer.sign_hex(body);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert!(signer.verify_hex(body, Some(&sig)).is_ok());
        assert!(signer.verify_hex(b"", Some(&signer.sign_hex(b""))).is_ok());
    }

    #[test]
    fn test_single_bit_flips_fail() {
        let signer = signer("s3cret");
        let body = br#"{"tripId":1}"#.to_vec();
        let sig = signer.sign_hex(&body);

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert!(signer.verify_hex(&tampered, Some(&sig)).is_err());
        }

        let raw = hex::decode(&sig).unwrap();
        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x80;
            assert!(matches!(
                signer.verify_hex(&body, Some(&hex::encode(tampered))),
                Err(ChannelError::InvalidSignature)
            ));
        }
    }

    #[test]
    fn test_missing_and_malformed_signatures() {
        let signer = signer("s3cret");
        assert!(matches!(signer.verify_hex(b"{}", None), Err(ChannelError::MissingSignature)));
        assert!(matches!(signer.verify_hex(b"{}", Some("  ")), Err(ChannelError::MissingSignature)));
        assert!(matches!(signer.verify_hex(b"{}", Some("zz")), Err(ChannelError::InvalidSignature)));

        let short = &signer.sign_hex(b"{}")[..62];
        assert!(matches!(signer.verify_hex(b"{}", Some(short)), Err(ChannelError::InvalidSignature)));
    }

    #[test]
    fn test_other_secret_fails() {
        let sig = signer("one").sign_hex(b"{}");
        assert!(signer("two").verify_hex(b"{}", Some(&sig)).is_err());
    }

    #[test]
    fn test_blank_secret_rejected() {
        assert!(Signer::new(&SecretString::from(" ".to_string())).is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
