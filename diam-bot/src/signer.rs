//! Ed25519 signing for wallet-mode transfers.

use campaign_core::{SessionError, Signer};
use ed25519_dalek::{Signer as _, SigningKey};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Holds the campaign wallet's signing key.
///
/// The key never appears in `Debug` output and is wiped from memory when
/// the signer is dropped.
pub struct Ed25519Signer {
    key: SigningKey,
    address: String,
}

impl Ed25519Signer {
    /// Parses a 64-hex-character seed (an optional `0x` prefix is
    /// accepted) into a signing key. The wallet address is the hex of
    /// the derived verifying key.
    pub fn from_hex(secret_hex: &str) -> Result<Self, SessionError> {
        let trimmed = secret_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if trimmed.len() != 64 {
            return Err(SessionError::InvalidKey {
                reason: format!("expected 64 hex characters, got {}", trimmed.len()),
            });
        }

        let mut decoded = hex::decode(trimmed).map_err(|_| SessionError::InvalidKey {
            reason: "not valid hex".to_string(),
        })?;

        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&decoded);
        decoded.zeroize();

        let key = SigningKey::from_bytes(&seed);
        let address = format!("0x{}", hex::encode(key.verifying_key().as_bytes()));

        Ok(Self { key, address })
    }
}

impl Signer for Ed25519Signer {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.key.sign(message).to_bytes().to_vec()
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    #[test]
    fn test_address_is_hex_of_verifying_key() {
        let signer = Ed25519Signer::from_hex(SEED).unwrap();

        assert!(signer.address().starts_with("0x"));
        assert_eq!(signer.address().len(), 66);

        // Same seed, same address
        let again = Ed25519Signer::from_hex(&format!("0x{}", SEED)).unwrap();
        assert_eq!(signer.address(), again.address());
    }

    #[test]
    fn test_signature_verifies_against_derived_key() {
        let signer = Ed25519Signer::from_hex(SEED).unwrap();
        let message = b"0xfrom|0xto|1.0000000|1700000000";

        let raw = signer.sign(message);
        assert_eq!(raw.len(), 64);

        let key_bytes: [u8; 32] = hex::decode(&signer.address()[2..])
            .unwrap()
            .try_into()
            .unwrap();
        let verifying = VerifyingKey::from_bytes(&key_bytes).unwrap();
        let signature = Signature::from_bytes(&raw.try_into().unwrap());
        assert!(verifying.verify(message, &signature).is_ok());
    }

    #[test]
    fn test_short_seed_rejected() {
        let result = Ed25519Signer::from_hex("abcd");
        assert!(matches!(result, Err(SessionError::InvalidKey { .. })));
    }

    #[test]
    fn test_non_hex_seed_rejected() {
        let bad = "z".repeat(64);
        let result = Ed25519Signer::from_hex(&bad);
        assert!(matches!(result, Err(SessionError::InvalidKey { .. })));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let signer = Ed25519Signer::from_hex(SEED).unwrap();
        let rendered = format!("{:?}", signer);

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(SEED));
    }
}
