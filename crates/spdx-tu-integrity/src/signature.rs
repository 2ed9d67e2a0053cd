//! Signature checks.
//!
//! Signatures are opaque by default: only their structural presence is
//! checked. A [`SignatureVerifier`] registered for an algorithm name upgrades
//! that to a real cryptographic check.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use spdx_tu_core::{HexBytes, IntegrityMethod, SignatureInfo};

use crate::error::{IntegrityError, Result};

/// Algorithm name used for Ed25519 signatures.
pub const ED25519: &str = "ed25519";

/// Checks signatures of one algorithm.
pub trait SignatureVerifier: Send + Sync {
    /// Algorithm name as written in `Signature.algorithm`.
    fn algorithm(&self) -> &str;

    /// Verify `signature` over `message` with `public_key`.
    fn verify(&self, message: &[u8], public_key: &[u8], signature: &[u8]) -> Result<()>;
}

/// Ed25519 over the canonical encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn algorithm(&self) -> &str {
        ED25519
    }

    fn verify(&self, message: &[u8], public_key: &[u8], signature: &[u8]) -> Result<()> {
        let key: [u8; 32] = public_key
            .try_into()
            .map_err(|_| IntegrityError::InvalidPublicKey)?;
        let verifying_key =
            VerifyingKey::from_bytes(&key).map_err(|_| IntegrityError::InvalidPublicKey)?;
        let sig = Signature::from_slice(signature).map_err(|_| IntegrityError::InvalidSignature)?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| IntegrityError::InvalidSignature)
    }
}

/// Whether a signature is structurally present: all three parts non-empty.
pub fn is_present(signature: &SignatureInfo) -> bool {
    !signature.algorithm.is_empty()
        && !signature.public_key.is_empty()
        && !signature.signature.is_empty()
}

/// An Ed25519 keypair for signing Elements.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign `message`, producing a `signature` integrity method.
    pub fn sign(&self, message: &[u8]) -> IntegrityMethod {
        let sig = self.signing_key.sign(message);
        IntegrityMethod::Signature(SignatureInfo {
            algorithm: ED25519.to_string(),
            public_key: HexBytes(self.public_key().to_vec()),
            signature: HexBytes(sig.to_bytes().to_vec()),
        })
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair({})", &hex::encode(self.public_key())[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(method: &IntegrityMethod) -> &SignatureInfo {
        match method {
            IntegrityMethod::Signature(s) => s,
            IntegrityMethod::Hash(_) => panic!("expected signature"),
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Keypair::from_seed(&[7u8; 32]);
        let method = keypair.sign(b"canonical bytes");
        let sig = parts(&method);

        assert!(is_present(sig));
        assert_eq!(sig.algorithm, ED25519);
        Ed25519Verifier
            .verify(b"canonical bytes", sig.public_key.as_bytes(), sig.signature.as_bytes())
            .unwrap();
    }

    #[test]
    fn test_wrong_message_fails() {
        let keypair = Keypair::generate();
        let method = keypair.sign(b"original");
        let sig = parts(&method);
        assert!(Ed25519Verifier
            .verify(b"tampered", sig.public_key.as_bytes(), sig.signature.as_bytes())
            .is_err());
    }

    #[test]
    fn test_bad_key_length() {
        assert!(matches!(
            Ed25519Verifier.verify(b"m", &[1, 2, 3], &[0u8; 64]),
            Err(IntegrityError::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_presence() {
        let empty = SignatureInfo {
            algorithm: ED25519.into(),
            public_key: HexBytes(vec![]),
            signature: HexBytes(vec![1]),
        };
        assert!(!is_present(&empty));
    }
}
