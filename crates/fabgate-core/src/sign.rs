//! message digests and ECDSA signing

use crate::error::{GatewayError, Result};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use p256::SecretKey;
use sha2::{Digest, Sha256, Sha384};

/// digest applied to messages before signing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
}

impl HashAlgorithm {
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(message).to_vec(),
        }
    }
}

/// P-256 private key signer
///
/// signatures are DER encoded with s normalized to the lower half of the curve order,
/// which peers reject otherwise.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// accepts PKCS#8 (`PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`) PEM
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(pem)
            .map_err(|_| GatewayError::PrivateKey("PEM is not valid UTF-8".into()))?;

        let secret = match SecretKey::from_pkcs8_pem(text) {
            Ok(secret) => secret,
            Err(pkcs8_err) => SecretKey::from_sec1_pem(text).map_err(|_| {
                GatewayError::PrivateKey(format!("unsupported P-256 key: {}", pkcs8_err))
            })?,
        };

        Ok(Self {
            key: SigningKey::from(secret),
        })
    }

    /// sign an already hashed message
    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = self
            .key
            .sign_prehash(digest)
            .map_err(|e| GatewayError::Signing(e.to_string()))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.key.verifying_key()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}
