//! Sealing of candidate contact details.
//!
//! Each payload gets a fresh AES-256-GCM key; that key is wrapped with RSA-OAEP
//! (SHA-256) and the envelope `wrapped key | nonce | ciphertext` is stored as base64
//! text inside the JSON record store.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::candidates::domain::ContactDetails;

pub const DEFAULT_KEY_BITS: usize = 2048;
pub const MIN_KEY_BITS: usize = 2048;

const NONCE_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum SealingError {
    #[error("key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),
    #[error("RSA keys need at least {min} bits, got {bits}")]
    KeyTooSmall { bits: usize, min: usize },
    #[error("key encoding failed: {0}")]
    KeyEncoding(String),
    #[error("encryption failed: {0}")]
    Encrypt(#[source] rsa::Error),
    #[error("decryption failed: {0}")]
    Decrypt(#[source] rsa::Error),
    #[error("contact payload cipher failed")]
    Cipher,
    #[error("sealed payload of {len} bytes is too short for this key")]
    Truncated { len: usize },
    #[error("sealed payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("sealed payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Seals contact details before they are stored.
pub trait FieldSealer: Send + Sync {
    fn seal(&self, contact: &ContactDetails) -> Result<String, SealingError>;
    fn open(&self, sealed: &str) -> Result<ContactDetails, SealingError>;
}

/// RSA key pair that wraps a per-payload AES-256-GCM key with OAEP over SHA-256.
pub struct RsaFieldSealer {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl RsaFieldSealer {
    /// Fresh key pair with public exponent 65537.
    pub fn generate(bits: usize) -> Result<Self, SealingError> {
        if bits < MIN_KEY_BITS {
            return Err(SealingError::KeyTooSmall {
                bits,
                min: MIN_KEY_BITS,
            });
        }
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map_err(SealingError::KeyGeneration)?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_pem(pem: &str) -> Result<Self, SealingError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|err| SealingError::KeyEncoding(err.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }

    fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    pub fn key_bits(&self) -> usize {
        self.public_key.size() * 8
    }

    /// SubjectPublicKeyInfo PEM.
    pub fn public_key_pem(&self) -> Result<String, SealingError> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|err| SealingError::KeyEncoding(err.to_string()))
    }

    /// Unencrypted PKCS#8 PEM.
    pub fn private_key_pem(&self) -> Result<String, SealingError> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|err| SealingError::KeyEncoding(err.to_string()))
    }
}

impl std::fmt::Debug for RsaFieldSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaFieldSealer")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

impl FieldSealer for RsaFieldSealer {
    fn seal(&self, contact: &ContactDetails) -> Result<String, SealingError> {
        let payload = serde_json::to_vec(contact)?;

        let key = Aes256Gcm::generate_key(OsRng);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = Aes256Gcm::new(&key)
            .encrypt(&nonce, payload.as_slice())
            .map_err(|_| SealingError::Cipher)?;
        let wrapped_key = self
            .public_key
            .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), key.as_slice())
            .map_err(SealingError::Encrypt)?;

        let mut envelope = wrapped_key;
        envelope.extend_from_slice(nonce.as_slice());
        envelope.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(envelope))
    }

    fn open(&self, sealed: &str) -> Result<ContactDetails, SealingError> {
        let envelope = STANDARD.decode(sealed.trim())?;
        let wrapped_len = self.private_key.size();
        if envelope.len() <= wrapped_len + NONCE_LEN {
            return Err(SealingError::Truncated {
                len: envelope.len(),
            });
        }

        let (wrapped_key, rest) = envelope.split_at(wrapped_len);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        let key = self
            .private_key
            .decrypt(Oaep::new::<Sha256>(), wrapped_key)
            .map_err(SealingError::Decrypt)?;
        if key.len() != 32 {
            return Err(SealingError::Cipher);
        }

        let payload = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key))
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SealingError::Cipher)?;
        Ok(serde_json::from_slice(&payload)?)
    }
}
