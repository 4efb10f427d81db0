//! At-rest encryption of small secrets (the session token).

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;

use crate::constants::{KDF_CONTEXT_SESSION_KEY, NONCE_SIZE};
use crate::error::CryptoError;

pub type SymmetricKey = [u8; 32];

pub fn generate_symmetric_key() -> SymmetricKey {
    let mut key = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

/// Seal `plaintext` bound to `label` (e.g. the table column it is stored
/// in). Output layout: 24-byte nonce, then ciphertext and tag.
pub fn encrypt(key: &SymmetricKey, label: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut sealed = vec![0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut sealed);

    let ciphertext = XChaCha20Poly1305::new(key.into())
        .encrypt(
            XNonce::from_slice(&sealed),
            Payload {
                msg: plaintext,
                aad: label,
            },
        )
        .map_err(|_| CryptoError::EncryptionFailed)?;

    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a blob produced by [`encrypt`] under the same `label`.
pub fn decrypt(key: &SymmetricKey, label: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < NONCE_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);

    XChaCha20Poly1305::new(key.into())
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: label,
            },
        )
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Derive the session store key from a device secret.
pub fn derive_session_key(device_secret: &[u8]) -> SymmetricKey {
    blake3::derive_key(KDF_CONTEXT_SESSION_KEY, device_secret)
}

/// Parse a 32-byte key from raw bytes.
pub fn key_from_slice(bytes: &[u8]) -> Result<SymmetricKey, CryptoError> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength)
}
