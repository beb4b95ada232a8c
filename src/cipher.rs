//! Password cipher
//!
//! The Salesforce password is stored encrypted in the settings file, keyed by
//! the user's security token. The blob is
//! `base64(salt[16] ‖ nonce[12] ‖ AES-256-GCM ciphertext+tag)` with the key
//! derived from the token by PBKDF2-HMAC-SHA256.

use crate::error::{Error, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use sha2::Sha256;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const PBKDF2_ROUNDS: u32 = 10_000;

/// Encrypt `plaintext` with a key derived from `token`
pub fn encrypt(plaintext: &str, token: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let cipher = build_cipher(token, &salt)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| Error::cipher("encryption failed"))?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

/// Decrypt a blob produced by [`encrypt`] with the same `token`
pub fn decrypt(ciphertext: &str, token: &str) -> Result<String> {
    let blob = STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| Error::cipher(format!("encrypted password is not valid base64: {e}")))?;

    if blob.len() <= SALT_LEN + NONCE_LEN {
        return Err(Error::cipher("encrypted password is too short"));
    }

    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    let cipher = build_cipher(token, salt)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| Error::cipher("wrong security token or corrupted password"))?;

    String::from_utf8(plaintext)
        .map_err(|_| Error::cipher("decrypted password is not valid UTF-8"))
}

fn build_cipher(token: &str, salt: &[u8]) -> Result<Aes256Gcm> {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(token.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    Aes256Gcm::new_from_slice(&key).map_err(|e| Error::cipher(e.to_string()))
}
