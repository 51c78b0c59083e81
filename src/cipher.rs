//! Cipher engine: PBKDF2-HMAC-SHA256 key derivation and AES-256-CBC
//! with PKCS7 padding.
//!
//! The deployed format uses a fixed, configured IV so that identical
//! plaintext artifacts produce identical ciphertext. This is a known
//! confidentiality weakness kept for wire compatibility with the
//! native C++ reader; changing IV handling requires a coordinated
//! format version bump. CBC+PKCS7 provides no authenticated-integrity
//! guarantee: a wrong key surfaces as a padding or JSON failure, both
//! mapped to [`CipherError::AuthenticationFailed`].

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;

use crate::error::{CipherError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block / IV size in bytes.
pub const IV_SIZE: usize = 16;
/// Derived key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;
/// PBKDF2 iteration count. Fixed: a constant computational cost, not a
/// tunable.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Process-level cipher secrets and the configured IV.
///
/// Not stored in the container except via their effect on ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherConfig {
    /// UTF-8 passphrase for key derivation
    pub passphrase: String,
    /// UTF-8 salt for key derivation
    pub salt: String,
    /// Fixed IV written into every Versioned container
    pub iv: [u8; IV_SIZE],
}

impl Default for CipherConfig {
    /// The historical deployment constants, required to open files
    /// produced by existing installations.
    fn default() -> Self {
        Self {
            passphrase: "water_quality_analysis_key".to_string(),
            salt: "water_quality_salt".to_string(),
            iv: *b"fixed_iv_16bytes",
        }
    }
}

// Secrets must never leak through Debug output or error messages.
impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig")
            .field("passphrase", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

impl CipherConfig {
    /// Create a config from a passphrase, salt, and exact 16-byte IV.
    #[must_use]
    pub fn new(passphrase: impl Into<String>, salt: impl Into<String>, iv: [u8; IV_SIZE]) -> Self {
        Self {
            passphrase: passphrase.into(),
            salt: salt.into(),
            iv,
        }
    }

    /// Create a config from an IV slice of caller-checked length.
    ///
    /// # Errors
    /// Returns [`CipherError::InvalidIvLength`] if `iv` is not exactly
    /// 16 bytes.
    pub fn from_parts(passphrase: &str, salt: &str, iv: &[u8]) -> Result<Self> {
        let iv: [u8; IV_SIZE] = iv
            .try_into()
            .map_err(|_| CipherError::InvalidIvLength { actual: iv.len() })?;
        Ok(Self::new(passphrase, salt, iv))
    }

    /// Derive the AES-256 key from the passphrase and salt.
    fn derive_key(&self) -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2_hmac::<Sha256>(
            self.passphrase.as_bytes(),
            self.salt.as_bytes(),
            PBKDF2_ITERATIONS,
            &mut key,
        );
        key
    }
}

/// Encrypt plaintext under the configured key and IV.
///
/// Returns the IV actually used alongside the ciphertext, matching the
/// container layout where the IV precedes the encrypted payload.
#[must_use]
pub fn seal(plaintext: &[u8], config: &CipherConfig) -> ([u8; IV_SIZE], Vec<u8>) {
    let key = config.derive_key();
    let ciphertext = Aes256CbcEnc::new(&key.into(), &config.iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    (config.iv, ciphertext)
}

/// Decrypt ciphertext with the given IV and the configured key.
///
/// The IV comes from the container, not the config: legacy files carry
/// their own IV prefix.
///
/// # Errors
/// Returns [`CipherError::AuthenticationFailed`] when the
/// passphrase/salt/IV do not match what produced the ciphertext, or
/// the ciphertext is truncated or corrupted. No partial plaintext is
/// returned.
pub fn open(iv: &[u8; IV_SIZE], ciphertext: &[u8], config: &CipherConfig) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % IV_SIZE != 0 {
        return Err(CipherError::AuthenticationFailed.into());
    }
    let key = config.derive_key();
    Aes256CbcDec::new(&key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::AuthenticationFailed.into())
}
