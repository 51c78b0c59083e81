//! Legacy hex-reverse obfuscation codec.
//!
//! Oldest files in the field are plain ASCII text: the artifact JSON
//! hex-encoded in lowercase, then character-reversed. This is not
//! encryption and provides no confidentiality; it is retained only so
//! those files keep decoding. Encoding always uses the Versioned
//! encrypted container, never this scheme.

use crate::error::{FormatError, Result};

/// Hex-encode plaintext and reverse the character sequence.
///
/// The result is ASCII text of exactly twice the input length.
#[must_use]
pub fn obfuscate(plaintext: &[u8]) -> String {
    hex::encode(plaintext).chars().rev().collect()
}

/// Reverse the character sequence and hex-decode it.
///
/// Leading/trailing ASCII whitespace is ignored so files written with
/// a trailing newline still decode.
///
/// # Errors
/// Returns [`FormatError::InvalidHexText`] if the reversed text has
/// odd length or contains a non-hex character.
pub fn deobfuscate(text: &str) -> Result<Vec<u8>> {
    let forward: String = text.trim().chars().rev().collect();
    hex::decode(forward).map_err(|e| {
        FormatError::InvalidHexText {
            reason: e.to_string(),
        }
        .into()
    })
}
