//! Container framing: encode and decode the persisted byte layouts.
//!
//! # Layouts
//!
//! ```text
//! Versioned (written by encode, version 1):
//! ┌──────────────┬────────────────┬──────────────────┬─────────────┬──────────┬────────────┐
//! │ MAGIC "MFUI" │ version u16 BE │ config_len u32 BE │ config JSON │ IV (16)  │ ciphertext │
//! └──────────────┴────────────────┴──────────────────┴─────────────┴──────────┴────────────┘
//!
//! LegacyAES (read-only):        IV (16) · ciphertext
//! LegacyHexReverse (read-only): ASCII reversed-hex of plaintext JSON
//! ```
//!
//! The embedded config JSON is
//! `{"water_params":[...],"feature_stations":[...]}` and is
//! authoritative for shape recovery on read; the legacy layouts go
//! through dimension inference instead. Encoding always writes the
//! Versioned layout. This byte layout is the wire-compatibility
//! contract with the external native reader and must not change
//! without incrementing the version.

use std::fs;
use std::path::Path;

use crate::artifact::{ArtifactKind, ModelArtifact, ParameterConfig, RawArtifact};
use crate::cipher::{self, CipherConfig, IV_SIZE};
use crate::error::{CipherError, FormatError, Result, SellarError, ValidationError, Warning};
use crate::infer::{self, InferredShape};
use crate::obfuscate;
use crate::validate;

pub mod detect;

pub use detect::{detect as detect_format, ContainerFormat};

/// Magic bytes opening every Versioned container.
pub const MAGIC: [u8; 4] = *b"MFUI";
/// Container format version written by [`encode`].
pub const FORMAT_VERSION: u16 = 1;

/// Fixed header size of the Versioned layout: magic + version +
/// config length.
const HEADER_SIZE: usize = 10;

/// Smallest possible sealed payload: an IV plus one ciphertext block.
/// PKCS7 always pads, so a valid ciphertext is never empty.
const MIN_SEALED_LEN: usize = IV_SIZE + 16;

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The validated artifact
    pub artifact: ModelArtifact,
    /// Embedded config (Versioned) or the deployment default (legacy)
    pub config: ParameterConfig,
    /// Shape used for validation, declared or inferred
    pub shape: InferredShape,
    /// Which layout the bytes were parsed as
    pub format: ContainerFormat,
    /// Soft consistency findings collected along the way
    pub warnings: Vec<Warning>,
}

/// Encode an artifact into a Versioned container.
///
/// The artifact is checked against the config's dimensions with the
/// same rules [`decode`] applies, so every container this function
/// emits is one its own decode accepts.
///
/// # Errors
/// Returns [`crate::error::ValidationError::EmptyConfig`] for an empty
/// parameter list (or a full model with no stations),
/// [`crate::error::ValidationError::LengthMismatch`] when the
/// artifact's arrays disagree with the config's dimensions, or a
/// serialization error if the artifact or config cannot be written as
/// JSON.
pub fn encode(
    artifact: &ModelArtifact,
    config: &ParameterConfig,
    cipher_config: &CipherConfig,
) -> Result<Vec<u8>> {
    config.validate()?;
    if artifact.kind() == ArtifactKind::FullModel && config.feature_stations.is_empty() {
        return Err(ValidationError::EmptyConfig {
            list: "feature_stations",
        }
        .into());
    }

    let raw = artifact.to_raw();
    // The embedded config is authoritative on read, so the artifact
    // must fit the shape it declares before anything is sealed.
    validate::validate(raw.clone(), &shape_from_config(config, &raw))?;

    let plaintext = bare_wire_tokens(&to_json(&raw)?);
    let (iv, ciphertext) = cipher::seal(&plaintext, cipher_config);
    let config_json = to_json(config)?;

    let config_len = u32::try_from(config_json.len()).map_err(|_| {
        SellarError::Serialization("config JSON exceeds u32 length".to_string())
    })?;

    let mut out =
        Vec::with_capacity(HEADER_SIZE + config_json.len() + IV_SIZE + ciphertext.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    out.extend_from_slice(&config_len.to_be_bytes());
    out.extend_from_slice(&config_json);
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decode a container of any supported layout.
///
/// Never returns a partially populated artifact: the result is fully
/// validated or the call fails with a typed error.
///
/// # Errors
/// [`FormatError`] when the bytes match no known layout,
/// [`CipherError`] when decryption fails, and
/// [`crate::error::ValidationError`] when the payload is structurally
/// invalid.
pub fn decode(data: &[u8], cipher_config: &CipherConfig) -> Result<Decoded> {
    match detect::detect(data)? {
        ContainerFormat::Versioned => decode_versioned(data, cipher_config),
        ContainerFormat::LegacyAes => decode_legacy_aes(data, cipher_config),
        ContainerFormat::LegacyHexReverse => decode_hex_reverse(data),
    }
}

/// Encode and write to a file.
///
/// # Errors
/// As [`encode`], plus I/O failures.
pub fn encode_to_file(
    artifact: &ModelArtifact,
    config: &ParameterConfig,
    cipher_config: &CipherConfig,
    path: impl AsRef<Path>,
) -> Result<()> {
    let bytes = encode(artifact, config, cipher_config)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Read and decode a file.
///
/// # Errors
/// As [`decode`], plus I/O failures.
pub fn decode_file(path: impl AsRef<Path>, cipher_config: &CipherConfig) -> Result<Decoded> {
    let data = fs::read(path)?;
    decode(&data, cipher_config)
}

fn decode_versioned(data: &[u8], cipher_config: &CipherConfig) -> Result<Decoded> {
    if data.len() < HEADER_SIZE {
        return Err(FormatError::Truncated {
            needed: HEADER_SIZE,
            actual: data.len(),
        }
        .into());
    }

    let version = u16::from_be_bytes([data[4], data[5]]);
    if version == 0 {
        // Version 0 was never produced; the header is not ours.
        return Err(FormatError::UnknownMagicVersion { found: version }.into());
    }
    let mut warnings = Vec::new();
    if version != FORMAT_VERSION {
        // Forward/backward tolerance: read anyway, surface the skew.
        warnings.push(Warning::VersionMismatch {
            found: version,
            current: FORMAT_VERSION,
        });
    }

    let config_len = u32::from_be_bytes([data[6], data[7], data[8], data[9]]) as usize;
    let body_end = HEADER_SIZE + config_len;
    let config_json = data.get(HEADER_SIZE..body_end).ok_or(FormatError::Truncated {
        needed: body_end + MIN_SEALED_LEN,
        actual: data.len(),
    })?;
    let config: ParameterConfig = serde_json::from_slice(config_json)
        .map_err(|e| SellarError::Serialization(format!("embedded config: {e}")))?;

    let rest = &data[body_end..];
    if rest.len() < MIN_SEALED_LEN {
        return Err(FormatError::Truncated {
            needed: body_end + MIN_SEALED_LEN,
            actual: data.len(),
        }
        .into());
    }
    let iv: [u8; IV_SIZE] = rest[..IV_SIZE].try_into().expect("slice length checked");
    let ciphertext = &rest[IV_SIZE..];

    let plaintext = cipher::open(&iv, ciphertext, cipher_config)?;
    let raw = parse_sealed_artifact(&plaintext)?;

    // Embedded config is authoritative for shape when usable; an empty
    // parameter list falls back to inference.
    let (shape, mut shape_warnings) = if config.water_params.is_empty() {
        infer::infer_shape(&raw)
    } else {
        let shape = shape_from_config(&config, &raw);
        let findings = infer::cross_check(&shape, &raw);
        (shape, findings)
    };
    warnings.append(&mut shape_warnings);

    let (artifact, mut validation_warnings) = validate::validate(raw, &shape)?;
    warnings.append(&mut validation_warnings);

    Ok(Decoded {
        artifact,
        config,
        shape,
        format: ContainerFormat::Versioned,
        warnings,
    })
}

fn decode_legacy_aes(data: &[u8], cipher_config: &CipherConfig) -> Result<Decoded> {
    // A bare IV with nothing sealed behind it is a cut-off file, not a
    // key problem.
    if data.len() < MIN_SEALED_LEN {
        return Err(FormatError::Truncated {
            needed: MIN_SEALED_LEN,
            actual: data.len(),
        }
        .into());
    }
    let iv: [u8; IV_SIZE] = data[..IV_SIZE].try_into().expect("detector guarantees length");
    let ciphertext = &data[IV_SIZE..];

    let plaintext = cipher::open(&iv, ciphertext, cipher_config)?;
    let raw = parse_sealed_artifact(&plaintext)?;
    finish_legacy(raw, ContainerFormat::LegacyAes)
}

fn decode_hex_reverse(data: &[u8]) -> Result<Decoded> {
    let text = std::str::from_utf8(data).map_err(|e| FormatError::InvalidHexText {
        reason: e.to_string(),
    })?;
    let plaintext = obfuscate::deobfuscate(text)?;
    let raw: RawArtifact = serde_json::from_slice(&quote_wire_tokens(&plaintext))
        .map_err(|e| FormatError::InvalidHexText {
            reason: format!("decoded text is not an artifact: {e}"),
        })?;
    finish_legacy(raw, ContainerFormat::LegacyHexReverse)
}

fn finish_legacy(raw: RawArtifact, format: ContainerFormat) -> Result<Decoded> {
    let (shape, mut warnings) = infer::infer_shape(&raw);

    // Legacy layouts embed no names; fall back to the deployment
    // defaults and flag any disagreement with the recovered shape.
    let config = ParameterConfig::default();
    if config.param_count() != shape.param_count {
        warnings.push(Warning::LengthInconsistent {
            field: "water_params",
            expected: shape.param_count,
            actual: config.param_count(),
        });
    }
    if let Some(f) = shape.feature_count {
        if config.feature_count() != f {
            warnings.push(Warning::LengthInconsistent {
                field: "feature_stations",
                expected: f,
                actual: config.feature_count(),
            });
        }
    }

    let (artifact, mut validation_warnings) = validate::validate(raw, &shape)?;
    warnings.append(&mut validation_warnings);

    Ok(Decoded {
        artifact,
        config,
        shape,
        format,
        warnings,
    })
}

/// Shape declared by an embedded config.
fn shape_from_config(config: &ParameterConfig, raw: &RawArtifact) -> InferredShape {
    // Fit artifacts carry no feature dimension even when the config
    // lists stations.
    let feature_count = match raw.kind {
        Some(1) if !config.feature_stations.is_empty() => Some(config.feature_count()),
        _ => None,
    };
    InferredShape {
        param_count: config.param_count(),
        feature_count,
    }
}

/// Parse decrypted plaintext as artifact JSON.
///
/// The original producer writes non-finite values as bare
/// `NaN`/`Infinity` tokens, which are normalized before parsing. A
/// decrypt with the wrong key that survives the padding check still
/// yields garbage bytes; treating the remaining JSON failures as
/// `AuthenticationFailed` keeps the contract that `open` either
/// confirms the key or fails, never returns wrong data.
fn parse_sealed_artifact(plaintext: &[u8]) -> Result<RawArtifact> {
    serde_json::from_slice(&quote_wire_tokens(plaintext))
        .map_err(|_| CipherError::AuthenticationFailed.into())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| SellarError::Serialization(e.to_string()))
}

/// Quote bare `NaN`/`Infinity`/`-Infinity` tokens so serde_json can
/// parse wire plaintext written by the original producer.
///
/// Artifact JSON carries no string values of its own and no key
/// contains these tokens, so plain byte scanning cannot collide with
/// legitimate content.
fn quote_wire_tokens(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 16);
    let mut i = 0;
    while i < data.len() {
        let rest = &data[i..];
        if rest.starts_with(b"-Infinity") {
            out.extend_from_slice(b"\"-Infinity\"");
            i += 9;
        } else if rest.starts_with(b"Infinity") {
            out.extend_from_slice(b"\"Infinity\"");
            i += 8;
        } else if rest.starts_with(b"NaN") {
            out.extend_from_slice(b"\"NaN\"");
            i += 3;
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// Inverse of [`quote_wire_tokens`]: strip the quotes the serde layer
/// puts around non-finite tokens, restoring the producer's bare-token
/// wire form.
fn bare_wire_tokens(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let rest = &data[i..];
        if rest.starts_with(b"\"-Infinity\"") {
            out.extend_from_slice(b"-Infinity");
            i += 11;
        } else if rest.starts_with(b"\"Infinity\"") {
            out.extend_from_slice(b"Infinity");
            i += 10;
        } else if rest.starts_with(b"\"NaN\"") {
            out.extend_from_slice(b"NaN");
            i += 5;
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}
