//! Error types for sellar operations.
//!
//! The taxonomy separates three caller-distinguishable failure families:
//! [`FormatError`] (the bytes are not a recognized container),
//! [`CipherError`] (the container is recognized but cannot be opened),
//! and [`ValidationError`] (the payload opened but is structurally
//! invalid). Passphrases, salts, and derived keys never appear in any
//! message.

use std::fmt;

/// Byte layout does not match any known container variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Input is shorter than the smallest parseable layout.
    Truncated {
        /// Minimum number of bytes required
        needed: usize,
        /// Bytes actually available
        actual: usize,
    },
    /// Magic bytes matched but the version field is not one this
    /// library ever produced.
    UnknownMagicVersion {
        /// Version value found in the header
        found: u16,
    },
    /// Legacy hex-reverse text failed to decode.
    InvalidHexText {
        /// Decoder failure description
        reason: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Truncated { needed, actual } => {
                write!(f, "Truncated container: need {needed} bytes, have {actual}")
            }
            FormatError::UnknownMagicVersion { found } => {
                write!(f, "Unknown container version: {found}")
            }
            FormatError::InvalidHexText { reason } => {
                write!(f, "Invalid hex-reverse text: {reason}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Key derivation or AES/PKCS7 operation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Wrong passphrase/salt/IV, or corrupted/truncated ciphertext.
    ///
    /// CBC+PKCS7 cannot distinguish these cases; no partial plaintext
    /// is ever returned.
    AuthenticationFailed,
    /// Supplied IV is not exactly 16 bytes.
    InvalidIvLength {
        /// Length of the IV that was supplied
        actual: usize,
    },
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherError::AuthenticationFailed => {
                write!(f, "Decryption failed: wrong passphrase/salt or corrupted data")
            }
            CipherError::InvalidIvLength { actual } => {
                write!(f, "Invalid IV length: expected 16 bytes, got {actual}")
            }
        }
    }
}

impl std::error::Error for CipherError {}

/// Decoded plaintext parses as JSON but fails structural or shape checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The `type` field is not 0 (Fit) or 1 (FullModel).
    UnsupportedKind {
        /// Kind value found in the artifact
        found: i64,
    },
    /// A required field is absent.
    MissingField {
        /// JSON field name (`type`, `A`, `Range`, `w`, `a`, `b`)
        field: &'static str,
    },
    /// A coefficient array has the wrong length for the artifact shape.
    LengthMismatch {
        /// JSON field name
        field: &'static str,
        /// Expected element count
        expected: usize,
        /// Actual element count
        actual: usize,
    },
    /// A FullModel artifact was decoded but no feature dimension could
    /// be inferred or recovered from embedded metadata.
    MissingFeatureDimension,
    /// A parameter-name or station-name list is empty where a
    /// non-empty list is required.
    EmptyConfig {
        /// Which list was empty (`water_params` or `feature_stations`)
        list: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnsupportedKind { found } => {
                write!(f, "Unsupported artifact kind: {found} (expected 0 or 1)")
            }
            ValidationError::MissingField { field } => {
                write!(f, "Missing required field: {field}")
            }
            ValidationError::LengthMismatch {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Length mismatch in {field}: expected {expected} elements, got {actual}"
                )
            }
            ValidationError::MissingFeatureDimension => {
                write!(
                    f,
                    "FullModel artifact has no recoverable feature dimension"
                )
            }
            ValidationError::EmptyConfig { list } => {
                write!(f, "Parameter config list {list} must not be empty")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Main error type for sellar operations.
#[derive(Debug)]
pub enum SellarError {
    /// Bytes are not a recognized container (see [`FormatError`]).
    Format(FormatError),
    /// Container recognized but could not be opened (see [`CipherError`]).
    Cipher(CipherError),
    /// Payload opened but is structurally invalid (see [`ValidationError`]).
    Validation(ValidationError),
    /// JSON serialization/deserialization error.
    Serialization(String),
    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),
}

impl fmt::Display for SellarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SellarError::Format(e) => write!(f, "Format error: {e}"),
            SellarError::Cipher(e) => write!(f, "Cipher error: {e}"),
            SellarError::Validation(e) => write!(f, "Validation error: {e}"),
            SellarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            SellarError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SellarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SellarError::Format(e) => Some(e),
            SellarError::Cipher(e) => Some(e),
            SellarError::Validation(e) => Some(e),
            SellarError::Io(e) => Some(e),
            SellarError::Serialization(_) => None,
        }
    }
}

impl From<FormatError> for SellarError {
    fn from(err: FormatError) -> Self {
        SellarError::Format(err)
    }
}

impl From<CipherError> for SellarError {
    fn from(err: CipherError) -> Self {
        SellarError::Cipher(err)
    }
}

impl From<ValidationError> for SellarError {
    fn from(err: ValidationError) -> Self {
        SellarError::Validation(err)
    }
}

impl From<std::io::Error> for SellarError {
    fn from(err: std::io::Error) -> Self {
        SellarError::Io(err)
    }
}

/// Non-fatal consistency finding.
///
/// Warnings are collected and returned alongside successful results,
/// never raised as errors; callers decide whether to surface them.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A present coefficient field disagrees with the recovered shape.
    LengthInconsistent {
        /// Field or list name
        field: &'static str,
        /// Expected element count
        expected: usize,
        /// Actual element count
        actual: usize,
    },
    /// A present coefficient field does not divide evenly by the
    /// parameter count, so no feature dimension can be read from it.
    IndivisibleLength {
        /// JSON field name
        field: &'static str,
        /// Element count of the field
        len: usize,
        /// Parameter count it failed to divide by
        param_count: usize,
    },
    /// A coefficient element is NaN or infinite.
    NonFinite {
        /// JSON field name
        field: &'static str,
        /// Index of the offending element
        index: usize,
    },
    /// A (min, max) range pair has min greater than max.
    InvertedRange {
        /// Zero-based parameter index of the pair
        pair: usize,
        /// Recorded minimum
        min: f64,
        /// Recorded maximum
        max: f64,
    },
    /// Container version differs from the current format version.
    /// The file is still read (forward/backward tolerance).
    VersionMismatch {
        /// Version found in the container header
        found: u16,
        /// Version this library writes
        current: u16,
    },
    /// A name appears more than once in a parameter config list.
    DuplicateName {
        /// Which list contains the duplicate
        list: &'static str,
        /// The duplicated name
        name: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::LengthInconsistent {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{field} has {actual} elements, expected {expected} for the recovered shape"
                )
            }
            Warning::IndivisibleLength {
                field,
                len,
                param_count,
            } => {
                write!(
                    f,
                    "{field} has {len} elements, not divisible by parameter count {param_count}"
                )
            }
            Warning::NonFinite { field, index } => {
                write!(f, "{field}[{index}] is not a finite number")
            }
            Warning::InvertedRange { pair, min, max } => {
                write!(f, "range pair {pair} has min {min} > max {max}")
            }
            Warning::VersionMismatch { found, current } => {
                write!(f, "container version {found} differs from current {current}")
            }
            Warning::DuplicateName { list, name } => {
                write!(f, "{list} contains duplicate name {name:?}")
            }
        }
    }
}

/// Convenient Result type alias for sellar operations.
pub type Result<T> = std::result::Result<T, SellarError>;
