//! Sellar: encrypted, versioned container codec for model artifacts.
//!
//! Serializes a small set of named coefficient arrays into a sealed
//! binary container and reverses the process, byte-compatible with the
//! native C++ reader of the same format. Three layouts are understood
//! on read (current Versioned plus two legacy variants); encoding
//! always writes the current one.
//!
//! # Quick Start
//!
//! ```
//! use sellar::prelude::*;
//!
//! let artifact = ModelArtifact::Fit {
//!     tuning: vec![1.0, 2.0, 3.0],
//!     range: vec![0.0, 10.0, 0.0, 20.0, 0.0, 30.0],
//! };
//! let config = ParameterConfig::new(
//!     vec!["tn".into(), "tp".into(), "chla".into()],
//!     vec![],
//! );
//! let secrets = CipherConfig::default();
//!
//! let bytes = sellar::container::encode(&artifact, &config, &secrets).unwrap();
//! let decoded = sellar::container::decode(&bytes, &secrets).unwrap();
//! assert_eq!(decoded.artifact, artifact);
//! ```
//!
//! # Modules
//!
//! - [`artifact`]: typed artifact model and parameter config
//! - [`cipher`]: PBKDF2 key derivation and AES-256-CBC sealing
//! - [`obfuscate`]: legacy hex-reverse text codec (read compatibility)
//! - [`container`]: byte layouts, format detection, encode/decode
//! - [`infer`]: dimension inference for shape-less legacy files
//! - [`validate`]: structural validation of decoded artifacts
//! - [`error`]: typed error taxonomy and warnings
//!
//! # Security note
//!
//! The deployed format uses a fixed IV and unauthenticated CBC+PKCS7.
//! Both are preserved deliberately for wire compatibility with
//! existing files and the native reader; see [`cipher`] for details.

pub mod artifact;
pub mod cipher;
pub mod container;
pub mod error;
pub mod infer;
pub mod obfuscate;
pub mod prelude;
pub mod validate;

pub use artifact::{ArtifactKind, ModelArtifact, ParameterConfig, RawArtifact};
pub use cipher::CipherConfig;
pub use container::{decode, decode_file, encode, encode_to_file, ContainerFormat, Decoded};
pub use error::{Result, SellarError, Warning};
pub use infer::InferredShape;
