//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use sellar::prelude::*;
//! ```

pub use crate::artifact::{ArtifactKind, ModelArtifact, ParameterConfig};
pub use crate::cipher::CipherConfig;
pub use crate::container::{decode, decode_file, encode, encode_to_file, ContainerFormat, Decoded};
pub use crate::error::{Result, SellarError, Warning};
pub use crate::infer::InferredShape;
