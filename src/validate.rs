//! Artifact validator.
//!
//! Turns a [`RawArtifact`] plus a recovered shape into a typed
//! [`ModelArtifact`], or a typed error. Checks run in a fixed order
//! and the first hard failure wins; numeric-quality findings (NaN,
//! inverted range pairs) are soft and come back as warnings because
//! the codec's job is to decode, not to police domain semantics.

use crate::artifact::{ArtifactKind, ModelArtifact, RawArtifact};
use crate::error::{Result, ValidationError, Warning};
use crate::infer::InferredShape;

/// Validate a raw artifact against the recovered or declared shape.
///
/// # Errors
/// Returns [`ValidationError`] on an unsupported kind, a missing
/// required field, a length mismatch, or a FullModel artifact with no
/// known feature dimension.
pub fn validate(
    raw: RawArtifact,
    shape: &InferredShape,
) -> Result<(ModelArtifact, Vec<Warning>)> {
    let kind_value = raw.kind.ok_or(ValidationError::MissingField { field: "type" })?;
    let kind = ArtifactKind::from_i64(kind_value)
        .ok_or(ValidationError::UnsupportedKind { found: kind_value })?;
    let p = shape.param_count;

    match kind {
        ArtifactKind::Fit => {
            let tuning = require("A", raw.tuning)?;
            check_len("A", &tuning, p)?;
            let range = require("Range", raw.range)?;
            check_len("Range", &range, 2 * p)?;

            let mut warnings = Vec::new();
            soft_check_finite("A", &tuning, &mut warnings);
            soft_check_finite("Range", &range, &mut warnings);
            soft_check_range_pairs(&range, &mut warnings);

            Ok((ModelArtifact::Fit { tuning, range }, warnings))
        }
        ArtifactKind::FullModel => {
            let f = shape
                .feature_count
                .ok_or(ValidationError::MissingFeatureDimension)?;

            let weight = require("w", raw.weight)?;
            check_len("w", &weight, f * p)?;
            let influence = require("a", raw.influence)?;
            check_len("a", &influence, f * p)?;
            let power = require("b", raw.power)?;
            check_len("b", &power, p * f)?;
            let tuning = require("A", raw.tuning)?;
            check_len("A", &tuning, p)?;
            let range = require("Range", raw.range)?;
            check_len("Range", &range, 2 * p)?;

            let mut warnings = Vec::new();
            soft_check_finite("w", &weight, &mut warnings);
            soft_check_finite("a", &influence, &mut warnings);
            soft_check_finite("b", &power, &mut warnings);
            soft_check_finite("A", &tuning, &mut warnings);
            soft_check_finite("Range", &range, &mut warnings);
            soft_check_range_pairs(&range, &mut warnings);

            Ok((
                ModelArtifact::FullModel {
                    weight,
                    influence,
                    power,
                    tuning,
                    range,
                },
                warnings,
            ))
        }
    }
}

fn require(field: &'static str, values: Option<Vec<f64>>) -> Result<Vec<f64>> {
    values.ok_or_else(|| ValidationError::MissingField { field }.into())
}

fn check_len(field: &'static str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(ValidationError::LengthMismatch {
            field,
            expected,
            actual: values.len(),
        }
        .into())
    }
}

// Observed field data may legitimately be noisy: non-finite values are
// reported, not rejected.
fn soft_check_finite(field: &'static str, values: &[f64], warnings: &mut Vec<Warning>) {
    for (index, value) in values.iter().enumerate() {
        if !value.is_finite() {
            warnings.push(Warning::NonFinite { field, index });
        }
    }
}

fn soft_check_range_pairs(range: &[f64], warnings: &mut Vec<Warning>) {
    for (pair, chunk) in range.chunks_exact(2).enumerate() {
        let (min, max) = (chunk[0], chunk[1]);
        if min > max {
            warnings.push(Warning::InvertedRange { pair, min, max });
        }
    }
}
