//! Adaptive dimension inference for shape-less legacy containers.
//!
//! Legacy layouts record no parameter or feature counts, so both are
//! reconstructed from the flat array lengths. `w` and `a` are tried
//! before `b`: they are feature-major and expose F directly as a
//! divisor, while `b` is transposed and a divisibility match alone
//! cannot disambiguate it from coincidence. That residual ambiguity is
//! inherent to the shape-less formats and is not resolved further.

use crate::artifact::RawArtifact;
use crate::error::Warning;

/// Parameter count assumed when the `A` field is absent or empty.
///
/// Matches the 11 standard water-quality parameters of the original
/// deployment.
pub const DEFAULT_PARAM_COUNT: usize = 11;

/// Shape recovered from array lengths or embedded metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredShape {
    /// Parameter count P
    pub param_count: usize,
    /// Feature count F; `None` for Fit-shaped artifacts
    pub feature_count: Option<usize>,
}

impl InferredShape {
    /// Build a shape with both dimensions known.
    #[must_use]
    pub fn full(param_count: usize, feature_count: usize) -> Self {
        Self {
            param_count,
            feature_count: Some(feature_count),
        }
    }

    /// Build a shape with no feature dimension.
    #[must_use]
    pub fn fit(param_count: usize) -> Self {
        Self {
            param_count,
            feature_count: None,
        }
    }
}

/// Recover (P, F) from a raw artifact's flat array lengths.
///
/// P is the length of `A` when present and non-empty, else
/// [`DEFAULT_PARAM_COUNT`]. F is taken from the first of `w`, `a`, `b`
/// whose length divides evenly by P; if none does, the artifact is
/// treated as Fit-shaped (`F = None`). Cross-check findings are
/// returned as warnings and never abort the decode.
#[must_use]
pub fn infer_shape(raw: &RawArtifact) -> (InferredShape, Vec<Warning>) {
    let param_count = raw
        .tuning
        .as_ref()
        .filter(|a| !a.is_empty())
        .map_or(DEFAULT_PARAM_COUNT, Vec::len);

    let candidates: [(&'static str, Option<&Vec<f64>>); 3] = [
        ("w", raw.weight.as_ref()),
        ("a", raw.influence.as_ref()),
        ("b", raw.power.as_ref()),
    ];
    let feature_count = candidates.iter().find_map(|&(_, field)| {
        field
            .filter(|v| !v.is_empty() && v.len() % param_count == 0)
            .map(|v| v.len() / param_count)
    });

    let shape = InferredShape {
        param_count,
        feature_count,
    };
    let warnings = cross_check(&shape, raw);
    (shape, warnings)
}

/// Recompute expected lengths for every present field and report any
/// mismatch as a warning.
#[must_use]
pub fn cross_check(shape: &InferredShape, raw: &RawArtifact) -> Vec<Warning> {
    let p = shape.param_count;
    let mut warnings = Vec::new();

    let mut check = |field: &'static str, values: Option<&Vec<f64>>, expected: usize| {
        if let Some(values) = values {
            if values.len() != expected {
                warnings.push(Warning::LengthInconsistent {
                    field,
                    expected,
                    actual: values.len(),
                });
            }
        }
    };

    check("A", raw.tuning.as_ref(), p);
    check("Range", raw.range.as_ref(), 2 * p);

    match shape.feature_count {
        Some(f) => {
            check("w", raw.weight.as_ref(), f * p);
            check("a", raw.influence.as_ref(), f * p);
            check("b", raw.power.as_ref(), p * f);
        }
        None => {
            // Any present matrix field failed the divisibility test.
            for (field, values) in [
                ("w", raw.weight.as_ref()),
                ("a", raw.influence.as_ref()),
                ("b", raw.power.as_ref()),
            ] {
                if let Some(values) = values {
                    warnings.push(Warning::IndivisibleLength {
                        field,
                        len: values.len(),
                        param_count: p,
                    });
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with(tuning: Option<Vec<f64>>, weight: Option<Vec<f64>>) -> RawArtifact {
        RawArtifact {
            kind: Some(1),
            tuning,
            weight,
            ..RawArtifact::default()
        }
    }

    #[test]
    fn recovers_standard_deployment_shape() {
        // A of length 11 and w of length 286 => P=11, F=26.
        let raw = raw_with(Some(vec![1.0; 11]), Some(vec![0.5; 286]));
        let (shape, warnings) = infer_shape(&raw);
        assert_eq!(shape, InferredShape::full(11, 26));
        assert!(warnings.is_empty());
    }

    #[test]
    fn no_matrix_fields_means_fit_shape() {
        let raw = raw_with(Some(vec![1.0; 11]), None);
        let (shape, warnings) = infer_shape(&raw);
        assert_eq!(shape, InferredShape::fit(11));
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_tuning_falls_back_to_default_param_count() {
        let raw = raw_with(None, Some(vec![0.5; 286]));
        let (shape, _) = infer_shape(&raw);
        assert_eq!(shape.param_count, DEFAULT_PARAM_COUNT);
        assert_eq!(shape.feature_count, Some(26));
    }

    #[test]
    fn empty_tuning_treated_as_absent() {
        let raw = raw_with(Some(vec![]), None);
        let (shape, _) = infer_shape(&raw);
        assert_eq!(shape.param_count, DEFAULT_PARAM_COUNT);
    }

    #[test]
    fn weight_preferred_over_power() {
        // w gives F=2, b would give F=3; w wins by order of preference.
        let raw = RawArtifact {
            kind: Some(1),
            tuning: Some(vec![1.0; 4]),
            weight: Some(vec![0.0; 8]),
            power: Some(vec![0.0; 12]),
            ..RawArtifact::default()
        };
        let (shape, warnings) = infer_shape(&raw);
        assert_eq!(shape.feature_count, Some(2));
        // b's length then disagrees with F=2: surfaced, not fatal.
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::LengthInconsistent { field: "b", .. })));
    }

    #[test]
    fn influence_tried_when_weight_indivisible() {
        let raw = RawArtifact {
            kind: Some(1),
            tuning: Some(vec![1.0; 4]),
            weight: Some(vec![0.0; 7]),
            influence: Some(vec![0.0; 8]),
            ..RawArtifact::default()
        };
        let (shape, warnings) = infer_shape(&raw);
        assert_eq!(shape.feature_count, Some(2));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::LengthInconsistent { field: "w", .. })));
    }

    #[test]
    fn indivisible_matrices_yield_no_feature_dimension() {
        let raw = raw_with(Some(vec![1.0; 4]), Some(vec![0.0; 7]));
        let (shape, warnings) = infer_shape(&raw);
        assert_eq!(shape.feature_count, None);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, Warning::IndivisibleLength { field: "w", len: 7, param_count: 4 })));
    }

    #[test]
    fn empty_matrix_field_is_ignored() {
        let raw = raw_with(Some(vec![1.0; 4]), Some(vec![]));
        let (shape, _) = infer_shape(&raw);
        assert_eq!(shape.feature_count, None);
    }

    #[test]
    fn cross_check_flags_range_disagreement() {
        let raw = RawArtifact {
            kind: Some(0),
            tuning: Some(vec![1.0; 3]),
            range: Some(vec![0.0; 7]),
            ..RawArtifact::default()
        };
        let (_, warnings) = infer_shape(&raw);
        assert_eq!(
            warnings,
            vec![Warning::LengthInconsistent {
                field: "Range",
                expected: 6,
                actual: 7
            }]
        );
    }
}
