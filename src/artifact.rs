//! Artifact and parameter-config data model.
//!
//! [`ModelArtifact`] is the typed unit exchanged with collaborators: a
//! tagged union constructed only after validation, so a `FullModel`
//! value always carries all five coefficient arrays. [`RawArtifact`] is
//! the serde view of the decoded JSON where every field is optional;
//! it exists only between decryption and validation.
//!
//! Wire field names (`type`, `A`, `Range`, `w`, `a`, `b`) are fixed by
//! the native C++ reader and must not be renamed.

use serde::{Deserialize, Serialize};

/// Artifact kind tag, serialized as the integer `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum ArtifactKind {
    /// Tuning-only artifact: `A` coefficients and `Range`, no feature
    /// dimension.
    Fit = 0,
    /// Full modelling artifact: `w`, `a`, `b` matrices plus `A` and
    /// `Range`.
    FullModel = 1,
}

impl ArtifactKind {
    /// Convert from the wire integer value.
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Fit),
            1 => Some(Self::FullModel),
            _ => None,
        }
    }

    /// Wire integer value of this kind.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// A decoded, validated model artifact.
///
/// `w` and `a` are feature-major F×P matrices stored flat; `b` is the
/// transposed P×F orientation. `A` (tuning) has one entry per
/// parameter and `Range` holds P (min, max) pairs in parameter order.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelArtifact {
    /// Kind 0: tuning coefficients only.
    Fit {
        /// `A` coefficients, length P
        tuning: Vec<f64>,
        /// `Range` pairs flattened, length 2·P
        range: Vec<f64>,
    },
    /// Kind 1: full coefficient set.
    FullModel {
        /// `w` matrix, F×P flattened feature-major, length F·P
        weight: Vec<f64>,
        /// `a` matrix, F×P flattened feature-major, length F·P
        influence: Vec<f64>,
        /// `b` matrix, P×F flattened parameter-major, length P·F
        power: Vec<f64>,
        /// `A` coefficients, length P
        tuning: Vec<f64>,
        /// `Range` pairs flattened, length 2·P
        range: Vec<f64>,
    },
}

impl ModelArtifact {
    /// Kind tag of this artifact.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Fit { .. } => ArtifactKind::Fit,
            Self::FullModel { .. } => ArtifactKind::FullModel,
        }
    }

    /// `A` coefficients (always present, length P).
    #[must_use]
    pub fn tuning(&self) -> &[f64] {
        match self {
            Self::Fit { tuning, .. } | Self::FullModel { tuning, .. } => tuning,
        }
    }

    /// Flattened `Range` pairs (always present, length 2·P).
    #[must_use]
    pub fn range(&self) -> &[f64] {
        match self {
            Self::Fit { range, .. } | Self::FullModel { range, .. } => range,
        }
    }

    /// Parameter count P, taken from the tuning coefficients.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.tuning().len()
    }

    /// Feature count F, or `None` for Fit artifacts.
    #[must_use]
    pub fn feature_count(&self) -> Option<usize> {
        match self {
            Self::Fit { .. } => None,
            Self::FullModel { weight, tuning, .. } => {
                Some(weight.len() / tuning.len().max(1))
            }
        }
    }

    /// Build the serde wire view of this artifact.
    #[must_use]
    pub fn to_raw(&self) -> RawArtifact {
        match self {
            Self::Fit { tuning, range } => RawArtifact {
                kind: Some(ArtifactKind::Fit.as_i64()),
                tuning: Some(tuning.clone()),
                range: Some(range.clone()),
                weight: None,
                influence: None,
                power: None,
            },
            Self::FullModel {
                weight,
                influence,
                power,
                tuning,
                range,
            } => RawArtifact {
                kind: Some(ArtifactKind::FullModel.as_i64()),
                tuning: Some(tuning.clone()),
                range: Some(range.clone()),
                weight: Some(weight.clone()),
                influence: Some(influence.clone()),
                power: Some(power.clone()),
            },
        }
    }
}

/// Untyped serde view of the artifact JSON.
///
/// Field presence is resolved by the validator, which turns this into
/// a [`ModelArtifact`] or a typed error. Field order here fixes the
/// JSON key order on encode, which keeps re-encoding deterministic.
///
/// Coefficient sequences go through [`wire_floats`]: non-finite values
/// are legal artifact content (a soft check, not a rejection) but JSON
/// numbers cannot carry them, so they travel as the token strings the
/// container layer converts to and from the bare `NaN`/`Infinity`
/// tokens the original producer writes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawArtifact {
    /// `type` tag: 0 = Fit, 1 = FullModel
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    /// `A` tuning coefficients
    #[serde(
        rename = "A",
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_floats"
    )]
    pub tuning: Option<Vec<f64>>,
    /// `Range` min/max pairs, flattened
    #[serde(
        rename = "Range",
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_floats"
    )]
    pub range: Option<Vec<f64>>,
    /// `w` matrix, flattened F×P
    #[serde(
        rename = "w",
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_floats"
    )]
    pub weight: Option<Vec<f64>>,
    /// `a` matrix, flattened F×P
    #[serde(
        rename = "a",
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_floats"
    )]
    pub influence: Option<Vec<f64>>,
    /// `b` matrix, flattened P×F
    #[serde(
        rename = "b",
        default,
        skip_serializing_if = "Option::is_none",
        with = "wire_floats"
    )]
    pub power: Option<Vec<f64>>,
}

/// Serde adapter for coefficient sequences.
///
/// Finite values are plain JSON numbers. Non-finite values serialize
/// as the token strings `"NaN"`, `"Infinity"`, `"-Infinity"`; on read
/// the same tokens are accepted, as is `null` (which is what a writer
/// without token support turns NaN into). The container layer strips
/// and restores the quotes so the persisted bytes carry the bare
/// tokens Python's `json.dumps` emits.
mod wire_floats {
    use serde::de::{Error as DeError, SeqAccess, Unexpected, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub(super) fn serialize<S>(
        values: &Option<Vec<f64>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // skip_serializing_if keeps None fields out of here.
        let values = values.as_deref().unwrap_or(&[]);
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            if value.is_finite() {
                seq.serialize_element(value)?;
            } else if value.is_nan() {
                seq.serialize_element("NaN")?;
            } else if *value > 0.0 {
                seq.serialize_element("Infinity")?;
            } else {
                seq.serialize_element("-Infinity")?;
            }
        }
        seq.end()
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeqVisitor;

        impl<'de> Visitor<'de> for SeqVisitor {
            type Value = Vec<f64>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of numbers or non-finite tokens")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(element) = seq.next_element::<WireFloat>()? {
                    values.push(element.0);
                }
                Ok(values)
            }
        }

        deserializer.deserialize_seq(SeqVisitor).map(Some)
    }

    struct WireFloat(f64);

    impl<'de> serde::Deserialize<'de> for WireFloat {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct FloatVisitor;

            impl<'de> Visitor<'de> for FloatVisitor {
                type Value = WireFloat;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a number, a non-finite token, or null")
                }

                fn visit_f64<E>(self, v: f64) -> Result<WireFloat, E>
                where
                    E: DeError,
                {
                    Ok(WireFloat(v))
                }

                fn visit_i64<E>(self, v: i64) -> Result<WireFloat, E>
                where
                    E: DeError,
                {
                    Ok(WireFloat(v as f64))
                }

                fn visit_u64<E>(self, v: u64) -> Result<WireFloat, E>
                where
                    E: DeError,
                {
                    Ok(WireFloat(v as f64))
                }

                fn visit_unit<E>(self) -> Result<WireFloat, E>
                where
                    E: DeError,
                {
                    Ok(WireFloat(f64::NAN))
                }

                fn visit_str<E>(self, v: &str) -> Result<WireFloat, E>
                where
                    E: DeError,
                {
                    match v {
                        "NaN" => Ok(WireFloat(f64::NAN)),
                        "Infinity" => Ok(WireFloat(f64::INFINITY)),
                        "-Infinity" => Ok(WireFloat(f64::NEG_INFINITY)),
                        _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
                    }
                }
            }

            deserializer.deserialize_any(FloatVisitor)
        }
    }
}

/// Ordered parameter and feature-station name lists.
///
/// Order is semantically significant: it defines the row/column mapping
/// of every flat coefficient array. The config is embedded verbatim in
/// Versioned containers so a file stays self-describing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterConfig {
    /// Parameter names, length P
    pub water_params: Vec<String>,
    /// Feature-station names, length F
    pub feature_stations: Vec<String>,
}

impl Default for ParameterConfig {
    /// The deployment-standard 11 water-quality parameters and 26
    /// feature stations.
    fn default() -> Self {
        Self {
            water_params: [
                "turbidity", "ss", "sd", "do", "codmn", "codcr", "chla", "tn", "tp",
                "chroma", "nh3n",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            feature_stations: (1..=26).map(|i| format!("STZ{i}")).collect(),
        }
    }
}

impl ParameterConfig {
    /// Create a config from owned name lists.
    #[must_use]
    pub fn new(water_params: Vec<String>, feature_stations: Vec<String>) -> Self {
        Self {
            water_params,
            feature_stations,
        }
    }

    /// Parameter count P.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.water_params.len()
    }

    /// Feature count F.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.feature_stations.len()
    }

    /// Check the config is usable for encoding.
    ///
    /// Empty parameter lists are rejected; duplicate names are
    /// tolerated but reported as warnings.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyConfig`] if `water_params` is
    /// empty.
    pub fn validate(&self) -> crate::error::Result<Vec<crate::error::Warning>> {
        use crate::error::{ValidationError, Warning};

        if self.water_params.is_empty() {
            return Err(ValidationError::EmptyConfig {
                list: "water_params",
            }
            .into());
        }

        let mut warnings = Vec::new();
        for (list, names) in [
            ("water_params", &self.water_params),
            ("feature_stations", &self.feature_stations),
        ] {
            let mut seen = std::collections::HashSet::new();
            for name in names {
                if !seen.insert(name.as_str()) {
                    warnings.push(Warning::DuplicateName {
                        list,
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_value() {
        assert_eq!(ArtifactKind::from_i64(0), Some(ArtifactKind::Fit));
        assert_eq!(ArtifactKind::from_i64(1), Some(ArtifactKind::FullModel));
        assert_eq!(ArtifactKind::from_i64(2), None);
        assert_eq!(ArtifactKind::from_i64(-1), None);
        assert_eq!(ArtifactKind::FullModel.as_i64(), 1);
    }

    #[test]
    fn raw_artifact_uses_wire_field_names() {
        let raw = RawArtifact {
            kind: Some(0),
            tuning: Some(vec![1.0, 2.0]),
            range: Some(vec![0.0, 1.0, 0.0, 2.0]),
            ..RawArtifact::default()
        };
        let json = serde_json::to_string(&raw).unwrap();
        assert!(json.contains("\"type\":0"));
        assert!(json.contains("\"A\":"));
        assert!(json.contains("\"Range\":"));
        assert!(!json.contains("\"w\""), "absent fields must be omitted: {json}");
    }

    #[test]
    fn raw_artifact_field_order_is_stable() {
        let raw = ModelArtifact::FullModel {
            weight: vec![1.0],
            influence: vec![2.0],
            power: vec![3.0],
            tuning: vec![4.0],
            range: vec![0.0, 1.0],
        }
        .to_raw();
        let json = serde_json::to_string(&raw).unwrap();
        let order = ["\"type\"", "\"A\"", "\"Range\"", "\"w\"", "\"a\"", "\"b\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn non_finite_values_serialize_as_tokens() {
        let raw = RawArtifact {
            kind: Some(0),
            tuning: Some(vec![1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY]),
            ..RawArtifact::default()
        };
        let json = serde_json::to_string(&raw).unwrap();
        assert!(json.contains(r#"[1.0,"NaN","Infinity","-Infinity"]"#), "{json}");
        assert!(!json.contains("null"), "{json}");
    }

    #[test]
    fn token_and_null_elements_deserialize() {
        let raw: RawArtifact =
            serde_json::from_str(r#"{"type":0,"A":[1.0,"NaN","Infinity","-Infinity",null,2]}"#)
                .unwrap();
        let tuning = raw.tuning.unwrap();
        assert_eq!(tuning[0], 1.0);
        assert!(tuning[1].is_nan());
        assert_eq!(tuning[2], f64::INFINITY);
        assert_eq!(tuning[3], f64::NEG_INFINITY);
        assert!(tuning[4].is_nan());
        assert_eq!(tuning[5], 2.0);
    }

    #[test]
    fn unknown_token_is_a_parse_error() {
        let result = serde_json::from_str::<RawArtifact>(r#"{"type":0,"A":["fast"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn default_config_matches_deployment_standard() {
        let config = ParameterConfig::default();
        assert_eq!(config.param_count(), 11);
        assert_eq!(config.feature_count(), 26);
        assert_eq!(config.water_params[0], "turbidity");
        assert_eq!(config.feature_stations[0], "STZ1");
        assert_eq!(config.feature_stations[25], "STZ26");
    }

    #[test]
    fn empty_water_params_rejected() {
        let config = ParameterConfig::new(vec![], vec!["STZ1".into()]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_names_warn_but_pass() {
        let config = ParameterConfig::new(
            vec!["tn".into(), "tn".into()],
            vec!["STZ1".into()],
        );
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn full_model_feature_count_derives_from_lengths() {
        let artifact = ModelArtifact::FullModel {
            weight: vec![0.0; 286],
            influence: vec![0.0; 286],
            power: vec![0.0; 286],
            tuning: vec![1.0; 11],
            range: vec![0.0; 22],
        };
        assert_eq!(artifact.feature_count(), Some(26));
        assert_eq!(artifact.param_count(), 11);
    }
}
