//! The feature contract shared by the form, the record and the classifier.
//!
//! Column names, their order and their value domains must match what the
//! model was trained on verbatim; a renamed or reordered column is not
//! detected by the classifier, it just scores the wrong numbers. Everything
//! that needs the contract reads it from here.

use crate::encoding::{self, ChoiceTable};
use crate::error::ValidationRejection;
use crate::record::FeatureValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the feature contract. Model artifacts declare the version they
/// were trained against and are refused when it differs.
pub const SCHEMA_VERSION: u32 = 1;

/// One column of the feature record, in contract order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKey {
    Age,
    Sex,
    Cp,
    Trestbps,
    Chol,
    Fbs,
    Restecg,
    Thalach,
    Exang,
    Oldpeak,
    Slope,
    Ca,
    Thal,
}

impl FeatureKey {
    pub const COUNT: usize = 13;

    pub const ALL: [FeatureKey; Self::COUNT] = [
        Self::Age,
        Self::Sex,
        Self::Cp,
        Self::Trestbps,
        Self::Chol,
        Self::Fbs,
        Self::Restecg,
        Self::Thalach,
        Self::Exang,
        Self::Oldpeak,
        Self::Slope,
        Self::Ca,
        Self::Thal,
    ];

    /// Column name expected by the classifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::Cp => "cp",
            Self::Trestbps => "trestbps",
            Self::Chol => "chol",
            Self::Fbs => "fbs",
            Self::Restecg => "restecg",
            Self::Thalach => "thalach",
            Self::Exang => "exang",
            Self::Oldpeak => "oldpeak",
            Self::Slope => "slope",
            Self::Ca => "ca",
            Self::Thal => "thal",
        }
    }

    /// Position in the feature vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    pub fn spec(&self) -> &'static FeatureSpec {
        &FEATURES[self.index()]
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual cluster a field is shown in. Carries no meaning for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Primary,
    Secondary,
}

/// Scalar type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    Float,
}

/// Set of values a field may take.
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    /// Inclusive integer range.
    IntRange { min: i64, max: i64 },
    /// Inclusive decimal range on a `10^-decimals` grid.
    DecimalRange { min: f64, max: f64, decimals: u32 },
    /// Small fixed set of integer codes.
    Enumerated(&'static [i64]),
    /// Human-readable choice encoded through a lookup table.
    Choice(&'static ChoiceTable),
}

/// Contract entry for one column.
#[derive(Debug)]
pub struct FeatureSpec {
    pub key: FeatureKey,
    pub kind: ValueKind,
    pub domain: Domain,
    pub default: FeatureValue,
    pub group: FieldGroup,
}

pub static FEATURES: [FeatureSpec; FeatureKey::COUNT] = [
    FeatureSpec {
        key: FeatureKey::Age,
        kind: ValueKind::Integer,
        domain: Domain::IntRange { min: 1, max: 120 },
        default: FeatureValue::Int(50),
        group: FieldGroup::Primary,
    },
    FeatureSpec {
        key: FeatureKey::Sex,
        kind: ValueKind::Integer,
        domain: Domain::Choice(&encoding::SEX),
        default: FeatureValue::Int(1),
        group: FieldGroup::Primary,
    },
    FeatureSpec {
        key: FeatureKey::Cp,
        kind: ValueKind::Integer,
        domain: Domain::Enumerated(&[0, 1, 2, 3]),
        default: FeatureValue::Int(0),
        group: FieldGroup::Primary,
    },
    FeatureSpec {
        key: FeatureKey::Trestbps,
        kind: ValueKind::Integer,
        domain: Domain::IntRange { min: 50, max: 250 },
        default: FeatureValue::Int(120),
        group: FieldGroup::Primary,
    },
    FeatureSpec {
        key: FeatureKey::Chol,
        kind: ValueKind::Integer,
        domain: Domain::IntRange { min: 100, max: 600 },
        default: FeatureValue::Int(200),
        group: FieldGroup::Primary,
    },
    FeatureSpec {
        key: FeatureKey::Fbs,
        kind: ValueKind::Integer,
        domain: Domain::Choice(&encoding::YES_NO),
        default: FeatureValue::Int(0),
        group: FieldGroup::Primary,
    },
    FeatureSpec {
        key: FeatureKey::Restecg,
        kind: ValueKind::Integer,
        domain: Domain::Enumerated(&[0, 1, 2]),
        default: FeatureValue::Int(0),
        group: FieldGroup::Secondary,
    },
    FeatureSpec {
        key: FeatureKey::Thalach,
        kind: ValueKind::Integer,
        domain: Domain::IntRange { min: 60, max: 220 },
        default: FeatureValue::Int(150),
        group: FieldGroup::Secondary,
    },
    FeatureSpec {
        key: FeatureKey::Exang,
        kind: ValueKind::Integer,
        domain: Domain::Choice(&encoding::YES_NO),
        default: FeatureValue::Int(0),
        group: FieldGroup::Secondary,
    },
    FeatureSpec {
        key: FeatureKey::Oldpeak,
        kind: ValueKind::Float,
        domain: Domain::DecimalRange {
            min: 0.0,
            max: 10.0,
            decimals: 1,
        },
        default: FeatureValue::Float(1.0),
        group: FieldGroup::Secondary,
    },
    FeatureSpec {
        key: FeatureKey::Slope,
        kind: ValueKind::Integer,
        domain: Domain::Enumerated(&[0, 1, 2]),
        default: FeatureValue::Int(0),
        group: FieldGroup::Secondary,
    },
    FeatureSpec {
        key: FeatureKey::Ca,
        kind: ValueKind::Integer,
        domain: Domain::Enumerated(&[0, 1, 2, 3, 4]),
        default: FeatureValue::Int(0),
        group: FieldGroup::Secondary,
    },
    FeatureSpec {
        key: FeatureKey::Thal,
        kind: ValueKind::Integer,
        domain: Domain::Enumerated(&[0, 1, 2, 3]),
        default: FeatureValue::Int(0),
        group: FieldGroup::Secondary,
    },
];

impl FeatureSpec {
    pub fn of(key: FeatureKey) -> &'static FeatureSpec {
        key.spec()
    }

    pub fn name(&self) -> &'static str {
        self.key.as_str()
    }

    /// Fields of one visual cluster, in contract order.
    pub fn in_group(group: FieldGroup) -> impl Iterator<Item = &'static FeatureSpec> {
        FEATURES.iter().filter(move |s| s.group == group)
    }

    /// Parse raw user text into a value of this column's domain.
    ///
    /// This is the only place raw input becomes a `FeatureValue`; every
    /// surface (terminal form, CLI flags, web form, JSON API) goes through it.
    pub fn parse(&self, raw: &str) -> Result<FeatureValue, ValidationRejection> {
        let raw = raw.trim();
        match self.domain {
            Domain::Choice(table) => table
                .encode(raw)
                .map(FeatureValue::Int)
                .ok_or_else(|| ValidationRejection::UnknownChoice {
                    field: self.name(),
                    value: raw.to_string(),
                    expected: table.describe(),
                }),
            Domain::DecimalRange { .. } => {
                let value: f64 = raw.parse().map_err(|_| self.not_a_number(raw))?;
                self.check(FeatureValue::Float(value))
            }
            Domain::IntRange { .. } | Domain::Enumerated(_) => {
                let value: i64 = raw.parse().map_err(|_| self.not_a_number(raw))?;
                self.check(FeatureValue::Int(value))
            }
        }
    }

    /// Validate an already typed value, returning it in canonical form.
    pub fn check(&self, value: FeatureValue) -> Result<FeatureValue, ValidationRejection> {
        match (self.domain, value) {
            (Domain::IntRange { min, max }, FeatureValue::Int(v)) => {
                if (min..=max).contains(&v) {
                    Ok(value)
                } else {
                    Err(ValidationRejection::OutOfRange {
                        field: self.name(),
                        value: v.to_string(),
                        min: min.to_string(),
                        max: max.to_string(),
                    })
                }
            }
            (Domain::Enumerated(codes), FeatureValue::Int(v)) => {
                if codes.contains(&v) {
                    Ok(value)
                } else {
                    Err(ValidationRejection::NotInDomain {
                        field: self.name(),
                        value: v.to_string(),
                        allowed: self.describe_domain(),
                    })
                }
            }
            (Domain::Choice(table), FeatureValue::Int(v)) => {
                if table.contains_code(v) {
                    Ok(value)
                } else {
                    Err(ValidationRejection::NotInDomain {
                        field: self.name(),
                        value: v.to_string(),
                        allowed: table.describe_codes(),
                    })
                }
            }
            (Domain::DecimalRange { .. }, FeatureValue::Int(v)) => {
                self.check(FeatureValue::Float(v as f64))
            }
            (Domain::DecimalRange { min, max, decimals }, FeatureValue::Float(v)) => {
                if !v.is_finite() {
                    return Err(self.not_a_number(&v.to_string()));
                }
                let scale = 10f64.powi(decimals as i32);
                let scaled = v * scale;
                if (scaled - scaled.round()).abs() > 1e-6 {
                    return Err(ValidationRejection::OffStep {
                        field: self.name(),
                        value: v.to_string(),
                        step: format!("{:.*}", decimals as usize, 1.0 / scale),
                    });
                }
                let snapped = scaled.round() / scale;
                if snapped < min || snapped > max {
                    return Err(ValidationRejection::OutOfRange {
                        field: self.name(),
                        value: v.to_string(),
                        min: format!("{:.*}", decimals as usize, min),
                        max: format!("{:.*}", decimals as usize, max),
                    });
                }
                Ok(FeatureValue::Float(snapped))
            }
            (_, FeatureValue::Float(_)) => Err(ValidationRejection::WrongType {
                field: self.name(),
                expected: "an integer",
            }),
        }
    }

    /// Integer codes selectable for enumerated and choice fields.
    pub fn options(&self) -> Option<Vec<i64>> {
        match self.domain {
            Domain::Enumerated(codes) => Some(codes.to_vec()),
            Domain::Choice(table) => Some(table.codes().collect()),
            _ => None,
        }
    }

    /// Choice table for fields presented as a human-readable choice.
    pub fn choice_table(&self) -> Option<&'static ChoiceTable> {
        match self.domain {
            Domain::Choice(table) => Some(table),
            _ => None,
        }
    }

    pub fn describe_domain(&self) -> String {
        match self.domain {
            Domain::IntRange { min, max } => format!("[{min}, {max}]"),
            Domain::DecimalRange { min, max, decimals } => {
                let d = decimals as usize;
                format!("[{min:.d$}, {max:.d$}] step {:.d$}", 10f64.powi(-(decimals as i32)))
            }
            Domain::Enumerated(codes) => {
                let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
                format!("{{{}}}", codes.join(", "))
            }
            Domain::Choice(table) => table.describe(),
        }
    }

    fn not_a_number(&self, raw: &str) -> ValidationRejection {
        ValidationRejection::NotANumber {
            field: self.name(),
            value: raw.to_string(),
        }
    }
}

/// Column names in contract order.
pub fn feature_names() -> [&'static str; FeatureKey::COUNT] {
    FeatureKey::ALL.map(|k| k.as_str())
}

/// Serializable description of the contract, for `schema --json` and docs.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDescription {
    pub version: u32,
    pub fields: Vec<FieldDescription>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldDescription {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub domain: String,
    pub default: FeatureValue,
    pub group: FieldGroup,
}

pub fn describe() -> SchemaDescription {
    SchemaDescription {
        version: SCHEMA_VERSION,
        fields: FEATURES
            .iter()
            .map(|s| FieldDescription {
                name: s.name(),
                kind: s.kind,
                domain: s.describe_domain(),
                default: s.default,
                group: s.group,
            })
            .collect(),
    }
}
