//! The feature record handed to the classifier.

use crate::error::ValidationRejection;
use crate::schema::{FEATURES, FeatureKey};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// A single encoded feature value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Exactly one value per schema column, in schema order.
///
/// Only constructed from values that passed their column's domain check, and
/// never mutated afterwards; [`FeatureRecord::with`] returns a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    values: [FeatureValue; FeatureKey::COUNT],
}

impl FeatureRecord {
    /// Record filled with every column's default.
    pub fn defaults() -> Self {
        Self {
            values: FeatureKey::ALL.map(|k| k.spec().default),
        }
    }

    /// Build a record from values in schema order, validating each one.
    pub fn from_values(
        values: [FeatureValue; FeatureKey::COUNT],
    ) -> Result<Self, ValidationRejection> {
        let mut checked = values;
        for (slot, spec) in checked.iter_mut().zip(FEATURES.iter()) {
            *slot = spec.check(*slot)?;
        }
        Ok(Self { values: checked })
    }

    /// Copy of this record with one column replaced.
    pub fn with(&self, key: FeatureKey, value: FeatureValue) -> Result<Self, ValidationRejection> {
        let value = key.spec().check(value)?;
        let mut values = self.values;
        values[key.index()] = value;
        Ok(Self { values })
    }

    pub fn get(&self, key: FeatureKey) -> FeatureValue {
        self.values[key.index()]
    }

    /// `(key, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, FeatureValue)> + '_ {
        FeatureKey::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Positional feature vector in the order the classifier was trained on.
    pub fn to_vector(&self) -> [f64; FeatureKey::COUNT] {
        self.values.map(|v| v.as_f64())
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FeatureKey::COUNT))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}
