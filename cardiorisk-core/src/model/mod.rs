//! Classifier interface and the model artifact it is loaded from.
//!
//! The classifier is an opaque collaborator: the core only needs a label and
//! a two-class probability distribution for a feature record.

pub mod artifact;
pub mod forest;
pub mod linear;
pub mod provider;

pub use artifact::{
    ARTIFACT_FORMAT_VERSION, DEFAULT_MODEL_FILE, Estimator, LoadedModel, ModelArtifact, load,
};
pub use forest::{DecisionTree, ForestModel, TreeNode};
pub use linear::{LogisticModel, StandardScaler};
pub use provider::{ModelProvider, ModelState, resolve_model_path};

use crate::error::PredictionError;
use crate::record::FeatureRecord;
use serde::{Serialize, Serializer};
use std::fmt;

/// Predicted class. `High` is class 1 (at risk), `Low` is class 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    /// Class index, also the index into the probability distribution.
    pub fn index(&self) -> usize {
        match self {
            Self::Low => 0,
            Self::High => 1,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, PredictionError> {
        match code {
            0 => Ok(Self::Low),
            1 => Ok(Self::High),
            value => Err(PredictionError::InvalidLabel { value }),
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl Serialize for RiskLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index() as u8)
    }
}

/// Probability mass over `{0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct ClassDistribution {
    p: [f64; 2],
}

impl ClassDistribution {
    const TOLERANCE: f64 = 1e-6;

    /// Validate and wrap `[p0, p1]`: finite, non-negative, summing to 1.
    pub fn new(p0: f64, p1: f64) -> Result<Self, PredictionError> {
        if !p0.is_finite() || !p1.is_finite() {
            return Err(PredictionError::InvalidDistribution {
                reason: format!("non-finite probability [{p0}, {p1}]"),
            });
        }
        if p0 < 0.0 || p1 < 0.0 {
            return Err(PredictionError::InvalidDistribution {
                reason: format!("negative probability [{p0}, {p1}]"),
            });
        }
        if (p0 + p1 - 1.0).abs() > Self::TOLERANCE {
            return Err(PredictionError::InvalidDistribution {
                reason: format!("probabilities sum to {}", p0 + p1),
            });
        }
        Ok(Self { p: [p0, p1] })
    }

    pub fn get(&self, label: RiskLabel) -> f64 {
        self.p[label.index()]
    }

    pub fn as_array(&self) -> [f64; 2] {
        self.p
    }

    /// Most probable class; ties resolve to `Low`.
    pub fn argmax(&self) -> RiskLabel {
        if self.p[1] > self.p[0] {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }
}

impl From<ClassDistribution> for [f64; 2] {
    fn from(d: ClassDistribution) -> Self {
        d.p
    }
}

/// A pre-trained binary classifier over the feature record.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Human-readable model name for logs.
    fn name(&self) -> &str;

    /// Predicted class for the record.
    fn predict(&self, record: &FeatureRecord) -> Result<RiskLabel, PredictionError>;

    /// Probability distribution over both classes for the record.
    fn predict_probability(
        &self,
        record: &FeatureRecord,
    ) -> Result<ClassDistribution, PredictionError>;
}

/// Classifier that answers every record with the same label and distribution.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    label: RiskLabel,
    distribution: ClassDistribution,
}

impl FixedClassifier {
    pub fn new(label: RiskLabel, distribution: ClassDistribution) -> Self {
        Self {
            label,
            distribution,
        }
    }
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _record: &FeatureRecord) -> Result<RiskLabel, PredictionError> {
        Ok(self.label)
    }

    fn predict_probability(
        &self,
        _record: &FeatureRecord,
    ) -> Result<ClassDistribution, PredictionError> {
        Ok(self.distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_codes() {
        assert_eq!(RiskLabel::from_code(0).unwrap(), RiskLabel::Low);
        assert_eq!(RiskLabel::from_code(1).unwrap(), RiskLabel::High);
        assert_eq!(
            RiskLabel::from_code(2),
            Err(PredictionError::InvalidLabel { value: 2 })
        );
        assert_eq!(serde_json::to_string(&RiskLabel::High).unwrap(), "1");
    }

    #[test]
    fn test_distribution_validation() {
        assert!(ClassDistribution::new(0.82, 0.18).is_ok());
        assert!(ClassDistribution::new(0.5, 0.6).is_err());
        assert!(ClassDistribution::new(-0.1, 1.1).is_err());
        assert!(ClassDistribution::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_distribution_lookup_and_argmax() {
        let d = ClassDistribution::new(0.82, 0.18).unwrap();
        assert_eq!(d.get(RiskLabel::Low), 0.82);
        assert_eq!(d.get(RiskLabel::High), 0.18);
        assert_eq!(d.argmax(), RiskLabel::Low);
        assert_eq!(ClassDistribution::new(0.5, 0.5).unwrap().argmax(), RiskLabel::Low);
        assert_eq!(serde_json::to_string(&d).unwrap(), "[0.82,0.18]");
    }

    #[test]
    fn test_fixed_classifier() {
        let d = ClassDistribution::new(0.3, 0.7).unwrap();
        let model = FixedClassifier::new(RiskLabel::High, d);
        let record = FeatureRecord::defaults();
        assert_eq!(model.predict(&record).unwrap(), RiskLabel::High);
        assert_eq!(model.predict_probability(&record).unwrap(), d);
    }
}
