//! Logistic regression estimator with optional standardisation.

use super::ClassDistribution;
use crate::error::PredictionError;
use crate::schema::FeatureKey;
use serde::{Deserialize, Serialize};

/// Per-feature `(x - mean) / scale` applied before the linear term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Binary logistic regression: `p1 = sigmoid(w · x + b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<StandardScaler>,
}

impl LogisticModel {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        let n = FeatureKey::COUNT;
        if self.coefficients.len() != n {
            return Err(format!(
                "expected {n} coefficients, found {}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients must be finite".into());
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(format!("scaler must have {n} means and {n} scales"));
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err("scaler scales must be finite and non-zero".into());
            }
        }
        Ok(())
    }

    /// Raw decision value `w · x + b`.
    pub fn decision(&self, x: &[f64]) -> Result<f64, PredictionError> {
        if x.len() != self.coefficients.len() {
            return Err(PredictionError::FeatureIndex {
                index: self.coefficients.len().saturating_sub(1),
                len: x.len(),
            });
        }
        if let Some(s) = &self.scaler {
            if s.mean.len() != x.len() || s.scale.len() != x.len() {
                return Err(PredictionError::FeatureIndex {
                    index: s.mean.len().min(s.scale.len()),
                    len: x.len(),
                });
            }
        }
        let z = x
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let v = match &self.scaler {
                    Some(s) => (v - s.mean[i]) / s.scale[i],
                    None => v,
                };
                v * self.coefficients[i]
            })
            .sum::<f64>()
            + self.intercept;
        Ok(z)
    }

    pub fn probability(&self, x: &[f64]) -> Result<ClassDistribution, PredictionError> {
        let z = self.decision(x)?;
        if !z.is_finite() {
            return Err(PredictionError::NonFinite {
                model: "logistic_regression".into(),
            });
        }
        let p1 = sigmoid(z);
        ClassDistribution::new(1.0 - p1, p1)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
