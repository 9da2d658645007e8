//! Model artifact loading.
//!
//! The artifact is produced by the training pipeline as JSON: the estimator
//! parameters plus the feature names and schema version it was trained on.
//! Those are checked against [`crate::schema`] so a column mismatch fails the
//! load instead of silently scoring the wrong vector.

use super::forest::ForestModel;
use super::linear::LogisticModel;
use super::{ClassDistribution, Classifier, RiskLabel};
use crate::error::{LoadError, PredictionError};
use crate::record::FeatureRecord;
use crate::schema::{self, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Artifact layout version understood by this loader.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// File name looked up when no model path is configured.
pub const DEFAULT_MODEL_FILE: &str = "heart_disease_model.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticModel),
    RandomForest(ForestModel),
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::RandomForest(_) => "random_forest",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::LogisticRegression(m) => m.validate(),
            Self::RandomForest(m) => m.validate(),
        }
    }

    fn probability(&self, x: &[f64]) -> Result<ClassDistribution, PredictionError> {
        match self {
            Self::LogisticRegression(m) => m.probability(x),
            Self::RandomForest(m) => m.probability(x),
        }
    }
}

/// On-disk model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Parse and verify artifact JSON read from `path`.
    pub fn from_json(path: &Path, text: &str) -> Result<Self, LoadError> {
        Self::from_bytes(path, text.as_bytes())
    }

    /// Parse raw file contents. Bytes that are not UTF-8 JSON are `Corrupt`.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, LoadError> {
        let artifact: Self = serde_json::from_slice(bytes).map_err(|e| LoadError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        artifact.verify(path)?;
        Ok(artifact)
    }

    /// Check format version, schema version, feature names and estimator shape.
    pub fn verify(&self, path: &Path) -> Result<(), LoadError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                found: self.format_version,
            });
        }
        if self.schema_version != SCHEMA_VERSION {
            return Err(LoadError::SchemaMismatch {
                path: path.to_path_buf(),
                message: format!(
                    "trained against schema version {}, this build uses {SCHEMA_VERSION}",
                    self.schema_version
                ),
            });
        }
        let expected = schema::feature_names();
        if self.feature_names.len() != expected.len() {
            return Err(LoadError::SchemaMismatch {
                path: path.to_path_buf(),
                message: format!(
                    "expected {} features, found {}",
                    expected.len(),
                    self.feature_names.len()
                ),
            });
        }
        if let Some((i, (found, want))) = self
            .feature_names
            .iter()
            .zip(expected.iter())
            .enumerate()
            .find(|(_, (found, want))| found.as_str() != **want)
        {
            return Err(LoadError::SchemaMismatch {
                path: path.to_path_buf(),
                message: format!("column {i} is '{found}', expected '{want}'"),
            });
        }
        self.estimator.validate().map_err(|message| LoadError::Corrupt {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn into_model(self) -> LoadedModel {
        let name = self
            .name
            .unwrap_or_else(|| self.estimator.kind().to_string());
        LoadedModel {
            name,
            estimator: self.estimator,
        }
    }
}

/// A verified estimator ready to score records.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    name: String,
    estimator: Estimator,
}

impl LoadedModel {
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}

impl Classifier for LoadedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, record: &FeatureRecord) -> Result<RiskLabel, PredictionError> {
        Ok(self.predict_probability(record)?.argmax())
    }

    fn predict_probability(
        &self,
        record: &FeatureRecord,
    ) -> Result<ClassDistribution, PredictionError> {
        let x = record.to_vector();
        let distribution = self.estimator.probability(&x)?;
        debug!(model = %self.name, p = ?distribution.as_array(), "Scored record");
        Ok(distribution)
    }
}

/// Read, parse and verify the artifact at `path`.
pub fn load(path: &Path) -> Result<Arc<dyn Classifier>, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })?;
    let artifact = ModelArtifact::from_bytes(path, &bytes)?;
    let model = artifact.into_model();
    info!(
        model = %model.name,
        kind = model.estimator.kind(),
        path = %path.display(),
        "Model loaded"
    );
    Ok(Arc::new(model))
}
