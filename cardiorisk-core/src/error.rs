//! Error types for the cardiorisk core library.
//!
//! Uses `thiserror` for public API error types. The three domain errors map
//! onto the three ways a prediction round can go wrong: the model never
//! loaded, a field was rejected at entry, or the classifier itself failed.

use std::path::PathBuf;

/// Top-level error type for the cardiorisk core library.
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("Model load error: {0}")]
    Load(#[from] LoadError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationRejection),

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to obtain a classifier from the model artifact.
///
/// Cloneable so the cached load outcome can be handed out repeatedly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("model file '{}' was not found", path.display())]
    NotFound { path: PathBuf },

    #[error("model file '{}' could not be read: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("model file '{}' is corrupt: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("model file '{}' uses unsupported format version {found}", path.display())]
    UnsupportedFormat { path: PathBuf, found: u32 },

    #[error("model file '{}' does not match the feature schema: {message}", path.display())]
    SchemaMismatch { path: PathBuf, message: String },
}

impl LoadError {
    /// Path of the artifact that failed to load.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound { path }
            | Self::Unreadable { path, .. }
            | Self::Corrupt { path, .. }
            | Self::UnsupportedFormat { path, .. }
            | Self::SchemaMismatch { path, .. } => path,
        }
    }
}

/// A field value refused at the point of entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationRejection {
    #[error("{field}: '{value}' is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("{field}: {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("{field}: {value} is not on the {step} step grid")]
    OffStep {
        field: &'static str,
        value: String,
        step: String,
    },

    #[error("{field}: {value} is not one of {allowed}")]
    NotInDomain {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field}: '{value}' is not a valid choice (expected {expected})")]
    UnknownChoice {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("{field}: expected {expected} value")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error("{field}: missing")]
    MissingField { field: &'static str },
}

impl ValidationRejection {
    /// Name of the field that was rejected.
    pub fn field(&self) -> &str {
        match self {
            Self::NotANumber { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::OffStep { field, .. }
            | Self::NotInDomain { field, .. }
            | Self::UnknownChoice { field, .. }
            | Self::WrongType { field, .. }
            | Self::MissingField { field } => field,
            Self::UnknownField { name } => name,
        }
    }
}

/// Failure raised by the classifier while scoring a well-formed record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("classifier returned label {value}, expected 0 or 1")]
    InvalidLabel { value: i64 },

    #[error("classifier returned an invalid probability distribution: {reason}")]
    InvalidDistribution { reason: String },

    #[error("classifier referenced feature index {index}, record has {len} features")]
    FeatureIndex { index: usize, len: usize },

    #[error("classifier produced a non-finite score for '{model}'")]
    NonFinite { model: String },
}

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown locale '{value}' (expected 'en' or 'id')")]
    UnknownLocale { value: String },

    #[error("Config file not found: {}", path.display())]
    MissingFile { path: PathBuf },
}

/// Result alias for the core library.
pub type Result<T> = std::result::Result<T, CardioError>;
