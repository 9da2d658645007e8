//! # Cardiorisk Core
//!
//! Core library for the cardiorisk heart disease prediction front-end.
//! Provides the feature contract, the validated input collector, the
//! classifier interface and model loading, the prediction renderer, the
//! message catalogs, configuration and the HTTP form gateway.

pub mod collector;
pub mod config;
pub mod encoding;
pub mod error;
pub mod gateway;
pub mod i18n;
pub mod model;
pub mod record;
pub mod render;
pub mod schema;

// Re-export commonly used types at the crate root.
pub use collector::InputCollector;
pub use config::{CardioConfig, ConfigOverrides, load_config};
pub use error::{CardioError, ConfigError, LoadError, PredictionError, Result, ValidationRejection};
pub use i18n::Locale;
pub use model::{ClassDistribution, Classifier, ModelProvider, ModelState, RiskLabel};
pub use record::{FeatureRecord, FeatureValue};
pub use render::{PredictionOutcome, PredictionRenderer, PredictionReport, Screen};
pub use schema::{FeatureKey, FeatureSpec, SCHEMA_VERSION};
