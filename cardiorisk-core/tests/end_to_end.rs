//! End-to-end scenarios: form entry through submission to the rendered screen.

use cardiorisk_core::error::LoadError;
use cardiorisk_core::model::{FixedClassifier, LoadedModel, ModelArtifact};
use cardiorisk_core::render::{ResultsSection, Tone};
use cardiorisk_core::{
    ClassDistribution, Classifier, FeatureKey, FeatureRecord, FeatureValue, InputCollector, Locale,
    ModelProvider, PredictionError, PredictionRenderer, RiskLabel, ValidationRejection,
};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Scenario input, entered the way a user types it.
const SCENARIO: [(&str, &str); 13] = [
    ("age", "50"),
    ("sex", "male"),
    ("cp", "0"),
    ("trestbps", "120"),
    ("chol", "200"),
    ("fbs", "no"),
    ("restecg", "0"),
    ("thalach", "150"),
    ("exang", "no"),
    ("oldpeak", "1.0"),
    ("slope", "0"),
    ("ca", "0"),
    ("thal", "0"),
];

fn fixed(label: RiskLabel, p0: f64, p1: f64) -> ModelProvider {
    ModelProvider::preloaded(Arc::new(FixedClassifier::new(
        label,
        ClassDistribution::new(p0, p1).unwrap(),
    )))
}

fn collector_with(entries: &[(&str, &str)]) -> InputCollector {
    let mut collector = InputCollector::new();
    let rejections = collector.apply(entries.iter().copied());
    assert!(rejections.is_empty(), "unexpected rejections: {rejections:?}");
    collector
}

#[test]
fn test_reference_scenario_renders_safe_with_82_percent() {
    let model = fixed(RiskLabel::Low, 0.82, 0.18);
    let mut collector = collector_with(&SCENARIO);
    collector.submit();

    let record = collector.submitted_record().unwrap();
    assert_eq!(record.get(FeatureKey::Sex), FeatureValue::Int(1));
    assert_eq!(record.get(FeatureKey::Fbs), FeatureValue::Int(0));
    assert_eq!(record.get(FeatureKey::Exang), FeatureValue::Int(0));
    assert_eq!(record.get(FeatureKey::Oldpeak), FeatureValue::Float(1.0));
    assert_eq!(record, &FeatureRecord::defaults());

    let screen = PredictionRenderer::new(&model, Locale::En)
        .render(&collector)
        .unwrap();
    let ResultsSection::Panel(panel) = &screen.results else {
        panic!("expected a result panel, got {:?}", screen.results);
    };
    assert_eq!(panel.status, "Safe");
    assert_eq!(panel.confidence, "82.00%");
    assert_eq!(panel.tone, Tone::Safe);
    assert!(panel.advisory.starts_with("Information:"));
}

#[test]
fn test_female_differs_from_male_only_in_sex() {
    let male = collector_with(&SCENARIO);
    let mut female_input = SCENARIO;
    female_input[1] = ("sex", "female");
    let female = collector_with(&female_input);

    let differing: Vec<FeatureKey> = male
        .current_record()
        .iter()
        .zip(female.current_record().iter())
        .filter(|((_, a), (_, b))| a != b)
        .map(|((key, _), _)| key)
        .collect();
    assert_eq!(differing, vec![FeatureKey::Sex]);
    assert_eq!(male.get(FeatureKey::Sex), FeatureValue::Int(1));
    assert_eq!(female.get(FeatureKey::Sex), FeatureValue::Int(0));
}

#[test]
fn test_repeated_submissions_are_identical() {
    let mut collector = collector_with(&SCENARIO);
    let first = collector.submit().clone();
    let second = collector.submit().clone();
    assert_eq!(first, second);
    assert_eq!(collector.submission_count(), 2);
}

#[test]
fn test_age_boundaries() {
    let mut collector = InputCollector::new();
    assert!(collector.set_by_name("age", "1").is_ok());
    assert!(collector.set_by_name("age", "120").is_ok());
    assert!(matches!(
        collector.set_by_name("age", "0"),
        Err(ValidationRejection::OutOfRange { .. })
    ));
    assert!(matches!(
        collector.set_by_name("age", "121"),
        Err(ValidationRejection::OutOfRange { .. })
    ));
    assert_eq!(collector.get(FeatureKey::Age), FeatureValue::Int(120));
}

#[test]
fn test_label_one_is_always_at_risk() {
    for (p0, p1) in [(0.49, 0.51), (0.0, 1.0), (0.7, 0.3)] {
        let model = fixed(RiskLabel::High, p0, p1);
        let mut collector = InputCollector::new();
        collector.submit();
        let screen = PredictionRenderer::new(&model, Locale::En)
            .render(&collector)
            .unwrap();
        let ResultsSection::Panel(panel) = screen.results else {
            panic!("expected a result panel");
        };
        assert_eq!(panel.status, "At Risk");
        assert!(panel.advisory.starts_with("Warning:"));
        assert_eq!(panel.confidence, format!("{:.2}%", p1 * 100.0));
    }
}

#[test]
fn test_missing_model_never_shows_a_panel() {
    let dir = tempfile::tempdir().unwrap();
    let model = ModelProvider::from_path(dir.path().join("heart_disease_model.json"));
    let renderer = PredictionRenderer::new(&model, Locale::En);
    let mut collector = collector_with(&SCENARIO);

    let before = renderer.render(&collector).unwrap();
    assert!(!before.has_prediction());

    for _ in 0..3 {
        collector.submit();
        let screen = renderer.render(&collector).unwrap();
        match &screen.results {
            ResultsSection::ModelUnavailable { notice } => {
                assert!(notice.contains("was not found"));
            }
            other => panic!("expected the load-failure notice, got {other:?}"),
        }
        assert_eq!(screen.echo.len(), 13);
    }
    assert!(matches!(model.load_error(), Some(LoadError::NotFound { .. })));
}

#[derive(Debug)]
struct Exploding;

impl Classifier for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn predict(&self, _record: &FeatureRecord) -> Result<RiskLabel, PredictionError> {
        Err(PredictionError::FeatureIndex { index: 13, len: 13 })
    }

    fn predict_probability(
        &self,
        _record: &FeatureRecord,
    ) -> Result<ClassDistribution, PredictionError> {
        Err(PredictionError::FeatureIndex { index: 13, len: 13 })
    }
}

#[test]
fn test_prediction_failure_propagates() {
    let model = ModelProvider::preloaded(Arc::new(Exploding));
    let mut collector = InputCollector::new();
    collector.submit();
    let err = PredictionRenderer::new(&model, Locale::En)
        .render(&collector)
        .unwrap_err();
    assert_eq!(err, PredictionError::FeatureIndex { index: 13, len: 13 });
}

fn demo_artifact() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("models")
        .join("heart_disease_model.json")
}

#[test]
fn test_bundled_demo_artifact_loads_and_scores() {
    let text = std::fs::read_to_string(demo_artifact()).unwrap();
    let model: LoadedModel = ModelArtifact::from_json(&demo_artifact(), &text)
        .unwrap()
        .into_model();
    let record = FeatureRecord::defaults();
    let distribution = model.predict_probability(&record).unwrap();
    assert_eq!(model.predict(&record).unwrap(), distribution.argmax());
    let [p0, p1] = distribution.as_array();
    assert!((p0 + p1 - 1.0).abs() < 1e-9);
}

#[test]
fn test_repository_workspace_config_finds_bundled_artifact() {
    use cardiorisk_core::config::{ConfigOverrides, load_config};
    use cardiorisk_core::model::resolve_model_path;

    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let config = load_config(Some(&root), None, &ConfigOverrides::default()).unwrap();
    assert_eq!(
        config.model.path,
        PathBuf::from("models/heart_disease_model.json")
    );
    let provider = ModelProvider::from_path(resolve_model_path(&root, &config.model.path));
    assert!(provider.is_ready());
}
