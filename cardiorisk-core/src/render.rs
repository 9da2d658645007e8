//! Prediction renderer: turns a submitted record and a model into a screen.
//!
//! The screen always carries the echo of the live record. The results
//! section is one of three things: nothing yet, the load-failure notice, or
//! exactly one of the two outcome panels. Classifier failures are returned as
//! `Err` and never folded into the screen.

use crate::collector::InputCollector;
use crate::error::PredictionError;
use crate::i18n::Locale;
use crate::model::{ClassDistribution, Classifier, ModelProvider, ModelState, RiskLabel};
use crate::record::FeatureRecord;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// The two mutually exclusive outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AtRisk,
    Safe,
}

impl Outcome {
    pub fn from_label(label: RiskLabel) -> Self {
        match label {
            RiskLabel::High => Self::AtRisk,
            RiskLabel::Low => Self::Safe,
        }
    }

    pub fn status(&self, locale: Locale) -> &'static str {
        let m = locale.messages();
        match self {
            Self::AtRisk => m.at_risk_status,
            Self::Safe => m.safe_status,
        }
    }

    pub fn delta(&self, locale: Locale) -> &'static str {
        let m = locale.messages();
        match self {
            Self::AtRisk => m.at_risk_delta,
            Self::Safe => m.safe_delta,
        }
    }

    pub fn advisory(&self, locale: Locale) -> &'static str {
        let m = locale.messages();
        match self {
            Self::AtRisk => m.at_risk_advisory,
            Self::Safe => m.safe_advisory,
        }
    }
}

/// Probability mass on the predicted label, as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence(f64);

impl Confidence {
    pub fn of(distribution: &ClassDistribution, label: RiskLabel) -> Self {
        Self((distribution.get(label) * 100.0).clamp(0.0, 100.0))
    }

    pub fn percent(&self) -> f64 {
        self.0
    }

    /// Percentage rounded to two decimals.
    pub fn rounded(&self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.rounded())
    }
}

impl Serialize for Confidence {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.rounded())
    }
}

/// Raw classifier answer for one submitted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub label: RiskLabel,
    pub probabilities: ClassDistribution,
    pub confidence: Confidence,
    pub outcome: Outcome,
}

/// Ask the classifier for a label and a distribution.
pub fn predict_record(
    model: &dyn Classifier,
    record: &FeatureRecord,
) -> Result<PredictionReport, PredictionError> {
    let label = model.predict(record)?;
    let probabilities = model.predict_probability(record)?;
    let confidence = Confidence::of(&probabilities, label);
    info!(
        model = model.name(),
        label = label.index(),
        confidence = %confidence,
        "Prediction complete"
    );
    Ok(PredictionReport {
        label,
        probabilities,
        confidence,
        outcome: Outcome::from_label(label),
    })
}

/// Machine-readable answer for one submission: the record that was scored
/// plus the classifier's report and the localised status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub record: FeatureRecord,
    #[serde(flatten)]
    pub report: PredictionReport,
    pub status: &'static str,
}

impl PredictionOutcome {
    pub fn new(record: FeatureRecord, report: PredictionReport, locale: Locale) -> Self {
        let status = report.outcome.status(locale);
        Self {
            record,
            report,
            status,
        }
    }
}

/// Color coding of the advisory message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Risk,
    Safe,
}

/// Everything shown in the results panel, already localised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPanel {
    pub header: &'static str,
    pub outcome: Outcome,
    pub status_label: &'static str,
    pub status: &'static str,
    pub delta: &'static str,
    pub confidence_label: &'static str,
    pub confidence: String,
    pub advisory: &'static str,
    pub tone: Tone,
}

impl ResultPanel {
    pub fn new(report: &PredictionReport, locale: Locale) -> Self {
        let m = locale.messages();
        let outcome = report.outcome;
        Self {
            header: m.results_header,
            outcome,
            status_label: m.status_label,
            status: outcome.status(locale),
            delta: outcome.delta(locale),
            confidence_label: m.confidence_label,
            confidence: report.confidence.to_string(),
            advisory: outcome.advisory(locale),
            tone: match outcome {
                Outcome::AtRisk => Tone::Risk,
                Outcome::Safe => Tone::Safe,
            },
        }
    }
}

/// One line of the record echo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoRow {
    pub key: &'static str,
    pub value: String,
}

pub fn echo_rows(record: &FeatureRecord) -> Vec<EchoRow> {
    record
        .iter()
        .map(|(key, value)| EchoRow {
            key: key.as_str(),
            value: value.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultsSection {
    /// No submission yet.
    Pending,
    Panel(ResultPanel),
    /// The model failed to load; replaces the panel for the whole process.
    ModelUnavailable { notice: String },
}

/// Rendering-agnostic view of the whole page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub locale: Locale,
    pub title: &'static str,
    pub disclaimer: &'static str,
    pub echo_header: &'static str,
    pub echo: Vec<EchoRow>,
    pub results: ResultsSection,
}

const RULE: &str = "--------------------------------------------------";

impl Screen {
    pub fn has_prediction(&self) -> bool {
        matches!(self.results, ResultsSection::Panel(_))
    }

    /// Plain-text rendering for terminals. Deterministic for equal screens.
    pub fn to_text(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text.to_string()
            }
        };

        let mut out = String::new();
        out.push_str(&paint("1", self.title));
        out.push('\n');
        out.push_str(&paint("90", self.disclaimer));
        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        out.push_str(self.echo_header);
        out.push('\n');
        for row in &self.echo {
            out.push_str(&format!("  {:<10}{}\n", row.key, row.value));
        }

        match &self.results {
            ResultsSection::Pending => {}
            ResultsSection::ModelUnavailable { notice } => {
                out.push_str(RULE);
                out.push('\n');
                out.push_str(&paint("31", &format!("! {notice}")));
                out.push('\n');
            }
            ResultsSection::Panel(panel) => {
                let tone = match panel.tone {
                    Tone::Risk => "31",
                    Tone::Safe => "32",
                };
                out.push_str(RULE);
                out.push('\n');
                out.push_str(&paint("1", panel.header));
                out.push('\n');
                out.push_str(&format!(
                    "  {}: {} ({})\n",
                    panel.status_label,
                    paint(tone, panel.status),
                    panel.delta
                ));
                out.push_str(&format!(
                    "  {}: {}\n",
                    panel.confidence_label, panel.confidence
                ));
                out.push_str("  ");
                out.push_str(&paint(tone, panel.advisory));
                out.push('\n');
            }
        }
        out
    }
}

/// Renders collector state against a model provider.
#[derive(Debug, Clone, Copy)]
pub struct PredictionRenderer<'a> {
    model: &'a ModelProvider,
    locale: Locale,
}

impl<'a> PredictionRenderer<'a> {
    pub fn new(model: &'a ModelProvider, locale: Locale) -> Self {
        Self { model, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Score a record if the model is loaded. `Ok(None)` when it is not.
    pub fn predict(&self, record: &FeatureRecord) -> Result<Option<PredictionReport>, PredictionError> {
        match self.model.state() {
            ModelState::Ready(model) => predict_record(model.as_ref(), record).map(Some),
            ModelState::Unavailable(_) => Ok(None),
        }
    }

    /// Build the screen for the collector's current state.
    ///
    /// Prediction runs only for a submitted record with a loaded model.
    pub fn render(&self, collector: &InputCollector) -> Result<Screen, PredictionError> {
        let results = match (self.model.state(), collector.submitted_record()) {
            (ModelState::Unavailable(err), _) => ResultsSection::ModelUnavailable {
                notice: self.locale.messages().load_failure_notice(err),
            },
            (ModelState::Ready(_), None) => ResultsSection::Pending,
            (ModelState::Ready(model), Some(record)) => {
                let report = predict_record(model.as_ref(), record)?;
                ResultsSection::Panel(ResultPanel::new(&report, self.locale))
            }
        };
        Ok(self.screen(collector.current_record(), results))
    }

    /// Assemble a screen around an already computed results section.
    pub fn screen(&self, record: &FeatureRecord, results: ResultsSection) -> Screen {
        let m = self.locale.messages();
        Screen {
            locale: self.locale,
            title: m.title,
            disclaimer: m.disclaimer,
            echo_header: m.echo_header,
            echo: echo_rows(record),
            results,
        }
    }
}
