//! CLI subcommand handlers.

use crate::Context;
use anyhow::{Context as _, bail};
use cardiorisk_core::gateway::{self, AppState};
use cardiorisk_core::model::ModelState;
use cardiorisk_core::render::{PredictionOutcome, predict_record};
use cardiorisk_core::schema::{self, FEATURES};
use cardiorisk_core::{InputCollector, ValidationRejection};
use tracing::info;

/// One patient, given as flags. Unset fields take their schema default.
#[derive(clap::Args, Debug, Default)]
pub struct PredictArgs {
    /// Age in years (1-120)
    #[arg(long)]
    pub age: Option<String>,
    /// Sex: male or female
    #[arg(long)]
    pub sex: Option<String>,
    /// Chest pain type (0-3)
    #[arg(long)]
    pub cp: Option<String>,
    /// Resting blood pressure, mm Hg (50-250)
    #[arg(long)]
    pub trestbps: Option<String>,
    /// Serum cholesterol, mg/dl (100-600)
    #[arg(long)]
    pub chol: Option<String>,
    /// Fasting blood sugar > 120 mg/dl: yes or no
    #[arg(long)]
    pub fbs: Option<String>,
    /// Resting ECG result (0-2)
    #[arg(long)]
    pub restecg: Option<String>,
    /// Maximum heart rate achieved (60-220)
    #[arg(long)]
    pub thalach: Option<String>,
    /// Exercise-induced angina: yes or no
    #[arg(long)]
    pub exang: Option<String>,
    /// ST depression induced by exercise (0.0-10.0, step 0.1)
    #[arg(long)]
    pub oldpeak: Option<String>,
    /// Slope of the peak exercise ST segment (0-2)
    #[arg(long)]
    pub slope: Option<String>,
    /// Number of major vessels colored by fluoroscopy (0-4)
    #[arg(long)]
    pub ca: Option<String>,
    /// Thalassemia (0-3)
    #[arg(long)]
    pub thal: Option<String>,
    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    /// Flags that were given, as `(field, raw)` pairs in contract order.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        [
            ("age", &self.age),
            ("sex", &self.sex),
            ("cp", &self.cp),
            ("trestbps", &self.trestbps),
            ("chol", &self.chol),
            ("fbs", &self.fbs),
            ("restecg", &self.restecg),
            ("thalach", &self.thalach),
            ("exang", &self.exang),
            ("oldpeak", &self.oldpeak),
            ("slope", &self.slope),
            ("ca", &self.ca),
            ("thal", &self.thal),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// Fill a fresh collector from the flags.
    pub fn collect(&self) -> Result<InputCollector, Vec<ValidationRejection>> {
        let mut collector = InputCollector::new();
        let rejections = collector.apply(self.entries());
        if rejections.is_empty() {
            Ok(collector)
        } else {
            Err(rejections)
        }
    }
}

pub fn predict(ctx: &Context, args: &PredictArgs) -> anyhow::Result<()> {
    let mut collector = match args.collect() {
        Ok(collector) => collector,
        Err(rejections) => {
            for rejection in &rejections {
                eprintln!("error: {rejection}");
            }
            bail!("{} field(s) rejected", rejections.len());
        }
    };
    let record = collector.submit().clone();
    let locale = ctx.locale();

    if args.json {
        let model = match ctx.provider.state() {
            ModelState::Ready(model) => model,
            ModelState::Unavailable(err) => {
                bail!("{}", locale.messages().load_failure_notice(err));
            }
        };
        let report = predict_record(model.as_ref(), &record)?;
        let outcome = PredictionOutcome::new(record, report, locale);
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let screen = cardiorisk_core::PredictionRenderer::new(&ctx.provider, locale).render(&collector)?;
    print!("{}", screen.to_text(ctx.color));
    Ok(())
}

pub fn schema(ctx: &Context, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&schema::describe())?);
        return Ok(());
    }
    let messages = ctx.locale().messages();
    println!("Feature contract v{}", schema::SCHEMA_VERSION);
    for spec in FEATURES.iter() {
        println!(
            "  {:<10}{:<9}{:<28}default {:<6}{}",
            spec.name(),
            format!("{:?}", spec.kind).to_lowercase(),
            spec.describe_domain(),
            spec.default.to_string(),
            messages.field(spec.key).label,
        );
    }
    Ok(())
}

pub fn model_check(ctx: &Context) -> anyhow::Result<()> {
    match ctx.provider.warm_up() {
        Ok(()) => {
            let name = ctx
                .provider
                .classifier()
                .map(|m| m.name().to_string())
                .unwrap_or_default();
            println!("Model OK: {} ({})", ctx.provider.source(), name);
            Ok(())
        }
        Err(err) => bail!("{}", ctx.locale().messages().load_failure_notice(err)),
    }
}

pub fn config_show(ctx: &Context) -> anyhow::Result<()> {
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

pub async fn serve(ctx: &Context) -> anyhow::Result<()> {
    let gateway = &ctx.config.gateway;
    if let Err(err) = ctx.provider.warm_up() {
        tracing::warn!(error = %err, "Serving without a model; results are disabled");
    }
    let state = AppState::new(ctx.provider.clone(), ctx.locale())
        .context("Failed to build the web form")?
        .shared();
    info!(host = %gateway.host, port = gateway.port, "Starting web form");
    println!("Serving on http://{}", gateway.bind_address());
    gateway::run(state, &gateway.host, gateway.port).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardiorisk_core::{FeatureKey, FeatureValue};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entries_keep_contract_order_and_skip_unset() {
        let args = PredictArgs {
            oldpeak: Some("2.3".into()),
            age: Some("63".into()),
            sex: Some("female".into()),
            ..Default::default()
        };
        assert_eq!(
            args.entries(),
            vec![("age", "63"), ("sex", "female"), ("oldpeak", "2.3")]
        );
    }

    #[test]
    fn test_collect_applies_flags_over_defaults() {
        let args = PredictArgs {
            sex: Some("Female".into()),
            exang: Some("yes".into()),
            ..Default::default()
        };
        let collector = args.collect().unwrap();
        assert_eq!(collector.get(FeatureKey::Sex), FeatureValue::Int(0));
        assert_eq!(collector.get(FeatureKey::Exang), FeatureValue::Int(1));
        assert_eq!(collector.get(FeatureKey::Age), FeatureValue::Int(50));
    }

    #[test]
    fn test_collect_reports_every_rejection() {
        let args = PredictArgs {
            age: Some("0".into()),
            ca: Some("9".into()),
            sex: Some("1".into()),
            ..Default::default()
        };
        let rejections = args.collect().unwrap_err();
        let fields: Vec<&str> = rejections.iter().map(|r| r.field()).collect();
        assert_eq!(fields, vec!["age", "sex", "ca"]);
    }
}
