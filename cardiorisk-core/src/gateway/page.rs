//! HTML view of a [`Screen`] plus the form that feeds it.

use super::GatewayError;
use crate::collector::InputCollector;
use crate::error::ValidationRejection;
use crate::i18n::Locale;
use crate::render::Screen;
use crate::schema::{Domain, FeatureSpec, FieldGroup};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

const PAGE_TEMPLATE: &str = include_str!("templates/page.hbs");

#[derive(Debug, Serialize)]
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FormField {
    name: &'static str,
    label: &'static str,
    help: Option<&'static str>,
    select: bool,
    value: String,
    min: Option<String>,
    max: Option<String>,
    step: Option<String>,
    options: Vec<SelectOption>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct FormGroup {
    fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    lang: &'static str,
    screen: &'a Screen,
    form_header: &'static str,
    form_instructions: &'static str,
    submit: &'static str,
    groups: Vec<FormGroup>,
    has_errors: bool,
}

/// What the user typed and what was rejected, keyed by field name.
#[derive(Debug, Default)]
pub struct FormFeedback {
    raw: HashMap<String, String>,
    errors: HashMap<String, String>,
}

impl FormFeedback {
    pub fn new(entries: &[(String, String)], rejections: &[ValidationRejection]) -> Self {
        Self {
            raw: entries.iter().cloned().collect(),
            errors: rejections
                .iter()
                .map(|r| (r.field().to_string(), r.to_string()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compiled page templates.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRenderer").finish_non_exhaustive()
    }
}

impl PageRenderer {
    pub fn new() -> Result<Self, GatewayError> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("page", PAGE_TEMPLATE)
            .map_err(Box::new)?;
        Ok(Self { registry })
    }

    /// Render the full page: form, record echo and results section.
    pub fn render(
        &self,
        screen: &Screen,
        collector: &InputCollector,
        feedback: &FormFeedback,
    ) -> Result<String, GatewayError> {
        let m = screen.locale.messages();
        let groups = [FieldGroup::Primary, FieldGroup::Secondary]
            .into_iter()
            .map(|group| FormGroup {
                fields: FeatureSpec::in_group(group)
                    .map(|spec| form_field(spec, screen.locale, collector, feedback))
                    .collect(),
            })
            .collect();
        let view = PageView {
            lang: screen.locale.code(),
            screen,
            form_header: m.form_header,
            form_instructions: m.form_instructions,
            submit: m.submit,
            groups,
            has_errors: !feedback.is_empty(),
        };
        Ok(self.registry.render("page", &view)?)
    }
}

fn form_field(
    spec: &'static FeatureSpec,
    locale: Locale,
    collector: &InputCollector,
    feedback: &FormFeedback,
) -> FormField {
    let text = locale.messages().field(spec.key);
    let current = collector.get(spec.key);
    let error = feedback.errors.get(spec.name()).cloned();
    let value = match (&error, feedback.raw.get(spec.name())) {
        (Some(_), Some(raw)) => raw.clone(),
        _ => current.to_string(),
    };

    let mut field = FormField {
        name: spec.name(),
        label: text.label,
        help: text.help,
        select: false,
        value,
        min: None,
        max: None,
        step: None,
        options: Vec::new(),
        error,
    };

    match spec.domain {
        Domain::IntRange { min, max } => {
            field.min = Some(min.to_string());
            field.max = Some(max.to_string());
            field.step = Some("1".into());
        }
        Domain::DecimalRange { min, max, decimals } => {
            let d = decimals as usize;
            field.min = Some(format!("{min:.d$}"));
            field.max = Some(format!("{max:.d$}"));
            field.step = Some(format!("{:.d$}", 10f64.powi(-(decimals as i32))));
        }
        Domain::Enumerated(codes) => {
            field.select = true;
            field.options = codes
                .iter()
                .map(|code| SelectOption {
                    value: code.to_string(),
                    label: code.to_string(),
                    selected: current.as_i64() == Some(*code),
                })
                .collect();
        }
        Domain::Choice(table) => {
            field.select = true;
            field.options = table
                .options
                .iter()
                .map(|option| SelectOption {
                    value: option.label(locale).to_string(),
                    label: option.label(locale).to_string(),
                    selected: current.as_i64() == Some(option.code),
                })
                .collect();
        }
    }
    field
}
