//! Interactive terminal form.
//!
//! Fields are asked group by group, then a menu loops between submitting,
//! editing a single field and quitting. Input is validated while typing, so
//! the collector only ever sees in-domain values.

use crate::Context;
use cardiorisk_core::i18n::Locale;
use cardiorisk_core::record::FeatureValue;
use cardiorisk_core::schema::{Domain, FeatureSpec, FieldGroup};
use cardiorisk_core::{InputCollector, PredictionRenderer};
use dialoguer::{Input, Select};

pub fn run(ctx: &Context) -> anyhow::Result<()> {
    let locale = ctx.locale();
    let m = locale.messages();
    let mut collector = InputCollector::new();

    if ctx.color {
        println!("\x1b[1m{}\x1b[0m", m.title);
    } else {
        println!("{}", m.title);
    }
    println!("{}\n", m.disclaimer);
    println!("{}", m.form_header);
    println!("{}\n", m.form_instructions);

    for group in [FieldGroup::Primary, FieldGroup::Secondary] {
        for spec in FeatureSpec::in_group(group) {
            prompt_field(&mut collector, spec, locale)?;
        }
    }

    let renderer = PredictionRenderer::new(&ctx.provider, locale);
    let menu = [m.menu_predict, m.menu_edit, m.menu_quit];
    loop {
        let screen = renderer.render(&collector)?;
        println!("\n{}", screen.to_text(ctx.color));

        let choice = Select::new().items(&menu).default(0).interact()?;
        match choice {
            0 => {
                collector.submit();
            }
            1 => {
                let labels: Vec<String> = FeatureSpec::in_group(FieldGroup::Primary)
                    .chain(FeatureSpec::in_group(FieldGroup::Secondary))
                    .map(|spec| format!("{} ({})", m.field(spec.key).label, collector.get(spec.key)))
                    .collect();
                let picked = Select::new()
                    .with_prompt(m.menu_edit)
                    .items(&labels)
                    .default(0)
                    .interact()?;
                if let Some(spec) = FeatureSpec::in_group(FieldGroup::Primary)
                    .chain(FeatureSpec::in_group(FieldGroup::Secondary))
                    .nth(picked)
                {
                    prompt_field(&mut collector, spec, locale)?;
                }
            }
            _ => return Ok(()),
        }
    }
}

/// Ask for one field and store the answer.
fn prompt_field(
    collector: &mut InputCollector,
    spec: &'static FeatureSpec,
    locale: Locale,
) -> anyhow::Result<()> {
    let text = locale.messages().field(spec.key);
    let current = collector.get(spec.key);
    let prompt = match text.help {
        Some(help) => format!("{} [{}]", text.label, help),
        None => text.label.to_string(),
    };

    match spec.domain {
        Domain::Choice(table) => {
            let labels: Vec<&str> = table.options.iter().map(|o| o.label(locale)).collect();
            let default = current
                .as_i64()
                .and_then(|code| table.position(code))
                .unwrap_or(0);
            let picked = Select::new()
                .with_prompt(prompt)
                .items(&labels)
                .default(default)
                .interact()?;
            collector.select(spec.key, labels[picked])?;
        }
        Domain::Enumerated(codes) => {
            let labels: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
            let default = current
                .as_i64()
                .and_then(|v| codes.iter().position(|c| *c == v))
                .unwrap_or(0);
            let picked = Select::new()
                .with_prompt(prompt)
                .items(&labels)
                .default(default)
                .interact()?;
            collector.set(spec.key, FeatureValue::Int(codes[picked]))?;
        }
        Domain::IntRange { .. } | Domain::DecimalRange { .. } => {
            let raw: String = Input::new()
                .with_prompt(format!("{prompt} {}", spec.describe_domain()))
                .default(current.to_string())
                .validate_with(|input: &String| spec.parse(input).map(|_| ()).map_err(|e| e.to_string()))
                .interact_text()?;
            collector.set_from_str(spec.key, &raw)?;
        }
    }
    Ok(())
}
