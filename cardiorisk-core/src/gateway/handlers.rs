use super::SharedState;
use super::page::FormFeedback;
use crate::collector::InputCollector;
use crate::error::ValidationRejection;
use crate::model::ModelState;
use crate::render::{PredictionOutcome, PredictionRenderer, Screen, predict_record};
use crate::schema::{FeatureKey, SCHEMA_VERSION};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde_json::{Map, Value, json};
use tracing::{debug, error};

pub(super) async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_loaded": state.provider.is_ready(),
        "schema_version": SCHEMA_VERSION,
    }))
}

pub(super) async fn form_page(State(state): State<SharedState>) -> Response {
    let collector = InputCollector::new();
    page_response(&state, StatusCode::OK, &collector, &FormFeedback::default())
}

pub(super) async fn submit_form(
    State(state): State<SharedState>,
    Form(entries): Form<Vec<(String, String)>>,
) -> Response {
    let mut collector = InputCollector::new();
    let rejections =
        collector.apply_complete(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if !rejections.is_empty() {
        debug!(rejected = rejections.len(), "Form submission rejected");
        let feedback = FormFeedback::new(&entries, &rejections);
        return page_response(&state, StatusCode::UNPROCESSABLE_ENTITY, &collector, &feedback);
    }
    collector.submit();
    page_response(&state, StatusCode::OK, &collector, &FormFeedback::default())
}

pub(super) async fn predict_api(
    State(state): State<SharedState>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut collector = InputCollector::new();
    let mut rejections: Vec<ValidationRejection> = body
        .iter()
        .filter_map(|(name, value)| {
            json_raw(name, value)
                .and_then(|raw| collector.set_by_name(name, &raw))
                .err()
        })
        .collect();
    rejections.extend(missing_fields(&body));
    if !rejections.is_empty() {
        let errors: Vec<Value> = rejections
            .iter()
            .map(|r| json!({"field": r.field(), "message": r.to_string()}))
            .collect();
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response();
    }

    let model = match state.provider.state() {
        ModelState::Ready(model) => model,
        ModelState::Unavailable(err) => {
            let notice = state.locale.messages().load_failure_notice(err);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": notice })),
            )
                .into_response();
        }
    };

    let record = collector.submit().clone();
    match predict_record(model.as_ref(), &record) {
        Ok(report) => Json(PredictionOutcome::new(record, report, state.locale)).into_response(),
        Err(e) => {
            error!(error = %e, "Prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn missing_fields(body: &Map<String, Value>) -> impl Iterator<Item = ValidationRejection> + '_ {
    FeatureKey::ALL
        .into_iter()
        .filter(|key| !body.contains_key(key.as_str()))
        .map(|key| ValidationRejection::MissingField {
            field: key.as_str(),
        })
}

/// JSON scalar to the raw text the schema parser expects.
fn json_raw(name: &str, value: &Value) -> Result<String, ValidationRejection> {
    let key = FeatureKey::from_name(name).ok_or_else(|| ValidationRejection::UnknownField {
        name: name.to_string(),
    })?;
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        _ => Err(ValidationRejection::WrongType {
            field: key.as_str(),
            expected: if key.spec().choice_table().is_some() {
                "a choice label"
            } else {
                "a number"
            },
        }),
    }
}

fn page_response(
    state: &SharedState,
    status: StatusCode,
    collector: &InputCollector,
    feedback: &FormFeedback,
) -> Response {
    let renderer = PredictionRenderer::new(&state.provider, state.locale);
    let screen: Screen = match renderer.render(collector) {
        Ok(screen) => screen,
        Err(e) => {
            error!(error = %e, "Prediction failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };
    match state.pages.render(&screen, collector, feedback) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Page rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_raw_accepts_numbers_and_labels() {
        assert_eq!(json_raw("age", &json!(63)).unwrap(), "63");
        assert_eq!(json_raw("oldpeak", &json!(2.3)).unwrap(), "2.3");
        assert_eq!(json_raw("sex", &json!("Female")).unwrap(), "Female");
    }

    #[test]
    fn test_json_raw_rejects_other_shapes() {
        assert_eq!(
            json_raw("fbs", &json!(true)),
            Err(ValidationRejection::WrongType {
                field: "fbs",
                expected: "a choice label"
            })
        );
        assert_eq!(
            json_raw("chol", &json!(null)),
            Err(ValidationRejection::WrongType {
                field: "chol",
                expected: "a number"
            })
        );
        assert!(matches!(
            json_raw("weight", &json!(70)),
            Err(ValidationRejection::UnknownField { .. })
        ));
    }

    #[test]
    fn test_missing_fields_lists_absent_keys_in_order() {
        let body = json!({"age": 63, "thal": 1, "weight": 70});
        let body = body.as_object().unwrap();
        let fields: Vec<String> = missing_fields(body).map(|r| r.field().to_string()).collect();
        assert_eq!(fields.len(), 11);
        assert_eq!(fields.first().map(String::as_str), Some("sex"));
        assert_eq!(fields.last().map(String::as_str), Some("ca"));
        assert_eq!(missing_fields(&Map::new()).count(), FeatureKey::COUNT);
    }
}
