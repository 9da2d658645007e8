//! HTTP surface for the prediction form.
//!
//! Every request builds its own [`InputCollector`](crate::collector::InputCollector);
//! the only state shared across requests is the immutable model provider and
//! the compiled templates.

mod handlers;
pub mod page;

pub use page::PageRenderer;

use crate::i18n::Locale;
use crate::model::ModelProvider;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Errors raised while assembling the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// State shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    pub provider: Arc<ModelProvider>,
    pub locale: Locale,
    pages: PageRenderer,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(provider: Arc<ModelProvider>, locale: Locale) -> Result<Self, GatewayError> {
        Ok(Self {
            provider,
            locale,
            pages: PageRenderer::new()?,
        })
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

/// Build the axum router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::form_page).post(handlers::submit_form))
        .route("/api/predict", post(handlers::predict_api))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn run(state: SharedState, host: &str, port: u16) -> Result<(), GatewayError> {
    let addr = format!("{host}:{port}");
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
