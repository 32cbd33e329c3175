use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    audit::{AuditLogger, LogRecord},
    config::AppConfig,
    engine::GeneratorHandle,
    error::ServiceError,
    params::normalize,
    sanitize::sanitize,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub generator: Arc<GeneratorHandle>,
    pub audit: Arc<AuditLogger>,
}

/// Raw query fields, stringly typed on purpose: the normalizer owns all
/// parsing and defaulting.
#[derive(Debug, Default, Deserialize)]
pub struct StoryQuery {
    pub topic: Option<String>,
    pub story_temp: Option<String>,
    pub max_len: Option<String>,
}

pub fn build_router(
    config: Arc<AppConfig>,
    generator: Arc<GeneratorHandle>,
    audit: Arc<AuditLogger>,
) -> Router {
    let state = AppState {
        config,
        generator,
        audit,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/story", get(generate_story))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_story(
    State(state): State<AppState>,
    Query(query): Query<StoryQuery>,
) -> Result<String, ServiceError> {
    run_pipeline(&state, &query).await
}

/// Normalize, invoke the engine once, sanitize, record. A parameter or
/// engine failure terminates the request before anything is logged; both log
/// artifacts are written before the response is returned.
async fn run_pipeline(state: &AppState, query: &StoryQuery) -> Result<String, ServiceError> {
    let config = normalize(
        query.topic.as_deref(),
        query.story_temp.as_deref(),
        query.max_len.as_deref(),
        &state.config.defaults(),
    )?;
    info!(
        topic = %config.topic,
        story_temp = ?config.story_temperature,
        max_len = config.max_length,
        "generating story"
    );

    let raw = state.generator.invoke(&config).await?;
    let story = sanitize(&raw);

    // Best-effort auditing: a failed write is operator-visible but never
    // fails a request that already produced a story.
    let record = LogRecord::new(&config, &story);
    if let Err(err) = state.audit.record(&record) {
        error!(error = %err, "failed to write audit record");
    }

    Ok(story)
}
