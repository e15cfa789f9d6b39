use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::signal;

use crate::{
    app::{AppError, AppService, KeywordReport, SemanticReport},
    semantic::IndexStats,
};

const PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
struct SharedState {
    app: Arc<AppService>,
}

pub fn router(app: Arc<AppService>) -> Router {
    Router::new()
        .route("/api/sentiment/scrape", post(scrape))
        .route("/api/semantic/search", post(search))
        .route("/api/semantic/stats", get(stats))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(SharedState { app })
}

async fn start_app(app: Arc<AppService>, bind: &str) -> anyhow::Result<()> {
    tokio::spawn(purge_caches(app.clone()));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("listening on {bind}");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Periodically drops stale cache entries.
async fn purge_caches(app: Arc<AppService>) {
    let mut interval = tokio::time::interval(PURGE_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let purged = app.purge_expired();
        if purged > 0 {
            log::debug!("purged {purged} expired cache entries");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::warn!("shutting down");
}

pub fn start_daemon(app: AppService, bind: &str) -> anyhow::Result<()> {
    let app = Arc::new(app);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(start_app(app.clone(), bind));

    // blocking http clients must be dropped outside the runtime
    drop(runtime);
    drop(app);
    result
}

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::SemanticDisabled => StatusCode::SERVICE_UNAVAILABLE,
            _ => {
                log::error!("{:?}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Pipelines block on network and model calls.
async fn run_blocking<T, F>(f: F) -> Result<T, HttpError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f)
        .await
        .map_err(anyhow::Error::from)??)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    pub keyword: String,

    /// Leave the neutral bucket out of `buckets`
    #[serde(default)]
    pub exclude_neutral: bool,

    /// Store scored posts in the vector index
    #[serde(default)]
    pub index: bool,
}

async fn scrape(
    State(state): State<SharedState>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<Json<KeywordReport>, HttpError> {
    log::debug!("payload: {payload:?}");

    let app = state.app.clone();
    let report = run_blocking(move || {
        app.keyword_report(&payload.keyword, payload.exclude_neutral, payload.index)
    })
    .await?;

    Ok(Json(report))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    /// 1-500, defaults to `semantic.default_top_k`
    pub top_k: Option<usize>,
}

async fn search(
    State(state): State<SharedState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SemanticReport>, HttpError> {
    log::debug!("payload: {payload:?}");

    let app = state.app.clone();
    let report = run_blocking(move || app.semantic_report(&payload.query, payload.top_k)).await?;

    Ok(Json(report))
}

/// `null` when statistics are unavailable.
async fn stats(State(state): State<SharedState>) -> Result<Json<Option<IndexStats>>, HttpError> {
    let app = state.app.clone();
    let stats = run_blocking(move || Ok(app.index_stats())).await?;

    Ok(Json(stats))
}
