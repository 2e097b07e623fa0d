//! HTTP API: calculator, interest and history endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use calc_core::calculator;
use calc_core::history::{
    CompoundInputs, HistoryEntry, HistoryError, HistoryRecord, HistoryStore, SimpleInputs, Snapshot,
};
use calc_core::interest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const DEFAULT_HISTORY_LIMIT: usize = 20;

// Application State
pub struct AppState {
    history: Mutex<HistoryStore>,
}

impl AppState {
    pub fn new(store: HistoryStore) -> Self {
        Self {
            history: Mutex::new(store),
        }
    }

    async fn record(&self, record: HistoryRecord) {
        let mut store = self.history.lock().await;
        if let Err(e) = store.push(record) {
            warn!("Not recording history entry: {}", e);
            return;
        }
        persist(store.snapshot()).await;
    }

    async fn clear(&self) {
        let mut store = self.history.lock().await;
        store.clear_entries();
        persist(store.snapshot()).await;
    }
}

// Writes happen on the blocking pool. Callers keep the store locked until the
// write finishes, so files land in the order the changes were made.
async fn persist(snapshot: Result<Snapshot, HistoryError>) {
    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Failed to serialize history: {}", e);
            return;
        }
    };
    let path = snapshot.path().to_path_buf();
    match tokio::task::spawn_blocking(move || snapshot.write()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to save history to {}: {}", path.display(), e),
        Err(e) => warn!("History writer task failed: {}", e),
    }
}

/// Error body compatible with `{"detail": "..."}` clients.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CalcRequest {
    pub expr: String,
}

#[derive(Debug, Serialize)]
pub struct CalcResponse {
    pub ok: bool,
    pub result: f64,
}

#[derive(Debug, Deserialize)]
pub struct SimpleInterestRequest {
    #[serde(rename = "P")]
    pub principal: f64,
    #[serde(rename = "R")]
    pub rate: f64,
    #[serde(rename = "T")]
    pub time: f64,
}

#[derive(Debug, Serialize)]
pub struct SimpleInterestResponse {
    pub ok: bool,
    pub si: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize)]
pub struct CompoundInterestRequest {
    #[serde(rename = "P")]
    pub principal: f64,
    pub rate_percent: f64,
    #[serde(rename = "T")]
    pub time: f64,
    pub n: i64,
}

#[derive(Debug, Serialize)]
pub struct CompoundInterestResponse {
    pub ok: bool,
    pub ci: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/calc", post(calc))
        .route("/simple", post(simple))
        .route("/compound", post(compound))
        .route("/history", get(history))
        .route("/history/clear", post(clear_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, history_file: &Path) -> std::io::Result<()> {
    let store = crate::open_history(history_file);
    info!(
        "Loaded {} history entries from {}",
        store.history().len(),
        history_file.display()
    );
    let app = router(Arc::new(AppState::new(store)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn calc(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalcRequest>, JsonRejection>,
) -> Result<Json<CalcResponse>, ApiError> {
    let Json(req) = payload?;
    let expr = req.expr.trim();
    if expr.is_empty() {
        return Err(ApiError::bad_request("Empty expression"));
    }

    let result = calculator::evaluate(expr).map_err(|e| {
        warn!("Rejected expression {:?}: {}", expr, e);
        ApiError::bad_request(format!("Invalid expression: {}", e))
    })?;
    debug!("{} = {}", expr, result);

    state
        .record(HistoryRecord::Calc {
            expr: expr.to_string(),
            result,
        })
        .await;
    Ok(Json(CalcResponse { ok: true, result }))
}

async fn simple(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SimpleInterestRequest>, JsonRejection>,
) -> Result<Json<SimpleInterestResponse>, ApiError> {
    let Json(req) = payload?;
    let result = interest::simple_interest(req.principal, req.rate, req.time)
        .map_err(|e| ApiError::bad_request(format!("Invalid inputs: {}", e)))?;

    state
        .record(HistoryRecord::Simple {
            inputs: SimpleInputs {
                principal: req.principal,
                rate: req.rate,
                time: req.time,
            },
            result,
        })
        .await;
    Ok(Json(SimpleInterestResponse {
        ok: true,
        si: result.si,
        total: result.total,
    }))
}

async fn compound(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompoundInterestRequest>, JsonRejection>,
) -> Result<Json<CompoundInterestResponse>, ApiError> {
    let Json(req) = payload?;
    let result = interest::compound_interest(req.principal, req.rate_percent, req.time, req.n)
        .map_err(|e| ApiError::bad_request(format!("Invalid inputs: {}", e)))?;

    state
        .record(HistoryRecord::Compound {
            inputs: CompoundInputs {
                principal: req.principal,
                rate_percent: req.rate_percent,
                time: req.time,
                n: req.n,
            },
            result,
        })
        .await;
    Ok(Json(CompoundInterestResponse {
        ok: true,
        ci: result.ci,
        total: result.total,
    }))
}

async fn history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let store = state.history.lock().await;
    Ok(Json(store.history().recent(limit)))
}

async fn clear_history(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.clear().await;
    info!("Cleared history");
    Json(json!({ "ok": true, "cleared": true }))
}
