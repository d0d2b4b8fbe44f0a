use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream::{Stream, StreamExt};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{parse_start_at, DraftConfig};
use crate::data::FighterStore;
use crate::draft::{DraftEvent, LiveDraftSession, LiveOptions};
use crate::server::api;
use crate::volatility::VolatilityConfig;

const STATIC_DIST_DIR: &str = "frontend/dist";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DraftConfig>,
    pub store: Arc<dyn FighterStore>,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<LiveDraftSession>>>>,
}

impl AppState {
    pub fn new(config: DraftConfig, store: Arc<dyn FighterStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<LiveDraftSession>>> {
        lock_sessions(&self.sessions)
    }

    /// Live sessions the server still holds, running or inside their post-run grace period.
    pub fn live_session_count(&self) -> usize {
        self.sessions().len()
    }

    /// Drops the session once its run has ended and the configured grace period has passed.
    fn evict_when_finished(&self, session: Arc<LiveDraftSession>) {
        let sessions = Arc::clone(&self.sessions);
        let grace = Duration::from_secs(self.config.session_grace_secs);
        tokio::spawn(async move {
            session.wait_finished().await;
            if !grace.is_zero() {
                tokio::time::sleep(grace).await;
            }
            if lock_sessions(&sessions).remove(&session.id()).is_some() {
                debug!(session = %session.id(), "finished live draft session evicted");
            }
        });
    }

    fn session(&self, raw_id: &str) -> Result<Arc<LiveDraftSession>, ApiError> {
        let id = Uuid::parse_str(raw_id).map_err(|_| ApiError::not_found("Live draft not found"))?;
        self.sessions()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Live draft not found"))
    }
}

fn lock_sessions(
    sessions: &Mutex<HashMap<Uuid, Arc<LiveDraftSession>>>,
) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<LiveDraftSession>>> {
    sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "status": "error", "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/pool", get(pool))
        .route("/draft", post(batch_draft))
        .route("/draft/estimate", get(estimate))
        .route("/live", post(start_live))
        .route("/live/:id", get(live_board).delete(cancel_live))
        .route("/live/:id/board", get(live_board))
        .route("/live/:id/events", get(live_events))
        .fallback(api_not_found);

    let dist = FsPath::new(STATIC_DIST_DIR);
    let spa = ServeDir::new(dist).not_found_service(ServeFile::new(dist.join("index.html")));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(spa)
        .with_state(state)
}

async fn api_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

async fn health() -> Json<serde_json::Value> {
    Json(api::health_payload())
}

async fn pool(State(state): State<AppState>) -> Json<api::PoolResponse> {
    let fighters = state.store.get_fighters();
    Json(api::pool_payload(&fighters))
}

async fn batch_draft(State(state): State<AppState>, body: String) -> Result<Json<api::DraftResponse>, ApiError> {
    let fighters = state.store.get_fighters();
    api::batch_draft_payload(&fighters, &body, chrono::Utc::now())
        .map(Json)
        .map_err(|err| ApiError::bad_request(err.to_string()))
}

async fn estimate(
    State(state): State<AppState>,
    Query(query): Query<api::EstimateQuery>,
) -> Json<crate::draft::DraftEstimate> {
    let fighters = state.store.get_fighters();
    Json(api::estimate_payload(&fighters, &query, chrono::Utc::now()))
}

async fn start_live(State(state): State<AppState>, body: String) -> Result<Json<api::LiveStarted>, ApiError> {
    let request =
        api::parse_live_request(&body).map_err(|err| ApiError::bad_request(err.to_string()))?;
    let config = &state.config;
    let start_at = match request.start_at.as_deref() {
        Some(raw) => parse_start_at(Some(raw)),
        None => config.start_at(),
    };
    let options = LiveOptions::from_settings(
        request.pick_delay_secs.or(config.pick_delay_secs),
        start_at,
    );
    let volatility = VolatilityConfig {
        seed: request.seed.or(config.volatility.seed),
        ..config.volatility.clone()
    };
    let use_override = request.use_override.unwrap_or(config.use_override);
    let pick_delay_secs = options.pick_delay.as_secs_f64();

    let fighters = state.store.get_fighters();
    let session = LiveDraftSession::start(fighters, options, volatility, use_override);
    let id = session.id();
    let session = Arc::new(session);
    state.sessions().insert(id, Arc::clone(&session));
    state.evict_when_finished(session);
    info!(session = %id, pick_delay_secs, use_override, "live draft session started");

    Ok(Json(api::LiveStarted {
        status: "ok",
        session_id: id.to_string(),
        pick_delay_secs,
        start_at,
        use_override,
        events_url: format!("/api/live/{id}/events"),
        board_url: format!("/api/live/{id}/board"),
    }))
}

async fn live_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session(&id)?;
    Ok(Json(serde_json::json!({
        "session_id": session.id().to_string(),
        "finished": session.is_finished(),
        "board": session.board(),
    })))
}

async fn cancel_live(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session(&id)?;
    session.cancel();
    state.sessions().remove(&session.id());
    info!(session = %session.id(), "live draft session cancelled");
    Ok(Json(serde_json::json!({ "status": "cancelled", "session_id": session.id().to_string() })))
}

fn to_sse(event: DraftEvent) -> Event {
    match Event::default().event(event.kind()).json_data(&event) {
        Ok(sse) => sse,
        Err(err) => {
            warn!("failed to encode draft event: {err}");
            Event::default().event("error").data("event encoding failed")
        }
    }
}

async fn live_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let session = state.session(&id)?;
    let receiver = session
        .take_events()
        .ok_or_else(|| ApiError::conflict("Event stream already has a subscriber"))?;
    let stream = UnboundedReceiverStream::new(receiver).map(|event| Ok(to_sse(event)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
