use crate::auth;
use crate::page;
use crate::query_payload::QueryPayload;
use crate::rag_response::{HealthResponse, SessionCreated, TranscriptResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use nova_rag::{ChatService, ErrorResponse, RagError, TurnOutcome};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(chat: ChatService, api_token: Option<String>) -> Self {
        Self {
            chat,
            api_token: api_token.map(Arc::from),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/messages", post(post_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_token));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/chat/:id", get(chat_page).post(submit_query))
        .route("/chat/:id/reset", post(reset_chat))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON error body for the API routes.
pub struct ApiError(RagError);

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RagError::EmptyQuery => StatusCode::BAD_REQUEST,
            RagError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.chat.sessions().len().await,
    })
}

async fn index(State(state): State<AppState>) -> Redirect {
    let id = state.chat.sessions().create().await;
    Redirect::to(&format!("/chat/{id}"))
}

async fn chat_page(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.chat.sessions().entries(id).await {
        Ok(entries) => Html(page::render_chat(id, &entries)).into_response(),
        // Sessions vanish on restart; start a fresh one.
        Err(_) => Redirect::to("/").into_response(),
    }
}

async fn submit_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(payload): Form<QueryPayload>,
) -> Redirect {
    match state.chat.run_turn(id, &payload.query).await {
        Ok(_) | Err(RagError::EmptyQuery) => Redirect::to(&format!("/chat/{id}")),
        Err(e) => {
            log::warn!("Chat form submission failed: {}", e);
            Redirect::to("/")
        }
    }
}

async fn reset_chat(State(state): State<AppState>, Path(id): Path<Uuid>) -> Redirect {
    match state.chat.sessions().reset(id).await {
        Ok(()) => Redirect::to(&format!("/chat/{id}")),
        Err(_) => Redirect::to("/"),
    }
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.chat.sessions().create().await;
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let entries = state.chat.sessions().entries(id).await?;
    Ok(Json(TranscriptResponse {
        session_id: id,
        entries,
    }))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if state.chat.sessions().remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(RagError::SessionNotFound(id).into())
    }
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QueryPayload>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let outcome = state.chat.run_turn(id, &payload.query).await?;
    Ok(Json(outcome))
}
