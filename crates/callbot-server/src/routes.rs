//! HTTP routes.

use crate::state::AppState;
use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use callbot_application::{CallStatusWebhook, IntakeReceipt, IntakeRequest, VoiceWebhook};
use serde::Serialize;
use std::sync::Arc;

type AppStateArc = Arc<AppState>;

pub fn router(state: AppStateArc, voice_path: &str) -> Router {
    Router::new()
        .route("/api/receive", post(receive))
        .route(voice_path, post(voice))
        .route("/api/twilio/status", post(call_status))
        .route("/health", get(health))
        .with_state(state)
}

async fn receive(
    State(state): State<AppStateArc>,
    Json(request): Json<IntakeRequest>,
) -> Result<Json<IntakeReceipt>, (StatusCode, String)> {
    state.intake.receive(request).await.map(Json).map_err(|e| {
        let status = if e.is_invalid_state() {
            StatusCode::CONFLICT
        } else {
            tracing::error!("[Routes] Intake failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, e.to_string())
    })
}

async fn voice(
    State(state): State<AppStateArc>,
    Form(webhook): Form<VoiceWebhook>,
) -> impl IntoResponse {
    let twiml = state.voice.on_voice(webhook).await;
    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], twiml)
}

#[derive(Serialize)]
struct StatusAck {
    terminated: bool,
}

async fn call_status(
    State(state): State<AppStateArc>,
    Form(webhook): Form<CallStatusWebhook>,
) -> Json<StatusAck> {
    Json(StatusAck {
        terminated: state.voice.on_status(webhook).await,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
