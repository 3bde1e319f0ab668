//! HTTP request handlers

use super::sse::session_events;
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, OAuthRedirectQuery, SlackCommandForm,
    StreamChatRequest, WelcomeResponse,
};
use super::AppState;
use crate::boardroom::{RotationPolicy, SessionError, StopCondition};
use crate::format::{escape_mrkdwn, to_html};
use crate::slack::{parse_command, spawn_session_reply, SlackMessage};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{timeout, Instant};

const WELCOME_MESSAGE: &str = "Welcome to the marketing chatbot API!";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/chat", post(chat))
        .route("/chathtml", post(chat_html))
        .route("/chat/stream", post(chat_stream))
        .route("/slack", post(slack_command))
        .route("/slack/oauth_redirect", get(slack_oauth_redirect))
        .with_state(state)
}

async fn home() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = run_chat(&state, body).await?;
    Ok(Json(ChatResponse { response }))
}

async fn chat_html(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let transcript = run_chat(&state, body).await?;
    Ok(Json(ChatResponse {
        response: to_html(&transcript),
    }))
}

/// Validate, run a count-bounded random session to completion, return the transcript.
async fn run_chat(
    state: &AppState,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let product = require_product(req.product_description.as_deref())?;
    let turns = parse_turn_count(req.init_count.as_ref(), state.config.max_turns)?;

    let session = state.new_session(
        &product,
        RotationPolicy::Random,
        StopCondition::TurnLimit(turns),
    );
    let limit = state.config.session_timeout;
    let snapshot = timeout(limit, session.run())
        .await
        .map_err(|_| SessionError::TimedOut(limit))??;

    Ok(snapshot.transcript)
}

async fn chat_stream(
    State(state): State<AppState>,
    body: Result<Json<StreamChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let product = require_product(req.product_description.as_deref())?;

    let (policy, stop) = match (&req.init_count, &req.duration_secs) {
        (Some(count), None) => (
            RotationPolicy::Random,
            StopCondition::TurnLimit(parse_turn_count(Some(count), state.config.max_turns)?),
        ),
        (None, Some(secs)) => {
            let secs = parse_duration_secs(secs, state.config.session_timeout)?;
            (
                RotationPolicy::RoundRobin,
                StopCondition::Deadline(Instant::now() + Duration::from_secs(secs)),
            )
        }
        _ => {
            return Err(AppError::BadRequest(
                "Exactly one of init_count or duration_secs is required".to_string(),
            ))
        }
    };

    let session = state.new_session(&product, policy, stop);
    Ok(session_events(session.stream()).into_response())
}

fn require_product(description: Option<&str>) -> Result<String, AppError> {
    match description.map(str::trim) {
        Some(product) if !product.is_empty() => Ok(product.to_string()),
        _ => Err(AppError::BadRequest(
            "Product description is required".to_string(),
        )),
    }
}

/// Accepts a JSON integer or a numeric string, like form-sourced clients send.
fn positive_integer(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (n > 0).then_some(n)
}

fn parse_turn_count(value: Option<&Value>, max_turns: u32) -> Result<u32, AppError> {
    let count = value.and_then(positive_integer).ok_or_else(|| {
        AppError::BadRequest("Initial count must be a positive integer".to_string())
    })?;
    match u32::try_from(count) {
        Ok(count) if count <= max_turns => Ok(count),
        _ => Err(AppError::BadRequest(format!(
            "Initial count must not exceed {max_turns}"
        ))),
    }
}

fn parse_duration_secs(value: &Value, max: Duration) -> Result<u64, AppError> {
    let secs = positive_integer(value).ok_or_else(|| {
        AppError::BadRequest("Duration must be a positive integer".to_string())
    })?;
    if secs > max.as_secs() {
        return Err(AppError::BadRequest(format!(
            "Duration must not exceed {} seconds",
            max.as_secs()
        )));
    }
    Ok(secs)
}

// ============================================================
// Slack
// ============================================================

async fn slack_command(
    State(state): State<AppState>,
    Form(form): Form<SlackCommandForm>,
) -> Json<SlackMessage> {
    let command = match parse_command(&form.text, state.config.max_turns) {
        Ok(command) => command,
        Err(e) => return Json(SlackMessage::ephemeral(e.to_string())),
    };
    if form.response_url.trim().is_empty() {
        return Json(SlackMessage::ephemeral("Missing response_url"));
    }

    let session = state.new_session(
        &command.product_description,
        RotationPolicy::Random,
        StopCondition::TurnLimit(command.turns),
    );
    tracing::info!(
        session_id = %session.id(),
        user_name = %form.user_name,
        turns = command.turns,
        "Slack command accepted"
    );
    spawn_session_reply(
        session,
        form.response_url,
        state.slack_delivery.clone(),
        state.config.session_timeout,
    );

    Json(SlackMessage::in_channel(format!(
        "{} started a boardroom session for *{}* ({} turns). Results incoming...",
        escape_mrkdwn(&form.user_name),
        escape_mrkdwn(&command.product_description),
        command.turns
    )))
}

async fn slack_oauth_redirect(
    State(state): State<AppState>,
    Query(query): Query<OAuthRedirectQuery>,
) -> (StatusCode, String) {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            "OAuth failed: missing code".to_string(),
        );
    };

    match state.slack_oauth.exchange(&code).await {
        Ok(team) => {
            tracing::info!(team = ?team, "Slack app installed");
            (
                StatusCode::OK,
                "Slack app installed successfully!".to_string(),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Slack OAuth exchange failed");
            (StatusCode::BAD_REQUEST, format!("OAuth failed: {e}"))
        }
    }
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Upstream(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::UpstreamGeneration(_) | SessionError::TimedOut(_) => {
                AppError::Upstream(e.to_string())
            }
            SessionError::UnknownPersona(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        }

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
