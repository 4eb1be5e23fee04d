// src/api/handlers.rs

use crate::api::sessions::{CheckoutError, SessionCheckout, SessionSlot};
use crate::api::{auth, types::*, ApiState};
use crate::coach::{Session, SessionEvent};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn poisoned() -> ApiError {
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error: session table unavailable")
}

/// POST /api/v1/sessions - Open a session for one student.
pub async fn create_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    auth::check_auth(&state, &headers)?;

    let mode = body.mode.unwrap_or(state.defaults.mode);
    let session = Session::new(mode, &state.defaults.sections)
        .with_autosave(body.autosave.unwrap_or(state.defaults.autosave));
    let view = SessionView::from(&session);

    state
        .sessions
        .lock()
        .map_err(|_| poisoned())?
        .insert(session.id().to_string(), SessionSlot::new(session));

    tracing::info!(session = %view.id, mode = %mode, "Session opened");
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    auth::check_auth(&state, &headers)?;

    let sessions = state.sessions.lock().map_err(|_| poisoned())?;
    match sessions.get(&id).map(SessionSlot::session) {
        Some(Some(session)) => Ok(Json(SessionView::from(session))),
        Some(None) => Err(busy(&id)),
        None => Err(not_found(&id)),
    }
}

/// DELETE /api/v1/sessions/{id} - The client disconnected; drop its state.
pub async fn delete_session(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth::check_auth(&state, &headers)?;

    let removed = state
        .sessions
        .lock()
        .map_err(|_| poisoned())?
        .remove(&id);
    match removed {
        Some(_) => {
            tracing::info!(session = %id, "Session closed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(not_found(&id)),
    }
}

/// POST /api/v1/sessions/{id}/events - Apply one user action.
///
/// The session is checked out for the duration of the turn, so a second
/// request for the same session gets 409 instead of interleaving. The checkout
/// returns it to the table even if this handler is dropped mid-turn.
pub async fn post_event(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(event): Json<SessionEvent>,
) -> Result<Json<TurnResponse>, ApiError> {
    auth::check_auth(&state, &headers)?;

    let mut checkout = SessionCheckout::take(&state.sessions, &id).map_err(|e| match e {
        CheckoutError::NotFound => not_found(&id),
        CheckoutError::Busy => busy(&id),
        CheckoutError::Poisoned => poisoned(),
    })?;

    let turn = state.service.dispatch(checkout.session_mut(), event).await;
    Ok(Json(TurnResponse::new(turn, checkout.session())))
}

/// GET /api/v1/health - Simple health check.
pub async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.service.store_name(),
    }))
}

fn not_found(id: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, format!("Session '{id}' not found"))
}

fn busy(id: &str) -> ApiError {
    error(
        StatusCode::CONFLICT,
        format!("Session '{id}' is handling another request"),
    )
}
