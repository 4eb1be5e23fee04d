// src/api/auth.rs - Bearer token check for the session API
//
// When `[api] token` is set, every session route (create, read, delete,
// events) requires `Authorization: Bearer <token>`. Health stays open.
// Without a token every request passes.

use crate::api::{types::ErrorResponse, ApiState};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

/// Reject a session request whose bearer token does not match `[api] token`.
pub fn check_auth(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let Some(ref expected) = state.token else {
        return Ok(());
    };

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid or missing bearer token".into(),
            }),
        ))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
