//! OTP verification flow.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::otp::sanitize_code;
use super::session::{access_cookie, refresh_cookie};
use super::state::AuthState;
use super::storage::consume_pending_otp;
use super::types::{ErrorResponse, VerifyOtpRequest, VerifyOtpResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted, cookies set", body = VerifyOtpResponse),
        (status = 400, description = "Malformed code", body = ErrorResponse),
        (status = 401, description = "Token minting failed", body = ErrorResponse),
        (status = 410, description = "Code invalid or expired", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request = payload.map(|Json(request)| request).unwrap_or_default();

    // Either key is accepted, digits only, first six.
    let raw = request.otp.or(request.code).unwrap_or_default();
    let Some(code) = sanitize_code(&raw) else {
        return error_response(StatusCode::BAD_REQUEST, "A valid 6-digit OTP is required");
    };

    // Consuming the code also marks the email verified and clears the code,
    // so a second submission of the same code falls through to Gone.
    let user = match consume_pending_otp(&pool, &code).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return error_response(StatusCode::GONE, "OTP is invalid or has expired");
        }
        Err(err) => {
            error!("Failed to verify code: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Verification failed");
        }
    };

    let pair = match auth_state.tokens().issue_pair(&user.id.to_string()) {
        Ok(pair) => pair,
        Err(err) => {
            error!("Failed to mint tokens: {err}");
            return error_response(StatusCode::UNAUTHORIZED, "Authentication tokens missing");
        }
    };

    let mut headers = HeaderMap::new();
    let config = auth_state.config();
    match (
        access_cookie(config, &pair.access),
        refresh_cookie(config, &pair.refresh),
    ) {
        (Ok(access), Ok(refresh)) => {
            headers.append(SET_COOKIE, access);
            headers.append(SET_COOKIE, refresh);
        }
        _ => {
            error!("Failed to build session cookies");
            return error_response(StatusCode::UNAUTHORIZED, "Authentication tokens missing");
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(VerifyOtpResponse {
            is_email_verified: true,
            user: user.into(),
        }),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
