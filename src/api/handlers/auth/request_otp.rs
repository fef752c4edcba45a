//! OTP issuance flow.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::email::{otp_message, EmailSender};

use super::otp::generate_code;
use super::state::AuthState;
use super::storage::upsert_pending_otp;
use super::types::{ErrorResponse, MessageResponse, RequestOtpRequest};
use super::utils::{derive_user_name, normalize_email, valid_email};

#[utoipa::path(
    post,
    path = "/v1/auth/request-otp",
    request_body = RequestOtpRequest,
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = ErrorResponse),
        (status = 500, description = "Could not store or deliver the code", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn request_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    sender: Extension<Arc<dyn EmailSender>>,
    payload: Option<Json<RequestOtpRequest>>,
) -> impl IntoResponse {
    let email = payload.and_then(|Json(request)| request.email);

    let Some(email) = email else {
        return error_response(StatusCode::BAD_REQUEST, "Email is required");
    };

    let email = normalize_email(&email);
    if !valid_email(&email) {
        return error_response(StatusCode::BAD_REQUEST, "Email is required");
    }

    let code = generate_code();
    let expires_at = Utc::now() + Duration::seconds(auth_state.config().otp_ttl_seconds());

    // Persist before dispatch: verification must work even when the client
    // never sees a delivery confirmation.
    if let Err(err) = upsert_pending_otp(&pool, &email, &derive_user_name(&email), &code, expires_at).await
    {
        error!("Failed to store pending code: {err}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP");
    }

    debug!(email = %email, "pending code stored");

    let message = otp_message(&email, &code);
    let sender = sender.0.clone();
    let sent = tokio::task::spawn_blocking(move || sender.send(&message)).await;

    match sent {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "OTP has been sent to your email address".to_string(),
            }),
        )
            .into_response(),
        Ok(Err(err)) => {
            // The stored code stays valid, the user may retry delivery.
            error!("Failed to send OTP email: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP")
        }
        Err(err) => {
            error!("Mail dispatch task failed: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP")
        }
    }
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
