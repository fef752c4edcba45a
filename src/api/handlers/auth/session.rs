//! Session introspection, logout, and cookie construction.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::state::{AuthConfig, AuthState};
use super::storage::fetch_profile;
use super::tokens::TokenKind;
use super::types::{LogoutResponse, MeResponse};
use super::utils::extract_cookie;

pub(crate) const ACCESS_COOKIE_NAME: &str = "accessToken";
pub(crate) const REFRESH_COOKIE_NAME: &str = "refreshToken";

#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Session state, authenticated or not", body = MeResponse)
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    // "Not logged in" is a valid, successful response shape, never an error.
    let Some(token) = extract_cookie(&headers, ACCESS_COOKIE_NAME) else {
        return anonymous();
    };

    let Some(verified) = auth_state.tokens().verify(&token) else {
        return anonymous();
    };

    // A refresh token in the access cookie does not authenticate.
    if verified.kind != TokenKind::Access {
        return anonymous();
    }

    let Ok(user_id) = Uuid::parse_str(&verified.user_id) else {
        return anonymous();
    };

    match fetch_profile(&pool, user_id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(MeResponse {
                ok: true,
                user: Some(user.into()),
            }),
        )
            .into_response(),
        Ok(None) => anonymous(),
        Err(err) => {
            error!("Failed to fetch profile: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 200, description = "Access cookie cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // No auth check: clearing an absent cookie is harmless.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_access_cookie(auth_state.config()) {
        headers.insert(SET_COOKIE, cookie);
    }

    (StatusCode::OK, headers, Json(LogoutResponse { ok: true })).into_response()
}

fn anonymous() -> axum::response::Response {
    (
        StatusCode::OK,
        Json(MeResponse {
            ok: false,
            user: None,
        }),
    )
        .into_response()
}

/// Build the short-lived access-token cookie.
pub(super) fn access_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    session_cookie(config, ACCESS_COOKIE_NAME, token, config.access_ttl_seconds())
}

/// Build the long-lived refresh-token cookie.
pub(super) fn refresh_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    session_cookie(
        config,
        REFRESH_COOKIE_NAME,
        token,
        config.refresh_ttl_seconds(),
    )
}

fn session_cookie(
    config: &AuthConfig,
    name: &str,
    token: &str,
    max_age_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_access_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{ACCESS_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(frontend: &str) -> AuthConfig {
        AuthConfig::new(frontend.to_string())
    }

    #[test]
    fn access_cookie_policy() {
        let cookie = access_cookie(&config("http://localhost:3000"), "tok").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("accessToken=tok; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=900"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn refresh_cookie_policy() {
        let cookie = refresh_cookie(&config("http://localhost:3000"), "tok").unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("refreshToken=tok; "));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn https_frontend_marks_cookies_secure() {
        let cookie = access_cookie(&config("https://globetrail.example"), "tok").unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_access_cookie(&config("http://localhost:3000")).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("accessToken=; "));
        assert!(cookie.contains("Max-Age=0"));
    }
}
