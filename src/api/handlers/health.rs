//! Liveness endpoint reporting the running build.

use axum::{
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::api::GIT_COMMIT_HASH;

/// Report name, version, and build of the running binary. The same triple,
/// with a shortened hash, rides along in an `X-App` header for load-balancer
/// checks that only look at headers.
pub async fn health() -> impl IntoResponse {
    let short_hash = GIT_COMMIT_HASH.get(..7).unwrap_or_default();

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!(
        "{}:{}:{short_hash}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )) {
        headers.insert("X-App", value);
    }

    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }));

    (headers, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn health_reports_build_info() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let app_header = response.headers().get("X-App").unwrap().to_str().unwrap();
        assert!(app_header.starts_with(concat!(
            env!("CARGO_PKG_NAME"),
            ":",
            env!("CARGO_PKG_VERSION")
        )));
    }
}
