//! Request and response payloads for the auth endpoints.
//!
//! Field names stay camelCase on the wire, matching what the site front end
//! already sends and renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::storage::UserRecord;

#[derive(ToSchema, Deserialize, Debug)]
pub struct RequestOtpRequest {
    pub email: Option<String>,
}

/// Either key is accepted; digits are extracted from whichever is present.
#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct VerifyOtpRequest {
    pub otp: Option<String>,
    pub code: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Sanitized user profile, safe to hand to the client.
#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub user_name: Option<String>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            user_name: record.user_name,
            is_email_verified: record.is_email_verified,
            created_at: record.created_at,
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub is_email_verified: bool,
    pub user: UserProfile,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct MeResponse {
    pub ok: bool,
    pub user: Option<UserProfile>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct LogoutResponse {
    pub ok: bool,
}
