//! Database helpers for the user directory.
//!
//! One row per normalized email. At most one pending code per user: a new
//! issuance overwrites the previous one, and verification clears the code in
//! the same statement that flips `is_email_verified`, so a code is single-use
//! by construction. Concurrent issuance for the same email is last write wins.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Sanitized row handed back to the flows.
#[derive(Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub user_name: Option<String>,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        user_name: row.get("user_name"),
        is_email_verified: row.get("is_email_verified"),
        created_at: row.get("created_at"),
    }
}

/// Apply the idempotent schema at startup so a fresh database just works.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA_SQL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("failed to apply schema statement: {statement}"))?;
    }

    Ok(())
}

/// Create-or-update the user for an OTP issuance.
///
/// The code and expiry land before any mail is sent, a later verification can
/// still succeed even when the client never saw a delivery confirmation.
pub(super) async fn upsert_pending_otp(
    pool: &PgPool,
    email: &str,
    user_name: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    let query = r"
        INSERT INTO users (email, user_name, otp_code, otp_expires_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET otp_code = EXCLUDED.otp_code,
            otp_expires_at = EXCLUDED.otp_expires_at,
            updated_at = now()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind(user_name)
        .bind(code)
        .bind(expires_at)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store pending code")?;

    Ok(())
}

/// Atomically consume an unexpired pending code.
///
/// Matches the most recently updated user holding the code (lookup is by code
/// value only, the client does not resubmit the email), marks the email
/// verified, and clears the code so it can never be replayed. Returns `None`
/// when no live code matches.
pub(super) async fn consume_pending_otp(pool: &PgPool, code: &str) -> Result<Option<UserRecord>> {
    let query = r"
        UPDATE users
        SET is_email_verified = TRUE,
            otp_code = NULL,
            otp_expires_at = NULL,
            updated_at = now()
        WHERE id = (
            SELECT id FROM users
            WHERE otp_code = $1 AND otp_expires_at > now()
            ORDER BY updated_at DESC
            LIMIT 1
        )
        RETURNING id, email, user_name, is_email_verified, created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(code)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume pending code")?;

    Ok(row.as_ref().map(record_from_row))
}

/// Look up the public profile for a verified session.
pub(super) async fn fetch_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, email, user_name, is_email_verified, created_at
        FROM users
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch profile")?;

    Ok(row.as_ref().map(record_from_row))
}
