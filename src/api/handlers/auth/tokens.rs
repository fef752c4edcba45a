//! Token issuance and the session guard.
//!
//! Both tokens are HS256 JWTs signed with the shared secret from startup
//! configuration. Nothing is persisted server-side, validity is fully
//! determined by the signature plus the registered claims.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Identity extracted from a valid access or refresh token.
#[derive(Debug, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: String,
    pub kind: TokenKind,
}

/// Signs and verifies the token pair for one issuer/audience/secret triple.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenIssuer {
    pub fn new(
        secret: &SecretString,
        issuer: String,
        audience: String,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        let secret = secret.expose_secret();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Mint the access/refresh pair bound to a user id.
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair> {
        let now = Utc::now().timestamp();

        Ok(TokenPair {
            access: self.sign(user_id, TokenKind::Access, now, self.access_ttl_seconds)?,
            refresh: self.sign(user_id, TokenKind::Refresh, now, self.refresh_ttl_seconds)?,
        })
    }

    fn sign(&self, user_id: &str, kind: TokenKind, now: i64, ttl_seconds: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + ttl_seconds,
            kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign token")
    }

    /// Session guard: validate signature, issuer, audience, and expiry.
    ///
    /// Returns `None` on any failure. Never errors and has no side effects,
    /// so it is safe to run on every request including unauthenticated ones.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<VerifiedToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| VerifiedToken {
                user_id: data.claims.sub,
                kind: data.claims.kind,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_TTL: i64 = 15 * 60;
    const REFRESH_TTL: i64 = 7 * 24 * 60 * 60;

    fn issuer_with_secret(secret: &str) -> TokenIssuer {
        TokenIssuer::new(
            &SecretString::from(secret.to_string()),
            "globetrail".to_string(),
            "web".to_string(),
            ACCESS_TTL,
            REFRESH_TTL,
        )
    }

    fn decode_claims(token: &str, secret: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&["globetrail"]);
        validation.set_audience(&["web"]);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn pair_carries_type_and_expiry_policy() {
        let issuer = issuer_with_secret("sekret");
        let pair = issuer.issue_pair("user-1").unwrap();
        let now = Utc::now().timestamp();

        let access = decode_claims(&pair.access, "sekret");
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.sub, "user-1");
        // Allow a small scheduling skew around now + 15 minutes
        assert!((access.exp - now - ACCESS_TTL).abs() <= 5);

        let refresh = decode_claims(&pair.refresh, "sekret");
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert!((refresh.exp - now - REFRESH_TTL).abs() <= 5);
    }

    #[test]
    fn verify_round_trip() {
        let issuer = issuer_with_secret("sekret");
        let pair = issuer.issue_pair("user-1").unwrap();

        let verified = issuer.verify(&pair.access).unwrap();
        assert_eq!(verified.user_id, "user-1");
        assert_eq!(verified.kind, TokenKind::Access);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let pair = issuer_with_secret("sekret").issue_pair("user-1").unwrap();
        let other = issuer_with_secret("different");
        assert!(other.verify(&pair.access).is_none());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let pair = issuer_with_secret("sekret").issue_pair("user-1").unwrap();

        let wrong_issuer = TokenIssuer::new(
            &SecretString::from("sekret".to_string()),
            "someone-else".to_string(),
            "web".to_string(),
            ACCESS_TTL,
            REFRESH_TTL,
        );
        assert!(wrong_issuer.verify(&pair.access).is_none());

        let wrong_audience = TokenIssuer::new(
            &SecretString::from("sekret".to_string()),
            "globetrail".to_string(),
            "mobile".to_string(),
            ACCESS_TTL,
            REFRESH_TTL,
        );
        assert!(wrong_audience.verify(&pair.access).is_none());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let issuer = issuer_with_secret("sekret");
        let now = Utc::now().timestamp();
        // Sign a token that expired ten seconds ago
        let expired = issuer.sign("user-1", TokenKind::Access, now - 20, 10).unwrap();
        assert!(issuer.verify(&expired).is_none());
    }

    #[test]
    fn verify_rejects_garbage() {
        let issuer = issuer_with_secret("sekret");
        assert!(issuer.verify("").is_none());
        assert!(issuer.verify("not.a.jwt").is_none());
    }
}
