//! Auth configuration and shared state.

use secrecy::SecretString;

use super::tokens::TokenIssuer;

const DEFAULT_ISSUER: &str = "globetrail";
const DEFAULT_AUDIENCE: &str = "web";
const DEFAULT_OTP_TTL_SECONDS: i64 = 5 * 60;
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    issuer: String,
    audience: String,
    otp_ttl_seconds: i64,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    pub(super) fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    pub(super) fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    pub(super) fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    /// Cookies are only marked `Secure` when the site is served over HTTPS.
    pub(super) fn cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Shared auth state: configuration plus the token issuer built from the
/// startup secret. Constructed once in the composition root and injected
/// into handlers via an `Extension`.
pub struct AuthState {
    config: AuthConfig,
    issuer: TokenIssuer,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, secret: &SecretString) -> Self {
        let issuer = TokenIssuer::new(
            secret,
            config.issuer.clone(),
            config.audience.clone(),
            config.access_ttl_seconds,
            config.refresh_ttl_seconds,
        );

        Self { config, issuer }
    }

    pub(crate) fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn tokens(&self) -> &TokenIssuer {
        &self.issuer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_token_policy() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        assert_eq!(config.otp_ttl_seconds(), 300);
        assert_eq!(config.access_ttl_seconds(), 900);
        assert_eq!(config.refresh_ttl_seconds(), 604_800);
        assert!(!config.cookie_secure());
    }

    #[test]
    fn builder_overrides_ttls() {
        let config = AuthConfig::new("http://localhost:3000".to_string())
            .with_otp_ttl_seconds(60)
            .with_access_ttl_seconds(30)
            .with_refresh_ttl_seconds(120);
        assert_eq!(config.otp_ttl_seconds(), 60);
        assert_eq!(config.access_ttl_seconds(), 30);
        assert_eq!(config.refresh_ttl_seconds(), 120);
    }

    #[test]
    fn https_frontend_enables_secure_cookies() {
        let config = AuthConfig::new("https://globetrail.example".to_string());
        assert!(config.cookie_secure());
    }

    #[test]
    fn state_issues_verifiable_tokens() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let state = AuthState::new(config, &SecretString::from("sekret".to_string()));

        let pair = state.tokens().issue_pair("user-1").unwrap();
        assert!(state.tokens().verify(&pair.access).is_some());
        assert!(state.tokens().verify(&pair.refresh).is_some());
    }
}
