//! Hosted authentication provider client.
//!
//! Authentication is delegated to a backend-as-a-service speaking the
//! GoTrue REST dialect (Supabase and compatible hosts):
//!
//! | Operation | Request |
//! |-----------|---------|
//! | sign up | `POST /auth/v1/signup` |
//! | sign in | `POST /auth/v1/token?grant_type=password` |
//! | OAuth | redirect to `GET /auth/v1/authorize?provider=..&redirect_to=..` |
//! | sign out | `POST /auth/v1/logout` |
//! | current user | `GET /auth/v1/user` |
//!
//! Every request carries the project's anon key in the `apikey` header.
//! Failures are returned once, with the provider's own message; nothing is
//! retried. Session bookkeeping lives in [`crate::session`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication is not configured (set [auth].url)")]
    NotConfigured,

    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("auth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unsupported OAuth provider: {0}")]
    UnsupportedProvider(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
}

/// Social login providers accepted by [`AuthProvider::authorize_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
    Discord,
    Twitter,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Discord => "discord",
            OAuthProvider::Twitter => "twitter",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            "discord" => Ok(OAuthProvider::Discord),
            "twitter" => Ok(OAuthProvider::Twitter),
            other => Err(AuthError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    /// Identity provider that created the session (`email`, `github`, ...).
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| t <= now).unwrap_or(false)
    }
}

/// Result of a sign-up. Hosts that require e-mail confirmation return the
/// user without a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired(User),
}

/// Capability surface of the hosted auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// URL to send the user to for a social login. The provider redirects
    /// back to the configured post-login URL with the session tokens.
    fn authorize_url(&self, provider: OAuthProvider) -> Result<Url, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Resolves the user owning an access token.
    async fn get_user(&self, access_token: &str) -> Result<User, AuthError>;
}

// ============ Wire types ============

#[derive(Deserialize)]
struct WireAppMetadata {
    provider: Option<String>,
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
    email: Option<String>,
    app_metadata: Option<WireAppMetadata>,
}

impl From<WireUser> for User {
    fn from(w: WireUser) -> Self {
        User {
            id: w.id,
            email: w.email,
            provider: w.app_metadata.and_then(|m| m.provider),
        }
    }
}

#[derive(Deserialize)]
struct WireSession {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: WireUser,
}

impl WireSession {
    fn into_session(self, now: DateTime<Utc>) -> Result<Session, AuthError> {
        Ok(Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: expiry_after(now, self.expires_in)?,
            user: self.user.into(),
        })
    }
}

/// Absolute expiry for a token that lives `expires_in` seconds from `now`.
///
/// Lifetimes that do not fit in a timestamp are rejected as
/// [`AuthError::InvalidResponse`].
pub fn expiry_after(
    now: DateTime<Utc>,
    expires_in: Option<i64>,
) -> Result<Option<DateTime<Utc>>, AuthError> {
    let Some(seconds) = expires_in else {
        return Ok(None);
    };
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .map(Some)
        .ok_or_else(|| AuthError::InvalidResponse(format!("expires_in out of range: {}", seconds)))
}

/// Pulls the human-readable message out of a provider error body.
fn provider_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
        })
        .map(|m| m.to_string())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("auth provider returned HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        })
}

// ============ Hosted client ============

pub struct HostedAuthClient {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    redirect_url: Option<String>,
}

impl HostedAuthClient {
    pub fn new(base_url: &str, anon_key: String, redirect_url: Option<String>) -> Result<Self, AuthError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AuthError::InvalidResponse(format!("bad auth url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base_url,
            anon_key,
            redirect_url,
        })
    }

    /// Builds a client from `[auth]`, or [`AuthError::NotConfigured`].
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let url = config.url.as_deref().ok_or(AuthError::NotConfigured)?;
        let anon_key = config.anon_key().unwrap_or_default();
        Self::new(url, anon_key, config.redirect_url.clone())
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::InvalidResponse(format!("bad auth endpoint {}: {}", path, e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, AuthError> {
        let response = request.header("apikey", &self.anon_key).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Provider {
            status: status.as_u16(),
            message: provider_message(status.as_u16(), &body),
        })
    }
}

#[async_trait]
impl AuthProvider for HostedAuthClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let url = self.endpoint("/auth/v1/signup")?;
        let response = self
            .send(
                self.client
                    .post(url)
                    .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .await?;

        let body: serde_json::Value = response.json().await?;
        if body.get("access_token").is_some() {
            let wire: WireSession = serde_json::from_value(body)
                .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
            Ok(SignUpOutcome::SignedIn(wire.into_session(Utc::now())?))
        } else {
            let user_value = body.get("user").cloned().unwrap_or(body);
            let wire: WireUser = serde_json::from_value(user_value)
                .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
            Ok(SignUpOutcome::ConfirmationRequired(wire.into()))
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response = self
            .send(
                self.client
                    .post(url)
                    .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .await?;

        let wire: WireSession = response.json().await?;
        wire.into_session(Utc::now())
    }

    fn authorize_url(&self, provider: OAuthProvider) -> Result<Url, AuthError> {
        let mut url = self.endpoint("/auth/v1/authorize")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("provider", provider.as_str());
            if let Some(redirect) = &self.redirect_url {
                pairs.append_pair("redirect_to", redirect);
            }
        }
        Ok(url)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("/auth/v1/logout")?;
        self.send(self.client.post(url).bearer_auth(access_token))
            .await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, AuthError> {
        let url = self.endpoint("/auth/v1/user")?;
        let response = self
            .send(self.client.get(url).bearer_auth(access_token))
            .await?;
        let wire: WireUser = response.json().await?;
        Ok(wire.into())
    }
}
