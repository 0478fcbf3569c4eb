//! JSON HTTP API.
//!
//! Exposes the analysis pipeline, report export and hosted auth over HTTP
//! for the web front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/catalog` | Full opportunity catalog |
//! | `POST` | `/search` | Primary search (`{ "query" }`) |
//! | `POST` | `/analyze` | Full gap analysis (`{ "query" }`) |
//! | `POST` | `/suggest` | Query suggestions (`{ "query" }`) |
//! | `POST` | `/mvp` | MVP proposal (`{ "gap" }`) |
//! | `POST` | `/roadmap` | Roadmap (`{ "mvp" }`) |
//! | `POST` | `/report` | HTML report |
//! | `POST` | `/auth/signup`, `/auth/signin`, `/auth/signout` | Account operations |
//! | `GET`  | `/auth/session` | The bearer token's user, or `null` |
//! | `POST` | `/auth/session` | Check tokens from an OAuth redirect |
//! | `GET`  | `/auth/oauth/{provider}` | Social login URL |
//!
//! The server holds no session. Sign-in returns the tokens to the caller,
//! which sends them back as `Authorization: Bearer <token>`.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `auth_disabled` (400), `auth_error` (401),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser client can
//! be served from a different origin.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::analysis::Analyzer;
use crate::auth::{
    expiry_after, AuthError, AuthProvider, HostedAuthClient, OAuthProvider, Session, SignUpOutcome,
    User,
};
use crate::completion::create_provider;
use crate::config::Config;
use crate::models::{MarketGap, MvpProposal, OpportunityRecord, ProductRoadmap, SearchAnalysis};
use crate::report::{render_printable_html, render_standalone_html, ReportInput};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
    /// `None` when `[auth].url` is unset.
    auth: Option<Arc<dyn AuthProvider>>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, auth: Option<Arc<dyn AuthProvider>>) -> Self {
        Self { analyzer, auth }
    }

    /// Builds the completion provider and auth client described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = create_provider(&config.llm)?;
        let analyzer = Analyzer::new(Arc::from(provider), config.search.clone());

        let auth: Option<Arc<dyn AuthProvider>> = if config.auth.is_enabled() {
            Some(Arc::new(HostedAuthClient::from_config(&config.auth)?))
        } else {
            None
        };

        Ok(Self::new(Arc::new(analyzer), auth))
    }
}

/// Builds the router with every endpoint and the CORS layer.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/catalog", get(handle_catalog))
        .route("/search", post(handle_search))
        .route("/analyze", post(handle_analyze))
        .route("/suggest", post(handle_suggest))
        .route("/mvp", post(handle_mvp))
        .route("/roadmap", post(handle_roadmap))
        .route("/report", post(handle_report))
        .route("/auth/signup", post(handle_sign_up))
        .route("/auth/signin", post(handle_sign_in))
        .route("/auth/signout", post(handle_sign_out))
        .route("/auth/session", get(handle_session).post(handle_restore))
        .route("/auth/oauth/{provider}", get(handle_oauth))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated. Returns an error if the completion
/// provider or auth client cannot be built, or if binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let bind_addr = config.server.bind.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind = %bind_addr, "server listening");
    println!("Gap Radar server listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"auth_error"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::NotConfigured => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "auth_disabled",
                message,
            },
            AuthError::UnsupportedProvider(_) => bad_request(message),
            AuthError::Provider { .. } | AuthError::NotSignedIn => AppError {
                status: StatusCode::UNAUTHORIZED,
                code: "auth_error",
                message,
            },
            AuthError::Http(_) | AuthError::InvalidResponse(_) => {
                error!(error = %message, "auth provider unreachable");
                internal(message)
            }
        }
    }
}

impl AppState {
    fn auth(&self) -> Result<&dyn AuthProvider, AppError> {
        self.auth
            .as_deref()
            .ok_or_else(|| AppError::from(AuthError::NotConfigured))
    }
}

fn require_query(query: &str) -> Result<&str, AppError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(bad_request("query must not be empty"))
    } else {
        Ok(trimmed)
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /catalog ============

#[derive(Serialize)]
struct CatalogResponse {
    opportunities: &'static [OpportunityRecord],
}

async fn handle_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        opportunities: state.analyzer.records(),
    })
}

// ============ Query endpoints ============

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<&'static OpportunityRecord>,
}

async fn handle_search(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = require_query(&req.query)?;
    let results = state.analyzer.search_opportunities(query).await;
    Ok(Json(SearchResponse {
        query: query.to_string(),
        results,
    }))
}

async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<SearchAnalysis>, AppError> {
    let query = require_query(&req.query)?;
    Ok(Json(state.analyzer.analyze(query).await))
}

#[derive(Serialize)]
struct SuggestResponse {
    suggestions: Vec<String>,
}

async fn handle_suggest(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let query = require_query(&req.query)?;
    Ok(Json(SuggestResponse {
        suggestions: state.analyzer.suggest(query).await,
    }))
}

// ============ Planning endpoints ============

#[derive(Deserialize)]
struct MvpRequest {
    gap: MarketGap,
}

async fn handle_mvp(
    State(state): State<AppState>,
    Json(req): Json<MvpRequest>,
) -> Json<MvpProposal> {
    Json(state.analyzer.propose_mvp(&req.gap).await)
}

#[derive(Deserialize)]
struct RoadmapRequest {
    mvp: MvpProposal,
}

async fn handle_roadmap(
    State(state): State<AppState>,
    Json(req): Json<RoadmapRequest>,
) -> Json<ProductRoadmap> {
    Json(state.analyzer.plan_roadmap(&req.mvp).await)
}

// ============ POST /report ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest {
    gaps: Vec<MarketGap>,
    total_market_size: String,
    #[serde(default)]
    mvp: Option<MvpProposal>,
    #[serde(default)]
    roadmap: Option<ProductRoadmap>,
    /// Adds the print-on-load hook.
    #[serde(default)]
    print: bool,
}

async fn handle_report(Json(req): Json<ReportRequest>) -> Result<Response, AppError> {
    let input = ReportInput {
        gaps: &req.gaps,
        total_market_size: &req.total_market_size,
        generated_at: Utc::now(),
        mvp: req.mvp.as_ref(),
        roadmap: req.roadmap.as_ref(),
    };
    let html = if req.print {
        render_printable_html(&input)
    } else {
        render_standalone_html(&input)
    }
    .map_err(|e| internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response())
}

// ============ Auth endpoints ============
//
// The server keeps no session of its own. Tokens go back to the caller,
// and signed-in requests carry them as `Authorization: Bearer <token>`.

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    confirmation_required: bool,
    session: Option<Session>,
    user: User,
}

async fn handle_sign_up(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<SignUpResponse>, AppError> {
    let outcome = state.auth()?.sign_up(&req.email, &req.password).await?;
    Ok(Json(match outcome {
        SignUpOutcome::SignedIn(session) => SignUpResponse {
            confirmation_required: false,
            user: session.user.clone(),
            session: Some(session),
        },
        SignUpOutcome::ConfirmationRequired(user) => SignUpResponse {
            confirmation_required: true,
            session: None,
            user,
        },
    }))
}

async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.auth()?.sign_in(&req.email, &req.password).await?;
    info!(user = %session.user.id, "signed in");
    Ok(Json(session))
}

async fn handle_sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let auth = state.auth()?;
    let token = bearer_token(&headers).ok_or(AuthError::NotSignedIn)?;
    auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct SessionResponse {
    user: Option<User>,
}

/// The caller's user, resolved from its bearer token. No token reads as
/// signed out.
async fn handle_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    let auth = state.auth()?;
    let user = match bearer_token(&headers) {
        Some(token) => Some(auth.get_user(token).await?),
        None => None,
    };
    Ok(Json(SessionResponse { user }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreRequest {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Checks tokens from an OAuth redirect and returns them as a session.
async fn handle_restore(
    State(state): State<AppState>,
    Json(req): Json<RestoreRequest>,
) -> Result<Json<Session>, AppError> {
    let auth = state.auth()?;
    let expires_at =
        expiry_after(Utc::now(), req.expires_in).map_err(|e| bad_request(e.to_string()))?;
    let user = auth.get_user(&req.access_token).await?;
    Ok(Json(Session {
        access_token: req.access_token,
        refresh_token: req.refresh_token,
        expires_at,
        user,
    }))
}

#[derive(Serialize)]
struct OAuthResponse {
    provider: OAuthProvider,
    url: String,
}

async fn handle_oauth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<OAuthResponse>, AppError> {
    let provider: OAuthProvider = provider.parse()?;
    let url = state.auth()?.authorize_url(provider)?;
    Ok(Json(OAuthResponse {
        provider,
        url: url.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::DisabledProvider;
    use crate::config::SearchConfig;
    use serde_json::{json, Value};
    use wiremock::matchers::{header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(auth: Option<Arc<dyn AuthProvider>>) -> AppState {
        let search = SearchConfig {
            search_delay_ms: 0,
            ..SearchConfig::default()
        };
        AppState::new(Arc::new(Analyzer::new(Arc::new(DisabledProvider), search)), auth)
    }

    async fn spawn(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_and_catalog() {
        let base = spawn(test_state(None)).await;
        let client = reqwest::Client::new();

        let health: Value = client.get(format!("{}/health", base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(health["status"], "ok");

        let catalog: Value = client.get(format!("{}/catalog", base)).send().await.unwrap().json().await.unwrap();
        assert_eq!(catalog["opportunities"].as_array().unwrap().len(), 6);
        assert!(catalog["opportunities"][0]["painPoints"].is_array());
    }

    #[tokio::test]
    async fn test_blank_query_is_bad_request() {
        let base = spawn(test_state(None)).await;
        let resp = reqwest::Client::new()
            .post(format!("{}/analyze", base))
            .json(&json!({"query": "   "}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_search_and_analyze() {
        let base = spawn(test_state(None)).await;
        let client = reqwest::Client::new();

        let search: Value = client
            .post(format!("{}/search", base))
            .json(&json!({"query": "construction"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(search["results"][0]["id"], "construction-progress-tracking");

        let analysis: Value = client
            .post(format!("{}/analyze", base))
            .json(&json!({"query": "construction"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(analysis["source"], "fallback");
        assert_eq!(analysis["marketGaps"][0]["title"], "construction Market Opportunity");
    }

    #[tokio::test]
    async fn test_report_is_html() {
        let base = spawn(test_state(None)).await;
        let resp = reqwest::Client::new()
            .post(format!("{}/report", base))
            .json(&json!({
                "gaps": [{
                    "id": "gap-1", "title": "Permit tracking", "description": "d",
                    "gapSize": 8, "urgency": 6, "difficulty": 4, "industry": "Construction",
                    "estimatedMarketSize": "$1B", "keyInsights": []
                }],
                "totalMarketSize": "$1B",
                "print": true
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
        let html = resp.text().await.unwrap();
        assert!(html.contains("Permit tracking"));
        assert!(html.contains("window.print()"));
    }

    #[tokio::test]
    async fn test_auth_disabled() {
        let base = spawn(test_state(None)).await;
        let resp = reqwest::Client::new()
            .get(format!("{}/auth/session", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "auth_disabled");
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_unauthorized() {
        let auth = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error_description": "Invalid login credentials"})),
            )
            .mount(&auth)
            .await;

        let client = HostedAuthClient::new(&auth.uri(), "anon".to_string(), None).unwrap();
        let base = spawn(test_state(Some(Arc::new(client)))).await;

        let resp = reqwest::Client::new()
            .post(format!("{}/auth/signin", base))
            .json(&json!({"email": "a@b.co", "password": "nope"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "auth_error");
        assert_eq!(body["error"]["message"], "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_oauth_url() {
        let auth = MockServer::start().await;
        let client = HostedAuthClient::new(
            &auth.uri(),
            "anon".to_string(),
            Some("http://localhost:5173/".to_string()),
        )
        .unwrap();
        let base = spawn(test_state(Some(Arc::new(client)))).await;
        let http = reqwest::Client::new();

        let ok: Value = http
            .get(format!("{}/auth/oauth/github", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(ok["provider"], "github");
        assert!(ok["url"].as_str().unwrap().contains("provider=github"));

        let bad = http
            .get(format!("{}/auth/oauth/myspace", base))
            .send()
            .await
            .unwrap();
        assert_eq!(bad.status(), 400);
    }

    async fn mount_alice(auth: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "alice-token",
                "refresh_token": "alice-refresh",
                "expires_in": 3600,
                "user": {"id": "alice", "email": "alice@x.co"}
            })))
            .mount(auth)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header_is("authorization", "Bearer alice-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "alice", "email": "alice@x.co"
            })))
            .mount(auth)
            .await;
    }

    #[tokio::test]
    async fn test_sessions_are_per_caller() {
        let auth = MockServer::start().await;
        mount_alice(&auth).await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&auth)
            .await;

        let client = HostedAuthClient::new(&auth.uri(), "anon".to_string(), None).unwrap();
        let base = spawn(test_state(Some(Arc::new(client)))).await;

        let alice = reqwest::Client::new();
        let signed_in: Value = alice
            .post(format!("{}/auth/signin", base))
            .json(&json!({"email": "alice@x.co", "password": "pw"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(signed_in["access_token"], "alice-token");

        let own: Value = alice
            .get(format!("{}/auth/session", base))
            .bearer_auth("alice-token")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(own["user"]["id"], "alice");

        let stranger = reqwest::Client::new();
        let resp = stranger
            .get(format!("{}/auth/session", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body = resp.text().await.unwrap();
        assert!(!body.contains("alice"), "leaked session: {}", body);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"user": null}));

        let signout = stranger
            .post(format!("{}/auth/signout", base))
            .send()
            .await
            .unwrap();
        assert_eq!(signout.status(), 401);
        let body: Value = signout.json().await.unwrap();
        assert_eq!(body["error"]["code"], "auth_error");
    }

    #[tokio::test]
    async fn test_restore_rejects_out_of_range_lifetime() {
        let auth = MockServer::start().await;
        mount_alice(&auth).await;
        let client = HostedAuthClient::new(&auth.uri(), "anon".to_string(), None).unwrap();
        let base = spawn(test_state(Some(Arc::new(client)))).await;
        let http = reqwest::Client::new();

        let resp = http
            .post(format!("{}/auth/session", base))
            .json(&json!({"accessToken": "alice-token", "expiresIn": i64::MAX}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request");

        let restored: Value = http
            .post(format!("{}/auth/session", base))
            .json(&json!({"accessToken": "alice-token", "expiresIn": 60}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(restored["user"]["id"], "alice");
        assert!(restored["expires_at"].is_string());
    }
}
