//! Authentication gate for the API.
//!
//! A single identity may log in with a username and bcrypt password, which
//! yields an HMAC-signed session cookie. Programmatic clients may instead send
//! the configured API key as a bearer token. Every protected route sits behind
//! [`api_auth_middleware`], so unauthenticated requests are answered with 401
//! before any handler runs.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeader,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::{AuthConfig, MAX_SESSION_TIMEOUT_HOURS};
use crate::error::Error;
use crate::server::request_id::RequestId;
use crate::server::AppContext;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE_NAME: &str = "homedash_session";

/// Identity reported for requests when authentication is disabled.
const ANONYMOUS_USER: &str = "anonymous";

/// Login request payload
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl LoginResponse {
    fn failure(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.to_string(),
            expires_at: None,
        })
    }
}

/// The authenticated caller, inserted into request extensions by the
/// middleware.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub username: String,
}

/// Session data carried in the cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub username: String,
    pub expires_at: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl SessionData {
    pub fn new(username: &str, timeout_hours: u64) -> Self {
        Self {
            username: username.to_string(),
            expires_at: now_secs().saturating_add(timeout_hours.saturating_mul(3600)),
        }
    }

    pub fn is_valid(&self) -> bool {
        now_secs() < self.expires_at
    }
}

/// Signs and verifies session cookie values.
///
/// Cookie format: `<base64url(json)>.<hex(hmac-sha256)>`.
#[derive(Clone)]
pub struct SessionSigner {
    key: Arc<[u8]>,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: Arc::from(secret),
        }
    }

    /// Build a signer from config, generating a throwaway secret if none is set.
    pub fn from_config(auth: &AuthConfig) -> Self {
        match auth.session_secret.as_deref() {
            Some(secret) => Self::new(secret.as_bytes()),
            None => {
                if auth.enabled {
                    tracing::warn!(
                        "No session secret configured; sessions will not survive a restart"
                    );
                }
                Self::new(generate_secret().as_bytes())
            }
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }

    pub fn encode(&self, session: &SessionData) -> String {
        let json = serde_json::to_vec(session).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        format!("{payload}.{signature}")
    }

    /// Decode a cookie value, returning `None` if it is malformed or the
    /// signature does not verify.
    pub fn decode(&self, value: &str) -> Option<SessionData> {
        let (payload, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Check if authentication is required and valid
pub fn check_auth(
    auth_config: &AuthConfig,
    signer: &SessionSigner,
    bearer_token: Option<&str>,
    session_cookie: Option<&str>,
) -> Result<CurrentUser, Error> {
    if !auth_config.enabled {
        return Ok(CurrentUser {
            username: ANONYMOUS_USER.to_string(),
        });
    }

    // Check API key first (for programmatic access)
    if let (Some(token), Some(api_key)) = (bearer_token, auth_config.api_key.as_deref()) {
        if constant_time_eq(token.as_bytes(), api_key.as_bytes()) {
            return Ok(CurrentUser {
                username: auth_config
                    .username
                    .clone()
                    .unwrap_or_else(|| "api".to_string()),
            });
        }
    }

    // Check session cookie (for web UI)
    if let Some(session) = session_cookie.and_then(|c| signer.decode(c)) {
        let allowed = auth_config.username.as_deref() == Some(session.username.as_str());
        if session.is_valid() && allowed {
            return Ok(CurrentUser {
                username: session.username,
            });
        }
    }

    Err(Error::Unauthorized("Not authenticated".to_string()))
}

/// Middleware guarding every protected API route.
pub async fn api_auth_middleware(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let bearer_token = bearer.map(|b| b.token().to_string());
    let session_cookie = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());

    let user = check_auth(
        &ctx.config.auth,
        &ctx.sessions,
        bearer_token.as_deref(),
        session_cookie.as_deref(),
    )
    .inspect_err(|_| {
        let request_id = request.extensions().get::<RequestId>().map(|id| id.0.as_str());
        tracing::debug!(uri = %request.uri(), request_id, "Rejected unauthenticated request")
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Login handler
pub async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), (StatusCode, Json<LoginResponse>)> {
    let auth_config = &ctx.config.auth;

    let (expected_username, password_hash) =
        match (&auth_config.username, &auth_config.password_hash) {
            (Some(u), Some(h)) => (u.clone(), h.clone()),
            _ => {
                return Err((
                    StatusCode::SERVICE_UNAVAILABLE,
                    LoginResponse::failure("Authentication not configured"),
                ));
            }
        };

    if payload.username != expected_username {
        tracing::info!("Login refused for user {:?}", payload.username);
        return Err((
            StatusCode::UNAUTHORIZED,
            LoginResponse::failure("Invalid credentials"),
        ));
    }

    let password = payload.password;
    let verified =
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
            .await
            .ok()
            .and_then(|r| r.ok())
            .unwrap_or(false);

    if !verified {
        tracing::info!("Login refused for user {:?}", payload.username);
        return Err((
            StatusCode::UNAUTHORIZED,
            LoginResponse::failure("Invalid credentials"),
        ));
    }

    let session = SessionData::new(&payload.username, auth_config.session_timeout_hours);
    let expires_at = session.expires_at;

    let cookie = Cookie::build((SESSION_COOKIE_NAME, ctx.sessions.encode(&session)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(session_max_age(auth_config.session_timeout_hours))
        .build();

    tracing::info!("User {:?} logged in", payload.username);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            expires_at: Some(expires_at),
        }),
    ))
}

/// Cookie lifetime for a session timeout, capped at the longest accepted timeout.
fn session_max_age(timeout_hours: u64) -> time::Duration {
    let hours = timeout_hours.min(MAX_SESSION_TIMEOUT_HOURS);
    time::Duration::hours(i64::try_from(hours).unwrap_or(i64::MAX / 3600))
}

/// Logout handler
///
/// Always answers with an expired cookie, even when the request carried none.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .build();

    (jar.add(cookie), StatusCode::OK)
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub auth_enabled: bool,
    pub authenticated: bool,
    pub username: Option<String>,
}

/// Check current auth status
pub async fn auth_status(
    State(ctx): State<AppContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    jar: CookieJar,
) -> Json<AuthStatusResponse> {
    let auth_config = &ctx.config.auth;

    let bearer_token = bearer.map(|b| b.token().to_string());
    let session_cookie = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());

    let user = check_auth(
        auth_config,
        &ctx.sessions,
        bearer_token.as_deref(),
        session_cookie.as_deref(),
    )
    .ok();

    Json(AuthStatusResponse {
        auth_enabled: auth_config.enabled,
        authenticated: user.is_some(),
        username: user.map(|u| u.username),
    })
}

/// Return the authenticated user (protected route).
pub async fn current_user(Extension(user): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": user }))
}

/// Generate a bcrypt password hash
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Generate a random API key
pub fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a random session signing secret
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
