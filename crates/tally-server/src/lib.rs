//! Tally Web Server
//!
//! Axum-based REST API for the Tally personal finance tracker.
//!
//! Security features:
//! - Identity from an upstream access proxy or API keys (use --no-auth for local dev)
//! - Every query scoped to the calling user
//! - Restrictive CORS policy and security headers
//! - Input validation (JSON body cap, upload type and size checks)
//! - Audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use tally_core::db::Database;
use tally_core::models::{User, LOCAL_DEV_EMAIL};
use tally_core::receipts::{ReceiptStore, MAX_RECEIPT_SIZE};

mod handlers;

/// Maximum JSON request body (16 KB)
pub const MAX_JSON_BODY: usize = 16 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Environment variable holding `email=key` API key pairs
pub const API_KEYS_ENV: &str = "TALLY_API_KEYS";

/// Environment variable overriding the receipt upload directory
pub const UPLOAD_DIR_ENV: &str = "TALLY_UPLOAD_DIR";

/// Cloudflare Access header for authenticated user email
const CF_ACCESS_USER_HEADER: &str = "cf-access-authenticated-user-email";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// An API key and the user it acts as
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey {
    pub email: String,
    pub key: String,
}

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether an identity is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys for scripts and internal services
    /// Format: "Bearer <key>" in Authorization header
    pub api_keys: Vec<ApiKey>,
    /// Directory receipt images are stored in
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub receipts: ReceiptStore,
}

/// How the caller's identity was established
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    CloudflareHeader,
    ApiKey,
    /// Authentication disabled (local development)
    None,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CloudflareHeader => "cloudflare_header",
            Self::ApiKey => "api_key",
            Self::None => "none",
        }
    }
}

/// The user a request acts as, attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub auth_method: AuthMethod,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Work out who is calling from the request headers
///
/// The access proxy header wins over an API key. Returns `None` when neither
/// is present or the key is unknown.
fn resolve_identity(
    headers: &axum::http::HeaderMap,
    config: &ServerConfig,
) -> Option<(String, AuthMethod)> {
    let cf_user = headers
        .get(CF_ACCESS_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    if let Some(email) = cf_user {
        return Some((email.to_string(), AuthMethod::CloudflareHeader));
    }

    headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .and_then(|key| validate_api_key(key.trim(), &config.api_keys))
        .map(|email| (email.to_string(), AuthMethod::ApiKey))
}

/// Authentication middleware - resolves the caller to a user row
///
/// # Security Notes
///
/// **Cloudflare Access header**: `Cf-Access-Authenticated-User-Email` is trusted
/// as-is. This is safe behind Cloudflare Tunnel (which strips/rewrites CF
/// headers), but can be spoofed if the server is exposed directly.
///
/// **API keys**: Compared using constant-time comparison to prevent timing attacks.
///
/// With auth disabled, requests without an identity act as `local-dev@localhost`.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let identity = match resolve_identity(request.headers(), &state.config) {
        Some(identity) => identity,
        None if !state.config.require_auth => (LOCAL_DEV_EMAIL.to_string(), AuthMethod::None),
        None => {
            warn!(path = %path, "Unauthorized request - no valid auth");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Authentication required"
                })),
            )
                .into_response();
        }
    };

    let (email, auth_method) = identity;
    let user = match state.db.ensure_user(&email) {
        Ok(user) => user,
        Err(e) => return AppError::from(e).into_response(),
    };

    debug!(user = %user.email, method = auth_method.as_str(), path = %path, "Authenticated");

    request
        .extensions_mut()
        .insert(CurrentUser { user, auth_method });
    next.run(request).await
}

/// Validate an API key against the configured keys using constant-time comparison
/// to prevent timing attacks. Returns the email the key belongs to.
fn validate_api_key<'a>(provided: &str, valid_keys: &'a [ApiKey]) -> Option<&'a str> {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    for entry in valid_keys {
        let key_bytes = entry.key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        if provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes)) {
            return Some(&entry.email);
        }
    }
    None
}

/// Parse a comma-separated list of `email=key` pairs
///
/// Example: "alice@example.com=k1,ci@example.com=k2"
pub fn parse_api_keys(input: &str) -> Vec<ApiKey> {
    input
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once('=') {
                Some((email, key)) if !email.trim().is_empty() && !key.trim().is_empty() => {
                    Some(ApiKey {
                        email: email.trim().to_string(),
                        key: key.trim().to_string(),
                    })
                }
                _ => {
                    // Never log the entry itself; it may contain a key
                    warn!("Ignoring malformed API key entry (expected email=key)");
                    None
                }
            }
        })
        .collect()
}

/// Response carrying a human-readable message (deletes)
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let receipts = ReceiptStore::new(config.upload_dir.clone());
    info!("Receipts stored in {}", receipts.dir().display());

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        receipts,
    });

    let api_routes = Router::new()
        // Identity
        .route("/me", get(handlers::get_me))
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/:id", delete(handlers::delete_category))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        // Receipts
        .route(
            "/receipts/upload",
            // Multipart framing overhead on top of the file itself
            post(handlers::upload_receipt).layer(DefaultBodyLimit::max(MAX_RECEIPT_SIZE + 64 * 1024)),
        )
        .route("/receipts/:filename", delete(handlers::delete_receipt))
        // Recurring bills
        .route(
            "/recurring-bills",
            get(handlers::list_recurring_bills).post(handlers::create_recurring_bill),
        )
        .route(
            "/recurring-bills/month",
            get(handlers::recurring_bills_for_month),
        )
        .route(
            "/recurring-bills/:id",
            get(handlers::get_recurring_bill)
                .put(handlers::update_recurring_bill)
                .delete(handlers::delete_recurring_bill),
        )
        // Dashboard
        .route("/dashboard/stats", get(handlers::get_dashboard_stats))
        // Audit log
        .route("/audit", get(handlers::list_audit_log));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // Security headers
    // CSP: restrict scripts to same-origin, allow inline styles, allow blob: for receipt previews
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        // Receipt images are only served to their owner
        .route("/uploads/:filename", get(handlers::serve_receipt))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the SPA if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }
    if !config.api_keys.is_empty() {
        info!("{} API key(s) configured", config.api_keys.len());
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Client-caused core errors carry a safe message
        if let Some(core) = err.downcast_ref::<tally_core::Error>() {
            let mapped = match core {
                tally_core::Error::InvalidData(msg) | tally_core::Error::Conflict(msg) => {
                    Some(Self::bad_request(msg))
                }
                tally_core::Error::NotFound(msg) => Some(Self::not_found(msg)),
                tally_core::Error::Forbidden(msg) => Some(Self::forbidden(msg)),
                _ => None,
            };
            if let Some(mapped) = mapped {
                return mapped;
            }
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
