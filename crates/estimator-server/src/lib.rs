//! Estimator Web Server
//!
//! Axum-based HTTP API for the project cost estimator.
//!
//! Security features:
//! - Optional Referer origin allow-list
//! - Per-client fixed-window rate limiting
//! - Body size limit and strict request validation
//! - Restrictive CORS policy and security headers
//! - Sanitized error responses

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use estimator_core::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};
use estimator_core::{AIBackend, AIClient, FixedWindowLimiter, RateLimiter, ServerSettings};

mod handlers;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Origins allowed to call the estimate endpoint (empty = no check)
    pub allowed_origins: Vec<String>,
    /// Trusted proxies whose X-Forwarded-For headers are trusted (e.g., "10.42.0.0/16")
    pub trusted_proxies: Vec<ipnet::IpNet>,
    /// Requests allowed per client per window
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            trusted_proxies: vec![],
            rate_limit_max: DEFAULT_MAX_REQUESTS,
            rate_limit_window: DEFAULT_WINDOW,
        }
    }
}

impl ServerConfig {
    /// Build from the `[server]` config section
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            allowed_origins: settings
                .allowed_origins
                .iter()
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            trusted_proxies: parse_trusted_networks(&settings.trusted_proxies.join(",")),
            rate_limit_max: settings.rate_limit_max,
            rate_limit_window: Duration::from_secs(settings.rate_limit_window_secs),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub ai: Option<AIClient>,
    pub limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// State with an in-memory limiter sized from `config`
    pub fn new(config: ServerConfig, ai: Option<AIClient>) -> Self {
        let limiter = Arc::new(FixedWindowLimiter::new(
            config.rate_limit_window,
            config.rate_limit_max,
        ));
        Self {
            config,
            ai,
            limiter,
        }
    }
}

/// Extract client IP address, respecting trusted proxies
///
/// X-Forwarded-For (then X-Real-IP) is only consulted when the TCP peer is
/// a configured trusted proxy, or when no peer address is known at all.
pub(crate) fn get_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trusted_proxies: &[ipnet::IpNet],
) -> Option<IpAddr> {
    let peer_ip = connect_info.map(|ci| ci.0.ip());

    let trust_headers = match peer_ip {
        None => true,
        Some(ip) => trusted_proxies.iter().any(|net| net.contains(&ip)),
    };

    if trust_headers {
        // X-Forwarded-For format: "client, proxy1, proxy2" - take the first (original client)
        if let Some(client_ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Some(client_ip);
        }

        if let Some(client_ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Some(client_ip);
        }
    }

    peer_ip
}

/// Rate limit key for a request ("unknown" when no address can be found)
pub(crate) fn client_key(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trusted_proxies: &[ipnet::IpNet],
) -> String {
    get_client_ip(headers, connect_info, trusted_proxies)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parse a comma-separated list of IP addresses and CIDR networks
///
/// Examples:
/// - "10.42.0.0/16" - entire subnet
/// - "10.0.0.5" - single IP (parsed as /32 for IPv4 or /128 for IPv6)
pub fn parse_trusted_networks(input: &str) -> Vec<ipnet::IpNet> {
    input
        .split(',')
        .filter_map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(net) = s.parse::<ipnet::IpNet>() {
                return Some(net);
            }
            if let Ok(ip) = s.parse::<IpAddr>() {
                return Some(ipnet::IpNet::from(ip));
            }
            warn!(input = s, "Failed to parse trusted proxy entry");
            None
        })
        .collect()
}

/// Check the Referer header against the origin allow-list
///
/// With no allow-list every request passes. Otherwise the Referer must be
/// a URL whose origin (scheme, host, port) is listed.
pub fn is_origin_allowed(headers: &HeaderMap, allowed_origins: &[String]) -> bool {
    if allowed_origins.is_empty() {
        return true;
    }

    let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    match reqwest::Url::parse(referer) {
        Ok(url) => {
            let origin = url.origin().ascii_serialization();
            allowed_origins.iter().any(|allowed| *allowed == origin)
        }
        Err(_) => false,
    }
}

/// Create the application router with an in-memory rate limiter
pub fn create_router(
    config: ServerConfig,
    ai: Option<AIClient>,
    static_dir: Option<&Path>,
) -> Router {
    match ai {
        Some(ref client) => info!(
            "AI backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!(
            "ℹ️  AI backend not configured (set OPENAI_API_KEY to enable free-form estimates)"
        ),
    }

    create_router_with_state(Arc::new(AppState::new(config, ai)), static_dir)
}

/// Create the application router around prepared state (for testing)
pub fn create_router_with_state(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let api_routes = Router::new()
        .route(
            "/estimate",
            post(handlers::post_estimate).layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            )),
        )
        .route("/health", get(handlers::health));

    // Build CORS layer
    let cors = if state.config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
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

    // Serve the site if a static directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    config: ServerConfig,
    ai: Option<AIClient>,
) -> anyhow::Result<()> {
    if config.allowed_origins.is_empty() {
        warn!("⚠️  No origin allow-list configured - any site may call the estimate API");
    }

    check_ai_connection(ai.as_ref()).await;

    let app = create_router(config, ai, static_dir)
        .into_make_service_with_connect_info::<SocketAddr>();
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    let Some(client) = ai else {
        return;
    };

    if client.health_check().await {
        info!(
            "✅ AI backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "⚠️  AI backend configured but not responding: {} (model: {})",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
///
/// Renders as `{"error": message, ...details}`.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Map<String, Value>,
    retry_after: Option<u64>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            details: Map::new(),
            retry_after: None,
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, msg)
    }

    pub fn payload_too_large(msg: &str) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, msg)
    }

    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        Self {
            retry_after: Some(retry_after_secs),
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn bad_gateway(msg: &str) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, msg)
    }

    /// Add an extra field to the JSON body
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(self.message));
        body.extend(self.details);

        let mut response = (self.status, Json(Value::Object(body))).into_response();
        if let Some(secs) = self.retry_after {
            response.headers_mut().insert(
                HeaderName::from_static("retry-after"),
                HeaderValue::from(secs),
            );
        }
        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            // Return generic message to client
            // Keep full error for logging
            internal: Some(err.into()),
            ..Self::internal("Server error")
        }
    }
}
