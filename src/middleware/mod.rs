/// HTTP middleware chain
///
/// The chain is an explicit `MiddlewarePlan` built once from `Config`. Plan
/// order is outermost-first: the request logger sees every response,
/// including the 500s produced by panic recovery and the 429s produced by
/// the rate limiter.

// Panic -> 500 envelope
pub mod recovery;

// Fixed-window limiter keyed by client IP
pub mod rate_limit;

// Browser hardening headers
pub mod security;

use crate::config::Config;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderValue, Method, Request},
    Router,
};
use rate_limit::{RateLimitConfig, RateLimitLayer};
use recovery::PanicResponder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use std::net::{IpAddr, SocketAddr};
use tracing::{Level, Span};

/// Peer address attached by `into_make_service_with_connect_info`
pub fn peer_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Per-request span carrying the client address next to method and uri
fn request_span(req: &Request<Body>) -> Span {
    let client_ip = peer_ip(req)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "-".to_string());
    tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        version = ?req.version(),
        client_ip = %client_ip,
    )
}

/// How cross-origin requests are answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, simple headers only (development)
    Permissive,
    /// Listed origins only (production)
    Allowlist {
        origins: Vec<String>,
        allow_credentials: bool,
    },
}

impl CorsPolicy {
    pub fn layer(&self) -> CorsLayer {
        match self {
            Self::Permissive => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::HEAD,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]),
            Self::Allowlist {
                origins,
                allow_credentials,
            } => {
                let layer = CorsLayer::new()
                    .allow_methods([
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::PATCH,
                        Method::DELETE,
                        Method::OPTIONS,
                    ])
                    .allow_headers([
                        header::ORIGIN,
                        header::CONTENT_TYPE,
                        header::ACCEPT,
                        header::AUTHORIZATION,
                    ]);

                // A wildcard origin cannot be combined with credentials
                if origins.iter().any(|origin| origin == "*") {
                    if *allow_credentials {
                        tracing::warn!("⚠️ FRONTEND_ORIGINS contains '*', CORS credentials disabled");
                    }
                    return layer.allow_origin(Any);
                }

                let allowed: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| match origin.parse::<HeaderValue>() {
                        Ok(value) => Some(value),
                        Err(_) => {
                            tracing::warn!("⚠️ Ignoring unusable CORS origin: {}", origin);
                            None
                        }
                    })
                    .collect();

                layer
                    .allow_origin(AllowOrigin::list(allowed))
                    .allow_credentials(*allow_credentials)
            }
        }
    }
}

/// One stage of the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Middleware {
    RequestLog,
    Recovery { expose_detail: bool },
    Cors(CorsPolicy),
    SecurityHeaders,
    RateLimit(RateLimitConfig),
}

/// Ordered middleware stages, outermost first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiddlewarePlan {
    pub stages: Vec<Middleware>,
}

impl MiddlewarePlan {
    /// PURE: derive the chain from configuration
    pub fn from_config(config: &Config) -> Self {
        let production = config.server.is_production();
        let security = &config.security;

        let mut stages = vec![
            Middleware::RequestLog,
            Middleware::Recovery {
                expose_detail: !production,
            },
        ];

        if !production {
            stages.push(Middleware::Cors(CorsPolicy::Permissive));
            return Self { stages };
        }

        if !security.frontend_origins.is_empty() {
            stages.push(Middleware::Cors(CorsPolicy::Allowlist {
                origins: security.frontend_origins.clone(),
                allow_credentials: security.cors_allow_credentials,
            }));
        }
        if security.enable_security_headers {
            stages.push(Middleware::SecurityHeaders);
        }
        if security.enable_rate_limiter {
            stages.push(Middleware::RateLimit(RateLimitConfig {
                max_requests: security.rate_limit_max,
                window: security.rate_limit_window,
            }));
        }

        Self { stages }
    }

    /// Wrap `router` so the first stage ends up outermost
    ///
    /// Attach routes and the fallback before calling this; `Router::layer`
    /// only wraps what already exists.
    pub fn apply(&self, router: Router) -> Router {
        tracing::info!("🧱 Applying middleware: {:?}", self.names());

        self.stages.iter().rev().fold(router, |router, stage| match stage {
            Middleware::RequestLog => router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span)
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            ),
            Middleware::Recovery { expose_detail } => {
                if *expose_detail {
                    recovery::install_backtrace_hook();
                }
                router.layer(CatchPanicLayer::custom(PanicResponder::new(*expose_detail)))
            }
            Middleware::Cors(policy) => router.layer(policy.layer()),
            Middleware::SecurityHeaders => {
                router.layer(axum::middleware::from_fn(security::security_headers))
            }
            Middleware::RateLimit(config) => router.layer(RateLimitLayer::new(*config)),
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .map(|stage| match stage {
                Middleware::RequestLog => "request_log",
                Middleware::Recovery { .. } => "recovery",
                Middleware::Cors(_) => "cors",
                Middleware::SecurityHeaders => "security_headers",
                Middleware::RateLimit(_) => "rate_limit",
            })
            .collect()
    }
}
