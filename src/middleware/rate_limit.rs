/// Fixed-window rate limiter
///
/// Each client IP gets `max_requests` per window. The window opens on the
/// client's first request and resets once it has fully elapsed. Requests with
/// no connection info share a single bucket.

use crate::api::ApiError;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::{Layer, Service};

const LIMIT_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const REMAINING_HEADER: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per client per window
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Shared counters for every client
///
/// THREAD-SAFE: one `DashMap` shard lock per check, no global lock on the hot
/// path.
#[derive(Debug)]
pub struct RateLimiterState {
    config: RateLimitConfig,
    windows: DashMap<Option<IpAddr>, Window>,
    last_prune: Mutex<Instant>,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            last_prune: Mutex::new(Instant::now()),
        }
    }

    pub fn check(&self, client: Option<IpAddr>) -> RateLimitResult {
        self.check_at(client, Instant::now())
    }

    /// Count one request from `client` at `now`
    pub fn check_at(&self, client: Option<IpAddr>, now: Instant) -> RateLimitResult {
        self.prune(now);

        let window = self.config.window;
        let mut entry = self
            .windows
            .entry(client)
            .or_insert(Window { started: now, count: 0 });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.config.max_requests {
            let retry_after = window.saturating_sub(now.saturating_duration_since(entry.started));
            return RateLimitResult::Limited { retry_after };
        }

        entry.count += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - entry.count,
        }
    }

    /// Drop windows that have fully elapsed, at most once per window
    ///
    /// Must run before `entry()` is taken: `retain` locks every shard.
    fn prune(&self, now: Instant) {
        let Ok(mut last) = self.last_prune.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last) < self.config.window {
            return;
        }
        *last = now;

        let window = self.config.window;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < window);
        let pruned = before.saturating_sub(self.windows.len());
        if pruned > 0 {
            tracing::debug!("🧹 Pruned {} idle rate limit windows", pruned);
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Layer for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimiterState>,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: Arc::new(RateLimiterState::new(config)),
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    state: Arc<RateLimiterState>,
}

impl<S> Service<Request<Body>> for RateLimitMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let client = super::peer_ip(&req);

            match state.check(client) {
                RateLimitResult::Allowed { remaining } => {
                    let mut response = inner.call(req).await?;
                    let headers = response.headers_mut();
                    headers.insert(LIMIT_HEADER, HeaderValue::from(state.config.max_requests));
                    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
                    Ok(response)
                }
                RateLimitResult::Limited { retry_after } => {
                    // Round up so clients never retry a moment too early
                    let retry_after_secs = retry_after.as_secs()
                        + u64::from(retry_after.subsec_nanos() > 0);
                    tracing::warn!(
                        client_ip = ?client,
                        retry_after_secs,
                        "🚦 Rate limit exceeded"
                    );
                    Ok(ApiError::RateLimitExceeded { retry_after_secs }.into_response())
                }
            }
        })
    }
}
